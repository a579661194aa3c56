use std::io::{BufRead, Write};

use rand::{
    distributions::{Distribution, Uniform},
    RngCore,
};

use crate::{codec::FieldReader, prelude::*};

use super::unit::Unit;

/// A directed, weighted edge between two units of the same network.
///
/// Endpoints are indices into the owning network's unit arena. They start
/// unset and are bound exactly once, when the topology is built.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    id: usize,
    weight: f64,
    /// Last applied weight change, carried into the next update by momentum.
    delta: f64,
    source: Option<usize>,
    dest: Option<usize>,
}

/// Endpoint ids as they were stored in a connection record. Only informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoredEndpoints {
    pub source: usize,
    pub dest: usize,
}

impl Connection {
    /// Creates an unbound connection with a uniformly random weight in [-1, 1].
    pub fn new(id: usize, rng: &mut dyn RngCore) -> Self {
        let mut conn = Self {
            id,
            weight: 0.0,
            delta: 0.0,
            source: None,
            dest: None,
        };
        conn.init_weight(rng);
        conn
    }

    pub fn init_weight(&mut self, rng: &mut dyn RngCore) {
        let die = Uniform::from(-1.0..=1.0);
        self.weight = die.sample(rng);
    }

    /// Connects `source` to `dest`, registering this connection as an outgoing
    /// link of the source unit and an incoming link of the destination unit.
    pub fn bind(&mut self, source: usize, dest: usize, units: &mut [Unit]) -> Result<()> {
        if self.source.is_some() || self.dest.is_some() {
            return Err(Error::AlreadyBound(self.id));
        }
        for idx in [source, dest] {
            if idx >= units.len() {
                return Err(Error::IndexOutOfRange {
                    index: idx,
                    len: units.len(),
                });
            }
        }

        self.source = Some(source);
        self.dest = Some(dest);
        units[source].add_output(self.id);
        units[dest].add_input(self.id);
        Ok(())
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn previous_delta(&self) -> f64 {
        self.delta
    }

    pub fn is_bound(&self) -> bool {
        self.source.is_some() && self.dest.is_some()
    }

    pub fn source(&self) -> Result<usize> {
        self.source.ok_or(Error::UnboundConnection(self.id))
    }

    pub fn dest(&self) -> Result<usize> {
        self.dest.ok_or(Error::UnboundConnection(self.id))
    }

    /// Activation value of the source unit.
    pub fn source_value(&self, units: &[Unit]) -> Result<f64> {
        Ok(units[self.source()?].value())
    }

    pub fn weighted_source_value(&self, units: &[Unit]) -> Result<f64> {
        Ok(self.source_value(units)? * self.weight)
    }

    pub fn weighted_dest_error(&self, units: &[Unit]) -> Result<f64> {
        Ok(units[self.dest()?].error() * self.weight)
    }

    /// Applies `change` plus the momentum-scaled previous change. Momentum is
    /// taken from the destination unit.
    pub fn update_weight(&mut self, change: f64, units: &[Unit]) -> Result<()> {
        let momentum = units[self.dest()?].momentum();

        let delta = change + momentum * self.delta;
        self.weight += delta;
        self.delta = delta;
        Ok(())
    }

    /// Writes `id weight previousDelta sourceId destId` on one line.
    pub fn save<W: Write>(&self, units: &[Unit], w: &mut W) -> Result<()> {
        let source = units[self.source()?].id();
        let dest = units[self.dest()?].id();
        writeln!(
            w,
            "{} {} {} {} {}",
            self.id, self.weight, self.delta, source, dest
        )?;
        Ok(())
    }

    /// Reads a record written by [`Connection::save`]. The endpoints stay as
    /// they were bound; the stored endpoint ids are only returned to the caller.
    pub fn load<R: BufRead>(&mut self, fields: &mut FieldReader<R>) -> Result<StoredEndpoints> {
        self.id = fields.next_usize()?;
        self.weight = fields.next_f64()?;
        self.delta = fields.next_f64()?;

        Ok(StoredEndpoints {
            source: fields.next_usize()?,
            dest: fields.next_usize()?,
        })
    }
}
