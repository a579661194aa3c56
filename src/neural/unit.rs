use std::io::{BufRead, Write};

use crate::{codec::FieldReader, prelude::*};

use super::{
    activations::{sigmoid, sigmoid_derivative},
    connection::Connection,
};

pub const DEFAULT_LEARNING_RATE: f64 = 0.3;
pub const DEFAULT_MOMENTUM: f64 = 0.5;

/// A node of the network.
///
/// A unit without outgoing connections is an output unit, one without incoming
/// connections is an input unit. Incident connections are kept as indices into
/// the network's connection arena, in the order they were bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Unit {
    id: usize,
    value: f64,
    /// Holds the desired output of an output unit until `learn` replaces it
    /// with the backpropagated error signal.
    error: f64,
    learning_rate: f64,
    momentum: f64,
    inputs: Vec<usize>,
    outputs: Vec<usize>,
}

impl Default for Unit {
    fn default() -> Self {
        Self::new(0, DEFAULT_LEARNING_RATE, DEFAULT_MOMENTUM)
    }
}

impl Unit {
    pub fn new(id: usize, learning_rate: f64, momentum: f64) -> Self {
        Self {
            id,
            value: 0.0,
            error: 0.0,
            learning_rate,
            momentum,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn set_value(&mut self, value: f64) {
        self.value = value;
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn set_error(&mut self, error: f64) {
        self.error = error;
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        self.learning_rate = learning_rate;
    }

    pub fn momentum(&self) -> f64 {
        self.momentum
    }

    pub fn set_momentum(&mut self, momentum: f64) {
        self.momentum = momentum;
    }

    pub fn inputs(&self) -> &[usize] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[usize] {
        &self.outputs
    }

    pub fn is_input(&self) -> bool {
        self.inputs.is_empty()
    }

    pub fn is_output(&self) -> bool {
        self.outputs.is_empty()
    }

    pub(crate) fn add_input(&mut self, connection: usize) {
        self.inputs.push(connection);
    }

    pub(crate) fn add_output(&mut self, connection: usize) {
        self.outputs.push(connection);
    }

    /// Computes the activation this unit takes on the next forward pass:
    /// the sigmoid of the weighted sum over its incoming connections.
    ///
    /// `units` is the arena this unit lives in; it is read, not written, so the
    /// caller stores the result with [`Unit::set_value`].
    pub fn activate(&self, units: &[Unit], connections: &[Connection]) -> Result<f64> {
        let mut total = 0.0;
        for &c in &self.inputs {
            total += connections[c].weighted_source_value(units)?;
        }
        Ok(sigmoid(total))
    }

    /// Error signal for the backward pass.
    ///
    /// Output units compare their value to the desired output currently held in
    /// the error slot. Hidden units sum the weighted errors of the units they feed,
    /// so those must already be computed.
    pub fn compute_error(&self, units: &[Unit], connections: &[Connection]) -> Result<f64> {
        let slope = sigmoid_derivative(self.value);

        if self.is_output() {
            return Ok(slope * (self.error - self.value));
        }

        let mut total = 0.0;
        for &c in &self.outputs {
            total += connections[c].weighted_dest_error(units)?;
        }
        Ok(slope * total)
    }

    /// Adjusts the weights of all incoming connections by
    /// `learning_rate * error * source_value`, using the error already stored
    /// on this unit.
    pub fn update_incoming(&self, units: &[Unit], connections: &mut [Connection]) -> Result<()> {
        for &c in &self.inputs {
            let conn = &mut connections[c];
            let change = self.learning_rate * self.error * conn.source_value(units)?;
            conn.update_weight(change, units)?;
        }
        Ok(())
    }

    /// Writes `id learningRate momentum value error` on one line.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        writeln!(
            w,
            "{} {} {} {} {}",
            self.id, self.learning_rate, self.momentum, self.value, self.error
        )?;
        Ok(())
    }

    pub fn load<R: BufRead>(&mut self, fields: &mut FieldReader<R>) -> Result<()> {
        self.id = fields.next_usize()?;
        self.learning_rate = fields.next_f64()?;
        self.momentum = fields.next_f64()?;
        self.value = fields.next_f64()?;
        self.error = fields.next_f64()?;
        Ok(())
    }
}
