//! Training examples: a fixed-size input vector paired with the desired output
//! vector, plus an id.
//!
//! On disk a pattern is one line: `id  input_0 .. input_n  output_0 .. output_m`,
//! tab-separated.

use std::io::{BufRead, Write};

use crate::{codec::FieldReader, prelude::*};

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    id: i64,
    inputs: Vec<f64>,
    outputs: Vec<f64>,
}

fn check(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { index, len })
    }
}

impl Pattern {
    /// Zero-filled pattern with id -1. Both sizes must be non-zero.
    pub fn new(input_len: usize, output_len: usize) -> Result<Self> {
        if input_len == 0 || output_len == 0 {
            return Err(Error::DimensionErr);
        }
        Ok(Self {
            id: -1,
            inputs: vec![0.0; input_len],
            outputs: vec![0.0; output_len],
        })
    }

    pub fn from_values(id: i64, inputs: Vec<f64>, outputs: Vec<f64>) -> Result<Self> {
        if inputs.is_empty() || outputs.is_empty() {
            return Err(Error::DimensionErr);
        }
        Ok(Self {
            id,
            inputs,
            outputs,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    pub fn input_len(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_len(&self) -> usize {
        self.outputs.len()
    }

    pub fn inputs(&self) -> &[f64] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    pub fn input(&self, index: usize) -> Result<f64> {
        check(index, self.inputs.len())?;
        Ok(self.inputs[index])
    }

    pub fn output(&self, index: usize) -> Result<f64> {
        check(index, self.outputs.len())?;
        Ok(self.outputs[index])
    }

    pub fn set_input(&mut self, index: usize, value: f64) -> Result<()> {
        check(index, self.inputs.len())?;
        self.inputs[index] = value;
        Ok(())
    }

    pub fn set_output(&mut self, index: usize, value: f64) -> Result<()> {
        check(index, self.outputs.len())?;
        self.outputs[index] = value;
        Ok(())
    }

    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        write!(w, "{}", self.id)?;
        for x in self.inputs.iter().chain(&self.outputs) {
            write!(w, "\t{x}")?;
        }
        writeln!(w)?;
        Ok(())
    }

    /// Overwrites id, inputs and outputs with the next record. The pattern's
    /// sizes decide how many fields are read.
    pub fn load<R: BufRead>(&mut self, fields: &mut FieldReader<R>) -> Result<()> {
        self.id = fields.next_i64()?;
        for x in self.inputs.iter_mut().chain(self.outputs.iter_mut()) {
            *x = fields.next_f64()?;
        }
        Ok(())
    }
}

/// Reads patterns of the given shape until the stream is exhausted.
pub fn load_patterns<R: BufRead>(
    reader: R,
    input_len: usize,
    output_len: usize,
) -> Result<Vec<Pattern>> {
    let mut fields = FieldReader::new(reader);
    let mut patterns = Vec::new();

    while !fields.is_exhausted()? {
        let mut pattern = Pattern::new(input_len, output_len)?;
        pattern.load(&mut fields)?;
        patterns.push(pattern);
    }
    Ok(patterns)
}

pub fn save_patterns<W: Write>(patterns: &[Pattern], w: &mut W) -> Result<()> {
    for pattern in patterns {
        pattern.save(w)?;
    }
    w.flush()?;
    Ok(())
}
