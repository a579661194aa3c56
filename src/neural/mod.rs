pub mod activations;
pub mod connection;
pub mod trainer;
pub mod unit;

use std::io::{BufRead, Write};

use rand::RngCore;
use tracing::{debug, warn};

use crate::{codec::FieldReader, pattern::Pattern, prelude::*};

use self::{connection::Connection, unit::Unit};

/// A layered, fully connected feed-forward network trained by backpropagation
/// with momentum.
///
/// Units are stored layer after layer, input layer first. Connections are
/// stored per layer transition and, inside a transition, destination-major then
/// source-minor. Saved networks rely on both orders.
#[derive(Debug, Clone, Default)]
pub struct NeuralNet {
    layer_sizes: Vec<usize>,
    units: Vec<Unit>,
    connections: Vec<Connection>,
    first_hidden: usize,
    first_output: usize,
}

/// Unit and connection counts of a dense layered topology, or `None` if either
/// overflows `usize`.
fn topology_counts(layer_sizes: &[usize]) -> Option<(usize, usize)> {
    let units = layer_sizes
        .iter()
        .try_fold(0usize, |acc, &n| acc.checked_add(n))?;
    let connections = layer_sizes
        .windows(2)
        .try_fold(0usize, |acc, w| acc.checked_add(w[0].checked_mul(w[1])?))?;
    Some((units, connections))
}

fn check(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(Error::IndexOutOfRange { index, len })
    }
}

impl NeuralNet {
    /// Creates a network with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a network with the given layer sizes, input layer first.
    pub fn with_layers(learning_rate: f64, momentum: f64, layer_sizes: &[usize]) -> Result<Self> {
        let mut net = Self::new();
        net.build_topology(learning_rate, momentum, layer_sizes)?;
        Ok(net)
    }

    /// Replaces the current topology with a freshly initialized one.
    /// Weights are drawn from the thread-local generator.
    pub fn build_topology(
        &mut self,
        learning_rate: f64,
        momentum: f64,
        layer_sizes: &[usize],
    ) -> Result<()> {
        self.build_topology_with_rng(&mut rand::thread_rng(), learning_rate, momentum, layer_sizes)
    }

    /// Same as [`NeuralNet::build_topology`] but draws initial weights from `rng`.
    ///
    /// An empty `layer_sizes` leaves the network empty.
    pub fn build_topology_with_rng(
        &mut self,
        rng: &mut dyn RngCore,
        learning_rate: f64,
        momentum: f64,
        layer_sizes: &[usize],
    ) -> Result<()> {
        self.clear();
        if layer_sizes.is_empty() {
            return Ok(());
        }
        let (n_units, n_connections) = topology_counts(layer_sizes)
            .ok_or_else(|| Error::TopologyOverflow(layer_sizes.to_vec()))?;
        self.layer_sizes = layer_sizes.to_vec();

        self.units = (0..n_units)
            .map(|id| Unit::new(id, learning_rate, momentum))
            .collect();
        self.connections = (0..n_connections)
            .map(|id| Connection::new(id, rng))
            .collect();

        self.first_hidden = layer_sizes[0];
        self.first_output = n_units - layer_sizes[layer_sizes.len() - 1];

        // c -- next connection to bind
        // src -- first unit of the current layer
        // dst -- first unit of the next layer
        let mut c = 0;
        let mut src = 0;
        let mut dst = self.first_hidden;
        for pair in layer_sizes.windows(2) {
            for j in 0..pair[1] {
                for k in 0..pair[0] {
                    self.connections[c].bind(src + k, dst + j, &mut self.units)?;
                    c += 1;
                }
            }
            src = dst;
            dst += pair[1];
        }

        debug!(
            ?layer_sizes,
            units = n_units,
            connections = n_connections,
            "built topology"
        );
        Ok(())
    }

    fn clear(&mut self) {
        self.layer_sizes.clear();
        self.units.clear();
        self.connections.clear();
        self.first_hidden = 0;
        self.first_output = 0;
    }

    pub fn num_layers(&self) -> usize {
        self.layer_sizes.len()
    }

    /// Number of units in layer `layer`.
    pub fn layer_size(&self, layer: usize) -> Result<usize> {
        check(layer, self.layer_sizes.len())?;
        Ok(self.layer_sizes[layer])
    }

    pub fn layer_sizes(&self) -> &[usize] {
        &self.layer_sizes
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Index of the first unit after the input layer.
    pub fn first_hidden_index(&self) -> usize {
        self.first_hidden
    }

    /// Index of the first unit of the output layer.
    pub fn first_output_index(&self) -> usize {
        self.first_output
    }

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    fn input_len(&self) -> Result<usize> {
        self.layer_sizes.first().copied().ok_or(Error::EmptyTopology)
    }

    fn output_len(&self) -> Result<usize> {
        self.layer_sizes.last().copied().ok_or(Error::EmptyTopology)
    }

    /// Forward pass: recomputes every non-input unit in index order.
    /// A unit's sources always sit at lower indices, so they are up to date.
    pub fn run(&mut self) -> Result<()> {
        for i in self.first_hidden..self.units.len() {
            let value = self.units[i].activate(&self.units, &self.connections)?;
            self.units[i].set_value(value);
        }
        Ok(())
    }

    /// Backward pass: computes errors from the last unit down to the first
    /// hidden unit, adjusting each unit's incoming weights as it goes.
    ///
    /// The desired outputs must have been set with [`NeuralNet::set_error`].
    pub fn learn(&mut self) -> Result<()> {
        for i in (self.first_hidden..self.units.len()).rev() {
            let error = self.units[i].compute_error(&self.units, &self.connections)?;
            self.units[i].set_error(error);
            self.units[i].update_incoming(&self.units, &mut self.connections)?;
        }
        Ok(())
    }

    pub fn set_input(&mut self, index: usize, value: f64) -> Result<()> {
        check(index, self.input_len()?)?;
        self.units[index].set_value(value);
        Ok(())
    }

    pub fn set_input_pattern(&mut self, pattern: &Pattern) -> Result<()> {
        if pattern.input_len() != self.input_len()? {
            return Err(Error::DimensionErr);
        }
        for (unit, &x) in self.units.iter_mut().zip(pattern.inputs()) {
            unit.set_value(x);
        }
        Ok(())
    }

    /// Sets the desired value of output unit `index` for the next [`NeuralNet::learn`].
    pub fn set_error(&mut self, index: usize, desired: f64) -> Result<()> {
        check(index, self.output_len()?)?;
        self.units[self.first_output + index].set_error(desired);
        Ok(())
    }

    pub fn set_error_pattern(&mut self, pattern: &Pattern) -> Result<()> {
        if pattern.output_len() != self.output_len()? {
            return Err(Error::DimensionErr);
        }
        for (unit, &y) in self.units[self.first_output..]
            .iter_mut()
            .zip(pattern.outputs())
        {
            unit.set_error(y);
        }
        Ok(())
    }

    pub fn output(&self, index: usize) -> Result<f64> {
        check(index, self.output_len()?)?;
        Ok(self.units[self.first_output + index].value())
    }

    /// Error signal of output unit `index`. Before `learn` this is the desired
    /// output, after it the computed error.
    pub fn error(&self, index: usize) -> Result<f64> {
        check(index, self.output_len()?)?;
        Ok(self.units[self.first_output + index].error())
    }

    /// Values of all output units, in order.
    pub fn outputs(&self) -> Vec<f64> {
        self.units[self.first_output..]
            .iter()
            .map(Unit::value)
            .collect()
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) {
        for unit in self.units.iter_mut() {
            unit.set_learning_rate(learning_rate);
        }
    }

    pub fn set_momentum(&mut self, momentum: f64) {
        for unit in self.units.iter_mut() {
            unit.set_momentum(momentum);
        }
    }

    /// Learning rate of the first unit; uniform unless units were edited one by one.
    pub fn learning_rate(&self) -> Result<f64> {
        self.units
            .first()
            .map(Unit::learning_rate)
            .ok_or(Error::EmptyTopology)
    }

    pub fn momentum(&self) -> Result<f64> {
        self.units
            .first()
            .map(Unit::momentum)
            .ok_or(Error::EmptyTopology)
    }

    /// Runs every pattern and sums `(desired - output)^2` over all outputs.
    /// Weights are left untouched.
    pub fn squared_error(&mut self, patterns: &[Pattern]) -> Result<f64> {
        let mut sum = 0.0;
        for pattern in patterns {
            self.set_input_pattern(pattern)?;
            self.run()?;
            sum += self.pattern_error(pattern)?;
        }
        Ok(sum)
    }

    /// Squared error of the current outputs against `pattern`'s desired outputs.
    pub(crate) fn pattern_error(&self, pattern: &Pattern) -> Result<f64> {
        if pattern.output_len() != self.output_len()? {
            return Err(Error::DimensionErr);
        }
        Ok(self.units[self.first_output..]
            .iter()
            .zip(pattern.outputs())
            .map(|(unit, &y)| (y - unit.value()) * (y - unit.value()))
            .sum())
    }

    /// Writes the layer sizes, the unit and connection counts, then every unit
    /// record followed by every connection record, in index order.
    pub fn save<W: Write>(&self, w: &mut W) -> Result<()> {
        writeln!(w, "{}", self.layer_sizes.len())?;
        for size in &self.layer_sizes {
            writeln!(w, "{size}")?;
        }
        writeln!(w, "{}", self.units.len())?;
        writeln!(w, "{}", self.connections.len())?;

        for unit in &self.units {
            unit.save(w)?;
        }
        for conn in &self.connections {
            conn.save(&self.units, w)?;
        }
        w.flush()?;

        debug!(
            units = self.units.len(),
            connections = self.connections.len(),
            "saved network"
        );
        Ok(())
    }

    /// Rebuilds the topology from the stored layer sizes and overwrites unit and
    /// connection state record by record, by position.
    ///
    /// On error the network may be partially overwritten and should not be used.
    pub fn load<R: BufRead>(&mut self, reader: R) -> Result<()> {
        let mut fields = FieldReader::new(reader);

        let n_layers = fields.next_usize()?;
        // n_layers is untrusted, so no up-front reservation
        let mut layer_sizes = Vec::new();
        for _ in 0..n_layers {
            layer_sizes.push(fields.next_usize()?);
        }
        let n_units = fields.next_usize()?;
        let n_connections = fields.next_usize()?;

        // the header must agree with the layer sizes before anything is allocated
        let (expected_units, expected_connections) = topology_counts(&layer_sizes)
            .ok_or_else(|| Error::TopologyOverflow(layer_sizes.clone()))?;
        if n_units != expected_units {
            return Err(Error::HeaderMismatch {
                field: "unit count",
                expected: expected_units,
                found: n_units,
            });
        }
        if n_connections != expected_connections {
            return Err(Error::HeaderMismatch {
                field: "connection count",
                expected: expected_connections,
                found: n_connections,
            });
        }

        // learning rate and momentum come back with the unit records
        self.build_topology(0.0, 0.0, &layer_sizes)?;

        for unit in self.units.iter_mut() {
            unit.load(&mut fields)?;
        }
        for i in 0..self.connections.len() {
            let stored = self.connections[i].load(&mut fields)?;
            let conn = &self.connections[i];
            let source = self.units[conn.source()?].id();
            let dest = self.units[conn.dest()?].id();
            if stored.source != source || stored.dest != dest {
                warn!(
                    connection = i,
                    stored_source = stored.source,
                    stored_dest = stored.dest,
                    source,
                    dest,
                    "stored endpoints differ from topology, keeping topology"
                );
            }
        }

        debug!(
            ?layer_sizes,
            units = n_units,
            connections = n_connections,
            "loaded network"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::neural::activations::sigmoid;

    fn seeded(layer_sizes: &[usize], seed: u64) -> NeuralNet {
        let mut net = NeuralNet::new();
        net.build_topology_with_rng(&mut ChaCha8Rng::seed_from_u64(seed), 0.5, 0.9, layer_sizes)
            .unwrap();
        net
    }

    fn xor_patterns() -> Vec<Pattern> {
        // third input is a constant bias term
        [([0.0, 0.0], 0.0), ([0.0, 1.0], 1.0), ([1.0, 0.0], 1.0), ([1.0, 1.0], 0.0)]
            .into_iter()
            .enumerate()
            .map(|(id, ([a, b], y))| {
                Pattern::from_values(id as i64, vec![a, b, 1.0], vec![y]).unwrap()
            })
            .collect()
    }

    fn train_epoch(net: &mut NeuralNet, patterns: &[Pattern]) -> f64 {
        let mut sum = 0.0;
        for pattern in patterns {
            net.set_input_pattern(pattern).unwrap();
            net.run().unwrap();
            sum += net.pattern_error(pattern).unwrap();
            net.set_error_pattern(pattern).unwrap();
            net.learn().unwrap();
        }
        sum
    }

    #[test]
    fn topology_counts() {
        for sizes in [
            vec![1],
            vec![2, 1],
            vec![3, 4, 1],
            vec![4, 3, 5, 2],
            vec![1, 1, 1, 1, 1],
            vec![7, 2, 9],
        ] {
            let net = seeded(&sizes, 0);
            let total: usize = sizes.iter().sum();
            let links: usize = sizes.windows(2).map(|w| w[0] * w[1]).sum();

            assert_eq!(net.unit_count(), total);
            assert_eq!(net.connection_count(), links);
            assert_eq!(net.first_hidden_index(), sizes[0]);
            assert_eq!(net.first_output_index(), total - sizes[sizes.len() - 1]);
            assert_eq!(net.num_layers(), sizes.len());
            for (l, &n) in sizes.iter().enumerate() {
                assert_eq!(net.layer_size(l).unwrap(), n);
            }
            assert!(net.connections().iter().all(Connection::is_bound));
        }
    }

    #[test]
    fn connection_order() {
        let net = seeded(&[2, 3, 1], 0);
        let endpoints: Vec<_> = net
            .connections()
            .iter()
            .map(|c| (c.source().unwrap(), c.dest().unwrap()))
            .collect();

        assert_eq!(
            endpoints,
            [
                (0, 2),
                (1, 2),
                (0, 3),
                (1, 3),
                (0, 4),
                (1, 4),
                (2, 5),
                (3, 5),
                (4, 5)
            ]
        );
        assert_eq!(net.units()[5].inputs(), &[6, 7, 8]);
        assert_eq!(net.units()[0].outputs(), &[0, 2, 4]);
    }

    #[test]
    fn unit_roles() {
        let net = seeded(&[2, 3, 2], 0);
        for (i, unit) in net.units().iter().enumerate() {
            assert_eq!(unit.id(), i);
            assert_eq!(unit.is_input(), i < net.first_hidden_index());
            assert_eq!(unit.is_output(), i >= net.first_output_index());
        }
    }

    #[test]
    fn rebuild_discards_previous() {
        let mut net = seeded(&[4, 4, 4], 0);
        net.build_topology(0.1, 0.2, &[2, 1]).unwrap();

        assert_eq!(net.unit_count(), 3);
        assert_eq!(net.connection_count(), 2);
        assert_eq!(net.units()[2].inputs(), &[0, 1]);
        assert_eq!(net.learning_rate().unwrap(), 0.1);
        assert_eq!(net.momentum().unwrap(), 0.2);
    }

    #[test]
    fn empty_layer_list() {
        let mut net = seeded(&[2, 1], 0);
        net.build_topology(0.3, 0.5, &[]).unwrap();

        assert_eq!(net.num_layers(), 0);
        assert_eq!(net.unit_count(), 0);
        assert!(matches!(net.set_input(0, 1.0), Err(Error::EmptyTopology)));
        assert!(matches!(net.output(0), Err(Error::EmptyTopology)));
        assert!(matches!(net.learning_rate(), Err(Error::EmptyTopology)));
        assert!(net.outputs().is_empty());
        net.run().unwrap();
        net.learn().unwrap();
    }

    #[test]
    fn index_checks() {
        let mut net = seeded(&[2, 2, 1], 0);

        assert!(matches!(
            net.set_input(2, 1.0),
            Err(Error::IndexOutOfRange { index: 2, len: 2 })
        ));
        assert!(matches!(
            net.set_error(1, 1.0),
            Err(Error::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(net.output(1).is_err());
        assert!(net.error(1).is_err());
        assert!(matches!(
            net.layer_size(3),
            Err(Error::IndexOutOfRange { index: 3, len: 3 })
        ));

        let wrong = Pattern::from_values(0, vec![1.0; 3], vec![1.0]).unwrap();
        assert!(matches!(
            net.set_input_pattern(&wrong),
            Err(Error::DimensionErr)
        ));
        let wrong = Pattern::from_values(0, vec![1.0; 2], vec![1.0; 2]).unwrap();
        assert!(matches!(
            net.set_error_pattern(&wrong),
            Err(Error::DimensionErr)
        ));
    }

    #[test]
    fn forward_by_hand() {
        let mut net = seeded(&[2, 1], 0);
        let w0 = net.connections()[0].weight();
        let w1 = net.connections()[1].weight();

        net.set_input(0, 0.3).unwrap();
        net.set_input(1, -0.8).unwrap();
        net.run().unwrap();

        assert_relative_eq!(
            net.output(0).unwrap(),
            sigmoid(0.3 * w0 - 0.8 * w1),
            epsilon = 1e-12
        );
    }

    #[test]
    fn outputs_in_sigmoid_range() {
        let mut net = seeded(&[3, 5, 4, 2], 3);
        for inputs in [[0.0, 0.0, 0.0], [1.0, -1.0, 0.5], [5.0, 3.0, -2.0]] {
            for (i, &x) in inputs.iter().enumerate() {
                net.set_input(i, x).unwrap();
            }
            net.run().unwrap();
            assert!(net.outputs().iter().all(|&y| y > 0.0 && y < 1.0));
        }
    }

    #[test]
    fn run_is_idempotent() {
        let mut net = seeded(&[3, 4, 2], 5);
        net.set_input(0, 0.2).unwrap();
        net.set_input(1, 0.9).unwrap();
        net.set_input(2, -0.4).unwrap();

        net.run().unwrap();
        let first = net.outputs();
        net.run().unwrap();
        assert_eq!(first, net.outputs());

        // outputs only depend on the current inputs and weights
        net.set_input(0, 1.0).unwrap();
        net.run().unwrap();
        net.set_input(0, 0.2).unwrap();
        net.run().unwrap();
        assert_eq!(first, net.outputs());
    }

    #[test]
    fn single_layer() {
        let mut net = seeded(&[3], 0);
        assert_eq!(net.connection_count(), 0);
        assert_eq!(net.first_hidden_index(), 3);
        assert_eq!(net.first_output_index(), 0);

        net.set_input(1, 0.7).unwrap();
        net.run().unwrap();
        net.set_error(2, 1.0).unwrap();
        net.learn().unwrap();

        // input units are never recomputed
        assert_eq!(net.output(1).unwrap(), 0.7);
        assert_eq!(net.error(2).unwrap(), 1.0);
    }

    #[test]
    fn learn_output_layer() {
        let mut net = seeded(&[1, 1], 0);
        net.set_momentum(0.0);
        let w = net.connections()[0].weight();

        net.set_input(0, 1.0).unwrap();
        net.run().unwrap();
        let y = net.output(0).unwrap();
        net.set_error(0, 1.0).unwrap();
        net.learn().unwrap();

        let error = y * (1.0 - y) * (1.0 - y);
        assert_relative_eq!(net.error(0).unwrap(), error, epsilon = 1e-12);
        assert_relative_eq!(
            net.connections()[0].weight(),
            w + 0.5 * error,
            epsilon = 1e-12
        );
    }

    #[test]
    fn learn_hidden_uses_updated_downstream_weight() {
        let mut net = seeded(&[1, 1, 1], 2);
        net.set_momentum(0.0);
        let w_in = net.connections()[0].weight();

        net.set_input(0, 1.0).unwrap();
        net.run().unwrap();
        net.set_error(0, 0.0).unwrap();
        net.learn().unwrap();

        // the output unit updates its weight before the hidden unit reads it
        let h = net.units()[1].value();
        let out_error = net.units()[2].error();
        let w_out = net.connections()[1].weight();
        let hidden_error = h * (1.0 - h) * out_error * w_out;

        assert_relative_eq!(net.units()[1].error(), hidden_error, epsilon = 1e-12);
        assert_relative_eq!(
            net.connections()[0].weight(),
            w_in + 0.5 * hidden_error,
            epsilon = 1e-12
        );
    }

    #[test]
    fn network_wide_parameters() {
        let mut net = seeded(&[2, 2, 1], 0);
        net.set_learning_rate(0.05);
        net.set_momentum(0.25);

        assert!(net.units().iter().all(|u| u.learning_rate() == 0.05));
        assert!(net.units().iter().all(|u| u.momentum() == 0.25));
        assert_eq!(net.learning_rate().unwrap(), 0.05);
        assert_eq!(net.momentum().unwrap(), 0.25);
    }

    #[test]
    fn save_format() {
        let mut net = seeded(&[2, 1], 0);
        net.set_learning_rate(0.5);
        net.set_momentum(0.25);

        let mut out = Vec::new();
        net.save(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(&lines[..5], &["2", "2", "1", "3", "2"]);
        assert_eq!(lines[5], "0 0.5 0.25 0 0");
        assert_eq!(lines.len(), 5 + 3 + 2);
        let link: Vec<_> = lines[9].split(' ').collect();
        assert_eq!(link[0], "1");
        assert_eq!(&link[3..], &["1", "2"]);
    }

    #[test]
    fn save_load_round_trip() {
        let mut net = seeded(&[3, 4, 1], 9);
        let patterns = xor_patterns();
        for _ in 0..25 {
            train_epoch(&mut net, &patterns);
        }

        let mut out = Vec::new();
        net.save(&mut out).unwrap();

        let mut loaded = seeded(&[3, 4, 1], 100);
        loaded.load(out.as_slice()).unwrap();

        assert_eq!(loaded.layer_sizes(), net.layer_sizes());
        assert_eq!(loaded.units(), net.units());
        assert_eq!(loaded.connections(), net.connections());

        // loading into an empty network rebuilds the shape
        let mut fresh = NeuralNet::new();
        fresh.load(out.as_slice()).unwrap();
        assert_eq!(fresh.units(), net.units());
        assert_eq!(fresh.first_output_index(), net.first_output_index());
    }

    #[test]
    fn load_ignores_stored_endpoints() {
        let text = "2\n1\n1\n2\n1\n0 0.3 0.5 1 0\n1 0.3 0.5 0.5 0.1\n0 0.25 0 7 8\n";
        let mut net = NeuralNet::new();
        net.load(text.as_bytes()).unwrap();

        assert_eq!(net.connections()[0].source().unwrap(), 0);
        assert_eq!(net.connections()[0].dest().unwrap(), 1);
        assert_eq!(net.connections()[0].weight(), 0.25);
        assert_eq!(net.learning_rate().unwrap(), 0.3);
    }

    #[test]
    fn load_malformed() {
        let mut net = NeuralNet::new();

        assert!(matches!(
            net.load("2\n1\nx\n".as_bytes()),
            Err(Error::Parse { line: 3, .. })
        ));
        assert!(matches!(
            net.load("2\n1\n1\n2\n1\n0 0.3 0.5 1 0\n".as_bytes()),
            Err(Error::UnexpectedEof { .. })
        ));
        assert!(matches!(
            net.load("2\n1\n1\n3\n1\n".as_bytes()),
            Err(Error::HeaderMismatch {
                field: "unit count",
                expected: 2,
                found: 3
            })
        ));
        assert!(matches!(
            net.load("2\n2\n1\n3\n4\n".as_bytes()),
            Err(Error::HeaderMismatch {
                field: "connection count",
                ..
            })
        ));

        // layer count far beyond the stream: fails on the missing fields
        assert!(matches!(
            net.load("18446744073709551615\n1\n".as_bytes()),
            Err(Error::UnexpectedEof { .. })
        ));
        // 2^32 * 2^32 connections does not fit in usize
        assert!(matches!(
            net.load("2\n4294967296\n4294967296\n0\n0\n".as_bytes()),
            Err(Error::TopologyOverflow(_))
        ));
    }

    #[test]
    fn load_checks_header_before_building() {
        let mut net = seeded(&[2, 1], 0);

        // 10^10 connections would be built if the counts were not checked first
        assert!(matches!(
            net.load("2\n100000\n100000\n1\n1\n".as_bytes()),
            Err(Error::HeaderMismatch {
                field: "unit count",
                expected: 200_000,
                found: 1
            })
        ));
        assert!(matches!(
            net.load("2\n100000\n100000\n200000\n1\n".as_bytes()),
            Err(Error::HeaderMismatch {
                field: "connection count",
                expected: 10_000_000_000,
                found: 1
            })
        ));
        // the rejected header left the previous network alone
        assert_eq!(net.layer_sizes(), &[2, 1]);
        assert_eq!(net.connection_count(), 2);
    }

    #[test]
    fn build_topology_overflow() {
        let mut net = NeuralNet::new();
        let huge = [usize::MAX, 2];

        assert!(matches!(
            net.build_topology(0.3, 0.5, &huge),
            Err(Error::TopologyOverflow(sizes)) if sizes == huge
        ));
        assert_eq!(net.num_layers(), 0);
        assert_eq!(net.unit_count(), 0);
    }

    #[test]
    fn squared_error_leaves_weights() {
        let mut net = seeded(&[3, 2, 1], 4);
        let before = net.connections().to_vec();
        let patterns = xor_patterns();

        let error = net.squared_error(&patterns).unwrap();

        assert!(error > 0.0 && error < patterns.len() as f64);
        assert_eq!(net.connections(), before.as_slice());
    }

    #[test]
    fn train_xor() {
        let patterns = xor_patterns();

        // a rare seed can settle in a local minimum, so allow a few restarts
        let converged = (0..5).any(|seed| {
            let mut net = seeded(&[3, 4, 1], seed);
            let first = train_epoch(&mut net, &patterns);
            let mut last = first;
            for _ in 1..5_000 {
                last = train_epoch(&mut net, &patterns);
            }

            let close = patterns.iter().all(|p| {
                net.set_input_pattern(p).unwrap();
                net.run().unwrap();
                (net.output(0).unwrap() - p.output(0).unwrap()).abs() < 0.1
            });
            println!("seed {seed}: error {first} -> {last}");
            close && last < first
        });

        assert!(converged);
    }
}
