use std::sync::mpsc;

use tracing::info;

use crate::{neural::NeuralNet, pattern::Pattern, prelude::*, viz::Visualizer};

/// Presents a pattern set to a network over and over, one pattern at a time:
/// forward pass, then backward pass with the pattern's desired outputs.
pub struct Trainer {
    epochs: usize,
    epochs_per_log: Option<usize>,
    target_error: Option<f64>,
}

impl Trainer {
    pub fn new(epochs: usize) -> Self {
        Self {
            epochs,
            epochs_per_log: None,
            target_error: None,
        }
    }

    pub fn with_log(mut self, epochs_per_log: Option<usize>) -> Self {
        self.epochs_per_log = epochs_per_log;
        self
    }

    /// Stop as soon as an epoch's total squared error drops to `target_error`.
    pub fn with_target_error(mut self, target_error: Option<f64>) -> Self {
        self.target_error = target_error;
        self
    }

    pub fn set_epochs(&mut self, epochs: usize) {
        self.epochs = epochs;
    }

    /// Trains `net` and returns the total squared error of the last epoch,
    /// measured on each pattern just before its weights were adjusted.
    /// With zero epochs nothing is measured and the result is infinite.
    pub fn train(&self, net: &mut NeuralNet, patterns: &[Pattern]) -> Result<f64> {
        self.train_with(net, patterns, |_, _, _| Ok(()))
    }

    pub fn train_gui<Gui: Visualizer>(
        &self,
        net: &mut NeuralNet,
        patterns: &[Pattern],
    ) -> Result<f64> {
        std::thread::scope(|scope| -> Result<f64> {
            let (tx, rx) = mpsc::channel();
            let handle = scope.spawn(move || -> Result<f64> {
                self.train_with(net, patterns, |epoch, error, net| {
                    let outputs = patterns
                        .iter()
                        .map(|p| -> Result<Vec<f64>> {
                            net.set_input_pattern(p)?;
                            net.run()?;
                            Ok(net.outputs())
                        })
                        .collect::<Result<Vec<_>>>()?;
                    tx.send((epoch, error, outputs)).map_err(|_| Error::ThreadErr)
                })
            });

            let _ = eframe::run_native(
                "bpnet",
                eframe::NativeOptions::default(),
                Box::new(|cc| Box::new(Gui::new(cc, rx))),
            );

            handle.join().map_err(|_| Error::ThreadErr)?
        })
    }

    /// Runs one epoch and returns its total squared error.
    pub fn epoch(net: &mut NeuralNet, patterns: &[Pattern]) -> Result<f64> {
        let mut error = 0.0;
        for pattern in patterns {
            net.set_input_pattern(pattern)?;
            net.run()?;
            error += net.pattern_error(pattern)?;
            net.set_error_pattern(pattern)?;
            net.learn()?;
        }
        Ok(error)
    }

    /// Training loop shared by `train` and `train_gui`; `on_log` is called on
    /// every logged epoch.
    fn train_with<F>(
        &self,
        net: &mut NeuralNet,
        patterns: &[Pattern],
        mut on_log: F,
    ) -> Result<f64>
    where
        F: FnMut(usize, f64, &mut NeuralNet) -> Result<()>,
    {
        let mut error = f64::INFINITY;
        for i in 0..self.epochs {
            error = Self::epoch(net, patterns)?;

            if self.epochs_per_log.is_some_and(|epl| epl > 0 && i % epl == 0) {
                info!(epoch = i, error, "training");
                on_log(i, error, net)?;
            }
            if self.target_error.is_some_and(|target| error <= target) {
                info!(epoch = i, error, "reached target error");
                break;
            }
        }
        Ok(error)
    }
}
