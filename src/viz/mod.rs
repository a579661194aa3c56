use std::{
    collections::VecDeque,
    sync::{mpsc::Receiver, Arc, Mutex, MutexGuard},
    thread,
};

use eframe::CreationContext;
use egui::plot::{Line, Plot};

/// Sent to the GUI on every logged epoch:
/// (epoch, total squared error, network outputs for each pattern)
pub type IterationState = (usize, f64, Vec<Vec<f64>>);

/// A window that is fed training progress while a network trains.
pub trait Visualizer: eframe::App + 'static {
    const DATA_LIMIT: usize = 20_000;
    fn new(cc: &CreationContext, rx: Receiver<IterationState>) -> Self;
}

/// Plots the training error over epochs, with the latest outputs per pattern.
pub struct ErrorPlot {
    data: Arc<Mutex<VecDeque<IterationState>>>,
}

type History<'a> = MutexGuard<'a, VecDeque<IterationState>>;

fn lock(data: &Mutex<VecDeque<IterationState>>) -> History<'_> {
    // a panicked writer leaves the history readable
    data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Visualizer for ErrorPlot {
    /// Also starts a thread that drains `rx` into the plot history and asks
    /// for a repaint on every update. It ends when training hangs up.
    fn new(cc: &CreationContext, rx: Receiver<IterationState>) -> Self {
        let data = Arc::new(Mutex::new(VecDeque::new()));
        let history = data.clone();

        let ctx = cc.egui_ctx.clone();
        thread::spawn(move || {
            while let Ok(state) = rx.recv() {
                let mut guard = lock(&history);
                if guard.len() == Self::DATA_LIMIT {
                    guard.pop_front();
                }
                guard.push_back(state);
                ctx.request_repaint();
            }
        });

        Self { data }
    }
}

impl eframe::App for ErrorPlot {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let history = self.history();
        let points: Vec<_> = history
            .iter()
            .map(|(epoch, error, _)| [*epoch as f64, *error])
            .collect();
        let outputs = history.last().map(|(_, _, o)| o.clone()).unwrap_or_default();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical(|ui| {
                let [epoch, error] = points.last().copied().unwrap_or([0.0, f64::INFINITY]);
                ui.heading(format!("Epoch {} error: {error}", epoch as usize));
                for (i, out) in outputs.iter().enumerate() {
                    ui.small(format!("pattern {i}: {out:.4?}"));
                }
                Plot::new("Error").show(ui, |plot_ui| plot_ui.line(Line::new(points)));
            });
        });
    }
}

impl ErrorPlot {
    /// Snapshot of the received states, oldest first.
    pub fn history(&self) -> Vec<IterationState> {
        lock(&self.data).iter().cloned().collect()
    }
}
