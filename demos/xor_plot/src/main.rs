use std::{
    fs::File,
    io::{BufReader, BufWriter},
};

use bpnet::{
    neural::{trainer::Trainer, NeuralNet},
    pattern::{load_patterns, save_patterns, Pattern},
    prelude::*,
    viz::ErrorPlot,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let out_dir = std::env::args().nth(1).unwrap_or_else(|| ".".to_owned());
    let net_path = format!("{out_dir}/xor.net");
    let pat_path = format!("{out_dir}/xor.pat");

    // the third input is held at 1.0 and acts as a bias
    let patterns = [([0.0, 0.0], 0.0), ([0.0, 1.0], 1.0), ([1.0, 0.0], 1.0), ([1.0, 1.0], 0.0)]
        .into_iter()
        .enumerate()
        .map(|(id, ([a, b], y))| Pattern::from_values(id as i64, vec![a, b, 1.0], vec![y]))
        .collect::<Result<Vec<_>>>()?;
    save_patterns(&patterns, &mut BufWriter::new(File::create(&pat_path)?))?;

    let mut net = NeuralNet::with_layers(0.5, 0.9, &[3, 4, 1])?;

    let trainer = Trainer::new(10_000)
        .with_log(Some(10))
        .with_target_error(Some(1e-3));
    // closing the plot window early ends training; keep whatever was learned
    match trainer.train_gui::<ErrorPlot>(&mut net, &patterns) {
        Ok(error) => info!(error, "finished training"),
        Err(err) => warn!(%err, "training stopped early"),
    }

    net.save(&mut BufWriter::new(File::create(&net_path)?))?;

    // read everything back and check the restored network agrees
    let patterns = load_patterns(BufReader::new(File::open(&pat_path)?), 3, 1)?;
    let mut restored = NeuralNet::new();
    restored.load(BufReader::new(File::open(&net_path)?))?;

    println!("------------------");
    for p in &patterns {
        restored.set_input_pattern(p)?;
        restored.run()?;
        println!(
            "{:?} -> {:.4} (want {})",
            &p.inputs()[..2],
            restored.output(0)?,
            p.output(0)?
        );
    }
    println!(
        "Restored training error: {}",
        restored.squared_error(&patterns)?
    );
    Ok(())
}
