mod cli;
mod progress;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Cli::parse();
    let mut timing = Timing::new();

    // --- Configuration, with command line overrides ----------------------------------
    timing.start("Reading config");
    let mut config = read_config_file(&args.config)
        .with_context(|| format!("Can't use config file {}", args.config.display()))?;
    if let Some(n) = args.iterations { config.iterations = n; }
    if let Some(b) = args.backend    { config.backend    = b; }
    if args.threads.is_some()        { config.threads    = args.threads; }
    let geometry = config.scan_geometry().context("Inconsistent scan geometry in config")?;
    let shape = config.grid_shape();
    let backend = config.backend()?;
    timing.done();
    info!(iterations = config.iterations, grid = ?config.grid, sinogram = ?config.sinogram,
          step = ?config.step, backend = backend.name(), "configured");

    // Before starting the potentially long computation, make sure that we can
    // write the result to the requested destination.
    for path in std::iter::once(&args.out).chain(&args.sum_dist) {
        if let Some(dir) = path.parent() {
            create_dir_all(dir).with_context(|| format!("Can't write to {}", path.display()))?;
        }
    }

    // --- Inputs ------------------------------------------------------------------------
    timing.start("Reading sinogram");
    let sinogram = io::read_sinogram(&args.input, config.sinogram)
        .with_context(|| format!("Can't read sinogram from {}", args.input.display()))?;
    timing.done();

    let n_slices = sinogram.n_slices();
    let initial = match &args.initial {
        Some(path) => io::read_volume(path, n_slices, shape)
            .with_context(|| format!("Can't read initial estimate from {}", path.display()))?,
        None => ReconVolume::zeros(n_slices, shape)?,
    };

    // --- Iterate -----------------------------------------------------------------------
    timing.start("Reconstructing");
    let mut reconstructor = GradientReconstructor::new(&sinogram, &geometry, initial, config.step, backend)?;
    let progress = Progress::new(config.iterations);
    let mut residuals = Vec::with_capacity(config.iterations);
    for _ in 0..config.iterations {
        let report = reconstructor.step();
        progress.iteration_done(&report);
        residuals.push(report.residual);
    }
    progress.final_report(residuals.first().copied(), residuals.last().copied());
    let Reconstruction { volume, sum_dist } = reconstructor.finish();
    timing.done();

    // --- Outputs -----------------------------------------------------------------------
    timing.start(&format!("Writing reconstruction to {}", args.out.display()));
    io::write_volume(&volume, &args.out)?;
    if let Some(path) = &args.sum_dist {
        io::raw::write(sum_dist.iter().copied(), path)?;
    }
    timing.done();
    Ok(())
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::fs::create_dir_all;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tomograd::{
    backend::Backend,
    config::read_config_file,
    grad::{GradientReconstructor, Reconstruction},
    io,
    utils::timing::Progress as Timing,
    volume::ReconVolume,
};

use cli::Cli;
use progress::Progress;
