// ----------------------------------- CLI -----------------------------------
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "project", about = "Simulate the parallel-beam sinogram of a reconstruction volume")]
pub struct Cli {

    /// Raw little-endian f32 volume, ordered [slice][ix][iy]
    pub input: PathBuf,

    /// Where to write the sinogram, ordered [slice][angle][detector]
    #[clap(short, long, default_value = "sinogram.raw")]
    pub out: PathBuf,

    /// Number of pixels in each dimension of a slice
    #[clap(short, long, value_parser = parse_pair::<usize>, default_value = "128,128")]
    pub grid: (usize, usize),

    /// Number of slices in the volume
    #[clap(short = 'y', long, default_value = "1")]
    pub slices: usize,

    /// Number of detector pixels per projection
    #[clap(short = 'x', long)]
    pub detectors: usize,

    /// Number of projection angles, evenly spread over `span`
    #[clap(short = 't', long)]
    pub angles: usize,

    /// Angular range covered by the projections, in radians
    #[clap(long, default_value_t = PI)]
    pub span: f32,

    /// Rotation centre in detector pixels. Middle of the detector if omitted
    #[clap(short, long)]
    pub center: Option<f32>,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long)]
    pub threads: Option<usize>,
}

// --------------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Cli::parse();
    let mut progress = Progress::new();

    if let Some(n) = args.threads {
        rayon::ThreadPoolBuilder::new().num_threads(n).build_global()
            .context("Can't configure rayon thread pool")?;
        info!("Using up to {n} threads");
    }

    let (nx, ny) = args.grid;
    let shape = GridShape::new(nx, ny);
    let center = args.center.unwrap_or((args.detectors as f32 - 1.0) * 0.5);
    let angles = Angles::Range { start: 0.0, span: args.span, count: args.angles }.values();
    let geometry = ScanGeometry::new(vec![center; args.slices], angles)?;

    progress.start(&format!("Reading volume from {}", args.input.display()));
    let volume = io::read_volume(&args.input, args.slices, shape)
        .with_context(|| format!("Can't read {} as {} slices of {nx} x {ny} pixels", args.input.display(), args.slices))?;
    progress.done();

    progress.start(&format!("Projecting {} rays", group_digits(args.slices * args.angles * args.detectors)));
    let sinogram = project_volume(&volume, &geometry, args.detectors)?;
    progress.done();

    if let Some(dir) = args.out.parent() {
        create_dir_all(dir).with_context(|| format!("Can't write to {}", args.out.display()))?;
    }
    progress.start(&format!("Writing sinogram to {}", args.out.display()));
    io::write_sinogram(&sinogram, &args.out)?;
    progress.done();
    Ok(())
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::{
    f32::consts::PI,
    fs::create_dir_all,
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geometry::GridShape;
use tomograd::{
    config::Angles,
    io,
    projector::project_volume,
    sinogram::ScanGeometry,
    utils::{group_digits, parse_pair, timing::Progress},
};
