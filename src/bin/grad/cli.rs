/// Command line interface for `grad` executable
#[derive(clap::Parser, Debug, Clone)]
#[clap(
    name = "grad",
    about = "Gradient-descent reconstruction of parallel-beam sinograms",
)]
pub(super) struct Cli {
    /// Raw little-endian f32 sinogram, ordered [slice][angle][detector]
    pub input: PathBuf,

    /// TOML file describing the scan and the reconstruction
    #[clap(short, long, default_value = "grad-config.toml")]
    pub config: PathBuf,

    /// Where to write the reconstruction, ordered [slice][ix][iy]
    #[clap(short, long, default_value = "recon.raw")]
    pub out: PathBuf,

    /// Starting estimate. Zeros if omitted
    #[clap(long)]
    pub initial: Option<PathBuf>,

    /// Also write the length of ray through each pixel during the last iteration
    #[clap(long)]
    pub sum_dist: Option<PathBuf>,

    /// Override the number of iterations given in the config file
    #[clap(short = 'n', long)]
    pub iterations: Option<usize>,

    /// Override the backend given in the config file
    #[clap(value_enum, short, long)]
    pub backend: Option<BackendKind>,

    /// Maximum number of rayon threads used by the parallel backend
    #[clap(short = 'j', long)]
    pub threads: Option<usize>,
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::path::PathBuf;

use tomograd::backend::BackendKind;
