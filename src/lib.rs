//! Gradient-descent tomographic reconstruction of parallel-beam sinograms.
//!
//! + `projector`: tracing rays through the pixel grid, and forward projection
//! + `grad`: the iterative reconstructor, driven by a `backend`
//! + `flat`: the same reconstruction over flat caller-owned buffers

pub mod backend;
pub mod config;
pub mod error;
pub mod flat;
pub mod grad;
pub mod index;
pub mod io;
pub mod projector;
pub mod sinogram;
pub mod utils;
pub mod volume;

pub use error::{Error, Result};
pub use geometry::{GridShape, GridLines};
pub use grad::{reconstruct, GradientReconstructor, StepSize};
pub use sinogram::{ScanGeometry, Sinogram};
pub use volume::ReconVolume;
