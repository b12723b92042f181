//! Interchangeable ways of dispatching the per-ray work of one sweep.
//!
//! Every backend runs the same per-slice kernel, `sweep_slice`: only the way
//! slices are handed out differs. Within a slice, rays are always visited in
//! (angle, detector) order, so all backends produce identical results.

/// Read-only inputs shared by every ray of a sweep.
pub struct Problem<'a> {
    pub sinogram   : &'a Sinogram,
    pub geometry   : &'a ScanGeometry,
    pub grid       : &'a GridLines,
    /// One per angle in `geometry`
    pub projections: &'a [Projection],
    /// Normalization factor `r` relating the internal estimate to the measurements
    pub scale      : f32,
}

/// Accumulators filled by one sweep.
pub struct SweepBuffers {
    /// Gradient of the squared residual with respect to the (scaled) estimate
    pub gradient : Array3<f32>,
    /// Total length of ray crossing each pixel
    pub sum_dist : Array3<f32>,
    /// Forward projection of the current estimate, indexed (slice, angle, detector)
    pub simulated: Array3<f32>,
}

/// The slice-sized parts of `SweepBuffers` which one slice's rays write to.
pub struct SliceBuffers<'a> {
    pub gradient : ArrayViewMut2<'a, f32>,
    pub sum_dist : ArrayViewMut2<'a, f32>,
    pub simulated: ArrayViewMut2<'a, f32>,
}

impl SweepBuffers {

    pub fn new(n_slices: usize, shape: GridShape, n_angles: usize, n_detectors: usize) -> Result<Self> {
        let image = [n_slices, shape.nx, shape.ny];
        Ok(Self {
            gradient : try_zeros("gradient", image)?,
            sum_dist : try_zeros("sum_dist", image)?,
            simulated: try_zeros("simulated sinogram", [n_slices, n_angles, n_detectors])?,
        })
    }

    /// Forget the contents of the accumulators
    pub fn clear(&mut self) {
        self.gradient.fill(0.0);
        self.sum_dist.fill(0.0);
        self.simulated.fill(0.0);
    }

    pub fn slices_mut(&mut self) -> impl Iterator<Item = SliceBuffers<'_>> + '_ {
        izip!(self.gradient.outer_iter_mut(), self.sum_dist.outer_iter_mut(), self.simulated.outer_iter_mut())
            .map(|(gradient, sum_dist, simulated)| SliceBuffers { gradient, sum_dist, simulated })
    }

    pub fn par_slices_mut(&mut self) -> impl IndexedParallelIterator<Item = SliceBuffers<'_>> + '_ {
        self.gradient.outer_iter_mut().into_par_iter()
            .zip(self.sum_dist .outer_iter_mut().into_par_iter())
            .zip(self.simulated.outer_iter_mut().into_par_iter())
            .map(|((gradient, sum_dist), simulated)| SliceBuffers { gradient, sum_dist, simulated })
    }
}

/// Forward-project every ray of slice `s` through `estimate`, compare with the
/// measurements and accumulate the gradient contributions of the residuals.
///
/// Returns the sum of squared residuals of the slice.
pub fn sweep_slice(
    problem : &Problem,
    s       : usize,
    estimate: &ArrayView2<f32>,
    tracer  : &mut RayTracer,
    buffers : SliceBuffers,
) -> f64 {
    let SliceBuffers { mut gradient, mut sum_dist, mut simulated } = buffers;
    let measured = problem.sinogram.slice(s);
    let n_detectors = measured.len_of(Axis(1));
    let offset = detector_offset(n_detectors, problem.geometry.centers()[s]);
    let r = problem.scale;

    let mut residual = 0.0_f64;
    for (a, projection) in problem.projections.iter().enumerate() {
        for d in 0..n_detectors {
            let segments = tracer.trace(problem.grid, projection, lateral_position(n_detectors, d, offset));
            let projected = forward_project(segments, estimate);
            simulated[[a, d]] = projected;
            let prox = projected * r - measured[[a, d]];
            residual += f64::from(prox) * f64::from(prox);
            add_coverage(&mut sum_dist, segments);
            if squared_length(segments) != 0.0 {
                back_project(&mut gradient, segments, 2.0 * r * prox);
            }
        }
    }
    residual
}

/// A way of dispatching `sweep_slice` over all slices.
pub trait Backend {
    /// Fill `buffers` from one sweep over every ray of `problem`, and return
    /// the sum of squared residuals.
    fn sweep(&self, problem: &Problem, estimate: ArrayView3<f32>, buffers: &mut SweepBuffers) -> f64;

    fn name(&self) -> &'static str;
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn sweep(&self, problem: &Problem, estimate: ArrayView3<f32>, buffers: &mut SweepBuffers) -> f64 {
        (**self).sweep(problem, estimate, buffers)
    }
    fn name(&self) -> &'static str { (**self).name() }
}

/// Visit slices one after the other, on the calling thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct Serial;

impl Backend for Serial {
    fn sweep(&self, problem: &Problem, estimate: ArrayView3<f32>, buffers: &mut SweepBuffers) -> f64 {
        buffers.clear();
        let mut tracer = RayTracer::new(problem.grid.shape());
        estimate.outer_iter()
            .zip(buffers.slices_mut())
            .enumerate()
            .map(|(s, (image, slice_buffers))| sweep_slice(problem, s, &image, &mut tracer, slice_buffers))
            .sum()
    }

    fn name(&self) -> &'static str { "serial" }
}

/// Distribute slices over `rayon` workers, each with its own ray scratch
/// space.
#[derive(Debug, Default)]
pub struct Parallel {
    /// Dedicated pool. `None` uses rayon's global pool.
    pool: Option<ThreadPool>,
}

impl Parallel {
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let pool = match threads {
            Some(n) => Some(ThreadPoolBuilder::new().num_threads(n).build()?),
            None    => None,
        };
        Ok(Self { pool })
    }

    fn sweep_all(problem: &Problem, estimate: ArrayView3<f32>, buffers: &mut SweepBuffers) -> f64 {
        let shape = problem.grid.shape();
        let residuals: Vec<f64> = estimate.outer_iter().into_par_iter()
            .zip(buffers.par_slices_mut())
            .enumerate()
            .map_init(
                || RayTracer::new(shape),
                |tracer, (s, (image, slice_buffers))| sweep_slice(problem, s, &image, tracer, slice_buffers))
            .collect();
        // Summed in slice order, as `Serial` does
        residuals.into_iter().sum()
    }
}

impl Backend for Parallel {
    fn sweep(&self, problem: &Problem, estimate: ArrayView3<f32>, buffers: &mut SweepBuffers) -> f64 {
        buffers.clear();
        match &self.pool {
            Some(pool) => pool.install(|| Self::sweep_all(problem, estimate, buffers)),
            None       => Self::sweep_all(problem, estimate, buffers),
        }
    }

    fn name(&self) -> &'static str { "parallel" }
}

/// Configuration-time choice of backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Serial,
    Parallel,
}

impl BackendKind {
    /// `threads` is ignored by the serial backend.
    pub fn build(self, threads: Option<usize>) -> Result<Box<dyn Backend + Send + Sync>> {
        Ok(match self {
            BackendKind::Serial   => Box::new(Serial),
            BackendKind::Parallel => Box::new(Parallel::new(threads)?),
        })
    }
}


// ----- Imports ------------------------------------------------------------------------------------------
use itertools::izip;
use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut2, Axis};
use rayon::{prelude::*, ThreadPool, ThreadPoolBuilder};
use serde::Deserialize;

use geometry::{detector_offset, lateral_position, GridLines, GridShape, Projection};

use crate::{
    error::{try_zeros, Result},
    projector::{add_coverage, back_project, forward_project, squared_length, RayTracer},
    sinogram::{ScanGeometry, Sinogram},
};
#[cfg(test)] use crate::{projector::project_volume, volume::ReconVolume};
