//! Iterative gradient-descent reconstruction of parallel-beam sinograms.
//!
//! Each iteration is one pass through three stages, separated by barriers:
//!
//! 1. Sweep: every ray is traced and forward-projected through the current
//!    estimate. The residuals against the measurements are backprojected into
//!    a gradient (see `backend`).
//!
//! 2. Step size: one `lambda` per slice, either fixed or estimated from the
//!    change in estimate and gradient since the previous iteration
//!    (Barzilai-Borwein).
//!
//! 3. Update: `estimate -= lambda * gradient`, slice by slice.
//!
//! Internally the estimate is kept divided by the normalization factor `r`
//! (see `scale`); it is returned to the caller's scale by `finish`.

/// Step length used on the first iteration of adaptive stepping, before any
/// history exists.
pub const BOOTSTRAP_STEP: f32 = 1e-3;

/// How the step length `lambda` is chosen on every iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepSize {
    /// Per-slice Barzilai-Borwein estimate, after a first step of `BOOTSTRAP_STEP`
    Adaptive,
    /// The same step for every slice and iteration
    Fixed(f32),
}

impl StepSize {
    /// Interpret the first regularization parameter: negative selects
    /// adaptive stepping, anything else is used as a fixed step.
    pub fn from_reg_pars(reg_pars: &[f32]) -> Result<Self> {
        match reg_pars.first() {
            None                        => Err(Error::MissingStepPolicy),
            Some(&p) if !p.is_finite() => Err(Error::InvalidStep(p)),
            Some(&p) if p < 0.0        => Ok(StepSize::Adaptive),
            Some(&p)                    => Ok(StepSize::Fixed(p)),
        }
    }

    fn validate(self) -> Result<Self> {
        match self {
            StepSize::Fixed(p) if !p.is_finite() || p < 0.0 => Err(Error::InvalidStep(p)),
            _ => Ok(self),
        }
    }
}

/// Normalization factor `r = 1 / sqrt(dx * dt / 2)`, which makes the scaled
/// projector and its adjoint roughly inverse to each other.
pub fn scale(n_angles: usize, n_detectors: usize) -> f32 {
    (1.0 / (n_detectors as f64 * n_angles as f64 / 2.0).sqrt()) as f32
}

/// What happened in one iteration
#[derive(Clone, Debug, PartialEq)]
pub struct IterationReport {
    /// Counting from 0
    pub iteration: usize,
    /// Sum over all rays of the squared difference between simulated and
    /// measured readings, before this iteration's update
    pub residual: f64,
    /// Step length used for each slice
    pub lambdas: Vec<f32>,
}

/// Final state of a reconstruction
#[derive(Clone, Debug)]
pub struct Reconstruction {
    /// In the caller's scale
    pub volume: ReconVolume,
    /// Length of ray through each pixel during the last sweep, per slice.
    /// All zero if no iteration was run.
    pub sum_dist: Array3<f32>,
}

/// Result of `reconstruct`
#[derive(Clone, Debug)]
pub struct Report {
    pub reconstruction: Reconstruction,
    pub iterations: Vec<IterationReport>,
}

impl Report {
    pub fn residuals(&self) -> impl Iterator<Item = f64> + '_ {
        self.iterations.iter().map(|i| i.residual)
    }
}

pub struct GradientReconstructor<'a, B> {
    sinogram   : &'a Sinogram,
    geometry   : &'a ScanGeometry,
    backend    : B,
    step_size  : StepSize,
    grid       : GridLines,
    projections: Vec<Projection>,
    scale      : f32,
    /// Current estimate, divided by `scale`
    estimate         : ReconVolume,
    previous_estimate: Array3<f32>,
    previous_gradient: Array3<f32>,
    buffers    : SweepBuffers,
    lambdas    : Vec<f32>,
    iteration  : usize,
}

impl<'a, B: Backend> GradientReconstructor<'a, B> {

    /// Validate the inputs, allocate working buffers and bring `initial` into
    /// the internal scale.
    pub fn new(
        sinogram : &'a Sinogram,
        geometry : &'a ScanGeometry,
        initial  : ReconVolume,
        step_size: StepSize,
        backend  : B,
    ) -> Result<Self> {
        geometry.check(sinogram)?;
        same_size("slices in initial estimate", sinogram.n_slices(), initial.n_slices())?;
        let step_size = step_size.validate()?;

        let (n_slices, n_angles, n_detectors) = sinogram.dim();
        let shape = initial.shape();
        let scale = scale(n_angles, n_detectors);

        let mut estimate = initial;
        estimate.view_mut().mapv_inplace(|x| x / scale);
        let mut previous_estimate = try_zeros("previous estimate", [n_slices, shape.nx, shape.ny])?;
        previous_estimate.assign(&estimate.view());

        Ok(Self {
            sinogram,
            geometry,
            backend,
            step_size,
            grid: GridLines::new(shape),
            projections: geometry.angles().iter().copied().map(Projection::new).collect(),
            scale,
            estimate,
            previous_estimate,
            previous_gradient: try_zeros("previous gradient", [n_slices, shape.nx, shape.ny])?,
            buffers: SweepBuffers::new(n_slices, shape, n_angles, n_detectors)?,
            lambdas: vec![0.0; n_slices],
            iteration: 0,
        })
    }

    /// Number of completed iterations
    pub fn iteration(&self) -> usize { self.iteration }

    pub fn scale(&self) -> f32 { self.scale }

    /// Forward projection of the estimate, as of the latest sweep
    pub fn simulated(&self) -> ArrayView3<f32> { self.buffers.simulated.view() }

    /// Perform one Sweep, StepSizeCompute, Update cycle.
    pub fn step(&mut self) -> IterationReport {
        let problem = Problem {
            sinogram   : self.sinogram,
            geometry   : self.geometry,
            grid       : &self.grid,
            projections: &self.projections,
            scale      : self.scale,
        };
        let residual = self.backend.sweep(&problem, self.estimate.view(), &mut self.buffers);

        self.compute_step_sizes();

        self.previous_estimate.assign(&self.estimate.view());
        let gradient = &self.buffers.gradient;
        for ((mut slice, gradient), &lambda) in self.estimate.view_mut().outer_iter_mut()
            .zip(gradient.outer_iter())
            .zip(&self.lambdas)
        {
            Zip::from(&mut slice).and(&gradient).for_each(|x, &g| *x -= lambda * g);
        }
        // The current gradient becomes the previous one; the stale buffer is
        // cleared by the next sweep.
        std::mem::swap(&mut self.previous_gradient, &mut self.buffers.gradient);

        let report = IterationReport { iteration: self.iteration, residual, lambdas: self.lambdas.clone() };
        debug!(iteration = report.iteration, residual, lambdas = ?report.lambdas, "gradient step");
        self.iteration += 1;
        report
    }

    fn compute_step_sizes(&mut self) {
        match self.step_size {
            StepSize::Fixed(lambda)                   => self.lambdas.fill(lambda),
            StepSize::Adaptive if self.iteration == 0 => self.lambdas.fill(BOOTSTRAP_STEP),
            StepSize::Adaptive => {
                for (s, lambda) in self.lambdas.iter_mut().enumerate() {
                    let estimate_change = (self.estimate.slice(s), self.previous_estimate.index_axis(Axis(0), s));
                    let gradient_change = (self.buffers.gradient.index_axis(Axis(0), s), self.previous_gradient.index_axis(Axis(0), s));
                    match barzilai_borwein(estimate_change, gradient_change) {
                        Some(estimate) => *lambda = estimate,
                        None => warn!(slice = s, iteration = self.iteration, lambda = *lambda,
                                      "degenerate adaptive step size, reusing previous value"),
                    }
                }
            }
        }
    }

    /// Undo the internal scaling, and hand back the estimate.
    pub fn finish(self) -> Reconstruction {
        let Self { mut estimate, buffers, scale, iteration, .. } = self;
        estimate.view_mut().mapv_inplace(|x| x * scale);
        // `sum_dist` is only cleared at the start of a sweep, so it still
        // describes the last one.
        let sum_dist = buffers.sum_dist;
        debug!(iterations = iteration, "reconstruction finished");
        Reconstruction { volume: estimate, sum_dist }
    }
}

/// `Σ(x - x0)(g - g0) / Σ(g - g0)²` over the pixels of one slice.
///
/// `None` when the denominator vanishes or the estimate is not finite.
fn barzilai_borwein(
    (x, x0): (ArrayView2<f32>, ArrayView2<f32>),
    (g, g0): (ArrayView2<f32>, ArrayView2<f32>),
) -> Option<f32> {
    let mut numerator   = 0.0_f32;
    let mut denominator = 0.0_f64;
    Zip::from(&x).and(&x0).and(&g).and(&g0).for_each(|&x, &x0, &g, &g0| {
        let dg = g - g0;
        numerator   += (x - x0) * dg;
        denominator += f64::from(dg * dg);
    });
    if denominator == 0.0 { return None }
    let lambda = (f64::from(numerator) / denominator) as f32;
    lambda.is_finite().then_some(lambda)
}

/// Run `iterations` steps of gradient descent from `initial`.
pub fn reconstruct<B: Backend>(
    sinogram  : &Sinogram,
    geometry  : &ScanGeometry,
    initial   : ReconVolume,
    iterations: usize,
    step_size : StepSize,
    backend   : B,
) -> Result<Report> {
    let mut reconstructor = GradientReconstructor::new(sinogram, geometry, initial, step_size, backend)?;
    let iterations = (0..iterations).map(|_| reconstructor.step()).collect();
    Ok(Report { reconstruction: reconstructor.finish(), iterations })
}


// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::{Array3, ArrayView2, ArrayView3, Axis, Zip};
use tracing::{debug, warn};

use geometry::{GridLines, Projection};
#[cfg(test)] use geometry::GridShape;

use crate::{
    backend::{Backend, Problem, SweepBuffers},
    error::{same_size, try_zeros, Error, Result},
    sinogram::{ScanGeometry, Sinogram},
    volume::ReconVolume,
};
