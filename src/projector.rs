//! Projections of reconstruction slices along the rays of a parallel-beam scan.
//!
//! + `intersect` finds the pixels crossed by a single ray, and the length of
//!   ray within each of them.
//!
//! + `forward` turns those segments into line integrals through an image, and
//!   spreads per-ray values back over the image.
//!
//! `project_volume` combines both to simulate the sinogram of a whole volume.

pub mod intersect;
pub mod forward;

pub use intersect::{RayTracer, Segment};
pub use forward::{forward_project, back_project, add_coverage, squared_length};

/// Simulate the sinogram which a scan with the given `geometry` would record
/// for `volume`, using `n_detectors` detector pixels per projection.
///
/// Slices are projected in parallel.
pub fn project_volume(volume: &ReconVolume, geometry: &ScanGeometry, n_detectors: usize) -> Result<Sinogram> {
    same_size("center offsets", volume.n_slices(), geometry.n_slices())?;
    let shape = volume.shape();
    let grid = GridLines::new(shape);
    let projections: Vec<Projection> = geometry.angles().iter().copied().map(Projection::new).collect();

    let mut sinogram = try_zeros("sinogram", [geometry.n_slices(), geometry.n_angles(), positive("detector count", n_detectors)?])?;

    sinogram.axis_iter_mut(Axis(0)).into_par_iter()
        .zip(volume.view().axis_iter(Axis(0)).into_par_iter())
        .zip(geometry.centers().par_iter())
        .for_each_init(
            || RayTracer::new(shape),
            |tracer, ((mut sino, image), &center)| {
                project_slice(tracer, &grid, &projections, center, &image, &mut sino)
            });

    Ok(Sinogram::from_array(sinogram))
}

/// Fill `sino` (indexed `[angle, detector]`) with the projections of one slice.
pub(crate) fn project_slice(
    tracer     : &mut RayTracer,
    grid       : &GridLines,
    projections: &[Projection],
    center     : f32,
    image      : &ArrayView2<f32>,
    sino       : &mut ArrayViewMut2<f32>,
) {
    let n_detectors = sino.len_of(Axis(1));
    let offset = detector_offset(n_detectors, center);
    for (projection, mut row) in projections.iter().zip(sino.outer_iter_mut()) {
        for (d, reading) in row.iter_mut().enumerate() {
            let segments = tracer.trace(grid, projection, lateral_position(n_detectors, d, offset));
            *reading = forward_project(segments, image);
        }
    }
}


// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::{ArrayView2, ArrayViewMut2, Axis};
use rayon::prelude::*;

use geometry::{detector_offset, lateral_position, GridLines, Projection};
#[cfg(test)] use geometry::GridShape;

use crate::{
    error::{positive, same_size, try_zeros, Result},
    sinogram::{ScanGeometry, Sinogram},
    volume::ReconVolume,
};
#[cfg(test)] use crate::error::Error;
