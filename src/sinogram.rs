//! Projection data and the acquisition geometry that produced it.

use ndarray::{Array3, ArrayView2, ArrayView3, Axis};

use crate::error::{positive, same_size, try_zeros, Error, Result};

/// Detector readings indexed `[slice, angle, detector]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sinogram {
    data: Array3<f32>,
}

impl Sinogram {

    pub fn new(dim: (usize, usize, usize), data: Vec<f32>) -> Result<Self> {
        let expected = Self::validate(dim)?;
        same_size("sinogram", expected, data.len())?;
        Ok(Self { data: Array3::from_shape_vec(dim, data)? })
    }

    pub fn zeros(dim: (usize, usize, usize)) -> Result<Self> {
        Self::validate(dim)?;
        let (dy, dt, dx) = dim;
        Ok(Self { data: try_zeros("sinogram", [dy, dt, dx])? })
    }

    fn validate((dy, dt, dx): (usize, usize, usize)) -> Result<usize> {
        positive("slices"   , dy)?;
        positive("angles"   , dt)?;
        positive("detectors", dx)?;
        dy.checked_mul(dt).and_then(|n| n.checked_mul(dx))
            .ok_or(Error::Allocation { what: "sinogram", elements: usize::MAX })
    }

    /// `(slices, angles, detectors)`
    pub fn dim(&self) -> (usize, usize, usize) { self.data.dim() }

    pub fn n_slices   (&self) -> usize { self.data.len_of(Axis(0)) }
    pub fn n_angles   (&self) -> usize { self.data.len_of(Axis(1)) }
    pub fn n_detectors(&self) -> usize { self.data.len_of(Axis(2)) }

    pub fn view(&self) -> ArrayView3<f32> { self.data.view() }

    /// Readings of one slice, indexed `[angle, detector]`
    pub fn slice(&self, s: usize) -> ArrayView2<f32> { self.data.index_axis(Axis(0), s) }

    pub(crate) fn from_array(data: Array3<f32>) -> Self { Self { data } }
}

/// Per-slice rotation centres (in detector pixels) and per-angle projection
/// angles (in radians).
#[derive(Clone, Debug, PartialEq)]
pub struct ScanGeometry {
    centers: Vec<f32>,
    angles: Vec<f32>,
}

impl ScanGeometry {

    pub fn new(centers: Vec<f32>, angles: Vec<f32>) -> Result<Self> {
        positive("center count", centers.len())?;
        positive("angle count" , angles .len())?;
        Ok(Self { centers, angles })
    }

    pub fn centers(&self) -> &[f32] { &self.centers }
    pub fn angles (&self) -> &[f32] { &self.angles  }

    pub fn n_slices(&self) -> usize { self.centers.len() }
    pub fn n_angles(&self) -> usize { self.angles .len() }

    /// Make sure that `sinogram` was acquired with this geometry
    pub fn check(&self, sinogram: &Sinogram) -> Result<()> {
        same_size("center offsets", sinogram.n_slices(), self.n_slices())?;
        same_size("angles"        , sinogram.n_angles(), self.n_angles())
    }
}
