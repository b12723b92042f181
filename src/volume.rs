//! The reconstruction estimate: one value per pixel per slice.

use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut3, Axis};

use geometry::GridShape;

use crate::{
    error::{positive, same_size, try_zeros, Error, Result},
    index::Index2,
};

/// A stack of `n_slices` images on a grid of `GridShape`, indexed
/// `[slice, ix, iy]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconVolume {
    shape: GridShape,
    data: Array3<f32>,
}

impl ReconVolume {

    pub fn new(n_slices: usize, shape: GridShape, data: Vec<f32>) -> Result<Self> {
        let expected = Self::validate(n_slices, shape)?;
        same_size("reconstruction", expected, data.len())?;
        let data = Array3::from_shape_vec((n_slices, shape.nx, shape.ny), data)?;
        Ok(Self { shape, data })
    }

    pub fn zeros(n_slices: usize, shape: GridShape) -> Result<Self> {
        Self::validate(n_slices, shape)?;
        let data = try_zeros("reconstruction", [n_slices, shape.nx, shape.ny])?;
        Ok(Self { shape, data })
    }

    fn validate(n_slices: usize, shape: GridShape) -> Result<usize> {
        positive("slices", n_slices)?;
        positive("ngridx", shape.nx)?;
        positive("ngridy", shape.ny)?;
        n_slices.checked_mul(shape.n_pixels())
            .ok_or(Error::Allocation { what: "reconstruction", elements: usize::MAX })
    }

    pub fn n_slices(&self) -> usize { self.data.len_of(Axis(0)) }

    pub fn shape(&self) -> GridShape { self.shape }

    pub fn view(&self) -> ArrayView3<f32> { self.data.view() }

    pub fn view_mut(&mut self) -> ArrayViewMut3<f32> { self.data.view_mut() }

    /// The image of a single slice, indexed `[ix, iy]`
    pub fn slice(&self, s: usize) -> ArrayView2<f32> { self.data.index_axis(Axis(0), s) }

    /// Values in storage order: slice, then `ix`, then `iy`
    pub fn iter(&self) -> impl Iterator<Item = &f32> { self.data.iter() }

    pub fn into_vec(self) -> Vec<f32> { self.data.into_raw_vec() }
}

impl core::ops::Index<(usize, Index2)> for ReconVolume {
    type Output = f32;
    #[inline]
    fn index(&self, (s, [ix, iy]): (usize, Index2)) -> &Self::Output { &self.data[[s, ix, iy]] }
}

impl core::ops::IndexMut<(usize, Index2)> for ReconVolume {
    #[inline]
    fn index_mut(&mut self, (s, [ix, iy]): (usize, Index2)) -> &mut Self::Output { &mut self.data[[s, ix, iy]] }
}
