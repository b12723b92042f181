//! The pixel grid of one slice, and where its detector sits relative to it.
//!
//! Grid coordinates are measured in pixel widths, with the origin at the
//! centre of the grid. Vertical grid lines sit at integer or half-integer `x`
//! (depending on the parity of `nx`), horizontal ones likewise in `y`.

/// Number of pixels along each axis of the reconstruction grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridShape {
    pub nx: usize,
    pub ny: usize,
}

impl GridShape {
    pub fn new(nx: usize, ny: usize) -> Self { Self { nx, ny } }

    pub fn n_pixels(&self) -> usize { self.nx * self.ny }

    /// Upper bound on the number of grid lines any single ray can cross.
    pub fn max_crossings(&self) -> usize { self.nx + self.ny + 2 }
}

/// Coordinates of the `nx + 1` vertical and `ny + 1` horizontal grid lines.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLines {
    shape: GridShape,
    x: Vec<f32>,
    y: Vec<f32>,
}

impl GridLines {
    pub fn new(shape: GridShape) -> Self {
        let lines = |n: usize| (0..=n)
            .map(|i| -(n as f32) * 0.5 + i as f32)
            .collect();
        Self { shape, x: lines(shape.nx), y: lines(shape.ny) }
    }

    pub fn shape(&self) -> GridShape { self.shape }

    /// `x` positions of the vertical lines, increasing
    pub fn x(&self) -> &[f32] { &self.x }

    /// `y` positions of the horizontal lines, increasing
    pub fn y(&self) -> &[f32] { &self.y }
}

/// Offsets whose fractional part falls below this are pushed off the grid
/// lattice, so that no ray runs exactly along a grid line.
pub const NUDGE: f32 = 0.01;

/// Lateral shift of the detector of a slice with `n_detectors` pixels and
/// rotation centre `center`, in grid units.
///
/// Includes the half-pixel shift which puts detector pixel centres on the
/// centres of grid cells.
pub fn detector_offset(n_detectors: usize, center: f32) -> f32 {
    let mut mov = (n_detectors as f32 - 1.0) * 0.5 - center;
    if mov - mov.floor() < NUDGE {
        mov += NUDGE;
    }
    mov + 0.5
}

/// Lateral position of detector pixel `d`, given the slice's `detector_offset`.
#[inline]
pub fn lateral_position(n_detectors: usize, d: usize, offset: f32) -> f32 {
    0.5 * (1.0 - n_detectors as f32) + d as f32 + offset
}
