//! Primitive 2D geometry of a single reconstruction slice: the pixel grid, the
//! detector offset of a slice, and the rays which cross the grid.

mod grid;
mod ray;

pub use grid::{GridShape, GridLines, detector_offset, lateral_position, NUDGE};
pub use ray::{Ray, Projection, MergeOrder};

pub type Point = nalgebra::Point2<f32>;

pub use nalgebra::{distance, center as midpoint};
