//! Find the pixels crossed by a single ray, and the length of ray in each.
//!
//! The algorithm works in four stages, each filling a scratch buffer owned by
//! `RayTracer`:
//!
//! 1. Find where the (infinite) ray crosses every horizontal and every vertical
//!    grid line.
//!
//! 2. Keep only those crossings which lie inside the grid. Crossings of
//!    horizontal lines (the A-list) are generated in order of increasing `y`,
//!    crossings of vertical lines (the B-list) in order of increasing `x`.
//!
//! 3. Merge both lists into a single sequence ordered by `x`. Depending on the
//!    direction of the ray, the A-list may need to be walked backwards to be
//!    sorted by `x`: this is what `MergeOrder` encodes. Both lists are already
//!    sorted, so a two-way merge suffices.
//!
//! 4. Consecutive points in the merged sequence bound one segment of the ray,
//!    which lies within a single pixel. Its length is the distance between the
//!    points, and its pixel is the one containing the segment's midpoint.

use itertools::Itertools;

use geometry::{distance, midpoint, GridLines, GridShape, MergeOrder, Point, Projection, Ray};

use crate::index::{index2_to_1, Index1, Index2};

/// Crossings closer than this to the outer boundary of the grid are discarded,
/// so that no zero-length segments are generated at the edges.
pub const MARGIN: f32 = 0.01;

/// The part of a ray which lies within a single pixel
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub index: Index2,
    pub length: f32,
}

impl Segment {
    /// Position of this segment's pixel in a flattened slice
    #[inline]
    pub fn pixel(&self, shape: GridShape) -> Index1 {
        index2_to_1(self.index, [shape.nx, shape.ny])
    }
}

/// Reusable scratch space for tracing rays through a grid of fixed shape.
///
/// Allocating these buffers anew for every ray has a noticeable runtime cost,
/// so they are created once (per thread) and reused.
pub struct RayTracer {
    shape: GridShape,
    /// `x` of the ray's crossing with each horizontal grid line
    crossings_x: Vec<f32>,
    /// `y` of the ray's crossing with each vertical grid line
    crossings_y: Vec<f32>,
    a: Vec<Point>,
    b: Vec<Point>,
    merged: Vec<Point>,
    segments: Vec<Segment>,
}

impl RayTracer {

    pub fn new(shape: GridShape) -> Self {
        let n = shape.max_crossings();
        Self {
            shape,
            crossings_x: Vec::with_capacity(shape.ny + 1),
            crossings_y: Vec::with_capacity(shape.nx + 1),
            a:           Vec::with_capacity(n),
            b:           Vec::with_capacity(n),
            merged:      Vec::with_capacity(n),
            segments:    Vec::with_capacity(n),
        }
    }

    pub fn shape(&self) -> GridShape { self.shape }

    /// Segments of the ray with the given projection angle and lateral
    /// detector position. Empty if the ray misses the grid.
    pub fn trace(&mut self, grid: &GridLines, projection: &Projection, lateral: f32) -> &[Segment] {
        debug_assert_eq!(grid.shape(), self.shape);
        let ray = Ray::new(projection, self.shape, lateral);
        self.find_crossings(&ray, grid);
        self.trim(grid);
        self.merge(projection.order);
        self.make_segments();
        &self.segments
    }

    /// Crossings with horizontal grid lines which lie inside the grid
    pub fn a_list(&self) -> &[Point] { &self.a }

    /// Crossings with vertical grid lines which lie inside the grid
    pub fn b_list(&self) -> &[Point] { &self.b }

    /// All crossings inside the grid, ordered along the ray
    pub fn merged(&self) -> &[Point] { &self.merged }

    pub fn segments(&self) -> &[Segment] { &self.segments }

    fn find_crossings(&mut self, ray: &Ray, grid: &GridLines) {
        let (slope, inverse_slope) = (ray.slope(), ray.inverse_slope());
        let (source_x, source_y) = (ray.source.x, ray.source.y);

        self.crossings_x.clear();
        self.crossings_x.extend(grid.y().iter().map(|&y| inverse_slope * (y - source_y) + source_x));

        self.crossings_y.clear();
        self.crossings_y.extend(grid.x().iter().map(|&x| slope * (x - source_x) + source_y));
    }

    fn trim(&mut self, grid: &GridLines) {
        let inside = |lines: &[f32]| (lines[0] + MARGIN)..=(lines[lines.len() - 1] - MARGIN);
        let (inside_x, inside_y) = (inside(grid.x()), inside(grid.y()));

        // NaNs (rays parallel to a grid line) fail `contains`, and are dropped
        self.a.clear();
        self.a.extend(self.crossings_x.iter().zip(grid.y())
                      .filter(|(x, _)| inside_x.contains(*x))
                      .map(|(&x, &y)| Point::new(x, y)));

        self.b.clear();
        self.b.extend(grid.x().iter().zip(&self.crossings_y)
                      .filter(|(_, y)| inside_y.contains(*y))
                      .map(|(&x, &y)| Point::new(x, y)));
    }

    fn merge(&mut self, order: MergeOrder) {
        let before = |p: &&Point, q: &&Point| p.x < q.x;
        self.merged.clear();
        match order {
            MergeOrder::Forward => self.merged.extend(self.a.iter()      .merge_by(&self.b, before)),
            MergeOrder::Reverse => self.merged.extend(self.a.iter().rev().merge_by(&self.b, before)),
        }
    }

    fn make_segments(&mut self) {
        let GridShape { nx, ny } = self.shape;
        let (half_x, half_y) = (0.5 * nx as f32, 0.5 * ny as f32);
        self.segments.clear();
        for pair in self.merged.windows(2) {
            let (p, q) = (&pair[0], &pair[1]);
            let mid = midpoint(p, q);
            let ix = cell(mid.x + half_x);
            let iy = cell(mid.y + half_y);
            // Skip problematic rays: floating-point noise can, in principle,
            // put a midpoint outside of the grid.
            if ix < 0 || iy < 0 || ix as usize >= nx || iy as usize >= ny {
                self.segments.clear();
                return;
            }
            self.segments.push(Segment {
                index: [ix as usize, iy as usize],
                length: distance(p, q),
            });
        }
    }
}

/// Index of the cell containing `x`, in units where cells have unit width and
/// the first cell starts at 0.
///
/// Truncates towards zero, then corrects values which were truncated upwards
/// (negative non-integers), so the result is `floor(x)`. Exact integers belong
/// to the cell they start.
#[inline]
fn cell(x: f32) -> i32 {
    let i = x as i32;
    i - ((i as f32) > x) as i32
}
