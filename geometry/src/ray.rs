//! A ray through the grid, defined by a projection angle and a lateral
//! detector position.
//!
//! The ray is obtained by rotating a reference line, parallel to the `x`-axis
//! and displaced laterally by the detector position, through the projection
//! angle. Its end points lie far enough from the origin to be outside any grid
//! of the given shape.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use nalgebra::UnitComplex;

use crate::{GridShape, Point};

/// The order in which crossings of horizontal grid lines (generated in order
/// of increasing `y`) must be walked in order to be sorted by increasing `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOrder {
    /// `x` increases with `y` along the ray
    Forward,
    /// `x` decreases with `y` along the ray
    Reverse,
}

impl MergeOrder {
    /// Classify an angle which has already been reduced modulo 2π (but may
    /// still be negative).
    pub fn of(theta: f32) -> Self {
        let theta = if theta < 0.0 { theta + TAU } else { theta };
        let first = (0.0..FRAC_PI_2).contains(&theta);
        let third = (PI..(PI + FRAC_PI_2)).contains(&theta);
        if first || third { MergeOrder::Forward } else { MergeOrder::Reverse }
    }
}

/// Everything about a projection angle that is shared by all its rays.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub sin: f32,
    pub cos: f32,
    pub order: MergeOrder,
}

impl Projection {
    pub fn new(theta: f32) -> Self {
        let theta = theta % TAU;
        let (sin, cos) = theta.sin_cos();
        Self { sin, cos, order: MergeOrder::of(theta) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub source: Point,
    pub detector: Point,
}

impl Ray {
    pub fn new(projection: &Projection, shape: GridShape, lateral: f32) -> Self {
        let reach = -((shape.nx + shape.ny) as f32);
        let rotation = UnitComplex::from_cos_sin_unchecked(projection.cos, projection.sin);
        Self {
            source  : rotation * Point::new( reach, lateral),
            detector: rotation * Point::new(-reach, lateral),
        }
    }

    /// dy/dx. Infinite for rays parallel to the `y`-axis.
    #[inline]
    pub fn slope(&self) -> f32 {
        (self.source.y - self.detector.y) / (self.source.x - self.detector.x)
    }

    /// dx/dy. Infinite for rays parallel to the `x`-axis.
    #[inline]
    pub fn inverse_slope(&self) -> f32 {
        (self.source.x - self.detector.x) / (self.source.y - self.detector.y)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use float_eq::assert_float_eq;
    use MergeOrder::*;

    #[rstest(/**/ theta, expected,
             case( 0.0          , Forward),
             case( 0.3          , Forward),
             case( FRAC_PI_2 + 0.01, Reverse),
             case( 3.0          , Reverse),
             case( PI           , Forward),
             case( 4.0          , Forward),
             case( 5.0          , Reverse),
             case(-0.3          , Reverse),
             case(-2.0          , Forward),
             case(-FRAC_PI_2 + 0.01, Reverse),
             case( 7.0 % TAU    , Forward),
    )]
    fn merge_order(theta: f32, expected: MergeOrder) {
        assert_eq!(MergeOrder::of(theta), expected);
    }

    // The classification must agree with the sign of dx/dy along the ray
    #[rstest(theta, case(0.2), case(1.3), case(1.9), case(2.8), case(3.5), case(4.5), case(5.0), case(6.0))]
    fn merge_order_matches_ray_direction(theta: f32) {
        let projection = Projection::new(theta);
        let ray = Ray::new(&projection, GridShape::new(8, 8), 0.3);
        let expected = if ray.inverse_slope() > 0.0 { Forward } else { Reverse };
        assert_eq!(projection.order, expected);
    }

    #[test]
    fn ray_at_zero_angle_is_horizontal() {
        let projection = Projection::new(0.0);
        let ray = Ray::new(&projection, GridShape::new(3, 4), 1.25);
        assert_float_eq!(ray.source.x  , -7.0 , ulps <= 1);
        assert_float_eq!(ray.detector.x,  7.0 , ulps <= 1);
        assert_float_eq!(ray.source.y  , 1.25, ulps <= 1);
        assert_float_eq!(ray.detector.y, 1.25, ulps <= 1);
        assert_eq!(ray.slope(), 0.0);
        assert!(ray.inverse_slope().is_infinite());
    }

    #[test]
    fn ray_end_points_clear_the_grid() {
        let shape = GridShape::new(10, 6);
        for k in 0..16 {
            let projection = Projection::new(k as f32 * 0.4);
            let ray = Ray::new(&projection, shape, 2.0);
            for p in [ray.source, ray.detector] {
                assert!(p.coords.norm() > 8.0);
            }
        }
    }

    #[test]
    fn angles_are_reduced_modulo_tau() {
        let a = Projection::new(1.0);
        let b = Projection::new(1.0 + 2.0 * TAU);
        assert_float_eq!(a.sin, b.sin, abs <= 1e-5);
        assert_float_eq!(a.cos, b.cos, abs <= 1e-5);
        assert_eq!(a.order, b.order);
    }
}
