//! Forward projection of one ray through one slice, and the matching
//! backprojection of a per-ray value onto the slice.

/// Line integral of `image` along the ray described by `segments`.
///
/// `image` is indexed `[ix, iy]`.
#[inline]
pub fn forward_project(segments: &[Segment], image: &ArrayView2<f32>) -> f32 {
    let mut projection = 0.0;
    for s in segments {
        projection += s.length * image[s.index];
    }
    projection
}

/// Spread `value` over the pixels crossed by the ray, weighted by the length
/// of ray in each pixel.
#[inline]
pub fn back_project(backprojection: &mut ArrayViewMut2<f32>, segments: &[Segment], value: f32) {
    for s in segments {
        backprojection[s.index] += s.length * value;
    }
}

/// Accumulate into `coverage` the length of ray crossing each pixel.
#[inline]
pub fn add_coverage(coverage: &mut ArrayViewMut2<f32>, segments: &[Segment]) {
    back_project(coverage, segments, 1.0);
}

/// Sum of squared segment lengths. Zero for rays which miss the grid.
#[inline]
pub fn squared_length(segments: &[Segment]) -> f32 {
    segments.iter().map(|s| s.length * s.length).sum()
}

#[cfg(test)]
mod test {
    use super::*;
    use float_eq::assert_float_eq;
    use ndarray::{Array2, array};

    fn segments() -> Vec<Segment> {
        vec![
            Segment { index: [0, 1], length: 0.5  },
            Segment { index: [1, 1], length: 1.0  },
            Segment { index: [1, 0], length: 0.25 },
        ]
    }

    #[test]
    fn forward_projection_weights_pixels_by_length() {
        let image = array![[1.0, 2.0],
                           [3.0, 4.0]];
        let p = forward_project(&segments(), &image.view());
        assert_float_eq!(p, 0.5 * 2.0 + 1.0 * 4.0 + 0.25 * 3.0, ulps <= 1);
    }

    #[test]
    fn empty_ray_projects_to_zero() {
        let image = Array2::<f32>::ones((3, 3));
        assert_eq!(forward_project(&[], &image.view()), 0.0);
        assert_eq!(squared_length(&[]), 0.0);
    }

    #[test]
    fn back_projection_accumulates() {
        let mut image = Array2::<f32>::zeros((2, 2));
        back_project(&mut image.view_mut(), &segments(), 2.0);
        back_project(&mut image.view_mut(), &segments(), 2.0);
        assert_eq!(image, array![[0.0, 2.0],
                                 [1.0, 4.0]]);
    }

    #[test]
    fn coverage_is_backprojection_of_one() {
        let mut coverage = Array2::<f32>::zeros((2, 2));
        add_coverage(&mut coverage.view_mut(), &segments());
        assert_eq!(coverage, array![[0.0 , 0.5],
                                    [0.25, 1.0]]);
        assert_float_eq!(squared_length(&segments()), 0.25 + 1.0 + 0.0625, ulps <= 1);
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use ndarray::{ArrayView2, ArrayViewMut2};

use super::intersect::Segment;
