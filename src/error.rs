//! Errors reported by the reconstruction library

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("`{name}` must be positive")]
    NonPositive { name: &'static str },

    #[error("{what} has {actual} elements, expected {expected}")]
    SizeMismatch { what: &'static str, expected: usize, actual: usize },

    #[error("no step-size policy given: regularization parameters are empty")]
    MissingStepPolicy,

    #[error("step size must be finite (and non-negative when fixed), got {0}")]
    InvalidStep(f32),

    #[error("could not allocate {what} ({elements} elements)")]
    Allocation { what: &'static str, elements: usize },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("could not access `{}`", .path.display())]
    Io { path: PathBuf, #[source] source: std::io::Error },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Fail with `NonPositive` unless `value > 0`
pub(crate) fn positive(name: &'static str, value: usize) -> Result<usize> {
    if value > 0 { Ok(value) } else { Err(Error::NonPositive { name }) }
}

/// Fail with `SizeMismatch` unless `actual == expected`
pub(crate) fn same_size(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if actual == expected { Ok(()) }
    else                  { Err(Error::SizeMismatch { what, expected, actual }) }
}

/// A zero-filled working buffer of the given shape. Allocation failure is
/// reported rather than aborting the process.
pub(crate) fn try_zeros(what: &'static str, shape: [usize; 3]) -> Result<ndarray::Array3<f32>> {
    let [a, b, c] = shape;
    let elements = a.checked_mul(b).and_then(|n| n.checked_mul(c))
        .ok_or(Error::Allocation { what, elements: usize::MAX })?;
    let mut data = Vec::new();
    data.try_reserve_exact(elements)
        .map_err(|_| Error::Allocation { what, elements })?;
    data.resize(elements, 0.0);
    Ok(ndarray::Array3::from_shape_vec((a, b, c), data)?)
}
