//! Loading and saving sinograms and reconstructions as raw `f32` files.

pub mod raw;

/// Read a sinogram of shape `(slices, angles, detectors)`
pub fn read_sinogram(path: &Path, dim: (usize, usize, usize)) -> Result<Sinogram> {
    Sinogram::new(dim, raw::read(path)?)
}

pub fn write_sinogram(sinogram: &Sinogram, path: &Path) -> Result<()> {
    raw::write(sinogram.view().iter().copied(), path)
}

pub fn read_volume(path: &Path, n_slices: usize, shape: GridShape) -> Result<ReconVolume> {
    ReconVolume::new(n_slices, shape, raw::read(path)?)
}

pub fn write_volume(volume: &ReconVolume, path: &Path) -> Result<()> {
    raw::write(volume.iter().copied(), path)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::Error;
    use tempfile::tempdir;

    #[test]
    fn volume_roundtrip_and_shape_check() -> Result<()> {
        let dir = tempdir().map_err(|source| Error::Io { path: "tempdir".into(), source })?;
        let path = dir.path().join("volume.raw");
        let shape = GridShape::new(2, 3);
        let volume = ReconVolume::new(2, shape, (0..12).map(|i| i as f32).collect())?;
        write_volume(&volume, &path)?;
        assert_eq!(read_volume(&path, 2, shape)?, volume);
        // Same bytes, wrong declared shape
        assert!(matches!(read_volume(&path, 3, shape), Err(Error::SizeMismatch { .. })));
        assert!(matches!(read_sinogram(&path, (1, 3, 4)), Ok(_)));
        Ok(())
    }
}

// ----- Imports ------------------------------------------------------------------------------------------
use std::path::Path;

use geometry::GridShape;

use crate::{
    error::Result,
    sinogram::Sinogram,
    volume::ReconVolume,
};
