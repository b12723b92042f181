//! Reconstruction over flat, caller-owned buffers.
//!
//! Layouts are row-major: the sinogram is `[slice][angle][detector]`, the
//! reconstruction `[slice][ix][iy]`.

/// Run `num_iter` iterations of gradient descent on `recon`, in place, on a
/// single thread.
///
/// `reg_pars[0] < 0` selects adaptive step sizes; otherwise `reg_pars[0]` is
/// used as a fixed step. On error `recon` is left untouched.
#[allow(clippy::too_many_arguments)]
pub fn grad(
    data    : &[f32],
    dy      : usize,
    dt      : usize,
    dx      : usize,
    center  : &[f32],
    theta   : &[f32],
    recon   : &mut [f32],
    ngridx  : usize,
    ngridy  : usize,
    num_iter: usize,
    reg_pars: &[f32],
) -> Result<()> {
    grad_with(Serial, data, (dy, dt, dx), center, theta, recon, GridShape::new(ngridx, ngridy), num_iter, reg_pars)
}

/// As `grad`, with a choice of backend and with dimensions grouped.
#[allow(clippy::too_many_arguments)]
pub fn grad_with<B: Backend>(
    backend : B,
    data    : &[f32],
    dim     : (usize, usize, usize),
    center  : &[f32],
    theta   : &[f32],
    recon   : &mut [f32],
    shape   : GridShape,
    num_iter: usize,
    reg_pars: &[f32],
) -> Result<()> {
    let step_size = StepSize::from_reg_pars(reg_pars)?;
    let (dy, dt, _) = dim;
    same_size("center offsets", dy, center.len())?;
    same_size("angles"        , dt, theta .len())?;

    let sinogram = Sinogram::new(dim, data.to_vec())?;
    let geometry = ScanGeometry::new(center.to_vec(), theta.to_vec())?;
    let initial = ReconVolume::new(dy, shape, recon.to_vec())?;

    let report = reconstruct(&sinogram, &geometry, initial, num_iter, step_size, backend)?;
    for (out, &x) in recon.iter_mut().zip(report.reconstruction.volume.iter()) {
        *out = x;
    }
    Ok(())
}


// ----- Imports ------------------------------------------------------------------------------------------
use geometry::GridShape;

use crate::{
    backend::{Backend, Serial},
    error::{same_size, Result},
    grad::{reconstruct, StepSize},
    sinogram::{ScanGeometry, Sinogram},
    volume::ReconVolume,
};
