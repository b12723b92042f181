//! Read / write float arrays as raw little-endian binary

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io { path: path.into(), source }
}

pub fn write(data: impl IntoIterator<Item = f32>, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut buf = BufWriter::new(file);
    for datum in data {
        buf.write_all(&datum.to_le_bytes()).map_err(io_error(path))?;
    }
    buf.flush().map_err(io_error(path))
}

/// Stream the values stored in `path`. A trailing partial value is ignored.
pub fn values(path: &Path) -> Result<impl Iterator<Item = Result<f32>> + '_> {
    let file = File::open(path).map_err(io_error(path))?;
    let mut buf = BufReader::new(file);
    let mut buffer = [0; 4];

    Ok(std::iter::from_fn(move || {
        use std::io::ErrorKind::UnexpectedEof;
        match buf.read_exact(&mut buffer) {
            Ok(()) => Some(Ok(f32::from_le_bytes(buffer))),
            Err(e) if e.kind() == UnexpectedEof => None,
            Err(e) => Some(Err(io_error(path)(e))),
        }
    }))
}

pub fn read(path: &Path) -> Result<Vec<f32>> {
    values(path)?.collect()
}
