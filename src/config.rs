//! TOML configuration of the executables

pub mod grad;

pub use grad::{read_config_file, Angles, Center, Config};
