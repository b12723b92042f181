//! Configuration file parser for gradient-descent reconstruction

use std::fs;
use std::f32::consts::PI;
use std::path::Path;

use serde::{Deserialize, Deserializer, de};

use geometry::GridShape;

use crate::{
    backend::{Backend, BackendKind},
    error::{positive, same_size, Error, Result},
    grad::StepSize,
    sinogram::ScanGeometry,
};

fn deserialize_step<'d, D>(deserializer: D) -> std::result::Result<StepSize, D::Error>
where
    D: Deserializer<'d>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Step { Named(String), Fixed(f32) }

    match Step::deserialize(deserializer)? {
        Step::Named(name) if name == "adaptive"   => Ok(StepSize::Adaptive),
        Step::Fixed(value) if value.is_finite() && value >= 0.0 => Ok(StepSize::Fixed(value)),
        Step::Named(name) => Err(de::Error::custom(format!("unknown step `{name}`: expected \"adaptive\" or a non-negative number"))),
        Step::Fixed(value) => Err(de::Error::custom(format!("fixed step must be a non-negative number, got {value}"))),
    }
}

fn adaptive() -> StepSize { StepSize::Adaptive }

#[derive(Deserialize, Debug, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {

    /// Number of gradient-descent iterations to perform
    pub iterations: usize,

    /// Reconstruction grid `[ngridx, ngridy]`
    pub grid: (usize, usize),

    /// Shape of the raw sinogram `[slices, angles, detectors]`
    pub sinogram: (usize, usize, usize),

    /// `"adaptive"` or a fixed step length
    #[serde(default = "adaptive")]
    #[serde(deserialize_with = "deserialize_step")]
    pub step: StepSize,

    /// Projection angles in radians. Half a turn, evenly sampled, if omitted.
    pub angles: Option<Angles>,

    /// Rotation centre in detector pixels. Middle of the detector, if omitted.
    pub center: Option<Center>,

    #[serde(default)]
    pub backend: BackendKind,

    /// Size of the thread pool used by the parallel backend
    pub threads: Option<usize>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Angles {
    /// Every angle given explicitly
    List(Vec<f32>),
    /// `count` angles `start + k * span / count`, for `k` in `0..count`
    Range { start: f32, span: f32, count: usize },
}

impl Angles {
    pub fn values(&self) -> Vec<f32> {
        match self {
            Angles::List(angles) => angles.clone(),
            &Angles::Range { start, span, count } => (0..count)
                .map(|k| start + k as f32 * span / count as f32)
                .collect(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum Center {
    /// Shared by all slices
    Single(f32),
    PerSlice(Vec<f32>),
}

impl Config {

    pub fn grid_shape(&self) -> GridShape {
        let (nx, ny) = self.grid;
        GridShape::new(nx, ny)
    }

    /// Per-slice centres and per-angle rotations, checked against the
    /// declared sinogram shape.
    pub fn scan_geometry(&self) -> Result<ScanGeometry> {
        let (dy, dt, dx) = self.sinogram;
        positive("slices"   , dy)?;
        positive("angles"   , dt)?;
        positive("detectors", dx)?;

        let angles = match &self.angles {
            Some(angles) => angles.values(),
            None => Angles::Range { start: 0.0, span: PI, count: dt }.values(),
        };
        same_size("angles", dt, angles.len())?;

        let centers = match &self.center {
            Some(Center::PerSlice(centers)) => centers.clone(),
            Some(Center::Single(center))    => vec![*center; dy],
            None                            => vec![(dx as f32 - 1.0) * 0.5; dy],
        };
        same_size("center offsets", dy, centers.len())?;

        ScanGeometry::new(centers, angles)
    }

    pub fn backend(&self) -> Result<Box<dyn Backend + Send + Sync>> {
        if self.threads == Some(0) {
            return Err(Error::Config("`threads` must be positive".into()));
        }
        self.backend.build(self.threads)
    }
}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let config = fs::read_to_string(path)
        .map_err(|source| Error::Io { path: path.into(), source })?;
    Ok(toml::from_str(&config)?)
}


#[cfg(test)]
mod tests {
    use super::*;
    #[allow(unused)] use pretty_assertions::{assert_eq, assert_ne};

    // ----- Test an example on-disk config file -----------------------------------------
    #[test]
    fn test_config_file() -> Result<()> {
        let config = read_config_file("grad-config.toml".as_ref())?;
        assert_eq!(config.iterations, 50);
        assert_eq!(config.grid, (128, 128));
        assert_eq!(config.sinogram, (4, 180, 181));
        assert_eq!(config.step, StepSize::Adaptive);
        assert_eq!(config.backend, BackendKind::Parallel);
        assert_eq!(config.threads, Some(4));
        let geometry = config.scan_geometry()?;
        assert_eq!(geometry.n_angles(), 180);
        assert_eq!(geometry.centers(), &[90.0; 4]);
        Ok(())
    }

    #[test]
    fn missing_config_file_names_the_path() {
        let err = read_config_file("no/such/file.toml".as_ref()).unwrap_err();
        assert!(err.to_string().contains("no/such/file.toml"));
    }

    // ----- Some helpers to make the tests more concise ---------------------------------
    const REQUIRED: &str = "
        iterations = 10
        grid = [8, 6]
        sinogram = [2, 3, 5]
    ";
    //  ---  Parse string as TOML, prefixed with the mandatory fields --------------------
    fn parse(input: &str) -> Config {
        parse_carefully(input).unwrap()
    }
    //  ---  Parse string as TOML, with explicit error reporting -------------------------
    fn parse_carefully(input: &str) -> std::result::Result<Config, toml::de::Error> {
        toml::from_str(&format!("{REQUIRED}\n{input}"))
    }
    //  ---  Macro for concise assertions about values of parsed fields ------------------
    macro_rules! check {
        ($text:expr => $field:ident = $expected:expr) => {
            let config = parse($text);
            println!("DESERIALIZED: {config:?}");
            assert_eq!(config.$field, $expected);
        };
        ($text:expr => fields: $($field:ident = $expected:expr);+$(;)?) => {
            let config = parse($text);
            println!("DESERIALIZED: {config:?}");
            $(assert_eq!(config.$field, $expected);)*
        }
    }
    // ----- Test deserializing of individual aspects of the Config type ----------------
    #[test]
    fn config_defaults() {
        check!{"" => fields:
               iterations = 10;
               grid       = (8, 6);
               sinogram   = (2, 3, 5);
               step       = StepSize::Adaptive;
               angles     = None;
               center     = None;
               backend    = BackendKind::Serial;
               threads    = None;
        }
    }

    #[test]
    fn config_step() {
        check!(r#"step = "adaptive""# => step = StepSize::Adaptive);
        check!(  "step = 0.05"         => step = StepSize::Fixed(0.05));
        check!(  "step = 1"            => step = StepSize::Fixed(1.0));
        assert!(parse_carefully(  "step = -0.1"    ).is_err());
        assert!(parse_carefully(r#"step = "fast""#).is_err());
    }

    #[test]
    fn config_backend() {
        check!(r#"
                 backend = "parallel"
                 threads = 3
               "# => fields:
               backend = BackendKind::Parallel;
               threads = Some(3)
        );
        assert!(parse_carefully(r#"backend = "gpu""#).is_err());
    }
    // ----- Make sure that unknown and missing fields are not accepted ------------------
    #[test]
    fn config_reject_unknown_field() {
        assert!(parse_carefully("unknown_field = 666").is_err());
    }

    #[test]
    fn config_reject_missing_field() {
        assert!(toml::from_str::<Config>("iterations = 3").is_err());
    }
    // ----- Geometry expansion -----------------------------------------------------------
    #[test]
    fn config_angle_list() -> Result<()> {
        let config = parse("angles = [0.0, 1.5, 3.0]");
        assert_eq!(config.scan_geometry()?.angles(), &[0.0, 1.5, 3.0]);
        Ok(())
    }

    #[test]
    fn config_angle_range() -> Result<()> {
        let config = parse("angles = { start = 1.0, span = 3.0, count = 3 }");
        assert_eq!(config.scan_geometry()?.angles(), &[1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn config_default_angles_cover_half_a_turn() -> Result<()> {
        let geometry = parse("").scan_geometry()?;
        assert_eq!(geometry.angles(), &[0.0, PI / 3.0, 2.0 * PI / 3.0]);
        Ok(())
    }

    #[test]
    fn config_wrong_number_of_angles() {
        let config = parse("angles = [0.0, 1.0]");
        assert!(matches!(config.scan_geometry(), Err(Error::SizeMismatch { what: "angles", .. })));
    }

    #[test]
    fn config_centers() -> Result<()> {
        assert_eq!(parse(""                   ).scan_geometry()?.centers(), &[2.0, 2.0]);
        assert_eq!(parse("center = 1.5"       ).scan_geometry()?.centers(), &[1.5, 1.5]);
        assert_eq!(parse("center = [1.0, 2.5]").scan_geometry()?.centers(), &[1.0, 2.5]);
        let too_many = parse("center = [1.0, 2.0, 3.0]");
        assert!(matches!(too_many.scan_geometry(), Err(Error::SizeMismatch { what: "center offsets", .. })));
        Ok(())
    }

    #[test]
    fn config_zero_threads() {
        let config = parse(r#"
                 backend = "parallel"
                 threads = 0
               "#);
        assert!(matches!(config.backend(), Err(Error::Config(_))));
    }
}
