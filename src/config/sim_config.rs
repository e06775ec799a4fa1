//! Run configuration read from TOML.
//!
//! The file format keeps camelCase keys:
//!
//! ```toml
//! [settings]
//! tStart = 0.0
//! tEnd = 0.5
//! nSteps = 500
//!
//! [geometry]
//! meshName = "bay.msh"
//! borders = [[0.0, 0.45], [0.0, 0.2]]
//! ship = [0.35, 0.44]
//!
//! [IO]
//! writeFrequency = 10
//! ```
//!
//! Deserialisation goes into all-optional raw structs first; validation then
//! turns them into a [`SimConfig`] or reports the first missing key.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Deserialize;

use super::error::ConfigError;
use crate::flux::FluxScheme;
use crate::source::{DEFAULT_RADIUS, DEFAULT_SIGMA, Kernel, PointSource, SourceSinkSet};
use crate::types::Bounds2D;

/// Files never treated as run configurations when scanning a folder.
const IGNORED_FILES: [&str; 2] = ["Cargo.toml", "pyproject.toml"];

// ============================================================================
// Raw file layout
// ============================================================================

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    settings: Option<RawSettings>,
    geometry: Option<RawGeometry>,
    spill: Option<RawSpill>,
    #[serde(rename = "IO")]
    io: Option<RawIo>,
    video: Option<RawVideo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    t_start: Option<f64>,
    t_end: Option<f64>,
    n_steps: Option<i64>,
    flux_scheme: Option<FluxScheme>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawGeometry {
    mesh_name: Option<String>,
    borders: Option<[[f64; 2]; 2]>,
    ship: Option<RawPoint>,
    source: Option<Vec<RawPoint>>,
    sink: Option<Vec<RawPoint>>,
}

/// A point given either as `[x, y]` or as a table.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Bare([f64; 2]),
    Detailed {
        position: [f64; 2],
        radius: Option<f64>,
        strength: Option<f64>,
        mode: Option<String>,
        sigma: Option<f64>,
    },
}

#[derive(Debug, Default, Deserialize)]
struct RawSpill {
    center: Option<[f64; 2]>,
    spread: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawIo {
    write_frequency: Option<i64>,
    output_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawVideo {
    #[serde(rename = "videoFPS")]
    video_fps: Option<u32>,
}

// ============================================================================
// Validated configuration
// ============================================================================

/// Initial oil distribution `exp(-|c - center|² / spread)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpillConfig {
    pub center: (f64, f64),
    pub spread: f64,
}

impl Default for SpillConfig {
    fn default() -> Self {
        Self {
            center: (0.35, 0.45),
            spread: 0.01,
        }
    }
}

impl SpillConfig {
    /// Initial concentration at `(x, y)`.
    #[inline]
    pub fn concentration(&self, x: f64, y: f64) -> f64 {
        let dx = x - self.center.0;
        let dy = y - self.center.1;
        (-(dx * dx + dy * dy) / self.spread).exp()
    }
}

/// Validated configuration of one simulation run.
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Run name, the config file stem.
    pub name: String,
    pub t_start: f64,
    pub t_end: f64,
    pub n_steps: usize,
    pub flux_scheme: FluxScheme,
    /// Mesh file, resolved against the config file's folder.
    pub mesh_path: PathBuf,
    /// Fishing-zone rectangle.
    pub borders: Bounds2D,
    pub sources: SourceSinkSet,
    pub spill: SpillConfig,
    /// Write a frame every N steps; 0 disables file output.
    pub write_frequency: usize,
    pub output_dir: PathBuf,
    /// Frame rate handed to renderers.
    pub video_fps: u32,
}

impl SimConfig {
    /// Default write frequency (no output files).
    pub const DEFAULT_WRITE_FREQUENCY: usize = 0;
    /// Default frame rate.
    pub const DEFAULT_VIDEO_FPS: u32 = 30;
    /// Default output folder.
    pub const DEFAULT_OUTPUT_DIR: &'static str = "Output";

    /// Timestep `(tEnd - tStart) / nSteps`.
    #[inline]
    pub fn dt(&self) -> f64 {
        (self.t_end - self.t_start) / self.n_steps as f64
    }

    /// Load and validate one TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "config".to_string());
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let config = Self::from_toml_str(&text, base_dir, &name).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                origin: path.display().to_string(),
                source,
            },
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML text.
    ///
    /// `base_dir` is the folder relative mesh names are resolved against and
    /// `name` becomes the run name.
    pub fn from_toml_str(text: &str, base_dir: &Path, name: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            origin: name.to_string(),
            source,
        })?;
        let config = Self::validate(raw, base_dir, name)?;
        config.log_summary();
        Ok(config)
    }

    fn validate(raw: RawConfig, base_dir: &Path, name: &str) -> Result<Self, ConfigError> {
        let settings = raw.settings.unwrap_or_default();
        let geometry = raw.geometry.unwrap_or_default();

        let t_start = settings
            .t_start
            .ok_or(ConfigError::MissingKey("settings.tStart"))?;
        let t_end = settings
            .t_end
            .ok_or(ConfigError::MissingKey("settings.tEnd"))?;
        let n_steps = settings
            .n_steps
            .ok_or(ConfigError::MissingKey("settings.nSteps"))?;
        let mesh_name = geometry
            .mesh_name
            .ok_or(ConfigError::MissingKey("geometry.meshName"))?;
        let borders = geometry
            .borders
            .ok_or(ConfigError::MissingKey("geometry.borders"))?;

        if !t_start.is_finite() || !t_end.is_finite() || t_end <= t_start {
            return Err(ConfigError::invalid(
                "settings.tEnd",
                format!("must be greater than tStart ({t_start}), got {t_end}"),
            ));
        }
        let n_steps = usize::try_from(n_steps)
            .ok()
            .filter(|&n| n >= 1)
            .ok_or_else(|| {
                ConfigError::invalid("settings.nSteps", format!("must be at least 1, got {n_steps}"))
            })?;

        let [[x_min, x_max], [y_min, y_max]] = borders;
        let borders = Bounds2D::try_new(x_min, x_max, y_min, y_max).ok_or_else(|| {
            ConfigError::invalid(
                "geometry.borders",
                format!("expected [[xmin, xmax], [ymin, ymax]] with min < max, got {borders:?}"),
            )
        })?;

        let mut sources = SourceSinkSet::new();
        if let Some(ship) = geometry.ship {
            sources.ship = Some(build_point(&ship, PointSource::sink, "geometry.ship")?);
        }
        for (i, p) in geometry.source.unwrap_or_default().iter().enumerate() {
            let key = format!("geometry.source[{i}]");
            sources.sources.push(build_point(p, PointSource::source, &key)?);
        }
        for (i, p) in geometry.sink.unwrap_or_default().iter().enumerate() {
            let key = format!("geometry.sink[{i}]");
            sources.sinks.push(build_point(p, PointSource::sink, &key)?);
        }

        let raw_spill = raw.spill.unwrap_or_default();
        let mut spill = SpillConfig::default();
        if let Some([x, y]) = raw_spill.center {
            spill.center = (x, y);
        }
        if let Some(spread) = raw_spill.spread {
            if !(spread.is_finite() && spread > 0.0) {
                return Err(ConfigError::invalid(
                    "spill.spread",
                    format!("must be positive, got {spread}"),
                ));
            }
            spill.spread = spread;
        }

        let io = raw.io.unwrap_or_default();
        let write_frequency = match io.write_frequency {
            None => Self::DEFAULT_WRITE_FREQUENCY,
            Some(n) => usize::try_from(n).map_err(|_| {
                ConfigError::invalid("IO.writeFrequency", format!("must be >= 0, got {n}"))
            })?,
        };
        let output_dir = PathBuf::from(
            io.output_dir
                .unwrap_or_else(|| Self::DEFAULT_OUTPUT_DIR.to_string()),
        );
        let video_fps = raw
            .video
            .and_then(|v| v.video_fps)
            .unwrap_or(Self::DEFAULT_VIDEO_FPS);

        Ok(Self {
            name: name.to_string(),
            t_start,
            t_end,
            n_steps,
            flux_scheme: settings.flux_scheme.unwrap_or_default(),
            mesh_path: base_dir.join(mesh_name),
            borders,
            sources,
            spill,
            write_frequency,
            output_dir,
            video_fps,
        })
    }

    fn log_summary(&self) {
        tracing::info!(
            name = %self.name,
            mesh = %self.mesh_path.display(),
            ships = usize::from(self.sources.ship.is_some()),
            sources = self.sources.sources.len(),
            sinks = self.sources.sinks.len(),
            n_steps = self.n_steps,
            dt = self.dt(),
            scheme = %self.flux_scheme,
            "configuration"
        );
    }
}

/// Turn a raw point into a [`PointSource`], starting from `defaults`.
fn build_point(
    raw: &RawPoint,
    defaults: fn(f64, f64) -> PointSource,
    key: &str,
) -> Result<PointSource, ConfigError> {
    match raw {
        RawPoint::Bare([x, y]) => Ok(defaults(*x, *y)),
        RawPoint::Detailed {
            position: [x, y],
            radius,
            strength,
            mode,
            sigma,
        } => {
            let mut point = defaults(*x, *y);

            let radius = radius.unwrap_or(DEFAULT_RADIUS);
            if !(radius.is_finite() && radius >= 0.0) {
                return Err(ConfigError::invalid(
                    format!("{key}.radius"),
                    format!("must be non-negative, got {radius}"),
                ));
            }
            point = point.with_radius(radius);

            if let Some(strength) = *strength {
                if !(strength.is_finite() && strength >= 0.0) {
                    return Err(ConfigError::invalid(
                        format!("{key}.strength"),
                        format!("must be non-negative, got {strength}"),
                    ));
                }
                point = point.with_strength(strength);
            }

            let sigma = sigma.unwrap_or(DEFAULT_SIGMA);
            if !(sigma.is_finite() && sigma > 0.0) {
                return Err(ConfigError::invalid(
                    format!("{key}.sigma"),
                    format!("must be positive, got {sigma}"),
                ));
            }
            let mode = mode.as_deref().unwrap_or("gaussian");
            let kernel = Kernel::from_mode(mode, sigma).ok_or_else(|| {
                ConfigError::invalid(
                    format!("{key}.mode"),
                    format!("expected uniform, linear or gaussian, got {mode:?}"),
                )
            })?;
            Ok(point.with_kernel(kernel))
        }
    }
}

/// Load a single file, or every `*.toml` in a folder (sorted by name).
pub fn load_configs(path: &Path) -> Result<Vec<SimConfig>, ConfigError> {
    if !path.is_dir() {
        return Ok(vec![SimConfig::load(path)?]);
    }

    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(io_err)? {
        let file = entry.map_err(io_err)?.path();
        let is_toml = file.extension().is_some_and(|ext| ext == "toml");
        let ignored = file
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| IGNORED_FILES.contains(&n));
        if file.is_file() && is_toml && !ignored {
            files.push(file);
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(ConfigError::NoConfigs(path.to_path_buf()));
    }

    let start = Instant::now();
    let configs = files
        .iter()
        .map(|f| SimConfig::load(f))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(
        count = configs.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1e3,
        "loaded configuration files"
    );
    Ok(configs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
[settings]
tStart = 0
tEnd = 0.5
nSteps = 50

[geometry]
meshName = "bay.msh"
borders = [[0.0, 0.45], [0.0, 0.2]]
"#;

    fn parse(text: &str) -> Result<SimConfig, ConfigError> {
        SimConfig::from_toml_str(text, Path::new("cases"), "test")
    }

    #[test]
    fn test_minimal_config_defaults() {
        let cfg = parse(MINIMAL).unwrap();
        assert_eq!(cfg.name, "test");
        assert_eq!(cfg.n_steps, 50);
        assert!((cfg.dt() - 0.01).abs() < 1e-15);
        assert_eq!(cfg.mesh_path, Path::new("cases").join("bay.msh"));
        assert_eq!(cfg.borders, Bounds2D::new(0.0, 0.45, 0.0, 0.2));
        assert_eq!(cfg.write_frequency, 0);
        assert_eq!(cfg.video_fps, 30);
        assert_eq!(cfg.output_dir, PathBuf::from("Output"));
        assert_eq!(cfg.flux_scheme, FluxScheme::Upwind);
        assert_eq!(cfg.spill, SpillConfig::default());
        assert!(cfg.sources.is_empty());
    }

    #[test]
    fn test_missing_required_keys() {
        let cases = [
            ("tStart = 0\n", "settings.tStart"),
            ("tEnd = 0.5\n", "settings.tEnd"),
            ("nSteps = 50\n", "settings.nSteps"),
            ("meshName = \"bay.msh\"\n", "geometry.meshName"),
            ("borders = [[0.0, 0.45], [0.0, 0.2]]\n", "geometry.borders"),
        ];
        for (line, key) in cases {
            let text = MINIMAL.replacen(line, "", 1);
            match parse(&text) {
                Err(ConfigError::MissingKey(k)) => assert_eq!(k, key),
                other => panic!("expected missing {key}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_empty_file_reports_first_key() {
        assert!(matches!(
            parse(""),
            Err(ConfigError::MissingKey("settings.tStart"))
        ));
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let text = MINIMAL.replace("nSteps = 50", "nSteps = \"fifty\"");
        assert!(matches!(parse(&text), Err(ConfigError::Parse { .. })));

        let text = format!("{MINIMAL}\n[IO]\nwriteFrequency = [1]\n");
        assert!(matches!(parse(&text), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_invalid_values() {
        let text = MINIMAL.replace("tEnd = 0.5", "tEnd = -1.0");
        assert!(matches!(parse(&text), Err(ConfigError::InvalidValue { key, .. }) if key == "settings.tEnd"));

        let text = MINIMAL.replace("nSteps = 50", "nSteps = 0");
        assert!(matches!(parse(&text), Err(ConfigError::InvalidValue { key, .. }) if key == "settings.nSteps"));

        let text = MINIMAL.replace("[[0.0, 0.45]", "[[0.45, 0.0]");
        assert!(matches!(parse(&text), Err(ConfigError::InvalidValue { key, .. }) if key == "geometry.borders"));
    }

    #[test]
    fn test_points_bare_and_detailed() {
        let text = MINIMAL.replace(
            "borders = [[0.0, 0.45], [0.0, 0.2]]",
            r#"borders = [[0.0, 0.45], [0.0, 0.2]]
ship = [0.35, 0.44]
source = [[0.3, 0.4]]
sink = [[0.5, 0.5], { position = [0.6, 0.4], radius = 0.05, strength = 20.0, mode = "linear" }]"#,
        );
        let cfg = parse(&text).unwrap();

        let ship = cfg.sources.ship.as_ref().unwrap();
        assert_eq!(ship, &PointSource::sink(0.35, 0.44));
        assert_eq!(cfg.sources.sources, vec![PointSource::source(0.3, 0.4)]);
        assert_eq!(cfg.sources.sinks.len(), 2);

        let detailed = &cfg.sources.sinks[1];
        assert_eq!(detailed.position, (0.6, 0.4));
        assert_eq!(detailed.radius, 0.05);
        assert_eq!(detailed.strength, 20.0);
        assert_eq!(detailed.kernel, Kernel::Linear);
    }

    #[test]
    fn test_unknown_kernel_mode() {
        let text = MINIMAL.replace(
            "borders = [[0.0, 0.45], [0.0, 0.2]]",
            "borders = [[0.0, 0.45], [0.0, 0.2]]\nsink = [{ position = [0.5, 0.5], mode = \"cubic\" }]",
        );
        assert!(matches!(
            parse(&text),
            Err(ConfigError::InvalidValue { key, .. }) if key == "geometry.sink[0].mode"
        ));
    }

    #[test]
    fn test_optional_sections() {
        let text = format!(
            "{MINIMAL}\n[spill]\ncenter = [0.5, 0.5]\nspread = 0.02\n\n[IO]\nwriteFrequency = 5\noutputDir = \"runs\"\n\n[video]\nvideoFPS = 12\n"
        );
        let cfg = parse(&text).unwrap();
        assert_eq!(cfg.spill.center, (0.5, 0.5));
        assert_eq!(cfg.spill.spread, 0.02);
        assert_eq!(cfg.write_frequency, 5);
        assert_eq!(cfg.output_dir, PathBuf::from("runs"));
        assert_eq!(cfg.video_fps, 12);
    }

    #[test]
    fn test_flux_scheme_setting() {
        let text = MINIMAL.replace("nSteps = 50", "nSteps = 50\nfluxScheme = \"lax_friedrichs\"");
        assert_eq!(parse(&text).unwrap().flux_scheme, FluxScheme::LaxFriedrichs);

        let text = MINIMAL.replace("nSteps = 50", "nSteps = 50\nfluxScheme = \"central\"");
        assert!(matches!(parse(&text), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_spill_concentration() {
        let spill = SpillConfig::default();
        assert!((spill.concentration(0.35, 0.45) - 1.0).abs() < 1e-15);
        let c = spill.concentration(0.45, 0.45);
        assert!((c - (-1.0_f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn test_load_folder_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        for name in ["b.toml", "a.toml", "Cargo.toml"] {
            let mut f = fs::File::create(dir.path().join(name)).unwrap();
            write!(f, "{MINIMAL}").unwrap();
        }
        fs::write(dir.path().join("notes.txt"), "not a config").unwrap();

        let configs = load_configs(dir.path()).unwrap();
        let names: Vec<&str> = configs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(configs[0].mesh_path, dir.path().join("bay.msh"));
    }

    #[test]
    fn test_load_empty_folder_fails() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_configs(dir.path()),
            Err(ConfigError::NoConfigs(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            SimConfig::load(&dir.path().join("nope.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
