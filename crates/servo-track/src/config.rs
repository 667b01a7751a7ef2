//! Tracker configuration, presets and JSON helpers.
//!
//! Every field has a documented default and every section is
//! `#[serde(default)]`, so a partial (or empty) JSON file is a valid
//! configuration. Unknown keys are ignored.

use std::{fmt, fs, path::Path, str::FromStr};

use nalgebra::Point2;
use serde::{Deserialize, Deserializer, Serialize};
use servo_track_core::PixelPoint;
use servo_track_telemetry::{SerialSettings, DEFAULT_MAX_ERROR_RANGE};

/// Errors from [`TrackerConfig::validate`] and string parsing.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("detection resolution must be non-zero (width={width}, height={height})")]
    ZeroResolution { width: u32, height: u32 },
    #[error("detection resolution {width}x{height} exceeds the pixel coordinate range")]
    ResolutionTooLarge { width: u32, height: u32 },
    #[error("smoothing factor alpha must be in (0, 1], got {0}")]
    InvalidAlpha(f64),
    #[error("min_frames must be at least 1")]
    ZeroMinFrames,
    #[error("aspect ratio bounds are inverted (min={min}, max={max})")]
    AspectBounds { min: f64, max: f64 },
    #[error("max_error_range {0} does not fit the 16-bit telemetry payload")]
    ErrorRangeTooLarge(u16),
    #[error("unknown display mode {0:?} (expected VIRT or LCD)")]
    UnknownDisplayMode(String),
    #[error("unknown preset {0:?} (expected high-accuracy, high-speed or balanced)")]
    UnknownPreset(String),
}

/// Errors from loading or writing configuration files.
#[derive(thiserror::Error, Debug)]
pub enum ConfigIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Where the frame is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum DisplayMode {
    /// In-memory virtual display, canvas equals the detection resolution.
    #[serde(rename = "VIRT")]
    Virt,
    /// Physical 800x480 panel; the frame is blitted centered.
    #[default]
    #[serde(rename = "LCD")]
    Lcd,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Virt => "VIRT",
            DisplayMode::Lcd => "LCD",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "VIRT" => Ok(DisplayMode::Virt),
            "LCD" => Ok(DisplayMode::Lcd),
            _ => Err(ConfigError::UnknownDisplayMode(s.to_string())),
        }
    }
}

/// Unknown modes fall back to the default with a warning instead of failing
/// the whole config.
impl<'de> Deserialize<'de> for DisplayMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_else(|err| {
            log::warn!("{err}; falling back to {}", DisplayMode::default());
            DisplayMode::default()
        }))
    }
}

/// Candidate filtering applied before picking the largest rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionParams {
    /// Minimum `width * height` in pixels.
    pub min_area: i64,
    /// Inclusive lower bound on `width / height`.
    pub min_aspect_ratio: f64,
    /// Inclusive upper bound on `width / height`.
    pub max_aspect_ratio: f64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            min_area: 1500,
            min_aspect_ratio: 0.6,
            max_aspect_ratio: 1.6,
        }
    }
}

/// Thresholds forwarded verbatim to the external rectangle detector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionParams {
    pub canny_thresh1: u32,
    pub canny_thresh2: u32,
    /// Polygon approximation epsilon, relative to the contour perimeter.
    pub approx_epsilon: f64,
    /// Minimum contour area as a fraction of the image area.
    pub area_min_ratio: f64,
    /// Largest accepted cosine of a corner angle.
    pub max_angle_cos: f64,
    /// Gaussian blur kernel size.
    pub blur_size: u32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            canny_thresh1: 50,
            canny_thresh2: 150,
            approx_epsilon: 0.04,
            area_min_ratio: 0.01,
            max_angle_cos: 0.3,
            blur_size: 5,
        }
    }
}

/// Coordinate smoothing settings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// EMA factor in `(0, 1]`; higher is more responsive.
    pub alpha: f64,
    /// Samples required before filtered output is emitted.
    pub min_frames: u32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            min_frames: 2,
        }
    }
}

/// Full tracker configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub detect_width: u32,
    pub detect_height: u32,
    pub display_mode: DisplayMode,
    pub selection: SelectionParams,
    pub detection: DetectionParams,
    pub filter: FilterParams,
    pub serial: SerialSettings,
    /// Symmetric clamp applied to the tracking error.
    pub max_error_range: u16,
    /// Accepted for compatibility with board-side configs. Frame buffers are
    /// dropped at the end of every iteration regardless.
    pub reclaim_per_frame: bool,
    /// Log recovered per-frame failures (detector, transport, render).
    pub log_errors: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            detect_width: 320,
            detect_height: 240,
            display_mode: DisplayMode::default(),
            selection: SelectionParams::default(),
            detection: DetectionParams::default(),
            filter: FilterParams::default(),
            serial: SerialSettings::default(),
            max_error_range: DEFAULT_MAX_ERROR_RANGE,
            reclaim_per_frame: true,
            log_errors: true,
        }
    }
}

impl TrackerConfig {
    /// Default configuration with a preset applied on top.
    pub fn with_preset(preset: Preset) -> Self {
        let mut cfg = Self::default();
        preset.apply(&mut cfg);
        cfg
    }

    /// Horizontal zero point of the tracking error: `detect_width / 2`.
    #[inline]
    pub fn reference_x(&self) -> i32 {
        (self.detect_width / 2) as i32
    }

    /// Frame center marker drawn on the overlay.
    #[inline]
    pub fn reference_center(&self) -> PixelPoint {
        Point2::new(self.reference_x(), (self.detect_height / 2) as i32)
    }

    /// Check the settings the loop relies on.
    ///
    /// Serial settings are not checked here; an invalid link only disables
    /// telemetry and is reported when the session is acquired.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detect_width == 0 || self.detect_height == 0 {
            return Err(ConfigError::ZeroResolution {
                width: self.detect_width,
                height: self.detect_height,
            });
        }
        let fits = |v: u32| i32::try_from(v).is_ok();
        if !fits(self.detect_width) || !fits(self.detect_height) {
            return Err(ConfigError::ResolutionTooLarge {
                width: self.detect_width,
                height: self.detect_height,
            });
        }
        let alpha = self.filter.alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::InvalidAlpha(alpha));
        }
        if self.filter.min_frames == 0 {
            return Err(ConfigError::ZeroMinFrames);
        }
        let sel = &self.selection;
        if !(sel.min_aspect_ratio <= sel.max_aspect_ratio) {
            return Err(ConfigError::AspectBounds {
                min: sel.min_aspect_ratio,
                max: sel.max_aspect_ratio,
            });
        }
        if self.max_error_range > i16::MAX as u16 {
            return Err(ConfigError::ErrorRangeTooLarge(self.max_error_range));
        }
        Ok(())
    }

    /// Load a JSON config from disk and validate it.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigIoError> {
        let raw = fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Human-readable startup banner.
    pub fn summary(&self, source: &str) -> String {
        let rule = "=".repeat(50);
        format!(
            "{rule}\n\
             rectangle tracker configuration\n\
             {rule}\n\
             resolution:   {}x{}\n\
             display mode: {}\n\
             min area:     {}\n\
             aspect range: {}-{}\n\
             alpha:        {}\n\
             uart baud:    {}\n\
             config:       {source}\n\
             {rule}",
            self.detect_width,
            self.detect_height,
            self.display_mode,
            self.selection.min_area,
            self.selection.min_aspect_ratio,
            self.selection.max_aspect_ratio,
            self.filter.alpha,
            self.serial.baud_rate,
        )
    }
}

/// Tuned parameter sets for common trade-offs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Lower Canny thresholds, tighter polygon fit, heavier smoothing.
    HighAccuracy,
    /// Higher thresholds, looser fit, lighter smoothing.
    HighSpeed,
    /// The defaults.
    Balanced,
}

impl Preset {
    pub fn apply(self, cfg: &mut TrackerConfig) {
        let (t1, t2, epsilon, alpha, min_area) = match self {
            Preset::HighAccuracy => (30, 100, 0.02, 0.2, 2000),
            Preset::HighSpeed => (70, 200, 0.06, 0.5, 1000),
            Preset::Balanced => (50, 150, 0.04, 0.3, 1500),
        };
        cfg.detection.canny_thresh1 = t1;
        cfg.detection.canny_thresh2 = t2;
        cfg.detection.approx_epsilon = epsilon;
        cfg.filter.alpha = alpha;
        cfg.selection.min_area = min_area;
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "high-accuracy" => Ok(Preset::HighAccuracy),
            "high-speed" => Ok(Preset::HighSpeed),
            "balanced" => Ok(Preset::Balanced),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}
