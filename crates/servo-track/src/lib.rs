//! Rectangle-tracking visual servo loop for a camera board with a serial
//! actuator link.
//!
//! Every frame runs the same pipeline:
//! capture → detect → select → smooth → measure error → transmit → render.
//! The largest rectangle passing the area/aspect gates is tracked, its
//! corners and center are smoothed by an EMA filter bank, and the clamped
//! horizontal offset from the frame center is sent as a 6-byte frame over
//! the serial link.
//!
//! ## Quickstart
//!
//! ```no_run
//! use std::path::Path;
//!
//! use servo_track::replay::{run_replay, DetectionLog};
//! use servo_track::TrackerConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = TrackerConfig::default();
//! let log = DetectionLog::load_json("detections.json")?;
//! let report = run_replay(&cfg, "defaults", log, Some(Path::new("telemetry.bin")), None)?;
//! println!("stopped: {:?}", report.summary.reason);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - [`config`]: tunables, presets and JSON config files.
//! - [`select`], [`filter`], [`tracking_error`]: the pure per-frame math.
//! - [`hal`]: traits for the camera, detector, display and serial link.
//! - [`session`]: scoped ownership of the board resources.
//! - [`tracking`]: the frame loop.
//! - [`replay`]: drives the loop from recorded detections, without hardware.
//! - `servo_track::core` / `servo_track::telemetry`: re-exported lower crates.

pub use servo_track_core as core;
pub use servo_track_telemetry as telemetry;

pub mod config;
pub mod display;
pub mod error;
pub mod filter;
pub mod fps;
pub mod hal;
pub mod render;
pub mod replay;
pub mod select;
pub mod session;
pub mod tracking;
pub mod tracking_error;

pub use config::{
    ConfigError, ConfigIoError, DetectionParams, DisplayMode, FilterParams, Preset, SelectionParams,
    TrackerConfig,
};
pub use display::DisplayPlacement;
pub use error::{
    AcquisitionError, DetectionError, ReleaseError, RenderError, Resource, SessionError, StageError,
};
pub use filter::{CoordinateFilterBank, SmoothedPoint};
pub use hal::{FrameSink, FrameSource, RectangleDetector, ResourceProvider};
pub use select::{passes_filters, select_best};
pub use session::{ReleaseReport, Session};
pub use tracking::{
    FrameOutcome, FrameStage, LoopState, LoopStats, LoopSummary, StopHandle, StopReason,
    TelemetryStatus, TrackingLoop,
};
pub use tracking_error::compute_tracking_error;
