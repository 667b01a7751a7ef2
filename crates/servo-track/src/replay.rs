//! Offline replay: drive the tracking loop from recorded detector output.
//!
//! A [`DetectionLog`] holds one entry per frame, either the flat
//! `(x, y, w, h)*` sequence the detector returned or `null` for a frame on
//! which the detector failed. Frames are synthesized blank at the configured
//! resolution, telemetry goes to a file or an already configured tty device,
//! and the overlay is logged instead of drawn.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use servo_track_core::{Frame, GrayImage, GrayImageView};
use servo_track_telemetry::{SerialSettings, TelemetryPort, WritePort};

use crate::config::{ConfigError, DetectionParams, TrackerConfig};
use crate::display::DisplayPlacement;
use crate::error::{
    AcquisitionError, DetectionError, ReleaseError, RenderError, Resource, SessionError,
};
use crate::hal::{FrameSink, FrameSource, RectangleDetector, ResourceProvider};
use crate::session::Session;
use crate::tracking::{FrameOutcome, LoopSummary, TrackingLoop};

#[derive(thiserror::Error, Debug)]
pub enum ReplayError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Recorded detector output, one entry per frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionLog {
    /// `None` marks a frame on which the detector failed.
    pub frames: Vec<Option<Vec<i32>>>,
}

impl DetectionLog {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Plays a [`DetectionLog`] back, one entry per call.
#[derive(Debug)]
pub struct RecordedDetector {
    log: DetectionLog,
    cursor: usize,
}

impl RecordedDetector {
    pub fn new(log: DetectionLog) -> Self {
        Self { log, cursor: 0 }
    }
}

impl RectangleDetector for RecordedDetector {
    fn find_rectangles(
        &mut self,
        _image: &GrayImageView<'_>,
        _params: &DetectionParams,
    ) -> Result<Vec<i32>, DetectionError> {
        let index = self.cursor;
        self.cursor += 1;
        match self.log.frames.get(index) {
            Some(Some(flat)) => Ok(flat.clone()),
            Some(None) => {
                let reason = format!("recorded failure at frame {index}");
                Err(DetectionError::Failed(reason))
            }
            None => Ok(Vec::new()),
        }
    }
}

/// Blank frames at a fixed resolution, exhausted after `limit` frames.
#[derive(Debug)]
pub struct SyntheticSource {
    width: usize,
    height: usize,
    next: u64,
    limit: u64,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32, limit: u64) -> Self {
        Self {
            width: width as usize,
            height: height as usize,
            next: 0,
            limit,
        }
    }
}

impl FrameSource for SyntheticSource {
    fn snapshot(&mut self) -> Result<Frame, AcquisitionError> {
        if self.next >= self.limit {
            return Err(AcquisitionError::Exhausted);
        }
        let gray = GrayImage::filled(self.width, self.height, 0)?;
        let frame = Frame::new(self.next, gray);
        self.next += 1;
        Ok(frame)
    }
}

/// Display stand-in that logs each frame's overlay text.
#[derive(Debug, Default)]
pub struct RecordingSink {
    shown: u64,
}

impl FrameSink for RecordingSink {
    fn show(&mut self, frame: &Frame, placement: &DisplayPlacement) -> Result<(), RenderError> {
        self.shown += 1;
        let labels: Vec<&str> = frame.overlay.labels().collect();
        debug!(
            "frame {} at ({}, {}): {} primitives [{}]",
            frame.index,
            placement.offset_x,
            placement.offset_y,
            frame.overlay.len(),
            labels.join(", ")
        );
        Ok(())
    }

    fn release(&mut self) -> Result<(), ReleaseError> {
        info!("display stand-in showed {} frames", self.shown);
        Ok(())
    }
}

/// Opens replay stand-ins for the board resources.
#[derive(Debug)]
pub struct ReplayProvider {
    serial_path: Option<PathBuf>,
    frames: u64,
}

impl ReplayProvider {
    /// `serial_path` is opened for appending; without one the session runs
    /// with telemetry disabled.
    pub fn new(serial_path: Option<PathBuf>, frames: u64) -> Self {
        Self {
            serial_path,
            frames,
        }
    }
}

impl ResourceProvider for ReplayProvider {
    fn open_telemetry(
        &mut self,
        settings: &SerialSettings,
    ) -> Result<Box<dyn TelemetryPort>, AcquisitionError> {
        let Some(path) = self.serial_path.as_ref() else {
            return Err(AcquisitionError::Unavailable {
                resource: Resource::SerialLink,
                reason: "no serial device configured".to_string(),
            });
        };
        // Line settings of a tty are expected to be configured beforehand.
        debug!(
            "opening {} (expecting {} baud)",
            path.display(),
            settings.baud_rate
        );
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Box::new(WritePort::<File>::new(file)))
    }

    fn open_frame_source(
        &mut self,
        cfg: &TrackerConfig,
    ) -> Result<Box<dyn FrameSource>, AcquisitionError> {
        let source = SyntheticSource::new(cfg.detect_width, cfg.detect_height, self.frames);
        Ok(Box::new(source))
    }

    fn open_sink(
        &mut self,
        _placement: &DisplayPlacement,
    ) -> Result<Box<dyn FrameSink>, AcquisitionError> {
        Ok(Box::new(RecordingSink::default()))
    }
}

/// Result of a replay run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    /// Where the configuration came from.
    pub config_source: String,
    /// Whether telemetry was written anywhere.
    pub telemetry_link: bool,
    pub summary: LoopSummary,
    /// Outcomes of the iterations that completed.
    pub frames: Vec<FrameOutcome>,
}

impl ReplayReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ReplayError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

/// Run the full loop over `log`.
///
/// At most `max_frames` entries are replayed; the source then reports
/// exhaustion and the loop stops.
pub fn run_replay(
    cfg: &TrackerConfig,
    config_source: &str,
    log: DetectionLog,
    serial_path: Option<&Path>,
    max_frames: Option<u64>,
) -> Result<ReplayReport, ReplayError> {
    let available = log.len() as u64;
    let frames = max_frames.map_or(available, |max| max.min(available));
    info!("{}", cfg.summary(config_source));

    let mut tracker = TrackingLoop::new(cfg.clone(), RecordedDetector::new(log))?;
    let mut provider = ReplayProvider::new(serial_path.map(Path::to_path_buf), frames);
    let mut session = Session::acquire(&mut provider, cfg)?;
    let telemetry_link = session.has_telemetry();

    let mut outcomes = Vec::new();
    let summary = tracker.run_with(&mut session, |outcome| outcomes.push(outcome.clone()));

    let release = session.release();
    if !release.is_clean() {
        warn!("{} resources failed to release", release.failures.len());
    }

    Ok(ReplayReport {
        config_source: config_source.to_string(),
        telemetry_link,
        summary,
        frames: outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{StopReason, TelemetryStatus};
    use servo_track_telemetry::decode_stream;

    fn log() -> DetectionLog {
        DetectionLog {
            frames: vec![Some(vec![10, 10, 50, 50]), None, Some(vec![])],
        }
    }

    #[test]
    fn replay_writes_telemetry_and_recovers_detector_failures() {
        let dir = tempfile::tempdir().unwrap();
        let serial = dir.path().join("uart.bin");

        let cfg = TrackerConfig::default();
        let report = run_replay(&cfg, "defaults", log(), Some(serial.as_path()), None).unwrap();

        assert!(report.telemetry_link);
        assert_eq!(report.summary.reason, StopReason::SourceExhausted);
        assert_eq!(report.summary.stats.frames, 3);
        assert_eq!(report.summary.stats.detections, 1);
        assert_eq!(report.summary.stats.telemetry_sent, 1);
        assert_eq!(report.summary.stats.recovered_errors, 1);

        // frame 1 failed in the detector and produced no outcome
        let indices: Vec<u64> = report.frames.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(report.frames[0].error, Some(-100));
        assert_eq!(report.frames[1].telemetry, TelemetryStatus::Skipped);

        let bytes = fs::read(&serial).unwrap();
        assert_eq!(bytes, vec![0x66, 0x66, 0x9C, 0xFF, 0xF6, 0xF6]);
        assert_eq!(decode_stream(&bytes)[0].error(), -100);
    }

    #[test]
    fn replay_without_link_still_tracks() {
        let cfg = TrackerConfig::default();
        let report = run_replay(&cfg, "defaults", log(), None, Some(1)).unwrap();

        assert!(!report.telemetry_link);
        assert_eq!(report.summary.stats.frames, 1);
        assert_eq!(report.summary.stats.telemetry_unlinked, 1);
        assert_eq!(report.frames[0].telemetry, TelemetryStatus::NoLink);
    }

    #[test]
    fn invalid_config_is_rejected_before_acquisition() {
        let mut cfg = TrackerConfig::default();
        cfg.filter.alpha = 0.0;
        let err = run_replay(&cfg, "test", log(), None, None).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::Config(ConfigError::InvalidAlpha(_))
        ));
    }

    #[test]
    fn detection_log_reads_null_entries() {
        let log: DetectionLog =
            serde_json::from_str(r#"{"frames": [[1, 2, 3, 4], null, []]}"#).unwrap();
        assert_eq!(log.len(), 3);
        assert_eq!(log.frames[0], Some(vec![1, 2, 3, 4]));
        assert_eq!(log.frames[1], None);
    }

    #[test]
    fn recorded_detector_runs_dry_with_empty_results() {
        let mut det = RecordedDetector::new(DetectionLog {
            frames: vec![Some(vec![1, 2, 3, 4])],
        });
        let img = GrayImage::filled(4, 4, 0).unwrap();
        let params = DetectionParams::default();
        let first = det.find_rectangles(&img.view(), &params).unwrap();
        assert_eq!(first, vec![1, 2, 3, 4]);
        let after = det.find_rectangles(&img.view(), &params).unwrap();
        assert!(after.is_empty());
    }
}
