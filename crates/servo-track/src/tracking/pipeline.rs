use log::{debug, error, info, warn};
use servo_track_core::{candidates_from_flat, corners_center, RectCandidate};
use servo_track_telemetry::TelemetryFrame;

#[cfg(feature = "tracing")]
use tracing::instrument;

use super::result::{FrameOutcome, LoopStats, LoopSummary, StopReason, TelemetryStatus};
use super::state::{FrameStage, LoopState, StopHandle};
use crate::config::{ConfigError, TrackerConfig};
use crate::error::{AcquisitionError, Resource, StageError};
use crate::filter::CoordinateFilterBank;
use crate::fps::FpsCounter;
use crate::hal::RectangleDetector;
use crate::render::{draw_detection_info, DisplayTarget, OverlayContext};
use crate::select::select_best;
use crate::session::Session;
use crate::tracking_error::compute_tracking_error;

/// Single-threaded frame loop driving selection, smoothing, telemetry and
/// the overlay.
///
/// The loop owns the detector and the filter bank; hardware handles stay in
/// the [`Session`] it is run against.
pub struct TrackingLoop<D> {
    config: TrackerConfig,
    detector: D,
    filter: CoordinateFilterBank,
    fps: FpsCounter,
    state: LoopState,
    stage: Option<FrameStage>,
    stop: StopHandle,
    stats: LoopStats,
}

impl<D: RectangleDetector> TrackingLoop<D> {
    /// Build a loop for a validated configuration.
    pub fn new(config: TrackerConfig, detector: D) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            filter: CoordinateFilterBank::new(config.filter),
            config,
            detector,
            fps: FpsCounter::default(),
            state: LoopState::Idle,
            stage: None,
            stop: StopHandle::default(),
            stats: LoopStats::default(),
        })
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Last stage entered by the current (or last) iteration.
    #[inline]
    pub fn stage(&self) -> Option<FrameStage> {
        self.stage
    }

    #[inline]
    pub fn filter(&self) -> &CoordinateFilterBank {
        &self.filter
    }

    #[inline]
    pub fn stats(&self) -> &LoopStats {
        &self.stats
    }

    /// Handle that stops the loop before its next iteration.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Enter `Running` if the session holds a frame source and a display.
    pub fn start(&mut self, session: &Session) -> bool {
        if !session.is_ready() {
            self.state = LoopState::Stopped;
            return false;
        }
        self.filter.reset();
        self.fps.reset();
        self.state = LoopState::Running;
        true
    }

    /// Run until stopped, the frame source is lost, or it runs dry.
    pub fn run(&mut self, session: &mut Session) -> LoopSummary {
        self.run_with(session, |_| {})
    }

    /// Like [`run`](Self::run), calling `on_frame` after every completed
    /// iteration.
    pub fn run_with<F>(&mut self, session: &mut Session, mut on_frame: F) -> LoopSummary
    where
        F: FnMut(&FrameOutcome),
    {
        if !self.start(session) {
            error!("session is missing its frame source or display, not starting");
            return self.finish(StopReason::NotReady);
        }
        info!(
            "tracking started (reference x = {}, telemetry {})",
            self.config.reference_x(),
            if session.has_telemetry() {
                "enabled"
            } else {
                "disabled"
            }
        );

        let reason = loop {
            if self.stop.is_requested() {
                info!("stop requested");
                break StopReason::Requested;
            }
            match self.step(session) {
                Ok(outcome) => on_frame(&outcome),
                Err(StageError::Acquisition(AcquisitionError::Exhausted)) => {
                    info!("frame source exhausted");
                    break StopReason::SourceExhausted;
                }
                Err(err) if err.is_fatal() => {
                    error!("{err}, stopping");
                    break StopReason::SourceLost(err.to_string());
                }
                Err(err) => {
                    self.stats.recovered_errors += 1;
                    if self.config.log_errors {
                        warn!("frame {} skipped while {err}", self.stats.frames);
                    }
                }
            }
        };
        self.finish(reason)
    }

    /// Run exactly one iteration.
    ///
    /// Transport failures are folded into the outcome; a failing detector,
    /// display or frame capture is returned as the stage that raised it.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip_all, fields(frame = self.stats.frames))
    )]
    pub fn step(&mut self, session: &mut Session) -> Result<FrameOutcome, StageError> {
        self.fps.tick();

        self.stage = Some(FrameStage::Acquiring);
        let mut frame = session
            .frame_source_mut()
            .ok_or(AcquisitionError::NotAcquired(Resource::FrameSource))?
            .snapshot()?;
        self.stats.frames += 1;

        self.stage = Some(FrameStage::Detecting);
        let flat = self
            .detector
            .find_rectangles(&frame.gray.view(), &self.config.detection)?;
        let candidates = candidates_from_flat(&flat);

        self.stage = Some(FrameStage::SelectingAndFiltering);
        let mut outcome = FrameOutcome::empty(frame.index, candidates.len());
        let target = match select_best(&candidates, &self.config.selection) {
            Some(rect) => Some(self.track(rect, session, &mut outcome)),
            None => {
                self.filter.reset();
                None
            }
        };
        outcome.sample_count = self.filter.sample_count();
        debug!(
            "frame {}: {} candidates, selected {:?}, error {:?}",
            outcome.index, outcome.candidates, outcome.selected, outcome.error
        );

        self.stage = Some(FrameStage::Rendering);
        let ctx = OverlayContext {
            mode: self.config.display_mode,
            frame_width: self.config.detect_width,
            reference: self.config.reference_center(),
            fps: self.fps.fps(),
        };
        draw_detection_info(&mut frame.overlay, target.as_ref(), outcome.error, &ctx);
        let placement = session.placement();
        session
            .sink_mut()
            .ok_or(AcquisitionError::NotAcquired(Resource::DisplaySink))?
            .show(&frame, &placement)?;

        Ok(outcome)
    }

    /// Smooth, measure and transmit a selected target.
    fn track(
        &mut self,
        rect: RectCandidate,
        session: &mut Session,
        outcome: &mut FrameOutcome,
    ) -> DisplayTarget {
        self.stats.detections += 1;

        let corners = rect.corners();
        let center = corners_center(&corners);
        let error = compute_tracking_error(
            center.x,
            self.config.reference_x(),
            self.config.max_error_range,
        );
        self.filter.add_sample(&corners, center);

        self.stage = Some(FrameStage::Transmitting);
        outcome.telemetry = self.transmit(session, error);

        let filtered_corners = self.filter.filtered_corners();
        let filtered_center = self.filter.filtered_center();
        outcome.selected = Some(rect);
        outcome.raw_center = Some(center);
        outcome.filtered_corners = filtered_corners;
        outcome.filtered_center = filtered_center;
        outcome.error = Some(error);

        DisplayTarget {
            rect: filtered_corners
                .as_ref()
                .map_or(rect, RectCandidate::bounding),
            center: filtered_center.unwrap_or(center),
        }
    }

    fn transmit(&mut self, session: &mut Session, error: i32) -> TelemetryStatus {
        let frame = TelemetryFrame::encode(error, self.config.max_error_range);
        let Some(port) = session.telemetry_mut() else {
            self.stats.telemetry_unlinked += 1;
            return TelemetryStatus::NoLink;
        };
        match port.write_frame(&frame) {
            Ok(()) => {
                self.stats.telemetry_sent += 1;
                TelemetryStatus::Sent {
                    error: frame.error(),
                }
            }
            Err(err) => {
                self.stats.telemetry_failed += 1;
                if self.config.log_errors {
                    warn!("telemetry dropped: {err}");
                }
                TelemetryStatus::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }

    fn finish(&mut self, reason: StopReason) -> LoopSummary {
        self.state = LoopState::Stopped;
        self.stage = None;
        let s = &self.stats;
        info!(
            "tracking stopped ({reason:?}): {} frames, {} detections, {} sent, {} failed, {} recovered errors",
            s.frames, s.detections, s.telemetry_sent, s.telemetry_failed, s.recovered_errors
        );
        LoopSummary {
            reason,
            stats: self.stats.clone(),
        }
    }
}
