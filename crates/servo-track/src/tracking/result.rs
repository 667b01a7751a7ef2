use serde::{Deserialize, Serialize};
use servo_track_core::{PixelPoint, RectCandidate};

/// What happened to the telemetry of one frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TelemetryStatus {
    /// A frame carrying `error` was written to the link.
    Sent { error: i16 },
    /// The link rejected the write; the frame was dropped.
    Failed { reason: String },
    /// The session has no serial link; the frame was encoded and discarded.
    NoLink,
    /// No target this frame, nothing to send.
    Skipped,
}

/// Per-frame result handed to loop observers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameOutcome {
    pub index: u64,
    /// Number of raw candidates returned by the detector.
    pub candidates: usize,
    pub selected: Option<RectCandidate>,
    pub raw_center: Option<PixelPoint>,
    pub filtered_center: Option<PixelPoint>,
    pub filtered_corners: Option<[PixelPoint; 4]>,
    /// Clamped tracking error sent for this frame.
    pub error: Option<i32>,
    pub telemetry: TelemetryStatus,
    /// Filter samples accumulated after this frame.
    pub sample_count: u32,
}

impl FrameOutcome {
    pub(crate) fn empty(index: u64, candidates: usize) -> Self {
        Self {
            index,
            candidates,
            selected: None,
            raw_center: None,
            filtered_center: None,
            filtered_corners: None,
            error: None,
            telemetry: TelemetryStatus::Skipped,
            sample_count: 0,
        }
    }
}

/// Running counters of a tracking loop.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopStats {
    /// Frames captured.
    pub frames: u64,
    /// Frames with a selected target.
    pub detections: u64,
    pub telemetry_sent: u64,
    pub telemetry_failed: u64,
    /// Targets whose frame could not be sent because there is no link.
    pub telemetry_unlinked: u64,
    /// Iterations abandoned by a recovered stage error.
    pub recovered_errors: u64,
}

/// Why the loop left `Running`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum StopReason {
    Requested,
    SourceExhausted,
    SourceLost(String),
    /// The session was missing a required resource.
    NotReady,
}

/// Final state of a loop run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoopSummary {
    pub reason: StopReason,
    pub stats: LoopStats,
}
