//! The per-frame tracking loop.
//!
//! One iteration runs the stages Acquiring, Detecting,
//! SelectingAndFiltering, Transmitting and Rendering against a
//! [`Session`](crate::Session). Failures inside an iteration are recovered
//! at the iteration boundary; only a lost frame source or an explicit stop
//! ends the loop.

mod pipeline;
mod result;
mod state;

pub use pipeline::TrackingLoop;
pub use result::{FrameOutcome, LoopStats, LoopSummary, StopReason, TelemetryStatus};
pub use state::{FrameStage, LoopState, StopHandle};
