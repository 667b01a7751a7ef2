use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Lifecycle of a [`TrackingLoop`](super::TrackingLoop).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopState {
    #[default]
    Idle,
    Running,
    Stopped,
}

/// Stages of one iteration, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStage {
    Acquiring,
    Detecting,
    SelectingAndFiltering,
    Transmitting,
    Rendering,
}

impl fmt::Display for FrameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FrameStage::Acquiring => "acquiring",
            FrameStage::Detecting => "detecting",
            FrameStage::SelectingAndFiltering => "selecting",
            FrameStage::Transmitting => "transmitting",
            FrameStage::Rendering => "rendering",
        })
    }
}

/// Cooperative stop request, checked between iterations.
///
/// Clones share the same flag, so a handle can be moved into a signal
/// handler or another thread.
#[derive(Clone, Debug, Default)]
pub struct StopHandle {
    flag: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn request_stop(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
