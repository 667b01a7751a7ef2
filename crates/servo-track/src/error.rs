//! Failure taxonomy of the tracker.
//!
//! Startup failures of the frame source or display abort the session.
//! Everything that happens inside one loop iteration is recovered at the
//! iteration boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use servo_track_core::FrameError;
use servo_track_telemetry::{SerialConfigError, TransportError};

/// Hardware resources owned by a session, in acquisition order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    SerialLink,
    FrameSource,
    DisplaySink,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Resource::SerialLink => "serial link",
            Resource::FrameSource => "frame source",
            Resource::DisplaySink => "display sink",
        })
    }
}

/// A resource could not be opened, or a frame could not be captured.
#[derive(thiserror::Error, Debug)]
pub enum AcquisitionError {
    #[error("{resource} unavailable: {reason}")]
    Unavailable { resource: Resource, reason: String },
    #[error("{0} was not acquired")]
    NotAcquired(Resource),
    #[error("frame source disconnected: {0}")]
    Disconnected(String),
    #[error("frame source exhausted")]
    Exhausted,
    #[error("frame capture failed: {0}")]
    Transient(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid serial settings: {0}")]
    Configuration(#[from] SerialConfigError),
}

impl AcquisitionError {
    /// A fatal capture error ends the loop; anything else skips one frame.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, AcquisitionError::Transient(_))
    }
}

/// The external detector failed on a frame.
#[derive(thiserror::Error, Debug)]
pub enum DetectionError {
    #[error("detector failed: {0}")]
    Failed(String),
    #[error(transparent)]
    Frame(#[from] FrameError),
}

/// The display sink could not show a frame.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("display rejected the frame: {0}")]
    Failed(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Teardown of one resource failed. Release continues with the others.
#[derive(thiserror::Error, Debug)]
#[error("releasing {resource} failed: {reason}")]
pub struct ReleaseError {
    pub resource: Resource,
    pub reason: String,
}

impl ReleaseError {
    pub fn new(resource: Resource, reason: impl fmt::Display) -> Self {
        Self {
            resource,
            reason: reason.to_string(),
        }
    }
}

impl From<(Resource, TransportError)> for ReleaseError {
    fn from((resource, err): (Resource, TransportError)) -> Self {
        Self::new(resource, err)
    }
}

/// Session startup failed on a required resource.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("failed to open {resource}: {source}")]
    Startup {
        resource: Resource,
        #[source]
        source: AcquisitionError,
    },
}

/// Failure of one loop iteration, tagged by the stage that raised it.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("acquiring: {0}")]
    Acquisition(#[from] AcquisitionError),
    #[error("detecting: {0}")]
    Detection(#[from] DetectionError),
    #[error("rendering: {0}")]
    Render(#[from] RenderError),
}

impl StageError {
    /// Only losing the frame source ends the loop.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StageError::Acquisition(err) if err.is_fatal())
    }
}
