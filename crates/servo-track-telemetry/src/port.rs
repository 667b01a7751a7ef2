use std::io::Write;

use crate::wire::TelemetryFrame;

/// Errors raised while pushing a frame onto the link.
///
/// These are never fatal to the tracking loop: the frame is dropped and the
/// next detection produces a fresh one.
#[derive(thiserror::Error, Debug)]
pub enum TransportError {
    #[error("serial write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("serial link is closed")]
    Closed,
    #[error("serial link rejected the frame: {0}")]
    Rejected(String),
}

/// Sink for encoded telemetry frames (a UART on the board, a file or pipe
/// when replaying).
pub trait TelemetryPort {
    /// Write one complete frame. Partial writes must surface as an error.
    fn write_frame(&mut self, frame: &TelemetryFrame) -> Result<(), TransportError>;

    /// Tear the link down. Called once by the session on release.
    fn close(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// [`TelemetryPort`] over any byte writer.
#[derive(Debug)]
pub struct WritePort<W: Write> {
    inner: Option<W>,
    frames_written: u64,
}

impl<W: Write> WritePort<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Some(inner),
            frames_written: 0,
        }
    }

    /// Number of frames successfully written so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Consume the port and hand back the writer, if not yet closed.
    pub fn into_inner(self) -> Option<W> {
        self.inner
    }
}

impl<W: Write> TelemetryPort for WritePort<W> {
    fn write_frame(&mut self, frame: &TelemetryFrame) -> Result<(), TransportError> {
        let inner = self.inner.as_mut().ok_or(TransportError::Closed)?;
        inner.write_all(frame.as_bytes())?;
        inner.flush()?;
        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), TransportError> {
        match self.inner.take() {
            Some(mut inner) => Ok(inner.flush()?),
            None => Ok(()),
        }
    }
}
