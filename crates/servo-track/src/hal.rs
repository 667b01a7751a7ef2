//! Seams to the board: camera, detector, display and the resource provider
//! that opens them.

use servo_track_core::{Frame, GrayImageView};
use servo_track_telemetry::{SerialSettings, TelemetryPort};

use crate::config::{DetectionParams, TrackerConfig};
use crate::display::DisplayPlacement;
use crate::error::{AcquisitionError, DetectionError, ReleaseError, RenderError};

/// Blocking frame capture.
pub trait FrameSource {
    /// Capture the next frame, converted to grayscale.
    fn snapshot(&mut self) -> Result<Frame, AcquisitionError>;

    /// Stop the sensor. Called once when the session is released.
    fn release(&mut self) -> Result<(), ReleaseError> {
        Ok(())
    }
}

/// External rectangle detector, treated as a black box.
pub trait RectangleDetector {
    /// Return a flat `(x, y, w, h)*` sequence for the frame. The image shape
    /// is available as `image.shape()` (`[height, width]`).
    fn find_rectangles(
        &mut self,
        image: &GrayImageView<'_>,
        params: &DetectionParams,
    ) -> Result<Vec<i32>, DetectionError>;
}

impl<D: RectangleDetector + ?Sized> RectangleDetector for Box<D> {
    fn find_rectangles(
        &mut self,
        image: &GrayImageView<'_>,
        params: &DetectionParams,
    ) -> Result<Vec<i32>, DetectionError> {
        (**self).find_rectangles(image, params)
    }
}

/// Display output.
pub trait FrameSink {
    /// Rasterize the frame with its overlay at `placement`.
    fn show(&mut self, frame: &Frame, placement: &DisplayPlacement) -> Result<(), RenderError>;

    /// Shut the display down. Called once when the session is released.
    fn release(&mut self) -> Result<(), ReleaseError> {
        Ok(())
    }
}

/// Opens the hardware handles a session owns.
pub trait ResourceProvider {
    fn open_telemetry(
        &mut self,
        settings: &SerialSettings,
    ) -> Result<Box<dyn TelemetryPort>, AcquisitionError>;

    fn open_frame_source(
        &mut self,
        cfg: &TrackerConfig,
    ) -> Result<Box<dyn FrameSource>, AcquisitionError>;

    fn open_sink(
        &mut self,
        placement: &DisplayPlacement,
    ) -> Result<Box<dyn FrameSink>, AcquisitionError>;
}
