//! Overlay composition for the live view.

use servo_track_core::{Color, Overlay, PixelPoint, RectCandidate};

use crate::config::DisplayMode;

/// What gets drawn for the current target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DisplayTarget {
    /// Filtered bounding box when the filter is warm, otherwise the raw
    /// selection.
    pub rect: RectCandidate,
    pub center: PixelPoint,
}

/// Frame-level context for the overlay.
#[derive(Clone, Copy, Debug)]
pub struct OverlayContext {
    pub mode: DisplayMode,
    pub frame_width: u32,
    pub reference: PixelPoint,
    pub fps: f64,
}

/// Draw target box, corner and center markers, the reference marker and the
/// status labels.
pub fn draw_detection_info(
    overlay: &mut Overlay,
    target: Option<&DisplayTarget>,
    error: Option<i32>,
    ctx: &OverlayContext,
) {
    if let Some(target) = target {
        overlay.rect(target.rect, Color::GREEN, 2);
        for corner in target.rect.corners() {
            overlay.circle(corner, 5, Color::RED, 2);
        }
        overlay.circle(target.center, 8, Color::BLUE, 2);
    }

    overlay.circle(ctx.reference, 3, Color::YELLOW, 2);

    overlay.text(5, 5, 16, format!("FPS: {:.1}", ctx.fps), Color::WHITE);
    overlay.text(5, 25, 16, format!("Mode: {}", ctx.mode), Color::WHITE);

    if let Some(error) = error {
        let x = i32::try_from(ctx.frame_width)
            .unwrap_or(i32::MAX)
            .saturating_sub(150);
        let label = format!("Error: {:.1}", f64::from(error));
        overlay.text(x, 5, 16, label, Color::CYAN);
    }
}
