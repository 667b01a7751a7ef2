use serde::{Deserialize, Serialize};

use crate::config::{DisplayMode, TrackerConfig};

/// Physical canvas of the LCD panel.
pub const LCD_CANVAS: (u32, u32) = (800, 480);

/// Where a detection-resolution frame lands on the display canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayPlacement {
    pub mode: DisplayMode,
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Blit offset of the frame's top-left corner. Negative when the frame
    /// is larger than the canvas.
    pub offset_x: i32,
    pub offset_y: i32,
}

impl DisplayPlacement {
    /// VIRT shows the frame as-is; LCD centers it on the 800x480 panel.
    pub fn new(mode: DisplayMode, frame_width: u32, frame_height: u32) -> Self {
        match mode {
            DisplayMode::Virt => Self {
                mode,
                canvas_width: frame_width,
                canvas_height: frame_height,
                offset_x: 0,
                offset_y: 0,
            },
            DisplayMode::Lcd => {
                let (cw, ch) = LCD_CANVAS;
                Self {
                    mode,
                    canvas_width: cw,
                    canvas_height: ch,
                    offset_x: centered_offset(cw, frame_width),
                    offset_y: centered_offset(ch, frame_height),
                }
            }
        }
    }

    pub fn for_config(cfg: &TrackerConfig) -> Self {
        Self::new(cfg.display_mode, cfg.detect_width, cfg.detect_height)
    }
}

/// Floor division, so oversized frames are shifted the same way the panel
/// driver rounds.
fn centered_offset(canvas: u32, frame: u32) -> i32 {
    (i64::from(canvas) - i64::from(frame)).div_euclid(2) as i32
}
