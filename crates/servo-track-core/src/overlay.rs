use serde::{Deserialize, Serialize};

use crate::geometry::{PixelPoint, RectCandidate};

/// RGB color of an overlay primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);
    pub const CYAN: Self = Self::rgb(0, 255, 255);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// A shape or label to be rasterized by the display sink.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayPrimitive {
    Rect {
        rect: RectCandidate,
        color: Color,
        thickness: u32,
    },
    Circle {
        center: PixelPoint,
        radius: u32,
        color: Color,
        thickness: u32,
    },
    Text {
        x: i32,
        y: i32,
        size: u32,
        text: String,
        color: Color,
    },
}

/// Ordered list of primitives; later entries are drawn on top.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Overlay {
    pub primitives: Vec<OverlayPrimitive>,
}

impl Overlay {
    pub fn rect(&mut self, rect: RectCandidate, color: Color, thickness: u32) {
        self.primitives.push(OverlayPrimitive::Rect {
            rect,
            color,
            thickness,
        });
    }

    pub fn circle(&mut self, center: PixelPoint, radius: u32, color: Color, thickness: u32) {
        self.primitives.push(OverlayPrimitive::Circle {
            center,
            radius,
            color,
            thickness,
        });
    }

    pub fn text(&mut self, x: i32, y: i32, size: u32, text: impl Into<String>, color: Color) {
        self.primitives.push(OverlayPrimitive::Text {
            x,
            y,
            size,
            text: text.into(),
            color,
        });
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Text labels in drawing order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            OverlayPrimitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}
