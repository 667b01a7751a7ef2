use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate in detection-resolution space.
pub type PixelPoint = Point2<i32>;

/// Axis-aligned rectangle proposed by the external detector for one frame.
///
/// `(x, y)` is the top-left corner, `width`/`height` the extent in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RectCandidate {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RectCandidate {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// `width * height`, widened so extreme detector output cannot overflow.
    #[inline]
    pub fn area(&self) -> i64 {
        i64::from(self.width) * i64::from(self.height)
    }

    /// `width / height`, or `None` for a degenerate zero-height rectangle.
    #[inline]
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            return None;
        }
        Some(f64::from(self.width) / f64::from(self.height))
    }

    /// Corners in the order top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [PixelPoint; 4] {
        let right = self.x.saturating_add(self.width);
        let bottom = self.y.saturating_add(self.height);
        [
            Point2::new(self.x, self.y),
            Point2::new(right, self.y),
            Point2::new(right, bottom),
            Point2::new(self.x, bottom),
        ]
    }

    /// Center of the four corners, see [`corners_center`].
    pub fn center(&self) -> PixelPoint {
        corners_center(&self.corners())
    }

    /// Axis-aligned bounding box of an arbitrary corner quadruple.
    pub fn bounding(corners: &[PixelPoint; 4]) -> Self {
        let min_x = corners.iter().map(|p| p.x).min().unwrap_or(0);
        let max_x = corners.iter().map(|p| p.x).max().unwrap_or(0);
        let min_y = corners.iter().map(|p| p.y).min().unwrap_or(0);
        let max_y = corners.iter().map(|p| p.y).max().unwrap_or(0);
        Self::new(min_x, min_y, max_x - min_x, max_y - min_y)
    }
}

/// Arithmetic mean of four corners.
///
/// The sum is accumulated in `f64` and each coordinate is truncated toward
/// zero, never rounded. Downstream consumers depend on this exact behavior.
pub fn corners_center(corners: &[PixelPoint; 4]) -> PixelPoint {
    let sx: f64 = corners.iter().map(|p| f64::from(p.x)).sum();
    let sy: f64 = corners.iter().map(|p| f64::from(p.y)).sum();
    Point2::new((sx / 4.0) as i32, (sy / 4.0) as i32)
}

/// Split the detector's flat `(x, y, w, h)*` output into candidates.
///
/// A trailing incomplete quadruple is ignored.
pub fn candidates_from_flat(flat: &[i32]) -> Vec<RectCandidate> {
    flat.chunks_exact(4)
        .map(|q| RectCandidate::new(q[0], q[1], q[2], q[3]))
        .collect()
}
