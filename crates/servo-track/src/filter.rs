//! Temporal smoothing of the tracked corners and center.
//!
//! Each tracked point gets its own exponential moving average. The bank
//! updates all five channels together and only emits output once
//! `min_frames` samples have been accumulated since the last reset.

use nalgebra::Point2;
use servo_track_core::PixelPoint;

use crate::config::FilterParams;

/// EMA state for one tracked point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SmoothedPoint {
    smooth_x: f64,
    smooth_y: f64,
    initialized: bool,
}

impl SmoothedPoint {
    /// The first sample seeds the state; later samples are blended with
    /// weight `alpha`.
    pub fn update(&mut self, p: PixelPoint, alpha: f64) {
        let (x, y) = (f64::from(p.x), f64::from(p.y));
        if self.initialized {
            self.smooth_x = alpha * x + (1.0 - alpha) * self.smooth_x;
            self.smooth_y = alpha * y + (1.0 - alpha) * self.smooth_y;
        } else {
            self.smooth_x = x;
            self.smooth_y = y;
            self.initialized = true;
        }
    }

    /// Unquantized smoothed position.
    pub fn smoothed(&self) -> Option<(f64, f64)> {
        self.initialized.then_some((self.smooth_x, self.smooth_y))
    }

    /// Smoothed position truncated toward zero.
    pub fn position(&self) -> Option<PixelPoint> {
        self.smoothed()
            .map(|(x, y)| Point2::new(x as i32, y as i32))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Four corner smoothers plus one center smoother with warm-up gating.
#[derive(Clone, Debug, PartialEq)]
pub struct CoordinateFilterBank {
    corners: [SmoothedPoint; 4],
    center: SmoothedPoint,
    sample_count: u32,
    alpha: f64,
    min_frames: u32,
}

impl CoordinateFilterBank {
    pub fn new(params: FilterParams) -> Self {
        debug_assert!(params.alpha > 0.0 && params.alpha <= 1.0);
        Self {
            corners: [SmoothedPoint::default(); 4],
            center: SmoothedPoint::default(),
            sample_count: 0,
            alpha: params.alpha,
            min_frames: params.min_frames,
        }
    }

    /// Feed one frame's corners and center into every channel.
    pub fn add_sample(&mut self, corners: &[PixelPoint; 4], center: PixelPoint) {
        for (filter, corner) in self.corners.iter_mut().zip(corners) {
            filter.update(*corner, self.alpha);
        }
        self.center.update(center, self.alpha);
        self.sample_count = self.sample_count.saturating_add(1);
    }

    /// Samples accumulated since construction or the last [`reset`](Self::reset).
    #[inline]
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Whether the warm-up gate is open.
    #[inline]
    pub fn is_warm(&self) -> bool {
        self.sample_count >= self.min_frames
    }

    pub fn filtered_corners(&self) -> Option<[PixelPoint; 4]> {
        if !self.is_warm() {
            return None;
        }
        let [a, b, c, d] = &self.corners;
        Some([a.position()?, b.position()?, c.position()?, d.position()?])
    }

    pub fn filtered_center(&self) -> Option<PixelPoint> {
        if !self.is_warm() {
            return None;
        }
        self.center.position()
    }

    /// Raw smoothing state of the center channel, for diagnostics.
    pub fn center_state(&self) -> &SmoothedPoint {
        &self.center
    }

    /// Forget all state; the next sample starts a fresh warm-up.
    pub fn reset(&mut self) {
        for filter in &mut self.corners {
            filter.reset();
        }
        self.center.reset();
        self.sample_count = 0;
    }
}
