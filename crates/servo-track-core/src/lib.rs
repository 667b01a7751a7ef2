//! Core types for the servo-track rectangle tracker.
//!
//! This crate is intentionally small and free of any hardware or detector
//! dependency. It provides:
//! - axis-aligned rectangle candidates and their derived corners / center,
//! - grayscale frame buffers handed to the external detector,
//! - overlay primitives attached to a frame before it reaches the display,
//! - a minimal stderr logger (and an optional `tracing` subscriber).

mod frame;
mod geometry;
mod logger;
mod overlay;

pub use frame::{Frame, FrameError, GrayImage, GrayImageView};
pub use geometry::{candidates_from_flat, corners_center, PixelPoint, RectCandidate};
pub use overlay::{Color, Overlay, OverlayPrimitive};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{init_with_level, level_from_verbosity};
