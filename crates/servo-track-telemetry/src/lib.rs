//! Serial telemetry for the servo-track tracking loop.
//!
//! Every successful detection produces one fixed 6-byte frame carrying the
//! clamped horizontal tracking error:
//!
//! ```text
//! [0]=0x66 [1]=0x66 [2..3]=i16 little-endian [4]=0xF6 [5]=0xF6
//! ```
//!
//! ```
//! use servo_track_telemetry::TelemetryFrame;
//!
//! let frame = TelemetryFrame::encode(-50, 100);
//! assert_eq!(frame.as_bytes(), &[0x66, 0x66, 0xCE, 0xFF, 0xF6, 0xF6]);
//! ```
//!
//! The crate also provides the [`TelemetryPort`] seam the loop writes
//! through, an adapter for any `std::io::Write`, and validation for the
//! serial link settings.

mod link;
mod port;
mod wire;

pub use link::{SerialConfigError, SerialSettings, SUPPORTED_BAUD_RATES};
pub use port::{TelemetryPort, TransportError, WritePort};
pub use wire::{
    decode_stream, DecodeError, TelemetryFrame, DEFAULT_MAX_ERROR_RANGE, FRAME_HEADER, FRAME_LEN,
    FRAME_TRAILER,
};
