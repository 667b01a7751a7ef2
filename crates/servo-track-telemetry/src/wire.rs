use serde::{Deserialize, Serialize};

pub const FRAME_HEADER: [u8; 2] = [0x66, 0x66];
pub const FRAME_TRAILER: [u8; 2] = [0xF6, 0xF6];
pub const FRAME_LEN: usize = 6;

/// Clamp applied when no range is configured.
pub const DEFAULT_MAX_ERROR_RANGE: u16 = 100;

/// Errors returned when parsing a frame on the receiving side.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DecodeError {
    #[error("telemetry frame must be 6 bytes, got {got}")]
    Length { got: usize },
    #[error("bad frame header {found:02X?}")]
    Header { found: [u8; 2] },
    #[error("bad frame trailer {found:02X?}")]
    Trailer { found: [u8; 2] },
}

/// One encoded tracking-error frame, ready to be written to the link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TelemetryFrame {
    bytes: [u8; FRAME_LEN],
}

impl TelemetryFrame {
    /// Encode `error`, clamped to `[-max_range, max_range]`.
    ///
    /// The clamp is applied even when the caller already clamped; the range
    /// itself is capped at `i16::MAX` so the payload always fits. Negative
    /// values go out as 16-bit two's complement, i.e. `error + 65536`.
    pub fn encode(error: i32, max_range: u16) -> Self {
        let limit = i32::from(max_range.min(i16::MAX as u16));
        let clamped = error.max(-limit).min(limit) as i16;
        let [lo, hi] = clamped.to_le_bytes();
        Self {
            bytes: [
                FRAME_HEADER[0],
                FRAME_HEADER[1],
                lo,
                hi,
                FRAME_TRAILER[0],
                FRAME_TRAILER[1],
            ],
        }
    }

    /// Parse exactly one frame.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let bytes: [u8; FRAME_LEN] = bytes
            .try_into()
            .map_err(|_| DecodeError::Length { got: bytes.len() })?;
        let header = [bytes[0], bytes[1]];
        if header != FRAME_HEADER {
            return Err(DecodeError::Header { found: header });
        }
        let trailer = [bytes[4], bytes[5]];
        if trailer != FRAME_TRAILER {
            return Err(DecodeError::Trailer { found: trailer });
        }
        Ok(Self { bytes })
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.bytes
    }

    /// Signed error carried in the payload.
    #[inline]
    pub fn error(&self) -> i16 {
        i16::from_le_bytes([self.bytes[2], self.bytes[3]])
    }
}

/// Extract every well-formed frame from a captured byte stream.
///
/// Bytes that do not start a valid frame are skipped one at a time, so the
/// scan resynchronizes after line noise or a partial write.
pub fn decode_stream(stream: &[u8]) -> Vec<TelemetryFrame> {
    let mut frames = Vec::new();
    let mut i = 0;
    while i + FRAME_LEN <= stream.len() {
        match TelemetryFrame::decode(&stream[i..i + FRAME_LEN]) {
            Ok(frame) => {
                frames.push(frame);
                i += FRAME_LEN;
            }
            Err(_) => i += 1,
        }
    }
    frames
}
