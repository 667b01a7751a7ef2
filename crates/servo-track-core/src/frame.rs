use crate::overlay::Overlay;

/// Errors raised when wrapping a raw grayscale buffer.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("invalid grayscale buffer length (expected {expected} bytes, got {got})")]
    InvalidBuffer { expected: usize, got: usize },

    #[error("invalid frame dimensions (width={width}, height={height})")]
    InvalidDimensions { width: usize, height: usize },
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

impl GrayImageView<'_> {
    /// `[height, width]`, the shape layout the detector expects.
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        [self.height, self.width]
    }

    /// Pixel at `(x, y)`, or 0 outside the image.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return 0;
        }
        self.data[y as usize * self.width + x as usize]
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    /// Uniform image of the given size.
    pub fn filled(width: usize, height: usize, value: u8) -> Result<Self, FrameError> {
        let len = checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }

    /// Wrap a row-major buffer, validating its length.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = checked_len(width, height)?;
        if data.len() != expected {
            return Err(FrameError::InvalidBuffer {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

fn checked_len(width: usize, height: usize) -> Result<usize, FrameError> {
    if width == 0 || height == 0 {
        return Err(FrameError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(FrameError::InvalidDimensions { width, height })
}

/// One captured frame: the grayscale pixels fed to the detector plus the
/// overlay drawn on top of it before it is shown.
///
/// Frames are scoped to a single loop iteration; dropping one releases its
/// buffer.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Sequence number assigned by the frame source.
    pub index: u64,
    pub gray: GrayImage,
    pub overlay: Overlay,
}

impl Frame {
    pub fn new(index: u64, gray: GrayImage) -> Self {
        Self {
            index,
            gray,
            overlay: Overlay::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_short_buffer() {
        let err = GrayImage::from_raw(4, 2, vec![0; 7]).unwrap_err();
        assert_eq!(
            err,
            FrameError::InvalidBuffer {
                expected: 8,
                got: 7
            }
        );
    }

    #[test]
    fn zero_sized_frames_are_rejected() {
        assert!(matches!(
            GrayImage::filled(0, 240, 0),
            Err(FrameError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn view_reports_height_first_shape() {
        let img = GrayImage::filled(320, 240, 7).unwrap();
        let view = img.view();
        assert_eq!(view.shape(), [240, 320]);
        assert_eq!(view.get(319, 239), 7);
        assert_eq!(view.get(320, 0), 0);
        assert_eq!(view.get(-1, 0), 0);
    }
}
