//! Pattern Painting
//!
//! Frame content is produced by a [`Painter`], a pure function of the frame
//! geometry, the selected [`Pattern`] and the painter's own state. The default
//! [`TestPattern`] paints SMPTE-style colour bars and snow.

// SPDX-FileCopyrightText: 2025 2025 Contributors to the Media eXchange Layer project.
// SPDX-License-Identifier: Apache-2.0

use super::state::Pattern;

/// Pixel encodings the source can paint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// Packed 8-bit R, G, B.
    Rgb,
    /// Packed 4:2:2, `U Y0 V Y1` per pixel pair.
    Uyvy,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Uyvy => 2,
        }
    }
}

/// A frame to paint.
///
/// `data` holds up to `height` rows of `stride` bytes; rows that do not fit are
/// not painted.
#[derive(Debug)]
pub struct Frame<'a> {
    pub data: &'a mut [u8],
    pub format: PixelFormat,
    pub width: u32,
    pub height: u32,
    pub stride: u32,
    pub pattern: Pattern,
    /// Sequence number of the frame being painted.
    pub frame_count: u64,
}

/// Fills frames with synthetic content.
pub trait Painter {
    fn paint(&mut self, frame: Frame<'_>);
}

/// 75% colour bars: white, yellow, cyan, green, magenta, red, blue.
const BARS: [[u8; 3]; 7] = [
    [191, 191, 191],
    [191, 191, 0],
    [0, 191, 191],
    [0, 191, 0],
    [191, 0, 191],
    [191, 0, 0],
    [0, 0, 191],
];

/// BT.601 studio-range conversion.
fn rgb_to_yuv([r, g, b]: [u8; 3]) -> (u8, u8, u8) {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    let y = ((66 * r + 129 * g + 25 * b + 128) >> 8) + 16;
    let u = ((-38 * r - 74 * g + 112 * b + 128) >> 8) + 128;
    let v = ((112 * r - 94 * g - 18 * b + 128) >> 8) + 128;
    (y as u8, u as u8, v as u8)
}

/// The built-in painter.
#[derive(Debug, Clone)]
pub struct TestPattern {
    rng_state: u32,
}

impl Default for TestPattern {
    fn default() -> Self {
        Self::with_seed(0x9E37_79B9)
    }
}

impl TestPattern {
    pub fn with_seed(seed: u32) -> Self {
        // zero is a fixed point of xorshift
        TestPattern {
            rng_state: seed.max(1),
        }
    }

    // xorshift32
    fn next_random(&mut self) -> u8 {
        let mut x = self.rng_state;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng_state = x;
        (x >> 24) as u8
    }

    fn paint_bars(&self, row: &mut [u8], format: PixelFormat, width: u32) {
        let bar = |x: u32| BARS[(x as usize * BARS.len()) / width as usize];
        match format {
            PixelFormat::Rgb => {
                for (x, pixel) in row.chunks_exact_mut(3).take(width as usize).enumerate() {
                    pixel.copy_from_slice(&bar(x as u32));
                }
            }
            PixelFormat::Uyvy => {
                for (pair, pixels) in row.chunks_exact_mut(4).take(width.div_ceil(2) as usize).enumerate() {
                    let x = pair as u32 * 2;
                    let (y0, u, v) = rgb_to_yuv(bar(x));
                    let (y1, _, _) = rgb_to_yuv(bar((x + 1).min(width - 1)));
                    pixels.copy_from_slice(&[u, y0, v, y1]);
                }
            }
        }
    }

    fn paint_snow(&mut self, row: &mut [u8], format: PixelFormat, width: u32) {
        match format {
            PixelFormat::Rgb => {
                for pixel in row.chunks_exact_mut(3).take(width as usize) {
                    pixel.fill(self.next_random());
                }
            }
            PixelFormat::Uyvy => {
                for pixels in row.chunks_exact_mut(4).take(width.div_ceil(2) as usize) {
                    let y0 = self.next_random();
                    let y1 = self.next_random();
                    pixels.copy_from_slice(&[128, y0, 128, y1]);
                }
            }
        }
    }
}

impl Painter for TestPattern {
    fn paint(&mut self, frame: Frame<'_>) {
        if frame.width == 0 || frame.stride == 0 {
            return;
        }
        let bars_height = match frame.pattern {
            Pattern::SmpteSnow => frame.height * 2 / 3,
            Pattern::Snow => 0,
        };
        let rows = frame
            .data
            .chunks_mut(frame.stride as usize)
            .take(frame.height as usize);
        for (y, row) in rows.enumerate() {
            if (y as u32) < bars_height {
                self.paint_bars(row, frame.format, frame.width);
            } else {
                self.paint_snow(row, frame.format, frame.width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paint(pattern: Pattern, format: PixelFormat, width: u32, height: u32) -> Vec<u8> {
        let stride = (width * format.bytes_per_pixel()).next_multiple_of(4);
        let mut data = vec![0u8; (stride * height) as usize];
        TestPattern::default().paint(Frame {
            data: &mut data,
            format,
            width,
            height,
            stride,
            pattern,
            frame_count: 0,
        });
        data
    }

    #[test]
    fn smpte_starts_white_and_ends_blue() {
        let data = paint(Pattern::SmpteSnow, PixelFormat::Rgb, 14, 3);
        assert_eq!(&data[0..3], &[191, 191, 191]);
        assert_eq!(&data[13 * 3..14 * 3], &[0, 0, 191]);
    }

    #[test]
    fn uyvy_bars_use_studio_range() {
        let data = paint(Pattern::SmpteSnow, PixelFormat::Uyvy, 14, 3);
        let (y, u, v) = rgb_to_yuv(BARS[0]);
        assert_eq!(&data[0..4], &[u, y, v, y]);
        assert_eq!(u, 128);
        assert_eq!(v, 128);
    }

    #[test]
    fn snow_is_grey_and_changes() {
        let data = paint(Pattern::Snow, PixelFormat::Rgb, 8, 8);
        for pixel in data.chunks_exact(3) {
            assert!(pixel[0] == pixel[1] && pixel[1] == pixel[2]);
        }
        assert!(data.chunks_exact(3).any(|pixel| pixel[0] != data[0]));
    }

    #[test]
    fn short_buffers_are_painted_partially() {
        let mut data = vec![0u8; 10];
        TestPattern::default().paint(Frame {
            data: &mut data,
            format: PixelFormat::Rgb,
            width: 4,
            height: 4,
            stride: 12,
            pattern: Pattern::SmpteSnow,
            frame_count: 0,
        });
        assert_eq!(&data[0..3], &[191, 191, 191]);
    }
}
