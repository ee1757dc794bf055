//! Row-based BGRA pixel primitives.
//!
//! Both functions take slices that start at the first pixel to read or
//! write. Indexing past the end of a slice panics, which is how an
//! out-of-bounds rectangle from a caller surfaces.

use crate::frame::BYTES_PER_PIXEL;
use crate::rotation::Rotation;

/// Copies `height` rows of `row_bytes` bytes each.
pub fn copy_plane(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    row_bytes: usize,
    height: usize,
) {
    if row_bytes == 0 || height == 0 {
        return;
    }
    for y in 0..height {
        let s = y * src_stride;
        let d = y * dst_stride;
        dst[d..d + row_bytes].copy_from_slice(&src[s..s + row_bytes]);
    }
}

/// Writes a `width` x `height` block of 32-bit pixels from `src` into `dst`
/// rotated clockwise by `rotation`. For 90 and 270 degrees the written block
/// is `height` pixels wide and `width` pixels tall.
pub fn rotate_argb(
    src: &[u8],
    src_stride: usize,
    dst: &mut [u8],
    dst_stride: usize,
    width: usize,
    height: usize,
    rotation: Rotation,
) {
    if width == 0 || height == 0 {
        return;
    }

    if rotation == Rotation::R0 {
        copy_plane(src, src_stride, dst, dst_stride, width * BYTES_PER_PIXEL, height);
        return;
    }

    for sy in 0..height {
        let src_row = &src[sy * src_stride..];
        for sx in 0..width {
            let (dx, dy) = match rotation {
                Rotation::R0 => (sx, sy),
                Rotation::R90 => (height - 1 - sy, sx),
                Rotation::R180 => (width - 1 - sx, height - 1 - sy),
                Rotation::R270 => (sy, width - 1 - sx),
            };
            let s = sx * BYTES_PER_PIXEL;
            let d = dy * dst_stride + dx * BYTES_PER_PIXEL;
            dst[d..d + BYTES_PER_PIXEL].copy_from_slice(&src_row[s..s + BYTES_PER_PIXEL]);
        }
    }
}

/// Reads the pixel at `index` (in pixels) as a little-endian BGRA word.
pub(crate) fn read_pixel(data: &[u8], index: usize) -> u32 {
    let i = index * BYTES_PER_PIXEL;
    u32::from_le_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]])
}

pub(crate) fn write_pixel(data: &mut [u8], index: usize, value: u32) {
    let i = index * BYTES_PER_PIXEL;
    data[i..i + BYTES_PER_PIXEL].copy_from_slice(&value.to_le_bytes());
}
