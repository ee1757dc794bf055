//! Mouse cursor shapes.
//!
//! Platform cursors arrive as an AND mask plus an optional color bitmap and
//! often carry no usable alpha. [`create_mouse_cursor`] turns them into a
//! premultiplied BGRA [`MouseCursor`] image. The individual stages are public
//! so backends with their own bitmap sources can reuse them.
//!
//! Inverting ("reverse-screen") pixels of monochrome cursors cannot be
//! expressed with alpha and are drawn black with a white outline instead.

use tracing::{instrument, trace, warn};

use crate::error::FrameError;
use crate::frame::{Frame, BYTES_PER_PIXEL};
use crate::geometry::{Rect, Size, Vector};
use crate::pixels::{read_pixel, write_pixel};
use crate::FrameResult;

const PIXEL_BLACK: u32 = 0xFF00_0000;
const PIXEL_WHITE: u32 = 0xFFFF_FFFF;
const PIXEL_TRANSPARENT: u32 = 0;

/// White in a mask plane. Mask planes carry no alpha.
const MASK_WHITE: u32 = 0x00FF_FFFF;

/// A cursor image with its click point.
#[derive(Debug, Default)]
pub struct MouseCursor {
    image: Option<Frame>,
    hotspot: Vector,
}

impl MouseCursor {
    /// Takes ownership of `image`. `hotspot` must lie inside it.
    pub fn new(image: Frame, hotspot: Vector) -> FrameResult<Self> {
        check_hotspot(&image, hotspot)?;
        Ok(Self {
            image: Some(image),
            hotspot,
        })
    }

    /// Deep-copies the image of `cursor`.
    pub fn copy_of(cursor: &MouseCursor) -> FrameResult<Self> {
        let image = cursor.image.as_ref().map(Frame::copy_of).transpose()?;
        Ok(Self {
            image,
            hotspot: cursor.hotspot,
        })
    }

    pub fn image(&self) -> Option<&Frame> {
        self.image.as_ref()
    }

    pub fn set_image(&mut self, image: Frame) -> FrameResult<()> {
        check_hotspot(&image, self.hotspot)?;
        self.image = Some(image);
        Ok(())
    }

    pub fn hotspot(&self) -> Vector {
        self.hotspot
    }

    pub fn set_hotspot(&mut self, hotspot: Vector) -> FrameResult<()> {
        if let Some(image) = &self.image {
            check_hotspot(image, hotspot)?;
        }
        self.hotspot = hotspot;
        Ok(())
    }
}

fn check_hotspot(image: &Frame, hotspot: Vector) -> FrameResult<()> {
    if Rect::make_size(image.size()).contains(hotspot) {
        Ok(())
    } else {
        Err(FrameError::HotspotOutOfBounds {
            hotspot,
            size: image.size(),
        })
    }
}

/// Raw cursor bitmaps as delivered by a platform, 32 bits per pixel with
/// rows packed at `4 * width` bytes.
#[derive(Debug, Clone, Copy)]
pub struct CursorBitmaps<'a> {
    pub width: i32,

    /// Height of `mask`. For monochrome cursors the mask holds the AND plane
    /// on top of the XOR plane, so the image is half as tall.
    pub height: i32,

    pub mask: &'a [u8],

    /// Color plane, `width` x `height`. `None` for monochrome cursors.
    pub color: Option<&'a [u8]>,

    pub hotspot: Vector,
}

/// Builds a premultiplied cursor image from platform bitmaps.
#[instrument(
    skip(bitmaps),
    fields(width = bitmaps.width, height = bitmaps.height, color = bitmaps.color.is_some())
)]
pub fn create_mouse_cursor(bitmaps: &CursorBitmaps<'_>) -> FrameResult<MouseCursor> {
    let width = bitmaps.width;
    if width <= 0 || bitmaps.height <= 0 {
        warn!("Rejecting empty cursor mask");
        return Err(FrameError::InvalidCursorBitmap(format!(
            "mask is {}x{}",
            width, bitmaps.height
        )));
    }

    let row_bytes = width as usize * BYTES_PER_PIXEL;
    let mask_bytes = row_bytes * bitmaps.height as usize;
    if bitmaps.mask.len() < mask_bytes {
        warn!(len = bitmaps.mask.len(), "Rejecting truncated cursor mask");
        return Err(FrameError::InvalidCursorBitmap(format!(
            "mask has {} bytes, expected {}",
            bitmaps.mask.len(),
            mask_bytes
        )));
    }

    let mut has_alpha = false;
    let mut image = match bitmaps.color {
        Some(color) => {
            if color.len() < mask_bytes {
                warn!(len = color.len(), "Rejecting truncated cursor color bitmap");
                return Err(FrameError::InvalidCursorBitmap(format!(
                    "color bitmap has {} bytes, expected {}",
                    color.len(),
                    mask_bytes
                )));
            }
            let size = Size::new(width, bitmaps.height);
            let mut image = Frame::new(size)?;
            image.copy_pixels_from_buffer(color, row_bytes, &Rect::make_size(size));
            has_alpha = has_alpha_channel(image.data(), image.stride(), size);
            image
        }
        None => {
            let height = bitmaps.height / 2;
            if height == 0 {
                warn!("Rejecting monochrome cursor without XOR plane");
                return Err(FrameError::InvalidCursorBitmap(
                    "monochrome mask needs at least two rows".to_string(),
                ));
            }
            let size = Size::new(width, height);
            let mut image = Frame::new(size)?;
            let xor_plane = &bitmaps.mask[row_bytes * height as usize..];
            image.copy_pixels_from_buffer(xor_plane, row_bytes, &Rect::make_size(size));
            image
        }
    };

    if !has_alpha && reconstruct_alpha_from_mask(&mut image, bitmaps.mask) {
        add_cursor_outline(&mut image);
    }
    premultiply_alpha(&mut image);

    trace!(size = %image.size(), has_alpha, "Reconstructed cursor image");
    MouseCursor::new(image, bitmaps.hotspot)
}

/// True if any visible pixel has a non-zero alpha byte.
pub fn has_alpha_channel(data: &[u8], stride: usize, size: Size) -> bool {
    let width = size.width.max(0) as usize;
    (0..size.height.max(0) as usize).any(|y| {
        let row = &data[y * stride..];
        (0..width).any(|x| row[x * BYTES_PER_PIXEL + 3] != 0)
    })
}

/// Derives color and alpha for `image` from the AND `mask`, which holds
/// packed rows of the same width:
///
/// | mask  | color | result      |
/// |-------|-------|-------------|
/// | 0     | black | black       |
/// | 0     | white | white       |
/// | 1     | black | transparent |
/// | 1     | white | black       |
///
/// Returns true if the last case was hit, meaning the image should get an
/// outline.
pub fn reconstruct_alpha_from_mask(image: &mut Frame, mask: &[u8]) -> bool {
    let width = image.size().width.max(0) as usize;
    let height = image.size().height.max(0) as usize;
    let stride = image.stride();
    let data = image.data_mut();

    let mut needs_outline = false;
    for y in 0..height {
        let row = &mut data[y * stride..];
        for x in 0..width {
            let mask_set = read_pixel(mask, y * width + x) & MASK_WHITE == MASK_WHITE;
            let color = read_pixel(row, x);
            let value = if !mask_set {
                PIXEL_BLACK ^ color
            } else if color != 0 {
                needs_outline = true;
                PIXEL_BLACK
            } else {
                PIXEL_TRANSPARENT
            };
            write_pixel(row, x, value);
        }
    }
    needs_outline
}

fn pixel_at(data: &[u8], stride: usize, x: usize, y: usize) -> u32 {
    read_pixel(&data[y * stride..], x)
}

/// Turns transparent pixels next to opaque black ones white.
pub fn add_cursor_outline(image: &mut Frame) {
    let width = image.size().width.max(0) as usize;
    let height = image.size().height.max(0) as usize;
    let stride = image.stride();
    let data = image.data_mut();

    for y in 0..height {
        for x in 0..width {
            if pixel_at(data, stride, x, y) != PIXEL_TRANSPARENT {
                continue;
            }
            let is_black = |x: usize, y: usize| pixel_at(data, stride, x, y) == PIXEL_BLACK;
            let next_to_black = (y > 0 && is_black(x, y - 1))
                || (y + 1 < height && is_black(x, y + 1))
                || (x > 0 && is_black(x - 1, y))
                || (x + 1 < width && is_black(x + 1, y));
            if next_to_black {
                write_pixel(&mut data[y * stride..], x, PIXEL_WHITE);
            }
        }
    }
}

/// Scales the color channels of every pixel by its alpha.
pub fn premultiply_alpha(image: &mut Frame) {
    let row_bytes = image.size().width.max(0) as usize * BYTES_PER_PIXEL;
    let height = image.size().height.max(0) as usize;
    let stride = image.stride();
    let data = image.data_mut();

    for y in 0..height {
        let row = &mut data[y * stride..y * stride + row_bytes];
        for pixel in row.chunks_exact_mut(BYTES_PER_PIXEL) {
            let alpha = u16::from(pixel[3]);
            for channel in &mut pixel[..3] {
                *channel = (u16::from(*channel) * alpha / 0xff) as u8;
            }
        }
    }
}
