//! Captured frame buffers.
//!
//! A [`Frame`] is a BGRA pixel buffer plus capture metadata. The pixel bytes
//! live in one of several backends: a zeroed heap allocation, a shared memory
//! segment, an external [`FrameBuffer`], another frame it crops, or a
//! reference-counted core shared between several frame handles. Size and
//! stride never change after construction; the metadata in [`FrameInfo`] is
//! rewritten by the capture pipeline between captures.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, trace, warn};

use crate::error::FrameError;
use crate::geometry::{Rect, Size, Vector};
use crate::pixels::copy_plane;
use crate::region::Region;
use crate::scale::{scale_factor, Platform};
use crate::shared_memory::{SharedMemory, SharedMemoryFactory};
use crate::FrameResult;

/// Frames always hold 4-byte BGRA pixels.
pub const BYTES_PER_PIXEL: usize = 4;

/// Identifies the capturer implementation that produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapturerId(pub u32);

impl CapturerId {
    pub const UNKNOWN: CapturerId = CapturerId(0);
}

impl fmt::Display for CapturerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::UNKNOWN {
            write!(f, "unknown")
        } else {
            write!(f, "capturer#{}", self.0)
        }
    }
}

/// Mutable per-capture metadata carried by every frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInfo {
    /// Position of the frame in full desktop coordinates.
    pub top_left: Vector,

    /// DPI of the captured screen. Zero when unknown.
    pub dpi: Vector,

    /// Pixels changed since the previous frame, in this frame's coordinates.
    pub updated_region: Region,

    /// Time taken to capture the frame.
    pub capture_time_ms: i64,

    pub capturer_id: CapturerId,

    /// Opaque ICC color profile of the pixel data.
    pub icc_profile: Bytes,

    /// Set by capturers that may have drawn the cursor into the image.
    pub may_contain_cursor: bool,
}

impl FrameInfo {
    fn move_from(&mut self, other: &mut FrameInfo) {
        self.top_left = other.top_left;
        self.dpi = other.dpi;
        self.updated_region.swap(&mut other.updated_region);
        self.capture_time_ms = other.capture_time_ms;
        self.capturer_id = other.capturer_id;
        self.icc_profile = other.icc_profile.clone();
        self.may_contain_cursor = other.may_contain_cursor;
    }
}

/// Byte storage supplied by a platform backend.
///
/// The slice must stay valid and unmoved for the lifetime of the value.
pub trait FrameBuffer: Send + Sync {
    fn data(&self) -> &[u8];

    fn data_mut(&mut self) -> &mut [u8];
}

pub(crate) enum Storage {
    Heap(Box<[u8]>),
    SharedMemory(Box<dyn SharedMemory>),
    External(Box<dyn FrameBuffer>),
    /// A view into another frame, which it owns.
    Cropped(Box<Frame>),
    /// A buffer referenced by several frame handles.
    Shared(Arc<Frame>),
}

impl Storage {
    fn kind(&self) -> &'static str {
        match self {
            Storage::Heap(_) => "heap",
            Storage::SharedMemory(_) => "shared-memory",
            Storage::External(_) => "external",
            Storage::Cropped(_) => "cropped",
            Storage::Shared(_) => "shared",
        }
    }
}

/// A captured video frame.
pub struct Frame {
    size: Size,
    stride: usize,
    /// Byte offset of pixel (0, 0) within the storage bytes.
    offset: usize,
    storage: Storage,
    info: FrameInfo,
}

fn validate_layout(size: Size, stride: usize, available: usize) -> FrameResult<()> {
    if size.width < 0 || size.height < 0 {
        return Err(FrameError::InvalidSize(size));
    }
    let fits = (size.width as usize)
        .checked_mul(BYTES_PER_PIXEL)
        .is_some_and(|row_bytes| stride >= row_bytes);
    if !fits {
        return Err(FrameError::InvalidStride {
            stride,
            width: size.width,
        });
    }
    let Some(required) = stride.checked_mul(size.height as usize) else {
        return Err(FrameError::BufferTooSmall {
            required: usize::MAX,
            actual: available,
        });
    };
    if available < required {
        return Err(FrameError::BufferTooSmall {
            required,
            actual: available,
        });
    }
    Ok(())
}

/// Stride and total bytes of a frame with packed rows, or `None` on overflow.
fn packed_layout(size: Size) -> Option<(usize, usize)> {
    let stride = (size.width as usize).checked_mul(BYTES_PER_PIXEL)?;
    let bytes = stride.checked_mul(size.height as usize)?;
    Some((stride, bytes))
}

impl Frame {
    /// Allocates a zero-initialized frame on the heap with a packed stride.
    pub fn new(size: Size) -> FrameResult<Self> {
        if size.width < 0 || size.height < 0 {
            return Err(FrameError::InvalidSize(size));
        }
        let Some((stride, bytes)) = packed_layout(size) else {
            warn!(%size, "Frame size overflows the address space");
            return Err(FrameError::AllocationFailed { bytes: usize::MAX });
        };

        let mut buffer = Vec::new();
        if buffer.try_reserve_exact(bytes).is_err() {
            warn!(bytes, %size, "Failed to allocate frame buffer");
            return Err(FrameError::AllocationFailed { bytes });
        }
        buffer.resize(bytes, 0);
        trace!(%size, bytes, "Allocated heap frame");

        Ok(Self::from_parts(
            size,
            stride,
            0,
            Storage::Heap(buffer.into_boxed_slice()),
        ))
    }

    /// Creates a frame backed by a new segment from `factory`.
    pub fn with_shared_memory(size: Size, factory: &dyn SharedMemoryFactory) -> FrameResult<Self> {
        if size.width < 0 || size.height < 0 {
            return Err(FrameError::InvalidSize(size));
        }
        let Some((stride, bytes)) = packed_layout(size) else {
            warn!(%size, "Frame size overflows the address space");
            return Err(FrameError::SharedMemoryUnavailable { bytes: usize::MAX });
        };

        let Some(memory) = factory.create_shared_memory(bytes) else {
            warn!(bytes, %size, "Failed to allocate shared memory");
            return Err(FrameError::SharedMemoryUnavailable { bytes });
        };
        Self::from_shared_memory(size, stride, memory)
    }

    /// Creates a frame over an existing segment. The frame owns `memory`.
    pub fn from_shared_memory(
        size: Size,
        stride: usize,
        memory: Box<dyn SharedMemory>,
    ) -> FrameResult<Self> {
        validate_layout(size, stride, memory.len())?;
        debug!(%size, stride, id = memory.id(), "Created shared memory frame");
        Ok(Self::from_parts(size, stride, 0, Storage::SharedMemory(memory)))
    }

    /// Creates a frame over bytes owned by a platform backend.
    pub fn from_buffer(size: Size, stride: usize, buffer: Box<dyn FrameBuffer>) -> FrameResult<Self> {
        validate_layout(size, stride, buffer.data().len())?;
        Ok(Self::from_parts(size, stride, 0, Storage::External(buffer)))
    }

    /// Creates a heap frame holding a copy of `frame`'s pixels and metadata.
    pub fn copy_of(frame: &Frame) -> FrameResult<Self> {
        let mut result = Frame::new(frame.size)?;
        if !frame.size.is_empty() {
            let stride = result.stride;
            copy_plane(
                frame.data(),
                frame.stride,
                result.data_mut(),
                stride,
                frame.size.width as usize * BYTES_PER_PIXEL,
                frame.size.height as usize,
            );
        }
        result.copy_frame_info_from(frame);
        Ok(result)
    }

    fn from_parts(size: Size, stride: usize, offset: usize, storage: Storage) -> Self {
        Self {
            size,
            stride,
            offset,
            storage,
            info: FrameInfo::default(),
        }
    }

    /// Size in physical pixels, matching the buffer layout.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Distance in bytes between the starts of two neighboring rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes starting at pixel (0, 0).
    pub fn data(&self) -> &[u8] {
        let bytes: &[u8] = match &self.storage {
            Storage::Heap(buffer) => buffer,
            Storage::SharedMemory(memory) => memory.data(),
            Storage::External(buffer) => buffer.data(),
            Storage::Cropped(frame) => frame.data(),
            Storage::Shared(core) => core.data(),
        };
        &bytes[self.offset..]
    }

    /// Writable pixel bytes, or `None` while the buffer is shared with other
    /// frame handles.
    pub fn try_data_mut(&mut self) -> Option<&mut [u8]> {
        let offset = self.offset;
        let bytes: &mut [u8] = match &mut self.storage {
            Storage::Heap(buffer) => buffer,
            Storage::SharedMemory(memory) => memory.data_mut(),
            Storage::External(buffer) => buffer.data_mut(),
            Storage::Cropped(frame) => frame.try_data_mut()?,
            Storage::Shared(core) => Arc::get_mut(core)?.try_data_mut()?,
        };
        Some(&mut bytes[offset..])
    }

    /// Writable pixel bytes.
    ///
    /// # Panics
    ///
    /// Panics if the buffer is still shared with other frame handles.
    pub fn data_mut(&mut self) -> &mut [u8] {
        match self.try_data_mut() {
            Some(data) => data,
            None => panic!("pixel buffer is still shared and cannot be written"),
        }
    }

    /// Byte offset of `pos` within [`Frame::data`].
    pub fn pixel_offset(&self, pos: Vector) -> usize {
        assert!(
            pos.x >= 0 && pos.y >= 0,
            "negative pixel position {pos}"
        );
        self.stride * pos.y as usize + BYTES_PER_PIXEL * pos.x as usize
    }

    /// Pixel bytes starting at `pos`.
    pub fn data_at(&self, pos: Vector) -> &[u8] {
        &self.data()[self.pixel_offset(pos)..]
    }

    pub fn data_at_mut(&mut self, pos: Vector) -> &mut [u8] {
        let offset = self.pixel_offset(pos);
        &mut self.data_mut()[offset..]
    }

    /// The visible bytes of row `y`, without padding.
    pub fn row(&self, y: i32) -> &[u8] {
        let start = self.pixel_offset(Vector::new(0, y));
        &self.data()[start..start + self.row_bytes()]
    }

    fn row_bytes(&self) -> usize {
        self.size.width.max(0) as usize * BYTES_PER_PIXEL
    }

    /// The segment backing the pixels, if any. The frame keeps ownership.
    pub fn shared_memory(&self) -> Option<&dyn SharedMemory> {
        match &self.storage {
            Storage::SharedMemory(memory) => Some(memory.as_ref()),
            Storage::Cropped(frame) => frame.shared_memory(),
            Storage::Shared(core) => core.shared_memory(),
            Storage::Heap(_) | Storage::External(_) => None,
        }
    }

    pub fn info(&self) -> &FrameInfo {
        &self.info
    }

    pub fn info_mut(&mut self) -> &mut FrameInfo {
        &mut self.info
    }

    pub fn top_left(&self) -> Vector {
        self.info.top_left
    }

    pub fn set_top_left(&mut self, top_left: Vector) {
        self.info.top_left = top_left;
    }

    pub fn dpi(&self) -> Vector {
        self.info.dpi
    }

    pub fn set_dpi(&mut self, dpi: Vector) {
        self.info.dpi = dpi;
    }

    pub fn updated_region(&self) -> &Region {
        &self.info.updated_region
    }

    pub fn updated_region_mut(&mut self) -> &mut Region {
        &mut self.info.updated_region
    }

    pub fn capture_time_ms(&self) -> i64 {
        self.info.capture_time_ms
    }

    pub fn set_capture_time_ms(&mut self, time_ms: i64) {
        self.info.capture_time_ms = time_ms;
    }

    pub fn capturer_id(&self) -> CapturerId {
        self.info.capturer_id
    }

    pub fn set_capturer_id(&mut self, capturer_id: CapturerId) {
        self.info.capturer_id = capturer_id;
    }

    pub fn icc_profile(&self) -> &Bytes {
        &self.info.icc_profile
    }

    pub fn set_icc_profile(&mut self, icc_profile: impl Into<Bytes>) {
        self.info.icc_profile = icc_profile.into();
    }

    pub fn may_contain_cursor(&self) -> bool {
        self.info.may_contain_cursor
    }

    pub fn set_may_contain_cursor(&mut self, may_contain_cursor: bool) {
        self.info.may_contain_cursor = may_contain_cursor;
    }

    /// Scale from logical to physical pixels on the current platform.
    pub fn scale_factor(&self) -> f32 {
        self.scale_factor_on(Platform::current())
    }

    pub fn scale_factor_on(&self, platform: Platform) -> f32 {
        scale_factor(self.info.dpi, platform)
    }

    /// The area covered in full desktop coordinates: `top_left` to
    /// `top_left + size / scale_factor`. Only the size is scaled.
    pub fn rect(&self) -> Rect {
        self.rect_on(Platform::current())
    }

    pub fn rect_on(&self, platform: Platform) -> Rect {
        let scale = self.scale_factor_on(platform);
        Rect::make_xywh(
            self.info.top_left.x,
            self.info.top_left.y,
            (self.size.width as f32 / scale) as i32,
            (self.size.height as f32 / scale) as i32,
        )
    }

    /// Copies `dest_rect` (in this frame's buffer coordinates) row by row from
    /// `src`, which starts at the first pixel to read.
    ///
    /// # Panics
    ///
    /// Panics if `dest_rect` is not inside this frame, or if `src` is too
    /// short for the rectangle.
    pub fn copy_pixels_from_buffer(&mut self, src: &[u8], src_stride: usize, dest_rect: &Rect) {
        assert!(
            Rect::make_size(self.size).contains_rect(dest_rect),
            "destination {dest_rect} is outside of frame {}",
            self.size
        );
        if dest_rect.is_empty() {
            return;
        }

        let dst_stride = self.stride;
        let dst = self.data_at_mut(dest_rect.top_left());
        copy_plane(
            src,
            src_stride,
            dst,
            dst_stride,
            dest_rect.width() as usize * BYTES_PER_PIXEL,
            dest_rect.height() as usize,
        );
    }

    /// Copies `dest_rect` from `src`, reading from `src_pos` onwards.
    pub fn copy_pixels_from(&mut self, src: &Frame, src_pos: Vector, dest_rect: &Rect) {
        self.copy_pixels_from_buffer(src.data_at(src_pos), src.stride, dest_rect);
    }

    /// Copies the pixels where `src` and this frame overlap on the desktop.
    ///
    /// The scales relate pixel space to offset space between the two frames'
    /// origins (2.0 means the frames are shown at half size, so the origin
    /// delta is doubled). Only the delta is adjusted, never the copied size.
    /// Returns false, leaving this frame untouched, if nothing overlaps.
    pub fn copy_intersecting_pixels_from(
        &mut self,
        src: &Frame,
        horizontal_scale: f64,
        vertical_scale: f64,
    ) -> bool {
        let origin = self.top_left();
        let mut src_offset = src.top_left() - origin;

        let mut intersection = src.rect();
        if horizontal_scale != 1.0 || vertical_scale != 1.0 {
            let adjustment = Vector::new(
                ((horizontal_scale - 1.0) * src_offset.x as f64).round() as i32,
                ((vertical_scale - 1.0) * src_offset.y as f64).round() as i32,
            );
            intersection.translate_by(adjustment);
            src_offset = src_offset + adjustment;
        }

        intersection.intersect_with(&self.rect());
        if intersection.is_empty() {
            return false;
        }

        // Relative to this frame's buffer.
        intersection.translate_by(-origin);

        let src_pos = Vector::new((-src_offset.x).max(0), (-src_offset.y).max(0));
        trace!(%intersection, %src_pos, "Copying intersecting pixels");
        self.copy_pixels_from(src, src_pos, &intersection);
        true
    }

    /// Duplicates all metadata of `other`. `other` stays fully usable.
    pub fn copy_frame_info_from(&mut self, other: &Frame) {
        self.info = other.info.clone();
    }

    /// Takes the metadata of `other` without duplicating it. The updated
    /// region is swapped, so `other` keeps whatever region `self` had.
    pub fn move_frame_info_from(&mut self, other: &mut Frame) {
        self.info.move_from(&mut other.info);
    }

    /// Wraps this frame in a view of `rect`, which must lie inside it. The
    /// view owns the frame and takes over its metadata unchanged.
    pub(crate) fn into_view(self, rect: &Rect) -> Frame {
        let offset = self.pixel_offset(rect.top_left());
        let stride = self.stride;
        let mut view =
            Frame::from_parts(rect.size(), stride, offset, Storage::Cropped(Box::new(self)));
        if let Storage::Cropped(inner) = &mut view.storage {
            view.info.move_from(&mut inner.info);
        }
        view
    }

    /// True if every pixel is zero. An empty frame is never black.
    pub fn is_black(&self) -> bool {
        if self.size.is_empty() {
            return false;
        }
        (0..self.size.height).all(|y| self.row(y).iter().all(|&b| b == 0))
    }

    /// Zeroes the buffer, row padding included. A cropped view only zeroes
    /// its visible pixels since the padding belongs to the frame around it.
    pub fn set_to_black(&mut self) {
        if self.size.is_empty() {
            return;
        }
        let row_len = if self.owns_row_padding() {
            self.stride
        } else {
            self.row_bytes()
        };
        let stride = self.stride;
        let height = self.size.height as usize;
        let data = self.data_mut();
        for y in 0..height {
            let start = y * stride;
            let end = (start + row_len).min(data.len());
            data[start..end].fill(0);
        }
    }

    fn owns_row_padding(&self) -> bool {
        match &self.storage {
            Storage::Cropped(_) => false,
            Storage::Shared(core) => core.owns_row_padding(),
            _ => true,
        }
    }

    /// Zeroes the visible pixels of every row, leaving padding untouched.
    pub fn clear_pixels(&mut self) {
        let row_bytes = self.row_bytes();
        let stride = self.stride;
        let height = self.size.height.max(0) as usize;
        if row_bytes == 0 {
            return;
        }
        let data = self.data_mut();
        for y in 0..height {
            data[y * stride..y * stride + row_bytes].fill(0);
        }
    }

    /// Compares sizes and visible pixels, ignoring stride padding.
    pub fn data_equals(&self, other: &Frame) -> bool {
        self.size == other.size
            && (0..self.size.height.max(0)).all(|y| self.row(y) == other.row(y))
    }

    /// The visible pixels with rows packed at `4 * width`.
    pub fn to_packed_bytes(&self) -> Bytes {
        let mut packed = Vec::with_capacity(self.row_bytes() * self.size.height.max(0) as usize);
        for y in 0..self.size.height.max(0) {
            packed.extend_from_slice(self.row(y));
        }
        Bytes::from(packed)
    }

    /// Returns another handle to this frame's pixels carrying a copy of its
    /// metadata. The first call moves the buffer into a reference-counted
    /// core; pixels are never copied.
    pub fn share(&mut self) -> Frame {
        let core = self.shared_core();
        let mut shared = Frame::from_parts(self.size, self.stride, 0, Storage::Shared(core));
        shared.copy_frame_info_from(self);
        shared
    }

    fn shared_core(&mut self) -> Arc<Frame> {
        if let Storage::Shared(core) = &self.storage {
            return Arc::clone(core);
        }
        let storage = std::mem::replace(&mut self.storage, Storage::Heap(Box::default()));
        let core = Arc::new(Frame::from_parts(self.size, self.stride, self.offset, storage));
        self.storage = Storage::Shared(Arc::clone(&core));
        self.offset = 0;
        core
    }

    fn core(&self) -> Option<&Arc<Frame>> {
        match &self.storage {
            Storage::Shared(core) => Some(core),
            Storage::Cropped(frame) => frame.core(),
            _ => None,
        }
    }

    /// True while other handles reference this frame's buffer.
    pub fn is_shared(&self) -> bool {
        self.core().is_some_and(|core| Arc::strong_count(core) > 1)
    }

    /// True if both frames reference the same shared buffer.
    pub fn shares_buffer_with(&self, other: &Frame) -> bool {
        match (self.core(), other.core()) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// True for views created by cropping another frame, including shared
    /// handles of such a view.
    pub fn is_cropped(&self) -> bool {
        match &self.storage {
            Storage::Cropped(_) => true,
            Storage::Shared(core) => core.is_cropped(),
            _ => false,
        }
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("size", &self.size)
            .field("stride", &self.stride)
            .field("storage", &self.storage.kind())
            .field("info", &self.info)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared_memory::LocalSharedMemoryFactory;

    fn create_test_frame(rect: Rect, pixels_value: u8) -> Frame {
        let mut frame = Frame::new(rect.size()).unwrap();
        frame.set_top_left(rect.top_left());
        frame.data_mut().fill(pixels_value);
        frame
    }

    struct TestData {
        description: &'static str,
        dest_frame_rect: Rect,
        src_frame_rect: Rect,
        horizontal_scale: f64,
        vertical_scale: f64,
        expected_overlap_rect: Rect,
    }

    fn run_test(test: &TestData) {
        let mut dest = create_test_frame(test.dest_frame_rect, 0);
        let src = create_test_frame(test.src_frame_rect, 0xff);

        let copied =
            dest.copy_intersecting_pixels_from(&src, test.horizontal_scale, test.vertical_scale);
        assert_eq!(
            copied,
            !test.expected_overlap_rect.is_empty(),
            "{}",
            test.description
        );

        let relative = test
            .expected_overlap_rect
            .translated(-test.dest_frame_rect.top_left());

        for y in 0..dest.size().height {
            for x in 0..dest.size().width {
                let point = Vector::new(x, y);
                let pixel = &dest.data_at(point)[..4];
                let was_copied = pixel == [0xff; 4];
                assert!(
                    was_copied || pixel == [0; 4],
                    "{}: unexpected pixel at {}",
                    test.description,
                    point
                );
                assert_eq!(
                    was_copied,
                    relative.contains(point),
                    "{}: pixel {}",
                    test.description,
                    point
                );
            }
        }
    }

    fn run_tests(tests: &[TestData]) {
        for test in tests {
            run_test(test);
        }
    }

    #[test]
    fn test_new_frame_is_black() {
        let frame = Frame::new(Size::new(10, 10)).unwrap();
        assert!(frame.is_black());
        assert_eq!(frame.stride(), 40);
        assert!(frame.shared_memory().is_none());
    }

    #[test]
    fn test_empty_frame_is_not_black() {
        let frame = Frame::new(Size::default()).unwrap();
        assert!(!frame.is_black());
    }

    #[test]
    fn test_negative_size_is_rejected() {
        assert!(matches!(
            Frame::new(Size::new(-1, 4)),
            Err(FrameError::InvalidSize(_))
        ));
    }

    #[test]
    fn test_frame_data_switches_between_non_black_and_black() {
        let mut frame = create_test_frame(Rect::make_xywh(0, 0, 10, 10), 0xff);
        assert!(!frame.is_black());
        frame.set_to_black();
        assert!(frame.is_black());
    }

    #[test]
    fn test_default_metadata() {
        let frame = Frame::new(Size::new(2, 2)).unwrap();
        assert_eq!(frame.capture_time_ms(), 0);
        assert_eq!(frame.capturer_id(), CapturerId::UNKNOWN);
        assert!(frame.icc_profile().is_empty());
        assert!(!frame.may_contain_cursor());
        assert!(frame.updated_region().is_empty());
        assert!(frame.dpi().is_zero());
    }

    #[test]
    fn test_copy_intersecting_pixels_matching_rects() {
        run_tests(&[
            TestData {
                description: "0 origin",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                horizontal_scale: 1.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::make_xywh(0, 0, 2, 2),
            },
            TestData {
                description: "Negative origin",
                dest_frame_rect: Rect::make_xywh(-1, -1, 2, 2),
                src_frame_rect: Rect::make_xywh(-1, -1, 2, 2),
                horizontal_scale: 1.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::make_xywh(-1, -1, 2, 2),
            },
        ]);
    }

    #[test]
    fn test_copy_intersecting_pixels_matching_rects_scaled() {
        // Scales only apply to the difference between the origins.
        run_tests(&[
            TestData {
                description: "0 origin 2x",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                horizontal_scale: 2.0,
                vertical_scale: 2.0,
                expected_overlap_rect: Rect::make_xywh(0, 0, 2, 2),
            },
            TestData {
                description: "0 origin 0.5x",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                horizontal_scale: 0.5,
                vertical_scale: 0.5,
                expected_overlap_rect: Rect::make_xywh(0, 0, 2, 2),
            },
            TestData {
                description: "Negative origin 2x",
                dest_frame_rect: Rect::make_xywh(-1, -1, 2, 2),
                src_frame_rect: Rect::make_xywh(-1, -1, 2, 2),
                horizontal_scale: 2.0,
                vertical_scale: 2.0,
                expected_overlap_rect: Rect::make_xywh(-1, -1, 2, 2),
            },
        ]);
    }

    #[test]
    fn test_copy_intersecting_pixels_fully_contained_rects() {
        run_tests(&[
            TestData {
                description: "0 origin top left",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(0, 0, 1, 1),
                horizontal_scale: 1.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::make_xywh(0, 0, 1, 1),
            },
            TestData {
                description: "0 origin bottom right",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(1, 1, 1, 1),
                horizontal_scale: 1.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::make_xywh(1, 1, 1, 1),
            },
            TestData {
                description: "Negative origin bottom left",
                dest_frame_rect: Rect::make_xywh(-1, -1, 2, 2),
                src_frame_rect: Rect::make_xywh(-1, 0, 1, 1),
                horizontal_scale: 1.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::make_xywh(-1, 0, 1, 1),
            },
        ]);
    }

    #[test]
    fn test_copy_intersecting_pixels_fully_contained_rects_scaled() {
        run_tests(&[
            TestData {
                description: "0 origin bottom left 2x",
                dest_frame_rect: Rect::make_xywh(0, 0, 4, 4),
                src_frame_rect: Rect::make_xywh(1, 1, 2, 2),
                horizontal_scale: 2.0,
                vertical_scale: 2.0,
                expected_overlap_rect: Rect::make_xywh(2, 2, 2, 2),
            },
            TestData {
                description: "0 origin bottom middle 2x/1x",
                dest_frame_rect: Rect::make_xywh(0, 0, 4, 3),
                src_frame_rect: Rect::make_xywh(1, 1, 2, 2),
                horizontal_scale: 2.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::make_xywh(2, 1, 2, 2),
            },
            TestData {
                description: "0 origin middle 0.5x",
                dest_frame_rect: Rect::make_xywh(0, 0, 3, 3),
                src_frame_rect: Rect::make_xywh(2, 2, 1, 1),
                horizontal_scale: 0.5,
                vertical_scale: 0.5,
                expected_overlap_rect: Rect::make_xywh(1, 1, 1, 1),
            },
            TestData {
                description: "Negative origin bottom left 2x",
                dest_frame_rect: Rect::make_xywh(-1, -1, 3, 3),
                src_frame_rect: Rect::make_xywh(-1, 0, 1, 1),
                horizontal_scale: 2.0,
                vertical_scale: 2.0,
                expected_overlap_rect: Rect::make_xywh(-1, 1, 1, 1),
            },
            TestData {
                description: "Negative origin near middle 0.5x",
                dest_frame_rect: Rect::make_xywh(-2, -2, 2, 2),
                src_frame_rect: Rect::make_xywh(0, 0, 1, 1),
                horizontal_scale: 0.5,
                vertical_scale: 0.5,
                expected_overlap_rect: Rect::make_xywh(-1, -1, 1, 1),
            },
        ]);
    }

    #[test]
    fn test_copy_intersecting_pixels_partially_contained_rects() {
        run_tests(&[
            TestData {
                description: "Top left",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(-1, -1, 2, 2),
                horizontal_scale: 1.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::make_xywh(0, 0, 1, 1),
            },
            TestData {
                description: "Bottom right",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(1, 1, 2, 2),
                horizontal_scale: 1.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::make_xywh(1, 1, 1, 1),
            },
            TestData {
                description: "Top left 2x",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(-1, -1, 3, 3),
                horizontal_scale: 2.0,
                vertical_scale: 2.0,
                expected_overlap_rect: Rect::make_xywh(0, 0, 1, 1),
            },
            TestData {
                description: "Top right 0.5x",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(2, -2, 2, 2),
                horizontal_scale: 0.5,
                vertical_scale: 0.5,
                expected_overlap_rect: Rect::make_xywh(1, 0, 1, 1),
            },
        ]);
    }

    #[test]
    fn test_copy_intersecting_pixels_uncontained_rects() {
        run_tests(&[
            TestData {
                description: "Left",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(-1, 0, 1, 2),
                horizontal_scale: 1.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::default(),
            },
            TestData {
                description: "Bottom",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(0, 2, 2, 1),
                horizontal_scale: 1.0,
                vertical_scale: 1.0,
                expected_overlap_rect: Rect::default(),
            },
            TestData {
                description: "Right 2x",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(1, 0, 1, 2),
                horizontal_scale: 2.0,
                vertical_scale: 2.0,
                expected_overlap_rect: Rect::default(),
            },
            TestData {
                description: "Bottom 0.5x",
                dest_frame_rect: Rect::make_xywh(0, 0, 2, 2),
                src_frame_rect: Rect::make_xywh(0, 4, 2, 1),
                horizontal_scale: 0.5,
                vertical_scale: 0.5,
                expected_overlap_rect: Rect::default(),
            },
        ]);
    }

    #[test]
    #[should_panic(expected = "outside of frame")]
    fn test_copy_pixels_outside_of_frame_panics() {
        let mut dest = Frame::new(Size::new(2, 2)).unwrap();
        let src = Frame::new(Size::new(4, 4)).unwrap();
        dest.copy_pixels_from(&src, Vector::default(), &Rect::make_xywh(1, 1, 2, 2));
    }

    #[test]
    fn test_copy_frame_info_keeps_source() {
        let mut src = Frame::new(Size::new(4, 4)).unwrap();
        src.set_top_left(Vector::new(5, 6));
        src.set_dpi(Vector::new(96, 96));
        src.set_capture_time_ms(42);
        src.set_capturer_id(CapturerId(7));
        src.set_icc_profile(vec![1u8, 2, 3]);
        src.set_may_contain_cursor(true);
        src.updated_region_mut()
            .add_rect(Rect::make_xywh(0, 0, 2, 2));

        let mut dest = Frame::new(Size::new(1, 1)).unwrap();
        dest.copy_frame_info_from(&src);

        assert_eq!(dest.info(), src.info());
        assert!(!src.updated_region().is_empty());
    }

    #[test]
    fn test_move_frame_info_swaps_region() {
        let mut src = Frame::new(Size::new(4, 4)).unwrap();
        src.set_top_left(Vector::new(1, 2));
        src.set_icc_profile(vec![9u8]);
        src.updated_region_mut()
            .add_rect(Rect::make_xywh(0, 0, 2, 2));

        let mut dest = Frame::new(Size::new(4, 4)).unwrap();
        dest.move_frame_info_from(&mut src);

        assert_eq!(dest.top_left(), Vector::new(1, 2));
        assert_eq!(dest.icc_profile().as_ref(), &[9u8]);
        assert_eq!(dest.updated_region().rects(), &[Rect::make_xywh(0, 0, 2, 2)]);
        assert!(src.updated_region().is_empty());
    }

    #[test]
    fn test_copy_of_repacks_and_copies_info() {
        let mut src = create_test_frame(Rect::make_xywh(3, 4, 3, 2), 0x7f);
        src.set_capture_time_ms(11);

        let copy = Frame::copy_of(&src).unwrap();
        assert!(copy.data_equals(&src));
        assert_eq!(copy.top_left(), Vector::new(3, 4));
        assert_eq!(copy.capture_time_ms(), 11);
        assert_ne!(copy.data().as_ptr(), src.data().as_ptr());

        let empty = Frame::copy_of(&Frame::new(Size::new(0, 3)).unwrap()).unwrap();
        assert_eq!(empty.size(), Size::new(0, 3));
    }

    #[test]
    fn test_rect_scales_size_only() {
        let mut frame = Frame::new(Size::new(200, 100)).unwrap();
        frame.set_top_left(Vector::new(10, 20));
        frame.set_dpi(Vector::new(192, 192));

        assert_eq!(
            frame.rect_on(Platform::MacOs),
            Rect::make_xywh(10, 20, 100, 50)
        );
        assert_eq!(
            frame.rect_on(Platform::Windows),
            Rect::make_xywh(10, 20, 200, 100)
        );
    }

    #[test]
    fn test_shared_memory_frame() {
        let factory = LocalSharedMemoryFactory::new();
        let mut frame = Frame::with_shared_memory(Size::new(4, 3), &factory).unwrap();
        assert_eq!(frame.stride(), 16);
        assert_eq!(frame.shared_memory().map(|m| m.id()), Some(0));
        assert!(frame.is_black());

        frame.data_mut()[0] = 1;
        assert!(!frame.is_black());
    }

    #[test]
    fn test_shared_memory_allocation_failure() {
        let factory = LocalSharedMemoryFactory::with_limit(8);
        let result = Frame::with_shared_memory(Size::new(4, 4), &factory);
        assert!(matches!(
            result,
            Err(FrameError::SharedMemoryUnavailable { bytes: 64 })
        ));
    }

    struct PaddedBuffer(Vec<u8>);

    impl FrameBuffer for PaddedBuffer {
        fn data(&self) -> &[u8] {
            &self.0
        }

        fn data_mut(&mut self) -> &mut [u8] {
            &mut self.0
        }
    }

    #[test]
    fn test_external_buffer_with_padding() {
        // 2x2 frame with 4 bytes of padding per row.
        let mut bytes = vec![0u8; 24];
        bytes[8..12].fill(0xAA);
        let frame =
            Frame::from_buffer(Size::new(2, 2), 12, Box::new(PaddedBuffer(bytes))).unwrap();

        // Padding is not part of the image.
        assert!(frame.is_black());
        assert_eq!(frame.to_packed_bytes().len(), 16);
    }

    #[test]
    fn test_set_to_black_clears_padding() {
        let bytes = vec![0xFFu8; 24];
        let mut frame =
            Frame::from_buffer(Size::new(2, 2), 12, Box::new(PaddedBuffer(bytes))).unwrap();
        frame.set_to_black();
        assert!(frame.data()[..24].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_external_buffer_too_small() {
        let result = Frame::from_buffer(Size::new(2, 2), 8, Box::new(PaddedBuffer(vec![0; 12])));
        assert!(matches!(
            result,
            Err(FrameError::BufferTooSmall {
                required: 16,
                actual: 12
            })
        ));

        let result = Frame::from_buffer(Size::new(4, 1), 8, Box::new(PaddedBuffer(vec![0; 16])));
        assert!(matches!(result, Err(FrameError::InvalidStride { .. })));
    }

    #[test]
    fn test_overflowing_layout_is_rejected() {
        let result = Frame::from_buffer(
            Size::new(1, 4),
            usize::MAX / 2,
            Box::new(PaddedBuffer(vec![0; 16])),
        );
        assert!(matches!(
            result,
            Err(FrameError::BufferTooSmall {
                required: usize::MAX,
                actual: 16
            })
        ));

        let factory = LocalSharedMemoryFactory::new();
        let memory = factory.create_shared_memory(16).unwrap();
        let result = Frame::from_shared_memory(Size::new(2, i32::MAX), usize::MAX / 4, memory);
        assert!(matches!(result, Err(FrameError::BufferTooSmall { .. })));

        assert!(matches!(
            Frame::new(Size::new(i32::MAX, i32::MAX)),
            Err(FrameError::AllocationFailed { .. })
        ));
        let factory = LocalSharedMemoryFactory::with_limit(1024);
        assert!(matches!(
            Frame::with_shared_memory(Size::new(i32::MAX, i32::MAX), &factory),
            Err(FrameError::SharedMemoryUnavailable { .. })
        ));
    }

    #[test]
    fn test_share_references_same_pixels() {
        let mut frame = create_test_frame(Rect::make_xywh(0, 0, 4, 4), 0x10);
        frame.set_capture_time_ms(5);
        let original_ptr = frame.data().as_ptr();

        let shared = frame.share();
        assert!(frame.is_shared());
        assert!(shared.is_shared());
        assert!(frame.shares_buffer_with(&shared));
        assert_eq!(shared.data().as_ptr(), original_ptr);
        assert_eq!(shared.capture_time_ms(), 5);

        drop(shared);
        assert!(!frame.is_shared());
        frame.data_mut()[0] = 0;
    }

    #[test]
    fn test_shared_frame_is_read_only() {
        let mut frame = Frame::new(Size::new(2, 2)).unwrap();
        let _shared = frame.share();
        assert!(frame.try_data_mut().is_none());
    }

    #[test]
    #[should_panic(expected = "still shared")]
    fn test_writing_shared_frame_panics() {
        let mut frame = Frame::new(Size::new(2, 2)).unwrap();
        let _shared = frame.share();
        frame.set_to_black();
    }

    #[test]
    fn test_shares_across_threads() {
        let (tx, rx) = crossbeam_channel::bounded::<Frame>(1);
        let mut frame = create_test_frame(Rect::make_xywh(0, 0, 8, 8), 0x33);

        tx.send(frame.share()).unwrap();
        let handle = std::thread::spawn(move || {
            let received = rx.recv().unwrap();
            received.row(7).iter().all(|&b| b == 0x33)
        });

        assert!(handle.join().unwrap());
        assert!(!frame.is_shared());
    }
}
