//! Shared memory segments that frames can be backed by.
//!
//! Platform code that wants frames in cross-process memory implements
//! [`SharedMemory`] for its segment type (a file mapping, a memfd, ...) and
//! hands a [`SharedMemoryFactory`] to the capturer.

use std::sync::atomic::{AtomicI32, Ordering};

use tracing::{trace, warn};

/// Platform handle of a segment.
#[cfg(windows)]
pub type NativeHandle = isize;
/// Platform handle of a segment.
#[cfg(not(windows))]
pub type NativeHandle = i32;

/// Handle value of a segment that has no platform handle.
#[cfg(windows)]
pub const INVALID_HANDLE: NativeHandle = 0;
/// Handle value of a segment that has no platform handle.
#[cfg(not(windows))]
pub const INVALID_HANDLE: NativeHandle = -1;

/// A block of memory that may be mapped into other processes.
///
/// The segment owns its bytes. A frame backed by a segment owns the segment,
/// so the bytes stay mapped for as long as any view of that frame exists.
pub trait SharedMemory: Send + Sync {
    fn data(&self) -> &[u8];

    fn data_mut(&mut self) -> &mut [u8];

    /// Platform-specific handle of the segment.
    fn handle(&self) -> NativeHandle;

    /// Identifier consumers can use to recognize segments they created.
    fn id(&self) -> i32;

    fn len(&self) -> usize {
        self.data().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates [`SharedMemory`] segments on demand.
pub trait SharedMemoryFactory: Send + Sync {
    /// Returns `None` when the segment cannot be created.
    fn create_shared_memory(&self, size: usize) -> Option<Box<dyn SharedMemory>>;
}

/// A process-local segment. Useful for single-process pipelines and tests
/// that want to exercise the shared-memory code path.
pub struct LocalSharedMemory {
    data: Box<[u8]>,
    id: i32,
}

impl LocalSharedMemory {
    pub fn new(size: usize, id: i32) -> Self {
        Self {
            data: vec![0u8; size].into_boxed_slice(),
            id,
        }
    }
}

impl SharedMemory for LocalSharedMemory {
    fn data(&self) -> &[u8] {
        &self.data
    }

    fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    fn handle(&self) -> NativeHandle {
        INVALID_HANDLE
    }

    fn id(&self) -> i32 {
        self.id
    }
}

/// Hands out [`LocalSharedMemory`] segments with increasing ids.
///
/// A `limit` caps the size of a single segment; larger requests fail the way
/// an exhausted platform allocator would.
#[derive(Debug, Default)]
pub struct LocalSharedMemoryFactory {
    next_id: AtomicI32,
    limit: Option<usize>,
}

impl LocalSharedMemoryFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            next_id: AtomicI32::new(0),
            limit: Some(limit),
        }
    }

    /// Number of segments created so far.
    pub fn created(&self) -> i32 {
        self.next_id.load(Ordering::Relaxed)
    }
}

impl SharedMemoryFactory for LocalSharedMemoryFactory {
    fn create_shared_memory(&self, size: usize) -> Option<Box<dyn SharedMemory>> {
        if let Some(limit) = self.limit.filter(|&limit| size > limit) {
            warn!(size, limit, "Refusing shared memory segment over the limit");
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        trace!(size, id, "Creating local shared memory segment");
        Some(Box::new(LocalSharedMemory::new(size, id)))
    }
}
