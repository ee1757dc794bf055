//! Pipeline statistics.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use parking_lot::RwLock;
use serde::Serialize;

use deskframe::Size;

/// Counters shared by the producer and consumer threads.
pub struct PipelineStats {
    start_time: Instant,
    produced: AtomicU64,
    dropped: AtomicU64,
    consumed: AtomicU64,
    crop_misses: AtomicU64,
    reallocations: AtomicU64,
    changed_pixels: AtomicU64,
    last_output_size: RwLock<Option<Size>>,
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub produced: u64,
    pub dropped: u64,
    pub consumed: u64,
    pub crop_misses: u64,
    pub reallocations: u64,
    pub changed_pixels: u64,
    pub last_output_size: Option<Size>,
    pub elapsed_ms: u64,
    pub fps: f32,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            produced: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            consumed: AtomicU64::new(0),
            crop_misses: AtomicU64::new(0),
            reallocations: AtomicU64::new(0),
            changed_pixels: AtomicU64::new(0),
            last_output_size: RwLock::new(None),
        }
    }

    /// Record a frame handed to the consumer.
    pub fn record_produced(&self) {
        self.produced.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a frame dropped because the channel was full.
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_crop_miss(&self) {
        self.crop_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn set_reallocations(&self, reallocations: u64) {
        self.reallocations.store(reallocations, Ordering::Relaxed);
    }

    /// Record a frame that made it through crop and rotation.
    pub fn record_consumed(&self, output_size: Size, changed_pixels: u64) {
        self.consumed.fetch_add(1, Ordering::Relaxed);
        self.changed_pixels
            .fetch_add(changed_pixels, Ordering::Relaxed);
        *self.last_output_size.write() = Some(output_size);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let elapsed = self.start_time.elapsed();
        let consumed = self.consumed.load(Ordering::Relaxed);
        let fps = if elapsed.as_secs_f32() > 0.0 {
            consumed as f32 / elapsed.as_secs_f32()
        } else {
            0.0
        };

        StatsSnapshot {
            produced: self.produced.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            consumed,
            crop_misses: self.crop_misses.load(Ordering::Relaxed),
            reallocations: self.reallocations.load(Ordering::Relaxed),
            changed_pixels: self.changed_pixels.load(Ordering::Relaxed),
            last_output_size: *self.last_output_size.read(),
            elapsed_ms: elapsed.as_millis() as u64,
            fps,
        }
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}
