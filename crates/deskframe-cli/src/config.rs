//! Pipeline configuration.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};

use deskframe::{Rect, Rotation, Size, Vector};

/// Configuration for a synthetic capture run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Size of the captured frames.
    pub frame_size: Size,

    /// Position of the captured area on the desktop.
    pub origin: Vector,

    /// DPI reported with every frame.
    pub dpi: Vector,

    /// Number of frames the producer captures.
    pub frame_count: u64,

    /// Delay between two captures (0 for as fast as possible).
    pub frame_interval_ms: u64,

    /// Area the consumer crops out of every frame, in frame coordinates.
    pub crop: Rect,

    /// Rotation the consumer applies to the cropped area.
    pub rotation: Rotation,

    /// Frames in flight between producer and consumer.
    pub channel_capacity: usize,

    /// Back frames with shared memory segments instead of the heap.
    pub shared_memory: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frame_size: Size::new(640, 360),
            origin: Vector::default(),
            dpi: Vector::new(96, 96),
            frame_count: 120,
            frame_interval_ms: 16,
            crop: Rect::make_xywh(80, 40, 320, 240),
            rotation: Rotation::R90,
            channel_capacity: 3,
            shared_memory: false,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the pipeline cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.frame_size.is_empty() {
            bail!("Frame size {} is empty", self.frame_size);
        }
        if self.channel_capacity == 0 {
            bail!("Channel capacity must be at least 1");
        }
        Ok(())
    }
}
