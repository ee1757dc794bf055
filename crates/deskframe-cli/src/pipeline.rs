//! Producer/consumer capture pipeline.
//!
//! The producer plays the part of a capture backend: it renders into a
//! double-buffered [`FrameQueue`], lets a [`FrameDiffer`] work out what
//! changed and hands shared handles downstream. The consumer crops and
//! rotates every frame it receives.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, info, instrument};

use deskframe::{
    create_cropped_frame, rotate_frame, rotate_size, CapturerId, Frame, FrameDiffer, FrameQueue,
    LocalSharedMemoryFactory, Rect, Size, Vector,
};

use crate::config::PipelineConfig;
use crate::painter::TestPattern;
use crate::stats::PipelineStats;

/// Identifies frames rendered by the synthetic capturer.
pub const SYNTHETIC_CAPTURER: CapturerId = CapturerId(1);

/// Run the pipeline to completion.
pub fn run(config: &PipelineConfig, stats: Arc<PipelineStats>) -> anyhow::Result<()> {
    config.validate()?;
    let (frame_tx, frame_rx) = crossbeam_channel::bounded(config.channel_capacity);

    let producer = {
        let config = config.clone();
        let stats = Arc::clone(&stats);
        thread::Builder::new()
            .name("capture".to_string())
            .spawn(move || produce(&config, &stats, frame_tx))
            .context("Failed to spawn capture thread")?
    };

    let consumer = {
        let config = config.clone();
        thread::Builder::new()
            .name("consumer".to_string())
            .spawn(move || consume(&config, &stats, frame_rx))
            .context("Failed to spawn consumer thread")?
    };

    producer
        .join()
        .map_err(|_| anyhow!("Capture thread panicked"))??;
    consumer
        .join()
        .map_err(|_| anyhow!("Consumer thread panicked"))??;

    info!("Pipeline finished");
    Ok(())
}

#[instrument(name = "capture", skip_all)]
fn produce(
    config: &PipelineConfig,
    stats: &PipelineStats,
    frame_tx: Sender<Frame>,
) -> anyhow::Result<()> {
    let factory = LocalSharedMemoryFactory::new();
    let pattern = TestPattern::new(
        Size::new(config.frame_size.width / 8, config.frame_size.height / 8),
        4,
    );
    let mut queue = FrameQueue::new();
    let mut differ = FrameDiffer::new();
    let interval = Duration::from_millis(config.frame_interval_ms);

    for sequence in 0..config.frame_count {
        let capture_start = Instant::now();

        let frame = queue
            .prepare_current_frame(config.frame_size, |size| {
                if config.shared_memory {
                    Frame::with_shared_memory(size, &factory)
                } else {
                    Frame::new(size)
                }
            })
            .context("Failed to prepare capture frame")?;

        // The painted area is only a hint, the differ finds the real changes.
        let painted = pattern.paint(frame, sequence);
        *frame.updated_region_mut() = painted;
        differ.process(frame);
        frame.set_top_left(config.origin);
        frame.set_dpi(config.dpi);
        frame.set_capturer_id(SYNTHETIC_CAPTURER);
        frame.set_capture_time_ms(capture_start.elapsed().as_millis() as i64);

        match frame_tx.try_send(frame.share()) {
            Ok(()) => stats.record_produced(),
            Err(TrySendError::Full(_)) => {
                debug!(sequence, "Frame channel full, dropping frame");
                stats.record_dropped();
            }
            Err(TrySendError::Disconnected(_)) => {
                return Err(anyhow!("Consumer disconnected"));
            }
        }
        queue.move_to_next_frame();

        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }

    stats.set_reallocations(queue.reallocations());
    debug!(reallocations = queue.reallocations(), "Capture done");
    Ok(())
}

#[instrument(name = "consumer", skip_all)]
fn consume(
    config: &PipelineConfig,
    stats: &PipelineStats,
    frame_rx: Receiver<Frame>,
) -> anyhow::Result<()> {
    let mut target: Option<Frame> = None;

    for frame in frame_rx.iter() {
        let Some(cropped) = create_cropped_frame(frame, &config.crop) else {
            debug!(crop = %config.crop, "Crop does not overlap frame");
            stats.record_crop_miss();
            continue;
        };

        let output_size = rotate_size(cropped.size(), config.rotation);
        let mut output = match target.take() {
            Some(frame) if frame.size() == output_size => frame,
            _ => Frame::new(output_size).context("Failed to allocate rotation target")?,
        };

        output.copy_frame_info_from(&cropped);
        output.updated_region_mut().clear();
        rotate_frame(
            &cropped,
            &Rect::make_size(cropped.size()),
            config.rotation,
            Vector::default(),
            &mut output,
        );

        let changed = cropped.updated_region().area().max(0) as u64;
        stats.record_consumed(output.size(), changed);
        target = Some(output);
    }

    Ok(())
}
