//! Frame-loop driver
//!
//! Owns the capture collaborators and the pipeline for the duration of a
//! run: read frame, decode, process, render, repeat. Fully processes each
//! frame before reading the next; cancellation is polled once per
//! iteration. All resources are released by drop when `run` returns,
//! whichever way the loop ended.

use crate::io::capture::{CaptureError, FrameDisplay, FrameSource, QrDecoder};
use crate::services::pipeline::ScanPipeline;
use tokio::sync::watch;
use tracing::{error, info};

/// Why the loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Shutdown signal or display cancel
    Cancelled,
    /// Frame source ran out of frames
    EndOfStream,
    /// Configured frame limit reached
    FrameLimit,
    /// Frame acquisition failed; run terminated cleanly
    AcquisitionError,
}

/// Result of one run of the loop
#[derive(Debug, Clone, Copy)]
pub struct RunOutcome {
    pub frames: u64,
    pub reason: StopReason,
}

/// Drives the scan loop over a frame source, decoder and display
pub struct ScanRunner<S, D, Y>
where
    S: FrameSource,
    D: QrDecoder<S::Frame>,
    Y: FrameDisplay<S::Frame>,
{
    source: S,
    decoder: D,
    display: Y,
    pipeline: ScanPipeline,
    shutdown_rx: watch::Receiver<bool>,
    /// Stop after this many frames; 0 means unlimited
    max_frames: u64,
}

impl<S, D, Y> ScanRunner<S, D, Y>
where
    S: FrameSource,
    D: QrDecoder<S::Frame>,
    Y: FrameDisplay<S::Frame>,
{
    pub fn new(
        source: S,
        decoder: D,
        display: Y,
        pipeline: ScanPipeline,
        shutdown_rx: watch::Receiver<bool>,
        max_frames: u64,
    ) -> Self {
        Self { source, decoder, display, pipeline, shutdown_rx, max_frames }
    }

    /// Run the loop to completion, consuming the runner
    ///
    /// Blocking; callers on an async runtime run this on a blocking task.
    pub fn run(mut self) -> RunOutcome {
        let mut frames = 0u64;

        let reason = loop {
            if *self.shutdown_rx.borrow() || self.display.poll_cancel() {
                info!("scan_loop_cancelled");
                break StopReason::Cancelled;
            }

            let frame = match self.source.read_frame() {
                Ok(frame) => frame,
                Err(CaptureError::EndOfStream) => {
                    info!(frames = frames, "frame_source_exhausted");
                    break StopReason::EndOfStream;
                }
                Err(e) => {
                    error!(error = %e, "frame_source_error");
                    break StopReason::AcquisitionError;
                }
            };

            let detections = self.decoder.decode(&frame);
            let annotations = self.pipeline.process(&detections);
            self.display.render(&frame, &annotations);

            frames += 1;
            if self.max_frames > 0 && frames >= self.max_frames {
                info!(frames = frames, "frame_limit_reached");
                break StopReason::FrameLimit;
            }
        };

        self.pipeline.stats().log();
        RunOutcome { frames, reason }
    }
}
