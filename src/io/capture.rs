//! Capture seams - traits the frame loop needs from the outside world
//!
//! The camera, the QR locator and the render surface are collaborators,
//! not part of the core. The loop driver is generic over these traits so
//! the pipeline can run against a real camera stack, the replay source, or
//! test doubles without changes.

use crate::domain::{Annotation, RawDetection};

/// Errors from frame acquisition
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Source exhausted - an orderly end, not a failure
    #[error("frame source end of stream")]
    EndOfStream,
    /// Source could not be opened at all
    #[error("failed to open frame source: {0}")]
    Open(#[source] std::io::Error),
    /// A frame could not be read; fatal to the run
    #[error("frame acquisition failed: {0}")]
    Acquisition(String),
}

/// Produces frames, one per loop iteration
pub trait FrameSource {
    type Frame;

    /// Blocks until a frame is available or the source ends/fails
    fn read_frame(&mut self) -> Result<Self::Frame, CaptureError>;
}

/// Locates and decodes QR codes in a frame
///
/// Restricting to QR symbology is this collaborator's configuration; the
/// pipeline still guards on `SymbolKind` for decoders that report mixed
/// symbologies.
pub trait QrDecoder<F> {
    fn decode(&mut self, frame: &F) -> Vec<RawDetection>;
}

/// Renders annotated frames and reports operator cancellation
pub trait FrameDisplay<F> {
    fn render(&mut self, frame: &F, annotations: &[Annotation]);

    /// Polled once per iteration; true requests an orderly stop
    fn poll_cancel(&mut self) -> bool;
}
