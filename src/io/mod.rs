//! IO modules - external system interfaces
//!
//! This module contains all external IO operations:
//! - `capture` - traits the loop needs from camera, decoder and display
//! - `replay` - scripted frame source and log display (no hardware)
//! - `sink` - append-only CSV store for accepted records

pub mod capture;
pub mod replay;
pub mod sink;

// Re-export commonly used types
pub use capture::{CaptureError, FrameDisplay, FrameSource, QrDecoder};
pub use replay::{LogDisplay, ReplayDecoder, ReplayFrame, ReplayFrameSource};
pub use sink::{RecordSink, SinkError};
