//! Services - scan decision logic and state management
//!
//! This module contains the core scan logic:
//! - `parser` - payload text to structured record, policy-driven
//! - `dedupe` - raw-text dedupe set, one process run of state
//! - `pipeline` - per-frame scan processor owning dedupe and sink
//! - `runner` - frame-loop driver over the capture traits

pub mod dedupe;
pub mod parser;
pub mod pipeline;
pub mod runner;

// Re-export commonly used types
pub use dedupe::DedupeSet;
pub use parser::{ParsePolicy, PayloadConvention, PayloadParser};
pub use pipeline::{ScanPipeline, ScanStats};
pub use runner::{RunOutcome, ScanRunner, StopReason};
