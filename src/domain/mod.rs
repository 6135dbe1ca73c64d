//! Domain models - core scan types
//!
//! This module contains the canonical data types used throughout the system:
//! - `RawDetection` - one decode result (text, geometry, symbology)
//! - `ParsedRecord` - validated fields extracted from a payload
//! - `Annotation` - render instruction for an accepted detection
//! - `RejectReason` - explicit reason a payload was skipped
//! - `SymbolKind` - symbology classification from the decoder

pub mod types;

pub use types::{
    Annotation, Geometry, ParsedRecord, Point, RawDetection, Rect, RejectReason, SymbolKind,
};
