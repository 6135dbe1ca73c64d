//! Shared types for the QR intake station

use serde::Deserialize;

/// Symbology reported by the decoder for one detection
///
/// Decoders configured for mixed symbologies may still hand us non-QR
/// results; the pipeline filters on this before doing any work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    QrCode,
    Other(String),
}

impl std::str::FromStr for SymbolKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "QRCODE" => SymbolKind::QrCode,
            other => SymbolKind::Other(other.to_string()),
        })
    }
}

impl SymbolKind {
    pub fn as_str(&self) -> &str {
        match self {
            SymbolKind::QrCode => "QRCODE",
            SymbolKind::Other(s) => s,
        }
    }
}

/// Pixel coordinate in frame space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Axis-aligned bounding rectangle in frame space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// Localization geometry for one detection: the decoder's corner polygon
/// plus its bounding rect (the rect anchors label placement)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Geometry {
    pub polygon: Vec<Point>,
    pub rect: Rect,
}

/// One decode result from a single frame
///
/// Ephemeral: produced by the decoder, consumed by the pipeline in the
/// same iteration, never retained.
#[derive(Debug, Clone)]
pub struct RawDetection {
    pub text: String,
    pub geometry: Geometry,
    pub symbol: SymbolKind,
}

/// Structured fields extracted from one accepted payload
///
/// All fields are non-empty after whitespace trimming. The trimmed model
/// number is the first 7 characters of the model number, or the whole
/// field when shorter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecord {
    pub identifier: String,
    pub model_number: String,
    pub trimmed_model_number: String,
    pub destination_code: String,
    pub serial_number: String,
}

/// Render instruction for one accepted detection: outline the geometry
/// and place the label near its bounding rect
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub geometry: Geometry,
    pub label: String,
}

/// Why a decoded payload was not accepted as a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Fewer delimited fields than the active convention requires
    TooFewFields { got: usize, min: usize },
    /// A consumed field was empty after trimming
    EmptyField { index: usize },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::TooFewFields { got, min } => {
                write!(f, "too few fields: got {}, need {}", got, min)
            }
            RejectReason::EmptyField { index } => {
                write!(f, "empty field at index {}", index)
            }
        }
    }
}
