//! Replay capture - scripted frames for hardware-free runs
//!
//! Reads a JSONL script, one frame per line:
//!
//! ```text
//! {"detections":[{"text":"ID1,M,D,S,x","symbol":"QRCODE","rect":{"x":10,"y":20,"w":80,"h":80},"polygon":[{"x":10,"y":20},{"x":90,"y":20},{"x":90,"y":100},{"x":10,"y":100}]}]}
//! ```
//!
//! `symbol`, `rect` and `polygon` are optional; `symbol` defaults to
//! QRCODE. This stands in for the camera + decoder pair when no capture
//! stack is linked, and drives the end-to-end tests.

use crate::domain::{Annotation, Geometry, Point, RawDetection, Rect, SymbolKind};
use crate::io::capture::{CaptureError, FrameDisplay, FrameSource, QrDecoder};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ScriptFrame {
    #[serde(default)]
    detections: Vec<ScriptDetection>,
}

#[derive(Debug, Deserialize)]
struct ScriptDetection {
    text: String,
    #[serde(default = "default_symbol")]
    symbol: String,
    #[serde(default)]
    rect: Rect,
    #[serde(default)]
    polygon: Vec<Point>,
}

fn default_symbol() -> String {
    "QRCODE".to_string()
}

/// One scripted frame: no pixels, just the detections the decoder would
/// have produced from them
#[derive(Debug)]
pub struct ReplayFrame {
    pub index: u64,
    pub detections: Vec<RawDetection>,
}

/// Frame source backed by a JSONL script file
pub struct ReplayFrameSource {
    lines: Lines<BufReader<File>>,
    next_index: u64,
}

impl ReplayFrameSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(CaptureError::Open)?;
        info!(file = %path.display(), "replay_source_opened");
        Ok(Self { lines: BufReader::new(file).lines(), next_index: 0 })
    }
}

impl FrameSource for ReplayFrameSource {
    type Frame = ReplayFrame;

    fn read_frame(&mut self) -> Result<ReplayFrame, CaptureError> {
        let line = match self.lines.next() {
            Some(line) => line.map_err(|e| CaptureError::Acquisition(e.to_string()))?,
            None => return Err(CaptureError::EndOfStream),
        };

        let index = self.next_index;
        self.next_index += 1;

        // Blank lines are empty frames, same as a camera frame with no codes
        if line.trim().is_empty() {
            return Ok(ReplayFrame { index, detections: Vec::new() });
        }

        let script: ScriptFrame = serde_json::from_str(&line).map_err(|e| {
            CaptureError::Acquisition(format!("malformed script frame {}: {}", index, e))
        })?;

        let detections = script
            .detections
            .into_iter()
            .map(|d| RawDetection {
                symbol: d.symbol.parse::<SymbolKind>().unwrap_or(SymbolKind::QrCode),
                geometry: Geometry { polygon: d.polygon, rect: d.rect },
                text: d.text,
            })
            .collect();

        Ok(ReplayFrame { index, detections })
    }
}

/// Decoder for replay frames: the script already carries the detections
#[derive(Debug, Default)]
pub struct ReplayDecoder;

impl ReplayDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl QrDecoder<ReplayFrame> for ReplayDecoder {
    fn decode(&mut self, frame: &ReplayFrame) -> Vec<RawDetection> {
        frame.detections.clone()
    }
}

/// Display that logs annotations instead of drawing them; never cancels
///
/// Operator stop comes from the shutdown signal in this mode.
#[derive(Debug, Default)]
pub struct LogDisplay;

impl LogDisplay {
    pub fn new() -> Self {
        Self
    }
}

impl FrameDisplay<ReplayFrame> for LogDisplay {
    fn render(&mut self, frame: &ReplayFrame, annotations: &[Annotation]) {
        for annotation in annotations {
            debug!(
                frame = frame.index,
                label = %annotation.label,
                x = annotation.geometry.rect.x,
                y = annotation.geometry.rect.y,
                "annotation_rendered"
            );
        }
    }

    fn poll_cancel(&mut self) -> bool {
        false
    }
}
