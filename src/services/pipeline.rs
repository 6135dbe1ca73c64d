//! Scan pipeline - turns per-frame decode results into durable records
//!
//! Invoked once per frame with the detections in decode order. For each
//! detection: symbol filter, dedupe check, parse, sink append, annotation.
//! Parse rejects are skipped without marking the text seen, so a garbled
//! code can succeed on a later frame under better lighting. A failed sink
//! append still marks the text seen (no retry storms against a broken
//! store); the failure is counted and logged, never returned from
//! `process`.

use crate::domain::{Annotation, RawDetection, SymbolKind};
use crate::io::sink::RecordSink;
use crate::services::dedupe::DedupeSet;
use crate::services::parser::PayloadParser;
use tracing::{debug, error, info};

/// Per-run counters, the pipeline's side channel to the loop driver
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScanStats {
    pub frames: u64,
    pub detections: u64,
    pub accepted: u64,
    pub duplicates: u64,
    pub rejected: u64,
    pub sink_failures: u64,
}

impl ScanStats {
    /// Log the run summary as a single structured event
    pub fn log(&self) {
        info!(
            frames = self.frames,
            detections = self.detections,
            accepted = self.accepted,
            duplicates = self.duplicates,
            rejected = self.rejected,
            sink_failures = self.sink_failures,
            "scan_summary"
        );
    }
}

/// Stateful scan processor: owns the dedupe set and the record sink
pub struct ScanPipeline {
    parser: PayloadParser,
    dedupe: DedupeSet,
    sink: RecordSink,
    stats: ScanStats,
}

impl ScanPipeline {
    pub fn new(parser: PayloadParser, sink: RecordSink) -> Self {
        Self { parser, dedupe: DedupeSet::new(), sink, stats: ScanStats::default() }
    }

    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Process one frame's detections, in the order supplied
    ///
    /// Returns render instructions for the detections that produced a
    /// durable record. Errors never escape: rejects and duplicates are
    /// skipped, sink failures are logged and counted.
    pub fn process(&mut self, detections: &[RawDetection]) -> Vec<Annotation> {
        self.stats.frames += 1;
        let mut annotations = Vec::new();

        for detection in detections {
            self.stats.detections += 1;

            // No-op-safe guard: QR-only decoders never hit this
            if detection.symbol != SymbolKind::QrCode {
                debug!(symbol = %detection.symbol.as_str(), "non_qr_symbol_skipped");
                continue;
            }

            if self.dedupe.contains(&detection.text) {
                self.stats.duplicates += 1;
                debug!(text = %detection.text, "duplicate_skipped");
                continue;
            }

            let record = match self.parser.parse(&detection.text) {
                Ok(record) => record,
                Err(reason) => {
                    // Not marked seen: the same code may decode cleanly later
                    self.stats.rejected += 1;
                    debug!(text = %detection.text, reason = %reason, "payload_rejected");
                    continue;
                }
            };

            // Seen before the append so a broken sink cannot cause a retry
            // storm across frames
            self.dedupe.record(&detection.text);

            match self.sink.append(&record) {
                Ok(()) => {
                    self.stats.accepted += 1;
                    info!(
                        identifier = %record.identifier,
                        model_number = %record.model_number,
                        trimmed_model_number = %record.trimmed_model_number,
                        destination_code = %record.destination_code,
                        serial_number = %record.serial_number,
                        "record_accepted"
                    );
                    annotations.push(Annotation {
                        geometry: detection.geometry.clone(),
                        label: record.trimmed_model_number,
                    });
                }
                Err(e) => {
                    self.stats.sink_failures += 1;
                    error!(
                        identifier = %record.identifier,
                        error = %e,
                        "sink_append_failed"
                    );
                }
            }
        }

        annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Geometry, Rect};
    use crate::services::parser::PayloadConvention;
    use tempfile::{tempdir, TempDir};

    fn detection(text: &str) -> RawDetection {
        RawDetection {
            text: text.to_string(),
            geometry: Geometry { polygon: Vec::new(), rect: Rect { x: 5, y: 6, w: 7, h: 8 } },
            symbol: SymbolKind::QrCode,
        }
    }

    fn pipeline() -> (TempDir, ScanPipeline, std::path::PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let sink = RecordSink::new(&path);
        sink.ensure_initialized().unwrap();
        let pipeline = ScanPipeline::new(PayloadParser::new(PayloadConvention::Comma5), sink);
        (dir, pipeline, path)
    }

    fn sink_lines(path: &std::path::Path) -> Vec<String> {
        std::fs::read_to_string(path).unwrap().lines().map(String::from).collect()
    }

    #[test]
    fn test_valid_detection_appends_and_annotates() {
        let (_dir, mut pipeline, path) = pipeline();

        let annotations = pipeline.process(&[detection("ID1,MODELNUM123,DEST1,X,SN001")]);

        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].label, "MODELNU");
        assert_eq!(annotations[0].geometry.rect, Rect { x: 5, y: 6, w: 7, h: 8 });

        let lines = sink_lines(&path);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "ID1,MODELNUM123,MODELNU,DEST1,X");
        assert_eq!(pipeline.stats().accepted, 1);
    }

    #[test]
    fn test_same_text_across_frames_appends_once() {
        let (_dir, mut pipeline, path) = pipeline();

        let first = pipeline.process(&[detection("ID1,M1234567,D,S,x")]);
        let second = pipeline.process(&[detection("ID1,M1234567,D,S,x")]);

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(sink_lines(&path).len(), 2);
        assert_eq!(pipeline.stats().accepted, 1);
        assert_eq!(pipeline.stats().duplicates, 1);
        assert_eq!(pipeline.stats().frames, 2);
    }

    #[test]
    fn test_same_text_within_one_frame_appends_once() {
        let (_dir, mut pipeline, path) = pipeline();

        let annotations =
            pipeline.process(&[detection("ID1,M,D,S,x"), detection("ID1,M,D,S,x")]);

        assert_eq!(annotations.len(), 1);
        assert_eq!(sink_lines(&path).len(), 2);
        assert_eq!(pipeline.stats().duplicates, 1);
    }

    #[test]
    fn test_frame_order_preserved_in_sink() {
        let (_dir, mut pipeline, path) = pipeline();

        pipeline.process(&[detection("A,MODA,D,S,x"), detection("B,MODB,D,S,x")]);

        let lines = sink_lines(&path);
        assert!(lines[1].starts_with("A,"));
        assert!(lines[2].starts_with("B,"));
    }

    #[test]
    fn test_reject_is_silent_and_retryable() {
        let (_dir, mut pipeline, path) = pipeline();

        let annotations = pipeline.process(&[detection("A|B|C")]);
        assert!(annotations.is_empty());
        assert_eq!(sink_lines(&path).len(), 1);
        assert_eq!(pipeline.stats().rejected, 1);

        // Same text is not marked seen; a later frame can still accept a
        // corrected decode of the same physical code
        let annotations = pipeline.process(&[detection("A|B|C")]);
        assert!(annotations.is_empty());
        assert_eq!(pipeline.stats().rejected, 2);
        assert_eq!(pipeline.stats().duplicates, 0);
    }

    #[test]
    fn test_non_qr_symbols_filtered() {
        let (_dir, mut pipeline, path) = pipeline();

        let mut det = detection("ID1,M,D,S,x");
        det.symbol = SymbolKind::Other("CODE128".to_string());
        let annotations = pipeline.process(&[det]);

        assert!(annotations.is_empty());
        assert_eq!(sink_lines(&path).len(), 1);
        assert_eq!(pipeline.stats().accepted, 0);
    }

    #[test]
    fn test_sink_failure_marks_seen_and_counts() {
        let dir = tempdir().unwrap();
        // Sink path can never be created: parent is a regular file
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "x").unwrap();
        let sink = RecordSink::new(blocker.join("records.csv"));
        let mut pipeline = ScanPipeline::new(PayloadParser::new(PayloadConvention::Comma5), sink);

        let annotations = pipeline.process(&[detection("ID1,M,D,S,x")]);
        assert!(annotations.is_empty());
        assert_eq!(pipeline.stats().sink_failures, 1);

        // Marked seen despite the failure: no retry storm
        pipeline.process(&[detection("ID1,M,D,S,x")]);
        assert_eq!(pipeline.stats().sink_failures, 1);
        assert_eq!(pipeline.stats().duplicates, 1);
    }

    #[test]
    fn test_pipe4_policy_end_to_end() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("records.csv");
        let sink = RecordSink::new(&path);
        sink.ensure_initialized().unwrap();
        let mut pipeline = ScanPipeline::new(PayloadParser::new(PayloadConvention::Pipe4), sink);

        let annotations = pipeline.process(&[detection("ID9|PUMPUNIT77|WH3|SN42")]);
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].label, "PUMPUNI");

        let lines = sink_lines(&path);
        assert_eq!(lines[1], "ID9,PUMPUNIT77,PUMPUNI,WH3,SN42");
    }
}
