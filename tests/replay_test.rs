//! End-to-end tests: replay script through the full loop into the CSV store

use qr_intake::io::{LogDisplay, RecordSink, ReplayDecoder, ReplayFrameSource};
use qr_intake::services::{
    PayloadConvention, PayloadParser, ScanPipeline, ScanRunner, StopReason,
};
use std::path::Path;
use tempfile::tempdir;
use tokio::sync::watch;

fn write_script(path: &Path, lines: &[&str]) {
    std::fs::write(path, lines.join("\n") + "\n").unwrap();
}

fn run_once(script: &Path, sink_file: &Path) -> qr_intake::services::RunOutcome {
    let sink = RecordSink::new(sink_file);
    sink.ensure_initialized().unwrap();
    let pipeline = ScanPipeline::new(PayloadParser::new(PayloadConvention::Comma5), sink);
    let source = ReplayFrameSource::open(script).unwrap();
    let (_tx, rx) = watch::channel(false);
    let runner = ScanRunner::new(source, ReplayDecoder::new(), LogDisplay::new(), pipeline, rx, 0);
    runner.run()
}

fn sink_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path).unwrap().lines().map(String::from).collect()
}

#[test]
fn test_fresh_store_gets_header_and_one_row() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("frames.jsonl");
    let store = dir.path().join("records.csv");
    write_script(&script, &[r#"{"detections":[{"text":"ID1,MODELNUM123,DEST1,X,SN001"}]}"#]);

    let outcome = run_once(&script, &store);
    assert_eq!(outcome.reason, StopReason::EndOfStream);
    assert_eq!(outcome.frames, 1);

    let lines = sink_lines(&store);
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "Identifier,Model Number,Trimmed Model Number,Destination Code,Serial Number"
    );
    assert_eq!(lines[1], "ID1,MODELNUM123,MODELNU,DEST1,X");
}

#[test]
fn test_duplicates_across_frames_append_once() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("frames.jsonl");
    let store = dir.path().join("records.csv");
    write_script(
        &script,
        &[
            r#"{"detections":[{"text":"ID1,MODEL,DEST,SN,x"}]}"#,
            r#"{"detections":[{"text":"ID1,MODEL,DEST,SN,x"}]}"#,
            r#"{"detections":[{"text":"ID1,MODEL,DEST,SN,x"}]}"#,
        ],
    );

    let outcome = run_once(&script, &store);
    assert_eq!(outcome.frames, 3);
    assert_eq!(sink_lines(&store).len(), 2);
}

#[test]
fn test_ordering_within_a_frame() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("frames.jsonl");
    let store = dir.path().join("records.csv");
    write_script(
        &script,
        &[r#"{"detections":[{"text":"A,MODA,D,S,x"},{"text":"B,MODB,D,S,x"}]}"#],
    );

    run_once(&script, &store);

    let lines = sink_lines(&store);
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("A,"));
    assert!(lines[2].starts_with("B,"));
}

#[test]
fn test_second_run_appends_after_existing_rows() {
    let dir = tempdir().unwrap();
    let script_one = dir.path().join("one.jsonl");
    let script_two = dir.path().join("two.jsonl");
    let store = dir.path().join("records.csv");
    write_script(&script_one, &[r#"{"detections":[{"text":"ID1,MODEL,DEST,SN,x"}]}"#]);
    write_script(&script_two, &[r#"{"detections":[{"text":"ID2,MODEL,DEST,SN,x"}]}"#]);

    run_once(&script_one, &store);
    let after_first = sink_lines(&store);

    // In-memory dedupe resets per run: the same store gains a new row but
    // keeps all prior rows unchanged and the header appears exactly once
    run_once(&script_two, &store);
    let after_second = sink_lines(&store);

    assert_eq!(after_first.len(), 2);
    assert_eq!(after_second.len(), 3);
    assert_eq!(after_second[0..2], after_first[0..2]);
    assert!(after_second[2].starts_with("ID2,"));
    assert_eq!(
        after_second.iter().filter(|l| l.starts_with("Identifier,")).count(),
        1
    );
}

#[test]
fn test_malformed_and_non_qr_detections_skipped() {
    let dir = tempdir().unwrap();
    let script = dir.path().join("frames.jsonl");
    let store = dir.path().join("records.csv");
    write_script(
        &script,
        &[
            r#"{"detections":[{"text":"A|B|C"}]}"#,
            r#"{"detections":[{"text":"ID1,MODEL,DEST,SN,x","symbol":"CODE128"}]}"#,
            r#"{"detections":[{"text":"ID1,MODEL,DEST,SN,x"}]}"#,
        ],
    );

    run_once(&script, &store);

    let lines = sink_lines(&store);
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("ID1,"));
}
