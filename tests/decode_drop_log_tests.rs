use sandfall::compact_log::CompactLogWriter;
use sandfall::drop_log::DropLog;
use sandfall::{simulate, parse_scan, BuildOptions};
use std::fs;
use std::process::Command;

const DECODER: &str = env!("CARGO_BIN_EXE_decode_drop_log");

fn write_temp(name: &str, bytes: &[u8]) -> String {
    let path = std::env::temp_dir().join(name);
    fs::write(&path, bytes).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn decodes_a_logged_run() {
    let scan = parse_scan("498,4 -> 498,6 -> 496,6\n503,4 -> 502,4 -> 502,9 -> 494,9").unwrap();
    let mut log = DropLog::new();
    simulate(&scan, &BuildOptions::new(-1), false, Some(&mut log)).unwrap();
    let mut writer = CompactLogWriter::new();
    for event in log.get_events() {
        writer.write_event(event);
    }
    let path = write_temp("sandfall_decode_ok.bin", writer.get_bytes());

    let output = Command::new(DECODER).arg(&path).output().unwrap();
    fs::remove_file(&path).ok();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Total events: 27"), "{}", stdout);
}

#[test]
fn corrupt_log_exits_with_failure() {
    // unknown event type after a zero delta
    let path = write_temp("sandfall_decode_corrupt.bin", &[0, 42]);

    let output = Command::new(DECODER).arg(&path).output().unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("stopped after 0 events"));
}

#[test]
fn missing_argument_exits_with_failure() {
    let output = Command::new(DECODER).output().unwrap();
    assert_eq!(output.status.code(), Some(1));
}
