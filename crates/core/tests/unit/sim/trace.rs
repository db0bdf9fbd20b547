//! Trace Parsing Tests.

use std::io::{Cursor, Write};

use pfsim_core::common::error::TraceError;
use pfsim_core::sim::trace::{TraceRecord, load_trace, read_trace};
use rstest::rstest;

/// Mixed decimal and hex fields parse.
#[test]
fn parses_hex_and_decimal_fields() {
    let r = TraceRecord::parse_line("120 0x7f001040 0X401A2C 0", 1)
        .unwrap()
        .unwrap();
    assert_eq!(
        r,
        TraceRecord {
            cycle: 120,
            addr: 0x7f00_1040,
            ip: 0x40_1a2c,
            hit: false,
        }
    );
}

/// Lines without fields produce no record.
#[rstest]
#[case("")]
#[case("   ")]
#[case("# cycle addr ip hit")]
fn blank_and_comment_lines_are_skipped(#[case] text: &str) {
    assert_eq!(TraceRecord::parse_line(text, 1).unwrap(), None);
}

/// Text after `#` is dropped.
#[test]
fn trailing_comment_is_ignored() {
    let r = TraceRecord::parse_line("5 64 1 1  # warm", 1).unwrap().unwrap();
    assert!(r.hit);
    assert_eq!(r.addr, 64);
}

/// Malformed lines carry their line number.
#[rstest]
#[case("1 2 3")]
#[case("1 2 3 0 5")]
#[case("1 2 3 yes")]
#[case("1 0xZZ 3 0")]
#[case("-1 2 3 0")]
fn malformed_lines_report_line_number(#[case] text: &str) {
    match TraceRecord::parse_line(text, 7) {
        Err(TraceError::Malformed { line, .. }) => assert_eq!(line, 7),
        other => panic!("unexpected result {other:?}"),
    }
}

/// Line numbers count from one, comments and blanks included.
#[test]
fn reader_numbers_lines_from_one() {
    let src = "# header\n1 0x1000 0x10 0\n\n2 0x1040 0x10 1\nbad\n";
    match read_trace(Cursor::new(src)) {
        Err(TraceError::Malformed { line, .. }) => assert_eq!(line, 5),
        other => panic!("unexpected result {other:?}"),
    }
}

/// Records come back in file order.
#[test]
fn reader_keeps_record_order() {
    let src = "1 0x1000 0x10 0\n2 0x1040 0x10 1\n";
    let records = read_trace(Cursor::new(src)).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].addr, 0x1000);
    assert_eq!(records[1].cycle, 2);
}

/// Traces load from disk.
#[test]
fn loads_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "10 0x2000 0x400 0").unwrap();
    writeln!(file, "11 0x2040 0x400 0").unwrap();
    let records = load_trace(file.path()).unwrap();
    assert_eq!(records.len(), 2);
}

/// A missing trace is an I/O error.
#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_trace(dir.path().join("absent.trace")).unwrap_err();
    assert!(matches!(err, TraceError::Io(_)));
}
