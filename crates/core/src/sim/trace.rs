//! Access trace parsing.
//!
//! One demand access per line, whitespace separated:
//!
//! ```text
//! # cycle  addr        ip          hit
//! 120      0x7f001040  0x401a2c    0
//! 133      0x7f001080  0x401a2c    1
//! ```
//!
//! Integers are decimal or `0x`-prefixed hex. Blank lines and text after `#`
//! are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::common::error::TraceError;

/// One demand access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Cycle at which the access reaches the L2.
    pub cycle: u64,
    /// Byte address.
    pub addr: u64,
    /// Instruction pointer.
    pub ip: u64,
    /// Whether the access hit in the L2.
    pub hit: bool,
}

impl TraceRecord {
    /// Parses one trace line.
    ///
    /// # Returns
    ///
    /// `Ok(None)` for blank or comment-only lines.
    ///
    /// # Errors
    ///
    /// Returns [`TraceError::Malformed`] if the line has the wrong number of
    /// fields or a field does not parse.
    pub fn parse_line(text: &str, line: usize) -> Result<Option<Self>, TraceError> {
        let body = text.split('#').next().unwrap_or("");
        let fields: Vec<&str> = body.split_whitespace().collect();
        if fields.is_empty() {
            return Ok(None);
        }
        let &[cycle, addr, ip, hit] = fields.as_slice() else {
            return Err(TraceError::Malformed {
                line,
                reason: format!("expected 4 fields, found {}", fields.len()),
            });
        };

        let hit = match hit {
            "0" => false,
            "1" => true,
            other => {
                return Err(TraceError::Malformed {
                    line,
                    reason: format!("hit flag must be 0 or 1, found {other:?}"),
                });
            }
        };

        Ok(Some(Self {
            cycle: parse_u64(cycle, line)?,
            addr: parse_u64(addr, line)?,
            ip: parse_u64(ip, line)?,
            hit,
        }))
    }
}

fn parse_u64(field: &str, line: usize) -> Result<u64, TraceError> {
    let parsed = match field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => field.parse(),
    };
    parsed.map_err(|e| TraceError::Malformed {
        line,
        reason: format!("invalid integer {field:?}: {e}"),
    })
}

/// Reads every record from a trace source.
///
/// # Errors
///
/// Returns the first I/O or parse error.
pub fn read_trace(reader: impl BufRead) -> Result<Vec<TraceRecord>, TraceError> {
    let mut records = Vec::new();
    for (idx, text) in reader.lines().enumerate() {
        if let Some(record) = TraceRecord::parse_line(&text?, idx + 1)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Reads every record from a trace file.
///
/// # Errors
///
/// Returns the first I/O or parse error.
pub fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceRecord>, TraceError> {
    let file = File::open(path)?;
    read_trace(BufReader::new(file))
}
