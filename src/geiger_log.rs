//! bGeigie Nano measurement log ingestion
//!
//! Each log line is an NMEA-style sentence:
//!
//! ```text
//! $BNRDD,2350,2016-08-25T14:38:36Z,23,2,1062,A,3222.3030,N,8841.5036,W,74.30,A,9,98*4B
//! ```
//!
//! Lines starting with `#` are headers or comments. Replacing `*` with `,`
//! yields 16 positional fields; only the count columns and the timestamp are
//! typed, the GPS fields are kept verbatim.
//!
//! # Example
//!
//! ```
//! use vaultshield::geiger_log::GeigerLog;
//!
//! let text = "# header\n\
//!     $BNRDD,2350,2016-08-25T14:38:36Z,23,2,1062,A,3222.3030,N,8841.5036,W,74.30,A,9,98*4B\n";
//! let log = GeigerLog::parse(text).unwrap();
//! assert_eq!(log.counts_per_minute(), vec![23]);
//! ```
//!
//! # Reference
//!
//! Safecast bGeigieNanoKit wiki, Nano Operation Manual (log format)

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Number of positional fields in a log sentence
pub const FIELD_COUNT: usize = 16;

/// Errors raised while reading a measurement log
#[derive(Error, Debug)]
pub enum LogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed log line {line}: {reason}")]
    Malformed { line: usize, reason: String },
}

pub type Result<T> = std::result::Result<T, LogError>;

/// One measurement sentence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Sentence tag, e.g. `$BNRDD`
    pub header: String,
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// Counts over the last minute
    pub counts_per_minute: u64,
    /// Counts over the last 5 seconds
    pub counts_per_5s: u64,
    /// Cumulative counts since power-on
    pub total_counts: u64,
    /// `A` when the radiation reading is valid, `V` otherwise
    pub flag: String,
    pub latitude: String,
    pub hemisphere: String,
    pub longitude: String,
    pub east_west: String,
    pub altitude: String,
    /// `A` when the GPS has a fix, `V` otherwise
    pub gps_fix: String,
    pub satellites: String,
    pub hdop: String,
    /// Checksum as written in the sentence (hex)
    pub checksum: String,
    /// XOR of the bytes between `$` and `*`
    computed_checksum: u8,
}

impl LogRecord {
    /// Parse a single sentence; `line` is the 1-based line number for errors
    pub fn parse_line(text: &str, line: usize) -> Result<Self> {
        let malformed = |reason: String| LogError::Malformed { line, reason };

        let normalized = text.replace('*', ",");
        let fields: Vec<&str> = normalized.split(',').map(str::trim).collect();
        if fields.len() != FIELD_COUNT {
            return Err(malformed(format!(
                "expected {} fields, found {}",
                FIELD_COUNT,
                fields.len()
            )));
        }

        let count = |index: usize, name: &str| -> Result<u64> {
            fields[index]
                .parse::<u64>()
                .map_err(|_| malformed(format!("invalid {} '{}'", name, fields[index])))
        };

        Ok(Self {
            header: fields[0].to_string(),
            device_id: fields[1].to_string(),
            timestamp: parse_timestamp(fields[2])
                .ok_or_else(|| malformed(format!("invalid timestamp '{}'", fields[2])))?,
            counts_per_minute: count(3, "1-minute count")?,
            counts_per_5s: count(4, "5-second count")?,
            total_counts: count(5, "cumulative count")?,
            flag: fields[6].to_string(),
            latitude: fields[7].to_string(),
            hemisphere: fields[8].to_string(),
            longitude: fields[9].to_string(),
            east_west: fields[10].to_string(),
            altitude: fields[11].to_string(),
            gps_fix: fields[12].to_string(),
            satellites: fields[13].to_string(),
            hdop: fields[14].to_string(),
            checksum: fields[15].to_string(),
            computed_checksum: nmea_checksum(text),
        })
    }

    /// Whether the sentence checksum matches its content
    pub fn checksum_matches(&self) -> bool {
        u8::from_str_radix(&self.checksum, 16).is_ok_and(|c| c == self.computed_checksum)
    }

    /// Whether the device flagged the radiation reading as valid
    pub fn is_valid_reading(&self) -> bool {
        self.flag == "A"
    }
}

/// XOR of the bytes between the leading `$` and the `*`
pub fn nmea_checksum(sentence: &str) -> u8 {
    let body = sentence.trim().trim_start_matches('$');
    let body = body.split('*').next().unwrap_or(body);
    body.bytes().fold(0u8, |acc, b| acc ^ b)
}

/// RFC 3339, or naive `YYYY-MM-DDTHH:MM:SS` taken as UTC
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Parsed measurement log, records in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeigerLog {
    records: Vec<LogRecord>,
}

impl GeigerLog {
    /// Parse log text; comments and blank lines are skipped
    pub fn parse(text: &str) -> Result<Self> {
        let mut records = Vec::new();
        let mut comments = 0usize;

        for (i, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.starts_with('#') {
                comments += 1;
                continue;
            }
            records.push(LogRecord::parse_line(trimmed, i + 1)?);
        }

        let bad_checksums = records.iter().filter(|r| !r.checksum_matches()).count();
        tracing::debug!(
            records = records.len(),
            comments,
            bad_checksums,
            "measurement log parsed"
        );
        if bad_checksums > 0 {
            tracing::warn!(bad_checksums, "log sentences with checksum mismatch");
        }

        Ok(Self { records })
    }

    /// Read and parse a log file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The 1-minute count column in file order
    pub fn counts_per_minute(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.counts_per_minute).collect()
    }
}
