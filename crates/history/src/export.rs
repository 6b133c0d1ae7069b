//! CSV export of the history table.
//!
//! Columns follow the table layout. Fields containing a comma, a quote or a
//! line break are quoted with embedded quotes doubled; records end in CRLF.
//! Missing values are empty cells.

#![forbid(unsafe_code)]

use crate::record::HistoryRecord;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const CSV_COLUMNS: [&str; 7] = [
    "id",
    "createDate",
    "recordType",
    "cycleCount",
    "nominalChargeCapacity",
    "designCapacity",
    "maximumCapacity",
];

fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\r', '\n']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write `records` as CSV in the given order, header first.
pub fn write_csv<W: Write>(records: &[HistoryRecord], mut out: W) -> io::Result<()> {
    write!(out, "{}\r\n", CSV_COLUMNS.join(","))?;
    for record in records {
        let maximum = record.maximum_capacity.as_deref().map(escape);
        write!(
            out,
            "{},{},{},{},{},{},{}\r\n",
            record.id,
            record.create_date,
            record.record_type.ordinal(),
            record.cycle_count,
            optional(record.nominal_charge_capacity),
            optional(record.design_capacity),
            maximum.unwrap_or_default(),
        )?;
    }
    out.flush()
}

const MAX_SUFFIX: u32 = 1000;

/// File name used for an export made at `at`.
pub fn export_file_name(at: DateTime<Utc>) -> String {
    format!("battery_history_{}.csv", at.timestamp())
}

/// Write `records` to a new CSV file inside `dir` and return its path.
///
/// An existing file is never overwritten: a second export in the same second
/// gets a numbered name, e.g. `battery_history_1700000000-1.csv`.
pub fn export_csv(records: &[HistoryRecord], dir: &Path, at: DateTime<Utc>) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let (path, file) = create_unique(dir, at)?;
    write_csv(records, BufWriter::new(file))?;
    Ok(path)
}

fn create_unique(dir: &Path, at: DateTime<Utc>) -> io::Result<(PathBuf, File)> {
    let stamp = at.timestamp();
    for attempt in 0..=MAX_SUFFIX {
        let name = match attempt {
            0 => export_file_name(at),
            n => format!("battery_history_{stamp}-{n}.csv"),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {}
            Err(err) => return Err(err),
        }
    }
    Err(io::Error::new(io::ErrorKind::AlreadyExists, "no free export file name"))
}
