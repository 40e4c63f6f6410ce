// src/process/mod.rs
pub mod aggregate;
pub mod date_parser;
pub mod normalize;
pub mod raw_row;
pub mod utils;
pub mod validate;

pub use aggregate::{process_rows, DashboardData};
pub use normalize::{normalize_row, Field, NormalizedRow};
pub use raw_row::{RawRow, Value};
pub use validate::{validate_rows, ValidationResult};

use crate::error::ParseError;
use anyhow::Context;
use csv::{ByteRecord, ReaderBuilder};
use std::{io::Read, path::Path};
use tracing::{debug, warn};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parse comma-separated text with a header line into typed rows.
///
/// - Empty lines are skipped.
/// - Every field is typed through [`utils::infer_value`].
/// - Rows whose field count differs from the header are collected as errors;
///   if there are any, no rows are returned.
#[tracing::instrument(level = "debug", skip(reader))]
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<RawRow>, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // field counts are checked below so every bad row is reported
        .from_reader(reader);

    let headers: Vec<String> = match rdr.byte_headers() {
        Ok(h) => h
            .iter()
            .map(|f| String::from_utf8_lossy(f).into_owned())
            .collect(),
        Err(e) => {
            return Err(ParseError {
                errors: vec![e.to_string()],
            })
        }
    };

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    let mut record = ByteRecord::new();
    let mut row = 0usize;

    loop {
        match rdr.read_byte_record(&mut record) {
            Ok(false) => break,
            Ok(true) => {
                row += 1;
                if record.len() != headers.len() {
                    let kind = if record.len() < headers.len() {
                        "Too few fields"
                    } else {
                        "Too many fields"
                    };
                    errors.push(format!(
                        "{}: expected {} fields but parsed {} (row {})",
                        kind,
                        headers.len(),
                        record.len(),
                        row
                    ));
                    continue;
                }
                let fields = headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, raw)| {
                        let text = String::from_utf8_lossy(raw);
                        (h.clone(), utils::infer_value(&text))
                    })
                    .collect();
                rows.push(RawRow::new(fields));
            }
            Err(e) => {
                errors.push(e.to_string());
                break;
            }
        }
    }

    if !errors.is_empty() {
        warn!(count = errors.len(), first = %errors[0], "CSV parse failed");
        return Err(ParseError { errors });
    }

    debug!(rows = rows.len(), columns = headers.len(), "parsed CSV");
    Ok(rows)
}

/// [`parse_csv`] over an in-memory buffer, dropping a leading byte order mark.
pub fn parse_bytes(bytes: &[u8]) -> Result<Vec<RawRow>, ParseError> {
    parse_csv(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))
}

/// Read `path` without blocking the runtime, then parse it.
pub async fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<RawRow>> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    Ok(parse_bytes(&bytes)?)
}
