//! Input file readers.
//!
//! Three input shapes feed the pipeline:
//! - line list: one raw badge id per line, no header
//! - badge CSV: `badge,riderId` header, optional `delete` column when
//!   running incrementally
//! - card CSV: `riderId,prox,uhf` header
//!
//! All readers preserve row order and duplicates. CSV input is RFC4180
//! (comma-delimited, double-quote escaped) with a required header row.

use std::path::Path;

use crate::CliError;

/// One record of a `badge,riderId[,delete]` file.
#[derive(Debug, Clone, PartialEq)]
pub struct BadgeRow {
    pub badge: String,
    pub rider_id: String,
    /// Only read in incremental mode; false otherwise.
    pub delete: bool,
}

/// One record of a `riderId,prox,uhf` file.
#[derive(Debug, Clone, PartialEq)]
pub struct CardRow {
    pub rider_id: String,
    pub prox: String,
    pub uhf: String,
}

/// Read the whole input file. Badge exports from Excel are often
/// BOM-prefixed, so a leading UTF-8 BOM is stripped.
fn read_input_file(path: &Path) -> Result<String, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::input_io(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Line-list mode: every line is one raw identifier, kept verbatim.
/// CRLF line endings are tolerated; the final newline does not produce
/// a trailing empty record.
pub fn read_badge_lines(path: &Path) -> Result<Vec<String>, CliError> {
    let text = read_input_file(path)?;
    Ok(text.lines().map(str::to_string).collect())
}

/// Badge CSV mode. Requires `badge` and `riderId` columns, plus
/// `delete` when `incremental` is set. Extra columns are ignored.
pub fn read_badge_csv(path: &Path, incremental: bool) -> Result<Vec<BadgeRow>, CliError> {
    let text = read_input_file(path)?;
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .clone();
    let badge_idx = column(path, &headers, "badge")?;
    let rider_idx = column(path, &headers, "riderId")?;
    let delete_idx = if incremental {
        Some(column(path, &headers, "delete")?)
    } else {
        None
    };

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(path, e))?;
        let delete = match delete_idx {
            Some(idx) => parse_delete(record.get(idx).unwrap_or(""), i + 1)?,
            None => false,
        };
        rows.push(BadgeRow {
            badge: record.get(badge_idx).unwrap_or("").to_string(),
            rider_id: record.get(rider_idx).unwrap_or("").to_string(),
            delete,
        });
    }
    Ok(rows)
}

/// Card CSV mode. Requires `riderId`, `prox` and `uhf` columns; extra
/// columns are ignored.
pub fn read_card_csv(path: &Path) -> Result<Vec<CardRow>, CliError> {
    let text = read_input_file(path)?;
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .clone();
    let rider_idx = column(path, &headers, "riderId")?;
    let prox_idx = column(path, &headers, "prox")?;
    let uhf_idx = column(path, &headers, "uhf")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        rows.push(CardRow {
            rider_id: record.get(rider_idx).unwrap_or("").to_string(),
            prox: record.get(prox_idx).unwrap_or("").to_string(),
            uhf: record.get(uhf_idx).unwrap_or("").to_string(),
        });
    }
    Ok(rows)
}

/// The `delete` column accepts exactly "", "F" and "T".
fn parse_delete(value: &str, record_no: usize) -> Result<bool, CliError> {
    match value {
        "" | "F" => Ok(false),
        "T" => Ok(true),
        other => Err(CliError::input_format(format!(
            "record {}: invalid delete value {:?} (expected \"\", \"F\" or \"T\")",
            record_no, other,
        ))),
    }
}

fn column(path: &Path, headers: &csv::StringRecord, name: &str) -> Result<usize, CliError> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        CliError::input_format(format!(
            "{}: missing required column {:?} (header row: {})",
            path.display(),
            name,
            headers.iter().collect::<Vec<_>>().join(","),
        ))
    })
}

fn csv_error(path: &Path, err: csv::Error) -> CliError {
    CliError::input_format(format!("{}: {}", path.display(), err))
}
