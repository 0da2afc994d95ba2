//! Output serialization for hashed rows.
//!
//! Badge CSV mode re-encodes rows as RFC4180 text (also what `--dumpFile`
//! writes); line and card modes become the JSON bodies the v1/v3
//! endpoints accept. Output row order always equals input row order and
//! nothing is sorted, dropped or deduplicated.

use badgeport_client::BadgePayload;

use crate::input::{BadgeRow, CardRow};
use crate::CliError;

/// Render badge rows as CSV with a `badge,riderId[,delete]` header.
/// `delete` renders as "T"/"F".
pub fn badge_csv(rows: &[BadgeRow], incremental: bool) -> Result<String, CliError> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    let write_err = |e: csv::Error| CliError::general(format!("CSV write error: {}", e));

    if incremental {
        writer
            .write_record(["badge", "riderId", "delete"])
            .map_err(write_err)?;
        for row in rows {
            writer
                .write_record([
                    row.badge.as_str(),
                    row.rider_id.as_str(),
                    if row.delete { "T" } else { "F" },
                ])
                .map_err(write_err)?;
        }
    } else {
        writer
            .write_record(["badge", "riderId"])
            .map_err(write_err)?;
        for row in rows {
            writer
                .write_record([row.badge.as_str(), row.rider_id.as_str()])
                .map_err(write_err)?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CliError::general(format!("CSV flush error: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| CliError::general(format!("CSV encoding error: {}", e)))
}

/// Card rows as the v3 payload: `[riderId, prox, uhf]` triples.
pub fn card_payload(rows: Vec<CardRow>) -> BadgePayload {
    BadgePayload::Cards(
        rows.into_iter()
            .map(|row| [row.rider_id, row.prox, row.uhf])
            .collect(),
    )
}
