use std::io;
use std::path::Path;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::normalize::PlatformProfile;
use crate::{RawCount, RawRecord};

/// Reads one platform export. Any read or row-level CSV error aborts the whole
/// batch; no partial record list is returned.
pub fn load_records(path: &Path, profile: &PlatformProfile) -> Result<Vec<RawRecord>> {
    let file = std::fs::File::open(path)?;
    let records = read_records(file, profile)?;
    info!(
        platform = profile.name.as_str(),
        path = %path.display(),
        rows = records.len(),
        "platform export loaded"
    );
    Ok(records)
}

pub fn read_records<R: io::Read>(input: R, profile: &PlatformProfile) -> Result<Vec<RawRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    let position = |column: &str| headers.iter().position(|header| header == column);

    let id_idx = position(&profile.id_column).ok_or_else(|| Error::MissingColumn {
        platform: profile.name.clone(),
        column: profile.id_column.clone(),
    })?;
    let text_idx = position(&profile.text_column);
    let fallback_idx = profile.fallback_text_column.as_deref().and_then(position);
    if text_idx.is_none() && fallback_idx.is_none() {
        warn!(
            platform = profile.name.as_str(),
            column = profile.text_column.as_str(),
            "no text column, every item will score neutral sentiment"
        );
    }

    let mut counters = Vec::new();
    for column in profile.counter_columns() {
        match position(column) {
            Some(idx) => counters.push((column.to_string(), idx)),
            None => warn!(
                platform = profile.name.as_str(),
                column,
                "counter column missing, values default to 0"
            ),
        }
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let field = |idx: Option<usize>| {
            idx.and_then(|idx| row.get(idx))
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let text = field(text_idx).or_else(|| field(fallback_idx)).unwrap_or_default();
        let item_id = row.get(id_idx).unwrap_or_default().trim();
        let mut record = RawRecord::new(profile.name.clone(), item_id).with_text(text);
        for (column, idx) in &counters {
            if let Some(value) = row.get(*idx) {
                record
                    .counters
                    .insert(column.clone(), RawCount::Text(value.to_string()));
            }
        }
        records.push(record);
    }

    Ok(records)
}
