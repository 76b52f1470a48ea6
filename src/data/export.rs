//! CSV export of recorded history.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};

use super::history::HistoricalData;
use super::reading::Metric;
use super::table::rows;
use crate::error::ExportError;

/// Header of the timestamp column.
const TIMESTAMP_HEADER: &str = "Timestamp";

/// Render history as CSV, one row per index across the three series.
///
/// Timestamps are ISO-8601 UTC with millisecond precision. Values keep the
/// precision they were stored with; missing cells are empty.
pub fn to_csv(history: &HistoricalData) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(history, &mut buffer)?;
    // The writer only ever receives UTF-8 fields.
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write history as CSV to a file.
///
/// The file is written under a `.partial` name next to `path` and renamed
/// into place once complete, so a failed export never leaves a truncated
/// file behind and never clobbers an existing one.
pub fn export_to_file(history: &HistoricalData, path: &Path) -> Result<(), ExportError> {
    if history.is_empty() {
        return Err(ExportError::NoData);
    }
    write_atomically(path, |file| write_csv(history, file))
}

fn write_atomically<F>(path: &Path, write: F) -> Result<(), ExportError>
where
    F: FnOnce(&mut File) -> Result<(), ExportError>,
{
    let partial = partial_path(path);
    let result = File::create(&partial)
        .map_err(ExportError::from)
        .and_then(|mut file| {
            write(&mut file)?;
            file.sync_all()?;
            Ok(())
        })
        .and_then(|()| fs::rename(&partial, path).map_err(ExportError::from));

    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Default export file name, e.g. `health_data_2024-05-01T10:00:00.000Z.csv`.
pub fn default_file_name(now: DateTime<Utc>) -> PathBuf {
    PathBuf::from(format!(
        "health_data_{}.csv",
        now.to_rfc3339_opts(SecondsFormat::Millis, true)
    ))
}

fn write_csv<W: std::io::Write>(history: &HistoricalData, out: W) -> Result<(), ExportError> {
    if history.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec![TIMESTAMP_HEADER];
    header.extend(Metric::ALL.iter().map(|m| m.label()));
    writer.write_record(&header)?;

    for row in rows(history) {
        let mut record = vec![format_timestamp(row.timestamp)];
        record.extend(Metric::ALL.iter().map(|m| format_value(row.value(*m))));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Epoch millis as `YYYY-MM-DDTHH:MM:SS.sssZ`.
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
