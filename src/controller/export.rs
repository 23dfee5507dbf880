//! CSV export of scan results

use super::error::SessionError;
use super::normalize::NetworkRecord;
use std::fs;
use std::path::Path;

/// File name used when the caller does not choose one
pub const DEFAULT_EXPORT_PATH: &str = "wifi_networks.csv";

/// MIME type for CSV downloads
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const HEADER: [&str; 3] = ["SSID", "Signal", "Security"];

/// Encoded CSV and the number of data rows in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub bytes: Vec<u8>,
    pub rows: usize,
}

/// Presentation choices applied to exported cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// Append the tier glyph after the dBm value
    pub with_glyphs: bool,
    /// Append a star to open networks' security label
    pub mark_open: bool,
}

impl CsvOptions {
    /// The cell values the table view shows
    pub fn table_view() -> Self {
        Self {
            with_glyphs: true,
            mark_open: true,
        }
    }
}

/// Encode records as CSV with a `SSID,Signal,Security` header.
///
/// Fails with [`SessionError::NoData`] rather than producing a header-only
/// document.
pub fn to_csv(records: &[NetworkRecord], options: &CsvOptions) -> Result<Vec<u8>, SessionError> {
    if records.is_empty() {
        return Err(SessionError::NoData);
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for record in records {
        writer.write_record([
            record.ssid().to_string(),
            signal_cell(record, options),
            security_cell(record, options),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| SessionError::Io(e.into_error()))
}

fn signal_cell(record: &NetworkRecord, options: &CsvOptions) -> String {
    if options.with_glyphs {
        format!("{} {}", record.signal_display(), record.signal_tier().glyph())
    } else {
        record.signal_display()
    }
}

fn security_cell(record: &NetworkRecord, options: &CsvOptions) -> String {
    if options.mark_open && record.is_open_warning() {
        format!("{} ⭐", record.security())
    } else {
        record.security().to_string()
    }
}

/// Write an encoded export to disk, replacing any existing file.
pub fn write_csv_file<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), SessionError> {
    let path = path.as_ref();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    // Write to temp file first, then rename
    let temp_path = path.with_extension("csv.tmp");
    fs::write(&temp_path, bytes)?;
    fs::rename(&temp_path, path)?;

    tracing::info!(path = %path.display(), bytes = bytes.len(), "Exported scan results");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::normalize::{normalize, RawObservation};
    use crate::controller::security::AkmCode;
    use tempfile::tempdir;

    fn sample_records() -> Vec<NetworkRecord> {
        normalize(&[
            RawObservation::new("CU_WiFi", -45, vec![AkmCode::WPA2_PSK]),
            RawObservation::new("", -80, vec![]),
            RawObservation::new("Cafe, \"Free\" WiFi", -71, vec![AkmCode::NONE]),
        ])
    }

    #[test]
    fn test_header_and_row_count() {
        let records = sample_records();
        let bytes = to_csv(&records, &CsvOptions::default()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 1 + records.len());
        assert_eq!(lines[0], "SSID,Signal,Security");
        assert_eq!(lines[1], "CU_WiFi,-45 dBm,WPA2-PSK");
        assert_eq!(lines[2], "<Hidden>,-80 dBm,Open");
    }

    #[test]
    fn test_fields_with_delimiters_are_quoted() {
        let text = String::from_utf8(to_csv(&sample_records(), &CsvOptions::default()).unwrap())
            .unwrap();
        assert!(text.contains("\"Cafe, \"\"Free\"\" WiFi\",-71 dBm,Open"));

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(&rows[2][0], "Cafe, \"Free\" WiFi");
    }

    #[test]
    fn test_table_view_cells() {
        let text =
            String::from_utf8(to_csv(&sample_records(), &CsvOptions::table_view()).unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "CU_WiFi,-45 dBm 🟩🟩🟩🟩🟩,WPA2-PSK");
        assert_eq!(lines[2], "<Hidden>,-80 dBm 🟥🟥,Open ⭐");
    }

    #[test]
    fn test_empty_results_are_rejected() {
        let result = to_csv(&[], &CsvOptions::default());
        assert!(matches!(result, Err(SessionError::NoData)));
    }

    #[test]
    fn test_write_csv_file_replaces_existing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("exports").join(DEFAULT_EXPORT_PATH);

        write_csv_file(&path, b"old").unwrap();
        let bytes = to_csv(&sample_records(), &CsvOptions::default()).unwrap();
        write_csv_file(&path, &bytes).unwrap();

        assert_eq!(fs::read(&path).unwrap(), bytes);
        assert!(!path.with_extension("csv.tmp").exists());
    }
}
