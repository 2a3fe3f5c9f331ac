//! CSV adapter: batch tables and metric history files.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use crate::domain::{MetricHistory, MetricSample, RawTable};
use crate::ports::{MetricsError, MetricsSource};

#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Format(#[from] csv::Error),

    #[error("CSV has no header row")]
    NoHeader,
}

/// Read a CSV document with a header row.
///
/// Rows may have fewer cells than the header; missing cells are reported
/// later, by whoever needs them.
///
/// # Errors
/// Returns `CsvError` if the input is not valid CSV or has no header.
pub fn read_table<R: Read>(reader: R) -> Result<RawTable, CsvError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeader);
    }

    let mut table = RawTable::new(headers);
    for record in csv_reader.records() {
        let record = record?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        table.rows.push(record.iter().map(str::to_string).collect());
    }

    tracing::debug!("Read CSV table: {} columns, {} rows", table.headers.len(), table.len());
    Ok(table)
}

/// Read a CSV file from disk.
///
/// # Errors
/// Returns `CsvError::Open` if the file cannot be opened, otherwise as [`read_table`].
pub fn read_table_from_path(path: &Path) -> Result<RawTable, CsvError> {
    let file = File::open(path).map_err(|source| CsvError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_table(file)
}

/// Write a table with its header row.
///
/// # Errors
/// Returns `CsvError::Format` on I/O or encoding failures.
pub fn write_table<W: Write>(writer: W, table: &RawTable) -> Result<(), CsvError> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    csv_writer.write_record(&table.headers)?;
    for row in &table.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Write a table to a file, replacing it if it exists.
///
/// # Errors
/// Returns `CsvError::Open` if the file cannot be created, otherwise as [`write_table`].
pub fn write_table_to_path(path: &Path, table: &RawTable) -> Result<(), CsvError> {
    let file = File::create(path).map_err(|source| CsvError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    write_table(file, table)?;
    tracing::info!("Wrote {} rows to {:?}", table.len(), path);
    Ok(())
}

/// Metric history read from a CSV file with columns `date,accuracy,roc_auc,f1`.
#[derive(Debug, Clone)]
pub struct CsvMetricsSource {
    path: PathBuf,
}

impl CsvMetricsSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a metric history from any reader.
    ///
    /// # Errors
    /// Returns `MetricsError::Parse` with the offending line, or `Empty`.
    pub fn parse<R: Read>(reader: R, origin: &str) -> Result<MetricHistory, MetricsError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut samples = Vec::new();
        for result in csv_reader.deserialize::<MetricSample>() {
            let sample = result.map_err(|e| MetricsError::Parse {
                line: e.position().map_or(0, csv::Position::line),
                message: e.to_string(),
            })?;
            samples.push(sample);
        }

        if samples.is_empty() {
            return Err(MetricsError::Empty);
        }
        samples.sort_by_key(|s| s.date);

        Ok(MetricHistory {
            samples,
            simulated: false,
            origin: origin.to_string(),
        })
    }
}

impl MetricsSource for CsvMetricsSource {
    fn history(&self) -> Result<MetricHistory, MetricsError> {
        let file = File::open(&self.path)?;
        let history = Self::parse(file, &self.path.display().to_string())?;
        tracing::info!("Loaded {} metric samples from {:?}", history.len(), self.path);
        Ok(history)
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_table_trims_and_skips_blank_rows() {
        let input = "\u{feff}a, b ,c\n1, 2,3\n\n4,5\n";
        let table = read_table(input.as_bytes()).expect("valid csv");

        assert_eq!(table.headers, vec!["a", "b", "c"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "b"), Some("2"));
        assert_eq!(table.cell(1, "c"), None);
    }

    #[test]
    fn test_quoted_values_round_trip() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("out.csv");

        let mut table = RawTable::new(vec!["PaymentMethod".into(), "note".into()]);
        table.rows.push(vec!["Bank transfer (automatic)".into(), "a, b".into()]);
        write_table_to_path(&path, &table).expect("write");

        let back = read_table_from_path(&path).expect("read");
        assert_eq!(back, table);
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let err = read_table_from_path(Path::new("does/not/exist.csv")).expect_err("missing");
        assert!(matches!(err, CsvError::Open { .. }));
    }

    #[test]
    fn test_metric_history_parse() {
        let input = "date,accuracy,roc_auc,f1\n2026-01-02,0.80,0.83,0.67\n2026-01-01,0.79,0.82,0.66\n";
        let history = CsvMetricsSource::parse(input.as_bytes(), "inline").expect("valid history");

        assert_eq!(history.len(), 2);
        assert!(!history.simulated);
        // sorted oldest first
        assert_eq!(history.samples[0].accuracy, 0.79);
    }

    #[test]
    fn test_metric_history_errors() {
        let bad = "date,accuracy,roc_auc,f1\n2026-01-01,high,0.82,0.66\n";
        assert!(matches!(
            CsvMetricsSource::parse(bad.as_bytes(), "inline"),
            Err(MetricsError::Parse { line: 2, .. })
        ));

        let empty = "date,accuracy,roc_auc,f1\n";
        assert!(matches!(
            CsvMetricsSource::parse(empty.as_bytes(), "inline"),
            Err(MetricsError::Empty)
        ));
    }
}
