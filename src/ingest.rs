//! TSV Ingestion
//!
//! Loads query-log files into a [`DateTree`]. Each line holds a timestamp and a
//! query string separated by a tab:
//!
//! ```text
//! 2015-08-01 00:03:43	http%3A%2F%2Fwww.getsidekick.com%2Fblog%2Fbody-language-advice
//! 2015-08-01 00:03:43	%22https%3A%2F%2Fgithub.com%2Fgmarik%2Fvundle%22
//! ```
//!
//! Malformed lines are skipped and reported; only a failing reader aborts.

use chrono::NaiveDateTime;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

use crate::prefix::TIMESTAMP_FORMAT;
use crate::tree::DateTree;

/// Skipped-line messages kept in an [`IngestReport`]
const MAX_REPORTED_ERRORS: usize = 100;

/// Errors that abort ingestion
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of an ingestion run
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Records read from the input, blank lines excluded
    pub lines_read: u64,
    /// Events inserted into the tree
    pub inserted: u64,
    /// Records rejected
    pub skipped: u64,
    /// First rejection messages, one per skipped line
    pub errors: Vec<String>,
}

impl IngestReport {
    fn reject(&mut self, line: u64, reason: impl std::fmt::Display) {
        self.skipped += 1;
        tracing::warn!(line, "Skipping log line: {}", reason);

        if self.errors.len() < MAX_REPORTED_ERRORS {
            self.errors.push(format!("Line {}: {}", line, reason));
        }
    }
}

/// Tab-separated query-log reader
pub struct TsvIngester {
    timestamp_format: String,
}

impl Default for TsvIngester {
    fn default() -> Self {
        Self::new()
    }
}

impl TsvIngester {
    pub fn new() -> Self {
        Self {
            timestamp_format: TIMESTAMP_FORMAT.to_string(),
        }
    }

    /// Set the strftime format of the timestamp column
    pub fn with_timestamp_format(mut self, format: &str) -> Self {
        self.timestamp_format = format.to_string();
        self
    }

    /// Ingest a log file
    pub fn ingest_path(&self, path: &Path, tree: &mut DateTree) -> Result<IngestReport, IngestError> {
        let file = std::fs::File::open(path)?;
        tracing::info!("Reading log file {:?}", path);
        self.ingest_reader(std::io::BufReader::new(file), tree)
    }

    /// Ingest from an in-memory string
    pub fn ingest_str(&self, data: &str, tree: &mut DateTree) -> Result<IngestReport, IngestError> {
        self.ingest_reader(data.as_bytes(), tree)
    }

    /// Ingest every line of `reader` into `tree`
    pub fn ingest_reader<R: Read>(
        &self,
        reader: R,
        tree: &mut DateTree,
    ) -> Result<IngestReport, IngestError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut report = IngestReport::default();
        let mut record = csv::StringRecord::new();

        loop {
            let line = reader.position().line();
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    report.lines_read += 1;
                    report.reject(line, e);
                    continue;
                }
            }

            report.lines_read += 1;
            let line = record.position().map_or(line, |p| p.line());

            if record.len() != 2 {
                report.reject(line, format!("expected 2 fields, found {}", record.len()));
                continue;
            }

            let query = &record[1];
            if query.is_empty() {
                report.reject(line, "empty query");
                continue;
            }

            let timestamp = match NaiveDateTime::parse_from_str(record[0].trim(), &self.timestamp_format) {
                Ok(ts) => ts,
                Err(e) => {
                    report.reject(line, format!("wrong date [{}]: {}", &record[0], e));
                    continue;
                }
            };

            tree.insert(query, timestamp);
            report.inserted += 1;

            if report.inserted % 1_000_000 == 0 {
                tracing::debug!(inserted = report.inserted, "Ingestion progress");
            }
        }

        tracing::info!(
            lines = report.lines_read,
            inserted = report.inserted,
            skipped = report.skipped,
            "Ingestion complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Search;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "2015-08-03 00:00:07\tElixir
2015-08-03 00:00:07\tPlop
2015-08-05 23:00:12\tElixir
";

    #[test]
    fn test_ingest_str() {
        let mut tree = DateTree::new();
        let report = TsvIngester::new().ingest_str(SAMPLE, &mut tree).unwrap();

        assert_eq!(report.lines_read, 3);
        assert_eq!(report.inserted, 3);
        assert_eq!(report.skipped, 0);
        assert!(report.errors.is_empty());
        assert_eq!(tree.total_count(), 3);

        let year = Search::builder(2015).build().unwrap();
        assert_eq!(tree.count(&year), 2);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let data = "2015-08-03 00:00:07\tElixir
not a line
2015-08-03 00:00:07\tPlop\textra
2015-13-03 00:00:07\tBadMonth

2015-08-03 00:00:07\t
2015-08-04 12:10:07\twill_this_test_succed_?
";
        let mut tree = DateTree::new();
        let report = TsvIngester::new().ingest_str(data, &mut tree).unwrap();

        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 4);
        assert_eq!(report.lines_read, 6);
        assert_eq!(report.errors.len(), 4);
        assert!(report.errors[0].starts_with("Line 2:"));
        assert!(report.errors[2].contains("wrong date"));
        assert_eq!(tree.total_count(), 2);
    }

    #[test]
    fn test_quotes_are_literal() {
        let data = "2015-08-01 00:03:43\t\"https://github.com/gmarik/vundle\"\n";
        let mut tree = DateTree::new();
        TsvIngester::new().ingest_str(data, &mut tree).unwrap();

        let tree = tree.build_index();
        let search = Search::builder(2015).popularity(1).build().unwrap();
        assert_eq!(
            tree.popular(&search)[0].query.as_ref(),
            "\"https://github.com/gmarik/vundle\""
        );
    }

    #[test]
    fn test_custom_timestamp_format() {
        let data = "2015-08-03T00:00:07\tElixir\n";
        let mut tree = DateTree::new();
        let report = TsvIngester::new()
            .with_timestamp_format("%Y-%m-%dT%H:%M:%S")
            .ingest_str(data, &mut tree)
            .unwrap();

        assert_eq!(report.inserted, 1);
    }

    #[test]
    fn test_ingest_path() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let mut tree = DateTree::new();
        let report = TsvIngester::new().ingest_path(file.path(), &mut tree).unwrap();
        assert_eq!(report.inserted, 3);
    }

    #[test]
    fn test_ingest_missing_file() {
        let mut tree = DateTree::new();
        let err = TsvIngester::new()
            .ingest_path(Path::new("/definitely/not/here.tsv"), &mut tree)
            .unwrap_err();
        assert!(matches!(err, IngestError::Io(_)));
    }
}
