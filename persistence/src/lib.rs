use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Local};
use job_scraper::JobRecord;
use thiserror::Error;

pub const CSV_HEADERS: [&str; 4] = ["title", "location", "postDate", "link"];
pub const DEFAULT_FILE_PREFIX: &str = "ibps_recruitments";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to create output directory '{}': '{source}'", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("File error: '{0}'")]
    Io(#[from] io::Error),
    #[error("Csv error: '{0}'")]
    Csv(#[from] csv::Error),
}

/// Keep the first record seen for every link, in their original order.
pub fn dedupe_by_link(records: impl IntoIterator<Item = JobRecord>) -> Vec<JobRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|job| seen.insert(job.link().to_owned()))
        .collect()
}

/// Saves postings as `<prefix>_<YYYY-MM-DD_HH-MM-SS>.csv` files inside `output_dir`.
pub struct CsvWriter {
    output_dir: PathBuf,
    file_prefix: String,
}

impl CsvWriter {
    pub fn new(output_dir: impl Into<PathBuf>, file_prefix: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            file_prefix: file_prefix.into(),
        }
    }

    /// Deduplicate `records` by link and write them, returns the path of the new file.
    ///
    /// The header row is written even when there is nothing to save. A file left
    /// behind by a failed write is not removed.
    pub fn write(&self, records: Vec<JobRecord>) -> Result<PathBuf, WriteError> {
        self.write_at(records, Local::now())
    }

    fn write_at(
        &self,
        records: Vec<JobRecord>,
        started_at: DateTime<Local>,
    ) -> Result<PathBuf, WriteError> {
        let jobs = dedupe_by_link(records);
        log::info!("Deduplicated to {} unique entries", jobs.len());

        fs::create_dir_all(&self.output_dir).map_err(|source| WriteError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })?;
        let timestamp = started_at.format(TIMESTAMP_FORMAT).to_string();
        let (path, file) = self.create_output_file(&timestamp)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(CSV_HEADERS)?;
        for job in &jobs {
            writer.serialize(job)?;
        }
        writer.flush()?;

        log::info!("Saved {} rows to {}", jobs.len(), path.display());
        Ok(path)
    }

    /// Never overwrites: a second file within the same second gets a `_<n>` suffix.
    fn create_output_file(&self, timestamp: &str) -> Result<(PathBuf, File), WriteError> {
        let mut attempt = 0u32;
        loop {
            let file_name = match attempt {
                0 => format!("{}_{}.csv", self.file_prefix, timestamp),
                n => format!("{}_{}_{}.csv", self.file_prefix, timestamp, n),
            };
            let path = self.output_dir.join(file_name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    log::debug!("{} already exists", path.display());
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use chrono::NaiveDateTime;

    fn job(title: &str, link: &str) -> JobRecord {
        JobRecord::new(title, None, None, link).unwrap()
    }

    fn read_rows(path: &Path) -> Vec<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(path)
            .expect("Failed to open csv");
        reader
            .records()
            .map(|record| {
                record
                    .expect("Failed to read row")
                    .iter()
                    .map(String::from)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_dedupe_keeps_first_occurrence_in_order() {
        let a = job("CRP PO", "https://www.ibps.in/a.pdf");
        let b = job("CRP Clerk", "https://www.ibps.in/b.pdf");
        let a_again = job("CRP PO (corrigendum)", "https://www.ibps.in/a.pdf");
        let c = job("CRP SPL", "https://www.ibps.in/c.pdf");
        let unique = dedupe_by_link(vec![a.clone(), b.clone(), a_again, c.clone()]);
        assert_eq!(unique, vec![a, b, c]);
    }

    #[test]
    fn test_write_rows() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvWriter::new(dir.path().join("data"), DEFAULT_FILE_PREFIX);
        let records = vec![
            JobRecord::new(
                "CRP PO/MT-XIV, Recruitment",
                Some("Mumbai".to_owned()),
                Some("01-08-2024".to_owned()),
                "https://www.ibps.in/po.pdf",
            )
            .unwrap(),
            job("CRP Clerks", "https://www.ibps.in/clerks.pdf"),
            job("CRP Clerks again", "https://www.ibps.in/clerks.pdf"),
        ];
        let path = writer.write(records).expect("Failed to write csv");
        let rows = read_rows(&path);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], CSV_HEADERS);
        assert_eq!(
            rows[1],
            vec![
                "CRP PO/MT-XIV, Recruitment",
                "Mumbai",
                "01-08-2024",
                "https://www.ibps.in/po.pdf"
            ]
        );
        assert_eq!(rows[2], vec!["CRP Clerks", "", "", "https://www.ibps.in/clerks.pdf"]);
    }

    #[test]
    fn test_file_name_embeds_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvWriter::new(dir.path(), DEFAULT_FILE_PREFIX);
        let path = writer.write(Vec::new()).expect("Failed to write csv");
        let file_name = path.file_name().unwrap().to_str().unwrap();
        let timestamp = file_name
            .strip_prefix("ibps_recruitments_")
            .and_then(|rest| rest.strip_suffix(".csv"))
            .expect("Unexpected file name");
        assert!(NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok());
    }

    #[test]
    fn test_empty_input_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvWriter::new(dir.path(), DEFAULT_FILE_PREFIX);
        let path = writer.write(Vec::new()).expect("Failed to write csv");
        assert_eq!(read_rows(&path), vec![CSV_HEADERS]);
    }

    #[test]
    fn test_writing_twice_gives_two_identical_files() {
        let dir = tempfile::tempdir().unwrap();
        let writer = CsvWriter::new(dir.path(), DEFAULT_FILE_PREFIX);
        let records = vec![
            job("CRP PO", "https://www.ibps.in/a.pdf"),
            job("CRP Clerk", "https://www.ibps.in/b.pdf"),
        ];
        let now = Local::now();
        let first = writer.write_at(records.clone(), now).unwrap();
        let second = writer.write_at(records, now).unwrap();
        assert_ne!(first, second);
        assert!(second.to_str().unwrap().ends_with("_1.csv"));
        assert_eq!(
            fs::read_to_string(first).unwrap(),
            fs::read_to_string(second).unwrap()
        );
    }

    #[test]
    fn test_output_dir_not_creatable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let writer = CsvWriter::new(blocker.join("data"), DEFAULT_FILE_PREFIX);
        let result = writer.write(vec![job("CRP PO", "https://www.ibps.in/a.pdf")]);
        assert!(matches!(result, Err(WriteError::CreateDir { .. })));
    }
}
