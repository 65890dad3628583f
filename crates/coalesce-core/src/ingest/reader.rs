//! CSV ingestion with delimiter sniffing and header normalization

use std::fs::File;
use std::io::Read;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use coalesce_domain::{Record, RecordBatch};

use crate::error::IngestError;

const SNIFF_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];
const SNIFF_LINES: usize = 10;

lazy_static! {
    static ref HEADER_SEPARATORS: Regex = Regex::new(r"[\s.\-]+").unwrap();
    static ref NON_HEADER_CHARS: Regex = Regex::new(r"[^a-z0-9_]").unwrap();
    static ref UNDERSCORE_RUNS: Regex = Regex::new(r"_+").unwrap();
}

/// Normalize a raw header label: trim, lowercase, map whitespace, dots, and
/// dashes to underscores, strip everything else, collapse runs.
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let separated = HEADER_SEPARATORS.replace_all(&lowered, "_");
    let cleaned = NON_HEADER_CHARS.replace_all(&separated, "");
    UNDERSCORE_RUNS
        .replace_all(&cleaned, "_")
        .trim_matches('_')
        .to_string()
}

/// Reads delimited text files into a [`RecordBatch`].
///
/// The delimiter is sniffed from the first lines unless set explicitly.
/// Input bytes are decoded as UTF-8 with invalid sequences replaced, so a
/// stray Latin-1 export never aborts a run.
pub struct CsvReader {
    delimiter: Option<u8>,
    normalize_headers: bool,
}

impl Default for CsvReader {
    fn default() -> Self {
        Self {
            delimiter: None,
            normalize_headers: true,
        }
    }
}

impl CsvReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a delimiter instead of sniffing.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_header_normalization(mut self, enabled: bool) -> Self {
        self.normalize_headers = enabled;
        self
    }

    /// Read a file from disk.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<RecordBatch, IngestError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IngestError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let mut bytes = Vec::new();
        File::open(path)?.read_to_end(&mut bytes)?;
        let text = String::from_utf8_lossy(&bytes);
        self.read_str(&text)
    }

    /// Parse delimited text already in memory.
    pub fn read_str(&self, text: &str) -> Result<RecordBatch, IngestError> {
        let delimiter = match self.delimiter {
            Some(d) => d,
            None => sniff_delimiter(text),
        };
        debug!(delimiter = %(delimiter as char), "reading delimited input");

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = csv_reader
            .headers()?
            .iter()
            .map(|h| {
                if self.normalize_headers {
                    normalize_header(h)
                } else {
                    h.to_string()
                }
            })
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(IngestError::MissingHeader);
        }

        let mut batch = RecordBatch::new(headers.clone());
        for row in csv_reader.records() {
            let row = row?;
            let pairs = headers
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    (
                        name.clone(),
                        row.get(i).unwrap_or_default().to_string(),
                    )
                })
                .collect();
            batch.push(Record::from_pairs(pairs));
        }

        debug!(
            columns = batch.columns().len(),
            records = batch.len(),
            "ingest complete"
        );
        Ok(batch)
    }
}

/// Pick the candidate delimiter that splits the first lines most evenly,
/// preferring the one with the highest consistent field count. Falls back
/// to comma.
fn sniff_delimiter(text: &str) -> u8 {
    let sample: Vec<&str> = text.lines().take(SNIFF_LINES).collect();

    let mut best = (b',', 0usize);
    for &delimiter in &SNIFF_DELIMITERS {
        let counts: Vec<usize> = sample
            .iter()
            .map(|line| line.as_bytes().iter().filter(|&&b| b == delimiter).count())
            .collect();
        let Some(&first) = counts.first() else {
            continue;
        };
        // Only trust a delimiter that appears on every line the same number
        // of times
        if first > 0 && counts.iter().all(|&c| c == first) && first > best.1 {
            best = (delimiter, first);
        }
    }
    best.0
}
