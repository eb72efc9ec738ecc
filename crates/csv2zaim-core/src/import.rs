//! CSV import of card statement exports
//!
//! Format: one header line, then fixed-width records. Only three columns are
//! read: date (col 0, `YYYY/MM/DD`), description (col 2) and amount (col 5,
//! comma grouped).

use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecordsIntoIter};
use tracing::debug;

use crate::encoding::SourceEncoding;
use crate::error::{Error, Result};
use crate::models::StatementRow;

/// Lazy reader over the data rows of a statement export
///
/// The header record is consumed on construction. Iteration stops cleanly at
/// end of input; a malformed record is yielded as an error.
pub struct StatementReader<R: Read> {
    records: StringRecordsIntoIter<R>,
}

impl<R: Read> StatementReader<R> {
    /// Wrap already-decoded CSV text
    pub fn new(reader: R) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers = rdr.headers()?;
        if !headers.is_empty() && headers.len() < StatementRow::MIN_COLUMNS {
            return Err(Error::Import(format!(
                "Expected at least {} columns, header has {}",
                StatementRow::MIN_COLUMNS,
                headers.len()
            )));
        }
        debug!("Statement header has {} columns", headers.len());

        Ok(Self {
            records: rdr.into_records(),
        })
    }
}

impl StatementReader<Cursor<String>> {
    /// Read and decode a statement file
    pub fn open(path: &Path, encoding: SourceEncoding) -> Result<Self> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes, encoding)
    }

    /// Decode raw bytes, then parse
    pub fn from_bytes(bytes: &[u8], encoding: SourceEncoding) -> Result<Self> {
        let text = encoding.decode(bytes)?;
        debug!("Decoded {} bytes as {}", bytes.len(), encoding.name());
        Self::new(Cursor::new(text))
    }
}

impl<R: Read> Iterator for StatementReader<R> {
    type Item = Result<StatementRow>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = match self.records.next()? {
            Ok(record) => record,
            Err(e) => return Some(Err(e.into())),
        };

        let line = record.position().map(|p| p.line()).unwrap_or_default();
        Some(Ok(StatementRow {
            line,
            fields: record.iter().map(|s| s.to_string()).collect(),
        }))
    }
}
