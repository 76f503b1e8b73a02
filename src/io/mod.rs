use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::core::errors::RowError;

/// A labelled raw input. The label (usually the file name) is what shows up
/// in schema errors and the per-file report.
pub struct RecordSource<'a> {
    pub label: String,
    pub reader: Box<dyn Read + 'a>,
}

impl<'a> RecordSource<'a> {
    pub fn new(label: impl Into<String>, reader: impl Read + 'a) -> Self {
        Self {
            label: label.into(),
            reader: Box::new(reader),
        }
    }

    pub fn from_path(path: &Path) -> std::io::Result<RecordSource<'static>> {
        let file = File::open(path)?;
        Ok(RecordSource {
            label: path.display().to_string(),
            reader: Box::new(file),
        })
    }
}

/// One row out of a source: either a typed record with its 1-based source
/// line, or a collected row-scoped error.
#[derive(Debug)]
pub enum RowEvent<T> {
    Record { line: u64, record: T },
    Bad(RowError),
}

pub mod formats;
pub use formats::csv::{CsvIngester, CsvRecord};
