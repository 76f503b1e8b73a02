use crate::core::errors::RowError;

/// Per-file ingest tallies. A row lands in exactly one bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file: String,
    pub accepted: u64,
    pub updated: u64,
    pub skipped: u64,
    pub rejected: u64,
    pub errors: Vec<RowError>,
}

impl FileReport {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            ..Self::default()
        }
    }

    pub fn reject(&mut self, error: RowError) {
        self.rejected += 1;
        self.errors.push(error);
    }

    pub fn rows_seen(&self) -> u64 {
        self.accepted + self.updated + self.skipped + self.rejected
    }
}

/// Outcome of one `load`/`append` run, one report per source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub orders: FileReport,
    pub barcodes: FileReport,
}

impl IngestReport {
    pub fn errors(&self) -> impl Iterator<Item = (&str, &RowError)> {
        self.orders
            .errors
            .iter()
            .map(|e| (self.orders.file.as_str(), e))
            .chain(
                self.barcodes
                    .errors
                    .iter()
                    .map(|e| (self.barcodes.file.as_str(), e)),
            )
    }

    pub fn net_new_rows(&self) -> u64 {
        self.orders.accepted + self.barcodes.accepted
    }
}
