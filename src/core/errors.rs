use thiserror::Error;

/// Field coercion failures raised while turning raw CSV cells into typed
/// values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("required field `{0}` is empty")]
    EmptyField(&'static str),
    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    ParseDate(String),
    #[error("invalid used flag `{0}`, expected true/false/1/0")]
    ParseFlag(String),
}

/// Row-scoped problems. Collected into the run report; never abort a batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("line {line}: {reason}")]
    Parse { line: u64, reason: String },
    #[error("line {line}: field `{field}`: {reason}")]
    Validation {
        line: u64,
        field: &'static str,
        reason: String,
    },
}

impl RowError {
    pub fn line(&self) -> u64 {
        match self {
            RowError::Parse { line, .. } | RowError::Validation { line, .. } => *line,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("{entity} `{key}` referenced but not present in the store")]
    Missing { entity: &'static str, key: String },
}

/// Fatal conditions for a single `load`/`append` command. Row-scoped
/// problems are not here; they live in the ingest report.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{file}: header mismatch: expected [{expected}], found [{found}]")]
    Schema {
        file: String,
        expected: String,
        found: String,
    },
    #[error("{file}: {reason}")]
    Read { file: String, reason: String },
    #[error("store already holds {entity} rows; use `append`, or `load --truncate` to start over")]
    StoreNotEmpty { entity: &'static str },
    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("no data has been loaded into the store yet")]
    DataNotLoaded,
    #[error(transparent)]
    Storage(#[from] StoreError),
}
