use thiserror::Error;

/// Failure of one external source. Any variant aborts the refresh.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("{source_name} request failed: {message}")]
    Transport {
        source_name: &'static str,
        message: String,
    },

    #[error("{source_name} returned HTTP {status}")]
    Status {
        source_name: &'static str,
        status: u16,
    },

    #[error("{source_name} payload could not be parsed: {message}")]
    Parse {
        source_name: &'static str,
        message: String,
    },
}

impl SourceError {
    /// Human readable name of the failing source
    pub fn source_name(&self) -> &'static str {
        match self {
            Self::Transport { source_name, .. }
            | Self::Status { source_name, .. }
            | Self::Parse { source_name, .. } => *source_name,
        }
    }
}

/// Why a reconciled country cannot be stored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordViolation {
    MissingName,
    MissingPopulation,
    CurrencyCodeTooLong,
}

impl RecordViolation {
    pub fn field(self) -> &'static str {
        match self {
            Self::MissingName => "name",
            Self::MissingPopulation => "population",
            Self::CurrencyCodeTooLong => "currency_code",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::MissingName | Self::MissingPopulation => "is required",
            Self::CurrencyCodeTooLong => "must be at most 10 characters",
        }
    }
}

/// A reconciled country failed validation
#[derive(Debug, Clone, PartialEq, Error)]
#[error("record {index} ({}) is invalid: {}", display_name(.name), field_list(.violations))]
pub struct InvalidRecord {
    /// Position of the record in its batch
    pub index: usize,
    /// Upstream name, if there was one
    pub name: Option<String>,
    pub violations: Vec<RecordViolation>,
}

fn display_name(name: &Option<String>) -> &str {
    name.as_deref().unwrap_or("<unnamed>")
}

fn field_list(violations: &[RecordViolation]) -> String {
    violations
        .iter()
        .map(|v| v.field())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Failure of `RefreshService::refresh`
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("External data source unavailable: {0}")]
    SourceUnavailable(#[from] SourceError),

    #[error("Validation failed: {0}")]
    InvalidRecord(#[from] InvalidRecord),

    #[error("Store failure: {0}")]
    StoreFailure(#[from] StoreError),
}

/// Failure while producing the summary artifact
#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Summary query failed: {0}")]
    Store(#[from] StoreError),

    #[error("Summary write failed: {0}")]
    Io(#[from] std::io::Error),
}
