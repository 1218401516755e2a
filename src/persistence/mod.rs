use crate::quota::{PrintJob, Refund};
use std::fmt;

#[derive(Debug)]
pub enum StoreError {
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            #[cfg(feature = "sqlite")]
            StoreError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            StoreError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Cumulative pages a user has printed today and this semester.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageUsage {
    pub today: u32,
    pub semester: u32,
}

/// Storage collaborator for printing records.
///
/// One keyed counter lookup and two independent single-statement inserts; no
/// transactions, no read-modify-write. Duplicate insert calls duplicate rows.
pub trait PrintStore {
    fn pages_used(&self, user: &str) -> StoreResult<Option<PageUsage>>;
    fn add_job(&self, job: &PrintJob) -> StoreResult<()>;
    fn add_refund(&self, refund: &Refund) -> StoreResult<()>;
}

#[cfg(feature = "sqlite")]
pub mod sqlite;
