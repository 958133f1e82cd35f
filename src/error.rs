use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

/// Error taxonomy for the scheduling core and the catalog CRUD around it.
///
/// Every user-visible failure carries a machine-checkable kind plus a
/// human-readable reason. `Storage` is the exception: its detail goes to
/// the operator log, never to the response body.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Missing or invalid input fields. Never retried.
    #[error("{0}")]
    Validation(String),

    /// Duplicate name, teacher double-booking, classroom double-booking,
    /// or a storage-level unique-constraint violation after a race.
    #[error("{0}")]
    Conflict(String),

    /// The targeted row does not exist. For writes this is detected from
    /// the affected-row count, not from a prior read.
    #[error("{0}")]
    NotFound(String),

    /// The row still has dependent rows and cannot be deleted.
    #[error("{0}")]
    Dependency(String),

    /// Unexpected failure talking to SQLite. The surrounding transaction
    /// is rolled back; no partial state is visible.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl CoreError {
    /// Whether the underlying SQLite error is a unique/primary-key
    /// constraint violation. Used by the group lifecycle to translate a
    /// lost check-then-act race into the same conflict the pre-write
    /// check would have reported.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            Self::Storage(rusqlite::Error::SqliteFailure(e, _))
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                    || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        )
    }
}
