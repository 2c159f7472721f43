use thiserror::Error;

/// Errors surfaced by the catalog store.
///
/// `TransientDbError` is retried at the next tick by callers; `FatalDbError`
/// aborts the enclosing batch and leaves state untouched (§4.1).
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("a file with the same name or checksum is already cataloged")]
    DuplicateFile,

    #[error("transient database error: {0}")]
    Transient(#[source] sqlx::Error),

    #[error("fatal database error: {0}")]
    Fatal(#[source] sqlx::Error),
}

impl CatalogError {
    /// Classifies a raw `sqlx::Error` the way `§4.1`/`§7` require: unique
    /// violations are reported distinctly so inserts can react to (I2)
    /// without inspecting driver-specific error codes themselves, and
    /// connection-ish failures are treated as transient.
    pub fn classify(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some("23505") {
                return CatalogError::DuplicateFile;
            }
        }
        match err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_) => CatalogError::Transient(err),
            other => CatalogError::Fatal(other),
        }
    }
}

/// Errors surfaced by a [`crate::actions::Action`].
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("path {0:?} is not inside the configured source root")]
    NotUnderSource(std::path::PathBuf),

    #[error("relocation action is not reversible")]
    NotReversible,

    #[error("io error during relocation: {0}")]
    Io(#[from] std::io::Error),
}

/// Top-level error for the Finder/Ingester core.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
