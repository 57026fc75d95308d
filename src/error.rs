use thiserror::Error;

use crate::constant::ColumnType;
use crate::job::JobState;

pub use color_eyre::eyre::eyre;

#[derive(Debug, Error)]
pub enum Error {
    #[error("size hint inconsistent with schema: {0}")]
    Size(String),

    #[error("schema mismatch at column {index}: declared {declared:?}, appended {appended:?}")]
    SchemaMismatch {
        index: usize,
        declared: ColumnType,
        appended: ColumnType,
    },

    #[error("type mismatch at column {index}: declared {declared:?}, requested {requested:?}")]
    TypeMismatch {
        index: usize,
        declared: ColumnType,
        requested: ColumnType,
    },

    #[error("operation out of order: {0}")]
    OutOfOrder(&'static str),

    #[error("row incomplete: {appended} of {expected} columns appended")]
    IncompleteRow { appended: usize, expected: usize },

    #[error("out of range: {0}")]
    OutOfRange(String),

    #[error("column {0} is NULL")]
    NullValue(usize),

    #[error("column {0} does not allow NULL")]
    NullNotAllowed(usize),

    #[error("unexpected end of payload")]
    UnexpectedEof,

    #[error("invalid payload")]
    InvalidPayload,

    #[error("invalid utf-8 in string column {0}")]
    InvalidUtf8(usize),

    #[error("unknown job state: {0:?}")]
    UnknownJobState(String),

    #[error("unknown job type: {0:?}")]
    UnknownJobType(String),

    #[error("job already in terminal state {from:?}, cannot move to {to:?}")]
    JobStateTransition { from: JobState, to: JobState },

    #[error("library bug: {0}")]
    LibraryBug(color_eyre::Report),
}

pub type Result<T> = std::result::Result<T, Error>;
