//! Library-wide error and result types.

use std::fmt;
use std::io;

/// Result alias used throughout swtkit.
pub type Result<T> = std::result::Result<T, Error>;

/// All errors the library can produce.
///
/// Only configuration and input problems are errors. Odd data inside an
/// otherwise readable file (unmapped selection codes, unknown opponents,
/// fixture slots past the last entity, a file cut short) is reported as
/// marker values in the decoded result instead.
#[derive(Debug)]
pub enum Error {
    /// No schema table exists for the part in any candidate directory.
    MissingTable(String),
    /// A schema table row is structurally invalid.
    MalformedRow {
        /// Part name of the offending table.
        part: String,
        /// 1-based line number within the table text.
        row: u64,
        /// What is wrong with the row.
        reason: &'static str,
    },
    /// A required layout constant is absent from the constants table.
    MissingConstant(&'static str),
    /// The source file was empty.
    EmptyInput,
    /// The source file exceeds the configured size limit.
    FileTooLarge {
        /// Size of the file in bytes.
        size: u64,
        /// Configured limit in bytes.
        limit: u64,
    },
    /// An underlying I/O operation failed.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingTable(part) => write!(f, "no schema table for part '{part}'"),
            Error::MalformedRow { part, row, reason } => {
                write!(f, "schema table '{part}' is invalid (line {row}): {reason}")
            }
            Error::MissingConstant(name) => write!(f, "missing layout constant '{name}'"),
            Error::EmptyInput => write!(f, "empty input"),
            Error::FileTooLarge { size, limit } => {
                write!(f, "file too large: {size} bytes (limit {limit})")
            }
            Error::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        if let Error::Io(e) = self {
            Some(e)
        } else {
            None
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
