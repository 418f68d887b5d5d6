use std::io;

use thiserror::Error;

/// Errors surfaced by the reading and writing halves of the crate.
///
/// Parse failures and storage failures are kept distinct so a caller can
/// tell "this file is not a ledger" apart from "storage is broken" and
/// render an accurate message for each.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    #[error("failed to read ledger file")]
    Read(#[source] io::Error),

    #[error("failed to write ledger file")]
    Write(#[source] io::Error),
}

impl LedgerError {
    pub(crate) fn parse(line: usize, msg: impl Into<String>) -> LedgerError {
        LedgerError::Parse {
            line,
            msg: msg.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
