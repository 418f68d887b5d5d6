//! Blotter - a lossless editing core for plain-text accounting ledgers
//! ---
//!
//! Reads a journal file into transactions, lets a caller add or edit one,
//! and writes the change back while leaving every other byte of the file
//! alone. Parsing is all-or-nothing and every write re-checks the file for
//! concurrent external edits before touching it; the UI, settings storage,
//! and file-picker plumbing around this crate are external collaborators.

/// Quantity/currency pairs and `@`/`@@` cost annotations.
pub mod amount;

/// One account line within a transaction.
pub mod posting;

/// A dated group of postings plus the file lines it came from.
pub mod transaction;

/// Line-oriented recursive descent over the whole file.
pub mod parser;

/// The per-read snapshot: file lines plus parsed transactions.
pub mod ledger;

/// Edit-form state, save validation, and the serializer.
pub mod form;

/// Whole-file patching with mismatch detection.
pub mod patch;

/// Formatting preferences consumed from the settings collaborator.
pub mod options;

mod error;

pub use error::{LedgerError, Result};
pub use ledger::Ledger;
pub use parser::parse;
pub use patch::{FileStore, FsStore, MemStore, SaveOutcome};
