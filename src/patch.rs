//! Whole-file patching with concurrent-edit detection.
//!
//! Both operations re-read the file immediately before writing. Replace
//! additionally requires the target line range to still hold exactly the
//! lines remembered from the snapshot; anything else is reported as a
//! mismatch and nothing is written. The engine keeps no state between
//! calls — serializing writes against one file is the caller's job.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::error::{LedgerError, Result};

/// The file-access collaborator: something that can hand over the current
/// file bytes and persist a full replacement. On a device this wraps the
/// platform's document API; in tests it is an in-memory buffer.
pub trait FileStore {
    fn read(&self) -> io::Result<String>;
    fn write(&self, content: &str) -> io::Result<()>;
}

/// [`FileStore`] over an ordinary filesystem path.
pub struct FsStore {
    path: PathBuf,
}

impl FsStore {
    pub fn new(path: impl Into<PathBuf>) -> FsStore {
        FsStore { path: path.into() }
    }
}

impl FileStore for FsStore {
    fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    fn write(&self, content: &str) -> io::Result<()> {
        fs::write(&self.path, content)
    }
}

/// [`FileStore`] over an in-memory buffer, for tests and previews.
#[derive(Default)]
pub struct MemStore(Mutex<String>);

impl MemStore {
    pub fn new(content: impl Into<String>) -> MemStore {
        MemStore(Mutex::new(content.into()))
    }
}

impl FileStore for MemStore {
    fn read(&self) -> io::Result<String> {
        Ok(self.0.lock().unwrap().clone())
    }

    fn write(&self, content: &str) -> io::Result<()> {
        *self.0.lock().unwrap() = content.to_string();
        Ok(())
    }
}

/// What became of a save. Mismatch is an expected, recoverable outcome and
/// is kept apart from I/O errors so the caller can say "file changed,
/// retry" instead of "disk error".
#[derive(Debug)]
pub enum SaveOutcome {
    /// The write landed; `content` is the fresh post-write file content,
    /// ready to be parsed into the next snapshot.
    Saved { content: String },
    /// The write landed but reading it back failed. The data is on disk;
    /// the caller must re-read before trusting any line numbers again.
    SavedReadFailed(io::Error),
    /// Replace only: the target lines no longer match the snapshot.
    /// Nothing was written.
    Mismatch,
}

/// Append a serialized transaction to the end of the file, inserting a
/// separating blank line when the existing content does not already end
/// with one. New text takes on the file's own line ending, so a CRLF file
/// stays a CRLF file.
pub fn append(store: &dyn FileStore, text: &str) -> Result<SaveOutcome> {
    let current = store.read().map_err(LedgerError::Read)?;
    let eol = line_ending(&current);
    let blank = format!("{eol}{eol}");

    let mut next = current;
    if !next.is_empty() {
        if !next.ends_with('\n') {
            next.push_str(eol);
        }
        if !next.ends_with(&blank) {
            next.push_str(eol);
        }
    }
    if eol == "\r\n" {
        next.push_str(&text.replace('\n', "\r\n"));
    } else {
        next.push_str(text);
    }
    if !next.ends_with('\n') {
        next.push_str(eol);
    }

    store.write(&next).map_err(LedgerError::Write)?;
    debug!(bytes = next.len(), "appended transaction");
    Ok(read_back(store))
}

/// Replace the lines `first..=last` with `text`, but only if that range
/// still holds exactly `expected` — the lines remembered from the snapshot
/// the caller parsed. On any divergence the write is aborted and
/// [`SaveOutcome::Mismatch`] returned, leaving the file as it was.
pub fn replace(
    store: &dyn FileStore,
    first: usize,
    last: usize,
    expected: &[String],
    text: &str,
) -> Result<SaveOutcome> {
    let current = store.read().map_err(LedgerError::Read)?;
    let had_final_newline = current.ends_with('\n');
    let eol = line_ending(&current);

    // Split on '\n' keeping each line's trailing '\r', so every untouched
    // line goes back out with its exact original bytes. The snapshot's
    // expected lines are '\r'-stripped, so the comparison strips too.
    let mut lines: Vec<&str> = current.split('\n').collect();
    if had_final_newline {
        lines.pop();
    }

    let target_matches = first <= last
        && last < lines.len()
        && last - first + 1 == expected.len()
        && lines[first..=last]
            .iter()
            .zip(expected)
            .all(|(line, want)| line.strip_suffix('\r').unwrap_or(line) == want);
    if !target_matches {
        warn!(first, last, "replace target changed since last read");
        return Ok(SaveOutcome::Mismatch);
    }

    let mut rebuilt: Vec<String> = lines[..first].iter().map(|l| l.to_string()).collect();
    // The serializer terminates with a blank line for appending; when
    // splicing into the middle of a file the surrounding separators are
    // already in place, so only the transaction lines themselves go in.
    for line in text.trim_end_matches('\n').lines() {
        if eol == "\r\n" {
            rebuilt.push(format!("{}\r", line));
        } else {
            rebuilt.push(line.to_string());
        }
    }
    rebuilt.extend(lines[last + 1..].iter().map(|l| l.to_string()));

    let mut out = rebuilt.join("\n");
    if had_final_newline {
        out.push('\n');
    }

    store.write(&out).map_err(LedgerError::Write)?;
    debug!(first, last, "replaced transaction");
    Ok(read_back(store))
}

/// CRLF when the file already carries CRLF endings, plain LF otherwise.
fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

/// Post-write read for the next snapshot. A failure here is non-fatal —
/// the write already completed — but is surfaced so the caller knows its
/// snapshot is stale.
fn read_back(store: &dyn FileStore) -> SaveOutcome {
    match store.read() {
        Ok(content) => SaveOutcome::Saved { content },
        Err(err) => {
            warn!("write landed but read-back failed: {}", err);
            SaveOutcome::SavedReadFailed(err)
        }
    }
}
