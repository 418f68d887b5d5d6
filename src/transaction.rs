use crate::posting::Posting;

/// A dated group of postings, together with the span of lines it occupied
/// in the source file at the time of the last successful read.
///
/// `first_line` and `last_line` are 0-based and inclusive. They are used
/// only for patch targeting and go stale the moment the underlying file
/// changes; the patch engine re-validates them against fresh content before
/// every write.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transaction {
    pub first_line: usize,
    pub last_line: usize,
    pub date: String,
    pub status: Option<char>,
    pub code: Option<String>,
    pub payee: String,
    pub note: Option<String>,
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Case-insensitive search across the header fields and every posting.
    pub fn contains(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        self.date.contains(&query_lower)
            || self.payee.to_lowercase().contains(&query_lower)
            || self
                .note
                .as_deref()
                .map_or(false, |n| n.to_lowercase().contains(&query_lower))
            || self
                .code
                .as_deref()
                .map_or(false, |c| c.to_lowercase().contains(&query_lower))
            || self.postings.iter().any(|p| p.contains(query))
    }

    /// Single-line summary for list rendering: `date [status] payee [| note]`.
    pub fn description(&self) -> String {
        let mut out = self.date.clone();
        if let Some(status) = self.status {
            out.push(' ');
            out.push(status);
        }
        if !self.payee.is_empty() {
            out.push(' ');
            out.push_str(&self.payee);
        }
        if let Some(note) = &self.note {
            out.push_str(" | ");
            out.push_str(note);
        }
        out
    }
}
