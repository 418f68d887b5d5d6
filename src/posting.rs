use crate::amount::{Amount, Cost};

/// One line inside a transaction.
///
/// Either a comment-only line (`comment` set, everything else unset) or a
/// normal posting line carrying an account and optionally an amount, a cost,
/// a balance assertion with its own cost, and a trailing comment. The last
/// posting of a transaction may omit its amount to absorb the balancing
/// remainder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Posting {
    pub account: Option<String>,
    pub amount: Option<Amount>,
    pub cost: Option<Cost>,
    pub assertion: Option<Amount>,
    pub assertion_cost: Option<Cost>,
    pub comment: Option<String>,
}

impl Posting {
    /// True iff this line is only a comment.
    pub fn is_comment(&self) -> bool {
        self.comment.is_some()
            && self.account.is_none()
            && self.amount.is_none()
            && self.cost.is_none()
            && self.assertion.is_none()
            && self.assertion_cost.is_none()
    }

    /// Accounts wrapped in parentheses are virtual, i.e. not cash-affecting.
    pub fn is_virtual(&self) -> bool {
        self.account
            .as_deref()
            .map(|a| a.starts_with('(') && a.ends_with(')'))
            .unwrap_or(false)
    }

    /// True only when every field is unset or blank. The edit form keeps one
    /// such row at the end as the placeholder for the next entry.
    pub fn is_empty(&self) -> bool {
        self.account.as_deref().map_or(true, |a| a.trim().is_empty())
            && self.amount.is_none()
            && self.cost.is_none()
            && self.assertion.is_none()
            && self.assertion_cost.is_none()
            && self.comment.as_deref().map_or(true, |c| c.trim().is_empty())
    }

    /// Case-insensitive match against account, comment, and all amounts.
    pub fn contains(&self, query: &str) -> bool {
        let query_lower = query.to_lowercase();
        if let Some(account) = &self.account {
            if account.to_lowercase().contains(&query_lower) {
                return true;
            }
        }
        if let Some(comment) = &self.comment {
            if comment.to_lowercase().contains(&query_lower) {
                return true;
            }
        }
        self.amount.as_ref().map_or(false, |a| a.contains(query))
            || self.cost.as_ref().map_or(false, |c| c.contains(query))
            || self.assertion.as_ref().map_or(false, |a| a.contains(query))
            || self
                .assertion_cost
                .as_ref()
                .map_or(false, |c| c.contains(query))
    }

    /// Reconstruct the amount side of the line for read-only display,
    /// using the verbatim source text of each piece:
    /// `amount [@|@@ cost] [= assertion] [@|@@ assertion-cost] [; comment]`.
    pub fn full_amount_display_string(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(amount) = &self.amount {
            parts.push(amount.original.clone());
        }
        if let Some(cost) = &self.cost {
            parts.push(format!("{} {}", cost.kind.marker(), cost.amount.original));
        }
        if let Some(assertion) = &self.assertion {
            parts.push(format!("= {}", assertion.original));
        }
        if let Some(cost) = &self.assertion_cost {
            parts.push(format!("{} {}", cost.kind.marker(), cost.amount.original));
        }
        if let Some(comment) = &self.comment {
            parts.push(format!("; {}", comment));
        }
        parts.join(" ").trim().to_string()
    }

    /// Render a fixed-width-aligned line for writing back to the file.
    ///
    /// Layout is a 4-space indent, the account, then enough padding that the
    /// amount column starts at `width`. The gap never shrinks below 2 spaces;
    /// long lines overflow instead of truncating. Lengths are counted in
    /// chars since currency symbols are routinely multi-byte.
    pub fn format(
        &self,
        width: usize,
        currency_before_amount: bool,
        currency_spacing: bool,
        currency_enabled: bool,
    ) -> String {
        if self.is_comment() {
            return format!("    ; {}", self.comment.as_deref().unwrap_or(""));
        }

        let account = self.account.as_deref().unwrap_or("");
        let amount_str = self
            .amount
            .as_ref()
            .map(|a| a.format(currency_before_amount, currency_spacing, currency_enabled))
            .unwrap_or_default();

        let mut line = if amount_str.is_empty() {
            format!("    {}", account)
        } else {
            let pad = (width as isize
                - amount_str.chars().count() as isize
                - account.chars().count() as isize
                - 4)
            .max(2) as usize;
            format!("    {}{}{}", account, " ".repeat(pad), amount_str)
        };

        if let Some(comment) = &self.comment {
            if !comment.trim().is_empty() {
                line.push_str(&format!("  ; {}", comment));
            }
        }

        line
    }
}
