//! Mutable state for the add/edit screen, its save-time validation, and the
//! serializer that turns a validated form into ledger text.

use chrono::NaiveDate;
use thiserror::Error;

use crate::amount::Amount;
use crate::options::Preferences;
use crate::posting::Posting;
use crate::transaction::Transaction;

/// One editable posting row. The form always carries one blank row at the
/// end as the placeholder the user types into next; it is dropped before
/// serialization.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PostingForm {
    pub account: String,
    pub quantity: String,
    pub currency: String,
}

impl PostingForm {
    /// The UI appends a fresh placeholder row once this one stops being
    /// blank.
    pub fn is_blank(&self) -> bool {
        self.account.trim().is_empty()
            && self.quantity.trim().is_empty()
            && self.currency.trim().is_empty()
    }

    fn has_amount(&self) -> bool {
        !self.quantity.trim().is_empty()
    }
}

/// Form state for one transaction being added or edited. Separate from the
/// parsed [`Transaction`] objects; a successful save triggers a re-read
/// which replaces those wholesale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransactionForm {
    pub date: String,
    pub status: Option<char>,
    pub payee: String,
    pub note: Option<String>,
    pub postings: Vec<PostingForm>,
}

/// Why a form cannot be saved yet. Checked before any write is attempted;
/// never reaches the file layer.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("invalid date `{0}'")]
    BadDate(String),

    #[error("payee must not be blank")]
    BlankPayee,

    #[error("a transaction needs at least two postings")]
    TooFewPostings,

    #[error("posting {0} has no account")]
    MissingAccount(usize),

    #[error("only one posting may leave its amount blank")]
    MultipleBlankAmounts,

    #[error("postings do not balance: {currency} is off by {remainder}")]
    Unbalanced { currency: String, remainder: f64 },

    #[error("amount `{0}' is not a number")]
    BadQuantity(String),
}

impl TransactionForm {
    /// A fresh form for the add screen: today's date, the preferred status,
    /// and a single placeholder row.
    pub fn empty(today: NaiveDate, prefs: &Preferences) -> TransactionForm {
        TransactionForm {
            date: today.format("%Y-%m-%d").to_string(),
            status: prefs.default_status,
            payee: String::new(),
            note: None,
            postings: vec![PostingForm::default()],
        }
    }

    /// Prefill the form from a parsed transaction for the edit screen.
    /// Comment-only postings carry no editable fields and are skipped; a
    /// placeholder row is appended.
    pub fn from_transaction(transaction: &Transaction) -> TransactionForm {
        let mut postings: Vec<PostingForm> = transaction
            .postings
            .iter()
            .filter(|p| !p.is_comment())
            .map(|p| PostingForm {
                account: p.account.clone().unwrap_or_default(),
                quantity: p
                    .amount
                    .as_ref()
                    .map(|a| a.quantity.clone())
                    .unwrap_or_default(),
                currency: p
                    .amount
                    .as_ref()
                    .map(|a| a.currency.clone())
                    .unwrap_or_default(),
            })
            .collect();
        postings.push(PostingForm::default());

        TransactionForm {
            date: transaction.date.clone(),
            status: transaction.status,
            payee: transaction.payee.clone(),
            note: transaction.note.clone(),
            postings,
        }
    }

    /// The rows that will actually be written: everything except the
    /// trailing placeholder.
    fn real_postings(&self) -> &[PostingForm] {
        match self.postings.last() {
            Some(last) if last.is_blank() => &self.postings[..self.postings.len() - 1],
            _ => &self.postings,
        }
    }

    /// Precondition check before a save is attempted.
    ///
    /// A form passes iff it has at least two real postings, a non-blank
    /// payee, an account on every posting but the last, at most one blank
    /// amount, and a zero per-currency remainder whenever no posting is
    /// left to absorb it. Currencies are resolved the same way
    /// [`TransactionForm::render`] resolves them, so what passes here is
    /// what balances on disk.
    pub fn validate(&self, prefs: &Preferences) -> Result<(), ValidationError> {
        if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            return Err(ValidationError::BadDate(self.date.clone()));
        }
        if self.payee.trim().is_empty() {
            return Err(ValidationError::BlankPayee);
        }

        let postings = self.real_postings();
        if postings.len() < 2 {
            return Err(ValidationError::TooFewPostings);
        }

        // A blank account is tolerated only on the last posting, and only
        // while its amount is blank too: an amount with no account would
        // render as an amount-only line that re-parses as an account name.
        for (index, posting) in postings.iter().enumerate() {
            if posting.account.trim().is_empty()
                && (index + 1 < postings.len() || posting.has_amount())
            {
                return Err(ValidationError::MissingAccount(index + 1));
            }
        }

        let blank_amounts = postings.iter().filter(|p| !p.has_amount()).count();
        if blank_amounts > 1 {
            return Err(ValidationError::MultipleBlankAmounts);
        }

        // With no posting left to absorb the remainder, the written amounts
        // themselves have to sum to zero per currency.
        if blank_amounts == 0 {
            let mut sums: Vec<(String, f64)> = Vec::new();
            for posting in postings {
                let quantity = posting.quantity.trim();
                let value: f64 = quantity
                    .replace(',', "")
                    .parse()
                    .map_err(|_| ValidationError::BadQuantity(quantity.to_string()))?;
                let currency = match posting.currency.trim() {
                    "" => prefs.default_currency.trim().to_string(),
                    currency => currency.to_string(),
                };
                match sums.iter_mut().find(|(c, _)| *c == currency) {
                    Some((_, sum)) => *sum += value,
                    None => sums.push((currency, value)),
                }
            }
            for (currency, sum) in sums {
                if sum.abs() > 1e-6 {
                    return Err(ValidationError::Unbalanced {
                        currency,
                        remainder: sum,
                    });
                }
            }
        }

        Ok(())
    }

    /// Serialize to ledger text: header, aligned posting lines, and a
    /// trailing blank line. Always reformats to the current preferences;
    /// original spacing of an edited transaction is intentionally not
    /// preserved.
    pub fn render(&self, prefs: &Preferences) -> String {
        let mut out = self.date.trim().to_string();
        if let Some(status) = self.status {
            if status != ' ' {
                out.push(' ');
                out.push(status);
            }
        }
        out.push(' ');
        out.push_str(self.payee.trim());
        if let Some(note) = &self.note {
            if !note.trim().is_empty() {
                out.push_str(" | ");
                out.push_str(note.trim());
            }
        }
        out.push('\n');

        for form in self.real_postings() {
            let amount = if form.has_amount() {
                let currency = if form.currency.trim().is_empty() {
                    prefs.default_currency.clone()
                } else {
                    form.currency.trim().to_string()
                };
                Some(Amount::from_edit(form.quantity.trim(), currency))
            } else {
                None
            };
            let posting = Posting {
                account: Some(form.account.trim().to_string()),
                amount,
                ..Posting::default()
            };
            out.push_str(&posting.format(
                prefs.alignment_width,
                prefs.currency_before_amount,
                prefs.currency_spacing,
                prefs.currency_enabled,
            ));
            out.push('\n');
        }

        out.push('\n');
        out
    }
}
