//! Line-oriented recursive descent over the whole file.
//!
//! The grammar is deliberately small: a transaction is a dated header line
//! followed by one or more indented posting lines, terminated by a blank
//! line or end of input. Blank lines and `;` comment lines between
//! transactions are separators. Anything else fails the whole parse; a
//! partially understood file must never reach the write path, since the
//! patcher would then splice against line numbers that mean something
//! different than the user saw.

use crate::amount::{Amount, Cost, CostKind};
use crate::error::{LedgerError, Result};
use crate::posting::Posting;
use crate::transaction::Transaction;

/// Parse a whole ledger file into transactions, in source order.
///
/// Line numbers recorded on each transaction are 0-based indexes into the
/// file's line sequence, inclusive on both ends. Errors carry 1-based line
/// numbers, which is what people expect to see in a message.
pub fn parse(input: &str) -> Result<Vec<Transaction>> {
    let lines: Vec<&str> = input.lines().collect();
    let mut transactions = Vec::new();
    let mut pos = 0;

    while pos < lines.len() {
        let line = lines[pos];
        if line.trim().is_empty() || line.trim_start().starts_with(';') {
            pos += 1;
            continue;
        }
        if starts_with_date(line) {
            let (transaction, next) = parse_transaction(&lines, pos)?;
            transactions.push(transaction);
            pos = next;
            continue;
        }
        return Err(LedgerError::parse(
            pos + 1,
            format!("expected a transaction header, found `{}'", line),
        ));
    }

    Ok(transactions)
}

fn parse_transaction(lines: &[&str], start: usize) -> Result<(Transaction, usize)> {
    let mut transaction = parse_header(lines[start], start)?;

    let mut pos = start + 1;
    while pos < lines.len() {
        let line = lines[pos];
        if line.trim().is_empty() {
            break;
        }
        if !line.starts_with(' ') && !line.starts_with('\t') {
            break;
        }
        transaction.postings.push(parse_posting_line(line, pos)?);
        pos += 1;
    }

    if transaction.postings.is_empty() {
        return Err(LedgerError::parse(
            start + 1,
            format!("transaction `{}' has no postings", transaction.payee),
        ));
    }

    transaction.first_line = start;
    transaction.last_line = pos - 1;
    Ok((transaction, pos))
}

/// Header: date, whitespace, optional `*`/`!` status, optional `(code)`,
/// then payee up to `|`, optionally followed by `| note`.
fn parse_header(line: &str, index: usize) -> Result<Transaction> {
    let date_end = line
        .find(char::is_whitespace)
        .ok_or_else(|| LedgerError::parse(index + 1, "transaction header has no payee"))?;
    let date = &line[..date_end];
    if !is_date(date) {
        return Err(LedgerError::parse(
            index + 1,
            format!("`{}' is not a date", date),
        ));
    }

    let mut rest = line[date_end..].trim_start();

    let mut status = None;
    if let Some(first) = rest.chars().next() {
        if first == '*' || first == '!' {
            status = Some(first);
            rest = rest[first.len_utf8()..].trim_start();
        }
    }

    let mut code = None;
    if let Some(stripped) = rest.strip_prefix('(') {
        if let Some(close) = stripped.find(')') {
            code = Some(stripped[..close].to_string());
            rest = stripped[close + 1..].trim_start();
        }
    }

    let (payee, note) = match rest.split_once('|') {
        Some((payee, note)) => (payee.trim(), Some(note.trim().to_string())),
        None => (rest.trim(), None),
    };

    Ok(Transaction {
        date: date.to_string(),
        status,
        code,
        payee: payee.to_string(),
        note,
        ..Transaction::default()
    })
}

/// 4 digits, `-`, 1-2 digits, `-`, 1-2 digits.
fn is_date(token: &str) -> bool {
    let mut parts = token.split('-');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(y), Some(m), Some(d), None) => {
            is_digits(y, 4, 4) && is_digits(m, 1, 2) && is_digits(d, 1, 2)
        }
        _ => false,
    }
}

fn is_digits(s: &str, min: usize, max: usize) -> bool {
    s.len() >= min && s.len() <= max && s.chars().all(|c| c.is_ascii_digit())
}

fn starts_with_date(line: &str) -> bool {
    let token = line.split_whitespace().next().unwrap_or(line);
    is_date(token)
}

/// Posting: leading whitespace, account up to the first run of 2+ spaces,
/// then `[amount] [@|@@ cost] [= assertion] [@|@@ assertion-cost]
/// [; comment]`. A line holding only whitespace and `; comment` is a
/// comment-only posting.
pub(crate) fn parse_posting_line(line: &str, index: usize) -> Result<Posting> {
    let body = line.trim_start();

    if let Some(comment) = body.strip_prefix(';') {
        return Ok(Posting {
            comment: Some(comment.trim().to_string()),
            ..Posting::default()
        });
    }

    let (account, rest) = match body.find("  ") {
        Some(gap) => (body[..gap].trim_end(), body[gap..].trim_start()),
        None => (body.trim_end(), ""),
    };

    if account.is_empty() {
        return Err(LedgerError::parse(
            index + 1,
            format!("posting line has no account: `{}'", line),
        ));
    }

    let mut posting = parse_amount_section(rest);
    posting.account = Some(account.to_string());
    Ok(posting)
}

/// Everything to the right of the account gap.
fn parse_amount_section(rest: &str) -> Posting {
    let mut posting = Posting::default();

    let rest = match rest.split_once(';') {
        Some((before, comment)) => {
            posting.comment = Some(comment.trim().to_string());
            before
        }
        None => rest,
    };

    let (amount_part, assertion_part) = match rest.split_once('=') {
        Some((before, after)) => (before, Some(after)),
        None => (rest, None),
    };

    let (amount, cost) = split_cost(amount_part);
    posting.amount = amount;
    posting.cost = cost;

    if let Some(assertion_part) = assertion_part {
        let (assertion, assertion_cost) = split_cost(assertion_part);
        posting.assertion = assertion;
        posting.assertion_cost = assertion_cost;
    }

    posting
}

/// Split `amount [@|@@ cost]`, keeping each side's verbatim text.
fn split_cost(section: &str) -> (Option<Amount>, Option<Cost>) {
    let (amount_text, cost) = match section.find('@') {
        Some(at) => {
            let (kind, cost_text) = if section[at + 1..].starts_with('@') {
                (CostKind::Total, &section[at + 2..])
            } else {
                (CostKind::PerUnit, &section[at + 1..])
            };
            let cost = match cost_text.trim() {
                "" => None,
                text => Some(Cost {
                    amount: Amount::from_source(text),
                    kind,
                }),
            };
            (&section[..at], cost)
        }
        None => (section, None),
    };

    let amount = match amount_text.trim() {
        "" => None,
        text => Some(Amount::from_source(text)),
    };
    (amount, cost)
}

#[cfg(test)]
mod tests {
    use crate::amount::CostKind;
    use crate::parser::{parse, parse_posting_line};

    use anyhow::Result;

    #[test]
    fn parse_single_transaction() -> Result<()> {
        let input = "2023-08-31 * Payee | Note\n    assets            € -5.00\n    expenses    € 5.00\n\n";
        let transactions = parse(input)?;

        assert_eq!(transactions.len(), 1);
        let txn = &transactions[0];
        assert_eq!(txn.date, "2023-08-31");
        assert_eq!(txn.status, Some('*'));
        assert_eq!(txn.payee, "Payee");
        assert_eq!(txn.note.as_deref(), Some("Note"));
        assert_eq!(txn.first_line, 0);
        assert_eq!(txn.last_line, 2);

        assert_eq!(txn.postings.len(), 2);
        assert_eq!(txn.postings[0].account.as_deref(), Some("assets"));
        assert_eq!(
            txn.postings[0].amount.as_ref().unwrap().original,
            "€ -5.00"
        );
        assert_eq!(txn.postings[1].account.as_deref(), Some("expenses"));
        assert_eq!(txn.postings[1].amount.as_ref().unwrap().original, "€ 5.00");

        Ok(())
    }

    #[test]
    fn parse_posting_in_isolation() -> Result<()> {
        let posting = parse_posting_line("    assets        € -5.00", 0)?;
        assert_eq!(posting.account.as_deref(), Some("assets"));
        assert_eq!(posting.amount.as_ref().unwrap().original, "€ -5.00");
        assert_eq!(posting.amount.as_ref().unwrap().quantity, "-5.00");
        assert_eq!(posting.amount.as_ref().unwrap().currency, "€");
        Ok(())
    }

    #[test]
    fn parse_posting_with_cost_assertion_and_comment() -> Result<()> {
        let posting =
            parse_posting_line("    assets:broker  2 VACHR @ 120.00 USD = 10 VACHR @@ 1200.00 USD ; rebalance", 0)?;
        assert_eq!(posting.account.as_deref(), Some("assets:broker"));
        assert_eq!(posting.amount.as_ref().unwrap().original, "2 VACHR");
        let cost = posting.cost.as_ref().unwrap();
        assert_eq!(cost.kind, CostKind::PerUnit);
        assert_eq!(cost.amount.original, "120.00 USD");
        assert_eq!(posting.assertion.as_ref().unwrap().original, "10 VACHR");
        let assertion_cost = posting.assertion_cost.as_ref().unwrap();
        assert_eq!(assertion_cost.kind, CostKind::Total);
        assert_eq!(assertion_cost.amount.original, "1200.00 USD");
        assert_eq!(posting.comment.as_deref(), Some("rebalance"));
        Ok(())
    }

    #[test]
    fn parse_comment_only_posting() -> Result<()> {
        let input = "2024-01-01 Memo | just a note\n    ; nothing bought yet\n";
        let transactions = parse(input)?;
        assert_eq!(transactions.len(), 1);
        let posting = &transactions[0].postings[0];
        assert!(posting.is_comment());
        assert_eq!(posting.comment.as_deref(), Some("nothing bought yet"));
        Ok(())
    }

    #[test]
    fn parse_account_with_single_spaces() -> Result<()> {
        let posting = parse_posting_line("    expenses:eating out  12.50 USD", 0)?;
        assert_eq!(posting.account.as_deref(), Some("expenses:eating out"));
        assert_eq!(posting.amount.as_ref().unwrap().original, "12.50 USD");
        Ok(())
    }

    #[test]
    fn parse_posting_without_amount() -> Result<()> {
        let posting = parse_posting_line("    assets:checking", 0)?;
        assert_eq!(posting.account.as_deref(), Some("assets:checking"));
        assert!(posting.amount.is_none());
        Ok(())
    }

    #[test]
    fn parse_header_with_code_and_bang_status() -> Result<()> {
        let input = "2024-02-02 ! (INV-7) Acme Corp\n    expenses  50 USD\n    assets\n";
        let transactions = parse(input)?;
        let txn = &transactions[0];
        assert_eq!(txn.status, Some('!'));
        assert_eq!(txn.code.as_deref(), Some("INV-7"));
        assert_eq!(txn.payee, "Acme Corp");
        assert_eq!(txn.note, None);
        Ok(())
    }

    #[test]
    fn parse_multiple_transactions_tracks_lines() -> Result<()> {
        let input = "\n; opening balances live elsewhere\n2024-01-01 One\n    a  1 USD\n    b\n\n\n2024-01-02 Two\n    c  2 USD\n    d\n";
        let transactions = parse(input)?;
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].first_line, 2);
        assert_eq!(transactions[0].last_line, 4);
        assert_eq!(transactions[1].first_line, 7);
        assert_eq!(transactions[1].last_line, 9);
        Ok(())
    }

    #[test]
    fn stray_line_fails_whole_parse() {
        let input = "2024-01-01 Fine\n    a  1 USD\n    b\n\nthis is not a ledger line\n";
        let err = parse(input).unwrap_err();
        assert_eq!(
            format!("{}", err),
            "parse error at line 5: expected a transaction header, found `this is not a ledger line'"
        );
    }

    #[test]
    fn header_without_postings_fails() {
        let input = "2024-01-01 Lonely header\n\n";
        let err = parse(input).unwrap_err();
        assert!(format!("{}", err).contains("has no postings"));
    }

    #[test]
    fn bad_date_fails() {
        let err = parse("20241-01-01 Nope\n    a  1 USD\n").unwrap_err();
        assert!(format!("{}", err).contains("expected a transaction header"));
        assert!(format!("{}", err).contains("line 1"));
    }

    #[test]
    fn empty_input_parses_to_nothing() -> Result<()> {
        assert!(parse("")?.is_empty());
        assert!(parse("\n\n;only a comment\n")?.is_empty());
        Ok(())
    }
}
