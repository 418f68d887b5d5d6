use tracing::debug;

use crate::error::Result;
use crate::parser;
use crate::patch::{self, FileStore, SaveOutcome};
use crate::transaction::Transaction;

/// An immutable snapshot of one ledger file: the raw lines as read plus the
/// transactions parsed out of them.
///
/// Each read produces a fresh `Ledger`; nothing is diffed or mutated in
/// place. Line spans recorded on the transactions index into this
/// snapshot's `lines`, which is what makes [`Ledger::lines_for`] the
/// source of truth when the patch engine verifies a replace target.
#[derive(Debug)]
pub struct Ledger {
    content: String,
    lines: Vec<String>,
    transactions: Vec<Transaction>,
}

impl Ledger {
    /// Parse file content into a snapshot. All-or-nothing: one malformed
    /// line fails the whole read.
    pub fn parse(content: String) -> Result<Ledger> {
        let transactions = parser::parse(&content)?;
        let lines = content.lines().map(str::to_string).collect();
        debug!(transactions = transactions.len(), "parsed ledger snapshot");
        Ok(Ledger {
            content,
            lines,
            transactions,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The snapshot lines a transaction occupied when it was parsed. These
    /// are the bytes the patch engine requires to still be present before
    /// it will replace them.
    pub fn lines_for(&self, transaction: &Transaction) -> &[String] {
        &self.lines[transaction.first_line..=transaction.last_line]
    }

    /// Case-insensitive search over every transaction in the snapshot.
    pub fn find<'a>(&'a self, query: &str) -> Vec<&'a Transaction> {
        self.transactions
            .iter()
            .filter(|t| t.contains(query))
            .collect()
    }

    /// Replace one of this snapshot's transactions with new text, going
    /// through the patch engine's mismatch check. On success the caller
    /// should parse the returned content into a new snapshot and drop this
    /// one.
    pub fn replace_transaction(
        &self,
        store: &dyn FileStore,
        transaction: &Transaction,
        text: &str,
    ) -> Result<SaveOutcome> {
        patch::replace(
            store,
            transaction.first_line,
            transaction.last_line,
            self.lines_for(transaction),
            text,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::form::TransactionForm;
    use crate::ledger::Ledger;
    use crate::options::Preferences;
    use crate::patch::{FileStore, MemStore, SaveOutcome};

    use anyhow::Result;

    const FILE: &str = "\
2023-08-30 Grocer\n    expenses:food    € 12.00\n    assets:cash\n\n2023-08-31 * Payee | Note\n    assets            € -5.00\n    expenses    € 5.00\n";

    #[test]
    fn snapshot_keeps_lines_and_transactions() -> Result<()> {
        let ledger = Ledger::parse(FILE.to_string())?;
        assert_eq!(ledger.transactions().len(), 2);
        assert_eq!(ledger.lines().len(), 7);
        assert_eq!(ledger.content(), FILE);
        Ok(())
    }

    #[test]
    fn lines_for_returns_exact_span() -> Result<()> {
        let ledger = Ledger::parse(FILE.to_string())?;
        let second = &ledger.transactions()[1];
        assert_eq!(
            ledger.lines_for(second),
            [
                "2023-08-31 * Payee | Note",
                "    assets            € -5.00",
                "    expenses    € 5.00",
            ]
        );
        Ok(())
    }

    #[test]
    fn find_matches_any_field() -> Result<()> {
        let ledger = Ledger::parse(FILE.to_string())?;
        assert_eq!(ledger.find("grocer").len(), 1);
        assert_eq!(ledger.find("expenses").len(), 2);
        assert!(ledger.find("nothing here").is_empty());
        Ok(())
    }

    #[test]
    fn edit_through_form_and_save() -> Result<()> {
        let store = MemStore::new(FILE);
        let ledger = Ledger::parse(store.read()?)?;
        let target = &ledger.transactions()[0];

        let mut form = TransactionForm::from_transaction(target);
        form.payee = "Corner Grocer".to_string();
        form.postings[0].quantity = "13.00".to_string();
        form.postings[1].quantity = "-13.00".to_string();
        form.postings[1].currency = "€".to_string();

        let prefs = Preferences {
            currency_before_amount: true,
            ..Preferences::default()
        };
        form.validate(&prefs).map_err(anyhow::Error::from)?;
        let outcome = ledger.replace_transaction(&store, target, &form.render(&prefs))?;
        let content = match outcome {
            SaveOutcome::Saved { content } => content,
            other => anyhow::bail!("expected Saved, got {:?}", other),
        };

        let reloaded = Ledger::parse(content)?;
        assert_eq!(reloaded.transactions().len(), 2);
        assert_eq!(reloaded.transactions()[0].payee, "Corner Grocer");
        assert_eq!(
            reloaded.transactions()[0].postings[0]
                .amount
                .as_ref()
                .unwrap()
                .quantity,
            "13.00"
        );
        // the untouched second transaction kept its exact bytes
        assert_eq!(
            reloaded.lines_for(&reloaded.transactions()[1]),
            ledger.lines_for(&ledger.transactions()[1])
        );
        Ok(())
    }
}
