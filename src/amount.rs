/// A quantity/currency pair as it appeared in the source file.
///
/// `original` keeps the verbatim source text so untouched amounts can be
/// shown exactly as written. `quantity` and `currency` are a best-effort
/// decomposition for the edit form; reformatting through [`Amount::format`]
/// is an explicit, user-visible transform and is not required to reproduce
/// `original` character for character.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Amount {
    pub quantity: String,
    pub currency: String,
    pub original: String,
}

impl Amount {
    /// Decompose a source amount token, e.g. `€ -5.00` or `5.00 USD`.
    ///
    /// Digits, signs, and decimal/group separators become the quantity,
    /// everything else that is not whitespace becomes the currency.
    pub fn from_source(original: impl Into<String>) -> Amount {
        let original = original.into();
        let quantity: String = original.chars().filter(is_quantity_char).collect();
        let currency: String = original
            .chars()
            .filter(|c| !is_quantity_char(c) && !c.is_whitespace())
            .collect();
        Amount {
            quantity,
            currency,
            original,
        }
    }

    /// Build an amount from edit-form fields. `original` is filled with the
    /// default rendering so display code has something to show before the
    /// next file read replaces this object.
    pub fn from_edit(quantity: impl Into<String>, currency: impl Into<String>) -> Amount {
        let mut amount = Amount {
            quantity: quantity.into(),
            currency: currency.into(),
            original: String::new(),
        };
        amount.original = amount.format(false, true, true);
        amount
    }

    /// Render for writing. With `currency_enabled` off only the trimmed
    /// quantity remains; otherwise currency and quantity are joined in the
    /// requested order, with an optional single-space separator.
    pub fn format(
        &self,
        currency_before_amount: bool,
        currency_spacing: bool,
        currency_enabled: bool,
    ) -> String {
        if !currency_enabled {
            return self.quantity.trim().to_string();
        }
        let sep = if currency_spacing { " " } else { "" };
        let joined = if currency_before_amount {
            format!("{}{}{}", self.currency, sep, self.quantity)
        } else {
            format!("{}{}{}", self.quantity, sep, self.currency)
        };
        joined.trim().to_string()
    }

    /// Case-insensitive substring test against the verbatim source text.
    pub fn contains(&self, query: &str) -> bool {
        self.original
            .to_lowercase()
            .contains(&query.to_lowercase())
    }
}

fn is_quantity_char(c: &char) -> bool {
    c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | ',')
}

/// Cost flavor: `@` prices each unit, `@@` prices the whole posting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CostKind {
    PerUnit,
    Total,
}

impl CostKind {
    pub fn marker(&self) -> &'static str {
        match self {
            CostKind::PerUnit => "@",
            CostKind::Total => "@@",
        }
    }
}

/// An `@`/`@@` cost annotation attached to a posting amount or to a
/// balance assertion.
#[derive(Clone, Debug, PartialEq)]
pub struct Cost {
    pub amount: Amount,
    pub kind: CostKind,
}

impl Cost {
    pub fn format(
        &self,
        currency_before_amount: bool,
        currency_spacing: bool,
        currency_enabled: bool,
    ) -> String {
        format!(
            "{} {}",
            self.kind.marker(),
            self.amount
                .format(currency_before_amount, currency_spacing, currency_enabled)
        )
    }

    pub fn contains(&self, query: &str) -> bool {
        self.amount.contains(query)
    }
}

#[cfg(test)]
mod tests {
    use crate::amount::{Amount, Cost, CostKind};

    #[test]
    fn decompose_currency_first() {
        let amount = Amount::from_source("€ -5.00");
        assert_eq!(amount.quantity, "-5.00");
        assert_eq!(amount.currency, "€");
        assert_eq!(amount.original, "€ -5.00");
    }

    #[test]
    fn decompose_currency_last() {
        let amount = Amount::from_source("1337.25 USD");
        assert_eq!(amount.quantity, "1337.25");
        assert_eq!(amount.currency, "USD");
    }

    #[test]
    fn format_orders_and_spacing() {
        let amount = Amount::from_source("€ -5.00");
        assert_eq!(amount.format(true, true, true), "€ -5.00");
        assert_eq!(amount.format(false, true, true), "-5.00 €");
        assert_eq!(amount.format(true, false, true), "€-5.00");
        assert_eq!(amount.format(false, false, false), "-5.00");
    }

    #[test]
    fn format_without_currency_trims() {
        let amount = Amount {
            quantity: "  42.00 ".to_string(),
            currency: "USD".to_string(),
            original: "42.00 USD".to_string(),
        };
        assert_eq!(amount.format(false, true, false), "42.00");
    }

    #[test]
    fn contains_is_case_insensitive() {
        let amount = Amount::from_source("50 USD");
        assert!(amount.contains("usd"));
        assert!(amount.contains("50"));
        assert!(!amount.contains("eur"));
    }

    #[test]
    fn cost_format_uses_marker() {
        let cost = Cost {
            amount: Amount::from_source("1000 IDR"),
            kind: CostKind::PerUnit,
        };
        assert_eq!(cost.format(false, true, true), "@ 1000 IDR");

        let cost = Cost {
            amount: Amount::from_source("1000 IDR"),
            kind: CostKind::Total,
        };
        assert_eq!(cost.format(false, true, true), "@@ 1000 IDR");
    }
}
