use serde::{Deserialize, Serialize};

/// Formatting preferences consumed from the settings collaborator.
///
/// The core never stores these; every render call takes the current values
/// so a settings change is picked up on the next write without any
/// invalidation dance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Currency applied to form postings that leave theirs blank.
    pub default_currency: String,
    /// Status marker preselected for new transactions, `*` or `!`.
    pub default_status: Option<char>,
    /// `€ 5.00` when true, `5.00 €` when false.
    pub currency_before_amount: bool,
    /// Single space between currency and quantity.
    pub currency_spacing: bool,
    /// When false, amounts are written without any currency symbol.
    pub currency_enabled: bool,
    /// Column the amount should start at in written posting lines.
    pub alignment_width: usize,
}

impl Default for Preferences {
    fn default() -> Preferences {
        Preferences {
            default_currency: String::new(),
            default_status: None,
            currency_before_amount: false,
            currency_spacing: true,
            currency_enabled: true,
            alignment_width: 52,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::options::Preferences;

    #[test]
    fn defaults() {
        let prefs = Preferences::default();
        assert!(prefs.currency_enabled);
        assert!(prefs.currency_spacing);
        assert!(!prefs.currency_before_amount);
        assert_eq!(prefs.alignment_width, 52);
        assert_eq!(prefs.default_status, None);
    }
}
