//! Resolves the sender identity and recipient list from the mail settings.
//!
//! Validation is intentionally shallow: an address is anything containing
//! `@`. The mail provider is left to reject anything worse.

use crate::error::ConfigError;

/// Who the notification appears to come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderIdentity {
    pub name: String,
    pub email: String,
}

impl SenderIdentity {
    /// Validates `from` and falls back to `default_name` when `from_name`
    /// is empty.
    pub fn resolve(from: &str, from_name: &str, default_name: &str) -> Result<Self, ConfigError> {
        if from.is_empty() {
            return Err(ConfigError::EmptyFrom);
        }
        if !from.contains('@') {
            return Err(ConfigError::InvalidFrom(from.to_string()));
        }

        let name = if from_name.is_empty() {
            default_name
        } else {
            from_name
        };

        Ok(Self {
            name: name.to_string(),
            email: from.to_string(),
        })
    }
}

/// The ordered recipients of a notification. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientSet(Vec<String>);

impl RecipientSet {
    /// Parses a `MAIL_TO` value.
    ///
    /// The raw value must be non-empty and contain `@` somewhere. A
    /// comma-separated value is split, each piece trimmed, and pieces that
    /// are blank or lack `@` are dropped without complaint. A value without
    /// commas is used whole after trimming; the raw check already
    /// guarantees it contains `@`.
    pub fn resolve(raw: &str) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Err(ConfigError::EmptyTo);
        }
        if !raw.contains('@') {
            return Err(ConfigError::InvalidTo(raw.to_string()));
        }

        let addresses = if raw.contains(',') {
            raw.split(',')
                .map(str::trim)
                .filter(|to| !to.is_empty() && to.contains('@'))
                .map(str::to_string)
                .collect()
        } else {
            vec![raw.trim().to_string()]
        };

        Ok(Self(addresses))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}
