//! Validated SQL identifiers.
//!
//! SQLite only binds values, never table or column names, so every name that
//! ends up inside statement text goes through [`Ident`] first.

use std::fmt;
use thiserror::Error as ThisError;

const MAX_IDENT_LEN: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
#[error("invalid identifier {name:?}: {reason}")]
pub struct InvalidIdentifier {
    pub name: String,
    pub reason: &'static str,
}

/// A table or column name that is safe to interpolate into SQL.
///
/// Accepted: ASCII letter or `_`, followed by ASCII alphanumerics or `_`, at
/// most 64 characters, not in SQLite's reserved `sqlite_` namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    pub fn parse(name: impl AsRef<str>) -> Result<Self, InvalidIdentifier> {
        let name = name.as_ref();
        let reject = |reason| InvalidIdentifier {
            name: name.to_string(),
            reason,
        };

        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return Err(reject("empty"));
        };
        if name.len() > MAX_IDENT_LEN {
            return Err(reject("too long"));
        }
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(reject("must start with a letter or underscore"));
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(reject("only letters, digits and underscores are allowed"));
        }
        if name
            .get(..7)
            .is_some_and(|p| p.eq_ignore_ascii_case("sqlite_"))
        {
            return Err(reject("reserved sqlite_ prefix"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for statement text.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ident {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
