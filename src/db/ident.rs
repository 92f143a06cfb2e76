//! Name checks for everything that ends up in statement text or on disk.
//!
//! Table and column names from a request are never escaped; they are accepted
//! only when they match `[A-Za-z_][A-Za-z0-9_]*` and are then embedded
//! double-quoted. Names read back from the engine are quoted as they are.

use std::fmt;

use crate::error::SqlitebotError;

/// A table or column name that is safe to embed in SQL.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    pub fn parse(name: &str) -> Result<Self, SqlitebotError> {
        let mut chars = name.chars();
        let head_ok = chars
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        if head_ok && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            Ok(Self(name.to_string()))
        } else {
            Err(SqlitebotError::InvalidName(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Renders as a quoted SQL identifier.
impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&quote_name(&self.0))
    }
}

/// Quote a name read back from the engine, doubling embedded quotes.
pub fn quote_name(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Join identifiers into a comma-separated column list.
pub fn column_list<'a>(idents: impl IntoIterator<Item = &'a Ident>) -> String {
    idents
        .into_iter()
        .map(Ident::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Database names map to file names under the data root; refuse anything that
/// could leave it or address a hidden file.
pub fn check_database_name(name: &str) -> Result<(), SqlitebotError> {
    let ok = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if ok {
        Ok(())
    } else {
        Err(SqlitebotError::InvalidName(name.to_string()))
    }
}
