//! Rule book registry - rule books embedded in the binary

use rust_embed::Embed;
use std::collections::BTreeMap;

#[derive(Embed)]
#[folder = "rules/"]
struct EmbeddedRules;

/// Registry of embedded rule books, keyed by file name
pub struct RuleRegistry {
    books: BTreeMap<String, String>,
}

impl RuleRegistry {
    /// File name of the rule book used when none is configured
    pub const DEFAULT: &'static str = "default.yaml";

    /// Create a registry holding every embedded rule book
    pub fn new() -> Self {
        let mut books = BTreeMap::new();

        for name in EmbeddedRules::iter() {
            if let Some(file) = EmbeddedRules::get(&name) {
                match std::str::from_utf8(&file.data) {
                    Ok(content) => {
                        books.insert(name.to_string(), content.to_string());
                    }
                    Err(e) => tracing::warn!(file = %name, error = %e, "skipping non-UTF-8 rule book"),
                }
            }
        }

        Self { books }
    }

    /// Get the YAML source of an embedded rule book
    pub fn get(&self, name: &str) -> Option<&str> {
        self.books.get(name).map(|s| s.as_str())
    }

    /// Names of all embedded rule books
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.books.keys().map(|k| k.as_str())
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
