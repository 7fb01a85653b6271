//! Inverted index from normalized name tokens to tables.
//!
//! Built once per analysis run, after profiling and before candidate
//! generation. Lookups replace pairwise table comparison, keeping candidate
//! generation near-linear in the number of columns rather than quadratic in
//! the number of tables.

use std::collections::{BTreeSet, HashMap};

use super::inflection::{normalize, pluralize, singularize};

/// Inverted index: token → tables whose name produced that token.
#[derive(Debug, Default)]
pub struct NameIndex {
    tokens: HashMap<String, BTreeSet<String>>,
}

impl NameIndex {
    /// Build the index over a set of table names.
    ///
    /// Each table is indexed under its normalized name plus the singular and
    /// plural forms, so `ClienteID` can find both `Cliente` and `Clientes`.
    pub fn build<'a>(table_names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut index = Self::default();
        for name in table_names {
            let norm = normalize(name);
            if norm.is_empty() {
                continue;
            }
            index.add(norm.clone(), name);
            index.add(singularize(&norm), name);
            index.add(pluralize(&norm), name);
        }
        index
    }

    fn add(&mut self, token: String, table: &str) {
        if token.is_empty() {
            return;
        }
        self.tokens
            .entry(token)
            .or_default()
            .insert(table.to_string());
    }

    /// Tables matching a normalized token, in lexicographic order.
    pub fn lookup(&self, token: &str) -> impl Iterator<Item = &str> {
        self.tokens
            .get(token)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Tables matching a token in any of its inflected forms.
    pub fn lookup_inflected(&self, token: &str) -> BTreeSet<&str> {
        let mut result: BTreeSet<&str> = self.lookup(token).collect();
        result.extend(self.lookup(&singularize(token)));
        result.extend(self.lookup(&pluralize(token)));
        result
    }

    /// Number of distinct tokens in the index.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
