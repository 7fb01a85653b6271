//! Name normalization and string inflection.
//!
//! Provides pluralization and singularization for table/column name matching,
//! using the `inflector` crate with irregulars the crate gets wrong in
//! database contexts, plus the token normalization shared by the name index
//! and the rule library.

use inflector::Inflector;

/// Irregular plurals that inflector doesn't handle well for schema names.
/// Portuguese entries cover the naming mix found in legacy Brazilian ERPs.
static IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("index", "indices"),
    ("status", "status"),
    // Portuguese -ão → -ões
    ("producao", "producoes"),
    ("faccao", "faccoes"),
    ("cotacao", "cotacoes"),
    ("condicao", "condicoes"),
    ("regiao", "regioes"),
    // Portuguese -l → -is
    ("papel", "papeis"),
    ("material", "materiais"),
];

/// Pluralize a word, irregulars first, then the inflector fallback.
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *singular || lower == *plural {
            return (*plural).to_string();
        }
    }
    lower.to_plural()
}

/// Singularize a word, irregulars first, then the inflector fallback.
pub fn singularize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    for (singular, plural) in IRREGULAR_PLURALS {
        if lower == *singular || lower == *plural {
            return (*singular).to_string();
        }
    }
    lower.to_singular()
}

/// Normalize a schema name into a single comparison token: case-folded with
/// separators stripped (`Nota_Fiscal` and `NotaFiscal` both normalize to
/// `notafiscal`).
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Split a schema name into lowercase tokens on separators and camelCase
/// boundaries (`ClienteID` → `["cliente", "id"]`, `cod_produto` →
/// `["cod", "produto"]`).
pub fn tokenize(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        current.extend(c.to_lowercase());
        prev_lower = c.is_lowercase() || c.is_numeric();
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
