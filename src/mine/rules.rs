//! The naming-rule library for candidate generation.
//!
//! Each rule is a pure extractor from a column name to the entity tokens it
//! plausibly references. Precedence is explicit and ordered: exact alias
//! match beats suffix/prefix patterns, which beat fuzzy token overlap. Only
//! the strongest rule proposing a given (column, target) pair contributes its
//! naming strength, but targets found by weaker rules are still kept as
//! separate candidates.

use std::collections::{BTreeMap, HashMap};

use super::inflection::{normalize, singularize, tokenize};

/// Tokens that never reference an entity on their own (generic column
/// vocabulary common to every ERP table).
static STOPWORD_TOKENS: &[&str] = &[
    "id", "cod", "codigo", "num", "numero", "data", "date", "desc", "descricao", "nome", "name",
    "valor", "value", "tipo", "type", "status", "obs", "key", "ref", "seq", "flag", "qtd", "qtde",
];

/// Built-in ERP synonym pairs (Portuguese/English), canonical name first.
static DEFAULT_ALIASES: &[(&str, &[&str])] = &[
    ("cliente", &["customer", "client"]),
    ("produto", &["product", "item", "mercadoria"]),
    ("pedido", &["order"]),
    ("venda", &["sale"]),
    ("fornecedor", &["supplier", "vendor"]),
    ("funcionario", &["employee", "colaborador"]),
    ("vendedor", &["salesperson", "seller"]),
    ("estoque", &["stock", "inventory", "inventario"]),
    ("notafiscal", &["invoice", "nfe"]),
    ("cidade", &["city"]),
    ("estado", &["state", "uf"]),
    ("pais", &["country"]),
];

/// Bidirectional alias table mapping any synonym to its equivalence group.
#[derive(Debug, Clone)]
pub struct AliasTable {
    groups: HashMap<String, Vec<String>>,
}

impl AliasTable {
    /// Build the default table, extended with configured aliases (canonical
    /// name → synonyms). Configured entries merge into built-in groups when
    /// the canonical name already exists.
    pub fn with_defaults(extra: &BTreeMap<String, Vec<String>>) -> Self {
        let mut canonical_groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (canonical, synonyms) in DEFAULT_ALIASES {
            let mut group = vec![(*canonical).to_string()];
            group.extend(synonyms.iter().map(|s| (*s).to_string()));
            canonical_groups.insert((*canonical).to_string(), group);
        }
        for (canonical, synonyms) in extra {
            let canonical = normalize(canonical);
            let group = canonical_groups
                .entry(canonical.clone())
                .or_insert_with(|| vec![canonical]);
            for synonym in synonyms {
                let synonym = normalize(synonym);
                if !group.contains(&synonym) {
                    group.push(synonym);
                }
            }
        }

        let mut groups = HashMap::new();
        for group in canonical_groups.into_values() {
            for member in &group {
                groups.insert(member.clone(), group.clone());
            }
        }
        Self { groups }
    }

    /// Whether the token is a known alias of some entity.
    pub fn contains(&self, token: &str) -> bool {
        self.groups.contains_key(token) || self.groups.contains_key(&singularize(token))
    }

    /// All tokens equivalent to the given one, itself included. Unknown
    /// tokens expand to just themselves.
    pub fn expand(&self, token: &str) -> Vec<String> {
        if let Some(group) = self.groups.get(token) {
            return group.clone();
        }
        let singular = singularize(token);
        if let Some(group) = self.groups.get(&singular) {
            return group.clone();
        }
        vec![token.to_string()]
    }
}

/// Matching strategy of a naming rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RuleMatcher {
    /// Column name is exactly a known entity alias (`Cliente` → clientes).
    AliasExact,
    /// `<Entity>ID` / `<entity>_id` suffix.
    SuffixId,
    /// `ID<Entity>` / `id_<entity>` prefix.
    PrefixId,
    /// `Cod<Entity>` / `<Entity>Cod` / `Codigo<Entity>` patterns.
    CodPattern,
    /// Fuzzy: any non-stopword name token matches a table token.
    TokenOverlap,
}

/// A naming rule with explicit precedence and strength.
#[derive(Debug, Clone)]
pub struct NamingRule {
    /// Rule identifier, recorded in evidence.
    pub name: &'static str,
    /// Human-readable description.
    pub description: &'static str,
    /// Position in the ordered library; lower wins ties.
    pub precedence: u8,
    /// Naming-strength factor contributed to scoring, in [0, 1].
    pub strength: f64,
    matcher: RuleMatcher,
}

impl NamingRule {
    /// Extract the entity tokens this rule sees in a column name.
    ///
    /// Returned tokens are normalized but not alias-expanded; the candidate
    /// generator expands them and resolves tables through the name index.
    pub fn extract(&self, column_name: &str, aliases: &AliasTable) -> Vec<String> {
        let norm = normalize(column_name);
        if norm.is_empty() {
            return Vec::new();
        }

        match self.matcher {
            RuleMatcher::AliasExact => {
                if aliases.contains(&norm) {
                    vec![norm]
                } else {
                    Vec::new()
                }
            }
            RuleMatcher::SuffixId => strip_suffix(&norm, "id").into_iter().collect(),
            RuleMatcher::PrefixId => strip_prefix(&norm, "id").into_iter().collect(),
            RuleMatcher::CodPattern => {
                let mut bases = Vec::new();
                if let Some(base) = strip_prefix(&norm, "codigo") {
                    bases.push(base);
                } else if let Some(base) = strip_prefix(&norm, "cod") {
                    bases.push(base);
                }
                if let Some(base) = strip_suffix(&norm, "codigo") {
                    bases.push(base);
                } else if let Some(base) = strip_suffix(&norm, "cod") {
                    bases.push(base);
                }
                bases
            }
            RuleMatcher::TokenOverlap => tokenize(column_name)
                .into_iter()
                .filter(|t| t.len() >= 3 && !STOPWORD_TOKENS.contains(&t.as_str()))
                .collect(),
        }
    }
}

fn strip_suffix(name: &str, suffix: &str) -> Option<String> {
    let base = name.strip_suffix(suffix)?;
    (!base.is_empty()).then(|| base.to_string())
}

fn strip_prefix(name: &str, prefix: &str) -> Option<String> {
    let base = name.strip_prefix(prefix)?;
    (!base.is_empty()).then(|| base.to_string())
}

/// The default rule library, ordered by precedence.
pub fn default_rules() -> Vec<NamingRule> {
    vec![
        NamingRule {
            name: "alias_exact",
            description: "Column name is exactly a known entity alias",
            precedence: 0,
            strength: 1.0,
            matcher: RuleMatcher::AliasExact,
        },
        NamingRule {
            name: "suffix_id",
            description: "Column ends with ID (ClienteID, cliente_id)",
            precedence: 1,
            strength: 0.85,
            matcher: RuleMatcher::SuffixId,
        },
        NamingRule {
            name: "prefix_id",
            description: "Column starts with ID (IDCliente, id_cliente)",
            precedence: 2,
            strength: 0.85,
            matcher: RuleMatcher::PrefixId,
        },
        NamingRule {
            name: "cod_pattern",
            description: "Column carries a Cod/Codigo marker (CodProduto)",
            precedence: 3,
            strength: 0.85,
            matcher: RuleMatcher::CodPattern,
        },
        NamingRule {
            name: "token_overlap",
            description: "A column name token matches a table name token",
            precedence: 4,
            strength: 0.60,
            matcher: RuleMatcher::TokenOverlap,
        },
    ]
}
