//! Coarse table categorization from name and column keywords.
//!
//! Legacy ERP dumps mix Portuguese and English naming, so both variants are
//! listed. Categorization only feeds display grouping and never affects
//! relationship mining.

use super::TableCategory;

/// Keyword lists per category, checked in declaration order. The first
/// category with a matching keyword wins, mirroring how the dumps name their
/// master tables (a table called `VendaCliente` is a sales table).
const CATEGORY_KEYWORDS: &[(TableCategory, &[&str])] = &[
    (
        TableCategory::Sales,
        &[
            "venda", "pedido", "orcamento", "sale", "order", "nota", "nfe", "fiscal", "invoice",
            "fatura",
        ],
    ),
    (
        TableCategory::Customers,
        &["cliente", "customer", "client"],
    ),
    (
        TableCategory::Products,
        &["produto", "product", "item", "prod", "material", "mercadoria"],
    ),
    (
        TableCategory::Inventory,
        &[
            "estoque", "inventario", "inventory", "stock", "almox", "deposito", "warehouse",
        ],
    ),
];

/// Infer a table's category from its name, falling back to its column names.
pub fn categorize(table_name: &str, column_names: &[String]) -> TableCategory {
    if let Some(category) = match_keywords(table_name) {
        return category;
    }

    // Name gave nothing; look for a category that dominates the columns.
    // A single stray column mention is not enough.
    let mut counts = [0usize; 4];
    for column in column_names {
        if let Some(category) = match_keywords(column) {
            counts[category_index(category)] += 1;
        }
    }
    let (best_index, best_count) = counts
        .iter()
        .enumerate()
        .max_by_key(|(_, count)| **count)
        .map(|(i, count)| (i, *count))
        .unwrap_or((0, 0));
    if best_count >= 2 {
        return CATEGORY_KEYWORDS[best_index].0;
    }

    TableCategory::Other
}

fn match_keywords(name: &str) -> Option<TableCategory> {
    let lower = name.to_lowercase();
    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return Some(*category);
        }
    }
    None
}

fn category_index(category: TableCategory) -> usize {
    CATEGORY_KEYWORDS
        .iter()
        .position(|(c, _)| *c == category)
        .unwrap_or(0)
}
