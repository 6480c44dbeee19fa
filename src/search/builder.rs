//! # Search Query Builder
//!
//! Turns the free-text `search` parameter into a filter over every scalar
//! attribute of a resource: `AND(term) OR(attribute) attribute CONTAINS term`.
//!
//! Terms are split on single spaces. There is no quoting or escaping, so a
//! phrase cannot be searched as one term.

use super::filter::FilterExpr;

/// Build the search filter for a raw query string
pub fn build_search_filter(raw_query: Option<&str>, attributes: &[String]) -> FilterExpr {
    let raw_query = match raw_query {
        Some(q) if !q.is_empty() => q,
        _ => return FilterExpr::All,
    };

    let terms: Vec<FilterExpr> = raw_query
        .split(' ')
        .filter(|term| !term.is_empty())
        .map(|term| FilterExpr::Or {
            filters: attributes
                .iter()
                .map(|attr| FilterExpr::contains(attr.as_str(), term))
                .collect(),
        })
        .collect();

    if terms.is_empty() {
        return FilterExpr::All;
    }

    FilterExpr::And { filters: terms }
}
