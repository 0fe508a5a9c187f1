// headers/registry.rs
use std::collections::BTreeSet;

/// Batch-scoped set of column names discovered while parsing diagnostics.
///
/// Expression-derived and term-derived columns live in separate namespaces so
/// the table can place them in two sorted blocks. The registry also remembers
/// the anchor keyword: the primary keyword of the first term-group seen in the
/// run, which decides whose field contributions become columns.
#[derive(Debug, Default)]
pub struct HeaderRegistry {
    expressions: BTreeSet<String>,
    terms: BTreeSet<String>,
    anchor_keyword: Option<String>,
}

impl HeaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears both namespaces and forgets the anchor keyword.
    pub fn reset(&mut self) {
        self.expressions.clear();
        self.terms.clear();
        self.anchor_keyword = None;
    }

    pub fn record_expression_column(&mut self, name: &str) {
        if !self.expressions.contains(name) {
            self.expressions.insert(name.to_string());
        }
    }

    pub fn record_term_column(&mut self, name: &str) {
        if !self.terms.contains(name) {
            self.terms.insert(name.to_string());
        }
    }

    pub fn sorted_expression_columns(&self) -> Vec<String> {
        self.expressions.iter().cloned().collect()
    }

    pub fn sorted_term_columns(&self) -> Vec<String> {
        self.terms.iter().cloned().collect()
    }

    pub fn anchor_keyword(&self) -> Option<&str> {
        self.anchor_keyword.as_deref()
    }

    /// Returns the anchor keyword, adopting `keyword` if none is set yet.
    pub fn anchor_or_adopt(&mut self, keyword: &str) -> &str {
        self.anchor_keyword.get_or_insert_with(|| {
            tracing::debug!(keyword, "anchor keyword chosen");
            keyword.to_string()
        })
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty() && self.terms.is_empty()
    }
}
