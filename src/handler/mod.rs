// handler/mod.rs
use crate::errors::{ExportError, Result};
use crate::headers::HeaderRegistry;
use crate::parser::{parse, DiagnosticRecord};
use crate::table::{assemble, Table};
use serde::Deserialize;
use serde_json::Value;

/// One entry of the search response's `results` array.
///
/// Fields are kept as raw JSON so an unexpected type never fails the run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: Option<Value>,
    pub uri: Option<Value>,
    pub score: Option<Value>,
    pub percent_score: Option<Value>,
    pub ranking_modifier: Option<Value>,
    pub is_recommendation: Option<Value>,
    pub ranking_info: Option<Value>,
}

impl SearchResult {
    /// The diagnostic text, when the service sent one as a string.
    pub fn ranking_info(&self) -> Option<&str> {
        self.ranking_info.as_ref().and_then(Value::as_str)
    }
}

/// Pulls the `results` array out of a search response payload.
pub fn results_from_payload(payload: Value) -> Result<Vec<SearchResult>> {
    let Value::Object(mut map) = payload else {
        return Err(ExportError::MissingResults);
    };
    match map.remove("results") {
        Some(results @ Value::Array(_)) => Ok(serde_json::from_value(results)?),
        _ => Err(ExportError::MissingResults),
    }
}

/// Parses every result against a freshly reset registry and assembles the
/// table. The registry is left holding this run's columns.
pub fn run_export(results: Vec<SearchResult>, registry: &mut HeaderRegistry) -> Table {
    registry.reset();

    let records: Vec<(SearchResult, DiagnosticRecord)> = results
        .into_iter()
        .map(|result| {
            let record = parse(result.ranking_info(), registry);
            (result, record)
        })
        .collect();

    tracing::info!(
        results = records.len(),
        expression_columns = registry.sorted_expression_columns().len(),
        term_columns = registry.sorted_term_columns().len(),
        anchor = registry.anchor_keyword().unwrap_or("-"),
        "parsed ranking diagnostics"
    );
    if registry.is_empty() {
        tracing::debug!("no dynamic columns discovered; was debugRankingInformation enabled?");
    }

    assemble(&records, registry)
}

/// Turns a fetched or loaded payload into the table for one export run.
///
/// A payload without results fails the run with the registry already reset.
pub fn export_payload(payload: Value, registry: &mut HeaderRegistry) -> Result<Table> {
    match results_from_payload(payload) {
        Ok(results) => Ok(run_export(results, registry)),
        Err(e) => {
            registry.reset();
            Err(e)
        }
    }
}
