// table/mod.rs
pub mod escape;

use crate::errors::Result;
use crate::handler::SearchResult;
use crate::headers::HeaderRegistry;
use crate::parser::{DiagnosticRecord, Weight};
use escape::{escape_text, text_cell, value_cell};
use std::io::{self, Write};

/// Columns that precede the fixed weight columns, in output order.
pub const LEADING_COLUMNS: [&str; 9] = [
    "Title",
    "URI",
    "Score",
    "RI_DocScore",
    "RI_TermContributions",
    "RI_TotalScore",
    "Percent Score",
    "Ranking Modifier",
    "Is Recommendation",
];

/// A rectangular export table. Row cells are already CSV-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Raw column names, fixed columns first.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Writes the header and every row, one record per line.
    pub fn write_csv<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(out);

        let header: Vec<String> = self.columns.iter().map(|c| escape_text(c)).collect();
        writer.write_record(&header)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// The whole document as a string, rows joined by `\n`.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        let csv = String::from_utf8(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(csv)
    }
}

/// Builds the table from parsed records and the frozen registry.
///
/// Header is the fixed columns, then sorted expression columns, then sorted
/// term columns. A record without a value for a dynamic column gets an empty
/// cell there.
pub fn assemble(
    records: &[(SearchResult, DiagnosticRecord)],
    registry: &HeaderRegistry,
) -> Table {
    let expression_columns = registry.sorted_expression_columns();
    let term_columns = registry.sorted_term_columns();

    let mut columns: Vec<String> = LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    columns.extend(Weight::ALL.iter().map(|w| w.column().to_string()));
    columns.extend(expression_columns.iter().cloned());
    columns.extend(term_columns.iter().cloned());

    let rows = records
        .iter()
        .map(|(result, record)| {
            let mut row = Vec::with_capacity(columns.len());
            row.push(text_cell(result.title.as_ref()));
            row.push(text_cell(result.uri.as_ref()));
            row.push(value_cell(result.score.as_ref()));
            row.push(record.doc_score.to_string());
            row.push(record.term_contributions.to_string());
            row.push(record.total_score.to_string());
            row.push(value_cell(result.percent_score.as_ref()));
            row.push(text_cell(result.ranking_modifier.as_ref()));
            row.push(value_cell(result.is_recommendation.as_ref()));
            row.extend(Weight::ALL.iter().map(|w| record.weights.get(*w).to_string()));

            for column in &expression_columns {
                row.push(dynamic_cell(record.expression_scores.get(column)));
            }
            for column in &term_columns {
                row.push(dynamic_cell(record.term_scores.get(column)));
            }
            row
        })
        .collect();

    Table { columns, rows }
}

fn dynamic_cell(score: Option<i64>) -> String {
    score.map(|s| s.to_string()).unwrap_or_default()
}
