// parser/mod.rs
// Turns the free-form `rankingInfo` text attached to a search result into a
// `DiagnosticRecord`. Parsing is total: missing sections or malformed lines
// contribute nothing. Discovered column names go into the run's registry.

mod terms;

use crate::headers::HeaderRegistry;
use regex::Regex;
use std::sync::LazyLock;

/// Prefix of every column synthesized from a query-rewrite expression.
pub const EXPRESSION_PREFIX: &str = "RI_QRE_Expression_";

const EXPRESSION_NAME_LIMIT: usize = 50;
const QRE_MARKER: &str = "QRE:";
const SECTION_MARKERS: [&str; 3] = ["Terms weights:", "Total weight", "Document weights:"];

/// The labeled document weights found in a diagnostic text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Weight {
    Title,
    Quality,
    Date,
    Adjacency,
    Source,
    Custom,
    Qre,
    RankingFunctions,
}

impl Weight {
    pub const ALL: [Weight; 8] = [
        Weight::Title,
        Weight::Quality,
        Weight::Date,
        Weight::Adjacency,
        Weight::Source,
        Weight::Custom,
        Weight::Qre,
        Weight::RankingFunctions,
    ];

    /// Label as it appears in the diagnostic text.
    pub fn label(self) -> &'static str {
        match self {
            Weight::Title => "Title",
            Weight::Quality => "Quality",
            Weight::Date => "Date",
            Weight::Adjacency => "Adjacency",
            Weight::Source => "Source",
            Weight::Custom => "Custom",
            Weight::Qre => "QRE",
            Weight::RankingFunctions => "Ranking functions",
        }
    }

    /// Fixed table column holding this weight.
    pub fn column(self) -> &'static str {
        match self {
            Weight::Title => "RI_Title",
            Weight::Quality => "RI_Quality",
            Weight::Date => "RI_Date",
            Weight::Adjacency => "RI_Adjacency",
            Weight::Source => "RI_Source",
            Weight::Custom => "RI_Custom",
            Weight::Qre => "RI_QRE",
            Weight::RankingFunctions => "RI_RankingFunctions",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One extraction rule per labeled weight: first `<Label>: <int>` wins.
///
/// Labels only match at a word start, so `LastUpdateDate: 3` is not `Date`.
/// `Ranking functions` also names a section, so its weight must end in `;`.
static WEIGHT_RULES: LazyLock<Vec<(Weight, Regex)>> = LazyLock::new(|| {
    Weight::ALL
        .iter()
        .map(|&weight| {
            let label = regex::escape(weight.label());
            let pattern = match weight {
                Weight::RankingFunctions => format!(r"(?i)\b{label}:\s*(-?\d+);"),
                _ => format!(r"\b{label}:\s*(-?\d+)"),
            };
            let re = Regex::new(&pattern).expect("static regex must compile");
            (weight, re)
        })
        .collect()
});

static EXPRESSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Expression:\s*"(.*?)"\s*Score:\s*(-?\d+)"#)
        .expect("static regex must compile")
});

static RANKING_FUNCTIONS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bRanking functions:").expect("static regex must compile")
});

/// The eight scalar document weights of a record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScalarWeights {
    values: [i64; 8],
}

impl ScalarWeights {
    pub fn get(&self, weight: Weight) -> i64 {
        self.values[weight.index()]
    }

    fn set(&mut self, weight: Weight, value: i64) {
        self.values[weight.index()] = value;
    }

    pub fn sum(&self) -> i64 {
        self.values.iter().fold(0i64, |acc, v| acc.saturating_add(*v))
    }
}

/// Column name to score, kept in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreMap(Vec<(String, i64)>);

impl ScoreMap {
    /// Inserts or overwrites the score stored under `column`.
    pub fn insert(&mut self, column: String, score: i64) {
        match self.0.iter_mut().find(|(name, _)| *name == column) {
            Some(entry) => entry.1 = score,
            None => self.0.push((column, score)),
        }
    }

    pub fn get(&self, column: &str) -> Option<i64> {
        self.0
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, score)| *score)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.0.iter().map(|(name, score)| (name.as_str(), *score))
    }
}

/// Structured view of one result's diagnostic text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub weights: ScalarWeights,
    pub expression_scores: ScoreMap,
    pub term_scores: ScoreMap,
    pub doc_score: i64,
    pub term_contributions: i64,
    pub total_score: i64,
}

/// Parses a diagnostic text, registering every dynamic column it produces.
///
/// `None` and empty input yield an all-zero record.
pub fn parse(text: Option<&str>, registry: &mut HeaderRegistry) -> DiagnosticRecord {
    let mut record = DiagnosticRecord::default();
    let text = match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => return record,
    };

    record.weights = extract_weights(text);
    record.doc_score = record.weights.sum();

    for (column, score) in extract_expressions(text) {
        registry.record_expression_column(&column);
        record.expression_scores.insert(column, score);
    }

    record.term_contributions = terms::extract_terms(text, registry, &mut record.term_scores);
    record.total_score = record.doc_score.saturating_add(record.term_contributions);

    tracing::trace!(
        doc_score = record.doc_score,
        term_contributions = record.term_contributions,
        expressions = record.expression_scores.len(),
        "parsed diagnostic text"
    );
    record
}

fn extract_weights(text: &str) -> ScalarWeights {
    let mut weights = ScalarWeights::default();
    for (weight, re) in WEIGHT_RULES.iter() {
        let value = re
            .captures(text)
            .and_then(|caps| parse_int(&caps[1]))
            .unwrap_or(0);
        weights.set(*weight, value);
    }
    weights
}

/// Returns `(column, score)` for every expression in the QRE section.
fn extract_expressions(text: &str) -> Vec<(String, i64)> {
    let Some(section) = qre_section(text) else {
        return Vec::new();
    };

    EXPRESSION_RE
        .captures_iter(section)
        .enumerate()
        .filter_map(|(idx, caps)| {
            let score = parse_int(&caps[2])?;
            Some((expression_column(&caps[1], idx + 1), score))
        })
        .collect()
}

/// True when `rest` opens with an integer, i.e. the label before it is a
/// weight rather than a section header.
fn starts_with_int(rest: &str) -> bool {
    matches!(rest.trim_start().chars().next(), Some(c) if c.is_ascii_digit() || c == '-')
}

/// The QRE section starts at a `QRE:` marker that is not the `QRE: <int>`
/// document weight, and stops at the next section marker.
fn qre_section(text: &str) -> Option<&str> {
    let start = text
        .match_indices(QRE_MARKER)
        .map(|(idx, _)| idx + QRE_MARKER.len())
        .find(|&end| !starts_with_int(&text[end..]))?;

    let body = &text[start..];
    let ranking_functions = RANKING_FUNCTIONS_RE
        .find_iter(body)
        .find(|m| !starts_with_int(&body[m.end()..]))
        .map(|m| m.start());
    let end = SECTION_MARKERS
        .iter()
        .filter_map(|marker| body.find(marker))
        .chain(ranking_functions)
        .min()
        .unwrap_or(body.len());
    Some(&body[..end])
}

/// Synthesizes the column name for a query-rewrite expression.
pub fn expression_column(raw: &str, ordinal: usize) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '@' | '"'))
        .map(|c| if c == '=' { '_' } else { c })
        .take(EXPRESSION_NAME_LIMIT)
        .collect();
    let name = cleaned.trim();
    if name.is_empty() {
        format!("{EXPRESSION_PREFIX}Unnamed_QRE_{ordinal}")
    } else {
        format!("{EXPRESSION_PREFIX}{name}")
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok()
}
