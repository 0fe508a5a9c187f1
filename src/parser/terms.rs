// parser/terms.rs
// Terms-weights section: per-term counters and per-field contributions.

use super::{parse_int, ScoreMap};
use crate::headers::HeaderRegistry;

const TERMS_MARKER: &str = "Terms weights:";
const TERMS_END_MARKER: &str = "Total weight";

/// One `name: value` entry of the section, split on `;`.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TermEntry<'a> {
    /// `<keyword>: <n1>, <n2>` for a term or one of its lexical variants.
    Counts { keyword: &'a str, n1: i64, n2: i64 },
    /// `<field>: <score>` contribution of a field to the current group.
    Field { name: &'a str, score: i64 },
}

#[derive(Debug)]
struct TermGroup {
    is_anchor: bool,
    has_fields: bool,
}

/// Extracts the terms section into `scores` and returns the summed field
/// contributions of every group.
pub(super) fn extract_terms(
    text: &str,
    registry: &mut HeaderRegistry,
    scores: &mut ScoreMap,
) -> i64 {
    let Some(section) = terms_section(text) else {
        return 0;
    };

    let mut contributions = 0i64;
    let mut group: Option<TermGroup> = None;

    for line in section.lines() {
        for (pos, entry) in line.split(';').filter_map(parse_entry).enumerate() {
            match entry {
                TermEntry::Counts { keyword, n1, n2 } => {
                    // A counts entry opens a new group when it leads its line
                    // or follows field lines; otherwise it is a variant.
                    let opens_group = match &group {
                        None => true,
                        Some(current) => pos == 0 || current.has_fields,
                    };
                    if opens_group {
                        group = Some(TermGroup {
                            is_anchor: registry.anchor_or_adopt(keyword) == keyword,
                            has_fields: false,
                        });
                    }
                    record(registry, scores, format!("Term_{keyword}_N1"), n1);
                    record(registry, scores, format!("Term_{keyword}_N2"), n2);
                }
                TermEntry::Field { name, score } => {
                    let Some(current) = group.as_mut() else {
                        tracing::trace!(field = name, "field contribution outside any term group");
                        continue;
                    };
                    current.has_fields = true;
                    contributions = contributions.saturating_add(score);
                    if current.is_anchor {
                        if let Some(anchor) = registry.anchor_keyword() {
                            let column = format!("Term_{anchor}_{name}");
                            record(registry, scores, column, score);
                        }
                    }
                }
            }
        }
    }

    contributions
}

fn record(registry: &mut HeaderRegistry, scores: &mut ScoreMap, column: String, value: i64) {
    registry.record_term_column(&column);
    scores.insert(column, value);
}

fn terms_section(text: &str) -> Option<&str> {
    let start = text.find(TERMS_MARKER)? + TERMS_MARKER.len();
    let body = &text[start..];
    let end = body.find(TERMS_END_MARKER).unwrap_or(body.len());
    Some(&body[..end])
}

fn parse_entry(raw: &str) -> Option<TermEntry<'_>> {
    let (name, value) = raw.rsplit_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    match value.split_once(',') {
        Some((n1, n2)) => Some(TermEntry::Counts {
            keyword: name,
            n1: parse_int(n1)?,
            n2: parse_int(n2)?,
        }),
        None => Some(TermEntry::Field {
            name,
            score: parse_int(value)?,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, registry: &mut HeaderRegistry) -> (i64, ScoreMap) {
        let mut scores = ScoreMap::default();
        let total = extract_terms(text, registry, &mut scores);
        (total, scores)
    }

    #[test]
    fn entries_are_classified() {
        assert_eq!(
            parse_entry(" alpha: 10, 2"),
            Some(TermEntry::Counts { keyword: "alpha", n1: 10, n2: 2 })
        );
        assert_eq!(
            parse_entry("Title: 30 "),
            Some(TermEntry::Field { name: "Title", score: 30 })
        );
        assert_eq!(parse_entry(" "), None);
        assert_eq!(parse_entry(": 4"), None);
        assert_eq!(parse_entry("beta: x, 1"), None);
        assert_eq!(parse_entry("Summary: n/a"), None);
    }

    #[test]
    fn only_anchor_group_fields_become_columns() {
        let mut registry = HeaderRegistry::new();
        let (total, scores) = run(
            "Terms weights:\nalpha: 10, 2; Title: 30;\nbeta: 4, 1; Date: 9;\n",
            &mut registry,
        );

        assert_eq!(total, 39);
        assert_eq!(scores.get("Term_alpha_Title"), Some(30));
        assert_eq!(scores.get("Term_beta_Date"), None);
        assert_eq!(
            registry.sorted_term_columns(),
            vec![
                "Term_alpha_N1",
                "Term_alpha_N2",
                "Term_alpha_Title",
                "Term_beta_N1",
                "Term_beta_N2",
            ]
        );
    }

    #[test]
    fn groups_on_one_line_are_split_after_fields() {
        let mut registry = HeaderRegistry::new();
        let (total, scores) = run(
            "Terms weights: alpha: 10, 2; Title: 30; beta: 4, 1; Date: 9;",
            &mut registry,
        );
        assert_eq!(total, 39);
        assert_eq!(scores.get("Term_beta_N1"), Some(4));
        assert!(!registry.sorted_term_columns().contains(&"Term_alpha_Date".to_string()));
    }

    #[test]
    fn variants_share_the_primary_group() {
        let mut registry = HeaderRegistry::new();
        let (total, scores) = run(
            "Terms weights:\nrun: 5, 3; running: 2, 1;\nTitle: 7; URI: 1;\nTotal weight: 8",
            &mut registry,
        );
        assert_eq!(total, 8);
        assert_eq!(scores.get("Term_running_N2"), Some(1));
        assert_eq!(scores.get("Term_run_URI"), Some(1));
        assert_eq!(registry.anchor_keyword(), Some("run"));
    }

    #[test]
    fn anchor_carries_across_records_in_a_run() {
        let mut registry = HeaderRegistry::new();
        run("Terms weights:\nalpha: 1, 1;\nTitle: 3;", &mut registry);
        let (total, scores) = run("Terms weights:\nbeta: 2, 2;\nTitle: 4;", &mut registry);

        assert_eq!(total, 4);
        assert_eq!(scores.get("Term_beta_Title"), None);
        assert_eq!(scores.get("Term_beta_N1"), Some(2));
    }

    #[test]
    fn section_stops_at_total_weight() {
        let mut registry = HeaderRegistry::new();
        let (total, _) = run(
            "Terms weights:\nalpha: 1, 1;\nTitle: 3;\n\nTotal weight: 3\nTitle: 100;",
            &mut registry,
        );
        assert_eq!(total, 3);
    }

    #[test]
    fn fields_before_any_group_are_ignored() {
        let mut registry = HeaderRegistry::new();
        let (total, scores) = run("Terms weights:\nTitle: 3;\n", &mut registry);
        assert_eq!(total, 0);
        assert!(scores.is_empty());
        assert!(registry.is_empty());
    }
}
