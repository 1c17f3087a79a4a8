//! `score_json` tagged-union model.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The raw, opaque value a Match carries in `score_json`. Rendering owns the
/// string form; the core only needs to parse set counts for standings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreJson {
    DisplayOnly { text: String },
    Sets { sets: Vec<(i32, i32)> },
    Kv { fields: BTreeMap<String, String> },
}

impl ScoreJson {
    pub fn display(text: impl Into<String>) -> Self {
        ScoreJson::DisplayOnly { text: text.into() }
    }

    pub fn sets(pairs: Vec<(i32, i32)>) -> Self {
        ScoreJson::Sets { sets: pairs }
    }

    /// Human-readable rendering used by `match.score_display` in the wire
    /// contract.
    pub fn to_display_string(&self) -> String {
        match self {
            ScoreJson::DisplayOnly { text } => text.clone(),
            ScoreJson::Sets { sets } => sets
                .iter()
                .map(|(a, b)| format!("{a}-{b}"))
                .collect::<Vec<_>>()
                .join(", "),
            ScoreJson::Kv { fields } => fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Parsed form used by standings computation. `parse_score` returns `None`
/// (with a `SCORE_PARSE_FAILED` warning from the caller) for shapes it
/// cannot interpret as a set count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedScore {
    pub sets_won_a: u32,
    pub sets_won_b: u32,
}

pub fn parse_score(raw: &ScoreJson) -> Option<ParsedScore> {
    match raw {
        ScoreJson::Sets { sets } if !sets.is_empty() => {
            let mut a = 0u32;
            let mut b = 0u32;
            for (sa, sb) in sets {
                match sa.cmp(sb) {
                    std::cmp::Ordering::Greater => a += 1,
                    std::cmp::Ordering::Less => b += 1,
                    std::cmp::Ordering::Equal => {}
                }
            }
            Some(ParsedScore {
                sets_won_a: a,
                sets_won_b: b,
            })
        }
        _ => None,
    }
}

/// Stylized score for a default-weekend finalize, by match duration.
pub fn default_score_for_duration(duration_minutes: u32) -> ScoreJson {
    if duration_minutes <= 35 {
        ScoreJson::sets(vec![(4, 0)])
    } else if duration_minutes <= 60 {
        ScoreJson::sets(vec![(8, 0)])
    } else {
        ScoreJson::sets(vec![(6, 0), (6, 0)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sets_parse_counts_majority() {
        let s = ScoreJson::sets(vec![(6, 4), (3, 6), (6, 2)]);
        let parsed = parse_score(&s).unwrap();
        assert_eq!(parsed.sets_won_a, 2);
        assert_eq!(parsed.sets_won_b, 1);
    }

    #[test]
    fn display_only_does_not_parse() {
        let s = ScoreJson::display("retired");
        assert_eq!(parse_score(&s), None);
    }

    #[test]
    fn empty_sets_does_not_parse() {
        let s = ScoreJson::sets(vec![]);
        assert_eq!(parse_score(&s), None);
    }

    #[test]
    fn default_score_buckets_by_duration() {
        assert_eq!(default_score_for_duration(35), ScoreJson::sets(vec![(4, 0)]));
        assert_eq!(default_score_for_duration(60), ScoreJson::sets(vec![(8, 0)]));
        assert_eq!(
            default_score_for_duration(105),
            ScoreJson::sets(vec![(6, 0), (6, 0)])
        );
    }
}
