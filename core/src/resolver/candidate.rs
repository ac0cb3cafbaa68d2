//! Parse candidates and the policy used to pick one of them.

use serde::{Deserialize, Serialize};

/// Resolution of a candidate value, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Grain {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl std::fmt::Display for Grain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grain::Second => "second",
            Grain::Minute => "minute",
            Grain::Hour => "hour",
            Grain::Day => "day",
            Grain::Week => "week",
            Grain::Month => "month",
            Grain::Quarter => "quarter",
            Grain::Year => "year",
        };
        write!(f, "{}", s)
    }
}

/// Normalized payload of a candidate.
///
/// Interval candidates carry `from`/`to` bounds instead of a single value, so
/// `value` is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateValue {
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub grain: Option<Grain>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

/// One interpretation of an input phrase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseCandidate {
    pub body: String,
    #[serde(default)]
    pub start: usize,
    #[serde(default)]
    pub end: usize,
    pub dim: String,
    #[serde(default)]
    pub latent: bool,
    pub value: CandidateValue,
}

impl ParseCandidate {
    pub fn time(body: impl Into<String>, start: usize, end: usize, value: String, grain: Grain) -> Self {
        Self {
            body: body.into(),
            start,
            end,
            dim: "time".to_string(),
            latent: false,
            value: CandidateValue {
                value: Some(value),
                grain: Some(grain),
                kind: Some("value".to_string()),
            },
        }
    }

    pub fn normalized(&self) -> Option<&str> {
        self.value.value.as_deref()
    }

    pub fn grain(&self) -> Option<Grain> {
        self.value.grain
    }
}

/// Which candidate is authoritative when a phrase has several parses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSelection {
    /// Last in the resolver's ordering. Resolvers append the widest, most
    /// complete reading last.
    #[default]
    Last,
    First,
    /// Finest grain wins; ties go to the later candidate.
    FinestGrain,
}

impl CandidateSelection {
    pub fn select<'a>(&self, candidates: &'a [ParseCandidate]) -> Option<&'a ParseCandidate> {
        match self {
            CandidateSelection::Last => candidates.last(),
            CandidateSelection::First => candidates.first(),
            CandidateSelection::FinestGrain => candidates
                .iter()
                .enumerate()
                // max_by_key keeps the last maximum, so later candidates win ties
                .max_by_key(|(idx, c)| {
                    let rank = c.grain().map(|g| Grain::Year as u8 - g as u8 + 1).unwrap_or(0);
                    (rank, *idx)
                })
                .map(|(_, c)| c),
        }
    }
}

impl std::str::FromStr for CandidateSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last" => Ok(CandidateSelection::Last),
            "first" => Ok(CandidateSelection::First),
            "finest_grain" | "finest" => Ok(CandidateSelection::FinestGrain),
            other => Err(format!("unknown candidate selection: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(body: &str, value: &str, grain: Grain) -> ParseCandidate {
        ParseCandidate::time(body, 0, body.len(), value.to_string(), grain)
    }

    #[test]
    fn test_selection_policies() {
        let candidates = vec![
            cand("3pm", "2024-06-01T15:00:00", Grain::Hour),
            cand("tomorrow", "2024-06-02T00:00:00", Grain::Day),
        ];

        let last = CandidateSelection::Last.select(&candidates).unwrap();
        assert_eq!(last.body, "tomorrow");

        let first = CandidateSelection::First.select(&candidates).unwrap();
        assert_eq!(first.body, "3pm");

        let finest = CandidateSelection::FinestGrain.select(&candidates).unwrap();
        assert_eq!(finest.body, "3pm");
    }

    #[test]
    fn test_finest_grain_tie_prefers_later() {
        let candidates = vec![
            cand("a", "2024-06-01T15:00:00", Grain::Hour),
            cand("b", "2024-06-01T16:00:00", Grain::Hour),
        ];
        let chosen = CandidateSelection::FinestGrain.select(&candidates).unwrap();
        assert_eq!(chosen.body, "b");
    }

    #[test]
    fn test_empty_candidates_select_nothing() {
        assert!(CandidateSelection::Last.select(&[]).is_none());
        assert!(CandidateSelection::FinestGrain.select(&[]).is_none());
    }

    #[test]
    fn test_duckling_interval_payload() {
        let json = serde_json::json!([{
            "body": "this afternoon",
            "start": 0,
            "end": 14,
            "dim": "time",
            "latent": false,
            "value": {
                "type": "interval",
                "from": {"value": "2024-06-01T12:00:00.000-07:00", "grain": "hour"},
                "to": {"value": "2024-06-01T19:00:00.000-07:00", "grain": "hour"}
            }
        }]);
        let candidates: Vec<ParseCandidate> = serde_json::from_value(json).unwrap();
        assert_eq!(candidates[0].normalized(), None);
        assert_eq!(candidates[0].value.kind.as_deref(), Some("interval"));
    }
}
