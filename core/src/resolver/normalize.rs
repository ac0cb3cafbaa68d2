//! Shared resolution helper used by every action that reads a temporal slot.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::time::Duration;

use super::candidate::CandidateSelection;
use super::TemporalResolver;
use crate::error::{MeetbotError, Result};

/// Which slot a phrase came from. Only used to word errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalField {
    Date,
    Time,
}

impl std::fmt::Display for TemporalField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemporalField::Date => write!(f, "date"),
            TemporalField::Time => write!(f, "time"),
        }
    }
}

/// A resolver value split into its calendar date and its time-of-day text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedValue {
    pub date: NaiveDate,
    /// Everything after the date portion, verbatim (e.g. `T15:00:00.000-07:00`).
    pub time_text: String,
}

impl NormalizedValue {
    /// Decompose an ISO-8601 date-time as produced by a resolver.
    ///
    /// Both naive (`2024-06-01T15:00:00`) and offset
    /// (`2024-06-01T15:00:00.000-07:00`) values are accepted. Anything else,
    /// including date-only values, is rejected.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = DateTime::parse_from_rfc3339(raw).is_ok()
            || NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").is_ok();
        if !valid {
            return None;
        }

        let date_part = raw.get(..10)?;
        let tail = raw.get(10..)?;
        let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
        if !tail.starts_with('T') {
            return None;
        }

        Some(Self {
            date,
            time_text: tail.to_string(),
        })
    }

    /// Date rendered day first.
    pub fn display_date(&self) -> String {
        self.date.format("%d/%m/%Y").to_string()
    }
}

/// Knobs for [`resolve_normalized`].
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions {
    pub selection: CandidateSelection,
    pub timeout: Duration,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            selection: CandidateSelection::default(),
            timeout: Duration::from_millis(2000),
        }
    }
}

/// Resolve a phrase and decompose the selected candidate.
pub async fn resolve_normalized(
    resolver: &dyn TemporalResolver,
    field: TemporalField,
    text: &str,
    options: ResolveOptions,
) -> Result<NormalizedValue> {
    let candidates = tokio::time::timeout(options.timeout, resolver.parse(text, None))
        .await
        .map_err(|_| MeetbotError::ResolverTimeout {
            field,
            duration: options.timeout,
        })??;

    tracing::debug!(
        resolver = resolver.name(),
        %field,
        text,
        candidates = candidates.len(),
        "resolved phrase"
    );

    let candidate = options.selection.select(&candidates).ok_or_else(|| {
        MeetbotError::UnresolvableExpression {
            field,
            text: text.to_string(),
        }
    })?;

    let raw = candidate
        .normalized()
        .ok_or_else(|| MeetbotError::MalformedNormalizedValue {
            field,
            value: format!("{} candidate without a value", candidate.value.kind.as_deref().unwrap_or("untyped")),
        })?;

    NormalizedValue::parse(raw).ok_or_else(|| MeetbotError::MalformedNormalizedValue {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testing::FakeResolver;
    use crate::resolver::{Grain, ParseCandidate};

    #[test]
    fn test_parse_naive_value() {
        let value = NormalizedValue::parse("2024-06-02T00:00:00").unwrap();
        assert_eq!(value.display_date(), "02/06/2024");
        assert_eq!(value.time_text, "T00:00:00");
    }

    #[test]
    fn test_parse_offset_value_keeps_tail_verbatim() {
        let value = NormalizedValue::parse("2024-06-01T15:00:00.000-07:00").unwrap();
        assert_eq!(value.display_date(), "01/06/2024");
        assert_eq!(value.time_text, "T15:00:00.000-07:00");
    }

    #[test]
    fn test_parse_rejects_short_or_odd_values() {
        assert!(NormalizedValue::parse("2024-06").is_none());
        assert!(NormalizedValue::parse("2024-06-02").is_none());
        assert!(NormalizedValue::parse("02/06/2024 15:00").is_none());
        assert!(NormalizedValue::parse("").is_none());
    }

    #[tokio::test]
    async fn test_empty_candidates_are_unresolvable() {
        let resolver = FakeResolver::new();
        let err = resolve_normalized(&resolver, TemporalField::Date, "blah", ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MeetbotError::UnresolvableExpression { field: TemporalField::Date, .. }
        ));
    }

    #[tokio::test]
    async fn test_last_candidate_is_used() {
        let resolver = FakeResolver::new()
            .with_values("tomorrow 3pm", &["2024-06-01T15:00:00", "2024-06-02T15:00:00"]);
        let value = resolve_normalized(
            &resolver,
            TemporalField::Date,
            "tomorrow 3pm",
            ResolveOptions::default(),
        )
        .await
        .unwrap();
        assert_eq!(value.display_date(), "02/06/2024");
    }

    #[tokio::test]
    async fn test_short_value_is_malformed() {
        let resolver = FakeResolver::new().with_values("june", &["2024-06"]);
        let err = resolve_normalized(&resolver, TemporalField::Date, "june", ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, MeetbotError::MalformedNormalizedValue { .. }));
    }

    #[tokio::test]
    async fn test_interval_candidate_is_malformed() {
        let mut interval = ParseCandidate::time("afternoon", 0, 9, String::new(), Grain::Hour);
        interval.value.value = None;
        interval.value.kind = Some("interval".to_string());
        let resolver = FakeResolver::new().with_candidates("afternoon", vec![interval]);
        let err = resolve_normalized(&resolver, TemporalField::Time, "afternoon", ResolveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MeetbotError::MalformedNormalizedValue { field: TemporalField::Time, .. }
        ));
    }

    #[tokio::test]
    async fn test_slow_resolver_times_out() {
        let resolver = FakeResolver::new()
            .with_values("tomorrow", &["2024-06-02T00:00:00"])
            .with_delay(Duration::from_millis(200));
        let options = ResolveOptions {
            timeout: Duration::from_millis(10),
            ..ResolveOptions::default()
        };
        let err = resolve_normalized(&resolver, TemporalField::Date, "tomorrow", options)
            .await
            .unwrap_err();
        assert!(matches!(err, MeetbotError::ResolverTimeout { .. }));
    }
}
