//! Canned resolver for tests and offline runs.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::collections::HashMap;
use std::time::Duration;

use super::{Grain, ParseCandidate, TemporalResolver};
use crate::error::{MeetbotError, Result};

/// Returns pre-registered candidates per exact phrase, and nothing otherwise.
#[derive(Debug, Default, Clone)]
pub struct FakeResolver {
    answers: HashMap<String, Vec<ParseCandidate>>,
    delay: Option<Duration>,
    failure: Option<String>,
}

impl FakeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register normalized values for a phrase, in ranking order.
    pub fn with_values(mut self, text: &str, values: &[&str]) -> Self {
        let candidates = values
            .iter()
            .map(|v| ParseCandidate::time(text, 0, text.len(), v.to_string(), Grain::Hour))
            .collect();
        self.answers.insert(text.to_string(), candidates);
        self
    }

    pub fn with_candidates(mut self, text: &str, candidates: Vec<ParseCandidate>) -> Self {
        self.answers.insert(text.to_string(), candidates);
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail every call as if the backend were down.
    pub fn with_failure(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }
}

#[async_trait]
impl TemporalResolver for FakeResolver {
    fn name(&self) -> &str {
        "fake"
    }

    async fn parse(
        &self,
        text: &str,
        _reference: Option<NaiveDateTime>,
    ) -> Result<Vec<ParseCandidate>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = &self.failure {
            return Err(MeetbotError::ResolverUnavailable {
                message: message.clone(),
            });
        }
        Ok(self.answers.get(text).cloned().unwrap_or_default())
    }
}
