//! Client for an external Duckling HTTP server.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::time::Duration;

use super::{ParseCandidate, TemporalResolver};
use crate::config::ResolverConfig;
use crate::error::{MeetbotError, Result};

pub struct DucklingResolver {
    client: reqwest::Client,
    url: String,
    locale: String,
    timezone: Option<String>,
}

impl DucklingResolver {
    pub fn new(url: impl Into<String>, locale: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MeetbotError::ResolverUnavailable {
                message: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            locale: locale.into(),
            timezone: None,
        })
    }

    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        let url = config
            .duckling_url
            .clone()
            .ok_or_else(|| MeetbotError::InvalidConfig {
                message: "resolver.duckling_url is required for the duckling backend".to_string(),
            })?;
        let mut resolver = Self::new(url, config.locale.clone(), config.timeout())?;
        resolver.timezone = config.timezone.clone();
        Ok(resolver)
    }

    pub fn with_timezone(mut self, tz: impl Into<String>) -> Self {
        self.timezone = Some(tz.into());
        self
    }

    fn form(&self, text: &str, reference: Option<NaiveDateTime>) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("text", text.to_string()),
            ("locale", self.locale.clone()),
            ("dims", r#"["time"]"#.to_string()),
        ];
        if let Some(tz) = &self.timezone {
            form.push(("tz", tz.clone()));
        }
        if let Some(reference) = reference {
            form.push(("reftime", reference.and_utc().timestamp_millis().to_string()));
        }
        form
    }
}

#[async_trait]
impl TemporalResolver for DucklingResolver {
    fn name(&self) -> &str {
        "duckling"
    }

    async fn parse(
        &self,
        text: &str,
        reference: Option<NaiveDateTime>,
    ) -> Result<Vec<ParseCandidate>> {
        let url = format!("{}/parse", self.url);
        let response = self
            .client
            .post(&url)
            .form(&self.form(text, reference))
            .send()
            .await
            .map_err(|e| MeetbotError::ResolverUnavailable {
                message: format!("request to {} failed: {}", url, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MeetbotError::ResolverUnavailable {
                message: format!("duckling returned {}: {}", status, body),
            });
        }

        let candidates: Vec<ParseCandidate> =
            response
                .json()
                .await
                .map_err(|e| MeetbotError::ResolverUnavailable {
                    message: format!("invalid duckling response: {}", e),
                })?;

        // older servers ignore `dims`
        Ok(candidates.into_iter().filter(|c| c.dim == "time").collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverBackend;

    #[test]
    fn test_form_fields() {
        let resolver = DucklingResolver::new("http://localhost:8000/", "en_GB", Duration::from_secs(1))
            .unwrap()
            .with_timezone("Europe/London");
        let reference = chrono::NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let form = resolver.form("tomorrow", Some(reference));
        assert_eq!(resolver.url, "http://localhost:8000");
        assert!(form.contains(&("text", "tomorrow".to_string())));
        assert!(form.contains(&("tz", "Europe/London".to_string())));
        assert!(form.contains(&("reftime", "1717200000000".to_string())));
    }

    #[test]
    fn test_from_config_requires_url() {
        let config = ResolverConfig {
            backend: ResolverBackend::Duckling,
            duckling_url: None,
            ..ResolverConfig::default()
        };
        assert!(matches!(
            DucklingResolver::from_config(&config),
            Err(MeetbotError::InvalidConfig { .. })
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_unavailable() {
        let resolver =
            DucklingResolver::new("http://127.0.0.1:9", "en_US", Duration::from_millis(500)).unwrap();
        let err = resolver.parse("tomorrow", None).await.unwrap_err();
        assert!(err.is_resolver_fault());
    }
}
