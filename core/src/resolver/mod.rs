//! Temporal resolution
//!
//! A [`TemporalResolver`] turns a free-text date/time phrase into ranked
//! [`ParseCandidate`]s. Resolvers are expensive to set up (rule tables, HTTP
//! clients) and are built once per process by [`build_resolver`], then shared
//! across handlers as `Arc<dyn TemporalResolver>`.

pub mod candidate;
pub mod duckling;
pub mod normalize;
pub mod rules;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use candidate::{CandidateSelection, CandidateValue, Grain, ParseCandidate};
pub use duckling::DucklingResolver;
pub use normalize::{resolve_normalized, NormalizedValue, ResolveOptions, TemporalField};
pub use rules::RuleResolver;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

use crate::config::{ResolverBackend, ResolverConfig};
use crate::error::Result;

/// Natural-language date/time parser.
///
/// Implementations must be read-only after construction: the same instance
/// serves concurrent calls.
#[async_trait]
pub trait TemporalResolver: Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &str;

    /// Parse `text`, relative to `reference` (or the resolver's own notion of
    /// now). An empty vector means nothing in the phrase was understood.
    async fn parse(
        &self,
        text: &str,
        reference: Option<NaiveDateTime>,
    ) -> Result<Vec<ParseCandidate>>;
}

/// Build the resolver selected in configuration.
pub fn build_resolver(config: &ResolverConfig) -> Result<Arc<dyn TemporalResolver>> {
    let resolver: Arc<dyn TemporalResolver> = match config.backend {
        ResolverBackend::Builtin => Arc::new(RuleResolver::new()?),
        ResolverBackend::Duckling => Arc::new(DucklingResolver::from_config(config)?),
    };
    tracing::info!(backend = resolver.name(), "temporal resolver ready");
    Ok(resolver)
}
