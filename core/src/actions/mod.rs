//! Custom actions and their dispatch
//!
//! An [`Action`] reads slots, utters messages through a [`Dispatcher`] and
//! returns the slot events to apply. The [`ActionExecutor`] is the handler
//! boundary: any error an action returns is turned into one user-facing
//! message here, so a failing action never faults the server.

pub mod join;
pub mod schedule;


pub use join::{JoinMeetingAction, MeetingId};
pub use schedule::ScheduleMeetingAction;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::Config;
use crate::dispatcher::{CollectingDispatcher, Dispatcher};
use crate::error::{MeetbotError, Result};
use crate::protocol::{ActionCall, ActionResponse, BotMessage, SlotEvent};
use crate::resolver::TemporalResolver;
use crate::tracker::SlotReader;

/// A handler the dialogue runtime can invoke by name.
#[async_trait]
pub trait Action: Send + Sync {
    /// Registered action name (e.g. "action_join_meeting")
    fn name(&self) -> &str;

    /// Run the action. `domain` is passed through untouched.
    async fn run(
        &self,
        dispatcher: &mut dyn Dispatcher,
        tracker: &dyn SlotReader,
        domain: &serde_json::Value,
    ) -> Result<Vec<SlotEvent>>;
}

/// Actions keyed by name.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, Arc<dyn Action>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with both meeting actions wired to a shared resolver.
    pub fn with_defaults(config: &Config, resolver: Arc<dyn TemporalResolver>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ScheduleMeetingAction::new(
            resolver,
            config.resolver.selection,
            config.resolver.timeout(),
        )));
        registry.register(Arc::new(JoinMeetingAction::new(config.validation.meeting_id)));
        registry
    }

    /// Register an action, replacing any previous one with the same name.
    pub fn register(&mut self, action: Arc<dyn Action>) {
        self.actions.insert(action.name().to_string(), action);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.actions.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Runs action calls against a registry.
#[derive(Clone)]
pub struct ActionExecutor {
    registry: Arc<ActionRegistry>,
}

impl ActionExecutor {
    pub fn new(registry: ActionRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Execute one call. Only an unknown action name is returned as an error;
    /// everything else ends up as messages in the response.
    pub async fn run(&self, call: &ActionCall) -> Result<ActionResponse> {
        let action = self
            .registry
            .get(&call.next_action)
            .ok_or_else(|| MeetbotError::ActionNotFound {
                name: call.next_action.clone(),
            })?;

        let mut dispatcher = CollectingDispatcher::new();
        let events = match action.run(&mut dispatcher, &call.tracker, &call.domain).await {
            Ok(events) => {
                tracing::info!(
                    action = %call.next_action,
                    sender = call.sender_id.as_deref().unwrap_or("-"),
                    events = events.len(),
                    "action completed"
                );
                events
            }
            Err(err) => {
                if err.is_resolver_fault() {
                    tracing::warn!(action = %call.next_action, error = %err, "resolver failure");
                } else {
                    tracing::info!(action = %call.next_action, error = %err, "action needs more input");
                }
                dispatcher.utter_message(err.user_message());
                Vec::new()
            }
        };

        Ok(ActionResponse {
            events,
            responses: dispatcher
                .into_messages()
                .into_iter()
                .map(|text| BotMessage { text })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::testing::FakeResolver;
    use crate::tracker::Tracker;

    fn executor(resolver: FakeResolver) -> ActionExecutor {
        ActionExecutor::new(ActionRegistry::with_defaults(
            &Config::default(),
            Arc::new(resolver),
        ))
    }

    #[test]
    fn test_default_registry() {
        let registry =
            ActionRegistry::with_defaults(&Config::default(), Arc::new(FakeResolver::new()));
        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.names(),
            vec!["action_a_meeting".to_string(), "action_join_meeting".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let call = ActionCall::new("action_order_pizza", Tracker::default());
        let err = executor(FakeResolver::new()).run(&call).await.unwrap_err();
        assert!(matches!(err, MeetbotError::ActionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolver_outage_becomes_message() {
        let tracker = Tracker::default()
            .with_slot("date", Some("tomorrow"))
            .with_slot("time", Some("3pm"));
        let call = ActionCall::new("action_a_meeting", tracker);
        let response = executor(FakeResolver::new().with_failure("connection refused"))
            .run(&call)
            .await
            .unwrap();
        assert_eq!(response.responses.len(), 1);
        assert!(response.events.is_empty());
        assert!(response.responses[0].text.starts_with("I couldn't understand"));
    }

    #[tokio::test]
    async fn test_same_call_twice_is_identical() {
        let resolver = FakeResolver::new()
            .with_values("tomorrow", &["2024-06-02T00:00:00"])
            .with_values("3pm", &["2024-06-01T15:00:00"]);
        let executor = executor(resolver);
        let tracker = Tracker::default()
            .with_slot("date", Some("tomorrow"))
            .with_slot("time", Some("3pm"));
        let call = ActionCall::new("action_a_meeting", tracker);

        let first = executor.run(&call).await.unwrap();
        let second = executor.run(&call).await.unwrap();
        assert_eq!(first, second);
    }
}
