use serde::{Deserialize, Serialize};

use crate::tracker::Tracker;

/// Action call posted by the dialogue runtime to the webhook.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActionCall {
    pub next_action: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    #[serde(default)]
    pub tracker: Tracker,
    /// Opaque to the handlers.
    #[serde(default)]
    pub domain: serde_json::Value,
    #[serde(default)]
    pub version: Option<String>,
}

impl ActionCall {
    pub fn new(next_action: impl Into<String>, tracker: Tracker) -> Self {
        Self {
            next_action: next_action.into(),
            sender_id: tracker.sender_id.clone(),
            tracker,
            domain: serde_json::Value::Null,
            version: None,
        }
    }
}

/// Slot mutation requested by a finished action.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SlotEvent {
    #[serde(rename = "slot")]
    SlotSet {
        name: String,
        value: Option<String>,
    },
}

impl SlotEvent {
    /// Reset a slot to absent for the next turn.
    pub fn clear(name: impl Into<String>) -> Self {
        Self::SlotSet {
            name: name.into(),
            value: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BotMessage {
    pub text: String,
}

/// Successful webhook reply.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct ActionResponse {
    pub events: Vec<SlotEvent>,
    pub responses: Vec<BotMessage>,
}

impl ActionResponse {
    pub fn texts(&self) -> Vec<&str> {
        self.responses.iter().map(|m| m.text.as_str()).collect()
    }
}

/// Webhook reply when the call could not be dispatched at all.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActionErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ActionInfo {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_event_wire_shape() {
        let json = serde_json::to_value(SlotEvent::clear("date")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "slot", "name": "date", "value": null})
        );
    }

    #[test]
    fn test_action_call_from_runtime_payload() {
        let call: ActionCall = serde_json::from_value(serde_json::json!({
            "next_action": "action_join_meeting",
            "sender_id": "abc",
            "tracker": {
                "sender_id": "abc",
                "slots": {"meeting_id": "123456789"},
                "latest_message": {"text": "join 123456789"},
                "events": []
            },
            "domain": {"slots": {}},
            "version": "3.6.0"
        }))
        .unwrap();
        assert_eq!(call.next_action, "action_join_meeting");
        assert_eq!(call.tracker.slots.len(), 1);
    }
}
