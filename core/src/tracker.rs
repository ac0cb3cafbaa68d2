//! Conversation state as seen by an action
//!
//! The dialogue runtime owns the conversation; actions only need to read slot
//! values, so they depend on [`SlotReader`] rather than the full tracker.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read access to the slots collected so far.
pub trait SlotReader: Sync {
    /// Current value of a slot. Absent, null and blank values are all `None`.
    fn get_slot(&self, name: &str) -> Option<String>;
}

/// Tracker snapshot sent by the dialogue runtime with each action call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tracker {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,

    /// Slot name -> raw JSON value. Entity extraction may fill slots with
    /// numbers or lists as well as strings.
    #[serde(default)]
    pub slots: HashMap<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_message: Option<serde_json::Value>,
}

impl Tracker {
    pub fn new(sender_id: impl Into<String>) -> Self {
        Self {
            sender_id: Some(sender_id.into()),
            ..Self::default()
        }
    }

    /// Build a tracker from `(name, value)` pairs.
    pub fn from_slots<I, K, V>(slots: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            slots: slots
                .into_iter()
                .map(|(k, v)| (k.into(), serde_json::Value::String(v.into())))
                .collect(),
            ..Self::default()
        }
    }

    pub fn with_slot(mut self, name: impl Into<String>, value: Option<&str>) -> Self {
        let value = match value {
            Some(v) => serde_json::Value::String(v.to_string()),
            None => serde_json::Value::Null,
        };
        self.slots.insert(name.into(), value);
        self
    }
}

impl SlotReader for Tracker {
    fn get_slot(&self, name: &str) -> Option<String> {
        let text = match self.slots.get(name)? {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            // list-valued slots keep the most recent extraction
            serde_json::Value::Array(items) => match items.last()? {
                serde_json::Value::String(s) => s.clone(),
                serde_json::Value::Number(n) => n.to_string(),
                _ => return None,
            },
            _ => return None,
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

impl SlotReader for HashMap<String, String> {
    fn get_slot(&self, name: &str) -> Option<String> {
        self.get(name)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }
}
