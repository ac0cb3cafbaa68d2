use async_trait::async_trait;

use super::Action;
use crate::config::IdValidation;
use crate::dispatcher::Dispatcher;
use crate::error::{MeetbotError, Result};
use crate::protocol::SlotEvent;
use crate::tracker::SlotReader;

pub const MEETING_ID_SLOT: &str = "meeting_id";

const ID_LEN: usize = 9;

/// A meeting identifier in its `XXX-XXX-XXX` display form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingId {
    display: String,
}

impl MeetingId {
    pub fn parse(raw: &str, validation: IdValidation) -> Result<Self> {
        match validation {
            IdValidation::Strict => {
                let digits = raw.trim();
                if digits.len() != ID_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(MeetbotError::MalformedIdentifier {
                        raw: raw.to_string(),
                    });
                }
                Ok(Self::group(digits))
            }
            IdValidation::Lenient => Ok(Self::group(raw)),
        }
    }

    /// First three chars, next three, then the remainder. Short input yields
    /// short or empty groups.
    fn group(raw: &str) -> Self {
        let chars: Vec<char> = raw.chars().collect();
        let part = |from: usize, to: usize| -> String {
            chars[from.min(chars.len())..to.min(chars.len())].iter().collect()
        };
        Self {
            display: format!("{}-{}-{}", part(0, 3), part(3, 6), part(6, chars.len())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.display
    }
}

impl std::fmt::Display for MeetingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display)
    }
}

/// Asks to be added to a meeting by its identifier.
pub struct JoinMeetingAction {
    validation: IdValidation,
}

impl JoinMeetingAction {
    pub fn new(validation: IdValidation) -> Self {
        Self { validation }
    }
}

#[async_trait]
impl Action for JoinMeetingAction {
    fn name(&self) -> &str {
        "action_join_meeting"
    }

    async fn run(
        &self,
        dispatcher: &mut dyn Dispatcher,
        tracker: &dyn SlotReader,
        _domain: &serde_json::Value,
    ) -> Result<Vec<SlotEvent>> {
        let raw = tracker
            .get_slot(MEETING_ID_SLOT)
            .ok_or_else(|| MeetbotError::MissingInput {
                guidance: "please provide meeting id to join the meeting".to_string(),
            })?;

        let id = MeetingId::parse(&raw, self.validation)?;
        dispatcher.utter_message(format!("add me into meeting {}", id));

        Ok(vec![SlotEvent::clear(MEETING_ID_SLOT)])
    }
}
