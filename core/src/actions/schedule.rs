use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use super::Action;
use crate::dispatcher::Dispatcher;
use crate::error::{MeetbotError, Result};
use crate::protocol::SlotEvent;
use crate::resolver::{
    resolve_normalized, CandidateSelection, ResolveOptions, TemporalField, TemporalResolver,
};
use crate::tracker::SlotReader;

pub const DATE_SLOT: &str = "date";
pub const TIME_SLOT: &str = "time";

/// Confirms a meeting once both a date and a time phrase are known.
pub struct ScheduleMeetingAction {
    resolver: Arc<dyn TemporalResolver>,
    options: ResolveOptions,
}

impl ScheduleMeetingAction {
    pub fn new(
        resolver: Arc<dyn TemporalResolver>,
        selection: CandidateSelection,
        timeout: Duration,
    ) -> Self {
        Self {
            resolver,
            options: ResolveOptions { selection, timeout },
        }
    }

    fn missing_guidance(has_date: bool, has_time: bool) -> &'static str {
        match (has_date, has_time) {
            (false, false) => "please provide date and time of meeting",
            (false, true) => "please provide date of meeting",
            _ => "please provide time of meeting",
        }
    }
}

#[async_trait]
impl Action for ScheduleMeetingAction {
    fn name(&self) -> &str {
        "action_a_meeting"
    }

    async fn run(
        &self,
        dispatcher: &mut dyn Dispatcher,
        tracker: &dyn SlotReader,
        _domain: &serde_json::Value,
    ) -> Result<Vec<SlotEvent>> {
        let (date, time) = match (tracker.get_slot(DATE_SLOT), tracker.get_slot(TIME_SLOT)) {
            (Some(date), Some(time)) => (date, time),
            (date, time) => {
                return Err(MeetbotError::MissingInput {
                    guidance: Self::missing_guidance(date.is_some(), time.is_some()).to_string(),
                })
            }
        };

        let resolver = self.resolver.as_ref();
        let date_value = resolve_normalized(resolver, TemporalField::Date, &date, self.options).await?;
        let time_value = resolve_normalized(resolver, TemporalField::Time, &time, self.options).await?;

        dispatcher.utter_message(format!(
            "Date and time of meeting is {} and {}",
            date_value.display_date(),
            time_value.time_text
        ));

        Ok(vec![SlotEvent::clear(DATE_SLOT), SlotEvent::clear(TIME_SLOT)])
    }
}
