//! Outbound messages from an action to the user.

/// Anything that can deliver a text message back to the user.
pub trait Dispatcher: Send {
    fn utter_message(&mut self, text: String);
}

/// Dispatcher that buffers messages so they can be returned in the webhook
/// response.
#[derive(Debug, Default, Clone)]
pub struct CollectingDispatcher {
    messages: Vec<String>,
}

impl CollectingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl Dispatcher for CollectingDispatcher {
    fn utter_message(&mut self, text: String) {
        tracing::debug!(text = %text, "uttering message");
        self.messages.push(text);
    }
}
