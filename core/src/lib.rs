pub mod actions;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod output;
pub mod protocol;
pub mod resolver;
pub mod tracker;

// Re-exports for convenience
pub use actions::{ActionExecutor, ActionRegistry};
pub use config::Config;
pub use error::{MeetbotError, Result};
pub use resolver::{build_resolver, TemporalResolver};
