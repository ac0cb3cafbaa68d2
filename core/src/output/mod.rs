//! Output formatting module
//!
//! Colored terminal rendering of action results and resolver candidates for
//! the CLI.

use console::Style;

use crate::config::Config;
use crate::protocol::{ActionResponse, SlotEvent};
use crate::resolver::ParseCandidate;

/// Output formatter for CLI results
pub struct OutputFormatter {
    blue: Style,
    green: Style,
    yellow: Style,
    bold: Style,
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self {
            blue: Style::new().blue(),
            green: Style::new().green(),
            yellow: Style::new().yellow(),
            bold: Style::new().bold(),
        }
    }
}

impl OutputFormatter {
    /// Create a new formatter
    pub fn new() -> Self {
        Self::default()
    }

    /// Print the messages and slot events of one action run
    pub fn print_action_response(&self, action: &str, response: &ActionResponse) {
        println!();
        println!("{}", self.bold.apply_to(format!("{}:", action)));
        for message in &response.responses {
            println!("  {} {}", self.green.apply_to(">"), message.text);
        }
        if response.events.is_empty() {
            println!("  {}", self.yellow.apply_to("(no slot changes)"));
        }
        for event in &response.events {
            match event {
                SlotEvent::SlotSet { name, value: None } => {
                    println!("  {} {}", self.blue.apply_to("clear"), name);
                }
                SlotEvent::SlotSet { name, value: Some(value) } => {
                    println!("  {} {} = {}", self.blue.apply_to("set"), name, value);
                }
            }
        }
    }

    /// Print resolver candidates in ranking order
    pub fn print_candidates(&self, text: &str, candidates: &[ParseCandidate]) {
        println!();
        println!("{}", self.bold.apply_to(format!("Candidates for {:?}:", text)));
        if candidates.is_empty() {
            println!("  {}", self.yellow.apply_to("(none)"));
            return;
        }
        for (i, candidate) in candidates.iter().enumerate() {
            println!(
                "  {}. {:<24} {:<8} {}",
                i + 1,
                self.green.apply_to(candidate.normalized().unwrap_or("-")),
                candidate.grain().map(|g| g.to_string()).unwrap_or_default(),
                self.blue.apply_to(&candidate.body)
            );
        }
    }

    /// Print registered action names
    pub fn print_actions(&self, names: &[String]) {
        println!();
        println!("{}", self.bold.apply_to("Registered actions:"));
        for name in names {
            println!("  - {}", self.green.apply_to(name));
        }
    }

    /// Print the effective configuration
    pub fn print_config(&self, config: &Config) {
        println!();
        println!("{}", self.bold.apply_to("Current Configuration:"));
        println!("- Bind: {}", self.green.apply_to(&config.server.bind));
        println!("- Resolver: {:?}", config.resolver.backend);
        println!("- Selection: {:?}", config.resolver.selection);
        println!("- Timeout: {} ms", config.resolver.timeout_ms);
        if let Some(url) = &config.resolver.duckling_url {
            println!("- Duckling URL: {}", url);
        }
        println!("- Meeting id validation: {:?}", config.validation.meeting_id);
    }
}
