// Output formatting for CLI

use anyhow::Result;
use orchestrator_core::ActionPayload;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "yaml" => OutputFormat::Yaml,
            _ => OutputFormat::Text,
        }
    }

    pub fn print_value<T: Serialize>(&self, value: &T) -> Result<()> {
        match self {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(value)?);
            }
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(value)?);
            }
            OutputFormat::Text => {
                // Text format is handled by each command
            }
        }
        Ok(())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }

    /// Print one action payload in this format
    pub fn print_payload(&self, payload: &ActionPayload) -> Result<()> {
        if self.is_text() {
            print_field("Action", payload.action_event.as_str());
            print_field("Trace", payload.trace());
            print_field("Text", payload.text());
            if !payload.context.session_attributes.is_empty() {
                print_field(
                    "Attributes",
                    &serde_json::to_string(&payload.context.session_attributes)?,
                );
            }
            Ok(())
        } else {
            self.print_value(payload)
        }
    }
}

/// Print a simple key-value pair for text output
pub fn print_field(label: &str, value: &str) {
    println!("{:<14} {}", format!("{}:", label), value);
}
