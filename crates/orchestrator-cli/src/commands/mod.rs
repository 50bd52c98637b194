pub mod invoke;
pub mod route;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

/// Read an orchestration event from a file, or stdin when the path is "-"
pub fn read_event(path: &Path) -> Result<Value> {
    let raw = if path == Path::new("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read event from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event file {}", path.display()))?
    };

    parse_event(&raw)
}

fn parse_event(raw: &str) -> Result<Value> {
    serde_json::from_str(raw).context("Event is not valid JSON")
}
