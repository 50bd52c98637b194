// Invoke command - send one event to a running orchestrator service

use std::path::PathBuf;

use anyhow::Result;
use orchestrator_core::ActionPayload;
use serde::{Deserialize, Serialize};

use crate::client::Client;
use crate::output::OutputFormat;

/// Response of POST /v1/orchestrate
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum OrchestrateResponse {
    Streamed(Vec<ActionPayload>),
    Single(ActionPayload),
}

pub async fn run(client: &Client, output: OutputFormat, input: PathBuf) -> Result<()> {
    let event = super::read_event(&input)?;
    let response: OrchestrateResponse = client.post("/v1/orchestrate", &event).await?;

    if !output.is_text() {
        return output.print_value(&response);
    }

    match response {
        OrchestrateResponse::Single(payload) => output.print_payload(&payload),
        OrchestrateResponse::Streamed(payloads) => {
            for payload in &payloads {
                output.print_payload(payload)?;
            }
            Ok(())
        }
    }
}
