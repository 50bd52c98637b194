// Route command - run the router locally on one event

use std::path::PathBuf;

use anyhow::{Context, Result};
use futures::StreamExt;
use orchestrator_core::{ActionPayload, Dispatch, Router, RouterConfig, StrategyKind};

use crate::output::OutputFormat;

pub async fn run(
    output: OutputFormat,
    input: PathBuf,
    strategy: StrategyKind,
    no_wait: bool,
) -> Result<()> {
    let event = super::read_event(&input)?;
    let router = Router::new(&RouterConfig::new(strategy));

    match router.dispatch(&event).context("Failed to route event")? {
        Dispatch::Action(payload) => output.print_payload(&payload),
        Dispatch::Stream(answer) => {
            if no_wait {
                let payloads = answer.payloads()?;
                return print_stream(output, payloads);
            }

            // Print chunks as they are produced in text mode
            if output.is_text() {
                let mut stream = Box::pin(answer.stream()?);
                while let Some(payload) = stream.next().await {
                    output.print_payload(&payload)?;
                }
                Ok(())
            } else {
                let payloads = answer.stream()?.collect::<Vec<_>>().await;
                print_stream(output, payloads)
            }
        }
    }
}

fn print_stream(output: OutputFormat, payloads: Vec<ActionPayload>) -> Result<()> {
    if output.is_text() {
        for payload in &payloads {
            output.print_payload(payload)?;
        }
        Ok(())
    } else {
        output.print_value(&payloads)
    }
}
