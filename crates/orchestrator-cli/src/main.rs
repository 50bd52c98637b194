// Orchestrator CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: `route` runs the router in-process, `invoke` goes through the HTTP service.
// Design Decision: Support text/json/yaml output formats for scripting.

mod client;
mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use orchestrator_core::StrategyKind;

#[derive(Parser)]
#[command(name = "orchestrator")]
#[command(about = "Orchestrator CLI - Route agent orchestration events")]
#[command(version)]
pub struct Cli {
    /// API base URL
    #[arg(
        long,
        env = "ORCHESTRATOR_API_URL",
        default_value = "http://localhost:9000"
    )]
    pub api_url: String,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Route an event locally and print the next action
    Route {
        /// Event JSON file ("-" for stdin)
        input: PathBuf,

        /// Orchestration strategy
        #[arg(long, short, env = "ORCHESTRATOR_STRATEGY", default_value = "react")]
        strategy: StrategyKind,

        /// Emit streamed answers without pausing between chunks
        #[arg(long)]
        no_wait: bool,
    },

    /// Send an event to the orchestrator service
    Invoke {
        /// Event JSON file ("-" for stdin)
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let output_format = output::OutputFormat::from_str(&cli.output);

    match cli.command {
        Commands::Route {
            input,
            strategy,
            no_wait,
        } => commands::route::run(output_format, input, strategy, no_wait).await,
        Commands::Invoke { input } => {
            let client = client::Client::new(&cli.api_url);
            commands::invoke::run(&client, output_format, input).await
        }
    }
}
