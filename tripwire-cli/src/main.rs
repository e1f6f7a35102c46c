//! Tripwire CLI - ask one question through a guarded agent.
#![allow(clippy::print_stdout)]

use std::io;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use tripwire::agent::{
    AgentProfile, AgentRegistry, AgentRuntime, CompletionAgent, GENERAL_PROFILE, PipelineResult,
    Runner,
};
use tripwire::providers::GeminiClient;
use tripwire::Settings;
use tripwire_cli::console;

/// Tripwire CLI - guarded question answering
#[derive(Parser, Debug)]
#[command(name = "tripwire")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Agent profile to run the question through
    #[arg(short, long, default_value = GENERAL_PROFILE)]
    profile: String,

    /// Send the question straight to the model, without any guardrails
    #[arg(long, conflicts_with = "json")]
    direct: bool,

    /// Print the full run report as JSON
    #[arg(long)]
    json: bool,

    /// Per-call timeout in seconds (overrides TRIPWIRE_TIMEOUT_SECS)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("tripwire=debug,tripwire_cli=debug")
    } else {
        EnvFilter::new("tripwire=warn,tripwire_cli=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();
    init_tracing(args.verbose);
    if let Some(path) = tripwire_cli::load_dotenv()? {
        debug!(path = %path.display(), "loaded .env");
    }

    let mut settings = Settings::from_env().context("invalid configuration")?;
    if let Some(secs) = args.timeout_secs {
        settings = settings.with_timeout(Duration::from_secs(secs));
    }
    debug!(?settings, "loaded settings");

    let registry = AgentRegistry::standard();
    let profile = registry.get(&args.profile).with_context(|| {
        format!(
            "unknown profile '{}' (available: {})",
            args.profile,
            registry.names().join(", ")
        )
    })?;

    let client = GeminiClient::from_settings(&settings)?;
    let model = Arc::new(client.completion_model(&settings.model));

    let Some(question) = console::read_question(&mut io::stdin().lock(), &mut io::stdout())?
    else {
        bail!("no question given");
    };
    if question.is_empty() {
        bail!("no question given");
    }

    if args.direct {
        let agent = CompletionAgent::new(model).with_timeout(settings.timeout);
        return Ok(match agent.run(&AgentProfile::new("direct"), &question).await {
            Ok(text) => {
                println!("\nGemini Response: {text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                println!("\nError: {e}");
                ExitCode::FAILURE
            }
        });
    }

    let runner = Runner::with_model(model, settings.timeout);
    let report = runner.run_detailed(&profile, &question).await;
    debug!("\n{}", report.metrics);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("\n{}", console::render(&report.result));
    }

    Ok(match report.result {
        PipelineResult::UpstreamError { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
