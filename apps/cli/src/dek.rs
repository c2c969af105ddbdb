//! `scribe-dek` — write a one-sentence `dek` summary into a markdown file.

mod common;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use scribe_completion::ChatClient;
use scribe_core::pipeline::ProgressReporter;
use scribe_core::summary::{SummaryConfig, run_summary};
use scribe_shared::{ProviderKind, resolve_provider};
use tracing::info;

use common::{CliProgress, CommonArgs};

/// Credential precedence: a direct OpenAI key beats the routing proxy.
const PROVIDER_ORDER: [ProviderKind; 2] = [ProviderKind::OpenAi, ProviderKind::OpenRouter];

/// Summarize a weekly note as a Victorian chapter heading.
#[derive(Parser, Debug)]
#[command(name = "scribe-dek", version, long_about = None)]
struct Cli {
    /// Path to the markdown file.
    #[arg(short, long, value_name = "PATH")]
    file: PathBuf,

    /// Model to use for the summary.
    #[arg(short, long)]
    model: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    common::init_tracing(&cli.common);
    common::load_dotenv();
    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let app = common::load_app_config(cli.common.config.as_deref())?;
    let provider = resolve_provider(&app, &PROVIDER_ORDER)?;
    let backend = ChatClient::new(provider)?;

    let config = SummaryConfig {
        path: common::resolve_input(&cli.file)?,
        model: cli.model.unwrap_or(app.summary.model),
    };

    info!(file = %config.path.display(), model = %config.model, "summarizing document");

    let progress = CliProgress::new();
    let result = run_summary(&config, &backend, &progress).await;
    progress.finish();
    let outcome = result.wrap_err("failed to generate summary")?;

    if let Some(previous) = &outcome.previous {
        info!(%previous, "replaced existing dek");
    }

    println!(
        "Added summary to {}: {}",
        outcome.path.display(),
        outcome.dek
    );

    Ok(())
}
