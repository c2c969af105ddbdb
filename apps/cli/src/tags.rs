//! `scribe-tags` — add vocabulary tags to a markdown file's front matter.

mod common;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use scribe_completion::ChatClient;
use scribe_core::pipeline::ProgressReporter;
use scribe_core::tagging::{TaggingConfig, TaggingOutcome, run_tagging};
use scribe_shared::{ProviderKind, resolve_provider};
use tracing::info;

use common::{CliProgress, CommonArgs};

/// Credential precedence. The default model id is OpenRouter-namespaced.
const PROVIDER_ORDER: [ProviderKind; 2] = [ProviderKind::OpenRouter, ProviderKind::OpenAi];

/// Suggest tags from a controlled vocabulary and merge them into a note.
#[derive(Parser, Debug)]
#[command(name = "scribe-tags", version, long_about = None)]
struct Cli {
    /// Path to the markdown file.
    #[arg(short, long, value_name = "PATH")]
    file: PathBuf,

    /// URL of the JSON file containing tags.
    #[arg(short = 'u', long, value_name = "URL")]
    tags_url: Option<String>,

    /// Model to use for suggestions.
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

    let config = TaggingConfig {
        path: common::resolve_input(&cli.file)?,
        vocabulary_url: cli.tags_url.unwrap_or(app.tagging.vocabulary_url),
        model: cli.model.unwrap_or(app.tagging.model),
        vocabulary_timeout_secs: app.http.vocabulary_timeout_secs,
    };

    info!(
        file = %config.path.display(),
        vocabulary = %config.vocabulary_url,
        model = %config.model,
        "tagging document"
    );

    let progress = CliProgress::new();
    let result = run_tagging(&config, &backend, &progress).await;
    progress.finish();
    let outcome = result?;

    if let Some(note) = fallback_note(&outcome) {
        eprintln!("{note}");
    }

    println!(
        "Updated tags for {}: {}",
        outcome.path.display(),
        outcome.tags.join(", ")
    );

    Ok(())
}

/// Stderr note for a run whose suggestions were lost.
fn fallback_note(outcome: &TaggingOutcome) -> Option<&'static str> {
    outcome
        .suggestion_failed
        .then_some("warning: tag suggestion failed, existing tags were kept")
}
