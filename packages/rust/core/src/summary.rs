//! Summary pipeline: document → completion → `dek`.

use std::path::PathBuf;

use tracing::{info, instrument, warn};

use scribe_completion::CompletionBackend;
use scribe_shared::{Result, ScribeError};

use crate::pipeline::ProgressReporter;
use crate::prompt;

/// Configuration for one summary run.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Markdown file to summarize (overwritten in place).
    pub path: PathBuf,
    /// Model id passed to the completion endpoint.
    pub model: String,
}

/// Result of a summary run.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub path: PathBuf,
    /// The dek written to the document.
    pub dek: String,
    /// The dek it replaced, if any.
    pub previous: Option<String>,
}

/// Trim whitespace, then drop one leading and one trailing `"` if present.
pub fn strip_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('"').unwrap_or(trimmed);
    trimmed.strip_suffix('"').unwrap_or(trimmed)
}

/// Ask the model for a dek. An empty reply counts as a failure.
pub async fn generate_dek(
    backend: &dyn CompletionBackend,
    body: &str,
    model: &str,
) -> Result<String> {
    let prompt = prompt::summary_prompt(body);
    let reply = backend.complete(&prompt, model).await?;
    let dek = strip_quotes(&reply);
    if dek.is_empty() {
        return Err(ScribeError::Api("model returned an empty summary".into()));
    }
    Ok(dek.to_string())
}

/// Run the summary pipeline against one file.
///
/// Any completion failure aborts before the write, leaving the file as it
/// was.
#[instrument(skip_all, fields(path = %config.path.display(), model = %config.model))]
pub async fn run_summary(
    config: &SummaryConfig,
    backend: &dyn CompletionBackend,
    progress: &dyn ProgressReporter,
) -> Result<SummaryOutcome> {
    progress.phase("Reading document");
    let mut doc = scribe_document::read(&config.path)?;
    let previous = doc.front_matter.dek().map(String::from);

    progress.phase("Generating summary");
    let dek = generate_dek(backend, &doc.body, &config.model)
        .await
        .inspect_err(|e| warn!(error = %e, "summary generation failed, file left unchanged"))?;

    progress.phase("Writing document");
    doc.front_matter.set_dek(dek.as_str());
    scribe_document::write(&config.path, &doc)?;

    info!(replaced = previous.is_some(), "dek updated");

    Ok(SummaryOutcome {
        path: config.path.clone(),
        dek,
        previous,
    })
}
