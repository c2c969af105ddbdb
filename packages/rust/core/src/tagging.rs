//! Tagging pipeline: vocabulary → document → completion → merged tags.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info, instrument, warn};

use scribe_completion::CompletionBackend;
use scribe_shared::Result;
use scribe_vocabulary::TagSet;

use crate::pipeline::ProgressReporter;
use crate::prompt;

/// Configuration for one tagging run.
#[derive(Debug, Clone)]
pub struct TaggingConfig {
    /// Markdown file to tag (overwritten in place).
    pub path: PathBuf,
    /// URL of the JSON tag vocabulary.
    pub vocabulary_url: String,
    /// Model id passed to the completion endpoint.
    pub model: String,
    /// Timeout for the vocabulary fetch, in seconds.
    pub vocabulary_timeout_secs: u64,
}

/// Result of a tagging run.
#[derive(Debug, Clone)]
pub struct TaggingOutcome {
    pub path: PathBuf,
    /// Tags written to the document.
    pub tags: Vec<String>,
    /// Tags that were not on the document before this run.
    pub added: Vec<String>,
    /// The completion call failed and existing tags were kept.
    pub suggestion_failed: bool,
}

/// Split a model reply on commas, trimming each piece.
pub fn parse_suggestions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(String::from)
        .collect()
}

/// Union of `existing` and the vocabulary members of `suggested`.
///
/// Existing tags come first, then new suggestions in reply order; duplicates
/// collapse to their first occurrence. Suggestions outside the vocabulary are
/// dropped without error.
pub fn merge_tags(existing: &[String], suggested: &[String], vocabulary: &TagSet) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::with_capacity(existing.len() + suggested.len());

    for tag in existing {
        if seen.insert(tag) {
            merged.push(tag.clone());
        }
    }

    for tag in suggested {
        if !vocabulary.contains(tag) {
            debug!(%tag, "dropping tag outside vocabulary");
            continue;
        }
        if seen.insert(tag) {
            merged.push(tag.clone());
        }
    }

    merged
}

/// Ask the model for tags and return them unfiltered.
pub async fn suggest_tags(
    backend: &dyn CompletionBackend,
    body: &str,
    vocabulary: &TagSet,
    model: &str,
) -> Result<Vec<String>> {
    let prompt = prompt::tagging_prompt(body, vocabulary);
    let reply = backend.complete(&prompt, model).await?;
    Ok(parse_suggestions(&reply))
}

/// Run the tagging pipeline against one file.
///
/// 1. Fetch vocabulary (fatal on failure, file untouched)
/// 2. Read document
/// 3. Ask for suggestions (failure keeps existing tags)
/// 4. Merge and write back
#[instrument(skip_all, fields(path = %config.path.display(), model = %config.model))]
pub async fn run_tagging(
    config: &TaggingConfig,
    backend: &dyn CompletionBackend,
    progress: &dyn ProgressReporter,
) -> Result<TaggingOutcome> {
    // --- Phase 1: Vocabulary ---
    progress.phase("Fetching tag vocabulary");
    let client = scribe_vocabulary::build_client(config.vocabulary_timeout_secs)?;
    let vocabulary = scribe_vocabulary::fetch_tag_list(&client, &config.vocabulary_url).await?;

    // --- Phase 2: Document ---
    progress.phase("Reading document");
    let mut doc = scribe_document::read(&config.path)?;
    let existing = doc.front_matter.tags()?;

    // --- Phase 3: Suggestions ---
    progress.phase("Suggesting tags");
    let (suggested, suggestion_failed) =
        match suggest_tags(backend, &doc.body, &vocabulary, &config.model).await {
            Ok(tags) => (tags, false),
            Err(e) => {
                warn!(error = %e, "tag suggestion failed, keeping existing tags");
                (Vec::new(), true)
            }
        };

    let tags = merge_tags(&existing, &suggested, &vocabulary);
    let added: Vec<String> = tags[existing_unique_len(&existing)..].to_vec();

    // --- Phase 4: Write ---
    progress.phase("Writing document");
    doc.front_matter.set_tags(&tags);
    scribe_document::write(&config.path, &doc)?;

    info!(
        total = tags.len(),
        added = added.len(),
        suggestion_failed,
        "tags updated"
    );

    Ok(TaggingOutcome {
        path: config.path.clone(),
        tags,
        added,
        suggestion_failed,
    })
}

/// Number of distinct entries in `existing`; merged output starts with them.
fn existing_unique_len(existing: &[String]) -> usize {
    existing.iter().collect::<HashSet<_>>().len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::SilentProgress;
    use crate::pipeline::testing::ScriptedBackend;
    use scribe_shared::ScribeError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn vocab(items: &[&str]) -> TagSet {
        items.iter().copied().collect()
    }

    async fn vocabulary_server(tags: &[&str]) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tags.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(tags))
            .mount(&server)
            .await;
        server
    }

    fn config_for(file: PathBuf, server: &MockServer) -> TaggingConfig {
        TaggingConfig {
            path: file,
            vocabulary_url: format!("{}/tags.json", server.uri()),
            model: "openai/gpt-3.5-turbo".into(),
            vocabulary_timeout_secs: 5,
        }
    }

    // --- Interpretation ---

    #[test]
    fn parse_suggestions_trims_and_skips_blanks() {
        assert_eq!(
            parse_suggestions(" bar,qux , ,baz\n"),
            strings(&["bar", "qux", "baz"])
        );
        assert!(parse_suggestions("").is_empty());
    }

    #[test]
    fn merge_is_superset_of_existing_and_subset_of_union() {
        let existing = strings(&["local", "foo"]);
        let suggested = strings(&["bar", "nope", "foo"]);
        let v = vocab(&["foo", "bar", "baz"]);

        let merged = merge_tags(&existing, &suggested, &v);
        for tag in &existing {
            assert!(merged.contains(tag));
        }
        for tag in &merged {
            assert!(existing.contains(tag) || v.contains(tag));
        }
        assert_eq!(merged, strings(&["local", "foo", "bar"]));
    }

    #[test]
    fn merge_is_idempotent() {
        let v = vocab(&["a", "b", "c"]);
        let suggested = strings(&["c", "a", "z"]);
        let once = merge_tags(&strings(&["b"]), &suggested, &v);
        let twice = merge_tags(&once, &suggested, &v);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_collapses_existing_duplicates() {
        let merged = merge_tags(&strings(&["a", "a"]), &strings(&["a"]), &vocab(&["a"]));
        assert_eq!(merged, strings(&["a"]));
    }

    #[test]
    fn empty_filtered_suggestions_keep_existing() {
        let existing = strings(&["foo"]);
        let merged = merge_tags(&existing, &strings(&["qux"]), &vocab(&["foo", "bar"]));
        assert_eq!(merged, existing);
    }

    // --- Pipeline scenarios ---

    #[tokio::test]
    async fn merges_suggestions_into_existing_tags() {
        let server = vocabulary_server(&["foo", "bar", "baz"]).await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.md");
        std::fs::write(&file, "---\ntitle: Week 3\ntags: [foo]\n---\nSome body.\n").unwrap();

        let backend = ScriptedBackend::replying("bar, qux");
        let outcome = run_tagging(&config_for(file.clone(), &server), &backend, &SilentProgress)
            .await
            .expect("run");

        assert_eq!(outcome.tags, strings(&["foo", "bar"]));
        assert_eq!(outcome.added, strings(&["bar"]));
        assert!(!outcome.suggestion_failed);

        let doc = scribe_document::read(&file).unwrap();
        assert_eq!(doc.front_matter.tags().unwrap(), strings(&["foo", "bar"]));
        assert_eq!(doc.body, "Some body.\n");

        let prompts = backend.prompts.lock().unwrap();
        assert!(prompts[0].0.contains("Some body."));
        assert!(prompts[0].0.contains("foo, bar, baz"));
        assert_eq!(prompts[0].1, "openai/gpt-3.5-turbo");
    }

    #[tokio::test]
    async fn adds_tags_field_when_missing() {
        let server = vocabulary_server(&["x", "y"]).await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.md");
        std::fs::write(&file, "---\ntitle: Untagged\n---\nBody\n").unwrap();

        let backend = ScriptedBackend::replying("x, y, z");
        let outcome = run_tagging(&config_for(file.clone(), &server), &backend, &SilentProgress)
            .await
            .expect("run");

        assert_eq!(outcome.tags, strings(&["x", "y"]));
        let doc = scribe_document::read(&file).unwrap();
        assert_eq!(doc.front_matter.tags().unwrap(), strings(&["x", "y"]));
        assert_eq!(doc.front_matter.keys().collect::<Vec<_>>(), vec!["title", "tags"]);
    }

    #[tokio::test]
    async fn existing_numeric_tags_keep_their_type() {
        let server = vocabulary_server(&["foo", "bar"]).await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.md");
        std::fs::write(&file, "---\ntags: [2024, foo]\n---\nb\n").unwrap();

        let backend = ScriptedBackend::replying("bar");
        run_tagging(&config_for(file.clone(), &server), &backend, &SilentProgress)
            .await
            .expect("run");

        let written = std::fs::read_to_string(&file).unwrap();
        assert_eq!(written, "---\ntags:\n- 2024\n- foo\n- bar\n---\nb\n");
    }

    #[tokio::test]
    async fn vocabulary_failure_leaves_file_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.md");
        let original = "---\ntags: [foo]\n---\nBody\n";
        std::fs::write(&file, original).unwrap();

        let backend = ScriptedBackend::replying("foo");
        let err = run_tagging(&config_for(file.clone(), &server), &backend, &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, ScribeError::Network(_)));
        assert_eq!(backend.calls(), 0);
        assert_eq!(std::fs::read_to_string(&file).unwrap(), original);
    }

    #[tokio::test]
    async fn completion_failure_keeps_existing_tags() {
        let server = vocabulary_server(&["foo", "bar"]).await;
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("note.md");
        std::fs::write(&file, "---\ntags: [foo, local]\n---\nBody\n").unwrap();

        let backend = ScriptedBackend::failing("connection refused");
        let outcome = run_tagging(&config_for(file.clone(), &server), &backend, &SilentProgress)
            .await
            .expect("completion failure is not fatal");

        assert!(outcome.suggestion_failed);
        assert!(outcome.added.is_empty());
        let doc = scribe_document::read(&file).unwrap();
        assert_eq!(doc.front_matter.tags().unwrap(), strings(&["foo", "local"]));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let server = vocabulary_server(&["foo"]).await;
        let dir = tempfile::tempdir().unwrap();

        let backend = ScriptedBackend::replying("foo");
        let err = run_tagging(
            &config_for(dir.path().join("absent.md"), &server),
            &backend,
            &SilentProgress,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScribeError::Io { .. }));
    }
}
