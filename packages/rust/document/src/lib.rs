//! Markdown documents with YAML front matter.
//!
//! A [`Document`] is the unit of work for both utilities: it is parsed from
//! disk, one front-matter field is changed, and it is written back over the
//! source file. The body is carried as an opaque string and never altered.

mod frontmatter;

use std::path::Path;

use serde_yaml::Value;
use tracing::{debug, instrument};

use scribe_shared::{Result, ScribeError};

pub use frontmatter::{DEK_KEY, FrontMatter, TAGS_KEY};

/// Front-matter fence line.
const DELIMITER: &str = "---";

/// Byte-order mark some editors prepend.
const BOM: char = '\u{feff}';

/// A markdown document split into metadata and body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub front_matter: FrontMatter,
    pub body: String,
}

impl Document {
    pub fn new(front_matter: FrontMatter, body: impl Into<String>) -> Self {
        Self {
            front_matter,
            body: body.into(),
        }
    }
}

/// Read and parse a document from disk.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn read(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path).map_err(|e| ScribeError::io(path, e))?;
    let doc = parse(&content)?;
    debug!(
        fields = doc.front_matter.len(),
        body_len = doc.body.len(),
        "document read"
    );
    Ok(doc)
}

/// Serialize a document and overwrite `path` with it.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn write(path: &Path, doc: &Document) -> Result<()> {
    let rendered = render(doc)?;
    std::fs::write(path, &rendered).map_err(|e| ScribeError::io(path, e))?;
    debug!(bytes = rendered.len(), "document written");
    Ok(())
}

/// Split markdown text into front matter and body.
///
/// Text that does not open with a `---` line has no front matter: the result
/// is an empty mapping and the whole text, byte-order mark included, as body.
pub fn parse(input: &str) -> Result<Document> {
    let unmarked = input.strip_prefix(BOM).unwrap_or(input);

    let Some((yaml, body)) = split_front_matter(unmarked)? else {
        return Ok(Document::new(FrontMatter::new(), input));
    };

    let front_matter = if is_blank_yaml(yaml) {
        FrontMatter::new()
    } else {
        match serde_yaml::from_str::<Value>(yaml)
            .map_err(|e| ScribeError::parse(format!("invalid front matter: {e}")))?
        {
            Value::Mapping(fields) => FrontMatter::from_mapping(fields),
            Value::Null => FrontMatter::new(),
            _ => return Err(ScribeError::parse("front matter is not a mapping")),
        }
    };

    Ok(Document::new(front_matter, body))
}

/// Render a document back to markdown text.
///
/// An empty mapping renders the body alone, unless the body itself opens
/// with a fence; then an empty block is kept in front of it.
pub fn render(doc: &Document) -> Result<String> {
    if doc.front_matter.is_empty() {
        let body = doc.body.strip_prefix(BOM).unwrap_or(doc.body.as_str());
        if !opens_with_fence(body) {
            return Ok(doc.body.clone());
        }
        return Ok(format!("{DELIMITER}\n{DELIMITER}\n{}", doc.body));
    }

    let yaml = serde_yaml::to_string(doc.front_matter.as_mapping())
        .map_err(|e| ScribeError::parse(format!("failed to serialize front matter: {e}")))?;

    let mut out = String::with_capacity(yaml.len() + doc.body.len() + 8);
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push('\n');
    out.push_str(&doc.body);
    Ok(out)
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == DELIMITER
}

fn opens_with_fence(text: &str) -> bool {
    text.split_inclusive('\n').next().is_some_and(is_fence)
}

/// True when the block holds nothing but whitespace and comments.
fn is_blank_yaml(yaml: &str) -> bool {
    yaml.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#')
    })
}

/// Return `(yaml, body)` slices of `input`, or `None` when there is no
/// opening fence.
fn split_front_matter(input: &str) -> Result<Option<(&str, &str)>> {
    let mut chunks = input.split_inclusive('\n');

    let Some(first) = chunks.next() else {
        return Ok(None);
    };
    if !is_fence(first) {
        return Ok(None);
    }

    let mut offset = first.len();
    for chunk in chunks {
        if is_fence(chunk) {
            let yaml = &input[first.len()..offset];
            let body = &input[offset + chunk.len()..];
            return Ok(Some((yaml, body)));
        }
        offset += chunk.len();
    }

    Err(ScribeError::parse("front matter block is not closed"))
}
