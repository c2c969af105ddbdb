//! Ordered front-matter mapping with first-class `tags` and `dek` fields.

use serde_yaml::{Mapping, Value};

use scribe_shared::{Result, ScribeError};

/// Key holding the document's tag list.
pub const TAGS_KEY: &str = "tags";

/// Key holding the one-sentence summary.
pub const DEK_KEY: &str = "dek";

/// Front-matter metadata of a markdown document.
///
/// Unknown keys are carried through untouched and keep their order.
/// Replacing an existing key keeps its position; new keys are appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrontMatter {
    fields: Mapping,
}

impl FrontMatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-parsed YAML mapping.
    pub fn from_mapping(fields: Mapping) -> Self {
        Self { fields }
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Look up an arbitrary pass-through field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set an arbitrary field.
    pub fn insert(&mut self, key: &str, value: Value) {
        self.fields.insert(Value::String(key.to_string()), value);
    }

    /// Keys in document order. Non-string keys are skipped.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().filter_map(Value::as_str)
    }

    /// The document's tags. A missing or null field is an empty list and a
    /// bare scalar is a single tag.
    pub fn tags(&self) -> Result<Vec<String>> {
        match self.fields.get(TAGS_KEY) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| {
                    scalar_to_string(item).ok_or_else(|| {
                        ScribeError::parse(format!("`{TAGS_KEY}` entries must be scalars"))
                    })
                })
                .collect(),
            Some(other) => scalar_to_string(other).map(|tag| vec![tag]).ok_or_else(|| {
                ScribeError::parse(format!("`{TAGS_KEY}` must be a list of strings"))
            }),
        }
    }

    /// Replace the tag list wholesale.
    ///
    /// A tag that matches an entry already in the list reuses that entry's
    /// YAML value, so `2024` stays a number. Other tags are written as strings.
    pub fn set_tags(&mut self, tags: &[String]) {
        let previous = self.tag_items();
        let items = tags
            .iter()
            .map(|tag| {
                previous
                    .iter()
                    .find(|item| scalar_to_string(item).as_deref() == Some(tag.as_str()))
                    .cloned()
                    .unwrap_or_else(|| Value::String(tag.clone()))
            })
            .collect();
        self.insert(TAGS_KEY, Value::Sequence(items));
    }

    fn tag_items(&self) -> Vec<Value> {
        match self.fields.get(TAGS_KEY) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Sequence(items)) => items.clone(),
            Some(other) => vec![other.clone()],
        }
    }

    /// The current summary, if it is a string.
    pub fn dek(&self) -> Option<&str> {
        self.fields.get(DEK_KEY).and_then(Value::as_str)
    }

    /// Overwrite the summary.
    pub fn set_dek(&mut self, dek: impl Into<String>) {
        self.insert(DEK_KEY, Value::String(dek.into()));
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
