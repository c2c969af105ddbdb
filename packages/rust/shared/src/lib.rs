//! Shared error model and configuration for Scribe.
//!
//! This crate is the foundation depended on by all other Scribe crates.
//! It provides:
//! - [`ScribeError`] — the unified error type
//! - Configuration ([`AppConfig`], config loading)
//! - Completion provider selection ([`ProviderConfig`], [`resolve_provider`])

pub mod config;
pub mod error;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DEFAULT_DEK_MODEL, DEFAULT_TAG_MODEL, DEFAULT_VOCABULARY_URL, HttpConfig,
    OpenAiSection, OpenRouterSection, ProviderConfig, ProviderKind, SummaryDefaults,
    TaggingDefaults, config_dir, config_file_path, load_config, load_config_from,
    resolve_provider, resolve_provider_with,
};
pub use error::{Result, ScribeError};
