//! Core pipeline orchestration and domain logic for Scribe.
//!
//! This crate ties together the document, vocabulary, and completion crates
//! into the two end-to-end workflows: tagging and summary (`dek`).

pub mod pipeline;
pub mod prompt;
pub mod summary;
pub mod tagging;
