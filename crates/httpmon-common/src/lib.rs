//! Shared domain types for the httpmon workspace.

pub mod types;
