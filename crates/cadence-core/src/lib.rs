//! Core types and error definitions for the Cadence sanitizer.
//!
//! This crate provides the foundational types shared across all Cadence crates:
//! the unified error type and the names of the semantic field policies that
//! callers select when cleaning user-generated text.
//!
//! # Main types
//!
//! - [`CadenceError`] - Unified error enum for configuration, audit and I/O failures.
//! - [`CadenceResult`] - Convenience alias for `Result<T, CadenceError>`.
//! - [`FieldKind`] - The semantic field a piece of user text belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// --- Error types ---

/// Top-level error type for the Cadence workspace.
///
/// Sanitization itself never fails; these errors come from the surfaces
/// around it (configuration, audit persistence, payload decoding).
#[derive(Debug, thiserror::Error)]
pub enum CadenceError {
    /// An error in configuration parsing or validation.
    #[error("Config error: {0}")]
    Config(String),

    /// An error raised while recording audit entries.
    #[error("Audit error: {0}")]
    Audit(String),

    /// A JSON serialization or deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`CadenceError`].
pub type CadenceResult<T> = Result<T, CadenceError>;

// --- Field policies ---

/// The semantic field a piece of user text is destined for.
///
/// Each variant selects a different composition of sanitization passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// A user's public display name.
    #[serde(alias = "displayName")]
    DisplayName,
    /// Free-form profile text with limited paragraph breaks.
    Bio,
    /// A handle restricted to `[A-Za-z0-9_.-]`.
    Username,
    /// A link; rejected unless it is http(s) or a site-relative path.
    Url,
    /// An email address.
    Email,
    /// Any other plain-text field.
    Text,
}

impl FieldKind {
    /// All field kinds, in declaration order.
    pub const ALL: [FieldKind; 6] = [
        FieldKind::DisplayName,
        FieldKind::Bio,
        FieldKind::Username,
        FieldKind::Url,
        FieldKind::Email,
        FieldKind::Text,
    ];

    /// The canonical snake_case name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::DisplayName => "display_name",
            FieldKind::Bio => "bio",
            FieldKind::Username => "username",
            FieldKind::Url => "url",
            FieldKind::Email => "email",
            FieldKind::Text => "text",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = CadenceError;

    /// Accepts snake_case, kebab-case and camelCase spellings, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "displayname" | "name" => Ok(FieldKind::DisplayName),
            "bio" => Ok(FieldKind::Bio),
            "username" => Ok(FieldKind::Username),
            "url" => Ok(FieldKind::Url),
            "email" => Ok(FieldKind::Email),
            "text" | "generic" => Ok(FieldKind::Text),
            _ => Err(CadenceError::Config(format!("unknown field type '{s}'"))),
        }
    }
}
