//! Input sanitization for Cadence user-generated text.
//!
//! Cleans display names, bios, usernames, URLs and whole request payloads
//! before they are stored or rendered, and scans text for suspicious content
//! for monitoring.
//!
//! # Main types
//!
//! - [`Sanitizer`] - Applies the field policies under one set of limits.
//! - [`SanitizerConfig`] - Input-length and iteration caps.
//! - [`SanitizeOptions`] - Pass selection for the generic text pipeline.
//! - [`FieldConfig`] - Per-field policy for form sanitization.
//! - [`ContentReport`] - Findings of the non-mutating content auditor.
//! - [`AuditLog`] - Append-only trail of content scans.

pub mod audit;
/// Sanitizer limits.
pub mod config;
/// Sanitization passes and field policies.
pub mod sanitizer;

pub use audit::{check_dangerous_content, check_dangerous_content_with, AuditLog, ContentReport, ContentWarning};
pub use cadence_core::FieldKind;
pub use config::SanitizerConfig;
pub use sanitizer::{
    coerce_text, escape_html, normalize_unicode, normalize_whitespace, remove_dangerous_chars,
    sanitize_bio, sanitize_display_name, sanitize_email, sanitize_form_data, sanitize_object,
    sanitize_text, sanitize_url, sanitize_username, strip_html_tags, trim_whitespace,
    FieldConfig, FieldConfigMap, NormalizationForm, ResidualMarkup, SanitizeOptions,
    SanitizeResult, Sanitizer,
};
