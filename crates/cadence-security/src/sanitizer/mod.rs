//! Sanitization passes and the field policies composed from them.
//!
//! Every function here is pure and synchronous. Work per call is bounded by
//! [`SanitizerConfig::max_input_length`](crate::SanitizerConfig) and
//! [`SanitizerConfig::max_passes`](crate::SanitizerConfig).

/// Dangerous-content removal and HTML escaping.
pub mod dangerous;
/// JSON payload and form sanitization.
pub mod form;
pub(crate) mod patterns;
/// Field policies and the [`Sanitizer`] entry point.
pub mod policy;
/// Tag stripping.
pub mod tags;
/// Unicode normalization and invisible-character removal.
pub mod unicode;
/// Whitespace normalization.
pub mod whitespace;

pub use dangerous::{escape_html, remove_dangerous_chars, remove_dangerous_with, ResidualMarkup};
pub use form::{
    coerce_text, sanitize_form_data, sanitize_object, CustomSanitizer, FieldConfig, FieldConfigMap,
};
pub use policy::{
    sanitize_bio, sanitize_display_name, sanitize_email, sanitize_text, sanitize_url,
    sanitize_username, SanitizeOptions, SanitizeResult, Sanitizer,
};
pub use tags::{strip_html_tags, strip_html_tags_with};
pub use unicode::{normalize_unicode, normalize_unicode_named, NormalizationForm};
pub use whitespace::{normalize_paragraphs, normalize_whitespace, remove_whitespace, trim_whitespace};
