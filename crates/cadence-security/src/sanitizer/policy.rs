//! Field policies: the order and configuration of passes for each kind of
//! user field.

use super::dangerous::{escape_html, remove_dangerous_with, ResidualMarkup};
use super::patterns::{EVENT_HANDLER_NAME, PROTOCOL};
use super::tags::strip_html_tags_with;
use super::unicode::{is_invisible, normalize_unicode, NormalizationForm};
use super::whitespace::{normalize_paragraphs, remove_whitespace};
use crate::config::{truncate_chars, SanitizerConfig};
use cadence_core::FieldKind;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::{Position, Url};

/// Protocols rejected outright by the URL policy.
const BLOCKED_URL_PREFIXES: [&str; 4] = ["javascript:", "data:", "vbscript:", "file:"];

/// Placeholder origin used to resolve and canonicalize relative paths.
const RELATIVE_BASE: &str = "http://relative.invalid/";
const RELATIVE_HOST: &str = "relative.invalid";

/// Which passes [`Sanitizer::sanitize_text`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizeOptions {
    /// Remove tags (and script-like blocks with their content).
    pub strip_html: bool,
    /// Remove protocols, event handlers and CSS/DOM vectors.
    pub remove_dangerous: bool,
    /// Collapse whitespace runs.
    pub normalize_whitespace: bool,
    /// Trim leading and trailing whitespace.
    pub trim: bool,
    /// Escape residual markup characters instead of dropping brackets.
    pub escape_html: bool,
    /// Strip invisible/control characters and apply `unicode_form`.
    pub normalize_unicode: bool,
    /// Form used when `normalize_unicode` is set.
    pub unicode_form: NormalizationForm,
    /// Consecutive newlines kept by whitespace normalization; `0` collapses them.
    pub max_newlines: usize,
}

impl Default for SanitizeOptions {
    fn default() -> Self {
        Self {
            strip_html: true,
            remove_dangerous: true,
            normalize_whitespace: true,
            trim: true,
            escape_html: false,
            normalize_unicode: true,
            unicode_form: NormalizationForm::Nfc,
            max_newlines: 0,
        }
    }
}

/// Outcome of checking a value against a field policy.
#[derive(Debug, PartialEq)]
pub enum SanitizeResult {
    /// Input was already clean.
    Clean(String),
    /// Input was cleaned.
    Cleaned(String),
    /// Input was rejected entirely.
    Rejected(String),
}

impl SanitizeResult {
    /// Whether the policy refused the value.
    pub fn is_rejected(&self) -> bool {
        matches!(self, SanitizeResult::Rejected(_))
    }

    /// The sanitized value, if any.
    pub fn into_string(self) -> Option<String> {
        match self {
            SanitizeResult::Clean(s) | SanitizeResult::Cleaned(s) => Some(s),
            SanitizeResult::Rejected(_) => None,
        }
    }
}

/// Input sanitizer applying the per-field policies under one set of limits.
///
/// Stateless apart from its limits; share it freely across threads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sanitizer {
    config: SanitizerConfig,
}

impl Sanitizer {
    /// Create a sanitizer with the given limits.
    pub fn new(config: SanitizerConfig) -> Self {
        Self { config }
    }

    /// The limits this sanitizer runs under.
    pub fn config(&self) -> &SanitizerConfig {
        &self.config
    }

    /// Run the generic pipeline: normalize unicode, strip tags, remove
    /// dangerous content, recompose unicode, normalize whitespace, trim.
    pub fn sanitize_text(&self, input: &str, options: &SanitizeOptions) -> String {
        if input.is_empty() {
            return String::new();
        }
        let mut text = truncate_chars(input, self.config.max_input_length).to_string();
        if options.normalize_unicode {
            text = normalize_unicode(&text, options.unicode_form);
        }
        if options.strip_html {
            text = strip_html_tags_with(&text, &self.config);
        }
        if options.remove_dangerous {
            let residual = if options.escape_html {
                ResidualMarkup::Escape
            } else {
                ResidualMarkup::Strip
            };
            text = remove_dangerous_with(&text, residual, &self.config);
        } else if options.escape_html {
            text = escape_html(&text);
        }
        if options.normalize_unicode {
            // Deletions can leave base characters next to combining marks.
            text = normalize_unicode(&text, options.unicode_form);
        }
        if options.normalize_whitespace {
            text = normalize_paragraphs(&text, options.max_newlines);
        }
        if options.trim {
            text = text.trim().to_string();
        }
        text
    }

    /// Display names: the generic pipeline with whitespace collapsed to single spaces.
    pub fn sanitize_display_name(&self, input: &str) -> String {
        self.sanitize_text(input, &SanitizeOptions::default())
    }

    /// Like [`Sanitizer::sanitize_display_name`] but `None` when nothing is left.
    pub fn sanitize_display_name_strict(&self, input: &str) -> Option<String> {
        let name = self.sanitize_display_name(input);
        (!name.is_empty()).then_some(name)
    }

    /// Bios keep up to `bio_max_newlines` consecutive line breaks.
    pub fn sanitize_bio(&self, input: &str) -> String {
        let options = SanitizeOptions {
            max_newlines: self.config.bio_max_newlines,
            ..Default::default()
        };
        self.sanitize_text(input, &options)
    }

    /// Usernames keep only `[A-Za-z0-9_.-]`.
    pub fn sanitize_username(&self, input: &str) -> String {
        let text = self.sanitize_text(input, &SanitizeOptions::default());
        let allowed: String = text
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
            .collect();
        // Dropping characters can join fragments such as "docu ment.cookie".
        remove_dangerous_with(&allowed, ResidualMarkup::Strip, &self.config)
    }

    /// Email addresses: generic pipeline, no whitespace, ASCII-lowercased.
    pub fn sanitize_email(&self, input: &str) -> String {
        let text = self.sanitize_text(input, &SanitizeOptions::default());
        let compact = remove_whitespace(&text).to_ascii_lowercase();
        let cleaned = remove_dangerous_with(&compact, ResidualMarkup::Strip, &self.config);
        normalize_unicode(&cleaned, NormalizationForm::Nfc)
    }

    /// Accept absolute http(s) URLs and `/` or `./` relative paths, returning
    /// their canonical form. Anything else is `None`.
    pub fn sanitize_url(&self, input: &str) -> Option<String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.chars().nth(self.config.max_input_length).is_some() {
            debug!("Rejected URL: exceeds maximum length");
            return None;
        }

        // Browsers ignore embedded tabs/newlines when reading a scheme.
        let compact: String = trimmed
            .chars()
            .filter(|c| !c.is_whitespace() && !c.is_control() && !is_invisible(*c))
            .collect::<String>()
            .to_ascii_lowercase();
        if BLOCKED_URL_PREFIXES.iter().any(|p| compact.starts_with(p)) {
            debug!("Rejected URL: dangerous protocol");
            return None;
        }

        let canonical = if trimmed.starts_with('/') || trimmed.starts_with("./") {
            canonical_relative(trimmed, &compact)?
        } else {
            let parsed = Url::parse(trimmed).ok()?;
            match parsed.scheme() {
                "http" | "https" => {}
                other => {
                    debug!(scheme = other, "Rejected URL: scheme not allowed");
                    return None;
                }
            }
            parsed.host_str()?;
            String::from(parsed)
        };

        if PROTOCOL.is_match(&canonical) {
            debug!("Rejected URL: dangerous protocol in path, query or fragment");
            return None;
        }
        if EVENT_HANDLER_NAME.is_match(&canonical) {
            debug!("Rejected URL: contains an event-handler pattern");
            return None;
        }
        Some(canonical)
    }

    /// Apply the policy for `kind`. Only [`FieldKind::Url`] can yield `None`.
    pub fn sanitize_field(&self, kind: FieldKind, input: &str) -> Option<String> {
        match kind {
            FieldKind::DisplayName => Some(self.sanitize_display_name(input)),
            FieldKind::Bio => Some(self.sanitize_bio(input)),
            FieldKind::Username => Some(self.sanitize_username(input)),
            FieldKind::Url => self.sanitize_url(input),
            FieldKind::Email => Some(self.sanitize_email(input)),
            FieldKind::Text => Some(self.sanitize_text(input, &SanitizeOptions::default())),
        }
    }

    /// Apply the policy for `kind` and report whether the value changed.
    ///
    /// A rejected URL or a display name with nothing left is [`SanitizeResult::Rejected`].
    pub fn check(&self, kind: FieldKind, input: &str) -> SanitizeResult {
        match self.sanitize_field(kind, input) {
            None => SanitizeResult::Rejected(format!("{kind} rejected by policy")),
            Some(out) if out.is_empty() && kind == FieldKind::DisplayName => {
                SanitizeResult::Rejected("display name is empty after sanitization".to_string())
            }
            Some(out) if out == input => SanitizeResult::Clean(out),
            Some(out) => SanitizeResult::Cleaned(out),
        }
    }
}

fn canonical_relative(trimmed: &str, compact: &str) -> Option<String> {
    // "//host" and "/\host" are protocol-relative, not paths.
    if compact.starts_with("//") || compact.starts_with("/\\") {
        debug!("Rejected URL: protocol-relative");
        return None;
    }
    let joined = Url::parse(RELATIVE_BASE).ok()?.join(trimmed).ok()?;
    if joined.host_str() != Some(RELATIVE_HOST) {
        return None;
    }
    let path = &joined[Position::BeforePath..];
    if trimmed.starts_with("./") {
        Some(format!(".{path}"))
    } else if path.starts_with("//") {
        // Dot-segments can collapse "/a/..//host" into a network path.
        debug!("Rejected URL: resolves to a protocol-relative path");
        None
    } else {
        Some(path.to_string())
    }
}

/// [`Sanitizer::sanitize_text`] with the default limits.
pub fn sanitize_text(input: &str, options: &SanitizeOptions) -> String {
    Sanitizer::default().sanitize_text(input, options)
}

/// [`Sanitizer::sanitize_display_name`] with the default limits.
pub fn sanitize_display_name(input: &str) -> String {
    Sanitizer::default().sanitize_display_name(input)
}

/// [`Sanitizer::sanitize_bio`] with the default limits.
pub fn sanitize_bio(input: &str) -> String {
    Sanitizer::default().sanitize_bio(input)
}

/// [`Sanitizer::sanitize_username`] with the default limits.
pub fn sanitize_username(input: &str) -> String {
    Sanitizer::default().sanitize_username(input)
}

/// [`Sanitizer::sanitize_email`] with the default limits.
pub fn sanitize_email(input: &str) -> String {
    Sanitizer::default().sanitize_email(input)
}

/// [`Sanitizer::sanitize_url`] with the default limits.
pub fn sanitize_url(input: &str) -> Option<String> {
    Sanitizer::default().sanitize_url(input)
}
