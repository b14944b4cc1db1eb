use cadence_core::{CadenceError, CadenceResult};
use serde::{Deserialize, Serialize};

/// Inputs longer than this many characters are truncated before any pattern runs.
pub const MAX_INPUT_LENGTH: usize = 100_000;

/// Upper bound on fixpoint iterations for tag stripping and dangerous-content removal.
pub const MAX_PASSES: usize = 10;

/// Longest tag body (characters between `<` and `>`) a single tag match covers.
pub const MAX_TAG_LENGTH: usize = 512;

/// Consecutive newlines kept in bios.
pub const BIO_MAX_NEWLINES: usize = 2;

/// Deepest nesting walked by object sanitization.
pub const MAX_DEPTH: usize = 64;

const PASS_CEILING: usize = 100;

/// Abuse-resistance limits shared by every sanitization pass.
///
/// Normal user fields are far below these values; they exist to put a hard
/// ceiling on work per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizerConfig {
    /// Characters kept from the input before matching.
    #[serde(default = "default_max_input_length")]
    pub max_input_length: usize,
    /// Iteration cap for fixpoint loops.
    #[serde(default = "default_max_passes")]
    pub max_passes: usize,
    /// Consecutive newlines preserved by the bio policy.
    #[serde(default = "default_bio_max_newlines")]
    pub bio_max_newlines: usize,
    /// Nesting depth walked by [`crate::sanitize_object`].
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

fn default_max_input_length() -> usize {
    MAX_INPUT_LENGTH
}
fn default_max_passes() -> usize {
    MAX_PASSES
}
fn default_bio_max_newlines() -> usize {
    BIO_MAX_NEWLINES
}
fn default_max_depth() -> usize {
    MAX_DEPTH
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            max_input_length: MAX_INPUT_LENGTH,
            max_passes: MAX_PASSES,
            bio_max_newlines: BIO_MAX_NEWLINES,
            max_depth: MAX_DEPTH,
        }
    }
}

impl SanitizerConfig {
    /// Check that every limit is usable.
    pub fn validate(&self) -> CadenceResult<()> {
        if self.max_input_length == 0 {
            return Err(CadenceError::Config(
                "sanitizer.max_input_length must be at least 1".to_string(),
            ));
        }
        if self.max_passes == 0 || self.max_passes > PASS_CEILING {
            return Err(CadenceError::Config(format!(
                "sanitizer.max_passes must be between 1 and {PASS_CEILING}, got {}",
                self.max_passes
            )));
        }
        if self.bio_max_newlines == 0 {
            return Err(CadenceError::Config(
                "sanitizer.bio_max_newlines must be at least 1".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(CadenceError::Config(
                "sanitizer.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Keep at most `max_chars` characters of `input`.
///
/// Returns the input untouched when it is already short enough.
pub(crate) fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            tracing::warn!(
                limit = max_chars,
                bytes = input.len(),
                "Input exceeds maximum length, truncating"
            );
            &input[..idx]
        }
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SanitizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_passes_rejected() {
        let config = SanitizerConfig {
            max_passes: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_pass_ceiling_enforced() {
        let config = SanitizerConfig {
            max_passes: 1_000,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_passes"));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: SanitizerConfig = toml::from_str("max_passes = 5").unwrap();
        assert_eq!(config.max_passes, 5);
        assert_eq!(config.max_input_length, MAX_INPUT_LENGTH);
        assert_eq!(config.bio_max_newlines, BIO_MAX_NEWLINES);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 0), "");
    }
}
