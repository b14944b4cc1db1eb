//! Unicode canonicalization and invisible-character removal.

use cadence_core::CadenceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use unicode_normalization::UnicodeNormalization;

/// Unicode normalization form applied to user text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NormalizationForm {
    /// Canonical composition.
    #[default]
    Nfc,
    /// Canonical decomposition.
    Nfd,
    /// Compatibility composition.
    Nfkc,
    /// Compatibility decomposition.
    Nfkd,
}

impl fmt::Display for NormalizationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NormalizationForm::Nfc => "NFC",
            NormalizationForm::Nfd => "NFD",
            NormalizationForm::Nfkc => "NFKC",
            NormalizationForm::Nfkd => "NFKD",
        };
        f.write_str(name)
    }
}

impl FromStr for NormalizationForm {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NFC" => Ok(NormalizationForm::Nfc),
            "NFD" => Ok(NormalizationForm::Nfd),
            "NFKC" => Ok(NormalizationForm::Nfkc),
            "NFKD" => Ok(NormalizationForm::Nfkd),
            _ => Err(CadenceError::Config(format!(
                "unknown normalization form '{s}'"
            ))),
        }
    }
}

/// Characters that render as nothing and are used to spoof identifiers.
pub fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{00AD}'
            | '\u{200B}'..='\u{200F}'
            | '\u{202A}'..='\u{202E}'
            | '\u{2060}'
            | '\u{2066}'..='\u{2069}'
            | '\u{FEFF}'
    )
}

/// Control characters with no display purpose. Tab, newline and carriage
/// return are left for the whitespace stage.
pub fn is_stripped_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r')
}

/// Remove invisible and control characters, then apply `form`.
///
/// Never fails: `&str` is always well-formed, so there is no invalid
/// sequence for the normalizer to reject.
pub fn normalize_unicode(input: &str, form: NormalizationForm) -> String {
    if input.is_empty() {
        return String::new();
    }
    let visible = input
        .chars()
        .filter(|c| !is_invisible(*c) && !is_stripped_control(*c));
    match form {
        NormalizationForm::Nfc => visible.nfc().collect(),
        NormalizationForm::Nfd => visible.nfd().collect(),
        NormalizationForm::Nfkc => visible.nfkc().collect(),
        NormalizationForm::Nfkd => visible.nfkd().collect(),
    }
}

/// Like [`normalize_unicode`] but takes the form by name, falling back to NFC
/// when the name is not recognized.
pub fn normalize_unicode_named(input: &str, form: &str) -> String {
    let form = form.parse().unwrap_or_else(|e: CadenceError| {
        tracing::warn!(error = %e, "Falling back to NFC normalization");
        NormalizationForm::Nfc
    });
    normalize_unicode(input, form)
}
