//! Removal of executable markup, dangerous protocols, event handlers and
//! CSS/DOM injection vectors.

use super::patterns::{CSS_DOM, ENTITY, EVENT_HANDLER, MALFORMED_BLOCK, PROTOCOL};
use super::tags::remove_blocks;
use crate::config::{truncate_chars, SanitizerConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// What to do with `<` and `>` left over once the dangerous constructs are gone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResidualMarkup {
    /// Drop the brackets, keep the text between them.
    #[default]
    Strip,
    /// HTML-escape `& < > " ' /`.
    Escape,
}

/// Every pattern needs at least one of these characters to match.
const HOSTILE_FALLBACK: [char; 7] = ['<', '>', ':', '=', '(', '@', '.'];

/// Longest character reference recognized when deciding whether `&` is already escaped.
const ENTITY_WINDOW: usize = 40;

/// Remove dangerous content using the default limits, stripping residual brackets.
pub fn remove_dangerous_chars(input: &str) -> String {
    remove_dangerous_with(input, ResidualMarkup::Strip, &SanitizerConfig::default())
}

/// Remove dangerous content, repeating until the text is stable.
///
/// If `max_passes` runs out before a fixpoint the input is treated as hostile:
/// every character the patterns depend on is deleted and one final pass runs,
/// which always yields a fixpoint.
pub fn remove_dangerous_with(
    input: &str,
    residual: ResidualMarkup,
    config: &SanitizerConfig,
) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut current = truncate_chars(input, config.max_input_length).to_string();
    for pass in 0..config.max_passes {
        let next = dangerous_pass(&current, residual);
        if next == current {
            debug!(passes = pass + 1, "Dangerous-content removal reached a fixpoint");
            return current;
        }
        current = next;
    }
    warn!(
        max_passes = config.max_passes,
        "Dangerous-content removal did not converge, applying hostile-input fallback"
    );
    let defanged: String = current
        .chars()
        .filter(|c| !HOSTILE_FALLBACK.contains(c))
        .collect();
    dangerous_pass(&defanged, residual)
}

fn dangerous_pass(input: &str, residual: ResidualMarkup) -> String {
    let text = remove_blocks(input);
    let text = MALFORMED_BLOCK.replace_all(&text, "");
    let text = PROTOCOL.replace_all(&text, "");
    let text = EVENT_HANDLER.replace_all(&text, "");
    let text = CSS_DOM.replace_all(&text, "");
    match residual {
        ResidualMarkup::Strip => text.chars().filter(|c| *c != '<' && *c != '>').collect(),
        ResidualMarkup::Escape => escape_html(&text),
    }
}

/// HTML-escape `& < > " ' /`, leaving existing character references alone.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for (idx, c) in input.char_indices() {
        match c {
            '&' if starts_with_entity(&input[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '/' => out.push_str("&#x2F;"),
            _ => out.push(c),
        }
    }
    out
}

fn starts_with_entity(rest: &str) -> bool {
    let window = match rest.char_indices().nth(ENTITY_WINDOW) {
        Some((end, _)) => &rest[..end],
        None => rest,
    };
    ENTITY.is_match(window)
}
