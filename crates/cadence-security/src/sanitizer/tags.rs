//! HTML/XML tag stripping.

use super::patterns::{BLOCKS, COMMENT, TAG};
use crate::config::{truncate_chars, SanitizerConfig};
use tracing::{debug, warn};

/// Strip every tag from `input` using the default limits.
pub fn strip_html_tags(input: &str) -> String {
    strip_html_tags_with(input, &SanitizerConfig::default())
}

/// Strip every tag from `input`.
///
/// Script, style, iframe, embed and object blocks go together with their
/// content. Passes repeat until nothing changes (at most `max_passes`), then
/// any `<` still followed by a `>` is dropped so no tag-shaped span survives.
pub fn strip_html_tags_with(input: &str, config: &SanitizerConfig) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut current = truncate_chars(input, config.max_input_length).to_string();
    let mut stable = false;
    for pass in 0..config.max_passes {
        let next = strip_pass(&current);
        if next == current {
            debug!(passes = pass + 1, "Tag stripping reached a fixpoint");
            stable = true;
            break;
        }
        current = next;
    }
    if !stable {
        warn!(
            max_passes = config.max_passes,
            "Tag stripping hit the pass limit, sweeping residual brackets"
        );
    }
    sweep_open_brackets(&current)
}

pub(crate) fn remove_blocks(input: &str) -> String {
    let mut out = input.to_string();
    for block in BLOCKS.iter() {
        if let std::borrow::Cow::Owned(replaced) = block.replace_all(&out, "") {
            out = replaced;
        }
    }
    out
}

fn strip_pass(input: &str) -> String {
    let without_blocks = remove_blocks(input);
    let without_comments = COMMENT.replace_all(&without_blocks, "");
    TAG.replace_all(&without_comments, "").into_owned()
}

/// Drop every `<` that has a `>` somewhere after it.
fn sweep_open_brackets(input: &str) -> String {
    let Some(last_close) = input.rfind('>') else {
        return input.to_string();
    };
    let (head, tail) = input.split_at(last_close);
    let mut out = String::with_capacity(input.len());
    out.extend(head.chars().filter(|c| *c != '<'));
    out.push_str(tail);
    out
}
