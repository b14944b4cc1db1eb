//! Compiled patterns shared by the stripping, removal and audit passes.
//!
//! The `regex` crate matches in time linear in the input, and every span that
//! could grow with the input is additionally bounded by [`MAX_TAG_LENGTH`].

use crate::config::MAX_TAG_LENGTH;
use regex::Regex;
use std::sync::LazyLock;

/// Elements whose content is executable or stylable and is removed with the tag.
pub(crate) const BLOCK_ELEMENTS: [&str; 5] = ["script", "style", "iframe", "embed", "object"];

fn compile(pattern: &str) -> Regex {
    // Patterns are static literals covered by the tests below.
    #[allow(clippy::expect_used)]
    Regex::new(pattern).expect("valid regex")
}

/// One paired-block pattern per element; the regex crate has no backreferences.
pub(crate) static BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    BLOCK_ELEMENTS
        .iter()
        .map(|name| {
            compile(&format!(
                r"(?is)<\s*{name}[^<>]{{0,{MAX_TAG_LENGTH}}}>.*?<\s*/\s*{name}\s*>"
            ))
        })
        .collect()
});

/// Self-closing, truncated or unpaired opening/closing variants of the block elements.
pub(crate) static MALFORMED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"(?i)<\s*/?\s*(?:{})[^<>]{{0,{MAX_TAG_LENGTH}}}>?",
        BLOCK_ELEMENTS.join("|")
    ))
});

pub(crate) static COMMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<!--.*?-->"));

/// Any bracketed span without nested brackets.
pub(crate) static TAG: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"<[^<>]{{0,{MAX_TAG_LENGTH}}}>")));

/// A bracketed span that starts like markup (`<p`, `</p`, `<!`, `<?`).
pub(crate) static MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r"<\s*/?\s*[A-Za-z!?][^<>]{{0,{MAX_TAG_LENGTH}}}>"
    ))
});

pub(crate) static SCRIPT_TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)<\s*/?\s*script"));

/// `data` and `file` need a word start so `metadata:` and `profile:` survive;
/// the script protocols match anywhere to catch spliced payloads.
pub(crate) static PROTOCOL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)(?:javascript|vbscript|\bdata|\bfile)\s*:"));

/// Event-handler attribute with its value (double-quoted, single-quoted or bare).
pub(crate) static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"(?i)on\w+\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]*)"#)
});

/// Event-handler name and `=` only, for detection.
pub(crate) static EVENT_HANDLER_NAME: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)on\w+\s*="));

pub(crate) static CSS_DOM: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)expression\s*\(|url\s*\(|@import|document\s*\.\s*(?:writeln|write|cookie|location)|window\s*\.\s*(?:location|document|eval|parent|top)|\.\s*(?:innerhtml|outerhtml|insertadjacenthtml)",
    )
});

/// A complete character reference, used to avoid double-escaping.
pub(crate) static ENTITY: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^&(?:[A-Za-z][A-Za-z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});"));
