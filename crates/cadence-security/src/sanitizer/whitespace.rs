//! Whitespace collapsing per field policy.

/// Collapse every run of whitespace into a single space.
pub fn normalize_whitespace(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_run = false;
    for c in input.chars() {
        if c.is_whitespace() {
            if !in_run {
                out.push(' ');
                in_run = true;
            }
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Collapse whitespace within lines while keeping up to `max_newlines`
/// consecutive line breaks. `\r\n` and lone `\r` count as one break.
///
/// With `max_newlines == 0` this is [`normalize_whitespace`].
pub fn normalize_paragraphs(input: &str, max_newlines: usize) -> String {
    if max_newlines == 0 {
        return normalize_whitespace(input);
    }
    let unified = input.replace("\r\n", "\n").replace('\r', "\n");
    let mut out = String::with_capacity(unified.len());
    let mut pending_space = false;
    let mut newlines = 0usize;
    for c in unified.chars() {
        if c == '\n' {
            // Spaces before a break are dropped.
            pending_space = false;
            newlines += 1;
        } else if c.is_whitespace() {
            // Spaces after a break are dropped too.
            if newlines == 0 {
                pending_space = true;
            }
        } else {
            if newlines > 0 {
                out.extend(std::iter::repeat('\n').take(newlines.min(max_newlines)));
                newlines = 0;
            } else if pending_space {
                out.push(' ');
            }
            pending_space = false;
            out.push(c);
        }
    }
    if newlines > 0 {
        out.extend(std::iter::repeat('\n').take(newlines.min(max_newlines)));
    } else if pending_space {
        out.push(' ');
    }
    out
}

/// Drop every whitespace character.
pub fn remove_whitespace(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Leading and trailing whitespace removal.
pub fn trim_whitespace(input: &str) -> &str {
    input.trim()
}
