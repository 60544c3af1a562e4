//! Wrapper stripping and JSON object boundary detection.
//!
//! Every strategy works from the same [`Candidate`], prepared once per call:
//! reasoning blocks and markdown fences are removed, leading prose is
//! discarded, and the first balanced `{...}` span is located.

use regex::Regex;
use std::sync::LazyLock;

/// Opening marker of a reasoning block.
pub const THINK_OPEN: &str = "<think>";

/// Closing marker of a reasoning block.
pub const THINK_CLOSE: &str = "</think>";

static THINK_BLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<think>.*?</think>").expect("Invalid think block regex"));

static FENCE_JSON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```json\s*").expect("Invalid json fence regex"));

static FENCE_LEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[ \t]*\r?\n").expect("Invalid leading fence regex"));

static FENCE_TRAILING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*```\s*$").expect("Invalid trailing fence regex"));

/// Model output after wrapper stripping.
#[derive(Debug, Clone)]
pub struct Candidate<'a> {
    /// Untouched model output
    pub raw: &'a str,

    /// Output with reasoning blocks, fences and leading prose removed
    pub text: String,

    /// First balanced object span in `text`, if one closes
    pub object: Option<String>,

    /// Whether reasoning markup was present
    pub had_reasoning: bool,
}

impl<'a> Candidate<'a> {
    /// Strip wrappers from `raw` and locate the object boundaries.
    pub fn prepare(raw: &'a str) -> Self {
        let trimmed = raw.trim();
        let had_reasoning = trimmed.contains(THINK_OPEN) || trimmed.contains(THINK_CLOSE);

        let mut text = strip_fences(&THINK_BLOCK_RE.replace_all(trimmed, ""));

        if !text.starts_with('{') {
            if let Some(end) = trimmed.rfind(THINK_CLOSE) {
                text = strip_fences(&trimmed[end + THINK_CLOSE.len()..]);
            }
        }

        if !text.starts_with('{') {
            if let Some(start) = text.find('{') {
                text = text[start..].to_string();
            }
        }

        let object = find_object(&text).map(str::to_string);

        Self {
            raw,
            text,
            object,
            had_reasoning,
        }
    }
}

/// Remove markdown code-fence markers.
pub fn strip_fences(text: &str) -> String {
    let text = FENCE_JSON_RE.replace_all(text, "");
    let text = FENCE_LEADING_RE.replace(&text, "");
    let text = FENCE_TRAILING_RE.replace(&text, "");
    text.trim().to_string()
}

/// Locate the first balanced `{...}` span.
///
/// Braces inside string literals are skipped. If the quote-aware scan never
/// closes (for example because the model left a quote unescaped inside
/// markup) a plain brace count is tried instead. `None` means neither scan
/// found the closing brace, which is the signature of truncated output.
pub fn find_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let rest = &text[start..];

    scan_object(rest, true)
        .or_else(|| scan_object(rest, false))
        .map(|end| &rest[..end])
}

/// Byte length of the object starting at `text[0]`, if it closes.
fn scan_object(text: &str, respect_strings: bool) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match ch {
            '"' if respect_strings => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(offset + ch.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

/// Flatten an object span before a second parse attempt.
///
/// Escaped and literal newlines, tabs and carriage returns become spaces,
/// other control characters are dropped, and whitespace runs collapse to a
/// single space.
pub fn normalize(object: &str) -> String {
    let mut out = String::with_capacity(object.len());
    let mut chars = object.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.peek() {
                Some('n' | 't' | 'r') => {
                    chars.next();
                    out.push(' ');
                }
                Some(_) => {
                    out.push(ch);
                    if let Some(next) = chars.next() {
                        out.push(next);
                    }
                }
                None => out.push(ch),
            },
            '\n' | '\t' | '\r' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }

    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn removes_reasoning_blocks() {
        let candidate = Candidate::prepare("<think>plan {a}</think>\n{\"title\":\"A\"}");

        assert!(candidate.had_reasoning);
        assert_eq!(candidate.text, "{\"title\":\"A\"}");
        assert_eq!(candidate.object.as_deref(), Some("{\"title\":\"A\"}"));
    }

    #[test]
    fn strips_tagged_and_bare_fences() {
        let tagged = Candidate::prepare("```json\n{\"a\":1}\n```");
        assert_eq!(tagged.text, "{\"a\":1}");

        let bare = Candidate::prepare("```\n{\"a\":1}\n```");
        assert_eq!(bare.text, "{\"a\":1}");
    }

    #[test]
    fn falls_back_to_last_reasoning_close() {
        // Nested markers leave a dangling close after the lazy block removal.
        let raw = "<think>outer <think>inner</think> still thinking</think>Answer: {\"a\":1}";
        let candidate = Candidate::prepare(raw);

        assert_eq!(candidate.text, "{\"a\":1}");
    }

    #[test]
    fn discards_leading_prose() {
        let candidate = Candidate::prepare("Here you go: {\"a\": {\"b\": 2}} thanks!");

        assert_eq!(candidate.object.as_deref(), Some("{\"a\": {\"b\": 2}}"));
    }

    #[test]
    fn ignores_braces_inside_strings() {
        let text = r#"{"code": "<script>if (x) { go(); </script>", "n": 1} tail"#;

        assert_eq!(
            find_object(text),
            Some(r#"{"code": "<script>if (x) { go(); </script>", "n": 1}"#)
        );
    }

    #[test]
    fn falls_back_to_plain_count_for_broken_quotes() {
        let text = r#"{"code": "<div class="p-4">Hi</div>}"#;

        assert_eq!(find_object(text), Some(text));
    }

    #[test]
    fn truncated_object_has_no_boundary() {
        assert_eq!(find_object(r#"{"title": "Foo", "code": "<div"#), None);
        assert_eq!(find_object("no braces"), None);
    }

    #[test]
    fn normalizes_whitespace_and_controls() {
        let input = "{\"code\": \"<div>\\n\\t<p>x</p>\n</div>\",\u{0007}  \"a\": \"q\\\"\"}";

        assert_eq!(
            normalize(input),
            "{\"code\": \"<div> <p>x</p> </div>\", \"a\": \"q\\\"\"}"
        );
    }
}
