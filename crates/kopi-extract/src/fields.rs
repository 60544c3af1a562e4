//! Field-by-field regex recovery for malformed or truncated objects.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

use crate::record::PartialRecord;

/// Below this length a recovered `code` value is treated as implausible.
pub const MIN_PLAUSIBLE_CODE_LEN: usize = 50;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""title"\s*:\s*"([^"]+)""#).expect("Invalid title regex"));

static CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"code"\s*:\s*(?:```(.*?)```|`([^`]*)`|"((?:[^"\\]|\\.)*)")"#)
        .expect("Invalid code regex")
});

static CATEGORIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""categories"\s*:\s*\[([^\]]*)\]"#).expect("Invalid categories regex")
});

static DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""description"\s*:\s*"([^"]+)""#).expect("Invalid description regex")
});

// Truncation variants: the closing delimiter may be missing.

static OPEN_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)"code"\s*:\s*"((?:[^"\\]|\\.)*)"#).expect("Invalid open code regex")
});

static OPEN_CATEGORIES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""categories"\s*:\s*\[([^\]]*)"#).expect("Invalid open categories regex")
});

static OPEN_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""description"\s*:\s*"([^"]*)"#).expect("Invalid open description regex")
});

/// Recover fields from a complete but unparseable object span.
pub fn scan_object(object: &str) -> PartialRecord {
    let code = CODE_RE.captures(object).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| unescape_code(m.as_str()))
    });

    let categories = CATEGORIES_RE
        .captures(object)
        .and_then(|caps| parse_category_list(&caps[1]));

    PartialRecord {
        title: capture(&TITLE_RE, object),
        code,
        categories,
        description: capture(&DESCRIPTION_RE, object),
    }
}

/// Recover fields from output that was cut off before the object closed.
///
/// `text` is the wrapper-stripped output and `raw` the original. The code
/// value is looked up in `raw` as well when the stripped text yields nothing
/// plausible, since stripping can sever the text before the code field.
pub fn scan_truncated(text: &str, raw: &str) -> PartialRecord {
    let mut code = capture(&OPEN_CODE_RE, text).unwrap_or_default();
    if code.len() < MIN_PLAUSIBLE_CODE_LEN {
        if let Some(from_raw) = capture(&OPEN_CODE_RE, raw) {
            code = from_raw;
        }
    }

    let categories = OPEN_CATEGORIES_RE.captures(text).and_then(|caps| {
        caps[1]
            .replace('"', "")
            .split(',')
            .next()
            .map(|first| vec![first.trim().to_string()])
    });

    PartialRecord {
        title: capture(&TITLE_RE, text),
        code: Some(unescape_code(&code)).filter(|c| !c.is_empty()),
        categories,
        description: capture(&OPEN_DESCRIPTION_RE, text),
    }
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Parse the inside of a `[...]` list as a JSON array of strings.
fn parse_category_list(inner: &str) -> Option<Vec<String>> {
    let items: Vec<Value> = serde_json::from_str(&format!("[{}]", inner)).ok()?;
    Some(
        items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    )
}

fn unescape_code(code: &str) -> String {
    code.replace("\\\"", "\"").replace("\\n", "\n")
}
