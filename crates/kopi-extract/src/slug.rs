//! URL slug derivation.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum slug length in characters.
pub const MAX_SLUG_LEN: usize = 50;

static DISALLOWED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("Invalid disallowed-char regex"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid whitespace regex"));

static HYPHENS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("Invalid hyphen regex"));

/// Convert a title to a lowercase, hyphenated, alphanumeric slug.
///
/// The result never starts or ends with a hyphen, never contains repeated
/// hyphens and is at most [`MAX_SLUG_LEN`] characters long. Uniqueness is not
/// guaranteed; callers check for existing records before persisting.
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    let kept = DISALLOWED_RE.replace_all(&lower, "");
    let hyphenated = WHITESPACE_RE.replace_all(&kept, "-");
    let collapsed = HYPHENS_RE.replace_all(&hyphenated, "-");

    let truncated: String = collapsed
        .trim_matches('-')
        .chars()
        .take(MAX_SLUG_LEN)
        .collect();

    // Truncation can expose a hyphen at the cut point.
    truncated.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugifies_titles() {
        assert_eq!(slugify("My Cool Card!!"), "my-cool-card");
        assert_eq!(slugify("Card"), "card");
        assert_eq!(slugify("Glass  Morphism -- Login"), "glass-morphism-login");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
    }

    #[test]
    fn blank_title_gives_empty_slug() {
        assert_eq!(slugify("   "), "");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn drops_non_ascii_letters() {
        assert_eq!(slugify("Café Menü"), "caf-men");
    }

    #[test]
    fn truncates_without_trailing_hyphen() {
        let title = "a".repeat(49) + " bcd";
        let slug = slugify(&title);

        assert_eq!(slug, "a".repeat(49));
        assert!(slug.len() <= MAX_SLUG_LEN);

        let long = "word ".repeat(30);
        let slug = slugify(&long);
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn slugify_is_idempotent() {
        for title in ["My Cool Card!!", "Dark Theme Dashboard Widget", "a-b  c"] {
            let once = slugify(title);
            assert_eq!(slugify(&once), once);
        }
    }
}
