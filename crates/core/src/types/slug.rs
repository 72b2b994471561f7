//! URL slugs derived from names and titles.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A URL-safe identifier such as `traditional-coffee-pot-jebena`.
///
/// Slugs are lowercase ASCII letters and digits separated by single dashes.
/// Characters outside that set are dropped; runs of whitespace, dashes and
/// underscores collapse into one dash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Fallback used when a name contains nothing sluggable (e.g. only Ge'ez script).
    pub const FALLBACK: &'static str = "item";

    /// Derive a slug from free text.
    ///
    /// ```
    /// use gebeya_core::Slug;
    ///
    /// assert_eq!(Slug::from_name("Home & Garden").as_str(), "home-garden");
    /// assert_eq!(Slug::from_name("Traditional Coffee Pot (Jebena)").as_str(),
    ///            "traditional-coffee-pot-jebena");
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let mut slug = String::with_capacity(name.len());
        let mut pending_dash = false;

        for ch in name.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(ch.to_ascii_lowercase());
            } else if ch.is_whitespace() || ch == '-' || ch == '_' {
                pending_dash = true;
            }
        }

        if slug.is_empty() {
            slug.push_str(Self::FALLBACK);
        }
        Self(slug)
    }

    /// Use `value` when present and non-blank, otherwise derive from `name`.
    #[must_use]
    pub fn or_from_name(value: Option<&str>, name: &str) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => Self::from_name(v),
            _ => Self::from_name(name),
        }
    }

    /// The `n`th alternative used after a uniqueness collision (`n >= 2`).
    #[must_use]
    pub fn with_suffix(&self, n: u32) -> Self {
        Self(format!("{}-{n}", self.0))
    }

    /// Wrap a slug read back from storage.
    #[must_use]
    pub const fn from_trusted(value: String) -> Self {
        Self(value)
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_separators() {
        assert_eq!(Slug::from_name("  Organic   Honey -- 1kg ").as_str(), "organic-honey-1kg");
        assert_eq!(Slug::from_name("snake_case_name").as_str(), "snake-case-name");
    }

    #[test]
    fn test_is_idempotent() {
        let once = Slug::from_name("Smartphone X1");
        let twice = Slug::from_name(once.as_str());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_non_latin_falls_back() {
        assert_eq!(Slug::from_name("ልብስ").as_str(), Slug::FALLBACK);
    }

    #[test]
    fn test_explicit_value_wins() {
        assert_eq!(Slug::or_from_name(Some("My Books"), "Books").as_str(), "my-books");
        assert_eq!(Slug::or_from_name(Some("  "), "Books").as_str(), "books");
        assert_eq!(Slug::or_from_name(None, "Books").as_str(), "books");
    }

    #[test]
    fn test_suffix() {
        assert_eq!(Slug::from_name("Books").with_suffix(2).as_str(), "books-2");
    }
}
