//! Heading text to anchor conversion.
//!
//! Two flavors are produced from the same heading text. [`slugify`] builds
//! the site's own anchors and is restricted to Latin, digits and Cyrillic.
//! [`github_slug`] reproduces the anchors GitHub generates, so links written
//! against a repository rendering of the content keep resolving.
use std::sync::LazyLock;

use regex::Regex;

use crate::utils::never_matching_regex;

static NUMBERED_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^(\d+)\.\s+(.+)$").unwrap_or_else(|e| {
    log::error!("Failed to compile NUMBERED_RE regex: {e}");
    never_matching_regex()
  })
});

static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^\d+(?:\.\d+)+$").unwrap_or_else(|e| {
    log::error!("Failed to compile VERSION_RE regex: {e}");
    never_matching_regex()
  })
});

/// Punctuation removed by the GitHub flavor. Hyphen and underscore are not
/// part of the set; they are treated as separators.
const GITHUB_PUNCTUATION: &str = "!\"#$%&'()*+,./:;<=>?@[\\]^`{|}~";

const fn is_anchor_char(ch: char) -> bool {
  matches!(ch, 'a'..='z' | '0'..='9' | 'ё' | '\u{0400}'..='\u{04FF}')
}

/// Build an anchor from `text` by streaming over its lowercased characters.
///
/// Separator characters request a hyphen that is only emitted between two
/// kept characters, which collapses runs and trims both ends. Dropped
/// characters neither emit nor cancel a pending hyphen.
fn build_slug(
  text: &str,
  is_separator: impl Fn(char) -> bool,
  keep: impl Fn(char) -> bool,
) -> String {
  let mut slug = String::with_capacity(text.len());
  let mut pending_hyphen = false;

  for ch in text.chars().flat_map(char::to_lowercase) {
    if is_separator(ch) {
      pending_hyphen = true;
    } else if keep(ch) {
      if pending_hyphen && !slug.is_empty() {
        slug.push('-');
      }
      pending_hyphen = false;
      slug.push(ch);
    }
  }

  slug
}

/// Hierarchical-flavor slug.
///
/// Lowercases, turns path separators, whitespace and underscores into
/// hyphens, drops everything outside `[a-z0-9а-яё\u{0400}-\u{04FF}-]`, and
/// collapses and trims hyphens. The result may be empty.
///
/// # Examples
///
/// ```
/// use sitemark_commonmark::slugify;
///
/// assert_eq!(slugify("Test Heading"), "test-heading");
/// assert_eq!(slugify("Выбор приложения"), "выбор-приложения");
/// assert_eq!(slugify("docs/api_v2"), "docs-api-v2");
/// ```
#[must_use]
pub fn slugify(text: &str) -> String {
  build_slug(
    text,
    |ch| matches!(ch, '/' | '\\' | '_' | '-') || ch.is_whitespace(),
    is_anchor_char,
  )
}

/// GitHub-compatible slug.
///
/// Punctuation is dropped rather than hyphenated, so `a.b` becomes `ab`. A
/// heading that is only a dotted version number therefore loses its dots:
/// `2.0.5` becomes `205`.
#[must_use]
pub fn github_slug(text: &str) -> String {
  let trimmed = text.trim();
  if VERSION_RE.is_match(trimmed) {
    return trimmed.replace('.', "");
  }

  build_slug(
    trimmed,
    |ch| matches!(ch, '_' | '-') || ch.is_whitespace(),
    |ch| !GITHUB_PUNCTUATION.contains(ch) && !ch.is_control(),
  )
}

/// Split a numbered heading like `7. Title` into `("7", "Title")`.
#[must_use]
pub fn split_numbered(text: &str) -> Option<(&str, &str)> {
  let caps = NUMBERED_RE.captures(text.trim())?;
  let number = caps.get(1)?.as_str();
  let rest = caps.get(2)?.as_str();
  Some((number, rest))
}

/// Heading text with any `N. ` prefix removed.
#[must_use]
pub fn strip_numbered(text: &str) -> &str {
  split_numbered(text).map_or(text, |(_, rest)| rest)
}

/// Alternative anchors under which a heading may be referenced.
///
/// Covers the GitHub slug of the raw text, the plain slug of the heading's
/// own text and, for numbered headings, the GitHub slug without the number,
/// the slug of the remainder and the `N-remainder` form. Forms equal to `id`
/// or empty are omitted; the order is stable.
#[must_use]
pub fn heading_aliases(text: &str, id: &str) -> Vec<String> {
  let mut candidates = vec![github_slug(text), slugify(text)];

  if let Some((number, rest)) = split_numbered(text) {
    let remainder = slugify(rest);
    candidates.push(github_slug(rest));
    candidates.push(format!("{number}-{remainder}"));
    candidates.push(remainder);
  }

  let mut aliases: Vec<String> = Vec::with_capacity(candidates.len());
  for candidate in candidates {
    if !candidate.is_empty() && candidate != id && !aliases.contains(&candidate)
    {
      aliases.push(candidate);
    }
  }
  aliases
}
