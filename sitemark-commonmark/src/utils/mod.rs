pub mod codeblock;

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use regex::Regex;

/// Create a regex that never matches anything.
///
/// Used as the fallback when one of the static patterns fails to compile.
#[must_use]
pub fn never_matching_regex() -> Regex {
  #[allow(
    clippy::expect_used,
    reason = "This pattern is guaranteed to be valid"
  )]
  Regex::new(r"[^\s\S]").expect("regex pattern [^\\s\\S] should always compile")
}

/// Percent-decode a link component, replacing invalid UTF-8 sequences.
#[must_use]
pub fn percent_decode(text: &str) -> Cow<'_, str> {
  percent_decode_str(text).decode_utf8_lossy()
}

/// Whether `target` starts with a URL scheme such as `https:` or `mailto:`.
#[must_use]
pub fn has_scheme(target: &str) -> bool {
  let Some((scheme, _)) = target.split_once(':') else {
    return false;
  };
  let mut chars = scheme.chars();
  chars.next().is_some_and(|c| c.is_ascii_alphabetic())
    && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Whether a link target is left untouched by resolution: site-absolute
/// paths, protocol-relative URLs and anything with a scheme.
#[must_use]
pub fn is_passthrough(target: &str) -> bool {
  target.starts_with('/') || has_scheme(target)
}
