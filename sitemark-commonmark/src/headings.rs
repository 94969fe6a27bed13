//! Hierarchical heading anchors.
use std::sync::LazyLock;

use regex::Regex;

use crate::{
  slug::{slugify, strip_numbered},
  utils::never_matching_regex,
};

static EXPLICIT_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?s)^(.*?)[ \t]*\{#([^\s{}]+)\}[ \t]*$")
    .unwrap_or_else(|e| {
      log::error!("Failed to compile EXPLICIT_ID_RE regex: {e}");
      never_matching_regex()
    })
});

/// Chain of ancestor headings of the current position in a document.
///
/// Slot `n` holds the cleaned text of the latest heading of level `n + 1`.
/// A new heading truncates the chain to its own level first, so a sibling
/// replaces the previous sibling instead of nesting under it.
///
/// One stack is created per rendered document and never shared.
#[derive(Debug, Clone, Default)]
pub struct HeadingStack {
  slots: Vec<String>,
}

impl HeadingStack {
  #[must_use]
  pub const fn new() -> Self {
    Self { slots: Vec::new() }
  }

  /// Record a heading and return its hierarchical anchor.
  ///
  /// `level` is clamped to `1..=6`. Skipped levels leave empty slots, which
  /// are ignored when the anchor is joined.
  pub fn observe(&mut self, level: u8, text: &str) -> String {
    let level = usize::from(level.clamp(1, 6));
    self.slots.truncate(level - 1);
    self.slots.resize(level - 1, String::new());
    self.slots.push(text.to_string());
    self.anchor()
  }

  /// Anchor for the current chain: each slot slugified on its own, with a
  /// leading `N. ` removed, then joined with `-`.
  #[must_use]
  pub fn anchor(&self) -> String {
    self
      .slots
      .iter()
      .map(|text| slugify(strip_numbered(text)))
      .filter(|slug| !slug.is_empty())
      .collect::<Vec<_>>()
      .join("-")
  }

  #[must_use]
  pub fn depth(&self) -> usize {
    self.slots.len()
  }
}

/// Split a trailing `{#id}` off heading text.
///
/// Returns the text before the marker, with trailing blanks removed, and the
/// id. Text without a marker yields `None`.
#[must_use]
pub fn split_explicit_id(text: &str) -> Option<(&str, &str)> {
  let caps = EXPLICIT_ID_RE.captures(text)?;
  Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn siblings_replace_each_other() {
    let mut stack = HeadingStack::new();
    assert_eq!(stack.observe(1, "A"), "a");
    assert_eq!(stack.observe(2, "B"), "a-b");
    assert_eq!(stack.observe(2, "C"), "a-c");
    assert_eq!(stack.observe(3, "D"), "a-c-d");
    assert_eq!(stack.observe(1, "E"), "e");
    assert_eq!(stack.depth(), 1);
  }

  #[test]
  fn level_jumps_leave_empty_slots() {
    let mut stack = HeadingStack::new();
    assert_eq!(stack.observe(1, "Top"), "top");
    assert_eq!(stack.observe(3, "Deep"), "top-deep");
    assert_eq!(stack.depth(), 3);
    assert_eq!(stack.observe(2, "Mid"), "top-mid");
  }

  #[test]
  fn first_heading_below_h1() {
    let mut stack = HeadingStack::new();
    assert_eq!(stack.observe(3, "Only"), "only");
  }

  #[test]
  fn numbered_prefix_is_dropped() {
    let mut stack = HeadingStack::new();
    stack.observe(1, "Мультимедиа");
    assert_eq!(
      stack.observe(2, "7. Выбор приложения навигации"),
      "мультимедиа-выбор-приложения-навигации"
    );
  }

  #[test]
  fn unsluggable_heading_is_skipped_in_join() {
    let mut stack = HeadingStack::new();
    stack.observe(1, "!!!");
    assert_eq!(stack.observe(2, "Child"), "child");
  }

  #[test]
  fn splits_explicit_id() {
    assert_eq!(
      split_explicit_id("Section {#custom-anchor}"),
      Some(("Section", "custom-anchor"))
    );
    assert_eq!(split_explicit_id("Sub\t{#sub}  "), Some(("Sub", "sub")));
    assert_eq!(split_explicit_id("{#only}"), Some(("", "only")));
    assert_eq!(split_explicit_id("Not {#an id}"), None);
    assert_eq!(split_explicit_id("Trailing {#a} text"), None);
    assert_eq!(split_explicit_id("Plain"), None);
  }
}
