#![allow(clippy::unwrap_used, reason = "Fine in tests")]

use proptest::prelude::*;
use sitemark_commonmark::{
  HeadingStack,
  LinkResolver,
  MarkdownProcessor,
  MarkdownResult,
  github_slug,
  slugify,
};
use sitemark_sitemap::PageRegistry;

fn render(markdown: &str) -> MarkdownResult {
  let registry = PageRegistry::default();
  MarkdownProcessor::default()
    .render(markdown, "index.md", &LinkResolver::new(&registry))
    .unwrap()
}

proptest! {
  #[test]
  fn slugify_is_idempotent(text in "\\PC*") {
    let once = slugify(&text);
    prop_assert_eq!(slugify(&once), once.clone());
    prop_assert!(!once.starts_with('-'));
    prop_assert!(!once.ends_with('-'));
    prop_assert!(!once.contains("--"));
  }

  #[test]
  fn github_slug_never_panics(text in "\\PC*") {
    let slug = github_slug(&text);
    prop_assert!(!slug.starts_with('-'));
    prop_assert!(!slug.contains("--"));
  }
}

#[test]
fn sibling_is_truncated_from_anchor() {
  let result = render("# A\n\n## B\n\n## C\n");
  let ids: Vec<_> = result.headers.iter().map(|h| h.id.as_str()).collect();
  assert_eq!(ids, vec!["a", "a-b", "a-c"]);
  assert!(!ids[2].contains('b'));
}

#[test]
fn numbered_cyrillic_heading() {
  let result = render("# Мультимедиа\n\n## 7. Выбор приложения навигации\n");
  let heading = &result.headers[1];
  assert_eq!(heading.id, "мультимедиа-выбор-приложения-навигации");
  assert!(
    heading
      .aliases
      .contains(&"7-выбор-приложения-навигации".to_string())
  );
  assert!(heading.aliases.contains(&"выбор-приложения-навигации".to_string()));
  assert!(result.html.contains(
    "<h2 id=мультимедиа-выбор-приложения-навигации><a \
     href=#мультимедиа-выбор-приложения-навигации class=anchor>"
  ));
}

#[test]
fn single_heading_anchor() {
  let result = render("# Test Heading\n");
  assert_eq!(result.headers[0].id, "test-heading");
  assert_eq!(result.headers[0].id, slugify("Test Heading"));
  assert!(result.html.contains("<h1 id=test-heading>"));
}

#[test]
fn explicit_anchor_is_used_verbatim() {
  let result = render("# Section {#custom-anchor}\n\nText.\n");
  assert_eq!(result.headers[0].id, "custom-anchor");
  assert_eq!(result.headers[0].text, "Section");
  assert!(result.html.contains("<h1 id=custom-anchor><a href=#custom-anchor"));
  assert!(!result.html.contains("{#custom-anchor}"));
}

#[test]
fn explicit_anchor_still_feeds_the_stack() {
  let result = render("# Guide {#start}\n\n## Install\n");
  assert_eq!(result.headers[0].id, "start");
  assert_eq!(result.headers[1].id, "guide-install");
}

#[test]
fn version_number_github_slug() {
  assert_eq!(github_slug("2.0.5"), "205");
  let result = render("# Changelog\n\n## 2.0.5\n");
  assert_eq!(result.headers[1].id, "changelog-205");
  assert!(result.headers[1].aliases.contains(&"205".to_string()));
}

#[test]
fn heading_stack_matches_rendered_ids() {
  let md = "# Top\n### Deep\n## Mid\n#### Deeper\n# Next\n";
  let mut stack = HeadingStack::new();
  let expected: Vec<String> = [
    (1, "Top"),
    (3, "Deep"),
    (2, "Mid"),
    (4, "Deeper"),
    (1, "Next"),
  ]
  .iter()
  .map(|(level, text)| stack.observe(*level, text))
  .collect();
  let rendered: Vec<String> =
    render(md).headers.into_iter().map(|h| h.id).collect();
  assert_eq!(rendered, expected);
  assert_eq!(rendered, vec![
    "top",
    "top-deep",
    "top-mid",
    "top-mid-deeper",
    "next"
  ]);
}

#[test]
fn anchor_needing_quotes_is_quoted() {
  let result = render("# Intro\n\n## Part {#a=b}\n");
  assert!(
    result
      .html
      .contains("<h2 id=\"a=b\"><a href=\"#a=b\" class=anchor>")
  );
}

#[test]
fn custom_anchor_class() {
  let options = sitemark_commonmark::MarkdownOptionsBuilder::new()
    .anchor_class("permalink")
    .build();
  let registry = PageRegistry::default();
  let result = MarkdownProcessor::new(options)
    .render("# Hi\n", "index.md", &LinkResolver::new(&registry))
    .unwrap();
  assert!(result.html.contains("<a href=#hi class=permalink>Hi</a>"));
}

#[test]
fn headings_in_code_blocks_are_ignored() {
  let result = render("# Real\n\n```\n# Not a heading {#nope}\n```\n");
  assert_eq!(result.headers.len(), 1);
  assert!(result.html.contains("# Not a heading {#nope}"));
}
