//! AST and HTML transformations layered on top of comrak.
use std::{borrow::Cow, collections::HashMap, sync::LazyLock};

use comrak::nodes::{AstNode, NodeValue};
use regex::{Captures, Regex};

use super::{core::extract_inline_text, types::AstTransformer};
use crate::utils::never_matching_regex;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(
    r#"(?s)<h([1-6]) data-sourcepos="(\d+):(\d+)-[^"]*">(.*?)</h[1-6]>"#,
  )
  .unwrap_or_else(|e| {
    log::error!("Failed to compile HEADING_RE regex: {e}");
    never_matching_regex()
  })
});

static SOURCEPOS_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#" data-sourcepos="[^"]*""#).unwrap_or_else(|e| {
    log::error!("Failed to compile SOURCEPOS_RE regex: {e}");
    never_matching_regex()
  })
});

static LINK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"</?a(?:\s[^>]*)?>").unwrap_or_else(|e| {
    log::error!("Failed to compile LINK_TAG_RE regex: {e}");
    never_matching_regex()
  })
});

/// Supported `@[provider](id)` embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoProvider {
  Youtube,
  Vimeo,
}

impl VideoProvider {
  #[must_use]
  pub fn from_label(label: &str) -> Option<Self> {
    match label.trim().to_ascii_lowercase().as_str() {
      "youtube" => Some(Self::Youtube),
      "vimeo" => Some(Self::Vimeo),
      _ => None,
    }
  }

  const fn name(self) -> &'static str {
    match self {
      Self::Youtube => "youtube",
      Self::Vimeo => "vimeo",
    }
  }

  const fn embed_base(self) -> &'static str {
    match self {
      Self::Youtube => "https://www.youtube.com/embed/",
      Self::Vimeo => "https://player.vimeo.com/video/",
    }
  }

  /// Player markup for the video `id`.
  #[must_use]
  pub fn iframe(self, id: &str) -> String {
    let src = format!("{}{}", self.embed_base(), id.trim());
    format!(
      "<iframe class=\"video video_{}\" src=\"{}\" frameborder=\"0\" \
       allowfullscreen></iframe>",
      self.name(),
      html_escape::encode_double_quoted_attribute(&src)
    )
  }
}

/// Replaces `@[youtube](id)` and `@[vimeo](id)` with embedded players.
///
/// comrak parses the syntax as a text node ending in `@` followed by a link
/// labelled with the provider name; both are rewritten in place.
pub struct VideoEmbedTransformer;

impl AstTransformer for VideoEmbedTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    let links: Vec<_> = node
      .descendants()
      .filter(|n| matches!(n.data.borrow().value, NodeValue::Link(..)))
      .collect();

    for link in links {
      let Some(provider) = VideoProvider::from_label(&extract_inline_text(link))
      else {
        continue;
      };
      let Some(prev) = link.previous_sibling() else {
        continue;
      };

      {
        let mut prev_data = prev.data.borrow_mut();
        let NodeValue::Text(text) = &mut prev_data.value else {
          continue;
        };
        let Some(stripped) = text.strip_suffix('@') else {
          continue;
        };
        let stripped = stripped.to_string();
        *text = stripped.into();
      }

      let html = {
        let data = link.data.borrow();
        match &data.value {
          NodeValue::Link(target) => provider.iframe(&target.url),
          _ => continue,
        }
      };

      let children: Vec<_> = link.children().collect();
      for child in children {
        child.detach();
      }
      link.data.borrow_mut().value = NodeValue::HtmlInline(html);
    }
  }
}

/// Render an HTML attribute value, quoted only when it has to be.
#[must_use]
pub fn attribute_value(value: &str) -> Cow<'_, str> {
  let needs_quotes = value.is_empty()
    || value.chars().any(|c| {
      c.is_ascii_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '`')
    });

  if needs_quotes {
    Cow::Owned(format!(
      "\"{}\"",
      html_escape::encode_double_quoted_attribute(value)
    ))
  } else {
    Cow::Borrowed(value)
  }
}

/// Give every heading its anchor: `<hN id=ID><a href=#ID class=CLASS>..`.
///
/// Headings are matched by the source position comrak writes into
/// `data-sourcepos`, so raw `<hN>` tags written by authors are left alone.
/// Links inside an anchored heading are reduced to their text, since anchors
/// cannot nest.
#[must_use]
pub fn inject_heading_anchors(
  html: &str,
  anchors: &HashMap<(usize, usize), String>,
  class: &str,
) -> String {
  HEADING_RE
    .replace_all(html, |caps: &Captures| {
      let position = (
        caps[2].parse::<usize>().unwrap_or_default(),
        caps[3].parse::<usize>().unwrap_or_default(),
      );
      let level = &caps[1];
      let inner = &caps[4];

      match anchors.get(&position) {
        Some(id) => {
          format!(
            "<h{level} id={id}><a href={href} \
             class={class}>{inner}</a></h{level}>",
            inner = LINK_TAG_RE.replace_all(inner, ""),
            id = attribute_value(id),
            href = attribute_value(&format!("#{id}")),
            class = attribute_value(class),
          )
        },
        None => format!("<h{level}>{inner}</h{level}>"),
      }
    })
    .into_owned()
}

/// Remove the `data-sourcepos` attributes left by the renderer.
#[must_use]
pub fn strip_sourcepos(html: &str) -> String {
  SOURCEPOS_RE.replace_all(html, "").into_owned()
}
