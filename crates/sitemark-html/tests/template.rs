#![allow(clippy::unwrap_used, reason = "Fine in tests")]

use std::fs;

use sitemark_commonmark::{LinkResolver, MarkdownProcessor};
use sitemark_html::{PageRenderer, TemplateError};
use sitemark_sitemap::{PageRegistry, parse_sitemap};
use tempfile::TempDir;

const SITEMAP: &str = "sitemap:
  - Home [/, index.md]
  - Free [free, free/index.md]
    - Models [models, free/models.md, {layout: 'wide.html'}]
";

fn registry() -> PageRegistry {
  PageRegistry::flatten(&parse_sitemap(SITEMAP).unwrap())
}

#[test]
fn default_layout_wraps_content() {
  let registry = registry();
  let renderer = PageRenderer::new(None, &registry).unwrap();
  let resolver = LinkResolver::new(&registry);
  let document = MarkdownProcessor::default()
    .render(
      "# Free\n\n## Plans\n\nSee [models](models.md).",
      "free/index.md",
      &resolver,
    )
    .unwrap();

  let page = registry.page("/free").unwrap();
  let html = renderer.render_page(&registry, page, &document).unwrap();

  assert!(html.contains("<title>Free | Home</title>"));
  assert!(html.contains("<h2 id=free-plans>"));
  assert!(html.contains("href=\"/free/models\""));
  assert!(html.contains("<a href=\"#free-plans\">Plans</a>"));
  assert!(
    html.contains("<li class=\"active\"><a href=\"/free\">Free</a></li>")
  );
}

#[test]
fn missing_layout_fails_only_its_page() {
  let registry = registry();
  let renderer = PageRenderer::new(None, &registry).unwrap();
  let resolver = LinkResolver::new(&registry);
  let document = MarkdownProcessor::default()
    .render("# Models", "free/models.md", &resolver)
    .unwrap();

  let models = registry.page("/free/models").unwrap();
  let err = renderer
    .render_page(&registry, models, &document)
    .unwrap_err();
  assert!(matches!(err, TemplateError::UnknownLayout { .. }));
  assert!(err.to_string().contains("free/models.md"));

  let home = registry.page("/").unwrap();
  renderer.render_page(&registry, home, &document).unwrap();
}

#[test]
fn layouts_come_from_template_dir() {
  let dir = TempDir::new().unwrap();
  fs::write(
    dir.path().join("default.html"),
    "<main data-url=\"{{ url }}\">{{ content | safe }}</main>",
  )
  .unwrap();
  fs::write(
    dir.path().join("wide.html"),
    "<div class=wide>{% for crumb in breadcrumbs %}{{ crumb.name }}/{% endfor \
     %}{{ name }}</div>",
  )
  .unwrap();

  let registry = registry();
  let renderer = PageRenderer::new(Some(dir.path()), &registry).unwrap();
  assert!(renderer.has_layout("wide.html"));

  let resolver = LinkResolver::new(&registry);
  let document = MarkdownProcessor::default()
    .render("Body text.", "free/models.md", &resolver)
    .unwrap();

  let models = registry.page("/free/models").unwrap();
  assert_eq!(
    renderer.render_page(&registry, models, &document).unwrap(),
    "<div class=wide>Free/Models</div>"
  );

  let home = registry.page("/").unwrap();
  let html = renderer.render_page(&registry, home, &document).unwrap();
  assert!(html.starts_with("<main data-url=\"/\">"));
}

#[test]
fn broken_template_is_reported() {
  let dir = TempDir::new().unwrap();
  fs::write(dir.path().join("wide.html"), "{% if %}").unwrap();

  let err = PageRenderer::new(Some(dir.path()), &registry()).unwrap_err();
  assert!(matches!(
    err,
    TemplateError::Parse { ref name, .. } if name == "wide.html"
  ));
}
