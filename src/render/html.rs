//! Category cards and the standalone site page.

use crate::catalog::{Resource, TagTree};
use crate::config::SiteSettings;

use super::badges::badges;
use super::{anchor, category_icon, title_case};

const STYLESHEET: &str = include_str!("assets/page.css");
const SEARCH_SCRIPT: &str = include_str!("assets/search.js");

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Cut `text` to `limit` characters, ending in `...` when shortened
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let kept: String = text.chars().take(limit.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Nested `<details>` cards for every category down to `max_depth`
pub fn render_html(
    tree: &TagTree,
    resources: &[Resource],
    max_depth: usize,
    description_limit: usize,
) -> String {
    render_level(tree, resources, 0, max_depth, description_limit)
}

fn render_level(
    node: &TagTree,
    resources: &[Resource],
    depth: usize,
    max_depth: usize,
    description_limit: usize,
) -> String {
    if depth > max_depth {
        return String::new();
    }

    let mut html = Vec::new();

    for (category, child) in &node.children {
        let total = child.count_items();
        if total == 0 {
            continue;
        }

        let title = title_case(category);
        html.push(format!(
            r#"<details class="category depth-{}" id="{}">"#,
            depth,
            escape_html(&anchor(&title))
        ));
        html.push(format!(
            concat!(
                r#"  <summary class="category-summary">"#,
                r#"<span class="category-icon">{}</span>"#,
                r#"<span class="category-title">{}</span> "#,
                r#"<span class="category-count">({})</span>"#,
                "</summary>"
            ),
            category_icon(category),
            escape_html(&title),
            total
        ));

        let items = child.sorted_items(resources);
        if !items.is_empty() {
            html.push(r#"  <ul class="items-list">"#.to_string());
            for resource in items {
                html.push(render_item(resource, description_limit));
            }
            html.push("  </ul>".to_string());
        }

        let nested = render_level(child, resources, depth + 1, max_depth, description_limit);
        if !nested.is_empty() {
            html.push(nested);
        }

        html.push("</details>".to_string());
    }

    html.join("\n")
}

fn render_item(resource: &Resource, description_limit: usize) -> String {
    let url = resource.url_str();
    let badge_html: Vec<String> = badges(url, &resource.tags)
        .iter()
        .map(|b| b.to_html())
        .collect();

    format!(
        concat!(
            r#"    <li class="resource-item">"#,
            r#"<div class="resource-content">"#,
            r#"<h4 class="resource-name"><a href="{}" target="_blank" rel="noopener noreferrer">{}</a></h4>"#,
            r#"<p class="resource-description">{}</p>"#,
            r#"<div class="resource-badges">{}</div>"#,
            "</div></li>"
        ),
        escape_html(url),
        escape_html(resource.display_name()),
        escape_html(&truncate(resource.display_description(), description_limit)),
        badge_html.join(" ")
    )
}

/// The complete `index.html` with styles, search box, cards and script
pub fn render_page(
    tree: &TagTree,
    resources: &[Resource],
    site: &SiteSettings,
    max_depth: usize,
    description_limit: usize,
) -> String {
    let title = escape_html(&site.title);
    let total = tree.count_items();
    let categories = tree.children.len();

    let repo_link = site
        .repo_url
        .as_deref()
        .map(|url| {
            format!(
                r#"    <p class="site-links"><a href="{}" target="_blank" rel="noopener noreferrer">View on GitHub</a></p>"#,
                escape_html(url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>
{style}
  </style>
</head>
<body>
  <header class="site-header">
    <h1>{title}</h1>
    <p class="site-meta">{total} resources across {categories} categories</p>
{repo_link}
  </header>
  <input type="search" id="resource-search" placeholder="Search resources... (Ctrl+K)" aria-label="Search resources">
  <main class="categories">
{cards}
  </main>
  <script>
{script}
  </script>
</body>
</html>
"#,
        title = title,
        style = STYLESHEET,
        total = total,
        categories = categories,
        repo_link = repo_link,
        cards = render_html(tree, resources, max_depth, description_limit),
        script = SEARCH_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
        assert_eq!(truncate("this is too long", 10), "this is...");
        assert_eq!(truncate("ééééééé", 6), "ééé...");
    }

    #[test]
    fn test_cards() {
        let resources = vec![
            Resource::new("A <b>", "https://a.org?x=1&y=2", "desc").with_tag("web-resources/blogs"),
        ];
        let tree = TagTree::build(&resources);
        let html = render_html(&tree, &resources, 3, 150);

        assert!(html.contains(r#"<details class="category depth-0" id="web-resources">"#));
        assert!(html.contains(r#"<span class="category-title">Web Resources</span> "#));
        assert!(html.contains(r#"<details class="category depth-1" id="blogs">"#));
        assert!(html.contains(r#"<a href="https://a.org?x=1&amp;y=2""#));
        assert!(html.contains(">A &lt;b&gt;</a>"));
        assert_eq!(html.matches("</details>").count(), 2);
    }

    #[test]
    fn test_long_description_cut() {
        let long = "x".repeat(200);
        let resources = vec![Resource::new("A", "https://a.org", long).with_tag("t")];
        let tree = TagTree::build(&resources);
        let html = render_html(&tree, &resources, 3, 150);

        let expected = format!(r#"<p class="resource-description">{}...</p>"#, "x".repeat(147));
        assert!(html.contains(&expected));
    }

    #[test]
    fn test_page_shell() {
        let resources = vec![Resource::new("A", "https://a.org", "d").with_tag("tools")];
        let tree = TagTree::build(&resources);
        let site = SiteSettings {
            repo_url: Some("https://github.com/me/hub".to_string()),
            ..SiteSettings::default()
        };
        let page = render_page(&tree, &resources, &site, 3, 150);

        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>AI Resources</title>"));
        assert!(page.contains(r#"id="resource-search""#));
        assert!(page.contains("1 resources across 1 categories"));
        assert!(page.contains("https://github.com/me/hub"));
        assert!(page.contains("prefers-color-scheme: dark"));
        assert!(page.contains("e.key === 'k'"));
    }
}
