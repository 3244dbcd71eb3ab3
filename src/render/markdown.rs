//! GitHub-flavoured markdown listing of the catalog.

use crate::catalog::{Resource, TagTree};

use super::badges::badges;
use super::{category_icon, title_case};

/// Render every category down to `max_depth` (0 = top level only)
pub fn render_markdown(tree: &TagTree, resources: &[Resource], max_depth: usize) -> String {
    render_level(tree, resources, 0, max_depth)
}

fn render_level(node: &TagTree, resources: &[Resource], depth: usize, max_depth: usize) -> String {
    if depth > max_depth {
        return String::new();
    }

    let mut lines = Vec::new();

    for (category, child) in &node.children {
        let total = child.count_items();
        if total == 0 {
            continue;
        }

        lines.push(format!(
            "\n{} {} {} ({})\n",
            "#".repeat(depth + 3),
            category_icon(category),
            title_case(category),
            total
        ));

        for resource in child.sorted_items(resources) {
            lines.push(format!(
                "- **[{}]({})** - {}",
                resource.display_name(),
                resource.url_str(),
                resource.display_description()
            ));

            let found = badges(resource.url_str(), &resource.tags);
            if !found.is_empty() {
                let rendered: Vec<String> = found.iter().map(|b| b.to_markdown()).collect();
                lines.push(format!("  {}", rendered.join(" ")));
            }
        }

        let nested = render_level(child, resources, depth + 1, max_depth);
        if !nested.is_empty() {
            lines.push(nested);
        }
    }

    lines.join("\n")
}
