//! Three-level view of the tag vocabulary.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::{tag_segments, Resource};

/// Resource names at `category/subcategory/item`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubcategoryNode {
    #[serde(rename = "_items", skip_serializing_if = "BTreeSet::is_empty")]
    pub items: BTreeSet<String>,

    #[serde(flatten)]
    pub subitems: BTreeMap<String, BTreeSet<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CategoryNode {
    #[serde(rename = "_items", skip_serializing_if = "BTreeSet::is_empty")]
    pub items: BTreeSet<String>,

    #[serde(flatten)]
    pub subcategories: BTreeMap<String, SubcategoryNode>,
}

/// category → subcategory → item, each level holding resource names.
/// Segments past the third are folded into the third level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TagHierarchy {
    pub categories: BTreeMap<String, CategoryNode>,
}

impl TagHierarchy {
    pub fn build(resources: &[Resource]) -> Self {
        let mut hierarchy = TagHierarchy::default();

        for resource in resources {
            let name = resource.label().to_string();

            for tag in &resource.tags {
                let parts = tag_segments(tag);
                let Some((&category, rest)) = parts.split_first() else {
                    continue;
                };

                let category = hierarchy
                    .categories
                    .entry(category.to_string())
                    .or_default();

                match rest {
                    [] => {
                        category.items.insert(name.clone());
                    }
                    [sub] => {
                        category
                            .subcategories
                            .entry(sub.to_string())
                            .or_default()
                            .items
                            .insert(name.clone());
                    }
                    [sub, item, ..] => {
                        category
                            .subcategories
                            .entry(sub.to_string())
                            .or_default()
                            .subitems
                            .entry(item.to_string())
                            .or_default()
                            .insert(name.clone());
                    }
                }
            }
        }

        hierarchy
    }
}

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Draw the unique tag paths as an ASCII tree, three levels deep
pub fn render_tree(resources: &[Resource]) -> String {
    let mut paths: BTreeMap<String, BTreeMap<String, BTreeSet<String>>> = BTreeMap::new();

    for tag in resources.iter().flat_map(|r| r.tags.iter()) {
        let parts = tag_segments(tag);
        let Some((&level1, rest)) = parts.split_first() else {
            continue;
        };

        let level2 = paths.entry(level1.to_string()).or_default();
        if let Some((&sub, rest)) = rest.split_first() {
            let level3 = level2.entry(sub.to_string()).or_default();
            if let Some(&item) = rest.first() {
                level3.insert(item.to_string());
            }
        }
    }

    let mut lines = Vec::new();
    for (level1, children) in &paths {
        lines.push(level1.clone());

        let child_count = children.len();
        for (j, (level2, leaves)) in children.iter().enumerate() {
            let last_child = j + 1 == child_count;
            lines.push(format!(
                "{}{}",
                if last_child { LAST_BRANCH } else { BRANCH },
                level2
            ));

            let leaf_count = leaves.len();
            for (k, level3) in leaves.iter().enumerate() {
                let guide = if last_child { SPACE } else { PIPE };
                let branch = if k + 1 == leaf_count { LAST_BRANCH } else { BRANCH };
                lines.push(format!("{}{}{}", guide, branch, level3));
            }
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Resource> {
        vec![
            Resource::new("Zed", "https://zed.dev", "").with_tag("tools/dev/editors"),
            Resource::new("Aider", "https://aider.chat", "")
                .with_tags(["tools/dev", "tools/cli"]),
            Resource::new("Transformer", "https://arxiv.org/abs/1706.03762", "")
                .with_tags(["papers", "papers/nlp"]),
        ]
    }

    #[test]
    fn test_hierarchy_levels() {
        let hierarchy = TagHierarchy::build(&catalog());

        let tools = &hierarchy.categories["tools"];
        assert!(tools.items.is_empty());
        assert!(tools.subcategories["dev"].items.contains("Aider"));
        assert!(tools.subcategories["dev"].subitems["editors"].contains("Zed"));

        let papers = &hierarchy.categories["papers"];
        assert!(papers.items.contains("Transformer"));
        assert!(papers.subcategories["nlp"].items.contains("Transformer"));
    }

    #[test]
    fn test_hierarchy_json() {
        let json = serde_json::to_value(TagHierarchy::build(&catalog())).unwrap();

        assert_eq!(json["tools"]["dev"]["editors"][0], "Zed");
        assert_eq!(json["tools"]["dev"]["_items"][0], "Aider");
        assert_eq!(json["papers"]["_items"][0], "Transformer");
    }

    #[test]
    fn test_render_tree() {
        let tree = render_tree(&catalog());
        let expected = [
            "papers",
            "└── nlp",
            "tools",
            "├── cli",
            "└── dev",
            "    └── editors",
        ]
        .join("\n");

        assert_eq!(tree, expected);
    }

    #[test]
    fn test_render_tree_pipe_guides() {
        let resources = vec![Resource::new("x", "https://x.org", "")
            .with_tags(["a/b/c", "a/b/d", "a/e"])];

        let expected = ["a", "├── b", "│   ├── c", "│   └── d", "└── e"].join("\n");
        assert_eq!(render_tree(&resources), expected);
    }
}
