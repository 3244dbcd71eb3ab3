//! Nested grouping of resources by hierarchical tag.
//!
//! `tools/dev/editors` files a resource under `tools` → `dev` → `editors`.
//! A resource with several tags appears once per tag.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::resource::Resource;

/// One node of the tag tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagTree {
    /// Indices into the resource list filed directly at this node
    pub items: Vec<usize>,

    /// Child nodes keyed by tag segment
    pub children: BTreeMap<String, TagTree>,
}

/// Split a tag into trimmed, non-empty segments
pub fn tag_segments(tag: &str) -> Vec<&str> {
    tag.split('/')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect()
}

impl TagTree {
    /// Build the tree for a resource list
    pub fn build(resources: &[Resource]) -> Self {
        let mut root = TagTree::default();

        for (index, resource) in resources.iter().enumerate() {
            if resource.tags.is_empty() {
                tracing::warn!("Resource '{}' has no tags", resource.label());
                continue;
            }

            for tag in &resource.tags {
                let parts = tag_segments(tag);
                if parts.is_empty() {
                    continue;
                }

                let mut node = &mut root;
                for part in parts {
                    node = node.children.entry(part.to_string()).or_default();
                }
                node.items.push(index);
            }
        }

        root
    }

    /// Items at this node and every node below it
    pub fn count_items(&self) -> usize {
        self.items.len()
            + self
                .children
                .values()
                .map(TagTree::count_items)
                .sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.children.is_empty()
    }

    /// Resources filed at this node, sorted by lowercased name
    pub fn sorted_items<'a>(&self, resources: &'a [Resource]) -> Vec<&'a Resource> {
        let mut items: Vec<&Resource> = self
            .items
            .iter()
            .filter_map(|&i| resources.get(i))
            .collect();
        items.sort_by_key(|r| r.sort_key());
        items
    }

    /// Pair the tree with its resources for JSON output
    pub fn with_resources<'a>(&'a self, resources: &'a [Resource]) -> TreeView<'a> {
        TreeView {
            node: self,
            resources,
        }
    }
}

/// Serializable view of a tree node.
///
/// Each node becomes a JSON object whose `_items` key holds the full
/// resource records, followed by one key per child.
pub struct TreeView<'a> {
    node: &'a TagTree,
    resources: &'a [Resource],
}

struct ItemsView<'a> {
    indices: &'a [usize],
    resources: &'a [Resource],
}

impl Serialize for ItemsView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(
            self.indices
                .iter()
                .filter_map(|&i| self.resources.get(i)),
        )
    }
}

impl Serialize for TreeView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.node.children.len() + 1))?;
        map.serialize_entry(
            "_items",
            &ItemsView {
                indices: &self.node.items,
                resources: self.resources,
            },
        )?;
        for (key, child) in &self.node.children {
            map.serialize_entry(key, &child.with_resources(self.resources))?;
        }
        map.end()
    }
}

/// Top-level view: categories only, no root `_items`
pub struct CategoriesView<'a>(pub TreeView<'a>);

impl Serialize for CategoriesView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let view = &self.0;
        let mut map = serializer.serialize_map(Some(view.node.children.len()))?;
        for (key, child) in &view.node.children {
            map.serialize_entry(key, &child.with_resources(view.resources))?;
        }
        map.end()
    }
}
