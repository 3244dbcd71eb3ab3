//! Tag format rules.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::catalog::Resource;

static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn tag_pattern() -> &'static Regex {
    TAG_PATTERN.get_or_init(|| {
        Regex::new(r"^[a-z0-9\-]+(/[a-z0-9\-]+)*$").expect("tag pattern is a valid regex")
    })
}

/// Lowercase letters, digits and hyphens, in `/`-separated segments
pub fn is_valid_tag(tag: &str) -> bool {
    tag_pattern().is_match(tag)
}

/// What is wrong with a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagIssueKind {
    InvalidFormat,
    TrailingSlash,
    DoubleSlash,
    LeadingSlash,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagIssue {
    pub resource: String,
    pub tag: String,
    pub kind: TagIssueKind,
}

impl fmt::Display for TagIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self.kind {
            TagIssueKind::InvalidFormat => "Invalid tag format",
            TagIssueKind::TrailingSlash => "Tag ends with slash",
            TagIssueKind::DoubleSlash => "Double slash in tag",
            TagIssueKind::LeadingSlash => "Tag starts with slash",
        };
        write!(f, "{} in '{}': {}", what, self.resource, self.tag)
    }
}

/// Every issue for one tag. The slash checks are reported in addition to
/// the format failure they imply.
pub fn check_tag(tag: &str) -> Vec<TagIssueKind> {
    let mut kinds = Vec::new();

    if !is_valid_tag(tag) {
        kinds.push(TagIssueKind::InvalidFormat);
    }
    if tag.ends_with('/') {
        kinds.push(TagIssueKind::TrailingSlash);
    }
    if tag.contains("//") {
        kinds.push(TagIssueKind::DoubleSlash);
    }
    if tag.starts_with('/') {
        kinds.push(TagIssueKind::LeadingSlash);
    }

    kinds
}

/// Validate every tag of every resource
pub fn validate(resources: &[Resource]) -> Vec<TagIssue> {
    resources
        .iter()
        .flat_map(|resource| {
            resource.tags.iter().flat_map(move |tag| {
                check_tag(tag).into_iter().map(move |kind| TagIssue {
                    resource: resource.label().to_string(),
                    tag: tag.clone(),
                    kind,
                })
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_tags() {
        for tag in ["tools", "tools/dev", "libraries/python/ml", "web-resources/a-b/3d"] {
            assert!(is_valid_tag(tag), "{}", tag);
            assert!(check_tag(tag).is_empty(), "{}", tag);
        }
    }

    #[test]
    fn test_invalid_tags() {
        for tag in ["Tools", "tools dev", "tools_dev", "", "tools/", "/tools"] {
            assert!(!is_valid_tag(tag), "{}", tag);
        }
    }

    #[test]
    fn test_slash_issues_are_reported_separately() {
        assert_eq!(
            check_tag("/a//b/"),
            vec![
                TagIssueKind::InvalidFormat,
                TagIssueKind::TrailingSlash,
                TagIssueKind::DoubleSlash,
                TagIssueKind::LeadingSlash,
            ]
        );
    }

    #[test]
    fn test_validate_names_resource() {
        let resources = vec![
            Resource::new("Good", "https://a.org", "").with_tag("tools/dev"),
            Resource::new("Bad", "https://b.org", "").with_tag("Tools/Dev"),
        ];

        let issues = validate(&resources);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].to_string(),
            "Invalid tag format in 'Bad': Tools/Dev"
        );
    }
}
