//! shields.io badges derived from a resource's URL and tags.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use super::html::escape_html;

static GITHUB_REPO: OnceLock<Regex> = OnceLock::new();
static ARXIV_ABS: OnceLock<Regex> = OnceLock::new();

fn github_repo() -> &'static Regex {
    GITHUB_REPO.get_or_init(|| {
        Regex::new(r"^https://github\.com/([^/]+)/([^/.]+)").expect("github pattern is a valid regex")
    })
}

fn arxiv_abs() -> &'static Regex {
    ARXIV_ABS.get_or_init(|| {
        Regex::new(r"^https://arxiv\.org/abs/(\S+)").expect("arxiv pattern is a valid regex")
    })
}

const TUTORIAL_BADGE: &str =
    "https://img.shields.io/badge/Type-Tutorial-28a745?style=flat-square&logo=book";
const TOOL_BADGE: &str =
    "https://img.shields.io/badge/Type-Tool-17a2b8?style=flat-square&logo=tools";

/// One badge image, optionally wrapped in a link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub alt: String,
    pub image: String,
    pub link: Option<String>,
}

impl Badge {
    fn linked(alt: &str, image: String, link: String) -> Self {
        Self {
            alt: alt.to_string(),
            image,
            link: Some(link),
        }
    }

    fn plain(alt: &str, image: &str) -> Self {
        Self {
            alt: alt.to_string(),
            image: image.to_string(),
            link: None,
        }
    }

    /// `![alt](image)`; markdown badges are never linked
    pub fn to_markdown(&self) -> String {
        format!("![{}]({})", self.alt, self.image)
    }

    pub fn to_html(&self) -> String {
        let img = format!(
            r#"<img src="{}" alt="{}"/>"#,
            escape_html(&self.image),
            escape_html(&self.alt)
        );
        match &self.link {
            Some(link) => format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                escape_html(link),
                img
            ),
            None => img,
        }
    }
}

/// Badges for a resource, without duplicate images
pub fn badges(url: &str, tags: &[String]) -> Vec<Badge> {
    let mut found = Vec::new();

    if let Some(caps) = github_repo().captures(url) {
        let (owner, repo) = (&caps[1], &caps[2]);
        found.push(Badge::linked(
            "GitHub Stars",
            format!(
                "https://img.shields.io/github/stars/{}/{}?style=flat-square&logo=github&logoColor=white",
                owner, repo
            ),
            url.to_string(),
        ));
        found.push(Badge::linked(
            "Last Commit",
            format!(
                "https://img.shields.io/github/last-commit/{}/{}?style=flat-square&logo=github&logoColor=white",
                owner, repo
            ),
            format!("{}/commits", url),
        ));
    }

    if let Some(caps) = arxiv_abs().captures(url) {
        found.push(Badge::linked(
            "arXiv Paper",
            format!(
                "https://img.shields.io/badge/arXiv-{}-b31b1b?style=flat-square&logo=arxiv&logoColor=white",
                &caps[1]
            ),
            url.to_string(),
        ));
    }

    let tag_mentions = |needle: &str| tags.iter().any(|t| t.to_lowercase().contains(needle));
    if tag_mentions("tutorial") {
        found.push(Badge::plain("Tutorial", TUTORIAL_BADGE));
    } else if tag_mentions("tool") {
        found.push(Badge::plain("Tool", TOOL_BADGE));
    }

    let mut seen = HashSet::new();
    found.retain(|badge| seen.insert(badge.image.clone()));
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_github_badges() {
        let found = badges("https://github.com/pytorch/pytorch", &[]);

        assert_eq!(found.len(), 2);
        assert_eq!(
            found[0].image,
            "https://img.shields.io/github/stars/pytorch/pytorch?style=flat-square&logo=github&logoColor=white"
        );
        assert_eq!(
            found[1].link.as_deref(),
            Some("https://github.com/pytorch/pytorch/commits")
        );
    }

    #[test]
    fn test_github_repo_stops_at_dot() {
        let found = badges("https://github.com/owner/repo.git", &[]);
        assert!(found[0].image.contains("/stars/owner/repo?"));
    }

    #[test]
    fn test_arxiv_badge() {
        let found = badges("https://arxiv.org/abs/1706.03762", &[]);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].alt, "arXiv Paper");
        assert!(found[0].image.contains("arXiv-1706.03762-b31b1b"));
    }

    #[test]
    fn test_type_badge_prefers_tutorial() {
        let found = badges("https://example.com", &tags(&["tools/cli", "tutorials/intro"]));
        assert_eq!(found, vec![Badge::plain("Tutorial", TUTORIAL_BADGE)]);

        let found = badges("https://example.com", &tags(&["Tools/CLI"]));
        assert_eq!(found, vec![Badge::plain("Tool", TOOL_BADGE)]);

        assert!(badges("https://example.com", &tags(&["papers"])).is_empty());
    }

    #[test]
    fn test_markdown_and_html() {
        let found = badges("https://github.com/a/b", &tags(&["tools"]));

        assert_eq!(found[2].to_markdown(), format!("![Tool]({})", TOOL_BADGE));
        assert!(found[0]
            .to_html()
            .starts_with(r#"<a href="https://github.com/a/b" target="_blank""#));
        assert!(found[0].to_html().contains("&amp;logo=github"));
    }
}
