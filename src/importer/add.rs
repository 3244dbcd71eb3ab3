//! Interactive single-resource add.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::catalog::{append_resources, Resource, ResourceFile};
use crate::index::UrlIndex;
use crate::links::LinkProbe;
use crate::tags::is_valid_tag;

use super::entry::{suggest_name, validate_url};
use super::prompt::{confirm, Prompter};

const RULE: &str = "============================================================";

/// Values supplied up front; each one skips its prompt
#[derive(Debug, Clone, Default)]
pub struct ResourceDraft {
    pub url: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    Added { resource: Resource, total: usize },
    Cancelled(String),
}

pub struct ResourceAdder {
    resources_path: PathBuf,
    index: UrlIndex,
    probe: Option<Arc<dyn LinkProbe>>,
    existing_tags: BTreeSet<String>,
    assume_yes: bool,
}

impl ResourceAdder {
    /// Collect known tags from the index and the catalog
    pub fn new(resources_path: impl Into<PathBuf>, index: UrlIndex) -> Self {
        let resources_path = resources_path.into();
        let mut existing_tags = index.all_tags();

        match ResourceFile::load(&resources_path) {
            Ok(file) => {
                existing_tags.extend(file.resources.into_iter().flat_map(|r| r.tags));
            }
            Err(e) => tracing::warn!("Could not load existing tags from resources file: {:#}", e),
        }

        Self {
            resources_path,
            index,
            probe: None,
            existing_tags,
            assume_yes: false,
        }
    }

    /// Check reachability of the URL before continuing
    pub fn with_probe(mut self, probe: Arc<dyn LinkProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    /// Skip every prompt, taking defaults
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    pub fn existing_tags(&self) -> &BTreeSet<String> {
        &self.existing_tags
    }

    pub fn index(&self) -> &UrlIndex {
        &self.index
    }

    pub async fn run(&mut self, draft: ResourceDraft, prompter: &mut dyn Prompter) -> Result<AddOutcome> {
        prompter.say("");
        prompter.say("🤖 Resource Add Tool");
        prompter.say(RULE);

        let raw_url = match draft.url {
            Some(url) => url,
            None if self.assume_yes => anyhow::bail!("A URL is required when prompts are skipped"),
            None => prompter.ask("Enter resource URL: ")?,
        };
        let url = validate_url(&raw_url).map_err(|e| anyhow::anyhow!("Invalid URL: {}", e))?;

        if let Some(probe) = &self.probe {
            match probe.probe(&url).await {
                Some(status) if status >= 400 => {
                    prompter.say(&format!("⚠️  Warning: URL returned status {}", status))
                }
                Some(status) if (300..400).contains(&status) => {
                    prompter.say(&format!("⚠️  Note: URL redirects (status {})", status))
                }
                Some(_) => {}
                None => prompter
                    .say("⚠️  Warning: Could not verify URL accessibility (continuing anyway)"),
            }
        }

        if self.index.sync_with(&self.resources_path)? {
            self.existing_tags.extend(self.index.all_tags());
        }

        if let Some(existing) = self.index.check_duplicate(&url) {
            prompter.say("");
            prompter.say("❌ DUPLICATE URL DETECTED!");
            prompter.say(&format!("   Existing resource: {}", existing.name));
            prompter.say(&format!("   URL: {}", existing.original_url));
            prompter.say(&format!("   Tags: {}", existing.tags.join(", ")));

            let proceed = !self.assume_yes && confirm(prompter, "\nDo you want to continue anyway?", false)?;
            if !proceed {
                return Ok(AddOutcome::Cancelled("duplicate URL".to_string()));
            }
        }

        let name = self.resolve_name(draft.name, &url, prompter)?;
        let description = match draft.description.filter(|d| !d.trim().is_empty()) {
            Some(d) => d.trim().to_string(),
            None if self.assume_yes => {
                anyhow::bail!("A description is required when prompts are skipped")
            }
            None => ask_required(prompter, "Description: ", "❌ Description is required. Enter description: ")?,
        };

        let tags = if !draft.tags.is_empty() {
            check_preset_tags(&draft.tags)?
        } else if self.assume_yes {
            Vec::new()
        } else {
            self.select_tags(prompter)?
        };

        prompter.say("");
        prompter.say(RULE);
        prompter.say("📋 RESOURCE SUMMARY");
        prompter.say(RULE);
        prompter.say(&format!("Name: {}", name));
        prompter.say(&format!("URL: {}", url));
        prompter.say(&format!("Description: {}", description));
        prompter.say(&format!("Tags: {}", tags.join(", ")));

        if !self.assume_yes && !confirm(prompter, "\nAdd this resource?", true)? {
            return Ok(AddOutcome::Cancelled("cancelled by user".to_string()));
        }

        let resource = Resource::new(name, url, description).with_tags(tags);
        let total = self.save(&resource)?;

        prompter.say("");
        prompter.say(&format!("✅ Successfully added resource: {}", resource.label()));
        prompter.say(&format!("📁 Total resources: {}", total));

        Ok(AddOutcome::Added { resource, total })
    }

    fn resolve_name(&self, preset: Option<String>, url: &str, prompter: &mut dyn Prompter) -> Result<String> {
        if let Some(name) = preset.filter(|n| !n.trim().is_empty()) {
            return Ok(name.trim().to_string());
        }

        let suggested = suggest_name(url);
        if self.assume_yes {
            return suggested.ok_or_else(|| anyhow::anyhow!("Could not suggest a name for {}", url));
        }

        prompter.say("");
        prompter.say(RULE);
        prompter.say("📝 RESOURCE INFORMATION");
        prompter.say(RULE);

        let question = match &suggested {
            Some(s) => format!("Resource name (suggested: {}): ", s),
            None => "Resource name: ".to_string(),
        };
        let answer = prompter.ask(&question)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        if let Some(s) = suggested {
            prompter.say(&format!("✅ Using suggested name: {}", s));
            return Ok(s);
        }

        ask_required(prompter, "❌ Name is required. Enter resource name: ", "❌ Name is required. Enter resource name: ")
    }

    fn select_tags(&mut self, prompter: &mut dyn Prompter) -> Result<Vec<String>> {
        let mut selected: Vec<String> = Vec::new();

        prompter.say("");
        prompter.say(RULE);
        prompter.say("🏷️  TAG SELECTION");
        prompter.say(RULE);
        prompter.say("Available tags:");
        for line in format_tags(&self.existing_tags) {
            prompter.say(&line);
        }

        loop {
            prompter.say("");
            prompter.say(&format!("Currently selected: {:?}", selected));
            prompter.say("Options:");
            prompter.say("1. Add existing tag (enter tag name)");
            prompter.say("2. Create new tag (enter new tag name)");
            prompter.say("3. Remove tag (enter tag name to remove)");
            prompter.say("4. Done selecting tags");
            prompter.say("5. Search tags (enter partial name)");

            let choice = prompter.ask("Enter your choice (1-5) or tag name: ")?;
            let lowered = choice.to_lowercase();

            let tag = match choice.as_str() {
                "4" => break,
                _ if lowered == "done" => break,
                "5" => {
                    self.search_tags(prompter)?;
                    continue;
                }
                _ if lowered.starts_with("search") => {
                    self.search_tags(prompter)?;
                    continue;
                }
                "3" => {
                    let target = prompter.ask("Enter tag name to remove: ")?;
                    match selected.iter().position(|t| *t == target) {
                        Some(pos) => {
                            selected.remove(pos);
                            prompter.say(&format!("✅ Removed tag: {}", target));
                        }
                        None => prompter.say(&format!("❌ Tag not in selection: {}", target)),
                    }
                    continue;
                }
                "1" | "2" => prompter.ask("Enter tag name: ")?,
                _ => choice,
            };

            if tag.is_empty() {
                prompter.say("❌ Tag name cannot be empty");
                continue;
            }
            if !is_valid_tag(&tag) {
                prompter.say("❌ Invalid tag format. Use lowercase letters, numbers, hyphens, and forward slashes.");
                prompter.say("   Examples: tools/development, libraries/python/ml, datasets/images");
                continue;
            }
            if selected.contains(&tag) {
                prompter.say(&format!("❌ Tag already selected: {}", tag));
                continue;
            }

            if self.existing_tags.insert(tag.clone()) {
                prompter.say(&format!("✨ Created new tag: {}", tag));
            } else {
                prompter.say(&format!("✅ Added existing tag: {}", tag));
            }
            selected.push(tag);
        }

        Ok(selected)
    }

    fn search_tags(&self, prompter: &mut dyn Prompter) -> Result<()> {
        let term = prompter.ask("Enter search term: ")?.to_lowercase();
        let matches: Vec<&String> = self
            .existing_tags
            .iter()
            .filter(|tag| tag.to_lowercase().contains(&term))
            .collect();

        if matches.is_empty() {
            prompter.say("No matching tags found.");
        } else {
            prompter.say(&format!("Found {} matching tags:", matches.len()));
            for (i, tag) in matches.iter().enumerate() {
                prompter.say(&format!("   {:2}. {}", i + 1, tag));
            }
        }
        Ok(())
    }

    /// Append to the catalog and record the URL in the index.
    ///
    /// The index was synced with the catalog before the duplicate check, so
    /// after the append it covers the new catalog contents too.
    fn save(&mut self, resource: &Resource) -> Result<usize> {
        let total = append_resources(&self.resources_path, vec![resource.clone()])?;

        self.index
            .insert(resource.url_str(), resource.label(), &resource.tags);
        self.index.record_source(&self.resources_path)?;
        self.index.save()?;

        Ok(total)
    }

    pub fn resources_path(&self) -> &Path {
        &self.resources_path
    }
}

fn ask_required(prompter: &mut dyn Prompter, first: &str, retry: &str) -> Result<String> {
    let mut answer = prompter.ask(first)?;
    while answer.is_empty() {
        answer = prompter.ask(retry)?;
    }
    Ok(answer)
}

fn check_preset_tags(tags: &[String]) -> Result<Vec<String>> {
    let mut checked: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags.iter().map(|t| t.trim()) {
        if !is_valid_tag(tag) {
            anyhow::bail!("Invalid tag format: {}", tag);
        }
        if !checked.iter().any(|t| t == tag) {
            checked.push(tag.to_string());
        }
    }
    Ok(checked)
}

/// Known tags grouped under their first segment
pub fn format_tags(tags: &BTreeSet<String>) -> Vec<String> {
    if tags.is_empty() {
        return vec!["No tags".to_string()];
    }

    let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for tag in tags {
        let category = tag.split('/').next().unwrap_or("misc");
        groups.entry(category).or_default().push(tag);
    }

    let mut lines = Vec::new();
    for (category, members) in groups {
        lines.push(format!("📁 {}:", category.to_uppercase()));
        for (i, tag) in members.iter().enumerate() {
            lines.push(format!("   {:2}. {}", i + 1, tag));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tags_groups() {
        let tags: BTreeSet<String> = ["tools/dev", "papers", "tools/cli"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        assert_eq!(
            format_tags(&tags),
            vec![
                "📁 PAPERS:",
                "    1. papers",
                "📁 TOOLS:",
                "    1. tools/cli",
                "    2. tools/dev",
            ]
        );
        assert_eq!(format_tags(&BTreeSet::new()), vec!["No tags"]);
    }

    #[test]
    fn test_preset_tags_checked() {
        let tags = vec!["tools/cli".to_string(), " tools/cli ".to_string()];
        assert_eq!(check_preset_tags(&tags).unwrap(), vec!["tools/cli".to_string()]);
        assert!(check_preset_tags(&["Bad Tag".to_string()]).is_err());
    }
}
