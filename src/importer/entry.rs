//! Validation of new catalog entries and URL helpers shared by the
//! interactive and batch importers.

use serde_yaml::Value;
use thiserror::Error;
use url::Url;

use crate::catalog::Resource;
use crate::tags::is_valid_tag;

/// Why an incoming entry was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResourceError {
    #[error("Resource must be a mapping")]
    NotMapping,

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Empty field: {0}")]
    EmptyField(&'static str),

    #[error("Field {0} must be a string")]
    NotAString(&'static str),

    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),

    #[error("URL cannot be empty")]
    EmptyUrl,

    #[error("Invalid domain format: {0}")]
    InvalidDomain(String),

    #[error("Tags must be a list")]
    TagsNotList,

    #[error("Invalid tag type: {0}")]
    TagNotAString(String),

    #[error("Empty tag found")]
    EmptyTag,

    #[error("Invalid tag format: {0}")]
    InvalidTag(String),
}

const REQUIRED_FIELDS: [&str; 4] = ["name", "url", "description", "tags"];

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Sequence(seq) => seq.is_empty(),
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    }
}

fn string_field(map: &serde_yaml::Mapping, field: &'static str) -> Result<String, ResourceError> {
    map.get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .ok_or(ResourceError::NotAString(field))
}

/// Check one raw batch entry and convert it to a [`Resource`].
/// Keys beyond the four required ones are kept.
pub fn validate_entry(raw: &Value) -> Result<Resource, ResourceError> {
    let map = raw.as_mapping().ok_or(ResourceError::NotMapping)?;

    for field in REQUIRED_FIELDS {
        match map.get(field) {
            None => return Err(ResourceError::MissingField(field)),
            Some(value) if is_empty_value(value) => return Err(ResourceError::EmptyField(field)),
            Some(_) => {}
        }
    }

    let url = string_field(map, "url")?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ResourceError::InvalidUrl(url));
    }

    let raw_tags = map
        .get("tags")
        .and_then(Value::as_sequence)
        .ok_or(ResourceError::TagsNotList)?;

    let mut tags = Vec::with_capacity(raw_tags.len());
    for tag in raw_tags {
        let tag = match tag.as_str() {
            Some(s) => s.trim(),
            None => {
                let shown = serde_yaml::to_string(tag).unwrap_or_default();
                return Err(ResourceError::TagNotAString(shown.trim().to_string()));
            }
        };
        if tag.is_empty() {
            return Err(ResourceError::EmptyTag);
        }
        if !is_valid_tag(tag) {
            return Err(ResourceError::InvalidTag(tag.to_string()));
        }
        tags.push(tag.to_string());
    }

    let mut resource = Resource::new(
        string_field(map, "name")?,
        url,
        string_field(map, "description")?,
    )
    .with_tags(tags);

    for (key, value) in map {
        if let Some(key) = key.as_str() {
            if !REQUIRED_FIELDS.contains(&key) {
                resource.extra.insert(key.to_string(), value.clone());
            }
        }
    }

    Ok(resource)
}

/// Entry name for messages, before validation
pub fn raw_name(raw: &Value) -> &str {
    raw.get("name").and_then(Value::as_str).unwrap_or("Unnamed")
}

/// Check a URL typed by the user; `https://` is assumed when no scheme is given
pub fn validate_url(input: &str) -> Result<String, ResourceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ResourceError::EmptyUrl);
    }

    let candidate = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed = Url::parse(&candidate).map_err(|_| ResourceError::InvalidUrl(trimmed.to_string()))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ResourceError::InvalidUrl(trimmed.to_string()))?;
    if !host.contains('.') {
        return Err(ResourceError::InvalidDomain(host.to_string()));
    }

    Ok(candidate)
}

/// Title-case words split on `-`, `_` and spaces
fn words_title(text: &str) -> String {
    text.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Guess a display name from a URL
pub fn suggest_name(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|p| !p.is_empty()).collect())
        .unwrap_or_default();

    if host == "github.com" || host.ends_with(".github.com") {
        if let Some(repo) = segments.get(1) {
            return Some(words_title(repo));
        }
    }

    if host == "arxiv.org" || host.ends_with(".arxiv.org") {
        return Some("Research Paper".to_string());
    }

    if [".edu", ".ac.uk", ".org"].iter().any(|s| host.ends_with(s)) {
        let meaningful = segments.iter().find(|part| {
            part.chars().count() > 3
                && !["www", "index", "html", "php"].contains(&part.to_lowercase().as_str())
        });
        if let Some(part) = meaningful {
            return Some(words_title(part));
        }
    }

    let label = host.split('.').next().unwrap_or(host);
    Some(words_title(label))
}
