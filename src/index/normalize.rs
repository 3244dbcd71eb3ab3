//! URL canonicalization for duplicate comparison.

use url::Url;

/// Prefixes users commonly paste, checked in order; only the first match is
/// stripped.
const STRIP_PREFIXES: [&str; 5] = ["www.", "http://www.", "https://www.", "http://", "https://"];

/// Canonicalize a URL so that trivially different spellings compare equal.
///
/// The scheme becomes `https`, the host is lowercased without `www.`,
/// trailing slashes are dropped (the root keeps `/`), the query is kept and
/// the fragment removed. Path case is preserved, as is any port written in
/// the input, including a scheme default such as `:443`.
///
/// Non-ASCII hosts come out in punycode and unsafe path characters are
/// percent-encoded, so `bücher.de` and `xn--bcher-kva.de` share a key.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut rest = trimmed;
    for prefix in STRIP_PREFIXES {
        let matches = trimmed
            .get(..prefix.len())
            .map(|head| head.eq_ignore_ascii_case(prefix))
            .unwrap_or(false);
        if matches {
            rest = &trimmed[prefix.len()..];
            break;
        }
    }

    let candidate = if rest.starts_with("http://") || rest.starts_with("https://") {
        rest.to_string()
    } else {
        format!("https://{}", rest)
    };

    match Url::parse(&candidate) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => {
                canonical_form(&parsed, host, explicit_port(&candidate))
            }
            _ => trimmed.to_lowercase(),
        },
        Err(_) => trimmed.to_lowercase(),
    }
}

/// Port as spelled in the authority. `Url::port` hides scheme defaults.
fn explicit_port(candidate: &str) -> Option<u16> {
    let after_scheme = candidate.split_once("://")?.1;
    let authority = after_scheme
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(after_scheme);
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);

    let port = match host_port.rsplit_once(']') {
        Some((_, tail)) => tail.strip_prefix(':')?,
        None => host_port.rsplit_once(':')?.1,
    };
    port.parse().ok()
}

fn canonical_form(parsed: &Url, host: &str, explicit_port: Option<u16>) -> String {
    let host = host.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);

    let port = parsed
        .port()
        .or(explicit_port)
        .map(|p| format!(":{}", p))
        .unwrap_or_default();

    let path = parsed.path().trim_end_matches('/');
    let path = if path.is_empty() { "/" } else { path };

    let query = parsed
        .query()
        .map(|q| format!("?{}", q))
        .unwrap_or_default();

    format!("https://{}{}{}{}", host, port, path, query)
}

/// Lowercased host of a URL, if it parses
pub fn url_host(url: &str) -> Option<String> {
    Url::parse(url.trim())
        .ok()
        .and_then(|u| u.host_str().map(str::to_lowercase))
}
