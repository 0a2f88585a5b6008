//! Canonical hostname extraction.
//!
//! Every comparison between blocked domains (hosts section, rule store,
//! remote snapshots) goes through [`normalize_domain`], so the function is
//! pure and idempotent: `normalize_domain(normalize_domain(x)) == normalize_domain(x)`.

use url::Url;

const WWW_PREFIX: &str = "www.";

/// Turns arbitrary user or remote input (`"https://www.Foo.com/path?x"`)
/// into a canonical hostname (`"foo.com"`).
///
/// An empty string means the input is unusable; it is not an error.
pub fn normalize_domain(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    if lowered.is_empty() {
        return String::new();
    }

    let with_scheme = if split_scheme(&lowered).is_some() {
        lowered.clone()
    } else {
        format!("http://{}", lowered)
    };

    let mut host = match Url::parse(&with_scheme) {
        Ok(url) => match url.host_str() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => manual_host(&lowered),
        },
        Err(_) => manual_host(&lowered),
    };

    host = strip_port(&host).to_string();

    while let Some(rest) = host.strip_prefix(WWW_PREFIX) {
        host = rest.to_string();
    }

    let host = host
        .split(['?', '#'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    if host.is_empty() || host.chars().any(char::is_whitespace) {
        return String::new();
    }

    host
}

/// Returns the `www.` form written next to `domain`, unless `domain` already
/// carries the prefix.
pub fn www_variant(domain: &str) -> Option<String> {
    if domain.starts_with(WWW_PREFIX) {
        None
    } else {
        Some(format!("{}{}", WWW_PREFIX, domain))
    }
}

/// Splits a leading `scheme://`. A `://` that appears after a path, query
/// or other non-scheme character (`a.com/r?to=https://b.com`) is not a scheme.
fn split_scheme(lowered: &str) -> Option<&str> {
    let (scheme, rest) = lowered.split_once("://")?;
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(rest)
}

fn manual_host(lowered: &str) -> String {
    let without_scheme = split_scheme(lowered).unwrap_or(lowered);
    without_scheme
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn strip_port(host: &str) -> &str {
    match host.rsplit_once(':') {
        Some((name, port))
            if !name.is_empty()
                && !name.contains(':')
                && !port.is_empty()
                && port.chars().all(|c| c.is_ascii_digit()) =>
        {
            name
        }
        _ => host,
    }
}
