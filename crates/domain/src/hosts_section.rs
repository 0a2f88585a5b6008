use std::collections::{BTreeMap, BTreeSet};

use crate::normalize::www_variant;

pub const SECTION_START: &str = "# === KidSafe PC Blocked Domains - START ===";
pub const SECTION_END: &str = "# === KidSafe PC Blocked Domains - END ===";

/// Address every managed hostname is pointed at.
pub const DEFAULT_REDIRECT_IP: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostsEntry {
    pub ip: String,
    pub hostname: String,
}

impl HostsEntry {
    pub fn new(ip: impl Into<String>, hostname: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            hostname: hostname.into(),
        }
    }
}

fn line_ending(content: &str) -> &'static str {
    if content.contains("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}

fn is_start_marker(line: &str) -> bool {
    line.contains(SECTION_START)
}

fn is_end_marker(line: &str) -> bool {
    line.contains(SECTION_END)
}

/// Removes every managed section from `content`.
///
/// Lines outside the markers keep their order and bytes; only the blank
/// separator line written in front of a start marker is dropped with it.
/// A start marker without a matching end marker swallows the rest of the file.
pub fn strip_managed_section(content: &str) -> String {
    let eol = line_ending(content);
    let mut kept: Vec<&str> = Vec::new();
    let mut inside = false;

    for line in content.lines() {
        if inside {
            if is_end_marker(line) {
                inside = false;
            }
            continue;
        }
        if is_start_marker(line) {
            if kept.last().is_some_and(|l| l.trim().is_empty()) {
                kept.pop();
            }
            inside = true;
            continue;
        }
        if is_end_marker(line) {
            continue;
        }
        kept.push(line);
    }

    if kept.is_empty() {
        return String::new();
    }

    let mut out = kept.join(eol);
    out.push_str(eol);
    out
}

/// The `(ip, hostname)` pairs written for `domains`: each domain plus its
/// `www.` form.
pub fn section_entries(domains: &BTreeSet<String>, redirect_ip: &str) -> Vec<HostsEntry> {
    let mut entries = Vec::with_capacity(domains.len() * 2);
    for domain in domains {
        entries.push(HostsEntry::new(redirect_ip, domain.as_str()));
        if let Some(www) = www_variant(domain) {
            entries.push(HostsEntry::new(redirect_ip, www));
        }
    }
    entries
}

/// Computes the full hosts file content for `domains`, replacing any
/// managed section already present in `current`.
///
/// Rendering the output again with the same set yields identical bytes.
pub fn render_managed_content(
    current: &str,
    domains: &BTreeSet<String>,
    redirect_ip: &str,
) -> String {
    let eol = line_ending(current);
    let mut out = strip_managed_section(current);

    if !out.is_empty() {
        out.push_str(eol);
    }

    out.push_str(SECTION_START);
    out.push_str(eol);
    for entry in section_entries(domains, redirect_ip) {
        out.push_str(&entry.ip);
        out.push(' ');
        out.push_str(&entry.hostname);
        out.push_str(eol);
    }
    out.push_str(SECTION_END);
    out.push_str(eol);
    out
}

/// Parses the entries inside the managed section(s) of `content`.
/// Comments and blank lines inside the section are ignored; a line naming
/// several hostnames yields one entry per hostname.
pub fn parse_managed_section(content: &str) -> Vec<HostsEntry> {
    let mut entries = Vec::new();
    let mut inside = false;

    for line in content.lines() {
        let line = line.trim();
        if is_start_marker(line) {
            inside = true;
            continue;
        }
        if is_end_marker(line) {
            inside = false;
            continue;
        }
        if !inside || line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let Some(ip) = fields.next() else {
            continue;
        };
        for hostname in fields.take_while(|f| !f.starts_with('#')) {
            entries.push(HostsEntry::new(ip, hostname));
        }
    }

    entries
}

pub fn has_managed_section(content: &str) -> bool {
    content.lines().any(is_start_marker)
}

/// Maps each hostname of the managed section to whether it points at
/// `redirect_ip`.
pub fn verify_entries(content: &str, redirect_ip: &str) -> BTreeMap<String, bool> {
    parse_managed_section(content)
        .into_iter()
        .map(|entry| {
            let ok = entry.ip == redirect_ip;
            (entry.hostname, ok)
        })
        .collect()
}
