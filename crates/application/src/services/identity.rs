use kidsafe_domain::config::sync::UID_PLACEHOLDER;
use kidsafe_domain::config::IdentityStrategy;

/// `user_` + the first 16 hex chars of the MD5 of the email, the UID older
/// mobile clients derived locally.
pub fn legacy_email_uid(email: &str) -> String {
    let digest = format!("{:x}", md5::compute(email.trim().as_bytes()));
    format!("user_{}", &digest[..16])
}

/// Remote identifiers in strategy order. Strategies whose input is missing
/// are skipped and duplicates collapse.
pub fn derive_identities(
    strategies: &[IdentityStrategy],
    family_id: Option<&str>,
    email: Option<&str>,
) -> Vec<String> {
    let mut identities: Vec<String> = Vec::new();
    for strategy in strategies {
        let derived = match strategy {
            IdentityStrategy::Account => family_id
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            IdentityStrategy::LegacyEmailHash => email
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(legacy_email_uid),
        };
        if let Some(id) = derived {
            if !identities.contains(&id) {
                identities.push(id);
            }
        }
    }
    identities
}

pub fn expand_path(template: &str, uid: &str) -> String {
    template.replace(UID_PLACEHOLDER, uid)
}

/// Every template expanded with every identity, in template-major order.
/// Templates without a placeholder appear once; duplicates are removed.
pub fn expand_candidate_paths(templates: &[String], identities: &[String]) -> Vec<String> {
    let mut paths: Vec<String> = Vec::new();
    let mut push = |path: String| {
        if !paths.contains(&path) {
            paths.push(path);
        }
    };

    for template in templates {
        if template.contains(UID_PLACEHOLDER) {
            for uid in identities {
                push(expand_path(template, uid));
            }
        } else {
            push(template.clone());
        }
    }
    paths
}
