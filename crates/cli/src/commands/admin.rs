use anyhow::{bail, Context};
use kidsafe_application::use_cases::PollOutcome;
use kidsafe_domain::{LocalRule, RuleCategory};
use tracing::warn;

use crate::di::{Services, UseCases};

/// Captures the hosts snapshot and writes the stored rules, so a one-shot
/// change starts from the full blocked set instead of an empty one.
async fn prepare_hosts(services: &Services, use_cases: &UseCases) -> anyhow::Result<()> {
    services
        .hosts
        .initialize()
        .await
        .context("Cannot read the hosts file")?;
    use_cases.apply_rules.execute().await?;
    Ok(())
}

fn print_rule(rule: &LocalRule) {
    println!(
        "{:>5}  {:<40} {:<14} {:<8} {}",
        rule.id.map(|id| id.to_string()).unwrap_or_default(),
        rule.domain,
        rule.category,
        if rule.is_active { "active" } else { "inactive" },
        rule.created_at.as_deref().unwrap_or("-"),
    );
}

pub async fn list_rules(use_cases: &UseCases, category: Option<String>) -> anyhow::Result<()> {
    let rules = match category {
        Some(c) => {
            use_cases
                .get_rules
                .get_by_category(&RuleCategory::from_str(&c))
                .await?
        }
        None => use_cases.get_rules.get_all().await?,
    };

    println!(
        "{:>5}  {:<40} {:<14} {:<8} {}",
        "ID", "DOMAIN", "CATEGORY", "STATE", "CREATED"
    );
    for rule in &rules {
        print_rule(rule);
    }
    println!("{} rule(s)", rules.len());
    Ok(())
}

pub async fn add_rule(
    services: &Services,
    use_cases: &UseCases,
    domain: String,
    category: String,
    reason: Option<String>,
) -> anyhow::Result<()> {
    prepare_hosts(services, use_cases).await?;

    let rule = use_cases
        .add_rule
        .execute(domain, RuleCategory::from_str(&category), reason)
        .await?;
    print_rule(&rule);
    Ok(())
}

pub async fn remove_rule(services: &Services, use_cases: &UseCases, id: i64) -> anyhow::Result<()> {
    prepare_hosts(services, use_cases).await?;

    let rule = use_cases.delete_rule.execute(id).await?;
    println!("Removed rule {} ({})", id, rule.domain);
    Ok(())
}

pub async fn apply(services: &Services, use_cases: &UseCases) -> anyhow::Result<()> {
    services
        .hosts
        .initialize()
        .await
        .context("Cannot read the hosts file")?;

    let count = use_cases.apply_rules.execute().await?;
    println!("Applied {} blocked domain(s) to the hosts file", count);
    Ok(())
}

pub async fn verify(services: &Services) -> anyhow::Result<()> {
    let entries = services.hosts.verify_hosts_file().await?;
    if entries.is_empty() {
        println!("No managed entries in the hosts file");
        return Ok(());
    }

    let redirect = services.hosts.redirect_ip();
    let mut mismatched = 0;
    for (hostname, redirected) in &entries {
        if *redirected {
            println!("  ok        {} -> {}", hostname, redirect);
        } else {
            mismatched += 1;
            println!("  mismatch  {}", hostname);
        }
    }
    println!(
        "{} managed entr{}, {} not pointing at {}",
        entries.len(),
        if entries.len() == 1 { "y" } else { "ies" },
        mismatched,
        redirect
    );
    Ok(())
}

pub async fn test_domain(services: &Services, domain: &str) -> anyhow::Result<()> {
    if services.hosts.test_domain_blocking(domain).await {
        println!("{} is blocked (resolves to {})", domain, services.hosts.redirect_ip());
    } else {
        println!("{} is NOT blocked", domain);
    }
    Ok(())
}

/// Writes back the backup taken at startup. Without one, the managed section
/// is stripped instead.
pub async fn restore(services: &Services) -> anyhow::Result<()> {
    match services.hosts.restore_original().await {
        Ok(()) => println!("Original hosts file restored"),
        Err(e) => {
            warn!(error = %e, "No restore point, stripping the managed section instead");
            services.hosts.cleanup().await?;
            println!("Managed hosts section removed");
        }
    }
    Ok(())
}

pub async fn sync(services: &Services, use_cases: &UseCases) -> anyhow::Result<()> {
    let Some(reconciler) = &use_cases.blocklist_sync else {
        bail!("Remote sync is disabled; set [sync] enabled = true in the configuration");
    };

    services
        .hosts
        .initialize()
        .await
        .context("Cannot read the hosts file")?;

    match reconciler.force_sync().await? {
        PollOutcome::Changed { path, active } => {
            println!("Synced {} active domain(s) from {}", active, path);
        }
        outcome => println!("Sync finished: {:?}", outcome),
    }

    if let Some(time_rules) = &use_cases.time_rules_sync {
        println!("Time rules: {:?}", time_rules.poll_once().await);
    }

    let status = reconciler.status().await;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
