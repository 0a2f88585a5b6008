use clap::{Parser, Subcommand};
use kidsafe_domain::CliOverrides;
use tracing::info;

mod bootstrap;
mod commands;
mod di;

#[derive(Parser)]
#[command(name = "kidsafe-agent")]
#[command(version)]
#[command(about = "KidSafe PC - hosts file based parental control agent")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE")]
    config: Option<String>,

    /// Database path
    #[arg(long)]
    database: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Hosts file to manage
    #[arg(long, value_name = "PATH")]
    hosts_path: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the agent until interrupted (default)
    Run,
    /// List block rules, newest first
    Rules {
        #[arg(long)]
        category: Option<String>,
    },
    /// Add a block rule and apply it right away
    Add {
        domain: String,
        #[arg(long, default_value = "manual")]
        category: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Delete a block rule by id
    Remove { id: i64 },
    /// Write every active rule into the hosts file
    Apply,
    /// Show the entries of the managed hosts section
    Verify,
    /// Check whether a domain resolves to the redirect address
    Test { domain: String },
    /// Put back the hosts file as it was before blocking
    Restore,
    /// Run one full remote sync and print the sync status
    Sync,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        database_path: cli.database.clone(),
        log_level: cli.log_level.clone(),
        hosts_path: cli.hosts_path.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);

    info!("Starting KidSafe agent v{}", env!("CARGO_PKG_VERSION"));

    let pool = bootstrap::init_database(&config.database).await?;

    let repos = di::Repositories::new(pool);
    let services = di::Services::new(&config)?;
    let use_cases = di::UseCases::new(&config, &repos, &services);

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => commands::run(&config, &services, &use_cases).await,
        Command::Rules { category } => commands::list_rules(&use_cases, category).await,
        Command::Add {
            domain,
            category,
            reason,
        } => commands::add_rule(&services, &use_cases, domain, category, reason).await,
        Command::Remove { id } => commands::remove_rule(&services, &use_cases, id).await,
        Command::Apply => commands::apply(&services, &use_cases).await,
        Command::Verify => commands::verify(&services).await,
        Command::Test { domain } => commands::test_domain(&services, &domain).await,
        Command::Restore => commands::restore(&services).await,
        Command::Sync => commands::sync(&services, &use_cases).await,
    }
}
