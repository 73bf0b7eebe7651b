use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use studybud_accounts::{AccountError, ExtraFields, UserManager};
use studybud_config::{load, load_from, AppConfig};
use studybud_database::initialize_database;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "studybud", about = "Manage the StudyBud database and accounts")]
struct Cli {
    /// Configuration file; overrides STUDYBUD_CONFIG and file discovery.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Create a regular account.
    CreateUser(CreateUserArgs),
    /// Create an account with staff and superuser privileges.
    CreateSuperuser(CreateSuperuserArgs),
    /// Verify an email/password pair.
    CheckPassword {
        #[arg(long)]
        email: String,
        #[arg(long, env = "STUDYBUD_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[derive(Debug, Args)]
struct CreateUserArgs {
    #[arg(long)]
    email: String,
    /// Omit to create the account without a usable password.
    #[arg(long, env = "STUDYBUD_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    avatar: Option<String>,
    #[arg(long)]
    staff: bool,
    #[arg(long)]
    inactive: bool,
}

#[derive(Debug, Args)]
struct CreateSuperuserArgs {
    #[arg(long)]
    email: String,
    /// Display name; required for superusers.
    #[arg(long)]
    name: String,
    #[arg(long, env = "STUDYBUD_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    let cli = Cli::parse();

    let config: AppConfig = match cli.config.as_deref() {
        Some(path) => load_from(Some(path)),
        None => load(),
    }
    .context("failed to load configuration")?;

    let db = initialize_database(&config.database)
        .await
        .context("failed to initialize database")?;

    let manager = UserManager::from_connection(&db, config.accounts.clone());

    match cli.command {
        Command::Migrate => {
            info!(url = %config.database.url, "database is up to date");
        }
        Command::CreateUser(args) => {
            let extra = ExtraFields {
                name: args.name,
                bio: args.bio,
                avatar: args.avatar,
                is_staff: Some(args.staff),
                is_active: Some(!args.inactive),
                ..ExtraFields::default()
            };
            let user = manager
                .create_user(&args.email, args.password.as_deref(), extra)
                .await
                .map_err(describe)?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::CreateSuperuser(args) => {
            if args.name.trim().is_empty() {
                anyhow::bail!("--name must not be empty");
            }
            let user = manager
                .create_superuser(&args.email, args.password.as_deref(), ExtraFields::with_name(args.name))
                .await
                .map_err(describe)?;
            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        Command::CheckPassword { email, password } => {
            match manager.authenticate(&email, &password).await.map_err(describe)? {
                Some(user) => println!("ok: {user}"),
                None => anyhow::bail!("invalid credentials for {email}"),
            }
        }
    }

    db.close().await;
    Ok(())
}

fn describe(err: AccountError) -> anyhow::Error {
    match err {
        AccountError::EmailTaken(email) => anyhow::anyhow!("an account for {email} already exists"),
        other => anyhow::Error::new(other),
    }
}
