//! Moderation console for the Mosques TN API.
//!
//! Reads `MOSQUES_API_URL` (and friends) from the environment or `.env`, and
//! keeps the signed-in session in `MOSQUES_TOKEN_FILE` between runs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cmd;
mod context;

use context::AppContext;
use mosques_core::{ResourceType, StatusFilter};

#[derive(Parser)]
#[command(name = "mosques-admin")]
#[command(about = "Moderate mosque suggestions, reviews and edit proposals")]
#[command(version)]
struct Cli {
    /// Only print results, no headers or prompts
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Sign out and forget the stored token
    Logout,

    /// Show the current session
    Whoami,

    /// List a moderation queue
    List {
        /// suggestions, reviews or edits
        resource: ResourceType,

        /// pending, approved, rejected or all
        #[arg(short, long, default_value = "pending")]
        status: StatusFilter,

        #[arg(long, default_value_t = 20)]
        limit: u32,

        #[arg(long, default_value_t = 0)]
        offset: u32,
    },

    /// Approve an entity
    Approve { resource: ResourceType, id: i64 },

    /// Reject an entity
    Reject { resource: ResourceType, id: i64 },

    /// Delete an entity (admin only)
    Delete {
        resource: ResourceType,
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Confirm a pending suggestion or edit as the signed-in user
    Confirm { resource: ResourceType, id: i64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,mosques_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {:#}", e);
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let ctx = AppContext::new(cli.quiet).await?;

    match cli.command {
        Commands::Login { username } => cmd::auth::login(&ctx, username).await,
        Commands::Logout => cmd::auth::logout(&ctx).await,
        Commands::Whoami => cmd::auth::whoami(&ctx).await,
        Commands::List {
            resource,
            status,
            limit,
            offset,
        } => cmd::moderation::list(&ctx, resource, status, limit, offset).await,
        Commands::Approve { resource, id } => cmd::moderation::approve(&ctx, resource, id).await,
        Commands::Reject { resource, id } => cmd::moderation::reject(&ctx, resource, id).await,
        Commands::Delete { resource, id, yes } => {
            cmd::moderation::delete(&ctx, resource, id, yes).await
        }
        Commands::Confirm { resource, id } => cmd::moderation::confirm(&ctx, resource, id).await,
    }
}
