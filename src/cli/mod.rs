pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};

use crate::app::AppState;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, Stores};

#[derive(Parser)]
#[command(name = "platformctl")]
#[command(about = "Operator tooling for the content platform: migrations, retention and accounts")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Purge soft-deleted content older than the retention window")]
    Sweep {
        #[arg(long, help = "Pretend the sweep runs at this RFC 3339 instant")]
        at: Option<String>,
    },

    #[command(about = "Account administration")]
    Accounts {
        #[command(subcommand)]
        cmd: commands::accounts::AccountCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Database connection plus the application services built on it
pub struct Context {
    pub config: AppConfig,
    pub database: DatabaseManager,
    pub state: AppState,
}

impl Context {
    pub async fn connect(config: AppConfig) -> anyhow::Result<Self> {
        let database = DatabaseManager::connect(&config.database).await?;
        let state = AppState::new(config.clone(), Stores::postgres(database.pool().clone()))?;
        Ok(Self {
            config,
            database,
            state,
        })
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = Context::connect(config).await?;

    let result = match cli.command {
        Commands::Migrate => commands::maintenance::migrate(&ctx, output_format).await,
        Commands::Sweep { at } => commands::maintenance::sweep(&ctx, at.as_deref(), output_format).await,
        Commands::Accounts { cmd } => commands::accounts::handle(&ctx, cmd, output_format).await,
    };

    ctx.database.close().await;
    result
}
