pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "expense")]
#[command(about = "Expense API administration")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Issue a bearer token for a user id")]
    Token {
        #[arg(long, help = "User id to encode as the token subject")]
        user_id: i64,
        #[arg(long, help = "Token lifetime in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
        hours: Option<u64>,
    },

    #[command(about = "Apply database migrations to DATABASE_URL")]
    Migrate,
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

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Token { user_id, hours } => {
            commands::token::handle(config, user_id, hours, output_format)
        }
        Commands::Migrate => commands::migrate::handle(config, output_format).await,
    }
}
