pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "chargeops")]
#[command(about = "ChargeOps CLI - tenant-aware client for the EV-charging operations API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "CHARGEOPS_LOCATION",
        help = "URL the console operates at, e.g. https://admin.example.com/?tenant_domain=acme.example.com"
    )]
    pub location: Option<String>,

    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Tenant resolution and domain validation")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "Session credential management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Raw request through the API gateway")]
    Api(commands::api::ApiArgs),

    #[command(about = "CRUD operations on backend resources")]
    Resource {
        #[command(subcommand)]
        cmd: commands::resource::ResourceCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
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
    let ctx = config::CliContext::from_env(cli.location.as_deref())?;

    match cli.command {
        Commands::Tenant { cmd } => commands::tenant::handle(cmd, &ctx, output_format).await,
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx, output_format).await,
        Commands::Api(args) => commands::api::handle(args, &ctx, output_format).await,
        Commands::Resource { cmd } => commands::resource::handle(cmd, &ctx, output_format).await,
    }
}
