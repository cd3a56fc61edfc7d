use clap::Subcommand;
use serde_json::json;

use crate::cli::config::CliContext;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::session::SessionStore;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Store a bearer token issued by the backend login")]
    Token {
        #[arg(help = "Bearer token")]
        token: String,
    },

    #[command(about = "Forget the stored token")]
    Logout,

    #[command(about = "Show whether a token is stored")]
    Status,
}

pub async fn handle(cmd: AuthCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Token { token } => {
            let token = token.trim();
            if token.is_empty() {
                anyhow::bail!("Token must not be empty");
            }
            ctx.store.set_token(token)?;
            output_success(&output_format, "Token stored", None)
        }
        AuthCommands::Logout => {
            ctx.store.clear_token()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let authenticated = ctx.store.token()?.is_some();
            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ "authenticated": authenticated }))?
                    );
                }
                OutputFormat::Text => {
                    if authenticated {
                        println!("Token stored (validity is only known after the next request)");
                    } else {
                        println!("Not logged in");
                    }
                }
            }
            Ok(())
        }
    }
}
