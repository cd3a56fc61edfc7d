use clap::Subcommand;
use serde_json::json;

use crate::cli::config::CliContext;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::error::BootstrapError;
use crate::session::SessionStore;
use crate::tenant::host::{base_url_for, display_origin};
use crate::tenant::TenantContext;

#[derive(Subcommand)]
pub enum TenantCommands {
    #[command(about = "Show which tenant host the current location resolves to")]
    Resolve,

    #[command(about = "Validate the resolved host (or an explicit domain) against the backend")]
    Validate {
        #[arg(long, help = "Domain to validate instead of the resolved host")]
        domain: Option<String>,
    },

    #[command(about = "Show the tenant context cached for the current location")]
    Show,

    #[command(about = "Persist a tenant domain override for the current location")]
    Use {
        #[arg(help = "Tenant domain, e.g. acme.example.com")]
        domain: String,
    },

    #[command(about = "Remove the tenant domain override and cached context")]
    Clear,
}

pub async fn handle(cmd: TenantCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        TenantCommands::Resolve => {
            let resolver = ctx.resolver()?;
            let resolved = resolver.resolve_host(ctx.require_location()?)?;
            let base_url = display_origin(&base_url_for(&resolved.host, resolver.config())?);

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "host": resolved.host,
                            "source": resolved.source,
                            "base_url": base_url,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    println!("Host: {}", resolved.host);
                    println!("Source: {:?}", resolved.source);
                    println!("Base URL: {}", base_url);
                }
            }
            Ok(())
        }
        TenantCommands::Validate { domain } => {
            let resolver = ctx.resolver()?;

            if let Some(domain) = domain {
                return match resolver.try_validate_domain(ctx.require_location()?, &domain).await {
                    Ok(info) => output_success(
                        &output_format,
                        &format!("Domain '{}' is tenant '{}'", domain, info.name),
                        Some(json!({ "tenant": info })),
                    ),
                    Err(e) => {
                        output_gateway_error(&output_format, &e)?;
                        Err(e.into())
                    }
                };
            }

            match resolver.refresh_context(ctx.require_location()?).await {
                Ok(context) => output_context(&output_format, &context),
                Err(BootstrapError::TenantUnavailable { host, source }) => {
                    output_gateway_error(&output_format, &source)?;
                    Err(anyhow::anyhow!("Tenant '{}' is unavailable; the console stays blocked", host))
                }
                Err(e) => Err(e.into()),
            }
        }
        TenantCommands::Show => {
            let origin = ctx.require_location()?.origin();
            match ctx.store.tenant_context(&origin)? {
                Some(context) => output_context(&output_format, &context),
                None => {
                    match output_format {
                        OutputFormat::Json => {
                            println!("{}", serde_json::to_string_pretty(&json!({ "tenant_context": null }))?);
                        }
                        OutputFormat::Text => {
                            println!("No validated tenant cached for {}", origin);
                        }
                    }
                    Ok(())
                }
            }
        }
        TenantCommands::Use { domain } => {
            ctx.store.set_tenant_domain(&ctx.require_location()?.origin(), &domain)?;
            output_success(
                &output_format,
                &format!("Tenant domain override set to '{}'", domain),
                Some(json!({ "tenant_domain": domain })),
            )
        }
        TenantCommands::Clear => {
            let origin = ctx.require_location()?.origin();
            ctx.store.clear_tenant_domain(&origin)?;
            ctx.store.clear_tenant_context(&origin)?;
            output_success(&output_format, "Tenant override cleared", None)
        }
    }
}

fn output_context(output_format: &OutputFormat, context: &TenantContext) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "tenant_context": context }))?);
        }
        OutputFormat::Text => {
            println!("Host: {}", context.host);
            println!("Tenant: {} (id {})", context.info.name, context.info.tenant_id);
            println!("Schema: {}", context.info.schema_name);
            println!("Active: {}", context.info.is_active);
            if !context.info.branding.site_title.is_empty() {
                println!("Site title: {}", context.info.branding.site_title);
            }
            println!("Validated: {}", context.validated_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }
    Ok(())
}
