use clap::Subcommand;
use serde_json::Value;

use crate::cli::config::{interrupt_token, CliContext};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::error::GatewayError;
use crate::services::Resource;

#[derive(Subcommand)]
pub enum ResourceCommands {
    #[command(about = "List a resource collection")]
    List {
        #[arg(value_enum)]
        resource: Resource,
        #[arg(long = "query", short = 'q', help = "Filter as key=value (repeatable)")]
        query: Vec<String>,
    },

    #[command(about = "Show a single item")]
    Get {
        #[arg(value_enum)]
        resource: Resource,
        id: String,
    },

    #[command(about = "Create an item")]
    Create {
        #[arg(value_enum)]
        resource: Resource,
        #[arg(long, help = "JSON body, or @file")]
        data: String,
    },

    #[command(about = "Partially update an item (PATCH)")]
    Update {
        #[arg(value_enum)]
        resource: Resource,
        id: String,
        #[arg(long, help = "JSON body, or @file")]
        data: String,
    },

    #[command(about = "Replace an item (PUT)")]
    Replace {
        #[arg(value_enum)]
        resource: Resource,
        id: String,
        #[arg(long, help = "JSON body, or @file")]
        data: String,
    },

    #[command(about = "Delete an item")]
    Delete {
        #[arg(value_enum)]
        resource: Resource,
        id: String,
    },
}

pub async fn handle(cmd: ResourceCommands, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = ctx.console().await?;
    let cancel = interrupt_token();

    let result: Result<Value, GatewayError> = match cmd {
        ResourceCommands::List { resource, query } => {
            let query = parse_query_pairs(&query)?;
            console.resource(resource).with_cancellation(cancel).list(&query).await
        }
        ResourceCommands::Get { resource, id } => {
            console.resource(resource).with_cancellation(cancel).get(&id).await
        }
        ResourceCommands::Create { resource, data } => {
            let body = parse_json_arg(&data)?;
            console.resource(resource).with_cancellation(cancel).create(&body).await
        }
        ResourceCommands::Update { resource, id, data } => {
            let body = parse_json_arg(&data)?;
            console.resource(resource).with_cancellation(cancel).update(&id, &body).await
        }
        ResourceCommands::Replace { resource, id, data } => {
            let body = parse_json_arg(&data)?;
            console.resource(resource).with_cancellation(cancel).replace(&id, &body).await
        }
        ResourceCommands::Delete { resource, id } => {
            match console.resource(resource).with_cancellation(cancel).delete(&id).await {
                Ok(()) => return output_success(&output_format, &format!("Deleted {:?} {}", resource, id), None),
                Err(e) => Err(e),
            }
        }
    };

    match result {
        Ok(value) => output_value(&output_format, &value),
        Err(e) => {
            output_gateway_error(&output_format, &e)?;
            Err(e.into())
        }
    }
}
