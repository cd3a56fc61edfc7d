use clap::{Args, ValueEnum};
use reqwest::Method;
use serde_json::Value;

use crate::cli::config::{interrupt_token, CliContext};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::gateway::GatewayRequest;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

#[derive(Args)]
pub struct ApiArgs {
    #[arg(value_enum, help = "HTTP method")]
    pub method: HttpMethod,

    #[arg(help = "Tenant-relative path, e.g. /chargers/ (the /api prefix is added)")]
    pub path: String,

    #[arg(long, help = "JSON body, or @file to read it from a file")]
    pub data: Option<String>,

    #[arg(long = "query", short = 'q', help = "Query parameter as key=value (repeatable)")]
    pub query: Vec<String>,
}

pub async fn handle(args: ApiArgs, ctx: &CliContext, output_format: OutputFormat) -> anyhow::Result<()> {
    let console = ctx.console().await?;

    let mut request = GatewayRequest::new(args.method.into(), args.path);
    for (key, value) in parse_query_pairs(&args.query)? {
        request = request.with_query(key, value);
    }
    if let Some(raw) = &args.data {
        request = request.with_json(&parse_json_arg(raw)?)?;
    }

    let cancel = interrupt_token();
    match console.client().send_cancellable(request, &cancel).await {
        Ok(response) => {
            let body: Value = match response.json() {
                Ok(value) => value,
                Err(_) => Value::String(response.text()),
            };
            output_value(&output_format, &body)
        }
        Err(e) => {
            output_gateway_error(&output_format, &e)?;
            Err(e.into())
        }
    }
}
