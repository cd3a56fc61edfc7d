use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;
use crate::error::GatewayError;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".to_string(), json!(true));
            response.insert("message".to_string(), json!(message));

            if let Some(Value::Object(fields)) = data {
                response.extend(fields);
            }

            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output a gateway error; JSON mode prints the structured body to stdout
pub fn output_gateway_error(output_format: &OutputFormat, error: &GatewayError) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = error.to_json();
            response["success"] = json!(false);
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", error);
        }
    }
    Ok(())
}

/// Print a response body. Text mode still prints JSON, just pretty-printed
/// without the envelope.
pub fn output_value(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "success": true, "data": value }))?);
        }
        OutputFormat::Text => match value {
            Value::Null => println!("(empty response)"),
            Value::String(s) => println!("{}", s),
            other => println!("{}", serde_json::to_string_pretty(other)?),
        },
    }
    Ok(())
}

/// Parse `key=value` pairs given on the command line
pub fn parse_query_pairs(pairs: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    pairs
        .iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| anyhow::anyhow!("Invalid query parameter '{}', expected key=value", pair))
        })
        .collect()
}

/// Parse a `--data` JSON argument; `@path` reads the body from a file
pub fn parse_json_arg(raw: &str) -> anyhow::Result<Value> {
    let content = match raw.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)?,
        None => raw.to_string(),
    };
    serde_json::from_str(&content).map_err(|e| anyhow::anyhow!("Invalid JSON body: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_pairs() {
        let pairs = parse_query_pairs(&["page=2".to_string(), "status=a=b".to_string()]).unwrap();
        assert_eq!(pairs[0], ("page".to_string(), "2".to_string()));
        assert_eq!(pairs[1], ("status".to_string(), "a=b".to_string()));

        assert!(parse_query_pairs(&["broken".to_string()]).is_err());
    }

    #[test]
    fn test_parse_json_arg() {
        assert_eq!(parse_json_arg(r#"{"name":"CP-01"}"#).unwrap()["name"], "CP-01");
        assert!(parse_json_arg("{not json").is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.json");
        std::fs::write(&path, r#"{"power_kw": 22}"#).unwrap();
        let value = parse_json_arg(&format!("@{}", path.display())).unwrap();
        assert_eq!(value["power_kw"], 22);
    }
}
