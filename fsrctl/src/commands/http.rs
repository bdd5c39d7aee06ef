//! Raw HTTP passthrough commands

use crate::cli::HttpCommands;
use crate::output;
use crate::state::CliState;
use fsr_core::errors::{FsrError, FsrResult};
use fsr_core::View;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Handle http commands
pub async fn handle_http_command(command: HttpCommands, state: &mut CliState) -> FsrResult<()> {
    let format = state.output_format();

    let result: Value = match command {
        HttpCommands::Get { endpoint, params } => {
            let query = parse_params(&params)?;
            let client = state.ensure_client().await?;
            let response = client.get(&endpoint, &query).await?;
            client.handle_response(response).await?
        }
        HttpCommands::Post { endpoint, data } => {
            let payload = read_payload(data.as_deref()).await?;
            let client = state.ensure_client().await?;
            let response = client.post(&endpoint, &payload).await?;
            client.handle_response(response).await?
        }
        HttpCommands::Put { endpoint, data } => {
            let payload = read_payload(data.as_deref()).await?;
            let client = state.ensure_client().await?;
            let response = client.put(&endpoint, &payload).await?;
            client.handle_response(response).await?
        }
        HttpCommands::Delete { endpoint } => {
            let client = state.ensure_client().await?;
            let response = client.delete(&endpoint).await?;
            client.handle_response(response).await?
        }
    };

    output::print(result, format, None, View::Full);
    Ok(())
}

/// Parse `key=value` query parameters; values may themselves contain `=`
fn parse_params(params: &[String]) -> FsrResult<Vec<(String, String)>> {
    params
        .iter()
        .map(|param| match param.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(FsrError::Usage(format!(
                "Invalid parameter '{}', expected key=value",
                param
            ))),
        })
        .collect()
}

/// Load a JSON request body from a file, or `{}` when none was given
async fn read_payload(data: Option<&Path>) -> FsrResult<Value> {
    match data {
        Some(path) => {
            debug!("Reading request body from {}", path.display());
            let contents = tokio::fs::read_to_string(path).await?;
            Ok(serde_json::from_str(&contents)?)
        }
        None => Ok(Value::Object(Default::default())),
    }
}
