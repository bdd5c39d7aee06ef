//! Alert command implementations

use super::{confirm, members, present_fields};
use crate::cli::{AlertCommands, AlertFields};
use crate::client::FortiSoarClient;
use crate::output;
use crate::state::CliState;
use fsr_core::errors::{FsrError, FsrResult};
use fsr_core::View;
use serde_json::{Map, Value};
use tracing::{info, warn};

const ALERTS_PATH: &str = "/api/3/alerts";

/// Handle alert commands
///
/// Arguments are validated before the session is created, so a rejected
/// command never logs in.
pub async fn handle_alert_command(command: AlertCommands, state: &mut CliState) -> FsrResult<()> {
    let format = state.output_format();

    match command {
        AlertCommands::List {
            limit,
            severity,
            status,
            source,
            columns,
            view,
        } => {
            let query = list_query(limit, severity, status, source);
            let alerts = list_alerts(state.ensure_client().await?, &query).await?;
            let columns = output::parse_columns(columns.as_deref());
            output::print(alerts, format, columns.as_deref(), view.into());
        }
        AlertCommands::Get { alert_id, view } => {
            let alert = get_alert(state.ensure_client().await?, &alert_id).await?;
            output::print(alert, format, None, view.into());
        }
        AlertCommands::Create { name, fields } => {
            let body = alert_body(Some(name), fields);
            let alert = create_alert(state.ensure_client().await?, &body).await?;
            let id = alert.get("@id").and_then(Value::as_str).unwrap_or("unknown");
            output::success(&format!("Created alert with ID: {}", id));
            output::print(alert, format, None, View::Simple);
        }
        AlertCommands::Update {
            alert_id,
            name,
            fields,
        } => {
            let body = alert_body(name, fields);
            if body.is_empty() {
                return Err(FsrError::usage("No update parameters provided"));
            }
            let alert = update_alert(state.ensure_client().await?, &alert_id, &body).await?;
            output::success(&format!("Updated alert: {}", alert_id));
            output::print(alert, format, None, View::Simple);
        }
        AlertCommands::Delete { alert_id, force } => {
            let prompt = format!("Are you sure you want to delete alert {}?", alert_id);
            if !force && !confirm(&prompt)? {
                println!("Deletion cancelled");
                return Ok(());
            }
            delete_alert(state.ensure_client().await?, &alert_id).await?;
            output::success(&format!("Deleted alert: {}", alert_id));
        }
    }

    Ok(())
}

/// Query string for listing alerts
fn list_query(
    limit: u32,
    severity: Option<String>,
    status: Option<String>,
    source: Option<String>,
) -> Vec<(String, String)> {
    let mut query = vec![("$limit".to_string(), limit.to_string())];
    for (key, value) in [("severity", severity), ("status", status), ("source", source)] {
        if let Some(value) = value {
            query.push((key.to_string(), value));
        }
    }
    query
}

/// Request body with only the fields the user supplied
fn alert_body(name: Option<String>, fields: AlertFields) -> Map<String, Value> {
    present_fields([
        ("name", name),
        ("description", fields.description),
        ("severity", fields.severity),
        ("status", fields.status),
        ("source", fields.source),
        ("type", fields.alert_type),
    ])
}

async fn list_alerts(client: &FortiSoarClient, query: &[(String, String)]) -> FsrResult<Value> {
    info!("Listing alerts");
    let response = client.get(ALERTS_PATH, query).await?;
    let collection: Value = client.handle_response(response).await?;
    Ok(members(collection))
}

async fn get_alert(client: &FortiSoarClient, alert_id: &str) -> FsrResult<Value> {
    info!("Fetching alert: {}", alert_id);
    let response = client.get(&format!("{}/{}", ALERTS_PATH, alert_id), &[]).await?;
    client.handle_response(response).await
}

async fn create_alert(client: &FortiSoarClient, body: &Map<String, Value>) -> FsrResult<Value> {
    info!("Creating alert");
    let response = client.post(ALERTS_PATH, body).await?;
    client.handle_response(response).await
}

async fn update_alert(
    client: &FortiSoarClient,
    alert_id: &str,
    body: &Map<String, Value>,
) -> FsrResult<Value> {
    info!("Updating alert: {}", alert_id);
    let response = client.put(&format!("{}/{}", ALERTS_PATH, alert_id), body).await?;
    client.handle_response(response).await
}

async fn delete_alert(client: &FortiSoarClient, alert_id: &str) -> FsrResult<()> {
    warn!("Deleting alert: {}", alert_id);
    let response = client.delete(&format!("{}/{}", ALERTS_PATH, alert_id)).await?;
    let _: Value = client.handle_response(response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AUTH_ENDPOINT;
    use crate::client::parse_server;
    use crate::config::{ConfigStore, FsrConfig};
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FortiSoarClient {
        FortiSoarClient::new(parse_server(&server.uri()).unwrap(), "tok", true).unwrap()
    }

    #[test]
    fn test_list_query() {
        let query = list_query(10, Some("High".to_string()), None, Some("SIEM".to_string()));
        assert_eq!(
            query,
            vec![
                ("$limit".to_string(), "10".to_string()),
                ("severity".to_string(), "High".to_string()),
                ("source".to_string(), "SIEM".to_string()),
            ]
        );
    }

    #[test]
    fn test_alert_body_skips_absent_fields() {
        let fields = AlertFields {
            severity: Some("High".to_string()),
            alert_type: Some("Phishing".to_string()),
            ..Default::default()
        };
        let body = alert_body(Some("Test".to_string()), fields);
        assert_eq!(
            Value::Object(body),
            json!({"name": "Test", "severity": "High", "type": "Phishing"})
        );

        assert!(alert_body(None, AlertFields::default()).is_empty());
    }

    #[tokio::test]
    async fn test_list_alerts_returns_members() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ALERTS_PATH))
            .and(query_param("$limit", "30"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hydra:member": [
                    {"@id": "alert-1", "name": "Test Alert 1"},
                    {"@id": "alert-2", "name": "Test Alert 2"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let alerts = list_alerts(&client, &list_query(30, None, None, None)).await.unwrap();
        assert_eq!(alerts.as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_create_alert_posts_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ALERTS_PATH))
            .and(body_json(json!({"name": "New Alert"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"@id": "new-alert", "name": "New Alert"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let body = alert_body(Some("New Alert".to_string()), AlertFields::default());
        let alert = create_alert(&client, &body).await.unwrap();
        assert_eq!(alert["@id"], "new-alert");
    }

    #[tokio::test]
    async fn test_delete_alert() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/3/alerts/alert-1"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        delete_alert(&client, "alert-1").await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_update_rejected_before_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AUTH_ENDPOINT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "tok123"})))
            .expect(0)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let config = FsrConfig {
            server: Some(server.uri()),
            username: Some("u".to_string()),
            password: Some("p".to_string()),
            ..Default::default()
        };
        let mut state = CliState::new(config, ConfigStore::new(dir.path().join(".pyfsr.yaml")));

        let command = AlertCommands::Update {
            alert_id: "alert-1".to_string(),
            name: None,
            fields: AlertFields::default(),
        };
        let err = handle_alert_command(command, &mut state).await.err().unwrap();
        assert!(matches!(err, FsrError::Usage(_)));
        assert_eq!(err.to_string(), "No update parameters provided");
        assert!(!state.has_client());
    }
}
