//! File and attachment command implementations

use super::{confirm, members, present_fields, split_list};
use crate::cli::FileCommands;
use crate::client::FortiSoarClient;
use crate::output;
use crate::state::CliState;
use fsr_core::errors::{FsrError, FsrResult};
use fsr_core::View;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const FILES_PATH: &str = "/api/3/files";
const ATTACHMENTS_PATH: &str = "/api/3/attachments";

/// Handle file and attachment commands
pub async fn handle_file_command(command: FileCommands, state: &mut CliState) -> FsrResult<()> {
    let format = state.output_format();

    // Argument problems are reported before any connection is attempted
    match &command {
        FileCommands::Upload { files, .. } => {
            if let Some(missing) = files.iter().find(|file| !file.is_file()) {
                return Err(FsrError::Io(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", missing.display()),
                )));
            }
        }
        FileCommands::Update {
            name,
            description,
            tags,
            ..
        } => {
            if name.is_none() && description.is_none() && tags.is_none() {
                return Err(FsrError::usage("No update parameters provided"));
            }
        }
        FileCommands::Link {
            alert, incident, ..
        } => {
            link_target(alert.as_deref(), incident.as_deref())?;
        }
        _ => {}
    }

    let client = state.ensure_client().await?;

    match command {
        FileCommands::Upload {
            files,
            description,
            tags,
        } => {
            let tags = split_list(tags.as_deref());
            for file in files {
                let attachment = upload_file(client, &file, description.as_deref(), &tags).await?;
                let id = attachment.get("@id").and_then(Value::as_str).unwrap_or("unknown");
                output::success(&format!("Uploaded {} - Attachment ID: {}", file.display(), id));
                output::print(attachment, format, None, View::Simple);
            }
        }
        FileCommands::List {
            limit,
            tag,
            columns,
            view,
        } => {
            let mut query = vec![("$limit".to_string(), limit.to_string())];
            if let Some(tag) = tag {
                query.push(("tags".to_string(), tag));
            }
            let attachments = list_attachments(client, &query).await?;
            let columns = output::parse_columns(columns.as_deref());
            output::print(attachments, format, columns.as_deref(), view.into());
        }
        FileCommands::Get {
            attachment_id,
            view,
        } => {
            let attachment = get_attachment(client, &attachment_id).await?;
            output::print(attachment, format, None, view.into());
        }
        FileCommands::Download {
            attachment_id,
            output_dir,
        } => {
            let output_dir = match output_dir {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let saved = download_attachment(client, &attachment_id, &output_dir).await?;
            output::success(&format!("Downloaded attachment to {}", saved.display()));
        }
        FileCommands::Delete {
            attachment_id,
            force,
        } => {
            let attachment = get_attachment(client, &attachment_id).await?;
            let name = attachment_name(&attachment).unwrap_or(attachment_id.as_str()).to_string();

            let prompt = format!("Are you sure you want to delete attachment '{}'?", name);
            if !force && !confirm(&prompt)? {
                println!("Deletion cancelled");
                return Ok(());
            }

            warn!("Deleting attachment: {}", attachment_id);
            let response = client
                .delete(&format!("{}/{}", ATTACHMENTS_PATH, attachment_id))
                .await?;
            let _: Value = client.handle_response(response).await?;
            output::success(&format!("Deleted attachment: {}", name));
        }
        FileCommands::Update {
            attachment_id,
            name,
            description,
            tags,
        } => {
            let body = update_body(name, description, tags.as_deref());
            let response = client
                .put(&format!("{}/{}", ATTACHMENTS_PATH, attachment_id), &body)
                .await?;
            let attachment: Value = client.handle_response(response).await?;
            output::success(&format!("Updated attachment: {}", attachment_id));
            output::print(attachment, format, None, View::Simple);
        }
        FileCommands::Link {
            attachment_id,
            alert,
            incident,
        } => {
            let target = link_target(alert.as_deref(), incident.as_deref())?;
            link_attachment(client, &attachment_id, &target).await?;
            output::success(&format!("Linked attachment to {}: {}", target.kind(), target.id()));
        }
    }

    Ok(())
}

/// Record an attachment can be linked to
#[derive(Debug, Clone, PartialEq, Eq)]
enum LinkTarget {
    Alert(String),
    Incident(String),
}

impl LinkTarget {
    fn kind(&self) -> &'static str {
        match self {
            LinkTarget::Alert(_) => "alert",
            LinkTarget::Incident(_) => "incident",
        }
    }

    fn id(&self) -> &str {
        match self {
            LinkTarget::Alert(id) | LinkTarget::Incident(id) => id,
        }
    }

    fn path(&self) -> String {
        match self {
            LinkTarget::Alert(id) => format!("/api/3/alerts/{}", id),
            LinkTarget::Incident(id) => format!("/api/3/incidents/{}", id),
        }
    }
}

fn link_target(alert: Option<&str>, incident: Option<&str>) -> FsrResult<LinkTarget> {
    match (alert, incident) {
        (Some(alert), None) => Ok(LinkTarget::Alert(alert.to_string())),
        (None, Some(incident)) => Ok(LinkTarget::Incident(incident.to_string())),
        (Some(_), Some(_)) => Err(FsrError::usage("Cannot specify both --alert and --incident")),
        (None, None) => Err(FsrError::usage("Must specify either --alert or --incident")),
    }
}

fn update_body(
    name: Option<String>,
    description: Option<String>,
    tags: Option<&str>,
) -> Map<String, Value> {
    let mut body = present_fields([("name", name), ("description", description)]);
    if tags.is_some() {
        body.insert("tags".to_string(), json!(split_list(tags)));
    }
    body
}

fn attachment_name(attachment: &Value) -> Option<&str> {
    attachment.get("name").and_then(Value::as_str)
}

/// The `file` field is either an IRI string or an embedded file record
fn file_iri(attachment: &Value) -> Option<&str> {
    match attachment.get("file")? {
        Value::String(iri) => Some(iri),
        Value::Object(file) => file.get("@id").and_then(Value::as_str),
        _ => None,
    }
}

/// Upload the file, then create an attachment record pointing at it
async fn upload_file(
    client: &FortiSoarClient,
    file: &Path,
    description: Option<&str>,
    tags: &[String],
) -> FsrResult<Value> {
    info!("Uploading {}", file.display());

    let response = client.upload(FILES_PATH, file).await?;
    let file_record: Value = client.handle_response(response).await?;
    let file_id = file_record
        .get("@id")
        .and_then(Value::as_str)
        .ok_or_else(|| FsrError::Api("Upload response did not include an @id".to_string()))?;

    let name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut attachment = Map::new();
    attachment.insert("name".to_string(), json!(name));
    if let Some(description) = description {
        attachment.insert("description".to_string(), json!(description));
    }
    attachment.insert("file".to_string(), json!(file_id));
    attachment.insert("tags".to_string(), json!(tags));

    let response = client.post(ATTACHMENTS_PATH, &attachment).await?;
    client.handle_response(response).await
}

async fn list_attachments(
    client: &FortiSoarClient,
    query: &[(String, String)],
) -> FsrResult<Value> {
    info!("Listing attachments");
    let response = client.get(ATTACHMENTS_PATH, query).await?;
    let collection: Value = client.handle_response(response).await?;
    Ok(members(collection))
}

async fn get_attachment(client: &FortiSoarClient, attachment_id: &str) -> FsrResult<Value> {
    let response = client
        .get(&format!("{}/{}", ATTACHMENTS_PATH, attachment_id), &[])
        .await?;
    client.handle_response(response).await
}

/// Download the attachment's file into `output_dir`, returning the saved path
async fn download_attachment(
    client: &FortiSoarClient,
    attachment_id: &str,
    output_dir: &Path,
) -> FsrResult<PathBuf> {
    let attachment = get_attachment(client, attachment_id).await?;

    let iri = file_iri(&attachment)
        .ok_or_else(|| FsrError::Api(format!("Attachment {} has no file", attachment_id)))?;

    // Only the final path component of the remote name is trusted
    let file_name = attachment_name(&attachment)
        .and_then(|name| Path::new(name).file_name())
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| attachment_id.into());
    let target = output_dir.join(file_name);

    debug!("Downloading {} to {}", iri, target.display());
    let bytes = client.download(iri).await?;

    tokio::fs::create_dir_all(output_dir).await?;
    tokio::fs::write(&target, bytes).await?;
    Ok(target)
}

async fn link_attachment(
    client: &FortiSoarClient,
    attachment_id: &str,
    target: &LinkTarget,
) -> FsrResult<()> {
    info!("Linking attachment {} to {} {}", attachment_id, target.kind(), target.id());
    let body = json!({"__link": [format!("{}/{}", ATTACHMENTS_PATH, attachment_id)]});
    let response = client.put(&target.path(), &body).await?;
    let _: Value = client.handle_response(response).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::parse_server;
    use tempfile::TempDir;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> FortiSoarClient {
        FortiSoarClient::new(parse_server(&server.uri()).unwrap(), "tok", true).unwrap()
    }

    #[test]
    fn test_link_target_requires_exactly_one() {
        assert_eq!(link_target(Some("a1"), None).unwrap(), LinkTarget::Alert("a1".to_string()));
        assert_eq!(link_target(None, Some("i1")).unwrap().path(), "/api/3/incidents/i1");
        assert!(link_target(None, None).is_err());
        assert!(link_target(Some("a1"), Some("i1")).is_err());
    }

    #[test]
    fn test_update_body() {
        let body = update_body(Some("New Name".to_string()), None, Some("evidence, important"));
        assert_eq!(
            Value::Object(body),
            json!({"name": "New Name", "tags": ["evidence", "important"]})
        );
    }

    #[test]
    fn test_file_iri_shapes() {
        assert_eq!(file_iri(&json!({"file": "/api/3/files/1"})), Some("/api/3/files/1"));
        assert_eq!(file_iri(&json!({"file": {"@id": "/api/3/files/2"}})), Some("/api/3/files/2"));
        assert_eq!(file_iri(&json!({"file": null})), None);
    }

    #[tokio::test]
    async fn test_upload_creates_attachment() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(FILES_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"@id": "/api/3/files/f1"})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ATTACHMENTS_PATH))
            .and(body_json(json!({
                "name": "report.txt",
                "file": "/api/3/files/f1",
                "tags": ["evidence"]
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"@id": "/api/3/attachments/a1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = dir.path().join("report.txt");
        std::fs::write(&file, "contents").unwrap();

        let client = client_for(&server);
        let tags = ["evidence".to_string()];
        let attachment = upload_file(&client, &file, None, &tags).await.unwrap();
        assert_eq!(attachment["@id"], "/api/3/attachments/a1");
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/3/attachments/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "../evidence.bin",
                "file": {"@id": "/api/3/files/f1"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/3/files/f1"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"bytes".to_vec()))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let out = dir.path().join("nested");

        let client = client_for(&server);
        let saved = download_attachment(&client, "a1", &out).await.unwrap();
        assert_eq!(saved, out.join("evidence.bin"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn test_link_to_alert() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/3/alerts/al1"))
            .and(body_json(json!({"__link": ["/api/3/attachments/a1"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        link_attachment(&client, "a1", &LinkTarget::Alert("al1".to_string()))
            .await
            .unwrap();
    }
}
