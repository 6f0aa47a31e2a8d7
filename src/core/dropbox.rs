use crate::core::client::{DownloadStream, FileMetadata, ListFolderResult, StorageClient};
use crate::core::config::Config;
use crate::core::path;
use crate::error::{DbxError, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

const API_ARG_HEADER: &str = "Dropbox-API-Arg";
const API_RESULT_HEADER: &str = "Dropbox-API-Result";

/// Blocking client for the Dropbox API v2 endpoints used by `get`.
pub struct DropboxClient {
    http: Client,
    token: String,
    api_url: String,
    content_url: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error_summary: String,
}

impl DropboxClient {
    pub fn new(token: String, api_url: &str, content_url: &str) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("dbxcli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            token,
            api_url: api_url.trim_end_matches('/').to_string(),
            content_url: content_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config, token: String) -> Result<Self> {
        Self::new(token, &config.api_url, &config.content_url)
    }

    fn rpc<R: DeserializeOwned>(&self, endpoint: &str, body: &Value) -> Result<R> {
        let url = format!("{}/{endpoint}", self.api_url);
        debug!(%url, "rpc request");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .json(body)
            .send()?;

        let response = check_status(response)?;
        Ok(response.json()?)
    }
}

impl StorageClient for DropboxClient {
    fn list_folder(&self, path: &str, recursive: bool) -> Result<ListFolderResult> {
        self.rpc(
            "files/list_folder",
            &json!({ "path": api_path(path), "recursive": recursive }),
        )
    }

    fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderResult> {
        self.rpc("files/list_folder/continue", &json!({ "cursor": cursor }))
    }

    fn download(&self, path: &str) -> Result<DownloadStream> {
        let url = format!("{}/files/download", self.content_url);
        let arg = header_safe_json(&json!({ "path": api_path(path) }))?;
        debug!(%url, path, "download request");

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(API_ARG_HEADER, arg)
            .send()?;

        let response = check_status(response)?;

        let metadata = response
            .headers()
            .get(API_RESULT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| serde_json::from_str::<FileMetadata>(v).ok());

        let size = match metadata {
            Some(metadata) => metadata.size,
            None => response.content_length().unwrap_or(0),
        };

        Ok(DownloadStream {
            size,
            reader: Box::new(response),
        })
    }
}

/// Path as the API expects it; the root folder is the empty string.
fn api_path(path: &str) -> &str {
    if path::is_root(path) {
        ""
    } else {
        path
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    debug!(status = status.as_u16(), "response received");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().unwrap_or_default();
    Err(DbxError::Api {
        status: status.as_u16(),
        summary: error_summary(&body),
    })
}

fn error_summary(body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => parsed.error_summary,
        Err(_) if body.trim().is_empty() => "no error details".to_string(),
        Err(_) => body.trim().to_string(),
    }
}

/// Serialize JSON for an HTTP header: everything outside printable ASCII is
/// written as `\uXXXX` escapes.
fn header_safe_json(value: &Value) -> Result<String> {
    let raw = serde_json::to_string(value)?;
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii() && c != '\u{7f}' {
            out.push(c);
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    Ok(out)
}
