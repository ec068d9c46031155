use std::path::Path;

use async_trait::async_trait;
use reqwest::{multipart, Client, StatusCode};
use serde::Deserialize;

use super::{content_type_for, file_name_of, read_asset, AssetUploader};
use crate::{
    config::UploadConfig,
    error::{AppResult, UploadError, UploadResult},
};

/// Form field carrying the asset bytes.
const FILE_FIELD: &str = "sticker";
/// Form field carrying the owner identifier.
const OWNER_FIELD: &str = "userId";

/// Uploads assets to an HTTP endpoint with a multipart POST.
#[derive(Clone)]
pub struct HttpUploader {
    client: Client,
    upload_url: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    url: Option<String>,
    sticker: Option<UploadedObject>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadedObject {
    url: Option<String>,
}

impl HttpUploader {
    pub fn new(config: &UploadConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            upload_url: config.url.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// URL the store would serve `file_name` at when the response omits one.
    fn fallback_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), file_name)
    }

    fn resolve_url(&self, body: UploadResponse, file_name: &str) -> UploadResult<String> {
        if !body.success {
            return Err(UploadError::Rejected(
                body.error.unwrap_or_else(|| "success=false".to_string()),
            ));
        }

        let url = body
            .url
            .or_else(|| body.sticker.and_then(|s| s.url))
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| self.fallback_url(file_name));

        Ok(url)
    }
}

/// The client timeout covers both the request and the body read.
fn transport_error(e: reqwest::Error) -> UploadError {
    if e.is_timeout() {
        UploadError::Timeout
    } else {
        UploadError::Transport(e)
    }
}

#[async_trait]
impl AssetUploader for HttpUploader {
    async fn upload(&self, path: &Path, owner_id: &str) -> UploadResult<String> {
        let file_name = file_name_of(path)?;
        let data = read_asset(path).await?;

        let part = multipart::Part::bytes(data)
            .file_name(file_name.clone())
            .mime_str(content_type_for(path))?;
        let form = multipart::Form::new()
            .part(FILE_FIELD, part)
            .text(OWNER_FIELD, owner_id.to_string());

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UploadError::Status(status.as_u16()));
        }

        let body: UploadResponse = response.json().await.map_err(transport_error)?;
        self.resolve_url(body, &file_name)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::UploadBackend;

    fn uploader() -> HttpUploader {
        HttpUploader::new(&UploadConfig {
            backend: UploadBackend::Http,
            url: "http://localhost:1/api/stickers/upload".to_string(),
            base_url: "https://cdn.example.com/stickers/".to_string(),
            timeout: Duration::from_secs(30),
        })
        .unwrap()
    }

    fn parse(raw: &str) -> UploadResponse {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn prefers_top_level_url() {
        let url = uploader()
            .resolve_url(
                parse(r#"{"success":true,"url":"https://cdn/a.png","sticker":{"url":"https://cdn/b.png"}}"#),
                "a.png",
            )
            .unwrap();
        assert_eq!(url, "https://cdn/a.png");
    }

    #[test]
    fn falls_back_to_nested_url() {
        let url = uploader()
            .resolve_url(
                parse(r#"{"success":true,"sticker":{"url":"https://cdn/nested.png"}}"#),
                "a.png",
            )
            .unwrap();
        assert_eq!(url, "https://cdn/nested.png");
    }

    #[test]
    fn synthesizes_url_when_missing() {
        let url = uploader()
            .resolve_url(parse(r#"{"success":true}"#), "cat.png")
            .unwrap();
        assert_eq!(url, "https://cdn.example.com/stickers/cat.png");
    }

    #[test]
    fn logical_failure_is_rejected() {
        let err = uploader()
            .resolve_url(
                parse(r#"{"success":false,"error":"Invalid file type"}"#),
                "cat.png",
            )
            .unwrap_err();
        assert!(matches!(err, UploadError::Rejected(msg) if msg == "Invalid file type"));
    }

    #[tokio::test]
    async fn missing_file_fails_before_any_request() {
        let err = uploader()
            .upload(Path::new("/nope/missing.png"), "admin")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MissingFile(_)));
    }
}
