use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::media::{MediaKind, MediaStoreError, StoredMedia, UploadFile};
use super::BaseMediaStore;

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Cloudinary credentials and upload settings.
#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("folder", &self.folder)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Cloudinary upload API response
#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

/// Cloudinary destroy API response
#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Cloudinary client using signed REST uploads
pub struct CloudinaryMediaStore {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryMediaStore {
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            API_BASE, self.config.cloud_name, kind, action
        )
    }

    /// Delivery limits applied at upload time.
    fn transformation(kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Image => "c_limit,w_1920,h_1080,q_auto:good",
            MediaKind::Video => "c_limit,w_1280,h_720,q_auto",
        }
    }

    async fn send(&self, url: String, form: Form) -> Result<reqwest::Response, MediaStoreError> {
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);
        Err(MediaStoreError::Rejected { status, message })
    }
}

/// SHA-256 request signature: sorted `key=value` pairs joined by `&`,
/// followed by the API secret, hex encoded.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, &str)> = params.iter().filter(|(_, v)| !v.is_empty()).collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Pull `public_id` out of an upload response that did not match `UploadResponse`.
fn recover_public_id(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value.get("public_id")?.as_str().map(str::to_string)
}

fn transport_error(err: reqwest::Error) -> MediaStoreError {
    if err.is_timeout() {
        MediaStoreError::Timeout
    } else {
        MediaStoreError::Transport(err.to_string())
    }
}

fn timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

#[async_trait]
impl BaseMediaStore for CloudinaryMediaStore {
    async fn upload(
        &self,
        file: &UploadFile,
        kind: MediaKind,
    ) -> Result<StoredMedia, MediaStoreError> {
        let timestamp = timestamp();
        let transformation = Self::transformation(kind);
        let signature = sign(
            &[
                ("folder", self.config.folder.as_str()),
                ("timestamp", timestamp.as_str()),
                ("transformation", transformation),
            ],
            &self.config.api_secret,
        );

        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| MediaStoreError::Transport(e.to_string()))?;

        let form = Form::new()
            .part("file", part)
            .text("api_key", self.config.api_key.clone())
            .text("folder", self.config.folder.clone())
            .text("timestamp", timestamp)
            .text("transformation", transformation)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self.send(self.endpoint(kind, "upload"), form).await?;
        let body = response.text().await.map_err(transport_error)?;
        let uploaded: UploadResponse = match serde_json::from_str(&body) {
            Ok(uploaded) => uploaded,
            Err(e) => {
                tracing::error!(%body, error = %e, "Unreadable upload response");
                // The asset was accepted; remove it so the upload stays all-or-nothing.
                if let Some(public_id) = recover_public_id(&body) {
                    if let Err(err) = self.delete(&public_id, kind).await {
                        tracing::warn!(%public_id, error = %err, "Failed to delete unreadable upload");
                    }
                }
                return Err(MediaStoreError::Transport(format!(
                    "unreadable upload response: {}",
                    e
                )));
            }
        };

        tracing::debug!(public_id = %uploaded.public_id, %kind, bytes = file.len(), "Uploaded media");
        Ok(StoredMedia {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    async fn delete(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaStoreError> {
        let timestamp = timestamp();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let form = Form::new()
            .text("api_key", self.config.api_key.clone())
            .text("public_id", public_id.to_string())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self.send(self.endpoint(kind, "destroy"), form).await?;
        let destroyed: DestroyResponse = response.json().await.map_err(transport_error)?;

        match destroyed.result.as_str() {
            // Already gone counts as deleted.
            "ok" | "not found" => Ok(()),
            other => Err(MediaStoreError::Rejected {
                status: 200,
                message: format!("destroy returned {}", other),
            }),
        }
    }
}
