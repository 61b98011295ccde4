// SPDX-License-Identifier: AGPL-3.0
// Rentboard CLI - HTTP client for the listings API
//
// Implements the core's AdsApi and Submitter ports over reqwest.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use rentboard_core::{
    AdDraft, AdsApi, Advertisement, AppError, BrowserSettings, FetchError, PageRequest,
    SubmitReceipt, Submitter, MAX_DRAFT_IMAGES,
};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Image extensions the submission endpoint accepts
const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Client for the remote listings API
pub struct ApiClient {
    http_client: Client,
    base_url: String,
    user_id: Option<String>,
}

#[derive(Deserialize)]
struct AdsResponse {
    #[serde(default)]
    ads: Option<Vec<Advertisement>>,
    #[serde(default)]
    has_more: Option<bool>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

impl ApiClient {
    pub fn new(settings: &BrowserSettings) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| AppError::InvalidConfig(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            user_id: settings.user_id.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn image_part(path: &Path) -> Result<Option<Part>, AppError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        if !IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            tracing::warn!("Skipping unsupported image {:?}", path);
            return Ok(None);
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| AppError::FileIo(format!("Failed to read image {:?}: {}", path, e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| format!("image.{}", extension));

        Ok(Some(Part::bytes(bytes).file_name(file_name)))
    }
}

fn classify(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else {
        FetchError::Network(format!("Request failed: {}", err))
    }
}

#[async_trait]
impl AdsApi for ApiClient {
    async fn fetch_ads(&self, request: &PageRequest) -> Result<Vec<Advertisement>, FetchError> {
        let response = self
            .http_client
            .get(self.url("/api/ads"))
            .query(&request.query_pairs())
            .send()
            .await
            .map_err(classify)?;

        if !response.status().is_success() {
            return Err(FetchError::Network(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let body = response.bytes().await.map_err(classify)?;
        let parsed: AdsResponse = serde_json::from_slice(&body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

        if let Some(total) = parsed.total {
            tracing::debug!(
                "{} page at offset {}: total {}, more: {:?}",
                request.view,
                request.offset,
                total,
                parsed.has_more
            );
        }

        Ok(parsed.ads.unwrap_or_default())
    }
}

#[async_trait]
impl Submitter for ApiClient {
    async fn submit(&self, draft: &AdDraft) -> Result<SubmitReceipt, AppError> {
        let user_id = self.user_id.clone().ok_or_else(|| {
            AppError::InvalidConfig("A user id is required to submit listings".to_string())
        })?;

        let mut form = Form::new()
            .text("user_id", user_id)
            .text("city", draft.city.clone())
            .text("rooms", draft.rooms.clone())
            .text("price", draft.price.clone())
            .text("address", draft.address.clone())
            .text("description", draft.description.clone())
            .text("phone", draft.phone.clone());

        for path in draft.images.iter().take(MAX_DRAFT_IMAGES) {
            if let Some(part) = Self::image_part(path).await? {
                form = form.part("images", part);
            }
        }

        let response = self
            .http_client
            .post(self.url("/api/submit_user_ad"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Submission(format!("Request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Submission(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let reason = serde_json::from_slice::<ErrorResponse>(&body)
                .map(|r| r.error)
                .unwrap_or_else(|_| String::from_utf8_lossy(&body).to_string());
            return Err(AppError::Submission(format!("status {}: {}", status, reason)));
        }

        serde_json::from_slice(&body)
            .map_err(|e| AppError::Serialization(format!("Invalid submission response: {}", e)))
    }
}
