use super::http::ensure_success;
use super::provider::UploadGateway;
use crate::error::Result;
use crate::media::{AssetRole, LocalAsset, RemoteAsset};
use crate::models::Collection;
use crate::DashboardError;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct UploadedImage {
    image_public_id: String,
    image_url: String,
}

impl From<UploadedImage> for RemoteAsset {
    fn from(uploaded: UploadedImage) -> Self {
        RemoteAsset {
            asset_id: uploaded.image_public_id,
            url: uploaded.image_url,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchResponse {
    List(Vec<UploadedImage>),
    Wrapped { images: Vec<UploadedImage> },
}

/// Multipart client for the backend's image endpoints.
pub struct HttpUploadGateway {
    client: Client,
    base_url: String,
}

impl HttpUploadGateway {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(HttpUploadGateway { client, base_url })
    }

    fn single_url(&self, collection: Collection) -> String {
        format!("{}/{}/update-image", self.base_url, collection)
    }

    fn batch_url(&self, collection: Collection) -> String {
        format!("{}/{}/{}-image-upload", self.base_url, collection, collection)
    }

    async fn post(&self, url: &str, form: Form) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| DashboardError::Upload(format!("Failed to send upload: {}", e)))?;

        ensure_success(response).await.map_err(|e| match e {
            DashboardError::Api { status, message } => DashboardError::Upload(format!(
                "upload rejected ({}): {}",
                status,
                message.unwrap_or_else(|| "no message".to_string())
            )),
            other => other,
        })
    }
}

async fn file_part(asset: &LocalAsset) -> Result<Part> {
    let blob = asset.blob();
    let data = blob.read().await?;
    Part::bytes(data)
        .file_name(blob.file_name())
        .mime_str(&blob.content_type())
        .map_err(|e| DashboardError::Upload(format!("Invalid content type: {}", e)))
}

#[async_trait]
impl UploadGateway for HttpUploadGateway {
    async fn upload_single(
        &self,
        collection: Collection,
        role: AssetRole,
        asset: &LocalAsset,
    ) -> Result<RemoteAsset> {
        tracing::info!("Uploading {} image {}", role.as_str(), asset.blob().file_name());
        let form = Form::new().part("file", file_part(asset).await?);

        let uploaded: UploadedImage = self
            .post(&self.single_url(collection), form)
            .await?
            .json()
            .await
            .map_err(|e| DashboardError::Upload(format!("Failed to parse upload response: {}", e)))?;

        Ok(uploaded.into())
    }

    async fn upload_batch(
        &self,
        collection: Collection,
        role: AssetRole,
        assets: &[LocalAsset],
    ) -> Result<Vec<RemoteAsset>> {
        tracing::info!("Uploading {} {} images", assets.len(), role.as_str());
        let mut form = Form::new();
        for asset in assets {
            form = form.part("files", file_part(asset).await?);
        }

        let response: BatchResponse = self
            .post(&self.batch_url(collection), form)
            .await?
            .json()
            .await
            .map_err(|e| DashboardError::Upload(format!("Failed to parse upload response: {}", e)))?;

        let uploaded = match response {
            BatchResponse::List(images) => images,
            BatchResponse::Wrapped { images } => images,
        };
        Ok(uploaded.into_iter().map(RemoteAsset::from).collect())
    }
}
