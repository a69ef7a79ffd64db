use super::{ContentApi, HttpContentApi, HttpUploadGateway, UploadGateway};
use crate::config::Config;
use crate::error::Result;
use std::sync::Arc;
use std::time::Duration;

/// Builds the HTTP-backed collaborators described by `config`.
pub fn create_clients(config: &Config) -> Result<(Arc<dyn ContentApi>, Arc<dyn UploadGateway>)> {
    let api = HttpContentApi::new(
        config.api_base_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let gateway = HttpUploadGateway::new(
        config.api_base_url.clone(),
        Duration::from_secs(config.upload_timeout_secs),
    )?;

    tracing::debug!("Content API clients configured for {}", config.api_base_url);
    Ok((Arc::new(api), Arc::new(gateway)))
}
