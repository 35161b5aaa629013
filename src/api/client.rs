use std::time::Duration;

use futures_util::future::BoxFuture;
use log::info;

use super::error::ApiError;
use super::types::{
    AcquireImageRequest, AcquireImageResponse, CustomFovRequest, CustomFovResponse,
    EquipmentPresets, GeocodeHit, TelescopeTarget,
};
use crate::catalog::{ImageStatus, ObjectRecord};
use crate::params::Settings;

/// Result of one on-demand acquisition, as merged back into the record.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageAcquisition {
    pub url: Option<String>,
    pub status: ImageStatus,
}

/// Seam for the selection controller's on-demand image flow. Boxed
/// futures keep the controller testable with an in-process stub.
pub trait ImageFetcher: Send + Sync + 'static {
    fn acquire(
        &self,
        object: ObjectRecord,
        settings: Settings,
    ) -> BoxFuture<'static, Result<ImageAcquisition, ApiError>>;
}

/// Point request/response client for everything outside the stream:
/// settings persistence, image acquisition, geocoding, presets and the
/// telescope-control push.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http: reqwest::Client::new() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn settings(&self) -> Result<Settings, ApiError> {
        let response = self.http.get(self.url("/api/settings")).send().await?;
        Ok(check(response).await?.json().await?)
    }

    /// The settings blob is opportunistic persistence; unknown fields
    /// round-trip untouched via `Settings::extra`.
    pub async fn save_settings(&self, settings: &Settings) -> Result<(), ApiError> {
        let response = self
            .http
            .post(self.url("/api/settings"))
            .json(settings)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn presets(&self) -> Result<EquipmentPresets, ApiError> {
        let response = self.http.get(self.url("/api/presets")).send().await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn geocode(&self, city: &str) -> Result<Vec<GeocodeHit>, ApiError> {
        let response = self
            .http
            .get(self.url("/api/geocode"))
            .query(&[("city", city)])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// On-demand acquisition for the selected record, independent of the
    /// stream session; applies the caller-configured timeout.
    pub async fn acquire_image(
        &self,
        object: &ObjectRecord,
        settings: &Settings,
    ) -> Result<AcquireImageResponse, ApiError> {
        let response = self
            .http
            .post(self.url("/api/download-image"))
            .timeout(Duration::from_secs(settings.image.timeout_secs))
            .json(&AcquireImageRequest { object, settings })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn custom_fov_image(
        &self,
        ra: &str,
        dec: &str,
        fov: f64,
    ) -> Result<CustomFovResponse, ApiError> {
        let response = self
            .http
            .post(self.url("/api/custom-fov"))
            .json(&CustomFovRequest { ra, dec, fov })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn push_to_telescope(
        &self,
        ra: &str,
        dec: &str,
        rotation: f64,
    ) -> Result<(), ApiError> {
        info!("pushing target to telescope: ra={} dec={} rot={}", ra, dec, rotation);
        let response = self
            .http
            .post(self.url("/api/telescope"))
            .json(&TelescopeTarget { ra, dec, rotation })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(ApiError::Status { status: status.as_u16(), message })
}

impl ImageFetcher for ApiClient {
    fn acquire(
        &self,
        object: ObjectRecord,
        settings: Settings,
    ) -> BoxFuture<'static, Result<ImageAcquisition, ApiError>> {
        let client = self.clone();
        Box::pin(async move {
            let response = client.acquire_image(&object, &settings).await?;
            Ok(ImageAcquisition { url: response.url, status: response.status })
        })
    }
}
