use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{ImageStatus, ObjectRecord};
use crate::params::Settings;

/// `POST /api/download-image`: on-demand acquisition for one record.
#[derive(Debug, Serialize)]
pub struct AcquireImageRequest<'a> {
    pub object: &'a ObjectRecord,
    pub settings: &'a Settings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AcquireImageResponse {
    pub url: Option<String>,
    pub status: ImageStatus,
}

/// `POST /api/custom-fov`: re-download the sky image at a user-chosen
/// viewing FOV.
#[derive(Debug, Serialize)]
pub struct CustomFovRequest<'a> {
    pub ra: &'a str,
    pub dec: &'a str,
    pub fov: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomFovResponse {
    pub url: String,
}

/// `POST /api/telescope`: push the framed target to the external
/// telescope-control integration.
#[derive(Debug, Serialize)]
pub struct TelescopeTarget<'a> {
    pub ra: &'a str,
    pub dec: &'a str,
    pub rotation: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeHit {
    pub name: String,
    pub country: Option<String>,
    #[serde(default)]
    pub admin1: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CameraPreset {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EquipmentPresets {
    #[serde(default)]
    pub cameras: BTreeMap<String, CameraPreset>,
}
