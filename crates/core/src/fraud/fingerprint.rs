use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Browser attributes collected at checkout. Only used as a correlation key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceAttributes {
    pub user_agent: String,
    pub language: String,
    pub platform: String,
    pub screen_resolution: String,
    pub color_depth: u8,
    pub timezone: String,
    pub hardware_concurrency: u16,
}

/// Hex SHA-256 over the attributes in a fixed order, `|`-separated.
pub fn device_fingerprint(attributes: &DeviceAttributes) -> String {
    let color_depth = attributes.color_depth.to_string();
    let concurrency = attributes.hardware_concurrency.to_string();
    let canonical = [
        attributes.user_agent.as_str(),
        attributes.language.as_str(),
        attributes.platform.as_str(),
        attributes.screen_resolution.as_str(),
        color_depth.as_str(),
        attributes.timezone.as_str(),
        concurrency.as_str(),
    ]
    .join("|");

    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}
