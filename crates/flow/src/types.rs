use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use deconz_setup_client::types::DEFAULT_PORT;

/// Prefix of every created entry title, `deCONZ-<bridgeid>`.
pub const VENDOR_NAME: &str = "deCONZ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateBridge {
    pub id: String,
    pub host: String,
    pub port: u16,
}

/// Gateway settings gathered while the flow is running.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub api_key: Option<String>,
    pub bridgeid: Option<String>,
}

impl PartialConfig {
    pub fn with_endpoint(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: Some(host.into()),
            port: Some(port),
            ..Self::default()
        }
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

/// The record a finished flow produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalConfig {
    pub bridgeid: String,
    pub host: String,
    pub port: u16,
    pub api_key: String,
}

impl FinalConfig {
    pub fn is_complete(&self) -> bool {
        !self.bridgeid.is_empty() && !self.host.is_empty() && self.port != 0 && !self.api_key.is_empty()
    }

    pub fn title(&self) -> String {
        format!("{}-{}", VENDOR_NAME, self.bridgeid)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeIdentity {
    pub bridgeid: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    pub title: String,
    pub data: FinalConfig,
    pub created_at: DateTime<Utc>,
}

/// A gateway announced by another discovery mechanism (SSDP/UPnP).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryInfo {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub serial: Option<String>,
}

/// Settings carried over from an older configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportConfig {
    pub host: String,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub bridgeid: Option<String>,
}

/// Handoff from an add-on that already paired with its gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HassioInfo {
    pub addon: String,
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub serial: String,
    pub api_key: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
