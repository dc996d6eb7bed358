use deconz_setup_client::api::{DEFAULT_DEVICE_TYPE, DISCOVERY_URL};
use deconz_setup_client::ClientConfig;
use deconz_setup_flow::DEFAULT_PORT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub discovery: DiscoveryConfig,
    pub bridge: BridgeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub url: String,
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Name the gateway shows for the API key we register.
    pub device_type: String,
    pub default_port: u16,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            url: DISCOVERY_URL.to_string(),
            timeout_seconds: 10,
            connect_timeout_seconds: 5,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            device_type: DEFAULT_DEVICE_TYPE.to_string(),
            default_port: DEFAULT_PORT,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discovery: DiscoveryConfig::default(),
            bridge: BridgeConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn load_or_default(path: &PathBuf) -> Self {
        Self::load(path).unwrap_or_default()
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            discovery_url: self.discovery.url.clone(),
            device_type: self.bridge.device_type.clone(),
            timeout: Duration::from_secs(self.discovery.timeout_seconds.max(1)),
            connect_timeout: Duration::from_secs(self.discovery.connect_timeout_seconds.max(1)),
        }
    }
}
