use anyhow::Result;
use async_trait::async_trait;

use crate::error::GatewayError;
use crate::types::{BridgeIdentity, CandidateBridge, ConfigEntry, FinalConfig};

/// Discovery and pairing calls the wizard makes against the vendor side.
#[async_trait]
pub trait BridgeGateway: Send + Sync {
    /// Probe the local network for gateways.
    async fn discover(&self) -> Result<Vec<CandidateBridge>, GatewayError>;

    /// Negotiate a new API key; [`GatewayError::Rejected`] while the gateway is locked.
    async fn pair(&self, host: &str, port: u16) -> Result<String, GatewayError>;

    /// Read the gateway's own identity with an API key it issued.
    async fn read_config(
        &self,
        host: &str,
        port: u16,
        api_key: &str,
    ) -> Result<BridgeIdentity, GatewayError>;
}

/// Lookup and creation of configured entries, owned by the host.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn find_by_host(&self, host: &str) -> Result<Option<ConfigEntry>>;

    async fn find_any(&self) -> Result<Option<ConfigEntry>>;

    async fn create_entry(&self, title: &str, data: &FinalConfig) -> Result<ConfigEntry>;
}
