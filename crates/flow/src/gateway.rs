use async_trait::async_trait;
use deconz_setup_client::{ApiError, ClientConfig, DeconzApi};
use tracing::debug;

use crate::error::GatewayError;
use crate::ports::BridgeGateway;
use crate::types::{BridgeIdentity, CandidateBridge};

/// [`BridgeGateway`] backed by the deCONZ REST API.
#[derive(Clone, Default)]
pub struct DeconzGateway {
    api: DeconzApi,
}

impl DeconzGateway {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            api: DeconzApi::with_config(config),
        }
    }

    pub fn api(&self) -> &DeconzApi {
        &self.api
    }
}

impl From<ApiError> for GatewayError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Timeout(_) => GatewayError::Timeout,
            ApiError::Response { description, .. } => GatewayError::Rejected(description),
            other => GatewayError::Network(other.to_string()),
        }
    }
}

#[async_trait]
impl BridgeGateway for DeconzGateway {
    async fn discover(&self) -> Result<Vec<CandidateBridge>, GatewayError> {
        let bridges = self.api.discover().await?;
        Ok(bridges
            .into_iter()
            .map(|b| CandidateBridge {
                id: b.bridge_id,
                host: b.host,
                port: b.port,
            })
            .collect())
    }

    async fn pair(&self, host: &str, port: u16) -> Result<String, GatewayError> {
        debug!(host, port, "Pairing with gateway");
        Ok(self.api.get_api_key(host, port).await?)
    }

    async fn read_config(
        &self,
        host: &str,
        port: u16,
        api_key: &str,
    ) -> Result<BridgeIdentity, GatewayError> {
        let bridgeid = self.api.get_bridge_id(host, port, api_key).await?;
        Ok(BridgeIdentity { bridgeid })
    }
}
