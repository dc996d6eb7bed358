use crate::error::{ApiError, ApiResult};
use crate::types::{ApiKeyRequest, ApiReply, DiscoveredBridge, GatewayConfig};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const DISCOVERY_URL: &str = "https://phoscon.de/discover";
pub const DEFAULT_DEVICE_TYPE: &str = "deconz-setup";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub discovery_url: String,
    pub device_type: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            discovery_url: DISCOVERY_URL.to_string(),
            device_type: DEFAULT_DEVICE_TYPE.to_string(),
            timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Clone)]
pub struct DeconzApi {
    client: Client,
    config: ClientConfig,
}

impl Default for DeconzApi {
    fn default() -> Self {
        Self::new()
    }
}

/// Base URL of the REST API on a gateway, `http://host:port/api/`.
fn api_base(host: &str, port: u16) -> ApiResult<Url> {
    let host = host.trim();
    if host.is_empty() {
        return Err(ApiError::InvalidHost("empty host".to_string()));
    }
    if port == 0 {
        return Err(ApiError::InvalidHost(format!("{host}: port 0")));
    }
    // bare IPv6 literals need brackets inside a URL
    let authority = if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    };
    Url::parse(&format!("http://{authority}/api/"))
        .map_err(|e| ApiError::InvalidHost(format!("{authority}: {e}")))
}

/// `http://host:port/api/<api_key>/config`, with the key kept as a single path segment.
fn config_url(host: &str, port: u16, api_key: &str) -> ApiResult<Url> {
    let mut url = api_base(host, port)?;
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidHost(format!("{host}: not a base URL")))?
        .pop_if_empty()
        .push(api_key)
        .push("config");
    Ok(url)
}

impl DeconzApi {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let client = Client::builder()
            .user_agent("deconz-setup/0.2")
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Ask the Phoscon discovery service for gateways on the local network.
    pub async fn discover(&self) -> ApiResult<Vec<DiscoveredBridge>> {
        debug!(url = %self.config.discovery_url, "Querying discovery service");
        let response = self
            .client
            .get(&self.config.discovery_url)
            .send()
            .await?
            .error_for_status()?;

        let bridges: Vec<DiscoveredBridge> = response.json().await?;
        info!(count = bridges.len(), "Discovery finished");
        Ok(bridges)
    }

    /// Request a new API key. The gateway must be unlocked for this to succeed.
    pub async fn get_api_key(&self, host: &str, port: u16) -> ApiResult<String> {
        let mut url = api_base(host, port)?;
        url.set_path("/api");
        debug!(%url, "Requesting API key");

        let response = self
            .client
            .post(url)
            .json(&ApiKeyRequest {
                devicetype: &self.config.device_type,
            })
            .send()
            .await?;

        // a locked gateway answers 403 with an error body, so decode before checking status
        let status = response.status();
        let replies: Vec<ApiReply> = response.json().await?;

        for reply in replies {
            match reply {
                ApiReply::Success(body) => {
                    if let Some(key) = body.get("username").and_then(|v| v.as_str()) {
                        info!(host, port, "Gateway issued an API key");
                        return Ok(key.to_string());
                    }
                }
                ApiReply::Error(e) => {
                    warn!(host, port, kind = e.kind, "Gateway refused API key: {}", e.description);
                    return Err(ApiError::Response {
                        kind: e.kind,
                        description: e.description,
                    });
                }
            }
        }

        Err(ApiError::InvalidResponse(format!(
            "no username in API key reply (status {status})"
        )))
    }

    /// Read the gateway configuration, authenticated with `api_key`.
    pub async fn get_config(&self, host: &str, port: u16, api_key: &str) -> ApiResult<GatewayConfig> {
        let url = config_url(host, port, api_key)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let replies: Vec<ApiReply> = response.json().await.unwrap_or_default();
            if let Some(ApiReply::Error(e)) = replies.into_iter().next() {
                return Err(ApiError::Response {
                    kind: e.kind,
                    description: e.description,
                });
            }
            return Err(ApiError::InvalidResponse(format!("config read failed: {status}")));
        }

        let config: GatewayConfig = response.json().await?;
        Ok(config)
    }

    pub async fn get_bridge_id(&self, host: &str, port: u16, api_key: &str) -> ApiResult<String> {
        let config = self.get_config(host, port, api_key).await?;
        if config.bridgeid.is_empty() {
            return Err(ApiError::InvalidResponse("empty bridgeid".to_string()));
        }
        Ok(config.bridgeid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn api_for(server: &Server) -> DeconzApi {
        DeconzApi::with_config(ClientConfig {
            discovery_url: format!("{}/discover", server.url()),
            timeout: Duration::from_secs(5),
            ..ClientConfig::default()
        })
    }

    fn port_of(server: &Server) -> u16 {
        server.socket_address().port()
    }

    #[test]
    fn api_base_brackets_ipv6_hosts() {
        let url = api_base("fe80::1", 8080).expect("url");
        assert_eq!(url.as_str(), "http://[fe80::1]:8080/api/");
        assert!(api_base("", 80).is_err());
        assert!(api_base("1.2.3.4", 0).is_err());
    }

    #[test]
    fn config_url_keeps_the_key_in_one_segment() {
        let url = config_url("1.2.3.4", 80, "ABC123").expect("url");
        assert_eq!(url.as_str(), "http://1.2.3.4/api/ABC123/config");

        let url = config_url("1.2.3.4", 8080, "a/b?c#d").expect("url");
        assert_eq!(url.as_str(), "http://1.2.3.4:8080/api/a%2Fb%3Fc%23d/config");

        let url = config_url("1.2.3.4", 80, "http://evil.example/").expect("url");
        assert_eq!(url.host_str(), Some("1.2.3.4"));
        assert!(url.path().ends_with("/config"));
    }

    #[tokio::test]
    async fn unreachable_gateway_error_hides_the_api_key() {
        let err = DeconzApi::new()
            .get_config("127.0.0.1", 1, "SECRETKEY123")
            .await
            .unwrap_err();
        assert!(!err.to_string().contains("SECRETKEY123"));
        assert!(!format!("{err:?}").contains("SECRETKEY123"));
    }

    #[tokio::test]
    async fn discover_parses_gateway_list() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/discover")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id": "id1", "internalipaddress": "1.2.3.4", "internalport": 80},
                    {"id": "id2", "internalipaddress": "5.6.7.8", "internalport": 8080}]"#,
            )
            .create_async()
            .await;

        let bridges = api_for(&server).discover().await.expect("discover");
        mock.assert_async().await;

        assert_eq!(bridges.len(), 2);
        assert_eq!(bridges[0].host, "1.2.3.4");
        assert_eq!(bridges[1].port, 8080);
        assert_eq!(bridges[1].bridge_id, "id2");
    }

    #[tokio::test]
    async fn discover_reports_server_errors() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/discover")
            .with_status(500)
            .create_async()
            .await;

        let err = api_for(&server).discover().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }

    #[tokio::test]
    async fn get_api_key_returns_username() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"devicetype": "deconz-setup"}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"success": {"username": "1234567890ABCDEF"}}]"#)
            .create_async()
            .await;

        let key = api_for(&server)
            .get_api_key("127.0.0.1", port_of(&server))
            .await
            .expect("api key");
        assert_eq!(key, "1234567890ABCDEF");
    }

    #[tokio::test]
    async fn locked_gateway_is_a_response_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"error": {"type": 101, "address": "/", "description": "link button not pressed"}}]"#,
            )
            .create_async()
            .await;

        let err = api_for(&server)
            .get_api_key("127.0.0.1", port_of(&server))
            .await
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn get_bridge_id_reads_config() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/1234567890ABCDEF/config")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"bridgeid": "00212EFFFF012345", "name": "Phoscon-GW"}"#)
            .create_async()
            .await;

        let id = api_for(&server)
            .get_bridge_id("127.0.0.1", port_of(&server), "1234567890ABCDEF")
            .await
            .expect("bridge id");
        assert_eq!(id, "00212EFFFF012345");
    }

    #[tokio::test]
    async fn unauthorized_config_read_is_a_response_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/BAD/config")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"error": {"type": 1, "address": "/config", "description": "unauthorized user"}}]"#,
            )
            .create_async()
            .await;

        let err = api_for(&server)
            .get_bridge_id("127.0.0.1", port_of(&server), "BAD")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Response { kind: 1, .. }));
    }
}
