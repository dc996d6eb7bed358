use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 80;

/// A gateway as reported by the Phoscon discovery service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredBridge {
    #[serde(rename = "id")]
    pub bridge_id: String,
    #[serde(rename = "internalipaddress")]
    pub host: String,
    #[serde(rename = "internalport", default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "macaddress", default)]
    pub mac_address: Option<String>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiKeyRequest<'a> {
    pub devicetype: &'a str,
}

/// One element of the array the REST API answers with on writes.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiReply {
    Success(serde_json::Value),
    Error(ApiReplyError),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiReplyError {
    #[serde(rename = "type")]
    pub kind: u32,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub bridgeid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "swversion", default)]
    pub sw_version: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery_entry_without_port_uses_default() {
        let bridge: DiscoveredBridge =
            serde_json::from_str(r#"{"id": "00212E", "internalipaddress": "10.0.0.2"}"#)
                .expect("parse");
        assert_eq!(bridge.port, DEFAULT_PORT);
        assert_eq!(bridge.bridge_id, "00212E");
    }

    #[test]
    fn reply_array_distinguishes_success_and_error() {
        let replies: Vec<ApiReply> = serde_json::from_str(
            r#"[{"success": {"username": "ABCDEF"}},
                {"error": {"type": 101, "address": "/", "description": "link button not pressed"}}]"#,
        )
        .expect("parse");
        assert!(matches!(replies[0], ApiReply::Success(_)));
        match &replies[1] {
            ApiReply::Error(e) => assert_eq!(e.kind, 101),
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
