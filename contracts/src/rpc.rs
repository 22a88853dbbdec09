//! # JSON-RPC Transport
//!
//! The contract reader never speaks HTTP directly; it goes through the
//! [`EthCall`] trait so tests can swap in canned responses. The production
//! implementation, [`HttpRpcClient`], posts JSON-RPC 2.0 `eth_call`
//! requests to a configured endpoint with `reqwest`.
//!
//! No retries and no explicit deadline: a request takes as long as the
//! underlying client lets it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::abi::decode_hex;
use crate::error::ContractError;

// ---------------------------------------------------------------------------
// JSON-RPC Types
// ---------------------------------------------------------------------------

/// A JSON-RPC 2.0 request envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version. Always "2.0".
    pub jsonrpc: String,
    /// The method to invoke.
    pub method: String,
    /// Positional parameters.
    pub params: serde_json::Value,
    /// Request identifier. Echoed back in the response.
    pub id: u64,
}

/// A JSON-RPC 2.0 response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    /// Protocol version. Always "2.0".
    pub jsonrpc: String,
    /// The result on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// The error on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    /// Request identifier, echoed from the request.
    #[serde(default)]
    pub id: serde_json::Value,
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Short human-readable error description.
    pub message: String,
    /// Optional structured error data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl JsonRpcRequest {
    /// Builds an `eth_call` against the latest block.
    pub fn eth_call(id: u64, to: &str, data: &[u8]) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            method: "eth_call".into(),
            params: serde_json::json!([
                { "to": to, "data": format!("0x{}", hex::encode(data)) },
                "latest"
            ]),
            id,
        }
    }
}

impl JsonRpcResponse {
    /// Extracts the hex payload of an `eth_call` result.
    pub fn into_call_output(self) -> Result<Vec<u8>, ContractError> {
        if let Some(err) = self.error {
            return Err(ContractError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        match self.result {
            Some(serde_json::Value::String(hex)) => decode_hex(&hex),
            Some(other) => Err(ContractError::Decode(format!(
                "expected hex string result, got {other}"
            ))),
            None => Err(ContractError::Decode(
                "response has neither result nor error".into(),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Executes read-only contract calls.
#[async_trait]
pub trait EthCall: Send + Sync {
    /// Runs `eth_call` with calldata `data` against contract `to` and returns
    /// the raw return bytes.
    async fn eth_call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, ContractError>;
}

/// [`EthCall`] over HTTP JSON-RPC.
pub struct HttpRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl HttpRpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Uses a preconfigured `reqwest` client (proxies, TLS roots, timeouts).
    pub fn with_client(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl EthCall for HttpRpcClient {
    async fn eth_call(&self, to: &str, data: &[u8]) -> Result<Vec<u8>, ContractError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = JsonRpcRequest::eth_call(id, to, data);

        let response: JsonRpcResponse = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response.into_call_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eth_call_envelope() {
        let req = JsonRpcRequest::eth_call(7, "0xabc", &[0x12, 0x34, 0x56, 0x78]);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["method"], "eth_call");
        assert_eq!(json["id"], 7);
        assert_eq!(json["params"][0]["to"], "0xabc");
        assert_eq!(json["params"][0]["data"], "0x12345678");
        assert_eq!(json["params"][1], "latest");
    }

    #[test]
    fn test_result_is_decoded() {
        let resp: JsonRpcResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"result":"0x00ff"}"#).unwrap();
        assert_eq!(resp.into_call_output().unwrap(), vec![0x00, 0xff]);
    }

    #[test]
    fn test_error_object_becomes_rpc_error() {
        let resp: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"execution reverted"}}"#,
        )
        .unwrap();
        match resp.into_call_output() {
            Err(ContractError::Rpc { code, message }) => {
                assert_eq!(code, -32000);
                assert_eq!(message, "execution reverted");
            }
            other => panic!("expected rpc error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_response_is_decode_error() {
        let resp: JsonRpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(matches!(
            resp.into_call_output(),
            Err(ContractError::Decode(_))
        ));
    }

    #[test]
    fn test_request_ids_increase() {
        let client = HttpRpcClient::new("http://127.0.0.1:0");
        let a = client.next_id.fetch_add(1, Ordering::Relaxed);
        let b = client.next_id.fetch_add(1, Ordering::Relaxed);
        assert!(b > a);
        assert_eq!(client.url(), "http://127.0.0.1:0");
    }
}
