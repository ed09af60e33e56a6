use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::RpcConfig;
use crate::rpc::traits::{ObjectClient, ObjectLookup, RemoteObject};

/// JSON-RPC 2.0 request envelope
#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// `sui_getObject` result
#[derive(Debug, Deserialize)]
struct ObjectResponse {
    data: Option<ObjectData>,
    error: Option<ObjectResponseError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectData {
    object_id: String,
    #[serde(rename = "type")]
    object_type: Option<String>,
    bcs: Option<RawData>,
    content: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawData {
    data_type: String,
    #[serde(rename = "type")]
    move_type: Option<String>,
    bcs_bytes: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObjectResponseError {
    code: String,
}

/// Sui fullnode client over JSON-RPC
pub struct SuiRpcClient {
    client: Client,
    url: String,
    next_id: AtomicU64,
    description: String,
}

impl SuiRpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self> {
        info!("🔧 Initializing SuiRpcClient");
        info!("  RPC URL: {}", config.url);
        info!("  Timeout: {}s", config.timeout_seconds);

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            url: config.url.clone(),
            next_id: AtomicU64::new(1),
            description: format!("SuiRpcClient({})", config.url),
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };
        debug!("➡️  {} #{}", method, request.id);

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("{} request to {} failed", method, self.url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("{} returned HTTP {}: {}", method, status, body));
        }

        let body: RpcResponse<T> = response
            .json()
            .await
            .with_context(|| format!("invalid {} response", method))?;

        if let Some(error) = body.error {
            return Err(anyhow!("{} failed with RPC error {}: {}", method, error.code, error.message));
        }
        body.result.ok_or_else(|| anyhow!("{} response has neither result nor error", method))
    }

    fn into_lookup(response: ObjectResponse) -> Result<ObjectLookup> {
        if let Some(error) = response.error {
            return match error.code.as_str() {
                "notExists" | "deleted" => Ok(ObjectLookup::NotFound),
                other => Err(anyhow!("object lookup failed: {}", other)),
            };
        }

        let data = match response.data {
            Some(data) => data,
            None => return Ok(ObjectLookup::NotFound),
        };

        let (type_string, bcs_bytes) = match data.bcs {
            Some(raw) if raw.data_type == "moveObject" => {
                let bytes = match raw.bcs_bytes {
                    Some(encoded) => Some(
                        base64::engine::general_purpose::STANDARD
                            .decode(encoded.as_bytes())
                            .context("bcsBytes is not valid base64")?,
                    ),
                    None => None,
                };
                (raw.move_type.or(data.object_type), bytes)
            }
            Some(raw) => {
                warn!("Object {} is a {}, not a Move object", data.object_id, raw.data_type);
                (data.object_type, None)
            }
            None => (data.object_type, None),
        };

        Ok(ObjectLookup::Found(RemoteObject {
            object_id: data.object_id,
            type_string,
            bcs_bytes,
            content: data.content,
        }))
    }
}

#[async_trait]
impl ObjectClient for SuiRpcClient {
    async fn fetch_object(&self, object_id: &str) -> Result<ObjectLookup> {
        let options = json!({ "showType": true, "showBcs": true, "showContent": true });
        let response: ObjectResponse = self.call("sui_getObject", json!([object_id, options])).await?;
        Self::into_lookup(response)
    }

    fn description(&self) -> &str {
        &self.description
    }
}
