use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// What a fullnode reports for one object.
#[derive(Debug, Clone, Default)]
pub struct RemoteObject {
    pub object_id: String,
    /// Move type of the object contents, as reported by the node.
    pub type_string: Option<String>,
    /// BCS bytes of the Move struct (without the object envelope).
    pub bcs_bytes: Option<Vec<u8>>,
    /// Parsed `content` block, when requested.
    pub content: Option<Value>,
}

#[derive(Debug, Clone)]
pub enum ObjectLookup {
    Found(RemoteObject),
    NotFound,
}

/// Abstract trait for resolving object identifiers
///
/// Implementations own transport concerns (timeouts, retries); decoding only
/// needs "identifier in, type + BCS or not-found out".
#[async_trait]
pub trait ObjectClient: Send + Sync {
    /// Fetch one object with its type and BCS representation
    async fn fetch_object(&self, object_id: &str) -> Result<ObjectLookup>;

    /// Get a human-readable description of this client
    fn description(&self) -> &str;
}
