use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use crate::models::{long_address, parse_address};
use crate::rpc::traits::{ObjectClient, ObjectLookup, RemoteObject};

/// In-memory object store for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct MockObjectClient {
    objects: HashMap<String, RemoteObject>,
    failure: Option<String>,
}

fn normalize(id: &str) -> String {
    parse_address(id).map(|a| long_address(&a)).unwrap_or_else(|_| id.to_string())
}

impl MockObjectClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(mut self, object: RemoteObject) -> Self {
        self.objects.insert(normalize(&object.object_id), object);
        self
    }

    /// Every lookup fails with `message`, as a transport error would.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }
}

#[async_trait]
impl ObjectClient for MockObjectClient {
    async fn fetch_object(&self, object_id: &str) -> Result<ObjectLookup> {
        if let Some(message) = &self.failure {
            return Err(anyhow!("{}", message));
        }
        Ok(match self.objects.get(&normalize(object_id)) {
            Some(object) => ObjectLookup::Found(object.clone()),
            None => ObjectLookup::NotFound,
        })
    }

    fn description(&self) -> &str {
        "MockObjectClient"
    }
}
