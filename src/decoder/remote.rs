use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::decoder::fields::FieldsWithTypes;
use crate::decoder::StructDecoder;
use crate::error::{ReifiedError, Result};
use crate::models::DecodedInstance;
use crate::rpc::{ObjectClient, ObjectLookup};
use crate::schema::ReifiedType;

impl StructDecoder {
    /// Fetch object `id` through the injected client and decode its BCS.
    pub async fn fetch(&self, ty: &ReifiedType, id: &str) -> Result<DecodedInstance> {
        let client = self.client().ok_or_else(|| ReifiedError::Client {
            id: id.to_string(),
            expected: ty.full_type_name().to_string(),
            source: anyhow::anyhow!("no object client configured"),
        })?;
        self.fetch_with(client.as_ref(), ty, id).await
    }

    /// Same as [`fetch`](Self::fetch) with an explicit client.
    pub async fn fetch_with(&self, client: &dyn ObjectClient, ty: &ReifiedType, id: &str) -> Result<DecodedInstance> {
        info!("🔍 Fetching {} as {} via {}", id, ty.full_type_name(), client.description());

        let lookup = client.fetch_object(id).await.map_err(|source| ReifiedError::Client {
            id: id.to_string(),
            expected: ty.full_type_name().to_string(),
            source,
        })?;

        let object = match lookup {
            ObjectLookup::Found(object) => object,
            ObjectLookup::NotFound => {
                warn!("Object {} not found", id);
                return Err(ReifiedError::NotFound { id: id.to_string() });
            }
        };

        let reported = object.type_string.as_deref().ok_or_else(|| {
            ReifiedError::type_mismatch(ty.full_type_name(), "<object without a Move type>")
        })?;
        self.ensure_type_matches(ty, reported)?;

        let bcs = object
            .bcs_bytes
            .as_deref()
            .ok_or_else(|| ReifiedError::decode(format!("object {} returned no BCS representation", id)))?;
        debug!("Object {} carries {} BCS bytes", id, bcs.len());
        self.from_bcs(ty, bcs)
    }

    /// Decode a fullnode `content` block (`dataType: moveObject`).
    pub fn from_parsed_content(&self, ty: &ReifiedType, content: &Value) -> Result<DecodedInstance> {
        let object = content
            .as_object()
            .ok_or_else(|| ReifiedError::decode("object content must be a JSON object"))?;
        match object.get("dataType").and_then(Value::as_str) {
            Some("moveObject") => {}
            other => {
                return Err(ReifiedError::decode(format!(
                    "content is not a Move object (dataType {:?})",
                    other
                )))
            }
        }

        let type_string = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ReifiedError::decode("content has no `type`"))?;
        let fields = match object.get("fields") {
            Some(Value::Object(fields)) => fields.clone(),
            Some(other) => return Err(ReifiedError::decode(format!("content fields must be an object, found {}", other))),
            None => Map::new(),
        };

        self.from_fields_with_types(
            ty,
            &FieldsWithTypes {
                type_string: type_string.to_string(),
                fields,
            },
        )
    }
}
