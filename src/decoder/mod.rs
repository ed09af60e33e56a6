//! Schema-driven struct decoder.
//!
//! One [`StructDecoder`] serves every registered struct. A value can come
//! from BCS bytes, the fullnode typed-fields form, the canonical JSON
//! projection, or a remote object id; all four yield equal
//! [`DecodedInstance`]s for the same logical value.

pub mod bcs;
pub mod fields;
pub mod json;
pub mod remote;
mod special;

pub use self::bcs::{to_bcs, value_to_bcs};
pub use self::fields::FieldsWithTypes;
pub use self::json::{to_json, to_json_field};

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::{ReifiedError, Result};
use crate::models::DecodedInstance;
use crate::rpc::ObjectClient;
use crate::schema::{Canonicalizer, DescriptorRegistry, ReifiedType};

/// The four encodings a struct value can arrive in.
#[derive(Debug, Clone)]
pub enum SourceEncoding {
    Binary(Vec<u8>),
    TypedFields(FieldsWithTypes),
    Json(Value),
    RemoteReference(String),
}

impl SourceEncoding {
    pub fn kind(&self) -> &'static str {
        match self {
            SourceEncoding::Binary(_) => "bcs",
            SourceEncoding::TypedFields(_) => "typed-fields",
            SourceEncoding::Json(_) => "json",
            SourceEncoding::RemoteReference(_) => "remote",
        }
    }
}

#[derive(Clone)]
pub struct StructDecoder {
    registry: Arc<DescriptorRegistry>,
    client: Option<Arc<dyn ObjectClient>>,
}

impl StructDecoder {
    pub fn new(registry: Arc<DescriptorRegistry>) -> Self {
        Self { registry, client: None }
    }

    /// Inject the collaborator used for [`SourceEncoding::RemoteReference`].
    pub fn with_client(mut self, client: Arc<dyn ObjectClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn registry(&self) -> &DescriptorRegistry {
        &self.registry
    }

    pub fn canonicalizer(&self) -> &Canonicalizer {
        self.registry.canonicalizer()
    }

    pub fn client(&self) -> Option<&Arc<dyn ObjectClient>> {
        self.client.as_ref()
    }

    /// Decode `source` as an instance of `ty`.
    pub async fn decode(&self, ty: &ReifiedType, source: &SourceEncoding) -> Result<DecodedInstance> {
        debug!("Decoding {} from {} source", ty.full_type_name(), source.kind());
        match source {
            SourceEncoding::Binary(bytes) => self.from_bcs(ty, bytes),
            SourceEncoding::TypedFields(item) => self.from_fields_with_types(ty, item),
            SourceEncoding::Json(json) => self.from_json(ty, json),
            SourceEncoding::RemoteReference(id) => self.fetch(ty, id).await,
        }
    }

    /// Fail with `TypeMismatch` unless `found` canonicalizes to `ty`'s full name.
    pub fn ensure_type_matches(&self, ty: &ReifiedType, found: &str) -> Result<()> {
        let canonical = self
            .canonicalizer()
            .canonicalize(found)
            .map_err(|_| ReifiedError::type_mismatch(ty.full_type_name(), found))?;
        if canonical != ty.full_type_name() {
            return Err(ReifiedError::type_mismatch(ty.full_type_name(), canonical));
        }
        Ok(())
    }
}

impl std::fmt::Debug for StructDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructDecoder")
            .field("structs", &self.registry.len())
            .field("client", &self.client.as_ref().map(|c| c.description().to_string()))
            .finish()
    }
}
