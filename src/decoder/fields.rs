//! Decoding from JSON-shaped sources.
//!
//! Both the typed-fields form returned by the fullnode (`{type, fields}`)
//! and the canonical JSON projection share one walker; they differ only in
//! how nested structs are wrapped, which key names fields use, and how a
//! few framework structs are abbreviated.

use alloy::primitives::U256;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::decoder::special::{byte_vector, check_layout, is_option, special_form, SpecialForm};
use crate::decoder::StructDecoder;
use crate::error::{ReifiedError, Result};
use crate::models::{parse_address, DecodedInstance, MoveValue, StructTag, TypeTag};
use crate::schema::ReifiedType;

/// A struct value as the fullnode reports it: asserted type plus fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldsWithTypes {
    #[serde(rename = "type")]
    pub type_string: String,
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dialect {
    /// Fullnode `content` form, keyed by Move field names.
    TypedFields,
    /// Canonical JSON projection, keyed by camelCase names.
    Json,
}

fn shape_error(expected: &str, found: &Value) -> ReifiedError {
    ReifiedError::decode(format!("expected {}, found {}", expected, found))
}

fn in_field(err: ReifiedError, owner: &str, field: &str) -> ReifiedError {
    match err {
        ReifiedError::Decode(msg) => ReifiedError::decode(format!("{}.{}: {}", owner, field, msg)),
        other => other,
    }
}

fn small_uint(raw: &Value, max: u64, what: &str) -> Result<u64> {
    raw.as_u64()
        .filter(|v| *v <= max)
        .ok_or_else(|| shape_error(what, raw))
}

fn decimal_u64(raw: &Value) -> Result<u64> {
    match raw {
        Value::String(s) => s.parse().map_err(|_| shape_error("u64 decimal string", raw)),
        Value::Number(n) => n.as_u64().ok_or_else(|| shape_error("u64", raw)),
        _ => Err(shape_error("u64", raw)),
    }
}

fn decimal_u128(raw: &Value) -> Result<u128> {
    match raw {
        Value::String(s) => s.parse().map_err(|_| shape_error("u128 decimal string", raw)),
        Value::Number(n) => n.as_u64().map(u128::from).ok_or_else(|| shape_error("u128", raw)),
        _ => Err(shape_error("u128", raw)),
    }
}

fn decimal_u256(raw: &Value) -> Result<U256> {
    match raw {
        Value::String(s) => U256::from_str_radix(s, 10).map_err(|_| shape_error("u256 decimal string", raw)),
        Value::Number(n) => n.as_u64().map(U256::from).ok_or_else(|| shape_error("u256", raw)),
        _ => Err(shape_error("u256", raw)),
    }
}

impl StructDecoder {
    /// Decode the fullnode typed-fields form after checking its asserted type.
    pub fn from_fields_with_types(&self, ty: &ReifiedType, item: &FieldsWithTypes) -> Result<DecodedInstance> {
        self.ensure_type_matches(ty, &item.type_string)?;
        debug!("Decoding {} from typed fields", ty.full_type_name());
        self.decode_field_map(Arc::new(ty.clone()), &item.fields, Dialect::TypedFields)
    }

    pub(crate) fn decode_field_map(
        &self,
        ty: Arc<ReifiedType>,
        map: &Map<String, Value>,
        dialect: Dialect,
    ) -> Result<DecodedInstance> {
        let mut fields = Vec::with_capacity(ty.descriptor().fields.len());
        for (field, field_ty) in ty.fields() {
            let key = match dialect {
                Dialect::TypedFields => &field.name,
                Dialect::Json => &field.json_name,
            };
            let raw = map.get(key).ok_or_else(|| {
                ReifiedError::decode(format!("{}: missing field `{}`", ty.full_type_name(), key))
            })?;
            let value = self
                .decode_json_value(field_ty, raw, dialect)
                .map_err(|e| in_field(e, ty.type_name(), key))?;
            fields.push((field.name.clone(), value));
        }
        if let Some(form) = special_form(&ty.descriptor().name) {
            check_layout(form, &fields)?;
        }
        Ok(DecodedInstance::new(ty, fields))
    }

    fn decode_json_value(&self, ty: &TypeTag, raw: &Value, dialect: Dialect) -> Result<MoveValue> {
        Ok(match ty {
            TypeTag::Bool => MoveValue::Bool(raw.as_bool().ok_or_else(|| shape_error("bool", raw))?),
            TypeTag::U8 => MoveValue::U8(small_uint(raw, u8::MAX.into(), "u8")? as u8),
            TypeTag::U16 => MoveValue::U16(small_uint(raw, u16::MAX.into(), "u16")? as u16),
            TypeTag::U32 => MoveValue::U32(small_uint(raw, u32::MAX.into(), "u32")? as u32),
            TypeTag::U64 => MoveValue::U64(decimal_u64(raw)?),
            TypeTag::U128 => MoveValue::U128(decimal_u128(raw)?),
            TypeTag::U256 => MoveValue::U256(decimal_u256(raw)?),
            TypeTag::Address | TypeTag::Signer => {
                let s = raw.as_str().ok_or_else(|| shape_error("address string", raw))?;
                MoveValue::Address(parse_address(s)?)
            }
            TypeTag::Vector(inner) => {
                let items = raw.as_array().ok_or_else(|| shape_error("array", raw))?;
                let mut values = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let value = self
                        .decode_json_value(inner, item, dialect)
                        .map_err(|e| in_field(e, "vector", &index.to_string()))?;
                    values.push(value);
                }
                MoveValue::Vector(values)
            }
            TypeTag::Struct(tag) => {
                let nested = Arc::new(self.registry().reify_tag(tag)?);
                match special_form(&tag.name) {
                    Some(form) => self.decode_special(nested, form, raw, dialect)?,
                    None => MoveValue::Struct(self.decode_nested(nested, raw, dialect)?),
                }
            }
        })
    }

    fn decode_nested(&self, ty: Arc<ReifiedType>, raw: &Value, dialect: Dialect) -> Result<DecodedInstance> {
        let object = raw.as_object().ok_or_else(|| shape_error("object", raw))?;
        match dialect {
            Dialect::TypedFields => {
                let type_string = object
                    .get("type")
                    .and_then(Value::as_str)
                    .ok_or_else(|| shape_error("object with a `type` string", raw))?;
                let fields = object
                    .get("fields")
                    .and_then(Value::as_object)
                    .ok_or_else(|| shape_error("object with a `fields` map", raw))?;
                self.ensure_type_matches(&ty, type_string)?;
                self.decode_field_map(ty, fields, dialect)
            }
            Dialect::Json => self.decode_field_map(ty, object, dialect),
        }
    }

    fn decode_special(
        &self,
        ty: Arc<ReifiedType>,
        form: SpecialForm,
        raw: &Value,
        dialect: Dialect,
    ) -> Result<MoveValue> {
        let (field_name, field_ty) = match ty.fields().next() {
            Some((field, field_ty)) => (field.name.clone(), field_ty.clone()),
            None => return Err(ReifiedError::schema(format!("{} has no fields", ty.full_type_name()))),
        };

        let value = match (form, dialect) {
            (SpecialForm::Utf8String, _) | (SpecialForm::AsciiString, _) => {
                let s = raw.as_str().ok_or_else(|| shape_error("string", raw))?;
                if form == SpecialForm::AsciiString && !s.is_ascii() {
                    return Err(ReifiedError::decode(format!("`{}` is not an ASCII string", s)));
                }
                byte_vector(s.as_bytes())
            }
            (SpecialForm::Url, _) | (SpecialForm::Id, _) | (SpecialForm::Uid, Dialect::Json) => {
                self.decode_json_value(&field_ty, raw, dialect)?
            }
            (SpecialForm::Uid, Dialect::TypedFields) => {
                let id = raw
                    .as_object()
                    .and_then(|o| o.get("id"))
                    .ok_or_else(|| shape_error("object with an `id`", raw))?;
                // Some nodes nest the inner `ID` as `{ "id": { "id": "0x.." } }`.
                let id = match id.as_object().and_then(|o| o.get("id")) {
                    Some(inner) => inner,
                    None => id,
                };
                self.decode_json_value(&field_ty, id, dialect)?
            }
            (SpecialForm::Balance, Dialect::TypedFields) => self.decode_json_value(&field_ty, raw, dialect)?,
            (SpecialForm::Balance, Dialect::Json) => {
                return Ok(MoveValue::Struct(self.decode_nested(ty, raw, dialect)?));
            }
            (SpecialForm::Option, _) => {
                if raw.is_null() {
                    MoveValue::Vector(Vec::new())
                } else {
                    let element = ty
                        .type_args()
                        .first()
                        .cloned()
                        .ok_or_else(|| ReifiedError::schema("option without an element type"))?;
                    let item = match element.as_struct() {
                        Some(tag) if is_option(&element) => {
                            MoveValue::Struct(self.decode_option_wrapper(tag, raw, dialect)?)
                        }
                        _ => self.decode_json_value(&element, raw, dialect)?,
                    };
                    MoveValue::Vector(vec![item])
                }
            }
        };

        Ok(MoveValue::Struct(DecodedInstance::new(ty, vec![(field_name, value)])))
    }

    /// An option nested directly in another option, written as its `{ "vec": [..] }` field map.
    fn decode_option_wrapper(&self, tag: &StructTag, raw: &Value, dialect: Dialect) -> Result<DecodedInstance> {
        let nested = Arc::new(self.registry().reify_tag(tag)?);
        let object = raw
            .as_object()
            .ok_or_else(|| shape_error("object with a `vec` array", raw))?;
        if dialect == Dialect::TypedFields && object.contains_key("fields") {
            return self.decode_nested(nested, raw, dialect);
        }
        self.decode_field_map(nested, object, dialect)
    }
}
