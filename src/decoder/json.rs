//! Canonical JSON projection: `$typeName`, `$typeArgs`, then one camelCase
//! key per field.

use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

use crate::decoder::fields::Dialect;
use crate::decoder::special::{is_option, special_form, string_content, SpecialForm};
use crate::decoder::StructDecoder;
use crate::error::{ReifiedError, Result};
use crate::models::{long_address, DecodedInstance, MoveValue, TypeTag};
use crate::schema::ReifiedType;

pub const TYPE_NAME_KEY: &str = "$typeName";
pub const TYPE_ARGS_KEY: &str = "$typeArgs";

impl StructDecoder {
    /// Decode the canonical JSON projection produced by [`to_json`].
    ///
    /// Type arguments are compared one by one so that a mismatch reports the
    /// offending position.
    pub fn from_json(&self, ty: &ReifiedType, json: &Value) -> Result<DecodedInstance> {
        let object = json
            .as_object()
            .ok_or_else(|| ReifiedError::decode(format!("expected a JSON object for {}", ty.full_type_name())))?;

        let type_name = object
            .get(TYPE_NAME_KEY)
            .and_then(Value::as_str)
            .ok_or_else(|| ReifiedError::decode(format!("missing `{}`", TYPE_NAME_KEY)))?;
        if type_name != ty.type_name() {
            let found = self.canonicalizer().canonicalize(type_name).unwrap_or_else(|_| type_name.to_string());
            if found != ty.type_name() {
                return Err(ReifiedError::type_mismatch(ty.type_name(), type_name));
            }
        }

        let type_args = match object.get(TYPE_ARGS_KEY) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ReifiedError::decode(format!("`{}` must be an array, found {}", TYPE_ARGS_KEY, other)))
            }
            None => return Err(ReifiedError::decode(format!("missing `{}`", TYPE_ARGS_KEY))),
        };
        self.ensure_type_args_match(ty, type_args)?;

        debug!("Decoding {} from JSON", ty.full_type_name());
        self.decode_field_map(Arc::new(ty.clone()), object, Dialect::Json)
    }

    fn ensure_type_args_match(&self, ty: &ReifiedType, found: &[Value]) -> Result<()> {
        let expected = ty.type_arg_strings();
        if found.len() != expected.len() {
            return Err(ReifiedError::type_mismatch(
                ty.full_type_name(),
                format!("{} with {} type argument(s)", ty.type_name(), found.len()),
            ));
        }

        for (position, (raw, expected)) in found.iter().zip(expected.iter()).enumerate() {
            let arg = raw.as_str().ok_or_else(|| {
                ReifiedError::type_arg_mismatch(position, expected.clone(), raw.to_string())
            })?;
            let canonical = self
                .canonicalizer()
                .canonicalize(arg)
                .map_err(|_| ReifiedError::type_arg_mismatch(position, expected.clone(), arg))?;
            if &canonical != expected {
                return Err(ReifiedError::type_arg_mismatch(position, expected.clone(), canonical));
            }
        }
        Ok(())
    }
}

/// Full canonical JSON of an instance.
pub fn to_json(instance: &DecodedInstance) -> Value {
    let mut object = Map::new();
    object.insert(TYPE_NAME_KEY.to_string(), json!(instance.type_name()));
    object.insert(TYPE_ARGS_KEY.to_string(), json!(instance.type_args()));
    if let Value::Object(fields) = to_json_field(instance) {
        object.extend(fields);
    }
    Value::Object(object)
}

/// Field object of an instance, without the type envelope.
pub fn to_json_field(instance: &DecodedInstance) -> Value {
    let ty = instance.reified();
    let mut object = Map::new();
    for ((field, field_ty), (_, value)) in ty.fields().zip(instance.fields()) {
        object.insert(field.json_name.clone(), value_to_json(field_ty, value));
    }
    Value::Object(object)
}

fn value_to_json(ty: &TypeTag, value: &MoveValue) -> Value {
    match value {
        MoveValue::Bool(b) => json!(b),
        MoveValue::U8(v) => json!(v),
        MoveValue::U16(v) => json!(v),
        MoveValue::U32(v) => json!(v),
        MoveValue::U64(v) => json!(v.to_string()),
        MoveValue::U128(v) => json!(v.to_string()),
        MoveValue::U256(v) => json!(v.to_string()),
        MoveValue::Address(a) => json!(long_address(a)),
        MoveValue::Vector(items) => {
            let element = match ty {
                TypeTag::Vector(inner) => inner.as_ref(),
                other => other,
            };
            Value::Array(items.iter().map(|item| value_to_json(element, item)).collect())
        }
        MoveValue::Struct(instance) => struct_to_json(instance, value),
    }
}

fn struct_to_json(instance: &DecodedInstance, value: &MoveValue) -> Value {
    let first = instance.fields().first().map(|(_, v)| v);
    let first_ty = instance.reified().fields().next().map(|(_, t)| t.clone());

    match special_form(&instance.reified().descriptor().name) {
        Some(SpecialForm::Utf8String) | Some(SpecialForm::AsciiString) => {
            json!(string_content(value).unwrap_or_default())
        }
        Some(SpecialForm::Url) | Some(SpecialForm::Id) | Some(SpecialForm::Uid) => match (first, first_ty) {
            (Some(inner), Some(inner_ty)) => value_to_json(&inner_ty, inner),
            _ => Value::Null,
        },
        Some(SpecialForm::Option) => match first {
            Some(MoveValue::Vector(items)) => match (items.first(), instance.reified().type_args().first()) {
                // `null` is taken by the outer `None`, so an inner option keeps its `vec` wrapper.
                (Some(MoveValue::Struct(inner)), Some(element)) if is_option(element) => to_json_field(inner),
                (Some(item), Some(element)) => value_to_json(element, item),
                _ => Value::Null,
            },
            _ => Value::Null,
        },
        Some(SpecialForm::Balance) | None => to_json_field(instance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::tests::{decoder, sample_builder_bcs, BUILDER_TYPE, PKG};

    fn rule_type(witness: &str) -> ReifiedType {
        decoder()
            .registry()
            .reify_str(&format!("{}::witness_rule::Rule<{}>", PKG, witness))
            .unwrap()
    }

    #[test]
    fn test_rule_json_shape() {
        let decoder = decoder();
        let ty = rule_type(&format!("{}::avatar::Witness", PKG));
        let instance = decoder.from_bcs(&ty, &[1]).unwrap();
        let json = to_json(&instance);
        assert_eq!(json["$typeName"], json!(format!("{}::witness_rule::Rule", PKG)));
        assert_eq!(json["$typeArgs"], json!([format!("{}::avatar::Witness", PKG)]));
        assert_eq!(json["dummyField"], json!(true));
    }

    #[test]
    fn test_round_trip_builder() {
        let decoder = decoder();
        let ty = decoder.registry().reify_str(BUILDER_TYPE).unwrap();
        let original = decoder.from_bcs(&ty, &sample_builder_bcs()).unwrap();
        let json = to_json(&original);
        let decoded = decoder.from_json(&ty, &json).unwrap();
        assert_eq!(decoded, original);
        assert_eq!(json["kind"], json!("left_arm"));
        assert_eq!(json["manufacturer"], json!("Anima"));
        assert_eq!(json["price"], json!({ "value": "2500" }));
    }

    #[test]
    fn test_mismatched_type_arg_reports_position() {
        let decoder = decoder();
        let ty = rule_type(&format!("{}::avatar::Witness", PKG));
        let payload = json!({
            "$typeName": format!("{}::witness_rule::Rule", PKG),
            "$typeArgs": [format!("{}::avatar::OtherWitness", PKG)],
            "dummyField": true
        });
        let err = decoder.from_json(&ty, &payload).unwrap_err();
        match err {
            ReifiedError::TypeMismatch { position, expected, found } => {
                assert_eq!(position, Some(0));
                assert!(expected.ends_with("::avatar::Witness"));
                assert!(found.ends_with("::avatar::OtherWitness"));
            }
            other => panic!("expected TypeMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_second_type_arg_mismatch_is_localized() {
        let decoder = decoder();
        let ty = decoder.registry().reify("0x2::vec_map::Entry", vec![TypeTag::U64, TypeTag::Bool]).unwrap();
        let payload = json!({
            "$typeName": "0x2::vec_map::Entry",
            "$typeArgs": ["u64", "u8"],
            "key": "1",
            "value": true
        });
        let err = decoder.from_json(&ty, &payload).unwrap_err();
        assert!(matches!(err, ReifiedError::TypeMismatch { position: Some(1), .. }), "got {:?}", err);
    }

    #[test]
    fn test_long_form_type_args_are_accepted() {
        let decoder = decoder();
        let ty = decoder.registry().reify_str("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
        let payload = json!({
            "$typeName": "0x2::coin::Coin",
            "$typeArgs": [format!("0x{:064x}::sui::SUI", 2)],
            "id": "0x5",
            "balance": { "value": "10" }
        });
        let coin = decoder.from_json(&ty, &payload).unwrap();
        assert_eq!(coin.full_type_name(), "0x2::coin::Coin<0x2::sui::SUI>");
    }

    #[test]
    fn test_wrong_type_name_is_rejected() {
        let decoder = decoder();
        let ty = rule_type(&format!("{}::avatar::Witness", PKG));
        let payload = json!({
            "$typeName": "0x2::coin::Coin",
            "$typeArgs": [format!("{}::avatar::Witness", PKG)],
            "dummyField": true
        });
        assert!(matches!(decoder.from_json(&ty, &payload), Err(ReifiedError::TypeMismatch { position: None, .. })));
    }

    #[test]
    fn test_wrong_arity_is_rejected() {
        let decoder = decoder();
        let ty = rule_type(&format!("{}::avatar::Witness", PKG));
        let payload = json!({
            "$typeName": format!("{}::witness_rule::Rule", PKG),
            "$typeArgs": [],
            "dummyField": true
        });
        assert!(matches!(decoder.from_json(&ty, &payload), Err(ReifiedError::TypeMismatch { .. })));
    }

    fn nested_option_decoder() -> StructDecoder {
        let registry = crate::schema::RegistryBuilder::new(crate::schema::Canonicalizer::default())
            .with_definition(crate::schema::StructDefinition::new(
                "0x7::m::S",
                &[],
                &[("o", "0x1::option::Option<0x1::option::Option<u8>>")],
            ))
            .build()
            .unwrap();
        StructDecoder::new(Arc::new(registry))
    }

    #[test]
    fn test_nested_option_round_trips() {
        let decoder = nested_option_decoder();
        let ty = decoder.registry().reify_str("0x7::m::S").unwrap();
        let cases = [
            (vec![0u8], json!(null)),
            (vec![1, 0], json!({ "vec": [] })),
            (vec![1, 1, 7], json!({ "vec": [7] })),
        ];

        for (bytes, expected) in cases {
            let original = decoder.from_bcs(&ty, &bytes).unwrap();
            let json = to_json(&original);
            assert_eq!(json["o"], expected, "bytes {:?}", bytes);

            let decoded = decoder.from_json(&ty, &json).unwrap();
            assert_eq!(decoded, original);
            assert_eq!(crate::decoder::to_bcs(&decoded).unwrap(), bytes);
        }
    }

    #[test]
    fn test_nested_option_with_two_elements_rejected() {
        let decoder = nested_option_decoder();
        let ty = decoder.registry().reify_str("0x7::m::S").unwrap();
        assert!(matches!(decoder.from_bcs(&ty, &[1, 2, 7, 7]), Err(ReifiedError::Decode(_))));

        let payload = json!({ "$typeName": "0x7::m::S", "$typeArgs": [], "o": { "vec": [7, 8] } });
        assert!(matches!(decoder.from_json(&ty, &payload), Err(ReifiedError::Decode(_))));
    }

    #[test]
    fn test_deeply_nested_type_arg_is_a_mismatch() {
        let decoder = decoder();
        let ty = rule_type(&format!("{}::avatar::Witness", PKG));
        let n = 100_000;
        let payload = json!({
            "$typeName": format!("{}::witness_rule::Rule", PKG),
            "$typeArgs": [format!("{}u8{}", "vector<".repeat(n), ">".repeat(n))],
            "dummyField": true
        });
        let err = decoder.from_json(&ty, &payload).unwrap_err();
        assert!(matches!(err, ReifiedError::TypeMismatch { position: Some(0), .. }));
    }
}
