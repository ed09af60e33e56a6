//! BCS encoding of schema-typed values.
//!
//! Decoding drives the `bcs` deserializer with seeds built from the reified
//! type: structs are read as tuples of their fields in declaration order,
//! vectors as length-prefixed sequences. Canonical ULEB128 lengths, strict
//! bools, the sequence-length cap and trailing-byte rejection all come from
//! the `bcs` crate; only the framework layout rules are checked here.

use alloy::primitives::U256;
use serde::de::{self, DeserializeSeed, Deserializer, SeqAccess, Visitor};
use serde::ser::{SerializeSeq, SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use crate::decoder::special::{check_layout, special_form};
use crate::decoder::StructDecoder;
use crate::error::{ReifiedError, Result};
use crate::models::{DecodedInstance, MoveValue, SuiAddress, TypeTag};
use crate::schema::ReifiedType;

/// Upper bound on capacity reserved from an untrusted length prefix.
const PREALLOCATION_CAP: usize = 4096;

/// Move layout order; this is the BCS shape, not a JSON projection.
impl Serialize for MoveValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            MoveValue::Bool(b) => serializer.serialize_bool(*b),
            MoveValue::U8(v) => serializer.serialize_u8(*v),
            MoveValue::U16(v) => serializer.serialize_u16(*v),
            MoveValue::U32(v) => serializer.serialize_u32(*v),
            MoveValue::U64(v) => serializer.serialize_u64(*v),
            MoveValue::U128(v) => serializer.serialize_u128(*v),
            MoveValue::U256(v) => v.to_le_bytes::<32>().serialize(serializer),
            MoveValue::Address(a) => a.0.serialize(serializer),
            MoveValue::Vector(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            MoveValue::Struct(instance) => instance.serialize(serializer),
        }
    }
}

/// Fields as an unprefixed tuple, which is how BCS inlines a struct.
impl Serialize for DecodedInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(self.fields().len())?;
        for (_, value) in self.fields() {
            tuple.serialize_element(value)?;
        }
        tuple.end()
    }
}

/// Shared state of one `from_bcs` call.
struct DecodeContext<'d> {
    decoder: &'d StructDecoder,
    /// First failure that is not a payload error, reported in place of the serde error.
    failure: RefCell<Option<ReifiedError>>,
}

impl DecodeContext<'_> {
    fn fail<E: de::Error>(&self, err: ReifiedError) -> E {
        let message = err.to_string();
        if !matches!(err, ReifiedError::Decode(_)) {
            let mut slot = self.failure.borrow_mut();
            if slot.is_none() {
                *slot = Some(err);
            }
        }
        E::custom(message)
    }
}

fn field_error<E: de::Error>(ty: &ReifiedType, field: &str, reason: &dyn fmt::Display) -> E {
    E::custom(format!("{}.{}: {}", ty.type_name(), field, reason))
}

struct StructSeed<'c, 'd> {
    ctx: &'c DecodeContext<'d>,
    ty: Arc<ReifiedType>,
}

impl<'de> DeserializeSeed<'de> for StructSeed<'_, '_> {
    type Value = DecodedInstance;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error> {
        let len = self.ty.descriptor().fields.len();
        deserializer.deserialize_tuple(len, self)
    }
}

impl<'de> Visitor<'de> for StructSeed<'_, '_> {
    type Value = DecodedInstance;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "struct {}", self.ty.full_type_name())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let mut fields = Vec::with_capacity(self.ty.descriptor().fields.len());
        for (field, field_ty) in self.ty.fields() {
            let value = seq
                .next_element_seed(ValueSeed {
                    ctx: self.ctx,
                    ty: field_ty,
                })
                .map_err(|e| field_error::<A::Error>(&self.ty, &field.name, &e))?
                .ok_or_else(|| field_error::<A::Error>(&self.ty, &field.name, &"missing"))?;
            fields.push((field.name.clone(), value));
        }
        if let Some(form) = special_form(&self.ty.descriptor().name) {
            check_layout(form, &fields).map_err(|e| self.ctx.fail::<A::Error>(e))?;
        }
        Ok(DecodedInstance::new(self.ty, fields))
    }
}

struct ValueSeed<'c, 'd, 't> {
    ctx: &'c DecodeContext<'d>,
    ty: &'t TypeTag,
}

impl<'de> DeserializeSeed<'de> for ValueSeed<'_, '_, '_> {
    type Value = MoveValue;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Self::Value, D::Error> {
        Ok(match self.ty {
            TypeTag::Bool => MoveValue::Bool(bool::deserialize(deserializer)?),
            TypeTag::U8 => MoveValue::U8(u8::deserialize(deserializer)?),
            TypeTag::U16 => MoveValue::U16(u16::deserialize(deserializer)?),
            TypeTag::U32 => MoveValue::U32(u32::deserialize(deserializer)?),
            TypeTag::U64 => MoveValue::U64(u64::deserialize(deserializer)?),
            TypeTag::U128 => MoveValue::U128(u128::deserialize(deserializer)?),
            TypeTag::U256 => {
                let raw = <[u8; 32]>::deserialize(deserializer)?;
                MoveValue::U256(U256::from_le_slice(&raw))
            }
            TypeTag::Address | TypeTag::Signer => {
                MoveValue::Address(SuiAddress::from(<[u8; 32]>::deserialize(deserializer)?))
            }
            TypeTag::Vector(element) => MoveValue::Vector(deserializer.deserialize_seq(VectorVisitor {
                ctx: self.ctx,
                element,
            })?),
            TypeTag::Struct(tag) => {
                let nested = self
                    .ctx
                    .decoder
                    .registry()
                    .reify_tag(tag)
                    .map_err(|e| self.ctx.fail::<D::Error>(e))?;
                let seed = StructSeed {
                    ctx: self.ctx,
                    ty: Arc::new(nested),
                };
                MoveValue::Struct(seed.deserialize(deserializer)?)
            }
        })
    }
}

struct VectorVisitor<'c, 'd, 't> {
    ctx: &'c DecodeContext<'d>,
    element: &'t TypeTag,
}

impl<'de> Visitor<'de> for VectorVisitor<'_, '_, '_> {
    type Value = Vec<MoveValue>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vector<{}>", self.element)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0).min(PREALLOCATION_CAP));
        while let Some(item) = seq.next_element_seed(ValueSeed {
            ctx: self.ctx,
            ty: self.element,
        })? {
            items.push(item);
        }
        Ok(items)
    }
}

impl StructDecoder {
    /// Decode a struct from its BCS bytes; every byte must be consumed.
    pub fn from_bcs(&self, ty: &ReifiedType, data: &[u8]) -> Result<DecodedInstance> {
        let ctx = DecodeContext {
            decoder: self,
            failure: RefCell::new(None),
        };
        let seed = StructSeed {
            ctx: &ctx,
            ty: Arc::new(ty.clone()),
        };
        bcs::from_bytes_seed(seed, data).map_err(|err| {
            ctx.failure
                .borrow_mut()
                .take()
                .unwrap_or_else(|| ReifiedError::decode(format!("{}: {}", ty.full_type_name(), err)))
        })
    }
}

/// Re-encode an instance into the layout [`StructDecoder::from_bcs`] reads.
pub fn to_bcs(instance: &DecodedInstance) -> Result<Vec<u8>> {
    bcs::to_bytes(instance)
        .map_err(|e| ReifiedError::decode(format!("cannot encode {}: {}", instance.full_type_name(), e)))
}

/// BCS bytes of a single value (used for pure call arguments).
pub fn value_to_bcs(value: &MoveValue) -> Result<Vec<u8>> {
    bcs::to_bytes(value).map_err(|e| ReifiedError::decode(format!("cannot encode value: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::tests::{decoder, ADMIN_CAP, PKG};

    fn admin_with_roles_prefix(prefix: &[u8]) -> Vec<u8> {
        let mut data = ADMIN_CAP[..32].to_vec();
        data.extend_from_slice(prefix);
        data
    }

    #[test]
    fn test_decode_and_reencode_admin_cap() {
        let decoder = decoder();
        let ty = decoder.registry().reify(&format!("{}::access_control::Admin", PKG), vec![]).unwrap();
        let instance = decoder.from_bcs(&ty, &ADMIN_CAP).unwrap();

        assert_eq!(instance.full_type_name(), format!("{}::access_control::Admin", PKG));
        assert_eq!(instance.field("roles").and_then(MoveValue::as_bytes), Some(vec![1, 2, 3]));
        assert_eq!(to_bcs(&instance).unwrap(), ADMIN_CAP.to_vec());
    }

    #[test]
    fn test_non_canonical_length_rejected() {
        let decoder = decoder();
        let ty = decoder.registry().reify(&format!("{}::access_control::Admin", PKG), vec![]).unwrap();
        // 3 encoded in two bytes
        let data = admin_with_roles_prefix(&[0x83, 0x00, 1, 2, 3]);
        assert!(matches!(decoder.from_bcs(&ty, &data), Err(ReifiedError::Decode(_))));
    }

    #[test]
    fn test_length_prefix_beyond_input_rejected() {
        let decoder = decoder();
        let ty = decoder.registry().reify(&format!("{}::access_control::Admin", PKG), vec![]).unwrap();
        let data = admin_with_roles_prefix(&[0xff, 0xff, 0xff, 0x7f, 1]);
        assert!(matches!(decoder.from_bcs(&ty, &data), Err(ReifiedError::Decode(_))));
    }

    #[test]
    fn test_truncated_payload_is_decode_error() {
        let decoder = decoder();
        // Item { id: UID, level: u64, power: u32, name: String }
        let ty = decoder.registry().reify(&format!("{}::item::Item", PKG), vec![]).unwrap();
        let mut data = vec![0x11; 32];
        data.extend_from_slice(&7u64.to_le_bytes());
        data.extend_from_slice(&3u32.to_le_bytes());
        data.push(5);
        data.extend_from_slice(b"hel");

        let err = decoder.from_bcs(&ty, &data).unwrap_err();
        match err {
            ReifiedError::Decode(msg) => assert!(msg.contains("Item.name"), "{}", msg),
            other => panic!("expected Decode, got {:?}", other),
        }

        // Fixed-width prefix cut short as well.
        let err = decoder.from_bcs(&ty, &data[..36]).unwrap_err();
        assert!(matches!(err, ReifiedError::Decode(_)));
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let decoder = decoder();
        let ty = decoder.registry().reify(&format!("{}::access_control::Admin", PKG), vec![]).unwrap();
        let mut data = ADMIN_CAP.to_vec();
        data.push(0);
        assert!(matches!(decoder.from_bcs(&ty, &data), Err(ReifiedError::Decode(_))));
    }

    #[test]
    fn test_invalid_bool_and_utf8_rejected() {
        let decoder = decoder();
        let rule = decoder
            .registry()
            .reify_str(&format!("{}::witness_rule::Rule<{}::avatar::Witness>", PKG, PKG))
            .unwrap();
        assert!(matches!(decoder.from_bcs(&rule, &[2]), Err(ReifiedError::Decode(_))));

        let string = decoder.registry().reify("0x1::string::String", vec![]).unwrap();
        assert!(matches!(decoder.from_bcs(&string, &[2, 0xff, 0xfe]), Err(ReifiedError::Decode(_))));
        assert!(decoder.from_bcs(&string, &[2, b'o', b'k']).is_ok());
    }

    #[test]
    fn test_option_with_two_elements_rejected() {
        let decoder = decoder();
        let option = decoder.registry().reify("0x1::option::Option", vec![TypeTag::U8]).unwrap();
        assert!(decoder.from_bcs(&option, &[0]).is_ok());
        assert!(decoder.from_bcs(&option, &[1, 9]).is_ok());
        assert!(matches!(decoder.from_bcs(&option, &[2, 9, 9]), Err(ReifiedError::Decode(_))));
    }

    #[test]
    fn test_value_encoding_matches_reference_serializer() {
        let mut word = [0u8; 32];
        word[0] = 1;
        word[31] = 0x80;
        let u256 = MoveValue::U256(U256::from_le_slice(&word));
        assert_eq!(value_to_bcs(&u256).unwrap(), word.to_vec());

        let address = MoveValue::Address(SuiAddress::from([0x5a; 32]));
        assert_eq!(value_to_bcs(&address).unwrap(), bcs::to_bytes(&[0x5au8; 32]).unwrap());

        let bytes = MoveValue::Vector((0..200u8).map(MoveValue::U8).collect());
        assert_eq!(value_to_bcs(&bytes).unwrap(), bcs::to_bytes(&(0..200u8).collect::<Vec<u8>>()).unwrap());
    }
}
