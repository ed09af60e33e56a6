use alloy::primitives::U256;
use std::sync::Arc;

use crate::models::type_tag::SuiAddress;
use crate::schema::ReifiedType;

/// A runtime Move value laid out as BCS stores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveValue {
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(U256),
    Address(SuiAddress),
    Vector(Vec<MoveValue>),
    Struct(DecodedInstance),
}

impl MoveValue {
    pub fn as_struct(&self) -> Option<&DecodedInstance> {
        match self {
            MoveValue::Struct(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            MoveValue::U8(v) => Some(u64::from(*v)),
            MoveValue::U16(v) => Some(u64::from(*v)),
            MoveValue::U32(v) => Some(u64::from(*v)),
            MoveValue::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<&SuiAddress> {
        match self {
            MoveValue::Address(address) => Some(address),
            _ => None,
        }
    }

    /// Raw bytes of a `vector<u8>`.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            MoveValue::Vector(items) => items
                .iter()
                .map(|item| match item {
                    MoveValue::U8(b) => Some(*b),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

/// A struct value conforming to a [`ReifiedType`].
///
/// Only the decoder constructs these, so every instance has passed full
/// validation against its type. Two instances are equal when their fully
/// qualified types and all field values are equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstance {
    ty: Arc<ReifiedType>,
    fields: Vec<(String, MoveValue)>,
}

impl DecodedInstance {
    pub(crate) fn new(ty: Arc<ReifiedType>, fields: Vec<(String, MoveValue)>) -> Self {
        Self { ty, fields }
    }

    pub fn reified(&self) -> &Arc<ReifiedType> {
        &self.ty
    }

    pub fn type_name(&self) -> &str {
        self.ty.type_name()
    }

    pub fn full_type_name(&self) -> &str {
        self.ty.full_type_name()
    }

    pub fn type_args(&self) -> Vec<String> {
        self.ty.type_arg_strings()
    }

    pub fn field(&self, name: &str) -> Option<&MoveValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn fields(&self) -> &[(String, MoveValue)] {
        &self.fields
    }
}
