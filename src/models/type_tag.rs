use alloy::primitives::B256;
use std::fmt;
use std::str::FromStr;

use crate::error::{ReifiedError, Result};
use crate::models::signature::parse_signature;

/// 32-byte Sui account / object address.
pub type SuiAddress = B256;

/// Parse `0x`-prefixed hex of up to 64 digits, left-padding short forms (`0x2`).
pub fn parse_address(s: &str) -> Result<SuiAddress> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .ok_or_else(|| ReifiedError::decode(format!("address `{}` is missing the 0x prefix", s)))?;

    if digits.is_empty() || digits.len() > 64 {
        return Err(ReifiedError::decode(format!("address `{}` must have 1 to 64 hex digits", s)));
    }

    let padded = format!("{:0>64}", digits);
    let bytes = hex::decode(&padded)
        .map_err(|e| ReifiedError::decode(format!("address `{}` is not valid hex: {}", s, e)))?;
    Ok(SuiAddress::from_slice(&bytes))
}

/// Full 64-digit lowercase form.
pub fn long_address(address: &SuiAddress) -> String {
    format!("0x{}", hex::encode(address.as_slice()))
}

/// Address with leading zeros removed (`0x2`, `0x0` for the zero address).
pub fn short_address(address: &SuiAddress) -> String {
    let encoded = hex::encode(address.as_slice());
    let trimmed = encoded.trim_start_matches('0');
    if trimmed.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{}", trimmed)
    }
}

/// Module-qualified struct name without type arguments, e.g. `0x2::object::UID`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructName {
    pub address: SuiAddress,
    pub module: String,
    pub name: String,
}

impl StructName {
    pub fn new(address: SuiAddress, module: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            address,
            module: module.into(),
            name: name.into(),
        }
    }

    /// Parse `0xADDR::module::Name`.
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.trim().split("::");
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(address), Some(module), Some(name), None) if !module.is_empty() && !name.is_empty() => {
                Ok(Self::new(parse_address(address)?, module, name))
            }
            _ => Err(ReifiedError::schema(format!("`{}` is not a module-qualified struct name", s))),
        }
    }

    pub fn render(&self, address: &dyn Fn(&SuiAddress) -> String) -> String {
        format!("{}::{}::{}", address(&self.address), self.module, self.name)
    }

    /// Compare against a well-known framework name such as `0x1::option::Option`.
    pub fn is(&self, address: u8, module: &str, name: &str) -> bool {
        let mut expected = [0u8; 32];
        expected[31] = address;
        self.address.as_slice() == expected && self.module == module && self.name == name
    }
}

impl fmt::Display for StructName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&short_address))
    }
}

/// An instantiated struct type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StructTag {
    pub name: StructName,
    pub type_params: Vec<TypeTag>,
}

/// A concrete Move type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
    Vector(Box<TypeTag>),
    Struct(Box<StructTag>),
}

impl TypeTag {
    /// Render with the given address formatter; arguments are joined by `", "`.
    pub fn render(&self, address: &dyn Fn(&SuiAddress) -> String) -> String {
        match self {
            TypeTag::Bool => "bool".to_string(),
            TypeTag::U8 => "u8".to_string(),
            TypeTag::U16 => "u16".to_string(),
            TypeTag::U32 => "u32".to_string(),
            TypeTag::U64 => "u64".to_string(),
            TypeTag::U128 => "u128".to_string(),
            TypeTag::U256 => "u256".to_string(),
            TypeTag::Address => "address".to_string(),
            TypeTag::Signer => "signer".to_string(),
            TypeTag::Vector(inner) => format!("vector<{}>", inner.render(address)),
            TypeTag::Struct(tag) => compose(tag.name.render(address), tag.type_params.iter().map(|t| t.render(address))),
        }
    }

    pub fn as_struct(&self) -> Option<&StructTag> {
        match self {
            TypeTag::Struct(tag) => Some(tag),
            _ => None,
        }
    }
}

/// `Name<a, b>`, or just `Name` without arguments.
pub fn compose(base: String, args: impl IntoIterator<Item = String>) -> String {
    let args: Vec<String> = args.into_iter().collect();
    if args.is_empty() {
        base
    } else {
        format!("{}<{}>", base, args.join(", "))
    }
}

impl FromStr for TypeTag {
    type Err = ReifiedError;

    fn from_str(s: &str) -> Result<Self> {
        parse_signature(s, &[])?.substitute(&[])
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&short_address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_and_long_address() {
        let short = parse_address("0x2").unwrap();
        let long = parse_address("0x0000000000000000000000000000000000000000000000000000000000000002").unwrap();
        assert_eq!(short, long);
        assert_eq!(short_address(&short), "0x2");
        assert_eq!(long_address(&short).len(), 66);
    }

    #[test]
    fn test_parse_address_rejects_bad_input() {
        assert!(parse_address("2").is_err());
        assert!(parse_address("0x").is_err());
        assert!(parse_address("0xzz").is_err());
        assert!(parse_address(&format!("0x{}", "1".repeat(65))).is_err());
    }

    #[test]
    fn test_zero_address_short_form() {
        let zero = parse_address("0x0000").unwrap();
        assert_eq!(short_address(&zero), "0x0");
    }

    #[test]
    fn test_type_tag_display() {
        let tag: TypeTag = "vector<0x0000000000000000000000000000000000000000000000000000000000000002::coin::Coin<0x2::sui::SUI>>"
            .parse()
            .unwrap();
        assert_eq!(tag.to_string(), "vector<0x2::coin::Coin<0x2::sui::SUI>>");
    }

    #[test]
    fn test_struct_name_is_framework() {
        let name = StructName::parse("0x1::option::Option").unwrap();
        assert!(name.is(1, "option", "Option"));
        assert!(!name.is(2, "option", "Option"));
    }
}
