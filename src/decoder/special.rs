//! Framework structs whose RPC and JSON forms differ from their layout.

use crate::error::{ReifiedError, Result};
use crate::models::{MoveValue, StructName, TypeTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpecialForm {
    /// `0x1::string::String`
    Utf8String,
    /// `0x1::ascii::String`
    AsciiString,
    /// `0x2::url::Url`
    Url,
    /// `0x2::object::ID`
    Id,
    /// `0x2::object::UID`
    Uid,
    /// `0x2::balance::Balance<T>`
    Balance,
    /// `0x1::option::Option<T>`
    Option,
}

pub(crate) fn special_form(name: &StructName) -> Option<SpecialForm> {
    if name.is(1, "string", "String") {
        Some(SpecialForm::Utf8String)
    } else if name.is(1, "ascii", "String") {
        Some(SpecialForm::AsciiString)
    } else if name.is(2, "url", "Url") {
        Some(SpecialForm::Url)
    } else if name.is(2, "object", "ID") {
        Some(SpecialForm::Id)
    } else if name.is(2, "object", "UID") {
        Some(SpecialForm::Uid)
    } else if name.is(2, "balance", "Balance") {
        Some(SpecialForm::Balance)
    } else if name.is(1, "option", "Option") {
        Some(SpecialForm::Option)
    } else {
        None
    }
}

pub(crate) fn is_option(ty: &TypeTag) -> bool {
    ty.as_struct()
        .map_or(false, |tag| special_form(&tag.name) == Some(SpecialForm::Option))
}

/// `vector<u8>` holding the bytes of `s`.
pub(crate) fn byte_vector(bytes: &[u8]) -> MoveValue {
    MoveValue::Vector(bytes.iter().map(|b| MoveValue::U8(*b)).collect())
}

/// Move-level invariants of framework structs that BCS alone does not enforce.
pub(crate) fn check_layout(form: SpecialForm, fields: &[(String, MoveValue)]) -> Result<()> {
    let first = fields.first().map(|(_, value)| value);
    match form {
        SpecialForm::Utf8String => {
            let bytes = first.and_then(MoveValue::as_bytes).unwrap_or_default();
            std::str::from_utf8(&bytes)
                .map_err(|e| ReifiedError::decode(format!("string is not valid UTF-8: {}", e)))?;
        }
        SpecialForm::AsciiString => {
            let bytes = first.and_then(MoveValue::as_bytes).unwrap_or_default();
            if !bytes.is_ascii() {
                return Err(ReifiedError::decode("ascii string contains non-ASCII bytes"));
            }
        }
        SpecialForm::Option => {
            if let Some(MoveValue::Vector(items)) = first {
                if items.len() > 1 {
                    return Err(ReifiedError::decode(format!(
                        "option holds {} elements, at most one allowed",
                        items.len()
                    )));
                }
            }
        }
        _ => {}
    }
    Ok(())
}

/// String content of a (utf8 or ascii) string instance.
pub(crate) fn string_content(value: &MoveValue) -> Option<String> {
    let bytes = value.as_struct()?.field("bytes")?.as_bytes()?;
    String::from_utf8(bytes).ok()
}
