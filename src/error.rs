//! Error taxonomy for reification and decoding.

use thiserror::Error;

/// Failure of a reify or decode call.
///
/// Every variant is terminal: a decode either yields a fully valid
/// [`DecodedInstance`](crate::models::DecodedInstance) or one of these.
#[derive(Debug, Error)]
pub enum ReifiedError {
    /// Type-argument arity or schema shape errors, raised before decoding.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// An asserted or reported type differs from the expected one.
    #[error("type mismatch{}: expected `{expected}`, found `{found}`", describe_position(.position))]
    TypeMismatch {
        expected: String,
        found: String,
        /// Index of the offending type argument, when the mismatch is local to one.
        position: Option<usize>,
    },

    /// Malformed or incomplete payload for the declared shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// The remote identifier does not resolve to an object.
    #[error("object {id} not found")]
    NotFound { id: String },

    /// The object client failed while resolving `id`.
    #[error("failed to fetch object {id} as `{expected}`: {source}")]
    Client {
        id: String,
        expected: String,
        #[source]
        source: anyhow::Error,
    },
}

fn describe_position(position: &Option<usize>) -> String {
    match position {
        Some(index) => format!(" at type argument {}", index),
        None => String::new(),
    }
}

impl ReifiedError {
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaMismatch(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            position: None,
        }
    }

    pub fn type_arg_mismatch(position: usize, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            position: Some(position),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ReifiedError>;
