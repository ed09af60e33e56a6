//! Runtime reification of Sui Move structs.
//!
//! A [`schema::DescriptorRegistry`] holds struct layouts; instantiating one
//! with concrete type arguments yields a [`schema::ReifiedType`], and a
//! [`decoder::StructDecoder`] turns BCS, fullnode typed fields, canonical
//! JSON or a remote object id into a [`models::DecodedInstance`].

pub mod calls;
pub mod config;
pub mod decoder;
pub mod error;
pub mod models;
pub mod rpc;
pub mod schema;
pub mod scripts;

pub use decoder::{SourceEncoding, StructDecoder};
pub use error::{ReifiedError, Result};
pub use models::{DecodedInstance, MoveValue, TypeTag};
pub use schema::{Canonicalizer, DescriptorRegistry, ReifiedType, RegistryBuilder};
