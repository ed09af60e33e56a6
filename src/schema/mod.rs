//! Struct layouts and their instantiation with concrete type arguments.

pub mod builtin;
pub mod canonical;
pub mod descriptor;
pub mod registry;
pub mod reified;

pub use canonical::Canonicalizer;
pub use descriptor::*;
pub use registry::*;
pub use reified::*;
