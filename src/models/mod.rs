pub mod signature;
pub mod type_tag;
pub mod value;

pub use signature::*;
pub use type_tag::*;
pub use value::*;
