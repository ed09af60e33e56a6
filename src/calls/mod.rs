//! Move call wrappers and transaction submission.
//!
//! Pure data shaping: nothing here decodes on-chain values.

pub mod admin;
pub mod avatar;
pub mod executor;
pub mod functions;
pub mod genesis_shop;
pub mod transaction;

pub use executor::*;
pub use functions::FunctionDescriptor;
pub use transaction::*;
