pub mod mock;
pub mod sui_client;
pub mod traits;

pub use mock::MockObjectClient;
pub use sui_client::SuiRpcClient;
pub use traits::*;
