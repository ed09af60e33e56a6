pub mod prepare_shop;

pub use prepare_shop::{MintPlan, MintReport, ShopTargets};
