//! Shared domain types.

mod erc20;
pub use erc20::*;

mod escrow;
pub use escrow::*;

mod fee_manager;
pub use fee_manager::*;

mod intent;
pub use intent::*;

mod token;
pub use token::*;
