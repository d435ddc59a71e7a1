//! # Escrow Client
//!
//! Client library for the fixed-price escrow contract: builds and submits
//! contract calls, computes fee-adjusted amounts, and decodes transaction
//! calldata and receipt logs back into typed domain objects.

pub mod client;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod fees;
pub mod types;
