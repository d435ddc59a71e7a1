//! Escrow client constants.

use alloy::primitives::{B256, b256};

/// Denominator for basis-point fee rates.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Symbol of the platform's canonical stablecoin, used when a request does not
/// name a payment token and when decoded calldata carries no token address.
pub const CANONICAL_TOKEN_SYMBOL: &str = "USDT";

/// Placeholder contractor data for deposits created before the contractor has
/// submitted anything: keccak256 of the empty byte string.
pub const EMPTY_CONTRACTOR_DATA: B256 =
    b256!("0xc5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");
