use alloy::primitives::FixedBytes;
use thiserror::Error;

/// Errors raised while decoding calldata into a typed contract call.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The calldata's function selector matches no known escrow function.
    #[error("no escrow function matches selector {0}")]
    UnknownSelector(FixedBytes<4>),
    /// The calldata is shorter than a function selector.
    #[error("calldata is too short to contain a selector")]
    TooShort,
    /// The selector matched but the argument tail failed ABI decoding.
    #[error(transparent)]
    Abi(#[from] alloy::sol_types::Error),
}
