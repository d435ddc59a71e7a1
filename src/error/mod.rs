//! Escrow client error types.

use crate::types::Status;
use alloy::{
    primitives::{Address, B256, ChainId, U256},
    providers::PendingTransactionError,
    sol_types::decode_revert_reason,
    transports::{RpcError, TransportErrorKind},
};
use thiserror::Error;

mod codec;
pub use codec::DecodeError;

mod config;
pub use config::ConfigError;

/// The overarching error type returned by escrow client operations.
///
/// Every variant maps to a stable [`kind`](Self::kind) label so callers can
/// classify failures without matching on the full enum.
#[derive(Debug, Error)]
pub enum EscrowError {
    /// Errors related to environment or token configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A token address read from chain data matches no configured token.
    #[error("token {0} is not in the configured token list")]
    UnknownToken(Address),
    /// No transaction exists for the queried hash.
    #[error("transaction {0} not found")]
    TransactionNotFound(B256),
    /// The provider reports a different chain than the configured one.
    #[error("provider chain id mismatch, expected {expected}, got {got}")]
    ChainIdMismatch {
        /// The chain id the client was configured for.
        expected: ChainId,
        /// The chain id the provider reported.
        got: ChainId,
    },
    /// The on-chain deposit record is not in the status the operation
    /// requires.
    #[error("deposit status is {got:?}, expected {expected:?}")]
    StatusMismatch {
        /// The status the operation requires.
        expected: Status,
        /// The status the deposit record is in.
        got: Status,
    },
    /// A required value is absent or zero.
    #[error("required value is not set: {0}")]
    NotSet(&'static str),
    /// The account's token balance is below the computed requirement.
    #[error("insufficient {token} balance, required {required}, available {available}")]
    InsufficientBalance {
        /// Symbol of the payment token.
        token: String,
        /// The fee-adjusted amount the operation needs.
        required: U256,
        /// The account's current balance.
        available: U256,
    },
    /// The pre-submission simulation reported that the call would revert.
    #[error(transparent)]
    Simulation(#[from] SimulationFailed),
    /// A transaction that had to succeed before the main action was reverted.
    #[error("transaction {0} did not succeed")]
    TransactionFailed(B256),
    /// Calldata could not be decoded into a known contract call.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Conversion between human and fixed-point amounts failed.
    #[error("unit conversion failed: {0}")]
    UnitConversion(String),
    /// An error occurred talking to RPC.
    #[error(transparent)]
    Rpc(#[from] RpcError<TransportErrorKind>),
    /// An error occurred in a contract view call.
    #[error(transparent)]
    Contract(#[from] alloy::contract::Error),
    /// An error occurred while waiting for a transaction receipt.
    #[error(transparent)]
    Receipt(#[from] PendingTransactionError),
}

impl EscrowError {
    /// A stable label for the error class.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "configuration",
            Self::UnknownToken(_) | Self::TransactionNotFound(_) => "not_found",
            Self::ChainIdMismatch { .. } | Self::StatusMismatch { .. } => "mismatch",
            Self::NotSet(_) => "not_set",
            Self::InsufficientBalance { .. } => "insufficient_funds",
            Self::Simulation(_) => "simulation",
            Self::TransactionFailed(_) => "transaction_failed",
            Self::Decode(_) => "decode",
            Self::UnitConversion(_) => "configuration",
            Self::Rpc(_) | Self::Contract(_) | Self::Receipt(_) => "rpc",
        }
    }
}

impl From<alloy::primitives::utils::UnitsError> for EscrowError {
    fn from(err: alloy::primitives::utils::UnitsError) -> Self {
        Self::UnitConversion(err.to_string())
    }
}

/// A normalized simulation failure.
///
/// Raised when the pre-submission `eth_call` reverts. The revert reason is
/// decoded into a readable message where possible, with the raw RPC error as a
/// fallback.
#[derive(Debug, Error)]
#[error("the call would revert: {reason}")]
pub struct SimulationFailed {
    /// Decoded revert reason, or the raw RPC error message.
    reason: String,
}

impl SimulationFailed {
    /// Creates a new [`SimulationFailed`] from the error returned by the
    /// simulation call. Attempts to decode a solidity revert reason out of the
    /// response payload.
    pub fn new(err: RpcError<TransportErrorKind>) -> Self {
        let decoded = err
            .as_error_resp()
            .and_then(|payload| payload.as_revert_data())
            .and_then(|data| decode_revert_reason(&data));
        Self { reason: decoded.unwrap_or_else(|| err.to_string()) }
    }

    /// The underlying revert reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn kinds_are_stable() {
        let err = EscrowError::UnknownToken(address!("0x2222222222222222222222222222222222222222"));
        assert_eq!(err.kind(), "not_found");
        assert_eq!(EscrowError::NotSet("amount").kind(), "not_set");
        assert_eq!(
            EscrowError::from(ConfigError::UnsupportedToken("WETH".into())).kind(),
            "configuration"
        );
        assert_eq!(EscrowError::from(DecodeError::UnknownSelector([0; 4].into())).kind(), "decode");
    }
}
