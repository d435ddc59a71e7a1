//! Typed transaction intents and outcomes.

use super::{DecodedEvent, DisputeWinner, FeeConfig, Status};
use crate::constants::{CANONICAL_TOKEN_SYMBOL, EMPTY_CONTRACTOR_DATA};
use alloy::{
    primitives::{Address, B256, Bytes, U256},
    rpc::types::TransactionReceipt,
};
use serde::{Deserialize, Serialize};

/// Parameters for creating a new deposit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositIntent {
    /// Address that will perform the work and claim the funds.
    pub contractor: Address,
    /// Symbol of the payment token.
    pub token: String,
    /// Deposit amount in human units, excluding fees.
    pub amount: f64,
    /// Chain-time lock before funds can be returned.
    pub time_lock: U256,
    /// How protocol fees are split for this deposit.
    pub fee_config: FeeConfig,
    /// Hash committing to the expected submission data.
    pub recipient_data: B256,
}

impl DepositIntent {
    /// Creates a deposit intent with the documented defaults: the canonical
    /// stablecoin, no time lock, client-covers-only fees and the empty-data
    /// placeholder hash.
    pub fn new(contractor: Address, amount: f64) -> Self {
        Self {
            contractor,
            token: CANONICAL_TOKEN_SYMBOL.to_string(),
            amount,
            time_lock: U256::ZERO,
            fee_config: FeeConfig::CLIENT_COVERS_ONLY,
            recipient_data: EMPTY_CONTRACTOR_DATA,
        }
    }

    /// Sets the payment token symbol.
    pub fn with_token(mut self, symbol: impl Into<String>) -> Self {
        self.token = symbol.into();
        self
    }

    /// Sets the time lock.
    pub fn with_time_lock(mut self, time_lock: U256) -> Self {
        self.time_lock = time_lock;
        self
    }

    /// Sets the fee configuration.
    pub fn with_fee_config(mut self, fee_config: FeeConfig) -> Self {
        self.fee_config = fee_config;
        self
    }

    /// Sets the recipient data hash.
    pub fn with_recipient_data(mut self, recipient_data: B256) -> Self {
        self.recipient_data = recipient_data;
        self
    }
}

/// Parameters for the combined approve entry point.
///
/// A nonzero `value_additional` routes the call to the refill path; see
/// [`EscrowClient::approve`](crate::client::EscrowClient::approve).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproveParams {
    /// The deposit's contract id.
    pub contract_id: U256,
    /// Amount to approve for claiming, in human units.
    pub value_approve: f64,
    /// Amount to add to the deposit instead, in human units.
    pub value_additional: f64,
    /// Address allowed to claim the approved amount.
    pub recipient: Address,
}

impl ApproveParams {
    /// Creates approve parameters with no additional value.
    pub fn new(contract_id: U256, value_approve: f64, recipient: Address) -> Self {
        Self { contract_id, value_approve, value_additional: 0.0, recipient }
    }

    /// Sets the additional value, which redirects the call into a refill.
    pub fn with_additional(mut self, value_additional: f64) -> Self {
        self.value_additional = value_additional;
        self
    }
}

/// A typed escrow contract call, one variant per contract function.
///
/// Produced by decoding calldata, or constructed by the caller before
/// encoding. Amounts are human units; fields that exist only to route the
/// combined entry points (like [`ApproveParams::value_additional`]) are not
/// part of the on-chain call and so do not appear here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TransactionIntent {
    /// `deposit(Deposit)`
    Deposit(DepositIntent),
    /// `withdraw(uint256)`
    Withdraw {
        /// The deposit's contract id.
        contract_id: U256,
    },
    /// `claim(uint256)`
    Claim {
        /// The deposit's contract id.
        contract_id: U256,
    },
    /// `submit(uint256, bytes, bytes32)`
    Submit {
        /// The deposit's contract id.
        contract_id: U256,
        /// The contractor's submission data.
        data: Bytes,
        /// Salt committing the submission to the contractor data hash.
        salt: B256,
    },
    /// `approve(uint256, uint256, address)`
    Approve {
        /// The deposit's contract id.
        contract_id: U256,
        /// Amount approved for claiming, in human units.
        value_approve: f64,
        /// Address allowed to claim.
        recipient: Address,
    },
    /// `refill(uint256, uint256)`
    Refill {
        /// The deposit's contract id.
        contract_id: U256,
        /// Amount added to the deposit, in human units.
        value: f64,
    },
    /// `requestReturn(uint256)`
    RequestReturn {
        /// The deposit's contract id.
        contract_id: U256,
    },
    /// `approveReturn(uint256)`
    ApproveReturn {
        /// The deposit's contract id.
        contract_id: U256,
    },
    /// `cancelReturn(uint256, Status)`
    CancelReturn {
        /// The deposit's contract id.
        contract_id: U256,
        /// The status the deposit is restored to.
        status: Status,
    },
    /// `createDispute(uint256)`
    CreateDispute {
        /// The deposit's contract id.
        contract_id: U256,
    },
    /// `resolveDispute(uint256, DisputeWinner, uint256, uint256)`
    ResolveDispute {
        /// The deposit's contract id.
        contract_id: U256,
        /// The party the dispute resolved in favor of.
        winner: DisputeWinner,
        /// Amount returned to the client, in human units.
        client_amount: f64,
        /// Amount awarded to the contractor, in human units.
        contractor_amount: f64,
    },
}

impl TransactionIntent {
    /// The solidity name of the contract function this intent targets.
    pub const fn function_name(&self) -> &'static str {
        match self {
            Self::Deposit(_) => "deposit",
            Self::Withdraw { .. } => "withdraw",
            Self::Claim { .. } => "claim",
            Self::Submit { .. } => "submit",
            Self::Approve { .. } => "approve",
            Self::Refill { .. } => "refill",
            Self::RequestReturn { .. } => "requestReturn",
            Self::ApproveReturn { .. } => "approveReturn",
            Self::CancelReturn { .. } => "cancelReturn",
            Self::CreateDispute { .. } => "createDispute",
            Self::ResolveDispute { .. } => "resolveDispute",
        }
    }
}

/// Status of a submitted or observed transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Submitted but not yet mined, or the caller did not wait.
    Pending,
    /// Mined and succeeded.
    Success,
    /// Mined and reverted.
    Reverted,
}

impl From<bool> for TransactionStatus {
    fn from(status: bool) -> Self {
        if status { Self::Success } else { Self::Reverted }
    }
}

/// The result of submitting a transaction or reconstructing one by hash.
///
/// `status` stays [`TransactionStatus::Pending`] until a receipt is observed;
/// an execute-time revert is reported here, never raised as an error.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    /// Hash of the transaction.
    pub transaction_hash: B256,
    /// The decoded or submitted intent.
    pub intent: TransactionIntent,
    /// Mining status.
    pub status: TransactionStatus,
    /// The receipt, once the transaction is mined and was waited for.
    pub receipt: Option<TransactionReceipt>,
    /// Escrow events decoded from the receipt logs.
    pub events: Vec<DecodedEvent>,
}

impl TransactionOutcome {
    /// An outcome for a transaction that has been submitted but not waited
    /// for.
    pub fn pending(transaction_hash: B256, intent: TransactionIntent) -> Self {
        Self {
            transaction_hash,
            intent,
            status: TransactionStatus::Pending,
            receipt: None,
            events: Vec::new(),
        }
    }

    /// Whether the transaction is known to have succeeded.
    pub fn succeeded(&self) -> bool {
        self.status == TransactionStatus::Success
    }
}

/// Outcome of a deposit, including the new contract id once known.
#[derive(Debug, Clone)]
pub struct DepositOutcome {
    /// Id of the created deposit record. `None` until a receipt confirms the
    /// deposit.
    pub contract_id: Option<U256>,
    /// The underlying transaction outcome.
    pub outcome: TransactionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    #[test]
    fn deposit_intent_defaults() {
        let contractor = address!("0x9965507D1a55bcC2695C58ba16FB37d819B0A4dc");
        let intent = DepositIntent::new(contractor, 100.0);
        assert_eq!(intent.token, CANONICAL_TOKEN_SYMBOL);
        assert_eq!(intent.time_lock, U256::ZERO);
        assert_eq!(intent.fee_config, FeeConfig::CLIENT_COVERS_ONLY);
        assert_eq!(intent.recipient_data, EMPTY_CONTRACTOR_DATA);
    }

    #[test]
    fn intent_function_names() {
        let claim = TransactionIntent::Claim { contract_id: U256::from(1) };
        assert_eq!(claim.function_name(), "claim");
        let deposit = TransactionIntent::Deposit(DepositIntent::new(Address::ZERO, 1.0));
        assert_eq!(deposit.function_name(), "deposit");
    }
}
