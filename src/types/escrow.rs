//! Escrow contract types and interfaces.
//!
//! This module defines the fixed-price escrow contract surface: the deposit
//! record, its status and fee-config enums, and every function and event the
//! client encodes or decodes.

use alloy::sol;
use serde::{Deserialize, Serialize};

sol! {
    /// Lifecycle status of a deposit record.
    ///
    /// The contract only ever moves a record forward: PENDING on deposit,
    /// SUBMITTED once the contractor submits work, APPROVED once the client
    /// approves an amount for claiming. Claim and withdraw settle balances
    /// without introducing further statuses.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    enum Status {
        /// Deposit exists, nothing has been submitted against it.
        PENDING,
        /// The contractor has submitted work.
        SUBMITTED,
        /// The client has approved an amount for claiming.
        APPROVED
    }

    /// Policy for how protocol fees are split between client and contractor.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    enum FeeConfig {
        /// The client pays both the coverage and the claim fee.
        CLIENT_COVERS_ALL,
        /// The client pays the coverage fee, the contractor the claim fee.
        CLIENT_COVERS_ONLY,
        /// The contractor pays the claim fee, no coverage fee is charged.
        CONTRACTOR_COVERS_CLAIM,
        /// No protocol fees.
        NO_FEES
    }

    /// The party a dispute was resolved in favor of.
    ///
    /// Dispute calls are decoded from historical transactions only; the
    /// client never initiates them.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    enum DisputeWinner {
        /// The client receives the escrowed funds back.
        CLIENT,
        /// The contractor receives the escrowed funds.
        CONTRACTOR,
        /// The funds are split between both parties.
        SPLIT
    }

    /// An escrow deposit record, as stored by the contract and as passed to
    /// `deposit`.
    #[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct Deposit {
        /// Address that will perform the work and claim the funds.
        address contractor;
        /// ERC-20 token the deposit is denominated in.
        address paymentToken;
        /// Escrowed amount in the token's base units.
        uint256 amount;
        /// Amount currently approved for claiming.
        uint256 amountToClaim;
        /// Chain-time lock before funds can be returned.
        uint256 timeLock;
        /// Hash committing to the contractor's submission data.
        bytes32 contractorData;
        /// How protocol fees are split for this deposit.
        FeeConfig feeConfig;
        /// Current lifecycle status.
        Status status;
    }

    #[sol(rpc)]
    #[derive(Debug)]
    contract IEscrow {
        /// Emitted when a new deposit is created.
        event Deposited(address indexed sender, uint256 indexed contractId, address paymentToken, uint256 amount, uint256 timeLock, FeeConfig feeConfig);

        /// Emitted when the contractor submits work for a deposit.
        event Submitted(address indexed sender, uint256 indexed contractId);

        /// Emitted when the client approves an amount for claiming.
        event Approved(uint256 indexed contractId, uint256 amountApprove, address receiver);

        /// Emitted when a deposit is topped up.
        event Refilled(uint256 indexed contractId, uint256 amountAdditional);

        /// Emitted when the contractor claims approved funds.
        event Claimed(uint256 indexed contractId, address indexed paymentToken, uint256 amount);

        /// Emitted when the client withdraws returned funds.
        event Withdrawn(uint256 indexed contractId, address indexed paymentToken, uint256 amount);

        /// Emitted when contract ownership changes.
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        /// Emitted when the platform registry address changes.
        event RegistryUpdated(address registry);

        /// Creates a new deposit, locking the amount plus any client fee.
        function deposit(Deposit calldata _deposit) external;

        /// Submits work against a deposit, moving it to SUBMITTED.
        function submit(uint256 contractId, bytes calldata data, bytes32 salt) external;

        /// Approves an amount for the contractor to claim, moving the
        /// deposit to APPROVED.
        function approve(uint256 contractId, uint256 valueApprove, address receiver) external;

        /// Tops up a deposit with an additional amount.
        function refill(uint256 contractId, uint256 amount) external;

        /// Claims the approved amount, minus any contractor fee.
        function claim(uint256 contractId) external;

        /// Withdraws funds returned to the client.
        function withdraw(uint256 contractId) external;

        /// Asks the contractor to agree to return the escrowed funds.
        function requestReturn(uint256 contractId) external;

        /// Agrees to a pending return request.
        function approveReturn(uint256 contractId) external;

        /// Cancels a pending return request, restoring the given status.
        function cancelReturn(uint256 contractId, Status status) external;

        /// Escalates a deposit into a dispute.
        function createDispute(uint256 contractId) external;

        /// Resolves a dispute, splitting funds per the winner.
        function resolveDispute(uint256 contractId, DisputeWinner winner, uint256 clientAmount, uint256 contractorAmount) external;

        /// The deposit record for a contract id.
        function deposits(uint256 contractId) external view returns (Deposit memory record);

        /// The id assigned to the most recent deposit.
        function getCurrentContractId() external view returns (uint256);
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self::CLIENT_COVERS_ONLY
    }
}

impl Status {
    /// Whether the contract's state machine permits moving from `self` to
    /// `next`. Records only ever advance PENDING -> SUBMITTED -> APPROVED.
    pub fn can_become(&self, next: Status) -> bool {
        matches!(
            (self, next),
            (Self::PENDING, Status::SUBMITTED) | (Self::SUBMITTED, Status::APPROVED)
        )
    }
}

impl IEscrow::IEscrowEvents {
    /// The solidity name of the decoded event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Deposited(_) => "Deposited",
            Self::Submitted(_) => "Submitted",
            Self::Approved(_) => "Approved",
            Self::Refilled(_) => "Refilled",
            Self::Claimed(_) => "Claimed",
            Self::Withdrawn(_) => "Withdrawn",
            Self::OwnershipTransferred(_) => "OwnershipTransferred",
            Self::RegistryUpdated(_) => "RegistryUpdated",
        }
    }
}

/// A decoded escrow event paired with its stable name.
#[derive(Debug, Clone)]
pub struct DecodedEvent {
    /// The solidity event name.
    pub name: &'static str,
    /// The decoded event arguments.
    pub args: IEscrow::IEscrowEvents,
}

impl From<IEscrow::IEscrowEvents> for DecodedEvent {
    fn from(args: IEscrow::IEscrowEvents) -> Self {
        Self { name: args.name(), args }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_only_advances() {
        assert!(Status::PENDING.can_become(Status::SUBMITTED));
        assert!(Status::SUBMITTED.can_become(Status::APPROVED));
        assert!(!Status::SUBMITTED.can_become(Status::PENDING));
        assert!(!Status::APPROVED.can_become(Status::SUBMITTED));
        assert!(!Status::PENDING.can_become(Status::APPROVED));
    }
}
