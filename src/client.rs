//! Deposit lifecycle orchestration.
//!
//! [`EscrowClient`] drives the deposit -> submit -> approve -> claim sequence
//! against the escrow contract. Every write follows the same template:
//! compute the fee-adjusted total, verify balance and allowance, simulate the
//! call against current chain state, submit, and optionally wait for the
//! receipt. Only simulation failures are raised; a revert of the mined
//! transaction is reported through the returned outcome's status.

use crate::{
    codec,
    config::EscrowConfig,
    error::{EscrowError, SimulationFailed},
    fees::{self, ClaimableAmount, DepositAmount, FeeRates},
    types::{
        ApproveParams, DecodedEvent, Deposit, DepositIntent, DepositOutcome, FeeConfig, IERC20,
        IEscrow, Status, TokenDescriptor, Tokens, TransactionIntent, TransactionOutcome,
    },
};
use alloy::{
    consensus::Transaction,
    primitives::{Address, B256, Bytes, U256},
    providers::Provider,
    rpc::types::{TransactionReceipt, TransactionRequest},
    sol_types::SolCall,
};
use alloy_chains::Chain;
use tokio::try_join;
use tracing::{debug, instrument};

/// The bindings one client instance operates under.
///
/// Captured once at construction and never mutated; pointing at a different
/// account or deployment means building a new client, so no operation can
/// observe a half-swapped binding.
#[derive(Debug, Clone)]
pub struct EscrowContext {
    /// The escrow contract address.
    pub escrow: Address,
    /// The fee manager contract address.
    pub fee_manager: Address,
    /// The account submitting calls.
    pub account: Address,
    /// The chain the deployment lives on.
    pub chain: Chain,
    /// Tokens accepted by the deployment.
    pub tokens: Tokens,
}

impl EscrowContext {
    /// Builds a context from a deployment configuration and the acting
    /// account.
    pub fn from_config(config: &EscrowConfig, account: Address) -> Self {
        Self {
            escrow: config.escrow,
            fee_manager: config.fee_manager,
            account,
            chain: config.chain,
            tokens: config.tokens.clone(),
        }
    }
}

/// Client for the fixed-price escrow contract.
///
/// The provider is expected to carry a signer for the context's account;
/// wallet management is entirely the caller's concern.
#[derive(Debug, Clone)]
pub struct EscrowClient<P> {
    provider: P,
    ctx: EscrowContext,
}

impl<P: Provider + Clone> EscrowClient<P> {
    /// Creates a new client without touching the network.
    pub fn new(provider: P, ctx: EscrowContext) -> Self {
        Self { provider, ctx }
    }

    /// Creates a new client, verifying that the provider is connected to the
    /// configured chain.
    pub async fn connect(provider: P, ctx: EscrowContext) -> Result<Self, EscrowError> {
        let got = provider.get_chain_id().await?;
        if got != ctx.chain.id() {
            return Err(EscrowError::ChainIdMismatch { expected: ctx.chain.id(), got });
        }
        Ok(Self::new(provider, ctx))
    }

    /// The context this client operates under.
    pub fn context(&self) -> &EscrowContext {
        &self.ctx
    }

    /// Reads the current default fee rates from the fee manager.
    pub async fn fee_rates(&self) -> Result<FeeRates, EscrowError> {
        FeeRates::fetch(self.provider.clone(), self.ctx.fee_manager).await
    }

    /// Computes the fee-adjusted total a deposit of `amount` requires.
    pub async fn compute_deposit_amount_and_fee(
        &self,
        amount: f64,
        config: FeeConfig,
        token: &str,
    ) -> Result<DepositAmount, EscrowError> {
        let token = self.ctx.tokens.by_symbol(token)?;
        let rates = self.fee_rates().await?;
        fees::deposit_amount(amount, config, token, rates)
    }

    /// Computes what a contractor can claim out of `amount` after fees.
    pub async fn compute_claimable_amount_and_fee(
        &self,
        amount: f64,
        config: FeeConfig,
        token: &str,
    ) -> Result<ClaimableAmount, EscrowError> {
        let token = self.ctx.tokens.by_symbol(token)?;
        let rates = self.fee_rates().await?;
        fees::claimable_amount(amount, config, token, rates)
    }

    /// Creates a new escrow deposit.
    ///
    /// Verifies balance and allowance for the fee-adjusted total before
    /// submitting. The returned contract id is decoded from the `Deposited`
    /// event and is `None` when the caller did not wait for a receipt.
    #[instrument(skip_all, fields(contractor = %intent.contractor, amount = intent.amount))]
    pub async fn deposit(
        &self,
        intent: DepositIntent,
        wait_for_receipt: bool,
    ) -> Result<DepositOutcome, EscrowError> {
        let token = self.ctx.tokens.by_symbol(&intent.token)?.clone();
        let rates = self.fee_rates().await?;
        let amount = fees::deposit_amount(intent.amount, intent.fee_config, &token, rates)?;
        self.require_balance(&token, amount.total_units).await?;
        self.require_allowance(&token, amount.total_units).await?;

        let outcome = self.execute(TransactionIntent::Deposit(intent), wait_for_receipt).await?;
        let contract_id = match outcome.events.iter().find_map(|event| match &event.args {
            IEscrow::IEscrowEvents::Deposited(ev) => Some(ev.contractId),
            _ => None,
        }) {
            Some(id) => Some(id),
            None if outcome.succeeded() => {
                Some(self.escrow().getCurrentContractId().call().await?)
            }
            None => None,
        };
        Ok(DepositOutcome { contract_id, outcome })
    }

    /// Submits work against a deposit.
    ///
    /// `data` is the contractor's submission payload and `salt` the value it
    /// was committed with in the deposit's contractor data hash.
    #[instrument(skip_all, fields(%contract_id))]
    pub async fn submit(
        &self,
        contract_id: U256,
        salt: B256,
        data: Bytes,
        wait_for_receipt: bool,
    ) -> Result<TransactionOutcome, EscrowError> {
        let record = self.deposit_record(contract_id).await?;
        if !record.status.can_become(Status::SUBMITTED) {
            return Err(EscrowError::StatusMismatch {
                expected: Status::PENDING,
                got: record.status,
            });
        }
        self.execute(TransactionIntent::Submit { contract_id, data, salt }, wait_for_receipt).await
    }

    /// Approves an amount for claiming, or tops the deposit up.
    ///
    /// This is the combined entry point: a nonzero
    /// [`value_additional`](ApproveParams::value_additional) routes the call
    /// to [`refill`](Self::refill) and no approve call is submitted. With
    /// both values zero the call fails before any network traffic.
    #[instrument(skip_all, fields(contract_id = %params.contract_id))]
    pub async fn approve(
        &self,
        params: ApproveParams,
        wait_for_receipt: bool,
    ) -> Result<TransactionOutcome, EscrowError> {
        match approve_route(&params)? {
            ApproveRoute::Refill => {
                debug!("routing approve with additional value into refill");
                self.refill(params.contract_id, params.value_additional, wait_for_receipt).await
            }
            ApproveRoute::Approve => {
                let record = self.deposit_record(params.contract_id).await?;
                if !record.status.can_become(Status::APPROVED) {
                    return Err(EscrowError::StatusMismatch {
                        expected: Status::SUBMITTED,
                        got: record.status,
                    });
                }
                let token = self.ctx.tokens.by_address(record.paymentToken)?;
                let input = IEscrow::approveCall {
                    contractId: params.contract_id,
                    valueApprove: fees::to_units(params.value_approve, token.decimals)?,
                    receiver: params.recipient,
                }
                .abi_encode();
                let intent = TransactionIntent::Approve {
                    contract_id: params.contract_id,
                    value_approve: params.value_approve,
                    recipient: params.recipient,
                };
                self.execute_raw(input.into(), intent, wait_for_receipt).await
            }
        }
    }

    /// Tops up a deposit with an additional amount.
    ///
    /// The fee config is re-read from the on-chain record so a stale caller
    /// view can never skew the charged fee.
    #[instrument(skip_all, fields(%contract_id, value))]
    pub async fn refill(
        &self,
        contract_id: U256,
        value: f64,
        wait_for_receipt: bool,
    ) -> Result<TransactionOutcome, EscrowError> {
        if value <= 0.0 {
            return Err(EscrowError::NotSet("a nonzero refill value"));
        }
        let record = self.deposit_record(contract_id).await?;
        let token = self.ctx.tokens.by_address(record.paymentToken)?.clone();
        let rates = self.fee_rates().await?;
        let amount = fees::deposit_amount(value, record.feeConfig, &token, rates)?;
        self.require_balance(&token, amount.total_units).await?;
        self.require_allowance(&token, amount.total_units).await?;

        let input = IEscrow::refillCall {
            contractId: contract_id,
            amount: fees::to_units(value, token.decimals)?,
        }
        .abi_encode();
        self.execute_raw(
            input.into(),
            TransactionIntent::Refill { contract_id, value },
            wait_for_receipt,
        )
        .await
    }

    /// Claims the approved amount for the contractor.
    #[instrument(skip_all, fields(%contract_id))]
    pub async fn claim(
        &self,
        contract_id: U256,
        wait_for_receipt: bool,
    ) -> Result<TransactionOutcome, EscrowError> {
        let record = self.deposit_record(contract_id).await?;
        if record.status != Status::APPROVED {
            return Err(EscrowError::StatusMismatch {
                expected: Status::APPROVED,
                got: record.status,
            });
        }
        if record.amountToClaim.is_zero() {
            return Err(EscrowError::NotSet("an approved amount to claim"));
        }
        self.execute(TransactionIntent::Claim { contract_id }, wait_for_receipt).await
    }

    /// Withdraws funds returned to the client.
    #[instrument(skip_all, fields(%contract_id))]
    pub async fn withdraw(
        &self,
        contract_id: U256,
        wait_for_receipt: bool,
    ) -> Result<TransactionOutcome, EscrowError> {
        self.execute(TransactionIntent::Withdraw { contract_id }, wait_for_receipt).await
    }

    /// Reads a deposit record from contract storage.
    pub async fn deposit_record(&self, contract_id: U256) -> Result<Deposit, EscrowError> {
        Ok(self.escrow().deposits(contract_id).call().await?)
    }

    /// Decodes escrow calldata into a typed intent.
    pub fn decode_transaction(&self, input: &[u8]) -> Result<TransactionIntent, EscrowError> {
        codec::decode_transaction(input, &self.ctx.tokens)
    }

    /// Decodes the escrow events out of a receipt.
    pub fn decode_receipt_events(&self, receipt: &TransactionReceipt) -> Vec<DecodedEvent> {
        codec::decode_receipt_events(receipt)
    }

    /// Fetches a historical transaction and decodes its calldata.
    pub async fn transaction_intent(&self, hash: B256) -> Result<TransactionIntent, EscrowError> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await?
            .ok_or(EscrowError::TransactionNotFound(hash))?;
        codec::decode_transaction(tx.input(), &self.ctx.tokens)
    }

    /// Reconstructs a full outcome for an observed transaction hash.
    ///
    /// A missing receipt means "not yet mined" and yields a pending outcome;
    /// lookup transport failures are raised instead of being folded into the
    /// pending status.
    pub async fn transaction_outcome(&self, hash: B256) -> Result<TransactionOutcome, EscrowError> {
        let (tx, receipt) = try_join!(
            async { self.provider.get_transaction_by_hash(hash).await },
            async { self.provider.get_transaction_receipt(hash).await }
        )?;
        let tx = tx.ok_or(EscrowError::TransactionNotFound(hash))?;
        let intent = codec::decode_transaction(tx.input(), &self.ctx.tokens)?;
        Ok(match receipt {
            Some(receipt) => TransactionOutcome {
                transaction_hash: hash,
                intent,
                status: receipt.status().into(),
                events: codec::decode_receipt_events(&receipt),
                receipt: Some(receipt),
            },
            None => TransactionOutcome::pending(hash, intent),
        })
    }

    fn escrow(&self) -> IEscrow::IEscrowInstance<P> {
        IEscrow::new(self.ctx.escrow, self.provider.clone())
    }

    /// Encodes `intent` and runs the simulate-submit-wait template.
    async fn execute(
        &self,
        intent: TransactionIntent,
        wait_for_receipt: bool,
    ) -> Result<TransactionOutcome, EscrowError> {
        let input = codec::encode_transaction(&intent, &self.ctx.tokens)?;
        self.execute_raw(input, intent, wait_for_receipt).await
    }

    /// Simulates the call, submits it, and optionally waits for the receipt.
    ///
    /// An `eth_call` against current state catches would-be reverts before
    /// any gas is spent; those are raised as [`SimulationFailed`]. A revert
    /// of the mined transaction is reported through the outcome status.
    async fn execute_raw(
        &self,
        input: Bytes,
        intent: TransactionIntent,
        wait_for_receipt: bool,
    ) -> Result<TransactionOutcome, EscrowError> {
        let request = TransactionRequest::default()
            .from(self.ctx.account)
            .to(self.ctx.escrow)
            .input(input.into());

        if let Err(err) = self.provider.call(request.clone()).await {
            return Err(SimulationFailed::new(err).into());
        }

        let pending = self.provider.send_transaction(request).await?;
        let transaction_hash = *pending.tx_hash();
        debug!(function = intent.function_name(), %transaction_hash, "submitted escrow call");

        if !wait_for_receipt {
            return Ok(TransactionOutcome::pending(transaction_hash, intent));
        }

        let receipt = pending.get_receipt().await?;
        let events = codec::decode_receipt_events(&receipt);
        Ok(TransactionOutcome {
            transaction_hash,
            intent,
            status: receipt.status().into(),
            events,
            receipt: Some(receipt),
        })
    }

    async fn require_balance(
        &self,
        token: &TokenDescriptor,
        required: U256,
    ) -> Result<(), EscrowError> {
        let balance = IERC20::new(token.address, self.provider.clone())
            .balanceOf(self.ctx.account)
            .call()
            .await?;
        if balance < required {
            return Err(EscrowError::InsufficientBalance {
                token: token.symbol.clone(),
                required,
                available: balance,
            });
        }
        Ok(())
    }

    /// Ensures the escrow may pull `required` from the account.
    ///
    /// Submits exactly one approval transaction when the current allowance is
    /// short and blocks until its receipt; the main action only proceeds once
    /// that approval succeeded.
    async fn require_allowance(
        &self,
        token: &TokenDescriptor,
        required: U256,
    ) -> Result<(), EscrowError> {
        let erc20 = IERC20::new(token.address, self.provider.clone());
        let allowance = erc20.allowance(self.ctx.account, self.ctx.escrow).call().await?;
        if allowance >= required {
            return Ok(());
        }
        debug!(token = %token.symbol, %required, %allowance, "approving escrow spending");
        let pending =
            erc20.approve(self.ctx.escrow, required).from(self.ctx.account).send().await?;
        let receipt = pending.get_receipt().await?;
        if !receipt.status() {
            return Err(EscrowError::TransactionFailed(receipt.transaction_hash));
        }
        Ok(())
    }
}

/// Which path the combined approve entry point takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApproveRoute {
    /// Submit an approve call.
    Approve,
    /// Redirect into the refill path.
    Refill,
}

/// Routing rule for [`EscrowClient::approve`]: any additional value wins over
/// the approve value, and both being zero is rejected before any I/O.
fn approve_route(params: &ApproveParams) -> Result<ApproveRoute, EscrowError> {
    if params.value_additional > 0.0 {
        Ok(ApproveRoute::Refill)
    } else if params.value_approve > 0.0 {
        Ok(ApproveRoute::Approve)
    } else {
        Err(EscrowError::NotSet("a nonzero approve or additional value"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn recipient() -> Address {
        address!("0x9965507D1a55bcC2695C58ba16FB37d819B0A4dc")
    }

    #[test]
    fn additional_value_routes_to_refill() {
        let params = ApproveParams::new(U256::from(1), 0.0, recipient()).with_additional(25.0);
        assert_eq!(approve_route(&params).unwrap(), ApproveRoute::Refill);

        // Additional wins even when an approve value is present.
        let params = ApproveParams::new(U256::from(1), 10.0, recipient()).with_additional(25.0);
        assert_eq!(approve_route(&params).unwrap(), ApproveRoute::Refill);
    }

    #[test]
    fn approve_value_routes_to_approve() {
        let params = ApproveParams::new(U256::from(1), 10.0, recipient());
        assert_eq!(approve_route(&params).unwrap(), ApproveRoute::Approve);
    }

    #[test]
    fn both_values_zero_is_rejected() {
        let params = ApproveParams::new(U256::from(1), 0.0, recipient());
        let err = approve_route(&params).unwrap_err();
        assert_eq!(err.kind(), "not_set");
    }

    #[test]
    fn context_is_captured_from_config() {
        let config = EscrowConfig::for_environment(crate::config::Environment::Localhost);
        let account = recipient();
        let ctx = EscrowContext::from_config(&config, account);
        assert_eq!(ctx.escrow, config.escrow);
        assert_eq!(ctx.account, account);
        assert_eq!(ctx.chain.id(), config.chain.id());
    }
}
