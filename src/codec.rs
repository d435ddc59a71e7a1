//! Bidirectional mapping between typed intents and ABI-shaped contract calls.
//!
//! Encoding turns a [`TransactionIntent`] into calldata for the escrow
//! contract; decoding turns arbitrary historical calldata and receipt logs
//! back into the same typed shapes. Decoding dispatches on the function
//! selector over the exhaustive set of known escrow functions and fails hard
//! on anything else.

use crate::{
    error::{DecodeError, EscrowError},
    fees,
    types::{
        DecodedEvent, Deposit, DepositIntent, IEscrow,
        IEscrow::{IEscrowCalls, IEscrowEvents},
        Status, Tokens, TransactionIntent,
    },
};
use alloy::{
    primitives::{Bytes, Log, U256},
    rpc::types::TransactionReceipt,
    sol_types::{SolCall, SolEventInterface, SolInterface},
};

/// Encodes a typed intent into escrow contract calldata.
///
/// Deposit amounts are scaled with the decimals of the intent's token;
/// amounts of functions whose calldata carries no token address are scaled
/// with the canonical token's decimals.
pub fn encode_transaction(
    intent: &TransactionIntent,
    tokens: &Tokens,
) -> Result<Bytes, EscrowError> {
    let data = match intent {
        TransactionIntent::Deposit(intent) => {
            IEscrow::depositCall { _deposit: deposit_request(intent, tokens)? }.abi_encode()
        }
        TransactionIntent::Withdraw { contract_id } => {
            IEscrow::withdrawCall { contractId: *contract_id }.abi_encode()
        }
        TransactionIntent::Claim { contract_id } => {
            IEscrow::claimCall { contractId: *contract_id }.abi_encode()
        }
        TransactionIntent::Submit { contract_id, data, salt } => IEscrow::submitCall {
            contractId: *contract_id,
            data: data.clone(),
            salt: *salt,
        }
        .abi_encode(),
        TransactionIntent::Approve { contract_id, value_approve, recipient } => {
            IEscrow::approveCall {
                contractId: *contract_id,
                valueApprove: canonical_units(*value_approve, tokens)?,
                receiver: *recipient,
            }
            .abi_encode()
        }
        TransactionIntent::Refill { contract_id, value } => IEscrow::refillCall {
            contractId: *contract_id,
            amount: canonical_units(*value, tokens)?,
        }
        .abi_encode(),
        TransactionIntent::RequestReturn { contract_id } => {
            IEscrow::requestReturnCall { contractId: *contract_id }.abi_encode()
        }
        TransactionIntent::ApproveReturn { contract_id } => {
            IEscrow::approveReturnCall { contractId: *contract_id }.abi_encode()
        }
        TransactionIntent::CancelReturn { contract_id, status } => IEscrow::cancelReturnCall {
            contractId: *contract_id,
            status: *status,
        }
        .abi_encode(),
        TransactionIntent::CreateDispute { contract_id } => {
            IEscrow::createDisputeCall { contractId: *contract_id }.abi_encode()
        }
        TransactionIntent::ResolveDispute {
            contract_id,
            winner,
            client_amount,
            contractor_amount,
        } => IEscrow::resolveDisputeCall {
            contractId: *contract_id,
            winner: *winner,
            clientAmount: canonical_units(*client_amount, tokens)?,
            contractorAmount: canonical_units(*contractor_amount, tokens)?,
        }
        .abi_encode(),
    };
    Ok(data.into())
}

/// Assembles the on-chain deposit record for a deposit intent.
///
/// The token address is resolved from the intent's symbol, amounts are
/// converted to base units and the record starts out PENDING with nothing
/// approved for claiming.
pub fn deposit_request(intent: &DepositIntent, tokens: &Tokens) -> Result<Deposit, EscrowError> {
    let token = tokens.by_symbol(&intent.token)?;
    Ok(Deposit {
        contractor: intent.contractor,
        paymentToken: token.address,
        amount: fees::to_units(intent.amount, token.decimals)?,
        amountToClaim: U256::ZERO,
        timeLock: intent.time_lock,
        contractorData: intent.recipient_data,
        feeConfig: intent.fee_config,
        status: Status::PENDING,
    })
}

/// Decodes raw calldata into a typed intent.
///
/// The selector is matched against the full set of escrow functions; an
/// unknown selector is a hard [`DecodeError::UnknownSelector`] failure.
/// Deposit amounts are converted back to human units with the decimals of
/// the token address present in the calldata, looked up in the configured
/// token table.
pub fn decode_transaction(input: &[u8], tokens: &Tokens) -> Result<TransactionIntent, EscrowError> {
    let selector: [u8; 4] =
        input.get(..4).and_then(|sel| sel.try_into().ok()).ok_or(DecodeError::TooShort)?;
    if !IEscrowCalls::valid_selector(selector) {
        return Err(DecodeError::UnknownSelector(selector.into()).into());
    }
    let call = IEscrowCalls::abi_decode(input).map_err(DecodeError::Abi)?;

    let intent = match call {
        IEscrowCalls::deposit(call) => {
            let record = call._deposit;
            let token = tokens.by_address(record.paymentToken)?;
            TransactionIntent::Deposit(DepositIntent {
                contractor: record.contractor,
                token: token.symbol.clone(),
                amount: fees::to_human(record.amount, token.decimals)?,
                time_lock: record.timeLock,
                fee_config: record.feeConfig,
                recipient_data: record.contractorData,
            })
        }
        IEscrowCalls::withdraw(call) => TransactionIntent::Withdraw { contract_id: call.contractId },
        IEscrowCalls::claim(call) => TransactionIntent::Claim { contract_id: call.contractId },
        IEscrowCalls::submit(call) => TransactionIntent::Submit {
            contract_id: call.contractId,
            data: call.data,
            salt: call.salt,
        },
        IEscrowCalls::approve(call) => TransactionIntent::Approve {
            contract_id: call.contractId,
            value_approve: canonical_human(call.valueApprove, tokens)?,
            recipient: call.receiver,
        },
        IEscrowCalls::refill(call) => TransactionIntent::Refill {
            contract_id: call.contractId,
            value: canonical_human(call.amount, tokens)?,
        },
        IEscrowCalls::requestReturn(call) => {
            TransactionIntent::RequestReturn { contract_id: call.contractId }
        }
        IEscrowCalls::approveReturn(call) => {
            TransactionIntent::ApproveReturn { contract_id: call.contractId }
        }
        IEscrowCalls::cancelReturn(call) => TransactionIntent::CancelReturn {
            contract_id: call.contractId,
            status: call.status,
        },
        IEscrowCalls::createDispute(call) => {
            TransactionIntent::CreateDispute { contract_id: call.contractId }
        }
        IEscrowCalls::resolveDispute(call) => TransactionIntent::ResolveDispute {
            contract_id: call.contractId,
            winner: call.winner,
            client_amount: canonical_human(call.clientAmount, tokens)?,
            contractor_amount: canonical_human(call.contractorAmount, tokens)?,
        },
        IEscrowCalls::deposits(_) | IEscrowCalls::getCurrentContractId(_) => {
            return Err(DecodeError::UnknownSelector(selector.into()).into());
        }
    };
    Ok(intent)
}

/// Decodes the escrow events out of a receipt's logs.
pub fn decode_receipt_events(receipt: &TransactionReceipt) -> Vec<DecodedEvent> {
    decode_logs(receipt.inner.logs().iter().map(|log| &log.inner))
}

/// Decodes every log that matches a known escrow event signature.
///
/// Logs emitted for other listeners are silently dropped; the contract is
/// not the only thing writing to a receipt.
pub fn decode_logs<'a>(logs: impl IntoIterator<Item = &'a Log>) -> Vec<DecodedEvent> {
    logs.into_iter()
        .filter_map(|log| IEscrowEvents::decode_log(log).ok())
        .map(|log| DecodedEvent::from(log.data))
        .collect()
}

fn canonical_units(amount: f64, tokens: &Tokens) -> Result<U256, EscrowError> {
    fees::to_units(amount, tokens.canonical()?.decimals)
}

fn canonical_human(units: U256, tokens: &Tokens) -> Result<f64, EscrowError> {
    fees::to_human(units, tokens.canonical()?.decimals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FeeConfig, IERC20, TokenDescriptor};
    use alloy::{
        primitives::{Address, B256, address, b256, bytes},
        sol_types::SolEvent,
    };

    fn tokens() -> Tokens {
        Tokens::new(vec![
            TokenDescriptor::new("USDT", address!("0xc2132D05D31c914a87C6611C10748AEb04B58e8F"), 6),
            TokenDescriptor::new("DAI", address!("0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063"), 18),
        ])
    }

    #[test]
    fn deposit_round_trips() {
        let intent = DepositIntent::new(
            address!("0x9965507D1a55bcC2695C58ba16FB37d819B0A4dc"),
            100.0,
        )
        .with_token("DAI")
        .with_time_lock(U256::from(3600))
        .with_fee_config(FeeConfig::CLIENT_COVERS_ALL)
        .with_recipient_data(b256!(
            "0x1111111111111111111111111111111111111111111111111111111111111111"
        ));

        let data = encode_transaction(&TransactionIntent::Deposit(intent.clone()), &tokens())
            .unwrap();
        let decoded = decode_transaction(&data, &tokens()).unwrap();
        assert_eq!(decoded, TransactionIntent::Deposit(intent));
    }

    #[test]
    fn deposit_encodes_pending_status() {
        let request =
            deposit_request(&DepositIntent::new(Address::ZERO, 25.5), &tokens()).unwrap();
        assert_eq!(request.status, Status::PENDING);
        assert_eq!(request.amountToClaim, U256::ZERO);
        assert_eq!(request.amount, U256::from(25_500_000u64));
    }

    #[test]
    fn approve_and_refill_round_trip() {
        for intent in [
            TransactionIntent::Approve {
                contract_id: U256::from(7),
                value_approve: 50.0,
                recipient: address!("0x9965507D1a55bcC2695C58ba16FB37d819B0A4dc"),
            },
            TransactionIntent::Refill { contract_id: U256::from(7), value: 12.5 },
            TransactionIntent::Submit {
                contract_id: U256::from(7),
                data: bytes!("0xdeadbeef"),
                salt: B256::repeat_byte(3),
            },
            TransactionIntent::Claim { contract_id: U256::from(7) },
            TransactionIntent::Withdraw { contract_id: U256::from(9) },
        ] {
            let data = encode_transaction(&intent, &tokens()).unwrap();
            assert_eq!(decode_transaction(&data, &tokens()).unwrap(), intent);
        }
    }

    #[test]
    fn unknown_selector_is_a_hard_failure() {
        let err = decode_transaction(&bytes!("0xdeadbeef"), &tokens()).unwrap_err();
        assert_eq!(err.kind(), "decode");
        assert!(matches!(
            err,
            EscrowError::Decode(DecodeError::UnknownSelector(_))
        ));
    }

    #[test]
    fn short_calldata_is_a_hard_failure() {
        let err = decode_transaction(&[0xde, 0xad], &tokens()).unwrap_err();
        assert!(matches!(err, EscrowError::Decode(DecodeError::TooShort)));
    }

    #[test]
    fn deposit_with_unknown_token_fails() {
        let foreign = Tokens::new(vec![TokenDescriptor::new(
            "USDT",
            address!("0x1111111111111111111111111111111111111111"),
            6,
        )]);
        let intent = TransactionIntent::Deposit(DepositIntent::new(Address::ZERO, 1.0));
        let data = encode_transaction(&intent, &foreign).unwrap();
        let err = decode_transaction(&data, &tokens()).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }

    #[test]
    fn escrow_logs_decode_and_foreign_logs_drop() {
        let escrow = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");
        let deposited = IEscrow::Deposited {
            sender: address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            contractId: U256::from(1),
            paymentToken: address!("0xc2132D05D31c914a87C6611C10748AEb04B58e8F"),
            amount: U256::from(103_000_000u64),
            timeLock: U256::ZERO,
            feeConfig: FeeConfig::CLIENT_COVERS_ONLY,
        };
        let transfer = IERC20::Transfer {
            from: address!("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
            to: escrow,
            amount: U256::from(103_000_000u64),
        };

        let logs = [
            Log { address: escrow, data: deposited.encode_log_data() },
            Log {
                address: address!("0xc2132D05D31c914a87C6611C10748AEb04B58e8F"),
                data: transfer.encode_log_data(),
            },
        ];
        let events = decode_logs(logs.iter());
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "Deposited");
        match &events[0].args {
            IEscrowEvents::Deposited(ev) => assert_eq!(ev.contractId, U256::from(1)),
            other => panic!("unexpected event {other:?}"),
        }
    }
}
