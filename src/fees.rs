//! Fee-adjusted amount calculation.
//!
//! Rates live on chain in the fee manager contract and are fetched per call;
//! the arithmetic here mirrors the contract's own integer math so computed
//! totals never diverge from what a submission would be charged. All scaling
//! happens in `U256` base units with truncating division; human amounts only
//! exist at the edges.

use crate::{
    constants::BPS_DENOMINATOR,
    error::EscrowError,
    types::{FeeConfig, IFeeManager, TokenDescriptor},
};
use alloy::{
    primitives::{
        Address, U256,
        utils::{format_units, parse_units},
    },
    providers::Provider,
};

/// Protocol fee rates in basis points, as read from the fee manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeRates {
    /// Rate charged to the client on top of a deposit.
    pub coverage_bps: u16,
    /// Rate charged on the claimed amount.
    pub claim_bps: u16,
}

impl FeeRates {
    /// Reads the current default rates from the fee manager contract.
    pub async fn fetch<P: Provider>(provider: P, fee_manager: Address) -> Result<Self, EscrowError> {
        let rates = IFeeManager::new(fee_manager, provider).defaultFees().call().await?;
        Ok(Self { coverage_bps: rates.coverage, claim_bps: rates.claim })
    }
}

/// The fee-adjusted total a client must deposit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositAmount {
    /// Amount plus the client's fee share, in human units.
    pub total_deposit_amount: f64,
    /// The client's fee share, in human units.
    pub fee_applied: f64,
    /// `total_deposit_amount` in the token's base units.
    pub total_units: U256,
    /// `fee_applied` in the token's base units.
    pub fee_units: U256,
}

/// The amount a contractor can claim after fees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClaimableAmount {
    /// Amount minus the contractor's fee share, in human units.
    pub claimable_amount: f64,
    /// The contractor's fee share, in human units.
    pub fee_deducted: f64,
    /// The client's fee share charged at claim time, in human units.
    pub client_fee: f64,
    /// `claimable_amount` in the token's base units.
    pub claimable_units: U256,
}

/// Computes the deposit total and fee for `amount` under `config`.
pub fn deposit_amount(
    amount: f64,
    config: FeeConfig,
    token: &TokenDescriptor,
    rates: FeeRates,
) -> Result<DepositAmount, EscrowError> {
    let units = to_units(amount, token.decimals)?;
    let fee_units = match config {
        FeeConfig::CLIENT_COVERS_ALL => {
            bps(units, rates.coverage_bps as u64 + rates.claim_bps as u64)
        }
        FeeConfig::CLIENT_COVERS_ONLY => bps(units, rates.coverage_bps as u64),
        FeeConfig::CONTRACTOR_COVERS_CLAIM | FeeConfig::NO_FEES => U256::ZERO,
        FeeConfig::__Invalid => return Err(EscrowError::NotSet("a valid fee config")),
    };
    let total_units = units + fee_units;
    Ok(DepositAmount {
        total_deposit_amount: to_human(total_units, token.decimals)?,
        fee_applied: to_human(fee_units, token.decimals)?,
        total_units,
        fee_units,
    })
}

/// Computes the claimable amount and both fee shares for `amount` under
/// `config`.
pub fn claimable_amount(
    amount: f64,
    config: FeeConfig,
    token: &TokenDescriptor,
    rates: FeeRates,
) -> Result<ClaimableAmount, EscrowError> {
    let units = to_units(amount, token.decimals)?;
    let (deducted_units, client_fee_units) = match config {
        FeeConfig::CLIENT_COVERS_ALL => {
            (U256::ZERO, bps(units, rates.coverage_bps as u64 + rates.claim_bps as u64))
        }
        FeeConfig::CLIENT_COVERS_ONLY => {
            (bps(units, rates.claim_bps as u64), bps(units, rates.coverage_bps as u64))
        }
        FeeConfig::CONTRACTOR_COVERS_CLAIM => (bps(units, rates.claim_bps as u64), U256::ZERO),
        FeeConfig::NO_FEES => (U256::ZERO, U256::ZERO),
        FeeConfig::__Invalid => return Err(EscrowError::NotSet("a valid fee config")),
    };
    let claimable_units = units - deducted_units;
    Ok(ClaimableAmount {
        claimable_amount: to_human(claimable_units, token.decimals)?,
        fee_deducted: to_human(deducted_units, token.decimals)?,
        client_fee: to_human(client_fee_units, token.decimals)?,
        claimable_units,
    })
}

/// Scales `units` by a basis-point rate with the same truncating division the
/// contract performs.
fn bps(units: U256, rate_bps: u64) -> U256 {
    units * U256::from(rate_bps) / U256::from(BPS_DENOMINATOR)
}

/// Converts a human amount into the token's base units.
pub(crate) fn to_units(amount: f64, decimals: u8) -> Result<U256, EscrowError> {
    if !amount.is_finite() || amount.is_sign_negative() {
        return Err(EscrowError::NotSet("a non-negative amount"));
    }
    Ok(parse_units(&amount.to_string(), decimals)?.get_absolute())
}

/// Converts base units back into a human amount.
pub(crate) fn to_human(units: U256, decimals: u8) -> Result<f64, EscrowError> {
    format_units(units, decimals)?
        .parse()
        .map_err(|err: std::num::ParseFloatError| EscrowError::UnitConversion(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const RATES: FeeRates = FeeRates { coverage_bps: 300, claim_bps: 500 };

    fn usdt() -> TokenDescriptor {
        TokenDescriptor::new("USDT", address!("0xc2132D05D31c914a87C6611C10748AEb04B58e8F"), 6)
    }

    #[test]
    fn deposit_client_covers_only() {
        let amount = deposit_amount(100.0, FeeConfig::CLIENT_COVERS_ONLY, &usdt(), RATES).unwrap();
        assert_eq!(amount.total_deposit_amount, 103.0);
        assert_eq!(amount.fee_applied, 3.0);
        assert_eq!(amount.total_units, U256::from(103_000_000u64));
    }

    #[test]
    fn deposit_client_covers_all() {
        let amount = deposit_amount(100.0, FeeConfig::CLIENT_COVERS_ALL, &usdt(), RATES).unwrap();
        assert_eq!(amount.total_deposit_amount, 108.0);
        assert_eq!(amount.fee_applied, 8.0);
    }

    #[test]
    fn deposit_without_client_fee() {
        for config in [FeeConfig::CONTRACTOR_COVERS_CLAIM, FeeConfig::NO_FEES] {
            let amount = deposit_amount(100.0, config, &usdt(), RATES).unwrap();
            assert_eq!(amount.total_deposit_amount, 100.0);
            assert_eq!(amount.fee_applied, 0.0);
        }
    }

    #[test]
    fn deposit_total_never_below_amount() {
        for config in [
            FeeConfig::CLIENT_COVERS_ALL,
            FeeConfig::CLIENT_COVERS_ONLY,
            FeeConfig::CONTRACTOR_COVERS_CLAIM,
            FeeConfig::NO_FEES,
        ] {
            let amount = deposit_amount(17.35, config, &usdt(), RATES).unwrap();
            assert!(amount.fee_applied >= 0.0);
            assert!(amount.total_deposit_amount >= 17.35);
        }
    }

    #[test]
    fn claimable_per_config() {
        let claim = claimable_amount(100.0, FeeConfig::CLIENT_COVERS_ONLY, &usdt(), RATES).unwrap();
        assert_eq!(claim.claimable_amount, 95.0);
        assert_eq!(claim.fee_deducted, 5.0);
        assert_eq!(claim.client_fee, 3.0);

        let claim =
            claimable_amount(100.0, FeeConfig::CONTRACTOR_COVERS_CLAIM, &usdt(), RATES).unwrap();
        assert_eq!(claim.claimable_amount, 95.0);
        assert_eq!(claim.fee_deducted, 5.0);
        assert_eq!(claim.client_fee, 0.0);

        let claim = claimable_amount(100.0, FeeConfig::CLIENT_COVERS_ALL, &usdt(), RATES).unwrap();
        assert_eq!(claim.claimable_amount, 100.0);
        assert_eq!(claim.fee_deducted, 0.0);
        assert_eq!(claim.client_fee, 8.0);

        let claim = claimable_amount(100.0, FeeConfig::NO_FEES, &usdt(), RATES).unwrap();
        assert_eq!(claim.claimable_amount, 100.0);
        assert_eq!(claim.fee_deducted, 0.0);
        assert_eq!(claim.client_fee, 0.0);
    }

    #[test]
    fn fee_truncates_like_the_chain() {
        // 0.000033 USDT at 3% is 0.99 base units; integer division drops it.
        let amount = deposit_amount(0.000033, FeeConfig::CLIENT_COVERS_ONLY, &usdt(), RATES).unwrap();
        assert_eq!(amount.fee_units, U256::ZERO);
        assert_eq!(amount.total_units, U256::from(33u64));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let err = deposit_amount(-1.0, FeeConfig::NO_FEES, &usdt(), RATES).unwrap_err();
        assert_eq!(err.kind(), "not_set");
    }
}
