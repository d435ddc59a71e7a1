//! Escrow deployment configuration.
//!
//! Chain selection is injected: callers either pick a built-in environment or
//! deserialize an [`EscrowConfig`] from their own source.

use crate::{
    error::ConfigError,
    types::{TokenDescriptor, Tokens},
};
use alloy::primitives::{Address, address};
use alloy_chains::{Chain, NamedChain};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A known escrow deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// A local anvil node with the mock deployment.
    Localhost,
    /// The Polygon Amoy testnet deployment.
    Amoy,
    /// The Polygon mainnet deployment.
    Polygon,
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "localhost" => Ok(Self::Localhost),
            "amoy" => Ok(Self::Amoy),
            "polygon" => Ok(Self::Polygon),
            other => Err(ConfigError::UnsupportedEnvironment(other.to_string())),
        }
    }
}

/// Addresses and tokens for one escrow deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// The chain this deployment lives on.
    pub chain: Chain,
    /// The escrow contract.
    pub escrow: Address,
    /// The fee manager contract.
    pub fee_manager: Address,
    /// Tokens accepted by the deployment.
    pub tokens: Tokens,
}

impl EscrowConfig {
    /// The built-in configuration for a known environment.
    pub fn for_environment(environment: Environment) -> Self {
        match environment {
            Environment::Localhost => Self {
                chain: Chain::from_named(NamedChain::AnvilHardhat),
                escrow: address!("0x5FbDB2315678afecb367f032d93F642f64180aa3"),
                fee_manager: address!("0xe7f1725E7734CE288F8367e1Bb143E90bb3F0512"),
                tokens: Tokens::new(vec![TokenDescriptor::new(
                    "USDT",
                    address!("0x9fE46736679d2D9a65F0992F2272dE9f3c7fa6e0"),
                    6,
                )]),
            },
            Environment::Amoy => Self {
                chain: Chain::from_named(NamedChain::PolygonAmoy),
                escrow: address!("0x3C68a5A2a39BafBCEd4a741AC56C8b344C828b34"),
                fee_manager: address!("0xA4857B1178425cfaaaeedBcFc220F242b4A518fA"),
                tokens: Tokens::new(vec![
                    TokenDescriptor::new(
                        "USDT",
                        address!("0x1616d425Cd540B256475cBfb604586C8598eC0FB"),
                        6,
                    ),
                    TokenDescriptor::new(
                        "USDC",
                        address!("0x41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582"),
                        6,
                    ),
                ]),
            },
            Environment::Polygon => Self {
                chain: Chain::from_named(NamedChain::Polygon),
                escrow: address!("0x5EcA7E61c0B09aC5451a3EE77ff64637E4fCB83A"),
                fee_manager: address!("0xD2171dAC1d8eCc6B6F9Fc04d9FF9a7bCB50DE11B"),
                tokens: Tokens::new(vec![
                    TokenDescriptor::new(
                        "USDT",
                        address!("0xc2132D05D31c914a87C6611C10748AEb04B58e8F"),
                        6,
                    ),
                    TokenDescriptor::new(
                        "USDC",
                        address!("0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359"),
                        6,
                    ),
                    TokenDescriptor::new(
                        "DAI",
                        address!("0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063"),
                        18,
                    ),
                ]),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environments_parse() {
        assert_eq!("polygon".parse::<Environment>().unwrap(), Environment::Polygon);
        assert_eq!("amoy".parse::<Environment>().unwrap(), Environment::Amoy);
        let err = "goerli".parse::<Environment>().unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedEnvironment("goerli".to_string()));
    }

    #[test]
    fn built_in_configs_resolve_their_canonical_token() {
        for environment in [Environment::Localhost, Environment::Amoy, Environment::Polygon] {
            let config = EscrowConfig::for_environment(environment);
            assert_eq!(config.tokens.canonical().unwrap().symbol, "USDT");
        }
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = EscrowConfig::for_environment(Environment::Polygon);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: EscrowConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
