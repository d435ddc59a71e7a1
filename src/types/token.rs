use crate::{constants::CANONICAL_TOKEN_SYMBOL, error::{ConfigError, EscrowError}};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// A payment token with its symbol, address and decimals.
///
/// Static configuration, immutable once loaded; used to convert between human
/// amounts and fixed-point on-chain integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Token symbol, e.g. `USDT`.
    pub symbol: String,
    /// Token contract address.
    pub address: Address,
    /// Token decimals.
    pub decimals: u8,
}

impl TokenDescriptor {
    /// Create a new instance of [`Self`].
    pub fn new(symbol: impl Into<String>, address: Address, decimals: u8) -> Self {
        Self { symbol: symbol.into(), address, decimals }
    }
}

/// The tokens accepted by an escrow deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    tokens: Vec<TokenDescriptor>,
    /// Symbol used when a request or decoded calldata names no token.
    #[serde(default = "default_canonical")]
    canonical: String,
}

fn default_canonical() -> String {
    CANONICAL_TOKEN_SYMBOL.to_string()
}

impl Tokens {
    /// Create a new table with the default canonical token symbol.
    pub fn new(tokens: Vec<TokenDescriptor>) -> Self {
        Self { tokens, canonical: default_canonical() }
    }

    /// Override the canonical token symbol.
    pub fn with_canonical(mut self, symbol: impl Into<String>) -> Self {
        self.canonical = symbol.into();
        self
    }

    /// Get a token by its symbol.
    pub fn by_symbol(&self, symbol: &str) -> Result<&TokenDescriptor, EscrowError> {
        self.tokens
            .iter()
            .find(|token| token.symbol == symbol)
            .ok_or_else(|| ConfigError::UnsupportedToken(symbol.to_string()).into())
    }

    /// Get a token by its contract address.
    pub fn by_address(&self, address: Address) -> Result<&TokenDescriptor, EscrowError> {
        self.tokens
            .iter()
            .find(|token| token.address == address)
            .ok_or(EscrowError::UnknownToken(address))
    }

    /// The canonical token.
    pub fn canonical(&self) -> Result<&TokenDescriptor, EscrowError> {
        self.by_symbol(&self.canonical)
    }

    /// Iterate over all configured tokens.
    pub fn iter(&self) -> impl Iterator<Item = &TokenDescriptor> {
        self.tokens.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn table() -> Tokens {
        Tokens::new(vec![
            TokenDescriptor::new(
                "USDT",
                address!("0xc2132D05D31c914a87C6611C10748AEb04B58e8F"),
                6,
            ),
            TokenDescriptor::new(
                "DAI",
                address!("0x8f3Cf7ad23Cd3CaDbD9735AFf958023239c6A063"),
                18,
            ),
        ])
    }

    #[test]
    fn lookup_by_symbol_and_address() {
        let tokens = table();
        assert_eq!(tokens.by_symbol("DAI").unwrap().decimals, 18);
        let usdt = tokens.by_address(address!("0xc2132D05D31c914a87C6611C10748AEb04B58e8F"));
        assert_eq!(usdt.unwrap().symbol, "USDT");
        assert_eq!(tokens.canonical().unwrap().symbol, "USDT");
    }

    #[test]
    fn unknown_entries_fail() {
        let tokens = table();
        let err = tokens.by_symbol("WETH").unwrap_err();
        assert_eq!(err.kind(), "configuration");
        let err = tokens
            .by_address(address!("0x1111111111111111111111111111111111111111"))
            .unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
