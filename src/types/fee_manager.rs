//! Fee manager contract interface.
//!
//! Fee rates are authoritative on-chain state and are never duplicated
//! locally; the client reads them here and applies the arithmetic in
//! [`fees`](crate::fees).

use alloy::sol;

sol! {
    #[sol(rpc)]
    #[derive(Debug)]
    interface IFeeManager {
        /// Default protocol fee rates in basis points.
        ///
        /// `coverage` is charged to the client on top of the deposit,
        /// `claim` is charged on the claimed amount.
        function defaultFees() external view returns (uint16 coverage, uint16 claim);
    }
}
