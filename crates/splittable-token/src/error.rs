use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Errors returned by ledger operations.
///
/// Every failing operation leaves the ledger exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Genesis holders and amounts were malformed.
    #[error("invalid allocation: {0}")]
    InvalidAllocation(String),
    /// Caller is not allowed to perform the operation.
    #[error("unauthorized caller {caller}")]
    Unauthorized {
        /// Address that attempted the call.
        caller: Address,
    },
    /// Effective balance does not cover the requested amount.
    #[error("insufficient balance: have {have}, need {need}")]
    InsufficientBalance {
        /// Effective balance at the current exponent.
        have: U256,
        /// Requested amount.
        need: U256,
    },
    /// Spender allowance does not cover the requested amount.
    #[error("insufficient allowance: have {have}, need {need}")]
    InsufficientAllowance {
        /// Remaining allowance.
        have: U256,
        /// Requested amount.
        need: U256,
    },
    /// Zero address used where a real account is required.
    #[error("invalid recipient {0}")]
    InvalidRecipient(Address),
    /// Zero address used as the source of funds or as an allowance owner.
    #[error("invalid sender {0}")]
    InvalidSender(Address),
    /// Checked arithmetic failed.
    #[error("arithmetic overflow")]
    Overflow,
    /// Another doubling would push total supply past `U256::MAX`.
    #[error("max exponent exceeded at exponent {0}")]
    MaxExponentExceeded(u32),
    /// Calldata could not be decoded against the token interface.
    #[error("invalid calldata: {0}")]
    InvalidCalldata(String),
}

/// Result type for ledger operations.
pub type TokenResult<T> = Result<T, TokenError>;
