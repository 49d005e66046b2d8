//! Solidity ABI surface
//!
//! Lets the ledger sit behind a contract-call boundary: calldata is decoded
//! against [`ISplittableToken`], dispatched to the shared ledger with the
//! caller as `msg.sender`, and journaled events come back as EVM logs.
//!
//! ## Interface
//!
//! ```solidity
//! interface ISplittableToken {
//!     function name() external view returns (string);
//!     function symbol() external view returns (string);
//!     function decimals() external view returns (uint8);
//!     function totalSupply() external view returns (uint256);
//!     function balanceOf(address account) external view returns (uint256);
//!     function exponent() external view returns (uint256);
//!     function userExponents(address account) external view returns (uint256);
//!     function owner() external view returns (address);
//!     function allowance(address owner, address spender) external view returns (uint256);
//!     function transfer(address to, uint256 amount) external returns (bool);
//!     function transferFrom(address from, address to, uint256 amount) external returns (bool);
//!     function approve(address spender, uint256 amount) external returns (bool);
//!     function increaseSupply() external returns (uint256);
//!     function transferOwnership(address newOwner) external;
//! }
//! ```
//!
//! A failed call returns an error and commits nothing, matching a reverted
//! transaction. Mint and burn stay off this interface; derived token variants
//! reach them through [`crate::TokenLedger`].

use alloy_primitives::{Address, Bytes, Log, LogData, U256};
use alloy_sol_types::{sol, SolEvent, SolInterface, SolValue};

use crate::{
    error::{TokenError, TokenResult},
    events::{LedgerEvent, Receipt},
    shared::SharedToken,
};

sol! {
    /// Splittable token interface
    interface ISplittableToken {
        /// Tokens moved, minted or burned
        event Transfer(address indexed from, address indexed to, uint256 value);

        /// Allowance set
        event Approval(address indexed owner, address indexed spender, uint256 value);

        /// Total supply doubled
        event IncreaseSupply(uint256 exponent);

        /// Owner changed
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function exponent() external view returns (uint256);
        function userExponents(address account) external view returns (uint256);
        function owner() external view returns (address);
        function allowance(address owner, address spender) external view returns (uint256);

        /// Transfer from the caller, reconciling both sides first
        function transfer(address to, uint256 amount) external returns (bool);

        /// Delegated transfer against the caller's allowance
        function transferFrom(address from, address to, uint256 amount) external returns (bool);

        function approve(address spender, uint256 amount) external returns (bool);

        /// Double the total supply (owner only)
        /// @return The new exponent
        function increaseSupply() external returns (uint256);

        function transferOwnership(address newOwner) external;
    }
}

/// Return data and logs of a successful call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallOutput {
    /// ABI-encoded return value.
    pub output: Bytes,
    /// Logs emitted by the call, in order.
    pub logs: Vec<Log>,
}

/// Encodes a ledger event as an EVM log emitted by `address`.
pub fn event_log(address: Address, event: &LedgerEvent) -> Log {
    let data: LogData = match *event {
        LedgerEvent::Transfer { from, to, value } => {
            ISplittableToken::Transfer { from, to, value }.encode_log_data()
        }
        LedgerEvent::Approval {
            owner,
            spender,
            value,
        } => ISplittableToken::Approval {
            owner,
            spender,
            value,
        }
        .encode_log_data(),
        LedgerEvent::IncreaseSupply { exponent } => ISplittableToken::IncreaseSupply {
            exponent: U256::from(exponent),
        }
        .encode_log_data(),
        LedgerEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        } => ISplittableToken::OwnershipTransferred {
            previousOwner: previous_owner,
            newOwner: new_owner,
        }
        .encode_log_data(),
    };
    Log { address, data }
}

/// The ledger exposed through [`ISplittableToken`] at a fixed address.
#[derive(Clone, Debug)]
pub struct TokenContract {
    address: Address,
    token: SharedToken,
}

impl TokenContract {
    /// Binds `token` to `address`; logs are attributed to that address.
    pub const fn new(address: Address, token: SharedToken) -> Self {
        Self { address, token }
    }

    /// Contract address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Underlying ledger handle.
    pub const fn token(&self) -> &SharedToken {
        &self.token
    }

    /// Executes `data` on behalf of `caller`.
    pub fn call(&self, caller: Address, data: &[u8]) -> TokenResult<CallOutput> {
        use ISplittableToken::ISplittableTokenCalls as Calls;

        tracing::debug!(
            target: "splittable::abi",
            ?caller,
            calldata_len = data.len(),
            "token call"
        );

        let decoded =
            Calls::abi_decode(data).map_err(|e| TokenError::InvalidCalldata(e.to_string()))?;

        match decoded {
            Calls::name(_) => Ok(self.view(|t| (t.name().to_string(),).abi_encode_params())),
            Calls::symbol(_) => Ok(self.view(|t| (t.symbol().to_string(),).abi_encode_params())),
            Calls::decimals(_) => Ok(self.view(|t| U256::from(t.decimals()).abi_encode())),
            Calls::totalSupply(_) => Ok(self.view(|t| t.total_supply().abi_encode())),
            Calls::balanceOf(call) => Ok(self.view(|t| t.balance_of(call.account).abi_encode())),
            Calls::exponent(_) => Ok(self.view(|t| U256::from(t.exponent()).abi_encode())),
            Calls::userExponents(call) => {
                Ok(self.view(|t| U256::from(t.user_exponent(call.account)).abi_encode()))
            }
            Calls::owner(_) => Ok(self.view(|t| t.owner().abi_encode())),
            Calls::allowance(call) => {
                Ok(self.view(|t| t.allowance(call.owner, call.spender).abi_encode()))
            }
            Calls::transfer(call) => {
                let receipt = self
                    .token
                    .write(|t| t.transfer(caller, call.to, call.amount))?;
                Ok(self.finish(receipt, |ok| ok.abi_encode()))
            }
            Calls::transferFrom(call) => {
                let receipt = self
                    .token
                    .write(|t| t.transfer_from(caller, call.from, call.to, call.amount))?;
                Ok(self.finish(receipt, |ok| ok.abi_encode()))
            }
            Calls::approve(call) => {
                let receipt = self
                    .token
                    .write(|t| t.approve(caller, call.spender, call.amount))?;
                Ok(self.finish(receipt, |ok| ok.abi_encode()))
            }
            Calls::increaseSupply(_) => {
                let receipt = self.token.write(|t| t.increase_supply(caller))?;
                Ok(self.finish(receipt, |exp| U256::from(exp).abi_encode()))
            }
            Calls::transferOwnership(call) => {
                let receipt = self
                    .token
                    .write(|t| t.transfer_ownership(caller, call.newOwner))?;
                Ok(self.finish(receipt, |()| Vec::new()))
            }
        }
    }

    fn view(&self, f: impl FnOnce(&crate::ledger::SplittableToken) -> Vec<u8>) -> CallOutput {
        CallOutput {
            output: self.token.read(f).into(),
            logs: Vec::new(),
        }
    }

    fn finish<T>(&self, receipt: Receipt<T>, encode: impl FnOnce(T) -> Vec<u8>) -> CallOutput {
        let logs = receipt
            .events
            .iter()
            .map(|event| event_log(self.address, event))
            .collect();
        CallOutput {
            output: encode(receipt.value).into(),
            logs,
        }
    }
}
