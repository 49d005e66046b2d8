//! # Splittable Token
//!
//! A fungible token ledger whose owner can double the total supply in a
//! single O(1) step. Holders are brought up to the new supply level lazily,
//! the next time a transfer, mint or burn touches them.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`ledger`] | Rebase ledger core: balances, reconciliation, transfers, mint/burn |
//! | [`genesis`] | One-time initial allocation |
//! | [`abi`] | `ISplittableToken` call dispatch and EVM log encoding |
//! | [`shared`] | Thread-safe single-writer handle |
//! | [`traits`] | [`TokenLedger`] interface for collaborating contracts |
//! | [`config`] | TOML/JSON genesis configuration |
//!
//! ## Example
//!
//! ```
//! use alloy_primitives::{address, U256};
//! use splittable_token::SplittableToken;
//!
//! let owner = address!("0x00000000000000000000000000000000000000a1");
//! let holder = address!("0x00000000000000000000000000000000000000b1");
//!
//! let mut token =
//!     SplittableToken::initialize(owner, "Split", "SPL", &[holder], &[U256::from(100)])?;
//! token.increase_supply(owner)?;
//! assert_eq!(token.balance_of(holder), U256::from(200));
//! # Ok::<(), splittable_token::TokenError>(())
//! ```

pub mod abi;
pub mod config;
pub mod error;
pub mod events;
pub mod genesis;
pub mod ledger;
pub mod shared;
pub mod traits;

pub use abi::{CallOutput, TokenContract};
pub use config::{ConfigError, GenesisConfig};
pub use error::{TokenError, TokenResult};
pub use events::{LedgerEvent, Receipt};
pub use ledger::{decimal_precision, AccountState, SplittableToken, DECIMALS};
pub use shared::SharedToken;
pub use traits::TokenLedger;
