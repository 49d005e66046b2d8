//! Interface consumed by collaborating token variants and protocols.

use alloy_primitives::{Address, U256};

use crate::{
    error::TokenResult,
    events::Receipt,
    ledger::SplittableToken,
    shared::SharedToken,
};

/// Balance ledger operations a collaborator may rely on.
///
/// Stake-gated mintable tokens and lending pools only need these; they never
/// write balances directly.
pub trait TokenLedger {
    /// Effective balance of `account`.
    fn balance_of(&self, account: Address) -> U256;

    /// Current total supply.
    fn total_supply(&self) -> U256;

    /// Moves `amount` from `from` to `to`.
    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> TokenResult<Receipt<bool>>;

    /// Credits newly created tokens. Authorization is the caller's concern.
    fn mint(&mut self, to: Address, amount: U256) -> TokenResult<Receipt>;

    /// Destroys tokens held by `from`.
    fn burn(&mut self, from: Address, amount: U256) -> TokenResult<Receipt>;
}

impl TokenLedger for SplittableToken {
    fn balance_of(&self, account: Address) -> U256 {
        Self::balance_of(self, account)
    }

    fn total_supply(&self) -> U256 {
        Self::total_supply(self)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> TokenResult<Receipt<bool>> {
        Self::transfer(self, from, to, amount)
    }

    fn mint(&mut self, to: Address, amount: U256) -> TokenResult<Receipt> {
        Self::mint(self, to, amount)
    }

    fn burn(&mut self, from: Address, amount: U256) -> TokenResult<Receipt> {
        Self::burn(self, from, amount)
    }
}

impl TokenLedger for SharedToken {
    fn balance_of(&self, account: Address) -> U256 {
        Self::balance_of(self, account)
    }

    fn total_supply(&self) -> U256 {
        Self::total_supply(self)
    }

    fn transfer(&mut self, from: Address, to: Address, amount: U256) -> TokenResult<Receipt<bool>> {
        self.write(|token| token.transfer(from, to, amount))
    }

    fn mint(&mut self, to: Address, amount: U256) -> TokenResult<Receipt> {
        self.write(|token| token.mint(to, amount))
    }

    fn burn(&mut self, from: Address, amount: U256) -> TokenResult<Receipt> {
        self.write(|token| token.burn(from, amount))
    }
}
