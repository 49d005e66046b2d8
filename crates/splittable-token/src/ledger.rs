//! Rebase Ledger Core
//!
//! A fungible balance ledger whose total supply the owner can double in O(1).
//!
//! ## Encoding
//!
//! Each account stores a raw balance together with the global exponent at which
//! that raw balance was last reconciled. Its effective balance is
//!
//! ```text
//! effective = raw_balance * 2^(exponent - user_exponent)
//! ```
//!
//! so `increase_supply` only bumps `exponent` and never iterates holders. An
//! account is brought up to the current exponent (reconciled) the next time a
//! transfer, mint or burn touches it, and that catch-up is reported as a
//! `Transfer` from the zero address for the difference.
//!
//! ## Event Rules
//!
//! | Situation | Transfer events |
//! |-----------|-----------------|
//! | both sides current | 1 |
//! | sender stale, recipient empty or current | 2 |
//! | sender and recipient stale with balance | 3 |
//! | self transfer while stale | 2 |
//!
//! Accounts with a zero raw balance never receive a catch-up mint; their
//! exponent is advanced silently.
//!
//! ## Atomicity
//!
//! Operations reconcile copies of the touched records, run every check, and only
//! then write back and append to the journal. A failing call leaves no trace.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::{
    error::{TokenError, TokenResult},
    events::{LedgerEvent, Receipt},
};

/// Token decimals; amounts are fixed point with 18 fractional digits.
pub const DECIMALS: u8 = 18;

/// `10^18`, one whole token in base units.
pub fn decimal_precision() -> U256 {
    U256::from(10u64).pow(U256::from(DECIMALS))
}

/// Per-account record. Absent accounts behave as `AccountState::default()`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Balance in units of `user_exponent`.
    pub raw_balance: U256,
    /// Global exponent at which `raw_balance` was last reconciled.
    pub user_exponent: u32,
}

impl AccountState {
    /// Effective balance once the ledger has reached `exponent`.
    pub fn balance_at(&self, exponent: u32) -> U256 {
        // Effective balances are bounded by total supply, which
        // `increase_supply` keeps below `U256::MAX`.
        self.raw_balance
            .saturating_shl(exponent.saturating_sub(self.user_exponent) as usize)
    }

    /// Whether the record lags behind `exponent`.
    pub const fn is_stale(&self, exponent: u32) -> bool {
        self.user_exponent < exponent
    }
}

/// Multiplies `raw` by `2^gap`, failing instead of dropping bits.
fn scale(raw: U256, gap: u32) -> Option<U256> {
    raw.checked_shl(gap as usize)
}

/// Splittable token ledger.
#[derive(Clone, Debug)]
pub struct SplittableToken {
    pub(crate) name: String,
    pub(crate) symbol: String,
    pub(crate) owner: Address,
    pub(crate) exponent: u32,
    /// Total supply in units of `supply_exponent`.
    pub(crate) raw_total_supply: U256,
    pub(crate) supply_exponent: u32,
    pub(crate) accounts: BTreeMap<Address, AccountState>,
    pub(crate) allowances: BTreeMap<(Address, Address), U256>,
    pub(crate) journal: Vec<LedgerEvent>,
}

impl SplittableToken {
    pub(crate) fn empty(owner: Address, name: String, symbol: String) -> Self {
        Self {
            name,
            symbol,
            owner,
            exponent: 0,
            raw_total_supply: U256::ZERO,
            supply_exponent: 0,
            accounts: BTreeMap::new(),
            allowances: BTreeMap::new(),
            journal: Vec::new(),
        }
    }

    // === Views ===

    /// Token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Token decimals.
    pub const fn decimals(&self) -> u8 {
        DECIMALS
    }

    /// Address allowed to call [`Self::increase_supply`].
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Number of doublings since genesis.
    pub const fn exponent(&self) -> u32 {
        self.exponent
    }

    /// Exponent at which `account` was last reconciled.
    pub fn user_exponent(&self, account: Address) -> u32 {
        self.account(account).user_exponent
    }

    /// Stored record for `account`, or the zero record if it was never seen.
    pub fn account(&self, account: Address) -> AccountState {
        self.accounts.get(&account).copied().unwrap_or_default()
    }

    /// Effective balance of `account` at the current exponent.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.account(account).balance_at(self.exponent)
    }

    /// Current total supply.
    pub fn total_supply(&self) -> U256 {
        self.raw_total_supply
            .saturating_shl((self.exponent - self.supply_exponent) as usize)
    }

    /// Remaining amount `spender` may move out of `owner`.
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&(owner, spender))
            .copied()
            .unwrap_or_default()
    }

    /// Stored account records in address order.
    pub fn holders(&self) -> impl Iterator<Item = (&Address, &AccountState)> {
        self.accounts.iter()
    }

    /// Sum of every holder's effective balance. Walks all accounts.
    pub fn sum_of_balances(&self) -> U256 {
        self.accounts
            .values()
            .fold(U256::ZERO, |acc, state| {
                acc.saturating_add(state.balance_at(self.exponent))
            })
    }

    /// Every event emitted since genesis, in order.
    pub fn events(&self) -> &[LedgerEvent] {
        &self.journal
    }

    // === Supply ===

    /// Doubles the total supply. Owner only.
    ///
    /// No account is touched; holders catch up lazily.
    pub fn increase_supply(&mut self, caller: Address) -> TokenResult<Receipt<u32>> {
        self.ensure_owner(caller)?;

        let next = self
            .exponent
            .checked_add(1)
            .ok_or(TokenError::MaxExponentExceeded(self.exponent))?;
        // Keeping the doubled total representable bounds every balance too.
        scale(self.raw_total_supply, next - self.supply_exponent)
            .ok_or(TokenError::MaxExponentExceeded(self.exponent))?;

        self.exponent = next;
        tracing::info!(target: "splittable", exponent = next, "supply increased");
        Ok(self.commit(next, vec![LedgerEvent::IncreaseSupply { exponent: next }]))
    }

    // === Transfers ===

    /// Moves `amount` from `from` to `to`, reconciling both sides first.
    ///
    /// A zero amount is allowed and is how a holder materializes pending
    /// catch-up without moving funds.
    pub fn transfer(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> TokenResult<Receipt<bool>> {
        Self::ensure_sender(from)?;
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient(to));
        }

        let mut events = Vec::with_capacity(3);

        if from == to {
            let (state, catch_up) = self.reconciled(from)?;
            Self::ensure_covers(&state, amount)?;
            events.extend(catch_up);
            events.push(LedgerEvent::transfer(from, to, amount));
            self.store(from, state);
        } else {
            let (mut sender, sender_catch_up) = self.reconciled(from)?;
            Self::ensure_covers(&sender, amount)?;
            let (mut recipient, recipient_catch_up) = self.reconciled(to)?;

            sender.raw_balance -= amount;
            recipient.raw_balance = recipient
                .raw_balance
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?;

            events.extend(sender_catch_up);
            events.extend(recipient_catch_up);
            events.push(LedgerEvent::transfer(from, to, amount));
            self.store(from, sender);
            self.store(to, recipient);
        }

        tracing::debug!(target: "splittable", ?from, ?to, %amount, "transfer");
        Ok(self.commit(true, events))
    }

    /// Sets the allowance of `spender` over `owner`'s tokens.
    pub fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> TokenResult<Receipt<bool>> {
        Self::ensure_sender(owner)?;
        if spender.is_zero() {
            return Err(TokenError::InvalidRecipient(spender));
        }
        self.allowances.insert((owner, spender), amount);
        tracing::debug!(target: "splittable", ?owner, ?spender, %amount, "approval");
        Ok(self.commit(
            true,
            vec![LedgerEvent::Approval {
                owner,
                spender,
                value: amount,
            }],
        ))
    }

    /// Delegated transfer. Spends allowance, then follows [`Self::transfer`].
    pub fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> TokenResult<Receipt<bool>> {
        let remaining = self.allowance_after_spend(from, spender, amount)?;
        let receipt = self.transfer(from, to, amount)?;
        self.allowances.insert((from, spender), remaining);
        Ok(receipt)
    }

    // === Mint / Burn ===

    /// Credits `amount` (current units) to `to` and grows the supply.
    ///
    /// Authorization is left to the caller; the splittable token itself only
    /// mints at genesis and through catch-up.
    pub fn mint(&mut self, to: Address, amount: U256) -> TokenResult<Receipt> {
        if to.is_zero() {
            return Err(TokenError::InvalidRecipient(to));
        }

        let (mut state, catch_up) = self.reconciled(to)?;
        state.raw_balance = state
            .raw_balance
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;
        let total = self
            .current_raw_total()?
            .checked_add(amount)
            .ok_or(TokenError::Overflow)?;

        self.store(to, state);
        self.raw_total_supply = total;
        self.supply_exponent = self.exponent;

        let mut events: Vec<_> = catch_up.into_iter().collect();
        events.push(LedgerEvent::transfer(Address::ZERO, to, amount));
        tracing::info!(target: "splittable", ?to, %amount, "minted");
        Ok(self.commit((), events))
    }

    /// Destroys `amount` (current units) held by `from`.
    pub fn burn(&mut self, from: Address, amount: U256) -> TokenResult<Receipt> {
        Self::ensure_sender(from)?;
        let (mut state, catch_up) = self.reconciled(from)?;
        Self::ensure_covers(&state, amount)?;
        state.raw_balance -= amount;
        let total = self
            .current_raw_total()?
            .checked_sub(amount)
            .ok_or(TokenError::Overflow)?;

        self.store(from, state);
        self.raw_total_supply = total;
        self.supply_exponent = self.exponent;

        let mut events: Vec<_> = catch_up.into_iter().collect();
        events.push(LedgerEvent::transfer(from, Address::ZERO, amount));
        tracing::info!(target: "splittable", ?from, %amount, "burned");
        Ok(self.commit((), events))
    }

    /// Burns from `from` using `spender`'s allowance.
    pub fn burn_from(
        &mut self,
        spender: Address,
        from: Address,
        amount: U256,
    ) -> TokenResult<Receipt> {
        let remaining = self.allowance_after_spend(from, spender, amount)?;
        let receipt = self.burn(from, amount)?;
        self.allowances.insert((from, spender), remaining);
        Ok(receipt)
    }

    // === Ownership ===

    /// Hands ownership to `new_owner`. Owner only.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> TokenResult<Receipt> {
        self.ensure_owner(caller)?;
        if new_owner.is_zero() {
            return Err(TokenError::InvalidRecipient(new_owner));
        }
        let previous_owner = std::mem::replace(&mut self.owner, new_owner);
        tracing::info!(target: "splittable", ?previous_owner, ?new_owner, "ownership transferred");
        Ok(self.commit(
            (),
            vec![LedgerEvent::OwnershipTransferred {
                previous_owner,
                new_owner,
            }],
        ))
    }

    // === Internals ===

    /// Brings a copy of `account` to the current exponent.
    ///
    /// Returns the reconciled record and the catch-up mint, if one is owed.
    /// Nothing is written; callers store the record once all checks pass.
    fn reconciled(&self, account: Address) -> TokenResult<(AccountState, Option<LedgerEvent>)> {
        let mut state = self.account(account);
        if !state.is_stale(self.exponent) {
            return Ok((state, None));
        }

        let gap = self.exponent - state.user_exponent;
        state.user_exponent = self.exponent;
        if state.raw_balance.is_zero() {
            return Ok((state, None));
        }

        let scaled = scale(state.raw_balance, gap).ok_or(TokenError::Overflow)?;
        let delta = scaled - state.raw_balance;
        state.raw_balance = scaled;

        tracing::debug!(target: "splittable", ?account, gap, %delta, "catch-up mint");
        Ok((
            state,
            Some(LedgerEvent::transfer(Address::ZERO, account, delta)),
        ))
    }

    /// The zero address only ever appears as the mint/burn marker in events.
    fn ensure_sender(account: Address) -> TokenResult<()> {
        if account.is_zero() {
            return Err(TokenError::InvalidSender(account));
        }
        Ok(())
    }

    fn ensure_covers(state: &AccountState, amount: U256) -> TokenResult<()> {
        if state.raw_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: state.raw_balance,
                need: amount,
            });
        }
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> TokenResult<()> {
        if caller == self.owner {
            Ok(())
        } else {
            tracing::warn!(target: "splittable", ?caller, "owner check failed");
            Err(TokenError::Unauthorized { caller })
        }
    }

    /// Allowance left after spending `amount`; an unlimited allowance stays unlimited.
    fn allowance_after_spend(
        &self,
        owner: Address,
        spender: Address,
        amount: U256,
    ) -> TokenResult<U256> {
        let current = self.allowance(owner, spender);
        if current == U256::MAX {
            return Ok(current);
        }
        current
            .checked_sub(amount)
            .ok_or(TokenError::InsufficientAllowance {
                have: current,
                need: amount,
            })
    }

    /// Total supply expressed at the current exponent.
    fn current_raw_total(&self) -> TokenResult<U256> {
        scale(self.raw_total_supply, self.exponent - self.supply_exponent)
            .ok_or(TokenError::Overflow)
    }

    fn store(&mut self, account: Address, state: AccountState) {
        if state == AccountState::default() {
            self.accounts.remove(&account);
        } else {
            self.accounts.insert(account, state);
        }
    }

    fn commit<T>(&mut self, value: T, events: Vec<LedgerEvent>) -> Receipt<T> {
        self.journal.extend(events.iter().cloned());
        Receipt { value, events }
    }
}
