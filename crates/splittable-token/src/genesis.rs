//! One-time genesis allocation.

use alloy_primitives::{Address, U256};

use crate::{
    error::{TokenError, TokenResult},
    events::LedgerEvent,
    ledger::SplittableToken,
};

impl SplittableToken {
    /// Creates a ledger and distributes the initial supply.
    ///
    /// `holders[i]` receives `amounts[i]` at exponent 0 and one mint event is
    /// journaled per index, in order. Repeated holders accumulate. On any error
    /// no ledger is produced.
    pub fn initialize(
        owner: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        holders: &[Address],
        amounts: &[U256],
    ) -> TokenResult<Self> {
        if holders.len() != amounts.len() {
            return Err(TokenError::InvalidAllocation(
                "arrays must have same length".to_string(),
            ));
        }
        if owner.is_zero() {
            return Err(TokenError::InvalidRecipient(owner));
        }

        let mut token = Self::empty(owner, name.into(), symbol.into());
        let mut events = Vec::with_capacity(holders.len());

        for (&holder, &amount) in holders.iter().zip(amounts) {
            if holder.is_zero() {
                return Err(TokenError::InvalidRecipient(holder));
            }
            let state = token.accounts.entry(holder).or_default();
            state.raw_balance = state
                .raw_balance
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?;
            token.raw_total_supply = token
                .raw_total_supply
                .checked_add(amount)
                .ok_or(TokenError::Overflow)?;
            events.push(LedgerEvent::transfer(Address::ZERO, holder, amount));
        }

        token.accounts.retain(|_, state| !state.raw_balance.is_zero());
        token.journal = events;

        tracing::info!(
            target: "splittable",
            name = %token.name,
            symbol = %token.symbol,
            holders = holders.len(),
            total_supply = %token.raw_total_supply,
            "genesis allocated"
        );
        Ok(token)
    }
}
