//! Ledger events and per-operation receipts.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// An event emitted by a ledger operation.
///
/// The journal keeps these in emission order; a catch-up mint is a `Transfer`
/// from [`Address::ZERO`] and always precedes the transfer that triggered it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Tokens moved, minted (`from` is zero) or burned (`to` is zero).
    Transfer {
        /// Source account.
        from: Address,
        /// Destination account.
        to: Address,
        /// Amount in current units.
        value: U256,
    },
    /// Allowance set by `owner` for `spender`.
    Approval {
        /// Token holder.
        owner: Address,
        /// Delegated spender.
        spender: Address,
        /// New allowance.
        value: U256,
    },
    /// Total supply doubled.
    IncreaseSupply {
        /// Exponent after the doubling.
        exponent: u32,
    },
    /// Ledger owner changed.
    OwnershipTransferred {
        /// Owner before the call.
        previous_owner: Address,
        /// Owner after the call.
        new_owner: Address,
    },
}

impl LedgerEvent {
    /// Convenience constructor for a transfer event.
    pub const fn transfer(from: Address, to: Address, value: U256) -> Self {
        Self::Transfer { from, to, value }
    }

    /// Returns true for a `Transfer` out of the zero account.
    pub fn is_mint(&self) -> bool {
        matches!(self, Self::Transfer { from, .. } if from.is_zero())
    }

    /// Returns true for a `Transfer` into the zero account.
    pub fn is_burn(&self) -> bool {
        matches!(self, Self::Transfer { to, .. } if to.is_zero())
    }
}

/// Outcome of a committed operation: its return value and the events it emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt<T = ()> {
    /// Value returned by the operation.
    pub value: T,
    /// Events emitted by this operation only, in order.
    pub events: Vec<LedgerEvent>,
}

impl<T> Receipt<T> {
    /// Transfer events in this receipt.
    pub fn transfers(&self) -> impl Iterator<Item = &LedgerEvent> {
        self.events
            .iter()
            .filter(|event| matches!(event, LedgerEvent::Transfer { .. }))
    }

    /// Number of transfer events, catch-up mints included.
    pub fn transfer_count(&self) -> usize {
        self.transfers().count()
    }

    /// Whether a transfer with exactly these arguments was emitted.
    pub fn has_transfer(&self, from: Address, to: Address, value: U256) -> bool {
        self.events.contains(&LedgerEvent::transfer(from, to, value))
    }

    /// Catch-up or explicit mint into `account`, if any.
    pub fn mint_into(&self, account: Address) -> Option<U256> {
        self.events.iter().find_map(|event| match event {
            LedgerEvent::Transfer { from, to, value } if from.is_zero() && *to == account => {
                Some(*value)
            }
            _ => None,
        })
    }
}
