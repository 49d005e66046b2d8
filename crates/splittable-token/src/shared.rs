//! Thread-safe ledger handle.

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use parking_lot::RwLock;

use crate::ledger::SplittableToken;

/// Cloneable handle to a single ledger.
///
/// Each write closure runs under the write lock, so operations are atomic and
/// totally ordered. Reads share the lock and observe the latest committed write.
#[derive(Clone, Debug)]
pub struct SharedToken {
    inner: Arc<RwLock<SplittableToken>>,
}

impl SharedToken {
    /// Wraps a ledger.
    pub fn new(token: SplittableToken) -> Self {
        Self {
            inner: Arc::new(RwLock::new(token)),
        }
    }

    /// Runs `f` against a read-only view.
    pub fn read<R>(&self, f: impl FnOnce(&SplittableToken) -> R) -> R {
        // parking_lot::RwLock never poisons
        f(&self.inner.read())
    }

    /// Runs `f` with exclusive access. A closure that returns an error from a
    /// ledger operation has committed nothing.
    pub fn write<R>(&self, f: impl FnOnce(&mut SplittableToken) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Effective balance of `account`.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.read(|token| token.balance_of(account))
    }

    /// Current total supply.
    pub fn total_supply(&self) -> U256 {
        self.read(SplittableToken::total_supply)
    }

    /// Copy of the ledger as of now.
    pub fn snapshot(&self) -> SplittableToken {
        self.read(|token| token.clone())
    }
}

impl From<SplittableToken> for SharedToken {
    fn from(token: SplittableToken) -> Self {
        Self::new(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;
    use std::thread;

    const OWNER: Address = address!("0x00000000000000000000000000000000000000a1");

    #[test]
    fn concurrent_writers_preserve_conservation() {
        let holders: Vec<Address> = (1u8..=4)
            .map(|i| Address::with_last_byte(0xb0 + i))
            .collect();
        let amounts = vec![U256::from(1_000u64); holders.len()];
        let token = SplittableToken::initialize(OWNER, "Test", "TST", &holders, &amounts)
            .expect("genesis");
        let shared = SharedToken::new(token);

        thread::scope(|scope| {
            for (i, &from) in holders.iter().enumerate() {
                let to = holders[(i + 1) % holders.len()];
                let shared = shared.clone();
                scope.spawn(move || {
                    for _ in 0..50 {
                        shared
                            .write(|t| t.transfer(from, to, U256::from(3)))
                            .expect("transfer within balance");
                    }
                });
            }
            let shared = shared.clone();
            scope.spawn(move || {
                for _ in 0..3 {
                    shared
                        .write(|t| t.increase_supply(OWNER))
                        .expect("owner increase");
                }
            });
        });

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.exponent(), 3);
        assert_eq!(shared.total_supply(), U256::from(32_000u64));
        assert_eq!(snapshot.sum_of_balances(), shared.total_supply());
    }

    #[test]
    fn reads_see_latest_write() {
        let holder = address!("0x00000000000000000000000000000000000000b1");
        let shared: SharedToken =
            SplittableToken::initialize(OWNER, "Test", "TST", &[holder], &[U256::from(5)])
                .expect("genesis")
                .into();
        shared.write(|t| t.increase_supply(OWNER)).expect("increase");
        assert_eq!(shared.balance_of(holder), U256::from(10));
    }
}
