use alloy_primitives::{Address, U256};
use rand::{rngs::StdRng, Rng, SeedableRng};
use splittable_token::{decimal_precision, LedgerEvent, SplittableToken, TokenError};

fn accounts() -> Vec<Address> {
    (0u8..10).map(|i| Address::with_last_byte(0x10 + i)).collect()
}

fn one() -> U256 {
    decimal_precision()
}

fn deploy(holders: &[Address], amounts: &[U256]) -> SplittableToken {
    SplittableToken::initialize(holders[0], "Billion Token for Test", "BTT", holders, amounts)
        .expect("genesis")
}

/// Ledger with 10^8 tokens held by `accounts[0]`, which is also the owner.
fn hundred_million() -> (SplittableToken, Vec<Address>) {
    let accounts = accounts();
    let token = deploy(&accounts[..1], &[one() * U256::from(100_000_000u64)]);
    (token, accounts)
}

fn assert_conserved(token: &SplittableToken, accounts: &[Address]) {
    let sum = accounts
        .iter()
        .fold(U256::ZERO, |acc, a| acc + token.balance_of(*a));
    assert_eq!(sum, token.total_supply(), "balances must sum to total supply");
}

// === Genesis ===

#[test]
fn genesis_mints_everything_into_single_account() {
    let accounts = accounts();
    let billion = one() * U256::from(1_000_000_000u64);
    let token = deploy(&accounts[..1], &[billion]);

    assert_eq!(billion, U256::from(10u64).pow(U256::from(27)));
    assert_eq!(token.total_supply(), billion);
    assert_eq!(token.balance_of(accounts[0]), billion);
    assert_eq!(
        token.events(),
        &[LedgerEvent::transfer(Address::ZERO, accounts[0], billion)]
    );
}

#[test]
fn genesis_mints_into_multiple_accounts() {
    let accounts = accounts();
    let share = one() * U256::from(200_000_000u64);
    let token = deploy(&accounts[..5], &[share; 5]);

    for account in &accounts[..5] {
        assert_eq!(token.balance_of(*account), share);
        assert!(token
            .events()
            .contains(&LedgerEvent::transfer(Address::ZERO, *account, share)));
    }
    assert_eq!(token.total_supply(), one() * U256::from(1_000_000_000u64));
}

#[test]
fn genesis_rejects_unequal_arrays() {
    let accounts = accounts();
    let share = one() * U256::from(200_000_000u64);
    let err = SplittableToken::initialize(
        accounts[0],
        "Billion Token for Test",
        "BTT",
        &accounts[..4],
        &[share; 5],
    )
    .expect_err("4 holders, 5 amounts");
    assert!(matches!(err, TokenError::InvalidAllocation(_)));
    assert!(err.to_string().contains("arrays must have same length"));
}

// === Supply growth ===

#[test]
fn initial_exponent_is_zero() {
    let (token, _) = hundred_million();
    assert_eq!(token.exponent(), 0);
    assert_eq!(token.total_supply(), one() * U256::from(100_000_000u64));
}

#[test]
fn owner_doubles_supply_twice() {
    let (mut token, accounts) = hundred_million();

    token.increase_supply(accounts[0]).expect("first increase");
    assert_eq!(token.exponent(), 1);
    assert_eq!(token.total_supply(), one() * U256::from(200_000_000u64));

    token.increase_supply(accounts[0]).expect("second increase");
    assert_eq!(token.exponent(), 2);
    assert_eq!(token.total_supply(), one() * U256::from(400_000_000u64));
}

#[test]
fn increase_supply_emits_event() {
    let (mut token, accounts) = hundred_million();
    let receipt = token.increase_supply(accounts[0]).expect("increase");
    assert_eq!(receipt.events, vec![LedgerEvent::IncreaseSupply { exponent: 1 }]);
}

#[test]
fn growth_is_exact_for_untouched_holder() {
    let (mut token, accounts) = hundred_million();
    let supply = token.total_supply();
    let balance = token.balance_of(accounts[0]);

    for k in 1..=8u32 {
        token.increase_supply(accounts[0]).expect("increase");
        let factor = U256::from(1u64) << (k as usize);
        assert_eq!(token.balance_of(accounts[0]), balance * factor);
        assert_eq!(token.total_supply(), supply * factor);
    }
}

// === Transfers ===

#[test]
fn anyone_can_transfer() {
    let (mut token, accounts) = hundred_million();

    let receipt = token.transfer(accounts[0], accounts[1], one()).expect("transfer");
    assert_eq!(receipt.transfer_count(), 1);
    assert!(receipt.has_transfer(accounts[0], accounts[1], one()));
    assert_eq!(token.balance_of(accounts[1]), one());

    let receipt = token.transfer(accounts[1], accounts[2], one()).expect("transfer");
    assert_eq!(receipt.transfer_count(), 1);
    assert!(receipt.has_transfer(accounts[1], accounts[2], one()));
    assert_eq!(token.balance_of(accounts[2]), one());
}

#[test]
fn self_transfer_reconciles_once() {
    let (mut token, accounts) = hundred_million();
    token.increase_supply(accounts[0]).expect("increase");

    let receipt = token.transfer(accounts[0], accounts[0], one()).expect("self transfer");
    assert_eq!(receipt.transfer_count(), 2);
    assert!(receipt.has_transfer(
        Address::ZERO,
        accounts[0],
        one() * U256::from(100_000_000u64)
    ));
    assert!(receipt.has_transfer(accounts[0], accounts[0], one()));
}

#[test]
fn credited_accounts_grow_with_supply() {
    let (mut token, accounts) = hundred_million();
    token.transfer(accounts[0], accounts[1], one()).expect("transfer");
    token.increase_supply(accounts[0]).expect("increase");
    assert_eq!(token.balance_of(accounts[1]), one() * U256::from(2));
}

#[test]
fn accounts_only_benefit_after_receiving() {
    let (mut token, accounts) = hundred_million();
    token
        .transfer(accounts[0], accounts[6], one() * U256::from(100))
        .expect("fund account 6");
    let mut w6 = one() * U256::from(100);

    for i in 1..=5usize {
        token.increase_supply(accounts[0]).expect("increase");
        token.transfer(accounts[6], accounts[i], one()).expect("transfer");
        w6 = w6 * U256::from(2) - one();
        assert_eq!(token.balance_of(accounts[6]), w6);
        assert_eq!(
            token.total_supply(),
            one() * U256::from(100_000_000u64) * U256::from(1u64 << i)
        );
    }

    for i in 1..=5usize {
        assert_eq!(
            token.balance_of(accounts[i]),
            one() * U256::from(1u64 << (5 - i)),
            "failed at account {i}"
        );
        assert_eq!(token.user_exponent(accounts[i]), i as u32, "failed at account {i}");
    }
    assert_conserved(&token, &accounts);
}

#[test]
fn balances_catch_up_across_skipped_increases() {
    let (mut token, accounts) = hundred_million();
    token.increase_supply(accounts[0]).expect("increase");
    token
        .transfer(accounts[0], accounts[6], one() * U256::from(100))
        .expect("fund account 6");
    let mut w6 = one() * U256::from(100);

    for i in 1..=5usize {
        token.increase_supply(accounts[0]).expect("increase");
        token.transfer(accounts[6], accounts[i], one()).expect("transfer");
        w6 = w6 * U256::from(2) - one();
        assert_eq!(token.balance_of(accounts[6]), w6);
        assert_eq!(
            token.total_supply(),
            one() * U256::from(100_000_000u64) * U256::from(1u64 << (i + 1))
        );
    }

    for i in 1..=5usize {
        assert_eq!(token.balance_of(accounts[i]), one() * U256::from(1u64 << (5 - i)));
        assert_eq!(token.user_exponent(accounts[i]), i as u32 + 1);
    }

    // Materialize every holder with a zero self transfer.
    let mut sum = U256::ZERO;
    for account in &accounts {
        if token.balance_of(*account).is_zero() {
            continue;
        }
        let expected = if token.user_exponent(*account) == token.exponent() { 1 } else { 2 };
        let receipt = token.transfer(*account, *account, U256::ZERO).expect("zero self transfer");
        assert_eq!(receipt.transfer_count(), expected, "account {account} failed");
        assert!(receipt.has_transfer(*account, *account, U256::ZERO));
        if expected == 2 {
            assert!(receipt.mint_into(*account).is_some());
        }
        assert_eq!(token.user_exponent(*account), token.exponent());
        sum += token.balance_of(*account);
    }
    assert_eq!(sum, token.total_supply());
}

// === Working with increased balances ===

/// accounts[1..=5] hold 100 tokens each, then supply doubles once.
fn increased() -> (SplittableToken, Vec<Address>) {
    let (mut token, accounts) = hundred_million();
    for account in &accounts[1..=5] {
        token
            .transfer(accounts[0], *account, one() * U256::from(100))
            .expect("fund");
    }
    token.increase_supply(accounts[0]).expect("increase");
    (token, accounts)
}

#[test]
fn no_catch_up_mint_into_empty_recipient() {
    let (mut token, accounts) = increased();
    let (sender, recipient) = (accounts[1], accounts[6]);
    assert_eq!(token.user_exponent(sender), 0);
    assert_eq!(token.user_exponent(recipient), 0);

    let amount = one() * U256::from(25) / U256::from(10);
    let receipt = token.transfer(sender, recipient, amount).expect("transfer");
    assert_eq!(receipt.transfer_count(), 2);
    assert!(receipt.has_transfer(Address::ZERO, sender, one() * U256::from(100)));
    assert!(receipt.has_transfer(sender, recipient, amount));
    assert_eq!(receipt.mint_into(recipient), None, "no minting into zero balance addresses");

    assert_eq!(token.user_exponent(sender), 1);
    assert_eq!(token.user_exponent(recipient), 1);
}

#[test]
fn catch_up_mints_into_both_funded_sides() {
    let (mut token, accounts) = increased();
    let (sender, recipient) = (accounts[1], accounts[2]);

    let amount = one() * U256::from(25) / U256::from(10);
    let receipt = token.transfer(sender, recipient, amount).expect("transfer");
    assert_eq!(receipt.transfer_count(), 3);
    assert_eq!(
        receipt.events,
        vec![
            LedgerEvent::transfer(Address::ZERO, sender, one() * U256::from(100)),
            LedgerEvent::transfer(Address::ZERO, recipient, one() * U256::from(100)),
            LedgerEvent::transfer(sender, recipient, amount),
        ]
    );
    assert_eq!(token.user_exponent(sender), 1);
    assert_eq!(token.user_exponent(recipient), 1);
}

#[test]
fn increased_tokens_are_transferable() {
    let (mut token, accounts) = increased();
    let (sender, recipient) = (accounts[1], accounts[6]);

    // 100 were received before the increase, so 200 are spendable.
    let receipt = token
        .transfer(sender, recipient, one() * U256::from(125))
        .expect("transfer");
    assert_eq!(receipt.transfer_count(), 2);
    assert!(receipt.has_transfer(Address::ZERO, sender, one() * U256::from(100)));
    assert!(receipt.has_transfer(sender, recipient, one() * U256::from(125)));
}

#[test]
fn tokens_increase_only_once() {
    let (mut token, accounts) = increased();
    let (sender, recipient) = (accounts[1], accounts[6]);

    let receipt = token
        .transfer(sender, recipient, one() * U256::from(125))
        .expect("transfer");
    assert_eq!(receipt.transfer_count(), 2);
    assert_eq!(token.balance_of(recipient), one() * U256::from(125));
    assert_eq!(token.balance_of(sender), one() * U256::from(75));

    let receipt = token
        .transfer(sender, recipient, one() * U256::from(75))
        .expect("transfer");
    assert_eq!(receipt.transfer_count(), 1);
    assert!(receipt.has_transfer(sender, recipient, one() * U256::from(75)));
    assert_eq!(token.balance_of(recipient), one() * U256::from(200));
    assert_eq!(token.balance_of(sender), U256::ZERO);
}

// === Small-unit scenarios ===

#[test]
fn stale_recipient_catch_up_then_transfer() {
    let accounts = accounts();
    let (x, y, z) = (accounts[0], accounts[1], accounts[2]);
    let mut token = deploy(&[x], &[U256::from(1_000)]);

    token.transfer(x, y, U256::from(100)).expect("x -> y");
    token.increase_supply(x).expect("increase");

    let receipt = token.transfer(y, z, U256::from(1)).expect("y -> z");
    assert_eq!(
        receipt.events,
        vec![
            LedgerEvent::transfer(Address::ZERO, y, U256::from(100)),
            LedgerEvent::transfer(y, z, U256::from(1)),
        ]
    );
    assert_eq!(token.balance_of(y), U256::from(199));
    assert_eq!(token.balance_of(z), U256::from(1));
}

#[test]
fn zero_self_transfer_after_two_increases() {
    let accounts = accounts();
    let (owner, x) = (accounts[0], accounts[1]);
    let mut token = deploy(&[owner, x], &[U256::from(1_000), U256::from(100)]);
    token.increase_supply(owner).expect("increase");
    token.increase_supply(owner).expect("increase");

    let receipt = token.transfer(x, x, U256::ZERO).expect("self transfer");
    assert_eq!(
        receipt.events,
        vec![
            LedgerEvent::transfer(Address::ZERO, x, U256::from(300)),
            LedgerEvent::transfer(x, x, U256::ZERO),
        ]
    );

    let receipt = token.transfer(x, x, U256::ZERO).expect("second self transfer");
    assert_eq!(
        receipt.events,
        vec![LedgerEvent::transfer(x, x, U256::ZERO)],
        "reconciliation is idempotent"
    );
    assert_eq!(token.balance_of(x), U256::from(400));
}

#[test]
fn zero_balance_accounts_never_get_catch_up_mints() {
    let accounts = accounts();
    let mut token = deploy(&accounts[..1], &[U256::from(1_000)]);
    for gap in 1..=6u32 {
        token.increase_supply(accounts[0]).expect("increase");
        let idle = accounts[gap as usize];
        let receipt = token.transfer(idle, idle, U256::ZERO).expect("zero self transfer");
        assert!(
            receipt.events.iter().all(|e| !e.is_mint()),
            "no mint for empty account at gap {gap}"
        );
    }
}

#[test]
fn journal_keeps_every_event_in_order() {
    let accounts = accounts();
    let mut token = deploy(&accounts[..1], &[U256::from(10)]);
    token.transfer(accounts[0], accounts[1], U256::from(4)).expect("transfer");
    token.increase_supply(accounts[0]).expect("increase");
    token.transfer(accounts[1], accounts[0], U256::from(1)).expect("transfer");

    assert_eq!(
        token.events(),
        &[
            LedgerEvent::transfer(Address::ZERO, accounts[0], U256::from(10)),
            LedgerEvent::transfer(accounts[0], accounts[1], U256::from(4)),
            LedgerEvent::IncreaseSupply { exponent: 1 },
            LedgerEvent::transfer(Address::ZERO, accounts[1], U256::from(4)),
            LedgerEvent::transfer(Address::ZERO, accounts[0], U256::from(6)),
            LedgerEvent::transfer(accounts[1], accounts[0], U256::from(1)),
        ]
    );
    assert_conserved(&token, &accounts);
}

#[test]
fn conservation_holds_under_interleaved_operations() {
    let accounts = accounts();
    let owner = accounts[0];
    let mut token = deploy(
        &accounts[..3],
        &[U256::from(1_000u64), U256::from(777u64), U256::from(5u64)],
    );
    let mut rng = StdRng::seed_from_u64(42);

    for step in 0..400 {
        let a = accounts[rng.gen_range(0..accounts.len())];
        let b = accounts[rng.gen_range(0..accounts.len())];
        let balance = token.balance_of(a);

        let result = match rng.gen_range(0..10u8) {
            0 => token.increase_supply(owner).map(|_| ()),
            1 | 2 => token.mint(a, U256::from(rng.gen_range(0..50u64))).map(|_| ()),
            3 | 4 => {
                let amount = balance / U256::from(rng.gen_range(1..5u64));
                token.burn(a, amount).map(|_| ())
            }
            5 => token.transfer(a, b, balance + U256::from(1)).map(|_| ()),
            _ => {
                let amount = balance * U256::from(2) / U256::from(3);
                token.transfer(a, b, amount).map(|_| ())
            }
        };

        if let Err(err) = result {
            assert!(
                matches!(err, TokenError::InsufficientBalance { .. }),
                "unexpected error at step {step}: {err}"
            );
        }
        assert_eq!(
            token.sum_of_balances(),
            token.total_supply(),
            "conservation broken at step {step}"
        );
    }

    assert!(token.exponent() > 0, "seeded run must include supply increases");
    assert_conserved(&token, &accounts);
}
