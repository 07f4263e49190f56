//! Property-based tests for ledger invariants
//!
//! These tests use proptest to verify critical invariants:
//! - Supply conservation: Σ(balances) == total supply
//! - Non-negativity: balances and supply never go below zero
//! - Atomicity: a rejected operation changes nothing
//! - Deterministic replay: checkpoint + journal → same state

use num_bigint::{BigInt, BigUint};
use proptest::prelude::*;
use rust_decimal::Decimal;
use token_ledger::{
    spawn_ledger_actor, types::amount_from_decimal, AccountId, Balance, BurnAuthority, Error,
    Ledger, LedgerEvent, Metrics,
};

const INITIAL_SUPPLY: u64 = 1_000_000_000;

fn treasury() -> AccountId {
    AccountId::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM")
}

fn account(index: usize) -> AccountId {
    if index == 0 {
        treasury()
    } else {
        AccountId::new(format!("ST{}PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM", index + 1))
    }
}

fn tokens(n: u64) -> Balance {
    Balance::from(n)
}

/// Create test ledger with the whole supply on the treasury
fn create_test_ledger() -> Ledger {
    Ledger::new(treasury(), INITIAL_SUPPLY).unwrap()
}

#[derive(Debug, Clone)]
enum Op {
    Transfer(usize, usize, BigInt),
    Mint(usize, BigInt),
    Burn(usize, BigInt),
}

impl Op {
    fn apply(&self, ledger: &mut Ledger) -> token_ledger::Result<LedgerEvent> {
        match self {
            Op::Transfer(from, to, amount) => {
                ledger.transfer(&account(*from), &account(*to), amount.clone())
            }
            Op::Mint(recipient, amount) => ledger.mint(&account(*recipient), amount.clone()),
            Op::Burn(holder, amount) => ledger.burn(&account(*holder), amount.clone()),
        }
    }
}

/// Strategy for amounts, mostly valid with some negatives and some far past u64
fn amount_strategy() -> impl Strategy<Value = BigInt> {
    prop_oneof![
        8 => (0u64..2_000_000u64).prop_map(BigInt::from),
        1 => (1u64..1_000_000_000_000u64).prop_map(BigInt::from),
        1 => (-1_000i64..0i64).prop_map(BigInt::from),
        1 => any::<u128>().prop_map(|n| BigInt::from(n) * BigInt::from(u64::MAX)),
    ]
}

/// Strategy for account indices (0 is the treasury)
fn account_strategy() -> impl Strategy<Value = usize> {
    0usize..5
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (account_strategy(), account_strategy(), amount_strategy())
            .prop_map(|(from, to, amount)| Op::Transfer(from, to, amount)),
        1 => (account_strategy(), amount_strategy())
            .prop_map(|(recipient, amount)| Op::Mint(recipient, amount)),
        2 => (account_strategy(), amount_strategy())
            .prop_map(|(holder, amount)| Op::Burn(holder, amount)),
    ]
}

fn sum_of_balances(ledger: &Ledger) -> Balance {
    (0..5).map(|i| ledger.balance_of(&account(i))).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Property: total supply always equals the sum of balances
    #[test]
    fn prop_supply_conservation(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut ledger = create_test_ledger();

        for op in &ops {
            let _ = op.apply(&mut ledger);
            prop_assert_eq!(sum_of_balances(&ledger), ledger.total_supply());
            prop_assert!(ledger.check_conservation().is_ok());
        }
    }

    /// Property: balances never exceed the supply (Balance itself cannot go negative)
    #[test]
    fn prop_balances_bounded_by_supply(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut ledger = create_test_ledger();

        for op in &ops {
            let _ = op.apply(&mut ledger);
            for i in 0..5 {
                prop_assert!(ledger.balance_of(&account(i)) <= ledger.total_supply());
            }
        }
    }

    /// Property: a rejected operation leaves balances, supply and journal untouched
    #[test]
    fn prop_rejected_ops_are_noops(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let mut ledger = create_test_ledger().with_journal(16);

        for op in &ops {
            let before = ledger.snapshot();
            let events_before = ledger.events().to_vec();

            match op.apply(&mut ledger) {
                Ok(event) => {
                    prop_assert_eq!(event.sequence, before.sequence + 1);
                }
                Err(e) => {
                    prop_assert!(e.is_rejection());
                    prop_assert_eq!(ledger.snapshot(), before);
                    prop_assert_eq!(ledger.events(), &events_before[..]);
                }
            }
        }
    }

    /// Property: insufficient funds is reported exactly when the balance is too low
    #[test]
    fn prop_insufficient_funds_boundary(
        from in account_strategy(),
        to in account_strategy(),
        amount in amount_strategy(),
    ) {
        let mut ledger = create_test_ledger();
        let available = ledger.balance_of(&account(from));

        let result = ledger.transfer(&account(from), &account(to), amount.clone());

        match (amount.to_biguint(), result) {
            (Some(requested), Ok(_)) => prop_assert!(available >= requested),
            (Some(expected), Err(Error::InsufficientFunds { available: reported, requested, .. })) => {
                prop_assert!(available < expected);
                prop_assert_eq!(reported, available);
                prop_assert_eq!(requested, expected);
            }
            (None, Err(Error::InvalidAmount(_))) => {}
            (_, other) => prop_assert!(false, "unexpected outcome: {:?}", other),
        }
    }

    /// Property: decimal amounts reach the ledger in canonical form or not at all
    #[test]
    fn prop_decimal_amounts_canonical(mantissa in -1_000_000i64..1_000_000i64, scale in 0u32..6) {
        let amount = Decimal::new(mantissa, scale);

        match amount_from_decimal(amount) {
            Ok(whole) => {
                prop_assert!(amount.fract().is_zero());
                prop_assert_eq!(whole.to_string(), amount.normalize().to_string());
            }
            Err(e) => {
                prop_assert!(matches!(e, Error::InvalidAmount(_)));
                prop_assert!(!amount.fract().is_zero());
            }
        }
    }

    /// Property: balance queries are stable without intervening mutation
    #[test]
    fn prop_balance_query_idempotent(
        ops in prop::collection::vec(op_strategy(), 0..30),
        index in account_strategy(),
    ) {
        let mut ledger = create_test_ledger();
        for op in &ops {
            let _ = op.apply(&mut ledger);
        }

        let first = ledger.balance_of(&account(index));
        let second = ledger.balance_of(&account(index));
        prop_assert_eq!(first, second);
        prop_assert_eq!(ledger.balance_of(&AccountId::new("never-credited")), tokens(0));
    }

    /// Property: checkpoint plus retained journal reproduces the ledger
    #[test]
    fn prop_deterministic_replay(
        ops in prop::collection::vec(op_strategy(), 1..40),
        capacity in 1usize..50,
    ) {
        let mut ledger = create_test_ledger().with_journal(capacity);
        for op in &ops {
            let _ = op.apply(&mut ledger);
            prop_assert!(ledger.events().len() <= capacity);
        }

        let checkpoint = ledger.checkpoint().unwrap();
        let replayed = Ledger::replay(checkpoint, ledger.events()).unwrap();
        prop_assert_eq!(replayed.snapshot(), ledger.snapshot());
    }
}

#[cfg(test)]
mod integration_tests {
    use super::*;

    fn buyer() -> AccountId {
        treasury()
    }

    fn seller() -> AccountId {
        AccountId::new("ST2PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM")
    }

    fn broke() -> AccountId {
        AccountId::new("ST3PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM")
    }

    #[test]
    fn test_transfer_moves_tokens() {
        let mut ledger = create_test_ledger();
        let initial_buyer = ledger.balance_of(&buyer());
        let initial_seller = ledger.balance_of(&seller());

        let event = ledger.transfer(&buyer(), &seller(), 1000).unwrap();
        assert_eq!(event.total_supply, tokens(INITIAL_SUPPLY));

        assert_eq!(ledger.balance_of(&buyer()), initial_buyer - tokens(1000));
        assert_eq!(ledger.balance_of(&buyer()), tokens(999_999_000));
        assert_eq!(ledger.balance_of(&seller()), initial_seller + tokens(1000));
        assert_eq!(ledger.total_supply(), tokens(INITIAL_SUPPLY));
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let mut ledger = create_test_ledger();
        let initial_seller = ledger.balance_of(&seller());

        let err = ledger.transfer(&broke(), &seller(), 1000).unwrap_err();

        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert_eq!(err.code(), 500);
        assert_eq!(ledger.balance_of(&broke()), tokens(0));
        assert_eq!(ledger.balance_of(&seller()), initial_seller);
        assert_eq!(ledger.total_supply(), tokens(INITIAL_SUPPLY));
    }

    #[test]
    fn test_mint_to_recipient() {
        let mut ledger = create_test_ledger();
        let initial_balance = ledger.balance_of(&seller());
        let initial_supply = ledger.total_supply();

        ledger.mint(&seller(), 5000).unwrap();

        assert_eq!(ledger.balance_of(&seller()), initial_balance + tokens(5000));
        assert_eq!(ledger.total_supply(), initial_supply + tokens(5000));
    }

    #[test]
    fn test_burn_from_sender() {
        let mut ledger = create_test_ledger();
        let authority = BurnAuthority::new(treasury());
        let initial_balance = ledger.balance_of(&treasury());
        let initial_supply = ledger.total_supply();

        authority.burn(&mut ledger, &treasury(), 5000).unwrap();

        assert_eq!(ledger.balance_of(&treasury()), initial_balance - tokens(5000));
        assert_eq!(ledger.total_supply(), initial_supply - tokens(5000));
    }

    #[test]
    fn test_burn_more_than_supply() {
        let mut ledger = create_test_ledger();
        let authority = BurnAuthority::new(treasury());
        let amount = BigInt::from(ledger.total_supply() + 1u32);

        let err = authority
            .burn(&mut ledger, &treasury(), amount)
            .unwrap_err();

        assert!(matches!(err, Error::InsufficientFunds { .. }));
        assert_eq!(ledger.balance_of(&treasury()), tokens(INITIAL_SUPPLY));
        assert_eq!(ledger.total_supply(), tokens(INITIAL_SUPPLY));
    }

    #[test]
    fn test_balance_queries() {
        let ledger = create_test_ledger();

        assert_eq!(ledger.balance_of(&treasury()), ledger.total_supply());
        assert_eq!(ledger.balance_of(&broke()), tokens(0));
    }

    #[test]
    fn test_supply_grows_past_u128() {
        let mut ledger = create_test_ledger();
        let large = BigInt::from(u128::MAX);

        ledger.mint(&seller(), large.clone()).unwrap();
        ledger.mint(&seller(), large).unwrap();

        let expected = BigUint::from(u128::MAX) * 2u32;
        assert_eq!(ledger.balance_of(&seller()), expected);
        assert_eq!(ledger.total_supply(), expected + tokens(INITIAL_SUPPLY));
        ledger.check_conservation().unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transfers_through_actor() {
        let ledger = create_test_ledger().with_journal(usize::MAX);
        let handle = spawn_ledger_actor(ledger, 64, Metrics::new().unwrap());

        // Fund four spenders, then let them pay each other concurrently
        for i in 1..5 {
            handle.transfer(treasury(), account(i), 1_000).await.unwrap();
        }

        let mut tasks = Vec::new();
        for i in 1..5 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                let mut applied = 0u32;
                for round in 0..100 {
                    let to = account(1 + (i + round) % 4);
                    if handle.transfer(account(i), to, 37).await.is_ok() {
                        applied += 1;
                    }
                }
                applied
            }));
        }

        for task in tasks {
            task.await.unwrap();
        }

        handle.check_conservation().await.unwrap();
        assert_eq!(handle.total_supply().await.unwrap(), tokens(INITIAL_SUPPLY));

        let ledger = handle.shutdown().await.unwrap();
        let spenders: Balance = (1..5).map(|i| ledger.balance_of(&account(i))).sum();
        assert_eq!(spenders, tokens(4_000));

        let replayed = Ledger::replay(ledger.checkpoint().unwrap(), ledger.events()).unwrap();
        assert_eq!(replayed.snapshot(), ledger.snapshot());
    }

    #[tokio::test]
    async fn test_authorized_burn_through_actor() {
        let handle = spawn_ledger_actor(create_test_ledger(), 16, Metrics::new().unwrap());
        let authority = BurnAuthority::new(treasury());

        let denied = authority.burn_via(&handle, &seller(), 5000).await;
        assert!(matches!(denied, Err(Error::Unauthorized(_))));

        authority.burn_via(&handle, &treasury(), 5000).await.unwrap();
        assert_eq!(
            handle.total_supply().await.unwrap(),
            tokens(INITIAL_SUPPLY - 5000)
        );

        handle.shutdown().await.unwrap();
    }
}
