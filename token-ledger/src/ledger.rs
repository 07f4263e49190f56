//! In-memory token ledger
//!
//! Owns the balance map and the total supply counter. Every mutation is
//! computed in full against the current state before anything is written,
//! so an operation either applies completely or leaves the ledger untouched.
//!
//! Balances are arbitrary-precision integers; nothing saturates or wraps.
//!
//! # Journal
//!
//! Retention of applied events is opt-in ([`Ledger::with_journal`]). When the
//! journal reaches its capacity, the current state becomes the new checkpoint
//! and the journal starts over, so memory stays bounded. A checkpoint plus the
//! events after it is enough for [`Ledger::replay`].
//!
//! # Example
//!
//! ```
//! use num_bigint::BigUint;
//! use token_ledger::{AccountId, Ledger};
//!
//! # fn main() -> token_ledger::Result<()> {
//! let treasury = AccountId::new("ST1");
//! let merchant = AccountId::new("ST2");
//!
//! let mut ledger = Ledger::new(treasury.clone(), 1_000_000_000u64)?;
//! ledger.transfer(&treasury, &merchant, 1000)?;
//!
//! assert_eq!(ledger.balance_of(&merchant), BigUint::from(1000u32));
//! assert_eq!(ledger.total_supply(), BigUint::from(1_000_000_000u64));
//! # Ok(())
//! # }
//! ```

use crate::{
    types::{amount_from_decimal, validate_amount, AccountId, Balance, EventKind, LedgerEvent, LedgerSnapshot},
    Config, Error, Result,
};
use num_bigint::BigInt;
use std::collections::HashMap;

/// Token ledger
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Account balances; a missing entry means zero
    balances: HashMap<AccountId, Balance>,

    /// Sum of all balances
    total_supply: Balance,

    /// Sequence the next applied event receives (genesis took 0)
    next_sequence: u64,

    /// Applied events since the checkpoint
    journal: Vec<LedgerEvent>,

    /// Maximum journal length; zero disables retention
    journal_capacity: usize,

    /// State right before the first journaled event
    checkpoint: Option<LedgerSnapshot>,
}

/// Fully computed effect of an event, ready to be written
struct Plan {
    writes: Vec<(AccountId, Balance)>,
    total_supply: Balance,
}

impl Ledger {
    /// Create a ledger with `initial_supply` credited to `treasury`.
    ///
    /// The journal is disabled; see [`Ledger::with_journal`].
    pub fn new(treasury: impl Into<AccountId>, initial_supply: impl Into<BigInt>) -> Result<Self> {
        let treasury = treasury.into();
        let supply = validate_amount(&initial_supply.into())?;

        let mut balances = HashMap::new();
        balances.insert(treasury.clone(), supply.clone());

        tracing::info!(treasury = %treasury, supply = %supply, "Ledger initialized");

        Ok(Self {
            balances,
            total_supply: supply,
            next_sequence: 1,
            journal: Vec::new(),
            journal_capacity: 0,
            checkpoint: None,
        })
    }

    /// Create a ledger from the genesis and journal sections of the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let supply = amount_from_decimal(config.genesis.initial_supply)?;
        Ok(Self::new(config.genesis.treasury.clone(), supply)?.with_journal(config.journal.capacity))
    }

    /// Keep up to `capacity` applied events in memory.
    ///
    /// The current state becomes the checkpoint. A capacity of zero turns the
    /// journal off and drops anything retained so far.
    pub fn with_journal(mut self, capacity: usize) -> Self {
        self.journal_capacity = capacity;
        self.journal = Vec::new();
        self.checkpoint = if capacity > 0 {
            Some(self.snapshot())
        } else {
            None
        };
        self
    }

    /// Rebuild a ledger from a checkpoint and the events applied after it.
    ///
    /// Each event is validated exactly as the live operation would be, and the
    /// recorded post-event supply must match the recomputed one. The rebuilt
    /// ledger has its journal disabled.
    pub fn replay<'a, I>(checkpoint: &LedgerSnapshot, events: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a LedgerEvent>,
    {
        let mut ledger = Self {
            balances: checkpoint
                .balances
                .iter()
                .map(|(account, balance)| (account.clone(), balance.clone()))
                .collect(),
            total_supply: checkpoint.total_supply.clone(),
            next_sequence: checkpoint.sequence + 1,
            journal: Vec::new(),
            journal_capacity: 0,
            checkpoint: None,
        };

        ledger
            .check_conservation()
            .map_err(|e| Error::InvalidEvent(format!("Checkpoint is inconsistent: {}", e)))?;

        for event in events {
            if event.sequence != ledger.next_sequence {
                return Err(Error::InvalidEvent(format!(
                    "Sequence gap: expected {}, found {}",
                    ledger.next_sequence, event.sequence
                )));
            }

            let plan = ledger.plan(&event.kind).map_err(|e| {
                Error::InvalidEvent(format!("Event {} rejected on replay: {}", event.sequence, e))
            })?;

            if plan.total_supply != event.total_supply {
                return Err(Error::InvalidEvent(format!(
                    "Event {} records supply {}, replay computed {}",
                    event.sequence, event.total_supply, plan.total_supply
                )));
            }

            ledger.commit(event.clone(), plan);
        }

        Ok(ledger)
    }

    // Queries

    /// Balance of `account`, zero if it was never credited
    pub fn balance_of(&self, account: &AccountId) -> Balance {
        self.balances.get(account).cloned().unwrap_or_default()
    }

    /// Current total supply
    pub fn total_supply(&self) -> Balance {
        self.total_supply.clone()
    }

    /// Events applied since the checkpoint (empty when the journal is off)
    pub fn events(&self) -> &[LedgerEvent] {
        &self.journal
    }

    /// State right before the first retained event
    pub fn checkpoint(&self) -> Option<&LedgerSnapshot> {
        self.checkpoint.as_ref()
    }

    /// Sequence of the last applied event
    pub fn sequence(&self) -> u64 {
        self.next_sequence - 1
    }

    /// Number of accounts with an entry
    pub fn account_count(&self) -> usize {
        self.balances.len()
    }

    /// Point-in-time copy of balances and supply
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            balances: self
                .balances
                .iter()
                .map(|(account, balance)| (account.clone(), balance.clone()))
                .collect(),
            total_supply: self.total_supply.clone(),
            sequence: self.sequence(),
        }
    }

    // Operations

    /// Move `amount` from `from` to `to`
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: impl Into<BigInt>,
    ) -> Result<LedgerEvent> {
        let amount = Self::checked_amount("transfer", amount.into())?;
        self.execute(EventKind::Transfer {
            from: from.clone(),
            to: to.clone(),
            amount,
        })
    }

    /// Credit `amount` of new tokens to `recipient`
    pub fn mint(&mut self, recipient: &AccountId, amount: impl Into<BigInt>) -> Result<LedgerEvent> {
        let amount = Self::checked_amount("mint", amount.into())?;
        self.execute(EventKind::Mint {
            recipient: recipient.clone(),
            amount,
        })
    }

    /// Destroy `amount` tokens held by `holder`.
    ///
    /// Any holder may be burned from; restricting who can call this is up to
    /// the caller (see [`crate::authority::BurnAuthority`]).
    pub fn burn(&mut self, holder: &AccountId, amount: impl Into<BigInt>) -> Result<LedgerEvent> {
        let amount = Self::checked_amount("burn", amount.into())?;
        self.execute(EventKind::Burn {
            holder: holder.clone(),
            amount,
        })
    }

    /// Verify that the total supply equals the sum of all balances
    pub fn check_conservation(&self) -> Result<()> {
        let sum: Balance = self.balances.values().sum();

        if sum != self.total_supply {
            return Err(Error::InvariantViolation(format!(
                "Sum of balances {} != total supply {}",
                sum, self.total_supply
            )));
        }

        Ok(())
    }

    // Internals

    fn checked_amount(op: &'static str, amount: BigInt) -> Result<Balance> {
        validate_amount(&amount).map_err(|e| {
            tracing::warn!(op, amount = %amount, error = %e, "Ledger operation rejected");
            e
        })
    }

    fn execute(&mut self, kind: EventKind) -> Result<LedgerEvent> {
        let plan = match self.plan(&kind) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(op = kind.label(), amount = %kind.amount(), error = %e, "Ledger operation rejected");
                return Err(e);
            }
        };

        let event = LedgerEvent::new(self.next_sequence, kind, plan.total_supply.clone());
        Ok(self.commit(event, plan))
    }

    /// Compute the effect of `kind` without touching state
    fn plan(&self, kind: &EventKind) -> Result<Plan> {
        match kind {
            EventKind::Transfer { from, to, amount } => {
                let available = self.debit(from, amount)?;
                if from == to {
                    return Ok(Plan {
                        writes: Vec::new(),
                        total_supply: self.total_supply.clone(),
                    });
                }
                let credited = self.balance_of(to) + amount;
                Ok(Plan {
                    writes: vec![(from.clone(), available - amount), (to.clone(), credited)],
                    total_supply: self.total_supply.clone(),
                })
            }

            EventKind::Mint { recipient, amount } => Ok(Plan {
                writes: vec![(recipient.clone(), self.balance_of(recipient) + amount)],
                total_supply: &self.total_supply + amount,
            }),

            EventKind::Burn { holder, amount } => {
                let available = self.debit(holder, amount)?;
                if &self.total_supply < amount {
                    return Err(Error::InvariantViolation(
                        "Burn exceeds total supply".to_string(),
                    ));
                }
                Ok(Plan {
                    writes: vec![(holder.clone(), available - amount)],
                    total_supply: &self.total_supply - amount,
                })
            }
        }
    }

    /// Current balance of `account` if it covers `amount`
    fn debit(&self, account: &AccountId, amount: &Balance) -> Result<Balance> {
        let available = self.balance_of(account);
        if &available < amount {
            return Err(Error::InsufficientFunds {
                account: account.clone(),
                available,
                requested: amount.clone(),
            });
        }
        Ok(available)
    }

    fn commit(&mut self, event: LedgerEvent, plan: Plan) -> LedgerEvent {
        if self.journal_capacity > 0 && self.journal.len() >= self.journal_capacity {
            self.checkpoint = Some(self.snapshot());
            self.journal.clear();
            tracing::debug!(sequence = self.sequence(), "Journal folded into checkpoint");
        }

        for (account, balance) in plan.writes {
            self.balances.insert(account, balance);
        }
        self.total_supply = plan.total_supply;
        self.next_sequence += 1;

        debug_assert!(self.check_conservation().is_ok());

        tracing::debug!(
            op = event.kind.label(),
            amount = %event.kind.amount(),
            sequence = event.sequence,
            supply = %event.total_supply,
            "Ledger event applied"
        );

        if self.journal_capacity > 0 {
            self.journal.push(event.clone());
        }
        event
    }
}
