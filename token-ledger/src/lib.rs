//! Token Ledger
//!
//! In-memory fungible-token ledger: account balances, a total supply counter,
//! and the transfer / mint / burn operations that move between valid states.
//!
//! # Architecture
//!
//! - **Owned state**: a [`Ledger`] is a plain value; a fresh instance is a fresh ledger
//! - **All-or-nothing**: every operation is planned in full before any write
//! - **Journal**: opt-in, bounded record of applied [`LedgerEvent`]s behind a rolling checkpoint
//! - **Unbounded amounts**: balances are arbitrary-precision integers ([`Balance`])
//! - **Single Writer**: concurrent callers go through one actor task ([`actor`])
//!
//! # Invariants
//!
//! - Supply conservation: Σ(balances) == total supply after every operation
//! - Non-negativity: no balance and no supply value is ever negative
//! - Deterministic replay: same checkpoint + journal → same balances
//! - Linearizable: operations through the actor apply in one total order

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod types;
pub mod ledger;
pub mod authority;
pub mod error;
pub mod actor;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{AccountId, Balance, EventKind, LedgerEvent, LedgerSnapshot};
pub use ledger::Ledger;
pub use authority::BurnAuthority;
pub use actor::{spawn_ledger_actor, LedgerHandle};
pub use config::Config;
pub use metrics::Metrics;
