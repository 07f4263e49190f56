//! Actor-based concurrency for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One task owns the [`Ledger`]; callers never touch it directly
//! - Messages are applied one at a time, giving a total order of operations
//! - Bounded mailbox for backpressure
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │          Callers (payment flows, API handlers)        │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │               LedgerHandle (Clone)                    │
//! │         Sends messages to actor mailbox              │
//! └─────────────────────┬────────────────────────────────┘
//!                       │
//!                       │ mpsc::channel (bounded)
//!                       ▼
//! ┌──────────────────────────────────────────────────────┐
//! │              LedgerActor (Single Task)                │
//! │     Ledger::transfer / mint / burn / balance_of      │
//! │          replies via oneshot, records metrics        │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::types::{AccountId, Balance, LedgerEvent, LedgerSnapshot};
use crate::{metrics::Metrics, Error, Ledger, Result};
use num_bigint::BigInt;
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ledger actor
pub enum LedgerMessage {
    /// Read a balance
    BalanceOf {
        /// Account to look up
        account: AccountId,
        /// Reply channel
        response: oneshot::Sender<Balance>,
    },

    /// Read the total supply
    TotalSupply {
        /// Reply channel
        response: oneshot::Sender<Balance>,
    },

    /// Transfer between accounts
    Transfer {
        /// Debited account
        from: AccountId,
        /// Credited account
        to: AccountId,
        /// Requested amount, validated by the ledger
        amount: BigInt,
        /// Reply channel
        response: oneshot::Sender<Result<LedgerEvent>>,
    },

    /// Mint to a recipient
    Mint {
        /// Credited account
        recipient: AccountId,
        /// Requested amount, validated by the ledger
        amount: BigInt,
        /// Reply channel
        response: oneshot::Sender<Result<LedgerEvent>>,
    },

    /// Burn from a holder
    Burn {
        /// Debited account
        holder: AccountId,
        /// Requested amount, validated by the ledger
        amount: BigInt,
        /// Reply channel
        response: oneshot::Sender<Result<LedgerEvent>>,
    },

    /// Take a snapshot
    Snapshot {
        /// Reply channel
        response: oneshot::Sender<LedgerSnapshot>,
    },

    /// Run the conservation check
    CheckConservation {
        /// Reply channel
        response: oneshot::Sender<Result<()>>,
    },

    /// Stop the actor and hand the ledger back
    Shutdown {
        /// Receives the final ledger
        response: oneshot::Sender<Ledger>,
    },
}

/// Actor that owns the ledger
pub struct LedgerActor {
    /// Ledger state
    ledger: Ledger,

    /// Mailbox for incoming messages
    mailbox: mpsc::Receiver<LedgerMessage>,

    /// Metrics collector
    metrics: Metrics,
}

impl LedgerActor {
    /// Create new actor
    pub fn new(ledger: Ledger, mailbox: mpsc::Receiver<LedgerMessage>, metrics: Metrics) -> Self {
        Self {
            ledger,
            mailbox,
            metrics,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        self.metrics.set_total_supply(&self.ledger.total_supply());

        while let Some(msg) = self.mailbox.recv().await {
            match msg {
                LedgerMessage::Shutdown { response } => {
                    tracing::info!(sequence = self.ledger.sequence(), "Ledger actor shutting down");
                    if response.send(self.ledger).is_err() {
                        tracing::error!("Shutdown requester went away before receiving the ledger");
                    }
                    return;
                }
                other => self.handle_message(other),
            }
        }

        tracing::info!("Ledger mailbox closed, actor stopped");
    }

    /// Handle a single message
    fn handle_message(&mut self, msg: LedgerMessage) {
        match msg {
            LedgerMessage::BalanceOf { account, response } => {
                let _ = response.send(self.ledger.balance_of(&account));
            }

            LedgerMessage::TotalSupply { response } => {
                let _ = response.send(self.ledger.total_supply());
            }

            LedgerMessage::Transfer {
                from,
                to,
                amount,
                response,
            } => {
                let result = self.ledger.transfer(&from, &to, amount);
                self.reply(result, response);
            }

            LedgerMessage::Mint {
                recipient,
                amount,
                response,
            } => {
                let result = self.ledger.mint(&recipient, amount);
                self.reply(result, response);
            }

            LedgerMessage::Burn {
                holder,
                amount,
                response,
            } => {
                let result = self.ledger.burn(&holder, amount);
                self.reply(result, response);
            }

            LedgerMessage::Snapshot { response } => {
                let _ = response.send(self.ledger.snapshot());
            }

            LedgerMessage::CheckConservation { response } => {
                let result = self.ledger.check_conservation();
                if let Err(ref e) = result {
                    tracing::error!("Conservation check failed: {}", e);
                }
                let _ = response.send(result);
            }

            LedgerMessage::Shutdown { .. } => {
                // Handled in main loop
            }
        }
    }

    fn reply(&self, result: Result<LedgerEvent>, response: oneshot::Sender<Result<LedgerEvent>>) {
        match &result {
            Ok(event) => self.metrics.record_event(event),
            Err(e) if e.is_rejection() => self.metrics.record_rejection(),
            Err(e) => tracing::error!("Ledger operation failed: {}", e),
        }

        if response.send(result).is_err() {
            tracing::debug!("Caller dropped before receiving ledger reply");
        }
    }
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<LedgerMessage>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> LedgerMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Balance of `account`
    pub async fn balance_of(&self, account: AccountId) -> Result<Balance> {
        self.request(|response| LedgerMessage::BalanceOf { account, response })
            .await
    }

    /// Current total supply
    pub async fn total_supply(&self) -> Result<Balance> {
        self.request(|response| LedgerMessage::TotalSupply { response })
            .await
    }

    /// Transfer `amount` from `from` to `to`
    pub async fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: impl Into<BigInt>,
    ) -> Result<LedgerEvent> {
        let amount = amount.into();
        self.request(|response| LedgerMessage::Transfer {
            from,
            to,
            amount,
            response,
        })
        .await?
    }

    /// Mint `amount` to `recipient`
    pub async fn mint(&self, recipient: AccountId, amount: impl Into<BigInt>) -> Result<LedgerEvent> {
        let amount = amount.into();
        self.request(|response| LedgerMessage::Mint {
            recipient,
            amount,
            response,
        })
        .await?
    }

    /// Burn `amount` from `holder`
    pub async fn burn(&self, holder: AccountId, amount: impl Into<BigInt>) -> Result<LedgerEvent> {
        let amount = amount.into();
        self.request(|response| LedgerMessage::Burn {
            holder,
            amount,
            response,
        })
        .await?
    }

    /// Snapshot of balances and supply
    pub async fn snapshot(&self) -> Result<LedgerSnapshot> {
        self.request(|response| LedgerMessage::Snapshot { response })
            .await
    }

    /// Run the conservation check inside the actor
    pub async fn check_conservation(&self) -> Result<()> {
        self.request(|response| LedgerMessage::CheckConservation { response })
            .await?
    }

    /// Shutdown actor, returning the final ledger
    pub async fn shutdown(&self) -> Result<Ledger> {
        self.request(|response| LedgerMessage::Shutdown { response })
            .await
    }
}

/// Spawn the ledger actor
pub fn spawn_ledger_actor(ledger: Ledger, mailbox_capacity: usize, metrics: Metrics) -> LedgerHandle {
    // Bounded channel for backpressure
    let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
    let actor = LedgerActor::new(ledger, rx, metrics);

    tokio::spawn(async move {
        actor.run().await;
    });

    LedgerHandle::new(tx)
}
