//! Metrics collection for observability
//!
//! This module provides Prometheus metrics for monitoring the ledger.
//!
//! # Metrics
//!
//! - `ledger_transfers_total` - Total number of applied transfers
//! - `ledger_mints_total` - Total number of applied mints
//! - `ledger_burns_total` - Total number of applied burns
//! - `ledger_rejections_total` - Operations rejected (insufficient funds, invalid amount)
//! - `ledger_total_supply` - Current total supply

use crate::types::{Balance, EventKind, LedgerEvent};
use num_traits::ToPrimitive;
use prometheus::{Gauge, IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Applied transfers
    pub transfers_total: IntCounter,

    /// Applied mints
    pub mints_total: IntCounter,

    /// Applied burns
    pub burns_total: IntCounter,

    /// Rejected operations
    pub rejections_total: IntCounter,

    /// Current total supply
    pub total_supply: Gauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector with its own registry
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let transfers_total =
            IntCounter::new("ledger_transfers_total", "Total number of applied transfers")?;
        registry.register(Box::new(transfers_total.clone()))?;

        let mints_total = IntCounter::new("ledger_mints_total", "Total number of applied mints")?;
        registry.register(Box::new(mints_total.clone()))?;

        let burns_total = IntCounter::new("ledger_burns_total", "Total number of applied burns")?;
        registry.register(Box::new(burns_total.clone()))?;

        let rejections_total = IntCounter::new(
            "ledger_rejections_total",
            "Total number of rejected ledger operations",
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let total_supply = Gauge::new("ledger_total_supply", "Current total token supply")?;
        registry.register(Box::new(total_supply.clone()))?;

        Ok(Self {
            transfers_total,
            mints_total,
            burns_total,
            rejections_total,
            total_supply,
            registry,
        })
    }

    /// Record an applied event
    pub fn record_event(&self, event: &LedgerEvent) {
        match event.kind {
            EventKind::Transfer { .. } => self.transfers_total.inc(),
            EventKind::Mint { .. } => self.mints_total.inc(),
            EventKind::Burn { .. } => self.burns_total.inc(),
        }
        self.set_total_supply(&event.total_supply);
    }

    /// Update the supply gauge (saturates at `f64::MAX`)
    pub fn set_total_supply(&self, supply: &Balance) {
        self.total_supply.set(supply.to_f64().unwrap_or(f64::MAX));
    }

    /// Record a rejected operation
    pub fn record_rejection(&self) {
        self.rejections_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}
