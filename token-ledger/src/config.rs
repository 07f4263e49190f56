//! Configuration for the ledger

use crate::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Initial distribution
    pub genesis: GenesisConfig,

    /// Actor configuration
    pub actor: ActorConfig,

    /// Journal retention
    pub journal: JournalConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "token-ledger".to_string(),
            genesis: GenesisConfig::default(),
            actor: ActorConfig::default(),
            journal: JournalConfig::default(),
        }
    }
}

/// Genesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenesisConfig {
    /// Account pre-funded with the whole initial supply
    pub treasury: AccountId,

    /// Initial supply (whole tokens; fractional values are rejected at startup)
    pub initial_supply: Decimal,
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            treasury: AccountId::new("ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"),
            initial_supply: Decimal::from(1_000_000_000u64),
        }
    }
}

/// Actor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActorConfig {
    /// Bounded mailbox size (backpressure)
    pub mailbox_capacity: usize,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 1000,
        }
    }
}

/// Journal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Events kept in memory before they are folded into a checkpoint.
    /// Zero disables the journal.
    pub capacity: usize,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self { capacity: 0 }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(name) = std::env::var("LEDGER_SERVICE_NAME") {
            config.service_name = name;
        }

        if let Ok(treasury) = std::env::var("LEDGER_TREASURY") {
            config.genesis.treasury = AccountId::new(treasury);
        }

        if let Ok(supply) = std::env::var("LEDGER_INITIAL_SUPPLY") {
            config.genesis.initial_supply = Decimal::from_str(&supply).map_err(|e| {
                crate::Error::Config(format!("Invalid LEDGER_INITIAL_SUPPLY: {}", e))
            })?;
        }

        if let Ok(capacity) = std::env::var("LEDGER_MAILBOX_CAPACITY") {
            config.actor.mailbox_capacity = capacity.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid LEDGER_MAILBOX_CAPACITY: {}", e))
            })?;
        }

        if let Ok(capacity) = std::env::var("LEDGER_JOURNAL_CAPACITY") {
            config.journal.capacity = capacity.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid LEDGER_JOURNAL_CAPACITY: {}", e))
            })?;
        }

        Ok(config)
    }
}
