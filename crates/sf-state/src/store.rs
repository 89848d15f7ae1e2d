//! Balance stores

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};

/// Persistence gateway for the player balance
pub trait BalanceStore {
    /// Read the saved balance
    fn load(&self) -> StateResult<u64>;

    /// Replace the saved balance
    fn save(&self, balance: u64) -> StateResult<()>;
}

/// On-disk shape
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct SavedBalance {
    balance: Option<u64>,
}

/// Balance stored as `{"balance": n}` in a JSON file
#[derive(Debug, Clone)]
pub struct JsonBalanceStore {
    path: PathBuf,
}

impl JsonBalanceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the standard location
    pub fn at_default_path() -> Self {
        Self::new(Self::default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get default save file path
    pub fn default_path() -> PathBuf {
        let base = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .map(|h| h.join("Library/Application Support/SlotForge"))
                .unwrap_or_else(|| PathBuf::from("."))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("SlotForge"))
                .unwrap_or_else(|| PathBuf::from("."))
        } else {
            // Linux/other
            dirs::data_dir()
                .map(|d| d.join("slotforge"))
                .unwrap_or_else(|| PathBuf::from("."))
        };
        base.join("balance.json")
    }
}

impl BalanceStore for JsonBalanceStore {
    fn load(&self) -> StateResult<u64> {
        let content = fs::read_to_string(&self.path)?;
        let saved: SavedBalance = serde_json::from_str(&content)?;
        saved.balance.ok_or(StateError::MissingBalance)
    }

    fn save(&self, balance: u64) -> StateResult<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&SavedBalance {
            balance: Some(balance),
        })?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-memory store
#[derive(Debug, Default)]
pub struct MemoryBalanceStore {
    balance: Mutex<Option<u64>>,
}

impl MemoryBalanceStore {
    /// Empty store (loads fail with `MissingBalance`)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_balance(balance: u64) -> Self {
        Self {
            balance: Mutex::new(Some(balance)),
        }
    }
}

impl BalanceStore for MemoryBalanceStore {
    fn load(&self) -> StateResult<u64> {
        (*self.balance.lock()).ok_or(StateError::MissingBalance)
    }

    fn save(&self, balance: u64) -> StateResult<()> {
        *self.balance.lock() = Some(balance);
        Ok(())
    }
}

/// Saved balance, or `default` when nothing usable is stored
pub fn load_balance_or(store: &dyn BalanceStore, default: u64) -> u64 {
    match store.load() {
        Ok(balance) => balance,
        Err(StateError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("No saved balance, starting with {}", default);
            default
        }
        Err(e) => {
            log::warn!("Could not load balance ({}), starting with {}", e, default);
            default
        }
    }
}

/// Save the balance, logging instead of failing
pub fn save_balance(store: &dyn BalanceStore, balance: u64) -> bool {
    match store.save(balance) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Could not save balance {}: {}", balance, e);
            false
        }
    }
}
