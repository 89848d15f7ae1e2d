//! Symbol definitions and the symbol catalog

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};

/// Symbol id, stable across a configuration
pub type SymbolId = u32;

/// Symbol type classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SymbolKind {
    /// Regular paying symbol
    Regular = 0,
    /// Wild - substitutes for any other symbol on a payline
    Wild = 1,
}

/// A symbol definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    /// Unique symbol ID
    pub id: SymbolId,
    /// Symbol name (e.g., "cherry", "seven", "wild")
    pub name: String,
    /// Display glyph
    pub glyph: String,
    /// Relative draw weight (0 = never drawn)
    pub weight: u32,
    /// Payout rank (higher = better). Picks the target of an all-wild line.
    pub rank: u32,
    /// Symbol type
    pub kind: SymbolKind,
}

impl Symbol {
    /// Create a regular symbol
    pub fn regular(
        id: SymbolId,
        name: impl Into<String>,
        glyph: impl Into<String>,
        weight: u32,
        rank: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            glyph: glyph.into(),
            weight,
            rank,
            kind: SymbolKind::Regular,
        }
    }

    /// Create a wild symbol
    pub fn wild(id: SymbolId, name: impl Into<String>, glyph: impl Into<String>, weight: u32) -> Self {
        Self {
            id,
            name: name.into(),
            glyph: glyph.into(),
            weight,
            rank: 0,
            kind: SymbolKind::Wild,
        }
    }

    pub fn is_wild(&self) -> bool {
        self.kind == SymbolKind::Wild
    }
}

/// Validated, immutable symbol set
///
/// Declaration order is significant: it is the order of the cumulative weight
/// table and the tie-break for equal ranks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolCatalog {
    symbols: Vec<Symbol>,
    wild_id: SymbolId,
    best_id: SymbolId,
    total_weight: u64,
}

impl SymbolCatalog {
    /// Validate a symbol list into a catalog
    ///
    /// Requires: at least one symbol, unique ids and names, exactly one wild,
    /// at least one regular symbol, and a positive total weight.
    pub fn new(symbols: Vec<Symbol>) -> SlotResult<Self> {
        if symbols.is_empty() {
            return Err(SlotError::config("symbol catalog is empty"));
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for symbol in &symbols {
            if !ids.insert(symbol.id) {
                return Err(SlotError::config(format!("duplicate symbol id {}", symbol.id)));
            }
            if !names.insert(symbol.name.as_str()) {
                return Err(SlotError::config(format!(
                    "duplicate symbol name '{}'",
                    symbol.name
                )));
            }
        }

        let mut wilds = symbols.iter().filter(|s| s.is_wild());
        let wild_id = match (wilds.next(), wilds.next()) {
            (Some(wild), None) => wild.id,
            (None, _) => return Err(SlotError::config("catalog has no wild symbol")),
            (Some(_), Some(_)) => {
                return Err(SlotError::config("catalog has more than one wild symbol"));
            }
        };

        // Highest rank wins, earliest declaration breaks ties
        let best_id = symbols
            .iter()
            .filter(|s| !s.is_wild())
            .fold(None::<&Symbol>, |best, s| match best {
                Some(b) if b.rank >= s.rank => Some(b),
                _ => Some(s),
            })
            .map(|s| s.id)
            .ok_or_else(|| SlotError::config("catalog has no regular symbols"))?;

        let total_weight: u64 = symbols.iter().map(|s| s.weight as u64).sum();
        if total_weight == 0 {
            return Err(SlotError::config("total symbol weight must be positive"));
        }

        Ok(Self {
            symbols,
            wild_id,
            best_id,
            total_weight,
        })
    }

    /// All symbols in declaration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Get symbol by ID
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.id == id)
    }

    /// Get symbol by name
    pub fn by_name(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    /// Wild symbol ID
    pub fn wild_id(&self) -> SymbolId {
        self.wild_id
    }

    pub fn is_wild(&self, id: SymbolId) -> bool {
        id == self.wild_id
    }

    /// Highest-ranked regular symbol (target of an all-wild line)
    pub fn best_id(&self) -> SymbolId {
        self.best_id
    }

    /// All regular symbol IDs in declaration order
    pub fn regular_ids(&self) -> Vec<SymbolId> {
        self.symbols
            .iter()
            .filter(|s| !s.is_wild())
            .map(|s| s.id)
            .collect()
    }

    /// Sum of all draw weights
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    /// Marginal draw probability of a symbol
    pub fn probability(&self, id: SymbolId) -> f64 {
        self.get(id)
            .map(|s| s.weight as f64 / self.total_weight as f64)
            .unwrap_or(0.0)
    }

    /// Display glyph for an id ("?" for unknown ids)
    pub fn glyph(&self, id: SymbolId) -> &str {
        self.get(id).map(|s| s.glyph.as_str()).unwrap_or("?")
    }

    /// Display name for an id ("?" for unknown ids)
    pub fn name(&self, id: SymbolId) -> &str {
        self.get(id).map(|s| s.name.as_str()).unwrap_or("?")
    }
}
