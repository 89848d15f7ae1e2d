//! Machine configuration
//!
//! A [`GameDocument`] is the raw JSON/YAML shape. It is validated into a
//! [`GameConfig`] holding the typed catalog, paytable and paylines. The fields
//! stay public, so the engine re-checks how they fit together on construction.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SlotError, SlotResult};
use crate::paytable::{PayTable, Payline, PaylineSet};
use crate::symbols::{Symbol, SymbolCatalog};

/// Default big-win threshold (payout / wager)
pub const DEFAULT_BIG_WIN_RATIO: f64 = 50.0;

/// Grid specification (reels × rows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Number of reels (columns)
    pub reels: usize,
    /// Number of visible rows per reel
    pub rows: usize,
}

impl GridSpec {
    /// Standard 5×3
    pub fn standard_5x3() -> Self {
        Self { reels: 5, rows: 3 }
    }

    /// Total grid positions
    pub fn total_positions(&self) -> usize {
        self.reels * self.rows
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::standard_5x3()
    }
}

/// Allowed bet per line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BetLimits {
    pub min_bet: u64,
    pub max_bet: u64,
}

impl BetLimits {
    pub fn contains(&self, bet: u64) -> bool {
        bet > 0 && (self.min_bet..=self.max_bet).contains(&bet)
    }
}

/// Symbol entry of a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolDef {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub glyph: Option<String>,
    pub weight: u32,
    #[serde(default)]
    pub rank: u32,
    #[serde(default)]
    pub wild: bool,
}

/// Payline entry of a document: one row index per reel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaylineDef {
    #[serde(default)]
    pub name: Option<String>,
    pub rows: Vec<usize>,
}

/// Raw configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameDocument {
    pub grid: GridSpec,
    pub symbols: Vec<SymbolDef>,
    /// Symbol name → multipliers for 3, 4 and 5 of a kind
    pub paytable: BTreeMap<String, Vec<f64>>,
    pub paylines: Vec<PaylineDef>,
    pub default_balance: u64,
    pub min_bet: u64,
    pub max_bet: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_paylines: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub big_win_ratio: Option<f64>,
}

/// Parsing limits for untrusted documents
#[derive(Debug, Clone)]
pub struct ConfigLimits {
    pub max_symbols: usize,
    pub max_paylines: usize,
    pub min_reels: usize,
    pub max_reels: usize,
    pub max_rows: usize,
}

impl Default for ConfigLimits {
    fn default() -> Self {
        Self {
            max_symbols: 64,
            max_paylines: 100,
            min_reels: 3,
            max_reels: 10,
            max_rows: 10,
        }
    }
}

/// Validated machine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub grid: GridSpec,
    pub catalog: SymbolCatalog,
    pub paytable: PayTable,
    pub paylines: PaylineSet,
    pub bets: BetLimits,
    /// Largest selectable active payline count
    pub max_paylines: usize,
    /// Balance of a fresh player
    pub default_balance: u64,
    /// Payout / wager at which a win counts as big
    pub big_win_ratio: f64,
}

impl GameConfig {
    /// The classic five-reel machine
    pub fn classic() -> Self {
        let symbols = vec![
            Symbol::regular(0, "cherry", "🍒", 25, 1),
            Symbol::regular(1, "lemon", "🍋", 22, 2),
            Symbol::regular(2, "orange", "🍊", 20, 3),
            Symbol::regular(3, "plum", "🍇", 15, 4),
            Symbol::regular(4, "bell", "🔔", 8, 5),
            Symbol::regular(5, "bar", "▬", 5, 6),
            Symbol::regular(6, "seven", "7", 3, 7),
            Symbol::wild(7, "wild", "★", 2),
        ];
        let paytable = BTreeMap::from([
            (0, [5.0, 10.0, 25.0]),
            (1, [5.0, 15.0, 30.0]),
            (2, [10.0, 20.0, 40.0]),
            (3, [10.0, 25.0, 50.0]),
            (4, [20.0, 50.0, 100.0]),
            (5, [30.0, 75.0, 200.0]),
            (6, [50.0, 150.0, 500.0]),
        ]);
        let grid = GridSpec::standard_5x3();
        let lines = vec![
            Payline::straight(0, 1, grid.reels).with_name("Middle"),
            Payline::straight(1, 0, grid.reels).with_name("Top"),
            Payline::straight(2, 2, grid.reels).with_name("Bottom"),
            Payline::v_shape(3, grid.rows, grid.reels).with_name("V-Shape"),
            Payline::inverted_v(4, grid.rows, grid.reels).with_name("Inv-V"),
        ];

        // Built from constants that satisfy every invariant
        let catalog = SymbolCatalog::new(symbols).unwrap_or_else(|e| unreachable!("{e}"));
        let paytable = PayTable::new(paytable, &catalog).unwrap_or_else(|e| unreachable!("{e}"));
        let paylines = PaylineSet::new(lines, grid.reels, grid.rows)
            .unwrap_or_else(|e| unreachable!("{e}"));

        Self {
            grid,
            max_paylines: paylines.len(),
            catalog,
            paytable,
            paylines,
            bets: BetLimits {
                min_bet: 1,
                max_bet: 100,
            },
            default_balance: 1000,
            big_win_ratio: DEFAULT_BIG_WIN_RATIO,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LOADING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Load a configuration file; `.yaml`/`.yml` is YAML, anything else JSON
    pub fn load(path: impl AsRef<Path>) -> SlotResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let config = if is_yaml {
            Self::from_yaml(&text)?
        } else {
            Self::from_json(&text)?
        };
        log::info!(
            "Loaded machine config from {}: {}x{} grid, {} symbols, {} paylines",
            path.display(),
            config.grid.reels,
            config.grid.rows,
            config.catalog.len(),
            config.paylines.len()
        );
        Ok(config)
    }

    pub fn from_json(json: &str) -> SlotResult<Self> {
        let doc: GameDocument =
            serde_json::from_str(json).map_err(|e| SlotError::Parse(e.to_string()))?;
        Self::from_document(doc)
    }

    pub fn from_yaml(yaml: &str) -> SlotResult<Self> {
        let doc: GameDocument =
            serde_yml::from_str(yaml).map_err(|e| SlotError::Parse(e.to_string()))?;
        Self::from_document(doc)
    }

    /// Validate a document with the default limits
    pub fn from_document(doc: GameDocument) -> SlotResult<Self> {
        Self::from_document_with_limits(doc, &ConfigLimits::default())
    }

    /// Validate a document
    pub fn from_document_with_limits(doc: GameDocument, limits: &ConfigLimits) -> SlotResult<Self> {
        let GameDocument {
            grid,
            symbols,
            paytable,
            paylines,
            default_balance,
            min_bet,
            max_bet,
            max_paylines,
            big_win_ratio,
        } = doc;

        if symbols.len() > limits.max_symbols {
            return Err(SlotError::config(format!(
                "Too many symbols: {} > {}",
                symbols.len(),
                limits.max_symbols
            )));
        }
        if paylines.len() > limits.max_paylines {
            return Err(SlotError::config(format!(
                "Too many paylines: {} > {}",
                paylines.len(),
                limits.max_paylines
            )));
        }
        if !(limits.min_reels..=limits.max_reels).contains(&grid.reels) {
            return Err(SlotError::config(format!(
                "Reel count {} outside {}..={}",
                grid.reels, limits.min_reels, limits.max_reels
            )));
        }
        if !(1..=limits.max_rows).contains(&grid.rows) {
            return Err(SlotError::config(format!(
                "Row count {} outside 1..={}",
                grid.rows, limits.max_rows
            )));
        }
        if min_bet == 0 || min_bet > max_bet {
            return Err(SlotError::config(format!(
                "Bet range {min_bet}..={max_bet} is empty or starts at zero"
            )));
        }
        let big_win_ratio = big_win_ratio.unwrap_or(DEFAULT_BIG_WIN_RATIO);
        if !big_win_ratio.is_finite() || big_win_ratio <= 0.0 {
            return Err(SlotError::config(format!(
                "Big win ratio must be positive, got {big_win_ratio}"
            )));
        }

        let catalog = SymbolCatalog::new(
            symbols
                .into_iter()
                .map(|def| {
                    let glyph = def
                        .glyph
                        .unwrap_or_else(|| def.name.chars().take(1).collect::<String>().to_uppercase());
                    if def.wild {
                        Symbol::wild(def.id, def.name, glyph, def.weight)
                    } else {
                        Symbol::regular(def.id, def.name, glyph, def.weight, def.rank)
                    }
                })
                .collect(),
        )?;

        let mut entries = BTreeMap::new();
        for (name, pays) in paytable {
            let symbol = catalog
                .by_name(&name)
                .ok_or_else(|| SlotError::config(format!("Paytable names unknown symbol '{name}'")))?;
            let pays: [f64; 3] = pays.as_slice().try_into().map_err(|_| {
                SlotError::config(format!(
                    "Paytable entry '{}' needs 3 multipliers, got {}",
                    name,
                    pays.len()
                ))
            })?;
            entries.insert(symbol.id, pays);
        }
        let paytable = PayTable::new(entries, &catalog)?;

        let lines = paylines
            .into_iter()
            .enumerate()
            .map(|(index, def)| Payline {
                name: def.name,
                ..Payline::from_rows(index, &def.rows)
            })
            .collect();
        let paylines = PaylineSet::new(lines, grid.reels, grid.rows)?;

        let max_paylines = max_paylines.unwrap_or(paylines.len());
        if max_paylines == 0 || max_paylines > paylines.len() {
            return Err(SlotError::config(format!(
                "max_paylines {} outside 1..={}",
                max_paylines,
                paylines.len()
            )));
        }

        Ok(Self {
            grid,
            catalog,
            paytable,
            paylines,
            bets: BetLimits { min_bet, max_bet },
            max_paylines,
            default_balance,
            big_win_ratio,
        })
    }

    /// Check that grid, paylines and active line limit agree
    ///
    /// Catches configs assembled or edited field by field after loading.
    pub fn check_consistency(&self) -> SlotResult<()> {
        if self.grid.reels == 0 || self.grid.rows == 0 {
            return Err(SlotError::config(format!(
                "grid {}x{} has no positions",
                self.grid.reels, self.grid.rows
            )));
        }
        if !self.paylines.fits(self.grid.reels, self.grid.rows) {
            return Err(SlotError::config(format!(
                "paylines do not fit the {}x{} grid",
                self.grid.reels, self.grid.rows
            )));
        }
        if self.max_paylines == 0 || self.max_paylines > self.paylines.len() {
            return Err(SlotError::config(format!(
                "max_paylines {} outside 1..={}",
                self.max_paylines,
                self.paylines.len()
            )));
        }
        if self.bets.min_bet == 0 || self.bets.min_bet > self.bets.max_bet {
            return Err(SlotError::config(format!(
                "Bet range {}..={} is empty or starts at zero",
                self.bets.min_bet, self.bets.max_bet
            )));
        }
        Ok(())
    }

    /// Back to the document shape
    pub fn to_document(&self) -> GameDocument {
        let symbols = self
            .catalog
            .symbols()
            .iter()
            .map(|s| SymbolDef {
                id: s.id,
                name: s.name.clone(),
                glyph: Some(s.glyph.clone()),
                weight: s.weight,
                rank: s.rank,
                wild: s.is_wild(),
            })
            .collect();

        let paytable = self
            .catalog
            .symbols()
            .iter()
            .filter_map(|s| self.paytable.pays(s.id).map(|p| (s.name.clone(), p.to_vec())))
            .collect();

        let paylines = self
            .paylines
            .lines()
            .iter()
            .map(|line| PaylineDef {
                name: line.name.clone(),
                rows: line.rows(),
            })
            .collect();

        GameDocument {
            grid: self.grid,
            symbols,
            paytable,
            paylines,
            default_balance: self.default_balance,
            min_bet: self.bets.min_bet,
            max_bet: self.bets.max_bet,
            max_paylines: Some(self.max_paylines),
            big_win_ratio: Some(self.big_win_ratio),
        }
    }

    pub fn to_json(&self) -> SlotResult<String> {
        serde_json::to_string_pretty(&self.to_document()).map_err(|e| SlotError::Parse(e.to_string()))
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}
