//! Game engine: the spin state machine

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use sf_stage::Stage;

use crate::config::GameConfig;
use crate::error::{SlotError, SlotResult};
use crate::paytable::{Evaluation, PayoutCalculator};
use crate::player::Player;
use crate::reels::{Grid, ReelGenerator};
use crate::spin::SpinResult;

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// Ready for a spin
    Idle,
    /// A spin is being settled
    Evaluating,
}

/// Session statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub total_spins: u64,
    pub total_wagered: u64,
    pub total_paid: u64,
    pub wins: u64,
    pub losses: u64,
    pub biggest_win: u64,
    pub big_wins: u64,
}

impl SessionStats {
    /// Calculate RTP
    pub fn rtp(&self) -> f64 {
        if self.total_wagered > 0 {
            (self.total_paid as f64 / self.total_wagered as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Calculate hit rate
    pub fn hit_rate(&self) -> f64 {
        if self.total_spins > 0 {
            (self.wins as f64 / self.total_spins as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Net credits the player gained (negative when the house is ahead)
    pub fn net(&self) -> i128 {
        self.total_paid as i128 - self.total_wagered as i128
    }

    fn record(&mut self, result: &SpinResult, big_win_ratio: f64) {
        self.total_spins += 1;
        self.total_wagered = self.total_wagered.saturating_add(result.wager);
        self.total_paid = self.total_paid.saturating_add(result.total_payout);
        if result.is_win() {
            self.wins += 1;
            self.biggest_win = self.biggest_win.max(result.total_payout);
            if result.is_big_win(big_win_ratio) {
                self.big_wins += 1;
            }
        } else {
            self.losses += 1;
        }
    }
}

/// Slot game engine
///
/// Owns the live player and the random source of a session. A spin either
/// settles completely or is rejected before anything changes.
pub struct GameEngine<R: Rng = StdRng> {
    /// Configuration
    config: GameConfig,
    /// Weighted symbol source
    generator: ReelGenerator,
    /// The player
    player: Player,
    /// Random number generator
    rng: R,
    /// Current state
    state: EngineState,
    /// Current spin count
    spin_count: u64,
    /// Current session stats
    stats: SessionStats,
}

impl GameEngine<StdRng> {
    /// Engine seeded from OS entropy
    pub fn from_entropy(config: GameConfig, player: Player) -> SlotResult<Self> {
        Self::new(config, player, StdRng::from_os_rng())
    }
}

impl GameEngine<ChaCha8Rng> {
    /// Deterministic engine for tests and simulation
    pub fn seeded(config: GameConfig, player: Player, seed: u64) -> SlotResult<Self> {
        Self::new(config, player, ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    /// Create with an explicit random source
    pub fn new(config: GameConfig, player: Player, rng: R) -> SlotResult<Self> {
        config.check_consistency()?;
        let generator = ReelGenerator::new(&config.catalog)?;
        log::debug!(
            "Engine ready: {}x{} grid, {} paylines, player '{}' with {} credits",
            config.grid.reels,
            config.grid.rows,
            config.paylines.len(),
            player.id,
            player.balance
        );
        Ok(Self {
            config,
            generator,
            player,
            rng,
            state: EngineState::Idle,
            spin_count: 0,
            stats: SessionStats::default(),
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCESSORS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn balance(&self) -> u64 {
        self.player.balance
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Spins settled by this engine
    pub fn spin_count(&self) -> u64 {
        self.spin_count
    }

    /// Get session stats
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Reset session stats
    pub fn reset_stats(&mut self) {
        self.stats = SessionStats::default();
    }

    /// Hand the player back, ending the session
    pub fn into_player(self) -> Player {
        self.player
    }

    /// Balance cannot cover the smallest possible wager
    pub fn is_bankrupt(&self) -> bool {
        self.player.balance < self.config.bets.min_bet
    }

    /// Top up the balance; returns the new balance
    pub fn add_credits(&mut self, amount: u64) -> u64 {
        self.player.balance = self.player.balance.saturating_add(amount);
        log::info!(
            "Added {} credits, balance now {}",
            amount,
            self.player.balance
        );
        self.player.balance
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPIN EXECUTION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Check a spin request; returns the wager
    pub fn validate(&self, bet_per_line: u64, active_paylines: usize) -> SlotResult<u64> {
        let bets = self.config.bets;
        if !bets.contains(bet_per_line) {
            return Err(SlotError::InvalidBet {
                bet: bet_per_line,
                min: bets.min_bet,
                max: bets.max_bet,
            });
        }

        if active_paylines == 0 || active_paylines > self.config.max_paylines {
            return Err(SlotError::InvalidPaylineCount {
                count: active_paylines,
                max: self.config.max_paylines,
            });
        }

        let wager = bet_per_line
            .checked_mul(active_paylines as u64)
            .ok_or(SlotError::InvalidBet {
                bet: bet_per_line,
                min: bets.min_bet,
                max: bets.max_bet,
            })?;

        if !self.player.can_afford(wager) {
            return Err(SlotError::InsufficientBalance {
                wager,
                balance: self.player.balance,
            });
        }

        Ok(wager)
    }

    /// Play one spin
    ///
    /// Validate, debit the wager, draw the grid, evaluate the active lines,
    /// credit the payout, record the bet on the player.
    pub fn spin(&mut self, bet_per_line: u64, active_paylines: usize) -> SlotResult<SpinResult> {
        let wager = match self.validate(bet_per_line, active_paylines) {
            Ok(wager) => wager,
            Err(e) => {
                log::warn!("Spin rejected: {}", e);
                return Err(e);
            }
        };

        self.state = EngineState::Evaluating;
        let balance_before = self.player.balance;
        self.player.balance -= wager;

        let grid = self
            .generator
            .generate_grid(self.config.grid.reels, self.config.grid.rows, &mut self.rng);

        // Player counters change only once the payout settles
        let settled = self
            .evaluate(&grid, active_paylines, bet_per_line)
            .and_then(|evaluation| {
                let (balance_after, net_change) =
                    settle(balance_before, wager, evaluation.total_payout)?;
                Ok((evaluation, balance_after, net_change))
            });
        let (evaluation, balance_after, net_change) = match settled {
            Ok(settled) => settled,
            Err(e) => {
                log::error!("Spin aborted, wager refunded: {}", e);
                self.player.balance = balance_before;
                self.state = EngineState::Idle;
                return Err(e);
            }
        };

        self.player.balance = balance_after;
        self.player
            .record_spin(bet_per_line, active_paylines, evaluation.total_payout);
        self.spin_count += 1;

        let result = SpinResult {
            spin_id: self.spin_count,
            grid,
            line_results: evaluation.line_results,
            bet_per_line,
            active_paylines,
            wager,
            total_payout: evaluation.total_payout,
            net_change,
            balance_after: self.player.balance,
        };

        self.stats.record(&result, self.config.big_win_ratio);
        self.log_spin(&result);
        self.state = EngineState::Idle;

        Ok(result)
    }

    /// Play one spin and derive its stage events
    pub fn spin_with_stages(
        &mut self,
        bet_per_line: u64,
        active_paylines: usize,
    ) -> SlotResult<(SpinResult, Vec<Stage>)> {
        let result = self.spin(bet_per_line, active_paylines)?;
        let stages = result.stages(self.config.big_win_ratio);
        Ok((result, stages))
    }

    /// Repeat the player's last bet
    pub fn repeat_last(&mut self) -> SlotResult<SpinResult> {
        self.spin(self.player.last_bet_per_line, self.player.last_active_paylines)
    }

    fn evaluate(
        &self,
        grid: &Grid,
        active_paylines: usize,
        bet_per_line: u64,
    ) -> SlotResult<Evaluation> {
        PayoutCalculator::new(&self.config.catalog, &self.config.paytable).evaluate(
            grid,
            &self.config.paylines,
            active_paylines,
            bet_per_line,
        )
    }

    fn log_spin(&self, result: &SpinResult) {
        log::info!(
            "Spin #{}: bet {} x {} lines = {}, payout {}, balance {}",
            result.spin_id,
            result.bet_per_line,
            result.active_paylines,
            result.wager,
            result.total_payout,
            result.balance_after
        );

        if log::log_enabled!(log::Level::Debug) {
            for row in 0..result.grid.row_count() {
                let glyphs: Vec<&str> = result
                    .grid
                    .row(row)
                    .into_iter()
                    .map(|id| self.config.catalog.glyph(id))
                    .collect();
                log::debug!("  | {} |", glyphs.join(" | "));
            }
            for line in result.winning_lines() {
                log::debug!(
                    "  line {}: {} x{} -> {}",
                    line.payline_index + 1,
                    self.config.catalog.name(line.symbol),
                    line.match_length,
                    line.payout
                );
            }
        }
    }
}

/// Balance after a paid spin and the signed net change
///
/// `balance_before` still includes the wager. Fails when either number
/// leaves its integer range.
fn settle(balance_before: u64, wager: u64, payout: u64) -> SlotResult<(u64, i64)> {
    let balance_after = (balance_before - wager)
        .checked_add(payout)
        .ok_or_else(|| {
            SlotError::config(format!(
                "payout {payout} overflows a balance of {}",
                balance_before - wager
            ))
        })?;
    let net_change = i64::try_from(payout as i128 - wager as i128).map_err(|_| {
        SlotError::config(format!(
            "net change of payout {payout} against wager {wager} overflows"
        ))
    })?;
    Ok((balance_after, net_change))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(balance: u64) -> GameEngine<ChaCha8Rng> {
        GameEngine::seeded(GameConfig::classic(), Player::new("tester", balance), 12345).unwrap()
    }

    #[test]
    fn test_engine_spin() {
        let mut engine = engine(1000);
        let result = engine.spin(2, 5).unwrap();

        assert_eq!(result.spin_id, 1);
        assert_eq!(result.wager, 10);
        assert_eq!(result.line_results.len(), 5);
        assert_eq!(result.grid.reel_count(), 5);
        assert_eq!(result.grid.row_count(), 3);
        assert_eq!(result.balance_after, 1000 - 10 + result.total_payout);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.player().last_bet_per_line, 2);
        assert_eq!(engine.player().last_active_paylines, 5);
    }

    #[test]
    fn test_rejections_leave_player_untouched() {
        let mut engine = engine(100);
        let before = engine.player().clone();

        assert!(matches!(engine.spin(0, 1), Err(SlotError::InvalidBet { .. })));
        assert!(matches!(engine.spin(101, 1), Err(SlotError::InvalidBet { .. })));
        assert!(matches!(
            engine.spin(1, 0),
            Err(SlotError::InvalidPaylineCount { count: 0, max: 5 })
        ));
        assert!(matches!(
            engine.spin(1, 6),
            Err(SlotError::InvalidPaylineCount { .. })
        ));
        assert!(matches!(
            engine.spin(30, 5),
            Err(SlotError::InsufficientBalance {
                wager: 150,
                balance: 100
            })
        ));

        assert_eq!(engine.player(), &before);
        assert_eq!(engine.spin_count(), 0);
        assert_eq!(engine.stats().total_spins, 0);
    }

    #[test]
    fn test_exact_balance_wager_allowed() {
        let mut engine = engine(10);
        let result = engine.spin(2, 5).unwrap();
        assert_eq!(result.balance_after, result.total_payout);
    }

    #[test]
    fn test_same_seed_same_session() {
        let mut a = engine(1000);
        let mut b = engine(1000);
        for _ in 0..50 {
            assert_eq!(a.spin(1, 5).unwrap(), b.spin(1, 5).unwrap());
        }
    }

    #[test]
    fn test_session_stats() {
        let mut engine = engine(100_000);
        let mut paid = 0;
        for _ in 0..200 {
            paid += engine.spin(1, 5).unwrap().total_payout;
        }

        let stats = engine.stats();
        assert_eq!(stats.total_spins, 200);
        assert_eq!(stats.total_wagered, 1000);
        assert_eq!(stats.total_paid, paid);
        assert_eq!(stats.wins + stats.losses, 200);
        assert_eq!(engine.player().total_wins, stats.wins);
        assert_eq!(engine.player().biggest_win, stats.biggest_win);
        assert_eq!(stats.net(), paid as i128 - 1000);
        assert_eq!(engine.balance() as i128, 100_000 + stats.net());

        engine.reset_stats();
        assert_eq!(engine.stats(), &SessionStats::default());
        assert_eq!(engine.stats().rtp(), 0.0);
        assert_eq!(engine.stats().hit_rate(), 0.0);
    }

    #[test]
    fn test_bankrupt_and_add_credits() {
        let mut engine = engine(0);
        assert!(engine.is_bankrupt());
        assert!(matches!(
            engine.spin(1, 1),
            Err(SlotError::InsufficientBalance { .. })
        ));

        assert_eq!(engine.add_credits(1000), 1000);
        assert!(!engine.is_bankrupt());
        assert!(engine.spin(1, 1).is_ok());
    }

    #[test]
    fn test_repeat_last_requires_a_previous_spin() {
        let mut engine = engine(1000);
        assert!(matches!(engine.repeat_last(), Err(SlotError::InvalidBet { .. })));
        engine.spin(3, 2).unwrap();
        let again = engine.repeat_last().unwrap();
        assert_eq!(again.wager, 6);
    }

    #[test]
    fn test_entropy_engine_spins() {
        let mut engine =
            GameEngine::from_entropy(GameConfig::classic(), Player::new("p", 50)).unwrap();
        let result = engine.spin(1, 5).unwrap();
        assert_eq!(result.balance_after, 45 + result.total_payout);
        assert_eq!(engine.into_player().total_spins, 1);
    }

    /// 3x1 machine that always lands three sevens on its only line
    fn jackpot_config(seven_pays: f64) -> GameConfig {
        let json = format!(
            r#"{{
                "grid": {{ "reels": 3, "rows": 1 }},
                "symbols": [
                    {{ "id": 1, "name": "seven", "weight": 1, "rank": 1 }},
                    {{ "id": 9, "name": "wild", "weight": 0, "wild": true }}
                ],
                "paytable": {{ "seven": [{seven_pays:e}, {seven_pays:e}, {seven_pays:e}] }},
                "paylines": [ {{ "rows": [0, 0, 0] }} ],
                "default_balance": 10,
                "min_bet": 1,
                "max_bet": 5
            }}"#
        );
        GameConfig::from_json(&json).unwrap()
    }

    #[test]
    fn test_net_change_overflow_refunds_wager() {
        // 1e19 fits a u64 but not an i64
        let mut engine = GameEngine::seeded(jackpot_config(1e19), Player::new("p", 10), 7).unwrap();
        let before = engine.player().clone();

        assert!(matches!(engine.spin(1, 1), Err(SlotError::Configuration(_))));
        assert_eq!(engine.player(), &before);
        assert_eq!(engine.balance(), 10);
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.spin_count(), 0);
        assert_eq!(engine.stats().total_spins, 0);
    }

    #[test]
    fn test_line_payout_overflow_refunds_wager() {
        let mut engine = GameEngine::seeded(jackpot_config(1e19), Player::new("p", 10), 7).unwrap();
        let before = engine.player().clone();

        assert!(matches!(engine.spin(2, 1), Err(SlotError::Configuration(_))));
        assert_eq!(engine.player(), &before);
        assert_eq!(engine.state(), EngineState::Idle);
    }

    #[test]
    fn test_balance_overflow_refunds_wager() {
        let mut engine =
            GameEngine::seeded(jackpot_config(10.0), Player::new("p", u64::MAX - 1), 7).unwrap();
        let before = engine.player().clone();

        assert!(matches!(engine.spin(1, 1), Err(SlotError::Configuration(_))));
        assert_eq!(engine.player(), &before);
        assert_eq!(engine.state(), EngineState::Idle);

        // Same machine settles normally with headroom
        let mut engine = GameEngine::seeded(jackpot_config(10.0), Player::new("p", 10), 7).unwrap();
        let result = engine.spin(1, 1).unwrap();
        assert_eq!(result.total_payout, 10);
        assert_eq!(result.net_change, 9);
        assert_eq!(result.balance_after, 19);
    }

    #[test]
    fn test_settle_bounds() {
        assert_eq!(settle(100, 10, 25).unwrap(), (115, 15));
        assert_eq!(settle(10, 10, 0).unwrap(), (0, -10));
        assert_eq!(settle(u64::MAX, 1, 1).unwrap(), (u64::MAX, 0));
        assert!(settle(u64::MAX, 1, 2).is_err());
        assert!(settle(5, 1, i64::MAX as u64 + 1).is_err());
        assert!(settle(u64::MAX, u64::MAX, 0).is_err());
    }

    #[test]
    fn test_new_rejects_inconsistent_config() {
        let config = GameConfig {
            max_paylines: 6,
            ..GameConfig::classic()
        };
        assert!(matches!(
            GameEngine::seeded(config, Player::new("p", 100), 1),
            Err(SlotError::Configuration(_))
        ));

        let config = GameConfig {
            grid: crate::config::GridSpec { reels: 5, rows: 1 },
            ..GameConfig::classic()
        };
        assert!(matches!(
            GameEngine::seeded(config, Player::new("p", 100), 1),
            Err(SlotError::Configuration(_))
        ));
    }

    #[test]
    fn test_spin_with_stages() {
        let mut engine = engine(1000);
        let (result, stages) = engine.spin_with_stages(1, 5).unwrap();
        assert_eq!(stages.len(), result.grid.reel_count() + 2);
        assert_eq!(stages[0], Stage::SpinStarted { wager: 5 });
        assert!(stages.last().is_some_and(Stage::is_outcome));
    }
}
