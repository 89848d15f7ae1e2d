//! SlotForge: text-mode slot machine
//!
//! Usage:
//!   slotforge spin --bet 5 --lines 5   - Play a spin
//!   slotforge simulate --spins 100000  - Measure RTP and hit rate
//!   slotforge paytable                 - Show symbols, pays and paylines
//!   slotforge balance                  - Show the saved balance
//!   slotforge reset                    - Restore the starting balance

use std::ffi::OsStr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use sf_slot::{GameConfig, GameEngine, Player, SessionStats, SlotError, SpinResult};
use sf_stage::{BellGateway, LogGateway, SoundGateway};
use sf_state::{BalanceStore, JsonBalanceStore, load_balance_or, save_balance};

#[derive(Parser)]
#[command(name = "slotforge", version, about = "Five-reel slot machine")]
struct Cli {
    /// Machine configuration (JSON, or YAML by extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Balance file
    #[arg(short, long, global = true)]
    save: Option<PathBuf>,

    /// Seed the reels for a reproducible session
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Only log warnings; no bell
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one or more spins
    Spin {
        /// Bet per line
        #[arg(short, long, default_value_t = 1)]
        bet: u64,
        /// Active paylines (default: all)
        #[arg(short, long)]
        lines: Option<usize>,
        /// Number of spins
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
        /// Top up to the starting balance when broke
        #[arg(long)]
        refill: bool,
    },
    /// Run a session without touching the saved balance
    Simulate {
        /// Number of spins
        #[arg(short = 'n', long, default_value_t = 100_000)]
        spins: u64,
        /// Bet per line
        #[arg(short, long, default_value_t = 1)]
        bet: u64,
        /// Active paylines (default: all)
        #[arg(short, long)]
        lines: Option<usize>,
    },
    /// Show symbols, paytable and paylines
    Paytable,
    /// Show the saved balance
    Balance,
    /// Store the starting balance
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load machine config {}", path.display()))?,
        None => GameConfig::classic(),
    };
    let store = match &cli.save {
        Some(path) => JsonBalanceStore::new(path),
        None => JsonBalanceStore::at_default_path(),
    };

    match cli.command {
        Commands::Spin {
            bet,
            lines,
            count,
            refill,
        } => {
            let lines = lines.unwrap_or(config.max_paylines);
            let mut bell = BellGateway::stdout();
            bell.set_enabled(!cli.quiet);
            play(config, &store, cli.seed, &bell, bet, lines, count, refill)
        }
        Commands::Simulate { spins, bet, lines } => {
            let lines = lines.unwrap_or(config.max_paylines);
            simulate(config, cli.seed, spins, bet, lines)
        }
        Commands::Paytable => {
            print_paytable(&config);
            Ok(())
        }
        Commands::Balance => {
            let balance = load_balance_or(&store, config.default_balance);
            println!("Balance: {balance} credits ({})", store.path().display());
            Ok(())
        }
        Commands::Reset => {
            store
                .save(config.default_balance)
                .with_context(|| format!("failed to write {}", store.path().display()))?;
            println!("Balance reset to {} credits", config.default_balance);
            Ok(())
        }
    }
}

fn rng_for(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_os_rng(),
    }
}

#[allow(clippy::too_many_arguments)]
fn play(
    config: GameConfig,
    store: &dyn BalanceStore,
    seed: Option<u64>,
    sound: &dyn SoundGateway,
    bet: u64,
    lines: usize,
    count: u32,
    refill: bool,
) -> Result<()> {
    let default_balance = config.default_balance;
    let balance = load_balance_or(store, default_balance);
    let mut engine = GameEngine::new(config, Player::new("player", balance), rng_for(seed))?;

    for _ in 0..count {
        if engine.is_bankrupt() {
            if !refill {
                println!("Out of credits. Run again with --refill or `slotforge reset`.");
                break;
            }
            let balance = engine.add_credits(default_balance);
            println!("Refilled: {balance} credits");
            save_balance(store, balance);
        }

        match engine.spin_with_stages(bet, lines) {
            Ok((result, stages)) => {
                sound.play_all(&stages);
                LogGateway.play_all(&stages);
                print_spin(&engine, &result);
                save_balance(store, result.balance_after);
            }
            Err(SlotError::InsufficientBalance { wager, balance }) => {
                println!("Wager {wager} exceeds balance {balance}; stopping.");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    println!("Balance: {} credits", engine.balance());
    Ok(())
}

/// Log ceiling during a simulation run
///
/// Per-spin logging would drown the summary, so it is capped at warn unless
/// RUST_LOG asks for something explicitly.
fn simulation_log_cap(rust_log: Option<&OsStr>) -> Option<log::LevelFilter> {
    match rust_log {
        Some(_) => None,
        None => Some(log::LevelFilter::Warn),
    }
}

fn simulate(config: GameConfig, seed: Option<u64>, spins: u64, bet: u64, lines: usize) -> Result<()> {
    let mut engine = GameEngine::new(config, Player::new("simulation", u64::MAX / 2), rng_for(seed))?;
    engine.validate(bet, lines)?;

    log::info!("Simulating {spins} spins at {bet} x {lines} lines");
    if let Some(level) = simulation_log_cap(std::env::var_os("RUST_LOG").as_deref()) {
        log::set_max_level(level);
    }
    for _ in 0..spins {
        engine.spin(bet, lines)?;
    }

    print_stats(engine.stats());
    Ok(())
}

fn print_spin<R: rand::Rng>(engine: &GameEngine<R>, result: &SpinResult) {
    let catalog = &engine.config().catalog;

    println!();
    for row in 0..result.grid.row_count() {
        let cells: Vec<String> = result
            .grid
            .row(row)
            .into_iter()
            .map(|id| format!("{:^3}", catalog.glyph(id)))
            .collect();
        println!("  | {} |", cells.join("|"));
    }

    for line in result.winning_lines() {
        let label = engine
            .config()
            .paylines
            .get(line.payline_index)
            .map(|l| l.label())
            .unwrap_or_default();
        println!(
            "  {label}: {} x{} pays {}",
            catalog.name(line.symbol),
            line.match_length,
            line.payout
        );
    }

    if result.is_big_win(engine.config().big_win_ratio) {
        println!("  BIG WIN! {} credits ({:.0}x)", result.total_payout, result.win_ratio());
    } else if result.is_win() {
        println!("  Win: {} credits", result.total_payout);
    } else {
        println!("  No win");
    }
    println!(
        "  Spin #{}: wagered {}, net {:+}, balance {}",
        result.spin_id, result.wager, result.net_change, result.balance_after
    );
}

fn print_stats(stats: &SessionStats) {
    println!("Spins:        {}", stats.total_spins);
    println!("Wagered:      {}", stats.total_wagered);
    println!("Paid:         {}", stats.total_paid);
    println!("RTP:          {:.2}%", stats.rtp());
    println!("Hit rate:     {:.2}%", stats.hit_rate());
    println!("Biggest win:  {}", stats.biggest_win);
    println!("Big wins:     {}", stats.big_wins);
}

fn print_paytable(config: &GameConfig) {
    let catalog = &config.catalog;
    let total = catalog.total_weight();

    println!("{:<10} {:>5} {:>7} {:>8} {:>8} {:>8}", "Symbol", "", "Weight", "3x", "4x", "5x");
    for symbol in catalog.symbols() {
        let share = format!("{:.1}%", symbol.weight as f64 / total as f64 * 100.0);
        match config.paytable.pays(symbol.id) {
            Some(pays) => println!(
                "{:<10} {:>5} {:>7} {:>8} {:>8} {:>8}",
                symbol.name, symbol.glyph, share, pays[0], pays[1], pays[2]
            ),
            None => println!(
                "{:<10} {:>5} {:>7}   substitutes for any symbol",
                symbol.name, symbol.glyph, share
            ),
        }
    }

    println!();
    println!("Paylines (row per reel):");
    for line in config.paylines.lines() {
        let rows: Vec<String> = line.rows().iter().map(ToString::to_string).collect();
        println!("  {:>2}. {:<10} {}", line.index + 1, line.label(), rows.join(" "));
    }
    println!();
    println!(
        "Bet {}..={} per line, up to {} lines",
        config.bets.min_bet, config.bets.max_bet, config.max_paylines
    );
}
