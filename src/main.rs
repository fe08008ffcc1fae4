//! Football odds arbitrage service entry point.

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use odds_arb::api::{create_router, AppState};
use odds_arb::arbitrage::{analyze_quotes, outcomes_in_order};
use odds_arb::config::Config;
use odds_arb::metrics;
use odds_arb::odds::{OddsQuote, OddsStore};
use odds_arb::utils::shutdown_signal;

/// Football odds arbitrage service.
#[derive(Parser, Debug)]
#[command(name = "odds-arb")]
#[command(about = "Best-odds selection and arbitrage stake allocation for football matches")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// HTTP server port; overrides PORT.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve {
        /// HTTP server port; overrides PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Compute an allocation for quotes given on the command line.
    Calculate {
        /// Quote as BOOKMAKER:OUTCOME:ODDS, e.g. Superbet:1:2.10. Repeatable.
        #[arg(short, long = "quote", required = true, value_parser = parse_quote)]
        quotes: Vec<OddsQuote>,

        /// Amount to allocate; defaults to DEFAULT_INVESTMENT.
        #[arg(short, long)]
        investment: Option<Decimal>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration before logging so LOG_FORMAT applies
    let config = Config::load().ok();
    init_tracing(args.verbose, config.as_ref());

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(),
        Some(Command::Calculate { quotes, investment }) => {
            cmd_calculate(config.unwrap_or_default(), quotes, investment)
        }
        Some(Command::Serve { port }) => cmd_serve(port.or(args.port)).await,
        None => cmd_serve(args.port).await,
    }
}

/// Install the tracing subscriber: env filter plus a pretty or JSON layer.
fn init_tracing(verbose: bool, config: Option<&Config>) {
    let filter = if verbose || config.is_some_and(|c| c.verbose) {
        EnvFilter::new("odds_arb=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.map_or("info", |c| c.rust_log.as_str())))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let json = config.is_some_and(Config::is_json_logging);
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}

/// Parse `BOOKMAKER:OUTCOME:ODDS`. The bookmaker may itself contain colons.
fn parse_quote(raw: &str) -> Result<OddsQuote, String> {
    let mut parts = raw.rsplitn(3, ':');
    let (Some(odds), Some(outcome), Some(bookmaker)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("expected BOOKMAKER:OUTCOME:ODDS, got '{}'", raw));
    };

    if bookmaker.is_empty() || outcome.is_empty() {
        return Err(format!("empty bookmaker or outcome in '{}'", raw));
    }

    let odds = Decimal::from_str(odds.trim()).map_err(|e| format!("bad odds '{}': {}", odds, e))?;
    Ok(OddsQuote::new(bookmaker, outcome, odds))
}

/// Check configuration validity.
fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("ODDS ARB - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Port: {}", config.port);
    println!("  Log Format: {}", config.log_format_lower());
    println!("  Default Investment: {}", config.default_investment);
    println!("  Max Investment: {}", config.max_investment);
    match &config.odds_seed_path {
        Some(path) => println!("  Odds Seed: {}", path),
        None if config.load_sample_data => println!("  Odds Seed: built-in sample data"),
        None => println!("  Odds Seed: none (store starts empty)"),
    }
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Run the engine on command-line quotes and print the allocation table.
fn cmd_calculate(
    config: Config,
    quotes: Vec<OddsQuote>,
    investment: Option<Decimal>,
) -> anyhow::Result<()> {
    let investment = investment.unwrap_or(config.default_investment);
    let outcomes = outcomes_in_order(&quotes);

    let analysis = analyze_quotes(&quotes, &outcomes, investment)
        .with_context(|| format!("cannot compute arbitrage for {} quotes", quotes.len()))?;
    let result = analysis.result;

    println!("======================================================================");
    println!("ARBITRAGE CALCULATION - INVESTMENT {}", investment);
    println!("======================================================================");
    println!(
        "{:<10} {:<16} {:>8} {:>12} {:>12} {:>8}",
        "OUTCOME", "BOOKMAKER", "ODDS", "STAKE", "RETURN", "SHARE"
    );
    println!("----------------------------------------------------------------------");
    for bet in &result.allocations {
        println!(
            "{:<10} {:<16} {:>8} {:>12} {:>12} {:>7}%",
            bet.outcome, bet.bookmaker, bet.odds, bet.stake_amount, bet.potential_return, bet.allocation_pct
        );
    }
    println!("----------------------------------------------------------------------");
    println!("  Sum of Probabilities: {}", result.sum_of_implied_probabilities);
    println!("  Arbitrage: {}", if result.arbitrage_exists { "YES" } else { "NO" });
    println!("  Expected Profit: {}", result.expected_profit);
    println!("  Expected ROI: {}%", result.expected_roi);
    println!("======================================================================");

    Ok(())
}

/// Build the odds store from the seed file, the sample data, or nothing.
fn load_store(config: &Config) -> odds_arb::Result<OddsStore> {
    match &config.odds_seed_path {
        Some(path) => {
            let store = OddsStore::new();
            store.load_seed(path)?;
            Ok(store)
        }
        None if config.load_sample_data => {
            let store = OddsStore::with_sample_data();
            info!(matches = store.len(), "Loaded sample matches");
            Ok(store)
        }
        None => {
            warn!("No odds seed configured, store starts empty");
            Ok(OddsStore::new())
        }
    }
}

/// Run the HTTP API until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    // Load configuration
    info!("Loading configuration...");
    let mut config = Config::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(anyhow::anyhow!("Configuration validation failed: {}", e));
    }

    info!("Configuration loaded successfully");
    info!("Default investment: {}", config.default_investment);
    info!("Max investment: {}", config.max_investment);

    // Install the Prometheus recorder
    let prometheus = match metrics::install_prometheus() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder not installed: {}", e);
            None
        }
    };

    // Create app state
    let store = Arc::new(load_store(&config)?);
    let port = config.port;
    let mut app_state = AppState::new(store, config);
    if let Some(handle) = prometheus {
        app_state = app_state.with_metrics(handle);
    }
    app_state.set_ready(true);

    // Start HTTP server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    let router = create_router(app_state.clone());
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    app_state.set_ready(false);
    info!("Server stopped");
    Ok(())
}
