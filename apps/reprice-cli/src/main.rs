//! # Reprice CLI
//!
//! Runs one pricing pass over a cart document and prints the result.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  pricing.toml + REPRICE_* ──► PricingConfig ──► build_calculator       │
//! │                                                       │                 │
//! │  cart.json ──► validate_cart ─────────────────────────┤                 │
//! │  changes.json ──► validate_change_set ────────────────┤                 │
//! │                                                       ▼                 │
//! │                                          calculate(&mut cart, changes)  │
//! │                                                       │                 │
//! │                                             stdout: cart JSON           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Logs go to stderr; filter with `RUST_LOG` (default `info`).

mod transport;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use reprice_client::{build_calculator, ClientResult, HttpTransport, PricingConfig, RemoteSettings};
use reprice_core::validation::{validate_cart, validate_change_set};
use reprice_core::{Cart, CartCalculator, CartStage, ChangeSet};
use serde::de::DeserializeOwned;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::transport::ReqwestTransport;

#[derive(Parser, Debug)]
#[command(name = "reprice", version, about = "Reprice a cart document")]
struct Cli {
    /// Cart JSON document
    cart: PathBuf,

    /// Change set JSON document; omit for a full pass
    #[arg(long)]
    changes: Option<PathBuf>,

    /// Pricing config file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the cart's stage
    #[arg(long, value_enum)]
    stage: Option<StageArg>,

    /// Override the cart's locale
    #[arg(long)]
    locale: Option<String>,

    /// Print compact JSON
    #[arg(long)]
    compact: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StageArg {
    Active,
    Checkout,
    Submitted,
}

impl From<StageArg> for CartStage {
    fn from(stage: StageArg) -> Self {
        match stage {
            StageArg::Active => CartStage::Active,
            StageArg::Checkout => CartStage::Checkout,
            StageArg::Submitted => CartStage::Submitted,
        }
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cli = Cli::parse();
    let cart = run(&cli)?;

    let rendered = if cli.compact {
        serde_json::to_string(&cart)?
    } else {
        serde_json::to_string_pretty(&cart)?
    };
    println!("{}", rendered);

    Ok(())
}

fn run(cli: &Cli) -> Result<Cart> {
    let config = PricingConfig::load(cli.config.clone()).context("loading pricing config")?;
    info!(source = %config.mode(), "Configuration loaded");

    let mut cart: Cart = read_json(&cli.cart)?;
    if let Some(stage) = cli.stage {
        cart.stage = stage.into();
    }
    if let Some(locale) = &cli.locale {
        cart.locale = locale.clone();
    }
    validate_cart(&cart).context("invalid cart")?;

    let changes: Option<ChangeSet> = match &cli.changes {
        Some(path) => Some(read_json(path)?),
        None => None,
    };
    if let Some(changes) = &changes {
        validate_change_set(&cart, changes).context("invalid change set")?;
    }

    let calculator =
        build_calculator(&config, Box::new(remote_transport)).context("building calculator")?;
    let report = calculator.calculate(&mut cart, changes.as_ref());

    info!(
        cart_id = %cart.id,
        stage = %cart.stage,
        priced = report.priced,
        unpriced = report.unpriced,
        source_unavailable = report.source_unavailable,
        "Cart repriced"
    );

    Ok(cart)
}

fn remote_transport(settings: &RemoteSettings) -> ClientResult<Box<dyn HttpTransport>> {
    let transport = ReqwestTransport::new(Duration::from_secs(settings.timeout_secs))?;
    Ok(Box::new(transport))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}
