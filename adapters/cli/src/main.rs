#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Lane Defence campaign.

mod campaign;
mod layout;

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::{
    campaign::{CampaignConfig, CampaignReport},
    layout::Layout,
};

/// Command-line arguments accepted by the `lane-defence` binary.
#[derive(Debug, Parser)]
#[command(name = "lane-defence", about = "Plays lane defence waves until the lawn falls")]
struct CliArgs {
    /// Number of lanes on the lawn.
    #[arg(long, default_value_t = 5)]
    lanes: u32,
    /// Number of columns in every lane.
    #[arg(long, default_value_t = 10)]
    columns: u32,
    /// Seed for the wave generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Starting balance available for defenders.
    #[arg(long, default_value_t = 10)]
    money: u32,
    /// Enemy power budget of the first wave.
    #[arg(long, default_value_t = 100)]
    power: u32,
    /// Power added to the budget after every cleared wave.
    #[arg(long, default_value_t = 40)]
    power_step: u32,
    /// Stops after clearing this many waves.
    #[arg(long)]
    max_waves: Option<u32>,
    /// TOML file listing the defenders to buy before each wave.
    #[arg(long, value_name = "PATH")]
    layout: Option<PathBuf>,
}

/// Entry point for the Lane Defence command-line interface.
fn main() -> Result<()> {
    install_tracing();

    let args = CliArgs::parse();
    ensure!(args.lanes > 0, "--lanes must be at least 1");
    ensure!(args.columns > 0, "--columns must be at least 1");

    let layout = match &args.layout {
        Some(path) => Layout::load(path)?,
        None => Layout::default(),
    };

    let report = campaign::run(
        CampaignConfig {
            lanes: args.lanes,
            columns: args.columns,
            money: args.money,
            power: args.power,
            power_step: args.power_step,
            max_waves: args.max_waves,
            seed: args.seed,
        },
        &layout,
    )?;
    print_report(&report);
    Ok(())
}

fn install_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(report: &CampaignReport) {
    println!("Waves cleared: {}", report.waves_cleared);
    println!("Money left: {}", report.money);
    println!("Rejected purchases: {}", report.rejected_purchases);
    match report.defeat {
        Some(defeat) => println!(
            "Campaign over: the lawn fell in wave {} at tick {}.",
            defeat.wave, defeat.tick
        ),
        None => println!("Campaign over: wave limit reached."),
    }
}
