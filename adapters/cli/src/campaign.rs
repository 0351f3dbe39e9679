use anyhow::{Context, Result};
use lane_defence_core::{Grid, TickOutcome};
use lane_defence_system_builder::Builder;
use lane_defence_system_wave_generation::{Config as WaveConfig, WaveGeneration};
use lane_defence_world::WaveEngine;
use tracing::info;

use crate::layout::Layout;

/// Divisor applied to a cleared wave's power to compute the money reward.
const REWARD_DIVISOR: u32 = 20;

/// Parameters for a sequence of waves played on the same lawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct CampaignConfig {
    pub(crate) lanes: u32,
    pub(crate) columns: u32,
    pub(crate) money: u32,
    pub(crate) power: u32,
    pub(crate) power_step: u32,
    pub(crate) max_waves: Option<u32>,
    pub(crate) seed: u64,
}

/// Summary of a finished campaign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CampaignReport {
    pub(crate) waves_cleared: u32,
    pub(crate) defeat: Option<Defeat>,
    pub(crate) money: u32,
    pub(crate) rejected_purchases: u32,
}

/// Wave and tick at which the defended edge fell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Defeat {
    pub(crate) wave: u32,
    pub(crate) tick: u64,
}

/// Plays waves of growing power until the lawn falls or `max_waves` are cleared.
pub(crate) fn run(config: CampaignConfig, layout: &Layout) -> Result<CampaignReport> {
    let mut grid = Grid::new(config.lanes, config.columns).context("invalid lawn dimensions")?;
    let mut builder = Builder::new(config.money);
    let generator = WaveGeneration::new(WaveConfig::default().with_seed(config.seed));
    let max_lane = config.lanes - 1;
    let mut power = config.power;
    let mut wave = 1;
    let mut rejected_purchases = 0;

    loop {
        if config.max_waves.is_some_and(|max| wave > max) {
            break;
        }

        rejected_purchases += place_defenders(&mut builder, &mut grid, layout, wave);

        let plan = generator.generate(wave, power, max_lane);
        let mut engine = WaveEngine::new(grid, plan)
            .with_context(|| format!("generated plan for wave {wave} is invalid"))?;
        let outcome = engine.run_to_end();
        grid = engine.into_grid();

        if let TickOutcome::Defeat { tick } = outcome {
            info!(wave, tick, "campaign lost");
            return Ok(CampaignReport {
                waves_cleared: wave - 1,
                defeat: Some(Defeat { wave, tick }),
                money: builder.money(),
                rejected_purchases,
            });
        }

        builder.reward(power / REWARD_DIVISOR);
        power = power.saturating_add(config.power_step);
        info!(wave, money = builder.money(), next_power = power, "wave cleared");
        wave += 1;
    }

    Ok(CampaignReport {
        waves_cleared: wave - 1,
        defeat: None,
        money: builder.money(),
        rejected_purchases,
    })
}

/// Applies the purchases scheduled for `wave` and returns how many were rejected.
fn place_defenders(builder: &mut Builder, grid: &mut Grid, layout: &Layout, wave: u32) -> u32 {
    let purchases = layout.purchases_for(wave);
    if purchases.is_empty() {
        builder.bank();
        return 0;
    }

    let mut rejected = 0;
    for purchase in purchases {
        // Rejections are logged by the builder and leave the balance untouched.
        if builder.purchase(grid, purchase).is_err() {
            rejected += 1;
        }
    }
    rejected
}
