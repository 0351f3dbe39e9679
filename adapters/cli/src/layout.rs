use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use lane_defence_core::CellCoord;
use lane_defence_system_builder::Purchase;
use serde::Deserialize;

/// Defender purchases scheduled ahead of each wave.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Layout {
    scheduled: Vec<(u32, Purchase)>,
}

impl Layout {
    /// Loads a layout from the TOML file at `path`.
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read layout file at {}", path.display()))?;
        Self::parse(&contents).with_context(|| format!("invalid layout file {}", path.display()))
    }

    /// Parses a layout from TOML source.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let file: LayoutFile =
            toml::from_str(contents).context("failed to parse layout toml contents")?;

        let mut scheduled = Vec::with_capacity(file.purchase.len());
        for (index, entry) in file.purchase.into_iter().enumerate() {
            if entry.wave == 0 {
                bail!("purchase {index} is scheduled for wave 0; waves start at 1");
            }
            let cell = CellCoord::new(entry.lane, entry.column);
            let purchase = match (entry.kind, entry.power) {
                (DefenderKind::Line, Some(power)) => Purchase::LineShooter { cell, power },
                (DefenderKind::Line, None) => {
                    bail!("line shooter purchase {index} is missing `power`")
                }
                (DefenderKind::Radial, None) => Purchase::RadialShooter { cell },
                (DefenderKind::Radial, Some(_)) => {
                    bail!("radial shooter purchase {index} must not set `power`")
                }
            };
            scheduled.push((entry.wave, purchase));
        }

        Ok(Self { scheduled })
    }

    /// Purchases to make before `wave`, in file order.
    pub(crate) fn purchases_for(&self, wave: u32) -> Vec<Purchase> {
        self.scheduled
            .iter()
            .filter(|(scheduled_wave, _)| *scheduled_wave == wave)
            .map(|(_, purchase)| *purchase)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayoutFile {
    #[serde(default)]
    purchase: Vec<ScheduledPurchase>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScheduledPurchase {
    wave: u32,
    kind: DefenderKind,
    lane: u32,
    column: u32,
    power: Option<u32>,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DefenderKind {
    Line,
    Radial,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn purchases_are_grouped_by_wave() {
        let layout = Layout::parse(
            r#"
            [[purchase]]
            wave = 1
            kind = "line"
            lane = 0
            column = 1
            power = 3

            [[purchase]]
            wave = 2
            kind = "radial"
            lane = 1
            column = 4

            [[purchase]]
            wave = 1
            kind = "radial"
            lane = 2
            column = 0
            "#,
        )
        .expect("layout parses");

        assert_eq!(
            layout.purchases_for(1),
            vec![
                Purchase::LineShooter {
                    cell: CellCoord::new(0, 1),
                    power: 3,
                },
                Purchase::RadialShooter {
                    cell: CellCoord::new(2, 0),
                },
            ]
        );
        assert_eq!(
            layout.purchases_for(2),
            vec![Purchase::RadialShooter {
                cell: CellCoord::new(1, 4),
            }]
        );
        assert!(layout.purchases_for(3).is_empty());
    }

    #[test]
    fn empty_document_is_an_empty_layout() {
        assert_eq!(Layout::parse("").expect("layout parses"), Layout::default());
    }

    #[test]
    fn line_shooters_require_power() {
        let error = Layout::parse(
            r#"
            [[purchase]]
            wave = 1
            kind = "line"
            lane = 0
            column = 0
            "#,
        )
        .expect_err("missing power is rejected");
        assert!(error.to_string().contains("missing `power`"));
    }

    #[test]
    fn unknown_kinds_are_rejected() {
        let result = Layout::parse(
            r#"
            [[purchase]]
            wave = 1
            kind = "mortar"
            lane = 0
            column = 0
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn wave_zero_is_rejected() {
        let result = Layout::parse(
            r#"
            [[purchase]]
            wave = 0
            kind = "radial"
            lane = 0
            column = 0
            "#,
        );
        assert!(result.is_err());
    }
}
