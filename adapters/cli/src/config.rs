//! Match configuration assembled from a TOML document and command-line flags.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use card_defence_core::{MatchConfig, PlacementConfig};

/// Flag values that take precedence over the TOML document.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Overrides {
    pub(crate) seed: Option<u64>,
    pub(crate) preparation_ms: Option<u64>,
    pub(crate) victory_wave: Option<u32>,
    pub(crate) legacy_placement: bool,
}

impl Overrides {
    fn apply(self, config: &mut MatchConfig) {
        if let Some(seed) = self.seed {
            config.rng_seed = seed;
        }
        if let Some(preparation_ms) = self.preparation_ms {
            config.preparation_ms = preparation_ms;
        }
        if self.victory_wave.is_some() {
            config.victory_wave = self.victory_wave;
        }
        if self.legacy_placement {
            config.placement = PlacementConfig {
                cell_size: config.placement.cell_size,
                bounds_margin: config.placement.bounds_margin,
                ..PlacementConfig::legacy()
            };
        }
    }
}

/// Reads the optional TOML file, applies the overrides and validates the result.
pub(crate) fn load(path: Option<&Path>, overrides: Overrides) -> Result<MatchConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            parse(&text).with_context(|| format!("invalid configuration in {}", path.display()))?
        }
        None => MatchConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("configuration rejected")?;
    Ok(config)
}

fn parse(text: &str) -> Result<MatchConfig> {
    Ok(toml::from_str(text)?)
}
