//! Game configuration
//!
//! Defaults, optionally overlaid by a JSON file, then by command-line flags.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::layout::Hud;
use crate::{BONUS_GRID_STEP, GRID_STEP};

/// The starting snake's head sits at x = 100.
const MIN_WIDTH: i32 = 120;
/// Keeps the field within a terminal's u16 coordinates.
const MAX_SIDE: i32 = 10_000;
/// One step every ten seconds at most.
const MIN_BASE_DIFFICULTY: f64 = 0.1;
const MAX_BONUS_LIFETIME_SECS: f64 = 3600.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Playfield width in world units (10 units per terminal column)
    pub width: i32,
    /// Playfield height in world units (10 units per terminal row)
    pub height: i32,
    pub base_difficulty: f64,
    /// Difficulty gained per point of score
    pub difficulty_modifier: f64,
    /// Redraw rate, independent of the simulation speed
    pub fps: u32,
    /// Probability of a bonus spawning on each spawner tick
    pub bonus_spawn_chance: f64,
    /// Points paid out, one per tick, after eating a bonus
    pub bonus_amount: u32,
    pub bonus_lifetime_secs: f64,
    /// Spawner cadence
    pub bonus_period_ms: u64,
    /// RNG seed; random when absent
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 600,
            height: 220,
            base_difficulty: 10.0,
            difficulty_modifier: 2.5,
            fps: 30,
            bonus_spawn_chance: 0.01,
            bonus_amount: 5,
            bonus_lifetime_secs: 6.0,
            bonus_period_ms: 100,
            seed: None,
        }
    }
}

/// Command-line overrides; every flag is optional.
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    #[arg(long)]
    pub width: Option<i32>,
    #[arg(long)]
    pub height: Option<i32>,
    #[arg(long)]
    pub base_difficulty: Option<f64>,
    #[arg(long)]
    pub difficulty_modifier: Option<f64>,
    #[arg(long)]
    pub fps: Option<u32>,
    #[arg(long)]
    pub bonus_spawn_chance: Option<f64>,
    #[arg(long)]
    pub bonus_amount: Option<u32>,
    #[arg(long)]
    pub bonus_lifetime_secs: Option<f64>,
    #[arg(long)]
    pub bonus_period_ms: Option<u64>,
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Config {
    /// Reads a JSON config. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply(mut self, o: &ConfigOverrides) -> Self {
        if let Some(v) = o.width { self.width = v; }
        if let Some(v) = o.height { self.height = v; }
        if let Some(v) = o.base_difficulty { self.base_difficulty = v; }
        if let Some(v) = o.difficulty_modifier { self.difficulty_modifier = v; }
        if let Some(v) = o.fps { self.fps = v; }
        if let Some(v) = o.bonus_spawn_chance { self.bonus_spawn_chance = v; }
        if let Some(v) = o.bonus_amount { self.bonus_amount = v; }
        if let Some(v) = o.bonus_lifetime_secs { self.bonus_lifetime_secs = v; }
        if let Some(v) = o.bonus_period_ms { self.bonus_period_ms = v; }
        if o.seed.is_some() { self.seed = o.seed; }
        self
    }

    /// Rejects values the game cannot run with. An out-of-range spawn
    /// chance is logged and clamped instead.
    pub fn validate(mut self) -> Result<Self> {
        for (name, v) in [("width", self.width), ("height", self.height)] {
            if v <= 0 || v % BONUS_GRID_STEP != 0 {
                bail!("{} must be a positive multiple of {}, got {}", name, BONUS_GRID_STEP, v);
            }
            if v > MAX_SIDE {
                bail!("{} must be at most {}, got {}", name, MAX_SIDE, v);
            }
        }

        if self.width < MIN_WIDTH {
            bail!("width must be at least {} to fit the starting snake, got {}", MIN_WIDTH, self.width);
        }

        let hud = Hud::new(self.width);
        // Room for the HUD rows plus one row of bonus food below them.
        let floor_y = hud.food_floor_row(true) * GRID_STEP;
        let min_height = (floor_y + BONUS_GRID_STEP - 1) / BONUS_GRID_STEP * BONUS_GRID_STEP + BONUS_GRID_STEP;
        if self.height < min_height {
            bail!("height must be at least {}, got {}", min_height, self.height);
        }

        if !(self.base_difficulty.is_finite() && self.base_difficulty >= MIN_BASE_DIFFICULTY) {
            bail!("base_difficulty must be at least {}, got {}", MIN_BASE_DIFFICULTY, self.base_difficulty);
        }
        if !(self.difficulty_modifier.is_finite() && self.difficulty_modifier >= 0.0) {
            bail!("difficulty_modifier must not be negative, got {}", self.difficulty_modifier);
        }
        if self.fps == 0 {
            bail!("fps must be at least 1");
        }
        if self.bonus_period_ms == 0 {
            bail!("bonus_period_ms must be at least 1");
        }
        if !(0.0..=MAX_BONUS_LIFETIME_SECS).contains(&self.bonus_lifetime_secs) {
            bail!(
                "bonus_lifetime_secs must be between 0 and {}, got {}",
                MAX_BONUS_LIFETIME_SECS, self.bonus_lifetime_secs
            );
        }

        if self.bonus_spawn_chance.is_nan() {
            bail!("bonus_spawn_chance must be a number");
        }
        if !(0.0..=1.0).contains(&self.bonus_spawn_chance) {
            let clamped = self.bonus_spawn_chance.clamp(0.0, 1.0);
            log::error!(
                "bonus_spawn_chance {} is outside [0, 1], using {}",
                self.bonus_spawn_chance,
                clamped
            );
            self.bonus_spawn_chance = clamped;
        }

        Ok(self)
    }

    /// Unrepresentable values fall back to no bonus at all.
    pub fn bonus_lifetime(&self) -> Duration {
        Duration::try_from_secs_f64(self.bonus_lifetime_secs).unwrap_or(Duration::ZERO)
    }

    pub fn bonus_period(&self) -> Duration {
        Duration::from_millis(self.bonus_period_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    /// Playfield size in terminal cells, saturating at `u16::MAX`.
    pub fn grid_size(&self) -> (u16, u16) {
        let cells = |units: i32| u16::try_from((units / GRID_STEP).max(0)).unwrap_or(u16::MAX);
        (cells(self.width), cells(self.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default().validate().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.grid_size(), (60, 22));
    }

    #[test]
    fn spawn_chance_is_clamped_not_rejected() {
        let config = Config { bonus_spawn_chance: 1.5, ..Config::default() }.validate().unwrap();
        assert_eq!(config.bonus_spawn_chance, 1.0);

        let config = Config { bonus_spawn_chance: -0.2, ..Config::default() }.validate().unwrap();
        assert_eq!(config.bonus_spawn_chance, 0.0);
    }

    #[test]
    fn bad_geometry_is_rejected() {
        assert!(Config { width: 0, ..Config::default() }.validate().is_err());
        assert!(Config { width: 610, ..Config::default() }.validate().is_err());
        assert!(Config { width: 100, ..Config::default() }.validate().is_err());
        assert!(Config { height: 60, ..Config::default() }.validate().is_err());
        assert!(Config { height: 80, ..Config::default() }.validate().is_ok());
    }

    #[test]
    fn bad_pacing_is_rejected() {
        assert!(Config { base_difficulty: 0.0, ..Config::default() }.validate().is_err());
        assert!(Config { difficulty_modifier: -1.0, ..Config::default() }.validate().is_err());
        assert!(Config { fps: 0, ..Config::default() }.validate().is_err());
        assert!(Config { bonus_period_ms: 0, ..Config::default() }.validate().is_err());
        assert!(Config { bonus_lifetime_secs: f64::NAN, ..Config::default() }.validate().is_err());
    }

    #[test]
    fn values_too_large_for_a_duration_are_rejected() {
        assert!(Config { base_difficulty: 1e-20, ..Config::default() }.validate().is_err());
        assert!(Config { base_difficulty: 0.1, ..Config::default() }.validate().is_ok());
        assert!(Config { bonus_lifetime_secs: 1e20, ..Config::default() }.validate().is_err());
        assert!(Config { bonus_lifetime_secs: 3600.0, ..Config::default() }.validate().is_ok());

        // Unvalidated values still never panic.
        assert_eq!(Config { bonus_lifetime_secs: 1e20, ..Config::default() }.bonus_lifetime(), Duration::ZERO);
    }

    #[test]
    fn oversized_field_is_rejected() {
        assert!(Config { width: 700_000, ..Config::default() }.validate().is_err());
        assert!(Config { height: 10_020, ..Config::default() }.validate().is_err());
        let config = Config { width: 10_000, height: 10_000, ..Config::default() }.validate().unwrap();
        assert_eq!(config.grid_size(), (1000, 1000));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{ "width": 400, "seed": 3 }"#).unwrap();
        assert_eq!(config.width, 400);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.height, Config::default().height);
    }

    #[test]
    fn flags_override_file_values() {
        let overrides = ConfigOverrides { fps: Some(60), seed: Some(9), ..Default::default() };
        let config = Config { fps: 20, ..Config::default() }.apply(&overrides);
        assert_eq!(config.fps, 60);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.width, 600);
    }
}
