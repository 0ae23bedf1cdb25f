use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use gesture_cast_core::ActorConfig;
use gesture_cast_patterns::{FlatStrokes, PatternConfig};
use gesture_cast_system_recognizer::{MatchConfig, TieBreak};
use gesture_cast_world::SimulationConfig;
use serde::Deserialize;

/// Smallest accepted densify step, in normalized units.
const MIN_DENSIFY_STEP: f32 = 1e-3;

/// Runtime parameters assembled from the optional configuration file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct DuelConfig {
    pub(crate) simulation: SimulationConfig,
    pub(crate) patterns: PatternConfig,
    pub(crate) matching: MatchConfig,
    pub(crate) actor: ActorConfig,
}

impl Default for DuelConfig {
    fn default() -> Self {
        let patterns = PatternConfig::default();
        Self {
            simulation: SimulationConfig::default(),
            patterns,
            matching: MatchConfig::for_densify_step(patterns.densify_step),
            actor: ActorConfig::default(),
        }
    }
}

impl DuelConfig {
    /// Reads and validates a TOML configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).context("failed to parse config toml contents")?;
        file.resolve()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    simulation: SimulationSection,
    patterns: PatternSection,
    matching: MatchingSection,
    actor: ActorSection,
}

impl ConfigFile {
    fn resolve(self) -> Result<DuelConfig> {
        let patterns = PatternConfig {
            densify_step: self.patterns.densify_step,
        };
        anyhow::ensure!(
            patterns.densify_step >= MIN_DENSIFY_STEP,
            "patterns.densify_step must be at least {MIN_DENSIFY_STEP}, got {}",
            patterns.densify_step
        );

        let defaults = MatchConfig::for_densify_step(patterns.densify_step);
        let matching = MatchConfig {
            match_tolerance: self
                .matching
                .match_tolerance
                .unwrap_or(defaults.match_tolerance),
            progress_tolerance: self.matching.progress_tolerance,
            tie_break: match self.matching.tie_break {
                TieBreakSetting::First => TieBreak::FirstMatch,
                TieBreakSetting::Last => TieBreak::LastMatch,
            },
            flat_strokes: if self.matching.reject_flat_strokes {
                FlatStrokes::Reject
            } else {
                FlatStrokes::Pin
            },
        };

        let simulation = SimulationConfig {
            tick: seconds("simulation.tick_seconds", self.simulation.tick_seconds)?,
            timer_seed: self.simulation.timer_seed,
            sway_interval_ticks: self.simulation.sway_interval_ticks,
            sway_degrees: self.simulation.sway_degrees,
        };
        anyhow::ensure!(
            !simulation.tick.is_zero(),
            "simulation.tick_seconds must be positive"
        );

        let actor = ActorConfig {
            cooldown: seconds("actor.cooldown_seconds", self.actor.cooldown_seconds)?,
            tracing: seconds("actor.tracing_seconds", self.actor.tracing_seconds)?,
            loading: seconds("actor.loading_seconds", self.actor.loading_seconds)?,
            min_sample_spacing: self.actor.min_sample_spacing,
            sample_cadence: self.actor.sample_cadence,
            spark_cadence: self.actor.spark_cadence,
        };

        Ok(DuelConfig {
            simulation,
            patterns,
            matching,
            actor,
        })
    }
}

fn seconds(field: &str, value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value)
        .with_context(|| format!("{field} must be a non-negative number of seconds, got {value}"))
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct SimulationSection {
    tick_seconds: f64,
    timer_seed: u64,
    sway_interval_ticks: u32,
    sway_degrees: i32,
}

impl Default for SimulationSection {
    fn default() -> Self {
        let defaults = SimulationConfig::default();
        Self {
            tick_seconds: defaults.tick.as_secs_f64(),
            timer_seed: defaults.timer_seed,
            sway_interval_ticks: defaults.sway_interval_ticks,
            sway_degrees: defaults.sway_degrees,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PatternSection {
    densify_step: f32,
}

impl Default for PatternSection {
    fn default() -> Self {
        Self {
            densify_step: PatternConfig::default().densify_step,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum TieBreakSetting {
    First,
    #[default]
    Last,
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct MatchingSection {
    match_tolerance: Option<f32>,
    progress_tolerance: f32,
    tie_break: TieBreakSetting,
    reject_flat_strokes: bool,
}

impl Default for MatchingSection {
    fn default() -> Self {
        Self {
            match_tolerance: None,
            progress_tolerance: MatchConfig::default().progress_tolerance,
            tie_break: TieBreakSetting::default(),
            reject_flat_strokes: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ActorSection {
    cooldown_seconds: f64,
    tracing_seconds: f64,
    loading_seconds: f64,
    min_sample_spacing: f32,
    sample_cadence: u32,
    spark_cadence: u32,
}

impl Default for ActorSection {
    fn default() -> Self {
        let defaults = ActorConfig::default();
        Self {
            cooldown_seconds: defaults.cooldown.as_secs_f64(),
            tracing_seconds: defaults.tracing.as_secs_f64(),
            loading_seconds: defaults.loading.as_secs_f64(),
            min_sample_spacing: defaults.min_sample_spacing,
            sample_cadence: defaults.sample_cadence,
            spark_cadence: defaults.spark_cadence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_library_defaults() {
        let config = DuelConfig::parse("").expect("empty config is valid");
        let defaults = DuelConfig::default();

        assert_eq!(config.simulation, defaults.simulation);
        assert_eq!(config.patterns, defaults.patterns);
        assert_eq!(config.matching, defaults.matching);
        assert_eq!(config.actor.cooldown, defaults.actor.cooldown);
        assert_eq!(config.actor.tracing, defaults.actor.tracing);
        assert_eq!(config.actor.loading, defaults.actor.loading);
    }

    #[test]
    fn sections_override_individual_fields() {
        let config = DuelConfig::parse(
            r#"
            [patterns]
            densify_step = 0.1

            [matching]
            tie_break = "first"
            reject_flat_strokes = true

            [actor]
            loading_seconds = 1.5
            sample_cadence = 2
            "#,
        )
        .expect("valid config");

        assert!((config.matching.match_tolerance - 0.3).abs() < 1e-6);
        assert_eq!(config.matching.tie_break, TieBreak::FirstMatch);
        assert_eq!(config.matching.flat_strokes, FlatStrokes::Reject);
        assert_eq!(config.actor.loading, Duration::from_millis(1500));
        assert_eq!(config.actor.sample_cadence, 2);
        assert_eq!(config.actor.cooldown, ActorConfig::default().cooldown);
    }

    #[test]
    fn negative_durations_are_rejected() {
        let error = DuelConfig::parse("[actor]\ncooldown_seconds = -1.0\n")
            .expect_err("negative cooldown");
        assert!(format!("{error:#}").contains("actor.cooldown_seconds"));
    }

    #[test]
    fn vanishing_densify_steps_are_rejected() {
        for step in ["0.0", "-0.05", "1e-9", "nan"] {
            let contents = format!("[patterns]\ndensify_step = {step}\n");
            let error = DuelConfig::parse(&contents).expect_err("unusable densify step");
            assert!(format!("{error:#}").contains("patterns.densify_step"));
        }
        assert!(DuelConfig::parse("[patterns]\ndensify_step = 0.001\n").is_ok());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(DuelConfig::parse("[actor]\ncooldown = 1\n").is_err());
    }
}
