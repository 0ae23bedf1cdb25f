#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs headless Gesture Cast duels.

mod config;
mod loader;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use gesture_cast_core::{ActorId, ActorState, Cue, Side, SpellId};
use gesture_cast_patterns::PatternLibrary;
use gesture_cast_session::{Effects, Session};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::DuelConfig;
use loader::DirectoryLoader;

/// Gesture Cast - scripted spell duels driven by stroke recognition.
#[derive(Debug, Parser)]
#[command(name = "gesture-cast", version, about)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Runs a headless duel between two scripted casters.
    Duel {
        /// Directory holding `<spell>.bytes` pattern blobs.
        #[arg(short, long, value_name = "DIR")]
        patterns: PathBuf,

        /// Optional TOML file overriding simulation, matching and actor parameters.
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Number of fixed ticks to simulate.
        #[arg(short, long, default_value_t = 1_000)]
        ticks: u32,

        /// Spell whose pattern the protagonist traces.
        #[arg(long, default_value = "frog", value_parser = parse_spell)]
        protagonist: SpellId,

        /// Spell whose pattern the antagonist traces.
        #[arg(long, default_value = "whirls", value_parser = parse_spell)]
        antagonist: SpellId,
    },
    /// Writes the built-in reference pattern of every spell as blobs.
    WritePatterns {
        /// Destination directory, created when missing.
        #[arg(value_name = "DIR")]
        out: PathBuf,
    },
}

fn parse_spell(name: &str) -> Result<SpellId, String> {
    SpellId::from_name(name).ok_or_else(|| {
        let known: Vec<&str> = SpellId::ALL.iter().map(|spell| spell.name()).collect();
        format!("unknown spell `{name}`; expected one of {}", known.join(", "))
    })
}

/// Entry point for the Gesture Cast command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    match cli.command {
        CliCommand::Duel {
            patterns,
            config,
            ticks,
            protagonist,
            antagonist,
        } => {
            let config = match config {
                Some(path) => DuelConfig::load(&path)?,
                None => DuelConfig::default(),
            };
            let tally = run_duel(&patterns, config, ticks, [protagonist, antagonist])?;
            println!(
                "{ticks} ticks: protagonist landed {} shots, antagonist landed {}",
                tally.landed(Side::Protagonist),
                tally.landed(Side::Antagonist)
            );
        }
        CliCommand::WritePatterns { out } => {
            loader::write_builtin_patterns(&out)?;
            println!("wrote {} pattern blobs to {}", SpellId::ALL.len(), out.display());
        }
    }
    Ok(())
}

fn init_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .try_init()
        .map_err(|error| anyhow!("failed to initialise logging: {error}"))
}

fn run_duel(
    patterns: &Path,
    config: DuelConfig,
    ticks: u32,
    spells: [SpellId; 2],
) -> Result<Tally> {
    let library = PatternLibrary::load(&DirectoryLoader::new(patterns), config.patterns);
    if library.is_empty() {
        warn!(dir = %patterns.display(), "no reference patterns loaded; nothing can be cast");
    }

    let mut session = Session::new(config.simulation, library, config.matching);
    let mut casters = Vec::with_capacity(spells.len());
    for (side, spell) in [Side::Protagonist, Side::Antagonist].into_iter().zip(spells) {
        let stroke = session
            .library()
            .get(spell)
            .map(|pattern| pattern.normalized().clone())
            .with_context(|| format!("no reference pattern loaded for {}", spell.name()))?;
        let actor = session.register_scripted(side, &stroke, config.actor);
        info!(actor = actor.get(), ?side, spell = spell.name(), "caster registered");
        casters.push((actor, side));
    }

    let mut tally = Tally::new(casters);
    for _ in 0..ticks {
        session.step(&mut tally);
    }
    Ok(tally)
}

/// Effects sink that logs presentation requests and counts landed shots.
#[derive(Debug)]
struct Tally {
    casters: Vec<(ActorId, Side)>,
    landed: [u32; 2],
}

impl Tally {
    fn new(casters: Vec<(ActorId, Side)>) -> Self {
        Self {
            casters,
            landed: [0; 2],
        }
    }

    fn side_of(&self, actor: ActorId) -> Option<Side> {
        self.casters
            .iter()
            .find(|(caster, _)| *caster == actor)
            .map(|&(_, side)| side)
    }

    fn landed(&self, side: Side) -> u32 {
        self.landed[side_index(side)]
    }
}

fn side_index(side: Side) -> usize {
    match side {
        Side::Protagonist => 0,
        Side::Antagonist => 1,
    }
}

impl Effects for Tally {
    fn on_state_entered(&mut self, actor: ActorId, from: ActorState, to: ActorState) {
        debug!(actor = actor.get(), ?from, ?to, "caster changed state");
    }

    fn resolve_shot(&mut self, shooter: ActorId, target: ActorId, spell: Option<SpellId>) {
        let Some(side) = self.side_of(shooter) else {
            return;
        };
        self.landed[side_index(side)] += 1;
        info!(
            shooter = shooter.get(),
            target = target.get(),
            spell = spell.map(SpellId::name),
            "spell landed"
        );
    }

    fn play_cue(&mut self, actor: ActorId, cue: Cue) {
        debug!(actor = actor.get(), ?cue, "cue");
    }
}
