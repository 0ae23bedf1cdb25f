#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative actor state management for Gesture Cast.
//!
//! The world owns the actor registry, every actor's casting state and the
//! timer service backing their countdowns. All mutation flows through
//! [`apply`]; systems observe the world through the [`query`] module.

mod actor;

use std::time::Duration;

use gesture_cast_core::{
    ActorId, ActorKind, ActorState, Command, Cue, Event, ParticleKind, Side, SpellMatch,
    TimerSpan,
};
use gesture_cast_timing::TimerService;
use tracing::{debug, trace};

use actor::Actor;

const DEFAULT_TICK: Duration = Duration::from_millis(20);
const DEFAULT_TIMER_SEED: u64 = 0x6a09_e667_f3bc_c908;
const DEFAULT_SWAY_INTERVAL_TICKS: u32 = 20;
const DEFAULT_SWAY_DEGREES: i32 = 5;

/// Session-wide simulation parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Simulated time covered by a single tick.
    pub tick: Duration,
    /// Seed for timer handle allocation.
    pub timer_seed: u64,
    /// Ticks between wand sway steps. Zero disables swaying.
    pub sway_interval_ticks: u32,
    /// Magnitude of a single wand sway step in degrees.
    pub sway_degrees: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick: DEFAULT_TICK,
            timer_seed: DEFAULT_TIMER_SEED,
            sway_interval_ticks: DEFAULT_SWAY_INTERVAL_TICKS,
            sway_degrees: DEFAULT_SWAY_DEGREES,
        }
    }
}

/// Represents the authoritative Gesture Cast world state.
#[derive(Debug)]
pub struct World {
    config: SimulationConfig,
    timers: TimerService,
    actors: Vec<Actor>,
    tick_index: u64,
}

impl World {
    /// Creates an empty world using the provided simulation parameters.
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            timers: TimerService::new(config.tick, config.timer_seed),
            actors: Vec::new(),
            tick_index: 0,
        }
    }

    fn next_actor_id(&self) -> ActorId {
        ActorId::new(u32::try_from(self.actors.len()).unwrap_or(u32::MAX))
    }

    fn actor_index(&self, actor: ActorId) -> Option<usize> {
        self.actors
            .binary_search_by_key(&actor, |candidate| candidate.id)
            .ok()
    }

    fn first_of_side(&self, side: Side) -> Option<ActorId> {
        self.actors
            .iter()
            .find(|actor| actor.side == side)
            .map(|actor| actor.id)
    }

    /// Single transition function shared by every actor kind.
    ///
    /// Requests for the current state, and requests outside the transition
    /// table, are ignored.
    fn transition(&mut self, index: usize, to: ActorState, out_events: &mut Vec<Event>) {
        let from = self.actors[index].state;
        if from == to || !is_permitted(from, to) {
            return;
        }

        let target = match (from, to) {
            (ActorState::Loaded, ActorState::Idle) => {
                self.first_of_side(self.actors[index].side.opposing())
            }
            _ => None,
        };

        let timers = &mut self.timers;
        let actor = &mut self.actors[index];
        actor.state = to;
        debug!(actor = actor.id.get(), ?from, ?to, "state entered");
        out_events.push(Event::StateEntered {
            actor: actor.id,
            from,
            to,
        });

        match (from, to) {
            (ActorState::Idle, ActorState::Tracing) => actor.begin_trace(timers),
            (ActorState::Tracing, ActorState::Idle) => actor.release_tracing_timer(timers),
            (ActorState::Tracing, ActorState::Loading) => {
                actor.release_tracing_timer(timers);
                actor.loading_timer = Some(timers.create(TimerSpan::Time(actor.config.loading)));
                out_events.push(Event::CuePlayed {
                    actor: actor.id,
                    cue: Cue::Recognized,
                });
            }
            (ActorState::Loading, ActorState::Loaded) => {
                if let Some(handle) = actor.loading_timer.take() {
                    timers.remove(handle);
                }
                actor.rearm_cooldown(timers);
            }
            (ActorState::Loaded, ActorState::Idle) => {
                let spell = actor.loaded_spell.take();
                match target {
                    Some(target) => out_events.push(Event::ShotResolved {
                        shooter: actor.id,
                        target,
                        spell,
                    }),
                    None => debug!(actor = actor.id.get(), "no opposing actor to hit"),
                }
                actor.rearm_cooldown(timers);
                out_events.push(Event::CuePlayed {
                    actor: actor.id,
                    cue: Cue::Shot,
                });
            }
            _ => {}
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(SimulationConfig::default())
    }
}

fn is_permitted(from: ActorState, to: ActorState) -> bool {
    matches!(
        (from, to),
        (ActorState::Idle, ActorState::Tracing)
            | (ActorState::Tracing, ActorState::Loading)
            | (ActorState::Tracing, ActorState::Idle)
            | (ActorState::Loading, ActorState::Loaded)
            | (ActorState::Loaded, ActorState::Idle)
    )
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.timers.tick();
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
            });

            let SimulationConfig {
                sway_interval_ticks,
                sway_degrees,
                ..
            } = world.config;
            for actor in world.actors.iter_mut() {
                let swayed = actor.sway(&mut world.timers, sway_interval_ticks, sway_degrees);
                if let Some(degrees) = swayed {
                    out_events.push(Event::WandSwayed {
                        actor: actor.id,
                        degrees,
                    });
                }
            }
        }
        Command::RegisterActor { side, kind, config } => {
            let id = world.next_actor_id();
            debug!(actor = id.get(), ?side, kind = ?kind.tag(), "actor registered");
            let actor = Actor::new(
                id,
                side,
                kind,
                config,
                &mut world.timers,
                world.config.sway_interval_ticks,
            );
            world.actors.push(actor);
            out_events.push(Event::ActorRegistered { actor: id, side });
        }
        Command::SamplePointer { actor, position } => {
            let Some(index) = world.actor_index(actor) else {
                return;
            };
            let actor = &mut world.actors[index];
            if actor.state != ActorState::Tracing
                || !matches!(actor.kind, ActorKind::Interactive)
            {
                return;
            }

            let (accepted, spark) = actor.sample(position);
            if accepted {
                trace!(
                    actor = actor.id.get(),
                    x = position.x(),
                    y = position.y(),
                    "sample accepted"
                );
                out_events.push(Event::ParticleEmitted {
                    actor: actor.id,
                    kind: ParticleKind::SpellStep,
                    position,
                });
            }
            if spark {
                out_events.push(Event::ParticleEmitted {
                    actor: actor.id,
                    kind: ParticleKind::Spark,
                    position,
                });
            }
        }
        Command::AdvanceScript { actor } => {
            let Some(index) = world.actor_index(actor) else {
                return;
            };
            let actor = &mut world.actors[index];
            if actor.state != ActorState::Tracing {
                return;
            }

            if let Some(position) = actor.advance_script(&mut world.timers) {
                out_events.push(Event::ParticleEmitted {
                    actor: actor.id,
                    kind: ParticleKind::SpellStep,
                    position,
                });
            }
        }
        Command::ConcludeTrace {
            actor,
            release,
            verdict,
        } => {
            let Some(index) = world.actor_index(actor) else {
                return;
            };
            if world.actors[index].state != ActorState::Tracing {
                return;
            }
            if let Some(position) = release {
                world.actors[index].captured.push(position);
            }

            match verdict {
                SpellMatch::Recognized(spell) => {
                    world.actors[index].loaded_spell = Some(spell);
                    world.transition(index, ActorState::Loading, out_events);
                }
                SpellMatch::Unrecognized => {
                    world.transition(index, ActorState::Idle, out_events);
                }
            }
        }
        Command::Transition { actor, to } => {
            let Some(index) = world.actor_index(actor) else {
                return;
            };
            if world.actors[index].state == ActorState::Tracing {
                return;
            }
            world.transition(index, to, out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gesture_cast_core::{ActorId, ActorSnapshot, ActorView, Polyline, Side};

    use super::{SimulationConfig, World};

    /// Captures a read-only view of every registered actor.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(
            world
                .actors
                .iter()
                .map(|actor| actor.snapshot(&world.timers))
                .collect(),
        )
    }

    /// Captures a snapshot of a single actor.
    #[must_use]
    pub fn actor(world: &World, actor: ActorId) -> Option<ActorSnapshot> {
        let index = world.actor_index(actor)?;
        Some(world.actors[index].snapshot(&world.timers))
    }

    /// Identifier the next registered actor will receive.
    ///
    /// Identifiers are allocated sequentially in registration order.
    #[must_use]
    pub fn next_actor_id(world: &World) -> ActorId {
        world.next_actor_id()
    }

    /// First registered actor fighting for `side`, if any.
    #[must_use]
    pub fn first_actor(world: &World, side: Side) -> Option<ActorId> {
        world.first_of_side(side)
    }

    /// Stroke captured by the actor's current or most recent trace.
    #[must_use]
    pub fn captured(world: &World, actor: ActorId) -> Option<&Polyline> {
        let index = world.actor_index(actor)?;
        Some(&world.actors[index].captured)
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Number of live countdowns held by the timer service.
    #[must_use]
    pub fn live_timers(world: &World) -> usize {
        world.timers.len()
    }

    /// Simulation parameters the world was created with.
    #[must_use]
    pub fn config(world: &World) -> SimulationConfig {
        world.config
    }
}
