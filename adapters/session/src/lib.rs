#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-step driver that wires the world, the casting system and the effects
//! collaborator together.
//!
//! Every [`Session::step`] ticks the timers first, evaluates every actor's
//! guards against the fresh snapshots, applies the resulting commands and
//! finally forwards the produced events to an [`Effects`] implementation.

use std::collections::HashMap;

use gesture_cast_core::{
    ActorConfig, ActorId, ActorKind, ActorState, Command, Cue, Event, ParticleKind, Point2,
    PointerInput, Polyline, Side, SpellId,
};
use gesture_cast_patterns::{densify, PatternLibrary};
use gesture_cast_system_casting::Casting;
use gesture_cast_system_recognizer::{MatchConfig, Recognizer};
use gesture_cast_world::{self as world, query, SimulationConfig, World};
use tracing::debug;

/// Presentation and combat collaborators notified about world events.
///
/// Only state changes and shot resolution are mandatory; cosmetic hooks
/// default to doing nothing.
pub trait Effects {
    /// Called once for every accepted state transition.
    fn on_state_entered(&mut self, actor: ActorId, from: ActorState, to: ActorState);

    /// Applies a fired spell to its target.
    fn resolve_shot(&mut self, shooter: ActorId, target: ActorId, spell: Option<SpellId>);

    /// Plays an audio cue.
    fn play_cue(&mut self, _actor: ActorId, _cue: Cue) {}

    /// Spawns a particle effect at `position`.
    fn emit_particle(&mut self, _actor: ActorId, _kind: ParticleKind, _position: Point2) {}

    /// Rotates the actor's wand by `degrees`.
    fn sway_wand(&mut self, _actor: ActorId, _degrees: i32) {}
}

/// A running duel: the world, its pattern library and per-actor pointer input.
#[derive(Debug)]
pub struct Session {
    world: World,
    casting: Casting,
    library: PatternLibrary,
    inputs: HashMap<ActorId, PointerInput>,
    commands: Vec<Command>,
    registrations: Vec<Event>,
    events: Vec<Event>,
}

impl Session {
    /// Creates a session with an empty actor registry.
    #[must_use]
    pub fn new(
        simulation: SimulationConfig,
        library: PatternLibrary,
        matching: MatchConfig,
    ) -> Self {
        Self {
            world: World::new(simulation),
            casting: Casting::new(Recognizer::new(matching)),
            library,
            inputs: HashMap::new(),
            commands: Vec::new(),
            registrations: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Registers a pointer-driven actor.
    pub fn register_interactive(&mut self, side: Side, config: ActorConfig) -> ActorId {
        self.register(side, ActorKind::Interactive, config)
    }

    /// Registers an actor that replays `stroke`.
    ///
    /// The library's densify step is measured in normalized units, so it is
    /// scaled by the larger extent of the stroke's bounding box. A stroke
    /// replays the same number of points whatever its drawing size.
    pub fn register_scripted(
        &mut self,
        side: Side,
        stroke: &Polyline,
        config: ActorConfig,
    ) -> ActorId {
        let step = self.library.config().densify_step * extent(stroke);
        let stroke = densify(stroke, step);
        self.register(side, ActorKind::Scripted { stroke }, config)
    }

    fn register(&mut self, side: Side, kind: ActorKind, config: ActorConfig) -> ActorId {
        let actor = query::next_actor_id(&self.world);
        world::apply(
            &mut self.world,
            Command::RegisterActor { side, kind, config },
            &mut self.registrations,
        );
        actor
    }

    /// Records the pointer state used from the next step onwards.
    pub fn set_pointer(&mut self, actor: ActorId, input: PointerInput) {
        let _ = self.inputs.insert(actor, input);
    }

    /// Advances the duel by one fixed tick and notifies `effects`.
    pub fn step(&mut self, effects: &mut impl Effects) {
        self.events.clear();
        self.events.append(&mut self.registrations);
        world::apply(&mut self.world, Command::Tick, &mut self.events);

        self.commands.clear();
        let actors = query::actor_view(&self.world);
        self.casting
            .handle(&actors, &self.inputs, &self.library, &mut self.commands);
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        for event in &self.events {
            dispatch(event, effects);
        }
    }

    /// Events produced by the most recent step, preceded by the registrations
    /// made since the step before it.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Read-only access to the world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Reference patterns loaded for the session.
    #[must_use]
    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }
}

fn extent(stroke: &Polyline) -> f32 {
    stroke
        .bounds()
        .map_or(0.0, |bounds| bounds.width().max(bounds.height()))
}

fn dispatch(event: &Event, effects: &mut impl Effects) {
    match *event {
        Event::TimeAdvanced { .. } | Event::ActorRegistered { .. } => {}
        Event::StateEntered { actor, from, to } => effects.on_state_entered(actor, from, to),
        Event::CuePlayed { actor, cue } => effects.play_cue(actor, cue),
        Event::ParticleEmitted {
            actor,
            kind,
            position,
        } => effects.emit_particle(actor, kind, position),
        Event::ShotResolved {
            shooter,
            target,
            spell,
        } => {
            debug!(
                shooter = shooter.get(),
                target = target.get(),
                spell = spell.map(SpellId::name),
                "shot resolved"
            );
            effects.resolve_shot(shooter, target, spell);
        }
        Event::WandSwayed { actor, degrees } => effects.sway_wand(actor, degrees),
    }
}
