#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that evaluates every actor's casting guards once per tick.
//!
//! The system never mutates the world. It reads actor snapshots taken after
//! the timers ticked, together with the pointer input of the tick, and emits
//! at most one state transition request per actor. Trace capture requests
//! (`SamplePointer`, `AdvanceScript`) are emitted alongside them.

use std::collections::HashMap;

use gesture_cast_core::{
    ActorId, ActorKindTag, ActorSnapshot, ActorState, ActorView, Command, Point2, PointerInput,
    SpellId,
};
use gesture_cast_patterns::PatternLibrary;
use gesture_cast_system_recognizer::Recognizer;
use tracing::debug;

/// Guard evaluation for the gesture casting state machine.
#[derive(Debug, Default)]
pub struct Casting {
    recognizer: Recognizer,
}

impl Casting {
    /// Creates a casting system that judges finished traces with `recognizer`.
    #[must_use]
    pub const fn new(recognizer: Recognizer) -> Self {
        Self { recognizer }
    }

    /// Emits the commands that advance every actor by one tick.
    ///
    /// Actors without an entry in `inputs` are treated as not pressing.
    pub fn handle(
        &self,
        actors: &ActorView,
        inputs: &HashMap<ActorId, PointerInput>,
        library: &PatternLibrary,
        out: &mut Vec<Command>,
    ) {
        for actor in actors.iter() {
            let pointer = inputs.get(&actor.id).copied().unwrap_or_default();
            self.evaluate(actor, pointer, library, out);
        }
    }

    fn evaluate(
        &self,
        actor: &ActorSnapshot,
        pointer: PointerInput,
        library: &PatternLibrary,
        out: &mut Vec<Command>,
    ) {
        let scripted = actor.kind == ActorKindTag::Scripted;
        let triggered = scripted || pointer.pressed;

        match actor.state {
            ActorState::Idle => {
                if !(actor.cooldown_elapsed && triggered) {
                    return;
                }
                out.push(Command::Transition {
                    actor: actor.id,
                    to: ActorState::Tracing,
                });
                if !scripted {
                    out.push(Command::SamplePointer {
                        actor: actor.id,
                        position: pointer.position,
                    });
                }
            }
            ActorState::Tracing if scripted => {
                if !actor.tracing_elapsed {
                    return;
                }
                if actor.script_exhausted {
                    self.conclude(actor, None, library, out);
                } else {
                    out.push(Command::AdvanceScript { actor: actor.id });
                }
            }
            ActorState::Tracing => {
                if pointer.pressed {
                    out.push(Command::SamplePointer {
                        actor: actor.id,
                        position: pointer.position,
                    });
                } else {
                    self.conclude(actor, Some(pointer.position), library, out);
                }
            }
            ActorState::Loading => {
                if actor.loading_elapsed {
                    out.push(Command::Transition {
                        actor: actor.id,
                        to: ActorState::Loaded,
                    });
                }
            }
            ActorState::Loaded => {
                if actor.cooldown_elapsed && triggered {
                    out.push(Command::Transition {
                        actor: actor.id,
                        to: ActorState::Idle,
                    });
                }
            }
        }
    }

    /// Judges the finished trace. A release position is appended without the
    /// cadence or spacing gates, matching what the world stores.
    fn conclude(
        &self,
        actor: &ActorSnapshot,
        release: Option<Point2>,
        library: &PatternLibrary,
        out: &mut Vec<Command>,
    ) {
        let mut stroke = actor.captured.clone();
        if let Some(position) = release {
            stroke.push(position);
        }
        let verdict = self.recognizer.recognize(&stroke, library);
        debug!(
            actor = actor.id.get(),
            points = stroke.len(),
            spell = verdict.spell().map(SpellId::name),
            "trace concluded"
        );
        out.push(Command::ConcludeTrace {
            actor: actor.id,
            release,
            verdict,
        });
    }
}
