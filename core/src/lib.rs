#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gesture Cast engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! effect collaborators to react to deterministically. Systems consume
//! immutable [`ActorView`] snapshots and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Immutable pair of coordinates describing a pointer sample or pattern vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    x: f32,
    y: f32,
}

impl Point2 {
    /// Creates a new point from its coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Euclidean distance between two points.
    #[must_use]
    pub fn distance(self, other: Point2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linearly interpolates towards `other` by the provided fraction.
    #[must_use]
    pub fn lerp(self, other: Point2, t: f32) -> Point2 {
        Point2::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Axis-aligned bounding box enclosing a polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    min: Point2,
    max: Point2,
}

impl Bounds {
    /// Lower-left corner of the box.
    #[must_use]
    pub const fn min(&self) -> Point2 {
        self.min
    }

    /// Upper-right corner of the box.
    #[must_use]
    pub const fn max(&self) -> Point2 {
        self.max
    }

    /// Horizontal extent of the box.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    /// Vertical extent of the box.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

/// Ordered sequence of points. Insertion order encodes stroke direction.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    points: Vec<Point2>,
}

impl Polyline {
    /// Creates an empty polyline.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a polyline from the provided points, preserving their order.
    #[must_use]
    pub fn from_points(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Appends a point to the end of the polyline.
    pub fn push(&mut self, point: Point2) {
        self.points.push(point);
    }

    /// Removes every point.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Points in insertion order.
    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Most recently appended point, if any.
    #[must_use]
    pub fn last(&self) -> Option<Point2> {
        self.points.last().copied()
    }

    /// Number of points in the polyline.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Reports whether the polyline contains no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Computes the axis-aligned bounding box, or `None` for an empty polyline.
    #[must_use]
    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.points.first()?;
        let (min, max) = self
            .points
            .iter()
            .fold((first, first), |(min, max), point| {
                (
                    Point2::new(min.x.min(point.x), min.y.min(point.y)),
                    Point2::new(max.x.max(point.x), max.y.max(point.y)),
                )
            });
        Some(Bounds { min, max })
    }
}

impl FromIterator<Point2> for Polyline {
    fn from_iter<I: IntoIterator<Item = Point2>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// Closed set of recognizable spells.
///
/// Declaration order is the deterministic evaluation order used by the
/// recognizer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum SpellId {
    /// Smothers the target in pudding.
    Pudding,
    /// Puts the target to sleep.
    Sleep,
    /// Releases a swarm of flies.
    Flies,
    /// Turns the target into a frog.
    Frog,
    /// Spins the target in whirls.
    Whirls,
    /// Blinds the target with darkness.
    Darkness,
}

impl SpellId {
    /// Every spell in evaluation order.
    pub const ALL: [SpellId; 6] = [
        SpellId::Pudding,
        SpellId::Sleep,
        SpellId::Flies,
        SpellId::Frog,
        SpellId::Whirls,
        SpellId::Darkness,
    ];

    /// Resource name used to locate the spell's reference pattern.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pudding => "pudding",
            Self::Sleep => "sleep",
            Self::Flies => "flies",
            Self::Frog => "frog",
            Self::Whirls => "whirls",
            Self::Darkness => "darkness",
        }
    }

    /// Resolves a spell from its resource name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|spell| spell.name() == name)
    }
}

/// Verdict produced by the recognizer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpellMatch {
    /// The stroke matched the contained spell.
    Recognized(SpellId),
    /// No reference pattern accepted the stroke.
    Unrecognized,
}

impl SpellMatch {
    /// Returns the matched spell, if any.
    #[must_use]
    pub const fn spell(self) -> Option<SpellId> {
        match self {
            Self::Recognized(spell) => Some(spell),
            Self::Unrecognized => None,
        }
    }
}

/// Unique identifier assigned to an actor at registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Side of the duel an actor fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// The player's side.
    Protagonist,
    /// The opposing side.
    Antagonist,
}

impl Side {
    /// Side targeted by shots fired from this side.
    #[must_use]
    pub const fn opposing(self) -> Side {
        match self {
            Self::Protagonist => Self::Antagonist,
            Self::Antagonist => Self::Protagonist,
        }
    }
}

/// Casting state of a single actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorState {
    /// Waiting for the cooldown and a trace-start condition.
    #[default]
    Idle,
    /// Capturing a stroke.
    Tracing,
    /// A recognized spell is charging.
    Loading,
    /// The spell is charged and waits for the shot condition.
    Loaded,
}

/// Behaviour variant of an actor.
#[derive(Clone, Debug, PartialEq)]
pub enum ActorKind {
    /// Driven by pointer input supplied every tick.
    Interactive,
    /// Replays a pre-expanded stroke point by point at a fixed cadence.
    Scripted {
        /// Stroke replayed into the captured polyline while tracing.
        stroke: Polyline,
    },
}

/// Data-free tag describing an actor's [`ActorKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActorKindTag {
    /// Pointer-driven actor.
    Interactive,
    /// Script-driven actor.
    Scripted,
}

impl ActorKind {
    /// Returns the tag describing this kind.
    #[must_use]
    pub const fn tag(&self) -> ActorKindTag {
        match self {
            Self::Interactive => ActorKindTag::Interactive,
            Self::Scripted { .. } => ActorKindTag::Scripted,
        }
    }
}

/// Per-actor timing and sampling parameters supplied at registration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActorConfig {
    /// Minimum dwell time in idle before a new trace may begin.
    pub cooldown: Duration,
    /// Total time a scripted actor spends replaying its stroke.
    pub tracing: Duration,
    /// Time a recognized spell spends charging.
    pub loading: Duration,
    /// Minimum distance between consecutive accepted pointer samples.
    pub min_sample_spacing: f32,
    /// Number of ticks in one pointer sampling cycle.
    pub sample_cadence: u32,
    /// Number of ticks in one spark emission cycle.
    pub spark_cadence: u32,
}

impl Default for ActorConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(500),
            tracing: Duration::from_secs(4),
            loading: Duration::from_secs(3),
            min_sample_spacing: 0.25,
            sample_cadence: 4,
            spark_cadence: 4,
        }
    }
}

/// Opaque handle identifying a countdown in the timer service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u32);

impl TimerHandle {
    /// Wraps a raw handle value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw handle value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Length of a countdown, measured in ticks or in simulated time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerSpan {
    /// Number of fixed simulation ticks.
    Ticks(u32),
    /// Duration consumed by the fixed tick slice.
    Time(Duration),
}

/// Audio cues requested by the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cue {
    /// A traced stroke was recognized.
    Recognized,
    /// A loaded spell was fired.
    Shot,
}

/// Particle effects requested while tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticleKind {
    /// A point entered the captured stroke.
    SpellStep,
    /// Decorative spark trailing the pointer.
    Spark,
}

/// Pointer state sampled by an adapter for a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerInput {
    /// Pointer location in world space.
    pub position: Point2,
    /// Whether the primary button is held.
    pub pressed: bool,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances every timer by one fixed tick.
    Tick,
    /// Adds a new actor to the registry.
    RegisterActor {
        /// Side the actor fights for.
        side: Side,
        /// Behaviour variant of the actor.
        kind: ActorKind,
        /// Timing and sampling parameters.
        config: ActorConfig,
    },
    /// Offers a pointer sample to a tracing interactive actor.
    SamplePointer {
        /// Actor receiving the sample.
        actor: ActorId,
        /// Pointer location in world space.
        position: Point2,
    },
    /// Advances a tracing scripted actor by one micro-step of its stroke.
    AdvanceScript {
        /// Actor whose script advances.
        actor: ActorId,
    },
    /// Finishes the current trace with the recognizer's verdict.
    ConcludeTrace {
        /// Actor whose trace ended.
        actor: ActorId,
        /// Pointer position at release, appended to the trace as its last point.
        release: Option<Point2>,
        /// Verdict for the completed stroke, release point included.
        verdict: SpellMatch,
    },
    /// Requests a guarded state transition.
    Transition {
        /// Actor changing state.
        actor: ActorId,
        /// Requested state.
        to: ActorState,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced by one tick.
    TimeAdvanced {
        /// Number of ticks processed so far.
        tick: u64,
    },
    /// Confirms that an actor joined the registry.
    ActorRegistered {
        /// Identifier allocated to the actor.
        actor: ActorId,
        /// Side the actor fights for.
        side: Side,
    },
    /// Reports an accepted state transition.
    StateEntered {
        /// Actor that changed state.
        actor: ActorId,
        /// State before the transition.
        from: ActorState,
        /// State after the transition.
        to: ActorState,
    },
    /// Requests playback of an audio cue.
    CuePlayed {
        /// Actor producing the cue.
        actor: ActorId,
        /// Cue to play.
        cue: Cue,
    },
    /// Requests emission of a particle.
    ParticleEmitted {
        /// Actor producing the particle.
        actor: ActorId,
        /// Particle effect to emit.
        kind: ParticleKind,
        /// World-space location of the particle.
        position: Point2,
    },
    /// Reports that a shot hit the first registered opposing actor.
    ShotResolved {
        /// Actor that fired.
        shooter: ActorId,
        /// Actor that was hit.
        target: ActorId,
        /// Spell that was loaded when the shot fired.
        spell: Option<SpellId>,
    },
    /// Requests that an actor's wand rotate by the provided angle.
    WandSwayed {
        /// Actor whose wand sways.
        actor: ActorId,
        /// Signed rotation in degrees.
        degrees: i32,
    },
}

/// Immutable representation of a single actor's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorSnapshot {
    /// Identifier allocated to the actor.
    pub id: ActorId,
    /// Side the actor fights for.
    pub side: Side,
    /// Behaviour variant of the actor.
    pub kind: ActorKindTag,
    /// Current casting state.
    pub state: ActorState,
    /// Whether the cooldown timer has elapsed.
    pub cooldown_elapsed: bool,
    /// Whether the loading timer has elapsed.
    pub loading_elapsed: bool,
    /// Whether the scripted tracing timer has elapsed.
    pub tracing_elapsed: bool,
    /// Whether a scripted actor has replayed its whole stroke.
    pub script_exhausted: bool,
    /// Stroke captured by the current or most recent trace.
    pub captured: Polyline,
    /// Spell charged by the last successful trace.
    pub loaded_spell: Option<SpellId>,
}

/// Read-only snapshot describing all registered actors.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured actor snapshots in registration order.
    #[must_use]
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for a single actor.
    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots
            .binary_search_by_key(&actor, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }
}
