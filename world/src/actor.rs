use std::time::Duration;

use gesture_cast_core::{
    ActorConfig, ActorId, ActorKind, ActorSnapshot, ActorState, Point2, Polyline, Side, SpellId,
    TimerHandle, TimerSpan,
};
use gesture_cast_timing::{CyclicCounter, TimerService};

const SWAY_PHASE_MIN: i32 = 0;
const SWAY_PHASE_MAX: i32 = 9;
const SWAY_PHASE_START: i32 = 1;
const SWAY_PHASE_MIDPOINT: i32 = 4;

/// Authoritative state of a single registered actor.
#[derive(Debug)]
pub(crate) struct Actor {
    pub(crate) id: ActorId,
    pub(crate) side: Side,
    pub(crate) kind: ActorKind,
    pub(crate) config: ActorConfig,
    pub(crate) state: ActorState,
    pub(crate) cooldown_timer: TimerHandle,
    pub(crate) loading_timer: Option<TimerHandle>,
    pub(crate) tracing_timer: Option<TimerHandle>,
    pub(crate) captured: Polyline,
    pub(crate) loaded_spell: Option<SpellId>,
    sample_gate: CyclicCounter,
    spark_gate: CyclicCounter,
    script_step: usize,
    sway_timer: Option<TimerHandle>,
    sway_phase: CyclicCounter,
}

impl Actor {
    pub(crate) fn new(
        id: ActorId,
        side: Side,
        kind: ActorKind,
        config: ActorConfig,
        timers: &mut TimerService,
        sway_interval: u32,
    ) -> Self {
        let sway_timer =
            (sway_interval > 0).then(|| timers.create(TimerSpan::Ticks(sway_interval)));
        Self {
            id,
            side,
            kind,
            config,
            state: ActorState::Idle,
            cooldown_timer: timers.create(TimerSpan::Time(Duration::ZERO)),
            loading_timer: None,
            tracing_timer: None,
            captured: Polyline::new(),
            loaded_spell: None,
            sample_gate: CyclicCounter::gate(config.sample_cadence),
            spark_gate: CyclicCounter::gate(config.spark_cadence),
            script_step: 0,
            sway_timer,
            sway_phase: CyclicCounter::new(SWAY_PHASE_MIN, SWAY_PHASE_MAX, 1, SWAY_PHASE_START),
        }
    }

    pub(crate) fn snapshot(&self, timers: &TimerService) -> ActorSnapshot {
        let elapsed = |handle: Option<TimerHandle>| handle.map_or(true, |h| timers.has_elapsed(h));
        ActorSnapshot {
            id: self.id,
            side: self.side,
            kind: self.kind.tag(),
            state: self.state,
            cooldown_elapsed: timers.has_elapsed(self.cooldown_timer),
            loading_elapsed: elapsed(self.loading_timer),
            tracing_elapsed: elapsed(self.tracing_timer),
            script_exhausted: self.script_exhausted(),
            captured: self.captured.clone(),
            loaded_spell: self.loaded_spell,
        }
    }

    fn script_exhausted(&self) -> bool {
        match &self.kind {
            ActorKind::Interactive => false,
            ActorKind::Scripted { stroke } => self.script_step >= stroke.len(),
        }
    }

    /// Clears the trace buffer and prepares the kind-specific capture state.
    pub(crate) fn begin_trace(&mut self, timers: &mut TimerService) {
        self.captured.clear();
        match &self.kind {
            ActorKind::Interactive => {
                self.sample_gate.reset();
                self.spark_gate.reset();
            }
            ActorKind::Scripted { .. } => {
                self.script_step = 0;
                self.rearm_tracing(timers);
            }
        }
    }

    pub(crate) fn release_tracing_timer(&mut self, timers: &mut TimerService) {
        if let Some(handle) = self.tracing_timer.take() {
            timers.remove(handle);
        }
    }

    pub(crate) fn rearm_cooldown(&mut self, timers: &mut TimerService) {
        timers.remove(self.cooldown_timer);
        self.cooldown_timer = timers.create(TimerSpan::Time(self.config.cooldown));
    }

    /// Offers a pointer sample, returning whether it entered the trace and
    /// whether a spark is due on this tick.
    pub(crate) fn sample(&mut self, position: Point2) -> (bool, bool) {
        let mut accepted = false;
        if self.sample_gate.get() == 0 {
            let spaced = self.captured.last().map_or(true, |last| {
                last.distance(position) >= self.config.min_sample_spacing
            });
            if spaced {
                self.captured.push(position);
                accepted = true;
            }
        }
        let spark = self.spark_gate.get() == 0;
        (accepted, spark)
    }

    /// Replays the next point of a scripted stroke once the micro-step timer
    /// elapsed.
    pub(crate) fn advance_script(&mut self, timers: &mut TimerService) -> Option<Point2> {
        let elapsed = self
            .tracing_timer
            .map_or(true, |handle| timers.has_elapsed(handle));
        if !elapsed {
            return None;
        }

        let ActorKind::Scripted { stroke } = &self.kind else {
            return None;
        };
        let point = stroke.points().get(self.script_step).copied()?;
        self.captured.push(point);
        self.script_step += 1;
        self.rearm_tracing(timers);
        Some(point)
    }

    fn rearm_tracing(&mut self, timers: &mut TimerService) {
        self.release_tracing_timer(timers);
        let ActorKind::Scripted { stroke } = &self.kind else {
            return;
        };
        let steps = u32::try_from(stroke.len().max(1)).unwrap_or(u32::MAX);
        let micro_step = self.config.tracing / steps;
        self.tracing_timer = Some(timers.create(TimerSpan::Time(micro_step)));
    }

    /// Re-arms the sway timer when it elapsed and returns the signed angle.
    pub(crate) fn sway(
        &mut self,
        timers: &mut TimerService,
        interval: u32,
        degrees: i32,
    ) -> Option<i32> {
        let handle = self.sway_timer?;
        if !timers.has_elapsed(handle) {
            return None;
        }

        timers.remove(handle);
        self.sway_timer = Some(timers.create(TimerSpan::Ticks(interval)));
        if self.sway_phase.get() > SWAY_PHASE_MIDPOINT {
            Some(-degrees)
        } else {
            Some(degrees)
        }
    }
}
