#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooperative countdowns and cyclic counters advanced once per fixed tick.
//!
//! Nothing in this crate blocks or spawns work. Owners call
//! [`TimerService::tick`] exactly once per simulation step and poll
//! [`TimerService::has_elapsed`] from their guard evaluations. Unknown handles
//! never raise errors: a removed or never-created handle reads as elapsed, and
//! removing it again is a no-op.

mod counter;

use std::{collections::HashMap, time::Duration};

use gesture_cast_core::{TimerHandle, TimerSpan};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub use counter::CyclicCounter;

#[derive(Clone, Copy, Debug)]
struct Timer {
    remaining: TimerSpan,
    elapsed: bool,
}

impl Timer {
    fn advance(&mut self, slice: Duration) {
        if self.elapsed {
            return;
        }

        self.remaining = match self.remaining {
            TimerSpan::Ticks(ticks) => {
                let left = ticks.saturating_sub(1);
                self.elapsed = left == 0;
                TimerSpan::Ticks(left)
            }
            TimerSpan::Time(time) => {
                let left = time.saturating_sub(slice);
                self.elapsed = left.is_zero();
                TimerSpan::Time(left)
            }
        };
    }
}

/// Registry of named countdowns advanced by a fixed tick slice.
#[derive(Debug)]
pub struct TimerService {
    slice: Duration,
    timers: HashMap<TimerHandle, Timer>,
    rng: ChaCha8Rng,
}

impl TimerService {
    /// Creates an empty service whose time-based timers consume `slice` per tick.
    ///
    /// `seed` drives handle allocation so that replays hand out identical
    /// handles.
    #[must_use]
    pub fn new(slice: Duration, seed: u64) -> Self {
        Self {
            slice,
            timers: HashMap::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Starts a countdown and returns a handle unique among live timers.
    pub fn create(&mut self, span: TimerSpan) -> TimerHandle {
        let mut candidate: u32 = self.rng.gen();
        while self.timers.contains_key(&TimerHandle::new(candidate)) {
            candidate = candidate.wrapping_add(1);
        }

        let handle = TimerHandle::new(candidate);
        let _ = self.timers.insert(
            handle,
            Timer {
                remaining: span,
                elapsed: false,
            },
        );
        handle
    }

    /// Advances every live, non-elapsed timer by one tick.
    pub fn tick(&mut self) {
        let slice = self.slice;
        for timer in self.timers.values_mut() {
            timer.advance(slice);
        }
    }

    /// Reports whether the timer elapsed. Unknown handles count as elapsed.
    #[must_use]
    pub fn has_elapsed(&self, handle: TimerHandle) -> bool {
        self.timers.get(&handle).map_or(true, |timer| timer.elapsed)
    }

    /// Deletes the timer. Removing an unknown handle does nothing.
    pub fn remove(&mut self, handle: TimerHandle) {
        let _ = self.timers.remove(&handle);
    }

    /// Remaining whole ticks before the timer elapses, or `None` when unknown.
    ///
    /// Time-based timers are converted through the tick slice, rounding up.
    #[must_use]
    pub fn remaining_ticks(&self, handle: TimerHandle) -> Option<u32> {
        let timer = self.timers.get(&handle)?;
        Some(match timer.remaining {
            TimerSpan::Ticks(ticks) => ticks,
            TimerSpan::Time(time) => ticks_for(time, self.slice),
        })
    }

    /// Remaining simulated time before the timer elapses, or `None` when unknown.
    #[must_use]
    pub fn remaining_time(&self, handle: TimerHandle) -> Option<Duration> {
        let timer = self.timers.get(&handle)?;
        Some(match timer.remaining {
            TimerSpan::Ticks(ticks) => self.slice.saturating_mul(ticks),
            TimerSpan::Time(time) => time,
        })
    }

    /// Number of live timers, elapsed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Reports whether no timers are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

/// Number of ticks of length `slice` needed to consume `time`, rounding up.
///
/// A zero slice never consumes time, so every non-zero duration maps to
/// `u32::MAX`.
#[must_use]
pub fn ticks_for(time: Duration, slice: Duration) -> u32 {
    if time.is_zero() {
        return 0;
    }
    if slice.is_zero() {
        return u32::MAX;
    }

    let time = time.as_nanos();
    let slice = slice.as_nanos();
    let ticks = (time + slice - 1) / slice;
    u32::try_from(ticks).unwrap_or(u32::MAX)
}
