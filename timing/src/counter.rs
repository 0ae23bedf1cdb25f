/// Bounded integer sequence that wraps to the opposite bound when exhausted.
///
/// The range `[min, max]` is inclusive. Increasing counters restart at `min`
/// after passing `max`; decreasing counters restart at `max` after passing
/// `min`. Used as a duty-cycle gate (act only when [`CyclicCounter::get`]
/// reads zero) and as a two-phase alternator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CyclicCounter {
    value: i32,
    min: i32,
    max: i32,
    step: i32,
    start: i32,
    wrapped: bool,
}

impl CyclicCounter {
    /// Creates a counter over `[min, max]` starting at `start`.
    #[must_use]
    pub const fn new(min: i32, max: i32, step: i32, start: i32) -> Self {
        Self {
            value: start,
            min,
            max,
            step,
            start,
            wrapped: false,
        }
    }

    /// Creates a counter running from `start` towards `limit`.
    ///
    /// The step's sign decides which end is the lower bound.
    #[must_use]
    pub const fn with_limit(start: i32, limit: i32, step: i32) -> Self {
        if step >= 0 {
            Self::new(start, limit, step, start)
        } else {
            Self::new(limit, start, step, start)
        }
    }

    /// Duty-cycle gate that reads zero once every `period` calls.
    ///
    /// A period of zero or one opens the gate on every call.
    #[must_use]
    pub fn gate(period: u32) -> Self {
        let max = i32::try_from(period.saturating_sub(1)).unwrap_or(i32::MAX);
        Self::new(0, max, 1, 0)
    }

    /// Returns the current value, then advances it by one step.
    pub fn get(&mut self) -> i32 {
        let current = self.value;
        let next = self.value.saturating_add(self.step);
        self.value = if self.step >= 0 && next > self.max {
            self.wrapped = true;
            self.min
        } else if self.step < 0 && next < self.min {
            self.wrapped = true;
            self.max
        } else {
            next
        };
        current
    }

    /// Restores the starting value and clears the wrap flag.
    pub fn reset(&mut self) {
        self.value = self.start;
        self.wrapped = false;
    }

    /// Reports whether the counter wrapped since construction or the last reset.
    #[must_use]
    pub const fn has_wrapped(&self) -> bool {
        self.wrapped
    }
}
