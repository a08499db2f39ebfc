//! Tick counter and the day/night phase derived from it.

const TICKS_PER_COUNT: u64 = 4;
const COUNTS_PER_DAY: u64 = 20;
const COUNTS_PER_HALF_DAY: u64 = COUNTS_PER_DAY / 2;

/// Coarse day/night state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DayCycle {
    /// Daylight half of the cycle.
    Day,
    /// Night half of the cycle.
    Night,
}

/// Monotonic tick counter owned by a single world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldClock {
    ticks: u64,
}

impl WorldClock {
    /// Creates a clock starting at tick zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { ticks: 0 }
    }

    /// Creates a clock positioned at an arbitrary tick.
    #[must_use]
    pub const fn at(ticks: u64) -> Self {
        Self { ticks }
    }

    /// Advances the clock by one tick and returns the new counter value.
    pub fn tick(&mut self) -> u64 {
        self.ticks = self.ticks.saturating_add(1);
        self.ticks
    }

    /// Number of ticks elapsed since the clock started.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Day/night phase plus a 0-9 counter of progress through the phase.
    ///
    /// One full cycle spans 80 ticks. The value is a pure function of the
    /// tick counter.
    #[must_use]
    pub const fn phase(&self) -> (DayCycle, u8) {
        let slow = (self.ticks / TICKS_PER_COUNT) % COUNTS_PER_DAY;
        let cycle = if slow > COUNTS_PER_HALF_DAY {
            DayCycle::Night
        } else {
            DayCycle::Day
        };
        (cycle, (slow % COUNTS_PER_HALF_DAY) as u8)
    }
}
