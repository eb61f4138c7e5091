//! Free-running frame throttle
//!
//! Converts wall-clock milliseconds into a count of due frames without
//! accumulating rounding drift. The virtual frame rate is in hundredths of
//! Hz, so `virtual_fps` frames fit in [`RECALC_INTERVAL`] milliseconds.

/// Milliseconds per `virtual_fps` frames (100 s expressed at centi-Hz)
pub const RECALC_INTERVAL: u64 = 100_000;

/// Throttle state carried between ticks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerClock {
    virtual_fps: u32,
    max_catch_up: u32,
    /// Reference timestamp the debt is measured from
    last_ms: u64,
    /// Sub-millisecond remainder of emitted frames, scaled by `virtual_fps`.
    /// Always in `[0, virtual_fps)` between ticks.
    debt: u64,
}

impl SchedulerClock {
    /// `virtual_fps` must be non-zero; [`crate::config::RunConfig::validate`]
    /// rejects zero before a clock is built.
    pub fn new(virtual_fps: u32, max_catch_up: u32) -> Self {
        Self {
            virtual_fps: virtual_fps.max(1),
            max_catch_up,
            last_ms: 0,
            debt: 0,
        }
    }

    /// Restart the throttle at `now_ms`
    pub fn reset(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
        self.debt = 0;
    }

    pub fn virtual_fps(&self) -> u32 {
        self.virtual_fps
    }

    pub fn last_ms(&self) -> u64 {
        self.last_ms
    }

    pub fn debt(&self) -> u64 {
        self.debt
    }

    /// Frames due at `now_ms`, capped at the catch-up limit.
    ///
    /// Frames beyond the cap are dropped rather than carried forward, so a
    /// long stall does not turn into a long burst.
    pub fn advance(&mut self, now_ms: u64) -> u32 {
        let fps = u64::from(self.virtual_fps);
        let elapsed = now_ms.saturating_sub(self.last_ms);
        let scaled = elapsed.saturating_mul(fps);
        if scaled <= self.debt {
            return 0;
        }

        let due = (scaled - self.debt) / RECALC_INTERVAL;
        if due == 0 {
            return 0;
        }

        self.debt += due * RECALC_INTERVAL;
        self.last_ms += self.debt / fps;
        self.debt %= fps;

        u32::try_from(due)
            .unwrap_or(u32::MAX)
            .min(self.max_catch_up)
    }
}
