//! Pause, single-step and fast-forward controls

/// Host-facing speed controls read by the scheduler on every tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeedControl {
    /// Whether emulation is paused
    paused: bool,
    /// Whether a single frame step was requested (consumed by the next tick)
    step_requested: bool,
    /// Whether fast-forward is held
    fast: bool,
    /// Extra non-rendered frames run per tick while fast-forwarding
    fast_speed: u32,
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self::new(6)
    }
}

impl SpeedControl {
    pub fn new(fast_speed: u32) -> Self {
        Self {
            paused: false,
            step_requested: false,
            fast: false,
            fast_speed,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Set pause state directly; resuming drops any pending step
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        if !paused {
            self.step_requested = false;
        }
    }

    /// Request a single frame step (only works when paused)
    pub fn request_step(&mut self) {
        if self.paused {
            self.step_requested = true;
        }
    }

    pub fn step_requested(&self) -> bool {
        self.step_requested
    }

    /// Consume a pending step request
    pub fn take_step(&mut self) -> bool {
        std::mem::take(&mut self.step_requested)
    }

    pub fn is_fast(&self) -> bool {
        self.fast
    }

    pub fn set_fast(&mut self, fast: bool) {
        self.fast = fast;
    }

    pub fn fast_speed(&self) -> u32 {
        self.fast_speed
    }

    /// Frames emulated per scheduled frame (1 normally)
    pub fn speed_multiplier(&self) -> u32 {
        if self.fast { self.fast_speed + 1 } else { 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let speed = SpeedControl::default();
        assert!(!speed.is_paused());
        assert!(!speed.is_fast());
        assert_eq!(speed.fast_speed(), 6);
        assert_eq!(speed.speed_multiplier(), 1);
    }

    #[test]
    fn test_step_when_paused() {
        let mut speed = SpeedControl::default();
        speed.set_paused(true);
        assert!(!speed.take_step());

        speed.request_step();
        assert!(speed.take_step()); // Consumes the step
        assert!(!speed.take_step());
    }

    #[test]
    fn test_step_ignored_when_running() {
        let mut speed = SpeedControl::default();
        speed.request_step();
        assert!(!speed.step_requested());
    }

    #[test]
    fn test_resume_drops_pending_step() {
        let mut speed = SpeedControl::default();
        speed.toggle_pause();
        speed.request_step();
        speed.toggle_pause();
        assert!(!speed.is_paused());
        assert!(!speed.step_requested());
    }

    #[test]
    fn test_fast_multiplier() {
        let mut speed = SpeedControl::new(3);
        speed.set_fast(true);
        assert_eq!(speed.speed_multiplier(), 4);
    }
}
