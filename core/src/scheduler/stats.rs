//! Frame counters and the FPS meter

use std::time::Instant;

/// Rendered frames between FPS recomputations
pub const FPS_SAMPLE_FRAMES: u64 = 30;

/// Running frame totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounters {
    /// Frames advanced since the scheduler was created
    pub frames_emulated: u64,
    /// Position of the machine in emulated frames
    pub current_frame: u64,
    /// Frames that produced an image
    pub frames_rendered: u64,
}

/// Rendered-frame rate sampled every [`FPS_SAMPLE_FRAMES`] frames
#[derive(Debug, Clone, Default)]
pub struct FpsMeter {
    next_sample: u64,
    previous_frames: u64,
    previous_time: Option<Instant>,
    fps: Option<f64>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest measured rate, once two samples have been taken
    pub fn fps(&self) -> Option<f64> {
        self.fps
    }

    /// Feed the rendered-frame total after a rendered frame.
    ///
    /// `multiplier` scales the measured rate to account for frames emulated
    /// but never rendered (fast-forward). Returns the new rate when one was
    /// computed.
    pub fn on_rendered(&mut self, frames_rendered: u64, now: Instant, multiplier: u32) -> Option<f64> {
        if frames_rendered <= self.next_sample {
            return None;
        }
        self.next_sample = frames_rendered + FPS_SAMPLE_FRAMES;

        let sample = self.previous_time.and_then(|previous| {
            let secs = now.checked_duration_since(previous)?.as_secs_f64();
            (secs > 0.0).then(|| {
                (frames_rendered - self.previous_frames) as f64 / secs * f64::from(multiplier)
            })
        });

        self.previous_time = Some(now);
        self.previous_frames = frames_rendered;
        if let Some(fps) = sample {
            tracing::debug!("{fps:.2} fps");
            self.fps = Some(fps);
        }
        sample
    }
}
