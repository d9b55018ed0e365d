use std::time::Instant;

/// Monotonic seconds anchored at construction. Gameplay timestamps are plain
/// `f64` seconds from one of these, so tests inject their own numbers and
/// never sleep.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    #[inline(always)]
    pub fn now_s(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Local wall-clock time as HH:MM:SS for the gym clock display.
pub fn wall_clock_hhmmss() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}
