use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::game::clock::MonotonicClock;

/// Fixed-rate repeating tick task. The callback fires every frame regardless
/// of game phase; skipping work while paused is the callback's decision, so
/// resuming never needs re-registration. Cancellation is explicit through
/// [`Ticker::stop`] (also run on drop), never implicit.
pub struct Ticker {
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<F>(rate_hz: u32, clock: MonotonicClock, mut on_tick: F) -> Self
    where
        F: FnMut(f64) + Send + 'static,
    {
        let rate = u64::from(rate_hz.max(1));
        let tick_duration = Duration::from_nanos(1_000_000_000 / rate);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name("gymgrip-tick".into())
            .spawn(move || {
                let mut next_tick = Instant::now();
                while !stop_flag.load(Ordering::Relaxed) {
                    on_tick(clock.now_s());
                    next_tick += tick_duration;
                    let now = Instant::now();
                    if next_tick > now {
                        thread::sleep(next_tick - now);
                    } else {
                        // Fell behind; resynchronize instead of bursting.
                        next_tick = now;
                    }
                }
            });
        match handle {
            Ok(handle) => Self {
                stop,
                handle: Some(handle),
            },
            Err(e) => {
                warn!("Could not spawn tick thread: {e}");
                Self { stop, handle: None }
            }
        }
    }

    /// Stops the loop and waits for the thread to wind down.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
