use std::time::{Duration, Instant};

/// Monotonic scene clock
///
/// Starts when the scene is loaded and is never reset.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    start: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds elapsed since the clock started
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_time_never_decreases() {
        let clock = Clock::start();
        let first = clock.elapsed_secs();
        let second = clock.elapsed_secs();
        assert!(first >= 0.0);
        assert!(second >= first);
    }
}
