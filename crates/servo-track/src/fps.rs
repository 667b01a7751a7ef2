use std::collections::VecDeque;
use std::time::Instant;

/// Frame-rate estimate over a sliding window of recent ticks.
#[derive(Clone, Debug)]
pub struct FpsCounter {
    ticks: VecDeque<Instant>,
    window: usize,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(16)
    }
}

impl FpsCounter {
    /// `window` is the number of ticks kept (at least 2).
    pub fn new(window: usize) -> Self {
        let window = window.max(2);
        Self {
            ticks: VecDeque::with_capacity(window),
            window,
        }
    }

    /// Mark the start of a frame.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    pub fn tick_at(&mut self, now: Instant) {
        if self.ticks.len() == self.window {
            self.ticks.pop_front();
        }
        self.ticks.push_back(now);
    }

    /// Frames per second over the window; 0 until two ticks are recorded.
    pub fn fps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.ticks.front(), self.ticks.back()) else {
            return 0.0;
        };
        let span = last.duration_since(*first).as_secs_f64();
        if self.ticks.len() < 2 || span <= 0.0 {
            return 0.0;
        }
        (self.ticks.len() - 1) as f64 / span
    }

    pub fn reset(&mut self) {
        self.ticks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::time::Duration;

    #[test]
    fn needs_two_ticks() {
        let mut fps = FpsCounter::default();
        assert_eq!(fps.fps(), 0.0);
        fps.tick();
        assert_eq!(fps.fps(), 0.0);
    }

    #[test]
    fn steady_rate_is_measured() {
        let mut fps = FpsCounter::new(4);
        let t0 = Instant::now();
        for i in 0..10u32 {
            fps.tick_at(t0 + Duration::from_millis(40) * i);
        }
        assert_relative_eq!(fps.fps(), 25.0, max_relative = 1e-9);
    }
}
