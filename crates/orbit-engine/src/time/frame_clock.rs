use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the clock was created. Never decreases.
    pub elapsed: f64,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// One clock per render loop. The epoch is fixed at construction and is
/// never reset, so animation driven by `elapsed` does not jump.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock with an explicit epoch.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            frame_index: 0,
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let ft = FrameTime {
            elapsed: Instant::now()
                .saturating_duration_since(self.start)
                .as_secs_f64(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn ticks_are_monotonic() {
        let mut clock = FrameClock::new();
        let mut last = clock.tick();
        for _ in 0..100 {
            let next = clock.tick();
            assert!(next.elapsed >= last.elapsed);
            assert_eq!(next.frame_index, last.frame_index + 1);
            last = next;
        }
    }

    #[test]
    fn elapsed_counts_from_epoch() {
        let epoch = Instant::now() - Duration::from_secs(2);
        let mut clock = FrameClock::starting_at(epoch);
        assert!(clock.tick().elapsed >= 2.0);
    }

    #[test]
    fn first_tick_is_frame_zero() {
        assert_eq!(FrameClock::new().tick().frame_index, 0);
    }
}
