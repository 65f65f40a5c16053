use std::time::Duration;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, after clamping.
    pub dt: Duration,

    /// Timestamp of this tick, measured from the clock's origin.
    pub now: Duration,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    #[inline]
    pub fn dt_secs(&self) -> f32 {
        self.dt.as_secs_f32()
    }
}

/// Frame clock producing `FrameTime` snapshots from caller-supplied timestamps.
///
/// Delta time is clamped so a stalled host (debugger, backgrounded app) does
/// not make running transitions jump straight to their end state.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Duration>,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::ZERO, Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: None,
            frame_index: 0,
            dt_min,
            dt_max,
        }
    }

    /// Forgets the previous timestamp; the next tick reports `dt_min`.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Advances the clock to `now`.
    ///
    /// Timestamps that go backwards are treated as a zero delta.
    pub fn tick(&mut self, now: Duration) -> FrameTime {
        let raw = match self.last {
            Some(last) => now.saturating_sub(last),
            None => Duration::ZERO,
        };
        let dt = raw.clamp(self.dt_min, self.dt_max);
        self.last = Some(now);

        let ft = FrameTime {
            dt,
            now,
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
    use super::*;

    fn ms(v: u64) -> Duration { Duration::from_millis(v) }

    #[test]
    fn first_tick_has_zero_delta() {
        let mut clock = FrameClock::new();
        let ft = clock.tick(ms(500));
        assert_eq!(ft.dt, Duration::ZERO);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn stalls_are_clamped() {
        let mut clock = FrameClock::new();
        clock.tick(ms(0));
        assert_eq!(clock.tick(ms(16)).dt, ms(16));
        assert_eq!(clock.tick(ms(5_000)).dt, ms(250));
    }

    #[test]
    fn backwards_time_is_zero_delta() {
        let mut clock = FrameClock::new();
        clock.tick(ms(100));
        let ft = clock.tick(ms(50));
        assert_eq!(ft.dt, Duration::ZERO);
        assert_eq!(ft.frame_index, 1);
    }
}
