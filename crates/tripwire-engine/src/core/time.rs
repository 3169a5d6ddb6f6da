/// Fixed timestep accumulator.
/// Ensures game logic runs at a consistent rate regardless of frame time.
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt;
        // Cap to prevent spiral of death (max 10 steps per frame)
        self.accumulator = self.accumulator.min(self.dt * 10.0);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Repeating timer with explicit start/stop.
///
/// Stopped timers ignore `tick`. Starting restarts the interval from zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatTimer {
    interval: f32,
    elapsed: f32,
    running: bool,
}

impl RepeatTimer {
    /// Create a stopped timer. Non-positive intervals never fire.
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            elapsed: 0.0,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.elapsed = 0.0;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.elapsed = 0.0;
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Advance by `dt` seconds. Returns how many times the interval elapsed.
    pub fn tick(&mut self, dt: f32) -> u32 {
        if !self.running || !(self.interval > 0.0) {
            return 0;
        }
        self.elapsed += dt;
        let fired = (self.elapsed / self.interval) as u32;
        self.elapsed -= fired as f32 * self.interval;
        fired
    }
}
