use std::time::Instant;

const DEFAULT_UPDATES_PER_SECOND: f64 = 60.0;
const MAX_FRAME_TIME: f64 = 0.25; // Don't spiral of death beyond 4 FPS

/// Fixed-rate update clock: wall time is accumulated and paid out in
/// whole `fixed_dt` steps.
pub struct FixedTimeStep {
    fixed_dt: f64,
    accumulator: f64,
    current_time: Instant,
    fixed_time: f64,
    steps: u64,
}

impl Default for FixedTimeStep {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedTimeStep {
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_UPDATES_PER_SECOND)
    }

    /// Rates below 1 Hz (or non-finite) are floored to 1 Hz.
    pub fn with_rate(updates_per_second: f64) -> Self {
        let hz = if updates_per_second.is_finite() { updates_per_second.max(1.0) } else { 1.0 };
        Self {
            fixed_dt: 1.0 / hz,
            accumulator: 0.0,
            current_time: Instant::now(),
            fixed_time: 0.0,
            steps: 0,
        }
    }

    /// Measure wall time since the previous call and run the due steps.
    pub fn update<F>(&mut self, fixed_update: F) -> u32
    where
        F: FnMut(f64),
    {
        let new_time = Instant::now();
        let frame_time = (new_time - self.current_time).as_secs_f64();
        self.current_time = new_time;
        self.advance(frame_time, fixed_update)
    }

    /// Feed `elapsed` seconds and run every whole step now due. Returns the
    /// number of steps run.
    pub fn advance<F>(&mut self, elapsed: f64, mut fixed_update: F) -> u32
    where
        F: FnMut(f64),
    {
        // Clamp frame time to prevent spiral of death
        let clamped = if elapsed.is_finite() { elapsed.clamp(0.0, MAX_FRAME_TIME) } else { 0.0 };
        self.accumulator += clamped;

        let mut ran = 0;
        while self.accumulator >= self.fixed_dt {
            fixed_update(self.fixed_dt);
            self.fixed_time += self.fixed_dt;
            self.accumulator -= self.fixed_dt;
            self.steps += 1;
            ran += 1;
        }
        ran
    }

    pub fn fixed_dt(&self) -> f64 {
        self.fixed_dt
    }

    pub fn fixed_time(&self) -> f64 {
        self.fixed_time
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Fraction of a step left in the accumulator.
    pub fn alpha(&self) -> f64 {
        self.accumulator / self.fixed_dt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_pays_out_whole_steps() {
        let mut ts = FixedTimeStep::with_rate(8.0);
        let mut seen = Vec::new();
        assert_eq!(ts.advance(0.3, |dt| seen.push(dt)), 2);
        assert_eq!(seen, vec![0.125, 0.125]);
        assert!((ts.alpha() - 0.4).abs() < 1e-9);
        assert_eq!(ts.advance(0.1, |_| {}), 1);
        assert_eq!(ts.steps(), 3);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut ts = FixedTimeStep::with_rate(8.0);
        assert_eq!(ts.advance(10.0, |_| {}), 2);
        assert_eq!(ts.advance(-1.0, |_| {}), 0);
        assert_eq!(ts.advance(f64::NAN, |_| {}), 0);
    }

    #[test]
    fn rate_is_floored() {
        assert_eq!(FixedTimeStep::with_rate(0.0).fixed_dt(), 1.0);
    }
}
