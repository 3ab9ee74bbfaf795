//! Small deterministic helpers for demo and effect code.

use std::f32::consts::TAU;

/// xorshift64* generator. Not cryptographic; reproducible from its seed.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        // Zero is a fixed point of xorshift.
        let state = if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed };
        Self { state }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    pub fn next_u32(&mut self) -> u32 {
        (self.next_u64() >> 32) as u32
    }

    /// Uniform in `[0, 1)`.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    /// Uniform in `lo..hi`; returns `lo` for an empty range.
    pub fn range(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        let span = (hi as i64 - lo as i64) as u64;
        (lo as i64 + (self.next_u64() % span) as i64) as i32
    }

    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p
    }
}

/// Lookup-table sine/cosine with linear interpolation.
#[derive(Debug, Clone)]
pub struct FastTrig {
    table: Vec<f32>,
}

impl FastTrig {
    pub const DEFAULT_RESOLUTION: usize = 1024;

    pub fn new() -> Self {
        Self::with_resolution(Self::DEFAULT_RESOLUTION)
    }

    pub fn with_resolution(steps: usize) -> Self {
        let steps = steps.max(4);
        let table = (0..=steps).map(|i| (i as f32 / steps as f32 * TAU).sin()).collect();
        Self { table }
    }

    pub fn sin(&self, angle: f32) -> f32 {
        if !angle.is_finite() {
            return 0.0;
        }
        let steps = (self.table.len() - 1) as f32;
        let t = angle.rem_euclid(TAU) / TAU * steps;
        let i = (t as usize).min(self.table.len() - 2);
        let frac = t - i as f32;
        self.table[i] + (self.table[i + 1] - self.table[i]) * frac
    }

    pub fn cos(&self, angle: f32) -> f32 {
        self.sin(angle + TAU / 4.0)
    }
}

impl Default for FastTrig {
    fn default() -> Self {
        Self::new()
    }
}
