//! Per-frame counters and a rolling window of recent frames.

use std::collections::VecDeque;
use std::time::Instant;

/// Frame time budget for 60 FPS presentation.
pub const FRAME_BUDGET_MS: f64 = 16.6;
pub const MEAN_FRAME_BUDGET_MS: f64 = 4.0;
/// More than this many cell uploads per frame means partial updates are not paying off.
pub const UPLOAD_BUDGET_CELLS: u32 = 4096;

/// Frames kept for statistics; five seconds at 60 FPS.
const HISTORY_FRAMES: usize = 300;

#[derive(Debug, Clone, Default)]
pub struct FrameMetrics {
    pub cpu_frame_ms: f64,
    pub cells_uploaded: u32,
    pub surfaces_submitted: u32,
    pub ui_compositions: u32,
    pub sprite_events: u32,
}

/// Summary over the rolling history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameStats {
    pub frames: usize,
    pub cpu_mean_ms: f64,
    pub cpu_p99_ms: f64,
    pub cpu_max_ms: f64,
    pub uploads_mean: f64,
    pub uploads_max: u32,
    pub compositions_mean: f64,
}

#[derive(Debug)]
pub struct MetricsCollector {
    frame: FrameMetrics,
    started: Option<Instant>,
    frames: u64,
    history: VecDeque<FrameMetrics>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            frame: FrameMetrics::default(),
            started: None,
            frames: 0,
            history: VecDeque::with_capacity(HISTORY_FRAMES),
        }
    }

    /// Start timing a frame and reset its counters.
    pub fn begin_frame(&mut self) {
        self.started = Some(Instant::now());
        self.frame = FrameMetrics::default();
    }

    pub fn in_frame(&self) -> bool {
        self.started.is_some()
    }

    /// Stop timing and move the frame into the history. The finished frame
    /// stays readable through [`MetricsCollector::current_metrics`].
    pub fn end_frame(&mut self) {
        if let Some(started) = self.started.take() {
            self.frame.cpu_frame_ms = started.elapsed().as_secs_f64() * 1000.0;
        }
        self.push(self.frame.clone());
    }

    pub fn push(&mut self, frame: FrameMetrics) {
        if self.history.len() == HISTORY_FRAMES {
            self.history.pop_front();
        }
        self.history.push_back(frame);
        self.frames += 1;
    }

    /// One surface submitted with `cells` uploaded.
    pub fn record_upload(&mut self, cells: usize) {
        self.frame.cells_uploaded += cells as u32;
        self.frame.surfaces_submitted += 1;
    }

    pub fn record_composition(&mut self) {
        self.frame.ui_compositions += 1;
    }

    pub fn record_sprite_events(&mut self, count: usize) {
        self.frame.sprite_events += count as u32;
    }

    pub fn current_metrics(&self) -> &FrameMetrics {
        &self.frame
    }

    /// Frames recorded since creation.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// `None` until at least one frame has finished.
    pub fn stats(&self) -> Option<FrameStats> {
        if self.history.is_empty() {
            return None;
        }
        let n = self.history.len() as f64;
        let mut cpu: Vec<f64> = self.history.iter().map(|f| f.cpu_frame_ms).collect();
        cpu.sort_by(f64::total_cmp);
        let p99 = cpu[((cpu.len() - 1) as f64 * 0.99).round() as usize];

        Some(FrameStats {
            frames: self.history.len(),
            cpu_mean_ms: cpu.iter().sum::<f64>() / n,
            cpu_p99_ms: p99,
            cpu_max_ms: cpu.last().copied().unwrap_or_default(),
            uploads_mean: self.history.iter().map(|f| f.cells_uploaded as f64).sum::<f64>() / n,
            uploads_max: self.history.iter().map(|f| f.cells_uploaded).max().unwrap_or(0),
            compositions_mean: self.history.iter().map(|f| f.ui_compositions as f64).sum::<f64>() / n,
        })
    }

    /// Human-readable budget violations over the history window.
    pub fn validate_budgets(&self) -> Vec<String> {
        let Some(stats) = self.stats() else {
            return Vec::new();
        };
        let mut violations = Vec::new();
        if stats.cpu_p99_ms > FRAME_BUDGET_MS {
            violations.push(format!("p99 frame {:.2}ms over the {}ms budget", stats.cpu_p99_ms, FRAME_BUDGET_MS));
        }
        if stats.cpu_mean_ms > MEAN_FRAME_BUDGET_MS {
            violations.push(format!(
                "mean frame {:.2}ms over the {}ms budget",
                stats.cpu_mean_ms, MEAN_FRAME_BUDGET_MS
            ));
        }
        if stats.uploads_max > UPLOAD_BUDGET_CELLS {
            violations.push(format!(
                "{} cells uploaded in one frame, budget {}",
                stats.uploads_max, UPLOAD_BUDGET_CELLS
            ));
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_bounded() {
        let mut m = MetricsCollector::new();
        for _ in 0..310 {
            m.push(FrameMetrics::default());
        }
        assert_eq!(m.history_len(), HISTORY_FRAMES);
        assert_eq!(m.frames(), 310);
    }

    #[test]
    fn stats_cover_the_window() {
        let mut m = MetricsCollector::new();
        assert_eq!(m.stats(), None);
        for ms in [1.0, 2.0, 3.0, 10.0] {
            m.push(FrameMetrics { cpu_frame_ms: ms, cells_uploaded: 4, ..Default::default() });
        }
        let s = m.stats().unwrap();
        assert_eq!(s.frames, 4);
        assert_eq!(s.cpu_mean_ms, 4.0);
        assert_eq!(s.cpu_p99_ms, 10.0);
        assert_eq!(s.cpu_max_ms, 10.0);
        assert_eq!((s.uploads_mean, s.uploads_max), (4.0, 4));
    }

    #[test]
    fn budgets_report_slow_frames_and_upload_storms() {
        let mut m = MetricsCollector::new();
        assert!(m.validate_budgets().is_empty());
        m.push(FrameMetrics { cpu_frame_ms: 20.0, cells_uploaded: 5000, ..Default::default() });
        let v = m.validate_budgets();
        assert_eq!(v.len(), 3, "{v:?}");
        assert!(v[2].starts_with("5000 cells uploaded"));
    }

    #[test]
    fn counters_accumulate_within_a_frame() {
        let mut m = MetricsCollector::new();
        m.begin_frame();
        m.record_upload(10);
        m.record_upload(0);
        m.record_composition();
        m.record_sprite_events(2);
        let f = m.current_metrics();
        assert_eq!((f.cells_uploaded, f.surfaces_submitted, f.ui_compositions, f.sprite_events), (10, 2, 1, 2));
        m.end_frame();
        assert_eq!(m.history_len(), 1);
        assert!(!m.in_frame());
    }
}
