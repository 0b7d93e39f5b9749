//! Frame-difference motion level and stillness tracking over RGB frames.

use crate::window::TemporalWindow;

/// Bytes per pixel of the expected RGBA frame layout.
const BYTES_PER_PIXEL: usize = 4;

/// Configuration for the motion analyzer.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionAnalyzerConfig {
    /// Smoothed motion level at or below which the subject counts as still.
    pub stillness_threshold: f32,
    /// Number of per-frame motion samples retained for smoothing.
    pub history_frames: usize,
    /// Time horizon of the motion window (milliseconds).
    pub window_ms: i64,
    /// Sample every Nth pixel in both axes for throughput.
    pub sample_stride: usize,
    /// Sensitivity gain applied to the raw averaged difference.
    pub amplification: f32,
}

impl Default for MotionAnalyzerConfig {
    fn default() -> Self {
        Self {
            stillness_threshold: 0.05,
            history_frames: 30,
            window_ms: 1000,
            sample_stride: 4,
            amplification: 5.0,
        }
    }
}

/// Motion state reported for one analyzed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionState {
    /// Smoothed motion level in [0, 1].
    pub motion_level: f32,
    /// Whether the level is at or below the stillness threshold.
    pub is_still: bool,
    /// Timestamp of the last detected motion (milliseconds).
    pub last_motion_ms: i64,
    /// Continuous stillness duration so far (milliseconds).
    pub stillness_ms: i64,
}

/// Computes a normalized frame-difference motion level between successive
/// RGB frames and derives stillness duration.
#[derive(Debug, Clone)]
pub struct MotionAnalyzer {
    config: MotionAnalyzerConfig,
    prev_frame: Vec<u8>,
    prev_width: usize,
    prev_height: usize,
    window: TemporalWindow<f32>,
    motion_level: f32,
    last_motion_ms: i64,
    stillness_start_ms: i64,
    primed: bool,
}

impl MotionAnalyzer {
    /// Create an analyzer with the given configuration.
    pub fn new(config: MotionAnalyzerConfig) -> Self {
        let window = TemporalWindow::with_horizon(config.window_ms, config.history_frames);
        Self {
            config,
            prev_frame: Vec::new(),
            prev_width: 0,
            prev_height: 0,
            window,
            motion_level: 0.0,
            last_motion_ms: 0,
            stillness_start_ms: 0,
            primed: false,
        }
    }

    /// Create an analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MotionAnalyzerConfig::default())
    }

    /// Analyze one RGBA frame against the stored baseline.
    ///
    /// The first frame, or any frame after a resolution change, only becomes
    /// the new baseline: motion level 0, still, stillness clock restarted.
    /// The analyzed frame always becomes the baseline for the next call.
    pub fn analyze(&mut self, pixels: &[u8], width: usize, height: usize, now_ms: i64) -> MotionState {
        let frame_bytes = width * height * BYTES_PER_PIXEL;
        if width == 0 || height == 0 || pixels.len() < frame_bytes {
            tracing::warn!(
                width,
                height,
                len = pixels.len(),
                "malformed RGBA frame, skipping motion analysis"
            );
            return self.snapshot(now_ms);
        }

        if !self.primed || self.prev_width != width || self.prev_height != height {
            self.store_baseline(pixels, width, height);
            self.last_motion_ms = now_ms;
            self.stillness_start_ms = now_ms;
            self.motion_level = 0.0;
            return MotionState {
                motion_level: 0.0,
                is_still: true,
                last_motion_ms: now_ms,
                stillness_ms: 0,
            };
        }

        let frame_diff = self.frame_difference(&pixels[..frame_bytes], width, height);

        self.window.push(frame_diff, now_ms);
        let sum: f32 = self.window.iter().map(|s| s.value).sum();
        self.motion_level = sum / self.window.len() as f32;

        let is_motion = self.motion_level > self.config.stillness_threshold;
        if is_motion {
            self.last_motion_ms = now_ms;
            self.stillness_start_ms = now_ms;
        }

        self.store_baseline(pixels, width, height);

        MotionState {
            motion_level: self.motion_level,
            is_still: !is_motion,
            last_motion_ms: self.last_motion_ms,
            stillness_ms: now_ms - self.stillness_start_ms,
        }
    }

    /// Luminance-weighted absolute difference against the stored baseline,
    /// sampled on the configured stride, normalized to [0, 1], then amplified
    /// and clamped.
    fn frame_difference(&self, current: &[u8], width: usize, height: usize) -> f32 {
        let stride = self.config.sample_stride.max(1);
        let mut total_diff = 0.0f32;
        let mut sample_count = 0usize;

        let mut y = 0;
        while y < height {
            let mut x = 0;
            while x < width {
                let idx = (y * width + x) * BYTES_PER_PIXEL;
                let curr_lum = luminance(&current[idx..idx + 3]);
                let prev_lum = luminance(&self.prev_frame[idx..idx + 3]);
                total_diff += (curr_lum - prev_lum).abs() / 255.0;
                sample_count += 1;
                x += stride;
            }
            y += stride;
        }

        if sample_count == 0 {
            return 0.0;
        }

        let avg_diff = total_diff / sample_count as f32;
        (avg_diff * self.config.amplification).min(1.0)
    }

    fn store_baseline(&mut self, pixels: &[u8], width: usize, height: usize) {
        let frame_bytes = width * height * BYTES_PER_PIXEL;
        self.prev_frame.clear();
        self.prev_frame.extend_from_slice(&pixels[..frame_bytes]);
        self.prev_width = width;
        self.prev_height = height;
        self.primed = true;
    }

    fn snapshot(&self, now_ms: i64) -> MotionState {
        MotionState {
            motion_level: self.motion_level,
            is_still: self.motion_level <= self.config.stillness_threshold,
            last_motion_ms: self.last_motion_ms,
            stillness_ms: if self.primed {
                (now_ms - self.stillness_start_ms).max(0)
            } else {
                0
            },
        }
    }

    /// Current smoothed motion level.
    pub fn motion_level(&self) -> f32 {
        self.motion_level
    }

    /// Whole seconds since the last detected motion.
    pub fn seconds_since_motion(&self, now_ms: i64) -> i64 {
        if !self.primed {
            return 0;
        }
        ((now_ms - self.last_motion_ms) / 1000).max(0)
    }

    /// Whether continuous stillness has reached the alert threshold.
    pub fn should_alert_stillness(&self, now_ms: i64, threshold_seconds: i64) -> bool {
        self.primed && self.seconds_since_motion(now_ms) >= threshold_seconds
    }

    /// Drop the baseline, history, and stillness clocks.
    pub fn reset(&mut self) {
        self.prev_frame.clear();
        self.prev_width = 0;
        self.prev_height = 0;
        self.window.clear();
        self.motion_level = 0.0;
        self.last_motion_ms = 0;
        self.stillness_start_ms = 0;
        self.primed = false;
    }
}

/// Rec. 601 luma from the first three channels of an RGBA pixel.
fn luminance(rgb: &[u8]) -> f32 {
    0.299 * rgb[0] as f32 + 0.587 * rgb[1] as f32 + 0.114 * rgb[2] as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: usize = 32;
    const H: usize = 32;

    fn flat_frame(value: u8) -> Vec<u8> {
        vec![value; W * H * BYTES_PER_PIXEL]
    }

    #[test]
    fn test_identical_frames_are_still() {
        let mut analyzer = MotionAnalyzer::with_defaults();
        let frame = flat_frame(120);

        let first = analyzer.analyze(&frame, W, H, 0);
        assert_eq!(first.motion_level, 0.0);
        assert!(first.is_still);

        let second = analyzer.analyze(&frame, W, H, 33);
        assert_eq!(second.motion_level, 0.0);
        assert!(second.is_still);
        assert_eq!(second.stillness_ms, 33);
    }

    #[test]
    fn test_large_change_saturates_motion_level() {
        let mut analyzer = MotionAnalyzer::with_defaults();

        analyzer.analyze(&flat_frame(0), W, H, 0);
        // Every sampled pixel's luminance jumps by 60 (> 20% of 255), so the
        // amplified level clamps at 1.0.
        let state = analyzer.analyze(&flat_frame(60), W, H, 33);

        assert!((state.motion_level - 1.0).abs() < 1e-6);
        assert!(!state.is_still);
        assert_eq!(state.last_motion_ms, 33);
        assert_eq!(state.stillness_ms, 0);
    }

    #[test]
    fn test_stillness_duration_grows_after_motion_stops() {
        let mut analyzer = MotionAnalyzer::with_defaults();

        analyzer.analyze(&flat_frame(0), W, H, 0);
        analyzer.analyze(&flat_frame(200), W, H, 100);

        // Identical frames from here on. The smoothed level stays above the
        // stillness threshold until the spike ages out of the 1000 ms window
        // at t=1200, so the last motion is registered at t=1100.
        let mut state = MotionState::default();
        for i in 1..=40 {
            state = analyzer.analyze(&flat_frame(200), W, H, 100 + i * 100);
        }

        assert!(state.is_still);
        assert_eq!(state.last_motion_ms, 1100);
        assert_eq!(state.stillness_ms, 3000);
        assert_eq!(analyzer.seconds_since_motion(4100), 3);
        assert!(analyzer.should_alert_stillness(4100, 3));
        assert!(!analyzer.should_alert_stillness(4100, 10));
    }

    #[test]
    fn test_resolution_change_rebaselines() {
        let mut analyzer = MotionAnalyzer::with_defaults();

        analyzer.analyze(&flat_frame(0), W, H, 0);
        let smaller = vec![255u8; 16 * 16 * BYTES_PER_PIXEL];
        let state = analyzer.analyze(&smaller, 16, 16, 100);

        // Different dimensions: stored as baseline only, no motion reported.
        assert_eq!(state.motion_level, 0.0);
        assert!(state.is_still);
        assert_eq!(state.stillness_ms, 0);
    }

    #[test]
    fn test_malformed_buffer_is_skipped() {
        let mut analyzer = MotionAnalyzer::with_defaults();
        analyzer.analyze(&flat_frame(10), W, H, 0);

        let truncated = vec![0u8; 10];
        let state = analyzer.analyze(&truncated, W, H, 50);
        assert_eq!(state.motion_level, 0.0);

        // Baseline survives; the next full frame diffs against it.
        let moved = analyzer.analyze(&flat_frame(200), W, H, 100);
        assert!(moved.motion_level > 0.5);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut analyzer = MotionAnalyzer::with_defaults();
        analyzer.analyze(&flat_frame(0), W, H, 0);
        analyzer.analyze(&flat_frame(255), W, H, 100);

        analyzer.reset();
        analyzer.reset();

        assert_eq!(analyzer.motion_level(), 0.0);
        assert_eq!(analyzer.seconds_since_motion(10_000), 0);
        assert!(!analyzer.should_alert_stillness(10_000, 1));
    }
}
