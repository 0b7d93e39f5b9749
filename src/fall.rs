//! Threshold-based fall detection over rolling 3D position history.

use crate::domain::Position3D;
use crate::window::TemporalWindow;

/// Confidence reported when both the drop and velocity thresholds fire.
const FALL_CONFIDENCE: f32 = 0.9;
/// Confidence for a drop without fall velocity (e.g. sitting down). Reported
/// as ambiguous, not as "no event".
const AMBIGUOUS_DROP_CONFIDENCE: f32 = 0.3;

/// Configuration for the fall detector.
///
/// The thresholds are hand-tuned operating points carried over from field
/// calibration, not statistically derived.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FallDetectorConfig {
    /// Vertical drop within the window that qualifies as a fall (meters).
    pub drop_threshold_m: f32,
    /// Descent velocity that qualifies as a fall (meters/second).
    pub velocity_threshold_m_s: f32,
    /// Time horizon of the position window (milliseconds).
    pub window_ms: i64,
    /// Maximum retained position samples (~1 second at 30 fps).
    pub max_history: usize,
}

impl Default for FallDetectorConfig {
    fn default() -> Self {
        Self {
            drop_threshold_m: 0.5,
            velocity_threshold_m_s: 1.5,
            window_ms: 1000,
            max_history: 30,
        }
    }
}

/// One fall decision derived from the current position window.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FallAssessment {
    /// Whether a fall fired this tick.
    pub fall_detected: bool,
    /// How far the subject dropped relative to the window's highest point
    /// (meters, down-positive y convention).
    pub vertical_drop_m: f32,
    /// Descent speed over the window endpoints (meters/second).
    pub drop_velocity_m_s: f32,
    /// Current height above the assumed floor (meters).
    pub current_height_m: f32,
    /// Decision confidence in [0, 1]. 0.3 marks an ambiguous slow descent.
    pub confidence: f32,
}

/// Derives vertical-drop and drop-velocity metrics from a bounded window of
/// 3D positions and emits a per-tick fall decision.
#[derive(Debug, Clone)]
pub struct FallDetector {
    config: FallDetectorConfig,
    history: TemporalWindow<Position3D>,
    last_position: Position3D,
    last_distance_m: f32,
}

impl FallDetector {
    /// Create a detector with the given configuration.
    pub fn new(config: FallDetectorConfig) -> Self {
        let history = TemporalWindow::with_horizon(config.window_ms, config.max_history);
        Self {
            config,
            history,
            last_position: Position3D::UNMEASURED,
            last_distance_m: 0.0,
        }
    }

    /// Create a detector with default thresholds.
    pub fn with_defaults() -> Self {
        Self::new(FallDetectorConfig::default())
    }

    /// Feed one position observation and derive the fall decision.
    ///
    /// An unmeasured position (z == 0) is a strict no-op: nothing is appended
    /// and the previous derived state is untouched; the window simply ages
    /// out on later ticks.
    pub fn observe(&mut self, position: Position3D, now_ms: i64) -> FallAssessment {
        if !position.is_measured() {
            return FallAssessment::default();
        }

        self.history.push(position, now_ms);

        let vertical_drop_m = self.vertical_drop();
        let drop_velocity_m_s = self.drop_velocity();

        let rapid_drop = vertical_drop_m > self.config.drop_threshold_m;
        let high_velocity = drop_velocity_m_s > self.config.velocity_threshold_m_s;

        let (fall_detected, confidence) = if rapid_drop && high_velocity {
            (true, FALL_CONFIDENCE)
        } else if rapid_drop {
            (false, AMBIGUOUS_DROP_CONFIDENCE)
        } else {
            (false, 0.0)
        };

        if fall_detected {
            tracing::info!(
                drop_m = vertical_drop_m,
                velocity_m_s = drop_velocity_m_s,
                "fall detected"
            );
        }

        self.last_position = position;
        self.last_distance_m = position.z;

        FallAssessment {
            fall_detected,
            vertical_drop_m,
            drop_velocity_m_s,
            current_height_m: position.height_above_floor(),
            confidence,
        }
    }

    /// Drop of the newest sample below the window's highest point. The y axis
    /// is down-positive, so the highest point is the minimum y.
    fn vertical_drop(&self) -> f32 {
        if self.history.len() < 2 {
            return 0.0;
        }

        let mut min_y = f32::INFINITY;
        for sample in self.history.iter() {
            min_y = min_y.min(sample.value.y);
        }
        // self.history.len() >= 2, back() exists
        let current_y = self.history.back().map(|s| s.value.y).unwrap_or(0.0);

        current_y - min_y
    }

    /// Descent velocity between the oldest and newest window entries, in
    /// meters/second. Zero with fewer than two entries or a non-positive
    /// time delta.
    fn drop_velocity(&self) -> f32 {
        if self.history.len() < 2 {
            return 0.0;
        }

        let (first, last) = match (self.history.front(), self.history.back()) {
            (Some(first), Some(last)) => (first, last),
            _ => return 0.0,
        };

        let delta_ms = last.timestamp_ms - first.timestamp_ms;
        if delta_ms <= 0 {
            return 0.0;
        }

        let y_delta = last.value.y - first.value.y;
        y_delta / (delta_ms as f32 / 1000.0)
    }

    /// Most recent measured position.
    pub fn last_position(&self) -> Position3D {
        self.last_position
    }

    /// Most recent camera-to-subject distance (meters).
    pub fn last_distance_m(&self) -> f32 {
        self.last_distance_m
    }

    /// Number of positions currently retained.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Clear history and last measurements.
    pub fn reset(&mut self) {
        self.history.clear();
        self.last_position = Position3D::UNMEASURED;
        self.last_distance_m = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_height(y: f32) -> Position3D {
        Position3D::new(0.0, y, 2.0)
    }

    #[test]
    fn test_rapid_drop_is_a_fall() {
        let mut detector = FallDetector::with_defaults();

        // 0.7 m descent over 300 ms: drop 0.7 m, velocity ~2.33 m/s.
        let mut assessment = FallAssessment::default();
        for (i, y) in [0.0, 0.2, 0.45, 0.7].iter().enumerate() {
            assessment = detector.observe(at_height(*y), i as i64 * 100);
        }

        assert!(assessment.fall_detected);
        assert!((assessment.confidence - 0.9).abs() < 1e-6);
        assert!(assessment.vertical_drop_m > 0.5);
        assert!(assessment.drop_velocity_m_s > 1.5);
    }

    #[test]
    fn test_slow_descent_is_ambiguous_not_a_fall() {
        let mut detector = FallDetector::with_defaults();

        // Same 0.7 m drop but spanning the whole window: ~0.71 m/s. The drop
        // threshold fires without fall velocity, e.g. sitting down.
        detector.observe(at_height(0.0), 0);
        let assessment = detector.observe(at_height(0.7), 990);

        assert!(!assessment.fall_detected);
        assert!((assessment.confidence - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_stationary_subject_scores_zero() {
        let mut detector = FallDetector::with_defaults();

        let mut assessment = FallAssessment::default();
        for i in 0..10 {
            assessment = detector.observe(at_height(0.1), i * 100);
        }

        assert!(!assessment.fall_detected);
        assert_eq!(assessment.confidence, 0.0);
        assert!(assessment.vertical_drop_m.abs() < 1e-6);
    }

    #[test]
    fn test_unmeasured_position_is_no_op() {
        let mut detector = FallDetector::with_defaults();
        detector.observe(at_height(0.0), 0);

        let assessment = detector.observe(Position3D::UNMEASURED, 100);
        assert_eq!(assessment, FallAssessment::default());
        assert_eq!(detector.history_len(), 1);
        // Last measurement untouched.
        assert!((detector.last_distance_m() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_old_drop_ages_out_of_window() {
        let mut detector = FallDetector::with_defaults();
        detector.observe(at_height(0.0), 0);

        // A descent completed long ago must not keep firing: by t=5000 the
        // high starting point has been evicted.
        detector.observe(at_height(0.7), 400);
        let assessment = detector.observe(at_height(0.7), 5000);

        assert!(!assessment.fall_detected);
        assert_eq!(assessment.confidence, 0.0);
    }

    #[test]
    fn test_height_tracks_every_valid_observation() {
        let mut detector = FallDetector::with_defaults();
        let assessment = detector.observe(at_height(0.4), 0);

        assert!((assessment.current_height_m + 0.4).abs() < 1e-6);
        assert!((detector.last_position().y - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut detector = FallDetector::with_defaults();
        detector.observe(at_height(0.3), 0);

        detector.reset();
        detector.reset();

        assert_eq!(detector.history_len(), 0);
        assert!(!detector.last_position().is_measured());
        assert_eq!(detector.last_distance_m(), 0.0);
    }
}
