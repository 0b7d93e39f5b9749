//! Heuristic pose classification with majority-vote hysteresis.

use crate::domain::{Detection, PoseLabel};
use crate::window::TemporalWindow;

/// Configuration for the pose classifier.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseClassifierConfig {
    /// Retained (label, confidence) samples.
    pub history_capacity: usize,
    /// How many of the most recent samples vote on the stabilized label.
    pub vote_span: usize,
    /// Vote count that promotes a label unconditionally.
    pub promote_count: usize,
    /// Vote count that promotes a label when backed by high confidence.
    pub confident_count: usize,
    /// Average confidence required for the lower vote count.
    pub confident_threshold: f32,
    /// Per-tick confidence decay applied while no person is detected.
    pub dropout_decay: f32,
}

impl Default for PoseClassifierConfig {
    fn default() -> Self {
        Self {
            history_capacity: 100,
            vote_span: 10,
            promote_count: 5,
            confident_count: 3,
            confident_threshold: 0.7,
            dropout_decay: 0.95,
        }
    }
}

/// Stabilized pose state: the active label, the label before the last change,
/// the vote confidence, and when the last change happened.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoseState {
    /// Currently promoted label.
    pub current: PoseLabel,
    /// Label active before the last promotion.
    pub previous: PoseLabel,
    /// Confidence in [0, 1] for the winning label of the last vote.
    pub confidence: f32,
    /// Timestamp of the last label change (milliseconds), unset until a
    /// promotion has happened in this session.
    pub changed_at_ms: Option<i64>,
}

/// Maps bounding-box geometry to a pose label and stabilizes the result over
/// a bounded history window.
#[derive(Debug, Clone)]
pub struct PoseClassifier {
    config: PoseClassifierConfig,
    history: TemporalWindow<(PoseLabel, f32)>,
    state: PoseState,
}

impl PoseClassifier {
    /// Create a classifier with the given configuration.
    pub fn new(config: PoseClassifierConfig) -> Self {
        let history = TemporalWindow::new(config.history_capacity);
        Self {
            config,
            history,
            state: PoseState::default(),
        }
    }

    /// Create a classifier with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(PoseClassifierConfig::default())
    }

    /// Raw per-frame label from box geometry.
    ///
    /// Deterministic decision table, first matching row wins:
    ///
    /// | aspect              | vertical center | label    |
    /// |---------------------|-----------------|----------|
    /// | > 2.0               | > 0.7           | Fallen   |
    /// | > 1.5               | any             | Lying    |
    /// | < 0.5               | any             | Standing |
    /// | < 1.0               | > 0.4           | Sitting  |
    /// | < 0.7               | <= 0.4          | Standing |
    /// | otherwise           |                 | Unknown  |
    pub fn classify_geometry(aspect_ratio: f32, center_y: f32) -> PoseLabel {
        if aspect_ratio > 2.0 && center_y > 0.7 {
            PoseLabel::Fallen
        } else if aspect_ratio > 1.5 {
            PoseLabel::Lying
        } else if aspect_ratio < 0.5 {
            PoseLabel::Standing
        } else if aspect_ratio < 1.0 && center_y > 0.4 {
            PoseLabel::Sitting
        } else if aspect_ratio < 0.7 {
            PoseLabel::Standing
        } else {
            PoseLabel::Unknown
        }
    }

    /// Feed one tick's dominant person detection (or its absence).
    ///
    /// With a person present, the raw label joins the history and the
    /// majority vote may promote a new stabilized label. Without one, the
    /// previous label is kept and its confidence decays, modeling growing
    /// uncertainty through detection dropout rather than discarding state.
    pub fn update(&mut self, person: Option<&Detection>, frame_height: f32, now_ms: i64) {
        let person = match person {
            Some(person) => person,
            None => {
                self.state.confidence *= self.config.dropout_decay;
                return;
            }
        };

        let raw = Self::classify_geometry(
            person.aspect_ratio(),
            person.center_y_normalized(frame_height),
        );
        self.history.push((raw, person.confidence), now_ms);
        self.stabilize(now_ms);
    }

    /// Majority vote over the most recent samples with confidence hysteresis.
    fn stabilize(&mut self, now_ms: i64) {
        let mut counts = [0usize; PoseLabel::ALL.len()];
        let mut confidence_sums = [0.0f32; PoseLabel::ALL.len()];

        for sample in self.history.iter().rev().take(self.config.vote_span) {
            let (label, confidence) = sample.value;
            let idx = label.ordinal() as usize;
            counts[idx] += 1;
            confidence_sums[idx] += confidence;
        }

        // Ties resolve to the first label in ordinal order.
        let mut best_label = PoseLabel::Unknown;
        let mut best_count = 0usize;
        let mut best_confidence = 0.0f32;
        for label in PoseLabel::ALL {
            let idx = label.ordinal() as usize;
            if counts[idx] > best_count {
                best_count = counts[idx];
                best_label = label;
                best_confidence = confidence_sums[idx] / counts[idx] as f32;
            }
        }

        let promoted = best_count >= self.config.promote_count
            || (best_count >= self.config.confident_count
                && best_confidence > self.config.confident_threshold);

        if promoted && best_label != self.state.current {
            tracing::debug!(
                from = %self.state.current,
                to = %best_label,
                votes = best_count,
                "pose changed"
            );
            self.state.previous = self.state.current;
            self.state.current = best_label;
            self.state.changed_at_ms = Some(now_ms);
        }

        self.state.confidence = best_confidence;
    }

    /// Current stabilized pose state.
    pub fn state(&self) -> &PoseState {
        &self.state
    }

    /// Currently promoted label.
    pub fn current(&self) -> PoseLabel {
        self.state.current
    }

    /// Label active before the last change.
    pub fn previous(&self) -> PoseLabel {
        self.state.previous
    }

    /// Whether the stabilized label changed within the given window. Always
    /// false before the first promotion of a session.
    pub fn has_pose_changed(&self, now_ms: i64, within_seconds: i64) -> bool {
        match self.state.changed_at_ms {
            Some(changed_at) => now_ms - changed_at < within_seconds * 1000,
            None => false,
        }
    }

    /// Whole seconds the current label has been active, or zero before the
    /// first promotion of a session.
    pub fn time_in_current_pose(&self, now_ms: i64) -> i64 {
        match self.state.changed_at_ms {
            Some(changed_at) => ((now_ms - changed_at) / 1000).max(0),
            None => 0,
        }
    }

    /// Clear history and return to the Unknown state.
    pub fn reset(&mut self) {
        self.history.clear();
        self.state = PoseState::default();
    }
}
