//! # Triage Fusion
//!
//! Sensor-fusion and temporal-state engine for an unattended
//! patient-monitoring camera.
//!
//! The crate fuses per-frame 2D person detections, a depth sensor frame, and
//! RGB pixel deltas into a temporally-stable clinical signal: current body
//! pose, fall events, proximity to a configured bed zone, and
//! motion/stillness state. All temporal reasoning uses explicit bounded
//! history windows; there is no learned temporal model and no persistence
//! across restarts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      triage-fusion                       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌──────────────┐   ┌────────────────┐    │
//! │  │  Depth   │   │   Motion     │   │     Pose       │    │
//! │  │ Context  │   │   Context    │   │    Context     │    │
//! │  └────┬─────┘   └──────┬───────┘   └───────┬────────┘    │
//! │       └────────────────┼───────────────────┘             │
//! │                        │                                 │
//! │               ┌────────▼────────┐                        │
//! │               │  Fusion Engine  │  one instance per      │
//! │               │   (per tick)    │  monitored subject     │
//! │               └─────────────────┘                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The object-detection network, the vision-language model, and the platform
//! bridge marshaling frames across the language boundary are external
//! collaborators: the engine consumes their outputs and produces one fused
//! [`TickResult`](engine::TickResult) per processing tick.
//!
//! ## Example
//!
//! ```rust
//! use triage_fusion::prelude::*;
//!
//! let mut engine = FusionEngine::with_defaults();
//!
//! let rgb = vec![0u8; 64 * 64 * 4];
//! let depth = vec![2000u16; 32 * 32];
//! let detections = [Detection {
//!     x1: 24.0,
//!     y1: 8.0,
//!     x2: 40.0,
//!     y2: 56.0,
//!     confidence: 0.9,
//!     class_id: PERSON_CLASS_ID,
//! }];
//!
//! let result = engine.process_tick(&TickInput {
//!     rgb_pixels: &rgb,
//!     rgb_width: 64,
//!     rgb_height: 64,
//!     detections: &detections,
//!     depth: Some(DepthUpdate { samples: &depth, width: 32, height: 32 }),
//!     upstream_fall_hint: false,
//!     timestamp_ms: 0,
//! });
//!
//! assert!(result.person_detected);
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod classifier;
pub mod depth;
pub mod domain;
pub mod engine;
pub mod fall;
pub mod motion;
pub mod window;
pub mod zone;

// Re-export main types
pub use classifier::{PoseClassifier, PoseClassifierConfig, PoseState};
pub use depth::{DepthFrame, Projector, RegionStats};
pub use domain::{
    detection::{screen_fall_hint, select_person, Detection, PERSON_CLASS_ID},
    geometry::{BoundingBox, CameraIntrinsics, Position3D, DEFAULT_FOCAL_LENGTH_PX},
    pose::PoseLabel,
};
pub use engine::{DepthUpdate, FusionEngine, SubjectId, TickInput, TickResult};
pub use fall::{FallAssessment, FallDetector, FallDetectorConfig};
pub use motion::{MotionAnalyzer, MotionAnalyzerConfig, MotionState};
pub use window::{TemporalWindow, Timestamped};
pub use zone::BedZone;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common result type for fusion operations
pub type Result<T> = std::result::Result<T, FusionError>;

/// Unified error type for fusion operations.
///
/// Per-tick "no data" conditions are not errors: they resolve to sentinel
/// values so the calling pipeline keeps running every frame. Errors are
/// reserved for contract violations the integrating bridge should log.
#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    /// A depth frame disagreed with the already-configured dimensions.
    #[error(
        "depth frame size mismatch: expected {expected_width}x{expected_height}, \
         got {width}x{height}"
    )]
    DepthDimensionMismatch {
        /// Configured width.
        expected_width: u32,
        /// Configured height.
        expected_height: u32,
        /// Offered width.
        width: u32,
        /// Offered height.
        height: u32,
    },

    /// A depth buffer's length did not match its stated dimensions.
    #[error("depth buffer holds {actual} samples, dimensions require {expected}")]
    DepthBufferLength {
        /// width * height of the offered frame.
        expected: usize,
        /// Samples actually provided.
        actual: usize,
    },
}

/// Top-level configuration for one monitored subject.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Confidence floor below which person detections are ignored.
    pub min_person_confidence: f32,
    /// Fall detector thresholds and window.
    pub fall: fall::FallDetectorConfig,
    /// Motion analyzer thresholds and window.
    pub motion: motion::MotionAnalyzerConfig,
    /// Pose classifier vote parameters.
    pub pose: classifier::PoseClassifierConfig,
    /// Initial bed zone; reconfigurable at any time on the engine.
    pub bed_zone: zone::BedZone,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            min_person_confidence: 0.5,
            fall: fall::FallDetectorConfig::default(),
            motion: motion::MotionAnalyzerConfig::default(),
            pose: classifier::PoseClassifierConfig::default(),
            bed_zone: zone::BedZone::default(),
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration builder.
    pub fn builder() -> MonitorConfigBuilder {
        MonitorConfigBuilder::default()
    }
}

/// Builder for [`MonitorConfig`].
#[derive(Debug, Default)]
pub struct MonitorConfigBuilder {
    config: MonitorConfig,
}

impl MonitorConfigBuilder {
    /// Set the person-detection confidence floor.
    pub fn min_person_confidence(mut self, confidence: f32) -> Self {
        self.config.min_person_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Set the stillness threshold on the smoothed motion level.
    pub fn stillness_threshold(mut self, threshold: f32) -> Self {
        self.config.motion.stillness_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Set the number of frames of motion history to retain.
    pub fn motion_history_frames(mut self, frames: usize) -> Self {
        self.config.motion.history_frames = frames.max(1);
        self
    }

    /// Set the vertical drop that qualifies as a fall (meters).
    pub fn fall_drop_threshold_m(mut self, meters: f32) -> Self {
        self.config.fall.drop_threshold_m = meters.max(0.0);
        self
    }

    /// Set the descent velocity that qualifies as a fall (meters/second).
    pub fn fall_velocity_threshold(mut self, meters_per_second: f32) -> Self {
        self.config.fall.velocity_threshold_m_s = meters_per_second.max(0.0);
        self
    }

    /// Set the initial bed zone.
    pub fn bed_zone(mut self, zone: zone::BedZone) -> Self {
        self.config.bed_zone = zone;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> MonitorConfig {
        self.config
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        // Domain types
        BedZone, BoundingBox, CameraIntrinsics, Detection, PoseLabel, Position3D,
        PERSON_CLASS_ID,
        // Engine
        DepthUpdate, FusionEngine, SubjectId, TickInput, TickResult,
        // Components
        DepthFrame, FallAssessment, FallDetector, MotionAnalyzer, MotionState,
        PoseClassifier, PoseState, Projector, RegionStats, TemporalWindow,
        // Configuration and errors
        FusionError, MonitorConfig, MonitorConfigBuilder, Result,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = MonitorConfig::builder()
            .min_person_confidence(0.6)
            .stillness_threshold(0.1)
            .fall_drop_threshold_m(0.4)
            .build();

        assert!((config.min_person_confidence - 0.6).abs() < f32::EPSILON);
        assert!((config.motion.stillness_threshold - 0.1).abs() < f32::EPSILON);
        assert!((config.fall.drop_threshold_m - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_builder_clamping() {
        let config = MonitorConfig::builder()
            .min_person_confidence(1.5)
            .stillness_threshold(-0.2)
            .motion_history_frames(0)
            .build();

        assert!((config.min_person_confidence - 1.0).abs() < f32::EPSILON);
        assert!(config.motion.stillness_threshold.abs() < f32::EPSILON);
        assert_eq!(config.motion.history_frames, 1);
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
