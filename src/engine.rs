//! Per-subject fusion engine assembling one clinical tick result.

use uuid::Uuid;

use crate::classifier::PoseClassifier;
use crate::depth::{DepthFrame, Projector};
use crate::domain::{screen_fall_hint, select_person, CameraIntrinsics, Detection, PoseLabel};
use crate::fall::FallDetector;
use crate::motion::MotionAnalyzer;
use crate::zone::BedZone;
use crate::MonitorConfig;

/// Gain mapping per-tick depth change (meters) onto the [0, 1] depth-motion
/// level.
const DEPTH_MOTION_GAIN: f32 = 10.0;

/// Identity of one monitored subject, distinguishing log streams when several
/// engines run in the same process.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubjectId(Uuid);

impl SubjectId {
    /// Allocate a new random subject id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One depth sensor frame offered to the engine, at the sensor's own cadence.
#[derive(Debug, Clone, Copy)]
pub struct DepthUpdate<'a> {
    /// DEPTH16 samples, row-major, millimeters.
    pub samples: &'a [u16],
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

/// Everything the platform bridge supplies for one processing tick.
#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    /// Current RGBA frame.
    pub rgb_pixels: &'a [u8],
    /// RGB frame width in pixels.
    pub rgb_width: u32,
    /// RGB frame height in pixels.
    pub rgb_height: u32,
    /// Detections from the upstream network for this frame.
    pub detections: &'a [Detection],
    /// Depth frame, when the sensor produced one this tick.
    pub depth: Option<DepthUpdate<'a>>,
    /// Fall signal from an upstream 2D heuristic, OR-ed into the combined
    /// fall flag.
    pub upstream_fall_hint: bool,
    /// Monotonic tick timestamp in milliseconds.
    pub timestamp_ms: i64,
}

/// Fused per-tick result handed to the result-assembly collaborator.
///
/// Every numeric field defaults to zero and every flag to false whenever the
/// underlying measurement is unavailable for the tick; consumers never see a
/// missing field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickResult {
    /// Whether a person above the confidence floor was present.
    pub person_detected: bool,
    /// Number of detections supplied this tick.
    pub detection_count: usize,
    /// Stabilized pose as its wire ordinal (see [`PoseLabel`]).
    pub pose: u8,
    /// Confidence of the stabilized pose in [0, 1].
    pub pose_confidence: f32,
    /// Smoothed RGB motion level in [0, 1].
    pub motion_level: f32,
    /// Whether the subject counts as still this tick.
    pub is_still: bool,
    /// Whole seconds since the last detected motion.
    pub seconds_since_motion: i64,
    /// Combined fall flag: upstream 2D signal OR depth-based detection.
    pub fall_detected: bool,
    /// Depth-based fall flag alone.
    pub depth_fall_detected: bool,
    /// Depth-based fall confidence in [0, 1].
    pub fall_confidence: f32,
    /// Vertical drop within the position window (meters).
    pub vertical_drop_m: f32,
    /// Descent velocity over the window endpoints (meters/second).
    pub drop_velocity_m_s: f32,
    /// Camera-to-subject distance (meters).
    pub distance_m: f32,
    /// Z-axis motion level in [0, 1].
    pub depth_motion_level: f32,
    /// Distance from the bed center (meters).
    pub bed_proximity_m: f32,
    /// Whether the subject is inside the bed zone.
    pub in_bed_zone: bool,
    /// Camera-relative 3D position (x, y, z) in meters; zeros when
    /// unmeasured.
    pub position: [f32; 3],
}

/// Owns all per-subject mutable state and runs one synchronous fusion pass
/// per camera tick.
///
/// Single-ownership contract: the caller must serialize ticks into one
/// engine instance; no internal locking is provided.
pub struct FusionEngine {
    subject: SubjectId,
    config: MonitorConfig,
    depth: DepthFrame,
    intrinsics: Option<CameraIntrinsics>,
    fall: FallDetector,
    motion: MotionAnalyzer,
    pose: PoseClassifier,
    bed_zone: BedZone,
}

impl FusionEngine {
    /// Create an engine for a new monitored subject.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            subject: SubjectId::new(),
            fall: FallDetector::new(config.fall.clone()),
            motion: MotionAnalyzer::new(config.motion.clone()),
            pose: PoseClassifier::new(config.pose.clone()),
            bed_zone: config.bed_zone,
            depth: DepthFrame::new(),
            intrinsics: None,
            config,
        }
    }

    /// Create an engine with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MonitorConfig::default())
    }

    /// Run one fusion tick.
    ///
    /// Order within the tick: accept the depth frame if offered, analyze RGB
    /// motion, classify pose from the detection list, then project the
    /// dominant person into 3D and derive fall, distance, and bed-proximity
    /// signals. Transient sensor dropout degrades to zeroed fields, never to
    /// an error.
    pub fn process_tick(&mut self, input: &TickInput<'_>) -> TickResult {
        let now_ms = input.timestamp_ms;

        // ----------------------------------------------------------------
        // Depth frame intake (sensor cadence may lag the RGB rate)
        // ----------------------------------------------------------------
        if let Some(depth) = &input.depth {
            let first = !self.depth.is_configured();
            match self.depth.update(depth.samples, depth.width, depth.height) {
                Ok(()) => {
                    if first {
                        self.intrinsics = Some(CameraIntrinsics::from_frame_dimensions(
                            depth.width,
                            depth.height,
                        ));
                        tracing::info!(
                            subject = %self.subject,
                            width = depth.width,
                            height = depth.height,
                            "depth frame dimensions adopted"
                        );
                    }
                }
                Err(error) => {
                    tracing::warn!(
                        subject = %self.subject,
                        %error,
                        "depth update rejected, previous frame retained"
                    );
                }
            }
        }

        // ----------------------------------------------------------------
        // RGB motion and pose
        // ----------------------------------------------------------------
        let motion = self.motion.analyze(
            input.rgb_pixels,
            input.rgb_width as usize,
            input.rgb_height as usize,
            now_ms,
        );

        let person = select_person(input.detections, self.config.min_person_confidence);
        self.pose
            .update(person, input.rgb_height as f32, now_ms);

        let fall_hint_2d = input.upstream_fall_hint
            || screen_fall_hint(
                input.detections,
                input.rgb_height as f32,
                self.config.min_person_confidence,
            );

        let mut result = TickResult {
            person_detected: person.is_some(),
            detection_count: input.detections.len(),
            pose: self.pose.current().ordinal(),
            pose_confidence: self.pose.state().confidence,
            motion_level: motion.motion_level,
            is_still: motion.is_still,
            seconds_since_motion: self.motion.seconds_since_motion(now_ms),
            ..TickResult::default()
        };

        // ----------------------------------------------------------------
        // Depth-based signals for the dominant person
        // ----------------------------------------------------------------
        if let (Some(person), Some(intrinsics)) = (person, &self.intrinsics) {
            let bbox = person.to_normalized(input.rgb_width as f32, input.rgb_height as f32);
            let position = Projector::estimate_position(
                &bbox,
                input.rgb_width,
                input.rgb_height,
                &self.depth,
                intrinsics,
            );

            if position.is_measured() {
                let previous = self.fall.last_position();
                if previous.is_measured() {
                    let z_change = (position.z - previous.z).abs();
                    result.depth_motion_level = (z_change * DEPTH_MOTION_GAIN).min(1.0);
                }

                let assessment = self.fall.observe(position, now_ms);
                result.depth_fall_detected = assessment.fall_detected;
                result.fall_confidence = assessment.confidence;
                result.vertical_drop_m = assessment.vertical_drop_m;
                result.drop_velocity_m_s = assessment.drop_velocity_m_s;

                result.distance_m = position.z;
                result.bed_proximity_m = self.bed_zone.proximity_m(&position);
                result.in_bed_zone = self.bed_zone.contains(&position);
                result.position = [position.x, position.y, position.z];
            }
        }

        result.fall_detected = fall_hint_2d || result.depth_fall_detected;
        result
    }

    /// Reconfigure the bed zone; takes effect on the next tick.
    pub fn set_bed_zone(&mut self, zone: BedZone) {
        tracing::info!(
            subject = %self.subject,
            center_x = zone.center.x,
            center_y = zone.center.y,
            center_z = zone.center.z,
            radius_m = zone.radius_m,
            "bed zone configured"
        );
        self.bed_zone = zone;
    }

    /// Current bed zone configuration.
    pub fn bed_zone(&self) -> &BedZone {
        &self.bed_zone
    }

    /// This engine's subject identity.
    pub fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Whether an accepted depth frame is available.
    pub fn has_depth_data(&self) -> bool {
        self.depth.has_data()
    }

    /// Most recent camera-to-subject distance (meters).
    pub fn last_distance_m(&self) -> f32 {
        self.fall.last_distance_m()
    }

    /// Stabilized current pose.
    pub fn current_pose(&self) -> PoseLabel {
        self.pose.current()
    }

    /// Pose active before the last change.
    pub fn previous_pose(&self) -> PoseLabel {
        self.pose.previous()
    }

    /// Confidence of the stabilized pose.
    pub fn pose_confidence(&self) -> f32 {
        self.pose.state().confidence
    }

    /// Current smoothed motion level.
    pub fn motion_level(&self) -> f32 {
        self.motion.motion_level()
    }

    /// Whole seconds since the last detected motion.
    pub fn seconds_since_motion(&self, now_ms: i64) -> i64 {
        self.motion.seconds_since_motion(now_ms)
    }

    /// Whether continuous stillness has reached the alert threshold.
    pub fn should_alert_stillness(&self, now_ms: i64, threshold_seconds: i64) -> bool {
        self.motion.should_alert_stillness(now_ms, threshold_seconds)
    }

    /// Clear all per-subject history (positions, poses, motion baseline) for
    /// a new monitoring session. The accepted depth frame and derived
    /// intrinsics are retained; safe to call repeatedly.
    pub fn reset(&mut self) {
        self.fall.reset();
        self.motion.reset();
        self.pose.reset();
        tracing::info!(subject = %self.subject, "per-subject state reset");
    }
}
