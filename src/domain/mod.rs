//! Domain value types shared across the fusion core.

pub mod detection;
pub mod geometry;
pub mod pose;

pub use detection::{screen_fall_hint, select_person, Detection, PERSON_CLASS_ID};
pub use geometry::{BoundingBox, CameraIntrinsics, Position3D, DEFAULT_FOCAL_LENGTH_PX};
pub use pose::PoseLabel;
