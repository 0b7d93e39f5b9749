//! Bounding box + depth sample to 3D position via the pinhole model.

use crate::domain::{BoundingBox, CameraIntrinsics, Position3D};

use super::frame::DepthFrame;

/// Half-extent of the median sampling window around the projection center,
/// giving a 5x5 pixel neighborhood. A single pixel is too noisy; dropout in
/// one reading must not invalidate the sample.
const SAMPLE_WINDOW_HALF: i32 = 2;

/// Pure projection from a normalized person box plus the current depth frame
/// into a camera-relative 3D position.
#[derive(Debug, Clone, Copy, Default)]
pub struct Projector;

impl Projector {
    /// Estimate the 3D position of the subject described by `bbox`.
    ///
    /// The box center is rescaled from RGB pixel space into depth pixel
    /// space, depth is sampled as the median of a 5x5 window around that
    /// point, and if that window holds no valid reading the median over the
    /// whole box is used instead. When neither yields a depth the returned
    /// position is [`Position3D::UNMEASURED`] and must be excluded from any
    /// state update.
    pub fn estimate_position(
        bbox: &BoundingBox,
        rgb_width: u32,
        rgb_height: u32,
        depth: &DepthFrame,
        intrinsics: &CameraIntrinsics,
    ) -> Position3D {
        if !depth.has_data() || rgb_width == 0 || rgb_height == 0 {
            return Position3D::UNMEASURED;
        }

        let (center_x, center_y) = bbox.center();
        let rgb_cx = center_x * rgb_width as f32;
        let rgb_cy = center_y * rgb_height as f32;

        let scale_x = depth.width() as f32 / rgb_width as f32;
        let scale_y = depth.height() as f32 / rgb_height as f32;
        let depth_cx = (rgb_cx * scale_x) as i32;
        let depth_cy = (rgb_cy * scale_y) as i32;

        let sampled = depth
            .median_in_region(
                depth_cx - SAMPLE_WINDOW_HALF,
                depth_cy - SAMPLE_WINDOW_HALF,
                depth_cx + SAMPLE_WINDOW_HALF,
                depth_cy + SAMPLE_WINDOW_HALF,
            )
            .or_else(|| {
                let stats = depth.region_stats(bbox);
                (stats.valid_count > 0).then_some(stats.median_m)
            });

        match sampled {
            Some(depth_m) if depth_m > 0.0 => {
                intrinsics.unproject(depth_cx as f32, depth_cy as f32, depth_m)
            }
            _ => Position3D::UNMEASURED,
        }
    }
}
