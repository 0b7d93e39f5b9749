//! Depth frame storage and bounds-checked, unit-converted queries.

use crate::domain::BoundingBox;
use crate::FusionError;

/// Raw reading marking "no return" from the sensor.
const INVALID_NEAR: u16 = 0;
/// Raw reading marking saturation; equally unusable.
const INVALID_FAR: u16 = u16::MAX;
/// DEPTH16 samples are millimeters.
const MM_PER_METER: f32 = 1000.0;

/// Aggregate depth statistics over a rectangular region.
///
/// When `valid_count` is zero every aggregate field is zero; callers must
/// check `valid_count` before trusting the others.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionStats {
    /// Smallest valid depth (meters).
    pub min_m: f32,
    /// Largest valid depth (meters).
    pub max_m: f32,
    /// Mean of valid depths (meters).
    pub mean_m: f32,
    /// Median of valid depths (meters).
    pub median_m: f32,
    /// Number of pixels with a valid reading.
    pub valid_count: usize,
    /// Number of pixels visited.
    pub total_count: usize,
}

/// Owns the most recently accepted depth sample grid.
///
/// The first accepted update fixes the frame dimensions; later updates with
/// different dimensions are rejected and the previous grid is retained.
#[derive(Debug, Clone, Default)]
pub struct DepthFrame {
    width: u32,
    height: u32,
    samples: Vec<u16>,
}

impl DepthFrame {
    /// Create an empty, unconfigured frame.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether dimensions have been adopted from a first update.
    pub fn is_configured(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Whether a sample grid is available for queries.
    pub fn has_data(&self) -> bool {
        self.is_configured() && !self.samples.is_empty()
    }

    /// Configured frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Configured frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Replace the stored grid with a new sensor frame.
    ///
    /// On the first call the given dimensions are adopted as the configured
    /// size. A later call with different dimensions is rejected with the
    /// previous grid retained. A buffer whose length does not match
    /// `width * height` is always rejected.
    pub fn update(&mut self, samples: &[u16], width: u32, height: u32) -> Result<(), FusionError> {
        let expected_len = width as usize * height as usize;
        if width == 0 || height == 0 || samples.len() != expected_len {
            return Err(FusionError::DepthBufferLength {
                expected: expected_len,
                actual: samples.len(),
            });
        }

        if self.is_configured() && (width != self.width || height != self.height) {
            return Err(FusionError::DepthDimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width,
                height,
            });
        }

        self.width = width;
        self.height = height;
        self.samples.clear();
        self.samples.extend_from_slice(samples);
        Ok(())
    }

    /// Depth at pixel coordinates in meters, or `None` when the coordinates
    /// are out of bounds, the frame is unconfigured, or the raw sample is one
    /// of the invalid sentinels.
    pub fn depth_at(&self, x: i32, y: i32) -> Option<f32> {
        if !self.has_data() || x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as u32, y as u32);
        if x >= self.width || y >= self.height {
            return None;
        }

        let raw = self.samples[(y * self.width + x) as usize];
        if raw == INVALID_NEAR || raw == INVALID_FAR {
            return None;
        }
        Some(raw as f32 / MM_PER_METER)
    }

    /// Depth at normalized coordinates (truncating, not rounding).
    pub fn depth_at_normalized(&self, nx: f32, ny: f32) -> Option<f32> {
        let x = (nx * self.width as f32) as i32;
        let y = (ny * self.height as f32) as i32;
        self.depth_at(x, y)
    }

    /// Statistics over every pixel inside a normalized bounding box, clamped
    /// into frame bounds (inclusive pixel bounds).
    pub fn region_stats(&self, bbox: &BoundingBox) -> RegionStats {
        if !self.has_data() {
            return RegionStats::default();
        }

        let x1 = (bbox.x * self.width as f32) as i32;
        let y1 = (bbox.y * self.height as f32) as i32;
        let x2 = ((bbox.x + bbox.width) * self.width as f32) as i32;
        let y2 = ((bbox.y + bbox.height) * self.height as f32) as i32;

        let x1 = x1.clamp(0, self.width as i32 - 1);
        let y1 = y1.clamp(0, self.height as i32 - 1);
        let x2 = x2.clamp(0, self.width as i32 - 1);
        let y2 = y2.clamp(0, self.height as i32 - 1);

        let mut stats = RegionStats::default();
        let mut valid = Vec::with_capacity(((x2 - x1 + 1) * (y2 - y1 + 1)) as usize);

        for y in y1..=y2 {
            for x in x1..=x2 {
                if let Some(depth) = self.depth_at(x, y) {
                    valid.push(depth);
                }
                stats.total_count += 1;
            }
        }

        stats.valid_count = valid.len();
        if valid.is_empty() {
            return stats;
        }

        let mut min = f32::INFINITY;
        let mut max = f32::NEG_INFINITY;
        let mut sum = 0.0f32;
        for &depth in &valid {
            min = min.min(depth);
            max = max.max(depth);
            sum += depth;
        }
        stats.min_m = min;
        stats.max_m = max;
        stats.mean_m = sum / valid.len() as f32;
        stats.median_m = median_by_selection(&mut valid);

        stats
    }

    /// Median depth over a pixel-space rectangle, clamped into frame bounds.
    /// Used for denoised point sampling around a projection center.
    pub fn median_in_region(&self, x1: i32, y1: i32, x2: i32, y2: i32) -> Option<f32> {
        if !self.has_data() {
            return None;
        }

        let x1 = x1.max(0);
        let y1 = y1.max(0);
        let x2 = x2.min(self.width as i32 - 1);
        let y2 = y2.min(self.height as i32 - 1);
        if x1 > x2 || y1 > y2 {
            return None;
        }

        let mut depths = Vec::with_capacity(((x2 - x1 + 1) * (y2 - y1 + 1)) as usize);
        for y in y1..=y2 {
            for x in x1..=x2 {
                if let Some(depth) = self.depth_at(x, y) {
                    depths.push(depth);
                }
            }
        }

        if depths.is_empty() {
            return None;
        }
        Some(median_by_selection(&mut depths))
    }
}

/// Median via selection rather than a full sort, O(n) expected.
fn median_by_selection(values: &mut [f32]) -> f32 {
    let mid = values.len() / 2;
    let (_, median, _) = values.select_nth_unstable_by(mid, f32::total_cmp);
    *median
}
