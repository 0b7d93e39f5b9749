//! Camera-relative geometry: 3D positions, bounding boxes, and intrinsics.

/// 3D position in meters relative to the camera.
///
/// Axis convention follows the depth sensor: x is horizontal (positive
/// right), y is vertical (positive down), z is depth (positive away from the
/// camera). A position with `z <= 0` carries no valid measurement and must
/// never enter temporal history.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position3D {
    /// Horizontal offset (meters, positive right).
    pub x: f32,
    /// Vertical offset (meters, positive down).
    pub y: f32,
    /// Depth (meters, positive away from camera).
    pub z: f32,
}

impl Position3D {
    /// The "no measurement" sentinel (z == 0).
    pub const UNMEASURED: Position3D = Position3D {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Create a new position.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Whether this position carries a valid depth measurement.
    pub fn is_measured(&self) -> bool {
        self.z > 0.0
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Position3D) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Height above an assumed floor plane. The y axis is down-positive, so
    /// this is the camera-relative inversion `-y`.
    pub fn height_above_floor(&self) -> f32 {
        -self.y
    }
}

/// Axis-aligned bounding box normalized to [0, 1] of the reporting frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Left edge (normalized).
    pub x: f32,
    /// Top edge (normalized).
    pub y: f32,
    /// Width (normalized).
    pub width: f32,
    /// Height (normalized).
    pub height: f32,
}

impl BoundingBox {
    /// Create a box from its top-left corner and size.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a box from opposite corners.
    pub fn from_corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }

    /// Normalized center of the box.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Approximate focal length in pixels for a typical ToF depth sensor.
pub const DEFAULT_FOCAL_LENGTH_PX: f32 = 500.0;

/// Pinhole camera intrinsics, set once at depth-frame adoption.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CameraIntrinsics {
    /// Focal length along x (pixels).
    pub focal_x: f32,
    /// Focal length along y (pixels).
    pub focal_y: f32,
    /// Principal point x (pixels).
    pub principal_x: f32,
    /// Principal point y (pixels).
    pub principal_y: f32,
}

impl CameraIntrinsics {
    /// Derive intrinsics from frame dimensions: principal point at the frame
    /// center, focal length from the fixed sensor approximation.
    pub fn from_frame_dimensions(width: u32, height: u32) -> Self {
        Self {
            focal_x: DEFAULT_FOCAL_LENGTH_PX,
            focal_y: DEFAULT_FOCAL_LENGTH_PX,
            principal_x: width as f32 / 2.0,
            principal_y: height as f32 / 2.0,
        }
    }

    /// Inverse pinhole projection: pixel (u, v) at depth d meters to a
    /// camera-relative 3D position.
    pub fn unproject(&self, u: f32, v: f32, depth_m: f32) -> Position3D {
        Position3D {
            x: (u - self.principal_x) * depth_m / self.focal_x,
            y: (v - self.principal_y) * depth_m / self.focal_y,
            z: depth_m,
        }
    }

    /// Forward pinhole projection back to pixel coordinates. Returns `None`
    /// for unmeasured positions (z <= 0).
    pub fn project(&self, position: &Position3D) -> Option<(f32, f32)> {
        if !position.is_measured() {
            return None;
        }
        let u = position.x * self.focal_x / position.z + self.principal_x;
        let v = position.y * self.focal_y / position.z + self.principal_y;
        Some((u, v))
    }
}
