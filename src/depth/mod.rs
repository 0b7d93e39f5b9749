//! Depth sensing: frame storage, region statistics, and 3D projection.

pub mod frame;
pub mod projection;

pub use frame::{DepthFrame, RegionStats};
pub use projection::Projector;
