//! Common types and utilities shared across the earth-cube workspace.

pub mod error;
pub mod geometry;
pub mod progress;
pub mod statement;
pub mod tile;
pub mod vocab;

pub use error::{CubeError, CubeResult};
pub use geometry::{AffineTransform, BoundingPolygon, Extent, GeoPoint};
pub use progress::ProgressExt;
pub use tile::Tile;
