//! Value-level primitives for the kurven document model: colors, vectors,
//! path points, stable owner ids, and the closed [`Value`] kind set.

/// RGBA color with floating point channels.
pub mod color;
/// 2-vectors, sizes, and path points.
pub mod geometry;
/// Stable entity identifiers.
pub mod id;
/// The closed, exhaustively matched property value type.
pub mod value;

pub use color::{Color, ParseColorError};
pub use geometry::{IVec2, Point, Size, Vec2};
pub use id::OwnerId;
pub use value::{Value, ValueKind};
