/// A 2-vector of `f64`, used for positions, scales, and tangents.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
	pub x: f64,
	pub y: f64,
}

impl Vec2 {
	pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// A 2-vector of `i32`, used for integer-valued vector properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IVec2 {
	pub x: i32,
	pub y: i32,
}

impl IVec2 {
	pub const fn new(x: i32, y: i32) -> Self {
		Self { x, y }
	}
}

/// An integer width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
	pub width: i32,
	pub height: i32,
}

impl Size {
	pub const fn new(width: i32, height: i32) -> Self {
		Self { width, height }
	}
}

/// One point of a path's geometry.
///
/// Tangents are stored relative to `position`. A point with zero tangents is
/// a corner; non-zero tangents describe the incoming and outgoing curve
/// handles.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
	/// Absolute position of the point.
	pub position: Vec2,
	/// Incoming tangent, relative to `position`.
	pub left_tangent: Vec2,
	/// Outgoing tangent, relative to `position`.
	pub right_tangent: Vec2,
}

impl Point {
	/// Creates a corner point with zero tangents.
	pub const fn corner(position: Vec2) -> Self {
		Self {
			position,
			left_tangent: Vec2::ZERO,
			right_tangent: Vec2::ZERO,
		}
	}
}
