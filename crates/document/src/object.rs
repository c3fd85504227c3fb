//! Scene objects: tree-shaped entities carrying properties, tags, and
//! (for paths) point geometry.

use kurven_primitives::{OwnerId, Point, Value, Vec2};

use crate::error::LookupError;
use crate::owner::{NAME_KEY, Properties, PropertyOwner};
use crate::property::Property;
use crate::structure::{IdAllocator, List, StructureItem};
use crate::tag::Tag;

/// Key of an object's position property.
pub const POSITION_KEY: &str = "position";
/// Key of a rectangle's extent property.
pub const SIZE_KEY: &str = "size";
/// Key of a path's closed flag.
pub const CLOSED_KEY: &str = "closed";

/// Concrete object geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
	/// A group node without geometry of its own. The scene root is an Empty.
	Empty,
	/// An axis-aligned rectangle.
	Rectangle,
	/// A point-based path; points are edited via point geometry commands,
	/// not via properties.
	Path {
		/// The path's points in draw order.
		points: Vec<Point>,
	},
}

/// A scene object: one element of the object tree.
#[derive(Debug, Clone)]
pub struct Object {
	id: OwnerId,
	kind: ObjectKind,
	properties: Properties,
	tags: List<Tag>,
}

impl Object {
	/// Creates an object with its kind's default property set.
	pub fn new(id: OwnerId, kind: ObjectKind, name: impl Into<String>) -> Self {
		let mut object = Self {
			id,
			kind,
			properties: Properties::default(),
			tags: List::new(),
		};
		object.add_property(
			NAME_KEY,
			Property::new("name", "object", Value::String(name.into())),
		);
		match &object.kind {
			ObjectKind::Empty => {}
			ObjectKind::Rectangle => {
				object.add_property(
					POSITION_KEY,
					Property::new("position", "object", Value::FloatVec(Vec2::ZERO)),
				);
				object.add_property(
					SIZE_KEY,
					Property::new("size", "object", Value::FloatVec(Vec2::new(1.0, 1.0))),
				);
			}
			ObjectKind::Path { .. } => {
				object.add_property(
					POSITION_KEY,
					Property::new("position", "object", Value::FloatVec(Vec2::ZERO)),
				);
				object.add_property(
					CLOSED_KEY,
					Property::new("closed", "object", Value::Bool(false)),
				);
			}
		}
		object
	}

	/// Constructs an object from its serialized type name.
	pub fn make(type_name: &str, id: OwnerId) -> Result<Self, LookupError> {
		let kind = match type_name {
			"Empty" => ObjectKind::Empty,
			"Rectangle" => ObjectKind::Rectangle,
			"Path" => ObjectKind::Path { points: Vec::new() },
			_ => return Err(LookupError(type_name.to_owned())),
		};
		Ok(Self::new(id, kind, ""))
	}

	/// The object's concrete kind.
	pub fn kind(&self) -> &ObjectKind {
		&self.kind
	}

	/// Path points, if this object is a path.
	pub fn points(&self) -> Option<&[Point]> {
		match &self.kind {
			ObjectKind::Path { points } => Some(points),
			_ => None,
		}
	}

	/// Mutable path points, if this object is a path.
	pub fn points_mut(&mut self) -> Option<&mut Vec<Point>> {
		match &mut self.kind {
			ObjectKind::Path { points } => Some(points),
			_ => None,
		}
	}

	/// The object's tag list.
	pub fn tags(&self) -> &List<Tag> {
		&self.tags
	}

	/// Mutable access to the object's tag list.
	pub fn tags_mut(&mut self) -> &mut List<Tag> {
		&mut self.tags
	}
}

impl PropertyOwner for Object {
	fn id(&self) -> OwnerId {
		self.id
	}

	fn type_name(&self) -> &'static str {
		match self.kind {
			ObjectKind::Empty => "Empty",
			ObjectKind::Rectangle => "Rectangle",
			ObjectKind::Path { .. } => "Path",
		}
	}

	fn properties(&self) -> &Properties {
		&self.properties
	}

	fn properties_mut(&mut self) -> &mut Properties {
		&mut self.properties
	}
}

impl StructureItem for Object {
	fn reassign_ids(&mut self, ids: &IdAllocator) {
		self.id = ids.allocate();
		self.tags.reassign_ids(ids);
	}
}
