//! Styles: flat-listed entities describing how objects are drawn.

use kurven_primitives::{Color, OwnerId, Value};

use crate::error::LookupError;
use crate::owner::{NAME_KEY, Properties, PropertyOwner};
use crate::property::Property;
use crate::structure::{IdAllocator, StructureItem};

/// Key of the pen (outline) toggle.
pub const PEN_ACTIVE_KEY: &str = "pen/active";
/// Key of the pen color, enabled by [`PEN_ACTIVE_KEY`].
pub const PEN_COLOR_KEY: &str = "pen/color";
/// Key of the pen width, enabled by [`PEN_ACTIVE_KEY`].
pub const PEN_WIDTH_KEY: &str = "pen/width";
/// Key of the brush (fill) toggle.
pub const BRUSH_ACTIVE_KEY: &str = "brush/active";
/// Key of the brush color, enabled by [`BRUSH_ACTIVE_KEY`].
pub const BRUSH_COLOR_KEY: &str = "brush/color";

/// A drawing style. Objects pick styles up through style tags referencing
/// them by id.
#[derive(Debug, Clone)]
pub struct Style {
	id: OwnerId,
	properties: Properties,
}

impl Style {
	/// Creates a style with an active black pen and an inactive brush.
	///
	/// The pen and brush sub-properties are gated on their respective
	/// `*/active` toggles; a disabled group drops out of batch edits but
	/// still serializes.
	pub fn new(id: OwnerId, name: impl Into<String>) -> Self {
		let mut style = Self { id, properties: Properties::default() };
		style.add_property(
			NAME_KEY,
			Property::new("name", "style", Value::String(name.into())),
		);
		style.add_property(
			PEN_ACTIVE_KEY,
			Property::new("active", "pen", Value::Bool(true)),
		);
		style.add_property(
			PEN_COLOR_KEY,
			Property::new("color", "pen", Value::Color(Color::BLACK))
				.with_enabled_buddy(PEN_ACTIVE_KEY, vec![Value::Bool(true)]),
		);
		style.add_property(
			PEN_WIDTH_KEY,
			Property::new("width", "pen", Value::Float(1.0))
				.with_enabled_buddy(PEN_ACTIVE_KEY, vec![Value::Bool(true)]),
		);
		style.add_property(
			BRUSH_ACTIVE_KEY,
			Property::new("active", "brush", Value::Bool(false)),
		);
		style.add_property(
			BRUSH_COLOR_KEY,
			Property::new("color", "brush", Value::Color(Color::WHITE))
				.with_enabled_buddy(BRUSH_ACTIVE_KEY, vec![Value::Bool(true)]),
		);
		style
	}

	/// Constructs a style from its serialized type name.
	pub fn make(type_name: &str, id: OwnerId) -> Result<Self, LookupError> {
		if type_name == "Style" {
			Ok(Self::new(id, ""))
		} else {
			Err(LookupError(type_name.to_owned()))
		}
	}
}

impl PropertyOwner for Style {
	fn id(&self) -> OwnerId {
		self.id
	}

	fn type_name(&self) -> &'static str {
		"Style"
	}

	fn properties(&self) -> &Properties {
		&self.properties
	}

	fn properties_mut(&mut self) -> &mut Properties {
		&mut self.properties
	}
}

impl StructureItem for Style {
	fn reassign_ids(&mut self, ids: &IdAllocator) {
		self.id = ids.allocate();
	}
}
