//! Tags: list-shaped entities attached to an object.

use kurven_primitives::{OwnerId, Value};

use crate::error::LookupError;
use crate::owner::{NAME_KEY, Properties, PropertyOwner};
use crate::property::Property;
use crate::structure::{IdAllocator, StructureItem};

/// Key of a [`TagKind::Style`] tag's style reference.
pub const STYLE_REFERENCE_KEY: &str = "style";
/// Key of a [`TagKind::Script`] tag's script source.
pub const SCRIPT_KEY: &str = "script";
/// Key of a [`TagKind::Script`] tag's run trigger.
pub const RUN_KEY: &str = "run";

/// Concrete tag behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
	/// Runs a user script when triggered (the script engine itself is an
	/// external collaborator).
	Script,
	/// Applies a referenced [`Style`] to the owning object.
	///
	/// [`Style`]: crate::style::Style
	Style,
}

/// A tag attached to a scene object.
#[derive(Debug, Clone)]
pub struct Tag {
	id: OwnerId,
	kind: TagKind,
	properties: Properties,
}

impl Tag {
	/// Creates a tag with its kind's default property set.
	pub fn new(id: OwnerId, kind: TagKind, name: impl Into<String>) -> Self {
		let mut tag = Self { id, kind, properties: Properties::default() };
		tag.add_property(
			NAME_KEY,
			Property::new("name", "tag", Value::String(name.into())),
		);
		match kind {
			TagKind::Script => {
				tag.add_property(
					SCRIPT_KEY,
					Property::new("script", "script", Value::String(String::new())),
				);
				tag.add_property(RUN_KEY, Property::new("run", "script", Value::Trigger));
			}
			TagKind::Style => {
				tag.add_property(
					STYLE_REFERENCE_KEY,
					Property::new("style", "style", Value::Reference(None)),
				);
			}
		}
		tag
	}

	/// Constructs a tag from its serialized type name.
	pub fn make(type_name: &str, id: OwnerId) -> Result<Self, LookupError> {
		let kind = match type_name {
			"ScriptTag" => TagKind::Script,
			"StyleTag" => TagKind::Style,
			_ => return Err(LookupError(type_name.to_owned())),
		};
		Ok(Self::new(id, kind, ""))
	}

	/// The tag's concrete kind.
	pub fn kind(&self) -> TagKind {
		self.kind
	}
}

impl PropertyOwner for Tag {
	fn id(&self) -> OwnerId {
		self.id
	}

	fn type_name(&self) -> &'static str {
		match self.kind {
			TagKind::Script => "ScriptTag",
			TagKind::Style => "StyleTag",
		}
	}

	fn properties(&self) -> &Properties {
		&self.properties
	}

	fn properties_mut(&mut self) -> &mut Properties {
		&mut self.properties
	}
}

impl StructureItem for Tag {
	fn reassign_ids(&mut self, ids: &IdAllocator) {
		self.id = ids.allocate();
	}
}
