//! The observable, typed value cell every editable setting lives in.
//!
//! A [`Property`] pairs a current [`Value`] with presentation metadata
//! (label, category) and an optional enable-dependency on a sibling
//! property (the "enabled buddy"). Properties never change kind after
//! construction; [`Property::set`] enforces that as a contract.

use kurven_primitives::{Value, ValueKind};

use crate::error::LookupError;

/// Dependency gating whether a property is currently editable.
///
/// The buddy is a sibling property of the same owner; this property is
/// enabled iff the buddy's current value is one of `enablers`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnabledBuddy {
	/// Key of the gating sibling property.
	pub key: String,
	/// Buddy values for which this property is enabled.
	pub enablers: Vec<Value>,
}

/// A named, typed value cell owned by a [`PropertyOwner`].
///
/// [`PropertyOwner`]: crate::owner::PropertyOwner
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
	value: Value,
	default: Value,
	label: String,
	category: String,
	user_defined: bool,
	enabled_buddy: Option<EnabledBuddy>,
}

impl Property {
	/// Creates a property with the given presentation metadata and initial
	/// value. The initial value doubles as the reset default.
	pub fn new(label: impl Into<String>, category: impl Into<String>, value: Value) -> Self {
		Self {
			default: value.clone(),
			value,
			label: label.into(),
			category: category.into(),
			user_defined: false,
			enabled_buddy: None,
		}
	}

	/// Constructs a default property for a declared type name.
	///
	/// This is the factory used when deserialization encounters a property
	/// key the owner does not already have (a user-defined property).
	pub fn make(type_name: &str) -> Result<Self, LookupError> {
		let kind = ValueKind::from_type_name(type_name)
			.ok_or_else(|| LookupError(type_name.to_owned()))?;
		let mut property = Self::new("", "user properties", kind.default_value());
		property.user_defined = true;
		Ok(property)
	}

	/// Gates this property on a sibling property's value.
	pub fn with_enabled_buddy(mut self, key: impl Into<String>, enablers: Vec<Value>) -> Self {
		self.enabled_buddy = Some(EnabledBuddy { key: key.into(), enablers });
		self
	}

	/// Marks this property as user-defined (added at runtime rather than by
	/// the owner's type).
	pub fn user_defined(mut self) -> Self {
		self.user_defined = true;
		self
	}

	/// The current value.
	pub fn value(&self) -> &Value {
		&self.value
	}

	/// The value kind, fixed at construction.
	pub fn kind(&self) -> ValueKind {
		self.value.kind()
	}

	/// The declared type name, as written into serialized documents.
	pub fn type_name(&self) -> &'static str {
		self.kind().type_name()
	}

	/// Human-readable label.
	pub fn label(&self) -> &str {
		&self.label
	}

	/// Category grouping related properties (one tab per category in the
	/// property editor).
	pub fn category(&self) -> &str {
		&self.category
	}

	/// Whether this property was added at runtime.
	pub fn is_user_defined(&self) -> bool {
		self.user_defined
	}

	/// The enable-dependency, if configured.
	pub fn enabled_buddy(&self) -> Option<&EnabledBuddy> {
		self.enabled_buddy.as_ref()
	}

	/// Sets the value, returning `true` if the stored value changed.
	///
	/// # Panics
	/// Panics if `value` has a different kind than the current value.
	/// Changing a property's kind is a contract violation, not a
	/// recoverable error.
	pub fn set(&mut self, value: Value) -> bool {
		assert!(
			self.value.is_compatible(&value),
			"kind mismatch: property of kind {} assigned {}",
			self.kind(),
			value.kind()
		);
		if self.value == value {
			false
		} else {
			self.value = value;
			true
		}
	}

	/// Restores the default value, returning `true` if the value changed.
	pub fn reset(&mut self) -> bool {
		let default = self.default.clone();
		self.set(default)
	}

	/// True iff `other` holds the same concrete kind.
	///
	/// Compatible properties can be batch-edited together and copied across
	/// entity type conversions.
	pub fn is_compatible(&self, other: &Property) -> bool {
		self.value.is_compatible(&other.value)
	}
}
