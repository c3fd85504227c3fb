use std::fmt;

use crate::color::Color;
use crate::geometry::{IVec2, Size, Vec2};
use crate::id::OwnerId;

/// A property value from the closed kind set.
///
/// The set of kinds is fixed by the document format; every consumer matches
/// exhaustively, so adding a kind is a compile-guided change rather than a
/// runtime cast audit.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Bool(bool),
	Color(Color),
	Float(f64),
	Integer(i32),
	/// Reference to another owner, or null. Targets are held by id and
	/// resolved through the document, so a dangling reference reads as null
	/// instead of dangling.
	Reference(Option<OwnerId>),
	String(String),
	FloatVec(Vec2),
	IntegerVec(IVec2),
	Size(Size),
	/// A button-like property without state.
	Trigger,
}

/// Discriminant of a [`Value`], used for compatibility checks and as the
/// declared type name in serialized documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
	Bool,
	Color,
	Float,
	Integer,
	Reference,
	String,
	FloatVec,
	IntegerVec,
	Size,
	Trigger,
}

impl ValueKind {
	/// All kinds, in declaration order.
	pub const ALL: [ValueKind; 10] = [
		ValueKind::Bool,
		ValueKind::Color,
		ValueKind::Float,
		ValueKind::Integer,
		ValueKind::Reference,
		ValueKind::String,
		ValueKind::FloatVec,
		ValueKind::IntegerVec,
		ValueKind::Size,
		ValueKind::Trigger,
	];

	/// The declared type name written into serialized documents.
	pub fn type_name(self) -> &'static str {
		match self {
			ValueKind::Bool => "Bool",
			ValueKind::Color => "Color",
			ValueKind::Float => "Float",
			ValueKind::Integer => "Integer",
			ValueKind::Reference => "Reference",
			ValueKind::String => "String",
			ValueKind::FloatVec => "FloatVec",
			ValueKind::IntegerVec => "IntegerVec",
			ValueKind::Size => "Size",
			ValueKind::Trigger => "Trigger",
		}
	}

	/// Looks up a kind by its declared type name.
	pub fn from_type_name(name: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|kind| kind.type_name() == name)
	}

	/// The default value of this kind.
	pub fn default_value(self) -> Value {
		match self {
			ValueKind::Bool => Value::Bool(false),
			ValueKind::Color => Value::Color(Color::BLACK),
			ValueKind::Float => Value::Float(0.0),
			ValueKind::Integer => Value::Integer(0),
			ValueKind::Reference => Value::Reference(None),
			ValueKind::String => Value::String(String::new()),
			ValueKind::FloatVec => Value::FloatVec(Vec2::ZERO),
			ValueKind::IntegerVec => Value::IntegerVec(IVec2::default()),
			ValueKind::Size => Value::Size(Size::default()),
			ValueKind::Trigger => Value::Trigger,
		}
	}
}

impl fmt::Display for ValueKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.type_name())
	}
}

impl Value {
	/// Returns the kind discriminant of this value.
	pub fn kind(&self) -> ValueKind {
		match self {
			Value::Bool(_) => ValueKind::Bool,
			Value::Color(_) => ValueKind::Color,
			Value::Float(_) => ValueKind::Float,
			Value::Integer(_) => ValueKind::Integer,
			Value::Reference(_) => ValueKind::Reference,
			Value::String(_) => ValueKind::String,
			Value::FloatVec(_) => ValueKind::FloatVec,
			Value::IntegerVec(_) => ValueKind::IntegerVec,
			Value::Size(_) => ValueKind::Size,
			Value::Trigger => ValueKind::Trigger,
		}
	}

	/// True iff `other` has the same concrete kind.
	///
	/// This is the gate for multi-selection batch edits and for copying
	/// properties across entity type conversions.
	pub fn is_compatible(&self, other: &Value) -> bool {
		self.kind() == other.kind()
	}

	/// Reads a boolean value.
	///
	/// # Panics
	/// Panics on kind mismatch; requesting the wrong kind is a programming
	/// error, not a recoverable condition.
	pub fn as_bool(&self) -> bool {
		match self {
			Value::Bool(b) => *b,
			other => panic!("expected Bool value, got {}", other.kind()),
		}
	}

	/// Reads a float value.
	///
	/// # Panics
	/// Panics on kind mismatch.
	pub fn as_float(&self) -> f64 {
		match self {
			Value::Float(f) => *f,
			other => panic!("expected Float value, got {}", other.kind()),
		}
	}

	/// Reads an integer value.
	///
	/// # Panics
	/// Panics on kind mismatch.
	pub fn as_integer(&self) -> i32 {
		match self {
			Value::Integer(i) => *i,
			other => panic!("expected Integer value, got {}", other.kind()),
		}
	}

	/// Reads a string value.
	///
	/// # Panics
	/// Panics on kind mismatch.
	pub fn as_str(&self) -> &str {
		match self {
			Value::String(s) => s,
			other => panic!("expected String value, got {}", other.kind()),
		}
	}

	/// Reads a color value.
	///
	/// # Panics
	/// Panics on kind mismatch.
	pub fn as_color(&self) -> Color {
		match self {
			Value::Color(c) => *c,
			other => panic!("expected Color value, got {}", other.kind()),
		}
	}

	/// Reads a reference target, `None` meaning null.
	///
	/// # Panics
	/// Panics on kind mismatch.
	pub fn as_reference(&self) -> Option<OwnerId> {
		match self {
			Value::Reference(target) => *target,
			other => panic!("expected Reference value, got {}", other.kind()),
		}
	}

	/// Reads a float 2-vector value.
	///
	/// # Panics
	/// Panics on kind mismatch.
	pub fn as_float_vec(&self) -> Vec2 {
		match self {
			Value::FloatVec(v) => *v,
			other => panic!("expected FloatVec value, got {}", other.kind()),
		}
	}

	/// Reads an integer 2-vector value.
	///
	/// # Panics
	/// Panics on kind mismatch.
	pub fn as_integer_vec(&self) -> IVec2 {
		match self {
			Value::IntegerVec(v) => *v,
			other => panic!("expected IntegerVec value, got {}", other.kind()),
		}
	}

	/// Reads a size value.
	///
	/// # Panics
	/// Panics on kind mismatch.
	pub fn as_size(&self) -> Size {
		match self {
			Value::Size(s) => *s,
			other => panic!("expected Size value, got {}", other.kind()),
		}
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn test_kind_round_trips_type_name() {
		for kind in ValueKind::ALL {
			assert_eq!(ValueKind::from_type_name(kind.type_name()), Some(kind));
		}
	}

	#[test]
	fn test_default_value_has_matching_kind() {
		for kind in ValueKind::ALL {
			assert_eq!(kind.default_value().kind(), kind);
		}
	}

	#[test]
	fn test_compatibility_is_kind_equality() {
		assert!(Value::Float(1.0).is_compatible(&Value::Float(2.0)));
		assert!(!Value::Float(1.0).is_compatible(&Value::Integer(1)));
	}

	#[test]
	#[should_panic(expected = "expected Float value")]
	fn test_typed_access_panics_on_mismatch() {
		Value::Integer(3).as_float();
	}
}
