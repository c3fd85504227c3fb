//! Property ownership: the trait shared by objects, tags, and styles.
//!
//! An owner holds an insertion-ordered map of named [`Property`] cells.
//! Multi-selection editing works on the *intersection* of key sets across
//! heterogeneous owners, restricted to keys whose properties are mutually
//! kind-compatible.

use indexmap::IndexMap;
use kurven_primitives::{OwnerId, Value};

use crate::property::Property;

/// Key of the name property every owner carries.
pub const NAME_KEY: &str = "name";

/// Insertion-ordered property map. Order is part of the serialized format.
pub type Properties = IndexMap<String, Property>;

/// An entity exposing a named set of typed properties.
pub trait PropertyOwner {
	/// Stable id of this owner.
	fn id(&self) -> OwnerId;

	/// Type name written into serialized documents, and key into the
	/// owner factory on load.
	fn type_name(&self) -> &'static str;

	/// The ordered property map.
	fn properties(&self) -> &Properties;

	/// Mutable access to the ordered property map.
	fn properties_mut(&mut self) -> &mut Properties;

	/// Existence-checked property lookup; a missing key is `None`, never a
	/// crash.
	fn property(&self, key: &str) -> Option<&Property> {
		self.properties().get(key)
	}

	/// Whether a property with this key exists.
	fn has_property(&self, key: &str) -> bool {
		self.properties().contains_key(key)
	}

	/// Adds a property under a fresh key.
	///
	/// # Panics
	/// Panics if the key is already present; each owner has at most one
	/// property per key.
	fn add_property(&mut self, key: impl Into<String>, property: Property)
	where
		Self: Sized,
	{
		let key = key.into();
		let previous = self.properties_mut().insert(key.clone(), property);
		assert!(previous.is_none(), "duplicate property key '{key}'");
	}

	/// Detaches and returns a property, preserving the order of the rest.
	fn extract_property(&mut self, key: &str) -> Option<Property> {
		self.properties_mut().shift_remove(key)
	}

	/// Sets a property's value, returning the previous value if it changed.
	///
	/// # Panics
	/// Panics if the key does not exist or the value kind mismatches;
	/// callers are expected to target live, compatible properties.
	fn set_value(&mut self, key: &str, value: Value) -> Option<Value> {
		let property = self
			.properties_mut()
			.get_mut(key)
			.unwrap_or_else(|| panic!("no property '{key}'"));
		let old = property.value().clone();
		if property.set(value) { Some(old) } else { None }
	}

	/// Whether the property is currently editable.
	///
	/// True unless an enabled buddy is configured and the buddy's current
	/// value is outside the enabling set. Disabled properties are excluded
	/// from batch edits but serialize normally. A missing key or missing
	/// buddy reads as enabled.
	fn is_property_enabled(&self, key: &str) -> bool {
		let Some(property) = self.property(key) else {
			return true;
		};
		let Some(buddy) = property.enabled_buddy() else {
			return true;
		};
		match self.property(&buddy.key) {
			Some(gate) => buddy.enablers.contains(gate.value()),
			None => true,
		}
	}

	/// The owner's display name.
	fn name(&self) -> &str {
		self.property(NAME_KEY).map_or("", |p| p.value().as_str())
	}

	/// Copies values to `target` for the intersection of key sets, but only
	/// where the kinds are compatible.
	///
	/// Used when converting an entity to a different concrete type while
	/// preserving shared settings.
	fn copy_properties(&self, target: &mut dyn PropertyOwner) {
		for (key, property) in self.properties() {
			let compatible = target
				.property(key)
				.is_some_and(|other| other.is_compatible(property));
			if compatible {
				target.set_value(key, property.value().clone());
			}
		}
	}
}

/// Keys shared by every owner in `owners`, with mutually compatible kinds.
///
/// Key order follows the first owner's declaration order. A key present on
/// all owners but with differing kinds (e.g. a Float "radius" on one owner
/// and an Integer "radius" on another) is excluded.
pub fn key_intersection(owners: &[&dyn PropertyOwner]) -> Vec<String> {
	let Some((first, rest)) = owners.split_first() else {
		return Vec::new();
	};
	first
		.properties()
		.iter()
		.filter(|(key, property)| {
			rest.iter().all(|owner| {
				owner
					.property(key)
					.is_some_and(|other| other.is_compatible(property))
			})
		})
		.map(|(key, _)| key.clone())
		.collect()
}

/// Like [`key_intersection`], but additionally requires the property to be
/// enabled on every owner. This is the key set offered for batch editing.
pub fn batch_editable_keys(owners: &[&dyn PropertyOwner]) -> Vec<String> {
	key_intersection(owners)
		.into_iter()
		.filter(|key| owners.iter().all(|owner| owner.is_property_enabled(key)))
		.collect()
}

#[cfg(test)]
mod tests {
	use kurven_primitives::{OwnerId, Value};
	use pretty_assertions::assert_eq;

	use super::*;

	struct TestOwner {
		id: OwnerId,
		properties: Properties,
	}

	impl TestOwner {
		fn new(raw_id: u64) -> Self {
			Self {
				id: OwnerId::from_raw(raw_id).unwrap(),
				properties: Properties::default(),
			}
		}
	}

	impl PropertyOwner for TestOwner {
		fn id(&self) -> OwnerId {
			self.id
		}

		fn type_name(&self) -> &'static str {
			"TestOwner"
		}

		fn properties(&self) -> &Properties {
			&self.properties
		}

		fn properties_mut(&mut self) -> &mut Properties {
			&mut self.properties
		}
	}

	#[test]
	fn test_intersection_excludes_kind_mismatch() {
		let mut x = TestOwner::new(1);
		x.add_property("name", Property::new("name", "", Value::String("x".into())));
		x.add_property("radius", Property::new("radius", "", Value::Float(1.0)));
		let mut y = TestOwner::new(2);
		y.add_property("name", Property::new("name", "", Value::String("y".into())));
		y.add_property("radius", Property::new("radius", "", Value::Integer(1)));

		let keys = key_intersection(&[&x, &y]);
		assert_eq!(keys, vec!["name".to_owned()]);
	}

	#[test]
	fn test_batch_editable_respects_enabled_buddy() {
		let mut x = TestOwner::new(1);
		x.add_property("active", Property::new("active", "", Value::Bool(false)));
		x.add_property(
			"width",
			Property::new("width", "", Value::Float(1.0))
				.with_enabled_buddy("active", vec![Value::Bool(true)]),
		);
		let mut y = TestOwner::new(2);
		y.add_property("active", Property::new("active", "", Value::Bool(true)));
		y.add_property("width", Property::new("width", "", Value::Float(2.0)));

		assert_eq!(key_intersection(&[&x, &y]).len(), 2);
		// "width" is disabled on x while x.active is false.
		assert_eq!(batch_editable_keys(&[&x, &y]), vec!["active".to_owned()]);

		x.set_value("active", Value::Bool(true));
		assert_eq!(batch_editable_keys(&[&x, &y]).len(), 2);
	}

	#[test]
	fn test_copy_properties_copies_compatible_intersection() {
		let mut src = TestOwner::new(1);
		src.add_property("name", Property::new("name", "", Value::String("a".into())));
		src.add_property("radius", Property::new("radius", "", Value::Float(4.0)));
		src.add_property("extra", Property::new("extra", "", Value::Bool(true)));

		let mut dst = TestOwner::new(2);
		dst.add_property("name", Property::new("name", "", Value::String("b".into())));
		dst.add_property("radius", Property::new("radius", "", Value::Integer(0)));

		src.copy_properties(&mut dst);
		assert_eq!(dst.property("name").unwrap().value().as_str(), "a");
		// Incompatible kind: untouched.
		assert_eq!(dst.property("radius").unwrap().value().as_integer(), 0);
		assert!(!dst.has_property("extra"));
	}

	#[test]
	fn test_extract_preserves_order() {
		let mut x = TestOwner::new(1);
		x.add_property("a", Property::new("a", "", Value::Bool(true)));
		x.add_property("b", Property::new("b", "", Value::Bool(true)));
		x.add_property("c", Property::new("c", "", Value::Bool(true)));
		x.extract_property("b");
		let keys: Vec<_> = x.properties().keys().cloned().collect();
		assert_eq!(keys, vec!["a".to_owned(), "c".to_owned()]);
	}
}
