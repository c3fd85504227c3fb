//! Document persistence: a JSON format with forward-reference-safe loading.
//!
//! Loading runs in two phases. Phase one materializes every owner and
//! records each nonzero reference target it sees; phase two checks that
//! every recorded target was actually declared somewhere in the stream.
//! References may therefore point at owners that appear later in the file
//! (or in a different structure entirely), and a load either produces a
//! fully consistent document or a typed error with nothing built.

use kurven_primitives::{
	Color, IVec2, OwnerId, Point, Size, Value, ValueKind, Vec2,
};
use rustc_hash::FxHashSet;
use serde_json::{Value as Json, json};
use tracing::debug;

use crate::document::Document;
use crate::error::DeserializeError;
use crate::object::Object;
use crate::owner::PropertyOwner;
use crate::property::Property;
use crate::structure::{IdAllocator, List, Structure, Tree};
use crate::style::Style;
use crate::tag::Tag;

/// Encodes a document as JSON.
pub fn serialize_document(doc: &Document) -> Json {
	json!({
		"root": object_to_json(doc.objects(), doc.root()),
		"styles": doc.styles().iter().map(owner_to_json).collect::<Vec<_>>(),
	})
}

/// Decodes a document from JSON.
///
/// On error the in-memory state of the caller is untouched; the partially
/// built document is simply dropped.
pub fn deserialize_document(json: &Json) -> Result<Document, DeserializeError> {
	let mut reader = Reader::default();

	let root_json = get(json, "/root")?;
	let root = reader.read_object(root_json, "/root")?;
	let mut objects = Tree::new(root);
	let children = get_array(root_json, "/root/children")?;
	let root_id = objects.root();
	for (index, child) in children.iter().enumerate() {
		let pointer = format!("/root/children/{index}");
		reader.read_subtree(&mut objects, root_id, child, &pointer)?;
	}

	let mut styles = List::new();
	let styles_json = get_array(json, "/styles")?;
	for (index, style_json) in styles_json.iter().enumerate() {
		let pointer = format!("/styles/{index}");
		let (type_name, id) = reader.read_header(style_json, &pointer)?;
		let mut style = Style::make(&type_name, id)?;
		reader.read_properties(&mut style, style_json, &pointer)?;
		styles.append(style);
	}

	reader.check_references()?;

	let ids = IdAllocator::new();
	ids.advance_past(reader.max_id);
	debug!(
		owners = reader.declared.len(),
		"deserialized document"
	);
	Ok(Document::from_parts(objects, styles, ids))
}

fn owner_to_json(owner: &impl PropertyOwner) -> Json {
	let properties: Vec<Json> = owner
		.properties()
		.iter()
		.map(|(key, property)| {
			json!({
				"key": key,
				"type": property.type_name(),
				"value": value_to_json(property.value()),
			})
		})
		.collect();
	json!({
		"type": owner.type_name(),
		"id": owner.id().raw(),
		"properties": properties,
	})
}

fn object_to_json(tree: &Tree<Object>, id: OwnerId) -> Json {
	let object = tree.item(id).expect("serialized ids are live");
	let mut node = owner_to_json(object);
	let map = node.as_object_mut().expect("owner nodes are json objects");
	if let Some(points) = object.points() {
		map.insert(
			"points".to_owned(),
			Json::Array(points.iter().map(point_to_json).collect()),
		);
	}
	map.insert(
		"tags".to_owned(),
		Json::Array(object.tags().iter().map(owner_to_json).collect()),
	);
	map.insert(
		"children".to_owned(),
		Json::Array(
			tree.children(id)
				.iter()
				.map(|&child| object_to_json(tree, child))
				.collect(),
		),
	);
	node
}

fn value_to_json(value: &Value) -> Json {
	match value {
		Value::Bool(b) => json!(b),
		Value::Color(c) => json!([c.r, c.g, c.b, c.a]),
		Value::Float(f) => json!(f),
		Value::Integer(i) => json!(i),
		Value::Reference(target) => json!(OwnerId::to_wire(*target)),
		Value::String(s) => json!(s),
		Value::FloatVec(v) => json!([v.x, v.y]),
		Value::IntegerVec(v) => json!([v.x, v.y]),
		Value::Size(s) => json!([s.width, s.height]),
		Value::Trigger => Json::Null,
	}
}

fn point_to_json(point: &Point) -> Json {
	json!([
		[point.position.x, point.position.y],
		[point.left_tangent.x, point.left_tangent.y],
		[point.right_tangent.x, point.right_tangent.y],
	])
}

/// Phase-one state: declared ids and pending reference targets.
#[derive(Default)]
struct Reader {
	declared: FxHashSet<u64>,
	pending_references: Vec<u64>,
	max_id: u64,
}

impl Reader {
	/// Reads an owner's type name and id, registering the id.
	fn read_header(&mut self, json: &Json, pointer: &str) -> Result<(String, OwnerId), DeserializeError> {
		let type_name = get_str(json, &format!("{pointer}/type"))?;
		let raw = get_u64(json, &format!("{pointer}/id"))?;
		let id = OwnerId::from_raw(raw).ok_or_else(|| DeserializeError::Malformed {
			pointer: format!("{pointer}/id"),
			detail: "owner ids must be nonzero".to_owned(),
		})?;
		if !self.declared.insert(raw) {
			return Err(DeserializeError::DuplicateId(raw));
		}
		self.max_id = self.max_id.max(raw);
		Ok((type_name.to_owned(), id))
	}

	/// Reads one object node, without its children.
	fn read_object(&mut self, json: &Json, pointer: &str) -> Result<Object, DeserializeError> {
		let (type_name, id) = self.read_header(json, pointer)?;
		let mut object = Object::make(&type_name, id)?;
		self.read_properties(&mut object, json, pointer)?;

		if let Some(points) = object.points_mut() {
			let points_json = get_array(json, &format!("{pointer}/points"))?;
			for (index, point_json) in points_json.iter().enumerate() {
				points.push(read_point(point_json, &format!("{pointer}/points/{index}"))?);
			}
		}

		let tags_json = get_array(json, &format!("{pointer}/tags"))?;
		for (index, tag_json) in tags_json.iter().enumerate() {
			let tag_pointer = format!("{pointer}/tags/{index}");
			let (tag_type, tag_id) = self.read_header(tag_json, &tag_pointer)?;
			let mut tag = Tag::make(&tag_type, tag_id)?;
			self.read_properties(&mut tag, tag_json, &tag_pointer)?;
			object.tags_mut().append(tag);
		}
		Ok(object)
	}

	/// Reads an object node and its descendants, attaching them under
	/// `parent`.
	fn read_subtree(
		&mut self,
		tree: &mut Tree<Object>,
		parent: OwnerId,
		json: &Json,
		pointer: &str,
	) -> Result<(), DeserializeError> {
		let object = self.read_object(json, pointer)?;
		let id = object.id();
		tree.attach(parent, object);
		let children = get_array(json, &format!("{pointer}/children"))?;
		for (index, child) in children.iter().enumerate() {
			self.read_subtree(tree, id, child, &format!("{pointer}/children/{index}"))?;
		}
		Ok(())
	}

	/// Applies an owner node's property list.
	///
	/// A key the owner already has must match the declared type and gets its
	/// value overwritten; an unknown key becomes a user-defined property.
	fn read_properties(
		&mut self,
		owner: &mut impl PropertyOwner,
		json: &Json,
		pointer: &str,
	) -> Result<(), DeserializeError> {
		let properties = get_array(json, &format!("{pointer}/properties"))?;
		for (index, entry) in properties.iter().enumerate() {
			let entry_pointer = format!("{pointer}/properties/{index}");
			let key = get_str(entry, &format!("{entry_pointer}/key"))?;
			let declared = get_str(entry, &format!("{entry_pointer}/type"))?;
			let kind = ValueKind::from_type_name(declared)
				.ok_or_else(|| crate::error::LookupError(declared.to_owned()))?;
			let value_json = get(entry, &format!("{entry_pointer}/value"))?;
			let value = self.read_value(kind, value_json, &format!("{entry_pointer}/value"))?;

			if let Some(existing) = owner.property(key) {
				if existing.kind() != kind {
					return Err(DeserializeError::PropertyTypeMismatch {
						key: key.to_owned(),
						declared: declared.to_owned(),
						actual: existing.type_name().to_owned(),
					});
				}
				owner.set_value(key, value);
			} else {
				let mut property = Property::make(declared)?;
				property.set(value);
				owner.add_property(key, property);
			}
		}
		Ok(())
	}

	fn read_value(
		&mut self,
		kind: ValueKind,
		json: &Json,
		pointer: &str,
	) -> Result<Value, DeserializeError> {
		let value = match kind {
			ValueKind::Bool => Value::Bool(as_bool(json, pointer)?),
			ValueKind::Color => {
				let [r, g, b, a] = as_f64_array(json, pointer)?;
				Value::Color(Color::rgba(r, g, b, a))
			}
			ValueKind::Float => Value::Float(as_f64(json, pointer)?),
			ValueKind::Integer => Value::Integer(as_i32(json, pointer)?),
			ValueKind::Reference => {
				let raw = as_u64(json, pointer)?;
				let target = OwnerId::from_raw(raw);
				if let Some(target) = target {
					// Resolved against the declared set after phase one, so
					// forward references are fine here.
					self.pending_references.push(target.raw());
				}
				Value::Reference(target)
			}
			ValueKind::String => Value::String(as_str(json, pointer)?.to_owned()),
			ValueKind::FloatVec => {
				let [x, y] = as_f64_array(json, pointer)?;
				Value::FloatVec(Vec2::new(x, y))
			}
			ValueKind::IntegerVec => {
				let [x, y] = as_i32_array(json, pointer)?;
				Value::IntegerVec(IVec2::new(x, y))
			}
			ValueKind::Size => {
				let [width, height] = as_i32_array(json, pointer)?;
				Value::Size(Size::new(width, height))
			}
			ValueKind::Trigger => Value::Trigger,
		};
		Ok(value)
	}

	/// Phase two: every reference target must have been declared.
	fn check_references(&self) -> Result<(), DeserializeError> {
		for &target in &self.pending_references {
			if !self.declared.contains(&target) {
				return Err(DeserializeError::UnresolvedReference(target));
			}
		}
		Ok(())
	}
}

fn read_point(json: &Json, pointer: &str) -> Result<Point, DeserializeError> {
	let parts = json.as_array().ok_or_else(|| DeserializeError::Malformed {
		pointer: pointer.to_owned(),
		detail: "expected a three-pair point".to_owned(),
	})?;
	if parts.len() != 3 {
		return Err(DeserializeError::Malformed {
			pointer: pointer.to_owned(),
			detail: "expected a three-pair point".to_owned(),
		});
	}
	let [position, left_tangent, right_tangent] = [
		read_vec2(&parts[0], &format!("{pointer}/0"))?,
		read_vec2(&parts[1], &format!("{pointer}/1"))?,
		read_vec2(&parts[2], &format!("{pointer}/2"))?,
	];
	Ok(Point { position, left_tangent, right_tangent })
}

fn read_vec2(json: &Json, pointer: &str) -> Result<Vec2, DeserializeError> {
	let [x, y] = as_f64_array(json, pointer)?;
	Ok(Vec2::new(x, y))
}

fn get<'a>(json: &'a Json, pointer: &str) -> Result<&'a Json, DeserializeError> {
	let relative = pointer
		.rsplit_once('/')
		.map_or(pointer, |(_, tail)| tail);
	json.get(relative)
		.ok_or_else(|| DeserializeError::Missing(pointer.to_owned()))
}

fn get_str<'a>(json: &'a Json, pointer: &str) -> Result<&'a str, DeserializeError> {
	as_str(get(json, pointer)?, pointer)
}

fn get_u64(json: &Json, pointer: &str) -> Result<u64, DeserializeError> {
	as_u64(get(json, pointer)?, pointer)
}

fn get_array<'a>(json: &'a Json, pointer: &str) -> Result<&'a [Json], DeserializeError> {
	let value = get(json, pointer)?;
	value
		.as_array()
		.map(Vec::as_slice)
		.ok_or_else(|| DeserializeError::Malformed {
			pointer: pointer.to_owned(),
			detail: "expected an array".to_owned(),
		})
}

fn as_str<'a>(json: &'a Json, pointer: &str) -> Result<&'a str, DeserializeError> {
	json.as_str().ok_or_else(|| DeserializeError::Malformed {
		pointer: pointer.to_owned(),
		detail: "expected a string".to_owned(),
	})
}

fn as_bool(json: &Json, pointer: &str) -> Result<bool, DeserializeError> {
	json.as_bool().ok_or_else(|| DeserializeError::Malformed {
		pointer: pointer.to_owned(),
		detail: "expected a boolean".to_owned(),
	})
}

fn as_f64(json: &Json, pointer: &str) -> Result<f64, DeserializeError> {
	json.as_f64().ok_or_else(|| DeserializeError::Malformed {
		pointer: pointer.to_owned(),
		detail: "expected a number".to_owned(),
	})
}

fn as_u64(json: &Json, pointer: &str) -> Result<u64, DeserializeError> {
	json.as_u64().ok_or_else(|| DeserializeError::Malformed {
		pointer: pointer.to_owned(),
		detail: "expected an unsigned integer".to_owned(),
	})
}

fn as_i32(json: &Json, pointer: &str) -> Result<i32, DeserializeError> {
	json.as_i64()
		.and_then(|i| i32::try_from(i).ok())
		.ok_or_else(|| DeserializeError::Malformed {
			pointer: pointer.to_owned(),
			detail: "expected a 32-bit integer".to_owned(),
		})
}

fn as_f64_array<const N: usize>(json: &Json, pointer: &str) -> Result<[f64; N], DeserializeError> {
	let malformed = || DeserializeError::Malformed {
		pointer: pointer.to_owned(),
		detail: format!("expected an array of {N} numbers"),
	};
	let array = json.as_array().ok_or_else(malformed)?;
	if array.len() != N {
		return Err(malformed());
	}
	let mut out = [0.0; N];
	for (slot, value) in out.iter_mut().zip(array) {
		*slot = value.as_f64().ok_or_else(malformed)?;
	}
	Ok(out)
}

fn as_i32_array<const N: usize>(json: &Json, pointer: &str) -> Result<[i32; N], DeserializeError> {
	let malformed = || DeserializeError::Malformed {
		pointer: pointer.to_owned(),
		detail: format!("expected an array of {N} integers"),
	};
	let array = json.as_array().ok_or_else(malformed)?;
	if array.len() != N {
		return Err(malformed());
	}
	let mut out = [0; N];
	for (slot, value) in out.iter_mut().zip(array) {
		*slot = value
			.as_i64()
			.and_then(|i| i32::try_from(i).ok())
			.ok_or_else(malformed)?;
	}
	Ok(out)
}
