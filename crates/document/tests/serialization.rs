//! Round-trip and error behavior of the document format.

// Integration tests link the workspace crates but use only a slice of them.
#![allow(unused_crate_dependencies)]

use kurven_document::commands::SetPropertiesCommand;
use kurven_document::style::PEN_WIDTH_KEY;
use kurven_document::tag::STYLE_REFERENCE_KEY;
use kurven_document::{
	DeserializeError, ObjectKind, PropertyOwner, Scene, Structure, deserialize_document,
	serialize_document,
};
use kurven_primitives::{Point, Value, Vec2};
use pretty_assertions::assert_eq;
use serde_json::json;

/// A scene exercising every owner type, point geometry, a style reference,
/// and a user-defined property.
fn rich_scene() -> Scene {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let group = scene.add_object(ObjectKind::Empty, "group", root);
	let rect = scene.add_object(ObjectKind::Rectangle, "rect", group);
	scene.add_object(
		ObjectKind::Path {
			points: vec![
				Point::corner(Vec2::new(0.0, 0.0)),
				Point {
					position: Vec2::new(4.0, 2.0),
					left_tangent: Vec2::new(-1.0, 0.0),
					right_tangent: Vec2::new(1.0, 0.0),
				},
			],
		},
		"path",
		root,
	);
	let style = scene.add_style("flat");
	let tag = scene.add_tag(rect, kurven_document::TagKind::Style, "styling");

	let command = SetPropertiesCommand::new(
		scene.document(),
		&[tag],
		STYLE_REFERENCE_KEY,
		Value::Reference(Some(style)),
	);
	scene.submit(Box::new(command));
	let command = SetPropertiesCommand::new(
		scene.document(),
		&[style],
		PEN_WIDTH_KEY,
		Value::Float(2.5),
	);
	scene.submit(Box::new(command));
	scene
}

#[test]
fn test_round_trip_is_exact() {
	let scene = rich_scene();
	let first = serialize_document(scene.document());
	let loaded = deserialize_document(&first).unwrap();
	let second = serialize_document(&loaded);
	assert_eq!(first, second);
}

#[test]
fn test_loaded_document_allocates_past_adopted_ids() {
	let scene = rich_scene();
	let json = serialize_document(scene.document());
	let loaded = deserialize_document(&json).unwrap();

	let max_raw = loaded
		.objects()
		.ids()
		.into_iter()
		.chain(loaded.styles().ids())
		.map(|id| id.raw())
		.max()
		.unwrap();
	let fresh = loaded.create_style("new");
	assert!(fresh.id().raw() > max_raw);
}

#[test]
fn test_forward_reference_resolves() {
	// The tag at /root/children/0 references style 9, declared afterwards.
	let json = json!({
		"root": {
			"type": "Empty", "id": 1, "properties": [], "tags": [],
			"children": [{
				"type": "Rectangle", "id": 2, "properties": [],
				"tags": [{
					"type": "StyleTag", "id": 3,
					"properties": [
						{"key": "style", "type": "Reference", "value": 9}
					]
				}],
				"children": []
			}]
		},
		"styles": [{"type": "Style", "id": 9, "properties": []}]
	});
	let doc = deserialize_document(&json).unwrap();

	let tag = doc.find_owner(kurven_primitives::OwnerId::from_raw(3).unwrap()).unwrap();
	let target = tag
		.property(STYLE_REFERENCE_KEY)
		.unwrap()
		.value()
		.as_reference();
	let style = doc.resolve_reference(target).unwrap();
	assert_eq!(style.id().raw(), 9);
}

#[test]
fn test_null_reference_round_trips() {
	let json = json!({
		"root": {
			"type": "Empty", "id": 1, "properties": [],
			"tags": [{
				"type": "StyleTag", "id": 2,
				"properties": [{"key": "style", "type": "Reference", "value": 0}]
			}],
			"children": []
		},
		"styles": []
	});
	let doc = deserialize_document(&json).unwrap();
	let tag = doc.find_owner(kurven_primitives::OwnerId::from_raw(2).unwrap()).unwrap();
	assert_eq!(
		tag.property(STYLE_REFERENCE_KEY).unwrap().value(),
		&Value::Reference(None)
	);
}

#[test]
fn test_unresolved_reference_is_rejected() {
	let json = json!({
		"root": {
			"type": "Empty", "id": 1, "properties": [],
			"tags": [{
				"type": "StyleTag", "id": 2,
				"properties": [{"key": "style", "type": "Reference", "value": 99}]
			}],
			"children": []
		},
		"styles": []
	});
	let error = deserialize_document(&json).unwrap_err();
	assert!(matches!(error, DeserializeError::UnresolvedReference(99)));
}

#[test]
fn test_duplicate_id_is_rejected() {
	let json = json!({
		"root": {
			"type": "Empty", "id": 1, "properties": [], "tags": [],
			"children": [
				{"type": "Empty", "id": 2, "properties": [], "tags": [], "children": []},
				{"type": "Empty", "id": 2, "properties": [], "tags": [], "children": []}
			]
		},
		"styles": []
	});
	let error = deserialize_document(&json).unwrap_err();
	assert!(matches!(error, DeserializeError::DuplicateId(2)));
}

#[test]
fn test_unknown_owner_type_is_rejected() {
	let json = json!({
		"root": {
			"type": "Empty", "id": 1, "properties": [], "tags": [],
			"children": [
				{"type": "Hypercube", "id": 2, "properties": [], "tags": [], "children": []}
			]
		},
		"styles": []
	});
	let error = deserialize_document(&json).unwrap_err();
	assert!(matches!(error, DeserializeError::UnknownType(_)));
}

#[test]
fn test_declared_type_conflict_is_rejected() {
	let json = json!({
		"root": {
			"type": "Empty", "id": 1,
			"properties": [{"key": "name", "type": "Integer", "value": 5}],
			"tags": [], "children": []
		},
		"styles": []
	});
	let error = deserialize_document(&json).unwrap_err();
	assert!(matches!(
		error,
		DeserializeError::PropertyTypeMismatch { ref key, .. } if key == "name"
	));
}

#[test]
fn test_user_defined_property_round_trips() {
	let json = json!({
		"root": {
			"type": "Empty", "id": 1,
			"properties": [{"key": "layer", "type": "Integer", "value": 7}],
			"tags": [], "children": []
		},
		"styles": []
	});
	let doc = deserialize_document(&json).unwrap();
	let root = doc.find_owner(doc.root()).unwrap();
	let layer = root.property("layer").unwrap();
	assert!(layer.is_user_defined());
	assert_eq!(layer.value(), &Value::Integer(7));

	let out = serialize_document(&doc);
	let reloaded = deserialize_document(&out).unwrap();
	assert_eq!(
		reloaded
			.find_owner(reloaded.root())
			.unwrap()
			.property("layer")
			.unwrap()
			.value(),
		&Value::Integer(7)
	);
}

#[test]
fn test_save_and_load_through_scene() {
	let dir = tempfile::tempdir().unwrap();
	let file = dir.path().join("doc.json");

	let mut scene = rich_scene();
	assert!(scene.has_pending_changes());
	scene.save_to(&file).unwrap();
	assert!(!scene.has_pending_changes());

	let expected = serialize_document(scene.document());

	// Mutate, then load the saved state back.
	let root = scene.document().root();
	scene.add_object(ObjectKind::Empty, "stray", root);
	scene.load_from(&file).unwrap();
	assert_eq!(serialize_document(scene.document()), expected);
	assert!(!scene.history().can_undo());
}

#[test]
fn test_failed_load_leaves_scene_untouched() {
	let dir = tempfile::tempdir().unwrap();
	let file = dir.path().join("bad.json");
	std::fs::write(
		&file,
		serde_json::to_vec(&json!({
			"root": {
				"type": "Hypercube", "id": 1, "properties": [], "tags": [], "children": []
			},
			"styles": []
		}))
		.unwrap(),
	)
	.unwrap();

	let mut scene = rich_scene();
	let before = serialize_document(scene.document());
	assert!(scene.load_from(&file).is_err());
	assert_eq!(serialize_document(scene.document()), before);
}

#[test]
fn test_missing_field_reports_pointer() {
	let json = json!({
		"root": {"type": "Empty", "id": 1, "tags": [], "children": []},
		"styles": []
	});
	let error = deserialize_document(&json).unwrap_err();
	assert!(matches!(error, DeserializeError::Missing(ref p) if p == "/root/properties"));
}

#[test]
fn test_points_survive_round_trip() {
	let scene = rich_scene();
	let json = serialize_document(scene.document());
	let loaded = deserialize_document(&json).unwrap();

	let path = loaded
		.objects()
		.ids()
		.into_iter()
		.find(|&id| loaded.objects().item(id).unwrap().points().is_some())
		.unwrap();
	let points = loaded.objects().item(path).unwrap().points().unwrap();
	assert_eq!(points.len(), 2);
	assert_eq!(points[1].left_tangent, Vec2::new(-1.0, 0.0));
}
