//! End-to-end undo and redo behavior over a live scene.

// Integration tests link the workspace crates but use only a slice of them.
#![allow(unused_crate_dependencies)]

use kurven_document::commands::{
	CopyCommand, CopySource, MoveCommand, RemoveCommand, SetPointsCommand, SetPropertiesCommand,
};
use kurven_document::tag::STYLE_REFERENCE_KEY;
use kurven_document::{
	MoveContext, NAME_KEY, ObjectKind, ObjectTreeAccess, PropertyOwner, Scene, Structure,
	StyleListAccess, TagKind,
};
use kurven_primitives::{Point, Value, Vec2};
use pretty_assertions::assert_eq;

#[test]
fn test_move_reorders_siblings_and_reverts() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	let b = scene.add_object(ObjectKind::Empty, "b", root);
	assert_eq!(scene.document().objects().children(root), &[a, b]);

	let command = MoveCommand::new(
		scene.document(),
		ObjectTreeAccess,
		vec![MoveContext { subject: b, location: root, predecessor: None }],
	);
	assert!(scene.submit(Box::new(command)));
	assert_eq!(scene.document().objects().children(root), &[b, a]);

	assert!(scene.undo());
	assert_eq!(scene.document().objects().children(root), &[a, b]);
	assert!(scene.redo());
	assert_eq!(scene.document().objects().children(root), &[b, a]);
}

#[test]
fn test_identity_move_is_not_recorded() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	let b = scene.add_object(ObjectKind::Empty, "b", root);
	let before = scene.history().len();

	let command = MoveCommand::new(
		scene.document(),
		ObjectTreeAccess,
		vec![MoveContext { subject: b, location: root, predecessor: Some(a) }],
	);
	assert!(!scene.submit(Box::new(command)));
	assert_eq!(scene.history().len(), before);
}

#[test]
fn test_reparent_undo_restores_exact_position() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let group = scene.add_object(ObjectKind::Empty, "group", root);
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	let b = scene.add_object(ObjectKind::Empty, "b", root);
	assert_eq!(scene.document().objects().children(root), &[group, a, b]);

	let command = MoveCommand::new(
		scene.document(),
		ObjectTreeAccess,
		vec![MoveContext { subject: a, location: group, predecessor: None }],
	);
	scene.submit(Box::new(command));
	assert_eq!(scene.document().objects().children(root), &[group, b]);
	assert_eq!(scene.document().objects().children(group), &[a]);

	scene.undo();
	assert_eq!(scene.document().objects().children(root), &[group, a, b]);
	assert_eq!(scene.document().objects().children(group), &[] as &[_]);
}

#[test]
fn test_batched_move_with_internal_dependency_reverts() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let group = scene.add_object(ObjectKind::Empty, "group", root);
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	let b = scene.add_object(ObjectKind::Empty, "b", root);

	// The second context's predecessor is the first context's subject, so
	// undoing in reverse must cope with positions the batch itself changed.
	let command = MoveCommand::new(
		scene.document(),
		ObjectTreeAccess,
		vec![
			MoveContext { subject: a, location: group, predecessor: None },
			MoveContext { subject: b, location: group, predecessor: Some(a) },
		],
	);
	scene.submit(Box::new(command));
	assert_eq!(scene.document().objects().children(root), &[group]);
	assert_eq!(scene.document().objects().children(group), &[a, b]);

	assert!(scene.undo());
	assert_eq!(scene.document().objects().children(root), &[group, a, b]);
	assert_eq!(scene.document().objects().children(group), &[] as &[_]);

	assert!(scene.redo());
	assert_eq!(scene.document().objects().children(group), &[a, b]);
}

#[test]
fn test_unordered_sibling_removal_restores_order() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	let b = scene.add_object(ObjectKind::Empty, "b", root);
	let c = scene.add_object(ObjectKind::Empty, "c", root);

	// Removal order deliberately disagrees with sibling order.
	let command = RemoveCommand::new(scene.document(), ObjectTreeAccess, &[c, a]);
	scene.submit(Box::new(command));
	assert_eq!(scene.document().objects().children(root), &[b]);

	scene.undo();
	assert_eq!(scene.document().objects().children(root), &[a, b, c]);
	scene.redo();
	assert_eq!(scene.document().objects().children(root), &[b]);
}

#[test]
fn test_removal_set_is_normalized_to_top_ancestors() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let parent = scene.add_object(ObjectKind::Empty, "parent", root);
	let child = scene.add_object(ObjectKind::Empty, "child", parent);

	let command = RemoveCommand::new(scene.document(), ObjectTreeAccess, &[parent, child]);
	scene.submit(Box::new(command));
	assert!(!scene.document().objects().contains(parent));
	assert!(!scene.document().objects().contains(child));

	scene.undo();
	assert_eq!(scene.document().objects().children(root), &[parent]);
	assert_eq!(scene.document().objects().children(parent), &[child]);
}

#[test]
fn test_dangling_reference_reads_null_and_heals_on_undo() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let object = scene.add_object(ObjectKind::Rectangle, "rect", root);
	let style = scene.add_style("flat");
	let tag = scene.add_tag(object, TagKind::Style, "styling");

	let command = SetPropertiesCommand::new(
		scene.document(),
		&[tag],
		STYLE_REFERENCE_KEY,
		Value::Reference(Some(style)),
	);
	scene.submit(Box::new(command));

	let target = |scene: &Scene| {
		let doc = scene.document();
		let tag_owner = doc.find_owner(tag).unwrap();
		let reference = tag_owner
			.property(STYLE_REFERENCE_KEY)
			.unwrap()
			.value()
			.as_reference();
		doc.resolve_reference(reference).map(|owner| owner.id())
	};
	assert_eq!(target(&scene), Some(style));

	let command = RemoveCommand::new(scene.document(), StyleListAccess, &[style]);
	scene.submit(Box::new(command));
	// The stored id still points at the removed style; it reads as null.
	assert_eq!(target(&scene), None);

	scene.undo();
	assert_eq!(target(&scene), Some(style));
}

#[test]
fn test_macro_undoes_atomically() {
	let mut scene = Scene::new();
	let root = scene.document().root();

	scene.start_macro("create pair");
	scene.add_object(ObjectKind::Empty, "a", root);
	scene.add_object(ObjectKind::Empty, "b", root);
	scene.end_macro();

	assert_eq!(scene.document().objects().children(root).len(), 2);
	assert_eq!(scene.history().len(), 1);
	assert_eq!(scene.history().undo_label(), Some("create pair"));

	scene.undo();
	assert_eq!(scene.document().objects().children(root).len(), 0);
	scene.redo();
	assert_eq!(scene.document().objects().children(root).len(), 2);
}

#[test]
fn test_property_commands_merge_and_undo_to_origin() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	let entries = scene.history().len();

	for name in ["ab", "abc", "abcd"] {
		let command = SetPropertiesCommand::new(
			scene.document(),
			&[a],
			NAME_KEY,
			Value::String(name.to_owned()),
		);
		scene.submit(Box::new(command));
	}
	assert_eq!(scene.history().len(), entries + 1);

	let name = |scene: &Scene| scene.document().find_owner(a).unwrap().name().to_owned();
	assert_eq!(name(&scene), "abcd");
	scene.undo();
	assert_eq!(name(&scene), "a");
	scene.redo();
	assert_eq!(name(&scene), "abcd");
}

#[test]
fn test_property_commands_over_different_targets_do_not_merge() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	let b = scene.add_object(ObjectKind::Empty, "b", root);
	let entries = scene.history().len();

	let command =
		SetPropertiesCommand::new(scene.document(), &[a], NAME_KEY, Value::String("x".into()));
	scene.submit(Box::new(command));
	let command =
		SetPropertiesCommand::new(scene.document(), &[b], NAME_KEY, Value::String("y".into()));
	scene.submit(Box::new(command));
	assert_eq!(scene.history().len(), entries + 2);
}

#[test]
fn test_point_edits_merge_per_object() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let path = scene.add_object(ObjectKind::Path { points: Vec::new() }, "path", root);
	let entries = scene.history().len();

	let drag = [
		vec![Point::corner(Vec2::new(1.0, 0.0))],
		vec![Point::corner(Vec2::new(2.0, 0.0))],
		vec![Point::corner(Vec2::new(3.0, 0.0))],
	];
	for points in drag {
		let command = SetPointsCommand::new(scene.document(), path, points);
		scene.submit(Box::new(command));
	}
	assert_eq!(scene.history().len(), entries + 1);

	let points = |scene: &Scene| {
		scene
			.document()
			.objects()
			.item(path)
			.unwrap()
			.points()
			.unwrap()
			.to_vec()
	};
	assert_eq!(points(&scene), vec![Point::corner(Vec2::new(3.0, 0.0))]);
	scene.undo();
	assert_eq!(points(&scene), Vec::<Point>::new());
}

#[test]
fn test_copy_mints_fresh_ids_and_reverts() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let group = scene.add_object(ObjectKind::Empty, "group", root);
	let leaf = scene.add_object(ObjectKind::Rectangle, "leaf", group);

	let command = CopyCommand::new(
		scene.document(),
		ObjectTreeAccess,
		vec![CopySource { source: group, location: root, predecessor: Some(group) }],
	);
	let copies = command.copied_ids();
	scene.submit(Box::new(command));

	let copy = copies[0];
	assert_ne!(copy, group);
	assert_eq!(scene.document().objects().children(root), &[group, copy]);
	let copied_children = scene.document().objects().children(copy).to_vec();
	assert_eq!(copied_children.len(), 1);
	assert_ne!(copied_children[0], leaf);
	assert_eq!(
		scene.document().find_owner(copied_children[0]).unwrap().name(),
		"leaf"
	);

	scene.undo();
	assert_eq!(scene.document().objects().children(root), &[group]);
	scene.redo();
	assert_eq!(scene.document().objects().children(root), &[group, copy]);
}

#[test]
fn test_selection_hides_removed_owners_until_undo() {
	let mut scene = Scene::new();
	let root = scene.document().root();
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	scene.set_selected(a, true);
	assert_eq!(scene.selection(), vec![a]);

	let command = RemoveCommand::new(scene.document(), ObjectTreeAccess, &[a]);
	scene.submit(Box::new(command));
	assert!(scene.selection().is_empty());
	assert!(!scene.is_selected(a));

	scene.undo();
	assert_eq!(scene.selection(), vec![a]);
}
