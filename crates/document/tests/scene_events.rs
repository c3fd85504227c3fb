//! Observer notification policy: what is announced, and how often.

// Integration tests link the workspace crates but use only a slice of them.
#![allow(unused_crate_dependencies)]

use std::cell::RefCell;
use std::rc::Rc;

use kurven_document::commands::{SetPointsCommand, SetPropertiesCommand};
use kurven_document::{
	DocumentEvent, DocumentObserver, NAME_KEY, ObjectKind, PropertyOwner, Scene,
};
use kurven_primitives::{Point, Value, Vec2};
use pretty_assertions::assert_eq;

#[derive(Default)]
struct Recorder {
	property: usize,
	points: usize,
	structure: usize,
	selection: usize,
}

impl DocumentObserver for Recorder {
	fn on_event(&mut self, event: &DocumentEvent<'_>) {
		match event {
			DocumentEvent::PropertyChanged { .. } => self.property += 1,
			DocumentEvent::PointsChanged { .. } => self.points += 1,
			DocumentEvent::StructureChanged => self.structure += 1,
			DocumentEvent::SelectionChanged { .. } => self.selection += 1,
		}
	}
}

fn observed_scene() -> (Scene, Rc<RefCell<Recorder>>) {
	let mut scene = Scene::new();
	let recorder = Rc::new(RefCell::new(Recorder::default()));
	let observer: Rc<RefCell<dyn DocumentObserver>> = recorder.clone();
	scene.subscribe(&observer);
	(scene, recorder)
}

#[test]
fn test_structural_commands_announce_once_each() {
	let (mut scene, recorder) = observed_scene();
	let root = scene.document().root();
	scene.add_object(ObjectKind::Empty, "a", root);
	scene.add_object(ObjectKind::Empty, "b", root);
	assert_eq!(recorder.borrow().structure, 2);

	scene.undo();
	assert_eq!(recorder.borrow().structure, 3);
}

#[test]
fn test_macro_coalesces_structure_events() {
	let (mut scene, recorder) = observed_scene();
	let root = scene.document().root();

	scene.start_macro("populate");
	scene.add_object(ObjectKind::Empty, "a", root);
	scene.add_object(ObjectKind::Empty, "b", root);
	scene.add_style("s");
	assert_eq!(recorder.borrow().structure, 0);
	scene.end_macro();
	assert_eq!(recorder.borrow().structure, 1);
}

#[test]
fn test_property_change_announces_per_owner() {
	let (mut scene, recorder) = observed_scene();
	let root = scene.document().root();
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	let b = scene.add_object(ObjectKind::Empty, "b", root);

	let command = SetPropertiesCommand::new(
		scene.document(),
		&[a, b],
		NAME_KEY,
		Value::String("renamed".into()),
	);
	scene.submit(Box::new(command));
	assert_eq!(recorder.borrow().property, 2);
	// Value commands never announce structure changes.
	assert_eq!(recorder.borrow().structure, 2);
}

#[test]
fn test_unchanged_value_is_silent() {
	let (mut scene, recorder) = observed_scene();
	let root = scene.document().root();
	let a = scene.add_object(ObjectKind::Empty, "a", root);
	let events = recorder.borrow().property;

	let command =
		SetPropertiesCommand::new(scene.document(), &[a], NAME_KEY, Value::String("a".into()));
	assert!(!scene.submit(Box::new(command)));
	assert_eq!(recorder.borrow().property, events);
}

#[test]
fn test_point_edits_announce_points_changed() {
	let (mut scene, recorder) = observed_scene();
	let root = scene.document().root();
	let path = scene.add_object(ObjectKind::Path { points: Vec::new() }, "p", root);

	let command = SetPointsCommand::new(
		scene.document(),
		path,
		vec![Point::corner(Vec2::new(1.0, 1.0))],
	);
	scene.submit(Box::new(command));
	assert_eq!(recorder.borrow().points, 1);
	scene.undo();
	assert_eq!(recorder.borrow().points, 2);
}

#[test]
fn test_selection_changes_announce_once() {
	let (mut scene, recorder) = observed_scene();
	let root = scene.document().root();
	let a = scene.add_object(ObjectKind::Empty, "a", root);

	scene.set_selected(a, true);
	scene.set_selected(a, true);
	assert_eq!(recorder.borrow().selection, 1);

	scene.clear_selection();
	scene.clear_selection();
	assert_eq!(recorder.borrow().selection, 2);
}

#[test]
fn test_observers_survive_reset() {
	let (mut scene, recorder) = observed_scene();
	let root = scene.document().root();
	scene.add_object(ObjectKind::Empty, "a", root);
	let before = recorder.borrow().structure;

	scene.reset();
	assert_eq!(recorder.borrow().structure, before + 1);
	assert_eq!(scene.document().find_owner(scene.document().root()).unwrap().name(), "_root_");
}
