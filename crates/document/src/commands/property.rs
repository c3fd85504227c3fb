//! Value-level commands: batch property assignment and path point edits.

use std::any::Any;

use kurven_primitives::{OwnerId, Point, Value};
use rustc_hash::FxHashSet;

use crate::document::Document;
use crate::observer::{DocumentEvent, TraceSet};
use crate::structure::Structure;

use super::Command;

struct Assignment {
	owner: OwnerId,
	key: String,
	old: Value,
	new: Value,
}

/// Assigns one value to the same property key on a batch of owners.
///
/// Consecutive submissions over the same owner set and key merge into a
/// single undo step, so dragging a slider leaves one history entry.
pub struct SetPropertiesCommand {
	assignments: Vec<Assignment>,
}

impl SetPropertiesCommand {
	/// Creates an assignment of `value` to `key` on every owner in
	/// `targets`, capturing the current values for undo.
	///
	/// # Panics
	/// Panics if a target is not live, lacks the key, or holds a value of
	/// an incompatible kind.
	pub fn new(doc: &Document, targets: &[OwnerId], key: &str, value: Value) -> Self {
		let assignments = targets
			.iter()
			.map(|&owner| {
				let current = doc
					.find_owner(owner)
					.unwrap_or_else(|| panic!("no live owner {owner}"))
					.property(key)
					.unwrap_or_else(|| panic!("owner {owner} has no property {key:?}"));
				Assignment {
					owner,
					key: key.to_owned(),
					old: current.value().clone(),
					new: value.clone(),
				}
			})
			.collect();
		Self { assignments }
	}

	/// The (owner, key) pairs this command writes to.
	fn target_set(&self) -> FxHashSet<(OwnerId, &str)> {
		self.assignments
			.iter()
			.map(|a| (a.owner, a.key.as_str()))
			.collect()
	}
}

impl Command for SetPropertiesCommand {
	fn label(&self) -> &str {
		"set value"
	}

	fn redo(&mut self, doc: &mut Document) {
		let mut trace = TraceSet::default();
		for assignment in &self.assignments {
			doc.set_value_traced(
				assignment.owner,
				&assignment.key,
				assignment.new.clone(),
				&mut trace,
			);
		}
	}

	fn undo(&mut self, doc: &mut Document) {
		let mut trace = TraceSet::default();
		for assignment in self.assignments.iter().rev() {
			doc.set_value_traced(
				assignment.owner,
				&assignment.key,
				assignment.old.clone(),
				&mut trace,
			);
		}
	}

	fn is_noop(&self, _doc: &Document) -> bool {
		self.assignments.iter().all(|a| a.old == a.new)
	}

	fn alters_structure(&self) -> bool {
		false
	}

	fn try_merge(&mut self, other: &dyn Command) -> bool {
		let Some(other) = other.as_any().downcast_ref::<Self>() else {
			return false;
		};
		if self.target_set() != other.target_set() {
			return false;
		}
		// Keep the original `old` values; only the final values move.
		for assignment in &mut self.assignments {
			let incoming = other
				.assignments
				.iter()
				.find(|a| a.owner == assignment.owner && a.key == assignment.key)
				.expect("equal target sets cover every assignment");
			assignment.new = incoming.new.clone();
		}
		true
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Replaces the full point list of one path object.
///
/// Consecutive submissions against the same object merge, so an
/// interactive point drag leaves one history entry.
pub struct SetPointsCommand {
	object: OwnerId,
	old: Vec<Point>,
	new: Vec<Point>,
}

impl SetPointsCommand {
	/// Creates a replacement of `object`'s points with `points`.
	///
	/// # Panics
	/// Panics if `object` is not a live path.
	pub fn new(doc: &Document, object: OwnerId, points: Vec<Point>) -> Self {
		let old = doc
			.objects()
			.item(object)
			.unwrap_or_else(|| panic!("no live object {object}"))
			.points()
			.unwrap_or_else(|| panic!("object {object} has no point geometry"))
			.to_vec();
		Self { object, old, new: points }
	}

	fn apply(&self, doc: &mut Document, points: &[Point]) {
		let target = doc
			.objects_mut()
			.item_mut(self.object)
			.unwrap_or_else(|| panic!("no live object {}", self.object))
			.points_mut()
			.unwrap_or_else(|| panic!("object {} has no point geometry", self.object));
		target.clear();
		target.extend_from_slice(points);
		doc.notify(&DocumentEvent::PointsChanged { object: self.object });
	}
}

impl Command for SetPointsCommand {
	fn label(&self) -> &str {
		"modify points"
	}

	fn redo(&mut self, doc: &mut Document) {
		let points = self.new.clone();
		self.apply(doc, &points);
	}

	fn undo(&mut self, doc: &mut Document) {
		let points = self.old.clone();
		self.apply(doc, &points);
	}

	fn is_noop(&self, _doc: &Document) -> bool {
		self.old == self.new
	}

	fn alters_structure(&self) -> bool {
		false
	}

	fn try_merge(&mut self, other: &dyn Command) -> bool {
		let Some(other) = other.as_any().downcast_ref::<Self>() else {
			return false;
		};
		if self.object != other.object {
			return false;
		}
		self.new = other.new.clone();
		true
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}
