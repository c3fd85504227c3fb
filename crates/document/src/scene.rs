//! The editing session: a document plus its history, selection, and
//! change notification policy.

use std::cell::RefCell;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::rc::Rc;

use kurven_primitives::OwnerId;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use crate::commands::{Command, InsertCommand};
use crate::document::{
	Document, ObjectTreeAccess, StructureAccess, StyleListAccess, TagListAccess,
};
use crate::error::{DeserializeError, SaveError};
use crate::history::History;
use crate::object::ObjectKind;
use crate::observer::{DocumentEvent, DocumentObserver, SubscriptionId};
use crate::owner::PropertyOwner;
use crate::serialize;
use crate::structure::{DetachedItem, OwningContext, Structure, Subtree};
use crate::tag::TagKind;

/// A document under edit.
///
/// All mutation flows through [`Scene::submit`]; the scene decides when to
/// announce structure changes (immediately, or coalesced to one event per
/// macro) and keeps the selection in step with the document.
pub struct Scene {
	doc: Document,
	history: History,
	selection: FxHashSet<OwnerId>,
	structure_dirty: bool,
}

impl Scene {
	/// Creates a scene over an empty document.
	pub fn new() -> Self {
		Self {
			doc: Document::new(),
			history: History::new(),
			selection: FxHashSet::default(),
			structure_dirty: false,
		}
	}

	/// The document.
	pub fn document(&self) -> &Document {
		&self.doc
	}

	/// The history.
	pub fn history(&self) -> &History {
		&self.history
	}

	/// Executes `command` and records it in the history.
	///
	/// Returns `true` if the command was executed. Structural commands
	/// trigger a [`DocumentEvent::StructureChanged`] notification; inside a
	/// macro that notification is deferred until [`Scene::end_macro`].
	pub fn submit(&mut self, command: Box<dyn Command>) -> bool {
		let structural = command.alters_structure();
		if !self.history.submit(&mut self.doc, command) {
			return false;
		}
		if structural {
			self.note_structure_changed();
		}
		true
	}

	/// Opens a macro; see [`History::start_macro`].
	pub fn start_macro(&mut self, label: impl Into<String>) {
		self.history.start_macro(label);
	}

	/// Closes the open macro. If any grouped command changed structure, one
	/// coalesced notification goes out now.
	pub fn end_macro(&mut self) {
		self.history.end_macro();
		if self.structure_dirty {
			self.structure_dirty = false;
			self.doc.notify(&DocumentEvent::StructureChanged);
		}
	}

	/// Undoes the most recent command. Returns `false` if the history was
	/// exhausted.
	pub fn undo(&mut self) -> bool {
		match self.history.undo(&mut self.doc) {
			None => false,
			Some(structural) => {
				if structural {
					self.note_structure_changed();
				}
				true
			}
		}
	}

	/// Redoes the most recently undone command. Returns `false` if there
	/// was nothing to redo.
	pub fn redo(&mut self) -> bool {
		match self.history.redo(&mut self.doc) {
			None => false,
			Some(structural) => {
				if structural {
					self.note_structure_changed();
				}
				true
			}
		}
	}

	fn note_structure_changed(&mut self) {
		if self.history.in_macro() {
			self.structure_dirty = true;
		} else {
			self.doc.notify(&DocumentEvent::StructureChanged);
		}
	}

	/// Submits an insertion of a new object as the last child of `parent`.
	/// Returns the new object's id.
	pub fn add_object(
		&mut self,
		kind: ObjectKind,
		name: impl Into<String>,
		parent: OwnerId,
	) -> OwnerId {
		let object = self.doc.create_object(kind, name);
		let id = object.id();
		let predecessor = self.doc.objects().children(parent).last().copied();
		self.submit(Box::new(InsertCommand::new(
			ObjectTreeAccess,
			vec![OwningContext {
				subject: Subtree::leaf(object),
				location: parent,
				predecessor,
			}],
		)));
		id
	}

	/// Submits an insertion of a new style at the back of the style list.
	/// Returns the new style's id.
	pub fn add_style(&mut self, name: impl Into<String>) -> OwnerId {
		let style = self.doc.create_style(name);
		let id = style.id();
		let predecessor = self.doc.styles().ids().last().copied();
		self.submit(Box::new(InsertCommand::new(
			StyleListAccess,
			vec![OwningContext {
				subject: DetachedItem::new(style),
				location: (),
				predecessor,
			}],
		)));
		id
	}

	/// Submits an insertion of a new tag at the back of `object`'s tag
	/// list. Returns the new tag's id.
	pub fn add_tag(&mut self, object: OwnerId, kind: TagKind, name: impl Into<String>) -> OwnerId {
		let tag = self.doc.create_tag(kind, name);
		let id = tag.id();
		let access = TagListAccess { object };
		let predecessor = access.structure(&self.doc).ids().last().copied();
		self.submit(Box::new(InsertCommand::new(
			access,
			vec![OwningContext {
				subject: DetachedItem::new(tag),
				location: (),
				predecessor,
			}],
		)));
		id
	}

	/// Selects or deselects one owner. Selecting an already-selected owner
	/// (or deselecting an unselected one) is a no-op and notifies nobody.
	pub fn set_selected(&mut self, id: OwnerId, selected: bool) {
		let changed = if selected {
			self.selection.insert(id)
		} else {
			self.selection.remove(&id)
		};
		if changed {
			self.notify_selection();
		}
	}

	/// True if `id` is selected and live.
	pub fn is_selected(&self, id: OwnerId) -> bool {
		self.selection.contains(&id) && self.doc.find_owner(id).is_some()
	}

	/// Deselects everything.
	pub fn clear_selection(&mut self) {
		if !self.selection.is_empty() {
			self.selection.clear();
			self.notify_selection();
		}
	}

	/// The live selection, in ascending id order.
	///
	/// Selected owners that are currently detached (removed, not yet
	/// undone) are filtered out here but stay in the set, so undoing the
	/// removal restores them to the selection.
	pub fn selection(&self) -> Vec<OwnerId> {
		let mut out: Vec<OwnerId> = self
			.selection
			.iter()
			.copied()
			.filter(|&id| self.doc.find_owner(id).is_some())
			.collect();
		out.sort_unstable();
		out
	}

	fn notify_selection(&mut self) {
		let selection = self.selection();
		self.doc
			.notify(&DocumentEvent::SelectionChanged { selection: &selection });
	}

	/// Registers a change observer on the document. The registration
	/// survives loads and resets.
	pub fn subscribe(&mut self, observer: &Rc<RefCell<dyn DocumentObserver>>) -> SubscriptionId {
		self.doc.subscribe(observer)
	}

	/// Revokes a subscription.
	pub fn unsubscribe(&mut self, id: SubscriptionId) {
		self.doc.unsubscribe(id)
	}

	/// True if the document differs from the last saved or loaded state.
	pub fn has_pending_changes(&self) -> bool {
		self.history.is_modified()
	}

	/// Writes the document to `path` and marks the current state as saved.
	pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<(), SaveError> {
		let path = path.as_ref();
		let file = File::create(path)?;
		let json = serialize::serialize_document(&self.doc);
		serde_json::to_writer_pretty(BufWriter::new(file), &json)?;
		self.history.set_unmodified();
		info!(path = %path.display(), "saved document");
		Ok(())
	}

	/// Loads a document from `path`, replacing the current one.
	///
	/// On failure the scene is left untouched. On success the history and
	/// selection are cleared and live observers carry over.
	pub fn load_from(&mut self, path: impl AsRef<Path>) -> Result<(), DeserializeError> {
		let path = path.as_ref();
		let file = File::open(path)?;
		let json: serde_json::Value = serde_json::from_reader(BufReader::new(file))?;
		let doc = serialize::deserialize_document(&json)?;
		info!(path = %path.display(), "loaded document");
		self.replace_document(doc);
		Ok(())
	}

	/// Replaces the document with a fresh empty one, clearing history and
	/// selection. Live observers carry over.
	pub fn reset(&mut self) {
		debug!("resetting scene");
		self.replace_document(Document::new());
	}

	fn replace_document(&mut self, mut doc: Document) {
		doc.adopt_observers(&mut self.doc);
		self.doc = doc;
		self.history.clear();
		self.selection.clear();
		self.doc.notify(&DocumentEvent::StructureChanged);
	}
}

impl Default for Scene {
	fn default() -> Self {
		Self::new()
	}
}
