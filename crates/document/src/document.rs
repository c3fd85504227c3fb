//! The data layer: object tree, style list, id allocation, and change
//! notification. Commands mutate a [`Document`]; the [`Scene`] layers
//! history and selection on top.
//!
//! [`Scene`]: crate::scene::Scene

use std::cell::RefCell;
use std::rc::Rc;

use kurven_primitives::{OwnerId, Value};

use crate::object::{Object, ObjectKind};
use crate::observer::{DocumentEvent, DocumentObserver, Observers, SubscriptionId, TraceSet};
use crate::owner::{self, PropertyOwner};
use crate::structure::{IdAllocator, List, Structure, Tree};
use crate::style::Style;
use crate::tag::{Tag, TagKind};

/// Name given to the implicit root object.
pub const ROOT_NAME: &str = "_root_";

/// The complete in-memory document: one object tree plus one style list.
#[derive(Debug)]
pub struct Document {
	objects: Tree<Object>,
	styles: List<Style>,
	ids: IdAllocator,
	observers: Observers,
}

impl Document {
	/// Creates a document holding only the root object.
	pub fn new() -> Self {
		let ids = IdAllocator::new();
		let root = Object::new(ids.allocate(), ObjectKind::Empty, ROOT_NAME);
		Self {
			objects: Tree::new(root),
			styles: List::new(),
			ids,
			observers: Observers::default(),
		}
	}

	pub(crate) fn from_parts(objects: Tree<Object>, styles: List<Style>, ids: IdAllocator) -> Self {
		Self { objects, styles, ids, observers: Observers::default() }
	}

	/// Transplants another document's subscriptions into this one. Used
	/// when a load or reset replaces the document behind live observers.
	pub(crate) fn adopt_observers(&mut self, other: &mut Document) {
		self.observers = std::mem::take(&mut other.observers);
	}

	/// The object tree.
	pub fn objects(&self) -> &Tree<Object> {
		&self.objects
	}

	pub(crate) fn objects_mut(&mut self) -> &mut Tree<Object> {
		&mut self.objects
	}

	/// The style list.
	pub fn styles(&self) -> &List<Style> {
		&self.styles
	}

	/// Id of the root object.
	pub fn root(&self) -> OwnerId {
		self.objects.root()
	}

	/// The document's id allocator.
	pub fn id_allocator(&self) -> &IdAllocator {
		&self.ids
	}

	/// Creates a detached object with a fresh id.
	pub fn create_object(&self, kind: ObjectKind, name: impl Into<String>) -> Object {
		Object::new(self.ids.allocate(), kind, name)
	}

	/// Creates a detached tag with a fresh id.
	pub fn create_tag(&self, kind: TagKind, name: impl Into<String>) -> Tag {
		Tag::new(self.ids.allocate(), kind, name)
	}

	/// Creates a detached style with a fresh id.
	pub fn create_style(&self, name: impl Into<String>) -> Style {
		Style::new(self.ids.allocate(), name)
	}

	/// Looks up any live owner (object, tag, or style) by id.
	pub fn find_owner(&self, id: OwnerId) -> Option<&dyn PropertyOwner> {
		if let Some(object) = self.objects.item(id) {
			return Some(object);
		}
		if let Some(style) = self.styles.item(id) {
			return Some(style);
		}
		self.objects
			.iter_items()
			.find_map(|object| object.tags().item(id))
			.map(|tag| tag as &dyn PropertyOwner)
	}

	/// Mutable lookup of any live owner by id.
	pub fn find_owner_mut(&mut self, id: OwnerId) -> Option<&mut dyn PropertyOwner> {
		if self.objects.contains(id) {
			return self
				.objects
				.item_mut(id)
				.map(|object| object as &mut dyn PropertyOwner);
		}
		if self.styles.contains(id) {
			return self
				.styles
				.item_mut(id)
				.map(|style| style as &mut dyn PropertyOwner);
		}
		self.objects
			.iter_items_mut()
			.find_map(|object| object.tags_mut().item_mut(id))
			.map(|tag| tag as &mut dyn PropertyOwner)
	}

	/// Resolves a reference value to its live target.
	///
	/// A reference to a detached or destroyed owner reads as `None`; no
	/// bookkeeping is required when the target goes away, and re-attaching
	/// the target (undo) heals the reference.
	pub fn resolve_reference(&self, target: Option<OwnerId>) -> Option<&dyn PropertyOwner> {
		self.find_owner(target?)
	}

	/// Sets a property value, starting a fresh propagation pass.
	///
	/// Returns the previous value if the stored value changed.
	pub fn set_value(&mut self, owner: OwnerId, key: &str, value: Value) -> Option<Value> {
		let mut trace = TraceSet::default();
		self.set_value_traced(owner, key, value, &mut trace)
	}

	/// Sets a property value within an ongoing propagation pass.
	///
	/// The owner is recorded in `trace`; observers are only notified on the
	/// first visit, so mutually-triggering properties cannot notify forever.
	///
	/// # Panics
	/// Panics if no owner with this id is live, the key is missing, or the
	/// value kind mismatches.
	pub fn set_value_traced(
		&mut self,
		owner: OwnerId,
		key: &str,
		value: Value,
		trace: &mut TraceSet,
	) -> Option<Value> {
		let target = self
			.find_owner_mut(owner)
			.unwrap_or_else(|| panic!("no live owner {owner}"));
		let old = target.set_value(key, value);
		let first_visit = trace.insert(owner);
		if old.is_some() && first_visit {
			self.observers
				.notify(&DocumentEvent::PropertyChanged { owner, key, trace });
		}
		old
	}

	/// Keys shared, with compatible kinds, by every owner in `selection`.
	///
	/// # Panics
	/// Panics if an id in `selection` is not live.
	pub fn key_intersection(&self, selection: &[OwnerId]) -> Vec<String> {
		let owners: Vec<&dyn PropertyOwner> = selection
			.iter()
			.map(|&id| {
				self.find_owner(id)
					.unwrap_or_else(|| panic!("no live owner {id}"))
			})
			.collect();
		owner::key_intersection(&owners)
	}

	/// The key set offered for batch editing `selection`: the compatible
	/// intersection, restricted to keys enabled on every owner.
	pub fn batch_editable_keys(&self, selection: &[OwnerId]) -> Vec<String> {
		let owners: Vec<&dyn PropertyOwner> = selection
			.iter()
			.map(|&id| {
				self.find_owner(id)
					.unwrap_or_else(|| panic!("no live owner {id}"))
			})
			.collect();
		owner::batch_editable_keys(&owners)
	}

	/// Registers a change observer.
	pub fn subscribe(&mut self, observer: &Rc<RefCell<dyn DocumentObserver>>) -> SubscriptionId {
		self.observers.subscribe(observer)
	}

	/// Revokes a subscription.
	pub fn unsubscribe(&mut self, id: SubscriptionId) {
		self.observers.unsubscribe(id)
	}

	pub(crate) fn notify(&mut self, event: &DocumentEvent<'_>) {
		self.observers.notify(event);
	}
}

impl Default for Document {
	fn default() -> Self {
		Self::new()
	}
}

/// Names one of the document's structures, so a command can find its
/// structure again on every redo/undo without holding a borrow.
pub trait StructureAccess: Copy + std::fmt::Debug + 'static {
	/// The structure type this access resolves to.
	type Structure: Structure;

	/// Resolves the structure within a document.
	fn structure<'a>(&self, doc: &'a Document) -> &'a Self::Structure;

	/// Resolves the structure mutably within a document.
	fn structure_mut<'a>(&self, doc: &'a mut Document) -> &'a mut Self::Structure;
}

/// The document's object tree.
#[derive(Debug, Clone, Copy)]
pub struct ObjectTreeAccess;

impl StructureAccess for ObjectTreeAccess {
	type Structure = Tree<Object>;

	fn structure<'a>(&self, doc: &'a Document) -> &'a Self::Structure {
		&doc.objects
	}

	fn structure_mut<'a>(&self, doc: &'a mut Document) -> &'a mut Self::Structure {
		&mut doc.objects
	}
}

/// The document's style list.
#[derive(Debug, Clone, Copy)]
pub struct StyleListAccess;

impl StructureAccess for StyleListAccess {
	type Structure = List<Style>;

	fn structure<'a>(&self, doc: &'a Document) -> &'a Self::Structure {
		&doc.styles
	}

	fn structure_mut<'a>(&self, doc: &'a mut Document) -> &'a mut Self::Structure {
		&mut doc.styles
	}
}

/// The tag list of one object.
///
/// # Panics
/// Resolution panics if the object is not live; commands over a tag list
/// must not outlive their object.
#[derive(Debug, Clone, Copy)]
pub struct TagListAccess {
	/// The object whose tags are addressed.
	pub object: OwnerId,
}

impl StructureAccess for TagListAccess {
	type Structure = List<Tag>;

	fn structure<'a>(&self, doc: &'a Document) -> &'a Self::Structure {
		doc.objects
			.item(self.object)
			.unwrap_or_else(|| panic!("no live object {}", self.object))
			.tags()
	}

	fn structure_mut<'a>(&self, doc: &'a mut Document) -> &'a mut Self::Structure {
		doc.objects
			.item_mut(self.object)
			.unwrap_or_else(|| panic!("no live object {}", self.object))
			.tags_mut()
	}
}
