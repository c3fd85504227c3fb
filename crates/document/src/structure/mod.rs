//! Generic ownership containers over property owners.
//!
//! Two shapes exist: [`Tree`] (hierarchical, used for scene objects) and
//! [`List`] (flat ordered, used for tags and styles). Both are driven by
//! position-describing contexts and hand ownership of removed elements back
//! to the caller as a detached value. An element is owned by exactly one of
//! {its structure, one detached handle} at any time; the ownership states
//! are mutually exclusive by construction, not by runtime flags.
//!
//! [`Tree`]: tree::Tree
//! [`List`]: list::List

use std::cell::Cell;
use std::fmt;

use kurven_primitives::OwnerId;

use crate::owner::PropertyOwner;

pub mod list;
pub mod tree;

pub use list::{DetachedItem, List};
pub use tree::{Subtree, Tree};

/// Monotonic id allocator. Ids are never reused within a document, so a
/// freed id can never silently alias a new entity.
///
/// Allocation takes `&self` (a [`Cell`] counter); copy operations can mint
/// fresh ids while the source structure is borrowed.
#[derive(Debug)]
pub struct IdAllocator {
	next: Cell<u64>,
}

impl IdAllocator {
	/// Creates an allocator starting at id 1 (0 is the null sentinel).
	pub fn new() -> Self {
		Self { next: Cell::new(1) }
	}

	/// Allocates the next id.
	pub fn allocate(&self) -> OwnerId {
		let raw = self.next.get();
		self.next.set(raw + 1);
		OwnerId::from_raw(raw).expect("id allocator starts at 1")
	}

	/// Ensures future allocations are strictly greater than `raw`.
	///
	/// Called while adopting ids from a deserialized document.
	pub fn advance_past(&self, raw: u64) {
		if raw >= self.next.get() {
			self.next.set(raw + 1);
		}
	}
}

impl Default for IdAllocator {
	fn default() -> Self {
		Self::new()
	}
}

/// An item that can live inside a [`Structure`].
///
/// `reassign_ids` gives the item (and any nested structures, such as an
/// object's tag list) fresh ids; copy operations use it so that a duplicate
/// never shares ids with its source.
pub trait StructureItem: PropertyOwner + Clone {
	/// Replaces this item's id (and all nested ids) with freshly allocated
	/// ones.
	fn reassign_ids(&mut self, ids: &IdAllocator);
}

/// Describes a pending insertion: the detached subject plus where it goes.
///
/// The context *owns* the subject until the structure adopts it.
pub struct OwningContext<S: Structure + ?Sized> {
	/// The detached element (for trees, the whole detached subtree).
	pub subject: S::Detached,
	/// Target location: the parent id for trees, `()` for lists.
	pub location: S::Location,
	/// Sibling after which to insert; `None` inserts at the front.
	pub predecessor: Option<OwnerId>,
}

impl<S: Structure + ?Sized> OwningContext<S> {
	/// Id of the detached subject.
	pub fn subject_id(&self) -> OwnerId {
		S::detached_id(&self.subject)
	}
}

impl<S: Structure + ?Sized> fmt::Debug for OwningContext<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OwningContext")
			.field("subject", &self.subject_id())
			.field("location", &self.location)
			.field("predecessor", &self.predecessor)
			.finish()
	}
}

/// Describes a move of an element the structure already owns.
pub struct MoveContext<S: Structure + ?Sized> {
	/// The element to reposition.
	pub subject: OwnerId,
	/// Target location: the new parent id for trees, `()` for lists.
	pub location: S::Location,
	/// Sibling after which to place the subject; `None` moves to the front.
	pub predecessor: Option<OwnerId>,
}

impl<S: Structure + ?Sized> Clone for MoveContext<S> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<S: Structure + ?Sized> Copy for MoveContext<S> {}

impl<S: Structure + ?Sized> PartialEq for MoveContext<S> {
	fn eq(&self, other: &Self) -> bool {
		self.subject == other.subject
			&& self.location == other.location
			&& self.predecessor == other.predecessor
	}
}

impl<S: Structure + ?Sized> fmt::Debug for MoveContext<S> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MoveContext")
			.field("subject", &self.subject)
			.field("location", &self.location)
			.field("predecessor", &self.predecessor)
			.finish()
	}
}

/// Common capability set of [`Tree`] and [`List`].
///
/// Commands are generic over this trait, so the same insert/remove/move
/// machinery drives object trees, style lists, and per-object tag lists.
pub trait Structure {
	/// The owned element type.
	type Item: StructureItem;
	/// Position qualifier: parent id for trees, `()` for lists.
	type Location: Copy + PartialEq + fmt::Debug;
	/// Owning handle for an element outside the structure.
	type Detached;

	/// Id of a detached element.
	fn detached_id(detached: &Self::Detached) -> OwnerId;

	/// Adopts a detached element at the position the context describes.
	///
	/// # Panics
	/// Panics if the context is not sane (see [`Structure::is_sane_insert`]).
	fn insert(&mut self, ctx: OwningContext<Self>);

	/// Detaches an element (for trees, its whole subtree) and returns
	/// ownership to the caller. Ids are preserved.
	///
	/// # Panics
	/// Panics if the element is not owned by this structure.
	fn remove(&mut self, id: OwnerId) -> Self::Detached;

	/// Repositions an already-owned element.
	///
	/// # Panics
	/// Panics if the context is not sane (see [`Structure::is_sane_move`]).
	fn move_to(&mut self, ctx: MoveContext<Self>);

	/// Whether the structure currently owns `id`.
	fn contains(&self, id: OwnerId) -> bool;

	/// Current location of an owned element.
	fn location_of(&self, id: OwnerId) -> Self::Location;

	/// The sibling preceding `id`, or `None` if it is first.
	fn predecessor(&self, id: OwnerId) -> Option<OwnerId>;

	/// Index of `id` among its siblings.
	fn position(&self, id: OwnerId) -> usize;

	/// All owned ids, in structure order.
	fn ids(&self) -> Vec<OwnerId>;

	/// Whether `ancestor` is `descendant` or contains it. Lists have no
	/// hierarchy, so this degrades to id equality there.
	fn is_ancestor(&self, ancestor: OwnerId, descendant: OwnerId) -> bool;

	/// Shared access to an owned item.
	fn item(&self, id: OwnerId) -> Option<&Self::Item>;

	/// Mutable access to an owned item.
	fn item_mut(&mut self, id: OwnerId) -> Option<&mut Self::Item>;

	/// Deep-copies an owned element into a detached handle with fresh ids.
	fn duplicate(&self, id: OwnerId, ids: &IdAllocator) -> Self::Detached;

	/// Internal consistency of a pending insertion: the subject must not
	/// already be owned and the predecessor (if any) must currently sit at
	/// the target location.
	fn is_sane_insert(&self, ctx: &OwningContext<Self>) -> bool;

	/// Internal consistency of a pending move: the subject must be owned,
	/// distinct from the predecessor, and the predecessor (if any) must sit
	/// at the target location.
	fn is_sane_move(&self, ctx: &MoveContext<Self>) -> bool;
}
