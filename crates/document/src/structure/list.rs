//! Flat ordered ownership structure for tags and styles.

use kurven_primitives::OwnerId;
use rustc_hash::FxHashMap;

use super::{IdAllocator, MoveContext, OwningContext, Structure, StructureItem};

/// The owning handle for an element currently outside a [`List`].
#[derive(Debug)]
pub struct DetachedItem<T> {
	id: OwnerId,
	item: T,
}

impl<T: StructureItem> DetachedItem<T> {
	/// Wraps a new element for insertion.
	pub fn new(item: T) -> Self {
		Self { id: item.id(), item }
	}

	/// Id of the detached element.
	pub fn id(&self) -> OwnerId {
		self.id
	}

	/// The detached element.
	pub fn item(&self) -> &T {
		&self.item
	}

	/// Unwraps the element.
	pub fn into_item(self) -> T {
		self.item
	}
}

/// Flat, ordered, owning sequence of items, addressed by stable id.
#[derive(Debug, Clone)]
pub struct List<T> {
	items: FxHashMap<OwnerId, T>,
	order: Vec<OwnerId>,
}

impl<T: StructureItem> List<T> {
	/// Creates an empty list.
	pub fn new() -> Self {
		Self { items: FxHashMap::default(), order: Vec::new() }
	}

	/// Number of owned items.
	pub fn len(&self) -> usize {
		self.order.len()
	}

	/// True if the list owns nothing.
	pub fn is_empty(&self) -> bool {
		self.order.is_empty()
	}

	/// Iterates over owned items in list order.
	pub fn iter(&self) -> impl Iterator<Item = &T> {
		self.order.iter().map(|id| &self.items[id])
	}

	/// Iterates mutably over owned items in list order.
	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
		self.items.values_mut()
	}

	/// Appends a new item at the back, without going through a context.
	/// Used while materializing a deserialized document.
	pub(crate) fn append(&mut self, item: T) {
		let id = item.id();
		let previous = self.items.insert(id, item);
		assert!(previous.is_none(), "element {id} already owned by the list");
		self.order.push(id);
	}

	/// Replaces every owned id (and nested ids) with freshly allocated
	/// ones. Used when the list itself is part of a copied element.
	pub fn reassign_ids(&mut self, ids: &IdAllocator) {
		let order = std::mem::take(&mut self.order);
		let mut items = std::mem::take(&mut self.items);
		for old_id in order {
			let mut item = items.remove(&old_id).expect("order only lists owned ids");
			item.reassign_ids(ids);
			let new_id = item.id();
			self.items.insert(new_id, item);
			self.order.push(new_id);
		}
	}
}

impl<T: StructureItem> Default for List<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: StructureItem> Structure for List<T> {
	type Item = T;
	type Location = ();
	type Detached = DetachedItem<T>;

	fn detached_id(detached: &Self::Detached) -> OwnerId {
		detached.id
	}

	fn insert(&mut self, ctx: OwningContext<Self>) {
		assert!(self.is_sane_insert(&ctx), "insane insert context: {ctx:?}");
		let OwningContext { subject, predecessor, .. } = ctx;
		let index = match predecessor {
			None => 0,
			Some(p) => {
				let at = self
					.order
					.iter()
					.position(|&id| id == p)
					.unwrap_or_else(|| panic!("predecessor {p} is not in the list"));
				at + 1
			}
		};
		self.order.insert(index, subject.id);
		self.items.insert(subject.id, subject.item);
	}

	fn remove(&mut self, id: OwnerId) -> Self::Detached {
		let item = self
			.items
			.remove(&id)
			.unwrap_or_else(|| panic!("list does not own element {id}"));
		self.order.retain(|&o| o != id);
		DetachedItem { id, item }
	}

	fn move_to(&mut self, ctx: MoveContext<Self>) {
		assert!(self.is_sane_move(&ctx), "insane move context: {ctx:?}");
		self.order.retain(|&o| o != ctx.subject);
		let index = match ctx.predecessor {
			None => 0,
			Some(p) => {
				let at = self
					.order
					.iter()
					.position(|&id| id == p)
					.expect("sane move context has an owned predecessor");
				at + 1
			}
		};
		self.order.insert(index, ctx.subject);
	}

	fn contains(&self, id: OwnerId) -> bool {
		self.items.contains_key(&id)
	}

	fn location_of(&self, _id: OwnerId) -> Self::Location {}

	fn predecessor(&self, id: OwnerId) -> Option<OwnerId> {
		let index = self
			.order
			.iter()
			.position(|&o| o == id)
			.unwrap_or_else(|| panic!("list does not own element {id}"));
		if index == 0 { None } else { Some(self.order[index - 1]) }
	}

	fn position(&self, id: OwnerId) -> usize {
		self.order
			.iter()
			.position(|&o| o == id)
			.unwrap_or_else(|| panic!("list does not own element {id}"))
	}

	fn ids(&self) -> Vec<OwnerId> {
		self.order.clone()
	}

	fn is_ancestor(&self, ancestor: OwnerId, descendant: OwnerId) -> bool {
		ancestor == descendant
	}

	fn item(&self, id: OwnerId) -> Option<&Self::Item> {
		self.items.get(&id)
	}

	fn item_mut(&mut self, id: OwnerId) -> Option<&mut Self::Item> {
		self.items.get_mut(&id)
	}

	fn duplicate(&self, id: OwnerId, ids: &IdAllocator) -> Self::Detached {
		let mut item = self.items[&id].clone();
		item.reassign_ids(ids);
		DetachedItem { id: item.id(), item }
	}

	fn is_sane_insert(&self, ctx: &OwningContext<Self>) -> bool {
		!self.contains(ctx.subject_id()) && ctx.predecessor.is_none_or(|p| self.contains(p))
	}

	fn is_sane_move(&self, ctx: &MoveContext<Self>) -> bool {
		self.contains(ctx.subject)
			&& Some(ctx.subject) != ctx.predecessor
			&& ctx.predecessor.is_none_or(|p| self.contains(p))
	}
}
