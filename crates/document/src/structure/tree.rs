//! Hierarchical ownership structure for scene objects.

use kurven_primitives::OwnerId;
use rustc_hash::FxHashMap;

use super::{IdAllocator, MoveContext, OwningContext, Structure, StructureItem};

#[derive(Debug, Clone)]
struct TreeNode<T> {
	item: T,
	parent: Option<OwnerId>,
	children: Vec<OwnerId>,
}

/// A detached subtree: the owning handle for an element (and all of its
/// descendants) that currently lives outside a [`Tree`].
///
/// Ids inside the subtree are preserved, so re-inserting it (undo) restores
/// the exact prior graph and heals references that point into it.
#[derive(Debug)]
pub struct Subtree<T> {
	root: OwnerId,
	nodes: Vec<(OwnerId, TreeNode<T>)>,
}

impl<T: StructureItem> Subtree<T> {
	/// Wraps a single new element as a subtree of one node.
	pub fn leaf(item: T) -> Self {
		let id = item.id();
		Self {
			root: id,
			nodes: vec![(
				id,
				TreeNode { item, parent: None, children: Vec::new() },
			)],
		}
	}

	/// Id of the subtree root.
	pub fn root_id(&self) -> OwnerId {
		self.root
	}

	/// The root item.
	pub fn item(&self) -> &T {
		let (_, node) = self
			.nodes
			.iter()
			.find(|(id, _)| *id == self.root)
			.expect("subtree contains its root");
		&node.item
	}

	/// Number of elements in the subtree.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// True if the subtree holds no nodes. Cannot happen for subtrees
	/// produced by [`Tree::remove`], which always include the subject.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}
}

/// Arena-backed tree of owned items. Each element has at most one parent
/// and an ordered list of children; the root is fixed at construction and
/// can never be removed or moved.
#[derive(Debug, Clone)]
pub struct Tree<T> {
	nodes: FxHashMap<OwnerId, TreeNode<T>>,
	root: OwnerId,
}

impl<T: StructureItem> Tree<T> {
	/// Creates a tree owning only `root_item`.
	pub fn new(root_item: T) -> Self {
		let root = root_item.id();
		let mut nodes = FxHashMap::default();
		nodes.insert(
			root,
			TreeNode { item: root_item, parent: None, children: Vec::new() },
		);
		Self { nodes, root }
	}

	/// Id of the root element.
	pub fn root(&self) -> OwnerId {
		self.root
	}

	/// The root item.
	pub fn root_item(&self) -> &T {
		&self.nodes[&self.root].item
	}

	/// Ordered children of an element.
	pub fn children(&self, id: OwnerId) -> &[OwnerId] {
		&self.node(id).children
	}

	/// Parent of an element; `None` for the root.
	pub fn parent(&self, id: OwnerId) -> Option<OwnerId> {
		self.node(id).parent
	}

	/// True iff `ancestor` is `descendant` or a proper ancestor of it.
	pub fn is_ancestor_of(&self, ancestor: OwnerId, descendant: OwnerId) -> bool {
		let mut cursor = Some(descendant);
		while let Some(id) = cursor {
			if id == ancestor {
				return true;
			}
			cursor = self.node(id).parent;
		}
		false
	}

	/// Iterates over all owned items in arbitrary order.
	pub fn iter_items(&self) -> impl Iterator<Item = &T> {
		self.nodes.values().map(|node| &node.item)
	}

	/// Iterates mutably over all owned items in arbitrary order.
	pub fn iter_items_mut(&mut self) -> impl Iterator<Item = &mut T> {
		self.nodes.values_mut().map(|node| &mut node.item)
	}

	/// Appends a new item as the last child of `parent`, without going
	/// through a context. Used while materializing a deserialized document.
	pub(crate) fn attach(&mut self, parent: OwnerId, item: T) {
		let id = item.id();
		let previous = self.nodes.insert(
			id,
			TreeNode { item, parent: Some(parent), children: Vec::new() },
		);
		assert!(previous.is_none(), "element {id} already owned by the tree");
		self.node_mut(parent).children.push(id);
	}

	fn node(&self, id: OwnerId) -> &TreeNode<T> {
		self.nodes
			.get(&id)
			.unwrap_or_else(|| panic!("tree does not own element {id}"))
	}

	fn node_mut(&mut self, id: OwnerId) -> &mut TreeNode<T> {
		self.nodes
			.get_mut(&id)
			.unwrap_or_else(|| panic!("tree does not own element {id}"))
	}

	fn preorder_into(&self, id: OwnerId, out: &mut Vec<OwnerId>) {
		out.push(id);
		for child in self.node(id).children.clone() {
			self.preorder_into(child, out);
		}
	}

	fn splice(&mut self, parent: OwnerId, predecessor: Option<OwnerId>, subject: OwnerId) {
		let children = &mut self.node_mut(parent).children;
		let index = match predecessor {
			None => 0,
			Some(p) => {
				let at = children
					.iter()
					.position(|&c| c == p)
					.unwrap_or_else(|| panic!("predecessor {p} is not a child of {parent}"));
				at + 1
			}
		};
		children.insert(index, subject);
	}
}

impl<T: StructureItem> Structure for Tree<T> {
	type Item = T;
	type Location = OwnerId;
	type Detached = Subtree<T>;

	fn detached_id(detached: &Self::Detached) -> OwnerId {
		detached.root
	}

	fn insert(&mut self, ctx: OwningContext<Self>) {
		assert!(self.is_sane_insert(&ctx), "insane insert context: {ctx:?}");
		let OwningContext { subject, location, predecessor } = ctx;
		let root = subject.root;
		for (id, node) in subject.nodes {
			let previous = self.nodes.insert(id, node);
			assert!(previous.is_none(), "element {id} already owned by the tree");
		}
		self.node_mut(root).parent = Some(location);
		self.splice(location, predecessor, root);
	}

	fn remove(&mut self, id: OwnerId) -> Self::Detached {
		assert!(id != self.root, "the root element cannot be removed");
		let parent = self
			.node(id)
			.parent
			.expect("non-root element has a parent");
		self.node_mut(parent).children.retain(|&c| c != id);

		let mut ids = Vec::new();
		self.preorder_into(id, &mut ids);
		let nodes = ids
			.into_iter()
			.map(|node_id| {
				let mut node = self
					.nodes
					.remove(&node_id)
					.expect("preorder only yields owned ids");
				if node_id == id {
					node.parent = None;
				}
				(node_id, node)
			})
			.collect();
		Subtree { root: id, nodes }
	}

	fn move_to(&mut self, ctx: MoveContext<Self>) {
		assert!(self.is_sane_move(&ctx), "insane move context: {ctx:?}");
		assert!(
			!self.is_ancestor_of(ctx.subject, ctx.location),
			"cannot adopt {} into its own descendant {}",
			ctx.subject,
			ctx.location
		);
		let old_parent = self
			.node(ctx.subject)
			.parent
			.expect("non-root element has a parent");
		self.node_mut(old_parent).children.retain(|&c| c != ctx.subject);
		self.node_mut(ctx.subject).parent = Some(ctx.location);
		self.splice(ctx.location, ctx.predecessor, ctx.subject);
	}

	fn contains(&self, id: OwnerId) -> bool {
		self.nodes.contains_key(&id)
	}

	fn location_of(&self, id: OwnerId) -> Self::Location {
		self.node(id)
			.parent
			.expect("the root element has no location")
	}

	fn predecessor(&self, id: OwnerId) -> Option<OwnerId> {
		let parent = self.node(id).parent?;
		let siblings = &self.node(parent).children;
		let index = siblings
			.iter()
			.position(|&c| c == id)
			.expect("element is listed among its parent's children");
		if index == 0 { None } else { Some(siblings[index - 1]) }
	}

	fn position(&self, id: OwnerId) -> usize {
		match self.node(id).parent {
			None => 0,
			Some(parent) => self
				.node(parent)
				.children
				.iter()
				.position(|&c| c == id)
				.expect("element is listed among its parent's children"),
		}
	}

	fn ids(&self) -> Vec<OwnerId> {
		let mut out = Vec::with_capacity(self.nodes.len());
		self.preorder_into(self.root, &mut out);
		out
	}

	fn is_ancestor(&self, ancestor: OwnerId, descendant: OwnerId) -> bool {
		self.is_ancestor_of(ancestor, descendant)
	}

	fn item(&self, id: OwnerId) -> Option<&Self::Item> {
		self.nodes.get(&id).map(|node| &node.item)
	}

	fn item_mut(&mut self, id: OwnerId) -> Option<&mut Self::Item> {
		self.nodes.get_mut(&id).map(|node| &mut node.item)
	}

	fn duplicate(&self, id: OwnerId, ids: &IdAllocator) -> Self::Detached {
		let mut order = Vec::new();
		self.preorder_into(id, &mut order);

		let mut remap = FxHashMap::default();
		let mut cloned = Vec::with_capacity(order.len());
		for old_id in &order {
			let node = self.node(*old_id);
			let mut item = node.item.clone();
			item.reassign_ids(ids);
			remap.insert(*old_id, item.id());
			cloned.push((*old_id, item, node.children.clone()));
		}

		let nodes = cloned
			.into_iter()
			.map(|(old_id, item, children)| {
				let parent = if old_id == id {
					None
				} else {
					self.node(old_id).parent.map(|p| remap[&p])
				};
				let children = children.into_iter().map(|c| remap[&c]).collect();
				(remap[&old_id], TreeNode { item, parent, children })
			})
			.collect();
		Subtree { root: remap[&id], nodes }
	}

	fn is_sane_insert(&self, ctx: &OwningContext<Self>) -> bool {
		!self.contains(ctx.subject_id())
			&& self.contains(ctx.location)
			&& ctx
				.predecessor
				.is_none_or(|p| self.children(ctx.location).contains(&p))
	}

	fn is_sane_move(&self, ctx: &MoveContext<Self>) -> bool {
		self.contains(ctx.subject)
			&& ctx.subject != self.root
			&& self.contains(ctx.location)
			&& Some(ctx.subject) != ctx.predecessor
			&& ctx
				.predecessor
				.is_none_or(|p| self.children(ctx.location).contains(&p))
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use crate::object::{Object, ObjectKind};
	use crate::owner::PropertyOwner;

	use super::*;

	fn empty(ids: &IdAllocator, name: &str) -> Object {
		Object::new(ids.allocate(), ObjectKind::Empty, name)
	}

	fn insert_leaf(tree: &mut Tree<Object>, item: Object, predecessor: Option<OwnerId>) -> OwnerId {
		let root = tree.root();
		let id = item.id();
		tree.insert(OwningContext {
			subject: Subtree::leaf(item),
			location: root,
			predecessor,
		});
		id
	}

	#[test]
	fn test_insert_respects_predecessor() {
		let ids = IdAllocator::new();
		let mut tree = Tree::new(empty(&ids, "root"));
		let a = insert_leaf(&mut tree, empty(&ids, "a"), None);
		let b = insert_leaf(&mut tree, empty(&ids, "b"), Some(a));
		let c = insert_leaf(&mut tree, empty(&ids, "c"), Some(a));
		assert_eq!(tree.children(tree.root()), &[a, c, b]);
		assert_eq!(tree.predecessor(c), Some(a));
		assert_eq!(tree.position(b), 2);
	}

	#[test]
	fn test_remove_detaches_whole_subtree_preserving_ids() {
		let ids = IdAllocator::new();
		let mut tree = Tree::new(empty(&ids, "root"));
		let parent = insert_leaf(&mut tree, empty(&ids, "parent"), None);
		let child = empty(&ids, "child");
		let child_id = child.id();
		tree.insert(OwningContext {
			subject: Subtree::leaf(child),
			location: parent,
			predecessor: None,
		});

		let detached = tree.remove(parent);
		assert_eq!(detached.len(), 2);
		assert_eq!(detached.root_id(), parent);
		assert!(!tree.contains(parent));
		assert!(!tree.contains(child_id));

		tree.insert(OwningContext {
			subject: detached,
			location: tree.root(),
			predecessor: None,
		});
		assert!(tree.contains(child_id));
		assert_eq!(tree.parent(child_id), Some(parent));
	}

	#[test]
	fn test_duplicate_remaps_every_id() {
		let ids = IdAllocator::new();
		let mut tree = Tree::new(empty(&ids, "root"));
		let parent = insert_leaf(&mut tree, empty(&ids, "parent"), None);
		tree.insert(OwningContext {
			subject: Subtree::leaf(empty(&ids, "child")),
			location: parent,
			predecessor: None,
		});

		let copy = tree.duplicate(parent, &ids);
		assert_eq!(copy.len(), 2);
		assert_ne!(copy.root_id(), parent);
		let original: Vec<OwnerId> = tree.ids();
		assert!(!original.contains(&copy.root_id()));
	}

	#[test]
	fn test_move_rejects_adoption_by_descendant() {
		let ids = IdAllocator::new();
		let mut tree = Tree::new(empty(&ids, "root"));
		let parent = insert_leaf(&mut tree, empty(&ids, "parent"), None);
		let child = empty(&ids, "child");
		let child_id = child.id();
		tree.insert(OwningContext {
			subject: Subtree::leaf(child),
			location: parent,
			predecessor: None,
		});

		let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
			tree.move_to(MoveContext {
				subject: parent,
				location: child_id,
				predecessor: None,
			});
		}));
		assert!(result.is_err());
	}
}
