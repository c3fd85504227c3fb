//! Structural commands: insert, remove, move, and copy.
//!
//! All four are generic over a [`StructureAccess`], so the same machinery
//! drives the object tree, the style list, and per-object tag lists.

use std::any::Any;

use kurven_primitives::OwnerId;

use crate::document::{Document, StructureAccess};
use crate::structure::{MoveContext, OwningContext, Structure};

use super::Command;

/// One element's place in a structural command.
///
/// The placement owns the element exactly while `detached` is `Some`; the
/// element is then outside the structure and can only be returned to it by
/// moving the detached value back, so "owned by both" and "owned by
/// neither" are unrepresentable.
struct Placement<S: Structure> {
	id: OwnerId,
	detached: Option<S::Detached>,
	location: Option<S::Location>,
	predecessor: Option<OwnerId>,
}

impl<S: Structure> Placement<S> {
	fn pending(ctx: OwningContext<S>, predecessor: Option<OwnerId>) -> Self {
		Self {
			id: ctx.subject_id(),
			detached: Some(ctx.subject),
			location: Some(ctx.location),
			predecessor,
		}
	}

	fn attached(id: OwnerId) -> Self {
		Self { id, detached: None, location: None, predecessor: None }
	}

	/// Hands the element to the structure at the recorded position.
	fn attach(&mut self, structure: &mut S) {
		let subject = self
			.detached
			.take()
			.expect("placement owns the detached element");
		structure.insert(OwningContext {
			subject,
			location: self.location.expect("placement has a target location"),
			predecessor: self.predecessor,
		});
	}

	/// Takes the element back from the structure, capturing its position
	/// at the moment of detachment.
	///
	/// Capturing here rather than at construction is what makes reverse-
	/// order undo of batched removals work: a predecessor that is itself
	/// removed later in the batch is recorded as already gone, so every
	/// recorded predecessor is live again when its element is re-inserted.
	fn detach(&mut self, structure: &mut S) {
		assert!(
			self.detached.is_none(),
			"placement already owns the detached element"
		);
		self.location = Some(structure.location_of(self.id));
		self.predecessor = structure.predecessor(self.id);
		self.detached = Some(structure.remove(self.id));
	}
}

/// Chains each context's predecessor to the previous context's subject, so
/// a batch lands in the order it was given regardless of intermediate
/// state.
fn chain_predecessors<S: Structure>(contexts: Vec<OwningContext<S>>) -> Vec<Placement<S>> {
	let mut placements = Vec::with_capacity(contexts.len());
	let mut previous: Option<OwnerId> = None;
	for (index, ctx) in contexts.into_iter().enumerate() {
		let predecessor = if index == 0 { ctx.predecessor } else { previous };
		let id = ctx.subject_id();
		placements.push(Placement::pending(ctx, predecessor));
		previous = Some(id);
	}
	placements
}

/// Inserts new elements into a structure.
pub struct InsertCommand<A: StructureAccess> {
	access: A,
	placements: Vec<Placement<A::Structure>>,
}

impl<A: StructureAccess> InsertCommand<A> {
	/// Creates an insertion of `contexts`, in order. Each context's
	/// predecessor after the first is re-derived from the previous
	/// context's subject.
	pub fn new(access: A, contexts: Vec<OwningContext<A::Structure>>) -> Self {
		Self { access, placements: chain_predecessors(contexts) }
	}

	/// Ids of the elements this command inserts.
	pub fn inserted_ids(&self) -> Vec<OwnerId> {
		self.placements.iter().map(|p| p.id).collect()
	}
}

impl<A: StructureAccess> Command for InsertCommand<A> {
	fn label(&self) -> &str {
		"insert"
	}

	fn redo(&mut self, doc: &mut Document) {
		let structure = self.access.structure_mut(doc);
		for placement in &mut self.placements {
			placement.attach(structure);
		}
	}

	fn undo(&mut self, doc: &mut Document) {
		let structure = self.access.structure_mut(doc);
		for placement in self.placements.iter_mut().rev() {
			placement.detach(structure);
		}
	}

	fn is_noop(&self, _doc: &Document) -> bool {
		self.placements.is_empty()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Removes elements from a structure, returning them on undo.
pub struct RemoveCommand<A: StructureAccess> {
	access: A,
	placements: Vec<Placement<A::Structure>>,
}

impl<A: StructureAccess> RemoveCommand<A> {
	/// Creates a removal of `subjects`.
	///
	/// A subject whose ancestor is also in the set is dropped: removing the
	/// ancestor already detaches its whole subtree.
	pub fn new(doc: &Document, access: A, subjects: &[OwnerId]) -> Self {
		let structure = access.structure(doc);
		let placements = subjects
			.iter()
			.copied()
			.filter(|&subject| {
				!subjects
					.iter()
					.any(|&other| other != subject && structure.is_ancestor(other, subject))
			})
			.map(Placement::attached)
			.collect();
		Self { access, placements }
	}
}

impl<A: StructureAccess> Command for RemoveCommand<A> {
	fn label(&self) -> &str {
		"remove"
	}

	fn redo(&mut self, doc: &mut Document) {
		let structure = self.access.structure_mut(doc);
		for placement in &mut self.placements {
			placement.detach(structure);
		}
	}

	fn undo(&mut self, doc: &mut Document) {
		let structure = self.access.structure_mut(doc);
		for placement in self.placements.iter_mut().rev() {
			placement.attach(structure);
		}
	}

	fn is_noop(&self, _doc: &Document) -> bool {
		self.placements.is_empty()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Repositions elements a structure already owns.
pub struct MoveCommand<A: StructureAccess> {
	access: A,
	old: Vec<MoveContext<A::Structure>>,
	new: Vec<MoveContext<A::Structure>>,
}

impl<A: StructureAccess> MoveCommand<A> {
	/// Creates a move described by `contexts`. The subjects' current
	/// positions are captured to detect no-op moves; undo positions are
	/// re-captured on every forward pass.
	pub fn new(doc: &Document, access: A, contexts: Vec<MoveContext<A::Structure>>) -> Self {
		let structure = access.structure(doc);
		let old = contexts
			.iter()
			.map(|ctx| MoveContext {
				subject: ctx.subject,
				location: structure.location_of(ctx.subject),
				predecessor: structure.predecessor(ctx.subject),
			})
			.collect();
		Self { access, old, new: contexts }
	}
}

impl<A: StructureAccess> Command for MoveCommand<A> {
	fn label(&self) -> &str {
		"reparent"
	}

	fn redo(&mut self, doc: &mut Document) {
		let structure = self.access.structure_mut(doc);
		// Re-capture each subject's position just before it moves. An
		// earlier context in the batch may have displaced a later subject's
		// predecessor; re-inserting from these snapshots in reverse order
		// always finds the recorded predecessor live again.
		for (ctx, old) in self.new.iter().zip(&mut self.old) {
			*old = MoveContext {
				subject: ctx.subject,
				location: structure.location_of(ctx.subject),
				predecessor: structure.predecessor(ctx.subject),
			};
			structure.move_to(*ctx);
		}
	}

	fn undo(&mut self, doc: &mut Document) {
		let structure = self.access.structure_mut(doc);
		for ctx in self.old.iter().rev() {
			structure.move_to(*ctx);
		}
	}

	fn is_noop(&self, _doc: &Document) -> bool {
		self.old == self.new
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

/// Where a copy of `source` should land.
pub struct CopySource<S: Structure + ?Sized> {
	/// The element to deep-copy.
	pub source: OwnerId,
	/// Target location for the copy.
	pub location: S::Location,
	/// Sibling after which to place the copy; `None` places it first.
	pub predecessor: Option<OwnerId>,
}

/// Deep-copies elements, giving every copy (and nested entity) fresh ids.
pub struct CopyCommand<A: StructureAccess> {
	access: A,
	placements: Vec<Placement<A::Structure>>,
}

impl<A: StructureAccess> CopyCommand<A> {
	/// Creates copies of the given sources. Copies are minted immediately;
	/// the command owns them until its first execution.
	pub fn new(doc: &Document, access: A, sources: Vec<CopySource<A::Structure>>) -> Self {
		let structure = access.structure(doc);
		let contexts = sources
			.into_iter()
			.map(|src| OwningContext {
				subject: structure.duplicate(src.source, doc.id_allocator()),
				location: src.location,
				predecessor: src.predecessor,
			})
			.collect();
		Self { access, placements: chain_predecessors(contexts) }
	}

	/// Ids of the minted copies.
	pub fn copied_ids(&self) -> Vec<OwnerId> {
		self.placements.iter().map(|p| p.id).collect()
	}
}

impl<A: StructureAccess> Command for CopyCommand<A> {
	fn label(&self) -> &str {
		"copy"
	}

	fn redo(&mut self, doc: &mut Document) {
		let structure = self.access.structure_mut(doc);
		for placement in &mut self.placements {
			placement.attach(structure);
		}
	}

	fn undo(&mut self, doc: &mut Document) {
		let structure = self.access.structure_mut(doc);
		for placement in self.placements.iter_mut().rev() {
			placement.detach(structure);
		}
	}

	fn is_noop(&self, _doc: &Document) -> bool {
		self.placements.is_empty()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}
