//! Change notification with weak subscriptions.
//!
//! Observers are held as weak references: dropping the observing side
//! revokes the subscription automatically, and dead entries are pruned at
//! notification time. A [`SubscriptionId`] allows explicit revocation from
//! the document side.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use kurven_primitives::OwnerId;
use rustc_hash::FxHashSet;

/// Owners already visited during one synchronous propagation pass.
///
/// Passed along with property-change notifications; a change reaching an
/// owner that is already in the trace is not re-announced, which cuts
/// re-entrant notification cycles between mutually dependent properties.
pub type TraceSet = FxHashSet<OwnerId>;

/// A change in the document, delivered synchronously to observers.
#[derive(Debug)]
pub enum DocumentEvent<'a> {
	/// A property's value changed.
	PropertyChanged {
		/// Owner of the changed property.
		owner: OwnerId,
		/// Key of the changed property.
		key: &'a str,
		/// Owners visited so far in this propagation pass.
		trace: &'a TraceSet,
	},
	/// A path object's point geometry changed.
	PointsChanged {
		/// The path whose points changed.
		object: OwnerId,
	},
	/// Structure membership or order changed (insert, remove, move, copy).
	/// Inside a macro this is coalesced into one event at macro close.
	StructureChanged,
	/// The selection set changed.
	SelectionChanged {
		/// The new selection, in ascending id order.
		selection: &'a [OwnerId],
	},
}

/// Receives document change events.
pub trait DocumentObserver {
	/// Called synchronously for every event.
	fn on_event(&mut self, event: &DocumentEvent<'_>);
}

/// Handle identifying one subscription, for explicit revocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

/// Registry of weakly-held observers.
#[derive(Default)]
pub struct Observers {
	subscriptions: Vec<(SubscriptionId, Weak<RefCell<dyn DocumentObserver>>)>,
	next: u64,
}

impl Observers {
	/// Registers an observer, keeping only a weak reference to it.
	pub fn subscribe(&mut self, observer: &Rc<RefCell<dyn DocumentObserver>>) -> SubscriptionId {
		let id = SubscriptionId(self.next);
		self.next += 1;
		self.subscriptions.push((id, Rc::downgrade(observer)));
		id
	}

	/// Revokes a subscription. Revoking an already-dead or unknown id is a
	/// no-op.
	pub fn unsubscribe(&mut self, id: SubscriptionId) {
		self.subscriptions.retain(|(sub_id, _)| *sub_id != id);
	}

	/// Number of live subscriptions.
	pub fn len(&self) -> usize {
		self.subscriptions
			.iter()
			.filter(|(_, weak)| weak.strong_count() > 0)
			.count()
	}

	/// True if no live subscription exists.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Delivers an event to every live observer, pruning dead ones.
	pub fn notify(&mut self, event: &DocumentEvent<'_>) {
		self.subscriptions.retain(|(_, weak)| weak.strong_count() > 0);
		for (_, weak) in &self.subscriptions {
			if let Some(observer) = weak.upgrade() {
				observer.borrow_mut().on_event(event);
			}
		}
	}
}

impl std::fmt::Debug for Observers {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Observers")
			.field("subscriptions", &self.subscriptions.len())
			.finish()
	}
}
