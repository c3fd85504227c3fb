//! Reversible commands over the document.
//!
//! Every mutation of the document is expressed as a command whose
//! `redo`/`undo` pair is an exact inverse: applying both leaves the
//! document observably identical (membership, order, values). Commands are
//! created at user-action time, executed exactly once on submission, and
//! then live in the [`History`] until truncated.
//!
//! [`History`]: crate::history::History

use std::any::Any;

use crate::document::Document;

mod property;
mod structural;

pub use property::{SetPointsCommand, SetPropertiesCommand};
pub use structural::{CopyCommand, CopySource, InsertCommand, MoveCommand, RemoveCommand};

/// A reversible unit of document mutation.
pub trait Command: Any {
	/// Human-readable label, shown in undo menus.
	fn label(&self) -> &str;

	/// Applies the forward action.
	fn redo(&mut self, doc: &mut Document);

	/// Applies the backward action, exactly inverting [`Command::redo`].
	fn undo(&mut self, doc: &mut Document);

	/// True if applying this command would change nothing. No-op commands
	/// are not executed and not recorded.
	fn is_noop(&self, _doc: &Document) -> bool {
		false
	}

	/// Whether this command changes structure membership or order (as
	/// opposed to values only). Drives structure-changed notifications.
	fn alters_structure(&self) -> bool {
		true
	}

	/// Attempts to absorb a newly submitted command into this one, so a
	/// continuous interactive edit collapses into a single undo step.
	/// Returns `true` if `other` was absorbed and must not be pushed.
	fn try_merge(&mut self, _other: &dyn Command) -> bool {
		false
	}

	/// Upcast used by merge implementations to inspect the incoming
	/// command's concrete type.
	fn as_any(&self) -> &dyn Any;
}

/// A group of commands undone and redone as one atomic unit.
///
/// Built by the history between `start_macro` and `end_macro`; the
/// sub-commands have already been executed individually by the time the
/// macro is pushed.
pub struct MacroCommand {
	label: String,
	commands: Vec<Box<dyn Command>>,
}

impl MacroCommand {
	pub(crate) fn new(label: impl Into<String>) -> Self {
		Self { label: label.into(), commands: Vec::new() }
	}

	pub(crate) fn push(&mut self, command: Box<dyn Command>) {
		self.commands.push(command);
	}

	pub(crate) fn last_mut(&mut self) -> Option<&mut Box<dyn Command>> {
		self.commands.last_mut()
	}

	/// Number of grouped commands.
	pub fn len(&self) -> usize {
		self.commands.len()
	}

	/// True if nothing was submitted inside the macro.
	pub fn is_empty(&self) -> bool {
		self.commands.is_empty()
	}
}

impl Command for MacroCommand {
	fn label(&self) -> &str {
		&self.label
	}

	fn redo(&mut self, doc: &mut Document) {
		for command in &mut self.commands {
			command.redo(doc);
		}
	}

	fn undo(&mut self, doc: &mut Document) {
		for command in self.commands.iter_mut().rev() {
			command.undo(doc);
		}
	}

	fn alters_structure(&self) -> bool {
		self.commands.iter().any(|c| c.alters_structure())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}
