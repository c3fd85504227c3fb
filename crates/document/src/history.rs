//! Linear undo history with macro grouping and merge-on-submit.

use tracing::{debug, trace};

use crate::commands::{Command, MacroCommand};
use crate::document::Document;

/// The undo stack.
///
/// Commands before the cursor are applied; commands at and after it have
/// been undone and are eligible for redo. Submitting while undone commands
/// exist truncates them, which is the only way a command ever leaves the
/// history.
pub struct History {
	stack: Vec<Box<dyn Command>>,
	cursor: usize,
	open_macro: Option<MacroCommand>,
	saved_cursor: Option<usize>,
}

impl History {
	/// Creates an empty history. A fresh history counts as unmodified.
	pub fn new() -> Self {
		Self {
			stack: Vec::new(),
			cursor: 0,
			open_macro: None,
			saved_cursor: Some(0),
		}
	}

	/// Executes `command` and records it.
	///
	/// A command whose [`Command::is_noop`] holds is neither executed nor
	/// recorded. Otherwise the command runs exactly once, then either merges
	/// into the previous entry (or the open macro's last sub-command) or is
	/// pushed. Returns `true` if the command was executed.
	pub fn submit(&mut self, doc: &mut Document, mut command: Box<dyn Command>) -> bool {
		if command.is_noop(doc) {
			trace!(label = command.label(), "skipping no-op command");
			return false;
		}
		debug!(label = command.label(), "executing command");
		command.redo(doc);

		if let Some(open) = &mut self.open_macro {
			if let Some(last) = open.last_mut()
				&& last.try_merge(&*command)
			{
				trace!("merged into open macro's last command");
				return true;
			}
			open.push(command);
			return true;
		}

		self.truncate_undone();
		if let Some(top) = self.stack.last_mut()
			&& top.try_merge(&*command)
		{
			trace!("merged into previous command");
			if self.saved_cursor == Some(self.cursor) {
				self.saved_cursor = None;
			}
			return true;
		}
		self.stack.push(command);
		self.cursor = self.stack.len();
		true
	}

	/// Opens a macro. Until [`History::end_macro`], submitted commands are
	/// grouped into one atomic undo step.
	///
	/// # Panics
	/// Panics if a macro is already open; macros do not nest.
	pub fn start_macro(&mut self, label: impl Into<String>) {
		assert!(self.open_macro.is_none(), "a macro is already open");
		self.open_macro = Some(MacroCommand::new(label));
	}

	/// Closes the open macro and records it. An empty macro is discarded.
	/// A freshly recorded macro never merges with earlier entries.
	///
	/// # Panics
	/// Panics if no macro is open.
	pub fn end_macro(&mut self) {
		let group = self.open_macro.take().expect("no macro is open");
		if group.is_empty() {
			trace!(label = group.label(), "discarding empty macro");
			return;
		}
		debug!(label = group.label(), commands = group.len(), "recording macro");
		self.truncate_undone();
		self.stack.push(Box::new(group));
		self.cursor = self.stack.len();
	}

	/// True while a macro is open.
	pub fn in_macro(&self) -> bool {
		self.open_macro.is_some()
	}

	/// Undoes the most recent applied command.
	///
	/// Returns whether the undone command alters structure, or `None` if
	/// there was nothing to undo.
	///
	/// # Panics
	/// Panics if a macro is open.
	pub fn undo(&mut self, doc: &mut Document) -> Option<bool> {
		assert!(self.open_macro.is_none(), "cannot undo while a macro is open");
		if self.cursor == 0 {
			return None;
		}
		self.cursor -= 1;
		let command = &mut self.stack[self.cursor];
		debug!(label = command.label(), "undoing command");
		command.undo(doc);
		Some(command.alters_structure())
	}

	/// Redoes the most recently undone command.
	///
	/// Returns whether the redone command alters structure, or `None` if
	/// there was nothing to redo.
	///
	/// # Panics
	/// Panics if a macro is open.
	pub fn redo(&mut self, doc: &mut Document) -> Option<bool> {
		assert!(self.open_macro.is_none(), "cannot redo while a macro is open");
		if self.cursor == self.stack.len() {
			return None;
		}
		let command = &mut self.stack[self.cursor];
		debug!(label = command.label(), "redoing command");
		command.redo(doc);
		self.cursor += 1;
		Some(command.alters_structure())
	}

	/// True if there is a command to undo.
	pub fn can_undo(&self) -> bool {
		self.cursor > 0
	}

	/// True if there is an undone command to redo.
	pub fn can_redo(&self) -> bool {
		self.cursor < self.stack.len()
	}

	/// Label of the command [`History::undo`] would revert.
	pub fn undo_label(&self) -> Option<&str> {
		self.cursor
			.checked_sub(1)
			.map(|i| self.stack[i].label())
	}

	/// Label of the command [`History::redo`] would re-apply.
	pub fn redo_label(&self) -> Option<&str> {
		self.stack.get(self.cursor).map(|c| c.label())
	}

	/// Number of recorded entries (applied and undone).
	pub fn len(&self) -> usize {
		self.stack.len()
	}

	/// True if nothing is recorded.
	pub fn is_empty(&self) -> bool {
		self.stack.is_empty()
	}

	/// Drops every entry and counts the current state as unmodified.
	pub fn clear(&mut self) {
		self.stack.clear();
		self.cursor = 0;
		self.open_macro = None;
		self.saved_cursor = Some(0);
	}

	/// Marks the current cursor position as the on-disk state.
	pub fn set_unmodified(&mut self) {
		self.saved_cursor = Some(self.cursor);
	}

	/// True if the document differs from the last saved state. Undoing back
	/// to the saved position clears the flag again.
	pub fn is_modified(&self) -> bool {
		self.saved_cursor != Some(self.cursor)
	}

	fn truncate_undone(&mut self) {
		if self.cursor < self.stack.len() {
			trace!(dropped = self.stack.len() - self.cursor, "truncating undone commands");
			self.stack.truncate(self.cursor);
			if let Some(saved) = self.saved_cursor
				&& saved > self.cursor
			{
				// The saved state can no longer be reached by undo or redo.
				self.saved_cursor = None;
			}
		}
	}
}

impl Default for History {
	fn default() -> Self {
		Self::new()
	}
}
