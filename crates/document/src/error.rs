//! Error types for document loading.
//!
//! Only deserialization is recoverable: a failed load reports a typed error
//! and leaves the in-memory document untouched. Structural invariant
//! violations and property kind mismatches are contract violations and
//! fail fast instead of surfacing here.

use thiserror::Error;

/// A type name that no factory knows how to construct.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown type name '{0}'")]
pub struct LookupError(pub String);

/// Errors that can occur while writing a document to disk.
#[derive(Debug, Error)]
pub enum SaveError {
	/// The file could not be created or written.
	#[error("i/o error: {0}")]
	Io(#[from] std::io::Error),

	/// The document could not be encoded.
	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Errors that can occur while loading a serialized document.
#[derive(Debug, Error)]
pub enum DeserializeError {
	/// A required value is missing at the given JSON pointer.
	#[error("missing value at '{0}'")]
	Missing(String),

	/// A value at the given pointer has an unexpected shape.
	#[error("malformed value at '{pointer}': {detail}")]
	Malformed {
		/// JSON pointer to the offending value.
		pointer: String,
		/// What was expected.
		detail: String,
	},

	/// An owner or property declared a type name no factory recognizes.
	#[error(transparent)]
	UnknownType(#[from] LookupError),

	/// Two owners in the stream declared the same id.
	#[error("duplicate owner id {0}")]
	DuplicateId(u64),

	/// A reference property points at an id that was never declared.
	#[error("unresolved reference to owner id {0}")]
	UnresolvedReference(u64),

	/// A property exists on the owner with a different type than declared.
	#[error("property '{key}' declared as {declared} but exists as {actual}")]
	PropertyTypeMismatch {
		/// Property key.
		key: String,
		/// Type name declared in the stream.
		declared: String,
		/// Type of the already-existing property.
		actual: String,
	},

	/// The file could not be read or written.
	#[error("i/o error: {0}")]
	Io(#[from] std::io::Error),

	/// The file is not valid JSON.
	#[error("json error: {0}")]
	Json(#[from] serde_json::Error),
}
