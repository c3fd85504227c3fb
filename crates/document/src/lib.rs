//! Document model of a vector graphics editor.
//!
//! The model is a graph of property-owning entities (objects, tags, and
//! styles) held by two ownership structures: a tree of scene objects and a
//! flat list of styles, with a flat tag list embedded in every object. All
//! mutation flows through reversible commands recorded in a linear history,
//! and documents round-trip through a JSON format whose references may point
//! forward in the stream.
//!
//! [`Scene`] is the entry point: it owns the [`Document`], the [`History`],
//! and the selection, and decides when observers hear about changes.

pub mod commands;
pub mod document;
pub mod error;
pub mod history;
pub mod object;
pub mod observer;
pub mod owner;
pub mod property;
pub mod scene;
pub mod serialize;
pub mod structure;
pub mod style;
pub mod tag;

pub use document::{
	Document, ObjectTreeAccess, ROOT_NAME, StructureAccess, StyleListAccess, TagListAccess,
};
pub use error::{DeserializeError, LookupError, SaveError};
pub use history::History;
pub use object::{Object, ObjectKind};
pub use observer::{DocumentEvent, DocumentObserver, SubscriptionId, TraceSet};
pub use owner::{NAME_KEY, Properties, PropertyOwner};
pub use property::{EnabledBuddy, Property};
pub use scene::Scene;
pub use serialize::{deserialize_document, serialize_document};
pub use structure::{
	DetachedItem, IdAllocator, List, MoveContext, OwningContext, Structure, StructureItem, Subtree,
	Tree,
};
pub use style::Style;
pub use tag::{Tag, TagKind};
