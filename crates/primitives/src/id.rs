use std::fmt;
use std::num::NonZeroU64;

/// Stable identifier of a property owner (object, tag, or style).
///
/// Ids are allocated once per entity and never reused within a document, so
/// a reference that outlives its target simply stops resolving instead of
/// pointing at a recycled slot. On the wire, `0` encodes a null reference;
/// the non-zero representation makes that sentinel unrepresentable here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(NonZeroU64);

impl OwnerId {
	/// Wraps a raw id, returning `None` for the null sentinel `0`.
	pub fn from_raw(raw: u64) -> Option<Self> {
		NonZeroU64::new(raw).map(Self)
	}

	/// Returns the raw numeric id.
	pub fn raw(self) -> u64 {
		self.0.get()
	}

	/// Encodes an optional id for the wire, mapping `None` to `0`.
	pub fn to_wire(id: Option<OwnerId>) -> u64 {
		id.map_or(0, OwnerId::raw)
	}
}

impl fmt::Display for OwnerId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
