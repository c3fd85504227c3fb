use thiserror::Error;

/// An RGBA color with channels in `0.0..=1.0`.
///
/// Channels are stored as `f64` to match the precision used by property
/// values; constructors clamp out-of-range input rather than failing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
	/// Red channel.
	pub r: f64,
	/// Green channel.
	pub g: f64,
	/// Blue channel.
	pub b: f64,
	/// Alpha channel (1.0 = opaque).
	pub a: f64,
}

/// Error parsing a hex color string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseColorError {
	/// The string is not of the form `#rrggbb` or `#rrggbbaa`.
	#[error("invalid hex color length: expected #rrggbb or #rrggbbaa, got '{0}'")]
	Length(String),
	/// A channel could not be parsed as a hex byte.
	#[error("invalid hex digit in color '{0}'")]
	Digit(String),
}

impl Color {
	/// Opaque black.
	pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
	/// Opaque white.
	pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

	/// Creates an opaque color, clamping channels into `0.0..=1.0`.
	pub fn rgb(r: f64, g: f64, b: f64) -> Self {
		Self::rgba(r, g, b, 1.0)
	}

	/// Creates a color, clamping channels into `0.0..=1.0`.
	pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
		let clamp = |v: f64| v.clamp(0.0, 1.0);
		Self {
			r: clamp(r),
			g: clamp(g),
			b: clamp(b),
			a: clamp(a),
		}
	}

	/// Parses a `#rrggbb` or `#rrggbbaa` hex string.
	pub fn from_hex(hex: &str) -> Result<Self, ParseColorError> {
		let digits = hex.strip_prefix('#').unwrap_or(hex);
		if digits.len() != 6 && digits.len() != 8 {
			return Err(ParseColorError::Length(hex.to_owned()));
		}
		// Length is counted in bytes; rule out multi-byte input before the
		// fixed-offset slices below.
		if !digits.is_ascii() {
			return Err(ParseColorError::Digit(hex.to_owned()));
		}
		let byte = |range: std::ops::Range<usize>| {
			u8::from_str_radix(&digits[range], 16)
				.map(|b| f64::from(b) / 255.0)
				.map_err(|_| ParseColorError::Digit(hex.to_owned()))
		};
		let a = if digits.len() == 8 { byte(6..8)? } else { 1.0 };
		Ok(Self::rgba(byte(0..2)?, byte(2..4)?, byte(4..6)?, a))
	}

	/// Formats as `#rrggbbaa`.
	pub fn to_hex(&self) -> String {
		let byte = |v: f64| (v * 255.0).round() as u8;
		format!(
			"#{:02x}{:02x}{:02x}{:02x}",
			byte(self.r),
			byte(self.g),
			byte(self.b),
			byte(self.a)
		)
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::BLACK
	}
}
