//! Credentials and access tokens that must never reach a log line.
//!
//! Passwords, client secrets and bearer tokens all travel as [`Secret`]. Formatting one with
//! `{}` or `{:?}` prints a placeholder, so a `Credentials` or `Token` can be logged whole.

// self
use crate::_prelude::*;

const REDACTED: &str = "<redacted>";

/// Sensitive string whose formatters never print the value.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);
impl Secret {
	/// Wraps `value`.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// The raw value, for the request form or the `Authorization` header only.
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// `true` when nothing was supplied.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}
impl From<String> for Secret {
	fn from(value: String) -> Self {
		Self(value)
	}
}
impl From<&str> for Secret {
	fn from(value: &str) -> Self {
		Self(value.to_owned())
	}
}
impl Debug for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Secret({REDACTED})")
	}
}
impl Display for Secret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(REDACTED)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn formatting_never_leaks_the_value() {
		let password = Secret::from("hunter2");

		assert_eq!(format!("{password:?}"), "Secret(<redacted>)");
		assert_eq!(format!("{password}"), "<redacted>");
		assert_eq!(password.expose(), "hunter2");
	}

	#[test]
	fn nested_debug_output_stays_redacted() {
		let pair = (Secret::new(String::from("client-secret")), Secret::default());
		let rendered = format!("{pair:?}");

		assert!(!rendered.contains("client-secret"));
		assert!(pair.1.is_empty());
	}
}
