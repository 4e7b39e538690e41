//! Decode failures, each carrying the JSON path of the offending value.

// self
use crate::_prelude::*;

/// Errors raised while decoding Things, Listings, and MoreChildren payloads.
///
/// Paths use dotted keys with bracketed array indices (`data.children[3].data.replies`); the
/// top-level value is rendered as `<root>`.
#[derive(Clone, Debug, ThisError)]
pub enum DecodeError {
	/// Raw input exceeded the decoder's byte ceiling.
	#[error("Payload of {size} bytes exceeds the {limit}-byte decode limit.")]
	InputTooLarge {
		/// Input size in bytes.
		size: usize,
		/// Configured ceiling in bytes.
		limit: usize,
	},
	/// Input is not syntactically valid JSON (truncated, `NaN`, nesting past the parser limit).
	#[error("Payload is not valid JSON.")]
	MalformedJson {
		/// Parser failure with line and column.
		#[source]
		source: Arc<serde_json::Error>,
	},
	/// A Thing envelope was not a JSON object.
	#[error("Expected a Thing object at {}, found {found}.", display_path(.path))]
	NotAnObject {
		/// Location of the value.
		path: String,
		/// JSON type that was found.
		found: &'static str,
	},
	/// The envelope has no `kind` (or it is null).
	#[error("Thing at {} has no kind.", display_path(.path))]
	MissingKind {
		/// Location of the envelope.
		path: String,
	},
	/// `kind` is present but not a string.
	#[error("Thing kind at {} must be a string, found {found}.", display_path(.path))]
	KindNotString {
		/// Location of the envelope.
		path: String,
		/// JSON type that was found.
		found: &'static str,
	},
	/// `kind` is the empty string.
	#[error("Thing kind at {} is empty.", display_path(.path))]
	EmptyKind {
		/// Location of the envelope.
		path: String,
	},
	/// `kind` names no supported Thing.
	#[error("Unsupported Thing kind {kind:?} at {}.", display_path(.path))]
	UnknownKind {
		/// Location of the envelope.
		path: String,
		/// Offending tag (truncated when very long).
		kind: String,
	},
	/// A supported kind appeared where a different one is required.
	#[error("Expected a {expected} at {}, found kind {found}.", display_path(.path))]
	UnexpectedKind {
		/// Location of the envelope.
		path: String,
		/// Required kind tag.
		expected: &'static str,
		/// Kind tag that was found.
		found: &'static str,
	},
	/// `data` is missing or not an object.
	#[error("Thing data at {} must be an object, found {found}.", display_path(.path))]
	DataNotObject {
		/// Location of the envelope.
		path: String,
		/// JSON type that was found (`missing` when absent).
		found: &'static str,
	},
	/// A field inside `data` has the wrong type or shape.
	#[error("Invalid field at {}: {message}.", display_path(.path))]
	InvalidField {
		/// Location of the field.
		path: String,
		/// Description of the mismatch.
		message: String,
	},
	/// A comment's `replies` is neither `""` nor a Listing of comments and `more` markers.
	#[error("Comment replies at {} must be \"\" or a Listing, found {found}.", display_path(.path))]
	InvalidReplies {
		/// Location of the offending value.
		path: String,
		/// What was found instead.
		found: &'static str,
	},
	/// Things nest deeper than the decoder allows.
	#[error("Thing nesting at {} exceeds the depth limit of {limit}.", display_path(.path))]
	DepthExceeded {
		/// Location of the first Thing past the limit.
		path: String,
		/// Configured depth limit.
		limit: usize,
	},
	/// MoreChildren envelope has no `json` object.
	#[error("MoreChildren response is missing the json object (found {found}).")]
	MissingJson {
		/// What was found instead (`missing` when absent).
		found: &'static str,
	},
	/// MoreChildren envelope has no `json.data` object.
	#[error("MoreChildren response is missing the json.data object (found {found}).")]
	MissingData {
		/// What was found instead (`missing` when absent).
		found: &'static str,
	},
	/// `json.data.things` is not an array.
	#[error("MoreChildren json.data.things must be an array, found {found}.")]
	ThingsNotArray {
		/// What was found instead (`missing` when absent).
		found: &'static str,
	},
	/// `json.errors` is not an array.
	#[error("MoreChildren json.errors must be an array, found {found}.")]
	ErrorsNotArray {
		/// What was found instead.
		found: &'static str,
	},
	/// An element of `things` is neither an id string nor a Thing object.
	#[error("MoreChildren entry at {} must be an id or a Thing, found {found}.", display_path(.path))]
	InvalidMoreChild {
		/// Location of the element.
		path: String,
		/// What was found instead.
		found: &'static str,
	},
	/// The API answered with errors and no data.
	#[error("API reported {} error(s){}.", .errors.len(), first_error(.errors))]
	Api {
		/// Errors reported by the API.
		errors: Vec<super::ApiError>,
	},
}
impl DecodeError {
	/// JSON path of the offending value, when the error is tied to one.
	pub fn path(&self) -> Option<&str> {
		match self {
			Self::NotAnObject { path, .. }
			| Self::MissingKind { path }
			| Self::KindNotString { path, .. }
			| Self::EmptyKind { path }
			| Self::UnknownKind { path, .. }
			| Self::UnexpectedKind { path, .. }
			| Self::DataNotObject { path, .. }
			| Self::InvalidField { path, .. }
			| Self::InvalidReplies { path, .. }
			| Self::DepthExceeded { path, .. }
			| Self::InvalidMoreChild { path, .. } => Some(path),
			_ => None,
		}
	}
}

fn display_path(path: &str) -> &str {
	if path.is_empty() { "<root>" } else { path }
}

fn first_error(errors: &[super::ApiError]) -> String {
	errors.first().map(|error| format!(": {error}")).unwrap_or_default()
}
