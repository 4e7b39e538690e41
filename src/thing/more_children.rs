//! `/api/morechildren` responses.

// self
use crate::{_prelude::*, thing::{Comment, Thing}};

/// Decoded `/api/morechildren` response.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoreChildren {
	/// Entries in API order.
	pub things: Vec<MoreChild>,
	/// Errors reported alongside the data.
	pub errors: Vec<ApiError>,
}
impl MoreChildren {
	/// Every deferred id: bare ids plus the ids carried by nested `more` markers.
	pub fn ids(&self) -> Vec<&str> {
		self.things
			.iter()
			.flat_map(|child| match child {
				MoreChild::Id(id) => vec![id.as_str()],
				MoreChild::Thing(Thing::More(more)) =>
					more.children.iter().map(String::as_str).collect(),
				MoreChild::Thing(_) => Vec::new(),
			})
			.collect()
	}

	/// Iterates over the comments that were returned inline.
	pub fn comments(&self) -> impl Iterator<Item = &Comment> {
		self.things.iter().filter_map(|child| match child {
			MoreChild::Thing(thing) => thing.as_comment(),
			MoreChild::Id(_) => None,
		})
	}
}

/// One element of `json.data.things`.
#[derive(Clone, Debug, PartialEq)]
pub enum MoreChild {
	/// Bare id of a child still to be fetched.
	Id(String),
	/// Fully decoded Thing.
	Thing(Thing),
}

/// Error reported by the API as a `[code, message, field]` triple.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiError {
	/// Machine-readable code (`RATELIMIT`, `TOO_LONG`).
	pub code: String,
	/// Human-readable message.
	pub message: Option<String>,
	/// Form field the error refers to.
	pub field: Option<String>,
}
impl Display for ApiError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.code)?;

		if let Some(message) = &self.message {
			write!(f, " ({message})")?;
		}
		if let Some(field) = &self.field {
			write!(f, " on {field}")?;
		}

		Ok(())
	}
}
