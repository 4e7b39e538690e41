//! Two-phase, depth-bounded decoding of Thing envelopes.

// crates.io
use serde::de::DeserializeOwned;
use serde_json::Value;
// self
use crate::{
	_prelude::*,
	error::json_type,
	obs::{FlowKind, FlowOutcome, FlowRecord, FlowSpan},
	thing::{
		ApiError, Comment, DecodeError, Kind, Listing, MoreChild, MoreChildren, Thing,
	},
};

/// Default bound on Thing nesting.
pub const DEFAULT_MAX_DEPTH: usize = 32;
/// Default bound on raw input size (32 MiB).
pub const DEFAULT_MAX_INPUT_BYTES: usize = 32 * 1024 * 1024;

const MAX_REPORTED_KIND_CHARS: usize = 64;

/// Stateless decoder with configurable resource bounds.
///
/// Decoding first parses the whole payload into a JSON tree, then walks it, peeking at each
/// envelope's `kind` before decoding the matching `data`. Depth counts Things, so a listing
/// holding a comment holding a reply listing is three levels deep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decoder {
	max_depth: usize,
	max_input_bytes: usize,
}
impl Decoder {
	/// Creates a decoder with the default bounds.
	pub fn new() -> Self {
		Self { max_depth: DEFAULT_MAX_DEPTH, max_input_bytes: DEFAULT_MAX_INPUT_BYTES }
	}

	/// Overrides the nesting bound.
	pub fn with_max_depth(mut self, max_depth: usize) -> Self {
		self.max_depth = max_depth;

		self
	}

	/// Overrides the input size bound.
	pub fn with_max_input_bytes(mut self, max_input_bytes: usize) -> Self {
		self.max_input_bytes = max_input_bytes;

		self
	}

	/// Returns the nesting bound.
	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	/// Returns the input size bound.
	pub fn max_input_bytes(&self) -> usize {
		self.max_input_bytes
	}

	/// Decodes any supported Thing.
	pub fn decode(&self, raw: impl AsRef<[u8]>) -> Result<Thing, DecodeError> {
		self.observe("decode", raw.as_ref(), |value| self.decode_value(value))
	}

	/// Decodes a payload that must be a Listing.
	pub fn decode_listing(&self, raw: impl AsRef<[u8]>) -> Result<Listing, DecodeError> {
		self.observe("decode_listing", raw.as_ref(), |value| self.decode_listing_value(value))
	}

	/// Decodes an `/api/morechildren` response.
	pub fn decode_more_children(&self, raw: impl AsRef<[u8]>) -> Result<MoreChildren, DecodeError> {
		self.observe("decode_more_children", raw.as_ref(), |value| {
			self.decode_more_children_value(value)
		})
	}

	/// Decodes an already-parsed Thing envelope.
	pub fn decode_value(&self, value: &Value) -> Result<Thing, DecodeError> {
		self.thing(value, "", 1)
	}

	/// Decodes an already-parsed Listing envelope.
	pub fn decode_listing_value(&self, value: &Value) -> Result<Listing, DecodeError> {
		let (kind, data) = self.envelope(value, "")?;

		if kind != Kind::Listing {
			return Err(DecodeError::UnexpectedKind {
				path: String::new(),
				expected: Kind::Listing.as_str(),
				found: kind.as_str(),
			});
		}

		self.listing(data, "data", 1)
	}

	/// Decodes an already-parsed `/api/morechildren` response.
	pub fn decode_more_children_value(&self, value: &Value) -> Result<MoreChildren, DecodeError> {
		let Value::Object(root) = value else {
			return Err(DecodeError::NotAnObject { path: String::new(), found: json_type(value) });
		};
		let json = match root.get("json") {
			Some(Value::Object(json)) => json,
			other => return Err(DecodeError::MissingJson { found: found(other) }),
		};
		let errors = match json.get("errors") {
			None | Some(Value::Null) => Vec::new(),
			Some(Value::Array(items)) => items
				.iter()
				.enumerate()
				.map(|(i, item)| api_error(item, &index("json.errors", i)))
				.collect::<Result<Vec<_>, _>>()?,
			Some(other) => return Err(DecodeError::ErrorsNotArray { found: json_type(other) }),
		};
		let data = match json.get("data") {
			Some(Value::Object(data)) => data,
			_ if !errors.is_empty() => return Err(DecodeError::Api { errors }),
			other => return Err(DecodeError::MissingData { found: found(other) }),
		};
		let things = match data.get("things") {
			Some(Value::Array(things)) => things,
			other => return Err(DecodeError::ThingsNotArray { found: found(other) }),
		};
		let things = things
			.iter()
			.enumerate()
			.map(|(i, item)| {
				let path = index("json.data.things", i);

				match item {
					Value::String(id) if !id.is_empty() => Ok(MoreChild::Id(id.clone())),
					Value::Object(_) => self.thing(item, &path, 1).map(MoreChild::Thing),
					Value::String(_) =>
						Err(DecodeError::InvalidMoreChild { path, found: "empty string" }),
					other => Err(DecodeError::InvalidMoreChild { path, found: json_type(other) }),
				}
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(MoreChildren { things, errors })
	}

	fn observe<T>(
		&self,
		stage: &'static str,
		raw: &[u8],
		decode: impl FnOnce(&Value) -> Result<T, DecodeError>,
	) -> Result<T, DecodeError> {
		const KIND: FlowKind = FlowKind::Decode;

		let record = FlowRecord::start(KIND);
		let _span = FlowSpan::new(KIND, stage).entered();
		let result = self.parse(raw).and_then(|value| decode(&value));

		record.finish(FlowOutcome::of(&result));

		result
	}

	fn parse(&self, raw: &[u8]) -> Result<Value, DecodeError> {
		if raw.len() > self.max_input_bytes {
			return Err(DecodeError::InputTooLarge { size: raw.len(), limit: self.max_input_bytes });
		}

		serde_json::from_slice(raw).map_err(|e| DecodeError::MalformedJson { source: Arc::new(e) })
	}

	fn thing(&self, value: &Value, path: &str, depth: usize) -> Result<Thing, DecodeError> {
		if depth > self.max_depth {
			return Err(DecodeError::DepthExceeded { path: path.into(), limit: self.max_depth });
		}

		let (kind, data) = self.envelope(value, path)?;
		let data_path = join(path, "data");

		Ok(match kind {
			Kind::Comment => Thing::Comment(Box::new(self.comment(data, &data_path, depth)?)),
			Kind::Account => Thing::Account(decode_fields(data, &data_path)?),
			Kind::Link => Thing::Link(Box::new(decode_fields(data, &data_path)?)),
			Kind::Subreddit => Thing::Subreddit(decode_fields(data, &data_path)?),
			Kind::Listing => Thing::Listing(self.listing(data, &data_path, depth)?),
			Kind::More => Thing::More(decode_fields(data, &data_path)?),
		})
	}

	/// Peeks at `kind` and checks that `data` is an object.
	fn envelope<'v>(&self, value: &'v Value, path: &str) -> Result<(Kind, &'v Value), DecodeError> {
		let Value::Object(envelope) = value else {
			return Err(DecodeError::NotAnObject { path: path.into(), found: json_type(value) });
		};
		let kind = match envelope.get("kind") {
			None | Some(Value::Null) => return Err(DecodeError::MissingKind { path: path.into() }),
			Some(Value::String(tag)) if tag.is_empty() =>
				return Err(DecodeError::EmptyKind { path: path.into() }),
			Some(Value::String(tag)) => Kind::from_tag(tag).ok_or_else(|| DecodeError::UnknownKind {
				path: path.into(),
				kind: tag.chars().take(MAX_REPORTED_KIND_CHARS).collect(),
			})?,
			Some(other) =>
				return Err(DecodeError::KindNotString { path: path.into(), found: json_type(other) }),
		};

		match envelope.get("data") {
			Some(data @ Value::Object(_)) => Ok((kind, data)),
			other => Err(DecodeError::DataNotObject { path: path.into(), found: found(other) }),
		}
	}

	fn listing(&self, data: &Value, path: &str, depth: usize) -> Result<Listing, DecodeError> {
		let children_path = join(path, "children");
		let children = match data.get("children") {
			None | Some(Value::Null) => Vec::new(),
			Some(Value::Array(items)) => items
				.iter()
				.enumerate()
				.map(|(i, item)| self.thing(item, &index(&children_path, i), depth + 1))
				.collect::<Result<Vec<_>, _>>()?,
			Some(other) =>
				return Err(DecodeError::InvalidField {
					path: children_path,
					message: format!("expected an array, found {}", json_type(other)),
				}),
		};
		let dist = match data.get("dist") {
			None | Some(Value::Null) => None,
			Some(Value::Number(number)) if number.as_u64().is_some() => number.as_u64(),
			Some(other) =>
				return Err(DecodeError::InvalidField {
					path: join(path, "dist"),
					message: format!("expected a non-negative integer, found {}", json_type(other)),
				}),
		};

		Ok(Listing {
			children,
			after: cursor(data, path, "after")?,
			before: cursor(data, path, "before")?,
			dist,
		})
	}

	fn comment(&self, data: &Value, path: &str, depth: usize) -> Result<Comment, DecodeError> {
		let mut comment = decode_fields::<Comment>(data, path)?;
		let replies_path = join(path, "replies");
		let replies = match data.get("replies") {
			None => return Ok(comment),
			Some(Value::String(marker)) if marker.is_empty() => return Ok(comment),
			Some(value @ Value::Object(_)) => self.thing(value, &replies_path, depth + 1)?,
			Some(Value::String(_)) =>
				return Err(DecodeError::InvalidReplies {
					path: replies_path,
					found: "non-empty string",
				}),
			Some(other) =>
				return Err(DecodeError::InvalidReplies { path: replies_path, found: json_type(other) }),
		};
		let mut listing = match replies {
			Thing::Listing(listing) => listing,
			other =>
				return Err(DecodeError::InvalidReplies {
					path: replies_path,
					found: other.kind().as_str(),
				}),
		};
		let children_path = join(&join(&replies_path, "data"), "children");
		let mut children = Vec::with_capacity(listing.children.len());

		for (i, child) in listing.children.into_iter().enumerate() {
			match child {
				Thing::Comment(_) => children.push(child),
				Thing::More(more) => comment.more_children_ids.extend(more.children),
				other =>
					return Err(DecodeError::InvalidReplies {
						path: index(&children_path, i),
						found: other.kind().as_str(),
					}),
			}
		}

		listing.children = children;
		comment.replies = Some(listing);

		Ok(comment)
	}
}
impl Default for Decoder {
	fn default() -> Self {
		Self::new()
	}
}

fn decode_fields<T>(data: &Value, path: &str) -> Result<T, DecodeError>
where
	T: DeserializeOwned,
{
	serde_path_to_error::deserialize(data).map_err(|e| {
		let inner = e.path().to_string();
		let path = if inner == "." { path.to_owned() } else { join(path, &inner) };

		DecodeError::InvalidField { path, message: e.into_inner().to_string() }
	})
}

fn cursor(data: &Value, path: &str, key: &'static str) -> Result<Option<String>, DecodeError> {
	match data.get(key) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(cursor)) => Ok(Some(cursor.clone())),
		Some(other) => Err(DecodeError::InvalidField {
			path: join(path, key),
			message: format!("expected a string or null, found {}", json_type(other)),
		}),
	}
}

fn api_error(value: &Value, path: &str) -> Result<ApiError, DecodeError> {
	let invalid = |message: &str| DecodeError::InvalidField {
		path: path.to_owned(),
		message: message.to_owned(),
	};
	let Value::Array(parts) = value else {
		return Err(invalid("expected a [code, message, field] array"));
	};
	let text = |i: usize| match parts.get(i) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(text)) => Ok(Some(text.clone())),
		Some(_) => Err(invalid("error entries must be strings or null")),
	};
	let code = text(0)?.ok_or_else(|| invalid("error code is missing"))?;

	Ok(ApiError { code, message: text(1)?, field: text(2)? })
}

fn found(value: Option<&Value>) -> &'static str {
	value.map_or("missing", json_type)
}

fn join(base: &str, key: &str) -> String {
	if base.is_empty() { key.to_owned() } else { format!("{base}.{key}") }
}

fn index(base: &str, i: usize) -> String {
	format!("{base}[{i}]")
}
