//! Typed representations of the API's Thing kinds.

// crates.io
use serde::{Deserializer, de::Visitor};
// self
use crate::_prelude::*;

/// Recognized `kind` tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
	/// `t1`, a comment.
	Comment,
	/// `t2`, a user account.
	Account,
	/// `t3`, a link (post).
	Link,
	/// `t5`, a subreddit.
	Subreddit,
	/// `Listing`, a paginated collection.
	Listing,
	/// `more`, a deferred-children marker.
	More,
}
impl Kind {
	/// Returns the wire tag.
	pub const fn as_str(self) -> &'static str {
		match self {
			Kind::Comment => "t1",
			Kind::Account => "t2",
			Kind::Link => "t3",
			Kind::Subreddit => "t5",
			Kind::Listing => "Listing",
			Kind::More => "more",
		}
	}

	/// Resolves a wire tag; tags are case-sensitive.
	pub fn from_tag(tag: &str) -> Option<Self> {
		Some(match tag {
			"t1" => Kind::Comment,
			"t2" => Kind::Account,
			"t3" => Kind::Link,
			"t5" => Kind::Subreddit,
			"Listing" => Kind::Listing,
			"more" => Kind::More,
			_ => return None,
		})
	}
}
impl Display for Kind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A decoded Thing.
#[derive(Clone, Debug, PartialEq)]
pub enum Thing {
	/// Comment (`t1`).
	Comment(Box<Comment>),
	/// Account (`t2`).
	Account(Account),
	/// Link (`t3`).
	Link(Box<Link>),
	/// Subreddit (`t5`).
	Subreddit(Subreddit),
	/// Listing.
	Listing(Listing),
	/// Deferred-children marker.
	More(More),
}
impl Thing {
	/// Returns the kind this Thing was decoded from.
	pub fn kind(&self) -> Kind {
		match self {
			Self::Comment(_) => Kind::Comment,
			Self::Account(_) => Kind::Account,
			Self::Link(_) => Kind::Link,
			Self::Subreddit(_) => Kind::Subreddit,
			Self::Listing(_) => Kind::Listing,
			Self::More(_) => Kind::More,
		}
	}

	/// Returns the fullname (`t1_abc`); listings have none.
	pub fn fullname(&self) -> Option<&str> {
		match self {
			Self::Comment(comment) => Some(&comment.name),
			Self::Account(account) => Some(&account.name),
			Self::Link(link) => Some(&link.name),
			Self::Subreddit(subreddit) => Some(&subreddit.name),
			Self::Listing(_) => None,
			Self::More(more) => Some(&more.name),
		}
	}

	/// Returns the comment, if this is one.
	pub fn as_comment(&self) -> Option<&Comment> {
		match self {
			Self::Comment(comment) => Some(comment),
			_ => None,
		}
	}

	/// Returns the link, if this is one.
	pub fn as_link(&self) -> Option<&Link> {
		match self {
			Self::Link(link) => Some(link),
			_ => None,
		}
	}

	/// Returns the listing, if this is one.
	pub fn as_listing(&self) -> Option<&Listing> {
		match self {
			Self::Listing(listing) => Some(listing),
			_ => None,
		}
	}
}
impl<'de> Deserialize<'de> for Thing {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = serde_json::Value::deserialize(deserializer)?;

		super::Decoder::default().decode_value(&value).map_err(serde::de::Error::custom)
	}
}

/// When a post or comment was last edited.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Edited {
	/// Never edited (`false`).
	#[default]
	Never,
	/// Edited at an unreported time (`true`).
	Unknown,
	/// Edited at this Unix timestamp, in seconds.
	At(f64),
}
impl Edited {
	/// Returns `true` unless the item was never edited.
	pub fn is_edited(&self) -> bool {
		!matches!(self, Self::Never)
	}
}
impl<'de> Deserialize<'de> for Edited {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		struct EditedVisitor;
		impl Visitor<'_> for EditedVisitor {
			type Value = Edited;

			fn expecting(&self, f: &mut Formatter) -> FmtResult {
				f.write_str("a boolean or a Unix timestamp")
			}

			fn visit_bool<E>(self, value: bool) -> Result<Edited, E> {
				Ok(if value { Edited::Unknown } else { Edited::Never })
			}

			fn visit_i64<E>(self, value: i64) -> Result<Edited, E> {
				Ok(Edited::At(value as f64))
			}

			fn visit_u64<E>(self, value: u64) -> Result<Edited, E> {
				Ok(Edited::At(value as f64))
			}

			fn visit_f64<E>(self, value: f64) -> Result<Edited, E> {
				Ok(Edited::At(value))
			}
		}

		deserializer.deserialize_any(EditedVisitor)
	}
}

/// Comment (`t1`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Comment {
	/// Base-36 id.
	pub id: String,
	/// Fullname (`t1_<id>`).
	#[serde(default)]
	pub name: String,
	/// Author name (`[deleted]` for removed accounts).
	#[serde(default)]
	pub author: String,
	/// Markdown body.
	#[serde(default)]
	pub body: String,
	/// Rendered HTML body.
	#[serde(default)]
	pub body_html: Option<String>,
	/// Net score.
	#[serde(default)]
	pub score: i64,
	/// Creation time, Unix seconds.
	#[serde(default)]
	pub created_utc: f64,
	/// Edit marker.
	#[serde(default)]
	pub edited: Edited,
	/// Fullname of the parent comment or link.
	#[serde(default)]
	pub parent_id: String,
	/// Fullname of the link the comment belongs to.
	#[serde(default)]
	pub link_id: String,
	/// Subreddit display name.
	#[serde(default)]
	pub subreddit: String,
	/// Relative permalink.
	#[serde(default)]
	pub permalink: String,
	/// Depth in the comment tree, when reported.
	#[serde(default)]
	pub depth: Option<u32>,
	/// Whether moderators pinned the comment.
	#[serde(default)]
	pub stickied: bool,
	/// Distinguish marker (`moderator`, `admin`), when set.
	#[serde(default)]
	pub distinguished: Option<String>,
	/// Nested reply listing holding comments only; `None` when the comment has no replies.
	#[serde(skip)]
	pub replies: Option<Listing>,
	/// Ids of replies deferred behind `more` markers, in listing order.
	#[serde(skip)]
	pub more_children_ids: Vec<String>,
}

/// Account (`t2`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Account {
	/// Base-36 id.
	pub id: String,
	/// Account name.
	#[serde(default)]
	pub name: String,
	/// Creation time, Unix seconds.
	#[serde(default)]
	pub created_utc: f64,
	/// Karma earned from links.
	#[serde(default)]
	pub link_karma: i64,
	/// Karma earned from comments.
	#[serde(default)]
	pub comment_karma: i64,
}

/// Link, also known as a post (`t3`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Link {
	/// Base-36 id.
	pub id: String,
	/// Fullname (`t3_<id>`).
	#[serde(default)]
	pub name: String,
	/// Title.
	#[serde(default)]
	pub title: String,
	/// Author name.
	#[serde(default)]
	pub author: String,
	/// Markdown body of self posts.
	#[serde(default)]
	pub selftext: String,
	/// Target URL (the permalink for self posts).
	#[serde(default)]
	pub url: String,
	/// Relative permalink.
	#[serde(default)]
	pub permalink: String,
	/// Subreddit display name.
	#[serde(default)]
	pub subreddit: String,
	/// Net score.
	#[serde(default)]
	pub score: i64,
	/// Comment count.
	#[serde(default)]
	pub num_comments: u64,
	/// Creation time, Unix seconds.
	#[serde(default)]
	pub created_utc: f64,
	/// Marked not-safe-for-work.
	#[serde(default)]
	pub over_18: bool,
	/// Self (text) post.
	#[serde(default)]
	pub is_self: bool,
	/// Pinned by moderators.
	#[serde(default)]
	pub stickied: bool,
	/// Closed to new comments.
	#[serde(default)]
	pub locked: bool,
	/// Edit marker.
	#[serde(default)]
	pub edited: Edited,
}

/// Subreddit (`t5`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Subreddit {
	/// Base-36 id.
	pub id: String,
	/// Fullname (`t5_<id>`).
	#[serde(default)]
	pub name: String,
	/// Name used in URLs.
	#[serde(default)]
	pub display_name: String,
	/// Title.
	#[serde(default)]
	pub title: String,
	/// Subscriber count, when visible.
	#[serde(default)]
	pub subscribers: Option<u64>,
	/// Marked not-safe-for-work.
	#[serde(default)]
	pub over18: bool,
}

/// Deferred-children marker (`more`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct More {
	/// Marker id (`_` for "continue this thread" markers).
	pub id: String,
	/// Fullname (`t1_<id>`).
	#[serde(default)]
	pub name: String,
	/// Fullname of the parent comment or link.
	#[serde(default)]
	pub parent_id: String,
	/// Number of deferred descendants.
	#[serde(default)]
	pub count: u64,
	/// Depth of the deferred children.
	#[serde(default)]
	pub depth: u32,
	/// Ids of the deferred children, in API order.
	#[serde(default)]
	pub children: Vec<String>,
}

/// Ordered, paginated collection of Things.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
	/// Children in API order.
	pub children: Vec<Thing>,
	/// Cursor for the next page.
	pub after: Option<String>,
	/// Cursor for the previous page.
	pub before: Option<String>,
	/// Number of children the API reported.
	pub dist: Option<u64>,
}
impl Listing {
	/// Returns `true` when the listing has no children.
	pub fn is_empty(&self) -> bool {
		self.children.is_empty()
	}

	/// Iterates over the comment children.
	pub fn comments(&self) -> impl Iterator<Item = &Comment> {
		self.children.iter().filter_map(Thing::as_comment)
	}

	/// Iterates over the link children.
	pub fn links(&self) -> impl Iterator<Item = &Link> {
		self.children.iter().filter_map(Thing::as_link)
	}
}
impl<'de> Deserialize<'de> for Listing {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let value = serde_json::Value::deserialize(deserializer)?;

		super::Decoder::default().decode_listing_value(&value).map_err(serde::de::Error::custom)
	}
}
