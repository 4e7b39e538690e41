//! Decoder for the API's self-describing `{"kind", "data"}` object model.
//!
//! Every payload is parsed into a JSON tree first, then each envelope's `kind` is inspected
//! before its `data` is decoded into the matching variant of [`Thing`]. Unknown, missing, or
//! wrong-typed tags are errors, never silently defaulted values, and nesting is bounded so
//! adversarial input cannot exhaust the stack.
//!
//! `more` markers are kept as data: the decoder records the deferred ids and never fetches
//! anything.

mod decoder;
mod error;
mod model;
mod more_children;

pub use decoder::*;
pub use error::*;
pub use model::*;
pub use more_children::*;

/// Decodes any supported Thing with the default [`Decoder`].
pub fn decode(raw: impl AsRef<[u8]>) -> Result<Thing, DecodeError> {
	Decoder::default().decode(raw)
}

/// Decodes a Listing with the default [`Decoder`].
pub fn decode_listing(raw: impl AsRef<[u8]>) -> Result<Listing, DecodeError> {
	Decoder::default().decode_listing(raw)
}

/// Decodes an `/api/morechildren` response with the default [`Decoder`].
pub fn decode_more_children(raw: impl AsRef<[u8]>) -> Result<MoreChildren, DecodeError> {
	Decoder::default().decode_more_children(raw)
}
