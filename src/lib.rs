//! Reddit API core: a single-flight OAuth token cache and a hardened decoder for the API's
//! self-describing `Thing` object model.
//!
//! The [`auth::Authenticator`] acquires, validates, caches, and shares bearer tokens across
//! concurrent callers while the [`thing`] module turns raw `{"kind", "data"}` envelopes into
//! typed comments, links, listings, and deferred-children markers.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod error;
pub mod exchange;
pub mod http;
pub mod obs;
pub mod thing;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{AuthConfig, Authenticator, Credentials},
		exchange::ReqwestTransportErrorMapper,
		http::ReqwestHttpClient,
	};

	/// Authenticator type alias used by reqwest-backed integration tests.
	pub type ReqwestTestAuthenticator = Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`Authenticator`] backed by the reqwest transport used across integration
	/// tests.
	pub fn build_reqwest_test_authenticator(
		config: AuthConfig,
		credentials: Credentials,
	) -> ReqwestTestAuthenticator {
		Authenticator::with_http_client(
			config,
			credentials,
			test_reqwest_http_client(),
			ReqwestTransportErrorMapper,
		)
		.expect("Test authenticator should accept the provided credentials.")
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
