//! Bearer token acquisition with a single-flight refresh cache.
//!
//! An [`Authenticator`] owns one credential set and one cached [`Token`]. Callers ask for a
//! token with [`Authenticator::token`]; a fresh cached token is returned without touching the
//! network, otherwise every concurrent caller joins the same refresh cycle and observes its
//! single result.

mod config;
mod credentials;
mod metrics;
mod refresh;
mod secret;
mod token;

pub use config::*;
pub use credentials::*;
pub use metrics::*;
pub use secret::*;
pub use token::*;

// self
use crate::{
	_prelude::*,
	exchange::TransportErrorMapper,
	http::{RateLimit, TokenHttpClient},
};
#[cfg(feature = "reqwest")]
use crate::{exchange::ReqwestTransportErrorMapper, http::ReqwestHttpClient};

/// Authenticator specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestAuthenticator = Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Acquires, validates, caches, and shares a bearer token across concurrent callers.
///
/// Clones share the same cache, so one instance can be handed to every task that talks to
/// the API. Independent instances never share state.
pub struct Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	inner: Arc<Inner<C, M>>,
}
impl<C, M> Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an authenticator that reuses the caller-provided transport + mapper pair.
	///
	/// Fails when the credentials cannot be encoded into a token request.
	pub fn with_http_client(
		config: AuthConfig,
		credentials: Credentials,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		credentials.validate()?;

		Ok(Self {
			inner: Arc::new(Inner {
				config,
				credentials,
				metrics: Default::default(),
				state: Default::default(),
				http_client: http_client.into(),
				transport_mapper: mapper.into(),
			}),
		})
	}

	/// Returns the active configuration.
	pub fn config(&self) -> &AuthConfig {
		&self.inner.config
	}

	/// Returns the request counters shared by every clone.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.inner.metrics
	}

	/// Returns the cached token, fresh or not, without contacting the endpoint.
	pub fn cached(&self) -> Option<Token> {
		self.inner.state.lock().current.clone()
	}

	/// Discards the cached token so the next request performs a refresh.
	///
	/// Use this after the API rejects a token that still looked fresh locally. A refresh that
	/// is already in flight is left untouched.
	pub fn invalidate(&self) {
		self.inner.state.lock().current = None;
	}

	/// Rate-limit headers observed on the most recent token endpoint response.
	pub fn rate_limit(&self) -> Option<RateLimit> {
		self.inner.state.lock().rate_limit
	}
}
#[cfg(feature = "reqwest")]
impl Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates an authenticator backed by a reqwest client that does not follow redirects.
	pub fn new(config: AuthConfig, credentials: Credentials) -> Result<Self> {
		Self::with_http_client(
			config,
			credentials,
			ReqwestHttpClient::without_redirects()?,
			ReqwestTransportErrorMapper,
		)
	}
}
impl<C, M> Clone for Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self { inner: Arc::clone(&self.inner) }
	}
}
impl<C, M> Debug for Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("token_endpoint", &self.inner.config.token_endpoint.as_str())
			.field("credentials", &self.inner.credentials)
			.field("metrics", &self.inner.metrics)
			.finish()
	}
}

struct Inner<C, M>
where
	C: ?Sized,
	M: ?Sized,
{
	config: AuthConfig,
	credentials: Credentials,
	metrics: RefreshMetrics,
	state: Mutex<refresh::AuthState>,
	http_client: Arc<C>,
	transport_mapper: Arc<M>,
}
