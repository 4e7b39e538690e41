//! Authenticator configuration: endpoint, identification, freshness margin, and size ceilings.

// crates.io
use url::Host;
// self
use crate::{_prelude::*, error::ConfigError};

/// Token endpoint used by the public API.
pub const REDDIT_TOKEN_ENDPOINT: &str = "https://www.reddit.com/api/v1/access_token";
/// Default safety margin subtracted from a token's expiry.
pub const DEFAULT_SKEW: Duration = Duration::seconds(60);
/// Default ceiling for token endpoint response bodies (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Default ceiling for the `access_token` value (256 KiB).
pub const DEFAULT_MAX_TOKEN_BYTES: usize = 256 * 1024;
/// Default upper bound for `expires_in` (one 365-day year, inclusive).
pub const DEFAULT_MAX_EXPIRES_IN: Duration = Duration::seconds(31_536_000);

/// How the client identifies itself to the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClientAuthMethod {
	/// HTTP Basic authentication with `client_id:client_secret`.
	#[default]
	Basic,
	/// `client_id` and `client_secret` sent as form fields.
	Post,
}

/// Validated authenticator settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
	/// Token endpoint URL.
	pub token_endpoint: Url,
	/// Descriptive `User-Agent` sent with every token request.
	pub user_agent: String,
	/// Client authentication method.
	pub client_auth_method: ClientAuthMethod,
	/// Safety margin subtracted from the expiry before a cached token is reused.
	pub skew: Duration,
	/// Largest accepted response body, in bytes.
	pub max_body_bytes: usize,
	/// Largest accepted `access_token`, in bytes.
	pub max_token_bytes: usize,
	/// Largest accepted `expires_in` (inclusive).
	pub max_expires_in: Duration,
}
impl AuthConfig {
	/// Starts a builder targeting `token_endpoint`.
	pub fn builder(token_endpoint: Url) -> AuthConfigBuilder {
		AuthConfigBuilder::new(token_endpoint)
	}

	/// Starts a builder from a textual endpoint URL.
	pub fn builder_from_str(token_endpoint: &str) -> Result<AuthConfigBuilder, ConfigError> {
		Url::parse(token_endpoint)
			.map(Self::builder)
			.map_err(|source| ConfigError::InvalidEndpoint { source })
	}

	/// Builds a configuration for the public token endpoint with default limits.
	pub fn reddit(user_agent: impl Into<String>) -> Result<Self> {
		Ok(Self::builder_from_str(REDDIT_TOKEN_ENDPOINT)?.user_agent(user_agent).build()?)
	}
}

/// Builder for [`AuthConfig`].
#[derive(Clone, Debug)]
pub struct AuthConfigBuilder {
	token_endpoint: Url,
	user_agent: Option<String>,
	client_auth_method: ClientAuthMethod,
	skew: Duration,
	max_body_bytes: usize,
	max_token_bytes: usize,
	max_expires_in: Duration,
}
impl AuthConfigBuilder {
	fn new(token_endpoint: Url) -> Self {
		Self {
			token_endpoint,
			user_agent: None,
			client_auth_method: ClientAuthMethod::default(),
			skew: DEFAULT_SKEW,
			max_body_bytes: DEFAULT_MAX_BODY_BYTES,
			max_token_bytes: DEFAULT_MAX_TOKEN_BYTES,
			max_expires_in: DEFAULT_MAX_EXPIRES_IN,
		}
	}

	/// Sets the `User-Agent` header value (required).
	pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
		self.user_agent = Some(user_agent.into());

		self
	}

	/// Overrides the client authentication method.
	pub fn client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth_method = method;

		self
	}

	/// Overrides the freshness margin.
	pub fn skew(mut self, skew: Duration) -> Self {
		self.skew = skew;

		self
	}

	/// Overrides the response body ceiling.
	pub fn max_body_bytes(mut self, limit: usize) -> Self {
		self.max_body_bytes = limit;

		self
	}

	/// Overrides the access token ceiling.
	pub fn max_token_bytes(mut self, limit: usize) -> Self {
		self.max_token_bytes = limit;

		self
	}

	/// Overrides the largest accepted `expires_in`.
	pub fn max_expires_in(mut self, limit: Duration) -> Self {
		self.max_expires_in = limit;

		self
	}

	/// Validates the settings and produces an [`AuthConfig`].
	pub fn build(self) -> Result<AuthConfig, ConfigError> {
		validate_endpoint(&self.token_endpoint)?;

		let user_agent = self.user_agent.unwrap_or_default();

		if user_agent.trim().is_empty() || user_agent.chars().any(char::is_control) {
			return Err(ConfigError::InvalidUserAgent);
		}
		if self.skew.is_negative() {
			return Err(ConfigError::InvalidLimit { setting: "skew", reason: "must not be negative" });
		}
		if self.max_body_bytes == 0 {
			return Err(ConfigError::InvalidLimit {
				setting: "max_body_bytes",
				reason: "must be positive",
			});
		}
		if self.max_token_bytes == 0 || self.max_token_bytes > self.max_body_bytes {
			return Err(ConfigError::InvalidLimit {
				setting: "max_token_bytes",
				reason: "must be positive and no larger than max_body_bytes",
			});
		}
		if self.max_expires_in.whole_seconds() < 1 || self.max_expires_in <= self.skew {
			return Err(ConfigError::InvalidLimit {
				setting: "max_expires_in",
				reason: "must be at least one second and longer than skew",
			});
		}

		Ok(AuthConfig {
			token_endpoint: self.token_endpoint,
			user_agent,
			client_auth_method: self.client_auth_method,
			skew: self.skew,
			max_body_bytes: self.max_body_bytes,
			max_token_bytes: self.max_token_bytes,
			max_expires_in: self.max_expires_in,
		})
	}
}

fn validate_endpoint(url: &Url) -> Result<(), ConfigError> {
	let secure = match url.scheme() {
		"https" => url.host().is_some(),
		"http" => url.host().is_some_and(|host| is_loopback(&host)),
		_ => false,
	};

	if secure { Ok(()) } else { Err(ConfigError::InsecureEndpoint { url: url.to_string() }) }
}

fn is_loopback(host: &Host<&str>) -> bool {
	match host {
		Host::Domain(domain) => domain.eq_ignore_ascii_case("localhost"),
		Host::Ipv4(ip) => ip.is_loopback(),
		Host::Ipv6(ip) => ip.is_loopback(),
	}
}
