//! Application credentials and the grant they authenticate with.

// self
use crate::{_prelude::*, auth::Secret, error::ConfigError};

/// Grant type URI for installed (userless, secretless) applications.
pub const INSTALLED_CLIENT_GRANT: &str = "https://oauth.reddit.com/grants/installed_client";

/// Device identifier installed clients may send to opt out of tracking.
pub const DO_NOT_TRACK_DEVICE_ID: &str = "DO_NOT_TRACK_THIS_DEVICE";

const DEVICE_ID_LEN: std::ops::RangeInclusive<usize> = 20..=30;

/// Grant used to obtain access tokens.
#[derive(Clone, PartialEq, Eq)]
pub enum Grant {
	/// Resource-owner password grant used by personal scripts.
	Password {
		/// Account name.
		username: String,
		/// Account password.
		password: Secret,
	},
	/// Application-only grant for confidential clients.
	ClientCredentials,
	/// Application-only grant for installed clients that cannot keep a secret.
	InstalledClient {
		/// Unique per-device identifier (20 to 30 ASCII characters).
		device_id: String,
	},
}
impl Grant {
	/// Returns the `grant_type` form value.
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Password { .. } => "password",
			Self::ClientCredentials => "client_credentials",
			Self::InstalledClient { .. } => INSTALLED_CLIENT_GRANT,
		}
	}

	/// Grant-specific form fields, excluding `grant_type`.
	pub(crate) fn form_fields(&self) -> Vec<(&'static str, &str)> {
		match self {
			Self::Password { username, password } =>
				vec![("username", username.as_str()), ("password", password.expose())],
			Self::ClientCredentials => Vec::new(),
			Self::InstalledClient { device_id } => vec![("device_id", device_id.as_str())],
		}
	}
}
impl Debug for Grant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Password { username, .. } => f
				.debug_struct("Grant::Password")
				.field("username", username)
				.field("password", &"<redacted>")
				.finish(),
			Self::ClientCredentials => f.write_str("Grant::ClientCredentials"),
			Self::InstalledClient { device_id } =>
				f.debug_struct("Grant::InstalledClient").field("device_id", device_id).finish(),
		}
	}
}
impl Display for Grant {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// OAuth client identity plus the grant used to request tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
	/// OAuth client identifier.
	pub client_id: String,
	/// Client secret; installed clients have none.
	pub client_secret: Option<Secret>,
	/// Grant presented to the token endpoint.
	pub grant: Grant,
}
impl Credentials {
	/// Script-app credentials using the password grant.
	pub fn password(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
		username: impl Into<String>,
		password: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: Some(Secret::new(client_secret)),
			grant: Grant::Password {
				username: username.into(),
				password: Secret::new(password),
			},
		}
	}

	/// Application-only credentials for a confidential client.
	pub fn client_credentials(
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: Some(Secret::new(client_secret)),
			grant: Grant::ClientCredentials,
		}
	}

	/// Application-only credentials for an installed client.
	pub fn installed_client(client_id: impl Into<String>, device_id: impl Into<String>) -> Self {
		Self {
			client_id: client_id.into(),
			client_secret: None,
			grant: Grant::InstalledClient { device_id: device_id.into() },
		}
	}

	/// Sets or replaces the client secret.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(Secret::new(secret));

		self
	}

	/// Checks the credentials can be encoded into a token request.
	pub fn validate(&self) -> Result<(), ConfigError> {
		let invalid = |reason: &'static str| Err(ConfigError::InvalidCredentials { reason });

		if self.client_id.is_empty() {
			return invalid("client_id is empty");
		}
		if self.client_id.contains(':') || self.client_id.chars().any(char::is_whitespace) {
			return invalid("client_id contains ':' or whitespace");
		}

		match &self.grant {
			Grant::Password { username, password } => {
				if username.trim().is_empty() {
					return invalid("username is empty");
				}
				if password.is_empty() {
					return invalid("password is empty");
				}
			},
			Grant::ClientCredentials =>
				if self.client_secret.as_ref().is_none_or(Secret::is_empty) {
					return invalid("client_credentials requires a client secret");
				},
			Grant::InstalledClient { device_id } =>
				if !device_id.is_ascii() || !DEVICE_ID_LEN.contains(&device_id.len()) {
					return invalid("device_id must be 20 to 30 ASCII characters");
				},
		}

		Ok(())
	}

	/// Secret used for client authentication; empty when none is configured.
	pub(crate) fn secret_or_empty(&self) -> &str {
		self.client_secret.as_ref().map(Secret::expose).unwrap_or_default()
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Credentials")
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("grant", &self.grant)
			.finish()
	}
}
