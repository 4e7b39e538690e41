//! Crate-level error types shared by the authenticator, the transport seam, and the decoder.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Shared, cloneable handle to an underlying error source.
///
/// A single refresh result is handed to every caller that joined the refresh cycle, so every
/// error type reachable from [`Error`] must be `Clone`.
pub type SharedError = Arc<dyn StdError + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Clone, Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure or cancellation while contacting the token endpoint.
	#[error(transparent)]
	Request(#[from] RequestError),
	/// Token endpoint answered with a non-success status or an OAuth error payload.
	#[error("Token endpoint rejected the request with HTTP {status}{}.", describe_provider(.error.as_deref(), .description.as_deref()))]
	Response {
		/// HTTP status code returned by the token endpoint.
		status: u16,
		/// Provider-supplied error code, when present.
		error: Option<String>,
		/// Provider-supplied error description or message, when present.
		description: Option<String>,
	},
	/// Token endpoint answered with a structurally present but invalid payload.
	#[error(transparent)]
	Validation(#[from] ValidationError),
	/// Thing, Listing, or MoreChildren payload could not be decoded.
	#[error(transparent)]
	Decode(#[from] crate::thing::DecodeError),
	/// A response body or token value exceeded its configured ceiling.
	#[error("The {subject} exceeds the {limit}-byte limit.")]
	SizeLimitExceeded {
		/// What exceeded the limit (`response body`, `access token`).
		subject: &'static str,
		/// Configured ceiling in bytes.
		limit: usize,
	},
}
impl Error {
	/// Returns `true` when the error was caused by caller cancellation.
	pub fn is_cancelled(&self) -> bool {
		matches!(self, Self::Request(RequestError::Cancelled))
	}

	/// Returns the HTTP status associated with the failure, when one is known.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Response { status, .. } => Some(*status),
			Self::Validation(ValidationError::MalformedJson { status, .. }) => Some(*status),
			_ => None,
		}
	}
}

/// Configuration and validation failures raised before any request is sent.
#[derive(Clone, Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: SharedError,
	},
	/// HTTP request construction failed.
	#[error("Token request could not be constructed.")]
	HttpRequest {
		/// Underlying `http` crate failure.
		#[source]
		source: Arc<oauth2::http::Error>,
	},
	/// Token endpoint URL cannot be parsed.
	#[error("Token endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token endpoint must use HTTPS (plain HTTP is allowed for loopback hosts only).
	#[error("The token endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Endpoint URL that failed validation.
		url: String,
	},
	/// The `User-Agent` string is empty or contains control characters.
	#[error("User agent must be non-empty printable text.")]
	InvalidUserAgent,
	/// A size or duration limit is zero, negative, or inconsistent.
	#[error("Invalid {setting} setting: {reason}.")]
	InvalidLimit {
		/// Name of the offending setting.
		setting: &'static str,
		/// Why the value was rejected.
		reason: &'static str,
	},
	/// Credentials are malformed.
	#[error("Credentials are invalid: {reason}.")]
	InvalidCredentials {
		/// Why the credentials were rejected.
		reason: &'static str,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::HttpClientBuild { source: Arc::new(src) }
	}
}
impl From<oauth2::http::Error> for ConfigError {
	fn from(e: oauth2::http::Error) -> Self {
		Self::HttpRequest { source: Arc::new(e) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO, cancellation).
#[derive(Clone, Debug, ThisError)]
pub enum RequestError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: SharedError,
	},
	/// The transport gave up waiting for the token endpoint.
	#[error("Request timed out while calling the token endpoint.")]
	Timeout,
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[source] Arc<std::io::Error>),
	/// The caller cancelled the request before a result was available.
	#[error("Token request was cancelled.")]
	Cancelled,
	/// Any other transport failure reported as text.
	#[error("HTTP client error occurred while calling the token endpoint: {message}.")]
	Other {
		/// Transport-supplied message.
		message: String,
	},
}
impl RequestError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Arc::new(src) }
	}
}
impl From<std::io::Error> for RequestError {
	fn from(e: std::io::Error) -> Self {
		Self::Io(Arc::new(e))
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for RequestError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::Timeout } else { Self::network(e) }
	}
}

/// Semantically invalid token endpoint payloads.
#[derive(Clone, Debug, ThisError)]
pub enum ValidationError {
	/// Body was not parseable JSON (truncated, invalid, `NaN`, ...).
	#[error("Token endpoint returned malformed JSON (HTTP {status}).")]
	MalformedJson {
		/// HTTP status code of the response.
		status: u16,
		/// Structured parsing failure.
		#[source]
		source: Arc<serde_json::Error>,
	},
	/// Top-level JSON value was not an object.
	#[error("Token endpoint returned a JSON {found} instead of an object.")]
	NotAnObject {
		/// JSON type that was found.
		found: &'static str,
	},
	/// `access_token` is absent or null.
	#[error("Token endpoint response is missing access_token.")]
	MissingAccessToken,
	/// `access_token` is not a string.
	#[error("The access_token field must be a string, found {found}.")]
	AccessTokenNotString {
		/// JSON type that was found.
		found: &'static str,
	},
	/// `access_token` is empty or whitespace only.
	#[error("The access_token field is empty.")]
	EmptyAccessToken,
	/// `access_token` contains control characters and cannot be sent as a header.
	#[error("The access_token field contains control characters.")]
	InvalidAccessToken,
	/// `expires_in` is absent or null.
	#[error("Token endpoint response is missing expires_in.")]
	MissingExpiresIn,
	/// `expires_in` is not a JSON integer.
	#[error("The expires_in field must be an integer, found {found}.")]
	ExpiresInNotInteger {
		/// JSON type (or `non-integer number`) that was found.
		found: &'static str,
	},
	/// `expires_in` is zero or negative.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
	/// `expires_in` exceeds the configured maximum lifetime.
	#[error("The expires_in value exceeds the supported maximum of {max_seconds} seconds.")]
	ExpiresInOutOfRange {
		/// Configured maximum, in seconds.
		max_seconds: i64,
	},
	/// An optional string field carried a different JSON type.
	#[error("The {field} field must be a string when present, found {found}.")]
	FieldNotString {
		/// Field name.
		field: &'static str,
		/// JSON type that was found.
		found: &'static str,
	},
	/// The token could not be assembled from the validated fields.
	#[error("Unable to build token.")]
	TokenBuild(#[from] crate::auth::TokenBuilderError),
}

/// Returns a short, stable name for the JSON type of `value`.
pub fn json_type(value: &serde_json::Value) -> &'static str {
	match value {
		serde_json::Value::Null => "null",
		serde_json::Value::Bool(_) => "boolean",
		serde_json::Value::Number(_) => "number",
		serde_json::Value::String(_) => "string",
		serde_json::Value::Array(_) => "array",
		serde_json::Value::Object(_) => "object",
	}
}

fn describe_provider(error: Option<&str>, description: Option<&str>) -> String {
	match (error, description) {
		(Some(error), Some(description)) => format!(": {error} ({description})"),
		(Some(error), None) => format!(": {error}"),
		(None, Some(description)) => format!(": {description}"),
		(None, None) => String::new(),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn response_error_display_includes_provider_fields() {
		let err = Error::Response {
			status: 401,
			error: Some("invalid_grant".into()),
			description: Some("bad password".into()),
		};

		assert_eq!(
			err.to_string(),
			"Token endpoint rejected the request with HTTP 401: invalid_grant (bad password)."
		);
		assert_eq!(err.status(), Some(401));

		let bare = Error::Response { status: 503, error: None, description: None };

		assert_eq!(bare.to_string(), "Token endpoint rejected the request with HTTP 503.");
	}

	#[test]
	fn cancellation_is_detectable_and_cloneable() {
		let err: Error = RequestError::Cancelled.into();
		let copy = err.clone();

		assert!(err.is_cancelled());
		assert!(copy.is_cancelled());
		assert!(!Error::from(RequestError::Timeout).is_cancelled());
	}

	#[test]
	fn io_errors_keep_their_source() {
		let err: Error = RequestError::from(std::io::Error::other("socket closed")).into();
		let source = StdError::source(&err).expect("Request error should expose its IO source.");

		assert_eq!(source.to_string(), "socket closed");
	}
}
