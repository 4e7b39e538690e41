//! Token endpoint exchange: request encoding, transport error mapping, and response validation.
//!
//! Every response is treated as untrusted. The body is size-checked before it is parsed, the
//! status is inspected before the payload, and each token field is type-checked individually
//! so a hostile endpoint can never produce a cached token with an empty or oversized value.

pub use oauth2;

// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse,
	http::{
		HeaderValue, Method,
		header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, USER_AGENT},
	},
};
use serde_json::{Map, Value};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	auth::{AuthConfig, ClientAuthMethod, Credentials, Token},
	error::{ConfigError, RequestError, ValidationError, json_type},
	http::{RateLimit, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
};

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	///
	/// `metadata` carries whatever the transport recorded before failing (for example the
	/// status of a response whose body could not be read).
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_metadata: Option<&ResponseMetadata>,
		error: HttpClientError<ReqwestError>,
	) -> Error {
		match error {
			HttpClientError::Reqwest(inner) =>
				if inner.is_builder() {
					ConfigError::from(*inner).into()
				} else {
					RequestError::from(*inner).into()
				},
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => RequestError::from(inner).into(),
			HttpClientError::Other(message) => RequestError::Other { message }.into(),
			_ => RequestError::Other { message: "unrecognized transport failure".into() }.into(),
		}
	}
}

/// Result of a single round trip to the token endpoint.
#[derive(Debug)]
pub(crate) struct Exchange {
	pub(crate) token: Result<Token>,
	/// Present whenever a response head was received.
	pub(crate) rate_limit: Option<RateLimit>,
}

/// Performs one token request and validates the answer.
///
/// The returned future owns no locks; dropping it abandons the request.
pub(crate) async fn request_token<C, M>(
	config: &AuthConfig,
	credentials: &Credentials,
	http_client: &C,
	mapper: &M,
) -> Exchange
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let request = match build_request(config, credentials) {
		Ok(request) => request,
		Err(e) => return Exchange { token: Err(e), rate_limit: None },
	};
	let slot = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(slot.clone(), config.max_body_bytes);
	let issued_at = OffsetDateTime::now_utc();

	match handle.call(request).await {
		Ok(response) => Exchange {
			rate_limit: Some(RateLimit::from_headers(response.headers())),
			token: interpret_response(config, &response, issued_at),
		},
		Err(e) => Exchange {
			token: Err(mapper.map_transport_error(slot.take().as_ref(), e)),
			rate_limit: None,
		},
	}
}

/// Encodes the grant as a form-urlencoded `POST` against the configured endpoint.
pub(crate) fn build_request(config: &AuthConfig, credentials: &Credentials) -> Result<HttpRequest> {
	let mut builder = oauth2::http::Request::builder()
		.method(Method::POST)
		.uri(config.token_endpoint.as_str())
		.header(CONTENT_TYPE, "application/x-www-form-urlencoded")
		.header(ACCEPT, "application/json")
		.header(USER_AGENT, config.user_agent.as_str());

	if config.client_auth_method == ClientAuthMethod::Basic {
		builder = builder.header(AUTHORIZATION, basic_authorization(credentials)?);
	}

	let request =
		builder.body(form_body(config, credentials).into_bytes()).map_err(ConfigError::from)?;

	Ok(request)
}

fn form_body(config: &AuthConfig, credentials: &Credentials) -> String {
	let mut form = Serializer::new(String::new());

	form.append_pair("grant_type", credentials.grant.as_str());

	for (name, value) in credentials.grant.form_fields() {
		form.append_pair(name, value);
	}

	if config.client_auth_method == ClientAuthMethod::Post {
		form.append_pair("client_id", &credentials.client_id);

		if let Some(secret) = &credentials.client_secret {
			form.append_pair("client_secret", secret.expose());
		}
	}

	form.finish()
}

fn basic_authorization(credentials: &Credentials) -> Result<HeaderValue> {
	let pair = format!("{}:{}", credentials.client_id, credentials.secret_or_empty());
	let mut value = HeaderValue::try_from(format!("Basic {}", STANDARD.encode(pair)))
		.map_err(|e| ConfigError::from(oauth2::http::Error::from(e)))?;

	value.set_sensitive(true);

	Ok(value)
}

/// Applies the size ceiling, status check, and payload validation to a raw response.
pub(crate) fn interpret_response(
	config: &AuthConfig,
	response: &HttpResponse,
	issued_at: OffsetDateTime,
) -> Result<Token> {
	let limit = config.max_body_bytes;
	let declared = response
		.headers()
		.get(CONTENT_LENGTH)
		.and_then(|value| value.to_str().ok())
		.and_then(|value| value.trim().parse::<u64>().ok());

	if declared.is_some_and(|len| len > limit as u64) || response.body().len() > limit {
		return Err(Error::SizeLimitExceeded { subject: "response body", limit });
	}

	let status = response.status().as_u16();

	if !response.status().is_success() {
		return Err(provider_error(status, response.body()));
	}

	validate_token_response(config, status, response.body(), issued_at)
}

/// Validates a successful token response body and builds the resulting [`Token`].
pub fn validate_token_response(
	config: &AuthConfig,
	status: u16,
	body: &[u8],
	issued_at: OffsetDateTime,
) -> Result<Token> {
	let value = serde_json::from_slice::<Value>(body)
		.map_err(|e| ValidationError::MalformedJson { status, source: Arc::new(e) })?;
	let Value::Object(fields) = &value else {
		return Err(ValidationError::NotAnObject { found: json_type(&value) }.into());
	};

	if is_absent(fields.get("access_token")) && !is_absent(fields.get("error")) {
		return Err(provider_fields(status, fields));
	}

	let access_token = match fields.get("access_token") {
		None | Some(Value::Null) => return Err(ValidationError::MissingAccessToken.into()),
		Some(Value::String(token)) => token,
		Some(other) =>
			return Err(ValidationError::AccessTokenNotString { found: json_type(other) }.into()),
	};

	if access_token.len() > config.max_token_bytes {
		return Err(Error::SizeLimitExceeded {
			subject: "access token",
			limit: config.max_token_bytes,
		});
	}
	if access_token.trim().is_empty() {
		return Err(ValidationError::EmptyAccessToken.into());
	}
	if access_token.chars().any(char::is_control) {
		return Err(ValidationError::InvalidAccessToken.into());
	}

	let expires_in = expires_in_seconds(config, fields.get("expires_in"))?;
	let token_type = optional_string(fields, "token_type")?.filter(|kind| !kind.trim().is_empty());
	let scope = optional_string(fields, "scope")?;
	let mut builder = Token::builder()
		.access_token(access_token.as_str())
		.scope(scope)
		.issued_at(issued_at)
		.expires_in(Duration::seconds(expires_in));

	if let Some(token_type) = token_type {
		builder = builder.token_type(token_type);
	}

	Ok(builder.build().map_err(ValidationError::from)?)
}

fn expires_in_seconds(config: &AuthConfig, raw: Option<&Value>) -> Result<i64, ValidationError> {
	let max_seconds = config.max_expires_in.whole_seconds();
	let seconds = match raw {
		None | Some(Value::Null) => return Err(ValidationError::MissingExpiresIn),
		Some(Value::Number(number)) => match number.as_i64() {
			Some(seconds) => seconds,
			None if number.as_u64().is_some() =>
				return Err(ValidationError::ExpiresInOutOfRange { max_seconds }),
			None => return Err(ValidationError::ExpiresInNotInteger { found: "non-integer number" }),
		},
		Some(other) => return Err(ValidationError::ExpiresInNotInteger { found: json_type(other) }),
	};

	if seconds <= 0 {
		return Err(ValidationError::NonPositiveExpiresIn);
	}
	if seconds > max_seconds {
		return Err(ValidationError::ExpiresInOutOfRange { max_seconds });
	}

	Ok(seconds)
}

fn optional_string(
	fields: &Map<String, Value>,
	field: &'static str,
) -> Result<Option<String>, ValidationError> {
	match fields.get(field) {
		None | Some(Value::Null) => Ok(None),
		Some(Value::String(value)) => Ok(Some(value.clone())),
		Some(other) => Err(ValidationError::FieldNotString { field, found: json_type(other) }),
	}
}

fn is_absent(value: Option<&Value>) -> bool {
	matches!(value, None | Some(Value::Null))
}

/// Best-effort extraction of provider error fields from a failed response.
fn provider_error(status: u16, body: &[u8]) -> Error {
	match serde_json::from_slice::<Value>(body) {
		Ok(Value::Object(fields)) => provider_fields(status, &fields),
		_ => Error::Response { status, error: None, description: None },
	}
}

fn provider_fields(status: u16, fields: &Map<String, Value>) -> Error {
	let description = fields
		.get("error_description")
		.and_then(scalar_text)
		.or_else(|| fields.get("message").and_then(scalar_text));

	Error::Response { status, error: fields.get("error").and_then(scalar_text), description }
}

fn scalar_text(value: &Value) -> Option<String> {
	match value {
		Value::String(text) if !text.is_empty() => Some(text.clone()),
		Value::Number(number) => Some(number.to_string()),
		_ => None,
	}
}
