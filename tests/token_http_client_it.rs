// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	pin::Pin,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use futures::future;
use parking_lot::Mutex;
use time::Duration;
// self
use reddit_core::{
	auth::{AuthConfig, Authenticator, Credentials},
	error::{ConfigError, Error, RequestError},
	exchange::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	url::Url,
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone)]
enum Reply {
	Throttled { retry_after: Duration },
	Body { status: u16, body: Vec<u8> },
}

#[derive(Clone)]
struct FakeHttpClient {
	reply: Reply,
	delay: StdDuration,
	calls: Arc<AtomicUsize>,
	completed: Arc<AtomicUsize>,
	body_limits: Arc<Mutex<Vec<usize>>>,
}
impl FakeHttpClient {
	fn new(reply: Reply) -> Self {
		Self {
			reply,
			delay: StdDuration::ZERO,
			calls: Default::default(),
			completed: Default::default(),
			body_limits: Default::default(),
		}
	}

	fn ok(body: &str) -> Self {
		Self::new(Reply::Body { status: 200, body: body.as_bytes().to_vec() })
	}

	fn delayed(mut self, delay: StdDuration) -> Self {
		self.delay = delay;

		self
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn completed(&self) -> usize {
		self.completed.load(Ordering::SeqCst)
	}
}
impl TokenHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot, body_limit: usize) -> Self::Handle {
		self.body_limits.lock().push(body_limit);

		FakeHttpHandle { client: self.clone(), slot }
	}
}

struct FakeHttpHandle {
	client: FakeHttpClient,
	slot: ResponseMetadataSlot,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future = Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			assert!(
				self.slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			self.client.calls.fetch_add(1, Ordering::SeqCst);
			tokio::time::sleep(self.client.delay).await;
			self.client.completed.fetch_add(1, Ordering::SeqCst);

			match &self.client.reply {
				Reply::Throttled { retry_after } => {
					self.slot.store(ResponseMetadata {
						status: Some(429),
						retry_after: Some(*retry_after),
					});

					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)))
				},
				Reply::Body { status, body } => {
					self.slot.store(ResponseMetadata {
						status: Some(*status),
						retry_after: None,
					});

					let mut response = HttpResponse::new(body.clone());

					*response.status_mut() = (*status)
						.try_into()
						.expect("Fake status should be a valid HTTP status code.");

					Ok(response)
				},
			}
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	metadata: Arc<Mutex<Vec<Option<ResponseMetadata>>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded_metadata(&self) -> Vec<Option<ResponseMetadata>> {
		self.metadata.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		self.metadata.lock().push(meta.cloned());

		match err {
			HttpClientError::Reqwest(inner) => RequestError::network(*inner).into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => RequestError::from(inner).into(),
			other => RequestError::Other { message: format!("{other:?}") }.into(),
		}
	}
}

type FakeAuthenticator = Authenticator<FakeHttpClient, RecordingTransportErrorMapper>;

fn config() -> AuthConfig {
	AuthConfig::builder(
		Url::parse("https://www.example.com/api/v1/access_token")
			.expect("Fake token endpoint should parse."),
	)
	.user_agent("reddit-core-fake-transport/1.0")
	.build()
	.expect("Test config should build.")
}

fn authenticator(
	http_client: &FakeHttpClient,
	mapper: &RecordingTransportErrorMapper,
) -> FakeAuthenticator {
	Authenticator::with_http_client(
		config(),
		Credentials::client_credentials("fake-client", "fake-secret"),
		http_client.clone(),
		mapper.clone(),
	)
	.expect("Fake authenticator should build.")
}

#[tokio::test]
async fn transport_failures_reach_mapper_with_metadata() {
	let http_client = FakeHttpClient::new(Reply::Throttled { retry_after: Duration::seconds(30) });
	let mapper = RecordingTransportErrorMapper::default();
	let auth = authenticator(&http_client, &mapper);
	let err = auth.token().await.expect_err("Throttled transport should fail.");

	assert!(matches!(err, Error::Request(RequestError::Network { .. })));

	let observed = mapper.recorded_metadata();

	assert_eq!(observed.len(), 1, "Mapper must record a single request.");

	let meta = observed
		.first()
		.and_then(|value| value.clone())
		.expect("Response metadata should be recorded exactly once.");

	assert_eq!(meta.status, Some(429));
	assert_eq!(meta.retry_after, Some(Duration::seconds(30)));
	assert_eq!(auth.metrics().failures(), 1);
}

#[tokio::test]
async fn joined_callers_trigger_one_transport_call() {
	const CALLERS: usize = 64;

	let http_client =
		FakeHttpClient::ok(r#"{"access_token":"fake","expires_in":3600}"#)
			.delayed(StdDuration::from_millis(50));
	let mapper = RecordingTransportErrorMapper::default();
	let auth = authenticator(&http_client, &mapper);
	let results = future::join_all((0..CALLERS).map(|_| auth.token())).await;

	for result in results {
		assert_eq!(result.expect("Every caller should succeed.").access_token.expose(), "fake");
	}

	assert_eq!(http_client.calls(), 1);
	assert_eq!(auth.metrics().requests(), CALLERS as u64);
	assert_eq!(auth.metrics().coalesced(), CALLERS as u64 - 1);
	assert_eq!(auth.metrics().cache_hits(), 0);
}

#[tokio::test]
async fn joined_callers_share_one_failure() {
	let http_client = FakeHttpClient::new(Reply::Body { status: 500, body: b"oops".to_vec() })
		.delayed(StdDuration::from_millis(20));
	let mapper = RecordingTransportErrorMapper::default();
	let auth = authenticator(&http_client, &mapper);
	let (first, second) = tokio::join!(auth.token(), auth.token());

	assert_eq!(first.expect_err("First caller should fail.").status(), Some(500));
	assert_eq!(second.expect_err("Second caller should fail.").status(), Some(500));
	assert_eq!(http_client.calls(), 1);

	let _ = auth.token().await;

	assert_eq!(http_client.calls(), 2, "A failed cycle must not be reused.");
}

#[tokio::test]
async fn cancelling_the_first_caller_does_not_restart_the_exchange() {
	let http_client = FakeHttpClient::ok(r#"{"access_token":"shared","expires_in":3600}"#)
		.delayed(StdDuration::from_millis(300));
	let mapper = RecordingTransportErrorMapper::default();
	let auth = authenticator(&http_client, &mapper);
	let (first, joined) = tokio::join!(
		auth.token_with_cancel(tokio::time::sleep(StdDuration::from_millis(100))),
		auth.token(),
	);

	assert!(first.expect_err("First caller should be cancelled.").is_cancelled());
	assert_eq!(joined.expect("Joined caller should succeed.").access_token.expose(), "shared");
	assert_eq!(http_client.calls(), 1);
	assert_eq!(http_client.completed(), 1);
	assert_eq!(auth.metrics().coalesced(), 1);
}

#[tokio::test]
async fn exchange_is_dropped_with_its_last_caller() {
	let http_client = FakeHttpClient::ok(r#"{"access_token":"late","expires_in":3600}"#)
		.delayed(StdDuration::from_millis(200));
	let mapper = RecordingTransportErrorMapper::default();
	let auth = authenticator(&http_client, &mapper);
	let err = auth
		.token_with_cancel(tokio::time::sleep(StdDuration::from_millis(50)))
		.await
		.expect_err("Lone caller should be cancelled.");

	assert!(err.is_cancelled());

	tokio::time::sleep(StdDuration::from_millis(300)).await;

	assert_eq!(http_client.calls(), 1);
	assert_eq!(http_client.completed(), 0, "An abandoned exchange must not keep running.");
	assert!(auth.cached().is_none());

	let token = auth.token().await.expect("Next caller should start a new exchange.");

	assert_eq!(token.access_token.expose(), "late");
	assert_eq!(http_client.calls(), 2);
	assert_eq!(http_client.completed(), 1);
}

#[tokio::test]
async fn body_limit_is_forwarded_and_enforced() {
	let limit = config().max_body_bytes;
	let http_client = FakeHttpClient::new(Reply::Body { status: 200, body: vec![b' '; limit + 1] });
	let mapper = RecordingTransportErrorMapper::default();
	let auth = authenticator(&http_client, &mapper);
	let err = auth.token().await.expect_err("Oversized body should fail.");

	assert!(matches!(err, Error::SizeLimitExceeded { subject: "response body", .. }));
	assert_eq!(*http_client.body_limits.lock(), [limit]);
}

#[test]
fn malformed_credentials_are_rejected_up_front() {
	let http_client = FakeHttpClient::ok("{}");
	let result = FakeAuthenticator::with_http_client(
		config(),
		Credentials::password("bad:id", "secret", "alice", "pw"),
		http_client,
		RecordingTransportErrorMapper::default(),
	);

	assert!(matches!(result, Err(Error::Config(ConfigError::InvalidCredentials { .. }))));
}
