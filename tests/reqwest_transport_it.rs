// std
use std::{
	iter,
	time::{Duration as StdDuration, Instant},
};
// crates.io
use color_eyre::Result;
use tokio::{
	io::{AsyncReadExt, AsyncWriteExt},
	net::{TcpListener, TcpStream},
};
// self
use reddit_core::{
	auth::{AuthConfig, Credentials, ReqwestAuthenticator},
	error::Error,
	url::Url,
};

const TOKEN_PATH: &str = "/api/v1/access_token";
const CHUNK_BYTES: usize = 64 * 1024;

type Chunks = Box<dyn Iterator<Item = Vec<u8>> + Send>;

/// Serves one request with a `Transfer-Encoding: chunked` response, so no `Content-Length` is
/// ever sent.
async fn spawn_chunked_endpoint(chunks: Chunks) -> Result<Url> {
	let listener = TcpListener::bind("127.0.0.1:0").await?;
	let url = Url::parse(&format!("http://{}{TOKEN_PATH}", listener.local_addr()?))?;

	tokio::spawn(async move {
		let Ok((mut stream, _)) = listener.accept().await else {
			return;
		};

		if read_request(&mut stream).await.is_err() {
			return;
		}

		let head = b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ntransfer-encoding: chunked\r\nconnection: close\r\n\r\n";

		if stream.write_all(head).await.is_err() {
			return;
		}

		for chunk in chunks {
			let frame = [format!("{:x}\r\n", chunk.len()).into_bytes(), chunk, b"\r\n".to_vec()].concat();

			// The client hangs up once it has read enough.
			if stream.write_all(&frame).await.is_err() {
				return;
			}
		}

		let _ = stream.write_all(b"0\r\n\r\n").await;
		let _ = stream.shutdown().await;
	});

	Ok(url)
}

async fn read_request(stream: &mut TcpStream) -> std::io::Result<()> {
	let mut request = Vec::new();
	let mut buf = [0_u8; 4096];

	loop {
		let read = stream.read(&mut buf).await?;

		if read == 0 {
			return Ok(());
		}

		request.extend_from_slice(&buf[..read]);

		let Some(head_end) = request.windows(4).position(|w| w == b"\r\n\r\n") else {
			continue;
		};
		let head = String::from_utf8_lossy(&request[..head_end]).to_ascii_lowercase();
		let body_len = head
			.lines()
			.find_map(|line| line.strip_prefix("content-length:"))
			.and_then(|value| value.trim().parse::<usize>().ok())
			.unwrap_or(0);

		if request.len() >= head_end + 4 + body_len {
			return Ok(());
		}
	}
}

fn authenticator(url: Url) -> Result<ReqwestAuthenticator> {
	let config = AuthConfig::builder(url).user_agent("reddit-core-chunked/1.0").build()?;

	Ok(ReqwestAuthenticator::new(
		config,
		Credentials::client_credentials("chunked-client", "chunked-secret"),
	)?)
}

#[tokio::test]
async fn chunked_token_response_is_accepted() -> Result<()> {
	let body = br#"{"access_token":"chunked","token_type":"bearer","expires_in":3600}"#;
	let chunks = body.chunks(16).map(<[u8]>::to_vec).collect::<Vec<_>>();
	let url = spawn_chunked_endpoint(Box::new(chunks.into_iter())).await?;
	let token = authenticator(url)?.token().await?;

	assert_eq!(token.access_token.expose(), "chunked");

	Ok(())
}

#[tokio::test]
async fn unbounded_chunked_body_is_cut_off_at_the_limit() -> Result<()> {
	// 64 MiB of chunks against a 1 MiB ceiling.
	let filler = iter::repeat_n(vec![b'a'; CHUNK_BYTES], 1_024);
	let chunks = iter::once(br#"{"access_token":""#.to_vec()).chain(filler);
	let url = spawn_chunked_endpoint(Box::new(chunks)).await?;
	let auth = authenticator(url)?;
	let limit = auth.config().max_body_bytes;
	let started = Instant::now();
	let result = tokio::time::timeout(StdDuration::from_secs(5), auth.token())
		.await
		.expect("Chunked body should be cut off within five seconds.");

	assert!(matches!(
		result,
		Err(Error::SizeLimitExceeded { subject: "response body", limit: l }) if l == limit
	));
	assert!(started.elapsed() < StdDuration::from_secs(5));

	Ok(())
}
