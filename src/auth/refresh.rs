//! Single-flight refresh orchestration.
//!
//! The state mutex guards two decisions only: "is the cached token fresh, and if not, which
//! refresh do I join?" and "install this refresh's result". It is never held across an
//! `.await`. A refresh is one boxed exchange future behind [`Shared`]; every caller, including
//! the one that started it, awaits its own clone. The state keeps only a weak handle, so the
//! exchange is dropped as soon as the last waiting caller goes away.

// std
use std::pin::pin;
// crates.io
use futures::{
	FutureExt,
	future::{self, BoxFuture, Either, Shared, WeakShared},
};
// self
use crate::{
	_prelude::*,
	auth::{Authenticator, Token},
	error::RequestError,
	exchange::{self, Exchange, TransportErrorMapper},
	http::{RateLimit, TokenHttpClient},
	obs::{FlowKind, FlowOutcome, FlowRecord, FlowSpan},
};

type RefreshFuture = BoxFuture<'static, Result<Token>>;

/// Mutable state shared by every clone of an authenticator.
#[derive(Default)]
pub(super) struct AuthState {
	pub(super) current: Option<Token>,
	inflight: Option<InFlight>,
	cycles: u64,
	pub(super) rate_limit: Option<RateLimit>,
}

struct InFlight {
	cycle: u64,
	refresh: WeakShared<RefreshFuture>,
}

enum Lookup {
	Cached(Token),
	Join(Shared<RefreshFuture>),
}

impl<C, M> Authenticator<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Returns a bearer token that stays valid for at least the configured skew.
	///
	/// Dropping the returned future cancels this caller's wait only. The exchange keeps
	/// running for the remaining callers and is abandoned once none is left.
	pub async fn token(&self) -> Result<Token> {
		self.token_with_cancel(future::pending::<()>()).await
	}

	/// Like [`Authenticator::token`], but returns [`RequestError::Cancelled`] as soon as
	/// `cancel` completes.
	///
	/// Cancelling one caller never fails or restarts the refresh for other waiters.
	pub async fn token_with_cancel<F>(&self, cancel: F) -> Result<Token>
	where
		F: Future,
	{
		const KIND: FlowKind = FlowKind::Token;

		let record = FlowRecord::start(KIND);
		let result = FlowSpan::new(KIND, "token")
			.instrument(async move {
				self.inner.metrics.record_request();

				let refresh = match self.lookup(OffsetDateTime::now_utc()) {
					Lookup::Cached(token) => return Ok(token),
					Lookup::Join(refresh) => refresh,
				};
				let cancel = pin!(cancel);

				match future::select(refresh, cancel).await {
					Either::Left((result, _)) => result,
					Either::Right(_) => Err(RequestError::Cancelled.into()),
				}
			})
			.await;

		record.finish(FlowOutcome::of_auth(&result));

		result
	}

	fn lookup(&self, now: OffsetDateTime) -> Lookup {
		let inner = &self.inner;
		let mut state = inner.state.lock();

		if let Some(token) = state.current.as_ref().filter(|t| t.is_fresh_at(now, inner.config.skew))
		{
			inner.metrics.record_cache_hit();

			return Lookup::Cached(token.clone());
		}
		if let Some(refresh) = state.inflight.as_ref().and_then(|f| f.refresh.upgrade()) {
			inner.metrics.record_coalesced();

			return Lookup::Join(refresh);
		}

		state.cycles += 1;

		let cycle = state.cycles;
		let refresh = self.clone().refresh(cycle).boxed().shared();

		state.inflight = refresh.downgrade().map(|refresh| InFlight { cycle, refresh });

		Lookup::Join(refresh)
	}

	async fn refresh(self, cycle: u64) -> Result<Token> {
		const KIND: FlowKind = FlowKind::Refresh;

		let inner = &self.inner;
		let record = FlowRecord::start(KIND);

		#[cfg(feature = "tracing")]
		tracing::debug!(grant = %inner.credentials.grant, cycle, "requesting access token");

		let exchange = FlowSpan::new(KIND, "refresh")
			.instrument(exchange::request_token(
				&inner.config,
				&inner.credentials,
				inner.http_client.as_ref(),
				inner.transport_mapper.as_ref(),
			))
			.await;

		self.settle(cycle, &exchange);
		record.finish(FlowOutcome::of(&exchange.token));

		exchange.token
	}

	/// Installs the outcome of `cycle` and retires it so later callers start a new one.
	fn settle(&self, cycle: u64, exchange: &Exchange) {
		let inner = &self.inner;
		let mut state = inner.state.lock();

		if state.inflight.as_ref().is_some_and(|current| current.cycle == cycle) {
			state.inflight = None;
		}
		if exchange.rate_limit.is_some() {
			state.rate_limit = exchange.rate_limit;
		}

		match &exchange.token {
			Ok(token) => {
				inner.metrics.record_success();

				#[cfg(feature = "tracing")]
				tracing::debug!(expires_at = %token.expires_at, "access token refreshed");

				state.current = Some(token.clone());
			},
			Err(e) => {
				inner.metrics.record_failure();

				#[cfg(feature = "tracing")]
				tracing::warn!(error = %e, "access token refresh failed");
				#[cfg(not(feature = "tracing"))]
				let _ = e;
			},
		}
	}
}
