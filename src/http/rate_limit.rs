//! Best-effort parsing of the API's `X-Ratelimit-*` response headers.
//!
//! The API reports its request budget through three headers. Values are parsed
//! opportunistically: anything absent, non-numeric, negative, or non-finite maps to `None`,
//! which callers treat as "unknown".

// crates.io
use oauth2::http::HeaderMap;
// self
use crate::_prelude::*;

/// Remaining request budget header.
pub const RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
/// Consumed request budget header.
pub const RATELIMIT_USED: &str = "x-ratelimit-used";
/// Seconds until the budget window resets.
pub const RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Parsed rate-limit headers; `None` marks a missing or unparseable value.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RateLimit {
	/// Requests remaining in the current window (the API reports fractional values).
	pub remaining: Option<f64>,
	/// Requests consumed in the current window.
	pub used: Option<u64>,
	/// Time until the window resets.
	pub reset: Option<Duration>,
}
impl RateLimit {
	/// Parses the rate-limit headers from `headers`, never failing.
	pub fn from_headers(headers: &HeaderMap) -> Self {
		Self {
			remaining: header_number(headers, RATELIMIT_REMAINING),
			used: header_number(headers, RATELIMIT_USED).and_then(whole_number),
			reset: header_number(headers, RATELIMIT_RESET)
				.and_then(Duration::checked_seconds_f64),
		}
	}

	/// Returns `true` when none of the headers could be parsed.
	pub fn is_unknown(&self) -> bool {
		self.remaining.is_none() && self.used.is_none() && self.reset.is_none()
	}

	/// Returns `true` when the budget is known to be spent.
	pub fn is_exhausted(&self) -> bool {
		self.remaining.is_some_and(|remaining| remaining < 1.0)
	}
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<f64> {
	let raw = headers.get(name)?.to_str().ok()?.trim();
	let value = raw.parse::<f64>().ok()?;

	(value.is_finite() && value >= 0.0).then_some(value)
}

fn whole_number(value: f64) -> Option<u64> {
	// 2^53 keeps the conversion exact.
	(value.fract() == 0.0 && value <= 9_007_199_254_740_992.0).then_some(value as u64)
}

#[cfg(test)]
mod tests {
	// crates.io
	use oauth2::http::HeaderValue;
	// self
	use super::*;

	fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
		let mut map = HeaderMap::new();

		for (name, value) in pairs {
			map.insert(*name, HeaderValue::from_static(*value));
		}

		map
	}

	#[test]
	fn parses_well_formed_headers() {
		let parsed = RateLimit::from_headers(&headers(&[
			(RATELIMIT_REMAINING, "598.0"),
			(RATELIMIT_USED, "2"),
			(RATELIMIT_RESET, "345"),
		]));

		assert_eq!(parsed.remaining, Some(598.0));
		assert_eq!(parsed.used, Some(2));
		assert_eq!(parsed.reset, Some(Duration::seconds(345)));
		assert!(!parsed.is_exhausted());
	}

	#[test]
	fn hostile_values_become_unknown() {
		for value in ["-1", "NaN", "inf", "-Infinity", "1e999", "twelve", ""] {
			let parsed = RateLimit::from_headers(&headers(&[
				(RATELIMIT_REMAINING, value),
				(RATELIMIT_USED, value),
				(RATELIMIT_RESET, value),
			]));

			assert!(parsed.is_unknown(), "Value {value:?} should not parse.");
		}
	}

	#[test]
	fn absent_headers_are_unknown() {
		let parsed = RateLimit::from_headers(&HeaderMap::new());

		assert!(parsed.is_unknown());
		assert!(!parsed.is_exhausted());
	}

	#[test]
	fn fractional_usage_and_huge_resets_are_dropped() {
		let parsed = RateLimit::from_headers(&headers(&[
			(RATELIMIT_REMAINING, "0.4"),
			(RATELIMIT_USED, "2.5"),
			(RATELIMIT_RESET, "1e300"),
		]));

		assert_eq!(parsed.remaining, Some(0.4));
		assert_eq!(parsed.used, None);
		assert_eq!(parsed.reset, None);
		assert!(parsed.is_exhausted());
	}
}
