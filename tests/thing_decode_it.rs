// crates.io
use color_eyre::{Result, eyre::eyre};
// self
use reddit_core::{
	error::Error,
	thing::{self, DecodeError, Decoder, Edited, Kind, MoreChild, Thing},
};

const THREAD: &str = r#"{
	"kind": "Listing",
	"data": {
		"after": "t1_after",
		"before": null,
		"dist": 2,
		"children": [
			{
				"kind": "t1",
				"data": {
					"id": "c1",
					"name": "t1_c1",
					"author": "alice",
					"body": "top level",
					"score": 42,
					"created_utc": 1700000000.0,
					"edited": 1700000100.5,
					"parent_id": "t3_post",
					"link_id": "t3_post",
					"subreddit": "rust",
					"replies": {
						"kind": "Listing",
						"data": {
							"after": null,
							"before": null,
							"children": [
								{
									"kind": "t1",
									"data": {
										"id": "c2",
										"name": "t1_c2",
										"author": "bob",
										"body": "nested",
										"score": -3,
										"edited": false,
										"parent_id": "t1_c1",
										"replies": ""
									}
								},
								{
									"kind": "more",
									"data": {
										"id": "m1",
										"name": "t1_m1",
										"parent_id": "t1_c1",
										"count": 3,
										"depth": 1,
										"children": ["c3", "c4", "c5"]
									}
								}
							]
						}
					}
				}
			},
			{
				"kind": "t3",
				"data": {
					"id": "post",
					"name": "t3_post",
					"title": "Hello",
					"num_comments": 5,
					"is_self": true,
					"edited": true
				}
			}
		]
	}
}"#;

#[test]
fn thread_fixture_decodes_exactly() -> Result<()> {
	let listing = thing::decode_listing(THREAD)?;

	assert_eq!(listing.after.as_deref(), Some("t1_after"));
	assert_eq!(listing.before, None);
	assert_eq!(listing.dist, Some(2));
	assert_eq!(listing.children.len(), 2);

	let top = listing.children[0].as_comment().ok_or_else(|| eyre!("first child is a comment"))?;

	assert_eq!(top.author, "alice");
	assert_eq!(top.score, 42);
	assert_eq!(top.edited, Edited::At(1_700_000_100.5));
	assert_eq!(top.more_children_ids, ["c3", "c4", "c5"]);

	let replies = top.replies.as_ref().ok_or_else(|| eyre!("top comment has replies"))?;
	let nested = replies.comments().collect::<Vec<_>>();

	assert_eq!(replies.children.len(), 1);
	assert_eq!(nested.len(), 1);
	assert_eq!(nested[0].id, "c2");
	assert_eq!(nested[0].score, -3);
	assert_eq!(nested[0].edited, Edited::Never);
	assert!(nested[0].replies.is_none());

	let link = listing.children[1].as_link().ok_or_else(|| eyre!("second child is a link"))?;

	assert_eq!(listing.children[1].fullname(), Some("t3_post"));
	assert_eq!(link.num_comments, 5);
	assert_eq!(link.edited, Edited::Unknown);
	assert_eq!(listing.links().count(), 1);

	Ok(())
}

#[test]
fn decoding_is_idempotent() -> Result<()> {
	let decoder = Decoder::new();
	let first = decoder.decode(THREAD)?;
	let second = decoder.decode(THREAD)?;

	assert_eq!(first, second);
	assert_eq!(first.kind(), Kind::Listing);
	assert_eq!(Thing::Listing(thing::decode_listing(THREAD)?), first);

	let via_serde = serde_json::from_str::<Thing>(THREAD)?;

	assert_eq!(via_serde, first);

	Ok(())
}

#[test]
fn malformed_things_are_rejected() {
	let cases: &[(&str, fn(&DecodeError) -> bool)] = &[
		(r#"{"data":{"id":"x"}}"#, |e| matches!(e, DecodeError::MissingKind { .. })),
		(r#"{"kind":"t1","data":"x"}"#, |e| {
			matches!(e, DecodeError::DataNotObject { found: "string", .. })
		}),
		(r#"{"kind":"t1","data":null}"#, |e| {
			matches!(e, DecodeError::DataNotObject { found: "null", .. })
		}),
		(r#"{"kind":"t7","data":{"id":"x"}}"#, |e| {
			matches!(e, DecodeError::UnknownKind { kind, .. } if kind == "t7")
		}),
		(r#"{"kind":"t1","data":{"name":"no id"}}"#, |e| {
			matches!(e, DecodeError::InvalidField { path, .. } if path == "data")
		}),
		(r#"{"kind":"t1","data":{"id":"x","score":"high"}}"#, |e| {
			matches!(e, DecodeError::InvalidField { path, .. } if path == "data.score")
		}),
		(r#"[]"#, |e| matches!(e, DecodeError::NotAnObject { found: "array", .. })),
		(r#"{"kind":"t1","data":{"#, |e| matches!(e, DecodeError::MalformedJson { .. })),
	];

	for (raw, expected) in cases {
		let err = thing::decode(raw).expect_err("Malformed Thing should fail.");

		assert!(expected(&err), "unexpected error for {raw}: {err:?}");
	}
}

#[test]
fn malformed_listings_are_rejected() {
	let cases: &[(&str, fn(&DecodeError) -> bool)] = &[
		(r#"{"kind":"Listing","data":{"children":{}}}"#, |e| {
			matches!(e, DecodeError::InvalidField { path, .. } if path == "data.children")
		}),
		(r#"{"kind":"t1","data":{"id":"x"}}"#, |e| {
			matches!(e, DecodeError::UnexpectedKind { expected: "Listing", found: "t1", .. })
		}),
		(
			r#"{"kind":"Listing","data":{"children":[{"kind":"t1","data":{"id":"ok"}},{"kind":"t3","data":[]}]}}"#,
			|e| matches!(e, DecodeError::DataNotObject { path, .. } if path == "data.children[1]"),
		),
		(r#"{"kind":"Listing","data":{"children":[],"after":7}}"#, |e| {
			matches!(e, DecodeError::InvalidField { path, .. } if path == "data.after")
		}),
		(r#"{"kind":"Listing","data":{"children":[],"dist":-1}}"#, |e| {
			matches!(e, DecodeError::InvalidField { path, .. } if path == "data.dist")
		}),
	];

	for (raw, expected) in cases {
		let err = thing::decode_listing(raw).expect_err("Malformed Listing should fail.");

		assert!(expected(&err), "unexpected error for {raw}: {err:?}");
	}
}

#[test]
fn mixed_listing_children_keep_order() -> Result<()> {
	let listing = thing::decode_listing(
		r#"{"kind":"Listing","data":{"children":[
			{"kind":"t3","data":{"id":"l1"}},
			{"kind":"t1","data":{"id":"c1"}},
			{"kind":"t2","data":{"id":"u1","name":"someone"}},
			{"kind":"t5","data":{"id":"s1","display_name":"rust"}},
			{"kind":"more","data":{"id":"m1","children":["a"]}}
		]}}"#,
	)?;
	let kinds = listing.children.iter().map(Thing::kind).collect::<Vec<_>>();

	assert_eq!(kinds, [Kind::Link, Kind::Comment, Kind::Account, Kind::Subreddit, Kind::More]);
	assert_eq!(listing.comments().count(), 1);

	Ok(())
}

#[test]
fn more_children_response_decodes() -> Result<()> {
	let response = thing::decode_more_children(
		r#"{"json":{"errors":[],"data":{"things":[
			{"kind":"t1","data":{"id":"c3","body":"loaded","parent_id":"t1_c1"}},
			"c9",
			{"kind":"more","data":{"id":"m2","parent_id":"t1_c3","count":2,"children":["d1","d2"]}}
		]}}}"#,
	)?;

	assert!(response.errors.is_empty());
	assert_eq!(response.things.len(), 3);
	assert!(matches!(&response.things[1], MoreChild::Id(id) if id == "c9"));
	assert_eq!(response.ids(), ["c9", "d1", "d2"]);
	assert_eq!(response.comments().map(|c| c.id.as_str()).collect::<Vec<_>>(), ["c3"]);

	Ok(())
}

#[test]
fn more_children_errors_are_distinct() {
	let decoder = Decoder::default();

	assert!(matches!(
		decoder.decode_more_children(r#"{"data":{}}"#),
		Err(DecodeError::MissingJson { found: "missing" })
	));
	assert!(matches!(
		decoder.decode_more_children(r#"{"json":{"errors":[]}}"#),
		Err(DecodeError::MissingData { found: "missing" })
	));
	assert!(matches!(
		decoder.decode_more_children(r#"{"json":{"data":{"things":{}}}}"#),
		Err(DecodeError::ThingsNotArray { found: "object" })
	));
	assert!(matches!(
		decoder.decode_more_children(r#"{"json":{"errors":"bad","data":{"things":[]}}}"#),
		Err(DecodeError::ErrorsNotArray { found: "string" })
	));
	assert!(matches!(
		decoder.decode_more_children(r#"{"json":{"data":{"things":[42]}}}"#),
		Err(DecodeError::InvalidMoreChild { found: "number", .. })
	));
	assert!(matches!(
		decoder.decode_more_children(r#"{"json":{"data":{"things":[{"kind":"t1"}]}}}"#),
		Err(DecodeError::DataNotObject { .. })
	));
}

#[test]
fn more_children_api_errors_surface() -> Result<()> {
	let err = thing::decode_more_children(
		r#"{"json":{"errors":[["RATELIMIT","you are doing that too much","ratelimit"]]}}"#,
	)
	.expect_err("Errors without data should fail.");
	let DecodeError::Api { errors } = &err else {
		return Err(eyre!("expected an API error, got {err:?}"));
	};

	assert_eq!(errors.len(), 1);
	assert_eq!(errors[0].code, "RATELIMIT");
	assert_eq!(errors[0].field.as_deref(), Some("ratelimit"));

	let wrapped = Error::from(err);

	assert!(wrapped.to_string().contains("RATELIMIT"));

	let partial = thing::decode_more_children(
		r#"{"json":{"errors":[["TOO_LONG",null,null]],"data":{"things":[]}}}"#,
	)?;

	assert_eq!(partial.errors.len(), 1);
	assert_eq!(partial.errors[0].message, None);

	Ok(())
}

#[test]
fn deep_nesting_is_bounded() {
	let mut raw = r#"{"kind":"t1","data":{"id":"leaf"}}"#.to_owned();

	for i in 0..20 {
		raw = format!(
			r#"{{"kind":"t1","data":{{"id":"c{i}","replies":{{"kind":"Listing","data":{{"children":[{raw}]}}}}}}}}"#
		);
	}

	assert!(matches!(
		thing::decode(&raw),
		Err(DecodeError::DepthExceeded { limit: thing::DEFAULT_MAX_DEPTH, .. })
	));
}
