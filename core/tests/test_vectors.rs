//! Verify URL decomposition and header-block parsing against JSON test
//! vectors stored in `test-vectors/`.

use std::collections::BTreeMap;

use http_client_core::connection::ConnectionParams;
use http_client_core::response::parse_headers;
use http_client_core::url_parser;
use http_client_core::ErrorKind;

fn parse_kind(s: &str) -> ErrorKind {
    match s {
        "MalformedUrl" => ErrorKind::MalformedUrl,
        "UrlTooLong" => ErrorKind::UrlTooLong,
        other => panic!("unknown error kind: {other}"),
    }
}

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

#[test]
fn url_test_vectors() {
    let raw = include_str!("../../test-vectors/urls.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let url = case["url"].as_str().unwrap();
        let expected = &case["expected"];

        let c = url_parser::parse(url).unwrap_or_else(|e| panic!("{name}: {e}"));
        assert_eq!(c.scheme, expected["scheme"].as_str().unwrap(), "{name}: scheme");
        assert_eq!(c.host, expected["host"].as_str().unwrap(), "{name}: host");
        assert_eq!(u64::from(c.port), expected["port"].as_u64().unwrap(), "{name}: port");
        assert_eq!(c.path, expected["path"].as_str().unwrap(), "{name}: path");
        assert_eq!(c.extra, expected["extra"].as_str().unwrap(), "{name}: extra");

        let params = ConnectionParams::derive(&c);
        let conn = &case["connection"];
        assert_eq!(u64::from(params.port), conn["port"].as_u64().unwrap(), "{name}: resolved port");
        assert_eq!(params.secure, conn["secure"].as_bool().unwrap(), "{name}: secure");
    }

    for case in vectors["errors"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let err = url_parser::parse(case["url"].as_str().unwrap())
            .err()
            .unwrap_or_else(|| panic!("{name}: expected an error"));
        assert_eq!(err.kind(), parse_kind(case["kind"].as_str().unwrap()), "{name}: kind");
    }
}

// ---------------------------------------------------------------------------
// Header blocks
// ---------------------------------------------------------------------------

#[test]
fn header_test_vectors() {
    let raw = include_str!("../../test-vectors/headers.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let parsed = parse_headers(case["raw"].as_str().unwrap());
        let expected: BTreeMap<String, String> =
            serde_json::from_value(case["expected"].clone()).unwrap();
        assert_eq!(parsed, expected, "{name}");
    }
}
