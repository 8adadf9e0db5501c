//! Property tests for HTTP <-> CoAP translation

use bytes::Bytes;
use cuttlefish_core::{Method, StatusClass};
use cuttlefish_translate::{extract_proxy_target, Translator, UriTemplate};
use http::StatusCode;
use proptest::prelude::*;

const MAPPED_VERBS: &[&str] = &["GET", "POST", "PUT", "DELETE", "HEAD", "PATCH"];

const KNOWN_CONTENT_TYPES: &[&str] = &[
    "text/plain",
    "text/html",
    "image/png",
    "application/json",
    "application/xml",
    "application/link-format",
    "application/cbor",
    "application/octet-stream",
];

fn arb_method() -> impl Strategy<Value = Method> {
    prop_oneof![
        Just(Method::Get),
        Just(Method::Post),
        Just(Method::Put),
        Just(Method::Delete),
        Just(Method::Patch),
    ]
}

#[test]
fn test_http_status_round_trip_keeps_class() {
    let translator = Translator::default();

    for (http, coap) in translator.tables().http_to_coap_pairs() {
        let Some(class) = StatusClass::of_http(http) else {
            continue;
        };
        let back = translator
            .status_coap_to_http(coap)
            .expect("every tabled CoAP code maps back");
        assert_eq!(
            StatusClass::of_http(back),
            Some(class),
            "{http} -> {coap} -> {back}"
        );
    }
}

proptest! {
    #[test]
    fn test_coap_status_round_trip_keeps_class(method in arb_method()) {
        let translator = Translator::default();

        for (coap, http) in translator.tables().coap_to_http_pairs() {
            let back = translator.status_http_to_coap(http, method).unwrap();
            prop_assert_eq!(back.class(), coap.class(), "{} -> {} -> {}", coap, http, back);
        }
    }

    #[test]
    fn test_no_content_is_changed_unless_delete(method in arb_method()) {
        let coap = Translator::default()
            .status_http_to_coap(StatusCode::NO_CONTENT, method)
            .unwrap();
        let expected = if method == Method::Delete {
            cuttlefish_core::CoapStatus::Deleted
        } else {
            cuttlefish_core::CoapStatus::Changed
        };
        prop_assert_eq!(coap, expected);
    }

    #[test]
    fn test_unmapped_verbs_fail_naming_the_verb(
        verb in "[A-Z]{3,10}".prop_filter("mapped verb", |v| !MAPPED_VERBS.contains(&v.as_str())),
    ) {
        let request = http::Request::builder()
            .method(verb.as_str())
            .uri("/hc/coap://coap.example.com/resource")
            .body(Bytes::new())
            .unwrap();
        let template = UriTemplate::parse("hc/{+tu}").unwrap();

        let err = Translator::default()
            .build_coap_request(&request, &template, false)
            .unwrap_err();
        prop_assert!(err.is_translation());
        prop_assert!(err.to_string().contains(&verb));
    }

    #[test]
    fn test_content_type_parameters_are_ignored(
        index in 0..KNOWN_CONTENT_TYPES.len(),
        param in "[a-z]{1,8}=[a-zA-Z0-9-]{1,12}",
    ) {
        let translator = Translator::default();
        let bare = KNOWN_CONTENT_TYPES[index];
        let with_params = format!("{bare}; {param}");

        prop_assert_eq!(
            translator.media_type_from_http_content_type(Some(&with_params)),
            translator.media_type_from_http_content_type(Some(bare))
        );
    }

    #[test]
    fn test_extracted_target_matches_bound_value(
        scheme in prop_oneof![Just("coap"), Just("coaps")],
        host in "[a-z][a-z0-9]{0,11}",
        port in proptest::option::of(1u16..=65535),
        segments in proptest::collection::vec("[a-zA-Z0-9_-]{1,8}", 0..4),
    ) {
        let authority = match port {
            Some(port) => format!("{host}:{port}"),
            None => host,
        };
        let target = format!("{scheme}://{authority}/{}", segments.join("/"));
        let template = UriTemplate::parse("hc/{+tu}").unwrap();

        let uri = extract_proxy_target(&format!("/hc/{target}"), &template).unwrap();
        prop_assert_eq!(uri.scheme(), scheme);
        prop_assert_eq!(uri.path(), format!("/{}", segments.join("/")));
    }
}
