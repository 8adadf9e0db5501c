//! Static mapping tables between the HTTP and CoAP vocabularies.
//!
//! The tables follow draft-castellani-core-http-mapping and RFC 8075. They
//! are built once and never mutated, so they can be shared freely between
//! threads.

use cuttlefish_core::{CoapStatus, MediaType, Method, OptionType};
use http::header::{self, HeaderName};
use http::StatusCode;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;

static SHARED: Lazy<Arc<TranslationTables>> = Lazy::new(|| Arc::new(TranslationTables::new()));

/// Immutable HTTP <-> CoAP mapping tables
#[derive(Debug, Clone)]
pub struct TranslationTables {
    http_to_coap_status: HashMap<u16, CoapStatus>,
    coap_to_http_status: HashMap<CoapStatus, StatusCode>,
    header_to_option: HashMap<HeaderName, OptionType>,
    option_to_header: HashMap<OptionType, HeaderName>,
    http_to_coap_media: HashMap<&'static str, MediaType>,
    coap_to_http_content_type: HashMap<MediaType, &'static str>,
    http_to_coap_method: HashMap<&'static str, Method>,
}

impl TranslationTables {
    /// Build the tables
    pub fn new() -> Self {
        Self {
            http_to_coap_status: http_to_coap_status(),
            coap_to_http_status: coap_to_http_status(),
            header_to_option: header_to_option(),
            option_to_header: option_to_header(),
            http_to_coap_media: http_to_coap_media(),
            coap_to_http_content_type: coap_to_http_content_type(),
            http_to_coap_method: http_to_coap_method(),
        }
    }

    /// Process-wide instance, built on first use
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// CoAP code for an HTTP status. 204 is not in the table; its mapping
    /// depends on the request method.
    pub fn coap_status(&self, status: StatusCode) -> Option<CoapStatus> {
        self.http_to_coap_status.get(&status.as_u16()).copied()
    }

    /// HTTP status for a CoAP code
    pub fn http_status(&self, status: CoapStatus) -> Option<StatusCode> {
        self.coap_to_http_status.get(&status).copied()
    }

    /// Option type for an HTTP header name
    pub fn option_for_header(&self, name: &HeaderName) -> Option<OptionType> {
        self.header_to_option.get(name).copied()
    }

    /// HTTP header name for an option type
    pub fn header_for_option(&self, option_type: OptionType) -> Option<&HeaderName> {
        self.option_to_header.get(&option_type)
    }

    /// Media type for an HTTP content type without parameters
    pub fn coap_media_type(&self, content_type: &str) -> Option<MediaType> {
        self.http_to_coap_media
            .get(content_type.trim().to_ascii_lowercase().as_str())
            .copied()
    }

    /// HTTP content type for a media type
    pub fn http_content_type(&self, media_type: MediaType) -> Option<&'static str> {
        self.coap_to_http_content_type.get(&media_type).copied()
    }

    /// CoAP method for an HTTP verb (case-insensitive)
    pub fn coap_method(&self, verb: &str) -> Option<Method> {
        self.http_to_coap_method
            .get(verb.to_ascii_lowercase().as_str())
            .copied()
    }

    /// Iterate over the HTTP -> CoAP status pairs
    pub fn http_to_coap_pairs(&self) -> impl Iterator<Item = (StatusCode, CoapStatus)> + '_ {
        self.http_to_coap_status.iter().filter_map(|(code, coap)| {
            StatusCode::from_u16(*code).ok().map(|status| (status, *coap))
        })
    }

    /// Iterate over the CoAP -> HTTP status pairs
    pub fn coap_to_http_pairs(&self) -> impl Iterator<Item = (CoapStatus, StatusCode)> + '_ {
        self.coap_to_http_status
            .iter()
            .map(|(coap, status)| (*coap, *status))
    }
}

impl Default for TranslationTables {
    fn default() -> Self {
        Self::new()
    }
}

fn http_to_coap_status() -> HashMap<u16, CoapStatus> {
    use CoapStatus::*;

    HashMap::from([
        (100, BadGateway),
        (101, BadGateway),
        (200, Content),
        (201, Created),
        (202, Content),
        (203, Content),
        (205, Content),
        (300, BadGateway),
        (301, BadGateway),
        (302, BadGateway),
        (303, BadGateway),
        (304, Valid),
        (305, BadGateway),
        (307, BadGateway),
        (400, BadRequest),
        (401, Unauthorized),
        (402, BadRequest),
        (403, Forbidden),
        (404, NotFound),
        (405, MethodNotAllowed),
        (406, NotAcceptable),
        (410, BadRequest),
        (411, BadRequest),
        (412, PreconditionFailed),
        (413, RequestEntityTooLarge),
        (414, BadRequest),
        (415, UnsupportedMediaType),
        (416, BadRequest),
        (417, BadRequest),
        (429, TooManyRequests),
        (500, InternalServerError),
        (501, NotImplemented),
        (502, BadGateway),
        (503, ServiceUnavailable),
        (504, GatewayTimeout),
        (505, BadGateway),
        (507, InternalServerError),
    ])
}

fn coap_to_http_status() -> HashMap<CoapStatus, StatusCode> {
    use CoapStatus::*;

    HashMap::from([
        (Created, StatusCode::CREATED),
        (Deleted, StatusCode::NO_CONTENT),
        (Valid, StatusCode::NOT_MODIFIED),
        (Changed, StatusCode::NO_CONTENT),
        (Content, StatusCode::OK),
        (BadRequest, StatusCode::BAD_REQUEST),
        (Unauthorized, StatusCode::UNAUTHORIZED),
        (BadOption, StatusCode::BAD_REQUEST),
        (Forbidden, StatusCode::FORBIDDEN),
        (NotFound, StatusCode::NOT_FOUND),
        (MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED),
        (NotAcceptable, StatusCode::NOT_ACCEPTABLE),
        (PreconditionFailed, StatusCode::PRECONDITION_FAILED),
        (RequestEntityTooLarge, StatusCode::PAYLOAD_TOO_LARGE),
        (UnsupportedMediaType, StatusCode::UNSUPPORTED_MEDIA_TYPE),
        (TooManyRequests, StatusCode::TOO_MANY_REQUESTS),
        (InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
        (NotImplemented, StatusCode::NOT_IMPLEMENTED),
        (BadGateway, StatusCode::BAD_GATEWAY),
        (ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE),
        (GatewayTimeout, StatusCode::GATEWAY_TIMEOUT),
        (ProxyingNotSupported, StatusCode::BAD_GATEWAY),
    ])
}

fn header_to_option() -> HashMap<HeaderName, OptionType> {
    HashMap::from([
        (header::ETAG, OptionType::ETag),
        (header::ACCEPT, OptionType::Accept),
        (header::CONTENT_TYPE, OptionType::ContentType),
        (header::CACHE_CONTROL, OptionType::MaxAge),
        (header::IF_MATCH, OptionType::IfMatch),
        (header::IF_NONE_MATCH, OptionType::IfNoneMatch),
    ])
}

fn option_to_header() -> HashMap<OptionType, HeaderName> {
    HashMap::from([
        (OptionType::IfMatch, header::IF_MATCH),
        (OptionType::ETag, header::ETAG),
        (OptionType::IfNoneMatch, header::IF_NONE_MATCH),
        (OptionType::ContentType, header::CONTENT_TYPE),
        (OptionType::MaxAge, header::CACHE_CONTROL),
        (OptionType::Accept, header::ACCEPT),
        (OptionType::LocationPath, header::LOCATION),
        (OptionType::LocationQuery, header::LOCATION),
    ])
}

fn http_to_coap_media() -> HashMap<&'static str, MediaType> {
    HashMap::from([
        ("text/plain", MediaType::TEXT_PLAIN),
        ("text/html", MediaType::TEXT_HTML),
        ("image/jpeg", MediaType::IMAGE_JPEG),
        ("image/tiff", MediaType::IMAGE_TIFF),
        ("image/png", MediaType::IMAGE_PNG),
        ("image/gif", MediaType::IMAGE_GIF),
        ("application/xml", MediaType::APPLICATION_XML),
        ("application/json", MediaType::APPLICATION_JSON),
        ("application/link-format", MediaType::APPLICATION_LINK_FORMAT),
    ])
}

fn coap_to_http_content_type() -> HashMap<MediaType, &'static str> {
    HashMap::from([
        (MediaType::TEXT_PLAIN, "text/plain; charset=utf-8"),
        (MediaType::TEXT_HTML, "text/html"),
        (MediaType::IMAGE_JPEG, "image/jpeg"),
        (MediaType::IMAGE_TIFF, "image/tiff"),
        (MediaType::IMAGE_PNG, "image/png"),
        (MediaType::IMAGE_GIF, "image/gif"),
        (MediaType::APPLICATION_XML, "application/xml"),
        (MediaType::APPLICATION_JSON, "application/json; charset=UTF-8"),
        (MediaType::APPLICATION_LINK_FORMAT, "application/link-format"),
    ])
}

fn http_to_coap_method() -> HashMap<&'static str, Method> {
    // FETCH and iPATCH are not HTTP verbs
    HashMap::from([
        ("get", Method::Get),
        ("post", Method::Post),
        ("put", Method::Put),
        ("delete", Method::Delete),
        ("head", Method::Get),
        ("patch", Method::Patch),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_content_is_not_tabled() {
        let tables = TranslationTables::new();
        assert_eq!(tables.coap_status(StatusCode::NO_CONTENT), None);
        assert_eq!(tables.coap_status(StatusCode::OK), Some(CoapStatus::Content));
        assert_eq!(
            tables.coap_status(StatusCode::from_u16(507).unwrap()),
            Some(CoapStatus::InternalServerError)
        );
    }

    #[test]
    fn test_method_lookup_is_case_insensitive() {
        let tables = TranslationTables::shared();
        assert_eq!(tables.coap_method("GET"), Some(Method::Get));
        assert_eq!(tables.coap_method("Head"), Some(Method::Get));
        assert_eq!(tables.coap_method("patch"), Some(Method::Patch));
        assert_eq!(tables.coap_method("FETCH"), None);
    }

    #[test]
    fn test_header_tables() {
        let tables = TranslationTables::new();
        assert_eq!(
            tables.option_for_header(&header::CACHE_CONTROL),
            Some(OptionType::MaxAge)
        );
        assert_eq!(tables.option_for_header(&header::HOST), None);
        assert_eq!(
            tables.header_for_option(OptionType::LocationQuery),
            Some(&header::LOCATION)
        );
        assert_eq!(tables.header_for_option(OptionType::ProxyUri), None);
    }

    #[test]
    fn test_media_tables() {
        let tables = TranslationTables::new();
        assert_eq!(tables.coap_media_type("TEXT/PLAIN"), Some(MediaType::TEXT_PLAIN));
        assert_eq!(tables.coap_media_type("application/cbor"), None);
        assert_eq!(
            tables.http_content_type(MediaType::APPLICATION_JSON),
            Some("application/json; charset=UTF-8")
        );
    }

    #[test]
    fn test_shared_is_singleton() {
        assert!(Arc::ptr_eq(
            &TranslationTables::shared(),
            &TranslationTables::shared()
        ));
    }
}
