//! Request and response translation between HTTP and CoAP

use crate::headers;
use crate::tables::TranslationTables;
use crate::template::{extract_proxy_target, UriTemplate};
use bytes::Bytes;
use cuttlefish_core::{
    Body, CoapOption, CoapStatus, Error, MediaType, Method, Options, Request, Response, Result,
    DEFAULT_MAX_AGE,
};
use http::header::{self, HeaderMap, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use std::sync::Arc;
use tracing::{debug, trace};

const OCTET_STREAM: &str = "application/octet-stream";

/// Stateless HTTP <-> CoAP translator over a shared set of tables
#[derive(Debug, Clone)]
pub struct Translator {
    tables: Arc<TranslationTables>,
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(TranslationTables::shared())
    }
}

impl Translator {
    /// Create a translator over the given tables
    pub fn new(tables: Arc<TranslationTables>) -> Self {
        Self { tables }
    }

    /// The underlying tables
    pub fn tables(&self) -> &TranslationTables {
        &self.tables
    }

    /// CoAP code for an HTTP status.
    ///
    /// 204 depends on the originating method: `Deleted` for DELETE,
    /// `Changed` otherwise.
    pub fn status_http_to_coap(&self, status: StatusCode, method: Method) -> Result<CoapStatus> {
        if status == StatusCode::NO_CONTENT {
            return Ok(match method {
                Method::Delete => CoapStatus::Deleted,
                _ => CoapStatus::Changed,
            });
        }

        self.tables.coap_status(status).ok_or_else(|| {
            Error::translation(format!("cannot convert http status {}", status.as_u16()))
        })
    }

    /// HTTP status for a CoAP code
    pub fn status_coap_to_http(&self, status: CoapStatus) -> Result<StatusCode> {
        self.tables
            .http_status(status)
            .ok_or_else(|| Error::translation(format!("cannot convert coap status {status}")))
    }

    /// CoAP method for an HTTP verb
    pub fn method_http_to_coap(&self, verb: &str) -> Result<Method> {
        self.tables
            .coap_method(verb)
            .ok_or_else(|| Error::translation(format!("{verb} method not mapped")))
    }

    /// Media type for a Content-Type header value. Never fails; unknown
    /// types become `application/octet-stream`.
    pub fn media_type_from_http_content_type(&self, content_type: Option<&str>) -> MediaType {
        let Some(content_type) = content_type else {
            return MediaType::APPLICATION_OCTET_STREAM;
        };
        let essence = content_type.split(';').next().unwrap_or_default().trim();

        self.tables
            .coap_media_type(essence)
            .or_else(|| MediaType::parse(essence))
            .unwrap_or(MediaType::APPLICATION_OCTET_STREAM)
    }

    /// Content-Type header value for a media type, if one is known
    pub fn http_content_type(&self, media_type: MediaType) -> Option<&'static str> {
        self.tables
            .http_content_type(media_type)
            .or_else(|| media_type.name())
    }

    /// See [`headers::options_from_headers`]
    pub fn options_from_headers(&self, headers: &HeaderMap) -> Vec<CoapOption> {
        headers::options_from_headers(&self.tables, headers)
    }

    /// See [`headers::headers_from_options`]
    pub fn headers_from_options(&self, options: &Options) -> HeaderMap {
        headers::headers_from_options(&self.tables, options)
    }

    /// Translate an inbound HTTP request into a CoAP request addressed to
    /// the target named by the request path.
    pub fn build_coap_request(
        &self,
        http_request: &http::Request<Bytes>,
        template: &UriTemplate,
        proxying_enabled: bool,
    ) -> Result<Request> {
        let method = self.method_http_to_coap(http_request.method().as_str())?;
        let path = http_request
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let target = extract_proxy_target(path, template)?;

        trace!(%target, proxying_enabled, "Building CoAP request");

        let mut request = Request::new(method);
        request
            .set_proxy_uri(&target)
            .map_err(|e| Error::translation(e.to_string()))?;
        request
            .options_mut()
            .extend(self.options_from_headers(http_request.headers()));

        let body = http_request.body();
        if !body.is_empty() {
            let media_type = self.media_type_from_http_content_type(content_type(http_request.headers()));
            request.set_payload(body.clone());
            request.set_content_type(media_type);
        }

        Ok(request)
    }

    /// Translate an HTTP origin response into a CoAP response for the
    /// request that produced it
    pub fn build_coap_response(
        &self,
        http_response: &http::Response<Bytes>,
        originating: &Request,
    ) -> Result<Response> {
        let status = self.status_http_to_coap(http_response.status(), originating.method())?;

        let mut response = Response::new(status);
        response
            .options_mut()
            .extend(self.options_from_headers(http_response.headers()));

        if response.max_age().is_none() {
            let max_age = match originating.method() {
                Method::Get => DEFAULT_MAX_AGE,
                _ => 0,
            };
            response.set_max_age(max_age);
        }

        let body = http_response.body();
        if !body.is_empty() {
            let media_type = self.media_type_from_http_content_type(content_type(http_response.headers()));
            response.set_payload(body.clone());
            response.set_content_type(media_type);
        }

        Ok(response)
    }

    /// Translate a CoAP request carrying an `http`/`https` Proxy-Uri into an
    /// outgoing HTTP request
    pub fn build_http_request(&self, coap_request: &Request) -> Result<http::Request<Body>> {
        let proxy_uri = coap_request
            .proxy_uri()
            .ok_or_else(|| Error::translation("Cannot get the proxy-uri from the coap message"))?;
        let uri: http::Uri = proxy_uri
            .parse()
            .map_err(|e| Error::translation(format!("Malformed proxy-uri '{proxy_uri}': {e}")))?;
        if uri.host().is_none() {
            return Err(Error::translation(format!(
                "Malformed proxy-uri '{proxy_uri}': missing host"
            )));
        }

        let method = http::Method::from_bytes(coap_request.method().as_str().as_bytes())
            .map_err(|e| Error::translation(e.to_string()))?;

        let mut builder = http::Request::builder().method(method).uri(uri);
        if let Some(headers) = builder.headers_mut() {
            headers.extend(self.headers_from_options(coap_request.options()));

            if !coap_request.payload().is_empty() {
                let content_type = coap_request
                    .content_type()
                    .and_then(|media_type| self.http_content_type(media_type))
                    .unwrap_or(OCTET_STREAM);
                headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }

        Ok(builder.body(Full::new(coap_request.payload().clone()))?)
    }

    /// Translate a CoAP response into the HTTP response for the originating
    /// inbound request. Responses to HEAD carry no body.
    pub fn build_http_response(
        &self,
        coap_response: &Response,
        request_method: &http::Method,
    ) -> Result<http::Response<Body>> {
        let status = self.status_coap_to_http(coap_response.status())?;

        let mut headers = self.headers_from_options(coap_response.options());
        if !headers.contains_key(header::CACHE_CONTROL) {
            headers.insert(
                header::CACHE_CONTROL,
                HeaderValue::from_static(DEFAULT_CACHE_CONTROL),
            );
        }
        // An empty payload has no content to describe
        if let Some(content_type) = coap_response
            .content_type()
            .filter(|_| !coap_response.payload().is_empty())
            .and_then(|media_type| self.http_content_type(media_type))
        {
            headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        }

        let body = if request_method == http::Method::HEAD {
            Bytes::new()
        } else {
            coap_response.payload().clone()
        };

        debug!(coap = %coap_response.status(), http = %status, "Built HTTP response");

        let mut response = http::Response::new(Full::new(body));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

const DEFAULT_CACHE_CONTROL: &str = "max-age=60";

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuttlefish_core::OptionType;
    use http_body_util::BodyExt;

    fn translator() -> Translator {
        Translator::default()
    }

    fn template() -> UriTemplate {
        UriTemplate::parse("hc/{+tu}").unwrap()
    }

    fn inbound(method: &str, path: &str, body: &'static str) -> http::Request<Bytes> {
        http::Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "text/plain; charset=utf-8")
            .header(header::CACHE_CONTROL, "max-age=10")
            .body(Bytes::from_static(body.as_bytes()))
            .unwrap()
    }

    #[test]
    fn test_no_content_depends_on_method() {
        let t = translator();
        assert_eq!(
            t.status_http_to_coap(StatusCode::NO_CONTENT, Method::Delete).unwrap(),
            CoapStatus::Deleted
        );
        assert_eq!(
            t.status_http_to_coap(StatusCode::NO_CONTENT, Method::Put).unwrap(),
            CoapStatus::Changed
        );
        assert_eq!(
            t.status_http_to_coap(StatusCode::NO_CONTENT, Method::Post).unwrap(),
            CoapStatus::Changed
        );
    }

    #[test]
    fn test_unmapped_status() {
        let err = translator()
            .status_http_to_coap(StatusCode::IM_A_TEAPOT, Method::Get)
            .unwrap_err();
        assert!(err.is_translation());
        assert!(err.to_string().contains("cannot convert http status"));

        assert!(translator().status_coap_to_http(CoapStatus::Continue).is_err());
    }

    #[test]
    fn test_method_not_mapped() {
        let err = translator().method_http_to_coap("FOOBAR").unwrap_err();
        assert_eq!(err.to_string(), "FOOBAR method not mapped");
        assert_eq!(translator().method_http_to_coap("HEAD").unwrap(), Method::Get);
    }

    #[test]
    fn test_media_type_ignores_parameters() {
        let t = translator();
        assert_eq!(
            t.media_type_from_http_content_type(Some("text/plain; charset=utf-8")),
            t.media_type_from_http_content_type(Some("text/plain"))
        );
        assert_eq!(
            t.media_type_from_http_content_type(Some("application/cbor")),
            MediaType::APPLICATION_CBOR
        );
        assert_eq!(
            t.media_type_from_http_content_type(Some("application/x-unknown")),
            MediaType::APPLICATION_OCTET_STREAM
        );
        assert_eq!(
            t.media_type_from_http_content_type(None),
            MediaType::APPLICATION_OCTET_STREAM
        );
    }

    #[test]
    fn test_build_coap_request() {
        let request = translator()
            .build_coap_request(
                &inbound("PUT", "/hc/coap://coap.example.com/resource", "22.5"),
                &template(),
                true,
            )
            .unwrap();

        assert_eq!(request.method(), Method::Put);
        assert_eq!(request.proxy_uri(), Some("coap://coap.example.com/resource"));
        assert_eq!(request.content_type(), Some(MediaType::TEXT_PLAIN));
        assert_eq!(request.payload().as_ref(), b"22.5");
        assert_eq!(
            request
                .options()
                .get(OptionType::MaxAge)
                .and_then(CoapOption::as_integer),
            Some(10)
        );
    }

    #[test]
    fn test_build_coap_request_without_body_has_no_content_type() {
        let request = translator()
            .build_coap_request(&inbound("GET", "/hc/coap://h/r", ""), &template(), false)
            .unwrap();
        assert!(request.content_type().is_none());
        assert!(request.payload().is_empty());
    }

    #[test]
    fn test_build_coap_request_errors() {
        let t = translator();
        let err = t
            .build_coap_request(&inbound("FOOBAR", "/hc/coap://h/r", ""), &template(), false)
            .unwrap_err();
        assert!(err.to_string().contains("FOOBAR"));

        let err = t
            .build_coap_request(&inbound("GET", "/hc/http://h/r", ""), &template(), false)
            .unwrap_err();
        assert_eq!(err.to_string(), "Schema is required");
    }

    #[test]
    fn test_build_coap_response_default_max_age() {
        let t = translator();
        let http_response = http::Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Bytes::from_static(b"{}"))
            .unwrap();

        let get = Request::new(Method::Get);
        let response = t.build_coap_response(&http_response, &get).unwrap();
        assert_eq!(response.status(), CoapStatus::Content);
        assert_eq!(response.max_age(), Some(DEFAULT_MAX_AGE));
        assert_eq!(response.content_type(), Some(MediaType::APPLICATION_JSON));

        let post = Request::new(Method::Post);
        let response = t.build_coap_response(&http_response, &post).unwrap();
        assert_eq!(response.max_age(), Some(0));
    }

    #[test]
    fn test_build_coap_response_no_content() {
        let http_response = http::Response::builder()
            .status(StatusCode::NO_CONTENT)
            .body(Bytes::new())
            .unwrap();
        let response = translator()
            .build_coap_response(&http_response, &Request::new(Method::Delete))
            .unwrap();
        assert_eq!(response.status(), CoapStatus::Deleted);
        assert!(response.content_type().is_none());
    }

    #[test]
    fn test_build_http_request() {
        let mut request = Request::new(Method::Post)
            .with_proxy_uri("http://origin.example.com/items")
            .unwrap()
            .with_payload("{\"a\":1}");
        request.set_content_type(MediaType::APPLICATION_JSON);

        let http_request = translator().build_http_request(&request).unwrap();
        assert_eq!(http_request.method(), http::Method::POST);
        assert_eq!(http_request.uri(), "http://origin.example.com/items");
        assert_eq!(
            http_request.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=UTF-8"
        );
    }

    #[test]
    fn test_build_http_request_octet_stream_fallback() {
        let mut request = Request::new(Method::Put)
            .with_proxy_uri("https://origin.example.com/blob")
            .unwrap()
            .with_payload(&b"\x00\x01"[..]);
        request.set_content_type(MediaType(9999));

        let http_request = translator().build_http_request(&request).unwrap();
        assert_eq!(
            http_request.headers().get(header::CONTENT_TYPE).unwrap(),
            OCTET_STREAM
        );
    }

    #[test]
    fn test_build_http_request_requires_proxy_uri() {
        let err = translator()
            .build_http_request(&Request::new(Method::Get))
            .unwrap_err();
        assert_eq!(err.to_string(), "Cannot get the proxy-uri from the coap message");
    }

    #[tokio::test]
    async fn test_build_http_response() {
        let mut coap = Response::new(CoapStatus::Content).with_payload("hello");
        coap.set_content_type(MediaType::TEXT_PLAIN);

        let response = translator()
            .build_http_response(&coap, &http::Method::GET)
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "max-age=60"
        );
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"hello");
    }

    #[test]
    fn test_build_http_response_empty_payload_has_no_content_type() {
        let mut coap = Response::new(CoapStatus::Changed);
        coap.set_content_type(MediaType::TEXT_PLAIN);

        let response = translator()
            .build_http_response(&coap, &http::Method::POST)
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(response.headers().get(header::CONTENT_TYPE).is_none());
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "max-age=60"
        );
    }

    #[tokio::test]
    async fn test_build_http_response_head_has_no_body() {
        let mut coap = Response::new(CoapStatus::Content).with_payload("hello");
        coap.set_max_age(5);

        let response = translator()
            .build_http_response(&coap, &http::Method::HEAD)
            .unwrap();
        assert_eq!(
            response.headers().get(header::CACHE_CONTROL).unwrap(),
            "max-age=5"
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }

    #[test]
    fn test_build_http_response_unmapped_status() {
        let err = translator()
            .build_http_response(&Response::new(CoapStatus::Continue), &http::Method::GET)
            .unwrap_err();
        assert!(err.is_translation());
    }
}
