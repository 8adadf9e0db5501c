//! Protocol-neutral response and HTTP response builder

use crate::option::{CoapOption, OptionType, Options};
use crate::request::content_type_of;
use crate::{CoapStatus, MediaType, Result};
use bytes::Bytes;
use http::{header, StatusCode};
use http_body_util::Full;

/// Body type alias
pub type Body = Full<Bytes>;

/// A response on the CoAP side of the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: CoapStatus,
    options: Options,
    payload: Bytes,
}

impl Response {
    /// Create an empty response
    pub fn new(status: CoapStatus) -> Self {
        Self {
            status,
            options: Options::new(),
            payload: Bytes::new(),
        }
    }

    /// Response code
    pub fn status(&self) -> CoapStatus {
        self.status
    }

    /// Options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Payload, possibly empty
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Replace the payload
    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
    }

    /// Builder-style payload setter
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.set_payload(payload);
        self
    }

    /// Content-Format, if set
    pub fn content_type(&self) -> Option<MediaType> {
        content_type_of(&self.options)
    }

    /// Set the Content-Format option
    pub fn set_content_type(&mut self, media_type: MediaType) {
        self.options.add(CoapOption::content_type(media_type));
    }

    /// Max-Age in seconds, if set
    pub fn max_age(&self) -> Option<u32> {
        self.options
            .get(OptionType::MaxAge)
            .and_then(CoapOption::as_integer)
    }

    /// Set the Max-Age option
    pub fn set_max_age(&mut self, seconds: u32) {
        self.options.add(CoapOption::max_age(seconds));
    }
}

/// Response builder for plain HTTP responses produced by the gateway itself
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(header::HeaderName, String)>,
}

impl ResponseBuilder {
    /// Create a new response builder
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Set a header
    pub fn header(mut self, name: header::HeaderName, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// Build response with empty body
    pub fn build(self) -> Result<http::Response<Body>> {
        let mut response = http::Response::builder().status(self.status);

        for (name, value) in self.headers {
            response = response.header(name, value);
        }

        Ok(response.body(Full::new(Bytes::new()))?)
    }

    /// Build response with text body
    pub fn text(self, body: impl Into<String>) -> Result<http::Response<Body>> {
        let mut response = http::Response::builder().status(self.status);

        response = response.header(header::CONTENT_TYPE, "text/plain; charset=utf-8");

        for (name, value) in self.headers {
            response = response.header(name, value);
        }

        Ok(response.body(Full::new(Bytes::from(body.into())))?)
    }
}

/// Convenience functions for the responses the gateway emits on its own
pub mod responses {
    use super::*;

    /// Empty response with only a status line. Infallible, for error paths.
    pub fn status_only(status: StatusCode) -> http::Response<Body> {
        let mut response = http::Response::new(Full::new(Bytes::new()));
        *response.status_mut() = status;
        response
    }

    /// 200 OK with a plain-text body
    pub fn ok_text(body: impl Into<String>) -> Result<http::Response<Body>> {
        ResponseBuilder::new(StatusCode::OK).text(body)
    }

    /// 400 Bad Request
    pub fn bad_request() -> http::Response<Body> {
        status_only(StatusCode::BAD_REQUEST)
    }

    /// 413 Payload Too Large
    pub fn payload_too_large() -> http::Response<Body> {
        status_only(StatusCode::PAYLOAD_TOO_LARGE)
    }

    /// 500 Internal Server Error
    pub fn internal_error() -> http::Response<Body> {
        status_only(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// 502 Bad Gateway
    pub fn bad_gateway() -> http::Response<Body> {
        status_only(StatusCode::BAD_GATEWAY)
    }

    /// 504 Gateway Timeout
    pub fn gateway_timeout() -> http::Response<Body> {
        status_only(StatusCode::GATEWAY_TIMEOUT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_builder() {
        let response = ResponseBuilder::new(StatusCode::OK)
            .header(header::HeaderName::from_static("x-custom"), "value")
            .build()
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("x-custom").unwrap(), "value");
    }

    #[test]
    fn test_text_response() {
        let response = responses::ok_text("hello").unwrap();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_coap_response_accessors() {
        let mut response = Response::new(CoapStatus::Content).with_payload("22.5");
        response.set_max_age(30);
        response.set_content_type(MediaType::TEXT_PLAIN);

        assert_eq!(response.status(), CoapStatus::Content);
        assert_eq!(response.max_age(), Some(30));
        assert_eq!(response.content_type(), Some(MediaType::TEXT_PLAIN));
        assert_eq!(response.payload().as_ref(), b"22.5");
    }

    #[test]
    fn test_status_only() {
        assert_eq!(
            responses::gateway_timeout().status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(responses::bad_gateway().status(), StatusCode::BAD_GATEWAY);
        assert_eq!(responses::bad_request().status(), StatusCode::BAD_REQUEST);
    }
}
