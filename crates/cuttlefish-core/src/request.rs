//! Protocol-neutral request

use crate::option::{CoapOption, OptionType, Options};
use crate::{Error, MediaType, Method, Result, Scheme};
use bytes::Bytes;
use url::Url;

/// A request on the CoAP side of the gateway.
///
/// Equality is structural; correlation uses [`crate::ExchangeId`], never the
/// request value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    options: Options,
    payload: Bytes,
}

impl Request {
    /// Create an empty request
    pub fn new(method: Method) -> Self {
        Self {
            method,
            options: Options::new(),
            payload: Bytes::new(),
        }
    }

    /// Request method
    pub fn method(&self) -> Method {
        self.method
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

    /// Raw Proxy-Uri option value
    pub fn proxy_uri(&self) -> Option<&str> {
        self.options
            .get(OptionType::ProxyUri)
            .and_then(CoapOption::as_str)
    }

    /// Set the Proxy-Uri option. The URI must use a scheme the gateway can
    /// forward to.
    pub fn set_proxy_uri(&mut self, uri: &Url) -> Result<()> {
        if uri.scheme().parse::<Scheme>().is_err() {
            return Err(Error::InvalidOption(format!(
                "Proxy-Uri scheme '{}' is not supported",
                uri.scheme()
            )));
        }
        self.options.add(CoapOption::proxy_uri(uri.as_str()));
        Ok(())
    }

    /// Builder-style Proxy-Uri setter
    pub fn with_proxy_uri(mut self, uri: &str) -> Result<Self> {
        let parsed = Url::parse(uri)
            .map_err(|e| Error::InvalidOption(format!("Malformed Proxy-Uri: {e}")))?;
        self.set_proxy_uri(&parsed)?;
        Ok(self)
    }

    /// Content-Format, if set
    pub fn content_type(&self) -> Option<MediaType> {
        content_type_of(&self.options)
    }

    /// Set the Content-Format option
    pub fn set_content_type(&mut self, media_type: MediaType) {
        self.options.add(CoapOption::content_type(media_type));
    }
}

pub(crate) fn content_type_of(options: &Options) -> Option<MediaType> {
    options
        .get(OptionType::ContentType)
        .and_then(CoapOption::as_integer)
        .and_then(|v| u16::try_from(v).ok())
        .map(MediaType)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_uri_round_trip() {
        let req = Request::new(Method::Get)
            .with_proxy_uri("coap://coap.example.com/resource")
            .unwrap();
        assert_eq!(req.proxy_uri(), Some("coap://coap.example.com/resource"));
    }

    #[test]
    fn test_proxy_uri_rejects_unknown_scheme() {
        let err = Request::new(Method::Get).with_proxy_uri("ftp://example.com/file");
        assert!(matches!(err, Err(Error::InvalidOption(_))));
    }

    #[test]
    fn test_content_type_single_valued() {
        let mut req = Request::new(Method::Post).with_payload("hello");
        req.set_content_type(MediaType::TEXT_PLAIN);
        req.set_content_type(MediaType::APPLICATION_JSON);
        assert_eq!(req.content_type(), Some(MediaType::APPLICATION_JSON));
        assert_eq!(req.options().len(), 1);
        assert_eq!(req.payload().as_ref(), b"hello");
    }
}
