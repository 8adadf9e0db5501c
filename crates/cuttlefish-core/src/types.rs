//! Common types used throughout Cuttlefish

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Default Max-Age for cacheable responses, in seconds (RFC 7252 §5.10.5)
pub const DEFAULT_MAX_AGE: u32 = 60;

/// How long the gateway holds an HTTP caller waiting for a correlated
/// downstream response
pub const GATEWAY_TIMEOUT: Duration = Duration::from_millis(75_000);

/// Server name reported by the base handler
pub const SERVER_NAME: &str = "Cuttlefish HTTP-CoAP Proxy";

/// CoAP request method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
    /// FETCH (RFC 8132)
    Fetch,
    /// PATCH (RFC 8132)
    Patch,
    /// iPATCH (RFC 8132)
    IPatch,
}

impl Method {
    /// Method token as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Fetch => "FETCH",
            Method::Patch => "PATCH",
            Method::IPatch => "iPATCH",
        }
    }

    /// CoAP method code (0.01 through 0.07)
    pub fn code(&self) -> u8 {
        match self {
            Method::Get => 1,
            Method::Post => 2,
            Method::Put => 3,
            Method::Delete => 4,
            Method::Fetch => 5,
            Method::Patch => 6,
            Method::IPatch => 7,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target URI scheme the gateway knows how to forward to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// coap
    Coap,
    /// coaps
    Coaps,
    /// http
    Http,
    /// https
    Https,
}

impl Scheme {
    /// Whether the scheme belongs to the constrained messaging protocol
    pub fn is_coap(&self) -> bool {
        matches!(self, Scheme::Coap | Scheme::Coaps)
    }

    /// Whether the scheme belongs to HTTP
    pub fn is_http(&self) -> bool {
        matches!(self, Scheme::Http | Scheme::Https)
    }
}

impl FromStr for Scheme {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "coap" => Ok(Scheme::Coap),
            "coaps" => Ok(Scheme::Coaps),
            "http" => Ok(Scheme::Http),
            "https" => Ok(Scheme::Https),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coap => write!(f, "coap"),
            Self::Coaps => write!(f, "coaps"),
            Self::Http => write!(f, "http"),
            Self::Https => write!(f, "https"),
        }
    }
}

/// Surrogate key correlating an in-flight request with its pending response.
///
/// Ids are handed out by the exchange table, so two requests with identical
/// content never share a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExchangeId(u64);

impl ExchangeId {
    /// Wrap a raw id
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw id value
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::IPatch.to_string(), "iPATCH");
        assert_eq!(Method::Fetch.code(), 5);
    }

    #[test]
    fn test_scheme_parse() {
        assert_eq!("coap".parse::<Scheme>(), Ok(Scheme::Coap));
        assert_eq!("HTTPS".parse::<Scheme>(), Ok(Scheme::Https));
        assert!("ftp".parse::<Scheme>().is_err());
        assert!(Scheme::Coaps.is_coap());
        assert!(Scheme::Http.is_http());
        assert!(!Scheme::Http.is_coap());
    }

    #[test]
    fn test_gateway_timeout() {
        assert_eq!(GATEWAY_TIMEOUT.as_secs(), 75);
    }
}
