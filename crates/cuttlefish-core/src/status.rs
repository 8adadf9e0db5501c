//! CoAP response codes

use std::fmt;

/// Class of a response code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusClass {
    /// 2.xx
    Success,
    /// 4.xx
    ClientError,
    /// 5.xx
    ServerError,
}

impl StatusClass {
    /// Class of an HTTP status code, if it is one of the three shared classes
    pub fn of_http(status: http::StatusCode) -> Option<Self> {
        if status.is_success() {
            Some(Self::Success)
        } else if status.is_client_error() {
            Some(Self::ClientError)
        } else if status.is_server_error() {
            Some(Self::ServerError)
        } else {
            None
        }
    }
}

const fn calc_code(class: u8, detail: u8) -> u8 {
    ((class & 0x7) << 5) + detail
}

/// CoAP response code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CoapStatus {
    /// 2.01 Created
    Created = calc_code(2, 1),
    /// 2.02 Deleted
    Deleted = calc_code(2, 2),
    /// 2.03 Valid
    Valid = calc_code(2, 3),
    /// 2.04 Changed
    Changed = calc_code(2, 4),
    /// 2.05 Content
    Content = calc_code(2, 5),
    /// 2.31 Continue
    Continue = calc_code(2, 31),
    /// 4.00 Bad Request
    BadRequest = calc_code(4, 0),
    /// 4.01 Unauthorized
    Unauthorized = calc_code(4, 1),
    /// 4.02 Bad Option
    BadOption = calc_code(4, 2),
    /// 4.03 Forbidden
    Forbidden = calc_code(4, 3),
    /// 4.04 Not Found
    NotFound = calc_code(4, 4),
    /// 4.05 Method Not Allowed
    MethodNotAllowed = calc_code(4, 5),
    /// 4.06 Not Acceptable
    NotAcceptable = calc_code(4, 6),
    /// 4.08 Request Entity Incomplete
    RequestEntityIncomplete = calc_code(4, 8),
    /// 4.12 Precondition Failed
    PreconditionFailed = calc_code(4, 12),
    /// 4.13 Request Entity Too Large
    RequestEntityTooLarge = calc_code(4, 13),
    /// 4.15 Unsupported Content-Format
    UnsupportedMediaType = calc_code(4, 15),
    /// 4.29 Too Many Requests (RFC 8516)
    TooManyRequests = calc_code(4, 29),
    /// 5.00 Internal Server Error
    InternalServerError = calc_code(5, 0),
    /// 5.01 Not Implemented
    NotImplemented = calc_code(5, 1),
    /// 5.02 Bad Gateway
    BadGateway = calc_code(5, 2),
    /// 5.03 Service Unavailable
    ServiceUnavailable = calc_code(5, 3),
    /// 5.04 Gateway Timeout
    GatewayTimeout = calc_code(5, 4),
    /// 5.05 Proxying Not Supported
    ProxyingNotSupported = calc_code(5, 5),
}

impl CoapStatus {
    /// Raw 8-bit code (class in the top three bits)
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Code class digit (2, 4 or 5)
    pub fn class_digit(self) -> u8 {
        self.code() >> 5
    }

    /// Code detail (the two digits after the dot)
    pub fn detail(self) -> u8 {
        self.code() & 0x1f
    }

    /// Response class
    pub fn class(self) -> StatusClass {
        match self.class_digit() {
            2 => StatusClass::Success,
            4 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        }
    }

    /// Human readable reason phrase
    pub fn reason(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Deleted => "Deleted",
            Self::Valid => "Valid",
            Self::Changed => "Changed",
            Self::Content => "Content",
            Self::Continue => "Continue",
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::BadOption => "Bad Option",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::NotAcceptable => "Not Acceptable",
            Self::RequestEntityIncomplete => "Request Entity Incomplete",
            Self::PreconditionFailed => "Precondition Failed",
            Self::RequestEntityTooLarge => "Request Entity Too Large",
            Self::UnsupportedMediaType => "Unsupported Content-Format",
            Self::TooManyRequests => "Too Many Requests",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
            Self::BadGateway => "Bad Gateway",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::GatewayTimeout => "Gateway Timeout",
            Self::ProxyingNotSupported => "Proxying Not Supported",
        }
    }
}

impl fmt::Display for CoapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02} {}",
            self.class_digit(),
            self.detail(),
            self.reason()
        )
    }
}
