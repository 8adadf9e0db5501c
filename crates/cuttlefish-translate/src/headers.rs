//! HTTP header <-> CoAP option mapping

use crate::tables::TranslationTables;
use bytes::Bytes;
use cuttlefish_core::{CoapOption, OptionFormat, OptionType, OptionValue, Options};
use http::header::{self, HeaderMap, HeaderValue};
use tracing::debug;

/// Options for a set of HTTP headers.
///
/// Unmapped headers are dropped. `Accept` and `Content-Type` are always
/// skipped; the payload translation owns the content type.
pub fn options_from_headers(tables: &TranslationTables, headers: &HeaderMap) -> Vec<CoapOption> {
    let mut options = Vec::new();

    for name in headers.keys() {
        let Some(option_type) = tables.option_for_header(name) else {
            continue;
        };

        match option_type {
            OptionType::Accept | OptionType::ContentType | OptionType::ProxyUri => continue,
            OptionType::MaxAge => {
                let joined = joined_values(headers, name);
                options.push(CoapOption::max_age(parse_max_age(&joined)));
            }
            OptionType::IfNoneMatch => {
                // The option is empty; only the wildcard form has a CoAP meaning
                if joined_values(headers, name).trim() == "*" {
                    options.extend(
                        CoapOption::new(option_type, OptionValue::Opaque(Bytes::new())).ok(),
                    );
                }
            }
            _ => {
                for value in headers.get_all(name) {
                    let Ok(value) = value.to_str() else {
                        debug!(header = %name, "Dropping non-ASCII header value");
                        continue;
                    };
                    options.extend(option_values(option_type, value));
                }
            }
        }
    }

    options
}

/// HTTP headers for a set of options.
///
/// Content-Format and Proxy-Uri are skipped. Location-Path and
/// Location-Query collapse into a single `Location` header.
pub fn headers_from_options(tables: &TranslationTables, options: &Options) -> HeaderMap {
    let mut headers = HeaderMap::new();

    for option in options {
        let option_type = option.option_type();
        let Some(name) = tables.header_for_option(option_type) else {
            continue;
        };

        let value = match option_type {
            OptionType::ContentType
            | OptionType::ProxyUri
            | OptionType::LocationPath
            | OptionType::LocationQuery => continue,
            OptionType::MaxAge => option.as_integer().map(|n| format!("max-age={n}")),
            OptionType::IfNoneMatch => Some("*".to_string()),
            OptionType::ETag | OptionType::IfMatch => option.as_bytes().map(format_etag),
            OptionType::Accept => option.as_integer().map(|n| {
                cuttlefish_core::MediaType(u16::try_from(n).unwrap_or(u16::MAX)).to_string()
            }),
        };

        if let Some(value) = value.and_then(|v| HeaderValue::from_str(&v).ok()) {
            headers.append(name.clone(), value);
        }
    }

    if let Some(location) = location_header(options) {
        if let Ok(value) = HeaderValue::from_str(&location) {
            headers.insert(header::LOCATION, value);
        }
    }

    headers
}

/// Max-Age seconds for a Cache-Control value. `no-cache`, a missing
/// `max-age` directive and unparsable values all give 0.
pub fn parse_max_age(cache_control: &str) -> u32 {
    let lowered = cache_control.to_ascii_lowercase();
    if lowered.contains("no-cache") {
        return 0;
    }

    lowered
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|seconds| seconds.trim().trim_matches('"').parse::<u32>().ok())
        .unwrap_or(0)
}

/// Decode a comma-separated list of entity tags to their opaque bytes.
/// Weak markers and quotes are stripped; invalid hex entries are dropped.
pub fn parse_etags(value: &str) -> Vec<Bytes> {
    value
        .split(',')
        .map(|tag| {
            let tag = tag.trim();
            let tag = tag.strip_prefix("W/").unwrap_or(tag);
            tag.trim_matches('"')
        })
        .filter(|tag| !tag.is_empty())
        .filter_map(|tag| match hex::decode(tag) {
            Ok(bytes) => Some(Bytes::from(bytes)),
            Err(e) => {
                debug!(etag = tag, error = %e, "Dropping entity tag that is not hex");
                None
            }
        })
        .collect()
}

/// Quoted lowercase hex entity tag
pub fn format_etag(bytes: &[u8]) -> String {
    format!("\"{}\"", hex::encode(bytes))
}

/// Location header value built from Location-Path and Location-Query
pub fn location_header(options: &Options) -> Option<String> {
    let segments: Vec<&str> = options
        .get_all(OptionType::LocationPath)
        .filter_map(CoapOption::as_str)
        .collect();
    let queries: Vec<&str> = options
        .get_all(OptionType::LocationQuery)
        .filter_map(CoapOption::as_str)
        .collect();

    if segments.is_empty() && queries.is_empty() {
        return None;
    }

    let mut location = format!("/{}", segments.join("/"));
    if !queries.is_empty() {
        location.push('?');
        location.push_str(&queries.join("&"));
    }
    Some(location)
}

fn option_values(option_type: OptionType, value: &str) -> Vec<CoapOption> {
    match option_type.format() {
        OptionFormat::Opaque => parse_etags(value)
            .into_iter()
            .filter_map(|bytes| CoapOption::new(option_type, OptionValue::Opaque(bytes)).ok())
            .collect(),
        OptionFormat::Integer => value
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|n| CoapOption::new(option_type, OptionValue::Integer(n)).ok())
            .into_iter()
            .collect(),
        OptionFormat::String => CoapOption::new(option_type, OptionValue::String(value.into()))
            .ok()
            .into_iter()
            .collect(),
    }
}

fn joined_values(headers: &HeaderMap, name: &header::HeaderName) -> String {
    headers
        .get_all(name)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join(",")
}
