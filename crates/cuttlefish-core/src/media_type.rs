//! CoAP content formats

use std::fmt;

/// A CoAP Content-Format value
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct MediaType(pub u16);

impl MediaType {
    /// text/plain; charset=utf-8
    pub const TEXT_PLAIN: MediaType = MediaType(0);

    /// text/xml (pre-RFC draft registry)
    pub const TEXT_XML: MediaType = MediaType(1);

    /// text/csv (pre-RFC draft registry)
    pub const TEXT_CSV: MediaType = MediaType(2);

    /// text/html (pre-RFC draft registry)
    pub const TEXT_HTML: MediaType = MediaType(3);

    /// image/gif (pre-RFC draft registry)
    pub const IMAGE_GIF: MediaType = MediaType(21);

    /// image/jpeg (pre-RFC draft registry)
    pub const IMAGE_JPEG: MediaType = MediaType(22);

    /// image/png (pre-RFC draft registry)
    pub const IMAGE_PNG: MediaType = MediaType(23);

    /// image/tiff (pre-RFC draft registry)
    pub const IMAGE_TIFF: MediaType = MediaType(24);

    /// application/link-format, from RFC 6690
    pub const APPLICATION_LINK_FORMAT: MediaType = MediaType(40);

    /// application/xml, from RFC 7252
    pub const APPLICATION_XML: MediaType = MediaType(41);

    /// application/octet-stream, from RFC 7252
    pub const APPLICATION_OCTET_STREAM: MediaType = MediaType(42);

    /// application/exi, from RFC 7252
    pub const APPLICATION_EXI: MediaType = MediaType(47);

    /// application/json, from RFC 7252
    pub const APPLICATION_JSON: MediaType = MediaType(50);

    /// application/json-patch+json, from RFC 6902
    pub const APPLICATION_JSON_PATCH_JSON: MediaType = MediaType(51);

    /// application/merge-patch+json, from RFC 7396
    pub const APPLICATION_MERGE_PATCH_JSON: MediaType = MediaType(52);

    /// application/cbor, from RFC 7049
    pub const APPLICATION_CBOR: MediaType = MediaType(60);

    /// application/cwt, from RFC 8392
    pub const APPLICATION_CWT: MediaType = MediaType(61);

    /// application/senml+json, from RFC 8428
    pub const APPLICATION_SENML_JSON: MediaType = MediaType(110);

    /// application/senml+cbor, from RFC 8428
    pub const APPLICATION_SENML_CBOR: MediaType = MediaType(112);

    const REGISTRY: &'static [(MediaType, &'static str)] = &[
        (Self::TEXT_PLAIN, "text/plain"),
        (Self::TEXT_XML, "text/xml"),
        (Self::TEXT_CSV, "text/csv"),
        (Self::TEXT_HTML, "text/html"),
        (Self::IMAGE_GIF, "image/gif"),
        (Self::IMAGE_JPEG, "image/jpeg"),
        (Self::IMAGE_PNG, "image/png"),
        (Self::IMAGE_TIFF, "image/tiff"),
        (Self::APPLICATION_LINK_FORMAT, "application/link-format"),
        (Self::APPLICATION_XML, "application/xml"),
        (Self::APPLICATION_OCTET_STREAM, "application/octet-stream"),
        (Self::APPLICATION_EXI, "application/exi"),
        (Self::APPLICATION_JSON, "application/json"),
        (Self::APPLICATION_JSON_PATCH_JSON, "application/json-patch+json"),
        (Self::APPLICATION_MERGE_PATCH_JSON, "application/merge-patch+json"),
        (Self::APPLICATION_CBOR, "application/cbor"),
        (Self::APPLICATION_CWT, "application/cwt"),
        (Self::APPLICATION_SENML_JSON, "application/senml+json"),
        (Self::APPLICATION_SENML_CBOR, "application/senml+cbor"),
    ];

    /// Looks up a MIME type in the content-format registry.
    ///
    /// Parameters after `;` and surrounding whitespace are ignored and the
    /// comparison is case-insensitive.
    pub fn parse(mime: &str) -> Option<MediaType> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        Self::REGISTRY
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(essence))
            .map(|(media_type, _)| *media_type)
    }

    /// Registered MIME name, without parameters
    pub fn name(self) -> Option<&'static str> {
        Self::REGISTRY
            .iter()
            .find(|(media_type, _)| *media_type == self)
            .map(|(_, name)| *name)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "content-format/{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_registry() {
        assert_eq!(MediaType::parse("application/cbor"), Some(MediaType::APPLICATION_CBOR));
        assert_eq!(
            MediaType::parse("Application/SenML+JSON"),
            Some(MediaType::APPLICATION_SENML_JSON)
        );
        assert_eq!(
            MediaType::parse("text/plain; charset=utf-8"),
            Some(MediaType::TEXT_PLAIN)
        );
        assert_eq!(MediaType::parse("application/x-unknown"), None);
    }

    #[test]
    fn test_name_and_display() {
        assert_eq!(MediaType::APPLICATION_EXI.name(), Some("application/exi"));
        assert_eq!(MediaType(9999).name(), None);
        assert_eq!(MediaType(9999).to_string(), "content-format/9999");
        assert_eq!(MediaType::APPLICATION_JSON.to_string(), "application/json");
    }
}
