//! Proxy target extraction from templated request paths

use cuttlefish_core::{Error, Result};
use regex::Regex;
use url::Url;

/// Name of the single supported binding
const TARGET_BINDING: &str = "tu";

/// A URI template with exactly one `{+tu}` reserved-expansion binding.
///
/// Templates are relative to the server root, e.g. `proxy/{+tu}` or
/// `hc/?target={+tu}`. Any other expression is rejected.
#[derive(Debug, Clone)]
pub struct UriTemplate {
    template: String,
    regex: Regex,
}

impl UriTemplate {
    /// Compile a template
    pub fn parse(template: &str) -> Result<Self> {
        let trimmed = template.trim_start_matches('/');
        let binding = format!("{{+{TARGET_BINDING}}}");

        let Some(at) = trimmed.find(&binding) else {
            return Err(Error::translation(
                "Don't do the complete template patterns yet",
            ));
        };
        let prefix = &trimmed[..at];
        let suffix = &trimmed[at + binding.len()..];
        if prefix.contains('{') || suffix.contains('{') {
            return Err(Error::translation(
                "Don't do the complete template patterns yet",
            ));
        }

        let pattern = format!(
            "^/?{}(?P<{TARGET_BINDING}>.+){}$",
            regex::escape(prefix),
            regex::escape(suffix)
        );
        let regex = Regex::new(&pattern)
            .map_err(|e| Error::Internal(format!("Invalid template regex: {e}")))?;

        Ok(Self {
            template: trimmed.to_string(),
            regex,
        })
    }

    /// Template for a proxy resource mounted under `/<name>/`
    pub fn for_resource(name: &str) -> Result<Self> {
        Self::parse(&format!("{}/{{+{TARGET_BINDING}}}", name.trim_matches('/')))
    }

    /// Original template text, without a leading `/`
    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Match a request path (with query) and return the bound value
    pub fn match_target<'a>(&self, path: &'a str) -> Option<&'a str> {
        self.regex
            .captures(path)
            .and_then(|caps| caps.name(TARGET_BINDING))
            .map(|m| m.as_str())
    }
}

/// Extract the CoAP target URI a request path designates.
///
/// Fails with "Template Mismatch" when the path does not match the template
/// and with "Schema is required" when the bound value is not a `coap://` or
/// `coaps://` URI.
pub fn extract_proxy_target(request_path: &str, template: &UriTemplate) -> Result<Url> {
    let target = template
        .match_target(request_path)
        .ok_or_else(|| Error::translation("Template Mismatch"))?;

    if !target.starts_with("coap://") && !target.starts_with("coaps://") {
        return Err(Error::translation("Schema is required"));
    }

    Url::parse(target).map_err(|e| Error::translation(format!("Malformed proxy target: {e}")))
}
