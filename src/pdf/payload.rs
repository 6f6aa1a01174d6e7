//! Query resolution and the JSON document sent to the conversion service.
//!
//! # Wire format
//! ```text
//! {
//!   "input":  { "type": "html", "content": "<html>…" },
//!   "output": {
//!     "type": "pdf",
//!     "disposition": "inline",
//!     "filename": "report.pdf",
//!     "options": { "printBackground": true }
//!   }
//! }
//! ```
//!
//! The payload disposition is always `inline`. Only the `Content-Disposition`
//! header written back to the client follows the `content_disposition` query
//! parameter.

use std::fmt;

use serde::Serialize;

/// Query parameter that switches a request from passthrough to intercept.
pub const DEFAULT_ACTIVATION_PARAM: &str = "generate_pdf";

/// Filename used when the query does not name one.
pub const DEFAULT_FILENAME: &str = "file.pdf";

const FILENAME_PARAM: &str = "filename";
const DISPOSITION_PARAM: &str = "content_disposition";

/// How the browser should treat the returned document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    #[default]
    Inline,
    Attachment,
}

impl Disposition {
    /// `attachment` only for the exact value `attachment`; anything else is inline.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("attachment") => Self::Attachment,
            _ => Self::Inline,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request choices read from the query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub filename: String,
    pub disposition: Disposition,
}

impl RequestOptions {
    /// Resolve options from a raw query string.
    ///
    /// Returns `None` when `activation_param` is absent, whatever its value
    /// would have been. For repeated keys the first occurrence wins.
    pub fn from_query(query: Option<&str>, activation_param: &str) -> Option<Self> {
        let mut activated = false;
        let mut filename: Option<String> = None;
        let mut disposition: Option<String> = None;

        for (key, value) in url::form_urlencoded::parse(query.unwrap_or_default().as_bytes()) {
            if key == activation_param {
                activated = true;
            }
            match &*key {
                FILENAME_PARAM if filename.is_none() => filename = Some(value.into_owned()),
                DISPOSITION_PARAM if disposition.is_none() => {
                    disposition = Some(value.into_owned())
                }
                _ => {}
            }
        }

        if !activated {
            return None;
        }

        Some(Self {
            filename: filename
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| DEFAULT_FILENAME.to_string()),
            disposition: Disposition::from_query(disposition.as_deref()),
        })
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            filename: DEFAULT_FILENAME.to_string(),
            disposition: Disposition::Inline,
        }
    }
}

/// One HTML document to convert, with the client-facing choices attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub html_content: String,
    pub filename: String,
    /// Used for the response header only, never serialized.
    pub disposition: Disposition,
}

impl ConversionRequest {
    pub fn new(html_content: String, options: &RequestOptions) -> Self {
        Self {
            html_content,
            filename: options.filename.clone(),
            disposition: options.disposition,
        }
    }

    /// Borrowed view in the converter's wire shape.
    pub fn payload(&self) -> ConversionPayload<'_> {
        ConversionPayload {
            input: InputSpec {
                kind: "html",
                content: &self.html_content,
            },
            output: OutputSpec {
                kind: "pdf",
                disposition: Disposition::Inline,
                filename: &self.filename,
                options: RenderOptions {
                    print_background: true,
                },
            },
        }
    }

    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(&self.payload())
    }
}

#[derive(Debug, Serialize)]
pub struct ConversionPayload<'a> {
    pub input: InputSpec<'a>,
    pub output: OutputSpec<'a>,
}

#[derive(Debug, Serialize)]
pub struct InputSpec<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub struct OutputSpec<'a> {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub disposition: Disposition,
    pub filename: &'a str,
    pub options: RenderOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub print_background: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_passthrough_without_activation() {
        assert_eq!(RequestOptions::from_query(None, "generate_pdf"), None);
        assert_eq!(
            RequestOptions::from_query(Some("filename=a.pdf&x=1"), "generate_pdf"),
            None
        );
    }

    #[test]
    fn test_activation_value_is_ignored() {
        for query in ["generate_pdf", "generate_pdf=", "generate_pdf=0", "a=b&generate_pdf=no"] {
            let options = RequestOptions::from_query(Some(query), "generate_pdf");
            assert_eq!(options, Some(RequestOptions::default()), "query {query}");
        }
    }

    #[test]
    fn test_filename_resolution() {
        let options = RequestOptions::from_query(
            Some("generate_pdf=1&filename=report.pdf"),
            "generate_pdf",
        )
        .unwrap();
        assert_eq!(options.filename, "report.pdf");

        let options =
            RequestOptions::from_query(Some("generate_pdf=1&filename="), "generate_pdf").unwrap();
        assert_eq!(options.filename, "file.pdf");

        let options = RequestOptions::from_query(
            Some("generate_pdf&filename=my%20report.pdf&filename=other.pdf"),
            "generate_pdf",
        )
        .unwrap();
        assert_eq!(options.filename, "my report.pdf");
    }

    #[test]
    fn test_disposition_resolution() {
        let resolve = |query: &str| {
            RequestOptions::from_query(Some(query), "generate_pdf")
                .unwrap()
                .disposition
        };
        assert_eq!(resolve("generate_pdf&content_disposition=attachment"), Disposition::Attachment);
        assert_eq!(resolve("generate_pdf&content_disposition=inline"), Disposition::Inline);
        assert_eq!(resolve("generate_pdf&content_disposition=ATTACHMENT"), Disposition::Inline);
        assert_eq!(resolve("generate_pdf&content_disposition=download"), Disposition::Inline);
        assert_eq!(resolve("generate_pdf"), Disposition::Inline);
    }

    #[test]
    fn test_custom_activation_param() {
        assert!(RequestOptions::from_query(Some("pdf"), "pdf").is_some());
        assert!(RequestOptions::from_query(Some("generate_pdf"), "pdf").is_none());
    }

    #[test]
    fn test_payload_shape() {
        let options = RequestOptions {
            filename: "report.pdf".into(),
            disposition: Disposition::Attachment,
        };
        let request = ConversionRequest::new("<html>Hi</html>".into(), &options);
        let value: Value = serde_json::from_slice(&request.to_json().unwrap()).unwrap();

        assert_eq!(
            value,
            json!({
                "input": { "type": "html", "content": "<html>Hi</html>" },
                "output": {
                    "type": "pdf",
                    "disposition": "inline",
                    "filename": "report.pdf",
                    "options": { "printBackground": true }
                }
            })
        );
        assert_eq!(request.disposition, Disposition::Attachment);
    }
}
