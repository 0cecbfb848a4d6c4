//! Error types for the article extractor.
//!
//! Every variant ends up as "this candidate failed" inside the extractor: the
//! error is logged and the caller sees `None`. The variants exist so that the
//! logs can tell a dead link apart from a malformed feed.

use thiserror::Error;

/// Failure while fetching or parsing a single source document.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input could not be parsed as an absolute URL.
    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Transport-level failure (DNS, connect, timeout, body decoding).
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// The feed document is not well-formed XML.
    #[error("malformed feed at position {position}: {source}")]
    Feed {
        position: u64,
        #[source]
        source: quick_xml::Error,
    },
}

impl ExtractError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::InvalidUrl { .. } => "invalid_url",
            ExtractError::Http(_) => "fetch",
            ExtractError::Status { .. } => "status",
            ExtractError::Feed { .. } => "parse",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_display_and_kind() {
        let err = url::Url::parse("not a url").unwrap_err();
        let e = ExtractError::InvalidUrl {
            url: "not a url".into(),
            source: err,
        };
        assert_eq!(e.kind(), "invalid_url");
        assert!(e.to_string().starts_with("invalid URL not a url"));
    }

    #[test]
    fn test_status_display() {
        let e = ExtractError::Status {
            url: "https://example.com/x".into(),
            status: reqwest::StatusCode::NOT_FOUND,
        };
        assert_eq!(e.kind(), "status");
        assert_eq!(
            e.to_string(),
            "https://example.com/x returned HTTP 404 Not Found"
        );
    }
}
