//! Error types shared by the report pipeline.

use thiserror::Error;

/// A required remote image could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status code.
    #[error("request for {url} failed with status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code returned by the server.
        status: u16,
    },

    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    #[error("request for {url} failed")]
    Transport {
        /// Requested URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A local image file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path that was requested.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// An embedded data URI could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("data URI has no comma-delimited payload")]
    MissingComma,

    #[error("data URI payload is not valid base64")]
    Base64(#[from] base64::DecodeError),
}

/// Failures surfaced by [`crate::assembler::ReportAssembler`].
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to fetch {role} image")]
    Fetch {
        role: &'static str,
        #[source]
        source: FetchError,
    },

    #[error("failed to decode {role} image source")]
    Decode {
        role: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("{role} image is not a supported raster")]
    Image {
        role: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    #[error("PDF encoding failed: {0}")]
    Pdf(String),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "bookmarks")]
    #[error(transparent)]
    Bookmark(#[from] crate::bookmarks::BookmarkError),
}

impl ReportError {
    /// Returns the fetch failure when the report was aborted by a required download.
    pub fn as_fetch_error(&self) -> Option<&FetchError> {
        match self {
            Self::Fetch { source, .. } => Some(source),
            _ => None,
        }
    }

    pub(crate) fn pdf(err: impl std::fmt::Display) -> Self {
        Self::Pdf(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn outer_messages_leave_details_to_the_source_chain() {
        let err = ReportError::Fetch {
            role: "cover",
            source: FetchError::Status {
                url: "https://cdn.example.com/cover.jpg".into(),
                status: 404,
            },
        };

        assert_eq!(err.to_string(), "failed to fetch cover image");
        let source = err.source().expect("fetch error is chained");
        assert_eq!(
            source.to_string(),
            "request for https://cdn.example.com/cover.jpg failed with status 404"
        );
    }

    #[test]
    fn io_source_is_not_repeated() {
        let err = FetchError::Io {
            path: "cover.png".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };

        assert_eq!(err.to_string(), "failed to read cover.png");
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("no such file"));
    }
}
