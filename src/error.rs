//! Error types for the text-replacement engine.
//!
//! Every operation-boundary function converts component failures into this
//! taxonomy before returning; no failure is downgraded into a different
//! outcome (a `NotFound` is never reported as success with an unchanged
//! file).

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while locating or replacing text.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input is not a well-formed document, or a page's text layer
    /// could not be decoded. Fatal for the current operation.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The search text could not be located on the requested page under
    /// any matcher tier. Non-fatal to the session; no file is produced.
    #[error("Text not found on page {page}: {search:?}")]
    NotFound {
        /// The search string that failed to match
        search: String,
        /// Zero-indexed page that was searched
        page: u32,
    },

    /// Requested page index is out of range. Rejected before any decode
    /// work is done.
    #[error("Page index {page} out of range (document has {count} pages)")]
    InvalidPage {
        /// Requested page number
        page: u32,
        /// Number of pages in the document
        count: usize,
    },

    /// Reading the input path or writing the output path failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = Error::NotFound {
            search: "Invoice".to_string(),
            page: 2,
        };
        let msg = format!("{}", err);
        assert!(msg.contains("page 2"));
        assert!(msg.contains("Invoice"));
    }

    #[test]
    fn test_invalid_page_message() {
        let err = Error::InvalidPage { page: 9, count: 3 };
        let msg = format!("{}", err);
        assert!(msg.contains("9"));
        assert!(msg.contains("3 pages"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
