//! Response body supporting buffered and empty modes.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::Full;

/// Response body used by every service in this crate.
///
/// The gate's rejection uses [`ResponseBody::Empty`], so a 403 never carries
/// diagnostic content.
#[derive(Debug, Default)]
pub enum ResponseBody {
    /// Buffered body for small payloads.
    Buffered(Full<Bytes>),
    /// No body.
    #[default]
    Empty,
}

impl ResponseBody {
    /// Create a buffered body from bytes.
    #[must_use]
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::Buffered(Full::new(data.into()))
    }

    /// Create an empty body.
    #[must_use]
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Create a buffered body from a UTF-8 string.
    #[must_use]
    pub fn from_string(s: impl Into<String>) -> Self {
        Self::Buffered(Full::new(Bytes::from(s.into())))
    }
}

impl http_body::Body for ResponseBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<http_body::Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Buffered(full) => Pin::new(full)
                .poll_frame(cx)
                .map_err(|never| match never {}),
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Buffered(full) => full.is_end_stream(),
            Self::Empty => true,
        }
    }

    fn size_hint(&self) -> http_body::SizeHint {
        match self {
            Self::Buffered(full) => full.size_hint(),
            Self::Empty => http_body::SizeHint::with_exact(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body::Body;

    use super::*;

    #[test]
    fn test_should_report_empty_body_as_end_of_stream() {
        let body = ResponseBody::empty();
        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));
        assert!(ResponseBody::default().is_end_stream());
    }

    #[test]
    fn test_should_size_buffered_body() {
        let body = ResponseBody::from_string(r#"{"key":"app1"}"#);
        assert!(!body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(14));
        assert_eq!(ResponseBody::from_bytes("hello").size_hint().exact(), Some(5));
    }
}
