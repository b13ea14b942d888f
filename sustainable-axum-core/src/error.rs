//! Codec error types.

use std::io;

/// Errors returned by the codec invoker.
///
/// Every variant is recoverable from the middleware's point of view: the
/// response is sent uncompressed and the error is logged.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The algorithm name is not one of the built-in codecs.
    #[error("unsupported compression algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// There is no body to compress.
    #[error("response body is empty")]
    EmptyBody,

    /// The underlying codec failed.
    #[error("codec failure: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CodecError::UnsupportedAlgorithm("lz4".into());
        assert_eq!(err.to_string(), "unsupported compression algorithm: lz4");
        assert_eq!(CodecError::EmptyBody.to_string(), "response body is empty");
    }

    #[test]
    fn test_from_io() {
        let err: CodecError = io::Error::new(io::ErrorKind::InvalidData, "bad").into();
        assert!(matches!(err, CodecError::Io(_)));
        assert_eq!(err.to_string(), "codec failure: bad");
    }
}
