use std::time::Duration;

use thiserror::Error;

/// Result type alias for scan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// What a single query/response exchange attempt can fail with.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Socket-level failure
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// No matching response arrived within the deadline
    #[error("exchange timed out after {0:?}")]
    Timeout(Duration),

    /// Query could not be encoded or the response was unusable
    /// (undecodable, truncated)
    #[error("protocol error: {0}")]
    Proto(String),
}

/// Errors that can occur while setting up or running a sweep
#[derive(Error, Debug)]
pub enum ScanError {
    /// Scan configuration is invalid (bad CIDR, misaligned prefix,
    /// empty nameserver pool). Detected before any query is sent and
    /// aborts only the affected subnet.
    #[error("configuration error: {0}")]
    Config(String),

    /// Every retry attempt for one query failed at the transport level.
    /// Fatal to that query's subtree only; sibling subtrees and other
    /// subnet scans keep running.
    #[error("transport exhausted after {attempts} attempts for {query}: {source}")]
    Transport {
        /// The reverse-DNS name whose exchange kept failing
        query: String,
        /// How many attempts were made
        attempts: u32,
        /// The last transport failure observed
        #[source]
        source: TransportError,
    },

    /// Network I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Returns true if the error was detected before any task ran
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_transport_exhaustion_keeps_typed_source() {
        let err = ScanError::Transport {
            query: "113.0.203.in-addr.arpa.".into(),
            attempts: 3,
            source: TransportError::Timeout(Duration::from_secs(5)),
        };
        assert!(matches!(
            err.source().and_then(|s| s.downcast_ref::<TransportError>()),
            Some(TransportError::Timeout(_))
        ));
        assert!(err.to_string().contains("after 3 attempts"));
    }
}
