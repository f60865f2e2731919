use std::error::Error as StdError;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// Failures talking to the inference backend. None of these reach the HTTP
/// client; the agent turns every variant into a degraded reply.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Unexpected response format from inference backend: {0}")]
    Protocol(String),

    #[error("Inference backend answered with HTTP {status}: {body}")]
    Status {
        status: u16,
        body: String,
    },

    #[error("Connection refused by inference backend at {0}")]
    ConnectionRefused(String),

    #[error("Inference backend did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Transport error talking to inference backend: {0}")]
    Transport(#[source] reqwest::Error),
}

impl UpstreamError {
    /// Classifies a reqwest failure that happened before a status line arrived
    /// (or while reading the body).
    pub fn from_transport(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            return UpstreamError::Timeout(timeout);
        }
        if err.is_connect() && is_connection_refused(&err) {
            return UpstreamError::ConnectionRefused(url.to_string());
        }
        UpstreamError::Transport(err)
    }
}

fn is_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            if io_err.kind() == io::ErrorKind::ConnectionRefused {
                return true;
            }
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("connect failed")]
    struct Wrapper(#[source] io::Error);

    #[test]
    fn finds_refusal_deep_in_source_chain() {
        let err = Wrapper(io::Error::new(io::ErrorKind::ConnectionRefused, "refused"));
        assert!(is_connection_refused(&err));
    }

    #[test]
    fn other_io_errors_are_not_refusals() {
        let err = Wrapper(io::Error::new(io::ErrorKind::ConnectionReset, "reset"));
        assert!(!is_connection_refused(&err));
    }
}
