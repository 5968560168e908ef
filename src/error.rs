use std::time::Duration;
use thiserror::Error;
use tokio::runtime::TryCurrentError;

/// Enumeration of all possible errors while setting up an ack tracker.
///
/// Resolving an ack never produces an error: timeouts and shutdowns are
/// reported through [`crate::AckOutcome`].
#[derive(Error, Debug)]
#[non_exhaustive]
#[cfg_attr(tarpaulin, ignore)]
pub enum Error {
    #[error("Ack threshold must be greater than zero when sweeping, got: {0:?}")]
    InvalidAckThreshold(Duration),
    #[error("Sweep interval must be greater than zero when sweeping, got: {0:?}")]
    InvalidSweepInterval(Duration),
    #[error("The timeout sweep needs a running tokio runtime: {0}")]
    MissingRuntime(#[from] TryCurrentError),
}

pub(crate) type Result<T> = std::result::Result<T, Error>;

impl From<Error> for std::io::Error {
    fn from(err: Error) -> std::io::Error {
        std::io::Error::new(std::io::ErrorKind::Other, err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_error = std::io::Error::from(Error::InvalidSweepInterval(Duration::ZERO));
        assert_eq!(io_error.kind(), std::io::ErrorKind::Other);
        assert!(io_error.to_string().contains("Sweep interval"));
    }
}
