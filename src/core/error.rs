use std::time::Duration;
use thiserror::Error;

/// Every way a check run can fail. All of them end in an UNKNOWN verdict.
#[derive(Error, Debug)]
pub enum CheckError {
    /// Missing or invalid identifiers, thresholds or config file.
    #[error("ConfigError: {0}")]
    Config(String),
    /// Unreadable key file or rejected token exchange.
    #[error("AuthError: {0}")]
    Auth(String),
    /// Transport, HTTP or body decoding failure talking to the cost API.
    #[error("FetchError: {0}")]
    Fetch(String),
    /// Response decoded but its content is inconsistent.
    #[error("DataError: {0}")]
    Data(String),
    /// The overall invocation deadline elapsed.
    #[error("FetchError: no result within {0:?}")]
    Timeout(Duration),
}

impl CheckError {
    /// Wrap an `anyhow` chain, keeping every cause in the message.
    pub fn auth(err: anyhow::Error) -> Self {
        Self::Auth(format!("{:#}", err))
    }

    pub fn fetch(err: anyhow::Error) -> Self {
        Self::Fetch(format!("{:#}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn display_names_the_error_kind() {
        assert!(CheckError::Config("x".into()).to_string().starts_with("ConfigError: "));
        assert!(CheckError::Data("x".into()).to_string().starts_with("DataError: "));
        assert!(CheckError::Timeout(Duration::from_secs(30)).to_string().starts_with("FetchError: "));
    }

    #[test]
    fn timeout_shows_duration() {
        let msg = CheckError::Timeout(Duration::from_secs(30)).to_string();
        assert_eq!(msg, "FetchError: no result within 30s");
    }

    #[test]
    fn wrapped_errors_keep_cause_chain() {
        let err: anyhow::Result<()> = Err(anyhow::anyhow!("connection refused"));
        let err = err.context("Failed to reach cost API").unwrap_err();
        let msg = CheckError::fetch(err).to_string();
        assert_eq!(msg, "FetchError: Failed to reach cost API: connection refused");
    }
}
