//! Error types shared across the crate.
//!
//! Internally everything is an `anyhow::Error`. At the command boundary an `ErrorType` is attached
//! as context so that callers can tell a bad input apart from a storage or network failure.

use serde::{Deserialize, Serialize};

pub type Error = anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// The broad category of a failure, as surfaced to the user.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorType {
    /// The user supplied a blank title, a non-numeric amount, or similar. Nothing was written.
    Validation,
    /// A read or write against the local SQLite database failed.
    Database,
    /// One of the steps of a sync failed. Remote changes already applied are not rolled back.
    Sync,
    /// The home directory, config file or sync URL is missing or malformed.
    Config,
}

serde_plain::derive_display_from_serialize!(ErrorType);
serde_plain::derive_fromstr_from_deserialize!(ErrorType);

/// Attaches an `ErrorType` to the error of a `Result`.
pub trait IntoResult<T> {
    fn pub_result(self, error_type: ErrorType) -> Result<T>;
}

impl<T, E> IntoResult<T> for std::result::Result<T, E>
where
    E: Into<Error>,
{
    fn pub_result(self, error_type: ErrorType) -> Result<T> {
        self.map_err(|e| e.into().context(error_type))
    }
}

/// Returns the `ErrorType` that was attached with `pub_result`, if any.
pub fn error_type(e: &Error) -> Option<ErrorType> {
    e.downcast_ref::<ErrorType>().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_pub_result_attaches_type() {
        let r: std::result::Result<(), Error> = Err(anyhow!("disk on fire"));
        let e = r.pub_result(ErrorType::Database).unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Database));
        let chain = format!("{e:#}");
        assert!(chain.contains("database"), "{chain}");
        assert!(chain.contains("disk on fire"), "{chain}");
    }

    #[test]
    fn test_untyped_error() {
        let e = anyhow!("plain");
        assert_eq!(error_type(&e), None);
    }

    #[test]
    fn test_error_type_display() {
        assert_eq!(ErrorType::Validation.to_string(), "validation");
        assert_eq!("sync".parse::<ErrorType>().unwrap(), ErrorType::Sync);
    }
}
