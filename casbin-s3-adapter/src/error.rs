use std::io;

use thiserror::Error;

/// Error type produced by object backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid adapter configuration: {0}")]
    Configuration(String),

    #[error("failed to retrieve policy object `{key}`: {source}")]
    Retrieval {
        key: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to persist policy object `{key}`: {source}")]
    Persistence {
        key: String,
        #[source]
        source: BoxError,
    },

    // Incremental mutation cannot be done against a single object without
    // a read-modify-write race, so these entry points always fail.
    #[error("{0} is not supported by the object storage adapter, save the whole policy instead")]
    NotImplemented(&'static str),

    #[error("refusing to save a filtered policy over `{0}`")]
    FilteredSave(String),
}

impl StoreError {
    pub(crate) fn retrieval(key: &str, source: impl Into<BoxError>) -> Self {
        Self::Retrieval {
            key: key.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn persistence(key: &str, source: impl Into<BoxError>) -> Self {
        Self::Persistence {
            key: key.to_string(),
            source: source.into(),
        }
    }

    /// True when a load failed because the object does not exist.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Retrieval { source, .. } => source
                .downcast_ref::<io::Error>()
                .is_some_and(|e| e.kind() == io::ErrorKind::NotFound),
            _ => false,
        }
    }

    /// Recovers the adapter error wrapped inside an error returned by casbin.
    pub fn from_casbin(err: &casbin::Error) -> Option<&StoreError> {
        match err {
            casbin::Error::AdapterError(casbin::error::AdapterError(inner)) => {
                inner.downcast_ref::<StoreError>()
            }
            _ => None,
        }
    }
}

impl From<StoreError> for casbin::Error {
    fn from(err: StoreError) -> Self {
        casbin::Error::from(casbin::error::AdapterError(Box::new(err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = StoreError::retrieval(
            "policy.csv",
            io::Error::new(io::ErrorKind::NotFound, "no such key"),
        );
        assert!(err.is_not_found());

        let err = StoreError::retrieval(
            "policy.csv",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_not_found());

        let err = StoreError::persistence(
            "policy.csv",
            io::Error::new(io::ErrorKind::NotFound, "missing bucket"),
        );
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_casbin_round_trip() {
        let err: casbin::Error = StoreError::NotImplemented("add_policy").into();
        match StoreError::from_casbin(&err) {
            Some(StoreError::NotImplemented(op)) => assert_eq!(*op, "add_policy"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display_names_key() {
        let err = StoreError::persistence("acl/policy.csv", "connection reset");
        let msg = err.to_string();
        assert!(msg.contains("acl/policy.csv"));
        assert!(msg.contains("connection reset"));
    }
}
