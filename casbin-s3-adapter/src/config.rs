use std::{fs, path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Location of the policy object and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Storage service URL, e.g. `http://127.0.0.1:9000` for MinIO.
    pub endpoint: String,
    /// Signing region. Required even when the endpoint ignores it.
    pub region: String,
    pub bucket: String,
    /// Object key of the policy snapshot inside the bucket.
    pub key: String,
    /// Keep the endpoint host as-is and put the bucket in the path.
    #[serde(default = "default_true")]
    pub force_path_style: bool,
    /// Skip body hashing and default checksums on PUT. Several
    /// S3-compatible services reject them.
    #[serde(default = "default_true")]
    pub unsigned_payload: bool,
    /// Deadline handed to the SDK for every GET/PUT.
    #[serde(default)]
    pub operation_timeout_secs: Option<u64>,
}

fn default_true() -> bool {
    true
}

impl StoreConfig {
    pub fn new(
        endpoint: impl Into<String>,
        region: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            region: region.into(),
            bucket: bucket.into(),
            key: key.into(),
            force_path_style: true,
            unsigned_payload: true,
            operation_timeout_secs: None,
        }
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        let cfg: StoreConfig = serde_yaml::from_str(&content).map_err(|e| {
            StoreError::Configuration(format!("failed to parse {}: {e}", path.display()))
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        let mut problems = Vec::new();

        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            problems.push(format!(
                "endpoint `{}` must be an http:// or https:// URL",
                self.endpoint
            ));
        }
        if self.region.trim().is_empty() {
            problems.push("region must not be empty".to_string());
        }
        if self.bucket.trim().is_empty() {
            problems.push("bucket must not be empty".to_string());
        }
        if self.key.trim().is_empty() {
            problems.push("key must not be empty".to_string());
        }
        if self.operation_timeout_secs == Some(0) {
            problems.push("operation_timeout_secs must be positive".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Configuration(problems.join("; ")))
        }
    }

    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_accepts_minio_config() {
        let cfg = StoreConfig::new("http://localhost:9000", "my-region", "testbuck", "policy.csv");
        assert!(cfg.validate().is_ok());
        assert!(cfg.force_path_style);
        assert!(cfg.unsigned_payload);
        assert_eq!(cfg.operation_timeout(), None);
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let cfg = StoreConfig::new("localhost:9000", "", "testbuck", " ");
        let err = cfg.validate().unwrap_err();
        let msg = err.to_string();
        assert!(matches!(err, StoreError::Configuration(_)));
        assert!(msg.contains("endpoint"));
        assert!(msg.contains("region"));
        assert!(msg.contains("key"));
        assert!(!msg.contains("bucket"));
    }

    #[test]
    fn test_parse_yaml_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "endpoint: https://s3.eu-west-1.amazonaws.com\nregion: eu-west-1\nbucket: acl\nkey: prod/policy.csv\noperation_timeout_secs: 15"
        )
        .unwrap();

        let cfg = StoreConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(cfg.bucket, "acl");
        assert_eq!(cfg.key, "prod/policy.csv");
        assert!(cfg.force_path_style);
        assert_eq!(cfg.operation_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_parse_yaml_rejects_missing_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "endpoint: http://localhost:9000\nregion: us-east-1").unwrap();

        let err = StoreConfig::from_yaml_file(file.path()).unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }
}
