use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use casbin_s3_adapter::{StoreConfig, StoreError};

#[derive(Parser, Debug)]
#[command(name = "casbin-s3")]
#[command(version, about = "Manage a casbin policy stored in an S3 bucket", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) store: StoreArgs,

    /// casbin model file (.conf)
    #[arg(short, long, env = "CASBIN_S3_MODEL")]
    pub(crate) model: PathBuf,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Args, Debug)]
pub(crate) struct StoreArgs {
    /// YAML file holding endpoint, region, bucket and key
    #[arg(short, long, env = "CASBIN_S3_CONFIG")]
    pub(crate) config: Option<PathBuf>,

    /// Storage service URL
    #[arg(long, env = "CASBIN_S3_ENDPOINT")]
    pub(crate) endpoint: Option<String>,

    /// Signing region
    #[arg(long, env = "CASBIN_S3_REGION", default_value = "us-east-1")]
    pub(crate) region: String,

    /// Bucket holding the policy object
    #[arg(long, env = "CASBIN_S3_BUCKET")]
    pub(crate) bucket: Option<String>,

    /// Object key of the policy
    #[arg(long, env = "CASBIN_S3_KEY", default_value = "policy.csv")]
    pub(crate) key: String,

    /// Per-request deadline in seconds
    #[arg(long, env = "CASBIN_S3_TIMEOUT")]
    pub(crate) timeout: Option<u64>,
}

impl StoreArgs {
    /// A config file wins over the individual flags.
    pub(crate) fn to_config(&self) -> Result<StoreConfig, StoreError> {
        if let Some(path) = &self.config {
            return StoreConfig::from_yaml_file(path);
        }

        let endpoint = self.endpoint.clone().ok_or_else(|| {
            StoreError::Configuration("--endpoint or CASBIN_S3_ENDPOINT is required".into())
        })?;
        let bucket = self.bucket.clone().ok_or_else(|| {
            StoreError::Configuration("--bucket or CASBIN_S3_BUCKET is required".into())
        })?;

        let mut cfg = StoreConfig::new(endpoint, self.region.clone(), bucket, self.key.clone());
        cfg.operation_timeout_secs = self.timeout;
        cfg.validate()?;
        Ok(cfg)
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    #[command(about = "Upload a local policy file as the bucket snapshot")]
    Push {
        #[arg(value_name = "POLICY_CSV")]
        policy: PathBuf,
    },
    #[command(about = "Download the bucket snapshot to a file, or print it")]
    Pull {
        #[arg(value_name = "OUTPUT_CSV")]
        output: Option<PathBuf>,
    },
    #[command(about = "Check a request against the bucket snapshot, exit 1 on deny")]
    Enforce {
        #[arg(value_name = "SUB")]
        sub: String,
        #[arg(value_name = "OBJ")]
        obj: String,
        #[arg(value_name = "ACT")]
        act: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_build_config() {
        let cli = Cli::try_parse_from([
            "casbin-s3",
            "--model",
            "model.conf",
            "--endpoint",
            "http://localhost:9000",
            "--bucket",
            "testbuck",
            "enforce",
            "alice",
            "data1",
            "read",
        ])
        .unwrap();

        let cfg = cli.store.to_config().unwrap();
        assert_eq!(cfg.bucket, "testbuck");
        assert_eq!(cfg.key, "policy.csv");
        assert_eq!(cfg.region, "us-east-1");
        assert!(matches!(cli.command, Commands::Enforce { .. }));
    }

    #[test]
    fn test_missing_bucket_is_configuration_error() {
        let cli = Cli::try_parse_from([
            "casbin-s3",
            "-m",
            "model.conf",
            "--endpoint",
            "http://localhost:9000",
            "pull",
        ])
        .unwrap();

        let err = cli.store.to_config().unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }
}
