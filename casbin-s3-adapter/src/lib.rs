//! casbin policy storage on S3-compatible object storage.
//!
//! The whole policy lives in one object as `<ptype>, <field>, ...` lines.
//! [`S3Adapter`] plugs into a casbin `Enforcer`: `load_policy` streams the
//! object into the model and `save_policy` replaces the object with the
//! model's current rules.
//!
//! ```no_run
//! use casbin::{CoreApi, DefaultModel, Enforcer};
//! use casbin_s3_adapter::{S3Adapter, StoreConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoreConfig::new("http://localhost:9000", "my-region", "testbuck", "policy.csv");
//! let adapter = S3Adapter::new(config).await?;
//! let model = DefaultModel::from_file("rbac_model.conf").await?;
//! let e = Enforcer::new(model, adapter).await?;
//! assert!(e.enforce(("alice", "data1", "read"))?);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod backend;
pub mod config;
pub mod error;
pub mod policy;

pub use adapter::{PolicyAdapter, S3Adapter};
pub use backend::{ObjectBackend, ObjectReader, localfs::LocalFsBackend, s3::S3Backend};
pub use config::StoreConfig;
pub use error::{BoxError, StoreError};
