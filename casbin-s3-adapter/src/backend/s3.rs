//! S3 backend built on aws-sdk-s3. Works against AWS and S3-compatible
//! services such as MinIO, which need path-style addressing and unsigned
//! payloads.

use std::io;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig, timeout::TimeoutConfig};
use aws_sdk_s3::{
    Client,
    config::{Region, RequestChecksumCalculation},
    primitives::ByteStream,
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;

use crate::backend::{ObjectBackend, ObjectReader};
use crate::config::StoreConfig;
use crate::error::{BoxError, StoreError};

#[derive(Debug, Clone)]
pub struct S3Backend {
    client: Client,
    bucket: String,
    unsigned_payload: bool,
}

impl S3Backend {
    /// Builds a client for `config`. Credentials come from the SDK's default
    /// provider chain and are resolved lazily, so nothing is sent here.
    pub async fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if let Some(timeout) = config.operation_timeout() {
            loader = loader.timeout_config(
                TimeoutConfig::builder().operation_timeout(timeout).build(),
            );
        }
        let shared = loader.load().await;

        Ok(Self::from_sdk_config(&shared, config))
    }

    /// Builds the client from an already loaded SDK configuration. The
    /// endpoint override lives on this client only, so adapters pointing at
    /// different services can share a process.
    pub fn from_sdk_config(shared: &SdkConfig, config: &StoreConfig) -> Self {
        let mut builder = aws_sdk_s3::config::Builder::from(shared)
            .endpoint_url(config.endpoint.clone())
            .force_path_style(config.force_path_style);
        if config.unsigned_payload {
            builder = builder
                .request_checksum_calculation(RequestChecksumCalculation::WhenRequired);
        }

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            unsigned_payload: config.unsigned_payload,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn md5_base64(data: &[u8]) -> String {
        let sum = md5::compute(data);
        B64.encode(sum.0)
    }
}

#[async_trait]
impl ObjectBackend for S3Backend {
    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<(), BoxError> {
        let checksum = Self::md5_base64(&data);
        let req = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type("text/csv")
            .content_md5(checksum)
            .body(ByteStream::from(data));

        let resp = if self.unsigned_payload {
            req.customize().disable_payload_signing().send().await
        } else {
            req.send().await
        };
        resp?;

        tracing::debug!(bucket = %self.bucket, key, "stored policy object");
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<ObjectReader, BoxError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match resp {
            Ok(o) => {
                tracing::debug!(
                    bucket = %self.bucket,
                    key,
                    content_length = o.content_length().unwrap_or_default(),
                    "opened policy object"
                );
                Ok(Box::pin(o.body.into_async_read()))
            }
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    Err(Box::new(io::Error::new(io::ErrorKind::NotFound, e)))
                } else {
                    Err(Box::new(e))
                }
            }
        }
    }
}
