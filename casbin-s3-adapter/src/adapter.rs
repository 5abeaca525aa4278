//! casbin `Adapter` that keeps the whole policy as one object.
//!
//! Only snapshot semantics are offered: the object is read in full on load
//! and replaced in full on save. Single-rule mutations are refused with
//! [`StoreError::NotImplemented`]; change the model through the enforcer with
//! auto-save disabled and call `save_policy` afterwards.

use async_trait::async_trait;
use casbin::{Adapter, Filter, Model, Result};
use tokio::io::AsyncBufReadExt;

use crate::backend::ObjectBackend;
use crate::backend::s3::S3Backend;
use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::policy::{self, PolicyLine};

pub struct PolicyAdapter<B: ObjectBackend> {
    backend: B,
    key: String,
    is_filtered: bool,
}

/// Adapter backed by an S3 bucket.
pub type S3Adapter = PolicyAdapter<S3Backend>;

impl S3Adapter {
    /// Validates `config` and builds the storage client. No request is sent.
    pub async fn new(config: StoreConfig) -> std::result::Result<Self, StoreError> {
        let backend = S3Backend::new(&config).await?;
        Ok(Self::with_backend(backend, config.key))
    }
}

impl<B: ObjectBackend> PolicyAdapter<B> {
    pub fn with_backend(backend: B, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
            is_filtered: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Streams the object into `m` line by line. Returns how many rules the
    /// model accepted. A failure halfway through leaves the lines read so far
    /// in the model.
    pub async fn load(&self, m: &mut dyn Model) -> std::result::Result<usize, StoreError> {
        self.load_matching(m, |_| true).await.map(|(added, _)| added)
    }

    /// Like [`load`](Self::load), keeping only the rules that match `f`.
    /// Returns true when at least one rule was filtered out.
    pub async fn load_filtered(
        &self,
        m: &mut dyn Model,
        f: &Filter<'_>,
    ) -> std::result::Result<bool, StoreError> {
        self.load_matching(m, |line| line.matches(f))
            .await
            .map(|(_, skipped)| skipped > 0)
    }

    async fn load_matching<F>(
        &self,
        m: &mut dyn Model,
        keep: F,
    ) -> std::result::Result<(usize, usize), StoreError>
    where
        F: Fn(&PolicyLine) -> bool + Send + Sync,
    {
        let reader = self
            .backend
            .get_object(&self.key)
            .await
            .map_err(|e| StoreError::retrieval(&self.key, e))?;

        let mut lines = reader.lines();
        let (mut added, mut skipped) = (0usize, 0usize);
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| StoreError::retrieval(&self.key, e))?
        {
            let Some(parsed) = policy::parse_line(&line) else {
                continue;
            };
            if !keep(&parsed) {
                skipped += 1;
                continue;
            }
            if policy::apply_line(parsed, m) {
                added += 1;
            }
        }

        tracing::debug!(key = %self.key, added, skipped, "loaded policy");
        Ok((added, skipped))
    }

    /// Writes every `p` and `g` rule of `m` as a new snapshot. Returns the
    /// object size in bytes.
    pub async fn save(&self, m: &dyn Model) -> std::result::Result<usize, StoreError> {
        let buf = policy::serialize_model(m);
        let len = buf.len();
        self.backend
            .put_object(&self.key, buf)
            .await
            .map_err(|e| StoreError::persistence(&self.key, e))?;

        tracing::debug!(key = %self.key, bytes = len, "saved policy");
        Ok(len)
    }

    /// Replaces the object with an empty snapshot.
    pub async fn clear(&self) -> std::result::Result<(), StoreError> {
        self.backend
            .put_object(&self.key, Vec::new())
            .await
            .map_err(|e| StoreError::persistence(&self.key, e))
    }
}

#[async_trait]
impl<B: ObjectBackend + 'static> Adapter for PolicyAdapter<B> {
    async fn load_policy(&mut self, m: &mut dyn Model) -> Result<()> {
        self.is_filtered = false;
        self.load(m).await?;
        Ok(())
    }

    async fn load_filtered_policy<'a>(&mut self, m: &mut dyn Model, f: Filter<'a>) -> Result<()> {
        self.is_filtered = self.load_filtered(m, &f).await?;
        Ok(())
    }

    async fn save_policy(&mut self, m: &mut dyn Model) -> Result<()> {
        if self.is_filtered {
            return Err(StoreError::FilteredSave(self.key.clone()).into());
        }
        self.save(m).await?;
        Ok(())
    }

    async fn clear_policy(&mut self) -> Result<()> {
        self.clear().await?;
        self.is_filtered = false;
        Ok(())
    }

    fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    async fn add_policy(&mut self, _sec: &str, _ptype: &str, _rule: Vec<String>) -> Result<bool> {
        Err(StoreError::NotImplemented("add_policy").into())
    }

    async fn add_policies(
        &mut self,
        _sec: &str,
        _ptype: &str,
        _rules: Vec<Vec<String>>,
    ) -> Result<bool> {
        Err(StoreError::NotImplemented("add_policies").into())
    }

    async fn remove_policy(
        &mut self,
        _sec: &str,
        _ptype: &str,
        _rule: Vec<String>,
    ) -> Result<bool> {
        Err(StoreError::NotImplemented("remove_policy").into())
    }

    async fn remove_policies(
        &mut self,
        _sec: &str,
        _ptype: &str,
        _rules: Vec<Vec<String>>,
    ) -> Result<bool> {
        Err(StoreError::NotImplemented("remove_policies").into())
    }

    async fn remove_filtered_policy(
        &mut self,
        _sec: &str,
        _ptype: &str,
        _field_index: usize,
        _field_values: Vec<String>,
    ) -> Result<bool> {
        Err(StoreError::NotImplemented("remove_filtered_policy").into())
    }
}
