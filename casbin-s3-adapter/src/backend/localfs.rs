//! Local directory backend, used as a bucket mock and for policy files on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::{
    fs,
    io::{AsyncWriteExt, BufReader},
};

use crate::backend::{ObjectBackend, ObjectReader};
use crate::error::BoxError;

pub struct LocalFsBackend {
    root: PathBuf,
}

impl LocalFsBackend {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectBackend for LocalFsBackend {
    async fn put_object(&self, key: &str, data: Vec<u8>) -> Result<(), BoxError> {
        let path = self.path_for(key);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).await?;
        }
        let file_name = path
            .file_name()
            .ok_or_else(|| format!("object key `{key}` has no file name"))?
            .to_string_lossy()
            .into_owned();
        // Write next to the target and rename over it: readers see either the
        // previous snapshot or the new one.
        let tmp = path.with_file_name(format!(".{file_name}.tmp"));
        let mut f = fs::File::create(&tmp).await?;
        f.write_all(&data).await?;
        f.flush().await?;
        f.sync_all().await?;
        drop(f);
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(Box::new(e));
        }
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<ObjectReader, BoxError> {
        let file = fs::File::open(self.path_for(key)).await?;
        Ok(Box::pin(BufReader::new(file)))
    }
}
