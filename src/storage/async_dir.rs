//! Async facade
//!
//! Runs [`UserDir`] operations on the tokio blocking pool so async protocol
//! servers can call the adapter without stalling their worker threads.

use std::io;
use tokio::task;

use crate::auth::AuthInfo;
use crate::error::StorageError;
use crate::storage::filesystem::{FileSystemProvider, UserDir};
use crate::storage::flags::OpenFlags;
use crate::storage::results::FileStat;

#[derive(Clone)]
pub struct AsyncUserDir {
    inner: UserDir,
}

impl AsyncUserDir {
    pub fn new(inner: UserDir) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &UserDir {
        &self.inner
    }

    pub async fn make_directory(
        &self,
        auth: &AuthInfo,
        name: &str,
        mode: u32,
    ) -> Result<(), StorageError> {
        let (auth, name) = (auth.clone(), name.to_string());
        self.run(move |dir| dir.make_directory(&auth, &name, mode))
            .await
    }

    pub async fn open(
        &self,
        auth: &AuthInfo,
        name: &str,
        flags: OpenFlags,
        mode: u32,
    ) -> Result<tokio::fs::File, StorageError> {
        let (auth, name) = (auth.clone(), name.to_string());
        let file = self
            .run(move |dir| dir.open(&auth, &name, flags, mode))
            .await?;
        Ok(tokio::fs::File::from_std(file))
    }

    pub async fn remove_all(&self, auth: &AuthInfo, name: &str) -> Result<(), StorageError> {
        let (auth, name) = (auth.clone(), name.to_string());
        self.run(move |dir| dir.remove_all(&auth, &name)).await
    }

    pub async fn rename(
        &self,
        auth: &AuthInfo,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), StorageError> {
        let (auth, old_name, new_name) = (auth.clone(), old_name.to_string(), new_name.to_string());
        self.run(move |dir| dir.rename(&auth, &old_name, &new_name))
            .await
    }

    pub async fn stat(&self, auth: &AuthInfo, name: &str) -> Result<FileStat, StorageError> {
        let (auth, name) = (auth.clone(), name.to_string());
        self.run(move |dir| dir.stat(&auth, &name)).await
    }

    async fn run<T, F>(&self, operation: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&UserDir) -> Result<T, StorageError> + Send + 'static,
    {
        let dir = self.inner.clone();
        task::spawn_blocking(move || operation(&dir))
            .await
            .map_err(|e| StorageError::IoError(io::Error::from(e)))?
    }
}
