//! Whole-file encryption on top of [`crate::streaming`]
//!
//! `encrypt_file(path)` turns `path` into `path.encrypted` and
//! `decrypt_file(path)` turns `path.encrypted` back into `path`. Output is
//! staged in a `.partial` sibling, fsynced, then renamed into place; the
//! input is removed only after the rename. If anything fails, or the future is
//! dropped halfway, the staging file is deleted and the input is untouched.
//!
//! Concurrent operations on the same path are not coordinated here.

use crate::{
    Result, DEFAULT_CHUNK_SIZE,
    keys::SymmetricKey,
    streaming::{decrypt_stream, encrypt_stream},
};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncRead;
use tracing::{debug, instrument, warn};

/// Suffix appended to an encrypted file's name
pub const ENCRYPTED_SUFFIX: &str = ".encrypted";

/// Suffix of the staging file written before the final rename
pub const PARTIAL_SUFFIX: &str = ".partial";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// The location `encrypt_file(path)` writes to
pub fn encrypted_path(path: impl AsRef<Path>) -> PathBuf {
    with_suffix(path.as_ref(), ENCRYPTED_SUFFIX)
}

/// Staging file that deletes itself unless committed
struct StagingFile {
    path: PathBuf,
    file: Option<File>,
    committed: bool,
}

impl StagingFile {
    async fn create(target: &Path) -> Result<Self> {
        let path = with_suffix(target, PARTIAL_SUFFIX);
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .await?;
        Ok(Self {
            path,
            file: Some(file),
            committed: false,
        })
    }

    fn file_mut(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "staging file already closed").into()
        })
    }

    /// Flush to disk, close, and move into `target`
    async fn commit(mut self, target: &Path) -> Result<()> {
        if let Some(file) = self.file.take() {
            file.sync_all().await?;
        }
        fs::rename(&self.path, target).await?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for StagingFile {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        self.file.take();
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Discarded staging file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove staging file"),
        }
    }
}

/// Encrypts and decrypts files in place under one symmetric key
#[derive(Clone, Debug)]
pub struct FileCipher {
    key: SymmetricKey,
    chunk_size: usize,
}

impl FileCipher {
    /// Create a file cipher with the default chunk size
    pub fn new(key: SymmetricKey) -> Self {
        Self::with_chunk_size(key, DEFAULT_CHUNK_SIZE)
    }

    /// Create with a specific read chunk size
    pub fn with_chunk_size(key: SymmetricKey, chunk_size: usize) -> Self {
        Self { key, chunk_size }
    }

    /// Encrypt `path` into `path.encrypted`, then remove `path`.
    ///
    /// Returns the path of the encrypted file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn encrypt_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let source = path.as_ref();
        let target = encrypted_path(source);

        let mut input = File::open(source).await?;
        let written = self.encrypt_into(&mut input, &target).await?;
        drop(input);

        fs::remove_file(source).await?;
        debug!(bytes = written, "Encrypted file");
        Ok(target)
    }

    /// Encrypt everything `input` yields into `target` via a staging file
    async fn encrypt_into<R>(&self, input: &mut R, target: &Path) -> Result<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut staging = StagingFile::create(target).await?;
        let written = encrypt_stream(&self.key, input, staging.file_mut()?, self.chunk_size).await?;
        staging.commit(target).await?;
        Ok(written)
    }

    /// Decrypt `path.encrypted` into `path`, then remove `path.encrypted`.
    ///
    /// Returns the path of the restored file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn decrypt_file(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let target = path.as_ref().to_path_buf();
        let source = encrypted_path(&target);

        let mut input = File::open(&source).await?;
        let mut staging = StagingFile::create(&target).await?;
        let written = decrypt_stream(&self.key, &mut input, staging.file_mut()?, self.chunk_size).await?;
        drop(input);
        staging.commit(&target).await?;

        fs::remove_file(&source).await?;
        debug!(bytes = written, "Decrypted file");
        Ok(target)
    }
}
