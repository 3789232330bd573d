use tracing::{debug, warn};
use crate::blob::{Blob, BlobStore};
use crate::error::{FileDataError, Result};
use super::{FileData, RawFileData};

/// A bare reference to file content (and optionally its comment and tracked change ranges) in the
/// blob store. Nothing has been loaded.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct HashFileData {
    hash: String,
    ranges_hash: Option<String>,
}

pub(super) async fn fetch_blob(store: &dyn BlobStore, hash: &str) -> Result<Blob> {
    match store.get_blob(hash).await? {
        Some(blob) => Ok(blob),
        None => {
            warn!(%hash, "blob not found");
            Err(FileDataError::BlobNotFound(hash.to_string()))
        }
    }
}

impl HashFileData {
    pub fn new(hash: impl Into<String>, ranges_hash: Option<String>) -> Self {
        HashFileData { hash: hash.into(), ranges_hash }
    }

    pub fn hash(&self) -> &str { &self.hash }

    pub fn ranges_hash(&self) -> Option<&str> { self.ranges_hash.as_deref() }

    /// Look the blob up to find out what sort of file this is. Text files come back lazy, binary
    /// files come back as [`FileData::Binary`].
    pub async fn to_lazy(&self, store: &dyn BlobStore) -> Result<FileData> {
        let blob = fetch_blob(store, &self.hash).await?;
        // Binary files don't have ranges.
        let ranges_blob = match (&self.ranges_hash, blob.string_length()) {
            (Some(ranges_hash), Some(_)) => Some(fetch_blob(store, ranges_hash).await?),
            _ => None,
        };
        debug!(hash = %self.hash, "hash file data to lazy");
        Ok(FileData::create_lazy_from_blobs(&blob, ranges_blob.as_ref()))
    }

    pub async fn to_eager(&self, store: &dyn BlobStore) -> Result<FileData> {
        match self.to_lazy(store).await? {
            FileData::LazyString(lazy) => Ok(FileData::String(lazy.to_eager(store).await?)),
            other => Ok(other),
        }
    }

    /// Only needs the blob's metadata, not its content.
    pub async fn to_hollow(&self, store: &dyn BlobStore) -> Result<FileData> {
        let blob = fetch_blob(store, &self.hash).await?;
        debug!(hash = %self.hash, "hash file data to hollow");
        Ok(FileData::create_hollow(blob.byte_length(), blob.string_length()))
    }

    pub fn to_raw(&self) -> RawFileData {
        RawFileData {
            hash: Some(self.hash.clone()),
            ranges_hash: self.ranges_hash.clone(),
            ..Default::default()
        }
    }
}
