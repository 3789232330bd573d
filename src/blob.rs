//! The blob store seam. File data never stores anything itself - it hands content to a
//! content-addressed blob store and keeps the hashes.

use async_trait::async_trait;
use serde_json::Value;
use crate::error::BlobStoreError;

/// Metadata about a stored blob.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Blob {
    hash: String,
    byte_length: usize,
    /// Length in UTF-16 code units. Only set for blobs holding valid text.
    string_length: Option<usize>,
}

impl Blob {
    pub fn new(hash: impl Into<String>, byte_length: usize, string_length: Option<usize>) -> Self {
        Blob { hash: hash.into(), byte_length, string_length }
    }

    pub fn hash(&self) -> &str { &self.hash }

    pub fn byte_length(&self) -> usize { self.byte_length }

    /// None for binary blobs.
    pub fn string_length(&self) -> Option<usize> { self.string_length }
}

/// Content-addressed storage. Implementations decide how (and whether) to retry. Calls made by
/// file data are always awaited one after another.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns Ok(None) if there's no blob with this hash.
    async fn get_blob(&self, hash: &str) -> Result<Option<Blob>, BlobStoreError>;

    /// Fails with [`BlobStoreError::NotFound`] if the blob doesn't exist.
    async fn get_string(&self, hash: &str) -> Result<String, BlobStoreError>;

    /// Fetch a blob which was written with `put_object`.
    async fn get_object(&self, hash: &str) -> Result<Value, BlobStoreError>;

    async fn put_string(&self, content: &str) -> Result<Blob, BlobStoreError>;

    async fn put_object(&self, obj: &Value) -> Result<Blob, BlobStoreError>;
}

#[cfg(feature = "memory-store")]
pub use memory::MemoryBlobStore;

#[cfg(feature = "memory-store")]
mod memory {
    use std::collections::HashMap;
    use std::sync::{Mutex, MutexGuard};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use async_trait::async_trait;
    use serde_json::Value;
    use sha1::{Digest, Sha1};
    use tracing::debug;
    use crate::error::BlobStoreError;
    use crate::unicount::count_utf16;
    use super::{Blob, BlobStore};

    /// Hash content the way git hashes blobs.
    pub(crate) fn git_blob_hash(bytes: &[u8]) -> String {
        let mut hasher = Sha1::new();
        hasher.update(format!("blob {}\0", bytes.len()).as_bytes());
        hasher.update(bytes);
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    #[derive(Debug)]
    struct StoredBlob {
        bytes: Vec<u8>,
        string_length: Option<usize>,
    }

    /// An in-memory blob store. Handy for tests, and for embedders which keep everything in
    /// process anyway.
    #[derive(Debug, Default)]
    pub struct MemoryBlobStore {
        blobs: Mutex<HashMap<String, StoredBlob>>,
        writes: AtomicUsize,
    }

    impl MemoryBlobStore {
        pub fn new() -> Self { Self::default() }

        fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, StoredBlob>>, BlobStoreError> {
            self.blobs.lock().map_err(|_| BlobStoreError::Storage("blob store lock poisoned".into()))
        }

        fn store(&self, bytes: Vec<u8>, string_length: Option<usize>) -> Result<Blob, BlobStoreError> {
            self.writes.fetch_add(1, Ordering::Relaxed);
            let hash = git_blob_hash(&bytes);
            let blob = Blob::new(hash.clone(), bytes.len(), string_length);
            debug!(%hash, bytes = bytes.len(), "stored blob");
            self.lock()?.entry(hash).or_insert(StoredBlob { bytes, string_length });
            Ok(blob)
        }

        /// Store binary content. The blob has no string length even if the bytes happen to be
        /// valid UTF-8.
        pub fn put_bytes(&self, bytes: &[u8]) -> Result<Blob, BlobStoreError> {
            self.store(bytes.to_vec(), None)
        }

        /// How many times something has been written to this store.
        pub fn write_count(&self) -> usize {
            self.writes.load(Ordering::Relaxed)
        }

        pub fn len(&self) -> usize {
            self.lock().map(|blobs| blobs.len()).unwrap_or(0)
        }

        pub fn is_empty(&self) -> bool { self.len() == 0 }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn get_blob(&self, hash: &str) -> Result<Option<Blob>, BlobStoreError> {
            Ok(self.lock()?.get(hash).map(|stored| {
                Blob::new(hash, stored.bytes.len(), stored.string_length)
            }))
        }

        async fn get_string(&self, hash: &str) -> Result<String, BlobStoreError> {
            let blobs = self.lock()?;
            let stored = blobs.get(hash).ok_or_else(|| BlobStoreError::NotFound(hash.to_string()))?;
            String::from_utf8(stored.bytes.clone())
                .map_err(|_| BlobStoreError::Storage(format!("blob {hash} is not valid UTF-8")))
        }

        async fn get_object(&self, hash: &str) -> Result<Value, BlobStoreError> {
            let s = self.get_string(hash).await?;
            Ok(serde_json::from_str(&s)?)
        }

        async fn put_string(&self, content: &str) -> Result<Blob, BlobStoreError> {
            self.store(content.as_bytes().to_vec(), Some(count_utf16(content)))
        }

        async fn put_object(&self, obj: &Value) -> Result<Blob, BlobStoreError> {
            let s = serde_json::to_string(obj)?;
            self.put_string(&s).await
        }
    }

    #[cfg(test)]
    mod test {
        use serde_json::json;
        use super::*;

        #[test]
        fn hashes_like_git() {
            assert_eq!(git_blob_hash(b""), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
            assert_eq!(git_blob_hash(b"hello\n"), "ce013625030ba8dba906f756967f9e9ca394464a");
        }

        #[tokio::test]
        async fn strings_and_objects() {
            let store = MemoryBlobStore::new();
            let blob = store.put_string("hello\n").await.unwrap();
            assert_eq!(blob.hash(), "ce013625030ba8dba906f756967f9e9ca394464a");
            assert_eq!(blob.byte_length(), 6);
            assert_eq!(blob.string_length(), Some(6));
            assert_eq!(store.get_string(blob.hash()).await.unwrap(), "hello\n");

            let obj = json!({"comments": [], "trackedChanges": []});
            let blob = store.put_object(&obj).await.unwrap();
            assert_eq!(store.get_object(blob.hash()).await.unwrap(), obj);
            assert_eq!(store.write_count(), 2);
            assert_eq!(store.len(), 2);
        }

        #[tokio::test]
        async fn lengths_count_utf16() {
            let store = MemoryBlobStore::new();
            let blob = store.put_string("日本𐆐").await.unwrap();
            assert_eq!(blob.byte_length(), 10);
            assert_eq!(blob.string_length(), Some(4));
        }

        #[tokio::test]
        async fn binary_blobs() {
            let store = MemoryBlobStore::new();
            let blob = store.put_bytes(&[0xff, 0x00, 0x10]).unwrap();
            assert_eq!(blob.string_length(), None);

            let fetched = store.get_blob(blob.hash()).await.unwrap().unwrap();
            assert_eq!(fetched, blob);
            assert!(matches!(store.get_string(blob.hash()).await, Err(BlobStoreError::Storage(_))));
        }

        #[tokio::test]
        async fn missing_blobs() {
            let store = MemoryBlobStore::new();
            assert_eq!(store.get_blob("nope").await.unwrap(), None);
            assert!(matches!(store.get_string("nope").await, Err(BlobStoreError::NotFound(_))));
            assert!(matches!(store.get_object("nope").await, Err(BlobStoreError::NotFound(_))));
        }
    }
}
