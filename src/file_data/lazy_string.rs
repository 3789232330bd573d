use tracing::{debug, trace};
use crate::blob::BlobStore;
use crate::error::Result;
use crate::operation::EditOperation;
use super::hash::HashFileData;
use super::hollow::HollowStringFileData;
use super::string::{RawRanges, StringFileData};
use super::RawFileData;

/// A text file whose content still lives in the blob store. Edits made to it are queued up and
/// replayed when the content is finally loaded.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct LazyStringFileData {
    hash: String,
    ranges_hash: Option<String>,
    string_length: usize,
    operations: Vec<EditOperation>,
}

impl LazyStringFileData {
    pub fn new(hash: impl Into<String>, ranges_hash: Option<String>, string_length: usize) -> Self {
        Self::with_operations(hash, ranges_hash, string_length, Vec::new())
    }

    pub fn with_operations(hash: impl Into<String>, ranges_hash: Option<String>, string_length: usize, operations: Vec<EditOperation>) -> Self {
        LazyStringFileData { hash: hash.into(), ranges_hash, string_length, operations }
    }

    pub fn hash(&self) -> &str { &self.hash }

    pub fn ranges_hash(&self) -> Option<&str> { self.ranges_hash.as_deref() }

    /// Length of the text after all queued operations, in UTF-16 code units.
    pub fn string_length(&self) -> usize { self.string_length }

    pub fn operations(&self) -> &[EditOperation] { &self.operations }

    /// Queue an edit. The content isn't loaded, but the operation must still fit the current
    /// length.
    pub fn edit(&mut self, op: EditOperation) -> Result<()> {
        self.string_length = op.apply_to_length(self.string_length)?;
        trace!(string_length = self.string_length, queued = self.operations.len() + 1, "queued edit");
        self.operations.push(op);
        Ok(())
    }

    /// Load the content (and then the ranges, if there are any) and replay the queued edits.
    pub async fn to_eager(&self, store: &dyn BlobStore) -> Result<StringFileData> {
        let content = store.get_string(&self.hash).await?;
        let ranges: RawRanges = match &self.ranges_hash {
            Some(ranges_hash) => {
                let obj = store.get_object(ranges_hash).await?;
                serde_json::from_value(obj)?
            }
            None => RawRanges::default(),
        };

        let mut file = StringFileData::from_raw_parts(content, ranges.comments, ranges.tracked_changes)?;
        if !self.operations.is_empty() {
            debug!(hash = %self.hash, operations = self.operations.len(), "replaying queued operations");
        }
        for op in &self.operations {
            op.apply(&mut file)?;
        }
        Ok(file)
    }

    pub fn to_hollow(&self) -> HollowStringFileData {
        HollowStringFileData::new(self.string_length)
    }

    /// With nothing queued, the blobs we point at are already current and nothing gets written.
    /// Otherwise the edits are applied and the result is stored, and this file points at the new
    /// blobs from then on.
    pub async fn store(&mut self, store: &dyn BlobStore) -> Result<HashFileData> {
        if self.operations.is_empty() {
            return Ok(HashFileData::new(self.hash.clone(), self.ranges_hash.clone()));
        }

        let eager = self.to_eager(store).await?;
        let stored = eager.store(store).await?;

        self.hash = stored.hash().to_string();
        self.ranges_hash = stored.ranges_hash().map(str::to_string);
        self.string_length = eager.string_length();
        self.operations = Vec::new();
        Ok(stored)
    }

    pub fn to_raw(&self) -> RawFileData {
        RawFileData {
            hash: Some(self.hash.clone()),
            ranges_hash: self.ranges_hash.clone(),
            string_length: Some(self.string_length),
            operations: (!self.operations.is_empty())
                .then(|| self.operations.iter().map(EditOperation::to_raw).collect()),
            ..Default::default()
        }
    }
}
