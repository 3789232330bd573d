//! File data is the content of a file at one of several levels of materialization:
//!
//! - Hash: a bare reference to blobs in the blob store
//! - Lazy: a text file with a known length and a queue of edits waiting for the content to load
//! - Hollow: just the length. Used for files we never want to load
//! - Eager ([`StringFileData`]): the text itself along with its comments and tracked changes
//! - Binary: a reference to a binary blob
//!
//! Conversions between levels hand back new file data and leave the original alone. The only
//! thing which changes file data in place is editing it, and storing a lazy file with queued edits.
//!
//! On the wire there's no type tag. Which kind of file data a raw object holds is decided by which
//! fields it has - see [`FileData::from_raw`]. Existing stored data depends on that order.

mod binary;
mod hash;
mod hollow;
mod lazy_string;
mod string;

use std::borrow::Cow;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use crate::blob::{Blob, BlobStore};
use crate::comment::{CommentList, RawComment};
use crate::error::{FileDataError, Result};
use crate::operation::{EditOperation, RawEditOperation};
use crate::tracked_change::RawTrackedChange;
use crate::tracked_change_list::TrackedChangeList;

pub use binary::BinaryFileData;
pub use hash::HashFileData;
pub use hollow::{HollowBinaryFileData, HollowStringFileData};
pub use lazy_string::LazyStringFileData;
pub use string::{GetContentOptions, RawRanges, StringFileData};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawFileData", into = "RawFileData")]
pub enum FileData {
    Binary(BinaryFileData),
    Hash(HashFileData),
    LazyString(LazyStringFileData),
    HollowBinary(HollowBinaryFileData),
    HollowString(HollowStringFileData),
    String(StringFileData),
}

/// Every field any kind of file data can have on the wire.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFileData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<RawComment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracked_changes: Option<Vec<RawTrackedChange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<RawEditOperation>>,
}

impl FileData {
    /// Rebuild file data from its raw form. The first matching rule wins:
    ///
    /// 1. `hash` and `byteLength`: binary
    /// 2. `hash` and `stringLength`: lazy string
    /// 3. `hash`: hash
    /// 4. `byteLength`: hollow binary
    /// 5. `stringLength`: hollow string
    /// 6. `content`: string
    pub fn from_raw(raw: RawFileData) -> Result<FileData> {
        Ok(match raw {
            RawFileData { hash: Some(hash), byte_length: Some(byte_length), .. } => {
                FileData::Binary(BinaryFileData::new(hash, byte_length))
            }
            RawFileData { hash: Some(hash), string_length: Some(string_length), ranges_hash, operations, .. } => {
                let operations = operations.unwrap_or_default().into_iter()
                    .map(EditOperation::from_raw)
                    .collect::<Result<Vec<_>>>()?;
                FileData::LazyString(LazyStringFileData::with_operations(hash, ranges_hash, string_length, operations))
            }
            RawFileData { hash: Some(hash), ranges_hash, .. } => {
                FileData::Hash(HashFileData::new(hash, ranges_hash))
            }
            RawFileData { byte_length: Some(byte_length), .. } => {
                FileData::HollowBinary(HollowBinaryFileData::new(byte_length))
            }
            RawFileData { string_length: Some(string_length), .. } => {
                FileData::HollowString(HollowStringFileData::new(string_length))
            }
            RawFileData { content: Some(content), comments, tracked_changes, .. } => {
                FileData::String(StringFileData::from_raw_parts(
                    content,
                    comments.unwrap_or_default(),
                    tracked_changes.unwrap_or_default(),
                )?)
            }
            raw => return Err(FileDataError::UnexpectedFileData(serde_json::to_string(&raw)?)),
        })
    }

    pub fn to_raw(&self) -> RawFileData {
        match self {
            FileData::Binary(f) => f.to_raw(),
            FileData::Hash(f) => f.to_raw(),
            FileData::LazyString(f) => f.to_raw(),
            FileData::HollowBinary(f) => f.to_raw(),
            FileData::HollowString(f) => f.to_raw(),
            FileData::String(f) => f.to_raw(),
        }
    }

    /// Hollow file data. Files with a string length are text, anything else is binary.
    pub fn create_hollow(byte_length: usize, string_length: Option<usize>) -> FileData {
        match string_length {
            Some(string_length) => FileData::HollowString(HollowStringFileData::new(string_length)),
            None => FileData::HollowBinary(HollowBinaryFileData::new(byte_length)),
        }
    }

    /// File data for content which has already been stored. Blobs without a string length are
    /// binary.
    pub fn create_lazy_from_blobs(blob: &Blob, ranges_blob: Option<&Blob>) -> FileData {
        match blob.string_length() {
            Some(string_length) => FileData::LazyString(LazyStringFileData::new(
                blob.hash(),
                ranges_blob.map(|b| b.hash().to_string()),
                string_length,
            )),
            None => FileData::Binary(BinaryFileData::new(blob.hash(), blob.byte_length())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            FileData::Binary(_) => "binary",
            FileData::Hash(_) => "hash",
            FileData::LazyString(_) => "lazy string",
            FileData::HollowBinary(_) => "hollow binary",
            FileData::HollowString(_) => "hollow string",
            FileData::String(_) => "string",
        }
    }

    fn not_implemented(operation: &'static str, kind: &'static str) -> FileDataError {
        FileDataError::NotImplemented { operation, kind }
    }

    pub fn get_hash(&self) -> Option<&str> {
        match self {
            FileData::Binary(f) => Some(f.hash()),
            FileData::Hash(f) => Some(f.hash()),
            FileData::LazyString(f) => Some(f.hash()),
            _ => None,
        }
    }

    pub fn get_ranges_hash(&self) -> Option<&str> {
        match self {
            FileData::Hash(f) => f.ranges_hash(),
            FileData::LazyString(f) => f.ranges_hash(),
            _ => None,
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, FileData::LazyString(_) | FileData::HollowString(_) | FileData::String(_))
    }

    /// Only available once the content has been loaded.
    pub fn get_content(&self, opts: GetContentOptions) -> Option<Cow<'_, str>> {
        match self {
            FileData::String(f) => Some(f.get_content(opts)),
            _ => None,
        }
    }

    pub fn get_byte_length(&self) -> Option<usize> {
        match self {
            FileData::Binary(f) => Some(f.byte_length()),
            FileData::HollowBinary(f) => Some(f.byte_length()),
            FileData::String(f) => Some(f.byte_length()),
            _ => None,
        }
    }

    /// In UTF-16 code units.
    pub fn get_string_length(&self) -> Option<usize> {
        match self {
            FileData::LazyString(f) => Some(f.string_length()),
            FileData::HollowString(f) => Some(f.string_length()),
            FileData::String(f) => Some(f.string_length()),
            _ => None,
        }
    }

    pub fn get_comments(&self) -> Option<&CommentList> {
        match self {
            FileData::String(f) => Some(f.comments()),
            _ => None,
        }
    }

    pub fn get_tracked_changes(&self) -> Option<&TrackedChangeList> {
        match self {
            FileData::String(f) => Some(f.tracked_changes()),
            _ => None,
        }
    }

    pub fn edit(&mut self, op: EditOperation) -> Result<()> {
        let kind = self.kind();
        trace!(kind, ?op, "edit");
        match self {
            FileData::String(f) => f.edit(&op),
            FileData::LazyString(f) => f.edit(op),
            FileData::HollowString(f) => f.edit(&op),
            _ => Err(Self::not_implemented("edit", kind)),
        }
    }

    /// Load everything. Hollow files have nothing to load from.
    pub async fn to_eager(&self, store: &dyn BlobStore) -> Result<FileData> {
        debug!(kind = self.kind(), "to eager");
        match self {
            FileData::Binary(_) | FileData::String(_) => Ok(self.clone()),
            FileData::Hash(f) => f.to_eager(store).await,
            FileData::LazyString(f) => Ok(FileData::String(f.to_eager(store).await?)),
            FileData::HollowBinary(_) | FileData::HollowString(_) => Err(Self::not_implemented("to_eager", self.kind())),
        }
    }

    /// Eager string data gets stored to produce the lazy form.
    pub async fn to_lazy(&self, store: &dyn BlobStore) -> Result<FileData> {
        debug!(kind = self.kind(), "to lazy");
        match self {
            FileData::Binary(_) | FileData::LazyString(_) => Ok(self.clone()),
            FileData::Hash(f) => f.to_lazy(store).await,
            FileData::String(f) => Ok(FileData::LazyString(f.to_lazy(store).await?)),
            FileData::HollowBinary(_) | FileData::HollowString(_) => Err(Self::not_implemented("to_lazy", self.kind())),
        }
    }

    pub async fn to_hollow(&self, store: &dyn BlobStore) -> Result<FileData> {
        debug!(kind = self.kind(), "to hollow");
        match self {
            FileData::Binary(f) => Ok(FileData::HollowBinary(f.to_hollow())),
            FileData::Hash(f) => f.to_hollow(store).await,
            FileData::LazyString(f) => Ok(FileData::HollowString(f.to_hollow())),
            FileData::HollowBinary(_) | FileData::HollowString(_) => Ok(self.clone()),
            FileData::String(f) => Ok(FileData::HollowString(f.to_hollow())),
        }
    }

    /// Make sure the content is in the blob store and return a reference to it.
    pub async fn store(&mut self, store: &dyn BlobStore) -> Result<HashFileData> {
        let kind = self.kind();
        let stored = match self {
            FileData::Binary(f) => HashFileData::new(f.hash(), None),
            FileData::Hash(f) => f.clone(),
            FileData::LazyString(f) => f.store(store).await?,
            FileData::String(f) => f.store(store).await?,
            FileData::HollowBinary(_) | FileData::HollowString(_) => {
                return Err(Self::not_implemented("store", kind));
            }
        };
        debug!(hash = %stored.hash(), ranges_hash = ?stored.ranges_hash(), "stored file data");
        Ok(stored)
    }
}

impl TryFrom<RawFileData> for FileData {
    type Error = FileDataError;
    fn try_from(raw: RawFileData) -> Result<Self> { FileData::from_raw(raw) }
}

impl From<FileData> for RawFileData {
    fn from(data: FileData) -> Self { data.to_raw() }
}

impl From<BinaryFileData> for FileData {
    fn from(f: BinaryFileData) -> Self { FileData::Binary(f) }
}

impl From<HashFileData> for FileData {
    fn from(f: HashFileData) -> Self { FileData::Hash(f) }
}

impl From<LazyStringFileData> for FileData {
    fn from(f: LazyStringFileData) -> Self { FileData::LazyString(f) }
}

impl From<HollowBinaryFileData> for FileData {
    fn from(f: HollowBinaryFileData) -> Self { FileData::HollowBinary(f) }
}

impl From<HollowStringFileData> for FileData {
    fn from(f: HollowStringFileData) -> Self { FileData::HollowString(f) }
}

impl From<StringFileData> for FileData {
    fn from(f: StringFileData) -> Self { FileData::String(f) }
}
