//! Editable file data for collaborative text documents, along with the comments and tracked
//! changes attached to the text.
//!
//! The core type is [`FileData`], which holds a file's content at one of several levels of
//! materialization. Fully loaded text files ([`StringFileData`]) carry:
//!
//! - The text itself
//! - A [`CommentList`] of comment threads anchored to spans of text
//! - A [`TrackedChangeList`] of spans marked as inserted or deleted by some user, pending review
//!
//! Edits arrive as [`EditOperation`]s, usually wrapping a [`TextOperation`]. Applying an operation
//! updates the text, the comments and the tracked changes together so they stay consistent.
//!
//! All positions are measured in UTF-16 code units, since thats what the editors produce.
//!
//! ## Example
//!
//! ```
//! use filedata::*;
//!
//! let mut file = StringFileData::new("hello world");
//! let mut op = TextOperation::new();
//! op.retain(6).remove(5).insert("there").unwrap();
//! file.edit(&op.into()).unwrap();
//! assert_eq!(file.content(), "hello there");
//! ```
//!
//! Content which isn't loaded lives in a content-addressed [`BlobStore`]. Loading, storing and
//! converting between representations are async, since they talk to the store. Nothing in this
//! crate retries failed store calls.
//!
//! ## Wire format
//!
//! Everything here has a raw JSON form used for storage and sync. The value types implement
//! `Serialize` / `Deserialize` in terms of those raw forms, so you can go straight to and from
//! JSON with serde_json.

pub mod range;
pub mod span;
pub mod unicount;
pub mod tracking;
pub mod tracked_change;
pub mod tracked_change_list;
pub mod comment;
pub mod operation;
pub mod blob;
pub mod file_data;
mod error;

pub use error::{BlobStoreError, FileDataError, Result};
pub use range::{Range, RawRange};
pub use tracking::{ClearTrackingProps, RawTrackingProps, TrackingDirective, TrackingProps, TrackingType};
pub use tracked_change::{RawTrackedChange, TrackedChange};
pub use tracked_change_list::TrackedChangeList;
pub use comment::{Comment, CommentList, RawComment};
pub use operation::{EditOperation, RawEditOperation, RawTextComponent, TextComponent, TextOperation};
pub use blob::{Blob, BlobStore};
#[cfg(feature = "memory-store")]
pub use blob::MemoryBlobStore;
pub use file_data::{
    BinaryFileData, FileData, GetContentOptions, HashFileData, HollowBinaryFileData,
    HollowStringFileData, LazyStringFileData, RawFileData, RawRanges, StringFileData,
};
