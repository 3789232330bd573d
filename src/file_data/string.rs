use std::borrow::Cow;
use serde::{Deserialize, Serialize};
use tracing::debug;
use crate::blob::BlobStore;
use crate::comment::{CommentList, RawComment};
use crate::error::Result;
use crate::operation::EditOperation;
use crate::tracked_change::RawTrackedChange;
use crate::tracked_change_list::TrackedChangeList;
use crate::tracking::TrackingType;
use crate::unicount::{count_utf16, slice_utf16};
use super::hash::HashFileData;
use super::hollow::HollowStringFileData;
use super::lazy_string::LazyStringFileData;
use super::RawFileData;

/// The ranges sidecar stored next to a text file's content when it has comments or tracked
/// changes.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRanges {
    #[serde(default)]
    pub comments: Vec<RawComment>,
    #[serde(default)]
    pub tracked_changes: Vec<RawTrackedChange>,
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct GetContentOptions {
    /// Leave out text covered by tracked deletes.
    pub filter_tracked_deletes: bool,
}

/// A fully loaded, editable text file.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct StringFileData {
    pub(crate) content: String,
    pub(crate) comments: CommentList,
    pub(crate) tracked_changes: TrackedChangeList,
}

impl StringFileData {
    pub fn new(content: impl Into<String>) -> Self {
        StringFileData { content: content.into(), ..Default::default() }
    }

    pub fn with_ranges(content: impl Into<String>, comments: CommentList, tracked_changes: TrackedChangeList) -> Self {
        StringFileData { content: content.into(), comments, tracked_changes }
    }

    pub fn from_raw_parts(content: String, comments: Vec<RawComment>, tracked_changes: Vec<RawTrackedChange>) -> Result<Self> {
        Ok(StringFileData {
            content,
            comments: CommentList::from_raw(&comments)?,
            tracked_changes: TrackedChangeList::from_raw(tracked_changes)?,
        })
    }

    pub fn content(&self) -> &str { &self.content }

    /// The content, optionally with tracked deletes cut out.
    pub fn get_content(&self, opts: GetContentOptions) -> Cow<'_, str> {
        if !opts.filter_tracked_deletes {
            return Cow::Borrowed(&self.content);
        }

        let mut result = String::with_capacity(self.content.len());
        let mut cursor = 0;
        for change in self.tracked_changes.as_sorted() {
            if change.tracking.kind != TrackingType::Delete || change.range.start() < cursor { continue; }
            result.push_str(slice_utf16(&self.content, cursor..change.range.start()));
            cursor = change.range.end();
        }
        let len = count_utf16(&self.content);
        if cursor < len {
            result.push_str(slice_utf16(&self.content, cursor..len));
        }
        Cow::Owned(result)
    }

    /// Length of the content in UTF-8 bytes.
    pub fn byte_length(&self) -> usize { self.content.len() }

    /// Length of the content in UTF-16 code units.
    pub fn string_length(&self) -> usize { count_utf16(&self.content) }

    pub fn comments(&self) -> &CommentList { &self.comments }

    pub fn comments_mut(&mut self) -> &mut CommentList { &mut self.comments }

    pub fn tracked_changes(&self) -> &TrackedChangeList { &self.tracked_changes }

    pub fn tracked_changes_mut(&mut self) -> &mut TrackedChangeList { &mut self.tracked_changes }

    pub fn edit(&mut self, op: &EditOperation) -> Result<()> {
        op.apply(self)
    }

    fn has_ranges(&self) -> bool {
        !self.comments.is_empty() || !self.tracked_changes.is_empty()
    }

    /// Write the content to the store, followed by the ranges if there are any.
    pub async fn store(&self, store: &dyn BlobStore) -> Result<HashFileData> {
        let blob = store.put_string(&self.content).await?;

        let ranges_hash = if self.has_ranges() {
            let ranges = RawRanges {
                comments: self.comments.to_raw(),
                tracked_changes: self.tracked_changes.to_raw(),
            };
            let ranges_blob = store.put_object(&serde_json::to_value(&ranges)?).await?;
            Some(ranges_blob.hash().to_string())
        } else {
            None
        };

        debug!(hash = %blob.hash(), ranges_hash = ?ranges_hash, "stored string file data");
        Ok(HashFileData::new(blob.hash(), ranges_hash))
    }

    pub async fn to_lazy(&self, store: &dyn BlobStore) -> Result<LazyStringFileData> {
        let stored = self.store(store).await?;
        Ok(LazyStringFileData::new(
            stored.hash(),
            stored.ranges_hash().map(str::to_string),
            self.string_length(),
        ))
    }

    pub fn to_hollow(&self) -> HollowStringFileData {
        HollowStringFileData::new(self.string_length())
    }

    pub fn to_raw(&self) -> RawFileData {
        RawFileData {
            content: Some(self.content.clone()),
            comments: (!self.comments.is_empty()).then(|| self.comments.to_raw()),
            tracked_changes: (!self.tracked_changes.is_empty()).then(|| self.tracked_changes.to_raw()),
            ..Default::default()
        }
    }
}
