use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use smartstring::alias::String as SmartString;
use crate::error::Result;
use crate::range::{Range, RawRange};
use crate::span::AppendRle;

/// A comment thread anchored to one or more spans of text. Almost every comment covers exactly one
/// span.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Comment {
    pub ranges: SmallVec<Range, 1>,
    pub resolved: bool,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawComment {
    pub id: SmartString,
    pub ranges: Vec<RawRange>,
    #[serde(default)]
    pub resolved: bool,
}

impl Comment {
    pub fn new<I: IntoIterator<Item = Range>>(ranges: I, resolved: bool) -> Self {
        let mut comment = Comment { ranges: ranges.into_iter().collect(), resolved };
        comment.merge_ranges();
        comment
    }

    /// Text was inserted at `cursor`. If `extend` is set, the insert is part of this comment and
    /// the comment grows to cover it. Otherwise the comment makes room for it.
    pub fn apply_insert(&mut self, cursor: usize, length: usize, extend: bool) -> Result<()> {
        let mut extended = false;
        let mut new_ranges: SmallVec<Range, 1> = SmallVec::new();

        for range in self.ranges.iter() {
            if cursor == range.end() {
                if extend {
                    new_ranges.push(range.extend_by(length));
                    extended = true;
                } else {
                    new_ranges.push(*range);
                }
            } else if cursor == range.start() {
                if extend {
                    new_ranges.push(range.extend_by(length));
                    extended = true;
                } else {
                    new_ranges.push(range.move_by(length as isize)?);
                }
            } else if range.start_is_after(cursor) {
                new_ranges.push(range.move_by(length as isize)?);
            } else if range.contains_cursor(cursor) {
                if extend {
                    new_ranges.push(range.extend_by(length));
                    extended = true;
                } else {
                    let (before, _, after) = range.insert_at(cursor, length)?;
                    new_ranges.push(before);
                    new_ranges.push(after);
                }
            } else {
                new_ranges.push(*range);
            }
        }

        if extend && !extended {
            new_ranges.push(Range::new(cursor, length));
        }

        self.ranges = new_ranges;
        self.merge_ranges();
        Ok(())
    }

    pub fn apply_delete(&mut self, deleted: &Range) -> Result<()> {
        let mut new_ranges: SmallVec<Range, 1> = SmallVec::new();

        for range in self.ranges.iter() {
            if range.overlaps(deleted) {
                new_ranges.push(range.subtract(deleted));
            } else if range.starts_after(deleted) {
                new_ranges.push(range.move_by(-(deleted.length as isize))?);
            } else {
                new_ranges.push(*range);
            }
        }

        self.ranges = new_ranges;
        self.merge_ranges();
        Ok(())
    }

    /// Sort the ranges, drop empty ones and glue together ranges which touch or overlap.
    fn merge_ranges(&mut self) {
        let mut sorted: Vec<Range> = self.ranges.iter().copied().filter(|r| !r.is_empty()).collect();
        sorted.sort_by_key(|r| r.start());

        let mut merged: SmallVec<Range, 1> = SmallVec::new();
        merged.extend_rle(sorted);
        self.ranges = merged;
    }

    pub fn to_raw(&self, id: &str) -> RawComment {
        RawComment {
            id: id.into(),
            ranges: self.ranges.iter().map(Range::to_raw).collect(),
            resolved: self.resolved,
        }
    }

    /// Raw ranges are taken as they come. They get normalized on the next edit.
    pub fn from_raw(raw: &RawComment) -> Result<Self> {
        let ranges = raw.ranges.iter()
            .map(|r| Range::from_raw(*r))
            .collect::<Result<SmallVec<Range, 1>>>()?;
        Ok(Comment { ranges, resolved: raw.resolved })
    }
}

/// All the comments in a file, keyed by comment id. Iteration order is insertion order.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct CommentList {
    comments: IndexMap<SmartString, Comment>,
}

impl CommentList {
    pub fn new() -> Self { Self::default() }

    pub fn from_raw(raw: &[RawComment]) -> Result<Self> {
        let mut list = CommentList::new();
        for raw_comment in raw {
            list.add(raw_comment.id.as_str(), Comment::from_raw(raw_comment)?);
        }
        Ok(list)
    }

    pub fn to_raw(&self) -> Vec<RawComment> {
        self.comments.iter().map(|(id, c)| c.to_raw(id)).collect()
    }

    /// `{id, resolved, ranges}` for every comment, in list order.
    pub fn get_comments(&self) -> Vec<RawComment> {
        self.to_raw()
    }

    pub fn get(&self, id: &str) -> Option<&Comment> {
        self.comments.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Comment)> {
        self.comments.iter().map(|(id, c)| (id.as_str(), c))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.comments.keys().map(|id| id.as_str())
    }

    pub fn len(&self) -> usize { self.comments.len() }

    pub fn is_empty(&self) -> bool { self.comments.is_empty() }

    /// Add a comment. If there's already a comment with this id, its ranges are replaced wholesale
    /// by the new comment's ranges. The existing resolved state is kept.
    // TODO: Merge and split the ranges of an existing comment instead of replacing them.
    pub fn add(&mut self, id: &str, comment: Comment) {
        if let Some(existing) = self.comments.get_mut(id) {
            existing.ranges = comment.ranges;
        } else {
            self.comments.insert(id.into(), comment);
        }
    }

    pub fn delete(&mut self, id: &str) -> Option<Comment> {
        self.comments.shift_remove(id)
    }

    /// Returns false if there's no comment with this id.
    pub fn set_resolved(&mut self, id: &str, resolved: bool) -> bool {
        match self.comments.get_mut(id) {
            Some(comment) => {
                comment.resolved = resolved;
                true
            }
            None => false,
        }
    }

    /// Text was inserted over `range`. Comments named in `comment_ids` grow to cover it.
    pub fn apply_insert<S: AsRef<str>>(&mut self, range: &Range, comment_ids: &[S]) -> Result<()> {
        for (id, comment) in self.comments.iter_mut() {
            let extend = comment_ids.iter().any(|c| c.as_ref() == id.as_str());
            comment.apply_insert(range.pos, range.length, extend)?;
        }
        Ok(())
    }

    pub fn apply_delete(&mut self, range: &Range) -> Result<()> {
        for comment in self.comments.values_mut() {
            comment.apply_delete(range)?;
        }
        Ok(())
    }
}
