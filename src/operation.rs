//! Edit operations on text files.
//!
//! A [`TextOperation`] is a list of components which walk over the whole document from start to
//! end. Each component either retains (skips over) some text, inserts new text or removes text.
//! Retains and inserts can carry tracking information, and inserts can name the comments the new
//! text belongs to.
//!
//! An [`EditOperation`] is anything which can be applied to an editable file: a text operation or
//! one of the comment edits.

use std::fmt::{Display, Formatter};
use serde::{Deserialize, Serialize};
use smartstring::alias::String as SmartString;
use tracing::trace;
use TextComponent::*;
use crate::comment::Comment;
use crate::error::{FileDataError, Result};
use crate::file_data::StringFileData;
use crate::range::{Range, RawRange};
use crate::span::{AppendRle, HasLength, MergableSpan, SplitableSpan};
use crate::tracking::{ClearTrackingProps, RawTrackingProps, TrackingDirective, TrackingProps};
use crate::unicount::{contains_non_bmp_chars, count_utf16, slice_utf16, utf16_to_bytes, utf16_to_bytes_exact};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TextComponent {
    Retain { length: usize, tracking: Option<TrackingDirective> },
    Insert { text: SmartString, tracking: Option<TrackingProps>, comment_ids: Vec<SmartString> },
    Remove { length: usize },
}

impl HasLength for TextComponent {
    /// Length in UTF-16 code units. For inserts this is the length of the inserted text.
    fn len(&self) -> usize {
        match self {
            Retain { length, .. } | Remove { length } => *length,
            Insert { text, .. } => count_utf16(text),
        }
    }
}

impl MergableSpan for TextComponent {
    fn can_append(&self, other: &Self) -> bool {
        match (self, other) {
            (Retain { tracking: a, .. }, Retain { tracking: b, .. }) => a == b,
            (Insert { tracking: ta, comment_ids: ca, .. }, Insert { tracking: tb, comment_ids: cb, .. }) => {
                ta == tb && ca == cb
            }
            (Remove { .. }, Remove { .. }) => true,
            _ => false,
        }
    }

    fn append(&mut self, other: Self) {
        match (self, other) {
            (Retain { length, .. }, Retain { length: other_len, .. })
            | (Remove { length }, Remove { length: other_len }) => *length = length.saturating_add(other_len),
            (Insert { text, .. }, Insert { text: other_text, .. }) => text.push_str(&other_text),
            _ => unreachable!("can_append said no"),
        }
    }
}

impl SplitableSpan for TextComponent {
    fn truncate(&mut self, at: usize) -> Self {
        match self {
            Retain { length, tracking } => {
                let rest = *length - at;
                *length = at;
                Retain { length: rest, tracking: tracking.clone() }
            }
            Insert { text, tracking, comment_ids } => {
                let byte_pos = utf16_to_bytes(text, at);
                let rest: SmartString = text[byte_pos..].into();
                let head: SmartString = text[..byte_pos].into();
                *text = head;
                Insert { text: rest, tracking: tracking.clone(), comment_ids: comment_ids.clone() }
            }
            Remove { length } => {
                let rest = *length - at;
                *length = at;
                Remove { length: rest }
            }
        }
    }
}

/// The wire form of one component. Plain numbers and strings are the compact forms: a positive
/// number retains, a negative number removes and a string inserts.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTextComponent {
    Count(i64),
    Text(String),
    Retain {
        r: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tracking: Option<RawTrackingProps>,
    },
    Insert {
        i: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tracking: Option<RawTrackingProps>,
        #[serde(default, rename = "commentIds", skip_serializing_if = "Option::is_none")]
        comment_ids: Option<Vec<SmartString>>,
    },
    Remove { d: usize },
}

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RawTextComponent>", into = "Vec<RawTextComponent>")]
pub struct TextOperation {
    components: Vec<TextComponent>,
    /// Length of every string this operation can be applied to.
    base_length: usize,
    /// Length of the string which results from applying this operation.
    target_length: usize,
}

impl TextOperation {
    /// Length of the longest file we'll attempt to edit, in UTF-16 code units.
    pub const MAX_STRING_LENGTH: usize = 2 * 1024 * 1024;

    pub fn new() -> Self { Self::default() }

    pub fn components(&self) -> &[TextComponent] { &self.components }

    pub fn base_length(&self) -> usize { self.base_length }

    pub fn target_length(&self) -> usize { self.target_length }

    pub fn retain(&mut self, length: usize) -> &mut Self {
        self.retain_with(length, None)
    }

    pub fn retain_with(&mut self, length: usize, tracking: Option<TrackingDirective>) -> &mut Self {
        if length == 0 { return self; }
        self.base_length = self.base_length.saturating_add(length);
        self.target_length = self.target_length.saturating_add(length);
        self.components.push_rle(Retain { length, tracking });
        self
    }

    pub fn insert(&mut self, text: &str) -> Result<&mut Self> {
        self.insert_with(text, None, Vec::new())
    }

    /// Insert text at the current position. Text with characters outside the BMP is rejected.
    ///
    /// An insert directly after a remove is moved in front of it. Both orders have the same effect,
    /// and this way equivalent operations compare equal.
    pub fn insert_with(&mut self, text: &str, tracking: Option<TrackingProps>, comment_ids: Vec<SmartString>) -> Result<&mut Self> {
        if contains_non_bmp_chars(text) {
            return Err(FileDataError::InvalidInsertion);
        }
        if text.is_empty() { return Ok(self); }

        self.target_length = self.target_length.saturating_add(count_utf16(text));
        let component = Insert { text: text.into(), tracking, comment_ids };

        if let Some(Remove { .. }) = self.components.last() {
            let idx = self.components.len() - 1;
            if idx > 0 && self.components[idx - 1].can_append(&component) {
                self.components[idx - 1].append(component);
            } else {
                self.components.insert(idx, component);
            }
        } else {
            self.components.push_rle(component);
        }
        Ok(self)
    }

    pub fn remove(&mut self, length: usize) -> &mut Self {
        if length == 0 { return self; }
        self.base_length = self.base_length.saturating_add(length);
        self.components.push_rle(Remove { length });
        self
    }

    /// Does applying this operation leave the document alone? A retain which carries tracking
    /// still changes the tracked changes, so it doesn't count.
    pub fn is_noop(&self) -> bool {
        match self.components.as_slice() {
            [] => true,
            [Retain { tracking: None, .. }] => true,
            _ => false,
        }
    }

    fn check_base_length(&self, length: usize) -> Result<()> {
        if length != self.base_length {
            return Err(FileDataError::apply_error(
                "the operation's base length must be equal to the string's length", self));
        }
        Ok(())
    }

    fn check_target_length(&self) -> Result<()> {
        if self.target_length > Self::MAX_STRING_LENGTH {
            return Err(FileDataError::TooLong(self.target_length));
        }
        Ok(())
    }

    /// The length of a document of `length` code units after this operation is applied to it.
    pub fn apply_to_length(&self, length: usize) -> Result<usize> {
        self.check_base_length(length)?;
        self.check_target_length()?;
        Ok(self.target_length)
    }

    /// Apply the operation to a plain string, producing the edited string. Editable text never
    /// contains characters outside the BMP.
    pub fn apply_to_string(&self, s: &str) -> Result<String> {
        if contains_non_bmp_chars(s) {
            return Err(FileDataError::apply_error("The string contains non BMP characters.", self));
        }
        self.check_base_length(count_utf16(s))?;
        self.check_target_length()?;

        let mut result = String::with_capacity(s.len());
        let mut rest = s;
        for c in &self.components {
            match c {
                Retain { length, .. } => {
                    let bytes = utf16_to_bytes_exact(rest, *length)
                        .ok_or_else(|| FileDataError::apply_error("retain ends inside a character", self))?;
                    result.push_str(&rest[..bytes]);
                    rest = &rest[bytes..];
                }
                Insert { text, .. } => result.push_str(text),
                Remove { length } => {
                    let bytes = utf16_to_bytes_exact(rest, *length)
                        .ok_or_else(|| FileDataError::apply_error("remove ends inside a character", self))?;
                    rest = &rest[bytes..];
                }
            }
        }
        debug_assert!(rest.is_empty());
        Ok(result)
    }

    /// Apply the operation to an editable file, keeping its comments and tracked changes in step
    /// with the text. The file is left untouched if anything fails.
    pub fn apply(&self, file: &mut StringFileData) -> Result<()> {
        let content = self.apply_to_string(&file.content)?;

        let mut comments = file.comments.clone();
        let mut cursor = 0;
        for c in &self.components {
            match c {
                Retain { length, .. } => cursor += length,
                Insert { text, comment_ids, .. } => {
                    let length = count_utf16(text);
                    comments.apply_insert(&Range::new(cursor, length), comment_ids)?;
                    cursor += length;
                }
                Remove { length } => comments.apply_delete(&Range::new(cursor, *length))?,
            }
        }

        let mut tracked_changes = file.tracked_changes.clone();
        tracked_changes.apply_text_operation(self)?;

        trace!(op = %self, "applied text operation");
        file.content = content;
        file.comments = comments;
        file.tracked_changes = tracked_changes;
        Ok(())
    }

    pub fn to_raw(&self) -> Vec<RawTextComponent> {
        self.components.iter().map(|c| match c {
            Retain { length, tracking: None } => RawTextComponent::Count(*length as i64),
            Retain { length, tracking: Some(tracking) } => RawTextComponent::Retain {
                r: *length,
                tracking: Some(tracking.to_raw()),
            },
            Insert { text, tracking: None, comment_ids } if comment_ids.is_empty() => {
                RawTextComponent::Text(text.to_string())
            }
            Insert { text, tracking, comment_ids } => RawTextComponent::Insert {
                i: text.to_string(),
                tracking: tracking.as_ref().map(TrackingProps::to_raw),
                comment_ids: (!comment_ids.is_empty()).then(|| comment_ids.clone()),
            },
            Remove { length } => RawTextComponent::Count(-(*length as i64)),
        }).collect()
    }

    pub fn from_raw(raw: Vec<RawTextComponent>) -> Result<Self> {
        let mut op = TextOperation::new();
        for c in raw {
            // Lengths come straight off the wire. Reject anything which would overflow the totals.
            let (base, target) = match &c {
                RawTextComponent::Count(n) if *n >= 0 => (*n as usize, *n as usize),
                RawTextComponent::Count(n) => (n.unsigned_abs() as usize, 0),
                RawTextComponent::Text(text) | RawTextComponent::Insert { i: text, .. } => (0, count_utf16(text)),
                RawTextComponent::Retain { r, .. } => (*r, *r),
                RawTextComponent::Remove { d } => (*d, 0),
            };
            if op.base_length.checked_add(base).is_none() || op.target_length.checked_add(target).is_none() {
                return Err(FileDataError::UnknownOperation(serde_json::to_string(&c)?));
            }

            match c {
                RawTextComponent::Count(n) if n >= 0 => { op.retain(n as usize); }
                RawTextComponent::Count(n) => { op.remove(n.unsigned_abs() as usize); }
                RawTextComponent::Text(text) => { op.insert(&text)?; }
                RawTextComponent::Retain { r, tracking } => {
                    op.retain_with(r, tracking.map(TrackingDirective::from_raw).transpose()?);
                }
                RawTextComponent::Insert { i, tracking, comment_ids } => {
                    op.insert_with(
                        &i,
                        tracking.map(TrackingProps::from_raw).transpose()?,
                        comment_ids.unwrap_or_default(),
                    )?;
                }
                RawTextComponent::Remove { d } => { op.remove(d); }
            }
        }
        Ok(op)
    }

    fn push(&mut self, component: TextComponent) -> Result<()> {
        match component {
            Retain { length, tracking } => { self.retain_with(length, tracking); }
            Insert { text, tracking, comment_ids } => { self.insert_with(&text, tracking, comment_ids)?; }
            Remove { length } => { self.remove(length); }
        }
        Ok(())
    }

    /// The operation which undoes this one. `previous` is the file as it was before this operation
    /// was applied to it.
    ///
    /// Removed text is re-inserted along with the tracking and comments it had. Tracked retains
    /// are undone by re-tracking the retained text the way it was tracked before.
    pub fn invert(&self, previous: &StringFileData) -> Result<TextOperation> {
        self.check_base_length(previous.string_length())?;

        let mut inverse = TextOperation::new();
        let mut cursor = 0;
        for c in &self.components {
            match c {
                Retain { length, tracking: None } => {
                    inverse.retain(*length);
                    cursor += length;
                }
                Retain { length, tracking: Some(_) } => {
                    let retained = Range::new(cursor, *length);
                    for change in previous.tracked_changes.intersect_range(&retained) {
                        inverse.retain_with(change.range.start() - cursor, Some(ClearTrackingProps.into()));
                        inverse.retain_with(change.range.length, Some(change.tracking.into()));
                        cursor = change.range.end();
                    }
                    inverse.retain_with(retained.end() - cursor, Some(ClearTrackingProps.into()));
                    cursor = retained.end();
                }
                Insert { text, .. } => {
                    inverse.remove(count_utf16(text));
                }
                Remove { length } => {
                    let removed = Range::new(cursor, *length);
                    for piece in annotation_boundaries(previous, &removed)?.windows(2) {
                        let piece = Range::from_bounds(piece[0], piece[1])?;
                        let text = slice_utf16(&previous.content, piece.into());
                        let tracking = previous.tracked_changes.props_at_range(&piece).cloned();
                        let comment_ids = previous.comments.iter()
                            .filter(|(_, comment)| comment.ranges.iter().any(|r| r.contains(&piece)))
                            .map(|(id, _)| id.into())
                            .collect();
                        inverse.insert_with(text, tracking, comment_ids)?;
                    }
                    cursor = removed.end();
                }
            }
        }
        Ok(inverse)
    }

    pub fn can_be_composed_with(&self, other: &TextOperation) -> bool {
        self.target_length == other.base_length
    }

    /// Merge this operation with `other`, which comes straight after it, into one operation with
    /// the same effect as applying both in turn.
    ///
    /// Where both operations say how a span of text is tracked, `other` wins.
    pub fn compose(&self, other: &TextOperation) -> Result<TextOperation> {
        if !self.can_be_composed_with(other) {
            return Err(FileDataError::apply_error(
                "the base length of the second operation has to be the target length of the first", other));
        }

        let mut result = TextOperation::new();
        let mut a = Chunks::new(&self.components);
        let mut b = Chunks::new(&other.components);
        loop {
            match (a.peek(), b.peek()) {
                (None, None) => break,
                (Some(Remove { length }), _) => {
                    result.remove(*length);
                    a.next_whole();
                }
                (_, Some(Insert { .. })) => {
                    if let Some(insert) = b.next_whole() { result.push(insert)?; }
                }
                (Some(ca), Some(cb)) => {
                    let len = ca.len().min(cb.len());
                    match (a.take(len), b.take(len)) {
                        (Some(Retain { tracking: ta, .. }), Some(Retain { tracking: tb, .. })) => {
                            result.retain_with(len, tb.or(ta));
                        }
                        (Some(Insert { text, tracking, comment_ids }), Some(Retain { tracking: tb, .. })) => {
                            let tracking = match tb {
                                Some(TrackingDirective::Track(props)) => Some(props),
                                Some(TrackingDirective::Clear(_)) => None,
                                None => tracking,
                            };
                            result.insert_with(&text, tracking, comment_ids)?;
                        }
                        (Some(Insert { .. }), Some(Remove { .. })) => {}
                        (Some(Retain { .. }), Some(Remove { .. })) => { result.remove(len); }
                        _ => return Err(FileDataError::apply_error("cannot compose operations", other)),
                    }
                }
                _ => return Err(FileDataError::apply_error("cannot compose operations of mismatched lengths", other)),
            }
        }
        Ok(result)
    }

    /// Transform two concurrent operations `a` and `b` against each other, returning `(a', b')`
    /// such that applying `a` then `b'` has the same result as applying `b` then `a'`.
    ///
    /// When both insert at the same position, `a`'s text goes first. When both set the tracking of
    /// the same text, `a`'s tracking wins.
    pub fn transform(a: &TextOperation, b: &TextOperation) -> Result<(TextOperation, TextOperation)> {
        if a.base_length != b.base_length {
            return Err(FileDataError::apply_error("both operations have to have the same base length", b));
        }

        let mut a_prime = TextOperation::new();
        let mut b_prime = TextOperation::new();
        let mut ia = Chunks::new(&a.components);
        let mut ib = Chunks::new(&b.components);
        loop {
            match (ia.peek(), ib.peek()) {
                (None, None) => break,
                (Some(Insert { .. }), _) => {
                    if let Some(insert) = ia.next_whole() {
                        b_prime.retain(insert.len());
                        a_prime.push(insert)?;
                    }
                }
                (_, Some(Insert { .. })) => {
                    if let Some(insert) = ib.next_whole() {
                        a_prime.retain(insert.len());
                        b_prime.push(insert)?;
                    }
                }
                (Some(ca), Some(cb)) => {
                    let len = ca.len().min(cb.len());
                    match (ia.take(len), ib.take(len)) {
                        (Some(Retain { tracking: ta, .. }), Some(Retain { tracking: tb, .. })) => {
                            let tb = if ta.is_some() { None } else { tb };
                            a_prime.retain_with(len, ta);
                            b_prime.retain_with(len, tb);
                        }
                        // Both removed the same text.
                        (Some(Remove { .. }), Some(Remove { .. })) => {}
                        (Some(Remove { .. }), Some(Retain { .. })) => { a_prime.remove(len); }
                        (Some(Retain { .. }), Some(Remove { .. })) => { b_prime.remove(len); }
                        _ => return Err(FileDataError::apply_error("cannot transform operations", b)),
                    }
                }
                _ => return Err(FileDataError::apply_error("cannot transform operations of mismatched lengths", b)),
            }
        }
        Ok((a_prime, b_prime))
    }
}

/// Every position inside `range` where the tracking or the comments of the text might change,
/// including both ends of the range. Sorted, without duplicates.
fn annotation_boundaries(file: &StringFileData, range: &Range) -> Result<Vec<usize>> {
    if range.end() > file.string_length() {
        return Err(FileDataError::invalid_range(format!("{range:?} is past the end of the file")));
    }

    let mut bounds = vec![range.start(), range.end()];
    for change in file.tracked_changes.intersect_range(range) {
        bounds.extend([change.range.start(), change.range.end()]);
    }
    for (_, comment) in file.comments.iter() {
        for r in comment.ranges.iter().filter_map(|r| r.intersect(range)) {
            bounds.extend([r.start(), r.end()]);
        }
    }
    bounds.sort_unstable();
    bounds.dedup();
    Ok(bounds)
}

/// Walks over the components of an operation, handing them out in pieces of whatever size the
/// caller asks for.
struct Chunks<'a> {
    rest: std::slice::Iter<'a, TextComponent>,
    current: Option<TextComponent>,
}

impl<'a> Chunks<'a> {
    fn new(components: &'a [TextComponent]) -> Self {
        let mut rest = components.iter();
        let current = rest.next().cloned();
        Chunks { rest, current }
    }

    fn peek(&self) -> Option<&TextComponent> { self.current.as_ref() }

    fn next_whole(&mut self) -> Option<TextComponent> {
        let next = self.rest.next().cloned();
        std::mem::replace(&mut self.current, next)
    }

    /// Take up to `max` code units off the front of the current component.
    fn take(&mut self, max: usize) -> Option<TextComponent> {
        let len = self.current.as_ref()?.len();
        if len > max {
            self.current.as_mut().map(|c| c.truncate_keeping_right(max))
        } else {
            self.next_whole()
        }
    }
}

impl Display for TextOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, c) in self.components.iter().enumerate() {
            if i > 0 { f.write_str(", ")?; }
            match c {
                Retain { length, .. } => write!(f, "retain {length}")?,
                Insert { text, .. } => write!(f, "insert '{text}'")?,
                Remove { length } => write!(f, "remove {length}")?,
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<RawTextComponent>> for TextOperation {
    type Error = FileDataError;
    fn try_from(raw: Vec<RawTextComponent>) -> Result<Self> { TextOperation::from_raw(raw) }
}

impl From<TextOperation> for Vec<RawTextComponent> {
    fn from(op: TextOperation) -> Self { op.to_raw() }
}

/// An edit to an editable file.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEditOperation", into = "RawEditOperation")]
pub enum EditOperation {
    Text(TextOperation),
    /// Add a comment, or replace the ranges of an existing comment with the same id.
    AddComment { comment_id: SmartString, ranges: Vec<Range>, resolved: bool },
    DeleteComment { comment_id: SmartString },
    SetCommentState { comment_id: SmartString, resolved: bool },
}

/// Wire form of an edit operation. Like file data, the kind of operation is decided by which
/// fields are present.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEditOperation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_operation: Option<Vec<RawTextComponent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_comment: Option<SmartString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<SmartString>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<Vec<RawRange>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<bool>,
}

impl EditOperation {
    pub fn is_noop(&self) -> bool {
        match self {
            EditOperation::Text(op) => op.is_noop(),
            _ => false,
        }
    }

    /// Comment edits never change the length of the text.
    pub fn apply_to_length(&self, length: usize) -> Result<usize> {
        match self {
            EditOperation::Text(op) => op.apply_to_length(length),
            _ => Ok(length),
        }
    }

    pub fn apply(&self, file: &mut StringFileData) -> Result<()> {
        match self {
            EditOperation::Text(op) => op.apply(file)?,
            EditOperation::AddComment { comment_id, ranges, resolved } => {
                file.comments.add(comment_id, Comment::new(ranges.iter().copied(), *resolved));
            }
            EditOperation::DeleteComment { comment_id } => {
                file.comments.delete(comment_id);
            }
            EditOperation::SetCommentState { comment_id, resolved } => {
                // Setting the state of a comment which has since been deleted is harmless.
                file.comments.set_resolved(comment_id, *resolved);
            }
        }
        Ok(())
    }

    pub fn to_raw(&self) -> RawEditOperation {
        match self {
            EditOperation::Text(op) => RawEditOperation {
                text_operation: Some(op.to_raw()),
                ..Default::default()
            },
            EditOperation::AddComment { comment_id, ranges, resolved } => RawEditOperation {
                comment_id: Some(comment_id.clone()),
                ranges: Some(ranges.iter().map(Range::to_raw).collect()),
                resolved: resolved.then_some(true),
                ..Default::default()
            },
            EditOperation::DeleteComment { comment_id } => RawEditOperation {
                delete_comment: Some(comment_id.clone()),
                ..Default::default()
            },
            EditOperation::SetCommentState { comment_id, resolved } => RawEditOperation {
                comment_id: Some(comment_id.clone()),
                resolved: Some(*resolved),
                ..Default::default()
            },
        }
    }

    pub fn from_raw(raw: RawEditOperation) -> Result<Self> {
        if let Some(text_operation) = raw.text_operation {
            return Ok(EditOperation::Text(TextOperation::from_raw(text_operation)?));
        }
        if let Some(comment_id) = raw.delete_comment {
            return Ok(EditOperation::DeleteComment { comment_id });
        }
        match (raw.comment_id, raw.ranges, raw.resolved) {
            (Some(comment_id), Some(ranges), resolved) => Ok(EditOperation::AddComment {
                comment_id,
                ranges: ranges.into_iter().map(Range::from_raw).collect::<Result<_>>()?,
                resolved: resolved.unwrap_or(false),
            }),
            (Some(comment_id), None, Some(resolved)) => {
                Ok(EditOperation::SetCommentState { comment_id, resolved })
            }
            (comment_id, ranges, resolved) => {
                let raw = RawEditOperation { comment_id, ranges, resolved, ..Default::default() };
                Err(FileDataError::UnknownOperation(serde_json::to_string(&raw)?))
            }
        }
    }
}

impl From<TextOperation> for EditOperation {
    fn from(op: TextOperation) -> Self { EditOperation::Text(op) }
}

impl TryFrom<RawEditOperation> for EditOperation {
    type Error = FileDataError;
    fn try_from(raw: RawEditOperation) -> Result<Self> { EditOperation::from_raw(raw) }
}

impl From<EditOperation> for RawEditOperation {
    fn from(op: EditOperation) -> Self { op.to_raw() }
}
