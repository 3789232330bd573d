use std::fmt::{Debug, Formatter};
use serde::{Deserialize, Serialize};
use crate::error::{FileDataError, Result};
use crate::span::{HasLength, MergableSpan};

/// A half-open span `[pos, pos + length)` of UTF-16 code units in a document.
///
/// Ranges are plain values. None of the methods here modify the range in place - they all hand
/// back new ranges instead.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "RawRange", into = "RawRange")]
pub struct Range {
    pub pos: usize,
    pub length: usize,
}

/// The wire form. Note this is `{pos, length}`, not `{start, end}`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawRange {
    pub pos: usize,
    pub length: usize,
}

impl Range {
    #[inline]
    pub fn new(pos: usize, length: usize) -> Range {
        Range { pos, length }
    }

    pub fn from_bounds(start: usize, end: usize) -> Result<Range> {
        if end < start {
            return Err(FileDataError::invalid_range(format!("end {end} is before start {start}")));
        }
        Ok(Range { pos: start, length: end - start })
    }

    #[inline]
    pub fn start(&self) -> usize { self.pos }

    #[inline]
    pub fn end(&self) -> usize { self.pos + self.length }

    #[inline]
    pub fn is_empty(&self) -> bool { self.length == 0 }

    /// Is this range entirely at or after the end of `other`?
    pub fn starts_after(&self, other: &Range) -> bool {
        self.start() >= other.end()
    }

    pub fn start_is_after(&self, pos: usize) -> bool {
        self.start() > pos
    }

    /// Cursors sit between characters, so a cursor at either boundary is inside the range.
    pub fn contains_cursor(&self, cursor: usize) -> bool {
        self.start() <= cursor && cursor <= self.end()
    }

    pub fn contains(&self, other: &Range) -> bool {
        self.start() <= other.start() && self.end() >= other.end()
    }

    pub fn overlaps(&self, other: &Range) -> bool {
        self.start() < other.end() && self.end() > other.start()
    }

    /// Do the ranges share a boundary?
    pub fn touches(&self, other: &Range) -> bool {
        self.end() == other.start() || self.start() == other.end()
    }

    pub fn intersect(&self, other: &Range) -> Option<Range> {
        let start = self.start().max(other.start());
        let end = self.end().min(other.end());
        if start < end {
            Some(Range { pos: start, length: end - start })
        } else {
            None
        }
    }

    /// Remove the part of this range covered by `other`. The remainder is assumed to be a single
    /// contiguous span. When `other` sits strictly inside this range, the result is this range
    /// shrunk by `other`'s length - which is what you want after deleting `other` from the text.
    pub fn subtract(&self, other: &Range) -> Range {
        if self.contains(other) {
            Range { pos: self.pos, length: self.length - other.length }
        } else if other.contains(self) {
            Range { pos: self.pos, length: 0 }
        } else if other.overlaps(self) {
            if other.start() < self.start() {
                let intersected = other.end() - self.start();
                Range { pos: other.pos, length: self.length - intersected }
            } else {
                let intersected = self.end() - other.start();
                Range { pos: self.pos, length: self.length - intersected }
            }
        } else {
            *self
        }
    }

    pub fn can_merge(&self, other: &Range) -> bool {
        self.overlaps(other) || self.touches(other)
    }

    /// Union of two touching or overlapping ranges.
    pub fn merge(&self, other: &Range) -> Result<Range> {
        if !self.can_merge(other) {
            return Err(FileDataError::CannotMerge { first: *self, second: *other });
        }
        Range::from_bounds(self.start().min(other.start()), self.end().max(other.end()))
    }

    pub fn shrink_by(&self, amount: usize) -> Result<Range> {
        if amount > self.length {
            return Err(FileDataError::invalid_range(format!("cannot shrink {self:?} by {amount}")));
        }
        Ok(Range { pos: self.pos, length: self.length - amount })
    }

    pub fn extend_by(&self, amount: usize) -> Range {
        Range { pos: self.pos, length: self.length + amount }
    }

    pub fn move_by(&self, delta: isize) -> Result<Range> {
        let pos = self.pos.checked_add_signed(delta)
            .ok_or_else(|| FileDataError::invalid_range(format!("cannot move {self:?} by {delta}")))?;
        Ok(Range { pos, length: self.length })
    }

    /// Split into `[start, cursor)` and `[cursor, end)`. Either half may be empty.
    pub fn split_at(&self, cursor: usize) -> Result<(Range, Range)> {
        if !self.contains_cursor(cursor) {
            return Err(FileDataError::invalid_range(format!("cursor {cursor} is outside {self:?}")));
        }
        Ok((
            Range { pos: self.pos, length: cursor - self.pos },
            Range { pos: cursor, length: self.end() - cursor },
        ))
    }

    /// Open a gap of `length` at `cursor`. Returns the part before the gap, the gap itself and the
    /// part after (shifted past the gap).
    pub fn insert_at(&self, cursor: usize, length: usize) -> Result<(Range, Range, Range)> {
        let (before, after) = self.split_at(cursor)?;
        let inserted = Range { pos: cursor, length };
        Ok((before, inserted, Range { pos: after.pos + length, length: after.length }))
    }

    pub fn to_raw(&self) -> RawRange {
        RawRange { pos: self.pos, length: self.length }
    }

    pub fn from_raw(raw: RawRange) -> Result<Range> {
        Range::try_from(raw)
    }
}

impl HasLength for Range {
    fn len(&self) -> usize { self.length }
}

impl MergableSpan for Range {
    fn can_append(&self, other: &Self) -> bool {
        self.can_merge(other)
    }

    fn append(&mut self, other: Self) {
        let end = self.end().max(other.end());
        self.pos = self.pos.min(other.pos);
        self.length = end - self.pos;
    }
}

impl TryFrom<RawRange> for Range {
    type Error = FileDataError;

    fn try_from(raw: RawRange) -> Result<Self> {
        if raw.pos.checked_add(raw.length).is_none() {
            return Err(FileDataError::invalid_range(format!("{raw:?} overflows")));
        }
        Ok(Range { pos: raw.pos, length: raw.length })
    }
}

impl From<Range> for RawRange {
    fn from(range: Range) -> Self {
        range.to_raw()
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Range { pos: r.start, length: r.end.saturating_sub(r.start) }
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.start()..r.end()
    }
}

impl Debug for Range {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "R {}..{}", self.start(), self.end())
    }
}
