//! The list of tracked changes in a file.
//!
//! The list is kept sorted by start position, with no overlapping or empty ranges and every pair of
//! neighbouring mergable changes merged together. Edits are applied by rebuilding the whole list
//! from the previous one - one pass over the changes per insert / delete / retain - and then
//! re-establishing the invariant with a single merge pass at the end.
//!
//! If the merge pass finds overlapping or empty ranges, something upstream generated a bogus list
//! or a bogus operation. That surfaces as an error from every `apply_*` method and the caller
//! should treat it as fatal.

use serde::{Deserialize, Serialize};
use tracing::trace;
use crate::error::{FileDataError, Result};
use crate::operation::{TextComponent, TextOperation};
use crate::range::Range;
use crate::span::{AppendRle, MergableSpan};
use crate::tracked_change::{RawTrackedChange, TrackedChange};
use crate::tracking::{TrackingDirective, TrackingProps};
use crate::unicount::count_utf16;

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<RawTrackedChange>", into = "Vec<RawTrackedChange>")]
pub struct TrackedChangeList {
    changes: Vec<TrackedChange>,
}

impl TrackedChangeList {
    pub fn new() -> Self { Self::default() }

    pub fn from_changes(mut changes: Vec<TrackedChange>) -> Self {
        changes.sort_by_key(|c| c.range.start());
        TrackedChangeList { changes }
    }

    pub fn from_raw(raw: Vec<RawTrackedChange>) -> Result<Self> {
        let changes = raw.into_iter()
            .map(TrackedChange::from_raw)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_changes(changes))
    }

    pub fn to_raw(&self) -> Vec<RawTrackedChange> {
        self.changes.iter().map(TrackedChange::to_raw).collect()
    }

    pub fn len(&self) -> usize { self.changes.len() }

    pub fn is_empty(&self) -> bool { self.changes.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackedChange> {
        self.changes.iter()
    }

    pub fn as_sorted(&self) -> Vec<&TrackedChange> {
        let mut sorted: Vec<&TrackedChange> = self.changes.iter().collect();
        sorted.sort_by_key(|c| c.range.start());
        sorted
    }

    /// Changes which are entirely inside `range`.
    pub fn in_range(&self, range: &Range) -> Vec<&TrackedChange> {
        self.changes.iter().filter(|c| range.contains(&c.range)).collect()
    }

    /// Every change overlapping `range`, clipped to it.
    pub fn intersect_range(&self, range: &Range) -> Vec<TrackedChange> {
        self.changes.iter().filter_map(|c| c.intersect_range(range)).collect()
    }

    /// The tracking of the change which covers all of `range`, if there is one.
    pub fn props_at_range(&self, range: &Range) -> Option<&TrackingProps> {
        self.changes.iter()
            .find(|c| c.range.contains(range))
            .map(|c| &c.tracking)
    }

    /// Changes covering the character right after `cursor`.
    pub fn tracked_changes_at(&self, cursor: usize) -> Vec<&TrackedChange> {
        let loc = Range::new(cursor, 1);
        self.changes.iter().filter(|c| c.range.overlaps(&loc)).collect()
    }

    /// Drop every change entirely contained in `range`.
    pub fn remove_in_range(&mut self, range: &Range) {
        self.changes.retain(|c| !range.contains(&c.range));
    }

    pub fn add(&mut self, change: TrackedChange) -> Result<()> {
        self.changes.push(change);
        self.merge_ranges()
    }

    /// Returns true if the change was found and removed.
    pub fn remove(&mut self, change: &TrackedChange) -> bool {
        if let Some(idx) = self.changes.iter().position(|c| c == change) {
            self.changes.remove(idx);
            true
        } else { false }
    }

    pub fn apply_insert(&mut self, cursor: usize, text: &str, tracking: Option<&TrackingProps>) -> Result<()> {
        self.apply_insert_unmerged(cursor, count_utf16(text), tracking)?;
        self.merge_ranges()
    }

    pub fn apply_delete(&mut self, cursor: usize, length: usize) -> Result<()> {
        self.apply_delete_unmerged(cursor, length)?;
        self.merge_ranges()
    }

    /// Retains only touch the list when they carry a tracking directive.
    pub fn apply_retain(&mut self, cursor: usize, length: usize, tracking: Option<&TrackingDirective>) -> Result<()> {
        if tracking.is_none() { return Ok(()); }
        self.apply_retain_unmerged(cursor, length, tracking)?;
        self.merge_ranges()
    }

    /// Run a whole text operation over the list. The cursor tracks positions in the document
    /// *after* the edit, and the list is only merged once, right at the end. Merging between
    /// components would glue together fragments which a later component is about to split again.
    pub fn apply_text_operation(&mut self, op: &TextOperation) -> Result<()> {
        let mut cursor = 0;
        for c in op.components() {
            match c {
                TextComponent::Retain { length, tracking } => {
                    if tracking.is_some() {
                        self.apply_retain_unmerged(cursor, *length, tracking.as_ref())?;
                    }
                    cursor += length;
                }
                TextComponent::Insert { text, tracking, .. } => {
                    let length = count_utf16(text);
                    self.apply_insert_unmerged(cursor, length, tracking.as_ref())?;
                    cursor += length;
                }
                TextComponent::Remove { length } => {
                    self.apply_delete_unmerged(cursor, *length)?;
                }
            }
        }
        trace!(changes = self.changes.len(), "applied text operation to tracked changes");
        self.merge_ranges()
    }

    fn apply_insert_unmerged(&mut self, cursor: usize, length: usize, tracking: Option<&TrackingProps>) -> Result<()> {
        let mut new_changes = Vec::with_capacity(self.changes.len() + 2);

        for change in self.changes.drain(..) {
            let range = change.range;
            if range.start() >= cursor {
                // Entirely after the insert. Shift it along.
                new_changes.push(change.with_range(range.move_by(length as isize)?));
            } else if range.end() == cursor {
                // Inserting right at the end of a change doesn't extend it.
                new_changes.push(change);
            } else if range.contains_cursor(cursor) {
                // The inserted text splits the change in two. The inserted span itself is only
                // tracked if the insert says so.
                let (before, _, after) = range.insert_at(cursor, length)?;
                if !before.is_empty() { new_changes.push(change.with_range(before)); }
                if !after.is_empty() { new_changes.push(change.with_range(after)); }
            } else {
                new_changes.push(change);
            }
        }

        if let Some(tracking) = tracking {
            new_changes.push(TrackedChange::new(Range::new(cursor, length), tracking.clone()));
        }

        self.changes = new_changes;
        Ok(())
    }

    fn apply_delete_unmerged(&mut self, cursor: usize, length: usize) -> Result<()> {
        let deleted = Range::new(cursor, length);
        let mut new_changes = Vec::with_capacity(self.changes.len());

        for change in self.changes.drain(..) {
            let range = change.range;
            if deleted.contains(&range) {
                continue;
            } else if deleted.overlaps(&range) {
                let remaining = range.subtract(&deleted);
                if !remaining.is_empty() {
                    new_changes.push(change.with_range(remaining));
                }
            } else if range.start_is_after(cursor) {
                new_changes.push(change.with_range(range.move_by(-(length as isize))?));
            } else {
                new_changes.push(change);
            }
        }

        self.changes = new_changes;
        Ok(())
    }

    fn apply_retain_unmerged(&mut self, cursor: usize, length: usize, tracking: Option<&TrackingDirective>) -> Result<()> {
        let retained = Range::new(cursor, length);
        let mut new_changes = Vec::with_capacity(self.changes.len() + 2);

        for change in self.changes.drain(..) {
            let range = change.range;
            if retained.contains(&range) {
                // Replaced by whatever the retain says.
                continue;
            } else if range.contains(&retained) {
                let (left, rest) = range.split_at(cursor)?;
                let (_, right) = rest.split_at(retained.end())?;
                if !left.is_empty() { new_changes.push(change.with_range(left)); }
                if !right.is_empty() { new_changes.push(change.with_range(right)); }
            } else if retained.overlaps(&range) {
                if retained.start() <= range.start() {
                    // The retain covers the start of the change. Keep the tail.
                    let (_, right) = range.split_at(retained.end())?;
                    if !right.is_empty() { new_changes.push(change.with_range(right)); }
                } else {
                    // The retain covers the end of the change. Keep the head.
                    let (left, _) = range.split_at(cursor)?;
                    if !left.is_empty() { new_changes.push(change.with_range(left)); }
                }
            } else {
                new_changes.push(change);
            }
        }

        if let Some(TrackingDirective::Track(props)) = tracking {
            new_changes.push(TrackedChange::new(retained, props.clone()));
        }

        self.changes = new_changes;
        Ok(())
    }

    fn merge_ranges(&mut self) -> Result<()> {
        self.changes.sort_by_key(|c| c.range.start());

        for (i, change) in self.changes.iter().enumerate() {
            if change.range.is_empty() {
                return Err(FileDataError::EmptyRange { pos: change.range.pos });
            }
            if i > 0 {
                let prev = &self.changes[i - 1];
                if prev.range.overlaps(&change.range) {
                    return Err(FileDataError::OverlappingRanges { first: prev.range, second: change.range });
                }
            }
        }

        let mut merged: Vec<TrackedChange> = Vec::with_capacity(self.changes.len());
        merged.extend_rle(self.changes.drain(..));
        self.changes = merged;
        Ok(())
    }

    /// Check the list invariant. This panics if the list is broken, so its only useful in tests.
    #[allow(unused)]
    pub fn dbg_check(&self) {
        for change in &self.changes {
            assert!(!change.range.is_empty(), "Empty tracked change {:?}", change);
        }
        for pair in self.changes.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.range.start() < b.range.start(), "Tracked changes out of order");
            assert!(!a.range.overlaps(&b.range), "Overlapping tracked changes {:?} {:?}", a, b);
            assert!(!a.can_append(b), "Unmerged tracked changes {:?} {:?}", a, b);
        }
    }
}

impl TryFrom<Vec<RawTrackedChange>> for TrackedChangeList {
    type Error = FileDataError;
    fn try_from(raw: Vec<RawTrackedChange>) -> Result<Self> { TrackedChangeList::from_raw(raw) }
}

impl From<TrackedChangeList> for Vec<RawTrackedChange> {
    fn from(list: TrackedChangeList) -> Self { list.to_raw() }
}

impl<'a> IntoIterator for &'a TrackedChangeList {
    type Item = &'a TrackedChange;
    type IntoIter = std::slice::Iter<'a, TrackedChange>;

    fn into_iter(self) -> Self::IntoIter {
        self.changes.iter()
    }
}

#[cfg(test)]
mod test {
    use chrono::{DateTime, TimeZone, Utc};
    use crate::tracking::{ClearTrackingProps, TrackingType};
    use super::*;

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn ins(user: &str) -> TrackingProps {
        TrackingProps::new(TrackingType::Insert, user, ts(100))
    }

    fn del(user: &str) -> TrackingProps {
        TrackingProps::new(TrackingType::Delete, user, ts(100))
    }

    fn list(changes: &[(usize, usize, TrackingProps)]) -> TrackedChangeList {
        TrackedChangeList::from_changes(changes.iter()
            .map(|(start, end, t)| TrackedChange::new(Range::from_bounds(*start, *end).unwrap(), t.clone()))
            .collect())
    }

    fn ranges(list: &TrackedChangeList) -> Vec<(usize, usize)> {
        list.iter().map(|c| (c.range.start(), c.range.end())).collect()
    }

    #[test]
    fn insert_before_shifts() {
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_insert(2, "xyz", None).unwrap();
        assert_eq!(ranges(&l), vec![(8, 13)]);

        // Inserting right at the start counts as before.
        l.apply_insert(8, "x", None).unwrap();
        assert_eq!(ranges(&l), vec![(9, 14)]);
        l.dbg_check();
    }

    #[test]
    fn insert_at_end_leaves_change_alone() {
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_insert(10, "xyz", None).unwrap();
        assert_eq!(ranges(&l), vec![(5, 10)]);
    }

    #[test]
    fn untracked_insert_splits_change() {
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_insert(7, "xyz", None).unwrap();
        assert_eq!(ranges(&l), vec![(5, 7), (10, 13)]);
        assert!(l.iter().all(|c| c.tracking == ins("a")));
        l.dbg_check();
    }

    #[test]
    fn tracked_insert_inside_same_user_merges_back() {
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_insert(7, "xyz", Some(&ins("a"))).unwrap();
        assert_eq!(ranges(&l), vec![(5, 13)]);
        l.dbg_check();
    }

    #[test]
    fn tracked_insert_inside_other_user_makes_three() {
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_insert(7, "xyz", Some(&ins("b"))).unwrap();
        assert_eq!(ranges(&l), vec![(5, 7), (7, 10), (10, 13)]);
        assert_eq!(l.iter().nth(1).unwrap().tracking.user_id, "b");
        l.dbg_check();
    }

    #[test]
    fn tracked_insert_at_end_extends_matching_change() {
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_insert(10, "xy", Some(&ins("a"))).unwrap();
        assert_eq!(ranges(&l), vec![(5, 12)]);
    }

    #[test]
    fn delete_covering_change_removes_it() {
        let mut l = list(&[(5, 10, del("a"))]);
        l.apply_delete(0, 10).unwrap();
        assert!(l.is_empty());
    }

    #[test]
    fn delete_before_change_shifts_it_back() {
        let mut l = list(&[(5, 10, del("a"))]);
        l.apply_delete(3, 2).unwrap();
        assert_eq!(ranges(&l), vec![(3, 8)]);
    }

    #[test]
    fn delete_partial_overlaps() {
        // Deleting over the start.
        let mut l = list(&[(5, 10, del("a"))]);
        l.apply_delete(3, 4).unwrap();
        assert_eq!(ranges(&l), vec![(3, 6)]);

        // Deleting over the end.
        let mut l = list(&[(5, 10, del("a"))]);
        l.apply_delete(8, 4).unwrap();
        assert_eq!(ranges(&l), vec![(5, 8)]);

        // Deleting from the middle.
        let mut l = list(&[(5, 10, del("a"))]);
        l.apply_delete(6, 2).unwrap();
        assert_eq!(ranges(&l), vec![(5, 8)]);
    }

    #[test]
    fn delete_between_changes_merges_neighbours() {
        let mut l = list(&[(0, 3, ins("a")), (5, 8, ins("a"))]);
        l.apply_delete(3, 2).unwrap();
        assert_eq!(ranges(&l), vec![(0, 6)]);
        l.dbg_check();
    }

    #[test]
    fn retain_without_tracking_is_noop() {
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_retain(0, 20, None).unwrap();
        assert_eq!(ranges(&l), vec![(5, 10)]);
    }

    #[test]
    fn retain_inside_change_splits_it() {
        let mut l = list(&[(5, 10, ins("a"))]);
        let directive = TrackingDirective::Track(del("b"));
        l.apply_retain(6, 2, Some(&directive)).unwrap();
        assert_eq!(ranges(&l), vec![(5, 6), (6, 8), (8, 10)]);
        let users: Vec<&str> = l.iter().map(|c| c.tracking.user_id.as_str()).collect();
        assert_eq!(users, vec!["a", "b", "a"]);
        l.dbg_check();
    }

    #[test]
    fn retain_over_edges() {
        let directive = TrackingDirective::Track(del("b"));

        // Covering the start of the change.
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_retain(3, 4, Some(&directive)).unwrap();
        assert_eq!(ranges(&l), vec![(3, 7), (7, 10)]);

        // Covering the end.
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_retain(8, 4, Some(&directive)).unwrap();
        assert_eq!(ranges(&l), vec![(5, 8), (8, 12)]);

        // Covering all of it.
        let mut l = list(&[(5, 10, ins("a"))]);
        l.apply_retain(5, 5, Some(&directive)).unwrap();
        assert_eq!(ranges(&l), vec![(5, 10)]);
        assert_eq!(l.iter().next().unwrap().tracking, del("b"));
    }

    #[test]
    fn clear_tracking_removes_without_adding() {
        let clear = TrackingDirective::Clear(ClearTrackingProps);
        let mut l = list(&[(0, 4, ins("a")), (5, 10, ins("a"))]);
        l.apply_retain(2, 5, Some(&clear)).unwrap();
        assert_eq!(ranges(&l), vec![(0, 2), (7, 10)]);
        l.dbg_check();
    }

    #[test]
    fn merge_keeps_later_timestamp() {
        let early = TrackingProps::new(TrackingType::Insert, "a", ts(10));
        let late = TrackingProps::new(TrackingType::Insert, "a", ts(20));
        let mut l = list(&[(0, 5, late.clone())]);
        l.apply_insert(5, "abc", Some(&early)).unwrap();
        assert_eq!(l.len(), 1);
        assert_eq!(l.iter().next().unwrap().tracking.ts, ts(20));
    }

    #[test]
    fn overlapping_input_is_fatal() {
        let mut l = list(&[(0, 5, ins("a")), (3, 8, ins("b"))]);
        assert!(matches!(l.apply_insert(20, "x", None), Err(FileDataError::OverlappingRanges { .. })));

        let mut l = list(&[(0, 0, ins("a"))]);
        assert!(matches!(l.apply_delete(3, 1), Err(FileDataError::EmptyRange { pos: 0 })));
    }

    #[test]
    fn queries() {
        let l = list(&[(0, 5, ins("a")), (8, 12, del("b"))]);
        assert_eq!(l.in_range(&Range::new(0, 10)).len(), 1);
        assert_eq!(l.in_range(&Range::new(0, 12)).len(), 2);

        let clipped = l.intersect_range(&Range::new(3, 7));
        assert_eq!(clipped.len(), 2);
        assert_eq!(clipped[0].range, Range::from_bounds(3, 5).unwrap());
        assert_eq!(clipped[1].range, Range::from_bounds(8, 10).unwrap());

        assert_eq!(l.props_at_range(&Range::new(9, 2)), Some(&del("b")));
        assert_eq!(l.props_at_range(&Range::new(4, 2)), None);

        assert_eq!(l.tracked_changes_at(4).len(), 1);
        assert_eq!(l.tracked_changes_at(5).len(), 0);

        let mut l = l;
        l.remove_in_range(&Range::new(6, 10));
        assert_eq!(ranges(&l), vec![(0, 5)]);
    }

    #[test]
    fn add_and_remove() {
        let mut l = TrackedChangeList::new();
        l.add(TrackedChange::new(Range::new(5, 3), ins("a"))).unwrap();
        l.add(TrackedChange::new(Range::new(0, 5), ins("a"))).unwrap();
        assert_eq!(ranges(&l), vec![(0, 8)]);

        let c = l.iter().next().unwrap().clone();
        assert!(l.remove(&c));
        assert!(!l.remove(&c));
        assert!(l.is_empty());
    }

    #[test]
    fn text_operation_merges_once() {
        // Retain 2, insert tracked "xy" from b, retain 3, delete 2, retain the rest.
        let mut l = list(&[(0, 10, ins("a"))]);
        let mut op = TextOperation::new();
        op.retain(2)
            .insert_with("xy", Some(ins("b")), Vec::new()).unwrap()
            .retain(3)
            .remove(2)
            .retain(3);
        l.apply_text_operation(&op).unwrap();
        assert_eq!(ranges(&l), vec![(0, 2), (2, 4), (4, 10)]);
        l.dbg_check();
    }

    #[test]
    fn deserialize_sorts() {
        let raw = serde_json::json!([
            {"range": {"pos": 8, "length": 2}, "tracking": {"type": "delete", "userId": "a", "ts": "2024-01-01T00:00:00.000Z"}},
            {"range": {"pos": 0, "length": 3}, "tracking": {"type": "insert", "userId": "b", "ts": "2024-01-01T00:00:00.000Z"}},
        ]);
        let l: TrackedChangeList = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(ranges(&l), vec![(0, 3), (8, 10)]);
        l.dbg_check();

        let mut reversed = raw.as_array().unwrap().clone();
        reversed.reverse();
        assert_eq!(serde_json::to_value(&l).unwrap(), serde_json::Value::Array(reversed));
    }
}
