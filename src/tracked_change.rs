use serde::{Deserialize, Serialize};
use crate::error::{FileDataError, Result};
use crate::range::{Range, RawRange};
use crate::span::{HasLength, MergableSpan};
use crate::tracking::{RawTrackingProps, TrackingProps};

/// A span of text annotated as inserted or deleted by some user, pending accept / reject.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTrackedChange", into = "RawTrackedChange")]
pub struct TrackedChange {
    pub range: Range,
    pub tracking: TrackingProps,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RawTrackedChange {
    pub range: RawRange,
    pub tracking: RawTrackingProps,
}

impl TrackedChange {
    pub fn new(range: Range, tracking: TrackingProps) -> Self {
        TrackedChange { range, tracking }
    }

    /// Same kind, same user, and the two ranges sit right next to each other. Overlapping changes
    /// never merge - they shouldn't exist in the first place.
    pub fn can_merge(&self, other: &TrackedChange) -> bool {
        self.tracking.can_merge(&other.tracking)
            && self.range.touches(&other.range)
            && self.range.can_merge(&other.range)
    }

    pub fn merge(&self, other: &TrackedChange) -> Result<TrackedChange> {
        if !self.can_merge(other) {
            return Err(FileDataError::CannotMerge { first: self.range, second: other.range });
        }
        Ok(TrackedChange {
            range: self.range.merge(&other.range)?,
            tracking: self.tracking.merged_with(&other.tracking),
        })
    }

    /// Clip this change to `range`, or None if they don't overlap.
    pub fn intersect_range(&self, range: &Range) -> Option<TrackedChange> {
        self.range.intersect(range)
            .map(|range| TrackedChange { range, tracking: self.tracking.clone() })
    }

    pub(crate) fn with_range(&self, range: Range) -> TrackedChange {
        TrackedChange { range, tracking: self.tracking.clone() }
    }

    pub fn to_raw(&self) -> RawTrackedChange {
        RawTrackedChange { range: self.range.to_raw(), tracking: self.tracking.to_raw() }
    }

    pub fn from_raw(raw: RawTrackedChange) -> Result<Self> {
        Ok(TrackedChange {
            range: Range::from_raw(raw.range)?,
            tracking: TrackingProps::from_raw(raw.tracking)?,
        })
    }
}

impl HasLength for TrackedChange {
    fn len(&self) -> usize { self.range.length }
}

impl MergableSpan for TrackedChange {
    fn can_append(&self, other: &Self) -> bool {
        self.can_merge(other) && self.range.end() == other.range.start()
    }

    fn append(&mut self, other: Self) {
        self.range.length += other.range.length;
        self.tracking = self.tracking.merged_with(&other.tracking);
    }
}

impl TryFrom<RawTrackedChange> for TrackedChange {
    type Error = FileDataError;
    fn try_from(raw: RawTrackedChange) -> Result<Self> { TrackedChange::from_raw(raw) }
}

impl From<TrackedChange> for RawTrackedChange {
    fn from(change: TrackedChange) -> Self { change.to_raw() }
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use crate::tracking::TrackingType;
    use super::*;

    fn change(start: usize, end: usize, kind: TrackingType, user: &str, secs: i64) -> TrackedChange {
        TrackedChange::new(
            Range::from_bounds(start, end).unwrap(),
            TrackingProps::new(kind, user, Utc.timestamp_opt(secs, 0).unwrap()),
        )
    }

    #[test]
    fn merges_touching_changes_keeping_later_ts() {
        let a = change(0, 5, TrackingType::Insert, "u1", 100);
        let b = change(5, 8, TrackingType::Insert, "u1", 50);
        assert!(a.can_merge(&b));
        assert!(b.can_merge(&a));

        let merged = a.merge(&b).unwrap();
        assert_eq!(merged.range, Range::new(0, 8));
        assert_eq!(merged.tracking.ts, Utc.timestamp_opt(100, 0).unwrap());

        // And merging in the other order gives the same answer.
        assert_eq!(b.merge(&a).unwrap(), merged);
    }

    #[test]
    fn incompatible_changes_never_merge() {
        let a = change(0, 5, TrackingType::Insert, "u1", 100);
        assert!(!a.can_merge(&change(5, 8, TrackingType::Insert, "u2", 100)));
        assert!(!a.can_merge(&change(5, 8, TrackingType::Delete, "u1", 100)));
        assert!(!a.can_merge(&change(6, 8, TrackingType::Insert, "u1", 100)));
        // Overlap isn't touching.
        assert!(!a.can_merge(&change(3, 8, TrackingType::Insert, "u1", 100)));

        assert!(matches!(
            a.merge(&change(5, 8, TrackingType::Insert, "u2", 100)),
            Err(FileDataError::CannotMerge { .. })
        ));
    }

    #[test]
    fn intersect_clips() {
        let a = change(5, 10, TrackingType::Delete, "u1", 100);
        assert_eq!(a.intersect_range(&Range::new(8, 10)).unwrap().range, Range::new(8, 2));
        assert_eq!(a.intersect_range(&Range::new(10, 3)), None);
    }

    #[test]
    fn raw_form() {
        let a = change(5, 10, TrackingType::Delete, "u1", 1_700_000_000);
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json, json!({
            "range": {"pos": 5, "length": 5},
            "tracking": {"type": "delete", "userId": "u1", "ts": "2023-11-14T22:13:20.000Z"},
        }));
        assert_eq!(serde_json::from_value::<TrackedChange>(json).unwrap(), a);
    }
}
