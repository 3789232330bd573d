//! Small span helpers shared by ranges, tracked changes and operation components.

use smallvec::SmallVec;

pub trait HasLength {
    /// Length of the span in UTF-16 code units.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A span which can absorb a following span, making one larger span.
pub trait MergableSpan: Clone {
    /// Can `other` be glued onto the end of self? This is always called right before `append`.
    fn can_append(&self, other: &Self) -> bool;

    /// self = self + other. `other` must be a valid append target as per `can_append`.
    fn append(&mut self, other: Self);
}

/// A span which can be cut in two.
pub trait SplitableSpan: HasLength + Clone {
    /// Split the span, returning the part after `at`. Afterwards self.len() == at.
    ///
    /// `at` must obey *0 < at < self.len()*.
    fn truncate(&mut self, at: usize) -> Self;

    /// The inverse of truncate. Self keeps the content from `at` onwards, and the part before
    /// `at` is returned.
    fn truncate_keeping_right(&mut self, at: usize) -> Self {
        let mut other = self.clone();
        *self = other.truncate(at);
        other
    }
}

pub trait AppendRle<T: MergableSpan> {
    /// Push an item, merging it into the last item in the list when that's possible.
    ///
    /// Returns true if the item was merged.
    fn push_rle(&mut self, item: T) -> bool;

    fn extend_rle<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push_rle(item);
        }
    }
}

impl<T: MergableSpan> AppendRle<T> for Vec<T> {
    fn push_rle(&mut self, item: T) -> bool {
        if let Some(v) = self.last_mut() {
            if v.can_append(&item) {
                v.append(item);
                return true;
            }
        }

        self.push(item);
        false
    }
}

impl<T: MergableSpan, const N: usize> AppendRle<T> for SmallVec<T, N> {
    fn push_rle(&mut self, item: T) -> bool {
        if let Some(v) = self.last_mut() {
            if v.can_append(&item) {
                v.append(item);
                return true;
            }
        }

        self.push(item);
        false
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Clone, Debug, Eq, PartialEq)]
    struct Run(i32);

    impl MergableSpan for Run {
        fn can_append(&self, other: &Self) -> bool {
            (self.0 >= 0) == (other.0 >= 0)
        }

        fn append(&mut self, other: Self) {
            self.0 += other.0;
        }
    }

    #[test]
    fn push_rle_merges_compatible_items() {
        let mut v = Vec::new();
        assert!(!v.push_rle(Run(2)));
        assert!(v.push_rle(Run(3)));
        assert!(!v.push_rle(Run(-1)));
        v.extend_rle([Run(-4), Run(1)]);
        assert_eq!(v, vec![Run(5), Run(-5), Run(1)]);
    }
}
