use std::mem::take;
use std::ops::Range;

use num_traits::{PrimInt, Unsigned};

use super::Overlapper;
use cutqc_core::models::Interval;

/// Intervals that contain at least this many of their successors get pushed
/// into a later sublist during decomposition.
const MIN_COVERAGE: usize = 10;

/// An Augmented Interval List.
///
/// From the following article: <https://academic.oup.com/bioinformatics/article/35/23/4907/5509521>
///
/// Intervals are sorted by start and split into sublists so that long
/// intervals covering many short ones do not defeat the running `max_end`
/// early exit. A query binary-searches each sublist for the last start before
/// the query end and walks backwards until `max_end` says nothing further can
/// reach the query.
///
/// ```
/// use cutqc_overlaprs::{AIList, Overlapper, Interval};
///
/// let peaks = vec![
///     Interval { start: 100u32, end: 200, val: 0usize },
///     Interval { start: 150, end: 250, val: 1 },
///     Interval { start: 900, end: 950, val: 2 },
/// ];
///
/// let ailist = AIList::build(peaks);
/// assert_eq!(ailist.count(180, 220), 2);
/// assert!(!ailist.any_overlap(300, 400));
/// ```
#[derive(Debug, Clone)]
pub struct AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    intervals: Vec<Interval<I, T>>,
    max_ends: Vec<I>,
    /// Offset of the first interval of every sublist.
    header_list: Vec<usize>,
}

impl<I, T> Overlapper<I, T> for AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized,
    {
        let mut remaining = intervals;
        remaining.sort_by_key(|iv| iv.start);

        let total = remaining.len();
        let mut stored = Vec::with_capacity(total);
        let mut max_ends = Vec::with_capacity(total);
        let mut header_list = vec![0];

        loop {
            let (kept, deferred) = Self::decompose(take(&mut remaining));

            let mut max = I::zero();
            for iv in kept {
                max = std::cmp::max(max, iv.end);
                max_ends.push(max);
                stored.push(iv);
            }

            if deferred.is_empty() {
                break;
            }
            header_list.push(stored.len());
            remaining = deferred;
        }

        AIList {
            intervals: stored,
            max_ends,
            header_list,
        }
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        Box::new(IterFind::new(self, start, end))
    }
}

impl<I, T> AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Split a start-sorted list into the intervals kept at this level and
    /// the long ones deferred to the next sublist. Both halves stay sorted.
    fn decompose(intervals: Vec<Interval<I, T>>) -> (Vec<Interval<I, T>>, Vec<Interval<I, T>>) {
        let mut deferred = Vec::new();
        let mut kept = Vec::with_capacity(intervals.len());

        for (index, interval) in intervals.iter().enumerate() {
            let covered = intervals
                .iter()
                .skip(index + 1)
                .take(MIN_COVERAGE * 2 - 1)
                .filter(|next| interval.end > next.end)
                .count();

            if covered >= MIN_COVERAGE {
                deferred.push(interval.clone());
            } else {
                kept.push(interval.clone());
            }
        }

        (kept, deferred)
    }

    fn sublist(&self, k: usize) -> Range<usize> {
        let from = self.header_list[k];
        let to = self
            .header_list
            .get(k + 1)
            .copied()
            .unwrap_or(self.intervals.len());
        from..to
    }

    /// Returns the number of intervals in the AIList.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Returns `true` if the AIList contains no intervals.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

/// Lazy walk over the intervals of an [`AIList`] that overlap `[start, end)`.
///
/// Created by [`find_iter`](Overlapper::find_iter).
#[derive(Debug)]
pub struct IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync + 'a,
{
    inner: &'a AIList<I, T>,
    sublist: usize,
    /// Cursor inside the current sublist, counting down towards its head.
    cursor: Option<usize>,
    start: I,
    end: I,
}

impl<'a, I, T> IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync + 'a,
{
    fn new(ailist: &'a AIList<I, T>, start: I, end: I) -> Self {
        Self {
            inner: ailist,
            sublist: 0,
            cursor: None,
            start,
            end,
        }
    }
}

impl<'a, I, T> Iterator for IterFind<'a, I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync + 'a,
{
    type Item = &'a Interval<I, T>;

    fn next(&mut self) -> Option<Self::Item> {
        let inner = self.inner;
        if inner.is_empty() {
            return None;
        }

        while self.sublist < inner.header_list.len() {
            let range = inner.sublist(self.sublist);
            let intervals = &inner.intervals[range.clone()];
            let max_ends = &inner.max_ends[range];

            let end = self.end;
            let i = self
                .cursor
                .get_or_insert_with(|| intervals.partition_point(|iv| iv.start < end));

            while *i > 0 {
                *i -= 1;
                // start inclusive, end exclusive
                if self.start >= intervals[*i].end {
                    if self.start >= max_ends[*i] {
                        break;
                    }
                } else {
                    return Some(&intervals[*i]);
                }
            }

            self.cursor = None;
            self.sublist += 1;
        }
        None
    }
}
