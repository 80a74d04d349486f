use num_traits::{PrimInt, Unsigned};
use std::cmp::Ordering::{self};

/// A half-open range `[start, end)` carrying a payload.
///
/// Equality and ordering only look at the coordinates, so two intervals with
/// different payloads but identical bounds compare equal.
#[derive(Eq, Debug, Clone)]
pub struct Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub start: I,
    pub end: I,
    pub val: T,
}

impl<I, T> Ord for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn cmp(&self, other: &Interval<I, T>) -> Ordering {
        self.start
            .cmp(&other.start)
            .then_with(|| self.end.cmp(&other.end))
    }
}

impl<I, T> PartialOrd for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<I, T> PartialEq for Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    #[inline]
    fn eq(&self, other: &Interval<I, T>) -> bool {
        self.start == other.start && self.end == other.end
    }
}

impl<I, T> Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Whether this interval shares at least one base with `[start, end)`.
    #[inline]
    pub fn overlaps_range(&self, start: I, end: I) -> bool {
        self.start < end && self.end > start
    }
}

/// Anything that lives on a single chromosome between `start` and `end`.
///
/// Coordinates are 0-based and half-open. Fragments and peaks both implement
/// this so the overlap engine can index either one.
pub trait Ranged {
    fn chr(&self) -> &str;
    fn start(&self) -> u32;
    fn end(&self) -> u32;

    /// Absolute width. Tolerates coordinates that were stored reversed.
    fn width(&self) -> u32 {
        self.start().abs_diff(self.end())
    }
}
