use num_traits::{PrimInt, Unsigned};

pub use cutqc_core::models::Interval;

/// A structure that answers "which stored intervals touch `[start, end)`?".
pub trait Overlapper<I, T>: Send + Sync
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized;

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a>;

    fn find(&self, start: I, end: I) -> Vec<Interval<I, T>> {
        self.find_iter(start, end).cloned().collect()
    }

    /// Stops at the first hit.
    fn any_overlap(&self, start: I, end: I) -> bool {
        self.find_iter(start, end).next().is_some()
    }

    fn count(&self, start: I, end: I) -> usize {
        self.find_iter(start, end).count()
    }
}
