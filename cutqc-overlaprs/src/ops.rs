//! Set-level overlap operations built on [`ChromIndex`].
//!
//! All of them index the target side once and stream the queries through
//! it, so the cost is `O((n + m) log m)` rather than `n * m`.

use cutqc_core::models::Ranged;

use crate::chrom_index::IntoChromIndex;

/// Half-open overlap test for two intervals: same chromosome and
/// `a.start < b.end && b.start < a.end`.
pub fn overlaps<A: Ranged, B: Ranged>(a: &A, b: &B) -> bool {
    a.chr() == b.chr() && a.start() < b.end() && b.start() < a.end()
}

/// For every query, how many targets it overlaps.
pub fn overlap_count<Q: Ranged, S: Ranged>(queries: &[Q], targets: &[S]) -> Vec<usize> {
    let index = targets.into_chrom_index();
    queries.iter().map(|q| index.count(q)).collect()
}

/// How many queries overlap at least one target.
pub fn count_overlapping<Q: Ranged, S: Ranged>(queries: &[Q], targets: &[S]) -> usize {
    let index = targets.into_chrom_index();
    queries.iter().filter(|q| index.any_overlap(*q)).count()
}

/// One overlapping (query, subject) pair from [`join`].
#[derive(Debug)]
pub struct JoinHit<'a, Q, S> {
    pub query_index: usize,
    pub subject_index: usize,
    pub query: &'a Q,
    pub subject: &'a S,
}

impl<'a, Q: Ranged, S: Ranged> JoinHit<'a, Q, S> {
    /// The shared stretch `(chromosome, start, end)`.
    pub fn intersection(&self) -> (&'a str, u32, u32) {
        let query: &'a Q = self.query;
        (
            query.chr(),
            query.start().max(self.subject.start()),
            query.end().min(self.subject.end()),
        )
    }
}

///
/// Inner overlap join: every pair of query and subject that overlap.
///
/// Hits come out grouped by query in input order, and by subject position
/// within a query.
pub fn join<'a, Q: Ranged, S: Ranged>(
    queries: &'a [Q],
    subjects: &'a [S],
) -> Vec<JoinHit<'a, Q, S>> {
    let index = subjects.into_chrom_index();
    let mut hits = Vec::new();

    for (query_index, query) in queries.iter().enumerate() {
        let mut matched: Vec<usize> = index.find_iter(query).map(|iv| iv.val).collect();
        matched.sort_unstable();

        hits.extend(matched.into_iter().map(|subject_index| JoinHit {
            query_index,
            subject_index,
            query,
            subject: &subjects[subject_index],
        }));
    }

    hits
}
