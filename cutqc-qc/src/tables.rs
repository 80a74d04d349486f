use serde::Serialize;

use cutqc_core::errors::QcError;

/// An input that could not be used, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exclusion {
    /// Sample identity, or the file path when no identity could be derived.
    pub identity: String,
    pub reason: String,
}

impl Exclusion {
    pub fn new(identity: impl Into<String>, reason: impl Into<String>) -> Self {
        Exclusion {
            identity: identity.into(),
            reason: reason.into(),
        }
    }

    pub fn from_error(identity: impl Into<String>, err: &QcError) -> Self {
        Exclusion::new(identity, err.to_string())
    }
}

///
/// One output table: the computed rows plus every input left out of them.
///
/// Keeping exclusions next to the records means a sample that failed to load
/// never looks like a sample that legitimately scored zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QcTable<R> {
    pub records: Vec<R>,
    pub excluded: Vec<Exclusion>,
}

impl<R> Default for QcTable<R> {
    fn default() -> Self {
        QcTable {
            records: Vec::new(),
            excluded: Vec::new(),
        }
    }
}

impl<R> QcTable<R> {
    pub fn new(records: Vec<R>) -> Self {
        QcTable {
            records,
            excluded: Vec::new(),
        }
    }

    /// Append exclusions, keeping any already recorded.
    pub fn with_excluded<I: IntoIterator<Item = Exclusion>>(mut self, excluded: I) -> Self {
        self.excluded.extend(excluded);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.records.iter()
    }
}

impl<R> FromIterator<R> for QcTable<R> {
    fn from_iter<T: IntoIterator<Item = R>>(iter: T) -> Self {
        QcTable::new(iter.into_iter().collect())
    }
}
