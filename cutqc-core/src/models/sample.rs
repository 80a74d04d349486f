use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::path::Path;
use std::str::FromStr;

use crate::errors::{QcError, Result};

///
/// Group/replicate identity of one sample, e.g. `h3k27me3_R1`.
///
/// Ordering is "natural": the numeric suffix of a token is compared as a
/// number, so `R2` sorts before `R10`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleId {
    pub group: String,
    pub replicate: String,
}

impl SampleId {
    pub fn new(group: impl Into<String>, replicate: impl Into<String>) -> Self {
        SampleId {
            group: group.into(),
            replicate: replicate.into(),
        }
    }

    ///
    /// Derive the identity from a file name such as `h3k4me3_R2.seacr.peaks.bed`.
    ///
    /// Everything after the first `.` is ignored.
    pub fn from_path(path: &Path) -> Result<Self> {
        let stem = sample_stem(path)
            .ok_or_else(|| QcError::InvalidSampleIdentity(path.display().to_string()))?;
        stem.parse()
    }
}

///
/// Name of a file up to its first `.`.
pub fn sample_stem(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
}

impl FromStr for SampleId {
    type Err = QcError;

    /// The replicate is the last `_` token, the group is everything before it.
    fn from_str(s: &str) -> Result<Self> {
        match s.rsplit_once('_') {
            Some((group, replicate)) if !group.is_empty() && !replicate.is_empty() => {
                Ok(SampleId::new(group, replicate))
            }
            _ => Err(QcError::InvalidSampleIdentity(s.to_string())),
        }
    }
}

impl Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.group, self.replicate)
    }
}

impl Ord for SampleId {
    fn cmp(&self, other: &Self) -> Ordering {
        natural_cmp(&self.group, &other.group)
            .then_with(|| natural_cmp(&self.replicate, &other.replicate))
    }
}

impl PartialOrd for SampleId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Compare labels by text prefix, then by trailing number.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    fn split(s: &str) -> (&str, Option<u64>) {
        let prefix_len = s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
        let (prefix, digits) = s.split_at(prefix_len);
        (prefix, digits.parse::<u64>().ok())
    }

    let (prefix_a, num_a) = split(a);
    let (prefix_b, num_b) = split(b);

    prefix_a
        .cmp(prefix_b)
        .then(num_a.cmp(&num_b))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::path::PathBuf;

    #[rstest]
    #[case("h3k27me3_R1", "h3k27me3", "R1")]
    #[case("igg_ctrl_R2", "igg_ctrl", "R2")]
    #[case("a_b_c_3", "a_b_c", "3")]
    fn test_parse_identity(#[case] input: &str, #[case] group: &str, #[case] replicate: &str) {
        let id: SampleId = input.parse().unwrap();
        assert_eq!(id.group, group);
        assert_eq!(id.replicate, replicate);
        assert_eq!(id.to_string(), input);
    }

    #[rstest]
    #[case("noreplicate")]
    #[case("_R1")]
    #[case("group_")]
    fn test_parse_identity_rejects(#[case] input: &str) {
        let res = input.parse::<SampleId>();
        assert!(matches!(res, Err(QcError::InvalidSampleIdentity(_))));
    }

    #[rstest]
    fn test_from_path_uses_text_before_first_dot() {
        let path = PathBuf::from("/data/peaks/h3k4me3_R2.seacr.peaks.stringent.bed");
        let id = SampleId::from_path(&path).unwrap();
        assert_eq!(id, SampleId::new("h3k4me3", "R2"));
    }

    #[rstest]
    fn test_natural_ordering() {
        let mut ids = vec![
            SampleId::new("b", "R10"),
            SampleId::new("b", "R2"),
            SampleId::new("a", "R3"),
        ];
        ids.sort();
        let labels: Vec<String> = ids.iter().map(|i| i.to_string()).collect();
        assert_eq!(labels, vec!["a_R3", "b_R2", "b_R10"]);
    }
}
