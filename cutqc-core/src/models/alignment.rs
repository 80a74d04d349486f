///
/// The parts of a SAM/BAM record fragment reconstruction cares about.
///
/// Coordinates are 0-based with an exclusive `end`. Unmapped records carry
/// `None` for chromosome and coordinates.
///
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AlignmentRecord {
    pub name: Vec<u8>,
    pub flags: u16,
    pub chr: Option<String>,
    pub start: Option<u32>,
    pub end: Option<u32>,
}

pub const PAIRED: u16 = 0x1;
pub const UNMAPPED: u16 = 0x4;
pub const MATE_UNMAPPED: u16 = 0x8;
pub const FIRST_SEGMENT: u16 = 0x40;
pub const LAST_SEGMENT: u16 = 0x80;
pub const SECONDARY: u16 = 0x100;
pub const DUPLICATE: u16 = 0x400;
pub const SUPPLEMENTARY: u16 = 0x800;

impl AlignmentRecord {
    #[inline]
    fn has(&self, flag: u16) -> bool {
        self.flags & flag != 0
    }

    pub fn is_paired(&self) -> bool {
        self.has(PAIRED)
    }

    pub fn is_unmapped(&self) -> bool {
        self.has(UNMAPPED) || self.chr.is_none() || self.start.is_none() || self.end.is_none()
    }

    pub fn is_mate_unmapped(&self) -> bool {
        self.has(MATE_UNMAPPED)
    }

    pub fn is_first_segment(&self) -> bool {
        self.has(FIRST_SEGMENT)
    }

    pub fn is_last_segment(&self) -> bool {
        self.has(LAST_SEGMENT)
    }

    pub fn is_duplicate(&self) -> bool {
        self.has(DUPLICATE)
    }

    pub fn is_secondary(&self) -> bool {
        self.has(SECONDARY)
    }

    pub fn is_supplementary(&self) -> bool {
        self.has(SUPPLEMENTARY)
    }

    ///
    /// Whether this record may contribute a mate to a fragment.
    pub fn is_usable(&self) -> bool {
        self.is_paired()
            && !self.is_unmapped()
            && !self.is_mate_unmapped()
            && !self.is_duplicate()
            && !self.is_secondary()
            && !self.is_supplementary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    fn record(flags: u16) -> AlignmentRecord {
        AlignmentRecord {
            name: b"read1".to_vec(),
            flags,
            chr: Some("chr1".to_string()),
            start: Some(100),
            end: Some(150),
        }
    }

    #[rstest]
    #[case(PAIRED | FIRST_SEGMENT, true)]
    #[case(PAIRED | LAST_SEGMENT, true)]
    #[case(FIRST_SEGMENT, false)]
    #[case(PAIRED | FIRST_SEGMENT | MATE_UNMAPPED, false)]
    #[case(PAIRED | FIRST_SEGMENT | DUPLICATE, false)]
    #[case(PAIRED | FIRST_SEGMENT | UNMAPPED, false)]
    #[case(PAIRED | FIRST_SEGMENT | SECONDARY, false)]
    #[case(PAIRED | FIRST_SEGMENT | SUPPLEMENTARY, false)]
    fn test_is_usable(#[case] flags: u16, #[case] usable: bool) {
        assert_eq!(record(flags).is_usable(), usable);
    }

    #[rstest]
    fn test_missing_position_counts_as_unmapped() {
        let mut rec = record(PAIRED | FIRST_SEGMENT);
        rec.start = None;
        assert!(rec.is_unmapped());
        assert!(!rec.is_usable());
    }
}
