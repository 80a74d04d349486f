use crate::models::interval::Ranged;

///
/// A called region of enriched signal.
///
#[derive(PartialEq, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peak {
    pub chr: String,
    pub start: u32,
    pub end: u32,
    pub total_signal: f64,
    pub max_signal: f64,
}

impl Peak {
    /// Build a peak. Reversed coordinates are swapped, a zero-width peak is rejected.
    pub fn new(
        chr: impl Into<String>,
        start: u32,
        end: u32,
        total_signal: f64,
        max_signal: f64,
    ) -> Option<Self> {
        if start == end {
            return None;
        }
        let (start, end) = if start < end { (start, end) } else { (end, start) };
        Some(Peak {
            chr: chr.into(),
            start,
            end,
            total_signal,
            max_signal,
        })
    }

    /// Coordinates only, for deduplication and joins.
    pub fn key(&self) -> (&str, u32, u32) {
        (&self.chr, self.start, self.end)
    }
}

impl Ranged for Peak {
    fn chr(&self) -> &str {
        &self.chr
    }

    fn start(&self) -> u32 {
        self.start
    }

    fn end(&self) -> u32 {
        self.end
    }
}
