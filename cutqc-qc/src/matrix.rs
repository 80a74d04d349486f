//! Genome-wide binned count matrix across samples.
//!
//! Every sample contributes one column. Rows are the union of all
//! (chromosome, bin) keys, so a bin missing from a sample is an empty cell
//! rather than a zero.

use std::collections::{BTreeMap, HashSet};

use log::debug;
use ndarray::Array2;
use serde::Serialize;

use cutqc_core::errors::{QcError, Result};
use cutqc_core::models::BinnedCounts;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BinKey {
    pub chr: String,
    pub bin: u64,
}

/// Raw counts, one row per bin and one column per sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedMatrix {
    pub samples: Vec<String>,
    pub rows: Vec<BinKey>,
    /// Row major, `cells[row][column]`.
    pub cells: Vec<Vec<Option<u64>>>,
}

/// `log2` of [BinnedMatrix]. Cells that were empty or zero stay empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Log2Matrix {
    pub samples: Vec<String>,
    pub rows: Vec<BinKey>,
    pub cells: Vec<Vec<Option<f64>>>,
}

///
/// Collects per-sample counts before the join. Capacity for the columns is
/// reserved once, up front.
pub struct BinnedMatrixBuilder {
    columns: Vec<BinnedCounts>,
    seen: HashSet<String>,
}

impl BinnedMatrixBuilder {
    pub fn with_capacity(samples: usize) -> Self {
        BinnedMatrixBuilder {
            columns: Vec::with_capacity(samples),
            seen: HashSet::with_capacity(samples),
        }
    }

    /// Add one sample's counts. The same sample twice, or the same bin twice
    /// inside one sample, is a schema mismatch.
    pub fn add(&mut self, counts: BinnedCounts) -> Result<()> {
        if !self.seen.insert(counts.sample.clone()) {
            return Err(QcError::SchemaMismatch {
                input: counts.sample,
                reason: "sample appears in more than one binned count input".to_string(),
            });
        }

        let mut bins: HashSet<(&str, u64)> = HashSet::with_capacity(counts.len());
        for row in &counts.counts {
            if !bins.insert((row.chr.as_str(), row.bin)) {
                return Err(QcError::SchemaMismatch {
                    input: counts.sample.clone(),
                    reason: format!("bin {}:{} reported more than once", row.chr, row.bin),
                });
            }
        }

        self.columns.push(counts);
        Ok(())
    }

    /// Full outer join on (chromosome, bin). Columns are ordered by sample
    /// name and rows by key, whatever order the inputs were added in.
    pub fn build(mut self) -> BinnedMatrix {
        self.columns.sort_by(|a, b| a.sample.cmp(&b.sample));
        let width = self.columns.len();

        let mut joined: BTreeMap<BinKey, Vec<Option<u64>>> = BTreeMap::new();
        for (col, counts) in self.columns.iter().enumerate() {
            for row in &counts.counts {
                let key = BinKey {
                    chr: row.chr.clone(),
                    bin: row.bin,
                };
                joined.entry(key).or_insert_with(|| vec![None; width])[col] = Some(row.count);
            }
        }

        let samples: Vec<String> = self.columns.into_iter().map(|c| c.sample).collect();
        let (rows, cells): (Vec<BinKey>, Vec<Vec<Option<u64>>>) = joined.into_iter().unzip();

        BinnedMatrix {
            samples,
            rows,
            cells,
        }
    }
}

impl BinnedMatrix {
    ///
    /// Merge the binned counts of every sample into one matrix.
    pub fn merge(inputs: Vec<BinnedCounts>) -> Result<Self> {
        let mut builder = BinnedMatrixBuilder::with_capacity(inputs.len());
        for counts in inputs {
            builder.add(counts)?;
        }
        let matrix = builder.build();
        debug!(
            "binned matrix: {} bins x {} samples",
            matrix.rows.len(),
            matrix.samples.len()
        );
        Ok(matrix)
    }

    pub fn column_index(&self, sample: &str) -> Option<usize> {
        self.samples.iter().position(|s| s == sample)
    }

    pub fn get(&self, chr: &str, bin: u64, sample: &str) -> Option<u64> {
        let col = self.column_index(sample)?;
        let row = self
            .rows
            .binary_search_by(|k| (k.chr.as_str(), k.bin).cmp(&(chr, bin)))
            .ok()?;
        self.cells[row][col]
    }

    /// Per-cell `log2(count)`. Zero and empty cells become `None`.
    pub fn log2(&self) -> Log2Matrix {
        let cells: Vec<Vec<Option<f64>>> = self
            .cells
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.filter(|&c| c > 0).map(|c| (c as f64).log2()))
                    .collect::<Vec<_>>()
            })
            .collect();

        Log2Matrix {
            samples: self.samples.clone(),
            rows: self.rows.clone(),
            cells,
        }
    }
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let (dx, dy) = (x - mean_x, y - mean_y);
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

impl Log2Matrix {
    pub fn column(&self, col: usize) -> impl Iterator<Item = Option<f64>> + '_ {
        self.cells.iter().map(move |row| row[col])
    }

    ///
    /// Pairwise Pearson correlation between sample columns.
    ///
    /// Each pair only uses rows where both cells hold a finite value. A pair
    /// with fewer than two such rows, or with a constant column, gets `None`.
    pub fn correlation(&self) -> Array2<Option<f64>> {
        let n = self.samples.len();
        let mut corr = Array2::from_elem((n, n), None);

        for i in 0..n {
            for j in i..n {
                let pairs: Vec<(f64, f64)> = self
                    .column(i)
                    .zip(self.column(j))
                    .filter_map(|(a, b)| match (a, b) {
                        (Some(a), Some(b)) if a.is_finite() && b.is_finite() => Some((a, b)),
                        _ => None,
                    })
                    .collect();
                let r = pearson(&pairs);
                corr[[i, j]] = r;
                corr[[j, i]] = r;
            }
        }

        corr
    }
}
