//! Sparse matrix helpers.
//!
//! Constraint rows are stored in CSR format so that each row (and each cut
//! appended later) is one outer vector.

use sprs::{CsMat, CsVec, CsVecView};

/// Sparse matrix in CSR format (one outer vector per row).
pub type SparseCsr = CsMat<f64>;

/// Sparse row vector.
pub type SparseRow = CsVec<f64>;

/// Build a sparse row of dimension `dim` from unordered `(index, value)` pairs.
///
/// Entries are sorted, duplicates summed and exact zeros dropped. The caller
/// guarantees every index is below `dim`.
pub fn sparse_row(dim: usize, entries: &[(usize, f64)]) -> SparseRow {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|&(j, _)| j);

    let mut indices: Vec<usize> = Vec::with_capacity(sorted.len());
    let mut data: Vec<f64> = Vec::with_capacity(sorted.len());
    for (j, v) in sorted {
        match indices.last() {
            Some(&last) if last == j => {
                if let Some(acc) = data.last_mut() {
                    *acc += v;
                }
            }
            _ => {
                indices.push(j);
                data.push(v);
            }
        }
    }

    let (indices, data): (Vec<usize>, Vec<f64>) = indices
        .into_iter()
        .zip(data)
        .filter(|&(_, v)| v != 0.0)
        .unzip();

    CsVec::new(dim, indices, data)
}

/// Dot product of a sparse row with a dense vector.
pub fn dot(row: CsVecView<'_, f64>, x: &[f64]) -> f64 {
    row.iter().map(|(j, &a)| a * x[j]).sum()
}

/// Append a row to a CSR matrix, returning the grown matrix.
pub fn append_row(mat: SparseCsr, row: &SparseRow) -> SparseCsr {
    mat.append_outer_csvec(row.view())
}
