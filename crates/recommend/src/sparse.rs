//! Compressed sparse row matrix for user-item interactions

use ndarray::Array1;

/// Sparse user-item interaction matrix in CSR layout
///
/// Row `u` owns `indices[indptr[u]..indptr[u + 1]]` (item columns, strictly
/// increasing) and the matching slice of `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    num_users: usize,
    num_items: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<f32>,
}

impl SparseMatrix {
    /// Assemble from `(user_index, item_index, value)` triples
    ///
    /// Values at duplicate coordinates are summed. Triples outside the shape
    /// are a caller bug and panic.
    pub fn from_triplets(
        num_users: usize,
        num_items: usize,
        mut triplets: Vec<(usize, usize, f32)>,
    ) -> Self {
        // Stable sort keeps the summation order equal to the input order.
        triplets.sort_by_key(|&(user, item, _)| (user, item));

        let mut indptr = vec![0; num_users + 1];
        let mut indices: Vec<usize> = Vec::with_capacity(triplets.len());
        let mut values: Vec<f32> = Vec::with_capacity(triplets.len());
        let mut last: Option<(usize, usize)> = None;

        for (user, item, value) in triplets {
            assert!(
                user < num_users && item < num_items,
                "triplet ({}, {}) outside {}x{} matrix",
                user,
                item,
                num_users,
                num_items
            );

            if last == Some((user, item)) {
                if let Some(cell) = values.last_mut() {
                    *cell += value;
                }
                continue;
            }

            indices.push(item);
            values.push(value);
            indptr[user + 1] += 1;
            last = Some((user, item));
        }

        for row in 0..num_users {
            indptr[row + 1] += indptr[row];
        }

        Self {
            num_users,
            num_items,
            indptr,
            indices,
            values,
        }
    }

    pub fn num_users(&self) -> usize {
        self.num_users
    }

    pub fn num_items(&self) -> usize {
        self.num_items
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.num_users, self.num_items)
    }

    /// Number of stored (non-zero) cells
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.num_users == 0 || self.num_items == 0
    }

    /// Column indices and values of one row
    pub fn row(&self, user_idx: usize) -> (&[usize], &[f32]) {
        let span = self.indptr[user_idx]..self.indptr[user_idx + 1];
        (&self.indices[span.clone()], &self.values[span])
    }

    pub fn get(&self, user_idx: usize, item_idx: usize) -> f32 {
        let (indices, values) = self.row(user_idx);
        indices
            .binary_search(&item_idx)
            .map(|pos| values[pos])
            .unwrap_or(0.0)
    }

    /// Copy with every row scaled to unit L2 norm; all-zero rows stay zero
    pub fn l2_normalized(&self) -> Self {
        let mut values = self.values.clone();

        for row in 0..self.num_users {
            let span = self.indptr[row]..self.indptr[row + 1];
            let norm = values[span.clone()]
                .iter()
                .map(|v| v * v)
                .sum::<f32>()
                .sqrt();

            if norm > 0.0 {
                values[span].iter_mut().for_each(|v| *v /= norm);
            }
        }

        Self {
            num_users: self.num_users,
            num_items: self.num_items,
            indptr: self.indptr.clone(),
            indices: self.indices.clone(),
            values,
        }
    }

    /// Dot product of two rows (sorted-index merge)
    pub fn row_dot(&self, a: usize, b: usize) -> f32 {
        let (a_idx, a_val) = self.row(a);
        let (b_idx, b_val) = self.row(b);

        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0;
        while i < a_idx.len() && j < b_idx.len() {
            match a_idx[i].cmp(&b_idx[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += a_val[i] * b_val[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        dot
    }

    /// Column-wise sum of the given rows
    pub fn sum_rows(&self, rows: &[usize]) -> Array1<f32> {
        let mut totals = Array1::<f32>::zeros(self.num_items);
        for &row in rows {
            let (indices, values) = self.row(row);
            for (&item, &value) in indices.iter().zip(values) {
                totals[item] += value;
            }
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_matrix() {
        let matrix = SparseMatrix::from_triplets(2, 2, vec![(0, 0, 1.0), (0, 1, 2.0), (1, 0, 3.0)]);

        assert_eq!(matrix.shape(), (2, 2));
        assert_eq!(matrix.nnz(), 3);
        assert_eq!(matrix.get(0, 0), 1.0);
        assert_eq!(matrix.get(0, 1), 2.0);
        assert_eq!(matrix.get(1, 0), 3.0);
        assert_eq!(matrix.get(1, 1), 0.0);
    }

    #[test]
    fn test_duplicate_coordinates_accumulate() {
        let matrix = SparseMatrix::from_triplets(
            1,
            2,
            vec![(0, 1, 1.0), (0, 0, 4.0), (0, 1, 15.0), (0, 1, 1.0)],
        );

        assert_eq!(matrix.nnz(), 2);
        assert_eq!(matrix.get(0, 1), 17.0);
        assert_eq!(matrix.row(0).0, &[0, 1]);
    }

    #[test]
    fn test_zero_sized_matrix() {
        let matrix = SparseMatrix::from_triplets(0, 0, Vec::new());
        assert!(matrix.is_empty());
        assert_eq!(matrix.nnz(), 0);
        assert_eq!(matrix.l2_normalized(), matrix);
    }

    #[test]
    fn test_l2_normalized_rows() {
        let matrix = SparseMatrix::from_triplets(3, 2, vec![(0, 0, 3.0), (0, 1, 4.0), (2, 1, 2.0)]);
        let normalized = matrix.l2_normalized();

        assert!((normalized.get(0, 0) - 0.6).abs() < 1e-6);
        assert!((normalized.get(0, 1) - 0.8).abs() < 1e-6);
        // Row 1 is empty and stays that way
        assert_eq!(normalized.row(1).0.len(), 0);
        assert!((normalized.get(2, 1) - 1.0).abs() < 1e-6);
        // Source matrix untouched
        assert_eq!(matrix.get(0, 0), 3.0);
    }

    #[test]
    fn test_row_dot_and_sum_rows() {
        let matrix = SparseMatrix::from_triplets(
            3,
            3,
            vec![(0, 0, 1.0), (0, 2, 2.0), (1, 2, 3.0), (1, 1, 5.0), (2, 0, 1.0)],
        );

        assert_eq!(matrix.row_dot(0, 1), 6.0);
        assert_eq!(matrix.row_dot(1, 2), 0.0);
        assert_eq!(matrix.sum_rows(&[0, 1]).to_vec(), vec![1.0, 5.0, 5.0]);
        assert_eq!(matrix.sum_rows(&[]).to_vec(), vec![0.0, 0.0, 0.0]);
    }
}
