//! Exact cosine nearest-neighbor search over user rows

use crate::sparse::SparseMatrix;
use rayon::prelude::*;
use std::cmp::Ordering;

/// A user row returned by a neighbor query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub user_idx: usize,
    /// Cosine distance, `1 - cosine similarity`
    pub distance: f32,
}

impl Neighbor {
    fn closer(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.user_idx.cmp(&other.user_idx))
    }
}

/// Brute-force cosine index over L2-normalized user rows
///
/// Every query scans all rows; results are exact.
#[derive(Debug, Clone)]
pub struct CosineNeighborIndex {
    normalized: SparseMatrix,
}

impl CosineNeighborIndex {
    pub fn fit(matrix: &SparseMatrix) -> Self {
        Self {
            normalized: matrix.l2_normalized(),
        }
    }

    pub fn len(&self) -> usize {
        self.normalized.num_users()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cosine distance between two indexed rows
    ///
    /// An all-zero row sits at distance 1 from every row, itself included.
    pub fn distance(&self, a: usize, b: usize) -> f32 {
        (1.0 - self.normalized.row_dot(a, b)).max(0.0)
    }

    /// The `k` rows nearest to row `user_idx`, closest first
    ///
    /// The queried row is always the first entry (distance 0). The rest are
    /// ordered by ascending distance, ties by ascending row index. Fewer than
    /// `k` entries come back when the index holds fewer rows.
    pub fn kneighbors(&self, user_idx: usize, k: usize) -> Vec<Neighbor> {
        if k == 0 || user_idx >= self.len() {
            return Vec::new();
        }

        let mut candidates = (0..self.len())
            .into_par_iter()
            .filter(|&other| other != user_idx)
            .map(|other| Neighbor {
                user_idx: other,
                distance: self.distance(user_idx, other),
            })
            .collect::<Vec<_>>();

        let wanted = (k - 1).min(candidates.len());
        if wanted < candidates.len() && wanted > 0 {
            candidates.select_nth_unstable_by(wanted - 1, Neighbor::closer);
        }
        candidates.truncate(wanted);
        candidates.sort_by(Neighbor::closer);

        let mut neighbors = Vec::with_capacity(wanted + 1);
        neighbors.push(Neighbor {
            user_idx,
            distance: 0.0,
        });
        neighbors.extend(candidates);
        neighbors
    }
}
