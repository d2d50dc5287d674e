//! ## Sorted-axis sweep (reference all-pairs finder)
//!
//! Implements [`Tree::all_pairs_sweep`], a sort-and-scan all-pairs finder that serves as a
//! correctness oracle for [`Tree::all_pairs`] and as a fast path when the point set is small or
//! near-collinear along axis 0. Sorts the point store globally by axis 0; this mutates the
//! store's permutation, same as [`Tree::set_data`]'s build.

use crate::errors::IndexError;
use crate::tree::{squared_distance, Tree};
use tracing::info;

impl Tree {
    /// Runs the sorted-axis reference all-pairs search, overwriting the same neighbor-list
    /// result buffer as [`Tree::all_pairs`]. Produces the identical set of unordered pairs.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidArgument`] if `radius` is non-positive, and
    /// [`IndexError::Uninitialized`] if called before [`Tree::set_data`].
    pub fn all_pairs_sweep(&mut self, radius: f32) -> Result<(), IndexError> {
        if radius <= 0.0 {
            return Err(IndexError::invalid("radius must be positive"));
        }
        if self.root.is_none() {
            return Err(IndexError::Uninitialized);
        }
        info!(radius, "running sweep all-pairs neighbor search");

        let n = self.store.len();
        self.store.sort(0..n, 0);

        let radius_sq = radius * radius;
        let mut pairs = Vec::new();
        for i in 0..n {
            let xi = self.store.coord_at(i, 0);
            for j in (i + 1)..n {
                let xj = self.store.coord_at(j, 0);
                if (xj - xi).abs() > radius {
                    break;
                }
                let d = squared_distance(self.store.point_at(i), self.store.point_at(j));
                if d <= radius_sq {
                    pairs.push((
                        self.store.original_index_at(i),
                        self.store.original_index_at(j),
                        d.sqrt(),
                    ));
                }
            }
        }
        *self.neighbor_list_mut() = pairs;
        Ok(())
    }
}
