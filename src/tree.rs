//! ## Static k-d tree
//!
//! This module provides the static, bulk-built k-d tree that backs every query in this crate.
//! Points are loaded once via [`Tree::set_data`], which also performs the median-split build
//! described in the module-level algorithm notes below. Thereafter [`Tree::search_center_radius`]
//! (point query) and [`Tree::all_pairs`] / [`Tree::all_pairs_sweep`] (pair queries) read the tree
//! without mutating its structure.
//!
//! ### Example
//!
//! ```
//! use spatial_kd::tree::Tree;
//!
//! let mut tree: Tree = Tree::init(3, 8).unwrap();
//! tree.set_data(&[0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 5.0, 5.0, 5.0]).unwrap();
//! tree.search_center_radius(&[0.0f32, 0.0, 0.0], 1.5).unwrap();
//! assert_eq!(tree.count(), 2);
//! ```

use crate::errors::IndexError;
use crate::point_store::{CoordElement, PointStore};
use crate::region::{Classification, Intersection, Region};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// A node in the k-d tree: either an internal split or a leaf bucket.
///
/// Both variants carry the `[start, end)` range they cover in the tree's permuted
/// [`PointStore`], so that subtree enumeration (used by the "Contained" case of a region query,
/// and by pair enumeration) never needs to walk back up the tree.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub(crate) enum Node {
    Leaf {
        range: (usize, usize),
    },
    Internal {
        cut_dim: usize,
        cut_value: f32,
        left: Box<Node>,
        right: Box<Node>,
        range: (usize, usize),
    },
}

impl Node {
    fn range(&self) -> (usize, usize) {
        match self {
            Node::Leaf { range } => *range,
            Node::Internal { range, .. } => *range,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// A static k-d tree over N points in `dim`-dimensional Euclidean space.
///
/// Built once via [`Tree::set_data`]; [`Tree::search_center_radius`], [`Tree::all_pairs`], and
/// [`Tree::all_pairs_sweep`] are read-only over the built structure except for the query-scoped
/// result buffers they repopulate on each call.
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tree {
    dim: usize,
    bucket_size: usize,
    pub(crate) store: PointStore,
    pub(crate) root: Option<Node>,
    radius_list: Vec<(i64, f32)>,
    neighbor_list: Vec<(i64, i64, f32)>,
}

impl Tree {
    /// Installs a fresh, empty tree for `dim`-dimensional points with the given leaf bucket
    /// size.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidArgument`] if `dim` or `bucket_size` is zero.
    pub fn init(dim: usize, bucket_size: usize) -> Result<Self, IndexError> {
        if dim == 0 {
            return Err(IndexError::invalid("dim must be positive"));
        }
        if bucket_size == 0 {
            return Err(IndexError::invalid("bucket_size must be positive"));
        }
        info!(dim, bucket_size, "initializing tree");
        Ok(Tree {
            dim,
            bucket_size,
            store: PointStore::new(dim),
            root: None,
            radius_list: Vec::new(),
            neighbor_list: Vec::new(),
        })
    }

    /// The dimensionality this tree was initialized with.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of points currently indexed.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True if no points have been loaded.
    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Copies `points` (a flat, row-major N×dim buffer) into the internal `f32` coordinate
    /// buffer and bulk-builds the tree by recursive median split. Invalidates any prior query
    /// results.
    ///
    /// Accepts any element type implementing [`CoordElement`] (at minimum `f32`, `f64`, `i32`,
    /// `i64`, `u32`, `u64`), coercing element-wise via `as f32`. This coercion is lossy for
    /// integer magnitudes beyond `f32`'s 24-bit exact-integer range; callers needing exact
    /// round-tripping of very large coordinates should pre-scale their data.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidArgument`] if `points.len()` is not a multiple of `dim`.
    pub fn set_data<T: CoordElement>(&mut self, points: &[T]) -> Result<(), IndexError> {
        if points.len() % self.dim != 0 {
            return Err(IndexError::invalid(format!(
                "buffer length {} is not a multiple of dim {}",
                points.len(),
                self.dim
            )));
        }
        let n = points.len() / self.dim;
        info!(n, dim = self.dim, "loading points and rebuilding tree");

        let mut store = PointStore::new(self.dim);
        let mut coord = vec![0.0f32; self.dim];
        for i in 0..n {
            for (d, slot) in coord.iter_mut().enumerate() {
                *slot = points[i * self.dim + d].to_coord_f32();
            }
            store.add_point(i as i64, &coord)?;
        }

        self.root = Some(Self::build(&mut store, 0, n, 0, self.dim, self.bucket_size));
        self.store = store;
        self.radius_list.clear();
        self.neighbor_list.clear();
        Ok(())
    }

    /// Recursive median-split bulk build. See the algorithm notes in the module doc comment.
    fn build(
        store: &mut PointStore,
        begin: usize,
        end: usize,
        depth: usize,
        dim: usize,
        bucket_size: usize,
    ) -> Node {
        if end - begin <= bucket_size {
            return Node::Leaf { range: (begin, end) };
        }
        let d = depth % dim;
        store.sort(begin..end, d);
        let len = end - begin;
        let m = len.div_ceil(2);
        let cut_value = store.coord_at(begin + m - 1, d);
        debug!(begin, end, d, cut_value, "splitting node");
        let left = Self::build(store, begin, begin + m, depth + 1, dim, bucket_size);
        let right = Self::build(store, begin + m, end, depth + 1, dim, bucket_size);
        Node::Internal {
            cut_dim: d,
            cut_value,
            left: Box::new(left),
            right: Box::new(right),
            range: (begin, end),
        }
    }

    /// Splits `node`'s own region against the half-planes `coord[d] <= cut_value` and
    /// `coord[d] >= cut_value`, returning the entries of whichever children are not classified
    /// `Outside`. Shared by the single-tree descent in `tree.rs` and the dual descent in
    /// `pair_finder.rs`.
    pub(crate) fn split_entry<'a>(
        node: &'a Node,
        region: &Region,
        d: usize,
    ) -> (Option<(&'a Node, Region)>, Option<(&'a Node, Region)>) {
        match node {
            Node::Leaf { .. } => (Some((node, region.clone())), None),
            Node::Internal {
                cut_value,
                left,
                right,
                ..
            } => {
                let left_entry = match region.classify_left(d, *cut_value) {
                    Classification::Outside => None,
                    Classification::Splits => Some((left.as_ref(), region.split_left(d, *cut_value))),
                    Classification::FullyInside => Some((left.as_ref(), region.clone())),
                };
                let right_entry = match region.classify_right(d, *cut_value) {
                    Classification::Outside => None,
                    Classification::Splits => {
                        Some((right.as_ref(), region.split_right(d, *cut_value)))
                    }
                    Classification::FullyInside => Some((right.as_ref(), region.clone())),
                };
                (left_entry, right_entry)
            }
        }
    }

    /// Runs a fixed-radius point search from `center`, overwriting the radius-list result
    /// buffer read back via [`Tree::count`], [`Tree::copy_indices`], and [`Tree::copy_radii`].
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidArgument`] if `radius` is non-positive or `center.len() !=
    /// dim()`, and [`IndexError::Uninitialized`] if called before [`Tree::set_data`].
    pub fn search_center_radius<T: CoordElement>(
        &mut self,
        center: &[T],
        radius: f32,
    ) -> Result<(), IndexError> {
        if radius <= 0.0 {
            return Err(IndexError::invalid("radius must be positive"));
        }
        if center.len() != self.dim {
            return Err(IndexError::invalid(format!(
                "center has {} coordinates, expected {}",
                center.len(),
                self.dim
            )));
        }
        if self.root.is_none() {
            return Err(IndexError::Uninitialized);
        };
        info!(radius, "running point-radius search");

        let center_f32: Vec<f32> = center.iter().map(|c| c.to_coord_f32()).collect();
        let lo: Vec<f32> = center_f32.iter().map(|c| c - radius).collect();
        let hi: Vec<f32> = center_f32.iter().map(|c| c + radius).collect();
        let query_region = Region::from_bounds(lo, hi);

        let mut hits = Vec::new();
        let radius_sq = radius * radius;
        let root_region = Region::unbounded(self.dim);
        self.search_region(
            self.root.as_ref().unwrap(),
            root_region,
            0,
            &query_region,
            &center_f32,
            radius_sq,
            &mut hits,
        );
        self.radius_list = hits;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn search_region(
        &self,
        node: &Node,
        region: Region,
        depth: usize,
        query_region: &Region,
        center: &[f32],
        radius_sq: f32,
        out: &mut Vec<(i64, f32)>,
    ) {
        match node {
            Node::Leaf { range } => {
                for i in range.0..range.1 {
                    let point = self.store.point_at(i);
                    if query_region.encloses(point) {
                        let d = squared_distance(center, point);
                        if d <= radius_sq {
                            out.push((self.store.original_index_at(i), d.sqrt()));
                        }
                    }
                }
            }
            Node::Internal { .. } => {
                let d = depth % self.dim;
                let (left_entry, right_entry) = Self::split_entry(node, &region, d);
                if let Some((child, child_region)) = left_entry {
                    self.descend_or_report(child, child_region, depth, query_region, center, radius_sq, out);
                }
                if let Some((child, child_region)) = right_entry {
                    self.descend_or_report(child, child_region, depth, query_region, center, radius_sq, out);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn descend_or_report(
        &self,
        node: &Node,
        region: Region,
        depth: usize,
        query_region: &Region,
        center: &[f32],
        radius_sq: f32,
        out: &mut Vec<(i64, f32)>,
    ) {
        match region.intersect_with_margin(query_region, 0.0) {
            Intersection::Disjoint => {}
            Intersection::Contained => self.report_subtree(node, center, radius_sq, out),
            Intersection::Overlap => {
                self.search_region(node, region, depth + 1, query_region, center, radius_sq, out)
            }
        }
    }

    fn report_subtree(&self, node: &Node, center: &[f32], radius_sq: f32, out: &mut Vec<(i64, f32)>) {
        match node {
            Node::Leaf { range } => {
                for i in range.0..range.1 {
                    let point = self.store.point_at(i);
                    let d = squared_distance(center, point);
                    if d <= radius_sq {
                        out.push((self.store.original_index_at(i), d.sqrt()));
                    }
                }
            }
            Node::Internal { left, right, .. } => {
                self.report_subtree(left, center, radius_sq, out);
                self.report_subtree(right, center, radius_sq, out);
            }
        }
    }

    /// Number of hits from the last [`Tree::search_center_radius`] call.
    pub fn count(&self) -> usize {
        self.radius_list.len()
    }

    /// Number of hits from the last [`Tree::all_pairs`] / [`Tree::all_pairs_sweep`] call.
    pub fn neighbor_count(&self) -> usize {
        self.neighbor_list.len()
    }

    /// Copies the original indices of the last radius search into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidArgument`] if `out` is shorter than [`Tree::count`].
    pub fn copy_indices(&self, out: &mut [i64]) -> Result<(), IndexError> {
        if out.len() < self.radius_list.len() {
            return Err(IndexError::invalid("output buffer shorter than count()"));
        }
        for (slot, (idx, _)) in out.iter_mut().zip(self.radius_list.iter()) {
            *slot = *idx;
        }
        Ok(())
    }

    /// Copies the radii of the last radius search into `out`.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidArgument`] if `out` is shorter than [`Tree::count`].
    pub fn copy_radii(&self, out: &mut [f32]) -> Result<(), IndexError> {
        if out.len() < self.radius_list.len() {
            return Err(IndexError::invalid("output buffer shorter than count()"));
        }
        for (slot, (_, r)) in out.iter_mut().zip(self.radius_list.iter()) {
            *slot = *r;
        }
        Ok(())
    }

    /// The `(original_index, radius)` hits from the last radius search, in traversal order.
    pub fn radius_hits(&self) -> &[(i64, f32)] {
        &self.radius_list
    }

    /// The `(index1, index2, radius)` hits from the last pair search, in traversal order.
    pub fn neighbors(&self) -> &[(i64, i64, f32)] {
        &self.neighbor_list
    }

    pub(crate) fn neighbor_list_mut(&mut self) -> &mut Vec<(i64, i64, f32)> {
        &mut self.neighbor_list
    }

    /// The leaf bucket size this tree was initialized with.
    pub fn bucket_size(&self) -> usize {
        self.bucket_size
    }
}

pub(crate) fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(indices: &[(i64, f32)]) -> std::collections::BTreeSet<(i64, i64)> {
        indices
            .iter()
            .map(|(i, r)| (*i, (*r * 1_000_000.0).round() as i64))
            .collect()
    }

    #[test]
    fn test_init_rejects_zero_dim_or_bucket() {
        assert!(Tree::init(0, 4).is_err());
        assert!(Tree::init(3, 0).is_err());
    }

    #[test]
    fn test_build_then_query_uninitialized() {
        let mut tree = Tree::init(3, 4).unwrap();
        let err = tree.search_center_radius(&[0.0f32, 0.0, 0.0], 1.0).unwrap_err();
        assert!(matches!(err, IndexError::Uninitialized));
    }

    #[test]
    fn test_partition_invariant_after_build() {
        let mut tree = Tree::init(3, 2).unwrap();
        let pts: Vec<f32> = (0..20).flat_map(|i| [i as f32, 0.0, 0.0]).collect();
        tree.set_data(&pts).unwrap();

        fn collect_ranges(node: &Node, out: &mut Vec<(usize, usize)>) {
            match node {
                Node::Leaf { range } => out.push(*range),
                Node::Internal { left, right, .. } => {
                    collect_ranges(left, out);
                    collect_ranges(right, out);
                }
            }
        }
        let mut ranges = Vec::new();
        collect_ranges(tree.root.as_ref().unwrap(), &mut ranges);
        let mut cursor = 0;
        for (s, e) in ranges {
            assert_eq!(s, cursor);
            assert!(e > s);
            cursor = e;
        }
        assert_eq!(cursor, 20);
    }

    #[test]
    fn test_scenario_collinear_points_radius_search() {
        let mut tree = Tree::init(3, 1).unwrap();
        tree.set_data(&[0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0])
            .unwrap();
        tree.search_center_radius(&[1.5f32, 0.0, 0.0], 0.6).unwrap();
        let hits = set(tree.radius_hits());
        assert_eq!(hits, set(&[(1, 0.5), (2, 0.5)]));
    }
}
