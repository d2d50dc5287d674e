//! ## All-pairs neighbor search (dual descent)
//!
//! Implements [`Tree::all_pairs`]: a double descent over the tree that enumerates every unordered
//! pair of points within a given radius exactly once, using the single-tree descent plus dual
//! descent scheme described in the crate's design notes. See [`crate::sweep`] for the
//! sorted-axis reference implementation used to cross-check this one in tests.

use crate::errors::IndexError;
use crate::region::{Intersection, Region};
use crate::tree::{squared_distance, Node, Tree};
use tracing::info;

impl Tree {
    /// Runs an all-pairs fixed-radius neighbor search, overwriting the neighbor-list result
    /// buffer read back via [`Tree::neighbor_count`] and [`Tree::neighbors`].
    ///
    /// Emits one entry per unordered pair `{i, j}` with `i != j` and `|coord_i - coord_j| <= r`;
    /// orientation of `(index1, index2)` within a pair is not guaranteed.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::InvalidArgument`] if `radius` is non-positive, and
    /// [`IndexError::Uninitialized`] if called before [`Tree::set_data`].
    pub fn all_pairs(&mut self, radius: f32) -> Result<(), IndexError> {
        if radius <= 0.0 {
            return Err(IndexError::invalid("radius must be positive"));
        }
        if self.root.is_none() {
            return Err(IndexError::Uninitialized);
        }
        info!(radius, "running all-pairs neighbor search");

        let dim = self.dim();
        let radius_sq = radius * radius;
        let mut pairs = Vec::new();
        let root = self.root.as_ref().unwrap();
        self.descend(root, Region::unbounded(dim), 0, radius, radius_sq, &mut pairs);
        *self.neighbor_list_mut() = pairs;
        Ok(())
    }

    /// Single-tree descent: recurses into a node's children, then dual-descends the two
    /// children against each other to enumerate cross pairs.
    fn descend(
        &self,
        node: &Node,
        region: Region,
        depth: usize,
        radius: f32,
        radius_sq: f32,
        out: &mut Vec<(i64, i64, f32)>,
    ) {
        match node {
            Node::Leaf { range } => self.within_bucket(*range, radius_sq, out),
            Node::Internal { .. } => {
                let d = depth % self.dim();
                let (left_entry, right_entry) = Tree::split_entry(node, &region, d);
                if let Some((child, child_region)) = left_entry.clone() {
                    self.descend(child, child_region, depth + 1, radius, radius_sq, out);
                }
                if let Some((child, child_region)) = right_entry.clone() {
                    self.descend(child, child_region, depth + 1, radius, radius_sq, out);
                }
                self.pair(left_entry, right_entry, depth + 1, radius, radius_sq, out);
            }
        }
    }

    /// Dual descent: enumerates cross pairs between two (possibly unrelated) subtrees `a` and
    /// `b`, pruning by region margin before splitting either side.
    fn pair(
        &self,
        a: Option<(&Node, Region)>,
        b: Option<(&Node, Region)>,
        depth: usize,
        radius: f32,
        radius_sq: f32,
        out: &mut Vec<(i64, i64, f32)>,
    ) {
        let (Some((a_node, a_region)), Some((b_node, b_region))) = (a, b) else {
            return;
        };
        if a_region.intersect_with_margin(&b_region, radius) == Intersection::Disjoint {
            return;
        }
        if a_node.is_leaf() && b_node.is_leaf() {
            self.between_buckets(a_node.leaf_range(), b_node.leaf_range(), radius_sq, out);
            return;
        }
        let d = depth % self.dim();
        let (a_left, a_right) = Tree::split_entry(a_node, &a_region, d);
        let (b_left, b_right) = Tree::split_entry(b_node, &b_region, d);
        self.pair(a_left.clone(), b_left.clone(), depth + 1, radius, radius_sq, out);
        self.pair(a_left, b_right.clone(), depth + 1, radius, radius_sq, out);
        self.pair(a_right.clone(), b_left, depth + 1, radius, radius_sq, out);
        self.pair(a_right, b_right, depth + 1, radius, radius_sq, out);
    }

    /// All qualifying pairs `(i, j)` with `s <= i < j < e` inside one leaf bucket.
    fn within_bucket(&self, range: (usize, usize), radius_sq: f32, out: &mut Vec<(i64, i64, f32)>) {
        let (s, e) = range;
        for i in s..e {
            let pi = self.store.point_at(i);
            for j in (i + 1)..e {
                let pj = self.store.point_at(j);
                let d = squared_distance(pi, pj);
                if d <= radius_sq {
                    out.push((
                        self.store.original_index_at(i),
                        self.store.original_index_at(j),
                        d.sqrt(),
                    ));
                }
            }
        }
    }

    /// All qualifying pairs between two disjoint leaf buckets (full Cartesian product).
    fn between_buckets(
        &self,
        a: (usize, usize),
        b: (usize, usize),
        radius_sq: f32,
        out: &mut Vec<(i64, i64, f32)>,
    ) {
        for i in a.0..a.1 {
            let pi = self.store.point_at(i);
            for j in b.0..b.1 {
                let pj = self.store.point_at(j);
                let d = squared_distance(pi, pj);
                if d <= radius_sq {
                    out.push((
                        self.store.original_index_at(i),
                        self.store.original_index_at(j),
                        d.sqrt(),
                    ));
                }
            }
        }
    }
}

impl Node {
    fn leaf_range(&self) -> (usize, usize) {
        match self {
            Node::Leaf { range } => *range,
            Node::Internal { .. } => unreachable!("leaf_range called on an internal node"),
        }
    }
}
