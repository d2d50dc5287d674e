//! Static k-d tree spatial index over N points in k-dimensional Euclidean space.
//!
//! Supports three queries: fixed-radius search from a point ([`tree::Tree::search_center_radius`]),
//! all-pairs fixed-radius neighbor search ([`tree::Tree::all_pairs`]), and a sorted-axis sweep
//! used both as a correctness oracle and as a fast path for small or near-collinear point sets
//! ([`tree::Tree::all_pairs_sweep`]).
//!
//! ### Example
//!
//! ```
//! use spatial_kd::Tree;
//!
//! let mut tree = Tree::init(3, 8).unwrap();
//! tree.set_data(&[0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0]).unwrap();
//! tree.all_pairs(1.5).unwrap();
//! assert_eq!(tree.neighbor_count(), 2);
//! ```

pub mod errors;
mod pair_finder;
mod point_store;
mod region;
mod sweep;
pub mod tree;

#[cfg(feature = "setup_tracing")]
mod logging;

pub use errors::IndexError;
pub use point_store::CoordElement;
pub use tree::Tree;
