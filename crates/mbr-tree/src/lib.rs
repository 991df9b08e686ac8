//! A mutable R-tree over n-dimensional bounding boxes.
//!
//! The tree answers "which indexed boxes intersect this box" and stays balanced under
//! arbitrary insertions and deletions. Geometric costs are delegated to a pluggable
//! [`Calculator`], and seed selection on split to a [`SplitPolicy`].
//!
//! ```
//! use mbr_tree::{Calculator2D, Entry, Envelope, Space, SplitPolicy, Tree};
//!
//! let mut tree = Tree::new(8, Space::cartesian(2), Calculator2D, SplitPolicy::Quadratic)?;
//! tree.insert(Envelope::new([0., 0.], [1., 1.])?, "a")?;
//! tree.insert(Envelope::new([5., 5.], [6., 6.])?, "b")?;
//!
//! let mut hits: Vec<&Entry<&str>> = Vec::new();
//! tree.search(&Envelope::new([0.5, 0.5], [2., 2.])?, &mut hits)?;
//! assert_eq!(hits.len(), 1);
//! assert_eq!(*hits[0].data(), "a");
//!
//! assert!(tree.delete(&Envelope::new([0., 0.], [1., 1.])?, &"a")?);
//! # Ok::<(), mbr_tree::Error>(())
//! ```

pub mod calc;
pub mod error;
pub mod primitive;
pub mod rtree;

// Reexport necessary items.
pub use calc::{Calculator, Calculator2D, Calculator3D, EuclideanCalculator};
pub use error::{Error, Result};
pub use primitive::{AxisIndex, Envelope, Space};
pub use rtree::{Entry, Iter, SplitPolicy, Tree, TreeParameter};
