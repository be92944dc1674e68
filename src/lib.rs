//! 3D convex hull computation via the Quickhull algorithm
//!
//! This library implements Quickhull as described in Barber, Dobkin, and
//! Huhdanpaa, "The Quickhull Algorithm for Convex Hulls" (ACM Transactions
//! on Mathematical Software, 22(4), 1996), over a half-edge mesh.
//!
//! Robustness against floating-point imprecision is handled the way qhull
//! handles it: faces whose shared edges are not clearly convex are merged,
//! so the emitted faces are convex polygons rather than triangles. All
//! convexity and containment decisions go through a single distance
//! tolerance derived from the coordinate magnitudes of the input.
//!
//! # Example
//! ```
//! use quickhull3d::QuickHull3D;
//!
//! let coords = [
//!     0.0, 0.0, 0.0, //
//!     1.0, 0.0, 0.0, //
//!     0.0, 1.0, 0.0, //
//!     0.0, 0.0, 1.0, //
//! ];
//!
//! let mut hull = QuickHull3D::new(&coords).unwrap();
//! hull.build_hull().unwrap();
//! assert_eq!(hull.get_faces().len(), 4);
//! ```

mod export;
mod mesh;
mod quickhull;
mod types;

// Make testdata publicly available for tests
pub mod testdata;

pub use export::export_obj;
pub use quickhull::QuickHull3D;
pub use types::{ConvexHull3D, Vec3};

/// Error types for convex hull operations
#[derive(Debug, thiserror::Error)]
pub enum ConvexHullError {
    #[error("Input coordinate count must be a multiple of 3, got {0}")]
    MalformedCoordinates(usize),

    #[error("Not enough vertices to form a hull (minimum 4 required)")]
    InsufficientVertices,

    #[error("Input points appear to be coincident")]
    CoincidentPoints,

    #[error("Input points appear to be colinear")]
    ColinearPoints,

    #[error("Input points appear to be coplanar")]
    CoplanarPoints,

    #[error("mesh topology violation: {0}")]
    Topology(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConvexHullError>;

/// Machine precision for IEEE 64-bit floating point.
///
/// The distance tolerance is derived from this and the coordinate
/// magnitudes of the input; see `QuickHull3D::distance_tolerance`.
pub(crate) const DOUBLE_PREC: f64 = f64::EPSILON;
