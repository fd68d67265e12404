//! Mesh operators.
//!
//! - **Laplacian**: combinatorial, inverse-squared-length and cotangent
//!   Laplacians assembled in COO form, per-vertex rows in parallel
//! - **Sparse**: CSR packing of assembled operators
//! - **Progress**: callbacks for long-running assembly

pub mod laplacian;
pub mod progress;
pub mod sparse;

pub use laplacian::{
    assemble_laplacian, assemble_laplacian_with_progress, LaplacianOptions, LaplacianWeights,
    SparseTriplets,
};
pub use progress::Progress;
pub use sparse::CsrMatrix;
