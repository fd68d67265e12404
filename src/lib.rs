//! # Chiral
//!
//! A half-edge topology engine for triangle meshes with on-the-fly winding
//! repair and per-vertex Laplacian operators.
//!
//! Chiral builds a half-edge structure from a bare triangle list. No vertex
//! positions are needed: everything it knows comes from which vertices the
//! triangles share.
//!
//! ## Features
//!
//! - **Half-edge arena**: dense type-safe indices, 16, 32 or 64 bits wide
//! - **Chirality repair**: a triangle inserted against its neighbours' winding
//!   is flipped together with the region it is connected to
//! - **Edge classification**: boundary, full, flipped and overdetermined
//!   (non-manifold) edges
//! - **Verification**: topological invariants reported as diagnostics
//! - **Laplacians**: combinatorial, inverse-squared-length and cotangent, in
//!   sparse coordinate form, assembled in parallel
//!
//! ## Quick Start
//!
//! ```no_run
//! use chiral::prelude::*;
//!
//! let mesh: Mesh = chiral::io::load("model.tri").unwrap();
//!
//! println!("Vertices: {}", mesh.n_vertices());
//! println!("Triangles: {}", mesh.n_triangles());
//! println!("Repairs: {}", mesh.chirality_repairs().len());
//!
//! for problem in mesh.verify() {
//!     println!("{}", problem);
//! }
//! ```
//!
//! ## Building Meshes Programmatically
//!
//! ```
//! use chiral::prelude::*;
//!
//! // a tetrahedron with one face wound the wrong way
//! let faces = vec![
//!     [0, 2, 1],
//!     [0, 1, 3],
//!     [1, 2, 3],
//!     [0, 2, 3],
//! ];
//!
//! let mesh: Mesh = Mesh::from_triangles(&faces, 4).unwrap();
//! assert_eq!(mesh.n_fulledges(), 6);
//! assert_eq!(mesh.n_boundary_halfedges(), 0);
//! assert_eq!(mesh.trilist()[3], [2, 0, 3]);
//! ```
//!
//! ## Laplacians
//!
//! ```
//! use chiral::prelude::*;
//!
//! let mesh: Mesh = Mesh::build(&[0, 1, 2, 0, 2, 3], 4).unwrap();
//!
//! let graph = assemble_laplacian(&mesh, &LaplacianOptions::default()).unwrap();
//! assert_eq!(graph.diagonal(), &[3.0, 2.0, 3.0, 2.0]);
//!
//! // cotangents are indexed 3 * triangle + slot
//! let cot = [1.0, 0.0, 1.0, 1.0, 1.0, 0.0];
//! let options = LaplacianOptions::default().with_cotangents(&cot);
//! let cotangent = assemble_laplacian(&mesh, &options).unwrap().to_csr();
//! assert!(cotangent.is_symmetric(1e-12));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod io;
pub mod mesh;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use chiral::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::{assemble_laplacian, LaplacianOptions, LaplacianWeights};
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::{
        Diagnostic, EdgeId, EdgeKind, HalfEdgeId, Mesh, MeshIndex, TriangleId, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;
