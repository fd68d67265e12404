//! Mesh file I/O.
//!
//! Meshes are read from plain triangle lists, see [`trilist`].
//!
//! ```no_run
//! use chiral::io::load;
//! use chiral::mesh::Mesh;
//!
//! let mesh: Mesh = load("model.tri").unwrap();
//! ```

pub mod trilist;

pub use trilist::{load, parse, TriangleList};
