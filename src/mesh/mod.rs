//! Core mesh data structures.
//!
//! This module provides the half-edge representation of a triangle mesh
//! together with its construction, chirality repair and verification.
//!
//! # Overview
//!
//! The primary type is [`Mesh`], an arena owning every [`Vertex`],
//! [`Triangle`], [`HalfEdge`] and [`Edge`]. Entities refer to each other
//! through type-safe indices ([`VertexId`], [`TriangleId`], [`HalfEdgeId`],
//! [`EdgeId`]), generic over the integer width ([`MeshIndex`]).
//!
//! # Construction
//!
//! ```
//! use chiral::mesh::{EdgeKind, Mesh, VertexId};
//!
//! // the second triangle is wound against the first and gets repaired
//! let mesh: Mesh = Mesh::from_triangles(&[[0, 1, 2], [0, 1, 3]], 4).unwrap();
//! assert_eq!(mesh.chirality_repairs().len(), 1);
//!
//! let shared = mesh.edge_between(VertexId::new(0), VertexId::new(1)).unwrap();
//! assert_eq!(mesh.edge_kind(shared), EdgeKind::Full);
//! assert!(mesh.verify().is_empty());
//! ```

mod builder;
mod edge;
mod halfedge;
mod index;
mod triangle;
mod verify;
mod vertex;

pub use edge::{Edge, EdgeKind};
pub use halfedge::{HalfEdge, Mesh};
pub use index::{EdgeId, HalfEdgeId, MeshIndex, TriangleId, VertexId};
pub use triangle::{RepairRecord, Triangle};
pub use verify::Diagnostic;
pub use vertex::Vertex;
