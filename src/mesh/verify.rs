//! Connectivity verification.
//!
//! [`Mesh::verify`] is an audit, not a precondition: it walks every vertex
//! and edge and collects each inconsistency it finds as a [`Diagnostic`].
//! An empty result means the half-edge graph is internally consistent and
//! every paired edge is consistently wound.

use std::fmt;

use super::edge::EdgeKind;
use super::halfedge::Mesh;
use super::index::{EdgeId, HalfEdgeId, MeshIndex, TriangleId, VertexId};

/// A single verification finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic<I: MeshIndex = u32> {
    /// An outgoing half-edge belongs to a triangle that does not use the vertex.
    ForeignTriangle {
        /// The vertex holding the half-edge.
        vertex: VertexId<I>,
        /// The half-edge.
        halfedge: HalfEdgeId<I>,
    },
    /// An outgoing half-edge does not start at the vertex holding it.
    WrongOrigin {
        /// The vertex holding the half-edge.
        vertex: VertexId<I>,
        /// The half-edge.
        halfedge: HalfEdgeId<I>,
    },
    /// Walking around the half-edge's triangle does not close after three steps.
    OpenTriangleCycle {
        /// The vertex holding the half-edge.
        vertex: VertexId<I>,
        /// The half-edge the walk started from.
        halfedge: HalfEdgeId<I>,
    },
    /// A paired half-edge is not the exact reverse of its partner.
    PairMismatch {
        /// The half-edge checked.
        halfedge: HalfEdgeId<I>,
        /// Its partner.
        pair: HalfEdgeId<I>,
    },
    /// A vertex has other than exactly one outgoing half-edge on an incident triangle.
    IllegalAttachment {
        /// The vertex.
        vertex: VertexId<I>,
        /// The triangle.
        triangle: TriangleId<I>,
        /// Number of outgoing half-edges of the vertex on the triangle.
        count: usize,
    },
    /// An edge shared by three or more triangles.
    OverdeterminedEdge {
        /// The edge.
        edge: EdgeId<I>,
        /// Number of half-edges on it.
        count: usize,
    },
}

impl<I: MeshIndex> fmt::Display for Diagnostic<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ForeignTriangle { vertex, halfedge } => write!(
                f,
                "{}: half-edge {} does not live on a triangle containing the vertex",
                vertex, halfedge
            ),
            Diagnostic::WrongOrigin { vertex, halfedge } => write!(
                f,
                "{}: half-edge {} is attached but starts elsewhere",
                vertex, halfedge
            ),
            Diagnostic::OpenTriangleCycle { vertex, halfedge } => write!(
                f,
                "{}: cannot walk around {} from half-edge {}",
                vertex,
                halfedge.triangle(),
                halfedge
            ),
            Diagnostic::PairMismatch { halfedge, pair } => write!(
                f,
                "{} H{}: paired half-edge {} does not run the opposite way",
                halfedge.triangle(),
                halfedge.index(),
                pair
            ),
            Diagnostic::IllegalAttachment {
                vertex,
                triangle,
                count,
            } => write!(
                f,
                "{}: {} outgoing half-edge(s) on incident triangle {}",
                vertex, count, triangle
            ),
            Diagnostic::OverdeterminedEdge { edge, count } => {
                write!(f, "{}: {} half-edges on one edge (non-manifold)", edge, count)
            }
        }
    }
}

impl<I: MeshIndex> Mesh<I> {
    /// Audit the mesh connectivity and return every violation found.
    pub fn verify(&self) -> Vec<Diagnostic<I>> {
        let mut diagnostics = Vec::new();
        for v in self.vertex_ids() {
            self.verify_vertex(v, &mut diagnostics);
        }
        for (e, edge) in self.edges() {
            if self.edge_kind(e) == EdgeKind::Overdetermined {
                diagnostics.push(Diagnostic::OverdeterminedEdge {
                    edge: e,
                    count: edge.len(),
                });
            }
        }
        diagnostics
    }

    fn verify_vertex(&self, v: VertexId<I>, diagnostics: &mut Vec<Diagnostic<I>>) {
        let vertex = self.vertex(v);

        for he in vertex.outgoing_halfedges() {
            let halfedge = self.halfedge(he);

            if !self.triangle(he.triangle()).contains(v) {
                diagnostics.push(Diagnostic::ForeignTriangle { vertex: v, halfedge: he });
            }
            if halfedge.a != v {
                diagnostics.push(Diagnostic::WrongOrigin { vertex: v, halfedge: he });
            }

            let closes = self
                .ccw_around_triangle(he)
                .ok()
                .flatten()
                .and_then(|h1| self.ccw_around_triangle(h1).ok().flatten())
                .is_some_and(|h2| self.halfedge(h2).b == halfedge.a);
            if !closes {
                diagnostics.push(Diagnostic::OpenTriangleCycle { vertex: v, halfedge: he });
            }

            // overdetermined edges are reported once per edge by `verify`
            if let Ok(Some(pair)) = self.paired_halfedge(he) {
                let partner = self.halfedge(pair);
                if partner.a != halfedge.b || partner.b != halfedge.a {
                    diagnostics.push(Diagnostic::PairMismatch { halfedge: he, pair });
                }
            }
        }

        for t in vertex.incident_triangles() {
            if !self.legal_attachment_to_triangle(v, t) {
                let count = vertex
                    .outgoing_halfedges()
                    .filter(|he| he.triangle() == t)
                    .count();
                diagnostics.push(Diagnostic::IllegalAttachment {
                    vertex: v,
                    triangle: t,
                    count,
                });
            }
        }
    }
}
