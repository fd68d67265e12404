//! Vertex records and vertex-centred lookups.

use std::collections::BTreeSet;
use std::fmt::Write;

use super::halfedge::Mesh;
use super::index::{HalfEdgeId, MeshIndex, TriangleId, VertexId};
use crate::error::{MeshError, Result};

/// A vertex in the mesh.
///
/// A vertex owns nothing: it records which half-edges start at it, which
/// triangles touch it, and which vertices share an edge with it. The sets are
/// ordered so traversal (and Laplacian row layout) is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Vertex<I: MeshIndex = u32> {
    outgoing: BTreeSet<HalfEdgeId<I>>,
    triangles: BTreeSet<TriangleId<I>>,
    neighbors: BTreeSet<VertexId<I>>,
}

impl<I: MeshIndex> Vertex<I> {
    pub(crate) fn new() -> Self {
        Self {
            outgoing: BTreeSet::new(),
            triangles: BTreeSet::new(),
            neighbors: BTreeSet::new(),
        }
    }

    /// Half-edges starting at this vertex.
    pub fn outgoing_halfedges(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        self.outgoing.iter().copied()
    }

    /// Triangles that use this vertex.
    pub fn incident_triangles(&self) -> impl Iterator<Item = TriangleId<I>> + '_ {
        self.triangles.iter().copied()
    }

    /// Vertices sharing an edge with this one.
    pub fn adjacent_vertices(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        self.neighbors.iter().copied()
    }

    /// Number of adjacent vertices.
    #[inline]
    pub fn degree(&self) -> usize {
        self.neighbors.len()
    }

    /// True if no triangle references this vertex.
    #[inline]
    pub fn is_isolated(&self) -> bool {
        self.triangles.is_empty()
    }

    pub(crate) fn add_outgoing_halfedge(&mut self, he: HalfEdgeId<I>) {
        self.outgoing.insert(he);
    }

    pub(crate) fn remove_outgoing_halfedge(&mut self, he: HalfEdgeId<I>) {
        self.outgoing.remove(&he);
    }

    pub(crate) fn add_incident_triangle(&mut self, t: TriangleId<I>) {
        self.triangles.insert(t);
    }

    pub(crate) fn add_adjacent_vertex(&mut self, v: VertexId<I>) {
        self.neighbors.insert(v);
    }

    /// Outgoing half-edges that belong to triangle `t`.
    fn outgoing_on(&self, t: TriangleId<I>) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        let [first, _, last] = t.halfedges();
        self.outgoing.range(first..=last).copied()
    }
}

impl<I: MeshIndex> Mesh<I> {
    /// The unique half-edge leaving `v` on triangle `t`.
    ///
    /// Returns `Ok(None)` if `v` is not a corner of `t`. More than one such
    /// half-edge means the mesh is corrupt and is reported as
    /// [`MeshError::MultipleAttachment`].
    pub fn halfedge_on_triangle(
        &self,
        v: VertexId<I>,
        t: TriangleId<I>,
    ) -> Result<Option<HalfEdgeId<I>>> {
        let mut found = self.vertex(v).outgoing_on(t);
        let first = found.next();
        let extra = found.count();
        if extra > 0 {
            return Err(MeshError::MultipleAttachment {
                vertex: v.index(),
                triangle: t.index(),
                count: extra + 1,
            });
        }
        Ok(first)
    }

    /// True iff `v` has exactly one outgoing half-edge on `t`.
    pub fn legal_attachment_to_triangle(&self, v: VertexId<I>, t: TriangleId<I>) -> bool {
        self.vertex(v).outgoing_on(t).count() == 1
    }

    /// An outgoing half-edge of `v` ending at `w`.
    pub fn halfedge_to(&self, v: VertexId<I>, w: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.vertex(v)
            .outgoing_halfedges()
            .find(|&he| self.halfedge(he).b == w)
    }

    /// A half-edge running `v -> w`, or failing that `w -> v`.
    pub fn halfedge_to_or_from(&self, v: VertexId<I>, w: VertexId<I>) -> Option<HalfEdgeId<I>> {
        self.halfedge_to(v, w).or_else(|| self.halfedge_to(w, v))
    }

    /// Vertices with no incident triangle.
    pub fn unreferenced_vertices(&self) -> Vec<VertexId<I>> {
        self.vertex_ids()
            .filter(|&v| self.vertex(v).is_isolated())
            .collect()
    }

    /// True if every vertex can be reached from vertex 0 over mesh edges.
    ///
    /// An empty mesh is trivially contiguous.
    pub fn is_contiguous(&self) -> bool {
        if self.vertices.is_empty() {
            return true;
        }
        let mut visited = vec![false; self.n_vertices()];
        let mut stack = vec![VertexId::<I>::new(0)];
        visited[0] = true;
        let mut reached = 1;
        while let Some(v) = stack.pop() {
            for w in self.vertex(v).adjacent_vertices() {
                if !visited[w.index()] {
                    visited[w.index()] = true;
                    reached += 1;
                    stack.push(w);
                }
            }
        }
        reached == self.n_vertices()
    }

    /// Human-readable summary of a vertex's outgoing half-edges.
    ///
    /// One line per half-edge: `=` marks a paired edge, `-` an unpaired one,
    /// followed by the end vertex and the triangle(s) involved.
    pub fn vertex_status(&self, v: VertexId<I>) -> String {
        let mut out = format!("{}\n", v);
        for he in self.vertex(v).outgoing_halfedges() {
            let halfedge = self.halfedge(he);
            let pair = self.pair_of(he);
            let link = if pair.is_some() { '=' } else { '-' };
            let _ = write!(out, "|{}{} ({}", link, halfedge.b, he.triangle());
            if let Some(p) = pair {
                let _ = write!(out, "={}", p.triangle());
            }
            out.push_str(")\n");
        }
        out
    }
}
