//! Half-edge records and the mesh arena that owns them.
//!
//! # Structure
//!
//! - Every triangle owns three **half-edges** stored at indices
//!   `3 * t`, `3 * t + 1` and `3 * t + 2`
//! - Each half-edge runs `a -> b`, remembers the triangle vertex opposite it,
//!   and points at the undirected [`Edge`] it is attached to
//! - The **pair** of a half-edge is not stored: it is the other half-edge on
//!   the same edge, derived on demand from the edge's membership
//! - Vertices keep sets of their outgoing half-edges, incident triangles and
//!   adjacent vertices
//!
//! All cross references are arena indices, so the cyclic vertex/triangle/edge
//! graph never needs shared ownership.

use std::collections::HashMap;

use log::warn;

use super::edge::{Edge, EdgeKind};
use super::index::{EdgeId, HalfEdgeId, MeshIndex, TriangleId, VertexId};
use super::triangle::{RepairRecord, Triangle};
use super::vertex::Vertex;
use crate::error::{MeshError, Result};

/// A directed half-edge `a -> b` on one triangle.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// Start vertex.
    pub(crate) a: VertexId<I>,

    /// End vertex.
    pub(crate) b: VertexId<I>,

    /// The triangle vertex not on this half-edge.
    pub(crate) opposite: VertexId<I>,

    /// The undirected edge this half-edge is attached to.
    pub(crate) edge: EdgeId<I>,

    /// Set while chirality repair has cut this half-edge's pairing link.
    pub(crate) detached: bool,
}

impl<I: MeshIndex> HalfEdge<I> {
    pub(crate) fn new(a: VertexId<I>, b: VertexId<I>, opposite: VertexId<I>, edge: EdgeId<I>) -> Self {
        Self {
            a,
            b,
            opposite,
            edge,
            detached: false,
        }
    }

    /// Start vertex.
    #[inline]
    pub fn a(&self) -> VertexId<I> {
        self.a
    }

    /// End vertex.
    #[inline]
    pub fn b(&self) -> VertexId<I> {
        self.b
    }

    /// The vertex of the owning triangle opposite this half-edge.
    #[inline]
    pub fn opposite_vertex(&self) -> VertexId<I> {
        self.opposite
    }

    /// The undirected edge this half-edge belongs to.
    #[inline]
    pub fn edge(&self) -> EdgeId<I> {
        self.edge
    }

    /// Reverse the stored direction.
    #[inline]
    pub(crate) fn reverse(&mut self) {
        std::mem::swap(&mut self.a, &mut self.b);
    }
}

/// A triangle mesh with half-edge connectivity and chirality repair.
///
/// Built once from a triangle list (see [`Mesh::build`]); there is no
/// deletion API. Triangles whose winding disagrees with an already inserted
/// neighbour are repaired during construction by flipping the contiguous
/// region they belong to.
#[derive(Debug, Clone)]
pub struct Mesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) triangles: Vec<Triangle<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    pub(crate) edges: Vec<Edge<I>>,

    /// Undirected edge lookup keyed by `(min, max)` vertex pair.
    pub(crate) edge_lookup: HashMap<(VertexId<I>, VertexId<I>), EdgeId<I>>,

    /// Number of edges that gained a second half-edge during construction.
    pub(crate) n_fulledges: usize,

    /// One entry per chirality repair performed during construction.
    pub(crate) repairs: Vec<RepairRecord<I>>,
}

impl<I: MeshIndex> Mesh<I> {
    /// Create an empty mesh with `n_vertices` isolated vertices and room for
    /// `n_triangles` triangles.
    pub(crate) fn with_vertices(n_vertices: usize, n_triangles: usize) -> Self {
        Self {
            vertices: (0..n_vertices).map(|_| Vertex::new()).collect(),
            triangles: Vec::with_capacity(n_triangles),
            halfedges: Vec::with_capacity(3 * n_triangles),
            // closed meshes have 3F/2 edges, open ones slightly more
            edges: Vec::with_capacity(3 * n_triangles / 2 + 1),
            edge_lookup: HashMap::with_capacity(3 * n_triangles / 2 + 1),
            n_fulledges: 0,
            repairs: Vec::new(),
        }
    }

    // ==================== Counters ====================

    /// Number of vertices.
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[inline]
    pub fn n_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of half-edges (always three per triangle).
    #[inline]
    pub fn n_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of undirected edges.
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of pairing events: edges that received a second half-edge.
    #[inline]
    pub fn n_fulledges(&self) -> usize {
        self.n_fulledges
    }

    /// Number of half-edges sitting alone on a boundary edge.
    pub fn n_boundary_halfedges(&self) -> usize {
        self.edges.iter().filter(|e| e.len() == 1).count()
    }

    /// Chirality repairs performed while building this mesh, in order.
    pub fn chirality_repairs(&self) -> &[RepairRecord<I>] {
        &self.repairs
    }

    // ==================== Accessors ====================

    /// Get a vertex by ID.
    #[inline]
    pub fn vertex(&self, id: VertexId<I>) -> &Vertex<I> {
        &self.vertices[id.index()]
    }

    #[inline]
    pub(crate) fn vertex_mut(&mut self, id: VertexId<I>) -> &mut Vertex<I> {
        &mut self.vertices[id.index()]
    }

    /// Get a half-edge by ID.
    #[inline]
    pub fn halfedge(&self, id: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[id.index()]
    }

    /// Get a triangle by ID.
    #[inline]
    pub fn triangle(&self, id: TriangleId<I>) -> &Triangle<I> {
        &self.triangles[id.index()]
    }

    /// Get an edge by ID.
    #[inline]
    pub fn edge(&self, id: EdgeId<I>) -> &Edge<I> {
        &self.edges[id.index()]
    }

    /// The undirected edge joining `a` and `b`, if any.
    pub fn edge_between(&self, a: VertexId<I>, b: VertexId<I>) -> Option<EdgeId<I>> {
        self.edge_lookup.get(&Edge::<I>::key(a, b)).copied()
    }

    // ==================== Iteration ====================

    /// Iterate over all vertex IDs.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all triangle IDs.
    pub fn triangle_ids(&self) -> impl Iterator<Item = TriangleId<I>> + '_ {
        (0..self.triangles.len()).map(TriangleId::new)
    }

    /// Iterate over all half-edge IDs.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all edges with their IDs.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeId<I>, &Edge<I>)> + '_ {
        self.edges
            .iter()
            .enumerate()
            .map(|(i, e)| (EdgeId::new(i), e))
    }

    // ==================== Pairing ====================

    /// The half-edge paired with `he`, ignoring overdetermined edges.
    ///
    /// Returns `None` for boundary and overdetermined edges and while either
    /// side is detached by chirality repair.
    pub(crate) fn pair_of(&self, he: HalfEdgeId<I>) -> Option<HalfEdgeId<I>> {
        let halfedge = self.halfedge(he);
        if halfedge.detached {
            return None;
        }
        let edge = self.edge(halfedge.edge);
        if edge.len() != 2 {
            return None;
        }
        let other = edge.other(he)?;
        if self.halfedge(other).detached {
            None
        } else {
            Some(other)
        }
    }

    /// The half-edge sharing `he`'s edge.
    ///
    /// Defined for full and flipped edges. Boundary edges have no pair;
    /// overdetermined edges fail with [`MeshError::AmbiguousPairing`] rather
    /// than picking an arbitrary partner.
    pub fn paired_halfedge(&self, he: HalfEdgeId<I>) -> Result<Option<HalfEdgeId<I>>> {
        let edge_id = self.halfedge(he).edge;
        let edge = self.edge(edge_id);
        if edge.len() >= 3 {
            return Err(MeshError::AmbiguousPairing {
                edge: edge_id.index(),
                count: edge.len(),
            });
        }
        Ok(self.pair_of(he))
    }

    /// Whether `he` currently has a partner on its edge.
    pub fn part_of_fulledge(&self, he: HalfEdgeId<I>) -> bool {
        self.pair_of(he).is_some()
    }

    /// The triangle across `he`'s edge, if the edge is paired.
    pub fn paired_triangle(&self, he: HalfEdgeId<I>) -> Result<Option<TriangleId<I>>> {
        Ok(self.paired_halfedge(he)?.map(HalfEdgeId::triangle))
    }

    // ==================== Traversal ====================

    /// The next half-edge counter-clockwise around `he`'s triangle, found by
    /// asking `he`'s end vertex for its half-edge on that triangle.
    ///
    /// This goes through vertex connectivity rather than index arithmetic, so
    /// it doubles as a consistency probe.
    pub fn ccw_around_triangle(&self, he: HalfEdgeId<I>) -> Result<Option<HalfEdgeId<I>>> {
        self.halfedge_on_triangle(self.halfedge(he).b, he.triangle())
    }

    // ==================== Construction ====================

    /// Create the half-edge `id = a -> b` and attach it to its edge and start
    /// vertex. The edge is created on first use.
    pub(crate) fn create_halfedge(
        &mut self,
        id: HalfEdgeId<I>,
        a: VertexId<I>,
        b: VertexId<I>,
        opposite: VertexId<I>,
    ) {
        debug_assert_eq!(id.index(), self.halfedges.len());

        let key = Edge::<I>::key(a, b);
        let edge_id = match self.edge_lookup.get(&key) {
            Some(&e) => e,
            None => {
                let e = EdgeId::new(self.edges.len());
                self.edges.push(Edge::new(key.0, key.1));
                self.edge_lookup.insert(key, e);
                e
            }
        };

        self.halfedges.push(HalfEdge::new(a, b, opposite, edge_id));

        let edge = &mut self.edges[edge_id.index()];
        edge.attach(id);
        match edge.len() {
            2 => self.n_fulledges += 1,
            3 => warn!(
                "edge {} ({}-{}) is overdetermined: third half-edge {} from triangle {}",
                edge_id,
                key.0,
                key.1,
                id,
                id.triangle()
            ),
            _ => {}
        }

        self.vertex_mut(a).add_outgoing_halfedge(id);
    }

    /// Reverse a half-edge and move it to its new start vertex.
    ///
    /// Only valid as part of flipping the whole owning triangle.
    pub(crate) fn flip(&mut self, he: HalfEdgeId<I>) {
        let HalfEdge { a, b, .. } = *self.halfedge(he);
        self.vertex_mut(a).remove_outgoing_halfedge(he);
        self.vertex_mut(b).add_outgoing_halfedge(he);
        self.halfedges[he.index()].reverse();
    }

    /// Exchange the storage of two half-edges of the same triangle, fixing
    /// every index that refers to them.
    pub(crate) fn swap_halfedge_ids(&mut self, x: HalfEdgeId<I>, y: HalfEdgeId<I>) {
        debug_assert_eq!(x.triangle(), y.triangle());
        let (ax, ay) = (self.halfedge(x).a, self.halfedge(y).a);
        self.vertex_mut(ax).remove_outgoing_halfedge(x);
        self.vertex_mut(ay).remove_outgoing_halfedge(y);

        self.halfedges.swap(x.index(), y.index());

        // storage at x now holds what was y, and vice versa
        let (ax, ex) = (self.halfedge(x).a, self.halfedge(x).edge);
        let (ay, ey) = (self.halfedge(y).a, self.halfedge(y).edge);
        self.vertex_mut(ax).add_outgoing_halfedge(x);
        self.vertex_mut(ay).add_outgoing_halfedge(y);
        self.edges[ex.index()].replace(y, x);
        self.edges[ey.index()].replace(x, y);
    }

    /// Classification of an edge (see [`EdgeKind`]).
    pub fn edge_kind(&self, e: EdgeId<I>) -> EdgeKind {
        let edge = self.edge(e);
        EdgeKind::classify(edge.halfedges().iter().map(|&he| self.halfedge(he).a))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Mesh {
        Mesh::from_triangles(&[[0, 1, 2], [0, 2, 3]], 4).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = Mesh::<u32>::with_vertices(0, 0);
        assert_eq!(mesh.n_vertices(), 0);
        assert_eq!(mesh.n_halfedges(), 0);
        assert_eq!(mesh.n_triangles(), 0);
        assert_eq!(mesh.n_edges(), 0);
    }

    #[test]
    fn test_halfedge_fields() {
        let mesh = square();
        // slot 1 of triangle 1 runs 2 -> 3 with 0 opposite
        let he = mesh.halfedge(HalfEdgeId::new(4));
        assert_eq!(he.a(), VertexId::new(2));
        assert_eq!(he.b(), VertexId::new(3));
        assert_eq!(he.opposite_vertex(), VertexId::new(0));
    }

    #[test]
    fn test_pairing_on_diagonal() {
        let mesh = square();
        let diagonal = mesh
            .edge_between(VertexId::new(2), VertexId::new(0))
            .unwrap();
        assert_eq!(mesh.edge_kind(diagonal), EdgeKind::Full);

        // he1 of T0 runs 1 -> 2, he2 of T0 runs 2 -> 0, he0 of T1 runs 0 -> 2
        let h = HalfEdgeId::new(2);
        let pair = mesh.paired_halfedge(h).unwrap().unwrap();
        assert_eq!(pair, HalfEdgeId::new(3));
        assert_eq!(mesh.paired_halfedge(pair).unwrap(), Some(h));
        assert_eq!(mesh.paired_triangle(h).unwrap(), Some(TriangleId::new(1)));

        assert!(!mesh.part_of_fulledge(HalfEdgeId::new(0)));
        assert_eq!(mesh.paired_halfedge(HalfEdgeId::new(0)).unwrap(), None);
    }

    #[test]
    fn test_ccw_three_times_is_identity() {
        let mesh = square();
        for he in mesh.halfedge_ids() {
            let h1 = mesh.ccw_around_triangle(he).unwrap().unwrap();
            let h2 = mesh.ccw_around_triangle(h1).unwrap().unwrap();
            let h3 = mesh.ccw_around_triangle(h2).unwrap().unwrap();
            assert_eq!(h1, he.next_in_triangle());
            assert_eq!(h3, he);
        }
    }

    #[test]
    fn test_counters() {
        let mesh = square();
        assert_eq!(mesh.n_edges(), 5);
        assert_eq!(mesh.n_halfedges(), 6);
        assert_eq!(mesh.n_fulledges(), 1);
        assert_eq!(mesh.n_boundary_halfedges(), 4);
    }
}
