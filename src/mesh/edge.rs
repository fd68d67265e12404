//! Undirected edges and their manifold classification.

use std::fmt;

use super::index::{HalfEdgeId, MeshIndex, VertexId};

/// Local manifold status of an edge, derived from its half-edges.
///
/// | half-edges | directions | kind |
/// |---|---|---|
/// | 1 | n/a | [`Boundary`](EdgeKind::Boundary) |
/// | 2 | opposite | [`Full`](EdgeKind::Full) |
/// | 2 | same start vertex | [`Flipped`](EdgeKind::Flipped) |
/// | 3+ | n/a | [`Overdetermined`](EdgeKind::Overdetermined) |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// A single half-edge on the mesh boundary.
    Boundary,
    /// Two consistently wound triangles.
    Full,
    /// Two triangles whose windings disagree.
    Flipped,
    /// Three or more triangles: non-manifold.
    Overdetermined,
}

impl EdgeKind {
    /// Classify an edge from the start vertices of its half-edges.
    pub fn classify<V: PartialEq>(starts: impl IntoIterator<Item = V>) -> EdgeKind {
        let mut starts = starts.into_iter();
        let first = starts.next();
        let second = starts.next();
        let rest = starts.count();
        match (first, second, rest) {
            (Some(_), None, _) => EdgeKind::Boundary,
            (Some(s0), Some(s1), 0) if s0 == s1 => EdgeKind::Flipped,
            (Some(_), Some(_), 0) => EdgeKind::Full,
            (Some(_), Some(_), _) => EdgeKind::Overdetermined,
            // edges are created together with their first half-edge
            (None, _, _) => EdgeKind::Boundary,
        }
    }

    /// Whether the edge joins exactly two triangles (full or flipped).
    pub fn is_paired(self) -> bool {
        matches!(self, EdgeKind::Full | EdgeKind::Flipped)
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeKind::Boundary => "boundary",
            EdgeKind::Full => "full",
            EdgeKind::Flipped => "flipped",
            EdgeKind::Overdetermined => "overdetermined",
        };
        f.write_str(name)
    }
}

/// An undirected edge `{a, b}` and the half-edges attached to it.
#[derive(Debug, Clone)]
pub struct Edge<I: MeshIndex = u32> {
    vertices: [VertexId<I>; 2],
    halfedges: Vec<HalfEdgeId<I>>,
}

impl<I: MeshIndex> Edge<I> {
    pub(crate) fn new(a: VertexId<I>, b: VertexId<I>) -> Self {
        Self {
            vertices: [a, b],
            halfedges: Vec::with_capacity(2),
        }
    }

    /// Order-independent lookup key for the pair `{a, b}`.
    #[inline]
    pub(crate) fn key(a: VertexId<I>, b: VertexId<I>) -> (VertexId<I>, VertexId<I>) {
        if a <= b {
            (a, b)
        } else {
            (b, a)
        }
    }

    /// The two endpoints, smaller index first.
    #[inline]
    pub fn vertices(&self) -> [VertexId<I>; 2] {
        self.vertices
    }

    /// Whether `v` is an endpoint of this edge.
    #[inline]
    pub fn includes_vertex(&self, v: VertexId<I>) -> bool {
        self.vertices.contains(&v)
    }

    /// Half-edges attached to this edge, in insertion order.
    #[inline]
    pub fn halfedges(&self) -> &[HalfEdgeId<I>] {
        &self.halfedges
    }

    /// Number of attached half-edges.
    #[inline]
    pub fn len(&self) -> usize {
        self.halfedges.len()
    }

    /// True if no half-edge is attached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.halfedges.is_empty()
    }

    /// The other half-edge on a two-sided edge.
    pub(crate) fn other(&self, he: HalfEdgeId<I>) -> Option<HalfEdgeId<I>> {
        match self.halfedges.as_slice() {
            [x, y] if *x == he => Some(*y),
            [x, y] if *y == he => Some(*x),
            _ => None,
        }
    }

    pub(crate) fn attach(&mut self, he: HalfEdgeId<I>) {
        debug_assert!(!self.halfedges.contains(&he));
        self.halfedges.push(he);
    }

    pub(crate) fn replace(&mut self, old: HalfEdgeId<I>, new: HalfEdgeId<I>) {
        if let Some(slot) = self.halfedges.iter_mut().find(|h| **h == old) {
            *slot = new;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(EdgeKind::classify([1]), EdgeKind::Boundary);
        assert_eq!(EdgeKind::classify([1, 2]), EdgeKind::Full);
        assert_eq!(EdgeKind::classify([1, 1]), EdgeKind::Flipped);
        assert_eq!(EdgeKind::classify([1, 2, 1]), EdgeKind::Overdetermined);
        assert_eq!(EdgeKind::classify([1, 2, 1, 2]), EdgeKind::Overdetermined);
        assert!(EdgeKind::Flipped.is_paired());
        assert!(!EdgeKind::Overdetermined.is_paired());
    }

    #[test]
    fn test_edge_membership() {
        let a: VertexId = VertexId::new(3);
        let b: VertexId = VertexId::new(1);
        let (lo, hi) = Edge::<u32>::key(a, b);
        let mut edge = Edge::new(lo, hi);
        assert_eq!(edge.vertices(), [b, a]);
        assert!(edge.includes_vertex(a));
        assert!(!edge.includes_vertex(VertexId::new(0)));

        let h0 = HalfEdgeId::new(0);
        let h4 = HalfEdgeId::new(4);
        edge.attach(h0);
        assert_eq!(edge.other(h0), None);
        edge.attach(h4);
        assert_eq!(edge.other(h0), Some(h4));
        assert_eq!(edge.other(h4), Some(h0));

        edge.replace(h4, HalfEdgeId::new(5));
        assert_eq!(edge.halfedges(), &[h0, HalfEdgeId::new(5)]);
    }

    #[test]
    fn test_display() {
        assert_eq!(EdgeKind::Overdetermined.to_string(), "overdetermined");
    }
}
