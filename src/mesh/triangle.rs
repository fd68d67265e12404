//! Triangles: half-edge creation and chirality repair.
//!
//! Inserting a triangle whose winding disagrees with an already inserted
//! neighbour produces a *flipped* edge, two half-edges running the same way.
//! The triangle detects this before creating its half-edges and repairs it
//! straight away by flipping every triangle it is connected to through
//! consistently paired edges, so the region it belongs to adopts the
//! neighbour's winding.

use std::fmt::Write;

use log::debug;

use super::halfedge::Mesh;
use super::index::{EdgeId, HalfEdgeId, MeshIndex, TriangleId, VertexId};
use crate::error::{MeshError, Result};

/// A triangle `(v0, v1, v2)` wound counter-clockwise.
///
/// Its half-edges are implicit: slot `k` holds `v_k -> v_(k+1)` at index
/// `3 * id + k`.
#[derive(Debug, Clone, Copy)]
pub struct Triangle<I: MeshIndex = u32> {
    pub(crate) vertices: [VertexId<I>; 3],
}

impl<I: MeshIndex> Triangle<I> {
    /// The three corners in winding order.
    #[inline]
    pub fn vertices(&self) -> [VertexId<I>; 3] {
        self.vertices
    }

    /// Whether `v` is a corner of this triangle.
    #[inline]
    pub fn contains(&self, v: VertexId<I>) -> bool {
        self.vertices.contains(&v)
    }
}

/// What a single chirality repair did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairRecord<I: MeshIndex = u32> {
    /// The triangle whose insertion triggered the repair.
    pub triangle: TriangleId<I>,
    /// Edges on which a same-direction collision was detected.
    pub conflicts: Vec<EdgeId<I>>,
    /// Number of triangles flipped, including the trigger.
    pub flipped: usize,
}

impl<I: MeshIndex> std::fmt::Display for RepairRecord<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} flipped {} triangle(s), conflicts on", self.triangle, self.flipped)?;
        for e in &self.conflicts {
            write!(f, " {}", e)?;
        }
        Ok(())
    }
}

impl<I: MeshIndex> Mesh<I> {
    /// Insert triangle `(v0, v1, v2)`, repairing its chirality if needed.
    pub(crate) fn add_triangle(&mut self, vertices: [VertexId<I>; 3]) -> TriangleId<I> {
        let t = TriangleId::new(self.triangles.len());

        // every collision must be found before any half-edge exists, since
        // creating he0 changes the vertex state the he1 test looks at
        let bad: [bool; 3] =
            std::array::from_fn(|k| self.halfedge_to(vertices[k], vertices[(k + 1) % 3]).is_some());

        self.triangles.push(Triangle { vertices });
        for k in 0..3 {
            let (v, next, prev) = (vertices[k], vertices[(k + 1) % 3], vertices[(k + 2) % 3]);
            let vertex = self.vertex_mut(v);
            vertex.add_incident_triangle(t);
            vertex.add_adjacent_vertex(next);
            vertex.add_adjacent_vertex(prev);
        }

        for k in 0..3 {
            self.create_halfedge(
                HalfEdgeId::on_triangle(t, k),
                vertices[k],
                vertices[(k + 1) % 3],
                vertices[(k + 2) % 3],
            );
        }

        if bad.iter().any(|&b| b) {
            self.resolve_chirality(t, bad);
        }
        t
    }

    /// Flip the region containing `t` so it agrees with the neighbours across
    /// the edges marked in `bad`.
    fn resolve_chirality(&mut self, t: TriangleId<I>, bad: [bool; 3]) {
        let halfedges = t.halfedges();

        // detach the conflicting half-edges so the flood fill cannot cross
        // into the region we are aligning with
        let mut detached = Vec::with_capacity(3);
        for (k, &he) in halfedges.iter().enumerate() {
            if bad[k] {
                self.halfedges[he.index()].detached = true;
                detached.push(self.halfedge(he).edge);
            }
        }

        let flipped = self.flip_contiguous_region(t);

        // the detached flags travelled with their half-edges when slots were
        // renumbered, so clearing all three restores exactly the detached ones
        for he in t.halfedges() {
            self.halfedges[he.index()].detached = false;
        }

        debug!(
            "resolved chirality at {}: conflicts on {:?}, flipped {} triangle(s)",
            t, detached, flipped
        );
        self.repairs.push(RepairRecord {
            triangle: t,
            conflicts: detached,
            flipped,
        });
    }

    /// Flip every triangle reachable from `start` through paired edges.
    ///
    /// Iterative depth-first walk; the visited set bounds the work to one flip
    /// per triangle even when the region loops back on itself. Returns the
    /// number of triangles flipped.
    fn flip_contiguous_region(&mut self, start: TriangleId<I>) -> usize {
        let mut visited = vec![false; self.triangles.len()];
        let mut stack = vec![start];
        visited[start.index()] = true;
        let mut flipped = 0;

        while let Some(t) = stack.pop() {
            self.flip_triangle(t);
            flipped += 1;
            for neighbor in self.adjacent_triangles(t) {
                if !visited[neighbor.index()] {
                    visited[neighbor.index()] = true;
                    stack.push(neighbor);
                }
            }
        }
        flipped
    }

    /// Reverse the winding of one triangle.
    ///
    /// All three half-edges are reversed, `v0`/`v1` swap, and the half-edges
    /// in slots 1 and 2 trade places so that slot `k` again runs
    /// `v_k -> v_(k+1)` with index `3 * t + k`.
    fn flip_triangle(&mut self, t: TriangleId<I>) {
        let [he0, he1, he2] = t.halfedges();
        self.flip(he0);
        self.flip(he1);
        self.flip(he2);
        self.triangles[t.index()].vertices.swap(0, 1);
        self.swap_halfedge_ids(he1, he2);
    }

    /// Triangles across the paired edges of `t` (at most three).
    ///
    /// Boundary, overdetermined and detached edges contribute nothing.
    pub fn adjacent_triangles(&self, t: TriangleId<I>) -> Vec<TriangleId<I>> {
        let mut adjacent: Vec<TriangleId<I>> = t
            .halfedges()
            .iter()
            .filter_map(|&he| self.pair_of(he))
            .map(HalfEdgeId::triangle)
            .filter(|&other| other != t)
            .collect();
        adjacent.sort_unstable();
        adjacent.dedup();
        adjacent
    }

    /// The mesh's triangles as vertex-index triples in their current
    /// (post-repair) winding.
    ///
    /// Per-slot inputs such as cotangent weights must be computed against
    /// this ordering.
    pub fn trilist(&self) -> Vec<[usize; 3]> {
        self.triangles
            .iter()
            .map(|t| t.vertices.map(VertexId::index))
            .collect()
    }

    /// Sum a per-triangle value onto each of the triangle's three vertices.
    pub fn reduce_scalar_to_vertices(&self, triangle_scalar: &[f64]) -> Result<Vec<f64>> {
        if triangle_scalar.len() != self.n_triangles() {
            return Err(MeshError::invalid_param(
                "triangle_scalar",
                triangle_scalar.len(),
                "expected one value per triangle",
            ));
        }
        let mut vertex_scalar = vec![0.0; self.n_vertices()];
        for (tri, &value) in self.triangles.iter().zip(triangle_scalar) {
            for v in tri.vertices {
                vertex_scalar[v.index()] += value;
            }
        }
        Ok(vertex_scalar)
    }

    /// Sum a per-corner value (indexed `3 * triangle + slot`) onto the vertex
    /// occupying that corner.
    pub fn reduce_scalar_per_vertex_to_vertices(&self, corner_scalar: &[f64]) -> Result<Vec<f64>> {
        if corner_scalar.len() != 3 * self.n_triangles() {
            return Err(MeshError::invalid_param(
                "corner_scalar",
                corner_scalar.len(),
                "expected three values per triangle",
            ));
        }
        let mut vertex_scalar = vec![0.0; self.n_vertices()];
        for (tri, values) in self.triangles.iter().zip(corner_scalar.chunks_exact(3)) {
            for (v, value) in tri.vertices.iter().zip(values) {
                vertex_scalar[v.index()] += value;
            }
        }
        Ok(vertex_scalar)
    }

    /// Human-readable summary of a triangle's edges.
    ///
    /// The first line walks the corners, drawing `====` for a paired edge and
    /// `----` for an unpaired one; the second names the neighbouring triangle
    /// across each edge.
    pub fn triangle_status(&self, t: TriangleId<I>) -> String {
        let tri = self.triangle(t);
        let mut corners = String::new();
        let mut across = String::new();
        for (k, he) in t.halfedges().into_iter().enumerate() {
            let pair = self.pair_of(he);
            let link = if pair.is_some() { "====" } else { "----" };
            let _ = write!(corners, "{:>6}{}", tri.vertices[k].to_string(), link);
            match pair {
                Some(p) => {
                    let _ = write!(across, "{:>10}", p.triangle().to_string());
                }
                None => {
                    let _ = write!(across, "{:>10}", "--");
                }
            }
        }
        let _ = write!(corners, "{:>6}", tri.vertices[0].to_string());
        format!("{}\n{}\n{}", t, corners, across)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::EdgeKind;

    fn v(i: usize) -> VertexId {
        VertexId::new(i)
    }

    fn assert_consistent(mesh: &Mesh) {
        for (e, edge) in mesh.edges() {
            assert_ne!(mesh.edge_kind(e), EdgeKind::Flipped, "edge {:?} {:?}", e, edge);
        }
        for he in mesh.halfedge_ids() {
            let t = mesh.triangle(he.triangle());
            let k = he.slot();
            let h = mesh.halfedge(he);
            assert_eq!(h.a(), t.vertices()[k]);
            assert_eq!(h.b(), t.vertices()[(k + 1) % 3]);
            assert_eq!(h.opposite_vertex(), t.vertices()[(k + 2) % 3]);
            assert!(mesh.vertex(h.a()).outgoing_halfedges().any(|o| o == he));
        }
        assert!(mesh.verify().is_empty(), "{:?}", mesh.verify());
    }

    #[test]
    fn test_consistent_neighbour_needs_no_repair() {
        let mesh = Mesh::<u32>::from_triangles(&[[0, 1, 2], [1, 0, 3]], 4).unwrap();
        assert!(mesh.chirality_repairs().is_empty());
        let e = mesh.edge_between(v(0), v(1)).unwrap();
        assert_eq!(mesh.edge_kind(e), EdgeKind::Full);
    }

    #[test]
    fn test_reversed_neighbour_is_repaired() {
        let mesh = Mesh::<u32>::from_triangles(&[[0, 1, 2], [0, 1, 3]], 4).unwrap();

        let e = mesh.edge_between(v(0), v(1)).unwrap();
        let repairs = mesh.chirality_repairs();
        assert_eq!(repairs.len(), 1);
        assert_eq!(repairs[0].triangle, TriangleId::new(1));
        assert_eq!(repairs[0].conflicts, vec![e]);
        assert_eq!(repairs[0].flipped, 1);
        assert_eq!(
            repairs[0].to_string(),
            "T1 flipped 1 triangle(s), conflicts on E0"
        );

        assert_eq!(mesh.edge_kind(e), EdgeKind::Full);
        assert_eq!(mesh.trilist(), vec![[0, 1, 2], [1, 0, 3]]);
        assert_consistent(&mesh);
    }

    #[test]
    fn test_region_is_flipped_as_a_whole() {
        // triangle 3 agrees with triangle 0 but not with the strip 1-2; it
        // arrives already joined to triangle 0, so both flip together
        let trilist = [[0, 1, 2], [3, 5, 4], [3, 4, 1], [1, 3, 2]];
        let mesh = Mesh::<u32>::from_triangles(&trilist, 6).unwrap();

        assert_eq!(mesh.chirality_repairs().len(), 1);
        assert_eq!(mesh.chirality_repairs()[0].flipped, 2);
        assert_eq!(mesh.triangle(TriangleId::new(0)).vertices(), [v(1), v(0), v(2)]);
        assert_consistent(&mesh);

        // re-building from the repaired winding is a no-op
        let again = Mesh::<u32>::from_triangles(&mesh.trilist(), 6).unwrap();
        assert!(again.chirality_repairs().is_empty());
        assert_eq!(again.trilist(), mesh.trilist());
    }

    #[test]
    fn test_single_reversed_triangle_in_fan() {
        // a closed fan around vertex 0 with one triangle wound backwards
        let trilist = [[0, 1, 2], [0, 2, 3], [0, 4, 3], [0, 4, 5], [0, 5, 1]];
        let mesh = Mesh::<u32>::from_triangles(&trilist, 6).unwrap();
        assert_consistent(&mesh);
        for (e, _) in mesh.edges() {
            assert_ne!(mesh.edge_kind(e), EdgeKind::Flipped);
        }
        let again = Mesh::<u32>::from_triangles(&mesh.trilist(), 6).unwrap();
        assert!(again.chirality_repairs().is_empty());
    }

    #[test]
    fn test_adjacent_triangles() {
        let mesh = Mesh::<u32>::from_triangles(&[[0, 1, 2], [0, 2, 3], [0, 3, 4]], 5).unwrap();
        assert_eq!(mesh.adjacent_triangles(TriangleId::new(0)), vec![TriangleId::new(1)]);
        assert_eq!(
            mesh.adjacent_triangles(TriangleId::new(1)),
            vec![TriangleId::new(0), TriangleId::new(2)]
        );
    }

    #[test]
    fn test_scalar_reductions() {
        let mesh = Mesh::<u32>::from_triangles(&[[0, 1, 2], [0, 2, 3]], 4).unwrap();

        let per_vertex = mesh.reduce_scalar_to_vertices(&[1.0, 10.0]).unwrap();
        assert_eq!(per_vertex, vec![11.0, 1.0, 11.0, 10.0]);

        let corners = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let per_vertex = mesh.reduce_scalar_per_vertex_to_vertices(&corners).unwrap();
        assert_eq!(per_vertex, vec![5.0, 2.0, 8.0, 6.0]);

        assert!(mesh.reduce_scalar_to_vertices(&[1.0]).is_err());
        assert!(mesh.reduce_scalar_per_vertex_to_vertices(&[1.0; 5]).is_err());
    }

    #[test]
    fn test_triangle_status() {
        let mesh = Mesh::<u32>::from_triangles(&[[0, 1, 2], [0, 2, 3]], 4).unwrap();
        let status = mesh.triangle_status(TriangleId::new(0));
        let lines: Vec<&str> = status.lines().collect();
        assert_eq!(lines[0], "T0");
        assert!(lines[1].contains("V2===="));
        assert!(lines[1].contains("V0----"));
        assert!(lines[2].contains("T1"));
    }
}
