//! Mesh Laplacian assembly.
//!
//! Each vertex contributes one row: for every adjacent vertex `j` a weight
//! `w_ij` is computed, `-w_ij` is emitted as an off-diagonal entry and
//! `+w_ij` is added to the vertex's diagonal. Rows only touch their own
//! diagonal slot, so they can be computed independently.
//!
//! # Output layout
//!
//! The operator is returned in coordinate (COO) form as three parallel arrays
//! `i_sparse`, `j_sparse`, `w_sparse`. The first `n_vertices` entries are the
//! diagonal (`i == j == vertex`), accumulated in place; off-diagonal entries
//! follow, row by row in vertex order, columns ascending.
//!
//! # Weights
//!
//! Geometry is never computed here. Distance and cotangent weights read
//! caller-supplied arrays:
//!
//! - [`LaplacianWeights::Combinatorial`]: `w_ij = 1`
//! - [`LaplacianWeights::InverseSquaredLength`]: `w_ij = 1 / l_ij^2`, lengths
//!   indexed by [`EdgeId`](crate::mesh::EdgeId)
//! - [`LaplacianWeights::Cotangent`]: sum of the cotangents opposite the edge,
//!   indexed `3 * triangle + slot` against [`Mesh::trilist`]
//!
//! # Example
//!
//! ```
//! use chiral::algo::laplacian::{assemble_laplacian, LaplacianOptions};
//! use chiral::mesh::Mesh;
//!
//! let mesh: Mesh = Mesh::build(&[0, 1, 2, 0, 2, 3], 4).unwrap();
//! let l = assemble_laplacian(&mesh, &LaplacianOptions::default()).unwrap();
//!
//! // vertex 0 touches 1, 2 and 3
//! assert_eq!(l.diagonal()[0], 3.0);
//! assert_eq!(l.len(), 4 + 10);
//! ```

use log::debug;
use rayon::prelude::*;

use super::sparse::CsrMatrix;
use super::Progress;
use crate::error::{MeshError, Result};
use crate::mesh::{HalfEdgeId, Mesh, MeshIndex, VertexId};

/// How off-diagonal weights are computed.
#[derive(Debug, Clone, Copy, Default)]
pub enum LaplacianWeights<'a> {
    /// Graph Laplacian: every edge weighs 1.
    #[default]
    Combinatorial,

    /// Inverse squared edge length.
    InverseSquaredLength {
        /// One positive length per edge, indexed by edge ID.
        edge_lengths: &'a [f64],
    },

    /// Cotangent weights.
    Cotangent {
        /// One cotangent per triangle corner, indexed `3 * triangle + slot`.
        cot_per_triangle_vertex: &'a [f64],
    },
}

impl LaplacianWeights<'_> {
    /// Short name of the scheme.
    pub fn name(&self) -> &'static str {
        match self {
            LaplacianWeights::Combinatorial => "combinatorial",
            LaplacianWeights::InverseSquaredLength { .. } => "inverse squared length",
            LaplacianWeights::Cotangent { .. } => "cotangent",
        }
    }

    /// Check that the supplied weight arrays match the mesh.
    pub fn validate<I: MeshIndex>(&self, mesh: &Mesh<I>) -> Result<()> {
        match *self {
            LaplacianWeights::Combinatorial => Ok(()),
            LaplacianWeights::InverseSquaredLength { edge_lengths } => {
                if edge_lengths.len() != mesh.n_edges() {
                    return Err(MeshError::invalid_param(
                        "edge_lengths",
                        edge_lengths.len(),
                        "expected one length per edge",
                    ));
                }
                if let Some(&bad) = edge_lengths.iter().find(|l| !(l.is_finite() && **l > 0.0)) {
                    return Err(MeshError::invalid_param(
                        "edge_lengths",
                        bad,
                        "lengths must be finite and positive",
                    ));
                }
                Ok(())
            }
            LaplacianWeights::Cotangent {
                cot_per_triangle_vertex,
            } => {
                if cot_per_triangle_vertex.len() != 3 * mesh.n_triangles() {
                    return Err(MeshError::invalid_param(
                        "cot_per_triangle_vertex",
                        cot_per_triangle_vertex.len(),
                        "expected three values per triangle",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Options for Laplacian assembly.
#[derive(Debug, Clone, Copy)]
pub struct LaplacianOptions<'a> {
    /// Weighting scheme.
    pub weights: LaplacianWeights<'a>,

    /// Whether to compute rows in parallel (default: true).
    pub parallel: bool,
}

impl Default for LaplacianOptions<'_> {
    fn default() -> Self {
        Self {
            weights: LaplacianWeights::Combinatorial,
            parallel: true,
        }
    }
}

impl<'a> LaplacianOptions<'a> {
    /// Use the given weighting scheme.
    pub fn with_weights(mut self, weights: LaplacianWeights<'a>) -> Self {
        self.weights = weights;
        self
    }

    /// Weight edges by inverse squared length.
    pub fn with_edge_lengths(self, edge_lengths: &'a [f64]) -> Self {
        self.with_weights(LaplacianWeights::InverseSquaredLength { edge_lengths })
    }

    /// Weight edges by cotangents.
    pub fn with_cotangents(self, cot_per_triangle_vertex: &'a [f64]) -> Self {
        self.with_weights(LaplacianWeights::Cotangent {
            cot_per_triangle_vertex,
        })
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

/// One assembled Laplacian row.
#[derive(Debug, Clone, PartialEq)]
pub struct LaplacianRow {
    /// Row (vertex) index.
    pub vertex: usize,
    /// Sum of the row's weights, to be added onto the diagonal.
    pub diagonal: f64,
    /// `(column, -w_ij)` pairs, columns ascending.
    pub off_diagonal: Vec<(usize, f64)>,
}

impl LaplacianRow {
    /// Append the off-diagonal entries at `*cursor` and accumulate the
    /// diagonal into `w_sparse[vertex]`.
    ///
    /// The caller owns the buffers: `w_sparse[..n_vertices]` must already be
    /// zeroed (or hold a partial sum) and there must be room for
    /// `off_diagonal.len()` entries from `*cursor` on.
    pub fn write_into(
        &self,
        i_sparse: &mut [usize],
        j_sparse: &mut [usize],
        w_sparse: &mut [f64],
        cursor: &mut usize,
    ) {
        for &(j, w) in &self.off_diagonal {
            i_sparse[*cursor] = self.vertex;
            j_sparse[*cursor] = j;
            w_sparse[*cursor] = w;
            *cursor += 1;
        }
        w_sparse[self.vertex] += self.diagonal;
    }
}

/// A Laplacian in coordinate form.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseTriplets {
    /// Row indices.
    pub i_sparse: Vec<usize>,
    /// Column indices.
    pub j_sparse: Vec<usize>,
    /// Values.
    pub w_sparse: Vec<f64>,
    n_vertices: usize,
}

impl SparseTriplets {
    /// Buffers for a mesh: diagonal entries initialised, room for every
    /// off-diagonal entry.
    pub fn for_mesh<I: MeshIndex>(mesh: &Mesh<I>) -> Self {
        let n = mesh.n_vertices();
        let len = laplacian_len(mesh);
        let mut i_sparse = vec![0; len];
        let mut j_sparse = vec![0; len];
        for k in 0..n {
            i_sparse[k] = k;
            j_sparse[k] = k;
        }
        Self {
            i_sparse,
            j_sparse,
            w_sparse: vec![0.0; len],
            n_vertices: n,
        }
    }

    /// Total number of entries (diagonal included).
    #[inline]
    pub fn len(&self) -> usize {
        self.w_sparse.len()
    }

    /// True if there are no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w_sparse.is_empty()
    }

    /// Number of vertices (rows).
    #[inline]
    pub fn n_vertices(&self) -> usize {
        self.n_vertices
    }

    /// The diagonal, one value per vertex.
    pub fn diagonal(&self) -> &[f64] {
        &self.w_sparse[..self.n_vertices]
    }

    /// All entries as `(i, j, w)`.
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.i_sparse
            .iter()
            .zip(&self.j_sparse)
            .zip(&self.w_sparse)
            .map(|((&i, &j), &w)| (i, j, w))
    }

    /// Pack into a square CSR matrix.
    pub fn to_csr(&self) -> CsrMatrix {
        CsrMatrix::from_triplets(self.n_vertices, self.n_vertices, self.triplets())
    }
}

/// Number of COO entries a mesh's Laplacian needs: one diagonal entry per
/// vertex plus one per (vertex, neighbour) pair.
pub fn laplacian_len<I: MeshIndex>(mesh: &Mesh<I>) -> usize {
    mesh.n_vertices()
        + mesh
            .vertex_ids()
            .map(|v| mesh.vertex(v).degree())
            .sum::<usize>()
}

/// The half-edge joining `i` and `j`, in either direction.
fn joining_halfedge<I: MeshIndex>(
    mesh: &Mesh<I>,
    i: VertexId<I>,
    j: VertexId<I>,
) -> Result<HalfEdgeId<I>> {
    mesh.halfedge_to_or_from(i, j)
        .ok_or(MeshError::Disconnected {
            a: i.index(),
            b: j.index(),
        })
}

/// Cotangent read at the corner opposite `he`.
#[inline]
fn corner_cotangent<I: MeshIndex>(he: HalfEdgeId<I>, cot_per_triangle_vertex: &[f64]) -> f64 {
    cot_per_triangle_vertex[3 * he.triangle().index() + he.opposite_slot()]
}

fn edge_weight<I: MeshIndex>(
    mesh: &Mesh<I>,
    i: VertexId<I>,
    j: VertexId<I>,
    weights: &LaplacianWeights<'_>,
) -> Result<f64> {
    match *weights {
        LaplacianWeights::Combinatorial => Ok(1.0),
        LaplacianWeights::InverseSquaredLength { edge_lengths } => {
            let he = joining_halfedge(mesh, i, j)?;
            let length = edge_lengths[mesh.halfedge(he).edge().index()];
            Ok(1.0 / (length * length))
        }
        LaplacianWeights::Cotangent {
            cot_per_triangle_vertex,
        } => {
            let he = joining_halfedge(mesh, i, j)?;
            let mut w = corner_cotangent(he, cot_per_triangle_vertex);
            // interior edges collect both sides, boundary edges only one
            if let Some(pair) = mesh.paired_halfedge(he)? {
                w += corner_cotangent(pair, cot_per_triangle_vertex);
            }
            Ok(w)
        }
    }
}

/// Assemble the Laplacian row of vertex `v`.
///
/// Weight arrays are assumed to be validated (see
/// [`LaplacianWeights::validate`]).
///
/// # Errors
/// [`MeshError::AmbiguousPairing`] for cotangent weights on an
/// overdetermined edge.
pub fn laplacian_row<I: MeshIndex>(
    mesh: &Mesh<I>,
    v: VertexId<I>,
    weights: &LaplacianWeights<'_>,
) -> Result<LaplacianRow> {
    let vertex = mesh.vertex(v);
    let mut row = LaplacianRow {
        vertex: v.index(),
        diagonal: 0.0,
        off_diagonal: Vec::with_capacity(vertex.degree()),
    };
    for j in vertex.adjacent_vertices() {
        let w_ij = edge_weight(mesh, v, j, weights)?;
        row.off_diagonal.push((j.index(), -w_ij));
        row.diagonal += w_ij;
    }
    Ok(row)
}

/// Assemble the cotangent Laplacian row of vertex `v`.
pub fn cotangent_laplacian_row<I: MeshIndex>(
    mesh: &Mesh<I>,
    v: VertexId<I>,
    cot_per_triangle_vertex: &[f64],
) -> Result<LaplacianRow> {
    laplacian_row(
        mesh,
        v,
        &LaplacianWeights::Cotangent {
            cot_per_triangle_vertex,
        },
    )
}

/// Write the whole Laplacian into caller-owned COO buffers.
///
/// Off-diagonal entries are written from `*cursor` on, which is advanced past
/// them; diagonal values are added onto `w_sparse[vertex]`, so the first
/// `n_vertices` values must be zeroed beforehand. Diagonal row/column indices
/// are left for the caller to fill.
pub fn laplacian_into<I: MeshIndex>(
    mesh: &Mesh<I>,
    weights: &LaplacianWeights<'_>,
    i_sparse: &mut [usize],
    j_sparse: &mut [usize],
    w_sparse: &mut [f64],
    cursor: &mut usize,
) -> Result<()> {
    weights.validate(mesh)?;
    let needed = *cursor + laplacian_len(mesh) - mesh.n_vertices();
    let available = i_sparse.len().min(j_sparse.len()).min(w_sparse.len());
    if available < needed || w_sparse.len() < mesh.n_vertices() {
        return Err(MeshError::invalid_param(
            "sparse buffers",
            available,
            "too short for the off-diagonal entries at this cursor",
        ));
    }
    for v in mesh.vertex_ids() {
        laplacian_row(mesh, v, weights)?.write_into(i_sparse, j_sparse, w_sparse, cursor);
    }
    Ok(())
}

/// Assemble a mesh Laplacian.
///
/// # Errors
/// * [`MeshError::InvalidParameter`] if a weight array does not match the mesh
/// * [`MeshError::AmbiguousPairing`] for cotangent weights on a non-manifold edge
pub fn assemble_laplacian<I: MeshIndex>(
    mesh: &Mesh<I>,
    options: &LaplacianOptions<'_>,
) -> Result<SparseTriplets> {
    assemble_laplacian_with_progress(mesh, options, &Progress::none())
}

/// Laplacian assembly with progress reporting.
///
/// In parallel mode every row is computed into its own buffer and the rows
/// are written out in vertex order afterwards, so the result is identical to
/// the sequential one.
pub fn assemble_laplacian_with_progress<I: MeshIndex>(
    mesh: &Mesh<I>,
    options: &LaplacianOptions<'_>,
    progress: &Progress,
) -> Result<SparseTriplets> {
    options.weights.validate(mesh)?;

    let n = mesh.n_vertices();
    let weights = &options.weights;
    let rows: Vec<LaplacianRow> = if options.parallel {
        progress.report(0, n, "Assembling Laplacian rows");
        (0..n)
            .into_par_iter()
            .map(|i| laplacian_row(mesh, VertexId::new(i), weights))
            .collect::<Result<_>>()?
    } else {
        let stride = (n / 100).max(1);
        (0..n)
            .map(|i| {
                progress.report_every(stride, i, n, "Assembling Laplacian rows");
                laplacian_row(mesh, VertexId::new(i), weights)
            })
            .collect::<Result<_>>()?
    };

    let mut out = SparseTriplets::for_mesh(mesh);
    let mut cursor = n;
    for row in &rows {
        row.write_into(&mut out.i_sparse, &mut out.j_sparse, &mut out.w_sparse, &mut cursor);
    }
    debug_assert_eq!(cursor, out.len());
    progress.report(n, n, "Assembling Laplacian rows");

    debug!(
        "assembled {} Laplacian: {} rows, {} entries",
        options.weights.name(),
        n,
        out.len()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DVector;

    fn square() -> Mesh {
        Mesh::build(&[0, 1, 2, 0, 2, 3], 4).unwrap()
    }

    fn closed_octahedron() -> Mesh {
        let faces = [
            [0, 1, 2],
            [0, 2, 3],
            [0, 3, 4],
            [0, 4, 1],
            [5, 2, 1],
            [5, 3, 2],
            [5, 4, 3],
            [5, 1, 4],
        ];
        Mesh::from_triangles(&faces, 6).unwrap()
    }

    #[test]
    fn test_combinatorial_rows_sum_to_zero() {
        let mesh = closed_octahedron();
        let l = assemble_laplacian(&mesh, &LaplacianOptions::default()).unwrap();

        for v in mesh.vertex_ids() {
            assert_eq!(l.diagonal()[v.index()], mesh.vertex(v).degree() as f64);
        }
        for i in 0..mesh.n_vertices() {
            let off: f64 = l
                .triplets()
                .skip(mesh.n_vertices())
                .filter(|&(r, _, _)| r == i)
                .map(|(_, _, w)| w)
                .sum();
            assert_eq!(off, -4.0);
        }

        let csr = l.to_csr();
        assert!(csr.is_symmetric(0.0));
        let y = csr.mul_vec(&DVector::from_element(6, 1.0));
        assert!(y.norm() < 1e-12);
    }

    #[test]
    fn test_square_layout() {
        let mesh = square();
        let l = assemble_laplacian(&mesh, &LaplacianOptions::default().sequential()).unwrap();

        assert_eq!(l.diagonal(), &[3.0, 2.0, 3.0, 2.0]);
        assert_eq!(&l.i_sparse[..4], &[0, 1, 2, 3]);
        assert_eq!(&l.j_sparse[..4], &[0, 1, 2, 3]);
        // row 0 first, columns ascending
        assert_eq!(&l.i_sparse[4..7], &[0, 0, 0]);
        assert_eq!(&l.j_sparse[4..7], &[1, 2, 3]);
        assert_eq!(&l.w_sparse[4..7], &[-1.0, -1.0, -1.0]);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mesh = closed_octahedron();
        let par = assemble_laplacian(&mesh, &LaplacianOptions::default()).unwrap();
        let seq = assemble_laplacian(&mesh, &LaplacianOptions::default().sequential()).unwrap();
        assert_eq!(par, seq);
    }

    #[test]
    fn test_inverse_squared_length() {
        let mesh = square();
        // unit square: sides 1, diagonal sqrt(2)
        let diagonal_edge = mesh
            .edge_between(VertexId::new(0), VertexId::new(2))
            .unwrap();
        let lengths: Vec<f64> = mesh
            .edges()
            .map(|(e, _)| if e == diagonal_edge { 2f64.sqrt() } else { 1.0 })
            .collect();

        let options = LaplacianOptions::default().with_edge_lengths(&lengths);
        let csr = assemble_laplacian(&mesh, &options).unwrap().to_csr();

        assert!((csr.get(0, 2) + 0.5).abs() < 1e-12);
        assert!((csr.get(0, 1) + 1.0).abs() < 1e-12);
        assert!((csr.get(0, 0) - 2.5).abs() < 1e-12);
        assert!(csr.is_symmetric(1e-12));
    }

    #[test]
    fn test_cotangent_two_sided_and_one_sided() {
        let mesh = square();
        // right-angled corners get cot = 0, the 45 degree corners cot = 1
        // T0 = (0, 1, 2): corner 1 is the right angle
        // T1 = (0, 2, 3): corner 3 is the right angle
        let cot = [1.0, 0.0, 1.0, 1.0, 1.0, 0.0];
        let options = LaplacianOptions::default().with_cotangents(&cot);
        let csr = assemble_laplacian(&mesh, &options).unwrap().to_csr();

        // diagonal 0-2 is opposite the two right angles
        assert!(csr.get(0, 2).abs() < 1e-12);
        // boundary edge 0-1 sees only the corner at 2
        assert!((csr.get(0, 1) + 1.0).abs() < 1e-12);
        assert!((csr.get(1, 0) + 1.0).abs() < 1e-12);
        assert!(csr.is_symmetric(1e-12));

        let row = cotangent_laplacian_row(&mesh, VertexId::new(1), &cot).unwrap();
        assert_eq!(row.off_diagonal, vec![(0, -1.0), (2, -1.0)]);
        assert_eq!(row.diagonal, 2.0);
    }

    #[test]
    fn test_cotangent_uses_repaired_slots() {
        // the second triangle is flipped on insertion, so its corners move
        let mesh: Mesh = Mesh::from_triangles(&[[0, 1, 2], [0, 1, 3]], 4).unwrap();
        assert_eq!(mesh.trilist()[1], [1, 0, 3]);

        // cot[3 + 2] belongs to vertex 3, opposite the shared edge
        let cot = [0.0, 0.0, 2.0, 0.0, 0.0, 5.0];
        let row = cotangent_laplacian_row(&mesh, VertexId::new(0), &cot).unwrap();
        assert_eq!(row.off_diagonal[0], (1, -7.0));
    }

    #[test]
    fn test_cotangent_rejects_overdetermined_edges() {
        let mesh: Mesh = Mesh::from_triangles(&[[0, 1, 2], [1, 0, 3], [1, 0, 4]], 5).unwrap();
        let cot = vec![1.0; 9];
        let result = assemble_laplacian(&mesh, &LaplacianOptions::default().with_cotangents(&cot));
        assert!(matches!(result, Err(MeshError::AmbiguousPairing { .. })));

        // the graph Laplacian is still defined
        assert!(assemble_laplacian(&mesh, &LaplacianOptions::default()).is_ok());
    }

    #[test]
    fn test_weight_validation() {
        let mesh = square();
        let short = [1.0; 3];
        let options = LaplacianOptions::default().with_edge_lengths(&short);
        assert!(matches!(
            assemble_laplacian(&mesh, &options),
            Err(MeshError::InvalidParameter { name: "edge_lengths", .. })
        ));

        let zero = [1.0, 1.0, 0.0, 1.0, 1.0];
        let options = LaplacianOptions::default().with_edge_lengths(&zero);
        assert!(assemble_laplacian(&mesh, &options).is_err());

        let cot = [1.0; 5];
        let options = LaplacianOptions::default().with_cotangents(&cot);
        assert!(assemble_laplacian(&mesh, &options).is_err());
    }

    #[test]
    fn test_laplacian_into_with_cursor() {
        let mesh = square();
        let offset = 2;
        let len = offset + laplacian_len(&mesh);
        let mut i_sparse = vec![usize::MAX; len];
        let mut j_sparse = vec![usize::MAX; len];
        let mut w_sparse = vec![0.0; len];
        let mut cursor = mesh.n_vertices() + offset;

        laplacian_into(
            &mesh,
            &LaplacianWeights::Combinatorial,
            &mut i_sparse,
            &mut j_sparse,
            &mut w_sparse,
            &mut cursor,
        )
        .unwrap();

        assert_eq!(cursor, len);
        assert_eq!(&w_sparse[..4], &[3.0, 2.0, 3.0, 2.0]);
        assert_eq!(i_sparse[4], usize::MAX);
        assert_eq!((i_sparse[6], j_sparse[6], w_sparse[6]), (0, 1, -1.0));

        let mut too_far = len;
        let result = laplacian_into(
            &mesh,
            &LaplacianWeights::Combinatorial,
            &mut i_sparse,
            &mut j_sparse,
            &mut w_sparse,
            &mut too_far,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_progress_is_reported() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let mesh = closed_octahedron();
        let last = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&last);
        let progress = Progress::new(move |current, _, _| seen.store(current, Ordering::SeqCst));

        assemble_laplacian_with_progress(&mesh, &LaplacianOptions::default().sequential(), &progress)
            .unwrap();
        assert_eq!(last.load(Ordering::SeqCst), 6);
    }
}
