//! Mesh construction from triangle lists.
//!
//! Input is validated completely before any entity is created, so a bad
//! triangle list never yields a half-built mesh.

use log::info;

use super::halfedge::Mesh;
use super::index::{MeshIndex, VertexId};
use crate::error::{MeshError, Result};

impl<I: MeshIndex> Mesh<I> {
    /// Build a mesh from a flat triangle list.
    ///
    /// `trilist` holds `3 * n_triangles` vertex indices, each triple wound
    /// counter-clockwise. Vertices `0..n_vertices` are created first, then
    /// triangles in list order; triangles whose winding conflicts with an
    /// earlier neighbour are repaired as they are inserted.
    ///
    /// # Errors
    /// * [`MeshError::MalformedInput`] if the list length is not a multiple of 3
    /// * [`MeshError::InvalidIndex`] if an index is `>= n_vertices`
    /// * [`MeshError::DegenerateTriangle`] if a triangle repeats a vertex
    /// * [`MeshError::IndexOverflow`] if the mesh does not fit index type `I`
    ///
    /// # Example
    /// ```
    /// use chiral::mesh::Mesh;
    ///
    /// let mesh: Mesh = Mesh::build(&[0, 1, 2, 0, 2, 3], 4).unwrap();
    /// assert_eq!(mesh.n_triangles(), 2);
    /// assert_eq!(mesh.n_edges(), 5);
    /// ```
    pub fn build(trilist: &[usize], n_vertices: usize) -> Result<Self> {
        if trilist.len() % 3 != 0 {
            return Err(MeshError::MalformedInput { len: trilist.len() });
        }
        let triangles: Vec<[usize; 3]> = trilist
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        Self::from_triangles(&triangles, n_vertices)
    }

    /// Build a mesh from explicit vertex-index triples.
    ///
    /// See [`Mesh::build`] for the construction order and errors.
    pub fn from_triangles(triangles: &[[usize; 3]], n_vertices: usize) -> Result<Self> {
        check_capacity::<I>("vertex", n_vertices)?;
        check_capacity::<I>("half-edge", 3 * triangles.len())?;

        for (ti, tri) in triangles.iter().enumerate() {
            for &vi in tri {
                if vi >= n_vertices {
                    return Err(MeshError::InvalidIndex {
                        triangle: ti,
                        vertex: vi,
                        n_vertices,
                    });
                }
            }
            if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
                return Err(MeshError::DegenerateTriangle { triangle: ti });
            }
        }

        let mut mesh = Mesh::with_vertices(n_vertices, triangles.len());
        for tri in triangles {
            mesh.add_triangle(tri.map(VertexId::new));
        }

        info!(
            "built mesh: {} vertices, {} triangles, {} edges ({} full, {} boundary), {} chirality repair(s)",
            mesh.n_vertices(),
            mesh.n_triangles(),
            mesh.n_edges(),
            mesh.n_fulledges(),
            mesh.n_boundary_halfedges(),
            mesh.chirality_repairs().len()
        );
        Ok(mesh)
    }
}

fn check_capacity<I: MeshIndex>(what: &'static str, count: usize) -> Result<()> {
    if count > I::CAPACITY {
        return Err(MeshError::IndexOverflow {
            what,
            count,
            capacity: I::CAPACITY,
        });
    }
    Ok(())
}
