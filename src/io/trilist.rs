//! Plain-text triangle lists.
//!
//! The format is a whitespace-separated stream of integers: the triangle
//! count, the vertex count, then three vertex indices per triangle.
//!
//! ```text
//! 2 4
//! 0 1 2
//! 0 2 3
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{MeshError, Result};
use crate::mesh::{Mesh, MeshIndex};

/// A parsed triangle list, not yet built into a mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriangleList {
    /// Number of vertices the indices refer to.
    pub n_vertices: usize,
    /// Flat vertex indices, three per triangle.
    pub indices: Vec<usize>,
}

impl TriangleList {
    /// Number of triangles.
    pub fn n_triangles(&self) -> usize {
        self.indices.len() / 3
    }

    /// Build a mesh from this list.
    pub fn build<I: MeshIndex>(&self) -> Result<Mesh<I>> {
        Mesh::build(&self.indices, self.n_vertices)
    }
}

fn parse_error(path: &Path, message: impl Into<String>) -> MeshError {
    MeshError::Parse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

fn parse_at(text: &str, path: &Path) -> Result<TriangleList> {
    let mut numbers = text.split_whitespace().enumerate().map(|(k, token)| {
        token
            .parse::<usize>()
            .map_err(|_| parse_error(path, format!("token {} ({:?}) is not an index", k, token)))
    });

    let mut header = |what: &str| {
        numbers
            .next()
            .unwrap_or_else(|| Err(parse_error(path, format!("missing {} in header", what))))
    };
    let n_triangles = header("triangle count")?;
    let n_vertices = header("vertex count")?;

    let indices = numbers.collect::<Result<Vec<usize>>>()?;
    if indices.len() != 3 * n_triangles {
        return Err(parse_error(
            path,
            format!(
                "header declares {} triangles but {} indices follow",
                n_triangles,
                indices.len()
            ),
        ));
    }

    Ok(TriangleList {
        n_vertices,
        indices,
    })
}

/// Parse a triangle list from text.
///
/// # Example
///
/// ```
/// use chiral::io::trilist;
///
/// let list = trilist::parse("2 4\n0 1 2\n0 2 3\n").unwrap();
/// assert_eq!(list.n_triangles(), 2);
/// assert_eq!(list.n_vertices, 4);
/// ```
pub fn parse(text: &str) -> Result<TriangleList> {
    parse_at(text, &PathBuf::new())
}

/// Read a triangle list file.
pub fn read<P: AsRef<Path>>(path: P) -> Result<TriangleList> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_at(&text, path)
}

/// Load a mesh from a triangle list file.
///
/// # Example
///
/// ```no_run
/// use chiral::io::trilist;
/// use chiral::mesh::Mesh;
///
/// let mesh: Mesh = trilist::load("bunny.tri").unwrap();
/// ```
pub fn load<P: AsRef<Path>, I: MeshIndex>(path: P) -> Result<Mesh<I>> {
    let path = path.as_ref();
    let list = read(path)?;
    info!(
        "read {}: {} triangles over {} vertices",
        path.display(),
        list.n_triangles(),
        list.n_vertices
    );
    list.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let list = parse("2 4\n0 1 2\n0 2 3\n").unwrap();
        assert_eq!(list.indices, vec![0, 1, 2, 0, 2, 3]);

        let mesh: Mesh = list.build().unwrap();
        assert_eq!(mesh.n_fulledges(), 1);
    }

    #[test]
    fn test_layout_is_free_form() {
        let list = parse("  1\t3 0\n1\n\n2").unwrap();
        assert_eq!(list.indices, vec![0, 1, 2]);
        assert_eq!(list.n_vertices, 3);
    }

    #[test]
    fn test_count_mismatch() {
        let err = parse("2 4\n0 1 2\n").unwrap_err();
        assert!(matches!(err, MeshError::Parse { .. }));
        assert!(err.to_string().contains("2 triangles but 3 indices"));
    }

    #[test]
    fn test_bad_tokens() {
        assert!(matches!(parse(""), Err(MeshError::Parse { .. })));
        assert!(matches!(parse("1"), Err(MeshError::Parse { .. })));
        assert!(matches!(parse("1 3 0 1 -2"), Err(MeshError::Parse { .. })));
    }

    #[test]
    fn test_build_errors_pass_through() {
        let list = parse("1 2 0 1 2").unwrap();
        assert!(matches!(
            list.build::<u32>(),
            Err(MeshError::InvalidIndex { vertex: 2, .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let result: Result<Mesh> = load("/nonexistent/mesh.tri");
        assert!(matches!(result, Err(MeshError::Io(_))));
    }
}
