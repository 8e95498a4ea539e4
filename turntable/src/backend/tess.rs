//! Tessellation backend.

use std::error;
use std::fmt;

use crate::vertex::{VertexAttribBinding, VertexRecord};

/// Vertex storage and draw calls.
///
/// Vertices are uploaded once; a tessellation is never mutated afterwards.
pub trait Tess {
  /// Backend representation of uploaded vertices along with their attribute bindings.
  type TessRepr;

  /// Upload vertices and bind the given attributes to their layout.
  ///
  /// Attributes absent from `bindings` are simply not fed.
  fn new_tess(
    &mut self,
    vertices: &[VertexRecord],
    bindings: &[VertexAttribBinding],
  ) -> Result<Self::TessRepr, TessError>;

  /// Draw `count` vertices as triangles, starting at vertex `start`.
  fn render(&mut self, tess: &Self::TessRepr, start: usize, count: usize) -> Result<(), TessError>;
}

/// Possible errors that might occur when dealing with tessellations.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TessError {
  /// Cannot create a tessellation without any vertex.
  NoVertices,
  /// The requested range doesn’t fit the uploaded vertices.
  OutOfBounds {
    /// First vertex.
    start: usize,
    /// Number of vertices.
    count: usize,
    /// Number of uploaded vertices.
    len: usize,
  },
  /// The backend refused to create the tessellation.
  CannotCreate(String),
}

impl fmt::Display for TessError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      TessError::NoVertices => f.write_str("no vertices to upload"),
      TessError::OutOfBounds { start, count, len } => write!(
        f,
        "vertex range {}..{} out of bounds ({} vertices)",
        start,
        start + count,
        len
      ),
      TessError::CannotCreate(ref e) => write!(f, "cannot create tessellation: {}", e),
    }
  }
}

impl error::Error for TessError {}
