//! Vertex layout.
//!
//! Every mesh uses the same interleaved layout: a [`VertexRecord`] is 8 `f32` (position, color and
//! texture coordinates) for a stride of 32 bytes. Shaders read those components through the
//! `position`, `color` and `texCoord` attributes.

use std::mem;

/// A single vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VertexRecord {
  /// Position in model space.
  pub position: [f32; 3],
  /// RGB color.
  pub color: [f32; 3],
  /// Texture coordinates.
  pub tex_coord: [f32; 2],
}

impl VertexRecord {
  /// Size in bytes of a single vertex.
  pub const STRIDE: usize = mem::size_of::<VertexRecord>();

  /// Attributes of the layout, in memory order.
  pub const ATTRIBS: [VertexAttribDesc; 3] = [
    VertexAttribDesc {
      name: "position",
      dim: 3,
      offset: 0,
    },
    VertexAttribDesc {
      name: "color",
      dim: 3,
      offset: mem::size_of::<[f32; 3]>(),
    },
    VertexAttribDesc {
      name: "texCoord",
      dim: 2,
      offset: 2 * mem::size_of::<[f32; 3]>(),
    },
  ];

  /// Vertex at `position`, tinted with `color` and sampling the texture at `tex_coord`.
  pub const fn new(position: [f32; 3], color: [f32; 3], tex_coord: [f32; 2]) -> Self {
    VertexRecord {
      position,
      color,
      tex_coord,
    }
  }

  /// Build a vertex out of its 8 packed components.
  pub fn from_components(c: [f32; 8]) -> Self {
    VertexRecord::new([c[0], c[1], c[2]], [c[3], c[4], c[5]], [c[6], c[7]])
  }
}

/// Floating-point vertex attribute description.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VertexAttribDesc {
  /// Name of the attribute in shaders.
  pub name: &'static str,
  /// Number of `f32` components.
  pub dim: usize,
  /// Offset in bytes from the start of a vertex.
  pub offset: usize,
}

/// A vertex attribute bound to an attribute location of a program.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct VertexAttribBinding {
  /// Attribute location in the program.
  pub index: u32,
  /// Attribute description.
  pub desc: VertexAttribDesc,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn layout() {
    assert_eq!(VertexRecord::STRIDE, 32);
    assert_eq!(mem::align_of::<VertexRecord>(), 4);

    let offsets: Vec<_> = VertexRecord::ATTRIBS.iter().map(|a| a.offset).collect();
    assert_eq!(offsets, vec![0, 12, 24]);

    let last = VertexRecord::ATTRIBS[2];
    assert_eq!(last.offset + last.dim * mem::size_of::<f32>(), VertexRecord::STRIDE);
  }
}
