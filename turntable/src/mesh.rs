//! Static mesh tables.
//!
//! A mesh is an ordered sequence of [`VertexRecord`]s split into named parts. Meshes are read from
//! a small text format:
//!
//! ```text
//! # comment
//! @cube
//! -0.5 -0.5 -0.5   1.0 1.0 1.0   0.0 0.0
//! ...
//! @floor
//! ...
//! ```
//!
//! Each vertex line holds exactly 8 numbers (position, color, texture coordinates). A line starting
//! with `@` opens a new part, which spans every vertex up to the next part. The default table (a
//! unit cube sitting on a floor quad) is embedded at build time and returned by [`Mesh::builtin`].

use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::vertex::VertexRecord;

const BUILTIN: &str = include_str!("../data/cube.mesh");

/// Name of the cube part of the builtin table.
pub const CUBE: &str = "cube";

/// Name of the floor part of the builtin table.
pub const FLOOR: &str = "floor";

/// Named, contiguous range of vertices in a [`Mesh`].
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct MeshPart {
  /// Name of the part.
  pub name: String,
  /// Index of the first vertex.
  pub start: usize,
  /// Number of vertices.
  pub count: usize,
}

/// An immutable mesh table.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
  vertices: Vec<VertexRecord>,
  parts: Vec<MeshPart>,
}

impl Mesh {
  /// The embedded cube + floor table.
  pub fn builtin() -> Result<Self, MeshError> {
    BUILTIN.parse()
  }

  /// Read a mesh table from a file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, MeshError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|source| MeshError::Read {
      path: path.to_owned(),
      source,
    })?;

    src.parse()
  }

  /// All the vertices, in upload order.
  pub fn vertices(&self) -> &[VertexRecord] {
    &self.vertices
  }

  /// All the parts, in declaration order.
  pub fn parts(&self) -> &[MeshPart] {
    &self.parts
  }

  /// Look up a part by name.
  pub fn part(&self, name: &str) -> Option<&MeshPart> {
    self.parts.iter().find(|part| part.name == name)
  }
}

impl FromStr for Mesh {
  type Err = MeshError;

  fn from_str(src: &str) -> Result<Self, Self::Err> {
    let mut vertices = Vec::new();
    let mut parts: Vec<MeshPart> = Vec::new();

    for (i, line) in src.lines().enumerate() {
      let line_nb = i + 1;
      let line = match line.find('#') {
        Some(comment) => &line[..comment],
        None => line,
      }
      .trim();

      if line.is_empty() {
        continue;
      }

      if let Some(name) = line.strip_prefix('@') {
        let name = name.trim();

        if name.is_empty() || name.contains(char::is_whitespace) {
          return Err(MeshError::parse(line_nb, "invalid part name"));
        }

        if parts.iter().any(|part| part.name == name) {
          return Err(MeshError::parse(line_nb, format!("duplicate part {}", name)));
        }

        close_part(&mut parts, vertices.len(), line_nb)?;
        parts.push(MeshPart {
          name: name.to_owned(),
          start: vertices.len(),
          count: 0,
        });

        continue;
      }

      if parts.is_empty() {
        return Err(MeshError::parse(line_nb, "vertex outside of a part"));
      }

      vertices.push(parse_vertex(line, line_nb)?);
    }

    close_part(&mut parts, vertices.len(), src.lines().count())?;

    if vertices.is_empty() {
      return Err(MeshError::Empty);
    }

    Ok(Mesh { vertices, parts })
  }
}

// Set the vertex count of the last opened part, refusing empty parts.
fn close_part(parts: &mut [MeshPart], end: usize, line_nb: usize) -> Result<(), MeshError> {
  if let Some(part) = parts.last_mut() {
    part.count = end - part.start;

    if part.count == 0 {
      return Err(MeshError::parse(line_nb, format!("empty part {}", part.name)));
    }
  }

  Ok(())
}

fn parse_vertex(line: &str, line_nb: usize) -> Result<VertexRecord, MeshError> {
  let mut components = [0.; 8];
  let mut n = 0;

  for word in line.split_whitespace() {
    if n == components.len() {
      return Err(MeshError::parse(line_nb, "too many components, expected 8"));
    }

    components[n] = word
      .parse()
      .map_err(|_| MeshError::parse(line_nb, format!("invalid number {}", word)))?;
    n += 1;
  }

  if n != components.len() {
    return Err(MeshError::parse(
      line_nb,
      format!("expected 8 components, got {}", n),
    ));
  }

  Ok(VertexRecord::from_components(components))
}

/// Errors that might happen when loading a mesh table.
#[derive(Debug)]
pub enum MeshError {
  /// The file could not be read.
  Read {
    /// Path of the file.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },
  /// Malformed line.
  Parse {
    /// Line number, starting at 1.
    line: usize,
    /// What is wrong with it.
    reason: String,
  },
  /// The table has no vertex.
  Empty,
}

impl MeshError {
  fn parse(line: usize, reason: impl Into<String>) -> Self {
    MeshError::Parse {
      line,
      reason: reason.into(),
    }
  }
}

impl fmt::Display for MeshError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      MeshError::Read { path, source } => {
        write!(f, "cannot read mesh {}: {}", path.display(), source)
      }
      MeshError::Parse { line, reason } => write!(f, "mesh line {}: {}", line, reason),
      MeshError::Empty => f.write_str("mesh has no vertex"),
    }
  }
}

impl error::Error for MeshError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      MeshError::Read { source, .. } => Some(source),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn builtin_table() {
    let mesh = Mesh::builtin().unwrap();

    assert_eq!(mesh.vertices().len(), 42);
    assert_eq!(
      mesh.part(CUBE),
      Some(&MeshPart {
        name: CUBE.to_owned(),
        start: 0,
        count: 36
      })
    );
    assert_eq!(
      mesh.part(FLOOR),
      Some(&MeshPart {
        name: FLOOR.to_owned(),
        start: 36,
        count: 6
      })
    );
  }

  #[test]
  fn builtin_cube_is_closed() {
    let mesh = Mesh::builtin().unwrap();
    let cube = mesh.part(CUBE).unwrap();

    // every face is made of two triangles lying on one of the six planes of the unit cube
    for face in mesh.vertices()[cube.start..cube.start + cube.count].chunks(6) {
      let axis = (0..3)
        .find(|&a| face.iter().all(|v| v.position[a] == face[0].position[a]))
        .expect("planar face");
      assert_eq!(face[0].position[axis].abs(), 0.5);
    }
  }

  #[test]
  fn comments_and_parts() {
    let mesh: Mesh = "# header\n\
                      @tri # trailing comment\n\
                      0 0 0  1 0 0  0 0\n\
                      1 0 0  0 1 0  1 0\n\
                      \n\
                      0 1 0  0 0 1  0 1\n"
      .parse()
      .unwrap();

    assert_eq!(mesh.parts().len(), 1);
    assert_eq!(mesh.part("tri").map(|p| p.count), Some(3));
    assert_eq!(mesh.vertices()[1].color, [0., 1., 0.]);
    assert_eq!(mesh.vertices()[2].tex_coord, [0., 1.]);
  }

  #[test]
  fn vertex_outside_part() {
    let err = "0 0 0 0 0 0 0 0\n".parse::<Mesh>().unwrap_err();
    assert!(matches!(err, MeshError::Parse { line: 1, .. }));
  }

  #[test]
  fn wrong_component_count() {
    let err = "@a\n0 0 0 0 0 0 0 0\n0 0 0\n".parse::<Mesh>().unwrap_err();
    assert!(matches!(err, MeshError::Parse { line: 3, .. }));

    let err = "@a\n0 0 0 0 0 0 0 0 0\n".parse::<Mesh>().unwrap_err();
    assert!(matches!(err, MeshError::Parse { line: 2, .. }));
  }

  #[test]
  fn invalid_number() {
    let err = "@a\n0 0 zero 0 0 0 0 0\n".parse::<Mesh>().unwrap_err();
    match err {
      MeshError::Parse { line, reason } => {
        assert_eq!(line, 2);
        assert!(reason.contains("zero"));
      }
      e => panic!("unexpected error: {}", e),
    }
  }

  #[test]
  fn empty_and_duplicate_parts() {
    let err = "@a\n@b\n0 0 0 0 0 0 0 0\n".parse::<Mesh>().unwrap_err();
    assert!(matches!(err, MeshError::Parse { line: 2, .. }));

    let err = "@a\n0 0 0 0 0 0 0 0\n@a\n0 0 0 0 0 0 0 0\n"
      .parse::<Mesh>()
      .unwrap_err();
    assert!(matches!(err, MeshError::Parse { line: 3, .. }));

    assert!(matches!("# nothing\n".parse::<Mesh>(), Err(MeshError::Empty)));
  }

  #[test]
  fn missing_file() {
    let err = Mesh::load("/nonexistent/table.mesh").unwrap_err();
    assert!(matches!(err, MeshError::Read { .. }));
  }
}
