//! Shader API.
//!
//! A shader program is made of two stages: a vertex shader and a fragment shader. Each stage is
//! compiled independently from its [`ShaderSource`], then both are linked into a [`Program`]. The
//! whole sequence is strictly linear and performed by [`ProgramBuilder`]:
//!
//! ```ignore
//! let program = ProgramBuilder::new(&mut context).from_files("vertex.glsl", "fragment.glsl")?;
//! ```
//!
//! Compilation and link failures carry the diagnostic text reported by the driver. Intermediate
//! stage objects are released as soon as the link step is done, whatever its outcome.

pub mod types;

use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::backend::shader::{Shader, Uniformable};
use crate::context::RenderContext;

/// A shader stage type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum StageType {
  /// Vertex shader.
  VertexShader,
  /// Fragment shader.
  FragmentShader,
}

impl fmt::Display for StageType {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageType::VertexShader => f.write_str("vertex shader"),
      StageType::FragmentShader => f.write_str("fragment shader"),
    }
  }
}

/// Errors that shader stages can emit.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum StageError {
  /// Occurs when a shader fails to compile.
  ///
  /// The `String` is the diagnostic reported by the driver.
  CompilationFailed(StageType, String),
}

impl StageError {
  /// Occurs when a shader fails to compile.
  pub fn compilation_failed(ty: StageType, reason: impl Into<String>) -> Self {
    StageError::CompilationFailed(ty, reason.into())
  }

  /// Type of the stage that failed.
  pub fn stage_type(&self) -> StageType {
    match *self {
      StageError::CompilationFailed(ty, _) => ty,
    }
  }
}

impl fmt::Display for StageError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StageError::CompilationFailed(ref ty, ref r) => write!(f, "{} compilation error: {}", ty, r),
    }
  }
}

impl error::Error for StageError {}

/// Errors that a [`Program`] can generate.
#[derive(Debug)]
pub enum ProgramError {
  /// A shader stage failed to compile.
  StageError(StageError),
  /// Program link failed. You can inspect the reason by looking at the contained `String`.
  LinkFailed(String),
  /// A shader source file could not be read.
  Read {
    /// Path of the file.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },
}

impl ProgramError {
  /// Program link failed.
  pub fn link_failed(reason: impl Into<String>) -> Self {
    ProgramError::LinkFailed(reason.into())
  }
}

impl fmt::Display for ProgramError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      ProgramError::StageError(ref e) => write!(f, "shader program has stage error: {}", e),

      ProgramError::LinkFailed(ref s) => write!(f, "shader program failed to link: {}", s),

      ProgramError::Read { ref path, ref source } => {
        write!(f, "cannot read shader source {}: {}", path.display(), source)
      }
    }
  }
}

impl error::Error for ProgramError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      ProgramError::StageError(e) => Some(e),
      ProgramError::LinkFailed(_) => None,
      ProgramError::Read { source, .. } => Some(source),
    }
  }
}

impl From<StageError> for ProgramError {
  fn from(e: StageError) -> Self {
    ProgramError::StageError(e)
  }
}

/// Warnings related to uniform issues.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum UniformWarning {
  /// Inactive uniform (not in use / no participation to the final output in shaders).
  Inactive(String),
}

impl UniformWarning {
  /// Create an inactive uniform warning.
  pub fn inactive<N>(name: N) -> Self
  where
    N: Into<String>,
  {
    UniformWarning::Inactive(name.into())
  }
}

impl fmt::Display for UniformWarning {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      UniformWarning::Inactive(ref s) => write!(f, "inactive {} uniform", s),
    }
  }
}

impl error::Error for UniformWarning {}

/// Warnings related to vertex attributes issues.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum VertexAttribWarning {
  /// Inactive vertex attribute (not read).
  Inactive(String),
}

impl fmt::Display for VertexAttribWarning {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      VertexAttribWarning::Inactive(ref s) => write!(f, "inactive {} vertex attribute", s),
    }
  }
}

impl error::Error for VertexAttribWarning {}

/// A typed uniform of the current program.
#[derive(Debug)]
pub struct Uniform<T>
where
  T: ?Sized,
{
  index: i32,
  _t: PhantomData<*const T>,
}

impl<T> Uniform<T>
where
  T: ?Sized,
{
  /// Wrap a backend uniform index.
  pub fn new(index: i32) -> Self {
    Uniform {
      index,
      _t: PhantomData,
    }
  }

  /// Backend index of the uniform.
  pub fn index(&self) -> i32 {
    self.index
  }
}

/// Source text of a single shader stage.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShaderSource {
  ty: StageType,
  src: String,
}

impl ShaderSource {
  /// Wrap some source text.
  pub fn new(ty: StageType, src: impl Into<String>) -> Self {
    ShaderSource {
      ty,
      src: src.into(),
    }
  }

  /// Read the source text of a stage from a file.
  pub fn from_file(ty: StageType, path: impl AsRef<Path>) -> Result<Self, ProgramError> {
    let path = path.as_ref();
    let src = fs::read_to_string(path).map_err(|source| ProgramError::Read {
      path: path.to_owned(),
      source,
    })?;

    Ok(ShaderSource::new(ty, src))
  }

  /// Stage this source is meant for.
  pub fn ty(&self) -> StageType {
    self.ty
  }

  /// Source text.
  pub fn as_str(&self) -> &str {
    &self.src
  }
}

/// A linked shader program.
///
/// A program is never re-linked nor mutated once built. Its GPU object is released when it is
/// dropped.
pub struct Program<B>
where
  B: Shader,
{
  repr: B::ProgramRepr,
}

impl<B> Program<B>
where
  B: Shader,
{
  /// Backend representation of the program.
  pub fn repr(&self) -> &B::ProgramRepr {
    &self.repr
  }

  /// Look up an active uniform by name.
  pub fn ask_uniform<T>(&self, backend: &mut B, name: &str) -> Result<Uniform<T>, UniformWarning>
  where
    B: Uniformable<T>,
  {
    backend
      .uniform_index(&self.repr, name)
      .map(Uniform::new)
      .ok_or_else(|| UniformWarning::inactive(name))
  }

  /// Look up an active vertex attribute by name.
  pub fn attrib_index(&self, backend: &mut B, name: &str) -> Result<u32, VertexAttribWarning> {
    backend
      .attrib_index(&self.repr, name)
      .ok_or_else(|| VertexAttribWarning::Inactive(name.to_owned()))
  }
}

/// Compile → compile → link.
pub struct ProgramBuilder<'a, C>
where
  C: ?Sized,
{
  ctx: &'a mut C,
}

impl<'a, C> ProgramBuilder<'a, C>
where
  C: ?Sized + RenderContext,
  C::Backend: Shader,
{
  /// Create a program builder on a render context.
  pub fn new(ctx: &'a mut C) -> Self {
    ProgramBuilder { ctx }
  }

  /// Build a program out of a vertex and a fragment source.
  ///
  /// Both sources must be non-empty and given for the right stage; either problem is reported as
  /// a compilation failure of the faulty stage.
  pub fn from_sources(
    self,
    vertex: &ShaderSource,
    fragment: &ShaderSource,
  ) -> Result<Program<C::Backend>, ProgramError> {
    let backend = self.ctx.backend();

    let vs = compile(backend, StageType::VertexShader, vertex)?;
    let fs = compile(backend, StageType::FragmentShader, fragment)?;

    // both stages are dropped, hence released, right after linking, whatever the outcome
    let repr = backend.new_program(&vs, &fs)?;
    log::debug!("shader program linked");

    Ok(Program { repr })
  }

  /// Build a program out of two strings.
  pub fn from_strings(
    self,
    vertex: &str,
    fragment: &str,
  ) -> Result<Program<C::Backend>, ProgramError> {
    self.from_sources(
      &ShaderSource::new(StageType::VertexShader, vertex),
      &ShaderSource::new(StageType::FragmentShader, fragment),
    )
  }

  /// Build a program out of two source files.
  pub fn from_files(
    self,
    vertex: impl AsRef<Path>,
    fragment: impl AsRef<Path>,
  ) -> Result<Program<C::Backend>, ProgramError> {
    let vertex = ShaderSource::from_file(StageType::VertexShader, vertex)?;
    let fragment = ShaderSource::from_file(StageType::FragmentShader, fragment)?;
    self.from_sources(&vertex, &fragment)
  }
}

fn compile<B>(backend: &mut B, ty: StageType, source: &ShaderSource) -> Result<B::StageRepr, StageError>
where
  B: ?Sized + Shader,
{
  if source.ty() != ty {
    return Err(StageError::compilation_failed(
      ty,
      format!("expected {} source, got {} source", ty, source.ty()),
    ));
  }

  if source.as_str().trim().is_empty() {
    return Err(StageError::compilation_failed(ty, "empty source"));
  }

  log::debug!("compiling {}", ty);
  backend.new_stage(ty, source.as_str())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::headless::Headless;

  const VS: &str = "#version 330 core\n\
                    in vec3 position;\n\
                    out vec3 v_color;\n\
                    uniform mat4 model;\n\
                    void main() {\n\
                      v_color = position;\n\
                      gl_Position = model * vec4(position, 1.);\n\
                    }\n";

  const FS: &str = "#version 330 core\n\
                    in vec3 v_color;\n\
                    out vec4 frag;\n\
                    void main() {\n\
                      frag = vec4(v_color, 1.);\n\
                    }\n";

  #[test]
  fn valid_pair_builds() {
    let mut headless = Headless::new();
    let program = ProgramBuilder::new(&mut headless).from_strings(VS, FS);
    assert!(program.is_ok());
  }

  #[test]
  fn stages_released_after_link() {
    let mut headless = Headless::new();
    let _program = ProgramBuilder::new(&mut headless)
      .from_strings(VS, FS)
      .unwrap();

    assert_eq!(headless.live_stages(), 0);
    assert_eq!(headless.live_programs(), 1);
  }

  #[test]
  fn empty_source_is_a_compilation_error() {
    let mut headless = Headless::new();
    let err = ProgramBuilder::new(&mut headless)
      .from_strings(VS, "  \n\t")
      .err()
      .unwrap();

    match err {
      ProgramError::StageError(StageError::CompilationFailed(StageType::FragmentShader, reason)) => {
        assert!(!reason.is_empty())
      }
      e => panic!("unexpected error: {}", e),
    }
  }

  #[test]
  fn swapped_sources_are_rejected() {
    let mut headless = Headless::new();
    let vertex = ShaderSource::new(StageType::FragmentShader, FS);
    let fragment = ShaderSource::new(StageType::FragmentShader, FS);
    let err = ProgramBuilder::new(&mut headless)
      .from_sources(&vertex, &fragment)
      .err()
      .unwrap();

    match err {
      ProgramError::StageError(e) => assert_eq!(e.stage_type(), StageType::VertexShader),
      e => panic!("unexpected error: {}", e),
    }
  }

  #[test]
  fn failed_link_releases_everything() {
    let mut headless = Headless::new();
    let fs = "in vec3 v_normal;\nout vec4 frag;\nvoid main() { frag = vec4(v_normal, 1.); }\n";
    let err = ProgramBuilder::new(&mut headless)
      .from_strings(VS, fs)
      .err()
      .unwrap();

    assert!(matches!(err, ProgramError::LinkFailed(ref log) if log.contains("v_normal")));
    assert_eq!(headless.live_stages(), 0);
    assert_eq!(headless.live_programs(), 0);
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let mut headless = Headless::new();
    let err = ProgramBuilder::new(&mut headless)
      .from_files("/nonexistent/vertex.glsl", "/nonexistent/fragment.glsl")
      .err()
      .unwrap();

    match err {
      ProgramError::Read { path, .. } => assert!(path.ends_with("vertex.glsl")),
      e => panic!("unexpected error: {}", e),
    }
  }

  #[test]
  fn inactive_uniform_and_attribute() {
    let mut headless = Headless::new();
    let program = ProgramBuilder::new(&mut headless)
      .from_strings(VS, FS)
      .unwrap();

    assert!(program.ask_uniform::<types::Mat44>(&mut headless, "model").is_ok());
    assert_eq!(
      program
        .ask_uniform::<types::Mat44>(&mut headless, "view")
        .err(),
      Some(UniformWarning::inactive("view"))
    );
    assert_eq!(program.attrib_index(&mut headless, "position"), Ok(0));
    assert_eq!(
      program.attrib_index(&mut headless, "texCoord"),
      Err(VertexAttribWarning::Inactive("texCoord".to_owned()))
    );
  }
}
