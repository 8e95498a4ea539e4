//! Shader backend.

use crate::shader::{ProgramError, StageError, StageType, Uniform};

/// Shader stages and programs.
///
/// Stage and program representations are expected to release their GPU-side objects when
/// dropped.
pub trait Shader {
  /// Backend representation of a compiled shader stage.
  type StageRepr;

  /// Backend representation of a linked shader program.
  type ProgramRepr;

  /// Compile a shader stage of the given type.
  fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError>;

  /// Link a vertex and a fragment stage into a program.
  fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError>;

  /// Make a program the current one.
  fn use_program(&mut self, program: &Self::ProgramRepr);

  /// Index of an active uniform, if any.
  fn uniform_index(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<i32>;

  /// Location of an active vertex attribute, if any.
  fn attrib_index(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<u32>;
}

/// Types that can be sent to the current program as uniform values.
pub trait Uniformable<T>: Shader {
  /// Update a uniform of the current program.
  fn update(&mut self, uniform: &Uniform<T>, value: T);
}
