//! Graphics state.
//!
//! [`GLState`] mirrors the bits of the context the backend changes, so that setting something to
//! the value it already has doesn’t reach the driver. It is also the thread token: a single one
//! can be alive per thread.

use gl::types::*;
use std::cell::Cell;
use std::error;
use std::fmt;
use std::marker::PhantomData;

thread_local!(static STATE_TAKEN: Cell<bool> = Cell::new(false));

/// A value mirrored from the context.
#[derive(Debug)]
struct Cached<T>(T);

impl<T> Cached<T>
where
  T: PartialEq,
{
  /// Record `value`; `true` if the context has to be told about it.
  fn replace(&mut self, value: T) -> bool {
    if self.0 == value {
      false
    } else {
      self.0 = value;
      true
    }
  }
}

/// Whether a binding may be skipped when the mirror says it is already in place.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Bind {
  Forced,
  Cached,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum DepthTest {
  On,
  Off,
}

#[derive(Debug)]
pub(crate) struct GLState {
  _a: PhantomData<*const ()>, // !Send and !Sync

  clear_color: Cached<[GLfloat; 4]>,
  depth_test: Cached<DepthTest>,

  texture_unit: Cached<u32>,
  // 2D texture bound on each unit, indexed by unit
  textures: Vec<GLuint>,

  array_buffer: Cached<GLuint>,
  vertex_array: Cached<GLuint>,
  program: Cached<GLuint>,
}

impl GLState {
  /// Take the thread token and read the current context.
  pub(crate) fn new() -> Result<Self, StateQueryError> {
    if STATE_TAKEN.with(|taken| taken.replace(true)) {
      return Err(StateQueryError::UnavailableGLState);
    }

    // the token goes back if reading the context fails
    unsafe { Self::from_context() }.map_err(|e| {
      STATE_TAKEN.with(|taken| taken.set(false));
      e
    })
  }

  unsafe fn from_context() -> Result<Self, StateQueryError> {
    let mut clear_color = [0.; 4];
    gl::GetFloatv(gl::COLOR_CLEAR_VALUE, clear_color.as_mut_ptr());

    let depth_test = match gl::IsEnabled(gl::DEPTH_TEST) {
      gl::TRUE => DepthTest::On,
      gl::FALSE => DepthTest::Off,
      state => return Err(StateQueryError::UnknownDepthTestState(state)),
    };

    let texture_unit = get_integer(gl::ACTIVE_TEXTURE) as GLenum - gl::TEXTURE0;

    Ok(GLState {
      _a: PhantomData,
      clear_color: Cached(clear_color),
      depth_test: Cached(depth_test),
      texture_unit: Cached(texture_unit),
      textures: Vec::new(),
      array_buffer: Cached(get_integer(gl::ARRAY_BUFFER_BINDING) as GLuint),
      vertex_array: Cached(get_integer(gl::VERTEX_ARRAY_BINDING) as GLuint),
      program: Cached(get_integer(gl::CURRENT_PROGRAM) as GLuint),
    })
  }

  pub(crate) unsafe fn set_clear_color(&mut self, rgba: [GLfloat; 4]) {
    if self.clear_color.replace(rgba) {
      gl::ClearColor(rgba[0], rgba[1], rgba[2], rgba[3]);
    }
  }

  pub(crate) unsafe fn set_depth_test(&mut self, depth_test: DepthTest) {
    if self.depth_test.replace(depth_test) {
      match depth_test {
        DepthTest::On => gl::Enable(gl::DEPTH_TEST),
        DepthTest::Off => gl::Disable(gl::DEPTH_TEST),
      }
    }
  }

  pub(crate) unsafe fn set_texture_unit(&mut self, unit: u32) {
    if self.texture_unit.replace(unit) {
      gl::ActiveTexture(gl::TEXTURE0 + unit);
    }
  }

  /// Bind a 2D texture to the current texture unit.
  pub(crate) unsafe fn bind_texture(&mut self, handle: GLuint) {
    let unit = self.texture_unit.0 as usize;

    if unit >= self.textures.len() {
      // unknown units are assumed to hold whatever; force the first binding
      self.textures.resize(unit + 1, GLuint::MAX);
    }

    if self.textures[unit] != handle {
      gl::BindTexture(gl::TEXTURE_2D, handle);
      self.textures[unit] = handle;
    }
  }

  /// Forget a texture about to be deleted.
  pub(crate) fn unbind_texture(&mut self, handle: GLuint) {
    for bound in self.textures.iter_mut().filter(|bound| **bound == handle) {
      *bound = 0;
    }
  }

  pub(crate) unsafe fn bind_array_buffer(&mut self, handle: GLuint, bind: Bind) {
    if self.array_buffer.replace(handle) || bind == Bind::Forced {
      gl::BindBuffer(gl::ARRAY_BUFFER, handle);
    }
  }

  pub(crate) unsafe fn unbind_buffer(&mut self, handle: GLuint) {
    if self.array_buffer.0 == handle {
      self.bind_array_buffer(0, Bind::Cached);
    }
  }

  pub(crate) unsafe fn bind_vertex_array(&mut self, handle: GLuint, bind: Bind) {
    if self.vertex_array.replace(handle) || bind == Bind::Forced {
      gl::BindVertexArray(handle);
    }
  }

  pub(crate) unsafe fn unbind_vertex_array(&mut self, handle: GLuint) {
    if self.vertex_array.0 == handle {
      self.bind_vertex_array(0, Bind::Cached);
    }
  }

  pub(crate) unsafe fn use_program(&mut self, handle: GLuint) {
    if self.program.replace(handle) {
      gl::UseProgram(handle);
    }
  }

  /// Forget a program about to be deleted; the next [`GLState::use_program`] always goes through.
  pub(crate) fn forget_program(&mut self, handle: GLuint) {
    if self.program.0 == handle {
      self.program.0 = 0;
    }
  }
}

impl Drop for GLState {
  fn drop(&mut self) {
    STATE_TAKEN.with(|taken| taken.set(false));
  }
}

/// An error that might happen when the context is queried.
#[non_exhaustive]
#[derive(Debug)]
pub enum StateQueryError {
  /// Another backend already owns the graphics state of this thread.
  UnavailableGLState,
  /// Corrupted depth test state.
  UnknownDepthTestState(GLboolean),
}

impl fmt::Display for StateQueryError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      StateQueryError::UnavailableGLState => write!(f, "unavailable graphics state"),
      StateQueryError::UnknownDepthTestState(ref s) => write!(f, "unknown depth test state: {}", s),
    }
  }
}

impl error::Error for StateQueryError {}

unsafe fn get_integer(name: GLenum) -> GLint {
  let mut value = 0;
  gl::GetIntegerv(name, &mut value);
  value
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn cached_value_changes_once() {
    let mut program = Cached(0);

    assert!(program.replace(3));
    assert!(!program.replace(3));
    assert!(program.replace(0));
  }
}
