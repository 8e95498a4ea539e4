//! OpenGL 3.3 backend.
//!
//! This module implements an OpenGL 3.3 backend for turntable. The backend type is [`GL33`].

mod framebuffer;
mod shader;
mod state;
mod tess;
mod texture;

pub use self::shader::{Program, Stage};
pub use self::state::StateQueryError;
pub use self::tess::VertexArray;
pub use self::texture::Texture2D;

use self::state::GLState;
use gl::types::*;
use std::cell::RefCell;
use std::ffi::CStr;
use std::rc::Rc;

/// An OpenGL 3.3 backend.
///
/// This type is to be used as a turntable backend type. It implements the whole backend API.
#[derive(Debug)]
pub struct GL33 {
  pub(crate) state: Rc<RefCell<GLState>>,
}

impl GL33 {
  /// Create a new OpenGL 3.3 backend.
  ///
  /// Only one backend can exist per thread at a time; creating a second one fails with
  /// [`StateQueryError::UnavailableGLState`].
  pub fn new() -> Result<Self, StateQueryError> {
    let state = GLState::new()?;

    log::info!(
      "OpenGL {} on {} ({})",
      gl_string(gl::VERSION),
      gl_string(gl::RENDERER),
      gl_string(gl::VENDOR)
    );

    Ok(GL33 {
      state: Rc::new(RefCell::new(state)),
    })
  }
}

fn gl_string(name: GLenum) -> String {
  unsafe {
    let ptr = gl::GetString(name);

    if ptr.is_null() {
      "unknown".to_owned()
    } else {
      CStr::from_ptr(ptr as *const _).to_string_lossy().into_owned()
    }
  }
}
