use gl::types::*;

use crate::gl33::state::DepthTest;
use crate::gl33::GL33;
use turntable::backend::framebuffer::{Framebuffer, FramebufferError};

// GL_CONTEXT_LOST (KHR_robustness, core since 4.5)
const CONTEXT_LOST: GLenum = 0x0507;

// upper bound on queued errors drained at once; a lost context may report errors forever
const MAX_ERRORS: usize = 16;

impl Framebuffer for GL33 {
  fn set_clear_color(&mut self, rgba: [f32; 4]) {
    unsafe { self.state.borrow_mut().set_clear_color(rgba) }
  }

  fn set_depth_test(&mut self, enabled: bool) {
    let depth_test = if enabled {
      DepthTest::On
    } else {
      DepthTest::Off
    };

    unsafe { self.state.borrow_mut().set_depth_test(depth_test) }
  }

  fn clear(&mut self) {
    unsafe { gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT) }
  }

  fn check(&mut self) -> Result<(), FramebufferError> {
    let errors = unsafe { take_errors() };
    errors_to_result(&errors)
  }
}

/// Pop the error flags raised so far, oldest first.
pub(crate) unsafe fn take_errors() -> Vec<GLenum> {
  let mut errors = Vec::new();

  while errors.len() < MAX_ERRORS {
    match gl::GetError() {
      gl::NO_ERROR => break,
      err => errors.push(err),
    }
  }

  errors
}

/// A lost context wins over any other error; otherwise the oldest one is reported.
pub(crate) fn errors_to_result(errors: &[GLenum]) -> Result<(), FramebufferError> {
  if errors.contains(&CONTEXT_LOST) {
    return Err(FramebufferError::ContextLost);
  }

  match errors.first() {
    Some(&err) => Err(FramebufferError::Backend(describe(err))),
    None => Ok(()),
  }
}

pub(crate) fn describe(err: GLenum) -> String {
  format!("{} (0x{:04x})", error_name(err), err)
}

fn error_name(err: GLenum) -> &'static str {
  match err {
    gl::INVALID_ENUM => "invalid enum",
    gl::INVALID_VALUE => "invalid value",
    gl::INVALID_OPERATION => "invalid operation",
    gl::INVALID_FRAMEBUFFER_OPERATION => "invalid framebuffer operation",
    gl::OUT_OF_MEMORY => "out of memory",
    CONTEXT_LOST => "context lost",
    _ => "unknown error",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_error() {
    assert_eq!(errors_to_result(&[]), Ok(()));
  }

  #[test]
  fn oldest_error_is_reported() {
    assert_eq!(
      errors_to_result(&[gl::INVALID_VALUE, gl::INVALID_OPERATION]),
      Err(FramebufferError::Backend("invalid value (0x0501)".to_owned()))
    );
  }

  #[test]
  fn lost_context_wins() {
    assert_eq!(
      errors_to_result(&[gl::INVALID_OPERATION, CONTEXT_LOST]),
      Err(FramebufferError::ContextLost)
    );
  }
}
