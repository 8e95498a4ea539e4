//! Framebuffer backend.
//!
//! Only the back buffer is supported: there is no offscreen rendering.

use std::error;
use std::fmt;

/// Back buffer state and clearing.
pub trait Framebuffer {
  /// Set the color the color buffer is cleared with.
  fn set_clear_color(&mut self, rgba: [f32; 4]);

  /// Enable or disable depth testing.
  fn set_depth_test(&mut self, enabled: bool);

  /// Clear both the color and the depth buffers.
  fn clear(&mut self);

  /// Report any failure that happened since the last call.
  fn check(&mut self) -> Result<(), FramebufferError>;
}

/// Framebuffer errors.
///
/// All of them are unrecoverable.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FramebufferError {
  /// The graphics context is gone.
  ContextLost,
  /// The backend reported an error.
  Backend(String),
}

impl fmt::Display for FramebufferError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match *self {
      FramebufferError::ContextLost => f.write_str("graphics context lost"),
      FramebufferError::Backend(ref e) => write!(f, "backend error: {}", e),
    }
  }
}

impl error::Error for FramebufferError {}
