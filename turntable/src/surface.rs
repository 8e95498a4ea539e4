//! Windowing abstraction.
//!
//! turntable doesn’t open windows itself: creating a window along with its GPU context is
//! tightly related to the platform you target. Crates such as `turntable-glfw` implement the
//! [`Surface`] trait, which is all the render loop needs:
//!
//! - Knowing whether the close signal has been received.
//! - Presenting the back buffer.
//! - Polling the system events.
//! - Reading a monotonic clock, in seconds.
//!
//! [`WindowOpt`] gathers the hints a surface can be created with.

use crate::context::RenderContext;

/// Dimension of a window, in screen coordinates.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowDim {
  /// Width.
  pub width: u32,
  /// Height.
  pub height: u32,
}

impl WindowDim {
  /// Width divided by height.
  pub fn aspect_ratio(&self) -> f32 {
    self.width as f32 / self.height.max(1) as f32
  }
}

/// Different window options.
///
/// Feel free to look at the different methods available to tweak the options. You may want to start
/// with `default()` though.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WindowOpt {
  dim: WindowDim,
  num_samples: Option<u32>,
  vsync: bool,
}

impl Default for WindowOpt {
  /// Defaults:
  ///
  /// - `dim` set to 640×480.
  /// - `num_samples` set to `None`.
  /// - `vsync` enabled.
  fn default() -> Self {
    WindowOpt {
      dim: WindowDim {
        width: 640,
        height: 480,
      },
      num_samples: None,
      vsync: true,
    }
  }
}

impl WindowOpt {
  /// Set the dimension of the window.
  #[inline]
  pub fn set_dim(self, dim: WindowDim) -> Self {
    WindowOpt { dim, ..self }
  }

  /// Get the dimension of the window.
  #[inline]
  pub fn dim(&self) -> WindowDim {
    self.dim
  }

  /// Set the number of samples to use for multisampling.
  ///
  /// Pass `None` to disable multisampling.
  #[inline]
  pub fn set_num_samples<S>(self, samples: S) -> Self
  where
    S: Into<Option<u32>>,
  {
    WindowOpt {
      num_samples: samples.into(),
      ..self
    }
  }

  /// Get the number of samples to use in multisampling, if any.
  #[inline]
  pub fn num_samples(&self) -> Option<u32> {
    self.num_samples
  }

  /// Wait for the vertical blank when presenting.
  #[inline]
  pub fn set_vsync(self, vsync: bool) -> Self {
    WindowOpt { vsync, ..self }
  }

  /// Whether presenting waits for the vertical blank.
  #[inline]
  pub fn vsync(&self) -> bool {
    self.vsync
  }
}

/// Rendering surface.
///
/// A surface owns the thread-affine GPU context and is the only way to reach its backend.
pub trait Surface: RenderContext {
  /// Whether the close signal has been received.
  fn should_close(&self) -> bool;

  /// Present the back buffer.
  fn swap_buffers(&mut self);

  /// Process pending system events without blocking.
  fn poll_events(&mut self);

  /// Seconds elapsed since the surface was created.
  fn time(&self) -> f64;

  /// Size of the surface’s framebuffer.
  fn size(&self) -> [u32; 2];

  /// Framebuffer width divided by its height.
  ///
  /// # Defaults
  ///
  /// Defaults to `.size()[0] / .size()[1]`.
  fn aspect_ratio(&self) -> f32 {
    let [w, h] = self.size();
    WindowDim {
      width: w,
      height: h,
    }
    .aspect_ratio()
  }
}
