//! [GLFW](https://crates.io/crates/glfw) backend for turntable.

#![deny(missing_docs)]

use glfw::{
  Action, Context as _, Glfw, InitError, Key, SwapInterval, Window, WindowEvent, WindowMode,
};
use std::error;
use std::fmt;
use std::os::raw::c_void;
use std::sync::mpsc::Receiver;
use turntable::context::RenderContext;
use turntable::surface::{Surface, WindowOpt};
pub use turntable_gl::gl33::StateQueryError;
use turntable_gl::GL33;

/// Error that can be risen while creating a surface.
#[non_exhaustive]
#[derive(Debug)]
pub enum GlfwSurfaceError {
  /// Initialization of the surface went wrong.
  ///
  /// This variant exposes a **glfw** error for further information about what went wrong.
  InitError(InitError),

  /// The window (and its OpenGL 3.3 context) could not be created.
  WindowCreation,

  /// The graphics state is not available.
  ///
  /// This error is generated when the initialization code is called on a thread on which the
  /// graphics state has already been acquired.
  GraphicsStateError(StateQueryError),
}

impl fmt::Display for GlfwSurfaceError {
  fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
    match *self {
      GlfwSurfaceError::InitError(ref e) => write!(f, "initialization error: {}", e),
      GlfwSurfaceError::WindowCreation => f.write_str("failed to create window"),
      GlfwSurfaceError::GraphicsStateError(ref e) => {
        write!(f, "failed to get graphics state: {}", e)
      }
    }
  }
}

impl From<InitError> for GlfwSurfaceError {
  fn from(e: InitError) -> Self {
    GlfwSurfaceError::InitError(e)
  }
}

impl error::Error for GlfwSurfaceError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      GlfwSurfaceError::InitError(e) => Some(e),
      GlfwSurfaceError::WindowCreation => None,
      GlfwSurfaceError::GraphicsStateError(e) => Some(e),
    }
  }
}

/// GLFW surface.
///
/// A window along with its OpenGL 3.3 core context, current on the thread that created it. The
/// close signal is raised when the window is asked to close or when _Escape_ is released.
#[derive(Debug)]
pub struct GlfwSurface {
  // OpenGL 3.3 state; declared first so that it goes away before the context does
  gl: GL33,

  /// Wrapped GLFW window.
  pub window: Window,

  /// Wrapped GLFW events queue.
  pub events_rx: Receiver<(f64, WindowEvent)>,
}

impl GlfwSurface {
  /// Initialize GLFW, open a window and create an OpenGL 3.3 core context in it.
  pub fn new_gl33(title: &str, opt: WindowOpt) -> Result<Self, GlfwSurfaceError> {
    let mut glfw = glfw::init(glfw::LOG_ERRORS)?;

    // OpenGL hints
    glfw.window_hint(glfw::WindowHint::OpenGlProfile(
      glfw::OpenGlProfileHint::Core,
    ));
    glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
    glfw.window_hint(glfw::WindowHint::ContextVersionMajor(3));
    glfw.window_hint(glfw::WindowHint::ContextVersionMinor(3));
    glfw.window_hint(glfw::WindowHint::Samples(opt.num_samples()));

    let dim = opt.dim();
    let (mut window, events_rx) = create_window(&mut glfw, title, dim.width, dim.height)?;

    window.make_current();
    window.set_close_polling(true);
    window.set_key_polling(true);
    window.set_framebuffer_size_polling(true);

    let interval = if opt.vsync() {
      SwapInterval::Sync(1)
    } else {
      SwapInterval::None
    };
    window.glfw.set_swap_interval(interval);

    // init OpenGL
    gl::load_with(|s| window.get_proc_address(s) as *const c_void);

    let gl = GL33::new().map_err(GlfwSurfaceError::GraphicsStateError)?;
    log::info!("opened {}×{} window “{}”", dim.width, dim.height, title);

    Ok(GlfwSurface {
      gl,
      window,
      events_rx,
    })
  }
}

fn create_window(
  glfw: &mut Glfw,
  title: &str,
  width: u32,
  height: u32,
) -> Result<(Window, Receiver<(f64, WindowEvent)>), GlfwSurfaceError> {
  glfw
    .create_window(width, height, title, WindowMode::Windowed)
    .ok_or(GlfwSurfaceError::WindowCreation)
}

impl RenderContext for GlfwSurface {
  type Backend = GL33;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.gl
  }
}

impl Surface for GlfwSurface {
  fn should_close(&self) -> bool {
    self.window.should_close()
  }

  fn swap_buffers(&mut self) {
    self.window.swap_buffers();
  }

  fn poll_events(&mut self) {
    self.window.glfw.poll_events();

    for (_, event) in glfw::flush_messages(&self.events_rx) {
      match event {
        WindowEvent::Close | WindowEvent::Key(Key::Escape, _, Action::Release, _) => {
          log::debug!("close requested");
          self.window.set_should_close(true);
        }

        WindowEvent::FramebufferSize(width, height) => {
          log::debug!("framebuffer resized to {}×{}", width, height);
          unsafe { gl::Viewport(0, 0, width, height) };
        }

        _ => (),
      }
    }
  }

  fn time(&self) -> f64 {
    self.window.glfw.get_time()
  }

  fn size(&self) -> [u32; 2] {
    let (w, h) = self.window.get_framebuffer_size();
    [w.max(0) as u32, h.max(0) as u32]
  }
}
