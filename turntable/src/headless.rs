//! Headless backend.
//!
//! [`Headless`] implements every backend trait without any GPU. Instead of issuing commands, it
//! records them so that they can be inspected afterwards, which makes it suitable for tests and for
//! machines without a display. Shader sources are parsed (see [`glsl`]), which catches syntax
//! errors and gives the interface of each stage:
//!
//! - Linking fails if the fragment shader reads an input that the vertex shader doesn’t write.
//! - Attribute locations are handed out in declaration order of the vertex inputs.
//! - Every declared uniform is considered active.
//!
//! [`HeadlessSurface`] pairs a [`Headless`] backend with a synthetic clock.

pub mod glsl;

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::framebuffer::{Framebuffer, FramebufferError};
use crate::backend::shader::{Shader, Uniformable};
use crate::backend::tess::{Tess, TessError};
use crate::backend::texture::Texture;
use crate::context::RenderContext;
use crate::shader::types::{Mat44, TextureUnit};
use crate::shader::{ProgramError, StageError, StageType, Uniform};
use crate::surface::{Surface, WindowOpt};
use crate::texture::{Sampler, Texels, TextureError};
use crate::vertex::{VertexAttribBinding, VertexRecord};

/// A command recorded by the [`Headless`] backend.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
  /// A stage compiled successfully.
  CompileStage(StageType),
  /// A program linked successfully.
  LinkProgram(u32),
  /// A program was made current.
  UseProgram(u32),
  /// Vertices were uploaded, with the named attributes bound at the given locations.
  UploadVertices {
    count: usize,
    attribs: Vec<(&'static str, u32)>,
  },
  /// A texture was uploaded.
  UploadTexture {
    unit: u32,
    width: u32,
    height: u32,
    sampler: Sampler,
  },
  /// A matrix uniform of the current program was set.
  SetMat44 { name: String, value: Mat44 },
  /// A sampler uniform of the current program was set.
  SetTextureUnit { name: String, unit: u32 },
  SetClearColor([f32; 4]),
  SetDepthTest(bool),
  Clear,
  /// Triangles were drawn.
  Draw { start: usize, count: usize },
}

#[derive(Debug, Default)]
struct State {
  commands: Vec<Command>,
  live_stages: usize,
  live_programs: usize,
  next_program: u32,
  current_uniforms: Vec<String>,
  pending_errors: Vec<String>,
  context_lost: bool,
}

/// A backend recording commands instead of executing them.
///
/// Cloning a `Headless` yields another handle on the same recorder.
#[derive(Clone, Debug, Default)]
pub struct Headless {
  state: Rc<RefCell<State>>,
}

impl Headless {
  /// Create a backend with nothing recorded.
  pub fn new() -> Self {
    Self::default()
  }

  /// Every command recorded so far.
  pub fn commands(&self) -> Vec<Command> {
    self.state.borrow().commands.clone()
  }

  /// `(start, count)` of every draw call recorded so far.
  pub fn draw_calls(&self) -> Vec<(usize, usize)> {
    self
      .state
      .borrow()
      .commands
      .iter()
      .filter_map(|cmd| match *cmd {
        Command::Draw { start, count } => Some((start, count)),
        _ => None,
      })
      .collect()
  }

  /// Values the given matrix uniform was set to, in order.
  pub fn mat44_updates(&self, uniform: &str) -> Vec<Mat44> {
    self
      .state
      .borrow()
      .commands
      .iter()
      .filter_map(|cmd| match cmd {
        Command::SetMat44 { name, value } if name == uniform => Some(*value),
        _ => None,
      })
      .collect()
  }

  /// Number of stages not yet released.
  pub fn live_stages(&self) -> usize {
    self.state.borrow().live_stages
  }

  /// Number of programs not yet released.
  pub fn live_programs(&self) -> usize {
    self.state.borrow().live_programs
  }

  /// Simulate the loss of the graphics context.
  ///
  /// Every subsequent creation fails and [`Framebuffer::check`] reports
  /// [`FramebufferError::ContextLost`].
  pub fn lose_context(&self) {
    log::warn!("headless context lost");
    self.state.borrow_mut().context_lost = true;
  }

  /// Queue an error, reported by the next [`Framebuffer::check`] the way a driver reports its
  /// error flags.
  pub fn raise_error(&self, error: impl Into<String>) {
    self.state.borrow_mut().pending_errors.push(error.into());
  }

  fn is_lost(&self) -> bool {
    self.state.borrow().context_lost
  }

  fn record(&self, cmd: Command) {
    let mut state = self.state.borrow_mut();

    if !state.context_lost {
      log::trace!("{:?}", cmd);
      state.commands.push(cmd);
    }
  }
}

impl RenderContext for Headless {
  type Backend = Self;

  fn backend(&mut self) -> &mut Self::Backend {
    self
  }
}

/// A checked shader stage.
#[derive(Debug)]
pub struct HeadlessStage {
  ty: StageType,
  interface: glsl::Interface,
  state: Rc<RefCell<State>>,
}

impl Drop for HeadlessStage {
  fn drop(&mut self) {
    self.state.borrow_mut().live_stages -= 1;
  }
}

/// A linked program.
#[derive(Debug)]
pub struct HeadlessProgram {
  id: u32,
  attribs: Vec<String>,
  uniforms: Vec<String>,
  state: Rc<RefCell<State>>,
}

impl Drop for HeadlessProgram {
  fn drop(&mut self) {
    self.state.borrow_mut().live_programs -= 1;
  }
}

impl Shader for Headless {
  type StageRepr = HeadlessStage;

  type ProgramRepr = HeadlessProgram;

  fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    if self.is_lost() {
      return Err(StageError::compilation_failed(ty, "context lost"));
    }

    let interface = glsl::check(ty, src).map_err(|log| StageError::compilation_failed(ty, log))?;

    self.state.borrow_mut().live_stages += 1;
    self.record(Command::CompileStage(ty));

    Ok(HeadlessStage {
      ty,
      interface,
      state: self.state.clone(),
    })
  }

  fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    if self.is_lost() {
      return Err(ProgramError::link_failed("context lost"));
    }

    if vertex.ty != StageType::VertexShader || fragment.ty != StageType::FragmentShader {
      return Err(ProgramError::link_failed(format!(
        "cannot link a {} with a {}",
        vertex.ty, fragment.ty
      )));
    }

    let unwritten: Vec<_> = fragment
      .interface
      .inputs
      .iter()
      .filter(|input| !vertex.interface.outputs.contains(input))
      .map(String::as_str)
      .collect();

    if !unwritten.is_empty() {
      return Err(ProgramError::link_failed(format!(
        "error: fragment shader input(s) {} not written by the vertex shader",
        unwritten.join(", ")
      )));
    }

    let mut uniforms = vertex.interface.uniforms.clone();
    for uniform in &fragment.interface.uniforms {
      if !uniforms.contains(uniform) {
        uniforms.push(uniform.clone());
      }
    }

    let id = {
      let mut state = self.state.borrow_mut();
      state.live_programs += 1;
      state.next_program += 1;
      state.next_program
    };

    self.record(Command::LinkProgram(id));

    Ok(HeadlessProgram {
      id,
      attribs: vertex.interface.inputs.clone(),
      uniforms,
      state: self.state.clone(),
    })
  }

  fn use_program(&mut self, program: &Self::ProgramRepr) {
    self.state.borrow_mut().current_uniforms = program.uniforms.clone();
    self.record(Command::UseProgram(program.id));
  }

  fn uniform_index(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<i32> {
    program
      .uniforms
      .iter()
      .position(|uniform| uniform == name)
      .map(|i| i as i32)
  }

  fn attrib_index(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<u32> {
    program
      .attribs
      .iter()
      .position(|attrib| attrib == name)
      .map(|i| i as u32)
  }
}

impl Headless {
  fn current_uniform_name(&self, index: i32) -> String {
    let state = self.state.borrow();
    usize::try_from(index)
      .ok()
      .and_then(|i| state.current_uniforms.get(i).cloned())
      .unwrap_or_default()
  }
}

impl Uniformable<Mat44> for Headless {
  fn update(&mut self, uniform: &Uniform<Mat44>, value: Mat44) {
    let name = self.current_uniform_name(uniform.index());
    self.record(Command::SetMat44 { name, value });
  }
}

impl Uniformable<TextureUnit> for Headless {
  fn update(&mut self, uniform: &Uniform<TextureUnit>, value: TextureUnit) {
    let name = self.current_uniform_name(uniform.index());
    self.record(Command::SetTextureUnit {
      name,
      unit: value.index(),
    });
  }
}

/// Uploaded vertices.
#[derive(Debug)]
pub struct HeadlessTess {
  len: usize,
}

impl Tess for Headless {
  type TessRepr = HeadlessTess;

  fn new_tess(
    &mut self,
    vertices: &[VertexRecord],
    bindings: &[VertexAttribBinding],
  ) -> Result<Self::TessRepr, TessError> {
    if self.is_lost() {
      return Err(TessError::CannotCreate("context lost".to_owned()));
    }

    if vertices.is_empty() {
      return Err(TessError::NoVertices);
    }

    self.record(Command::UploadVertices {
      count: vertices.len(),
      attribs: bindings.iter().map(|b| (b.desc.name, b.index)).collect(),
    });

    Ok(HeadlessTess {
      len: vertices.len(),
    })
  }

  fn render(&mut self, tess: &Self::TessRepr, start: usize, count: usize) -> Result<(), TessError> {
    if start.checked_add(count).map_or(true, |end| end > tess.len) {
      return Err(TessError::OutOfBounds {
        start,
        count,
        len: tess.len,
      });
    }

    self.record(Command::Draw { start, count });
    Ok(())
  }
}

/// An uploaded texture.
#[derive(Debug)]
pub struct HeadlessTexture {
  unit: TextureUnit,
  size: [u32; 2],
}

impl HeadlessTexture {
  /// Unit the texture was uploaded to.
  pub fn unit(&self) -> TextureUnit {
    self.unit
  }

  /// `[width, height]` of the texture.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }
}

impl Texture for Headless {
  type TextureRepr = HeadlessTexture;

  fn new_texture(
    &mut self,
    unit: TextureUnit,
    texels: &Texels,
    sampler: &Sampler,
  ) -> Result<Self::TextureRepr, TextureError> {
    if self.is_lost() {
      return Err(TextureError::CannotCreate("context lost".to_owned()));
    }

    self.record(Command::UploadTexture {
      unit: unit.index(),
      width: texels.width(),
      height: texels.height(),
      sampler: *sampler,
    });

    Ok(HeadlessTexture {
      unit,
      size: [texels.width(), texels.height()],
    })
  }
}

impl Framebuffer for Headless {
  fn set_clear_color(&mut self, rgba: [f32; 4]) {
    self.record(Command::SetClearColor(rgba));
  }

  fn set_depth_test(&mut self, enabled: bool) {
    self.record(Command::SetDepthTest(enabled));
  }

  fn clear(&mut self) {
    self.record(Command::Clear);
  }

  fn check(&mut self) -> Result<(), FramebufferError> {
    let mut state = self.state.borrow_mut();

    if state.context_lost {
      return Err(FramebufferError::ContextLost);
    }

    // the first error wins; the others are dropped along with it
    let pending = std::mem::take(&mut state.pending_errors);
    match pending.into_iter().next() {
      Some(error) => Err(FramebufferError::Backend(error)),
      None => Ok(()),
    }
  }
}

/// A surface without any window, driven by a synthetic clock.
///
/// Time starts at zero and advances by a fixed step every time the buffers are swapped.
#[derive(Debug)]
pub struct HeadlessSurface {
  backend: Headless,
  size: [u32; 2],
  frame_time: f64,
  time: f64,
  presented: u64,
  close_after: Option<u64>,
}

impl HeadlessSurface {
  /// Create a headless surface matching the given window options.
  ///
  /// The clock advances by 1/60 s per frame.
  pub fn new(opt: WindowOpt) -> Self {
    let dim = opt.dim();

    HeadlessSurface {
      backend: Headless::new(),
      size: [dim.width, dim.height],
      frame_time: 1. / 60.,
      time: 0.,
      presented: 0,
      close_after: None,
    }
  }

  /// Set the amount of seconds the clock advances by per presented frame.
  pub fn set_frame_time(self, frame_time: f64) -> Self {
    HeadlessSurface { frame_time, ..self }
  }

  /// Raise the close signal once `frames` frames have been presented.
  pub fn set_close_after(self, frames: u64) -> Self {
    HeadlessSurface {
      close_after: Some(frames),
      ..self
    }
  }

  /// Number of presented frames.
  pub fn presented(&self) -> u64 {
    self.presented
  }

  /// Handle on the recording backend.
  pub fn headless(&self) -> &Headless {
    &self.backend
  }
}

impl RenderContext for HeadlessSurface {
  type Backend = Headless;

  fn backend(&mut self) -> &mut Self::Backend {
    &mut self.backend
  }
}

impl Surface for HeadlessSurface {
  fn should_close(&self) -> bool {
    self
      .close_after
      .map_or(false, |frames| self.presented >= frames)
  }

  fn swap_buffers(&mut self) {
    self.presented += 1;
    self.time += self.frame_time;
  }

  fn poll_events(&mut self) {}

  fn time(&self) -> f64 {
    self.time
  }

  fn size(&self) -> [u32; 2] {
    self.size
  }
}
