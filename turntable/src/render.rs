//! Frame rendering.
//!
//! [`FrameRenderer`] sets the scene up once and then renders frames on demand. Each frame:
//!
//! 1. Clears the color and depth buffers.
//! 2. Computes the rotation angle, in radians, as the time elapsed since the start time.
//! 3. Uploads the rotation about the Z axis into the `model` uniform.
//! 4. Draws the cube part of the mesh (36 vertices).
//!
//! Presenting and event polling belong to the [`Surface`]; [`run`] chains everything until the
//! close signal is observed. Any backend failure is unrecoverable and stops the loop.

use cgmath::{perspective, Deg, Matrix4, Point3, Rad, Vector3};
use std::error;
use std::fmt;

use crate::backend::framebuffer::FramebufferError;
use crate::backend::tess::TessError;
use crate::backend::Backend;
use crate::context::RenderContext;
use crate::mesh::{self, Mesh, MeshPart};
use crate::shader::types::{Mat44, TextureUnit};
use crate::shader::{Program, Uniform, UniformWarning};
use crate::surface::Surface;
use crate::texture::{Sampler, Texels, TextureError};
use crate::vertex::{VertexAttribBinding, VertexRecord};

/// Texture unit the texture is bound to.
pub const TEXTURE_UNIT: TextureUnit = TextureUnit(0);

/// Scene options: camera and background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneOpt {
  clear_color: [f32; 4],
  eye: [f32; 3],
  center: [f32; 3],
  up: [f32; 3],
  fovy: f32,
  aspect_ratio: f32,
  z_near: f32,
  z_far: f32,
}

impl Default for SceneOpt {
  /// Defaults:
  ///
  /// - White background.
  /// - Camera at `(2, 2, 2)` looking at the origin, `+Z` up.
  /// - 45° vertical field of view, 4:3 aspect ratio, clipping planes at 1 and 10.
  fn default() -> Self {
    SceneOpt {
      clear_color: [1., 1., 1., 1.],
      eye: [2., 2., 2.],
      center: [0., 0., 0.],
      up: [0., 0., 1.],
      fovy: 45.,
      aspect_ratio: 640. / 480.,
      z_near: 1.,
      z_far: 10.,
    }
  }
}

impl SceneOpt {
  /// Set the background color.
  pub fn set_clear_color(self, clear_color: [f32; 4]) -> Self {
    SceneOpt {
      clear_color,
      ..self
    }
  }

  /// Background color.
  pub fn clear_color(&self) -> [f32; 4] {
    self.clear_color
  }

  /// Place the camera.
  pub fn set_look_at(self, eye: [f32; 3], center: [f32; 3], up: [f32; 3]) -> Self {
    SceneOpt {
      eye,
      center,
      up,
      ..self
    }
  }

  /// Set the vertical field of view, in degrees.
  pub fn set_fovy(self, fovy: f32) -> Self {
    SceneOpt { fovy, ..self }
  }

  /// Set the aspect ratio of the projection (width / height).
  pub fn set_aspect_ratio(self, aspect_ratio: f32) -> Self {
    SceneOpt {
      aspect_ratio,
      ..self
    }
  }

  /// Set the near and far clipping planes.
  pub fn set_clipping(self, z_near: f32, z_far: f32) -> Self {
    SceneOpt {
      z_near,
      z_far,
      ..self
    }
  }

  /// World-to-camera transform.
  pub fn view(&self) -> Mat44 {
    Matrix4::look_at_rh(
      Point3::from(self.eye),
      Point3::from(self.center),
      Vector3::from(self.up),
    )
    .into()
  }

  /// Camera-to-clip transform.
  pub fn projection(&self) -> Mat44 {
    perspective(Deg(self.fovy), self.aspect_ratio, self.z_near, self.z_far).into()
  }
}

/// Rotation of `angle` radians about the Z axis.
pub fn rotation_z(angle: f32) -> Mat44 {
  Matrix4::from_angle_z(Rad(angle)).into()
}

/// The only mutable state of the loop: when it started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameState {
  start_time: f64,
}

impl FrameState {
  /// Start the clock at `start_time`, in seconds.
  pub fn new(start_time: f64) -> Self {
    FrameState { start_time }
  }

  /// Time the angle is measured from.
  pub fn start_time(&self) -> f64 {
    self.start_time
  }

  /// Rotation angle at `now`, in radians.
  ///
  /// The subtraction is done in double precision so that the angle keeps growing smoothly for
  /// long runs.
  pub fn angle(&self, now: f64) -> f32 {
    (now - self.start_time) as f32
  }

  /// Model transform at `now`.
  pub fn model(&self, now: f64) -> Mat44 {
    rotation_z(self.angle(now))
  }
}

/// Renders the spinning cube.
pub struct FrameRenderer<B>
where
  B: Backend,
{
  program: Program<B>,
  tess: B::TessRepr,
  _texture: B::TextureRepr,
  model: Uniform<Mat44>,
  cube: MeshPart,
  state: FrameState,
}

impl<B> FrameRenderer<B>
where
  B: Backend,
{
  /// Set the scene up.
  ///
  /// The `model`, `view` and `proj` uniforms must be active in `program`. The `tex` sampler and
  /// the `position`, `color` and `texCoord` attributes are optional: when the program doesn’t
  /// read them, they are skipped with a warning. `view` and `proj` are uploaded here, once and for
  /// all.
  pub fn new<C>(
    ctx: &mut C,
    program: Program<B>,
    mesh: &Mesh,
    texels: &Texels,
    scene: &SceneOpt,
    start_time: f64,
  ) -> Result<Self, RenderError>
  where
    C: ?Sized + RenderContext<Backend = B>,
  {
    let cube = mesh
      .part(mesh::CUBE)
      .cloned()
      .ok_or_else(|| RenderError::MissingPart(mesh::CUBE.to_owned()))?;

    let backend = ctx.backend();
    backend.use_program(program.repr());

    let model = program.ask_uniform::<Mat44>(backend, "model")?;
    let view = program.ask_uniform::<Mat44>(backend, "view")?;
    let proj = program.ask_uniform::<Mat44>(backend, "proj")?;
    let tex = program
      .ask_uniform::<TextureUnit>(backend, "tex")
      .map_err(|w| log::warn!("{}; the texture won’t be sampled", w))
      .ok();

    let mut bindings = Vec::with_capacity(VertexRecord::ATTRIBS.len());
    for desc in VertexRecord::ATTRIBS.iter() {
      match program.attrib_index(backend, desc.name) {
        Ok(index) => bindings.push(VertexAttribBinding { index, desc: *desc }),
        Err(warning) => log::warn!("{}; not fed", warning),
      }
    }

    let tess = backend.new_tess(mesh.vertices(), &bindings)?;
    log::info!(
      "uploaded {} vertices ({} attributes bound)",
      mesh.vertices().len(),
      bindings.len()
    );

    // anything the program and vertex setup left behind is theirs, not the texture upload’s
    backend.check()?;

    let texture = backend.new_texture(TEXTURE_UNIT, texels, &Sampler::default())?;
    log::info!(
      "uploaded {}×{} texture on unit {}",
      texels.width(),
      texels.height(),
      TEXTURE_UNIT.index()
    );

    if let Some(tex) = tex {
      backend.update(&tex, TEXTURE_UNIT);
    }

    backend.update(&view, scene.view());
    backend.update(&proj, scene.projection());
    backend.set_depth_test(true);
    backend.set_clear_color(scene.clear_color());
    backend.check()?;

    Ok(FrameRenderer {
      program,
      tess,
      _texture: texture,
      model,
      cube,
      state: FrameState::new(start_time),
    })
  }

  /// Render a single frame at time `now` (seconds, same clock as the start time).
  pub fn render_frame<C>(&mut self, ctx: &mut C, now: f64) -> Result<(), RenderError>
  where
    C: ?Sized + RenderContext<Backend = B>,
  {
    let backend = ctx.backend();

    backend.clear();
    backend.update(&self.model, self.state.model(now));
    backend.render(&self.tess, self.cube.start, self.cube.count)?;
    backend.check()?;

    Ok(())
  }

  /// The loop state.
  pub fn frame_state(&self) -> &FrameState {
    &self.state
  }

  /// The program used to render.
  pub fn program(&self) -> &Program<B> {
    &self.program
  }
}

/// Render frames until the close signal, or until `frame_limit` frames have been rendered.
///
/// Each iteration renders a frame at the current surface time, presents it and polls the events.
/// Returns the number of rendered frames.
pub fn run<S>(
  surface: &mut S,
  renderer: &mut FrameRenderer<S::Backend>,
  frame_limit: Option<u64>,
) -> Result<u64, RenderError>
where
  S: Surface,
  S::Backend: Backend,
{
  let mut frames = 0;

  while !surface.should_close() {
    if frame_limit.map_or(false, |limit| frames >= limit) {
      log::info!("frame limit reached");
      break;
    }

    let now = surface.time();
    renderer.render_frame(surface, now)?;
    surface.swap_buffers();
    surface.poll_events();

    frames += 1;
  }

  log::info!("rendered {} frames", frames);
  Ok(frames)
}

/// Errors that can stop the rendering.
#[derive(Debug)]
pub enum RenderError {
  /// A required uniform is not active in the program.
  Uniform(UniformWarning),
  /// The mesh lacks the part to draw.
  MissingPart(String),
  /// Vertex upload or draw failure.
  Tess(TessError),
  /// Texture upload failure.
  Texture(TextureError),
  /// The backend failed, or the context is gone.
  Framebuffer(FramebufferError),
}

impl fmt::Display for RenderError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      RenderError::Uniform(e) => write!(f, "required uniform missing: {}", e),
      RenderError::MissingPart(name) => write!(f, "mesh has no {} part", name),
      RenderError::Tess(e) => write!(f, "tessellation error: {}", e),
      RenderError::Texture(e) => write!(f, "texture error: {}", e),
      RenderError::Framebuffer(e) => write!(f, "framebuffer error: {}", e),
    }
  }
}

impl error::Error for RenderError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      RenderError::Uniform(e) => Some(e),
      RenderError::MissingPart(_) => None,
      RenderError::Tess(e) => Some(e),
      RenderError::Texture(e) => Some(e),
      RenderError::Framebuffer(e) => Some(e),
    }
  }
}

impl From<UniformWarning> for RenderError {
  fn from(e: UniformWarning) -> Self {
    RenderError::Uniform(e)
  }
}

impl From<TessError> for RenderError {
  fn from(e: TessError) -> Self {
    RenderError::Tess(e)
  }
}

impl From<TextureError> for RenderError {
  fn from(e: TextureError) -> Self {
    RenderError::Texture(e)
  }
}

impl From<FramebufferError> for RenderError {
  fn from(e: FramebufferError) -> Self {
    RenderError::Framebuffer(e)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::f64::consts::PI;

  const EPSILON: f32 = 1e-5;

  #[test]
  fn angle_is_monotonic() {
    let state = FrameState::new(10.);
    let mut last = f32::NEG_INFINITY;

    for i in 0..1000 {
      let angle = state.angle(10. + i as f64 * 0.016);
      assert!(angle >= last);
      last = angle;
    }
  }

  #[test]
  fn angle_starts_at_zero() {
    let state = FrameState::new(3.5);
    assert_eq!(state.angle(3.5), 0.);
    assert!(state.model(3.5).max_abs_diff(&Mat44::IDENTITY) < EPSILON);
  }

  #[test]
  fn full_turn_is_identity() {
    let state = FrameState::new(1.);
    let m = state.model(1. + 2. * PI);
    assert!(m.max_abs_diff(&Mat44::IDENTITY) < EPSILON);
  }

  #[test]
  fn distinct_times_give_distinct_rotations() {
    let state = FrameState::new(0.);
    let a = state.model(0.25);
    let b = state.model(1.75);
    assert!(a.max_abs_diff(&b) > EPSILON);

    let c = state.model(0.25 + 2. * PI);
    assert!(a.max_abs_diff(&c) < EPSILON);
  }

  #[test]
  fn rotation_keeps_z() {
    let m = rotation_z(0.7);
    // third column is the image of +Z
    assert_eq!(m[2], [0., 0., 1., 0.]);
    assert_eq!(m[3], [0., 0., 0., 1.]);
  }

  #[test]
  fn default_camera() {
    let scene = SceneOpt::default();
    let view: Matrix4<f32> = scene.view().0.into();

    // the origin lands on the view axis, at distance |(2, 2, 2)|
    let origin = view * cgmath::Vector4::new(0., 0., 0., 1.);
    assert!(origin.x.abs() < EPSILON);
    assert!(origin.y.abs() < EPSILON);
    assert!((origin.z + 12f32.sqrt()).abs() < EPSILON);

    let proj = scene.projection();
    assert!((proj[0][0] * (640. / 480.) - proj[1][1]).abs() < EPSILON);
  }
}
