mod assets;

use assets::Assets;
use std::{error::Error, fmt, path::PathBuf, process};
use structopt::StructOpt;
use turntable::backend::Backend;
use turntable::headless::HeadlessSurface;
use turntable::mesh::MeshError;
use turntable::render::{self, FrameRenderer, RenderError, SceneOpt};
use turntable::shader::{ProgramBuilder, ProgramError};
use turntable::surface::{Surface, WindowDim, WindowOpt};
use turntable::texture::TextureError;
use turntable_glfw::{GlfwSurface, GlfwSurfaceError};

// without a window, nothing raises the close signal
const DEFAULT_HEADLESS_FRAMES: u64 = 60;

#[derive(Debug, StructOpt)]
#[structopt(name = "turntable", about = "A textured cube spinning on its Z axis.")]
pub struct CliOpts {
  #[structopt(short, long)]
  /// Directory relative asset paths are resolved against. Defaults to the crate directory.
  assets: Option<PathBuf>,

  #[structopt(long, default_value = "shaders/vertex.glsl")]
  /// Vertex shader source.
  vertex: PathBuf,

  #[structopt(long, default_value = "shaders/fragment.glsl")]
  /// Fragment shader source.
  fragment: PathBuf,

  #[structopt(short, long, default_value = "textures/checker.png")]
  /// Texture image.
  texture: PathBuf,

  #[structopt(short, long)]
  /// Mesh table. Defaults to the builtin cube.
  mesh: Option<PathBuf>,

  #[structopt(long, default_value = "640")]
  /// Window width.
  width: u32,

  #[structopt(long, default_value = "480")]
  /// Window height.
  height: u32,

  #[structopt(long)]
  /// Number of samples for multisampling.
  samples: Option<u32>,

  #[structopt(short, long)]
  /// Stop after that many frames.
  frames: Option<u64>,

  #[structopt(long)]
  /// Render without any window nor GPU, recording commands instead.
  headless: bool,

  #[structopt(long)]
  /// Don’t wait for the vertical blank when presenting.
  no_vsync: bool,
}

/// Everything that can stop the program.
#[derive(Debug)]
pub enum AppError {
  /// The window or its context could not be created.
  Surface(GlfwSurfaceError),
  /// The shader sources could not be read, compiled or linked.
  Program(ProgramError),
  /// The texture could not be read or decoded.
  Texture(TextureError),
  /// The mesh table could not be read or parsed.
  Mesh(MeshError),
  /// Setup or a frame failed.
  Render(RenderError),
}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      AppError::Surface(ref e) => write!(f, "cannot create surface: {}", e),
      AppError::Program(ref e) => write!(f, "cannot build shader program: {}", e),
      AppError::Texture(ref e) => write!(f, "cannot load texture: {}", e),
      AppError::Mesh(ref e) => write!(f, "cannot load mesh: {}", e),
      AppError::Render(ref e) => write!(f, "cannot render: {}", e),
    }
  }
}

impl Error for AppError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    match self {
      AppError::Surface(e) => Some(e),
      AppError::Program(e) => Some(e),
      AppError::Texture(e) => Some(e),
      AppError::Mesh(e) => Some(e),
      AppError::Render(e) => Some(e),
    }
  }
}

impl From<GlfwSurfaceError> for AppError {
  fn from(e: GlfwSurfaceError) -> Self {
    AppError::Surface(e)
  }
}

impl From<ProgramError> for AppError {
  fn from(e: ProgramError) -> Self {
    AppError::Program(e)
  }
}

impl From<TextureError> for AppError {
  fn from(e: TextureError) -> Self {
    AppError::Texture(e)
  }
}

impl From<MeshError> for AppError {
  fn from(e: MeshError) -> Self {
    AppError::Mesh(e)
  }
}

impl From<RenderError> for AppError {
  fn from(e: RenderError) -> Self {
    AppError::Render(e)
  }
}

// Build the program, set the scene up and render until the surface closes.
fn run<S>(surface: &mut S, assets: Assets, frame_limit: Option<u64>) -> Result<u64, AppError>
where
  S: Surface,
  S::Backend: Backend,
{
  let program = ProgramBuilder::new(surface).from_sources(&assets.vertex, &assets.fragment)?;

  let scene = SceneOpt::default().set_aspect_ratio(surface.aspect_ratio());
  let start_time = surface.time();
  let mut renderer = FrameRenderer::new(
    surface,
    program,
    &assets.mesh,
    &assets.texels,
    &scene,
    start_time,
  )?;

  let frames = render::run(surface, &mut renderer, frame_limit)?;
  Ok(frames)
}

fn try_main(cli_opts: CliOpts) -> Result<(), AppError> {
  let assets = Assets::load(&cli_opts)?;

  let dim = WindowDim {
    width: cli_opts.width,
    height: cli_opts.height,
  };
  let window_opt = WindowOpt::default()
    .set_dim(dim)
    .set_num_samples(cli_opts.samples)
    .set_vsync(!cli_opts.no_vsync);

  let frames = if cli_opts.headless {
    let mut surface = HeadlessSurface::new(window_opt);
    let frame_limit = cli_opts.frames.unwrap_or(DEFAULT_HEADLESS_FRAMES);
    let frames = run(&mut surface, assets, Some(frame_limit))?;

    log::info!(
      "recorded {} commands, {} draw calls",
      surface.headless().commands().len(),
      surface.headless().draw_calls().len()
    );

    frames
  } else {
    let mut surface = GlfwSurface::new_gl33("turntable", window_opt)?;
    run(&mut surface, assets, cli_opts.frames)?
  };

  log::info!("bye after {} frames", frames);
  Ok(())
}

fn main() {
  env_logger::builder()
    .filter_level(log::LevelFilter::Info)
    .parse_default_env()
    .init();
  let cli_opts = CliOpts::from_args();

  if let Err(e) = try_main(cli_opts) {
    log::error!("{}", e);
    process::exit(1);
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn shipped_assets_render_headless() {
    let cli_opts = CliOpts::from_iter(&["turntable", "--headless"]);
    let assets = Assets::load(&cli_opts).unwrap();

    let mut surface = HeadlessSurface::new(WindowOpt::default());
    let frames = run(&mut surface, assets, Some(3)).unwrap();

    assert_eq!(frames, 3);
    assert_eq!(surface.headless().draw_calls(), vec![(0, 36); 3]);
  }

  #[test]
  fn missing_texture_is_reported() {
    let cli_opts = CliOpts::from_iter(&["turntable", "--texture", "textures/nope.png"]);

    assert!(matches!(
      Assets::load(&cli_opts),
      Err(AppError::Texture(TextureError::Read { .. }))
    ));
  }
}
