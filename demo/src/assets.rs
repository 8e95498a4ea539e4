//! Asset loading.
//!
//! Every asset is loaded before any window is opened, so that a missing or broken file is reported
//! without touching the GPU.

use std::path::{Path, PathBuf};
use turntable::mesh::Mesh;
use turntable::shader::{ShaderSource, StageType};
use turntable::texture::Texels;

use crate::{AppError, CliOpts};

/// Everything the renderer needs, read from disk.
#[derive(Debug)]
pub struct Assets {
  /// Vertex stage source.
  pub vertex: ShaderSource,
  /// Fragment stage source.
  pub fragment: ShaderSource,
  /// Decoded texture, bound to unit 0.
  pub texels: Texels,
  /// Vertex table; its `cube` part is drawn.
  pub mesh: Mesh,
}

impl Assets {
  /// Read every asset named by the command line.
  pub fn load(cli_opts: &CliOpts) -> Result<Self, AppError> {
    let root = asset_root(cli_opts);
    log::info!("loading assets from {}", root.display());

    let vertex = ShaderSource::from_file(StageType::VertexShader, root.join(&cli_opts.vertex))?;
    let fragment =
      ShaderSource::from_file(StageType::FragmentShader, root.join(&cli_opts.fragment))?;

    let texels = Texels::load(root.join(&cli_opts.texture))?;
    log::info!("texture is {}×{}", texels.width(), texels.height());

    let mesh = match cli_opts.mesh {
      Some(ref path) => Mesh::load(root.join(path))?,
      None => Mesh::builtin()?,
    };
    log::info!(
      "mesh has {} vertices in {} parts",
      mesh.vertices().len(),
      mesh.parts().len()
    );

    Ok(Assets {
      vertex,
      fragment,
      texels,
      mesh,
    })
  }
}

// Relative asset paths are resolved against this directory; absolute ones are used as-is.
fn asset_root(cli_opts: &CliOpts) -> PathBuf {
  cli_opts
    .assets
    .clone()
    .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).to_owned())
}
