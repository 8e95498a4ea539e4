//! Texture backend.

use crate::shader::types::TextureUnit;
use crate::texture::{Sampler, Texels, TextureError};

/// 2D RGBA8 textures.
pub trait Texture {
  /// Backend representation of a texture.
  type TextureRepr;

  /// Upload texels into a new texture and leave it bound to `unit`.
  fn new_texture(
    &mut self,
    unit: TextureUnit,
    texels: &Texels,
    sampler: &Sampler,
  ) -> Result<Self::TextureRepr, TextureError>;
}
