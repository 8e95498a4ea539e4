//! Backend interfacing.
//!
//! Each module here exposes the trait a backend must implement to support the matching feature.
//! [`Backend`] gathers all of them and is automatically implemented for any type implementing the
//! whole set.

pub mod framebuffer;
pub mod shader;
pub mod tess;
pub mod texture;

use crate::shader::types::{Mat44, TextureUnit};

/// Everything the frame renderer needs from a backend.
pub trait Backend:
  shader::Shader
  + shader::Uniformable<Mat44>
  + shader::Uniformable<TextureUnit>
  + tess::Tess
  + texture::Texture
  + framebuffer::Framebuffer
{
}

impl<B> Backend for B where
  B: shader::Shader
    + shader::Uniformable<Mat44>
    + shader::Uniformable<TextureUnit>
    + tess::Tess
    + texture::Texture
    + framebuffer::Framebuffer
{
}
