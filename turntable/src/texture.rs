//! Texture texels and sampling.
//!
//! Images are decoded with the [image](https://crates.io/crates/image) crate and converted to a
//! tightly packed RGBA8 buffer, [`Texels`], ready to be uploaded to a single 2D texture. Texel
//! buffers whose rows are not exactly `width × 4` bytes long are refused.

use image::{DynamicImage, ImageError};
use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Number of bytes of a single RGBA8 texel.
pub const TEXEL_SIZE: usize = 4;

/// Decoded RGBA8 texels of a 2D image.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Texels {
  width: u32,
  height: u32,
  data: Vec<u8>,
}

impl Texels {
  /// Wrap a raw RGBA8 buffer.
  ///
  /// The buffer must hold exactly `height` rows of `width` texels, with no padding between rows.
  pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TextureError> {
    let stride = width as usize * TEXEL_SIZE;

    if width == 0 || height == 0 || data.len() != stride * height as usize {
      return Err(TextureError::UnsupportedFormat {
        width,
        height,
        len: data.len(),
      });
    }

    Ok(Texels {
      width,
      height,
      data,
    })
  }

  /// Convert a decoded image to RGBA8.
  pub fn from_image(img: DynamicImage) -> Result<Self, TextureError> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Texels::new(width, height, rgba.into_raw())
  }

  /// Decode an encoded image (PNG, JPEG, …).
  pub fn decode(bytes: &[u8]) -> Result<Self, TextureError> {
    let img = image::load_from_memory(bytes).map_err(TextureError::Decode)?;
    Texels::from_image(img)
  }

  /// Read and decode an image file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, TextureError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| TextureError::Read {
      path: path.to_owned(),
      source,
    })?;

    log::debug!("decoding texture {}", path.display());
    Texels::decode(&bytes)
  }

  /// Width in texels.
  pub fn width(&self) -> u32 {
    self.width
  }

  /// Height in texels.
  pub fn height(&self) -> u32 {
    self.height
  }

  /// Size of a row in bytes.
  pub fn stride(&self) -> usize {
    self.width as usize * TEXEL_SIZE
  }

  /// Raw texel bytes, row after row.
  pub fn as_bytes(&self) -> &[u8] {
    &self.data
  }
}

/// Texture filtering.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Filter {
  /// Nearest texel.
  Nearest,
  /// Linear interpolation between the neighbouring texels.
  Linear,
}

/// How texture coordinates outside of `[0, 1]` are handled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Wrap {
  /// Clamp to the edge texels.
  ClampToEdge,
  /// Repeat the texture.
  Repeat,
  /// Repeat the texture, mirroring it every other time.
  MirroredRepeat,
}

/// A `Sampler` object gives hint on how a texture should be sampled.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Sampler {
  /// How should we wrap around the *s* sampling coordinate?
  pub wrap_s: Wrap,
  /// How should we wrap around the *t* sampling coordinate?
  pub wrap_t: Wrap,
  /// Minification filter.
  pub min_filter: Filter,
  /// Magnification filter.
  pub mag_filter: Filter,
}

/// Default value is as following:
///
/// - Repeat on both coordinates, as an OpenGL texture does when left untouched.
/// - Linear minification and magnification.
impl Default for Sampler {
  fn default() -> Self {
    Sampler {
      wrap_s: Wrap::Repeat,
      wrap_t: Wrap::Repeat,
      min_filter: Filter::Linear,
      mag_filter: Filter::Linear,
    }
  }
}

/// Errors that might happen when working with textures.
#[non_exhaustive]
#[derive(Debug)]
pub enum TextureError {
  /// The image file could not be read.
  Read {
    /// Path of the file.
    path: PathBuf,
    /// Underlying I/O error.
    source: io::Error,
  },
  /// The image could not be decoded.
  Decode(ImageError),
  /// The texel buffer doesn’t have the expected size for a packed RGBA8 image.
  UnsupportedFormat {
    /// Width in texels.
    width: u32,
    /// Height in texels.
    height: u32,
    /// Length of the buffer in bytes.
    len: usize,
  },
  /// The backend refused to create the texture.
  CannotCreate(String),
}

impl fmt::Display for TextureError {
  fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
    match self {
      TextureError::Read { path, source } => {
        write!(f, "cannot read texture {}: {}", path.display(), source)
      }
      TextureError::Decode(e) => write!(f, "cannot decode texture: {}", e),
      TextureError::UnsupportedFormat { width, height, len } => write!(
        f,
        "unsupported texel layout: {} bytes for a {}×{} RGBA8 image",
        len, width, height
      ),
      TextureError::CannotCreate(reason) => write!(f, "cannot create texture: {}", reason),
    }
  }
}

impl error::Error for TextureError {
  fn source(&self) -> Option<&(dyn error::Error + 'static)> {
    match self {
      TextureError::Read { source, .. } => Some(source),
      TextureError::Decode(e) => Some(e),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use image::{ImageOutputFormat, Rgb, RgbImage};

  #[test]
  fn packed_buffer() {
    let texels = Texels::new(2, 3, vec![0; 24]).unwrap();
    assert_eq!(texels.stride(), 8);
    assert_eq!(texels.as_bytes().len(), 24);
  }

  #[test]
  fn padded_rows_are_unsupported() {
    // 2×2 RGBA8 with 4 bytes of padding per row
    let err = Texels::new(2, 2, vec![0; 24]).unwrap_err();
    assert!(matches!(
      err,
      TextureError::UnsupportedFormat {
        width: 2,
        height: 2,
        len: 24
      }
    ));
  }

  #[test]
  fn empty_image_is_unsupported() {
    assert!(Texels::new(0, 4, Vec::new()).is_err());
  }

  #[test]
  fn rgb_is_expanded_to_rgba() {
    let img = RgbImage::from_pixel(3, 1, Rgb([10, 20, 30]));
    let texels = Texels::from_image(DynamicImage::ImageRgb8(img)).unwrap();

    assert_eq!(texels.width(), 3);
    assert_eq!(texels.height(), 1);
    assert_eq!(&texels.as_bytes()[..4], &[10, 20, 30, 255]);
  }

  #[test]
  fn decode_png() {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, Rgb([255, 0, 0])));
    let mut png = Vec::new();
    img.write_to(&mut png, ImageOutputFormat::Png).unwrap();

    let texels = Texels::decode(&png).unwrap();
    assert_eq!((texels.width(), texels.height()), (4, 2));
  }

  #[test]
  fn garbage_is_a_decode_error() {
    let err = Texels::decode(b"definitely not an image").unwrap_err();
    assert!(matches!(err, TextureError::Decode(_)));
  }

  #[test]
  fn default_sampler() {
    let sampler = Sampler::default();

    assert_eq!((sampler.wrap_s, sampler.wrap_t), (Wrap::Repeat, Wrap::Repeat));
    assert_eq!((sampler.min_filter, sampler.mag_filter), (Filter::Linear, Filter::Linear));
  }

  #[test]
  fn missing_file_is_a_read_error() {
    let err = Texels::load("/nonexistent/texture.png").unwrap_err();
    assert!(matches!(err, TextureError::Read { .. }));
  }
}
