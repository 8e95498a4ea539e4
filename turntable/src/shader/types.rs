//! Shader type wrappers.
//!
//! These types are used, mostly, to be passed to shaders as [`Uniform`] data.
//!
//! [`Uniform`]: crate::shader::Uniform

use cgmath::Matrix4;
use std::ops::Deref;

/// A 4×4 matrix, stored column-major.
///
/// This is akin to a `[[f32; 4]; 4]` where each inner array is a column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mat44(pub [[f32; 4]; 4]);

impl Mat44 {
  /// The identity matrix.
  pub const IDENTITY: Mat44 = Mat44([
    [1., 0., 0., 0.],
    [0., 1., 0., 0.],
    [0., 0., 1., 0.],
    [0., 0., 0., 1.],
  ]);

  /// Largest absolute difference between the components of two matrices.
  pub fn max_abs_diff(&self, rhs: &Mat44) -> f32 {
    self
      .0
      .iter()
      .flatten()
      .zip(rhs.0.iter().flatten())
      .map(|(a, b)| (a - b).abs())
      .fold(0., f32::max)
  }
}

impl From<[[f32; 4]; 4]> for Mat44 {
  fn from(a: [[f32; 4]; 4]) -> Self {
    Mat44(a)
  }
}

impl From<Mat44> for [[f32; 4]; 4] {
  fn from(Mat44(a): Mat44) -> Self {
    a
  }
}

impl From<Matrix4<f32>> for Mat44 {
  fn from(m: Matrix4<f32>) -> Self {
    Mat44(m.into())
  }
}

impl Deref for Mat44 {
  type Target = [[f32; 4]; 4];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

/// A texture unit, as seen by a sampler uniform.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TextureUnit(pub u32);

impl TextureUnit {
  /// Index of the texture unit.
  pub fn index(self) -> u32 {
    self.0
  }
}
