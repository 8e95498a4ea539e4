use gl::types::*;
use std::cell::RefCell;
use std::os::raw::c_void;
use std::rc::Rc;

use crate::gl33::framebuffer::{describe, errors_to_result, take_errors};
use crate::gl33::state::GLState;
use crate::gl33::GL33;
use turntable::backend::texture::Texture;
use turntable::shader::types::TextureUnit;
use turntable::texture::{Filter, Sampler, Texels, TextureError, Wrap};

/// A 2D RGBA8 texture.
#[derive(Debug)]
pub struct Texture2D {
  handle: GLuint,
  size: [u32; 2],
  state: Rc<RefCell<GLState>>,
}

impl Texture2D {
  /// `[width, height]` of the texture.
  pub fn size(&self) -> [u32; 2] {
    self.size
  }
}

impl Drop for Texture2D {
  fn drop(&mut self) {
    self.state.borrow_mut().unbind_texture(self.handle);

    unsafe {
      gl::DeleteTextures(1, &self.handle);
    }
  }
}

impl Texture for GL33 {
  type TextureRepr = Texture2D;

  fn new_texture(
    &mut self,
    unit: TextureUnit,
    texels: &Texels,
    sampler: &Sampler,
  ) -> Result<Self::TextureRepr, TextureError> {
    let mut state = self.state.borrow_mut();

    unsafe {
      // errors raised by earlier calls must not be blamed on this upload
      let stale = take_errors();
      if !stale.is_empty() {
        let stale: Vec<_> = stale.into_iter().map(describe).collect();
        log::warn!("OpenGL errors pending before texture upload: {}", stale.join(", "));
      }

      let mut handle: GLuint = 0;
      gl::GenTextures(1, &mut handle);

      if handle == 0 {
        return Err(TextureError::CannotCreate(
          "unable to create texture".to_owned(),
        ));
      }

      state.set_texture_unit(unit.index());
      state.bind_texture(handle);

      apply_sampler_to_texture(sampler);

      // rows of RGBA8 texels are always 4-byte aligned
      gl::PixelStorei(gl::UNPACK_ALIGNMENT, 4);
      gl::TexImage2D(
        gl::TEXTURE_2D,
        0,
        gl::RGBA8 as GLint,
        texels.width() as GLsizei,
        texels.height() as GLsizei,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        texels.as_bytes().as_ptr() as *const c_void,
      );

      match errors_to_result(&take_errors()) {
        Ok(()) => Ok(Texture2D {
          handle,
          size: [texels.width(), texels.height()],
          state: self.state.clone(),
        }),

        Err(e) => {
          state.unbind_texture(handle);
          gl::DeleteTextures(1, &handle);

          Err(TextureError::CannotCreate(format!(
            "{}×{} upload failed: {}",
            texels.width(),
            texels.height(),
            e
          )))
        }
      }
    }
  }
}

unsafe fn apply_sampler_to_texture(sampler: &Sampler) {
  let target = gl::TEXTURE_2D;

  gl::TexParameteri(target, gl::TEXTURE_WRAP_S, opengl_wrap(sampler.wrap_s) as GLint);
  gl::TexParameteri(target, gl::TEXTURE_WRAP_T, opengl_wrap(sampler.wrap_t) as GLint);
  gl::TexParameteri(
    target,
    gl::TEXTURE_MIN_FILTER,
    opengl_filter(sampler.min_filter) as GLint,
  );
  gl::TexParameteri(
    target,
    gl::TEXTURE_MAG_FILTER,
    opengl_filter(sampler.mag_filter) as GLint,
  );

  // no mipmaps
  gl::TexParameteri(target, gl::TEXTURE_BASE_LEVEL, 0);
  gl::TexParameteri(target, gl::TEXTURE_MAX_LEVEL, 0);
}

fn opengl_wrap(wrap: Wrap) -> GLenum {
  match wrap {
    Wrap::ClampToEdge => gl::CLAMP_TO_EDGE,
    Wrap::Repeat => gl::REPEAT,
    Wrap::MirroredRepeat => gl::MIRRORED_REPEAT,
  }
}

fn opengl_filter(filter: Filter) -> GLenum {
  match filter {
    Filter::Nearest => gl::NEAREST,
    Filter::Linear => gl::LINEAR,
  }
}
