use gl::types::*;
use std::cell::RefCell;
use std::ffi::CString;
use std::ptr::null;
use std::rc::Rc;

use crate::gl33::state::GLState;
use crate::gl33::GL33;
use turntable::backend::shader::{Shader, Uniformable};
use turntable::shader::types::{Mat44, TextureUnit};
use turntable::shader::{ProgramError, StageError, StageType, Uniform};

/// A compiled shader stage.
#[derive(Debug)]
pub struct Stage {
  handle: GLuint,
  ty: StageType,
}

impl Drop for Stage {
  fn drop(&mut self) {
    unsafe {
      gl::DeleteShader(self.handle);
    }
  }
}

/// A linked shader program.
#[derive(Debug)]
pub struct Program {
  pub(crate) handle: GLuint,
  state: Rc<RefCell<GLState>>,
}

impl Drop for Program {
  fn drop(&mut self) {
    self.state.borrow_mut().forget_program(self.handle);

    unsafe {
      gl::DeleteProgram(self.handle);
    }
  }
}

impl Program {
  fn link(&self) -> Result<(), ProgramError> {
    let handle = self.handle;

    unsafe {
      gl::LinkProgram(handle);

      let mut linked: GLint = gl::FALSE.into();
      gl::GetProgramiv(handle, gl::LINK_STATUS, &mut linked);

      if linked == gl::TRUE.into() {
        Ok(())
      } else {
        let mut log_len: GLint = 0;
        gl::GetProgramiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

        let mut log = vec![0u8; log_len.max(1) as usize];
        let mut written: GLsizei = 0;
        gl::GetProgramInfoLog(
          handle,
          log.len() as GLsizei,
          &mut written,
          log.as_mut_ptr() as *mut GLchar,
        );

        Err(ProgramError::link_failed(info_log(log, written)))
      }
    }
  }
}

impl Shader for GL33 {
  type StageRepr = Stage;

  type ProgramRepr = Program;

  fn new_stage(&mut self, ty: StageType, src: &str) -> Result<Self::StageRepr, StageError> {
    let c_src = CString::new(src.as_bytes())
      .map_err(|_| StageError::compilation_failed(ty, "source contains a NUL byte"))?;

    unsafe {
      let handle = gl::CreateShader(opengl_shader_type(ty));

      if handle == 0 {
        return Err(StageError::compilation_failed(
          ty,
          "unable to create shader stage",
        ));
      }

      gl::ShaderSource(handle, 1, [c_src.as_ptr()].as_ptr(), null());
      gl::CompileShader(handle);

      let mut compiled: GLint = gl::FALSE.into();
      gl::GetShaderiv(handle, gl::COMPILE_STATUS, &mut compiled);

      if compiled == gl::TRUE.into() {
        Ok(Stage { handle, ty })
      } else {
        let mut log_len: GLint = 0;
        gl::GetShaderiv(handle, gl::INFO_LOG_LENGTH, &mut log_len);

        let mut log = vec![0u8; log_len.max(1) as usize];
        let mut written: GLsizei = 0;
        gl::GetShaderInfoLog(
          handle,
          log.len() as GLsizei,
          &mut written,
          log.as_mut_ptr() as *mut GLchar,
        );

        gl::DeleteShader(handle);

        Err(StageError::compilation_failed(ty, info_log(log, written)))
      }
    }
  }

  fn new_program(
    &mut self,
    vertex: &Self::StageRepr,
    fragment: &Self::StageRepr,
  ) -> Result<Self::ProgramRepr, ProgramError> {
    if vertex.ty != StageType::VertexShader || fragment.ty != StageType::FragmentShader {
      return Err(ProgramError::link_failed(format!(
        "cannot link a {} with a {}",
        vertex.ty, fragment.ty
      )));
    }

    let program = unsafe {
      let handle = gl::CreateProgram();

      if handle == 0 {
        return Err(ProgramError::link_failed("unable to create shader program"));
      }

      gl::AttachShader(handle, vertex.handle);
      gl::AttachShader(handle, fragment.handle);

      Program {
        handle,
        state: self.state.clone(),
      }
    };

    let linked = program.link();

    // stages can then be deleted independently from the program
    unsafe {
      gl::DetachShader(program.handle, vertex.handle);
      gl::DetachShader(program.handle, fragment.handle);
    }

    linked.map(move |_| program)
  }

  fn use_program(&mut self, program: &Self::ProgramRepr) {
    unsafe { self.state.borrow_mut().use_program(program.handle) }
  }

  fn uniform_index(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<i32> {
    let c_name = CString::new(name.as_bytes()).ok()?;
    let location = unsafe { gl::GetUniformLocation(program.handle, c_name.as_ptr() as *const GLchar) };

    // ensure the location smells good
    if location < 0 {
      None
    } else {
      Some(location)
    }
  }

  fn attrib_index(&mut self, program: &Self::ProgramRepr, name: &str) -> Option<u32> {
    let c_name = CString::new(name.as_bytes()).ok()?;
    let location = unsafe { gl::GetAttribLocation(program.handle, c_name.as_ptr() as *const GLchar) };

    if location < 0 {
      None
    } else {
      Some(location as u32)
    }
  }
}

impl Uniformable<Mat44> for GL33 {
  fn update(&mut self, uniform: &Uniform<Mat44>, value: Mat44) {
    unsafe {
      gl::UniformMatrix4fv(
        uniform.index(),
        1,
        gl::FALSE,
        value.0.as_ptr() as *const GLfloat,
      )
    }
  }
}

impl Uniformable<TextureUnit> for GL33 {
  fn update(&mut self, uniform: &Uniform<TextureUnit>, value: TextureUnit) {
    unsafe { gl::Uniform1i(uniform.index(), value.index() as GLint) }
  }
}

fn opengl_shader_type(t: StageType) -> GLenum {
  match t {
    StageType::VertexShader => gl::VERTEX_SHADER,
    StageType::FragmentShader => gl::FRAGMENT_SHADER,
  }
}

// Turn a raw info log into a string, dropping the trailing NUL.
fn info_log(mut log: Vec<u8>, written: GLsizei) -> String {
  log.truncate(written.max(0) as usize);
  String::from_utf8_lossy(&log).trim_end().to_owned()
}
