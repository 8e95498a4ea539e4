use gl::types::*;
use std::cell::RefCell;
use std::mem;
use std::os::raw::c_void;
use std::rc::Rc;

use crate::gl33::state::{Bind, GLState};
use crate::gl33::GL33;
use turntable::backend::tess::{Tess, TessError};
use turntable::vertex::{VertexAttribBinding, VertexRecord};

/// Vertices uploaded to a vertex buffer, along with the vertex array describing them.
#[derive(Debug)]
pub struct VertexArray {
  vao: GLuint,
  vbo: GLuint,
  vert_nb: usize,
  state: Rc<RefCell<GLState>>,
}

impl VertexArray {
  /// Number of uploaded vertices.
  pub fn vert_nb(&self) -> usize {
    self.vert_nb
  }
}

impl Drop for VertexArray {
  fn drop(&mut self) {
    let mut state = self.state.borrow_mut();

    unsafe {
      state.unbind_vertex_array(self.vao);
      state.unbind_buffer(self.vbo);
      gl::DeleteVertexArrays(1, &self.vao);
      gl::DeleteBuffers(1, &self.vbo);
    }
  }
}

impl Tess for GL33 {
  type TessRepr = VertexArray;

  fn new_tess(
    &mut self,
    vertices: &[VertexRecord],
    bindings: &[VertexAttribBinding],
  ) -> Result<Self::TessRepr, TessError> {
    if vertices.is_empty() {
      return Err(TessError::NoVertices);
    }

    let mut state = self.state.borrow_mut();

    unsafe {
      let mut vao: GLuint = 0;
      gl::GenVertexArrays(1, &mut vao);

      if vao == 0 {
        return Err(TessError::CannotCreate("unable to create vertex array".to_owned()));
      }

      // force binding the vertex array so that previously bound vertex arrays (possibly the same
      // handle) don’t prevent us from binding here
      state.bind_vertex_array(vao, Bind::Forced);

      let mut vbo: GLuint = 0;
      gl::GenBuffers(1, &mut vbo);

      if vbo == 0 {
        state.unbind_vertex_array(vao);
        gl::DeleteVertexArrays(1, &vao);
        return Err(TessError::CannotCreate("unable to create vertex buffer".to_owned()));
      }

      state.bind_array_buffer(vbo, Bind::Forced);
      gl::BufferData(
        gl::ARRAY_BUFFER,
        mem::size_of_val(vertices) as GLsizeiptr,
        vertices.as_ptr() as *const c_void,
        gl::STATIC_DRAW,
      );

      set_vertex_pointers(bindings);

      Ok(VertexArray {
        vao,
        vbo,
        vert_nb: vertices.len(),
        state: self.state.clone(),
      })
    }
  }

  fn render(&mut self, tess: &Self::TessRepr, start: usize, count: usize) -> Result<(), TessError> {
    if start.checked_add(count).map_or(true, |end| end > tess.vert_nb) {
      return Err(TessError::OutOfBounds {
        start,
        count,
        len: tess.vert_nb,
      });
    }

    unsafe {
      self
        .state
        .borrow_mut()
        .bind_vertex_array(tess.vao, Bind::Cached);
      gl::DrawArrays(gl::TRIANGLES, start as GLint, count as GLsizei);
    }

    Ok(())
  }
}

// Describe the interleaved layout for every bound attribute; the array buffer must be bound.
unsafe fn set_vertex_pointers(bindings: &[VertexAttribBinding]) {
  let stride = VertexRecord::STRIDE as GLsizei;

  for binding in bindings {
    gl::VertexAttribPointer(
      binding.index,
      binding.desc.dim as GLint,
      gl::FLOAT,
      gl::FALSE,
      stride,
      binding.desc.offset as *const c_void,
    );
    gl::EnableVertexAttribArray(binding.index);
  }
}
