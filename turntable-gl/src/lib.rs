//! OpenGL backends.
//!
//! This crate exports [OpenGL](https://www.khronos.org/opengl/) backends for turntable. The only
//! one so far is [`GL33`], targeting OpenGL 3.3 core profile.
//!
//! Backends here expect the OpenGL function pointers to be loaded (see the `gl` crate’s
//! `load_with`) and a context to be current on the calling thread before they are created.

pub mod gl33;

pub use gl33::GL33;
