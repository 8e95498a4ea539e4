//! Render context.
//!
//! A render context is an object that gives access to the backend driving a graphics device (a
//! GPU or a software implementation, for instance). It is passed explicitly to every operation
//! issuing GPU commands instead of living in a process-wide global.
//!
//! This crate doesn’t provide you with creating such contexts. Instead, you must do it yourself or
//! rely on crates doing it for you (e.g. `turntable-glfw`).
//!
//! # On context and threads
//!
//!   - An object which type implements `RenderContext` should be `!Send` and `!Sync`, so that it
//!     cannot be moved nor shared between threads. Backends holding thread-affine state are very
//!     likely to be `!Send` and `!Sync` automatically.
//!   - Only a single context can live on a given thread at a time.

/// Class of render context.
pub trait RenderContext {
  /// Backend driven by this context.
  type Backend;

  /// Access the backend.
  fn backend(&mut self) -> &mut Self::Backend;
}
