//! # A spinning cube, one shader program at a time
//!
//! turntable is the backend-agnostic core of a very small rendering pipeline: it compiles a
//! vertex / fragment shader pair into a program, uploads a fixed mesh and a single texture, and
//! then rotates that mesh about the Z axis once per frame.
//!
//! The crate doesn’t create windows nor GPU contexts. Instead, it talks to a _backend_ through a
//! small set of traits (see [`backend`]) and gets access to it via a [`RenderContext`]. Concrete
//! implementations live in other crates (e.g. `turntable-gl` for OpenGL 3.3 and `turntable-glfw`
//! for the window / context creation). A software [`headless`] backend is shipped here so that the
//! whole pipeline can be exercised without a GPU.
//!
//! # What’s included?
//!
//! - **Shaders**: [`shader::ProgramBuilder`] compiles two [`shader::ShaderSource`]s and links them
//!   into a [`shader::Program`]. Compilation and link diagnostics from the driver are reported as
//!   typed errors.
//! - **Vertices and meshes**: [`vertex::VertexRecord`] is the fixed interleaved layout
//!   (position, color, texture coordinates) and [`mesh::Mesh`] is the static asset table read from
//!   a small text file.
//! - **Textures**: [`texture::Texels`] holds decoded, tightly packed RGBA texels ready to be
//!   uploaded to a texture unit.
//! - **Frames**: [`render::FrameRenderer`] owns the per-frame sequence (clear, rotate, upload,
//!   draw) and [`render::run`] drives it against a [`surface::Surface`] until the close signal.
//!
//! # On context and threads
//!
//! GPU contexts are thread-affine. A [`RenderContext`] is expected to be created and used on a
//! single thread for its whole lifetime; backends enforce it by being `!Send` and `!Sync`.

pub mod backend;
pub mod context;
pub mod headless;
pub mod mesh;
pub mod render;
pub mod shader;
pub mod surface;
pub mod texture;
pub mod vertex;

pub use crate::context::RenderContext;
