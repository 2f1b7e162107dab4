//! The backend of the renderer, which should be responsible for only one
//! thing: executing resource management and draw-calls using low-level video
//! APIs.

pub mod headless;

pub mod gl;

use std::os::raw::c_void;

use crate::errors::*;
use crate::geometry::Primitive;
use crate::program::UniformVariable;
use crate::shader::ShaderStage;

/// The native layer seam. Every GPU side effect in this crate routes through
/// one of these operations, so swapping the visitor swaps the whole native
/// layer.
///
/// All operations assume they are invoked on the thread that owns the active
/// rendering context, hence the `unsafe` markers.
pub trait Visitor {
    /// Creates and compiles a shader stage object from source text.
    unsafe fn create_shader(&mut self, stage: ShaderStage, src: &str) -> Result<u32>;

    unsafe fn delete_shader(&mut self, id: u32) -> Result<()>;

    /// Allocates an empty program object.
    unsafe fn create_program(&mut self) -> Result<u32>;

    /// Attaches the given compiled stages to the program and links it.
    unsafe fn link_program(&mut self, id: u32, shaders: &[u32]) -> Result<()>;

    unsafe fn delete_program(&mut self, id: u32) -> Result<()>;

    /// Activates the program as the current rendering program.
    unsafe fn bind_program(&mut self, id: u32) -> Result<()>;

    /// Queries the location of a named uniform. A negative location means the
    /// uniform is absent from the linked program.
    unsafe fn uniform_location(&mut self, id: u32, name: &str) -> Result<i32>;

    /// Writes a value to the given location of the currently bound program.
    unsafe fn set_uniform(&mut self, location: i32, variable: UniformVariable) -> Result<()>;

    /// Allocates an empty vertex-array/vertex-buffer pair with a tightly
    /// packed three-float position layout. Returns `(vao, vbo)`.
    unsafe fn create_mesh(&mut self) -> Result<(u32, u32)>;

    /// Replaces the whole contents of the vertex buffer.
    unsafe fn update_vertex_buffer(&mut self, vbo: u32, data: &[u8]) -> Result<()>;

    unsafe fn delete_mesh(&mut self, vao: u32, vbo: u32) -> Result<()>;

    /// Submits a draw-call over `count` vertices of the vertex array, and
    /// restores the vertex-array binding to a neutral state afterwards.
    /// Returns the number of vertices submitted.
    unsafe fn draw(&mut self, vao: u32, primitive: Primitive, count: usize) -> Result<u32>;

    /// Blocks until all submitted commands have been executed.
    unsafe fn flush(&mut self) -> Result<()>;
}

/// Creates the OpenGL backend, resolving function pointers through `loader`.
///
/// # Safety
///
/// The caller must have made an OpenGL context current on this thread, and
/// `loader` must resolve symbols against that context.
pub unsafe fn new<F>(loader: F) -> Result<Box<dyn Visitor>>
where
    F: FnMut(&'static str) -> *const c_void,
{
    let visitor = self::gl::GLVisitor::new(loader)?;
    Ok(Box::new(visitor))
}

/// Creates a headless backend that records calls instead of touching a GPU.
pub fn new_headless() -> Box<dyn Visitor> {
    Box::new(self::headless::HeadlessVisitor::new())
}
