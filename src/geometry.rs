//! Drawable geometry primitives and the per-frame rendering contract.

use std::cell::Cell;
use std::mem;
use std::rc::Rc;
use std::slice;

use cgmath::Vector3;

use crate::context;
use crate::errors::*;
use crate::program::Program;
use crate::shader::{Shader, ShaderStage};
use crate::time::TimePoint;

/// The common polymorphic contract of everything that can be drawn. The
/// render-loop driver calls `render` once per frame with a monotonically
/// nondecreasing timestamp; each implementor performs its own activation and
/// draw-call submission.
pub trait Renderable {
    fn render(&self, t: TimePoint) -> Result<()>;
}

/// The way vertices are interpreted by a draw-call.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

/// The stock pass-through vertex stage used by `Line`.
pub const LINE_VERTEX_SHADER: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
void main() {
  gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

/// The stock flat-color fragment stage used by `Line`.
pub const LINE_FRAGMENT_SHADER: &str = "#version 330 core
out vec4 FragColor;
uniform vec3 color;
void main() {
  FragColor = vec4(color, 1.0f);
}
";

#[derive(Debug)]
struct LineCore {
    program: Program,
    vao: u32,
    vbo: u32,
    number_of_points: Cell<usize>,
    color: Cell<Vector3<f32>>,
}

impl Drop for LineCore {
    fn drop(&mut self) {
        let (vao, vbo) = (self.vao, self.vbo);
        if context::with(|v| unsafe { v.delete_mesh(vao, vbo) }).is_err() {
            warn!(
                "Leaking vertex array {} and buffer {} without an active rendering context.",
                vao, vbo
            );
        }
    }
}

/// A polyline drawn as a flat-colored line strip.
///
/// A `Line` owns its vertex buffer and a private program built from the
/// stock shader pair (or injected sources). Clones are shared ownership of
/// the same GPU objects, which are released exactly once when the last clone
/// goes out of scope.
#[derive(Debug, Clone)]
pub struct Line {
    core: Rc<LineCore>,
}

impl Line {
    /// Creates an opaque white line with no points.
    pub fn new() -> Result<Line> {
        Line::with_color(Vector3::new(1.0, 1.0, 1.0))
    }

    /// Creates an empty line of the given color.
    pub fn with_color(color: Vector3<f32>) -> Result<Line> {
        Line::with_sources(color, LINE_VERTEX_SHADER, LINE_FRAGMENT_SHADER)
    }

    /// Creates a line of the given color and uploads `points` immediately.
    pub fn with_points(color: Vector3<f32>, points: &[Vector3<f32>]) -> Result<Line> {
        let line = Line::with_color(color)?;
        line.load_points(points)?;
        Ok(line)
    }

    /// Creates a line from injected shader sources instead of the stock
    /// pair. The fragment stage is expected to expose a `vec3` uniform named
    /// `color`; rendering fails with `Error::UniformNotFound` otherwise.
    pub fn with_sources(color: Vector3<f32>, vs: &str, fs: &str) -> Result<Line> {
        let vertex = Shader::new(ShaderStage::Vertex, vs);
        let fragment = Shader::new(ShaderStage::Fragment, fs);
        vertex.compile()?;
        fragment.compile()?;

        let program = Program::new(vec![vertex, fragment])?;
        program.compile()?;

        let (vao, vbo) = context::with(|v| unsafe { v.create_mesh() })?;

        Ok(Line {
            core: Rc::new(LineCore {
                program,
                vao,
                vbo,
                number_of_points: Cell::new(0),
                color: Cell::new(color),
            }),
        })
    }

    /// Replaces the GPU-resident vertex data with `points`, in submission
    /// order. The whole buffer is re-uploaded even for small changes; no
    /// partial updates. An empty slice is valid and makes subsequent renders
    /// draw nothing.
    ///
    /// The original treats native upload failure as unreachable; here it is
    /// surfaced defensively as an error instead.
    pub fn load_points(&self, points: &[Vector3<f32>]) -> Result<()> {
        let data = unsafe {
            slice::from_raw_parts(
                points.as_ptr() as *const u8,
                points.len() * mem::size_of::<Vector3<f32>>(),
            )
        };

        let vbo = self.core.vbo;
        context::with(|v| unsafe { v.update_vertex_buffer(vbo, data) })?;
        self.core.number_of_points.set(points.len());
        Ok(())
    }

    /// The draw color. Plain state; no GPU interaction until the next
    /// render.
    #[inline]
    pub fn color(&self) -> Vector3<f32> {
        self.core.color.get()
    }

    #[inline]
    pub fn set_color(&self, color: Vector3<f32>) {
        self.core.color.set(color);
    }

    /// The number of vertices currently uploaded.
    #[inline]
    pub fn len(&self) -> usize {
        self.core.number_of_points.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.core.number_of_points.get() == 0
    }

    /// A shared handle to the internally owned program, for advanced
    /// callers. Uniform writes through the returned handle affect this
    /// geometry's rendering; its link state is managed internally and stays
    /// untouched.
    #[inline]
    pub fn program(&self) -> Program {
        self.core.program.clone()
    }
}

impl Renderable for Line {
    /// Activates the private program, pushes the color uniform and issues a
    /// line-strip draw over the uploaded vertices. Zero uploaded vertices
    /// submit a zero-vertex draw, which is a no-op rather than an error.
    ///
    /// The timestamp is accepted for interface uniformity and unused by this
    /// primitive; it is reserved for time-varying effects.
    fn render(&self, _: TimePoint) -> Result<()> {
        let core = &self.core;
        core.program.bind()?;
        core.program.set("color", core.color.get())?;

        let (vao, count) = (core.vao, core.number_of_points.get());
        context::with(|v| unsafe { v.draw(vao, Primitive::LineStrip, count) })?;
        Ok(())
    }
}
