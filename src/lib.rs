//! # Lumen
//!
//! A minimal real-time rendering abstraction over OpenGL. It manages
//! GPU-resident shader programs and drawable line geometry on top of a
//! native rendering context, so that a caller can describe a renderable
//! object without juggling shader compilation, uniform lookup or
//! vertex-buffer lifetime by hand.
//!
//! ## Usage
//!
//! The caller owns the windowing layer. Make an OpenGL context current on
//! the rendering thread, install the backend and hand every `Renderable` a
//! timestamp once per frame:
//!
//! ```ignore
//! unsafe { lumen::context::setup(|symbol| window.get_proc_address(symbol))? };
//!
//! let line = Line::with_points(
//!     Vector3::new(1.0, 0.0, 0.0),
//!     &[
//!         Vector3::new(0.0, 0.0, 0.0),
//!         Vector3::new(1.0, 0.0, 0.0),
//!         Vector3::new(1.0, 1.0, 0.0),
//!     ],
//! )?;
//!
//! loop {
//!     line.render(t)?;
//! }
//! ```
//!
//! All operations are confined to the thread that owns the rendering
//! context; there is no internal synchronization.

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde;

pub use cgmath as math;

pub mod backends;
pub mod context;
pub mod errors;
pub mod geometry;
pub mod program;
pub mod shader;
pub mod time;
pub mod utils;

pub mod prelude {
    pub use crate::errors::{Error, Result};
    pub use crate::geometry::{Line, Primitive, Renderable};
    pub use crate::program::{Program, UniformVariable};
    pub use crate::shader::{Shader, ShaderStage};
    pub use crate::time::TimePoint;
}
