//! A single programmable stage of the rendering pipeline, compiled from GLSL
//! source text.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::context;
use crate::errors::*;

/// The pipeline stage a `Shader` is compiled for.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

#[derive(Debug)]
struct ShaderCore {
    stage: ShaderStage,
    source: String,
    // Zero until the stage has been compiled successfully.
    id: Cell<u32>,
}

impl Drop for ShaderCore {
    fn drop(&mut self) {
        let id = self.id.get();
        if id == 0 {
            return;
        }

        if context::with(|v| unsafe { v.delete_shader(id) }).is_err() {
            warn!(
                "Leaking {} shader {} without an active rendering context.",
                self.stage, id
            );
        }
    }
}

/// A shader stage object. Creating one stores the source text only; the
/// native object comes to life on `compile`. Clones share one underlying
/// native object, which is destroyed exactly once when the last clone goes
/// out of scope, so a compiled stage can be reused across programs freely.
#[derive(Debug, Clone)]
pub struct Shader {
    core: Rc<ShaderCore>,
}

impl Shader {
    /// Creates a shader stage from source text. No GPU interaction happens
    /// until `compile`.
    pub fn new<T: Into<String>>(stage: ShaderStage, source: T) -> Shader {
        Shader {
            core: Rc::new(ShaderCore {
                stage,
                source: source.into(),
                id: Cell::new(0),
            }),
        }
    }

    /// Compiles the stage. Fails with `Error::CompileFailure` carrying the
    /// native diagnostic text; compiling an already compiled stage is a
    /// no-op.
    pub fn compile(&self) -> Result<()> {
        if self.core.id.get() != 0 {
            return Ok(());
        }

        let core = &self.core;
        let id = context::with(|v| unsafe { v.create_shader(core.stage, &core.source) })?;
        core.id.set(id);
        Ok(())
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.core.stage
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.core.source
    }

    /// Returns the native handle of the compiled stage, or
    /// `Error::ShaderNotCompiled` if `compile` has not succeeded yet.
    pub fn id(&self) -> Result<u32> {
        match self.core.id.get() {
            0 => Err(Error::ShaderNotCompiled),
            id => Ok(id),
        }
    }
}
