//! Fully processed executable code for one or more shader stages.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cgmath::{Vector2, Vector3};
use smallvec::SmallVec;

use crate::context;
use crate::errors::*;
use crate::shader::Shader;
use crate::utils::{FastHashMap, HashValue};

/// Uniform variable for a program object.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformVariable {
    Bool(bool),
    I32(i32),
    F32(f32),
    Vector2f([f32; 2]),
    Vector3f([f32; 3]),
}

impl Into<UniformVariable> for bool {
    fn into(self) -> UniformVariable {
        UniformVariable::Bool(self)
    }
}

impl Into<UniformVariable> for i32 {
    fn into(self) -> UniformVariable {
        UniformVariable::I32(self)
    }
}

impl Into<UniformVariable> for f32 {
    fn into(self) -> UniformVariable {
        UniformVariable::F32(self)
    }
}

impl Into<UniformVariable> for [f32; 2] {
    fn into(self) -> UniformVariable {
        UniformVariable::Vector2f(self)
    }
}

impl Into<UniformVariable> for [f32; 3] {
    fn into(self) -> UniformVariable {
        UniformVariable::Vector3f(self)
    }
}

impl Into<UniformVariable> for Vector2<f32> {
    fn into(self) -> UniformVariable {
        UniformVariable::Vector2f(*self.as_ref())
    }
}

impl Into<UniformVariable> for Vector3<f32> {
    fn into(self) -> UniformVariable {
        UniformVariable::Vector3f(*self.as_ref())
    }
}

// The shared owner of the native program object. The uniform-location cache
// lives here rather than in `Program`, so that every clone of a program
// observes lookups performed through any of its siblings.
#[derive(Debug)]
struct ProgramCore {
    id: u32,
    linked: Cell<bool>,
    uniforms: RefCell<FastHashMap<HashValue<str>, i32>>,
}

impl ProgramCore {
    /// Resolves a uniform name to its location, querying the backend once
    /// per name and caching the answer. Locations of a linked program are
    /// stable for its whole lifetime, so the cache is never invalidated.
    fn location(&self, name: &str) -> Result<i32> {
        let hash = name.into();
        if let Some(&location) = self.uniforms.borrow().get(&hash) {
            return Ok(location);
        }

        let location = context::with(|v| unsafe { v.uniform_location(self.id, name) })?;
        if location < 0 {
            return Err(Error::UniformNotFound(name.to_string(), self.id));
        }

        self.uniforms.borrow_mut().insert(hash, location);
        Ok(location)
    }
}

impl Drop for ProgramCore {
    fn drop(&mut self) {
        if context::with(|v| unsafe { v.delete_program(self.id) }).is_err() {
            warn!(
                "Leaking program {} without an active rendering context.",
                self.id
            );
        }
    }
}

/// A program object, linking a set of compiled shader stages into executable
/// rendering code.
///
/// Clones are shared ownership, not duplication of GPU state: all clones
/// refer to one native program object and one uniform-location cache, and
/// the native object is destroyed exactly once when the last clone goes out
/// of scope.
///
/// A program starts out unlinked. `compile` transitions it to linked, which
/// is terminal; `bind` and `set` reject an unlinked program instead of
/// touching undefined native behavior.
#[derive(Debug, Clone)]
pub struct Program {
    stages: SmallVec<[Shader; 2]>,
    core: Rc<ProgramCore>,
}

impl Program {
    /// Creates a program from the given shader stages, allocating the native
    /// program object immediately. Fails with `Error::ContextNotFound` when
    /// no rendering context is installed on this thread, or with
    /// `Error::CreationFailure` when the backend cannot allocate a program
    /// object.
    pub fn new<T>(stages: T) -> Result<Program>
    where
        T: IntoIterator<Item = Shader>,
    {
        let id = context::with(|v| unsafe { v.create_program() })?;

        Ok(Program {
            stages: stages.into_iter().collect(),
            core: Rc::new(ProgramCore {
                id,
                linked: Cell::new(false),
                uniforms: RefCell::new(FastHashMap::default()),
            }),
        })
    }

    /// Attaches every stage's compiled handle to the program and links it.
    ///
    /// Fails with `Error::ShaderNotCompiled` when a stage has never been
    /// compiled, and with `Error::LinkFailure` carrying the native
    /// diagnostic text when linking fails; a failed link leaves the program
    /// unlinked but otherwise valid. Compiling an already linked program is
    /// a no-op.
    pub fn compile(&self) -> Result<()> {
        if self.core.linked.get() {
            return Ok(());
        }

        let mut shaders = SmallVec::<[u32; 2]>::new();
        for stage in &self.stages {
            shaders.push(stage.id()?);
        }

        context::with(|v| unsafe { v.link_program(self.core.id, &shaders) })?;
        self.core.linked.set(true);

        debug!(
            "Program {} linked from {} stages.",
            self.core.id,
            shaders.len()
        );
        Ok(())
    }

    /// Returns an identifier associated with this program. No side effects.
    #[inline]
    pub fn id(&self) -> u32 {
        self.core.id
    }

    /// Checks if this program has been linked successfully.
    #[inline]
    pub fn linked(&self) -> bool {
        self.core.linked.get()
    }

    /// Activates this program as the current rendering program, mutating
    /// global rendering-context state.
    pub fn bind(&self) -> Result<()> {
        if !self.core.linked.get() {
            return Err(Error::ProgramNotLinked(self.core.id));
        }

        context::with(|v| unsafe { v.bind_program(self.core.id) })
    }

    /// Writes a value to the named uniform of this program.
    ///
    /// The location is resolved through a lazy cache shared among all clones
    /// of this program; the backend is queried at most once per uniform
    /// name. A name absent from the linked program fails with
    /// `Error::UniformNotFound` and leaves native uniform state untouched.
    ///
    /// The program must be the currently bound one; this is a documented
    /// precondition of the wrapped API, not enforced here.
    pub fn set<T>(&self, name: &str, variable: T) -> Result<()>
    where
        T: Into<UniformVariable>,
    {
        if !self.core.linked.get() {
            return Err(Error::ProgramNotLinked(self.core.id));
        }

        let location = self.core.location(name)?;
        let variable = variable.into();
        context::with(|v| unsafe { v.set_uniform(location, variable) })
    }

    /// The shader stages this program was created from.
    #[inline]
    pub fn stages(&self) -> &[Shader] {
        &self.stages
    }
}
