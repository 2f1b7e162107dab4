use crate::shader::ShaderStage;

/// The errors that might be surfaced when talking to the rendering backend.
///
/// Shader compilation and program linking are deterministic given the same
/// inputs, so none of these are retried internally; they always propagate to
/// the caller.
#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "No active rendering context on current thread.")]
    ContextNotFound,
    #[fail(display = "Failed to create {} object.", _0)]
    CreationFailure(&'static str),
    #[fail(display = "Failed to compile {} shader, errors:\n{}", _0, _1)]
    CompileFailure(ShaderStage, String),
    #[fail(display = "Failed to link program {}, errors:\n{}", _0, _1)]
    LinkFailure(u32, String),
    #[fail(display = "Program {} error, unable to find uniform: {}", _1, _0)]
    UniformNotFound(String, u32),
    #[fail(display = "Shader has not been compiled yet.")]
    ShaderNotCompiled,
    #[fail(display = "Program {} has not been linked yet.", _0)]
    ProgramNotLinked(u32),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;
