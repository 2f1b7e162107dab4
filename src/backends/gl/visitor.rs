use std::os::raw::c_void;
use std::ptr;

use gl;
use gl::types::*;

use crate::errors::*;
use crate::geometry::Primitive;
use crate::program::UniformVariable;
use crate::shader::ShaderStage;

use super::super::Visitor;
use super::capabilities::{Capabilities, Version};

/// The visitor that executes every operation against a real OpenGL context.
pub struct GLVisitor {
    capabilities: Capabilities,
    binded_program: Option<GLuint>,
}

impl GLVisitor {
    /// Loads the OpenGL function pointers through `loader` and probes the
    /// implementation.
    ///
    /// # Safety
    ///
    /// A context must be current on this thread, and `loader` must resolve
    /// symbols against it.
    pub unsafe fn new<F>(loader: F) -> Result<Self>
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);

        let capabilities = Capabilities::parse()?;
        info!("GLVisitor {:#?}", capabilities);

        if !(capabilities.version >= Version::GL(3, 3)
            || capabilities.version >= Version::ES(3, 0))
        {
            return Err(Error::Backend(
                "[GL] The OpenGL implementation does not supports GLSL 330 shaders.".into(),
            ));
        }

        Ok(GLVisitor {
            capabilities,
            binded_program: None,
        })
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }
}

impl Visitor for GLVisitor {
    unsafe fn create_shader(&mut self, stage: ShaderStage, src: &str) -> Result<u32> {
        let id = gl::CreateShader(stage.into());
        if id == 0 {
            return Err(Error::CreationFailure("shader"));
        }

        let c_str = ::std::ffi::CString::new(src.as_bytes()).unwrap();
        gl::ShaderSource(id, 1, &c_str.as_ptr(), ptr::null());
        gl::CompileShader(id);

        let mut status = GLint::from(gl::FALSE);
        gl::GetShaderiv(id, gl::COMPILE_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len = 0;
            gl::GetShaderiv(id, gl::INFO_LOG_LENGTH, &mut len);
            let log = read_info_log(len, |capacity, buf| {
                gl::GetShaderInfoLog(id, capacity, ptr::null_mut(), buf)
            });

            gl::DeleteShader(id);
            return Err(Error::CompileFailure(stage, log));
        }

        if let Err(err) = check() {
            gl::DeleteShader(id);
            return Err(err);
        }

        Ok(id)
    }

    unsafe fn delete_shader(&mut self, id: u32) -> Result<()> {
        gl::DeleteShader(id);
        check()
    }

    unsafe fn create_program(&mut self) -> Result<u32> {
        let id = gl::CreateProgram();
        if id == 0 {
            return Err(Error::CreationFailure("program"));
        }

        check()?;
        Ok(id)
    }

    unsafe fn link_program(&mut self, id: u32, shaders: &[u32]) -> Result<()> {
        for shader in shaders {
            gl::AttachShader(id, *shader);
        }

        gl::LinkProgram(id);

        let mut status = GLint::from(gl::FALSE);
        gl::GetProgramiv(id, gl::LINK_STATUS, &mut status);

        if status != GLint::from(gl::TRUE) {
            let mut len: GLint = 0;
            gl::GetProgramiv(id, gl::INFO_LOG_LENGTH, &mut len);
            let log = read_info_log(len, |capacity, buf| {
                gl::GetProgramInfoLog(id, capacity, ptr::null_mut(), buf)
            });

            return Err(Error::LinkFailure(id, log));
        }

        check()
    }

    unsafe fn delete_program(&mut self, id: u32) -> Result<()> {
        if self.binded_program == Some(id) {
            self.binded_program = None;
        }

        gl::DeleteProgram(id);
        check()
    }

    unsafe fn bind_program(&mut self, id: u32) -> Result<()> {
        if self.binded_program == Some(id) {
            return Ok(());
        }

        gl::UseProgram(id);
        check()?;

        self.binded_program = Some(id);
        Ok(())
    }

    unsafe fn uniform_location(&mut self, id: u32, name: &str) -> Result<i32> {
        let c_name = ::std::ffi::CString::new(name.as_bytes()).unwrap();
        let location = gl::GetUniformLocation(id, c_name.as_ptr());
        check()?;
        Ok(location)
    }

    unsafe fn set_uniform(&mut self, location: i32, variable: UniformVariable) -> Result<()> {
        match variable {
            UniformVariable::Bool(v) => gl::Uniform1i(location, GLint::from(v)),
            UniformVariable::I32(v) => gl::Uniform1i(location, v),
            UniformVariable::F32(v) => gl::Uniform1f(location, v),
            UniformVariable::Vector2f(v) => gl::Uniform2f(location, v[0], v[1]),
            UniformVariable::Vector3f(v) => gl::Uniform3f(location, v[0], v[1], v[2]),
        }

        check()
    }

    unsafe fn create_mesh(&mut self) -> Result<(u32, u32)> {
        let mut vao = 0;
        gl::GenVertexArrays(1, &mut vao);
        if vao == 0 {
            return Err(Error::CreationFailure("vertex array"));
        }

        gl::BindVertexArray(vao);

        let mut vbo = 0;
        gl::GenBuffers(1, &mut vbo);
        if vbo == 0 {
            gl::BindVertexArray(0);
            gl::DeleteVertexArrays(1, &vao);
            return Err(Error::CreationFailure("buffer"));
        }

        gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
        gl::BufferData(gl::ARRAY_BUFFER, 0, ptr::null(), gl::STATIC_DRAW);

        // Tightly packed three-float positions at attribute 0.
        gl::EnableVertexAttribArray(0);
        gl::VertexAttribPointer(
            0,
            3,
            gl::FLOAT,
            gl::FALSE,
            3 * ::std::mem::size_of::<f32>() as GLsizei,
            ptr::null(),
        );
        gl::DisableVertexAttribArray(0);

        gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        gl::BindVertexArray(0);

        check()?;
        Ok((vao, vbo))
    }

    unsafe fn update_vertex_buffer(&mut self, vbo: u32, data: &[u8]) -> Result<()> {
        gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

        let value = if data.is_empty() {
            ptr::null()
        } else {
            &data[0] as *const u8 as *const c_void
        };

        gl::BufferData(gl::ARRAY_BUFFER, data.len() as isize, value, gl::STATIC_DRAW);
        gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        check()
    }

    unsafe fn delete_mesh(&mut self, vao: u32, vbo: u32) -> Result<()> {
        gl::DeleteVertexArrays(1, &vao);
        gl::DeleteBuffers(1, &vbo);
        check()
    }

    unsafe fn draw(&mut self, vao: u32, primitive: Primitive, count: usize) -> Result<u32> {
        gl::BindVertexArray(vao);
        gl::EnableVertexAttribArray(0);
        gl::DrawArrays(primitive.into(), 0, count as GLsizei);
        gl::DisableVertexAttribArray(0);
        gl::BindVertexArray(0);

        check()?;
        Ok(count as u32)
    }

    unsafe fn flush(&mut self) -> Result<()> {
        gl::Finish();
        check()
    }
}

unsafe fn read_info_log<F>(len: GLint, f: F) -> String
where
    F: FnOnce(GLsizei, *mut GLchar),
{
    if len <= 0 {
        return String::new();
    }

    // The reported length includes the trailing null character, and the
    // writer fills the buffer up to its capacity terminator included.
    let mut buf = vec![0u8; len as usize];
    f(len, buf.as_mut_ptr() as *mut GLchar);
    buf.pop();

    String::from_utf8_lossy(&buf).into_owned()
}

unsafe fn check() -> Result<()> {
    match gl::GetError() {
        gl::NO_ERROR => Ok(()),

        gl::INVALID_ENUM => Err(Error::Backend(
            "[GL] An unacceptable value is specified for an enumerated argument.".into(),
        )),

        gl::INVALID_VALUE => Err(Error::Backend(
            "[GL] A numeric argument is out of range.".into(),
        )),

        gl::INVALID_OPERATION => Err(Error::Backend(
            "[GL] The specified operation is not allowed in the current state.".into(),
        )),

        gl::INVALID_FRAMEBUFFER_OPERATION => Err(Error::Backend(
            "[GL] The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
                .into(),
        )),

        gl::OUT_OF_MEMORY => Err(Error::Backend(
            "[GL] There is not enough memory left to execute the command.".into(),
        )),

        _ => Err(Error::Backend("[GL] Oops, Unknown OpenGL error.".into())),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::slice;

    #[test]
    fn info_log_buffer_has_room_for_the_terminator() {
        let raw = b"0:1(10): error: syntax error\0";
        let log = unsafe {
            read_info_log(raw.len() as GLint, |capacity, buf| {
                // The writer fills the whole buffer, terminator included.
                assert_eq!(capacity as usize, raw.len());
                let dst = slice::from_raw_parts_mut(buf as *mut u8, capacity as usize);
                dst.copy_from_slice(raw);
            })
        };

        assert_eq!(log, "0:1(10): error: syntax error");
    }

    #[test]
    fn empty_info_log() {
        let log = unsafe { read_info_log(0, |_, _| panic!("nothing to report")) };
        assert!(log.is_empty());
    }
}
