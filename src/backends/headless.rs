//! A headless backend that allocates nothing on a GPU. It hands out
//! synthetic handles and keeps a transcript of every native call, which makes
//! it double as the instrumentation layer for tests: lookup counts, draw-call
//! vertex counts and allocation/release balances are all observable through
//! the probe methods.

use std::cell::RefCell;
use std::rc::Rc;

use crate::errors::*;
use crate::geometry::Primitive;
use crate::program::UniformVariable;
use crate::shader::ShaderStage;
use crate::utils::FastHashMap;

use super::Visitor;

#[derive(Debug, Default)]
struct ProgramRecord {
    linked: bool,
    uniforms: Vec<String>,
}

#[derive(Debug)]
struct MeshRecord {
    vbo: u32,
    len: usize,
}

#[derive(Debug, Default)]
struct Recorder {
    next_id: u32,
    // Shader id to the uniform names declared in its source.
    shaders: FastHashMap<u32, Vec<String>>,
    programs: FastHashMap<u32, ProgramRecord>,
    meshes: FastHashMap<u32, MeshRecord>,
    allocations: usize,
    releases: usize,
    lookups: Vec<(u32, String)>,
    binds: Vec<u32>,
    writes: Vec<(i32, UniformVariable)>,
    draws: Vec<(Primitive, usize)>,
}

impl Recorder {
    fn allocate(&mut self) -> u32 {
        self.next_id += 1;
        self.allocations += 1;
        self.next_id
    }
}

/// The recording headless visitor. Clones share one transcript, so the value
/// returned from `context::setup_headless` stays valid as a probe after its
/// sibling has been installed as the active backend.
#[derive(Debug, Clone, Default)]
pub struct HeadlessVisitor {
    inner: Rc<RefCell<Recorder>>,
}

impl HeadlessVisitor {
    pub fn new() -> Self {
        Default::default()
    }

    /// The number of location queries issued for the named uniform of the
    /// given program.
    pub fn lookups(&self, id: u32, name: &str) -> usize {
        self.inner
            .borrow()
            .lookups
            .iter()
            .filter(|&&(p, ref n)| p == id && n == name)
            .count()
    }

    /// The synthetic location assigned to a uniform at link time, if any.
    pub fn location(&self, id: u32, name: &str) -> Option<i32> {
        self.inner
            .borrow()
            .programs
            .get(&id)
            .and_then(|p| p.uniforms.iter().position(|n| n == name))
            .map(|v| v as i32)
    }

    /// The activated program ids, in submission order.
    pub fn binds(&self) -> Vec<u32> {
        self.inner.borrow().binds.clone()
    }

    /// Every uniform write, as `(location, variable)`, in submission order.
    pub fn uniform_writes(&self) -> Vec<(i32, UniformVariable)> {
        self.inner.borrow().writes.clone()
    }

    /// Every submitted draw-call, as `(primitive, vertex count)`.
    pub fn draws(&self) -> Vec<(Primitive, usize)> {
        self.inner.borrow().draws.clone()
    }

    /// The number of native objects allocated so far.
    pub fn allocations(&self) -> usize {
        self.inner.borrow().allocations
    }

    /// The number of native objects released so far.
    pub fn releases(&self) -> usize {
        self.inner.borrow().releases
    }

    /// Allocated and never released native objects.
    pub fn live_objects(&self) -> usize {
        let recorder = self.inner.borrow();
        recorder.allocations - recorder.releases
    }
}

/// Extracts the names of `uniform` declarations from GLSL source text.
fn parse_uniforms(src: &str) -> Vec<String> {
    let mut names = Vec::new();
    for line in src.lines() {
        let line = line.trim();
        if !line.starts_with("uniform ") {
            continue;
        }

        if let Some(name) = line
            .trim_end_matches(';')
            .split_whitespace()
            .last()
            .filter(|v| !v.is_empty())
        {
            names.push(name.to_string());
        }
    }

    names
}

impl Visitor for HeadlessVisitor {
    unsafe fn create_shader(&mut self, stage: ShaderStage, src: &str) -> Result<u32> {
        if src.trim().is_empty() {
            return Err(Error::CompileFailure(
                stage,
                "0:0(0): error: empty source text".into(),
            ));
        }

        let mut recorder = self.inner.borrow_mut();
        let id = recorder.allocate();
        let uniforms = parse_uniforms(src);
        recorder.shaders.insert(id, uniforms);
        Ok(id)
    }

    unsafe fn delete_shader(&mut self, id: u32) -> Result<()> {
        let mut recorder = self.inner.borrow_mut();
        recorder
            .shaders
            .remove(&id)
            .ok_or_else(|| Error::Backend(format!("shader {} is invalid.", id)))?;
        recorder.releases += 1;
        Ok(())
    }

    unsafe fn create_program(&mut self) -> Result<u32> {
        let mut recorder = self.inner.borrow_mut();
        let id = recorder.allocate();
        recorder.programs.insert(id, ProgramRecord::default());
        Ok(id)
    }

    unsafe fn link_program(&mut self, id: u32, shaders: &[u32]) -> Result<()> {
        if shaders.is_empty() {
            return Err(Error::LinkFailure(id, "error: no shader stages attached".into()));
        }

        let mut recorder = self.inner.borrow_mut();
        let mut uniforms = Vec::new();
        for sid in shaders {
            let declared = recorder
                .shaders
                .get(sid)
                .ok_or_else(|| Error::Backend(format!("shader {} is invalid.", sid)))?;

            for name in declared {
                if !uniforms.contains(name) {
                    uniforms.push(name.clone());
                }
            }
        }

        let program = recorder
            .programs
            .get_mut(&id)
            .ok_or_else(|| Error::Backend(format!("program {} is invalid.", id)))?;

        program.linked = true;
        program.uniforms = uniforms;
        Ok(())
    }

    unsafe fn delete_program(&mut self, id: u32) -> Result<()> {
        let mut recorder = self.inner.borrow_mut();
        recorder
            .programs
            .remove(&id)
            .ok_or_else(|| Error::Backend(format!("program {} is invalid.", id)))?;
        recorder.releases += 1;
        Ok(())
    }

    unsafe fn bind_program(&mut self, id: u32) -> Result<()> {
        self.inner.borrow_mut().binds.push(id);
        Ok(())
    }

    unsafe fn uniform_location(&mut self, id: u32, name: &str) -> Result<i32> {
        let mut recorder = self.inner.borrow_mut();
        recorder.lookups.push((id, name.to_string()));

        let location = recorder
            .programs
            .get(&id)
            .ok_or_else(|| Error::Backend(format!("program {} is invalid.", id)))?
            .uniforms
            .iter()
            .position(|v| v == name)
            .map(|v| v as i32)
            .unwrap_or(-1);

        Ok(location)
    }

    unsafe fn set_uniform(&mut self, location: i32, variable: UniformVariable) -> Result<()> {
        self.inner.borrow_mut().writes.push((location, variable));
        Ok(())
    }

    unsafe fn create_mesh(&mut self) -> Result<(u32, u32)> {
        let mut recorder = self.inner.borrow_mut();
        let vao = recorder.allocate();
        let vbo = recorder.allocate();
        recorder.meshes.insert(vao, MeshRecord { vbo, len: 0 });
        Ok((vao, vbo))
    }

    unsafe fn update_vertex_buffer(&mut self, vbo: u32, data: &[u8]) -> Result<()> {
        let mut recorder = self.inner.borrow_mut();
        let mesh = recorder
            .meshes
            .values_mut()
            .find(|v| v.vbo == vbo)
            .ok_or_else(|| Error::Backend(format!("buffer {} is invalid.", vbo)))?;

        mesh.len = data.len();
        Ok(())
    }

    unsafe fn delete_mesh(&mut self, vao: u32, vbo: u32) -> Result<()> {
        let mut recorder = self.inner.borrow_mut();

        // Leave the record untouched unless the whole pair matches, so a
        // rejected deletion does not skew the allocation balance.
        let mesh = recorder
            .meshes
            .get(&vao)
            .ok_or_else(|| Error::Backend(format!("vertex array {} is invalid.", vao)))?;

        if mesh.vbo != vbo {
            return Err(Error::Backend(format!("buffer {} is invalid.", vbo)));
        }

        recorder.meshes.remove(&vao);
        recorder.releases += 2;
        Ok(())
    }

    unsafe fn draw(&mut self, vao: u32, primitive: Primitive, count: usize) -> Result<u32> {
        let mut recorder = self.inner.borrow_mut();
        if !recorder.meshes.contains_key(&vao) {
            return Err(Error::Backend(format!("vertex array {} is invalid.", vao)));
        }

        recorder.draws.push((primitive, count));
        Ok(count as u32)
    }

    unsafe fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
