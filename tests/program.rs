use lumen::context;
use lumen::prelude::*;

const VS: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
void main() {
  gl_Position = vec4(aPos.x, aPos.y, aPos.z, 1.0);
}
";

const FS: &str = "#version 330 core
out vec4 FragColor;
uniform vec3 color;
void main() {
  FragColor = vec4(color, 1.0f);
}
";

fn testbed() -> Result<Program> {
    let vertex = Shader::new(ShaderStage::Vertex, VS);
    let fragment = Shader::new(ShaderStage::Fragment, FS);
    vertex.compile()?;
    fragment.compile()?;

    let program = Program::new(vec![vertex, fragment])?;
    program.compile()?;
    Ok(program)
}

#[test]
fn construction_requires_context() {
    let _ = env_logger::try_init();
    assert!(!context::valid());

    match Program::new(vec![]) {
        Err(Error::ContextNotFound) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    match Shader::new(ShaderStage::Vertex, VS).compile() {
        Err(Error::ContextNotFound) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn uniform_location_is_cached() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let program = testbed().unwrap();
    program.bind().unwrap();
    program.set("color", [1.0, 0.0, 0.0]).unwrap();
    program.set("color", [0.0, 1.0, 0.0]).unwrap();
    program.set("color", [0.0, 0.0, 1.0]).unwrap();

    // Clones share the cache, so a lookup through a sibling is a hit too.
    let sibling = program.clone();
    sibling.set("color", [1.0, 1.0, 1.0]).unwrap();

    assert_eq!(probe.lookups(program.id(), "color"), 1);
    assert_eq!(probe.uniform_writes().len(), 4);

    drop(program);
    drop(sibling);
    context::discard();
}

#[test]
fn unknown_uniform_fails_without_side_effects() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let program = testbed().unwrap();
    program.bind().unwrap();

    match program.set("tint", 1.0f32) {
        Err(Error::UniformNotFound(name, id)) => {
            assert_eq!(name, "tint");
            assert_eq!(id, program.id());
        }
        other => panic!("unexpected result: {:?}", other),
    }

    assert!(probe.uniform_writes().is_empty());

    drop(program);
    context::discard();
}

#[test]
fn clone_outlives_the_original() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let program = testbed().unwrap();
    let id = program.id();
    let sibling = program.clone();
    drop(program);

    sibling.bind().unwrap();
    sibling.set("color", [0.5, 0.5, 0.5]).unwrap();
    assert_eq!(sibling.id(), id);
    assert_eq!(probe.uniform_writes().len(), 1);

    drop(sibling);
    assert_eq!(probe.live_objects(), 0);
    context::discard();
}

#[test]
fn bind_and_set_reject_an_unlinked_program() {
    let _ = env_logger::try_init();
    let _probe = context::setup_headless();

    let vertex = Shader::new(ShaderStage::Vertex, VS);
    vertex.compile().unwrap();
    let program = Program::new(vec![vertex]).unwrap();

    match program.bind() {
        Err(Error::ProgramNotLinked(id)) => assert_eq!(id, program.id()),
        other => panic!("unexpected result: {:?}", other),
    }

    match program.set("color", [1.0, 1.0, 1.0]) {
        Err(Error::ProgramNotLinked(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    context::discard();
}

#[test]
fn failed_link_leaves_the_program_valid() {
    let _ = env_logger::try_init();
    let _probe = context::setup_headless();

    let program = Program::new(vec![]).unwrap();
    match program.compile() {
        Err(Error::LinkFailure(id, _)) => assert_eq!(id, program.id()),
        other => panic!("unexpected result: {:?}", other),
    }

    assert!(!program.linked());

    // Retrying is allowed; linking is deterministic, so it fails the same
    // way.
    match program.compile() {
        Err(Error::LinkFailure(_, _)) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    context::discard();
}

#[test]
fn uncompiled_stage_fails_fast() {
    let _ = env_logger::try_init();
    let _probe = context::setup_headless();

    let vertex = Shader::new(ShaderStage::Vertex, VS);
    let program = Program::new(vec![vertex]).unwrap();

    match program.compile() {
        Err(Error::ShaderNotCompiled) => {}
        other => panic!("unexpected result: {:?}", other),
    }

    context::discard();
}

#[test]
fn compile_failure_carries_the_diagnostic() {
    let _ = env_logger::try_init();
    let _probe = context::setup_headless();

    let fragment = Shader::new(ShaderStage::Fragment, "");
    match fragment.compile() {
        Err(Error::CompileFailure(ShaderStage::Fragment, log)) => assert!(!log.is_empty()),
        other => panic!("unexpected result: {:?}", other),
    }

    context::discard();
}

#[test]
fn dropping_releases_every_native_object() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let program = testbed().unwrap();
    assert!(probe.allocations() > 0);

    drop(program);
    assert_eq!(probe.live_objects(), 0);
    assert_eq!(probe.releases(), probe.allocations());

    context::discard();
}
