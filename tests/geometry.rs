use lumen::context;
use lumen::math::Vector3;
use lumen::prelude::*;

fn points() -> Vec<Vector3<f32>> {
    vec![
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(1.0, 1.0, 0.0),
    ]
}

#[test]
fn renders_exactly_the_uploaded_points() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let line = Line::with_points(Vector3::new(1.0, 0.0, 0.0), &points()).unwrap();
    line.render(TimePoint::from_millis(0)).unwrap();

    let program = line.program();
    assert_eq!(probe.binds(), vec![program.id()]);

    let location = probe.location(program.id(), "color").unwrap();
    assert_eq!(
        probe.uniform_writes(),
        vec![(location, UniformVariable::Vector3f([1.0, 0.0, 0.0]))]
    );

    assert_eq!(probe.draws(), vec![(Primitive::LineStrip, 3)]);

    drop(program);
    drop(line);
    context::discard();
}

#[test]
fn empty_line_renders_a_zero_vertex_draw() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let line = Line::new().unwrap();
    assert!(line.is_empty());
    assert_eq!(line.color(), Vector3::new(1.0, 1.0, 1.0));

    line.render(TimePoint::default()).unwrap();
    assert_eq!(probe.draws(), vec![(Primitive::LineStrip, 0)]);

    drop(line);
    context::discard();
}

#[test]
fn load_points_replaces_the_whole_buffer() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let line = Line::with_color(Vector3::new(0.0, 1.0, 0.0)).unwrap();

    line.load_points(&points()).unwrap();
    line.render(TimePoint::from_millis(16)).unwrap();

    line.load_points(&points()[..2]).unwrap();
    line.render(TimePoint::from_millis(32)).unwrap();

    line.load_points(&[]).unwrap();
    line.render(TimePoint::from_millis(48)).unwrap();

    assert_eq!(
        probe.draws(),
        vec![
            (Primitive::LineStrip, 3),
            (Primitive::LineStrip, 2),
            (Primitive::LineStrip, 0),
        ]
    );

    drop(line);
    context::discard();
}

#[test]
fn color_changes_apply_on_the_next_render() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let line = Line::with_points(Vector3::new(1.0, 0.0, 0.0), &points()).unwrap();
    line.render(TimePoint::from_millis(0)).unwrap();

    line.set_color(Vector3::new(0.0, 0.0, 1.0));
    assert_eq!(line.color(), Vector3::new(0.0, 0.0, 1.0));
    line.render(TimePoint::from_millis(16)).unwrap();

    let location = probe.location(line.program().id(), "color").unwrap();
    assert_eq!(
        probe.uniform_writes(),
        vec![
            (location, UniformVariable::Vector3f([1.0, 0.0, 0.0])),
            (location, UniformVariable::Vector3f([0.0, 0.0, 1.0])),
        ]
    );

    drop(line);
    context::discard();
}

#[test]
fn program_handle_shares_the_uniform_cache() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let line = Line::with_points(Vector3::new(1.0, 1.0, 0.0), &points()).unwrap();
    line.render(TimePoint::from_millis(0)).unwrap();

    // Writing through the exposed handle reuses the location resolved during
    // the render above.
    let program = line.program();
    program.set("color", [0.2, 0.2, 0.2]).unwrap();
    assert_eq!(probe.lookups(program.id(), "color"), 1);

    drop(program);
    drop(line);
    context::discard();
}

#[test]
fn injected_sources_swap_the_stock_shaders() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let fs = "#version 330 core
out vec4 FragColor;
uniform vec3 color;
uniform float opacity;
void main() {
  FragColor = vec4(color, opacity);
}
";

    let line =
        Line::with_sources(Vector3::new(1.0, 0.0, 1.0), lumen::geometry::LINE_VERTEX_SHADER, fs)
            .unwrap();
    line.render(TimePoint::from_millis(0)).unwrap();

    let program = line.program();
    program.set("opacity", 0.5f32).unwrap();
    assert!(probe.location(program.id(), "opacity").is_some());

    drop(program);
    drop(line);
    context::discard();
}

#[test]
fn dropping_a_line_releases_its_resources_once() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    let line = Line::with_color(Vector3::new(0.3, 0.3, 0.3)).unwrap();
    assert!(probe.allocations() > 0);

    let sibling = line.clone();
    drop(line);
    assert!(probe.live_objects() > 0);

    drop(sibling);
    assert_eq!(probe.live_objects(), 0);
    assert_eq!(probe.releases(), probe.allocations());

    context::discard();
}

#[test]
fn discarding_without_rendering_leaks_nothing() {
    let _ = env_logger::try_init();
    let probe = context::setup_headless();

    {
        let _line = Line::with_points(Vector3::new(0.0, 1.0, 1.0), &points()).unwrap();
    }

    assert_eq!(probe.live_objects(), 0);
    assert_eq!(probe.releases(), probe.allocations());
    assert!(probe.draws().is_empty());

    context::discard();
}
