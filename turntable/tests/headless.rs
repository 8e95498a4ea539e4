use turntable::backend::framebuffer::FramebufferError;
use turntable::headless::{Command, Headless, HeadlessSurface};
use turntable::mesh::Mesh;
use turntable::render::{self, FrameRenderer, RenderError, SceneOpt};
use turntable::shader::types::Mat44;
use turntable::shader::{ProgramBuilder, ProgramError, StageError, StageType};
use turntable::surface::{Surface, WindowOpt};
use turntable::texture::Texels;
use turntable::RenderContext;

const VS: &str = r#"#version 330 core

in vec3 position;
in vec3 color;
in vec2 texCoord;

out vec3 v_color;
out vec2 v_uv;

uniform mat4 model;
uniform mat4 view;
uniform mat4 proj;

void main() {
  v_color = color;
  v_uv = texCoord;
  gl_Position = proj * view * model * vec4(position, 1.);
}
"#;

const FS: &str = r#"#version 330 core

in vec3 v_color;
in vec2 v_uv;

out vec4 frag;

uniform sampler2D tex;

void main() {
  frag = vec4(v_color, 1.) * texture(tex, v_uv);
}
"#;

fn checker() -> Texels {
  let data = (0..4 * 4)
    .flat_map(|i| {
      if (i % 4 + i / 4) % 2 == 0 {
        [255, 255, 255, 255]
      } else {
        [0, 0, 0, 255]
      }
    })
    .collect();

  Texels::new(4, 4, data).unwrap()
}

fn setup(
  surface: &mut HeadlessSurface,
  vs: &str,
  fs: &str,
) -> Result<FrameRenderer<Headless>, RenderError> {
  let program = ProgramBuilder::new(surface).from_strings(vs, fs).unwrap();
  let mesh = Mesh::builtin().unwrap();
  let scene = SceneOpt::default().set_aspect_ratio(surface.aspect_ratio());
  let start = surface.time();

  FrameRenderer::new(surface, program, &mesh, &checker(), &scene, start)
}

#[test]
fn renders_the_cube_once_per_frame() {
  let mut surface = HeadlessSurface::new(WindowOpt::default());
  let mut renderer = setup(&mut surface, VS, FS).unwrap();

  let frames = render::run(&mut surface, &mut renderer, Some(5)).unwrap();

  assert_eq!(frames, 5);
  assert_eq!(surface.presented(), 5);
  assert_eq!(surface.headless().draw_calls(), vec![(0, 36); 5]);
}

#[test]
fn setup_commands() {
  let mut surface = HeadlessSurface::new(WindowOpt::default());
  let _renderer = setup(&mut surface, VS, FS).unwrap();
  let commands = surface.headless().commands();

  assert!(commands.contains(&Command::UploadVertices {
    count: 42,
    attribs: vec![("position", 0), ("color", 1), ("texCoord", 2)],
  }));
  assert!(commands.contains(&Command::SetTextureUnit {
    name: "tex".to_owned(),
    unit: 0,
  }));
  assert!(commands.contains(&Command::SetDepthTest(true)));
  assert!(commands.contains(&Command::SetClearColor([1., 1., 1., 1.])));

  let scene = SceneOpt::default();
  assert_eq!(surface.headless().mat44_updates("view"), vec![scene.view()]);
  assert_eq!(
    surface.headless().mat44_updates("proj"),
    vec![scene.projection()]
  );
}

#[test]
fn model_follows_the_clock() {
  let mut surface = HeadlessSurface::new(WindowOpt::default()).set_frame_time(0.25);
  let mut renderer = setup(&mut surface, VS, FS).unwrap();

  render::run(&mut surface, &mut renderer, Some(3)).unwrap();

  let models = surface.headless().mat44_updates("model");
  assert_eq!(models.len(), 3);
  assert!(models[0].max_abs_diff(&Mat44::IDENTITY) < 1e-6);
  assert!(models[1].max_abs_diff(&render::rotation_z(0.25)) < 1e-6);
  assert!(models[2].max_abs_diff(&render::rotation_z(0.5)) < 1e-6);
}

#[test]
fn close_signal_stops_the_loop() {
  let mut surface = HeadlessSurface::new(WindowOpt::default()).set_close_after(2);
  let mut renderer = setup(&mut surface, VS, FS).unwrap();

  let frames = render::run(&mut surface, &mut renderer, None).unwrap();

  assert_eq!(frames, 2);
  assert!(surface.should_close());
}

#[test]
fn syntax_error_has_a_diagnostic() {
  let mut surface = HeadlessSurface::new(WindowOpt::default());
  let broken = FS.replace("texture(tex, v_uv);", "texture(tex, v_uv;");
  let err = ProgramBuilder::new(&mut surface)
    .from_strings(VS, &broken)
    .err()
    .unwrap();

  match err {
    ProgramError::StageError(StageError::CompilationFailed(_, log)) => {
      assert!(!log.is_empty());
    }
    e => panic!("unexpected error: {}", e),
  }

  assert_eq!(surface.headless().live_stages(), 0);
}

#[test]
fn missing_semicolon_fails_to_compile() {
  let mut surface = HeadlessSurface::new(WindowOpt::default());
  let broken = VS.replace("vec4(position, 1.);", "vec4(position, 1.)");
  let err = ProgramBuilder::new(&mut surface)
    .from_strings(&broken, FS)
    .err()
    .unwrap();

  assert!(matches!(
    err,
    ProgramError::StageError(StageError::CompilationFailed(StageType::VertexShader, _))
  ));
  assert_eq!(surface.headless().live_stages(), 0);
}

#[test]
fn unused_attribute_is_skipped() {
  let vs = VS
    .replace("in vec3 color;", "")
    .replace("v_color = color;", "v_color = vec3(1.);");
  let mut surface = HeadlessSurface::new(WindowOpt::default());
  let mut renderer = setup(&mut surface, &vs, FS).unwrap();

  render::run(&mut surface, &mut renderer, Some(1)).unwrap();

  assert!(surface
    .headless()
    .commands()
    .contains(&Command::UploadVertices {
      count: 42,
      attribs: vec![("position", 0), ("texCoord", 1)],
    }));
  assert_eq!(surface.headless().draw_calls(), vec![(0, 36)]);
}

#[test]
fn missing_texture_sampler_is_not_fatal() {
  let fs = "in vec3 v_color;\nin vec2 v_uv;\nout vec4 frag;\nvoid main() { frag = vec4(v_color, 1.); }";
  let mut surface = HeadlessSurface::new(WindowOpt::default());

  assert!(setup(&mut surface, VS, fs).is_ok());
}

#[test]
fn missing_model_uniform_is_fatal() {
  let vs = VS
    .replace("uniform mat4 model;", "")
    .replace("view * model *", "view *");
  let mut surface = HeadlessSurface::new(WindowOpt::default());

  match setup(&mut surface, &vs, FS) {
    Err(RenderError::Uniform(w)) => assert_eq!(w.to_string(), "inactive model uniform"),
    Err(e) => panic!("unexpected error: {}", e),
    Ok(_) => panic!("setup should fail"),
  }
}

#[test]
fn setup_errors_are_reported_before_the_texture_upload() {
  let mut surface = HeadlessSurface::new(WindowOpt::default());
  let program = ProgramBuilder::new(&mut surface).from_strings(VS, FS).unwrap();
  let mesh = Mesh::builtin().unwrap();
  surface.headless().raise_error("invalid value");

  let err = FrameRenderer::new(
    &mut surface,
    program,
    &mesh,
    &checker(),
    &SceneOpt::default(),
    0.,
  )
  .err()
  .unwrap();

  match err {
    RenderError::Framebuffer(FramebufferError::Backend(ref e)) => assert_eq!(e, "invalid value"),
    e => panic!("unexpected error: {}", e),
  }

  assert!(!surface
    .headless()
    .commands()
    .iter()
    .any(|cmd| matches!(cmd, Command::UploadTexture { .. })));
}

#[test]
fn lost_context_stops_the_loop() {
  let mut surface = HeadlessSurface::new(WindowOpt::default());
  let mut renderer = setup(&mut surface, VS, FS).unwrap();

  render::run(&mut surface, &mut renderer, Some(2)).unwrap();
  surface.backend().lose_context();

  match render::run(&mut surface, &mut renderer, Some(2)) {
    Err(RenderError::Framebuffer(FramebufferError::ContextLost)) => (),
    r => panic!("unexpected result: {:?}", r.map(|_| ())),
  }

  assert_eq!(surface.headless().draw_calls().len(), 2);
}

#[test]
fn program_outlives_nothing() {
  let mut surface = HeadlessSurface::new(WindowOpt::default());
  let renderer = setup(&mut surface, VS, FS).unwrap();

  assert_eq!(surface.headless().live_programs(), 1);
  drop(renderer);
  assert_eq!(surface.headless().live_programs(), 0);
}
