//! GLSL checking.
//!
//! Sources are parsed with the [`glsl`] crate. That catches syntax errors but not type errors. The
//! parsed translation unit gives the interface of the stage, so that linking can be checked and
//! indices handed out.

use glsl::parser::Parse as _;
use glsl::syntax::{
  Declaration, ExternalDeclaration, InitDeclaratorList, StorageQualifier, TranslationUnit,
  TypeQualifierSpec,
};

use crate::shader::StageType;

/// Interface of a shader stage: its inputs, outputs and uniforms, in declaration order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Interface {
  pub inputs: Vec<String>,
  pub outputs: Vec<String>,
  pub uniforms: Vec<String>,
}

/// Parse a stage source and extract its interface.
///
/// The error is a diagnostic meant for humans.
pub fn check(ty: StageType, src: &str) -> Result<Interface, String> {
  if src.trim().is_empty() {
    return Err("error: empty translation unit".to_owned());
  }

  let unit =
    TranslationUnit::parse(src).map_err(|e| format!("syntax error: {}", e.info.trim_end()))?;

  let mut interface = Interface::default();
  let mut has_main = false;

  for decl in &(unit.0).0 {
    match *decl {
      ExternalDeclaration::FunctionDefinition(ref def) => {
        has_main |= def.prototype.name.0 == "main";
      }

      ExternalDeclaration::Declaration(Declaration::InitDeclaratorList(ref list)) => {
        declare(ty, list, &mut interface)?;
      }

      _ => (),
    }
  }

  if has_main {
    Ok(interface)
  } else {
    Err("error: no definition of main()".to_owned())
  }
}

fn declare(
  ty: StageType,
  list: &InitDeclaratorList,
  interface: &mut Interface,
) -> Result<(), String> {
  let storage = list
    .head
    .ty
    .qualifier
    .iter()
    .flat_map(|qualifier| qualifier.qualifiers.0.iter())
    .find_map(|spec| match *spec {
      TypeQualifierSpec::Storage(
        ref storage @ (StorageQualifier::In
        | StorageQualifier::Out
        | StorageQualifier::Uniform
        | StorageQualifier::Attribute
        | StorageQualifier::Varying),
      ) => Some(storage),
      _ => None,
    });

  let target = match (storage, ty) {
    (None, _) => return Ok(()),
    (Some(StorageQualifier::Uniform), _) => &mut interface.uniforms,
    (Some(StorageQualifier::In), _)
    | (Some(StorageQualifier::Attribute), StageType::VertexShader)
    | (Some(StorageQualifier::Varying), StageType::FragmentShader) => &mut interface.inputs,
    (Some(StorageQualifier::Out), _) | (Some(StorageQualifier::Varying), StageType::VertexShader) => {
      &mut interface.outputs
    }
    (Some(_), _) => return Err(format!("error: 'attribute' : not supported in {}", ty)),
  };

  let names = list
    .head
    .name
    .iter()
    .chain(list.tail.iter().map(|decl| &decl.ident.ident))
    .map(|name| name.0.clone());

  target.extend(names);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  const VS: &str = "#version 330 core\n\
                    in vec3 position;\n\
                    void main() {\n\
                      gl_Position = vec4(position, 1.);\n\
                    }\n";

  #[test]
  fn interface() {
    let src = "#version 330 core\n\
               // a comment with in vec3 fake;\n\
               layout (location = 0) in vec3 position;\n\
               in vec3 color; in vec2 texCoord;\n\
               /* block\n\
                  comment */\n\
               out vec3 v_color;\n\
               uniform mat4 model, view;\n\
               uniform highp mat4 proj;\n\
               const float scale = 2.;\n\
               void main() {\n\
                 v_color = color;\n\
                 gl_Position = proj * view * model * vec4(position * scale, 1.);\n\
               }\n";

    let interface = check(StageType::VertexShader, src).unwrap();

    assert_eq!(interface.inputs, vec!["position", "color", "texCoord"]);
    assert_eq!(interface.outputs, vec!["v_color"]);
    assert_eq!(interface.uniforms, vec!["model", "view", "proj"]);
  }

  #[test]
  fn varying_direction_depends_on_stage() {
    let src = "varying vec2 uv;\nvoid main() {}\n";

    let vs = check(StageType::VertexShader, src).unwrap();
    assert_eq!(vs.outputs, vec!["uv"]);

    let fs = check(StageType::FragmentShader, src).unwrap();
    assert_eq!(fs.inputs, vec!["uv"]);
  }

  #[test]
  fn attribute_in_fragment_shader() {
    let err = check(StageType::FragmentShader, "attribute vec3 p;\nvoid main() {}").unwrap_err();
    assert!(err.contains("attribute"));
  }

  #[test]
  fn empty_source() {
    let err = check(StageType::VertexShader, " \n\t").unwrap_err();
    assert!(err.contains("empty"));
  }

  #[test]
  fn only_directives() {
    let err = check(StageType::VertexShader, "#version 330 core\n").unwrap_err();
    assert!(err.contains("main"));
  }

  #[test]
  fn missing_semicolon() {
    assert!(check(StageType::VertexShader, VS).is_ok());

    let src = VS.replace("1.);", "1.)");
    assert!(check(StageType::VertexShader, &src).is_err());
  }

  #[test]
  fn garbage_body() {
    let src = "void main() {\n  this is not glsl at all = = ; floot x;\n}\n";
    let err = check(StageType::FragmentShader, src).unwrap_err();
    assert!(err.starts_with("syntax error"));
  }

  #[test]
  fn unmatched_brace() {
    let err = check(StageType::VertexShader, "void main() {\n  gl_Position = vec4(0.);\n").unwrap_err();
    assert!(err.starts_with("syntax error"));
  }

  #[test]
  fn unterminated_comment() {
    assert!(check(StageType::VertexShader, "/* oops\nvoid main() {}\n").is_err());
  }

  #[test]
  fn missing_main() {
    let err = check(StageType::VertexShader, "in vec3 p;\nvoid domain() {}\n").unwrap_err();
    assert!(err.contains("main"));
  }

  #[test]
  fn arrays_and_initializers() {
    let src = "uniform float weights[4];\nuniform int mode = 2;\nvoid main() {}";
    let interface = check(StageType::FragmentShader, src).unwrap();
    assert_eq!(interface.uniforms, vec!["weights", "mode"]);
  }
}
