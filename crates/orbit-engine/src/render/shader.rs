use crate::device::InitError;

/// WGSL source for the triangle program.
pub const TRIANGLE_SHADER: &str = include_str!("shaders/triangle.wgsl");

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

/// Parses and validates WGSL on the host and checks it against the pipeline
/// interface: `vs_main`/`fs_main` entry points and a uniform block at
/// group 0, binding 0.
///
/// wgpu reports shader errors through the device's uncaptured-error handler;
/// validating here turns them into an `InitError` before any GPU object is
/// built.
pub fn validate_shader(source: &str) -> Result<(), InitError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| InitError::ShaderCompile(e.message().to_string()))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| InitError::ShaderCompile(e.into_inner().to_string()))?;

    let entries = [
        (naga::ShaderStage::Vertex, VERTEX_ENTRY),
        (naga::ShaderStage::Fragment, FRAGMENT_ENTRY),
    ];
    for (stage, name) in entries {
        let found = module
            .entry_points
            .iter()
            .any(|ep| ep.stage == stage && ep.name == name);
        if !found {
            return Err(InitError::ShaderCompile(format!(
                "missing {stage:?} entry point `{name}`"
            )));
        }
    }

    let slot = naga::ResourceBinding {
        group: 0,
        binding: 0,
    };
    let has_uniform = module
        .global_variables
        .iter()
        .any(|(_, var)| var.space == naga::AddressSpace::Uniform && var.binding == Some(slot));
    if !has_uniform {
        return Err(InitError::ShaderCompile(
            "no uniform declared at @group(0) @binding(0)".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile_error(source: &str) -> String {
        match validate_shader(source) {
            Err(InitError::ShaderCompile(msg)) => msg,
            other => panic!("expected ShaderCompile, got {other:?}"),
        }
    }

    #[test]
    fn bundled_shader_is_valid() {
        validate_shader(TRIANGLE_SHADER).unwrap();
    }

    #[test]
    fn syntax_error_is_reported() {
        compile_error("@vertex fn vs_main( -> {");
    }

    #[test]
    fn type_error_is_reported() {
        let src = TRIANGLE_SHADER.replace("return in.color;", "return 1.0;");
        compile_error(&src);
    }

    #[test]
    fn renamed_entry_point_is_rejected() {
        let src = TRIANGLE_SHADER.replace("fn fs_main", "fn frag");
        let msg = compile_error(&src);
        assert!(msg.contains("fs_main"), "{msg}");
    }

    #[test]
    fn uniform_must_be_at_slot_zero() {
        let src = TRIANGLE_SHADER.replace("@binding(0)", "@binding(1)");
        let msg = compile_error(&src);
        assert!(msg.contains("@binding(0)"), "{msg}");
    }
}
