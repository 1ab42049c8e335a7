//! Shader program builder.
//!
//! Compiles two WGSL stages through a [`RenderContext`], links them, and
//! resolves a fixed list of uniform names. The resolved locations travel
//! alongside the program handle in [`ShaderProgram`]; the handle itself is
//! never mutated.

pub mod reflect;
mod sources;

use std::collections::HashMap;
use std::fmt;

use crate::render::context::{ProgramHandle, RenderContext, ShaderHandle, UniformLocation};
use crate::render::SetupError;

pub use sources::{
    CONSTANT_COLOR_FRAGMENT, CONSTANT_COLOR_VERTEX, PER_VERTEX_COLOR_FRAGMENT,
    PER_VERTEX_COLOR_VERTEX, UNIFORM_NAMES,
};

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// WGSL attribute name of the stage (`vertex` / `fragment`).
    pub const fn label(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }

    pub(crate) fn to_naga(self) -> naga::ShaderStage {
        match self {
            Self::Vertex => naga::ShaderStage::Vertex,
            Self::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Uniform name → location mapping, populated once after linking.
///
/// A name the program does not declare maps to `None`, the "not found"
/// sentinel. Unresolved names are not errors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformLocations {
    names: Vec<String>,
    locations: HashMap<String, Option<UniformLocation>>,
}

impl UniformLocations {
    /// Location for `name`. `None` if unresolved or never requested.
    pub fn get(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied().flatten()
    }

    /// Whether `name` was part of the resolved list.
    pub fn contains(&self, name: &str) -> bool {
        self.locations.contains_key(name)
    }

    /// Requested names in resolution order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    fn insert(&mut self, name: &str, location: Option<UniformLocation>) {
        if self.locations.insert(name.to_string(), location).is_none() {
            self.names.push(name.to_string());
        }
    }
}

/// A linked program plus its resolved uniform locations.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    pub handle: ProgramHandle,
    pub uniforms: UniformLocations,
}

/// Compiles one stage from WGSL source.
pub fn compile<C: RenderContext + ?Sized>(
    ctx: &mut C,
    stage: ShaderStage,
    source: &str,
) -> Result<ShaderHandle, SetupError> {
    let handle = ctx.compile_shader(stage, source)?;
    log::debug!("compiled {stage} shader {handle:?}");
    Ok(handle)
}

/// Links a compiled vertex and fragment stage into a program.
pub fn link<C: RenderContext + ?Sized>(
    ctx: &mut C,
    vertex: ShaderHandle,
    fragment: ShaderHandle,
) -> Result<ProgramHandle, SetupError> {
    let program = ctx.link_program(vertex, fragment)?;
    log::debug!("linked program {program:?} from {vertex:?} + {fragment:?}");
    Ok(program)
}

/// Resolves each of `names` on `program`, in order.
pub fn resolve_uniforms<C: RenderContext + ?Sized>(
    ctx: &C,
    program: ProgramHandle,
    names: &[&str],
) -> UniformLocations {
    let mut out = UniformLocations::default();
    for &name in names {
        let location = ctx.uniform_location(program, name);
        if location.is_none() {
            log::debug!("uniform `{name}` not found on {program:?}");
        }
        out.insert(name, location);
    }
    out
}

/// Compiles, links and resolves uniforms in one step.
pub fn build_program<C: RenderContext + ?Sized>(
    ctx: &mut C,
    vertex_source: &str,
    fragment_source: &str,
    uniform_names: &[&str],
) -> Result<ShaderProgram, SetupError> {
    let vertex = compile(ctx, ShaderStage::Vertex, vertex_source)?;
    let fragment = compile(ctx, ShaderStage::Fragment, fragment_source)?;
    let handle = link(ctx, vertex, fragment)?;
    let uniforms = resolve_uniforms(ctx, handle, uniform_names);
    Ok(ShaderProgram { handle, uniforms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessContext;

    fn ctx() -> HeadlessContext {
        HeadlessContext::new()
    }

    // ── compile ───────────────────────────────────────────────────────────

    #[test]
    fn compiles_bundled_sources() {
        let mut c = ctx();
        assert!(compile(&mut c, ShaderStage::Vertex, PER_VERTEX_COLOR_VERTEX).is_ok());
        assert!(compile(&mut c, ShaderStage::Fragment, PER_VERTEX_COLOR_FRAGMENT).is_ok());
        assert!(compile(&mut c, ShaderStage::Vertex, CONSTANT_COLOR_VERTEX).is_ok());
        assert!(compile(&mut c, ShaderStage::Fragment, CONSTANT_COLOR_FRAGMENT).is_ok());
    }

    #[test]
    fn invalid_source_yields_compilation_error_and_no_program() {
        let mut c = ctx();
        let res = build_program(&mut c, "this is not wgsl", PER_VERTEX_COLOR_FRAGMENT, &UNIFORM_NAMES);
        match res {
            Err(SetupError::ShaderCompilation { stage, log }) => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(!log.is_empty());
            }
            other => panic!("expected compilation error, got {other:?}"),
        }
        assert_eq!(c.program_count(), 0);
    }

    // ── link ──────────────────────────────────────────────────────────────

    #[test]
    fn mismatched_stage_interfaces_yield_link_error() {
        let mut c = ctx();
        let res = build_program(
            &mut c,
            CONSTANT_COLOR_VERTEX,
            PER_VERTEX_COLOR_FRAGMENT,
            &UNIFORM_NAMES,
        );
        assert!(matches!(res, Err(SetupError::ShaderLink { .. })), "{res:?}");
    }

    // ── resolve_uniforms ──────────────────────────────────────────────────

    #[test]
    fn resolves_the_three_matrices_in_order() {
        let mut c = ctx();
        let program =
            build_program(&mut c, PER_VERTEX_COLOR_VERTEX, PER_VERTEX_COLOR_FRAGMENT, &UNIFORM_NAMES)
                .unwrap();

        let names: Vec<_> = program.uniforms.names().collect();
        assert_eq!(names, UNIFORM_NAMES.to_vec());
        for name in UNIFORM_NAMES {
            assert!(program.uniforms.get(name).is_some(), "{name} unresolved");
        }
    }

    #[test]
    fn unknown_uniform_resolves_to_sentinel() {
        let mut c = ctx();
        let program = build_program(
            &mut c,
            PER_VERTEX_COLOR_VERTEX,
            PER_VERTEX_COLOR_FRAGMENT,
            &["model_matrix", "does_not_exist"],
        )
        .unwrap();

        assert!(program.uniforms.contains("does_not_exist"));
        assert_eq!(program.uniforms.get("does_not_exist"), None);
        assert!(program.uniforms.get("model_matrix").is_some());
        assert_eq!(program.uniforms.len(), 2);
    }

    #[test]
    fn duplicate_names_resolve_once() {
        let mut c = ctx();
        let program = build_program(
            &mut c,
            PER_VERTEX_COLOR_VERTEX,
            PER_VERTEX_COLOR_FRAGMENT,
            &["view_matrix", "view_matrix"],
        )
        .unwrap();
        assert_eq!(program.uniforms.len(), 1);
    }
}
