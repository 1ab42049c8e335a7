//! WGSL interface reflection.
//!
//! Both rendering contexts compile through here so that compile and link
//! failures are identical with or without a GPU.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Handle, Module, Type, TypeInner};

use crate::render::SetupError;

use super::ShaderStage;

/// A stage input or output bound to a `@location`.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceVar {
    pub name: Option<String>,
    pub location: u32,
    pub ty: TypeInner,
}

/// A `var<uniform>` global with an explicit resource binding.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformVar {
    pub name: String,
    pub group: u32,
    pub binding: u32,
    /// Byte size of the bound type.
    pub size: u32,
    pub ty: TypeInner,
}

/// Reflected interface of one compiled stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderInterface {
    pub stage: ShaderStage,
    pub entry_point: String,
    pub inputs: Vec<InterfaceVar>,
    pub outputs: Vec<InterfaceVar>,
    pub uniforms: Vec<UniformVar>,
}

impl ShaderInterface {
    /// Output bound at `location`, if any.
    pub fn output_at(&self, location: u32) -> Option<&InterfaceVar> {
        self.outputs.iter().find(|v| v.location == location)
    }
}

/// Interface of a linked program: both stages plus the merged uniform set.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInterface {
    pub vertex: ShaderInterface,
    pub fragment: ShaderInterface,
    pub uniforms: Vec<UniformVar>,
}

impl ProgramInterface {
    /// Links two reflected stages. See [`check_link`].
    pub fn link(vertex: &ShaderInterface, fragment: &ShaderInterface) -> Result<Self, SetupError> {
        let uniforms = check_link(vertex, fragment)?;
        Ok(Self {
            vertex: vertex.clone(),
            fragment: fragment.clone(),
            uniforms,
        })
    }

    pub fn uniform(&self, name: &str) -> Option<&UniformVar> {
        self.uniforms.iter().find(|u| u.name == name)
    }

    /// Vertex-stage input named `name`.
    pub fn attribute(&self, name: &str) -> Option<&InterfaceVar> {
        self.vertex.inputs.iter().find(|v| v.name.as_deref() == Some(name))
    }

    /// Number of bind groups the program needs (highest group + 1).
    pub fn bind_group_count(&self) -> u32 {
        self.uniforms.iter().map(|u| u.group + 1).max().unwrap_or(0)
    }
}

/// Parses and validates `source`, then extracts the interface of its entry
/// point for `stage`.
pub fn reflect(stage: ShaderStage, source: &str) -> Result<ShaderInterface, SetupError> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| SetupError::compile(stage, e.emit_to_string(source)))?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::empty());
    validator
        .validate(&module)
        .map_err(|e| SetupError::compile(stage, e.emit_to_string(source)))?;

    let Some(entry) = module.entry_points.iter().find(|ep| ep.stage == stage.to_naga()) else {
        return Err(SetupError::compile(
            stage,
            format!("no `@{}` entry point in module", stage.label()),
        ));
    };

    let mut inputs = Vec::new();
    for arg in &entry.function.arguments {
        collect_located(&module, arg.name.as_ref(), arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    let mut outputs = Vec::new();
    if let Some(result) = entry.function.result.as_ref() {
        collect_located(&module, None, result.ty, result.binding.as_ref(), &mut outputs);
    }

    Ok(ShaderInterface {
        stage,
        entry_point: entry.name.clone(),
        inputs,
        outputs,
        uniforms: collect_uniforms(&module),
    })
}

fn collect_located(
    module: &Module,
    name: Option<&String>,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<InterfaceVar>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(InterfaceVar {
            name: name.cloned(),
            location: *location,
            ty: module.types[ty].inner.clone(),
        }),
        // Builtins (`@builtin(position)` etc.) are not part of the user interface.
        Some(_) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect_located(module, m.name.as_ref(), m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn collect_uniforms(module: &Module) -> Vec<UniformVar> {
    let gctx = module.to_ctx();
    module
        .global_variables
        .iter()
        .filter(|(_, var)| matches!(var.space, AddressSpace::Uniform))
        .filter_map(|(_, var)| {
            let name = var.name.clone()?;
            let rb = var.binding.as_ref()?;
            let inner = &module.types[var.ty].inner;
            Some(UniformVar {
                name,
                group: rb.group,
                binding: rb.binding,
                size: inner.size(gctx),
                ty: inner.clone(),
            })
        })
        .collect()
}

/// Checks that `vertex` feeds every input of `fragment` and that shared
/// uniform bindings agree, returning the merged uniform set.
pub fn check_link(
    vertex: &ShaderInterface,
    fragment: &ShaderInterface,
) -> Result<Vec<UniformVar>, SetupError> {
    if vertex.stage != ShaderStage::Vertex {
        return Err(SetupError::link(format!(
            "expected a vertex stage, got {}",
            vertex.stage
        )));
    }
    if fragment.stage != ShaderStage::Fragment {
        return Err(SetupError::link(format!(
            "expected a fragment stage, got {}",
            fragment.stage
        )));
    }

    for input in &fragment.inputs {
        let label = input.name.as_deref().unwrap_or("<unnamed>");
        let Some(output) = vertex.output_at(input.location) else {
            return Err(SetupError::link(format!(
                "fragment input `{label}` at location {} is not written by the vertex stage",
                input.location
            )));
        };
        if output.ty != input.ty {
            return Err(SetupError::link(format!(
                "type mismatch at location {} (`{label}`): vertex writes {:?}, fragment reads {:?}",
                input.location, output.ty, input.ty
            )));
        }
    }

    let mut merged = vertex.uniforms.clone();
    for u in &fragment.uniforms {
        match merged.iter().find(|m| m.group == u.group && m.binding == u.binding) {
            Some(existing) if existing.name != u.name || existing.ty != u.ty => {
                return Err(SetupError::link(format!(
                    "uniform binding @group({}) @binding({}) declared as `{}` and `{}`",
                    u.group, u.binding, existing.name, u.name
                )));
            }
            Some(_) => {}
            None => merged.push(u.clone()),
        }
    }

    Ok(merged)
}
