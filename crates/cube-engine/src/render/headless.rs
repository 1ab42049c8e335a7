//! Recording rendering context.
//!
//! Compiles and links through the same WGSL reflection as the GPU backend but
//! never touches a device. Every accepted state change and draw is recorded,
//! and the last value written to each uniform is kept for inspection.

use std::collections::{BTreeMap, HashMap};

use glam::Mat4;

use crate::paint::Color;

use super::context::{
    AttributeLayout, BufferHandle, BufferUsage, ClearFlags, Primitive, ProgramHandle,
    RenderContext, ShaderHandle, UniformLocation,
};
use super::shader::ShaderStage;
use super::shader::reflect::{self, ProgramInterface, ShaderInterface};
use super::SetupError;

/// A recorded context call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    UseProgram(ProgramHandle),
    BufferData { buffer: BufferHandle, len: usize, usage: BufferUsage },
    VertexAttribPointer { location: u32, buffer: BufferHandle, layout: AttributeLayout },
    EnableVertexAttrib(u32),
    UniformMatrix4 { location: UniformLocation, matrix: Mat4 },
    SetDepthTest(bool),
    SetBlend(bool),
    Clear { color: Color, flags: ClearFlags },
    DrawArrays { primitive: Primitive, first: u32, count: u32 },
}

#[derive(Debug, Copy, Clone)]
struct AttributeState {
    buffer: BufferHandle,
    layout: AttributeLayout,
    enabled: bool,
}

/// Device-free [`RenderContext`].
#[derive(Debug)]
pub struct HeadlessContext {
    shaders: Vec<ShaderInterface>,
    programs: Vec<ProgramInterface>,
    buffers: Vec<Option<Vec<f32>>>,
    attributes: BTreeMap<u32, AttributeState>,
    uniforms: HashMap<(ProgramHandle, UniformLocation), Mat4>,
    current_program: Option<ProgramHandle>,
    depth_test: bool,
    blend: bool,
    commands: Vec<Command>,

    max_buffer_bytes: u64,
    max_buffers: usize,
}

impl Default for HeadlessContext {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessContext {
    /// Default buffer size limit, matching the wgpu default `max_buffer_size`.
    pub const DEFAULT_MAX_BUFFER_BYTES: u64 = 256 << 20;

    pub fn new() -> Self {
        Self {
            shaders: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            attributes: BTreeMap::new(),
            uniforms: HashMap::new(),
            current_program: None,
            depth_test: false,
            blend: false,
            commands: Vec::new(),
            max_buffer_bytes: Self::DEFAULT_MAX_BUFFER_BYTES,
            max_buffers: usize::MAX,
        }
    }

    /// Caps the byte size a single `buffer_data` call may allocate.
    pub fn with_max_buffer_bytes(mut self, bytes: u64) -> Self {
        self.max_buffer_bytes = bytes;
        self
    }

    /// Caps how many buffer names `create_buffer` hands out.
    pub fn with_max_buffers(mut self, count: usize) -> Self {
        self.max_buffers = count;
        self
    }

    /// All recorded commands, oldest first.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drains the recorded commands.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn current_program(&self) -> Option<ProgramHandle> {
        self.current_program
    }

    pub fn depth_test(&self) -> bool {
        self.depth_test
    }

    /// Contents last uploaded to `buffer`.
    pub fn buffer_contents(&self, buffer: BufferHandle) -> Option<&[f32]> {
        self.buffers.get(buffer.0 as usize)?.as_deref()
    }

    /// Locations of the currently enabled attributes, ascending.
    pub fn enabled_attributes(&self) -> Vec<u32> {
        self.attributes
            .iter()
            .filter(|(_, a)| a.enabled)
            .map(|(loc, _)| *loc)
            .collect()
    }

    /// Layout bound to attribute `location`.
    pub fn attribute_layout(&self, location: u32) -> Option<AttributeLayout> {
        self.attributes.get(&location).map(|a| a.layout)
    }

    /// Last matrix written to `location` of `program`.
    pub fn uniform_value(&self, program: ProgramHandle, location: UniformLocation) -> Option<Mat4> {
        self.uniforms.get(&(program, location)).copied()
    }

    /// Last matrix written to the uniform `name` of the current program.
    pub fn uniform_by_name(&self, name: &str) -> Option<Mat4> {
        let program = self.current_program?;
        let location = self.uniform_location(program, name)?;
        self.uniform_value(program, location)
    }

    /// Number of recorded draw calls.
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::DrawArrays { .. }))
            .count()
    }

    fn program(&self, handle: ProgramHandle) -> Option<&ProgramInterface> {
        self.programs.get(handle.0 as usize)
    }
}

impl RenderContext for HeadlessContext {
    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderHandle, SetupError> {
        let interface = reflect::reflect(stage, source)?;
        self.shaders.push(interface);
        Ok(ShaderHandle(self.shaders.len() as u32 - 1))
    }

    fn link_program(
        &mut self,
        vertex: ShaderHandle,
        fragment: ShaderHandle,
    ) -> Result<ProgramHandle, SetupError> {
        let (Some(vs), Some(fs)) = (
            self.shaders.get(vertex.0 as usize),
            self.shaders.get(fragment.0 as usize),
        ) else {
            return Err(SetupError::link("unknown shader handle"));
        };
        let program = ProgramInterface::link(vs, fs)?;
        self.programs.push(program);
        Ok(ProgramHandle(self.programs.len() as u32 - 1))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.program(program)?
            .uniform(name)
            .map(|u| UniformLocation { group: u.group, binding: u.binding })
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.program(program)?.attribute(name).map(|a| a.location)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if self.program(program).is_none() {
            log::warn!("use_program: unknown program {program:?}");
            return;
        }
        self.current_program = Some(program);
        self.commands.push(Command::UseProgram(program));
    }

    fn create_buffer(&mut self) -> Option<BufferHandle> {
        if self.buffers.len() >= self.max_buffers {
            return None;
        }
        self.buffers.push(None);
        Some(BufferHandle(self.buffers.len() as u32 - 1))
    }

    fn buffer_data(
        &mut self,
        buffer: BufferHandle,
        data: &[f32],
        usage: BufferUsage,
    ) -> Result<(), SetupError> {
        let bytes = std::mem::size_of_val(data) as u64;
        if bytes > self.max_buffer_bytes {
            return Err(SetupError::buffer(format!(
                "{bytes} bytes exceeds the {} byte buffer limit",
                self.max_buffer_bytes
            )));
        }
        let Some(slot) = self.buffers.get_mut(buffer.0 as usize) else {
            return Err(SetupError::buffer(format!("unknown buffer {buffer:?}")));
        };
        *slot = Some(data.to_vec());
        self.commands.push(Command::BufferData { buffer, len: data.len(), usage });
        Ok(())
    }

    fn vertex_attrib_pointer(&mut self, location: u32, buffer: BufferHandle, layout: AttributeLayout) {
        let enabled = self.attributes.get(&location).is_some_and(|a| a.enabled);
        self.attributes.insert(location, AttributeState { buffer, layout, enabled });
        self.commands.push(Command::VertexAttribPointer { location, buffer, layout });
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        let Some(attr) = self.attributes.get_mut(&location) else {
            log::warn!("enable_vertex_attrib: no pointer set for location {location}");
            return;
        };
        attr.enabled = true;
        self.commands.push(Command::EnableVertexAttrib(location));
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &Mat4) {
        let Some(program) = self.current_program else {
            log::warn!("uniform_matrix4: no program in use");
            return;
        };
        self.uniforms.insert((program, location), *matrix);
        self.commands.push(Command::UniformMatrix4 { location, matrix: *matrix });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
        self.commands.push(Command::SetDepthTest(enabled));
    }

    fn set_blend(&mut self, enabled: bool) {
        self.blend = enabled;
        self.commands.push(Command::SetBlend(enabled));
    }

    fn clear(&mut self, color: Color, flags: ClearFlags) {
        self.commands.push(Command::Clear { color, flags });
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        if self.current_program.is_none() {
            log::warn!("draw_arrays: no program in use");
            return;
        }
        self.commands.push(Command::DrawArrays { primitive, first, count });
    }
}
