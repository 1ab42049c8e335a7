//! GL-style rendering context over wgpu.
//!
//! Shader stages are reflected with naga before a module is created, so
//! compile and link diagnostics match the headless backend. Programs own one
//! uniform buffer per reflected uniform. Render pipelines depend on state
//! only known at draw time (enabled attributes, depth test, blending), so they
//! are built lazily per [`PipelineKey`] and cached.
//!
//! Clears and draws are recorded and turned into render passes by
//! [`WgpuContext::flush`]. Uniform uploads go straight to the queue, so every
//! draw of a frame observes the last value written before the flush.

use std::collections::{BTreeMap, HashMap};

use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::device::DEPTH_FORMAT;
use crate::paint::Color;

use super::context::{
    AttributeLayout, BufferHandle, BufferUsage, ClearFlags, Primitive, ProgramHandle,
    RenderContext, ShaderHandle, UniformLocation,
};
use super::shader::ShaderStage;
use super::shader::reflect::{self, ProgramInterface, ShaderInterface};
use super::SetupError;

const MAT4_BYTES: u64 = std::mem::size_of::<[f32; 16]>() as u64;

struct GpuShader {
    interface: ShaderInterface,
    module: wgpu::ShaderModule,
}

struct GpuProgram {
    vertex: ShaderHandle,
    fragment: ShaderHandle,
    interface: ProgramInterface,
    layout: wgpu::PipelineLayout,
    bind_groups: Vec<wgpu::BindGroup>,
    uniform_buffers: HashMap<UniformLocation, wgpu::Buffer>,
}

#[derive(Debug, Copy, Clone)]
struct AttributeState {
    buffer: BufferHandle,
    layout: AttributeLayout,
    enabled: bool,
}

/// Everything a render pipeline depends on.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    program: ProgramHandle,
    /// `(location, components, byte stride)` per enabled attribute, ascending.
    attributes: Vec<(u32, u32, u32)>,
    primitive: Primitive,
    depth_test: bool,
    blend: bool,
}

struct DrawCall {
    key: PipelineKey,
    /// `(buffer, byte offset)` per vertex buffer slot.
    vertex_buffers: Vec<(BufferHandle, u64)>,
    first: u32,
    count: u32,
}

enum FrameCommand {
    Clear { color: Color, flags: ClearFlags },
    Draw(DrawCall),
}

struct PassPlan<'a> {
    color_load: wgpu::LoadOp<wgpu::Color>,
    depth_load: wgpu::LoadOp<f32>,
    draws: Vec<&'a DrawCall>,
}

impl PassPlan<'_> {
    fn load() -> Self {
        Self {
            color_load: wgpu::LoadOp::Load,
            depth_load: wgpu::LoadOp::Load,
            draws: Vec::new(),
        }
    }
}

/// [`RenderContext`] backed by a wgpu device.
pub struct WgpuContext {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color_format: wgpu::TextureFormat,

    shaders: Vec<GpuShader>,
    programs: Vec<GpuProgram>,
    buffers: Vec<Option<wgpu::Buffer>>,

    attributes: BTreeMap<u32, AttributeState>,
    current_program: Option<ProgramHandle>,
    depth_test: bool,
    blend: bool,

    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
    commands: Vec<FrameCommand>,
}

impl WgpuContext {
    /// Creates a context rendering into targets of `color_format`.
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, color_format: wgpu::TextureFormat) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            color_format,
            shaders: Vec::new(),
            programs: Vec::new(),
            buffers: Vec::new(),
            attributes: BTreeMap::new(),
            current_program: None,
            depth_test: false,
            blend: false,
            pipelines: HashMap::new(),
            commands: Vec::new(),
        }
    }

    /// Number of clears and draws waiting for [`flush`](Self::flush).
    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    /// Drops recorded clears and draws without encoding them.
    pub fn discard_pending(&mut self) {
        self.commands.clear();
    }

    /// Encodes the recorded clears and draws into `encoder`.
    ///
    /// Each clear opens a new render pass; draws recorded before any clear
    /// load the existing contents. `depth_view` must match `color_view` in
    /// size and use [`DEPTH_FORMAT`].
    pub fn flush(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        color_view: &wgpu::TextureView,
        depth_view: &wgpu::TextureView,
    ) {
        if self.commands.is_empty() {
            return;
        }

        let commands = std::mem::take(&mut self.commands);
        for cmd in &commands {
            if let FrameCommand::Draw(draw) = cmd {
                self.ensure_pipeline(&draw.key);
            }
        }

        for pass in plan_passes(&commands) {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("cube pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: pass.color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: pass.depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in pass.draws {
                let Some(pipeline) = self.pipelines.get(&draw.key) else { continue };
                let Some(program) = self.programs.get(draw.key.program.0 as usize) else {
                    continue;
                };
                let buffers: Option<Vec<&wgpu::Buffer>> = draw
                    .vertex_buffers
                    .iter()
                    .map(|(b, _)| self.buffers.get(b.0 as usize).and_then(Option::as_ref))
                    .collect();
                let Some(buffers) = buffers else {
                    log::warn!("draw skipped: an enabled attribute has no buffer storage");
                    continue;
                };

                rpass.set_pipeline(pipeline);
                for (group, bind_group) in program.bind_groups.iter().enumerate() {
                    rpass.set_bind_group(group as u32, bind_group, &[]);
                }
                for (slot, (buffer, (_, offset))) in
                    buffers.iter().zip(&draw.vertex_buffers).enumerate()
                {
                    rpass.set_vertex_buffer(slot as u32, buffer.slice(*offset..));
                }
                rpass.draw(draw.first..draw.first + draw.count, 0..1);
            }
        }
    }

    fn program(&self, handle: ProgramHandle) -> Option<&GpuProgram> {
        self.programs.get(handle.0 as usize)
    }

    fn ensure_pipeline(&mut self, key: &PipelineKey) {
        if self.pipelines.contains_key(key) {
            return;
        }
        let Some(program) = self.programs.get(key.program.0 as usize) else { return };
        let (Some(vs), Some(fs)) = (
            self.shaders.get(program.vertex.0 as usize),
            self.shaders.get(program.fragment.0 as usize),
        ) else {
            return;
        };

        let mut attrs = Vec::with_capacity(key.attributes.len());
        for &(location, components, _) in &key.attributes {
            let Some(format) = vertex_format(components) else {
                log::warn!("attribute {location}: {components} components has no vertex format");
                return;
            };
            attrs.push([wgpu::VertexAttribute {
                format,
                offset: 0,
                shader_location: location,
            }]);
        }
        let layouts: Vec<wgpu::VertexBufferLayout<'_>> = key
            .attributes
            .iter()
            .zip(&attrs)
            .map(|(&(_, _, stride), attr)| wgpu::VertexBufferLayout {
                array_stride: u64::from(stride),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attr,
            })
            .collect();

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube pipeline"),
            layout: Some(&program.layout),

            vertex: wgpu::VertexState {
                module: &vs.module,
                entry_point: Some(vs.interface.entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: &layouts,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs.module,
                entry_point: Some(fs.interface.entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.color_format,
                    blend: key.blend.then_some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: topology(key.primitive),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            // Every pass carries a depth attachment, so the pipeline always
            // declares the format; a disabled test becomes Always + no writes.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: key.depth_test,
                depth_compare: if key.depth_test {
                    wgpu::CompareFunction::Less
                } else {
                    wgpu::CompareFunction::Always
                },
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),

            multiview_mask: None,
            cache: None,
        });

        log::debug!("built pipeline for {key:?}");
        self.pipelines.insert(key.clone(), pipeline);
    }
}

impl RenderContext for WgpuContext {
    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderHandle, SetupError> {
        let interface = reflect::reflect(stage, source)?;
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(match stage {
                ShaderStage::Vertex => "cube vertex shader",
                ShaderStage::Fragment => "cube fragment shader",
            }),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        self.shaders.push(GpuShader { interface, module });
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
        let interface = ProgramInterface::link(&vs.interface, &fs.interface)?;

        let mut group_layouts = Vec::new();
        let mut bind_groups = Vec::new();
        let mut uniform_buffers = HashMap::new();

        for group in 0..interface.bind_group_count() {
            let members: Vec<_> = interface.uniforms.iter().filter(|u| u.group == group).collect();

            let entries: Vec<wgpu::BindGroupLayoutEntry> = members
                .iter()
                .map(|u| wgpu::BindGroupLayoutEntry {
                    binding: u.binding,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: wgpu::BufferSize::new(u64::from(u.size)),
                    },
                    count: None,
                })
                .collect();

            let layout = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("cube program bgl"),
                entries: &entries,
            });

            let buffers: Vec<(u32, wgpu::Buffer)> = members
                .iter()
                .map(|u| {
                    let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                        label: Some(u.name.as_str()),
                        size: u64::from(u.size),
                        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                        mapped_at_creation: false,
                    });
                    (u.binding, buffer)
                })
                .collect();

            let bind_entries: Vec<wgpu::BindGroupEntry> = buffers
                .iter()
                .map(|(binding, buffer)| wgpu::BindGroupEntry {
                    binding: *binding,
                    resource: buffer.as_entire_binding(),
                })
                .collect();

            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("cube program bind group"),
                layout: &layout,
                entries: &bind_entries,
            });

            for (binding, buffer) in buffers {
                uniform_buffers.insert(UniformLocation { group, binding }, buffer);
            }
            group_layouts.push(layout);
            bind_groups.push(bind_group);
        }

        let layout_refs: Vec<&wgpu::BindGroupLayout> = group_layouts.iter().collect();
        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cube program layout"),
            bind_group_layouts: &layout_refs,
            immediate_size: 0,
        });

        self.programs.push(GpuProgram {
            vertex,
            fragment,
            interface,
            layout,
            bind_groups,
            uniform_buffers,
        });
        Ok(ProgramHandle(self.programs.len() as u32 - 1))
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.program(program)?
            .interface
            .uniform(name)
            .map(|u| UniformLocation { group: u.group, binding: u.binding })
    }

    fn attribute_location(&self, program: ProgramHandle, name: &str) -> Option<u32> {
        self.program(program)?.interface.attribute(name).map(|a| a.location)
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if self.program(program).is_none() {
            log::warn!("use_program: unknown program {program:?}");
            return;
        }
        self.current_program = Some(program);
    }

    fn create_buffer(&mut self) -> Option<BufferHandle> {
        let id = u32::try_from(self.buffers.len()).ok()?;
        self.buffers.push(None);
        Some(BufferHandle(id))
    }

    fn buffer_data(
        &mut self,
        buffer: BufferHandle,
        data: &[f32],
        usage: BufferUsage,
    ) -> Result<(), SetupError> {
        let contents: &[u8] = bytemuck::cast_slice(data);
        let size = contents.len() as u64;
        let limit = self.device.limits().max_buffer_size;
        if size > limit {
            return Err(SetupError::buffer(format!(
                "{size} bytes exceeds the device limit of {limit} bytes"
            )));
        }

        let Some(slot) = self.buffers.get_mut(buffer.0 as usize) else {
            return Err(SetupError::buffer(format!("unknown buffer {buffer:?}")));
        };

        let usage = match usage {
            BufferUsage::Static => wgpu::BufferUsages::VERTEX,
            BufferUsage::Dynamic => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        };
        *slot = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube attribute buffer"),
            contents,
            usage,
        }));
        Ok(())
    }

    fn vertex_attrib_pointer(&mut self, location: u32, buffer: BufferHandle, layout: AttributeLayout) {
        let enabled = self.attributes.get(&location).is_some_and(|a| a.enabled);
        self.attributes.insert(location, AttributeState { buffer, layout, enabled });
    }

    fn enable_vertex_attrib(&mut self, location: u32) {
        match self.attributes.get_mut(&location) {
            Some(attr) => attr.enabled = true,
            None => log::warn!("enable_vertex_attrib: no pointer set for location {location}"),
        }
    }

    fn uniform_matrix4(&mut self, location: UniformLocation, matrix: &Mat4) {
        let Some(program) = self.current_program.and_then(|p| self.program(p)) else {
            log::warn!("uniform_matrix4: no program in use");
            return;
        };
        let Some(buffer) = program.uniform_buffers.get(&location) else {
            log::warn!("uniform_matrix4: {location:?} is not a uniform of the current program");
            return;
        };
        if buffer.size() < MAT4_BYTES {
            log::warn!("uniform_matrix4: {location:?} is smaller than a 4x4 matrix");
            return;
        }
        self.queue
            .write_buffer(buffer, 0, bytemuck::cast_slice(&matrix.to_cols_array()));
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.depth_test = enabled;
    }

    fn set_blend(&mut self, enabled: bool) {
        self.blend = enabled;
    }

    fn clear(&mut self, color: Color, flags: ClearFlags) {
        self.commands.push(FrameCommand::Clear { color, flags });
    }

    fn draw_arrays(&mut self, primitive: Primitive, first: u32, count: u32) {
        let Some(program) = self.current_program else {
            log::warn!("draw_arrays: no program in use");
            return;
        };

        let enabled: Vec<(u32, AttributeState)> = self
            .attributes
            .iter()
            .filter(|(_, a)| a.enabled)
            .map(|(loc, a)| (*loc, *a))
            .collect();

        let key = PipelineKey {
            program,
            attributes: enabled
                .iter()
                .map(|(loc, a)| (*loc, a.layout.components, a.layout.byte_stride()))
                .collect(),
            primitive,
            depth_test: self.depth_test,
            blend: self.blend,
        };
        let vertex_buffers = enabled.iter().map(|(_, a)| (a.buffer, a.layout.offset)).collect();

        self.commands.push(FrameCommand::Draw(DrawCall {
            key,
            vertex_buffers,
            first,
            count,
        }));
    }
}

fn plan_passes(commands: &[FrameCommand]) -> Vec<PassPlan<'_>> {
    let mut passes: Vec<PassPlan<'_>> = Vec::new();
    for cmd in commands {
        match cmd {
            FrameCommand::Clear { color, flags } => passes.push(PassPlan {
                color_load: if flags.color {
                    wgpu::LoadOp::Clear(color.to_wgpu())
                } else {
                    wgpu::LoadOp::Load
                },
                depth_load: if flags.depth {
                    wgpu::LoadOp::Clear(1.0)
                } else {
                    wgpu::LoadOp::Load
                },
                draws: Vec::new(),
            }),
            FrameCommand::Draw(draw) => match passes.last_mut() {
                Some(pass) => pass.draws.push(draw),
                None => {
                    let mut pass = PassPlan::load();
                    pass.draws.push(draw);
                    passes.push(pass);
                }
            },
        }
    }
    passes
}

fn vertex_format(components: u32) -> Option<wgpu::VertexFormat> {
    match components {
        1 => Some(wgpu::VertexFormat::Float32),
        2 => Some(wgpu::VertexFormat::Float32x2),
        3 => Some(wgpu::VertexFormat::Float32x3),
        4 => Some(wgpu::VertexFormat::Float32x4),
        _ => None,
    }
}

fn topology(primitive: Primitive) -> wgpu::PrimitiveTopology {
    match primitive {
        Primitive::Points => wgpu::PrimitiveTopology::PointList,
        Primitive::Lines => wgpu::PrimitiveTopology::LineList,
        Primitive::Triangles => wgpu::PrimitiveTopology::TriangleList,
    }
}
