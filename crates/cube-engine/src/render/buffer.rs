//! Vertex attribute upload.

use super::context::{AttributeLayout, BufferHandle, BufferUsage, ProgramHandle, RenderContext};
use super::SetupError;

/// A buffer uploaded by [`upload_attribute`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeBuffer {
    pub buffer: BufferHandle,
    /// Attribute location the buffer is bound to, `None` if the program does
    /// not declare the attribute.
    pub location: Option<u32>,
    pub layout: AttributeLayout,
    /// Whole vertices in the upload.
    pub vertex_count: u32,
}

impl AttributeBuffer {
    pub fn is_bound(&self) -> bool {
        self.location.is_some()
    }
}

/// Uploads `data` as a static buffer and binds it to `attribute_name`.
///
/// The attribute is configured as tightly packed, unnormalized floats with
/// `components` per vertex, then enabled. `data.len()` is expected to be a
/// multiple of `components`; a trailing partial vertex is uploaded but never
/// drawn.
pub fn upload_attribute<C: RenderContext + ?Sized>(
    ctx: &mut C,
    program: ProgramHandle,
    data: &[f32],
    components: u32,
    attribute_name: &str,
) -> Result<AttributeBuffer, SetupError> {
    if !(1..=4).contains(&components) {
        return Err(SetupError::UnsupportedAttribute {
            name: attribute_name.to_owned(),
            components,
        });
    }

    let location = ctx.attribute_location(program, attribute_name);
    if location.is_none() {
        log::warn!("attribute `{attribute_name}` not declared by {program:?}; buffer left unbound");
    }

    let buffer = ctx
        .create_buffer()
        .ok_or_else(|| SetupError::buffer(format!("no buffer name for `{attribute_name}`")))?;
    ctx.buffer_data(buffer, data, BufferUsage::Static)?;

    let layout = AttributeLayout::packed(components);
    if let Some(location) = location {
        ctx.vertex_attrib_pointer(location, buffer, layout);
        ctx.enable_vertex_attrib(location);
    }

    let vertex_count = (data.len() / components as usize) as u32;
    log::debug!(
        "uploaded `{attribute_name}`: {vertex_count} vertices x {components} floats into {buffer:?}"
    );

    Ok(AttributeBuffer {
        buffer,
        location,
        layout,
        vertex_count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::cube_mesh;
    use crate::render::shader::{self, PER_VERTEX_COLOR_FRAGMENT, PER_VERTEX_COLOR_VERTEX};
    use crate::render::HeadlessContext;

    fn setup() -> (HeadlessContext, ProgramHandle) {
        let mut ctx = HeadlessContext::new();
        let program = shader::build_program(
            &mut ctx,
            PER_VERTEX_COLOR_VERTEX,
            PER_VERTEX_COLOR_FRAGMENT,
            &[],
        )
        .unwrap();
        (ctx, program.handle)
    }

    #[test]
    fn uploads_and_enables_packed_attribute() {
        let (mut ctx, program) = setup();
        let positions = cube_mesh().positions();

        let attr = upload_attribute(&mut ctx, program, &positions, 3, "position").unwrap();

        assert_eq!(attr.location, Some(0));
        assert_eq!(attr.vertex_count, 36);
        assert_eq!(ctx.buffer_contents(attr.buffer), Some(positions.as_slice()));
        assert_eq!(ctx.enabled_attributes(), vec![0]);

        let layout = ctx.attribute_layout(0).unwrap();
        assert_eq!(layout.components, 3);
        assert!(!layout.normalized);
        assert_eq!(layout.byte_stride(), 12);
        assert_eq!(layout.offset, 0);
    }

    #[test]
    fn color_attribute_binds_to_its_own_location() {
        let (mut ctx, program) = setup();
        let mesh = cube_mesh();
        upload_attribute(&mut ctx, program, &mesh.positions(), 3, "position").unwrap();
        let colors = mesh.colors().unwrap();
        let attr = upload_attribute(&mut ctx, program, &colors, 3, "color").unwrap();

        assert_eq!(attr.location, Some(1));
        assert_eq!(ctx.enabled_attributes(), vec![0, 1]);
    }

    #[test]
    fn unknown_attribute_is_uploaded_but_unbound() {
        let (mut ctx, program) = setup();
        let attr = upload_attribute(&mut ctx, program, &[0.0; 6], 2, "uv").unwrap();

        assert!(!attr.is_bound());
        assert!(ctx.buffer_contents(attr.buffer).is_some());
        assert!(ctx.enabled_attributes().is_empty());
    }

    #[test]
    fn uneven_data_is_not_rejected() {
        let (mut ctx, program) = setup();
        let attr = upload_attribute(&mut ctx, program, &[0.0; 7], 3, "position").unwrap();
        assert_eq!(attr.vertex_count, 2);
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn oversized_upload_fails_with_buffer_allocation() {
        let (ctx, program) = setup();
        let mut ctx = ctx.with_max_buffer_bytes(64);
        let err = upload_attribute(&mut ctx, program, &[0.0; 36 * 3], 3, "position").unwrap_err();
        assert!(matches!(err, SetupError::BufferAllocation { .. }));
    }

    #[test]
    fn refused_buffer_name_fails_with_buffer_allocation() {
        let (ctx, program) = setup();
        let mut ctx = ctx.with_max_buffers(0);
        let err = upload_attribute(&mut ctx, program, &[0.0; 3], 3, "position").unwrap_err();
        assert!(matches!(err, SetupError::BufferAllocation { .. }));
    }

    #[test]
    fn component_count_outside_one_to_four_is_unsupported() {
        let (mut ctx, program) = setup();
        for components in [0, 5] {
            let err = upload_attribute(&mut ctx, program, &[0.0; 10], components, "position")
                .unwrap_err();
            assert_eq!(
                err,
                SetupError::UnsupportedAttribute { name: "position".into(), components }
            );
        }
    }
}
