use super::backend::{RenderBackend, UniformHandle};

/// Scalar arity of one named uniform field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Float,
    Vec2,
    Vec3,
    Vec4,
}

impl FieldType {
    pub fn arity(self) -> usize {
        match self {
            FieldType::Float => 1,
            FieldType::Vec2 => 2,
            FieldType::Vec3 => 3,
            FieldType::Vec4 => 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UniformField {
    pub name: String,
    pub ty: FieldType,
    pub offset: usize,
}

/// Ordered, named uniform schema. Offsets are derived from declaration
/// order; the total float length is padded to a 16-byte multiple so the
/// buffer satisfies uniform alignment without hand-counted padding slots.
#[derive(Debug, Clone, Default)]
pub struct UniformLayout {
    fields: Vec<UniformField>,
    float_len: usize,
}

impl UniformLayout {
    pub fn builder() -> UniformLayoutBuilder {
        UniformLayoutBuilder { fields: Vec::new(), cursor: 0 }
    }

    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn fields(&self) -> &[UniformField] {
        &self.fields
    }

    /// Total f32 slots, padding included.
    pub fn float_len(&self) -> usize {
        self.float_len
    }
}

pub struct UniformLayoutBuilder {
    fields: Vec<UniformField>,
    cursor: usize,
}

impl UniformLayoutBuilder {
    pub fn field(mut self, name: &str, ty: FieldType) -> Self {
        debug_assert!(
            !self.fields.iter().any(|f| f.name == name),
            "duplicate uniform field {name}"
        );
        self.fields.push(UniformField { name: name.to_string(), ty, offset: self.cursor });
        self.cursor += ty.arity();
        self
    }

    pub fn build(self) -> UniformLayout {
        let float_len = self.cursor.next_multiple_of(4).max(4);
        UniformLayout { fields: self.fields, float_len }
    }
}

/// CPU-side uniform storage paired with its GPU buffer handle.
///
/// Allocated once at effect construction, never resized. Writes land in
/// `values` and set a dirty bit; `apply` commits to the backend. Batching
/// several field writes before one `apply` is fine — the contract is
/// committed-before-use, not committed-immediately.
pub struct UniformBuffer {
    layout: UniformLayout,
    values: Vec<f32>,
    handle: UniformHandle,
    dirty: bool,
}

impl UniformBuffer {
    pub fn new(backend: &mut dyn RenderBackend, layout: UniformLayout) -> Self {
        let handle = backend.create_uniform_buffer(layout.float_len());
        let values = vec![0.0; layout.float_len()];
        Self { layout, values, handle, dirty: true }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn handle(&self) -> UniformHandle {
        self.handle
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Write all components of a named field. Unknown field or component
    /// count mismatch is a logged no-op — a stale name must not crash the
    /// render loop.
    pub fn set_field(&mut self, name: &str, components: &[f32]) {
        let Some(field) = self.layout.field(name) else {
            log::warn!("uniform field '{name}' not found; write skipped");
            return;
        };
        if components.len() != field.ty.arity() {
            log::warn!(
                "uniform field '{name}' expects {} components, got {}; write skipped",
                field.ty.arity(),
                components.len()
            );
            return;
        }
        let offset = field.offset;
        self.values[offset..offset + components.len()].copy_from_slice(components);
        self.dirty = true;
    }

    pub fn set_scalar(&mut self, name: &str, value: f32) {
        self.set_field(name, &[value]);
    }

    /// Read a field's current component run, if the field exists.
    pub fn read_field(&self, name: &str) -> Option<&[f32]> {
        let field = self.layout.field(name)?;
        Some(&self.values[field.offset..field.offset + field.ty.arity()])
    }

    /// Commit to the GPU-visible copy if anything changed since last apply.
    pub fn apply(&mut self, backend: &mut dyn RenderBackend) {
        if !self.dirty {
            return;
        }
        backend.write_uniform_buffer(self.handle, bytemuck::cast_slice(&self.values));
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingBackend;

    fn layout() -> UniformLayout {
        UniformLayout::builder()
            .field("resolution", FieldType::Vec2)
            .field("time", FieldType::Float)
            .field("speed", FieldType::Float)
            .field("tint", FieldType::Vec3)
            .build()
    }

    #[test]
    fn offsets_follow_declaration_order() {
        let l = layout();
        assert_eq!(l.field("resolution").unwrap().offset, 0);
        assert_eq!(l.field("time").unwrap().offset, 2);
        assert_eq!(l.field("speed").unwrap().offset, 3);
        assert_eq!(l.field("tint").unwrap().offset, 4);
    }

    #[test]
    fn length_pads_to_vec4_multiple() {
        assert_eq!(layout().float_len(), 8); // 7 floats used, padded to 8
        let single = UniformLayout::builder().field("t", FieldType::Float).build();
        assert_eq!(single.float_len(), 4);
        let exact = UniformLayout::builder()
            .field("a", FieldType::Vec4)
            .field("b", FieldType::Vec4)
            .build();
        assert_eq!(exact.float_len(), 8);
    }

    #[test]
    fn set_field_writes_component_run() {
        let (mut backend, _) = RecordingBackend::new();
        let mut buf = UniformBuffer::new(&mut backend, layout());
        buf.set_field("tint", &[0.25, 0.5, 0.75]);
        assert_eq!(&buf.values()[4..7], &[0.25, 0.5, 0.75]);
        assert_eq!(buf.read_field("tint").unwrap(), &[0.25, 0.5, 0.75]);
    }

    #[test]
    fn unknown_field_is_a_noop() {
        let (mut backend, _) = RecordingBackend::new();
        let mut buf = UniformBuffer::new(&mut backend, layout());
        buf.set_field("nope", &[1.0]);
        assert!(buf.values().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn arity_mismatch_is_a_noop() {
        let (mut backend, _) = RecordingBackend::new();
        let mut buf = UniformBuffer::new(&mut backend, layout());
        buf.set_field("resolution", &[1.0]);
        assert_eq!(buf.read_field("resolution").unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn apply_commits_once_until_next_write() {
        let (mut backend, state) = RecordingBackend::new();
        let mut buf = UniformBuffer::new(&mut backend, layout());
        buf.set_scalar("time", 2.5);
        buf.apply(&mut backend);
        buf.apply(&mut backend);
        let writes = state.borrow().uniform_write_count(buf.handle());
        assert_eq!(writes, 1);
        assert_eq!(state.borrow().uniform_lens[&buf.handle().0], 8);
        let committed = state.borrow().uniform_floats(buf.handle());
        assert_eq!(committed[2], 2.5);
    }
}
