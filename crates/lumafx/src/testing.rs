//! Test doubles shared across unit tests: a recording render backend and
//! small fixture builders.

use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::material::MaterialStore;
use crate::render::backend::{
    RenderBackend, SamplerHandle, TargetFormat, TextureHandle, UniformHandle,
};
use crate::render::pass::PassDesc;
use crate::render::sampler::SamplerKind;
use crate::session::EditorSession;
use crate::settings::CanvasSettings;
use crate::shader::ShaderCatalog;

/// Everything the fake backend observed, inspectable after the fact.
#[derive(Default)]
pub struct RecordState {
    next_handle: u64,
    pub uniform_lens: FxHashMap<u64, usize>,
    uniform_data: FxHashMap<u64, Vec<u8>>,
    uniform_writes: FxHashMap<u64, usize>,
    pub texture_uploads: usize,
    pub target_textures: Vec<(u32, u32, TargetFormat)>,
    pub samplers: Vec<SamplerKind>,
    pub passes: FxHashMap<String, PassDesc>,
    pub upserts: Vec<String>,
    pub removed: Vec<String>,
    pub invalidated: Vec<String>,
}

impl RecordState {
    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Last-committed contents of a uniform buffer, as f32s.
    pub fn uniform_floats(&self, handle: UniformHandle) -> Vec<f32> {
        self.uniform_data
            .get(&handle.0)
            .map(|bytes| bytemuck::pod_collect_to_vec(bytes))
            .unwrap_or_default()
    }

    pub fn uniform_write_count(&self, handle: UniformHandle) -> usize {
        self.uniform_writes.get(&handle.0).copied().unwrap_or(0)
    }
}

/// A backend that records every call; state is shared out through an `Rc`
/// so tests can keep inspecting after the session takes ownership.
pub struct RecordingBackend {
    state: Rc<RefCell<RecordState>>,
}

impl RecordingBackend {
    pub fn new() -> (Self, Rc<RefCell<RecordState>>) {
        let state = Rc::new(RefCell::new(RecordState::default()));
        (Self { state: state.clone() }, state)
    }
}

impl RenderBackend for RecordingBackend {
    fn create_uniform_buffer(&mut self, float_len: usize) -> UniformHandle {
        let mut state = self.state.borrow_mut();
        let handle = state.next();
        state.uniform_lens.insert(handle, float_len);
        UniformHandle(handle)
    }

    fn write_uniform_buffer(&mut self, handle: UniformHandle, bytes: &[u8]) {
        let mut state = self.state.borrow_mut();
        state.uniform_data.insert(handle.0, bytes.to_vec());
        *state.uniform_writes.entry(handle.0).or_default() += 1;
    }

    fn upload_texture(&mut self, _width: u32, _height: u32, _rgba: &[u8]) -> TextureHandle {
        let mut state = self.state.borrow_mut();
        state.texture_uploads += 1;
        let handle = state.next();
        TextureHandle(handle)
    }

    fn create_target_texture(
        &mut self,
        width: u32,
        height: u32,
        format: TargetFormat,
    ) -> TextureHandle {
        let mut state = self.state.borrow_mut();
        state.target_textures.push((width, height, format));
        let handle = state.next();
        TextureHandle(handle)
    }

    fn create_sampler(&mut self, kind: SamplerKind) -> SamplerHandle {
        let mut state = self.state.borrow_mut();
        state.samplers.push(kind);
        let handle = state.next();
        SamplerHandle(handle)
    }

    fn upsert_pass(&mut self, pass: &PassDesc) {
        let mut state = self.state.borrow_mut();
        state.upserts.push(pass.name.clone());
        state.passes.insert(pass.name.clone(), pass.clone());
    }

    fn remove_pass(&mut self, name: &str) {
        let mut state = self.state.borrow_mut();
        state.removed.push(name.to_string());
        state.passes.remove(name);
    }

    fn invalidate_pass(&mut self, name: &str) {
        self.state.borrow_mut().invalidated.push(name.to_string());
    }
}

/// A catalog preloaded with stub sources for every shader the factories ask
/// for, so tests never touch the filesystem.
pub fn shader_fixture() -> ShaderCatalog {
    let names = [
        "base-layer",
        "water-ripple/water-ripple",
        "cursor-ripple/ripple-force",
        "cursor-ripple/ripple-simulate",
        "cursor-ripple/ripple-combine",
        "reflection/reflection",
        "refraction/refraction",
        "cloud-motion/cloud-motion",
        "depth-parallax/depth-parallax",
        "iris-movement/iris-movement",
        "shake/shake",
        "tint/tint",
        "scroll/scroll",
        "water-waves/water-waves",
        "water-flow/water-flow",
    ];
    let mut catalog = ShaderCatalog::preloaded();
    for name in names {
        catalog.insert(name, &format!("// {name} stub"));
    }
    catalog
}

/// A ready-to-use session with a recording backend attached.
pub fn test_session() -> (EditorSession, Rc<RefCell<RecordState>>) {
    let (backend, state) = RecordingBackend::new();
    let mut session = EditorSession::new(
        CanvasSettings::default(),
        shader_fixture(),
        MaterialStore::new(None),
    );
    session.attach_backend(Box::new(backend));
    (session, state)
}

/// Encode a solid-color PNG for use as a layer or mask source.
pub fn png_bytes(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([rgb[0], rgb[1], rgb[2], 255]),
    );
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
    bytes
}
