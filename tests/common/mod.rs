//! Shared test doubles: a recording shading API, a table-driven shader
//! program, and minimal resource-node implementations.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use parking_lot::RwLock;

use glint::{
    ActiveUniform, BindError, BufferId, Capabilities, ImageAccess, ImageFormat, Resource,
    ResourceMap, Result, ShaderProgram, ShadingApi, SharedBuffer, SharedProgram, SharedTexture,
    SharedUniform, StorageResource, TextureId, TexturePlane, TextureResource, TextureTarget,
    UniformLocation, UniformResource, UniformType, UniformValue, UploadKind,
};

pub fn share<T>(value: T) -> Arc<RwLock<T>> {
    Arc::new(RwLock::new(value))
}

// ============================================================================
// Recording shading API
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetF32(u32, f32),
    SetI32(u32, i32),
    SetVec2(u32, Vec2),
    SetVec3(u32, Vec3),
    SetVec4(u32, Vec4),
    SetMat4(u32, Mat4),
    SetArray {
        location: u32,
        components: usize,
        len: usize,
    },
    BindTexture {
        unit: u32,
        target: TextureTarget,
        id: u32,
    },
    BindImage {
        unit: u32,
        id: u32,
    },
    BindStorage {
        binding: u32,
        buffer: u32,
    },
}

pub struct RecordingApi {
    caps: Capabilities,
    pub calls: Vec<Call>,
}

impl RecordingApi {
    pub fn new(max_texture_image_units: u32, storage_buffers: bool) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();
        Self {
            caps: Capabilities {
                max_texture_image_units,
                storage_buffers,
            },
            calls: Vec::new(),
        }
    }

    /// Most recent i32 written to `location`, if any.
    pub fn last_i32(&self, location: u32) -> Option<i32> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::SetI32(loc, value) if *loc == location => Some(*value),
            _ => None,
        })
    }

    /// Every texture bind with a non-null id, in call order.
    pub fn texture_binds(&self) -> Vec<(u32, TextureTarget, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::BindTexture { unit, target, id } if *id != 0 => Some((*unit, *target, *id)),
                _ => None,
            })
            .collect()
    }

    pub fn image_binds(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::BindImage { unit, id } => Some((*unit, *id)),
                _ => None,
            })
            .collect()
    }

    pub fn storage_binds(&self) -> Vec<(u32, u32)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::BindStorage { binding, buffer } => Some((*binding, *buffer)),
                _ => None,
            })
            .collect()
    }

    /// True when any call wrote to `location`.
    pub fn touched(&self, location: u32) -> bool {
        self.calls.iter().any(|call| {
            matches!(call,
                Call::SetF32(loc, _)
                | Call::SetI32(loc, _)
                | Call::SetVec2(loc, _)
                | Call::SetVec3(loc, _)
                | Call::SetVec4(loc, _)
                | Call::SetMat4(loc, _)
                | Call::SetArray { location: loc, .. } if *loc == location)
        })
    }
}

impl ShadingApi for RecordingApi {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn set_f32(&mut self, location: UniformLocation, value: f32) {
        self.calls.push(Call::SetF32(location.0, value));
    }

    fn set_i32(&mut self, location: UniformLocation, value: i32) {
        self.calls.push(Call::SetI32(location.0, value));
    }

    fn set_vec2(&mut self, location: UniformLocation, value: Vec2) {
        self.calls.push(Call::SetVec2(location.0, value));
    }

    fn set_vec3(&mut self, location: UniformLocation, value: Vec3) {
        self.calls.push(Call::SetVec3(location.0, value));
    }

    fn set_vec4(&mut self, location: UniformLocation, value: Vec4) {
        self.calls.push(Call::SetVec4(location.0, value));
    }

    fn set_mat4(&mut self, location: UniformLocation, value: &Mat4) {
        self.calls.push(Call::SetMat4(location.0, *value));
    }

    fn set_f32_array(&mut self, location: UniformLocation, data: &[f32]) {
        self.calls.push(Call::SetArray {
            location: location.0,
            components: 1,
            len: data.len(),
        });
    }

    fn set_vec2_array(&mut self, location: UniformLocation, data: &[f32]) {
        self.calls.push(Call::SetArray {
            location: location.0,
            components: 2,
            len: data.len(),
        });
    }

    fn set_vec3_array(&mut self, location: UniformLocation, data: &[f32]) {
        self.calls.push(Call::SetArray {
            location: location.0,
            components: 3,
            len: data.len(),
        });
    }

    fn set_vec4_array(&mut self, location: UniformLocation, data: &[f32]) {
        self.calls.push(Call::SetArray {
            location: location.0,
            components: 4,
            len: data.len(),
        });
    }

    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: TextureId) {
        self.calls.push(Call::BindTexture {
            unit,
            target,
            id: texture.0,
        });
    }

    fn bind_image(&mut self, unit: u32, texture: TextureId, _access: ImageAccess, _format: ImageFormat) {
        self.calls.push(Call::BindImage {
            unit,
            id: texture.0,
        });
    }

    fn bind_storage_buffer(&mut self, binding: u32, buffer: BufferId) {
        self.calls.push(Call::BindStorage {
            binding,
            buffer: buffer.0,
        });
    }
}

// ============================================================================
// Table-driven shader program
// ============================================================================

#[derive(Default)]
pub struct FakeProgram {
    active: Vec<ActiveUniform>,
    locations: HashMap<String, u32>,
    blocks: HashMap<String, u32>,
    image_units: HashMap<u32, u32>,
    pub update_count: u32,
}

impl FakeProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares an active uniform and makes its location queryable.
    #[must_use]
    pub fn active(mut self, name: &str, location: u32, ty: UniformType) -> Self {
        self.active.push(ActiveUniform::new(name, location, ty));
        self.locations.insert(name.to_string(), location);
        self
    }

    /// Declares an active uniform whose location query fails, mimicking a
    /// driver that enumerates a uniform it cannot address.
    #[must_use]
    pub fn active_unaddressed(mut self, name: &str, location: u32, ty: UniformType) -> Self {
        self.active.push(ActiveUniform::new(name, location, ty));
        self
    }

    /// Declares a location-only uniform (auxiliary metadata uniforms).
    #[must_use]
    pub fn uniform(mut self, name: &str, location: u32) -> Self {
        self.locations.insert(name.to_string(), location);
        self
    }

    #[must_use]
    pub fn block(mut self, name: &str, binding: u32) -> Self {
        self.blocks.insert(name.to_string(), binding);
        self
    }

    /// Fixes the compiler-assigned unit of an image uniform location.
    #[must_use]
    pub fn image_at(mut self, location: u32, unit: u32) -> Self {
        self.image_units.insert(location, unit);
        self
    }
}

impl Resource for FakeProgram {
    fn update(&mut self, _t: f64) -> Result<()> {
        self.update_count += 1;
        Ok(())
    }
}

impl ShaderProgram for FakeProgram {
    fn active_uniforms(&self) -> &[ActiveUniform] {
        &self.active
    }

    fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.locations.get(name).copied().map(UniformLocation)
    }

    fn storage_block_binding(&self, name: &str) -> Option<u32> {
        self.blocks.get(name).copied()
    }

    fn image_unit(&self, location: UniformLocation) -> u32 {
        self.image_units.get(&location.0).copied().unwrap_or(0)
    }
}

pub fn share_program(program: FakeProgram) -> (Arc<RwLock<FakeProgram>>, SharedProgram) {
    let concrete = share(program);
    let shared: SharedProgram = concrete.clone();
    (concrete, shared)
}

// ============================================================================
// Resource nodes
// ============================================================================

pub enum OwnedValue {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Int(i32),
    Quat(Quat),
    Mat4(Mat4),
    FloatArray(Vec<f32>),
    Vec2Array(Vec<f32>),
    Vec3Array(Vec<f32>),
    Vec4Array(Vec<f32>),
}

pub struct FakeUniform {
    pub value: OwnedValue,
    pub init_count: u32,
    pub update_count: u32,
    pub fail_update: bool,
}

impl FakeUniform {
    pub fn new(value: OwnedValue) -> Self {
        Self {
            value,
            init_count: 0,
            update_count: 0,
            fail_update: false,
        }
    }
}

impl Resource for FakeUniform {
    fn init(&mut self) -> Result<()> {
        self.init_count += 1;
        Ok(())
    }

    fn update(&mut self, _t: f64) -> Result<()> {
        if self.fail_update {
            return Err(BindError::Node("uniform update failed".into()));
        }
        self.update_count += 1;
        Ok(())
    }
}

impl UniformResource for FakeUniform {
    fn value(&self) -> UniformValue<'_> {
        match &self.value {
            OwnedValue::Float(v) => UniformValue::Float(*v),
            OwnedValue::Vec2(v) => UniformValue::Vec2(*v),
            OwnedValue::Vec3(v) => UniformValue::Vec3(*v),
            OwnedValue::Vec4(v) => UniformValue::Vec4(*v),
            OwnedValue::Int(v) => UniformValue::Int(*v),
            OwnedValue::Quat(v) => UniformValue::Quat(*v),
            OwnedValue::Mat4(v) => UniformValue::Mat4(*v),
            OwnedValue::FloatArray(v) => UniformValue::FloatArray(v),
            OwnedValue::Vec2Array(v) => UniformValue::Vec2Array(v),
            OwnedValue::Vec3Array(v) => UniformValue::Vec3Array(v),
            OwnedValue::Vec4Array(v) => UniformValue::Vec4Array(v),
        }
    }
}

pub struct FakeTexture {
    pub target: TextureTarget,
    pub id: u32,
    pub plane_y: u32,
    pub plane_uv: u32,
    pub upload_kind: UploadKind,
    pub direct_rendering: bool,
    pub dims: Vec3,
    pub ts: f32,
    pub init_count: u32,
    pub update_count: u32,
    pub fail_update: bool,
}

impl FakeTexture {
    pub fn new(target: TextureTarget, id: u32) -> Self {
        Self {
            target,
            id,
            plane_y: 0,
            plane_uv: 0,
            upload_kind: UploadKind::Standard,
            direct_rendering: false,
            dims: Vec3::new(16.0, 16.0, 1.0),
            ts: 0.0,
            init_count: 0,
            update_count: 0,
            fail_update: false,
        }
    }

    pub fn plain(id: u32) -> Self {
        Self::new(TextureTarget::Texture2d, id)
    }

    pub fn biplanar(plane_y: u32, plane_uv: u32) -> Self {
        let mut texture = Self::new(TextureTarget::Texture2d, 0);
        texture.plane_y = plane_y;
        texture.plane_uv = plane_uv;
        texture.upload_kind = UploadKind::BiplanarZeroCopy;
        texture.direct_rendering = true;
        texture
    }
}

impl Resource for FakeTexture {
    fn init(&mut self) -> Result<()> {
        self.init_count += 1;
        Ok(())
    }

    fn update(&mut self, _t: f64) -> Result<()> {
        if self.fail_update {
            return Err(BindError::Node("texture update failed".into()));
        }
        self.update_count += 1;
        Ok(())
    }
}

impl TextureResource for FakeTexture {
    fn target(&self) -> TextureTarget {
        self.target
    }

    fn texture_id(&self) -> TextureId {
        TextureId(self.id)
    }

    fn plane_id(&self, plane: TexturePlane) -> TextureId {
        match plane {
            TexturePlane::Y => TextureId(self.plane_y),
            TexturePlane::Uv => TextureId(self.plane_uv),
        }
    }

    fn upload_kind(&self) -> UploadKind {
        self.upload_kind
    }

    fn dimensions(&self) -> Vec3 {
        self.dims
    }

    fn source_ts(&self) -> f32 {
        self.ts
    }

    fn direct_rendering(&self) -> bool {
        self.direct_rendering
    }

    fn set_direct_rendering(&mut self, enabled: bool) {
        self.direct_rendering = enabled;
    }
}

pub struct FakeBuffer {
    pub gpu_id: u32,
    pub gpu_buffer_requested: bool,
    pub init_count: u32,
    pub update_count: u32,
}

impl FakeBuffer {
    pub fn new(gpu_id: u32) -> Self {
        Self {
            gpu_id,
            gpu_buffer_requested: false,
            init_count: 0,
            update_count: 0,
        }
    }
}

impl Resource for FakeBuffer {
    fn init(&mut self) -> Result<()> {
        self.init_count += 1;
        Ok(())
    }

    fn update(&mut self, _t: f64) -> Result<()> {
        self.update_count += 1;
        Ok(())
    }
}

impl StorageResource for FakeBuffer {
    fn request_gpu_buffer(&mut self) {
        self.gpu_buffer_requested = true;
    }

    fn gpu_buffer_id(&self) -> BufferId {
        BufferId(self.gpu_id)
    }
}

// ============================================================================
// Map builders
// ============================================================================

pub fn uniform_map(entries: &[(&str, &Arc<RwLock<FakeUniform>>)]) -> ResourceMap<SharedUniform> {
    entries
        .iter()
        .map(|(name, node)| {
            let shared: SharedUniform = (*node).clone();
            ((*name).to_string(), shared)
        })
        .collect()
}

pub fn texture_map(entries: &[(&str, &Arc<RwLock<FakeTexture>>)]) -> ResourceMap<SharedTexture> {
    entries
        .iter()
        .map(|(name, node)| {
            let shared: SharedTexture = (*node).clone();
            ((*name).to_string(), shared)
        })
        .collect()
}

pub fn buffer_map(entries: &[(&str, &Arc<RwLock<FakeBuffer>>)]) -> ResourceMap<SharedBuffer> {
    entries
        .iter()
        .map(|(name, node)| {
            let shared: SharedBuffer = (*node).clone();
            ((*name).to_string(), shared)
        })
        .collect()
}
