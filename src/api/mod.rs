//! Shading-API Abstraction
//!
//! The pipeline never talks to a graphics driver directly. Everything it
//! needs from the GPU side goes through two traits:
//!
//! - [`ShadingApi`] — the binding sink: typed uniform-set calls, texture /
//!   image / storage-buffer bind calls, and the platform capability report.
//! - [`ShaderProgram`] — introspection of a compiled program: the active
//!   uniform list, location queries, storage-block binding queries.
//!
//! Backends implement these over a real GL-style context; tests implement
//! them with recording fakes.

mod program;

pub use program::{ActiveUniform, ShaderProgram};

use glam::{Mat4, Vec2, Vec3, Vec4};

/// Compiler-reported uniform types, as surfaced by program introspection.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UniformType {
    Float,
    FloatVec2,
    FloatVec3,
    FloatVec4,
    Int,
    FloatMat4,
    Sampler2d,
    Sampler3d,
    /// Platform-opaque external sampler (decoder output, camera feeds).
    SamplerExternal,
    /// Image-store uniform, bound for direct read/write instead of sampling.
    Image2d,
}

impl UniformType {
    /// True for the sampler types resolved through suffix-stripping.
    #[must_use]
    pub fn is_sampler(self) -> bool {
        matches!(self, Self::Sampler2d | Self::Sampler3d | Self::SamplerExternal)
    }

    /// True for image-store types.
    #[must_use]
    pub fn is_image(self) -> bool {
        matches!(self, Self::Image2d)
    }
}

/// Runtime texture binding targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureTarget {
    Texture2d,
    Texture3d,
    /// Platform-opaque external target.
    External,
}

/// Value written to a texture's `<name>_sampling_mode` flag uniform so the
/// shader can pick the sampling path that is live this frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[repr(i32)]
pub enum SamplingMode {
    None = 0,
    Plain = 1,
    External = 2,
    Biplanar = 3,
}

/// A compiler-assigned uniform location.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Opaque GPU texture object id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl TextureId {
    /// The null texture; binding it unbinds the unit for that target.
    pub const NONE: TextureId = TextureId(0);
}

/// Opaque GPU buffer object id.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

/// Access mode of an image-store binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

/// Storage format of an image-store binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    Rgba8,
    Rgba16F,
    Rgba32F,
    R32F,
}

/// Platform capability report, queried once per pipeline resolution.
#[derive(Copy, Clone, Debug)]
pub struct Capabilities {
    /// Maximum number of texture-image units the platform exposes.
    pub max_texture_image_units: u32,
    /// Whether shader-storage buffer objects are supported.
    pub storage_buffers: bool,
}

/// Low-level binding sink of a GL-style shading API.
///
/// All calls operate on the program currently bound to the context; the
/// caller drives one pipeline at a time on the context thread.
pub trait ShadingApi {
    fn capabilities(&self) -> Capabilities;

    fn set_f32(&mut self, location: UniformLocation, value: f32);
    fn set_i32(&mut self, location: UniformLocation, value: i32);
    fn set_vec2(&mut self, location: UniformLocation, value: Vec2);
    fn set_vec3(&mut self, location: UniformLocation, value: Vec3);
    fn set_vec4(&mut self, location: UniformLocation, value: Vec4);
    fn set_mat4(&mut self, location: UniformLocation, value: &Mat4);

    /// Array upload of scalar floats.
    fn set_f32_array(&mut self, location: UniformLocation, data: &[f32]);
    /// Array upload of packed 2-component vectors.
    fn set_vec2_array(&mut self, location: UniformLocation, data: &[f32]);
    /// Array upload of packed 3-component vectors.
    fn set_vec3_array(&mut self, location: UniformLocation, data: &[f32]);
    /// Array upload of packed 4-component vectors.
    fn set_vec4_array(&mut self, location: UniformLocation, data: &[f32]);

    /// Binds `texture` to `unit` for `target`; [`TextureId::NONE`] unbinds.
    fn bind_texture(&mut self, unit: u32, target: TextureTarget, texture: TextureId);

    /// Binds `texture` to `unit` for direct image read/write.
    fn bind_image(&mut self, unit: u32, texture: TextureId, access: ImageAccess, format: ImageFormat);

    /// Binds `buffer` to a shader-storage block binding index.
    fn bind_storage_buffer(&mut self, binding: u32, buffer: BufferId);
}
