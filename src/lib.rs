//! glint — resource binding between a scene graph and a GL-style shading API.
//!
//! A scene graph declares its shader inputs as name-keyed maps of uniform,
//! texture and storage-buffer nodes. A compiled program reports which of
//! those inputs actually survived compilation and where the compiler placed
//! them. [`Pipeline`] reconciles the two at build time and then, once per
//! frame, refreshes every bound resource and re-issues the minimal set of
//! uniform uploads, sampler/image binds and storage-buffer binds — including
//! collision-free allocation of the platform's scarce texture units and
//! uniform handling of opaque-external and biplanar zero-copy textures
//! through a pluggable [`SamplingStrategy`].
//!
//! The node system, the shader compiler and the GPU context are external
//! collaborators, consumed through the traits in [`graph`] and [`api`].

pub mod api;
pub mod errors;
pub mod graph;
pub mod pipeline;

pub use api::{
    ActiveUniform, BufferId, Capabilities, ImageAccess, ImageFormat, SamplingMode, ShaderProgram,
    ShadingApi, TextureId, TextureTarget, UniformLocation, UniformType,
};
pub use errors::{BindError, Result};
pub use graph::{
    Resource, Shared, SharedBuffer, SharedProgram, SharedTexture, SharedUniform, StorageResource,
    TexturePlane, TextureResource, UniformResource, UniformValue, UploadKind,
};
pub use pipeline::{
    BiplanarSampling, ExternalSampling, GenericSampling, Pipeline, ResourceMap, SamplerKind,
    SamplerRoles, SamplingStrategy, UnitMask,
};
