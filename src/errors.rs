//! Error Types
//!
//! The main error type [`BindError`] covers every fatal failure mode of
//! pipeline resolution and the per-frame bind pass. Misconfigurations that
//! only affect a single uniform (a quaternion declared with the wrong shader
//! type, a texture with no matching sampler role) are reported through the
//! `log` facade instead and never abort a frame.
//!
//! All public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, BindError>`.

use thiserror::Error;

use crate::api::TextureTarget;
use crate::pipeline::SamplerKind;

/// Fatal binding errors.
///
/// Errors raised during [`Pipeline::init`](crate::pipeline::Pipeline::init)
/// abort pipeline construction entirely; errors raised during
/// [`Pipeline::upload`](crate::pipeline::Pipeline::upload) abort the
/// remaining bind steps for that frame and the caller is expected to skip
/// rendering the pipeline. None of them are transient: retrying without
/// changing the scene or the shader fails the same way.
#[derive(Error, Debug)]
pub enum BindError {
    /// An active sampler or image uniform referenced a texture name with no
    /// matching resource in the pipeline's texture map.
    #[error("no texture resource named '{0}'")]
    ResourceNotFound(String),

    /// The compiler assigned an image uniform a texture unit beyond the
    /// platform limit.
    #[error("texture unit {unit} exceeds the platform limit of {max}")]
    UnitExceedsLimit {
        /// The compiler-assigned unit.
        unit: u32,
        /// The platform's maximum texture-image unit count.
        max: u32,
    },

    /// Two image uniforms resolved to the same compiler-assigned unit.
    #[error("texture unit {0} is already used by another image")]
    UnitAlreadyUsed(u32),

    /// The texture-unit allocator is exhausted.
    #[error("no texture unit available")]
    NoUnitAvailable,

    /// More textures are attached to the pipeline than the platform exposes
    /// units for.
    #[error("attached texture count {count} exceeds the platform limit of {max}")]
    TooManyTextures {
        /// Number of textures attached to the pipeline.
        count: usize,
        /// The platform's maximum texture-image unit count.
        max: u32,
    },

    /// A bound texture's runtime target disagrees with the sampler kind the
    /// shader declared for it.
    #[error("sampler kind {kind:?} does not match texture target {target:?}")]
    TargetMismatch {
        /// The sampler kind declared in the shader.
        kind: SamplerKind,
        /// The texture's actual runtime target.
        target: TextureTarget,
    },

    /// A resource node failed its init or update hook.
    #[error("resource error: {0}")]
    Node(String),
}

/// Alias for `Result<T, BindError>`.
pub type Result<T> = std::result::Result<T, BindError>;
