//! Pipeline Resource Binding
//!
//! A [`Pipeline`] sits between the scene graph's declarative name→resource
//! maps and the shading API's binding model. Resolution runs once per
//! pipeline: the compiled program's active uniforms are reconciled against
//! the maps, sampler names are stripped of their role suffixes, texture
//! units are reserved for image-store uniforms, and storage-block bindings
//! are captured in map order. Every frame then drives the same four-step
//! contract: `update` (refresh time-dependent resources), then `upload`
//! (uniform upload, sampler/image binding, storage binding).
//!
//! Uniforms the compiler eliminated are skipped silently; a texture that no
//! active uniform references never claims a unit and only produces a
//! warning.

mod sampling;
mod units;

pub use sampling::{
    BiplanarSampling, EXTERNAL_SAMPLER_SUFFIX, ExternalSampling, GenericSampling, SAMPLER_SUFFIX,
    SamplerRoles, SamplingStrategy,
};
pub use units::UnitMask;

use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::api::{
    Capabilities, ShaderProgram, ShadingApi, TextureId, TextureTarget, UniformLocation,
    UniformType,
};
use crate::errors::{BindError, Result};
use crate::graph::{SharedBuffer, SharedProgram, SharedTexture, SharedUniform, UniformValue};

/// Name-keyed resource map attached to a pipeline.
pub type ResourceMap<T> = FxHashMap<String, T>;

/// Shape classification of a texture binding point.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SamplerKind {
    Plain2d,
    Volume,
    /// Platform-opaque external sampling; accepts either a plain 2-D or an
    /// external backing since the live role is picked per frame.
    External,
    /// Direct image read/write on a compiler-fixed unit.
    Image,
}

impl SamplerKind {
    fn of(ty: UniformType) -> Option<Self> {
        match ty {
            UniformType::Sampler2d => Some(Self::Plain2d),
            UniformType::Sampler3d => Some(Self::Volume),
            UniformType::SamplerExternal => Some(Self::External),
            UniformType::Image2d => Some(Self::Image),
            _ => None,
        }
    }

    fn matches(self, target: TextureTarget) -> bool {
        match self {
            Self::Plain2d => target == TextureTarget::Texture2d,
            Self::Volume => target == TextureTarget::Texture3d,
            Self::External => {
                target == TextureTarget::Texture2d || target == TextureTarget::External
            }
            Self::Image => true,
        }
    }
}

/// One active uniform with a matching node, frozen at resolve time.
#[derive(Clone, Debug)]
struct UniformBinding {
    name: String,
    location: UniformLocation,
    ty: UniformType,
}

/// One texture resource referenced by the shader, frozen at resolve time.
#[derive(Clone, Debug)]
struct TextureBinding {
    /// Resource name with role suffixes stripped.
    name: String,
    kind: SamplerKind,
    roles: SamplerRoles,
    sampling_mode: Option<UniformLocation>,
    coord_matrix: Option<UniformLocation>,
    dimensions: Option<UniformLocation>,
    source_ts: Option<UniformLocation>,
    /// Compiler-fixed unit, image kind only.
    image_unit: u32,
}

/// One storage resource in map-iteration order, frozen at resolve time.
#[derive(Clone, Debug)]
struct BufferBinding {
    name: String,
    /// `None` when the program has no block of that name; the slot stays
    /// unbound rather than failing.
    binding: Option<u32>,
}

/// Binds a scene graph's resources to a compiled shader program.
///
/// Lifecycle, driven by the owning render loop on the context thread:
/// [`init`](Self::init) once, then per frame [`update`](Self::update)
/// followed by [`upload`](Self::upload), and [`uninit`](Self::uninit) when
/// the pipeline dies. A failed `init` leaves no usable partial state; a
/// failed `upload` aborts the remaining bind steps for that frame only.
pub struct Pipeline {
    program: SharedProgram,
    uniforms: Option<ResourceMap<SharedUniform>>,
    textures: Option<ResourceMap<SharedTexture>>,
    buffers: Option<ResourceMap<SharedBuffer>>,
    strategy: Box<dyn SamplingStrategy>,

    uniform_bindings: Vec<UniformBinding>,
    texture_bindings: Vec<TextureBinding>,
    buffer_bindings: Vec<BufferBinding>,
    /// Units permanently reserved at init (image-store uniforms plus the
    /// disabled unit); cloned as the working set of every frame's bind pass.
    reserved_units: UnitMask,
    disabled_unit: Option<u32>,
}

impl Pipeline {
    /// Creates an unresolved pipeline over `program` using the
    /// [`GenericSampling`] strategy.
    #[must_use]
    pub fn new(program: SharedProgram) -> Self {
        Self {
            program,
            uniforms: None,
            textures: None,
            buffers: None,
            strategy: Box::new(GenericSampling),
            uniform_bindings: Vec::new(),
            texture_bindings: Vec::new(),
            buffer_bindings: Vec::new(),
            reserved_units: UnitMask::default(),
            disabled_unit: None,
        }
    }

    /// Selects the platform sampling strategy. Must be called before
    /// [`init`](Self::init); the strategy never changes afterwards.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Box<dyn SamplingStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    #[must_use]
    pub fn with_uniforms(mut self, uniforms: ResourceMap<SharedUniform>) -> Self {
        self.uniforms = Some(uniforms);
        self
    }

    #[must_use]
    pub fn with_textures(mut self, textures: ResourceMap<SharedTexture>) -> Self {
        self.textures = Some(textures);
        self
    }

    #[must_use]
    pub fn with_buffers(mut self, buffers: ResourceMap<SharedBuffer>) -> Self {
        self.buffers = Some(buffers);
        self
    }

    /// The shared unit used to pin inactive sampler roles, reserved only
    /// when some texture has more than one live role.
    #[must_use]
    pub fn disabled_unit(&self) -> Option<u32> {
        self.disabled_unit
    }

    /// Units permanently reserved for the pipeline's lifetime.
    #[must_use]
    pub fn reserved_units(&self) -> &UnitMask {
        &self.reserved_units
    }

    /// Resolves the pipeline against the program's active uniforms.
    ///
    /// Initializes the program and every referenced resource node, builds
    /// the frozen binding descriptors, reserves image units and (when
    /// needed) the shared disabled unit. Any error aborts resolution; the
    /// pipeline must not be uploaded afterwards.
    pub fn init(&mut self, api: &dyn ShadingApi) -> Result<()> {
        let caps = api.capabilities();

        self.program.write().init()?;
        let program = self.program.clone();
        let program = program.read();

        self.uniform_bindings = self.resolve_uniforms(&*program)?;
        let (texture_bindings, reserved, disabled) = self.resolve_textures(&*program, caps)?;
        self.texture_bindings = texture_bindings;
        self.reserved_units = reserved;
        self.disabled_unit = disabled;
        self.buffer_bindings = self.resolve_buffers(&*program, caps)?;
        Ok(())
    }

    /// Releases all resolved binding state. The resource maps and the
    /// program handle stay attached, so the pipeline can be re-resolved.
    pub fn uninit(&mut self) {
        self.uniform_bindings.clear();
        self.texture_bindings.clear();
        self.buffer_bindings.clear();
        self.reserved_units = UnitMask::default();
        self.disabled_unit = None;
    }

    /// Refreshes the time-dependent state of every attached resource and
    /// the program itself. Fail-fast: the first error aborts the remaining
    /// visits and the caller should drop the frame for this pipeline.
    pub fn update(&mut self, t: f64, api: &dyn ShadingApi) -> Result<()> {
        if let Some(textures) = &self.textures {
            for node in textures.values() {
                node.write().update(t)?;
            }
        }
        if let Some(uniforms) = &self.uniforms {
            for node in uniforms.values() {
                node.write().update(t)?;
            }
        }
        if let Some(buffers) = &self.buffers {
            if api.capabilities().storage_buffers {
                for node in buffers.values() {
                    node.write().update(t)?;
                }
            }
        }
        self.program.write().update(t)
    }

    /// Uploads uniform values and binds textures, images and storage
    /// buffers for the current frame. Call after [`update`](Self::update).
    pub fn upload(&mut self, api: &mut dyn ShadingApi) -> Result<()> {
        self.upload_uniforms(api);
        self.bind_textures(api)?;
        self.bind_buffers(api);
        Ok(())
    }

    fn resolve_uniforms(&self, program: &dyn ShaderProgram) -> Result<Vec<UniformBinding>> {
        let mut bindings = Vec::new();
        let Some(uniforms) = &self.uniforms else {
            return Ok(bindings);
        };

        for active in program.active_uniforms() {
            // Uniforms the user declared but the compiler eliminated never
            // reach this loop; the reverse case is skipped here.
            let Some(node) = uniforms.get(&active.name) else {
                continue;
            };
            node.write().init()?;
            bindings.push(UniformBinding {
                name: active.name.clone(),
                location: active.location,
                ty: active.ty,
            });
        }
        Ok(bindings)
    }

    fn resolve_textures(
        &self,
        program: &dyn ShaderProgram,
        caps: Capabilities,
    ) -> Result<(Vec<TextureBinding>, UnitMask, Option<u32>)> {
        let mut reserved = UnitMask::new(caps.max_texture_image_units);
        let mut disabled_unit = None;
        let mut bindings: Vec<TextureBinding> = Vec::new();

        let Some(textures) = &self.textures else {
            return Ok((bindings, reserved, disabled_unit));
        };

        if textures.len() > caps.max_texture_image_units as usize {
            return Err(BindError::TooManyTextures {
                count: textures.len(),
                max: caps.max_texture_image_units,
            });
        }

        for active in program.active_uniforms() {
            if active.ty.is_image() {
                let node = textures
                    .get(&active.name)
                    .ok_or_else(|| BindError::ResourceNotFound(active.name.clone()))?;
                {
                    let mut texture = node.write();
                    texture.init()?;
                    // Image-store binding bypasses the sampling paths
                    // entirely, so the zero-copy optimization is off.
                    texture.set_direct_rendering(false);
                }

                let unit = program.image_unit(active.location);
                reserved.claim(unit)?;
                log::debug!(
                    "image '{}' at location {} uses fixed texture unit {unit}",
                    active.name,
                    active.location.0
                );

                bindings.push(TextureBinding {
                    name: active.name.clone(),
                    kind: SamplerKind::Image,
                    roles: SamplerRoles {
                        primary: Some(active.location),
                        ..SamplerRoles::default()
                    },
                    sampling_mode: None,
                    coord_matrix: aux_location(program, &active.name, "coord_matrix"),
                    dimensions: aux_location(program, &active.name, "dimensions"),
                    source_ts: aux_location(program, &active.name, "ts"),
                    image_unit: unit,
                });
            } else if active.ty.is_sampler() {
                let Some(stripped) = strip_sampler_suffix(&active.name) else {
                    // Not part of the sampler naming scheme; some other
                    // binding mechanism owns this uniform.
                    continue;
                };
                let base = self.strategy.canonical_base(stripped);
                let kind = SamplerKind::of(active.ty).unwrap_or(SamplerKind::Plain2d);

                // A shader can declare several roles for one resource; they
                // share a single descriptor and a single unit per frame.
                if let Some(existing) = bindings
                    .iter_mut()
                    .find(|b| b.kind != SamplerKind::Image && b.name == base)
                {
                    if kind == SamplerKind::External {
                        existing.kind = SamplerKind::External;
                    }
                    continue;
                }

                let node = textures
                    .get(base)
                    .ok_or_else(|| BindError::ResourceNotFound(base.to_string()))?;
                node.write().init()?;

                let roles = self.strategy.resolve_roles(program, base);
                if self.strategy.needs_disabled_unit(&roles) && disabled_unit.is_none() {
                    disabled_unit = Some(reserved.acquire().ok_or(BindError::NoUnitAvailable)?);
                }

                {
                    let mut texture = node.write();
                    let eligible =
                        texture.direct_rendering() && self.strategy.direct_rendering(&roles);
                    texture.set_direct_rendering(eligible);
                    log::info!(
                        "direct rendering {} available for texture '{base}'",
                        if eligible { "is" } else { "is not" }
                    );
                }

                if !self.strategy.any_role(&roles) {
                    log::warn!("no sampler found for texture '{base}'");
                }

                bindings.push(TextureBinding {
                    name: base.to_string(),
                    kind,
                    roles,
                    sampling_mode: aux_location(program, base, "sampling_mode"),
                    coord_matrix: aux_location(program, base, "coord_matrix"),
                    dimensions: aux_location(program, base, "dimensions"),
                    source_ts: aux_location(program, base, "ts"),
                    image_unit: 0,
                });
            }
        }

        Ok((bindings, reserved, disabled_unit))
    }

    fn resolve_buffers(
        &self,
        program: &dyn ShaderProgram,
        caps: Capabilities,
    ) -> Result<Vec<BufferBinding>> {
        let mut bindings = Vec::new();
        let Some(buffers) = &self.buffers else {
            return Ok(bindings);
        };
        if !caps.storage_buffers {
            return Ok(bindings);
        }

        for (name, node) in buffers {
            {
                let mut buffer = node.write();
                buffer.request_gpu_buffer();
                buffer.init()?;
            }
            let binding = program.storage_block_binding(name);
            if binding.is_none() {
                log::debug!("storage block '{name}' not present in program, slot left unbound");
            }
            bindings.push(BufferBinding {
                name: name.clone(),
                binding,
            });
        }
        Ok(bindings)
    }

    fn upload_uniforms(&self, api: &mut dyn ShadingApi) {
        let Some(uniforms) = &self.uniforms else {
            return;
        };

        for binding in &self.uniform_bindings {
            let Some(node) = uniforms.get(&binding.name) else {
                continue;
            };
            let node = node.read();
            match node.value() {
                UniformValue::Float(v) => api.set_f32(binding.location, v),
                UniformValue::Vec2(v) => api.set_vec2(binding.location, v),
                UniformValue::Vec3(v) => api.set_vec3(binding.location, v),
                UniformValue::Vec4(v) => api.set_vec4(binding.location, v),
                UniformValue::Int(v) => api.set_i32(binding.location, v),
                UniformValue::Quat(q) => match binding.ty {
                    UniformType::FloatMat4 => api.set_mat4(binding.location, &Mat4::from_quat(q)),
                    UniformType::FloatVec4 => api.set_vec4(binding.location, q.into()),
                    _ => log::error!(
                        "quaternion uniform '{}' must be declared as vec4 or mat4 in the shader",
                        binding.name
                    ),
                },
                UniformValue::Mat4(m) => api.set_mat4(binding.location, &m),
                UniformValue::FloatArray(data) => api.set_f32_array(binding.location, data),
                UniformValue::Vec2Array(data) => api.set_vec2_array(binding.location, data),
                UniformValue::Vec3Array(data) => api.set_vec3_array(binding.location, data),
                UniformValue::Vec4Array(data) => api.set_vec4_array(binding.location, data),
            }
        }
    }

    fn bind_textures(&self, api: &mut dyn ShadingApi) -> Result<()> {
        let Some(textures) = &self.textures else {
            return Ok(());
        };

        // Image reservations carry over; sampler units are re-allocated
        // from this working copy every frame.
        let mut units = self.reserved_units.clone();

        if let Some(disabled) = self.disabled_unit {
            for &target in self.strategy.disabled_targets() {
                api.bind_texture(disabled, target, TextureId::NONE);
            }
        }

        for binding in &self.texture_bindings {
            let Some(node) = textures.get(&binding.name) else {
                continue;
            };
            let texture = node.read();

            if binding.kind == SamplerKind::Image {
                log::trace!(
                    "image '{}' binds to fixed texture unit {}",
                    binding.name,
                    binding.image_unit
                );
                api.bind_image(
                    binding.image_unit,
                    texture.texture_id(),
                    texture.image_access(),
                    texture.image_format(),
                );
            } else {
                let unit = units.acquire().ok_or(BindError::NoUnitAvailable)?;
                if !binding.kind.matches(texture.target()) {
                    return Err(BindError::TargetMismatch {
                        kind: binding.kind,
                        target: texture.target(),
                    });
                }
                log::trace!("sampler '{}' will use texture unit {unit}", binding.name);

                let mode = self.strategy.bind(
                    api,
                    &*texture,
                    &binding.roles,
                    unit,
                    self.disabled_unit,
                    &mut units,
                )?;
                if let Some(location) = binding.sampling_mode {
                    api.set_i32(location, mode as i32);
                }
            }

            if let Some(location) = binding.coord_matrix {
                api.set_mat4(location, &texture.coord_matrix());
            }
            if let Some(location) = binding.dimensions {
                let dims = texture.dimensions();
                if texture.target() == TextureTarget::Texture3d {
                    api.set_vec3(location, dims);
                } else {
                    api.set_vec2(location, dims.truncate());
                }
            }
            if let Some(location) = binding.source_ts {
                api.set_f32(location, texture.source_ts());
            }
        }
        Ok(())
    }

    fn bind_buffers(&self, api: &mut dyn ShadingApi) {
        let Some(buffers) = &self.buffers else {
            return;
        };
        if !api.capabilities().storage_buffers {
            return;
        }

        for binding in &self.buffer_bindings {
            let Some(index) = binding.binding else {
                continue;
            };
            let Some(node) = buffers.get(&binding.name) else {
                continue;
            };
            api.bind_storage_buffer(index, node.read().gpu_buffer_id());
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("strategy", &self.strategy)
            .field("uniform_bindings", &self.uniform_bindings.len())
            .field("texture_bindings", &self.texture_bindings.len())
            .field("buffer_bindings", &self.buffer_bindings.len())
            .field("disabled_unit", &self.disabled_unit)
            .finish_non_exhaustive()
    }
}

fn aux_location(
    program: &dyn ShaderProgram,
    base: &str,
    suffix: &str,
) -> Option<UniformLocation> {
    program.uniform_location(&format!("{base}_{suffix}"))
}

/// Strips the well-known sampler suffix from an active uniform name.
/// Longest suffix first so `_external_sampler` is never misread as
/// `_sampler`. Names outside the convention yield `None`.
fn strip_sampler_suffix(name: &str) -> Option<&str> {
    name.strip_suffix(EXTERNAL_SAMPLER_SUFFIX)
        .or_else(|| name.strip_suffix(SAMPLER_SUFFIX))
        .filter(|base| !base.is_empty())
}
