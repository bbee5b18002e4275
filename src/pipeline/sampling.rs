//! Platform Sampling Strategies
//!
//! Platforms disagree about how a texture reaches a shader: most sample a
//! plain 2-D/3-D target, some route decoder output through an opaque
//! external target, and some expose biplanar zero-copy surfaces as separate
//! Y/UV plane textures. Instead of scattering conditional compilation over
//! the bind pass, the differences live behind one [`SamplingStrategy`]
//! object selected when the pipeline is built.
//!
//! Each strategy resolves which sampler-role uniforms exist for a texture at
//! init time and performs the per-frame bind for those roles, reporting the
//! [`SamplingMode`] in effect so the shader can branch on it.

use crate::api::{
    SamplingMode, ShaderProgram, ShadingApi, TextureId, TextureTarget, UniformLocation,
};
use crate::errors::{BindError, Result};
use crate::graph::{TexturePlane, TextureResource, UploadKind};

use super::units::UnitMask;

/// Suffix of a plain sampler uniform (`<base>_sampler`).
pub const SAMPLER_SUFFIX: &str = "_sampler";
/// Suffix of a platform-opaque external sampler uniform.
pub const EXTERNAL_SAMPLER_SUFFIX: &str = "_external_sampler";

/// Sampler-role locations resolved for one texture resource.
///
/// Which roles a strategy fills depends on the platform; a role left `None`
/// either does not exist in the shader or is meaningless for the platform.
#[derive(Clone, Debug, Default)]
pub struct SamplerRoles {
    /// Plain `<base>_sampler` role.
    pub primary: Option<UniformLocation>,
    /// Platform-opaque `<base>_external_sampler` role.
    pub external: Option<UniformLocation>,
    /// Biplanar `<base>_y_sampler` role.
    pub plane_y: Option<UniformLocation>,
    /// Biplanar `<base>_uv_sampler` role.
    pub plane_uv: Option<UniformLocation>,
}

/// Platform-specific sampler binding behavior.
pub trait SamplingStrategy: std::fmt::Debug {
    /// Resolves the role locations this platform can bind for `base`.
    fn resolve_roles(&self, program: &dyn ShaderProgram, base: &str) -> SamplerRoles;

    /// Collapses a role-derived name to the resource it belongs to.
    /// The default is the identity; the biplanar platform strips its
    /// per-plane suffixes so `tex_y`/`tex_uv` resolve to `tex`.
    fn canonical_base<'a>(&self, base: &'a str) -> &'a str {
        base
    }

    /// True when at least one role reaches the shader.
    fn any_role(&self, roles: &SamplerRoles) -> bool;

    /// True when a primary role coexists with a platform alternative, which
    /// forces the pipeline to reserve the shared disabled unit.
    fn needs_disabled_unit(&self, roles: &SamplerRoles) -> bool;

    /// Whether the zero-copy path is reachable given the resolved roles.
    fn direct_rendering(&self, roles: &SamplerRoles) -> bool;

    /// Targets the disabled unit is cleared on at the start of a frame.
    fn disabled_targets(&self) -> &'static [TextureTarget];

    /// Binds `texture` for sampling on `unit`. May claim a second unit from
    /// `units` for multi-plane formats. Returns the sampling mode in effect.
    fn bind(
        &self,
        api: &mut dyn ShadingApi,
        texture: &dyn TextureResource,
        roles: &SamplerRoles,
        unit: u32,
        disabled_unit: Option<u32>,
        units: &mut UnitMask,
    ) -> Result<SamplingMode>;
}

fn role_location(program: &dyn ShaderProgram, base: &str, suffix: &str) -> Option<UniformLocation> {
    program.uniform_location(&format!("{base}_{suffix}"))
}

/// Single-role platforms: one plain sampler per texture.
#[derive(Debug, Default)]
pub struct GenericSampling;

impl SamplingStrategy for GenericSampling {
    fn resolve_roles(&self, program: &dyn ShaderProgram, base: &str) -> SamplerRoles {
        SamplerRoles {
            primary: role_location(program, base, "sampler"),
            ..SamplerRoles::default()
        }
    }

    fn any_role(&self, roles: &SamplerRoles) -> bool {
        roles.primary.is_some()
    }

    fn needs_disabled_unit(&self, _roles: &SamplerRoles) -> bool {
        false
    }

    fn direct_rendering(&self, _roles: &SamplerRoles) -> bool {
        false
    }

    fn disabled_targets(&self) -> &'static [TextureTarget] {
        &[TextureTarget::Texture2d]
    }

    fn bind(
        &self,
        api: &mut dyn ShadingApi,
        texture: &dyn TextureResource,
        roles: &SamplerRoles,
        unit: u32,
        _disabled_unit: Option<u32>,
        _units: &mut UnitMask,
    ) -> Result<SamplingMode> {
        let mut mode = SamplingMode::None;
        if let Some(location) = roles.primary {
            mode = SamplingMode::Plain;
            api.bind_texture(unit, texture.target(), texture.texture_id());
            api.set_i32(location, unit as i32);
        }
        Ok(mode)
    }
}

/// Platforms that sample decoder output through an opaque external target.
///
/// A shader may declare both the plain and the external role for the same
/// texture; whichever one is inactive for the bound resource gets pinned to
/// the shared disabled unit so stale state can never leak through it.
#[derive(Debug, Default)]
pub struct ExternalSampling;

impl SamplingStrategy for ExternalSampling {
    fn resolve_roles(&self, program: &dyn ShaderProgram, base: &str) -> SamplerRoles {
        SamplerRoles {
            primary: role_location(program, base, "sampler"),
            external: role_location(program, base, "external_sampler"),
            ..SamplerRoles::default()
        }
    }

    fn any_role(&self, roles: &SamplerRoles) -> bool {
        roles.primary.is_some() || roles.external.is_some()
    }

    fn needs_disabled_unit(&self, roles: &SamplerRoles) -> bool {
        roles.primary.is_some() && roles.external.is_some()
    }

    fn direct_rendering(&self, roles: &SamplerRoles) -> bool {
        roles.external.is_some()
    }

    fn disabled_targets(&self) -> &'static [TextureTarget] {
        &[TextureTarget::Texture2d, TextureTarget::External]
    }

    fn bind(
        &self,
        api: &mut dyn ShadingApi,
        texture: &dyn TextureResource,
        roles: &SamplerRoles,
        unit: u32,
        disabled_unit: Option<u32>,
        _units: &mut UnitMask,
    ) -> Result<SamplingMode> {
        let mut mode = SamplingMode::None;
        if texture.target() == TextureTarget::External {
            if let Some(location) = roles.primary {
                api.bind_texture(unit, TextureTarget::Texture2d, TextureId::NONE);
                if let Some(disabled) = disabled_unit {
                    api.set_i32(location, disabled as i32);
                }
            }
            if let Some(location) = roles.external {
                mode = SamplingMode::External;
                api.bind_texture(unit, texture.target(), texture.texture_id());
                api.set_i32(location, unit as i32);
            }
        } else {
            if let Some(location) = roles.external {
                api.bind_texture(unit, TextureTarget::External, TextureId::NONE);
                if let Some(disabled) = disabled_unit {
                    api.set_i32(location, disabled as i32);
                }
            }
            if let Some(location) = roles.primary {
                mode = SamplingMode::Plain;
                api.bind_texture(unit, texture.target(), texture.texture_id());
                api.set_i32(location, unit as i32);
            }
        }
        Ok(mode)
    }
}

/// Platforms exposing biplanar zero-copy surfaces as separate Y/UV planes.
#[derive(Debug, Default)]
pub struct BiplanarSampling;

impl BiplanarSampling {
    const PLANE_SUFFIXES: [&'static str; 2] = ["_y", "_uv"];
}

impl SamplingStrategy for BiplanarSampling {
    fn resolve_roles(&self, program: &dyn ShaderProgram, base: &str) -> SamplerRoles {
        SamplerRoles {
            primary: role_location(program, base, "sampler"),
            plane_y: role_location(program, base, "y_sampler"),
            plane_uv: role_location(program, base, "uv_sampler"),
            ..SamplerRoles::default()
        }
    }

    fn canonical_base<'a>(&self, base: &'a str) -> &'a str {
        for suffix in Self::PLANE_SUFFIXES {
            if let Some(stripped) = base.strip_suffix(suffix) {
                if !stripped.is_empty() {
                    return stripped;
                }
            }
        }
        base
    }

    fn any_role(&self, roles: &SamplerRoles) -> bool {
        roles.primary.is_some() || (roles.plane_y.is_some() && roles.plane_uv.is_some())
    }

    fn needs_disabled_unit(&self, roles: &SamplerRoles) -> bool {
        roles.primary.is_some() && (roles.plane_y.is_some() || roles.plane_uv.is_some())
    }

    fn direct_rendering(&self, roles: &SamplerRoles) -> bool {
        roles.plane_y.is_some() || roles.plane_uv.is_some()
    }

    fn disabled_targets(&self) -> &'static [TextureTarget] {
        &[TextureTarget::Texture2d]
    }

    fn bind(
        &self,
        api: &mut dyn ShadingApi,
        texture: &dyn TextureResource,
        roles: &SamplerRoles,
        unit: u32,
        disabled_unit: Option<u32>,
        units: &mut UnitMask,
    ) -> Result<SamplingMode> {
        let mut mode = SamplingMode::None;
        if texture.upload_kind() == UploadKind::BiplanarZeroCopy {
            mode = SamplingMode::Biplanar;

            if let Some(location) = roles.primary {
                if let Some(disabled) = disabled_unit {
                    api.set_i32(location, disabled as i32);
                }
            }
            if let Some(location) = roles.plane_y {
                api.bind_texture(unit, texture.target(), texture.plane_id(TexturePlane::Y));
                api.set_i32(location, unit as i32);
            }
            if let Some(location) = roles.plane_uv {
                // The UV plane shares the unit unless the Y plane already
                // occupies it.
                let uv_unit = if roles.plane_y.is_some() {
                    units.acquire().ok_or(BindError::NoUnitAvailable)?
                } else {
                    unit
                };
                api.bind_texture(uv_unit, texture.target(), texture.plane_id(TexturePlane::Uv));
                api.set_i32(location, uv_unit as i32);
            }
        } else if let Some(location) = roles.primary {
            mode = SamplingMode::Plain;
            api.bind_texture(unit, texture.target(), texture.texture_id());
            api.set_i32(location, unit as i32);

            if let Some(disabled) = disabled_unit {
                if let Some(plane) = roles.plane_y {
                    api.set_i32(plane, disabled as i32);
                }
                if let Some(plane) = roles.plane_uv {
                    api.set_i32(plane, disabled as i32);
                }
            }
        }
        Ok(mode)
    }
}
