use super::{UniformLocation, UniformType};
use crate::graph::Resource;

/// A uniform the shader compiler kept alive.
///
/// Uniforms the compiler eliminated as dead never show up here; a pipeline
/// treats their absence as expected and skips them silently.
#[derive(Clone, Debug)]
pub struct ActiveUniform {
    pub name: String,
    pub location: UniformLocation,
    pub ty: UniformType,
}

impl ActiveUniform {
    #[must_use]
    pub fn new(name: impl Into<String>, location: u32, ty: UniformType) -> Self {
        Self {
            name: name.into(),
            location: UniformLocation(location),
            ty,
        }
    }
}

/// Introspection surface of a compiled shader program.
///
/// The program participates in the frame lifecycle like any other graph
/// resource, hence the [`Resource`] supertrait: the frame updater drives its
/// time-based refresh before each upload pass.
pub trait ShaderProgram: Resource {
    /// Uniforms that survived compilation, in compiler enumeration order.
    fn active_uniforms(&self) -> &[ActiveUniform];

    /// Location of a uniform by name, whether or not it is in the active
    /// list. Used for the auxiliary metadata uniforms resolved by naming
    /// convention.
    fn uniform_location(&self, name: &str) -> Option<UniformLocation>;

    /// Binding index of a shader-storage block, `None` when the program has
    /// no block of that name.
    fn storage_block_binding(&self, name: &str) -> Option<u32>;

    /// The texture unit the compiler assigned to an image uniform.
    fn image_unit(&self, location: UniformLocation) -> u32;
}
