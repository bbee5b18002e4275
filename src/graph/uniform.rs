use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

use super::Resource;

/// Snapshot of a uniform node's current value.
///
/// Array variants borrow the node's bulk data, packed component-major, and
/// map to the corresponding array-upload call on the shading API.
#[derive(Copy, Clone, Debug)]
pub enum UniformValue<'a> {
    Float(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Int(i32),
    /// Uploaded as a mat4 or a vec4 depending on the shader's declaration.
    Quat(Quat),
    Mat4(Mat4),
    FloatArray(&'a [f32]),
    Vec2Array(&'a [f32]),
    Vec3Array(&'a [f32]),
    Vec4Array(&'a [f32]),
}

/// A scene-graph node backing a plain (non-sampler) uniform.
pub trait UniformResource: Resource {
    /// The value to upload this frame, read after `update` has run.
    fn value(&self) -> UniformValue<'_>;
}
