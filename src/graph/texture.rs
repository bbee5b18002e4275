use glam::{Mat4, Vec3};

use super::Resource;
use crate::api::{ImageAccess, ImageFormat, TextureId, TextureTarget};

/// How the texture's pixel data reached the GPU this frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UploadKind {
    /// Regular upload path; the texture is sampled through its own id.
    Standard,
    /// Platform biplanar zero-copy surface exposing separate per-plane
    /// textures instead of a converted composite.
    BiplanarZeroCopy,
}

/// Plane selector of a biplanar zero-copy surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TexturePlane {
    Y,
    Uv,
}

/// A scene-graph node backing a texture or image resource.
pub trait TextureResource: Resource {
    fn target(&self) -> TextureTarget;

    fn texture_id(&self) -> TextureId;

    /// Per-plane texture of a biplanar zero-copy surface. Only meaningful
    /// when [`upload_kind`](Self::upload_kind) reports
    /// [`UploadKind::BiplanarZeroCopy`].
    fn plane_id(&self, plane: TexturePlane) -> TextureId {
        let _ = plane;
        TextureId::NONE
    }

    fn upload_kind(&self) -> UploadKind {
        UploadKind::Standard
    }

    /// Coordinate transform applied to sampling coordinates, uploaded to the
    /// `<name>_coord_matrix` auxiliary uniform.
    fn coord_matrix(&self) -> Mat4 {
        Mat4::IDENTITY
    }

    /// Width, height and depth; depth is 1 for non-volumetric targets.
    fn dimensions(&self) -> Vec3;

    /// Presentation timestamp of the current contents, in seconds.
    fn source_ts(&self) -> f32 {
        0.0
    }

    /// Whether the zero-copy/direct-rendering path is currently possible for
    /// this resource. The pipeline narrows this at resolve time based on
    /// which sampler roles the shader actually binds.
    fn direct_rendering(&self) -> bool {
        false
    }

    fn set_direct_rendering(&mut self, enabled: bool) {
        let _ = enabled;
    }

    /// Access mode for image-store binding.
    fn image_access(&self) -> ImageAccess {
        ImageAccess::ReadWrite
    }

    /// Storage format for image-store binding.
    fn image_format(&self) -> ImageFormat {
        ImageFormat::Rgba8
    }
}
