//! Node-Graph Resource Interfaces
//!
//! The scene graph owns every resource; a pipeline only references them.
//! Resources are shared as `Arc<RwLock<dyn …>>` handles and consumed through
//! three refinements of the base [`Resource`] lifecycle trait:
//!
//! - [`UniformResource`] — exposes a typed value snapshot each frame;
//! - [`TextureResource`] — exposes the GPU texture, its target and the
//!   per-frame metadata (coordinate matrix, dimensions, timestamp);
//! - [`StorageResource`] — exposes a GPU buffer backing a storage block.

mod buffer;
mod texture;
mod uniform;

pub use buffer::StorageResource;
pub use texture::{TexturePlane, TextureResource, UploadKind};
pub use uniform::{UniformResource, UniformValue};

use std::sync::Arc;

use parking_lot::RwLock;

use crate::api::ShaderProgram;
use crate::errors::Result;

/// Time-driven node-graph resource.
///
/// `init` is lazy and idempotent: calling it on an already-initialized node
/// is a no-op. `update` refreshes any time-dependent state and must run once
/// per frame before the pipeline's upload pass reads the resource.
pub trait Resource {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn update(&mut self, _t: f64) -> Result<()> {
        Ok(())
    }
}

/// Shared handle to a node-graph resource.
pub type Shared<T> = Arc<RwLock<T>>;

pub type SharedUniform = Shared<dyn UniformResource>;
pub type SharedTexture = Shared<dyn TextureResource>;
pub type SharedBuffer = Shared<dyn StorageResource>;
pub type SharedProgram = Shared<dyn ShaderProgram>;
