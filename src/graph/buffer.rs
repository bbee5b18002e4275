use super::Resource;
use crate::api::BufferId;

/// A scene-graph node backing a shader-storage block.
pub trait StorageResource: Resource {
    /// Asks the node to materialize a GPU buffer during its next `init`.
    /// Called before `init` when the pipeline resolves storage bindings.
    fn request_gpu_buffer(&mut self);

    /// The backing GPU buffer, valid once `init` has run after a
    /// [`request_gpu_buffer`](Self::request_gpu_buffer) call.
    fn gpu_buffer_id(&self) -> BufferId;
}
