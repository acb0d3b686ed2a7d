//! Shared GPU plumbing for the Selene render passes: device context, texture
//! helpers, bind-group-layout shorthands, camera state and the borrowed input
//! descriptors the per-frame passes consume.

mod binding;
mod camera;
mod context;
mod error;
mod inputs;
mod texture;

pub use binding::{bgl_depth_texture, bgl_storage_texture, bgl_texture, bgl_uniform};
pub use camera::CameraState;
pub use context::GpuContext;
pub use error::{Result, SeleneError};
pub use inputs::{FrameInputs, GeometryInputs};
pub use texture::{create_mip_chain, create_storage_target, MipChain, StorageTarget};
