//! GPU backend: surface/device setup, texture upload, pipeline construction,
//! and per-frame rendering.

mod context;
mod pipeline;
mod state;
mod textures;
mod uniforms;

pub(crate) use state::GpuState;
