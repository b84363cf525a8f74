//! Displacement-blend compositor.
//!
//! Renders two textures into one surface, displacing each sample through a
//! rotated offset read from a displacement field and blending them with an
//! animated factor. The host owns the window, the render loop, and the
//! pointer events; the compositor maps those onto the blend timeline:
//!
//! ```text
//!   host (winit / any surface provider)
//!        │ pointer enter / leave          │ refresh tick
//!        ▼                                ▼
//!   engage() / release() ──▶ BlendState ──▶ render_frame() ──▶ GpuState ──▶ swapchain
//!                              (factor as a pure function of time)
//! ```
//!
//! Engage animates the factor toward 1 (texture B takes over), release back
//! toward 0. Invoking the opposite transition mid-flight cancels the current
//! one and restarts from the interpolated value, so the picture never snaps.
//! The same per-pixel rule is also available on the CPU via [`software`] for
//! tests and still-frame export.

mod compile;
mod gpu;
pub mod software;
pub mod timeline;
pub mod types;

use std::time::Instant;

use anyhow::Result;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::gpu::GpuState;
use crate::timeline::BlendState;
pub use crate::timeline::EasingCurve;
pub use crate::types::{
    DistortionParams, TextureLoadError, TextureSet, TextureSlot, TextureSource,
};

/// Blends two textures under a displacement field with a hover-style
/// engage/release animation.
///
/// One instance owns one render surface. All methods are non-blocking; the
/// actual interpolation happens as the host keeps calling
/// [`render_frame`](Self::render_frame) once per refresh tick.
pub struct DistortionCompositor {
    gpu: GpuState,
    blend: BlendState,
    params: DistortionParams,
}

impl DistortionCompositor {
    /// Builds a compositor rendering into the given surface target.
    ///
    /// Decodes and uploads all three textures up front; a texture that fails
    /// to load fails construction (see [`TextureLoadError`]). Out-of-range
    /// tuning parameters are clamped with a warning.
    pub fn new<T>(
        target: &T,
        initial_size: PhysicalSize<u32>,
        textures: &TextureSet,
        params: DistortionParams,
    ) -> Result<Self>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let params = params.sanitized();
        let gpu = GpuState::new(target, initial_size, textures, &params)?;
        Ok(Self {
            gpu,
            blend: BlendState::new(),
            params,
        })
    }

    /// Starts animating the blend factor toward 1 (texture B visible).
    ///
    /// Cancels any in-flight transition and restarts from the current
    /// interpolated value.
    pub fn engage(&mut self) {
        tracing::debug!("engage");
        self.blend
            .animate_to(1.0, Instant::now(), self.params.duration, self.params.curve);
    }

    /// Starts animating the blend factor back toward 0 (texture A visible).
    pub fn release(&mut self) {
        tracing::debug!("release");
        self.blend
            .animate_to(0.0, Instant::now(), self.params.duration, self.params.curve);
    }

    /// Reconfigures the render surface for a new viewport size.
    ///
    /// Safe to call repeatedly; equal or zero sizes are a no-op.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(PhysicalSize::new(width, height));
    }

    /// Rebuilds the swapchain with the current settings.
    ///
    /// Call after [`render_frame`](Self::render_frame) returns
    /// [`wgpu::SurfaceError::Lost`] or [`wgpu::SurfaceError::Outdated`].
    pub fn reconfigure_surface(&self) {
        self.gpu.reconfigure();
    }

    /// Current surface size in physical pixels.
    pub fn size(&self) -> (u32, u32) {
        let size = self.gpu.size();
        (size.width, size.height)
    }

    /// Samples the blend factor at this moment.
    pub fn factor(&mut self) -> f32 {
        self.blend.factor(Instant::now())
    }

    /// True while an engage/release transition is still running.
    pub fn is_animating(&self) -> bool {
        self.blend.is_animating(Instant::now())
    }

    /// Draws one frame at the current blend factor.
    ///
    /// The host calls this once per display refresh tick; surface errors are
    /// returned for the host to handle (typically by reconfiguring on
    /// `Lost`/`Outdated`).
    pub fn render_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let factor = self.blend.factor(Instant::now());
        self.gpu.render(factor)
    }

    /// The sanitized tuning parameters this instance renders with.
    pub fn params(&self) -> &DistortionParams {
        &self.params
    }
}
