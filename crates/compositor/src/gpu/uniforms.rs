use bytemuck::{Pod, Zeroable};

use crate::types::DistortionParams;

/// CPU mirror of the fragment shader's `BlendParams` uniform block.
///
/// Layout is std140: one vec4 followed by five floats; the trailing padding
/// rounds the block to a 16-byte multiple.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(crate) struct DistortionUniforms {
    pub resolution: [f32; 4],
    pub disp_factor: f32,
    pub rotation_a: f32,
    pub rotation_b: f32,
    pub intensity_a: f32,
    pub intensity_b: f32,
    _padding: [f32; 3],
}

impl DistortionUniforms {
    pub fn new(width: u32, height: u32, params: &DistortionParams) -> Self {
        Self {
            resolution: [width as f32, height as f32, 0.0, 0.0],
            disp_factor: 0.0,
            rotation_a: params.rotation_a,
            rotation_b: params.rotation_b,
            intensity_a: params.intensity_a,
            intensity_b: params.intensity_b,
            _padding: [0.0; 3],
        }
    }

    pub fn set_factor(&mut self, factor: f32) {
        self.disp_factor = factor.clamp(0.0, 1.0);
    }

    pub fn set_resolution(&mut self, width: f32, height: f32) {
        self.resolution[0] = width;
        self.resolution[1] = height;
    }
}
