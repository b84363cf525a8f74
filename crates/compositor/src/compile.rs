use std::borrow::Cow;

use anyhow::Result;
use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("fullscreen triangle vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    }))
}

/// Compiles the displacement-blend fragment shader.
pub(crate) fn compile_fragment_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule> {
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("distortion blend fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(FRAGMENT_SHADER_GLSL),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    }))
}

/// Minimal full-screen triangle vertex shader.
const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

/// The core per-pixel rule: both textures are sampled through a rotated,
/// scaled displacement vector read from the field's red/green channels, and
/// blended by the animated factor. The departing image's displacement scales
/// with `disp_factor`, the arriving image's with `1 - disp_factor`.
///
/// The uniform block layout must match `DistortionUniforms` in
/// `gpu/uniforms.rs`.
const FRAGMENT_SHADER_GLSL: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 out_color;

layout(std140, set = 0, binding = 0) uniform BlendParams {
    vec4 resolution;
    float disp_factor;
    float rotation_a;
    float rotation_b;
    float intensity_a;
    float intensity_b;
} ubo;

layout(set = 1, binding = 0) uniform texture2D texture_a;
layout(set = 1, binding = 1) uniform sampler sampler_a;
layout(set = 1, binding = 2) uniform texture2D texture_b;
layout(set = 1, binding = 3) uniform sampler sampler_b;
layout(set = 1, binding = 4) uniform texture2D displacement_map;
layout(set = 1, binding = 5) uniform sampler displacement_sampler;

mat2 rotation(float angle) {
    float s = sin(angle);
    float c = cos(angle);
    // Column-major CCW rotation: maps +x toward +y for positive angles.
    return mat2(c, s, -s, c);
}

void main() {
    vec4 field = texture(sampler2D(displacement_map, displacement_sampler), v_uv);
    vec2 disp = vec2(field.r, field.g);
    vec2 distorted_a = v_uv + rotation(ubo.rotation_a) * disp * ubo.intensity_a * ubo.disp_factor;
    vec2 distorted_b = v_uv + rotation(ubo.rotation_b) * disp * ubo.intensity_b * (1.0 - ubo.disp_factor);
    vec4 sample_a = texture(sampler2D(texture_a, sampler_a), distorted_a);
    vec4 sample_b = texture(sampler2D(texture_b, sampler_b), distorted_b);
    out_color = mix(sample_a, sample_b, ubo.disp_factor);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_shader_binds_three_texture_pairs() {
        for binding in 0..6 {
            assert!(FRAGMENT_SHADER_GLSL.contains(&format!("binding = {binding}")));
        }
    }

    #[test]
    fn fragment_shader_keeps_asymmetric_factor_coupling() {
        assert!(FRAGMENT_SHADER_GLSL.contains("ubo.intensity_a * ubo.disp_factor"));
        assert!(FRAGMENT_SHADER_GLSL.contains("ubo.intensity_b * (1.0 - ubo.disp_factor)"));
    }
}
