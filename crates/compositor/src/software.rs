//! CPU implementation of the displacement blend.
//!
//! This mirrors the fragment shader in [`crate::compile`] pixel for pixel and
//! exists for two reasons: it lets the blend rule be tested without a GPU, and
//! it backs still-frame export at a fixed blend factor. Sampling is bilinear
//! with clamp-to-edge addressing, matching the GPU sampler configuration.

use image::RgbaImage;

use crate::types::{DistortionParams, TextureLoadError, TextureSlot, TextureSource};

/// Decodes a texture source into RGBA pixels.
///
/// Failures propagate to the caller untouched; the compositor does not
/// substitute placeholders.
pub fn load_rgba(slot: TextureSlot, source: &TextureSource) -> Result<RgbaImage, TextureLoadError> {
    let image = match source {
        TextureSource::Path(path) => image::open(path)
            .map_err(|source| TextureLoadError::Decode {
                slot,
                path: path.clone(),
                source,
            })?
            .to_rgba8(),
        TextureSource::Image(image) => image.clone(),
    };
    if image.width() == 0 || image.height() == 0 {
        return Err(TextureLoadError::Empty { slot });
    }
    Ok(image)
}

/// Rotates a displacement vector counter-clockwise by `angle` radians.
pub fn rotate(angle: f32, v: [f32; 2]) -> [f32; 2] {
    let (s, c) = angle.sin_cos();
    [c * v[0] - s * v[1], s * v[0] + c * v[1]]
}

/// Samples `image` at normalized coordinates with bilinear filtering and
/// clamp-to-edge addressing. Returns RGBA in [0, 1].
pub fn sample(image: &RgbaImage, u: f32, v: f32) -> [f32; 4] {
    let width = image.width();
    let height = image.height();
    let tx = u * width as f32 - 0.5;
    let ty = v * height as f32 - 0.5;
    let x0 = tx.floor();
    let y0 = ty.floor();
    let fx = tx - x0;
    let fy = ty - y0;

    let clamp_x = |x: f32| (x.max(0.0) as u32).min(width - 1);
    let clamp_y = |y: f32| (y.max(0.0) as u32).min(height - 1);
    let x0i = clamp_x(x0);
    let x1i = clamp_x(x0 + 1.0);
    let y0i = clamp_y(y0);
    let y1i = clamp_y(y0 + 1.0);

    let texel = |x: u32, y: u32| -> [f32; 4] {
        let px = image.get_pixel(x, y).0;
        [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
            px[3] as f32 / 255.0,
        ]
    };

    let p00 = texel(x0i, y0i);
    let p10 = texel(x1i, y0i);
    let p01 = texel(x0i, y1i);
    let p11 = texel(x1i, y1i);

    let mut out = [0.0; 4];
    for channel in 0..4 {
        let top = p00[channel] + (p10[channel] - p00[channel]) * fx;
        let bottom = p01[channel] + (p11[channel] - p01[channel]) * fx;
        out[channel] = top + (bottom - top) * fy;
    }
    out
}

/// Evaluates the blend rule for one UV coordinate.
///
/// The departing image's displacement scales with `factor` while the arriving
/// image's scales with `1 - factor`; the asymmetry is the effect.
pub fn composite_pixel(
    params: &DistortionParams,
    factor: f32,
    uv: [f32; 2],
    image_a: &RgbaImage,
    image_b: &RgbaImage,
    displacement: &RgbaImage,
) -> [f32; 4] {
    let field = sample(displacement, uv[0], uv[1]);
    let disp = [field[0], field[1]];

    let offset_a = rotate(params.rotation_a, disp);
    let offset_b = rotate(params.rotation_b, disp);
    let scale_a = params.intensity_a * factor;
    let scale_b = params.intensity_b * (1.0 - factor);

    let sample_a = sample(
        image_a,
        uv[0] + offset_a[0] * scale_a,
        uv[1] + offset_a[1] * scale_a,
    );
    let sample_b = sample(
        image_b,
        uv[0] + offset_b[0] * scale_b,
        uv[1] + offset_b[1] * scale_b,
    );

    let mut out = [0.0; 4];
    for channel in 0..4 {
        out[channel] = sample_a[channel] + (sample_b[channel] - sample_a[channel]) * factor;
    }
    out
}

/// Renders a full frame at the given blend factor into a new image.
pub fn composite(
    params: &DistortionParams,
    factor: f32,
    image_a: &RgbaImage,
    image_b: &RgbaImage,
    displacement: &RgbaImage,
    width: u32,
    height: u32,
) -> RgbaImage {
    let factor = factor.clamp(0.0, 1.0);
    let mut output = RgbaImage::new(width.max(1), height.max(1));
    for (x, y, pixel) in output.enumerate_pixels_mut() {
        let uv = [
            (x as f32 + 0.5) / width.max(1) as f32,
            (y as f32 + 0.5) / height.max(1) as f32,
        ];
        let rgba = composite_pixel(params, factor, uv, image_a, image_b, displacement);
        pixel.0 = [
            (rgba[0].clamp(0.0, 1.0) * 255.0).round() as u8,
            (rgba[1].clamp(0.0, 1.0) * 255.0).round() as u8,
            (rgba[2].clamp(0.0, 1.0) * 255.0).round() as u8,
            (rgba[3].clamp(0.0, 1.0) * 255.0).round() as u8,
        ];
    }
    output
}

#[cfg(test)]
mod tests {
    use std::f32::consts::TAU;

    use image::Rgba;

    use super::*;

    fn gradient_image(width: u32, height: u32, seed: u8) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            Rgba([
                (x * 17 + seed as u32).rem_euclid(256) as u8,
                (y * 29 + seed as u32 * 3).rem_euclid(256) as u8,
                (x + y + seed as u32 * 7).rem_euclid(256) as u8,
                255,
            ])
        })
    }

    fn zeroed_params() -> DistortionParams {
        DistortionParams {
            intensity_a: 0.0,
            intensity_b: 0.0,
            rotation_a: 0.0,
            rotation_b: 0.0,
            ..DistortionParams::default()
        }
    }

    #[test]
    fn factor_zero_reproduces_image_a_exactly() {
        let image_a = gradient_image(16, 16, 1);
        let image_b = gradient_image(16, 16, 2);
        let field = gradient_image(16, 16, 3);
        let params = DistortionParams::default();

        let out = composite(&params, 0.0, &image_a, &image_b, &field, 16, 16);
        assert_eq!(out, image_a);
    }

    #[test]
    fn factor_one_reproduces_image_b_exactly() {
        let image_a = gradient_image(16, 16, 1);
        let image_b = gradient_image(16, 16, 2);
        let field = gradient_image(16, 16, 3);
        let params = DistortionParams::default();

        let out = composite(&params, 1.0, &image_a, &image_b, &field, 16, 16);
        assert_eq!(out, image_b);
    }

    #[test]
    fn midpoint_with_zero_intensity_is_plain_crossfade() {
        let image_a = gradient_image(8, 8, 5);
        let image_b = gradient_image(8, 8, 9);
        let field = gradient_image(8, 8, 3);

        let out = composite(&zeroed_params(), 0.5, &image_a, &image_b, &field, 8, 8);
        for (x, y, pixel) in out.enumerate_pixels() {
            let a = image_a.get_pixel(x, y).0;
            let b = image_b.get_pixel(x, y).0;
            for channel in 0..4 {
                let expected = (a[channel] as f32 + b[channel] as f32) / 2.0;
                let got = pixel.0[channel] as f32;
                assert!(
                    (got - expected).abs() <= 1.0,
                    "channel {channel} at ({x},{y}): got {got}, expected {expected}"
                );
            }
        }
    }

    #[test]
    fn rotation_is_periodic_in_full_turns() {
        let v = [0.3, -0.8];
        for angle in [0.0, 0.4, 1.9, -2.5] {
            let base = rotate(angle, v);
            let turned = rotate(angle + TAU, v);
            assert!((base[0] - turned[0]).abs() < 1e-5);
            assert!((base[1] - turned[1]).abs() < 1e-5);
        }
    }

    #[test]
    fn rotation_convention_is_counter_clockwise() {
        // A quarter turn CCW maps +x onto +y.
        let rotated = rotate(std::f32::consts::FRAC_PI_2, [1.0, 0.0]);
        assert!(rotated[0].abs() < 1e-6);
        assert!((rotated[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sampling_clamps_to_edges() {
        let image = gradient_image(4, 4, 0);
        let inside = sample(&image, 0.125, 0.125);
        let outside = sample(&image, -5.0, -5.0);
        let corner = [
            image.get_pixel(0, 0).0[0] as f32 / 255.0,
            image.get_pixel(0, 0).0[1] as f32 / 255.0,
            image.get_pixel(0, 0).0[2] as f32 / 255.0,
            image.get_pixel(0, 0).0[3] as f32 / 255.0,
        ];
        assert_eq!(inside, corner);
        assert_eq!(outside, corner);
    }

    #[test]
    fn load_rejects_empty_images() {
        let source = TextureSource::Image(RgbaImage::new(0, 4));
        let err = load_rgba(TextureSlot::ImageA, &source).unwrap_err();
        assert!(matches!(
            err,
            TextureLoadError::Empty {
                slot: TextureSlot::ImageA
            }
        ));
    }

    #[test]
    fn load_reports_missing_files_with_slot_and_path() {
        let source = TextureSource::Path("/nonexistent/ripple.png".into());
        let err = load_rgba(TextureSlot::Displacement, &source).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("displacement"));
        assert!(message.contains("/nonexistent/ripple.png"));
    }

    #[test]
    fn load_passes_through_in_memory_images() {
        let image = RgbaImage::from_pixel(2, 2, Rgba([1, 2, 3, 4]));
        let source = TextureSource::Image(image.clone());
        let decoded = load_rgba(TextureSlot::ImageB, &source).unwrap();
        assert_eq!(decoded, image);
    }

    #[test]
    fn displacement_moves_departing_image_mid_transition() {
        let image_a = gradient_image(32, 32, 1);
        let image_b = gradient_image(32, 32, 2);
        // Uniform strong rightward displacement.
        let field = RgbaImage::from_pixel(32, 32, Rgba([255, 0, 0, 255]));
        let params = DistortionParams {
            rotation_a: 0.0,
            rotation_b: 0.0,
            ..DistortionParams::default()
        };

        let displaced = composite(&params, 0.5, &image_a, &image_b, &field, 32, 32);
        let flat = composite(&zeroed_params(), 0.5, &image_a, &image_b, &field, 32, 32);
        assert_ne!(displaced, flat);
    }
}
