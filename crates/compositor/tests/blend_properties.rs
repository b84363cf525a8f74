//! End-to-end behaviour of the blend timeline driving the software
//! compositing path, without a GPU in the loop.

use std::time::{Duration, Instant};

use compositor::software;
use compositor::timeline::BlendState;
use compositor::types::DistortionParams;
use compositor::EasingCurve;
use image::{Rgba, RgbaImage};

fn checkerboard(width: u32, height: u32, on: [u8; 4], off: [u8; 4]) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba(on)
        } else {
            Rgba(off)
        }
    })
}

#[test]
fn engage_runs_to_completion_and_shows_texture_b() {
    let params = DistortionParams {
        intensity_a: 0.4,
        intensity_b: 0.4,
        rotation_a: 0.0,
        rotation_b: 0.0,
        ..DistortionParams::default()
    };

    let start = Instant::now();
    let mut blend = BlendState::new();
    blend.animate_to(1.0, start, params.duration, params.curve);

    // Sampling right after the full 1.4s duration must land on 1 exactly,
    // easing tail included.
    let factor = blend.factor(start + params.duration);
    assert!((factor - 1.0).abs() < 1e-4);

    let image_a = checkerboard(12, 12, [200, 40, 40, 255], [10, 10, 10, 255]);
    let image_b = checkerboard(12, 12, [40, 200, 40, 255], [250, 250, 250, 255]);
    let field = checkerboard(12, 12, [128, 128, 0, 255], [0, 64, 0, 255]);

    let frame = software::composite(&params, factor, &image_a, &image_b, &field, 12, 12);
    assert_eq!(frame, image_b);
}

#[test]
fn engage_then_release_walks_back_without_a_snap() {
    let params = DistortionParams::default();
    let start = Instant::now();
    let mut blend = BlendState::new();

    blend.animate_to(1.0, start, params.duration, params.curve);
    let interrupt_at = start + Duration::from_millis(700);
    let mid_factor = blend.factor(interrupt_at);
    assert!(mid_factor > 0.0 && mid_factor < 1.0);

    blend.animate_to(0.0, interrupt_at, params.duration, params.curve);
    let resumed = blend.factor(interrupt_at);
    assert!((resumed - mid_factor).abs() < 1e-4);

    let settled = blend.factor(interrupt_at + params.duration);
    assert!(settled.abs() < 1e-4);
}

#[test]
fn rapid_hover_flapping_never_leaves_unit_interval() {
    let params = DistortionParams::default();
    let start = Instant::now();
    let mut blend = BlendState::new();

    let mut now = start;
    for step in 0..20 {
        let target = if step % 2 == 0 { 1.0 } else { 0.0 };
        blend.animate_to(target, now, params.duration, params.curve);
        now += Duration::from_millis(90);
        let factor = blend.factor(now);
        assert!((0.0..=1.0).contains(&factor));
    }
}

#[test]
fn linear_curve_midpoint_renders_even_blend() {
    let params = DistortionParams {
        intensity_a: 0.0,
        intensity_b: 0.0,
        rotation_a: 0.0,
        rotation_b: 0.0,
        curve: EasingCurve::Linear,
        ..DistortionParams::default()
    };

    let start = Instant::now();
    let mut blend = BlendState::new();
    blend.animate_to(1.0, start, Duration::from_millis(1000), params.curve);
    let factor = blend.factor(start + Duration::from_millis(500));
    assert!((factor - 0.5).abs() < 1e-3);

    let image_a = RgbaImage::from_pixel(6, 6, Rgba([0, 0, 0, 255]));
    let image_b = RgbaImage::from_pixel(6, 6, Rgba([200, 100, 50, 255]));
    let field = RgbaImage::from_pixel(6, 6, Rgba([255, 255, 0, 255]));

    let frame = software::composite(&params, factor, &image_a, &image_b, &field, 6, 6);
    let pixel = frame.get_pixel(3, 3).0;
    assert!((pixel[0] as i32 - 100).abs() <= 1);
    assert!((pixel[1] as i32 - 50).abs() <= 1);
    assert!((pixel[2] as i32 - 25).abs() <= 1);
}
