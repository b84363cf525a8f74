use std::path::PathBuf;

use clap::Parser;
use compositor::EasingCurve;

#[derive(Parser, Debug)]
#[command(
    name = "ripplewipe",
    author,
    version,
    about = "Pointer-driven displacement crossfade between two images"
)]
pub struct Cli {
    /// First image, fully visible while the pointer is outside the window.
    #[arg(value_name = "IMAGE_A", required_unless_present = "preset")]
    pub image_a: Option<PathBuf>,

    /// Second image, revealed while the pointer hovers the window.
    #[arg(value_name = "IMAGE_B", required_unless_present = "preset")]
    pub image_b: Option<PathBuf>,

    /// Displacement map whose red/green channels drive the distortion.
    #[arg(value_name = "DISPLACEMENT", required_unless_present = "preset")]
    pub displacement: Option<PathBuf>,

    /// Read image paths and tuning from a TOML preset; flags still override.
    #[arg(long, value_name = "PATH")]
    pub preset: Option<PathBuf>,

    /// Displacement scale for the departing image.
    #[arg(long, value_name = "SCALE")]
    pub intensity_a: Option<f32>,

    /// Displacement scale for the arriving image.
    #[arg(long, value_name = "SCALE")]
    pub intensity_b: Option<f32>,

    /// Rotation (radians) applied to the departing image's displacement.
    #[arg(long, value_name = "RADIANS")]
    pub angle_a: Option<f32>,

    /// Rotation (radians) applied to the arriving image's displacement.
    #[arg(long, value_name = "RADIANS")]
    pub angle_b: Option<f32>,

    /// Transition duration in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub duration: Option<f32>,

    /// Easing curve: `expo` (default), `smoothstep`, or `linear`.
    #[arg(long, value_name = "CURVE", value_parser = parse_curve)]
    pub curve: Option<EasingCurve>,

    /// Window size as `WIDTHxHEIGHT`.
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size, default_value = "960x720")]
    pub size: (u32, u32),

    /// Render a single frame to this PNG path instead of opening a window.
    #[arg(long, value_name = "PATH")]
    pub still: Option<PathBuf>,

    /// Blend factor for `--still` (0 = image A, 1 = image B).
    #[arg(long, value_name = "FACTOR", default_value_t = 1.0)]
    pub factor: f32,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{value}'"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{value}'"))?;
    if width == 0 || height == 0 {
        return Err(format!("size must be non-zero, got '{value}'"));
    }
    Ok((width, height))
}

pub fn parse_curve(value: &str) -> Result<EasingCurve, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "linear" => Ok(EasingCurve::Linear),
        "smoothstep" => Ok(EasingCurve::Smoothstep),
        "expo" | "expo-in-out" | "exponential" => Ok(EasingCurve::ExpoInOut),
        other => Err(format!(
            "unknown curve '{other}' (expected linear, smoothstep, or expo)"
        )),
    }
}
