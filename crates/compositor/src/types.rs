use std::f32::consts::TAU;
use std::path::PathBuf;
use std::time::Duration;

use crate::timeline::EasingCurve;

/// Displacement scale applied to both textures when the caller does not tune it.
pub const DEFAULT_INTENSITY: f32 = 0.4;

/// Rotation (radians) applied to the displacement vector by default.
pub const DEFAULT_ROTATION: f32 = 0.4;

/// Duration of an engage/release transition.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(1400);

/// Widest displacement scale we accept before clamping; purely a sanity bound
/// for a visual tuning value.
const MAX_INTENSITY: f32 = 4.0;

/// Rotations are clamped to a few full turns; sin/cos make larger angles
/// redundant anyway.
const MAX_ROTATION: f32 = 4.0 * TAU;

/// Identifies which of the three texture inputs a resource or error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    ImageA,
    ImageB,
    Displacement,
}

impl std::fmt::Display for TextureSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextureSlot::ImageA => f.write_str("image-a"),
            TextureSlot::ImageB => f.write_str("image-b"),
            TextureSlot::Displacement => f.write_str("displacement"),
        }
    }
}

/// Where a texture comes from. The compositor does not cache or re-fetch;
/// decoding happens once at construction time.
#[derive(Debug, Clone)]
pub enum TextureSource {
    /// Decode the image from disk with the `image` crate.
    Path(PathBuf),
    /// Use an already-decoded RGBA image supplied by the caller.
    Image(image::RgbaImage),
}

impl From<PathBuf> for TextureSource {
    fn from(path: PathBuf) -> Self {
        TextureSource::Path(path)
    }
}

impl From<image::RgbaImage> for TextureSource {
    fn from(image: image::RgbaImage) -> Self {
        TextureSource::Image(image)
    }
}

/// The three textures a compositor instance blends: the two photos and the
/// displacement field whose red/green channels encode per-pixel offsets.
#[derive(Debug, Clone)]
pub struct TextureSet {
    pub image_a: TextureSource,
    pub image_b: TextureSource,
    pub displacement: TextureSource,
}

/// Failure to turn a [`TextureSource`] into a usable texture.
///
/// Load failures surface to the caller unchanged; the compositor neither
/// retries nor substitutes a placeholder.
#[derive(Debug, thiserror::Error)]
pub enum TextureLoadError {
    #[error("failed to decode {slot} texture at {path}: {source}")]
    Decode {
        slot: TextureSlot,
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{slot} texture has zero width or height")]
    Empty { slot: TextureSlot },
}

/// Visual tuning for a compositor instance, immutable after construction.
///
/// Out-of-range or non-finite values are clamped rather than rejected; these
/// only steer the look of the effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionParams {
    /// Displacement scale for texture A (the departing image).
    pub intensity_a: f32,
    /// Displacement scale for texture B (the arriving image).
    pub intensity_b: f32,
    /// Rotation in radians applied to A's displacement vector.
    pub rotation_a: f32,
    /// Rotation in radians applied to B's displacement vector.
    pub rotation_b: f32,
    /// How long an engage/release transition takes.
    pub duration: Duration,
    /// Time remapping applied to the blend factor.
    pub curve: EasingCurve,
}

impl Default for DistortionParams {
    fn default() -> Self {
        Self {
            intensity_a: DEFAULT_INTENSITY,
            intensity_b: DEFAULT_INTENSITY,
            rotation_a: DEFAULT_ROTATION,
            rotation_b: DEFAULT_ROTATION,
            duration: DEFAULT_DURATION,
            curve: EasingCurve::default(),
        }
    }
}

impl DistortionParams {
    /// Returns a copy with every numeric field forced into its sane range,
    /// logging a warning for anything that had to change.
    pub fn sanitized(mut self) -> Self {
        self.intensity_a = clamp_field("intensity_a", self.intensity_a, 0.0, MAX_INTENSITY, DEFAULT_INTENSITY);
        self.intensity_b = clamp_field("intensity_b", self.intensity_b, 0.0, MAX_INTENSITY, DEFAULT_INTENSITY);
        self.rotation_a = clamp_field("rotation_a", self.rotation_a, -MAX_ROTATION, MAX_ROTATION, DEFAULT_ROTATION);
        self.rotation_b = clamp_field("rotation_b", self.rotation_b, -MAX_ROTATION, MAX_ROTATION, DEFAULT_ROTATION);
        if self.duration.is_zero() {
            tracing::warn!("transition duration of zero requested; using default");
            self.duration = DEFAULT_DURATION;
        }
        self
    }
}

fn clamp_field(name: &str, value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        tracing::warn!(field = name, value, fallback, "non-finite parameter replaced");
        return fallback;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        tracing::warn!(field = name, value, clamped, "parameter outside sane range; clamped");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_tuning() {
        let params = DistortionParams::default();
        assert_eq!(params.intensity_a, 0.4);
        assert_eq!(params.intensity_b, 0.4);
        assert_eq!(params.rotation_a, 0.4);
        assert_eq!(params.rotation_b, 0.4);
        assert_eq!(params.duration, Duration::from_millis(1400));
    }

    #[test]
    fn sanitize_clamps_out_of_range_intensity() {
        let params = DistortionParams {
            intensity_a: 100.0,
            intensity_b: -3.0,
            ..DistortionParams::default()
        }
        .sanitized();
        assert_eq!(params.intensity_a, MAX_INTENSITY);
        assert_eq!(params.intensity_b, 0.0);
    }

    #[test]
    fn sanitize_replaces_non_finite_values() {
        let params = DistortionParams {
            rotation_a: f32::NAN,
            intensity_a: f32::INFINITY,
            ..DistortionParams::default()
        }
        .sanitized();
        assert_eq!(params.rotation_a, DEFAULT_ROTATION);
        assert_eq!(params.intensity_a, DEFAULT_INTENSITY);
    }

    #[test]
    fn sanitize_keeps_values_already_in_range() {
        let params = DistortionParams {
            intensity_a: 0.7,
            rotation_b: -1.2,
            ..DistortionParams::default()
        };
        assert_eq!(params.sanitized(), params);
    }

    #[test]
    fn zero_duration_falls_back_to_default() {
        let params = DistortionParams {
            duration: Duration::ZERO,
            ..DistortionParams::default()
        }
        .sanitized();
        assert_eq!(params.duration, DEFAULT_DURATION);
    }
}
