//! TOML presets for the demo host.
//!
//! A preset names the three textures and optionally the tuning parameters,
//! e.g.:
//!
//! ```toml
//! image_a = "assets/car1.jpg"
//! image_b = "assets/car2.jpg"
//! displacement = "assets/road.jpg"
//! intensity_a = 0.4
//! angle_a = 0.0
//! duration_seconds = 1.4
//! curve = "expo"
//! ```

use std::path::{Path, PathBuf};

use compositor::EasingCurve;
use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("failed to read preset at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse preset: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Preset {
    pub image_a: PathBuf,
    pub image_b: PathBuf,
    pub displacement: PathBuf,
    #[serde(default)]
    pub intensity_a: Option<f32>,
    #[serde(default)]
    pub intensity_b: Option<f32>,
    #[serde(default)]
    pub angle_a: Option<f32>,
    #[serde(default)]
    pub angle_b: Option<f32>,
    #[serde(default)]
    pub duration_seconds: Option<f32>,
    #[serde(default)]
    pub curve: Option<CurveSetting>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveSetting {
    Linear,
    Smoothstep,
    Expo,
}

impl From<CurveSetting> for EasingCurve {
    fn from(setting: CurveSetting) -> Self {
        match setting {
            CurveSetting::Linear => EasingCurve::Linear,
            CurveSetting::Smoothstep => EasingCurve::Smoothstep,
            CurveSetting::Expo => EasingCurve::ExpoInOut,
        }
    }
}

impl Preset {
    pub fn load(path: &Path) -> Result<Self, PresetError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&raw)?)
    }

    pub fn parse(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn parses_minimal_preset() {
        let preset = Preset::parse(
            r#"
            image_a = "a.png"
            image_b = "b.png"
            displacement = "field.png"
            "#,
        )
        .unwrap();
        assert_eq!(preset.image_a, PathBuf::from("a.png"));
        assert!(preset.intensity_a.is_none());
        assert!(preset.curve.is_none());
    }

    #[test]
    fn parses_full_preset() {
        let preset = Preset::parse(
            r#"
            image_a = "a.png"
            image_b = "b.png"
            displacement = "field.png"
            intensity_a = 0.6
            intensity_b = 0.2
            angle_a = 0.0
            angle_b = 1.5
            duration_seconds = 2.0
            curve = "smoothstep"
            "#,
        )
        .unwrap();
        assert_eq!(preset.intensity_a, Some(0.6));
        assert_eq!(preset.duration_seconds, Some(2.0));
        assert_eq!(preset.curve, Some(CurveSetting::Smoothstep));
        assert_eq!(
            EasingCurve::from(preset.curve.unwrap()),
            EasingCurve::Smoothstep
        );
    }

    #[test]
    fn rejects_preset_missing_textures() {
        let result = Preset::parse("intensity_a = 0.4");
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "image_a = \"a.png\"\nimage_b = \"b.png\"\ndisplacement = \"field.png\""
        )
        .unwrap();
        let preset = Preset::load(file.path()).unwrap();
        assert_eq!(preset.image_b, PathBuf::from("b.png"));
    }

    #[test]
    fn load_reports_missing_file_path() {
        let err = Preset::load(Path::new("/nonexistent/preset.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/preset.toml"));
    }
}
