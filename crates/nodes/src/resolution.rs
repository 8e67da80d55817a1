//! Aspect-ratio presets for the Flux 2M, Qwen-Image and SDXL resolution nodes.

use std::str::FromStr;

use pipeline::{Orientation, PipemindError, Resolution};
use serde::Serialize;

/// Label of the preset that defers to the manual dimensions.
pub const MANUAL_PRESET: &str = "Manual";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Preset {
    /// Widget label, e.g. `"16:9 (1664x928)"`.
    pub label: &'static str,
    pub resolution: Resolution,
}

const fn preset(label: &'static str, width: u32, height: u32) -> Preset {
    Preset {
        label,
        resolution: Resolution::new(width, height),
    }
}

const FLUX_2M: &[Preset] = &[
    preset("1:1 (1408x1408)", 1408, 1408),
    preset("3:2 (1728x1152)", 1728, 1152),
    preset("4:3 (1664x1216)", 1664, 1216),
    preset("16:9 (1920x1088)", 1920, 1088),
    preset("21:9 (2176x960)", 2176, 960),
];

const QWEN: &[Preset] = &[
    preset("1:1 (1328x1328)", 1328, 1328),
    preset("16:9 (1664x928)", 1664, 928),
    preset("4:3 (1472x1140)", 1472, 1140),
    preset("3:2 (1584x1056)", 1584, 1056),
];

const SDXL: &[Preset] = &[
    preset("1:1 (1024x1024)", 1024, 1024),
    preset("3:2 (1216x832)", 1216, 832),
    preset("4:3 (1152x896)", 1152, 896),
    preset("16:9 (1344x768)", 1344, 768),
    preset("2:1 (1280x640)", 1280, 640),
];

/// Model family a resolution node targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelFamily {
    Flux2M,
    Qwen,
    Sdxl,
}

impl ModelFamily {
    pub const ALL: [ModelFamily; 3] = [Self::Flux2M, Self::Qwen, Self::Sdxl];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Flux2M => "flux2m",
            Self::Qwen => "qwen",
            Self::Sdxl => "sdxl",
        }
    }

    pub fn presets(self) -> &'static [Preset] {
        match self {
            Self::Flux2M => FLUX_2M,
            Self::Qwen => QWEN,
            Self::Sdxl => SDXL,
        }
    }

    /// Used when a preset label is not recognised.
    pub fn fallback(self) -> Resolution {
        match self {
            Self::Flux2M => Resolution::new(512, 512),
            Self::Qwen => Resolution::new(1328, 1328),
            Self::Sdxl => Resolution::new(1024, 1024),
        }
    }

    /// Inclusive bounds for each manual dimension.
    pub fn manual_bounds(self) -> (u32, u32) {
        match self {
            Self::Flux2M | Self::Qwen => (64, 4096),
            Self::Sdxl => (64, 2048),
        }
    }

    /// Finds a preset by its full label or by its ratio alone (`"16:9"`).
    pub fn find_preset(self, label: &str) -> Option<&'static Preset> {
        let label = label.trim();
        self.presets().iter().find(|p| {
            p.label == label || p.label.split_once(' ').is_some_and(|(ratio, _)| ratio == label)
        })
    }
}

impl FromStr for ModelFamily {
    type Err = PipemindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flux2m" | "flux" => Ok(Self::Flux2M),
            "qwen" => Ok(Self::Qwen),
            "sdxl" => Ok(Self::Sdxl),
            other => Err(PipemindError::unknown("model family", other)),
        }
    }
}

/// Picks the output resolution.
///
/// `Manual` orientation or the `Manual` preset returns `manual`, which must lie
/// within [`ModelFamily::manual_bounds`]. Otherwise the preset is used as
/// listed, swapped for `Portrait`; an unknown label falls back to
/// [`ModelFamily::fallback`].
pub fn select_resolution(
    family: ModelFamily,
    orientation: Orientation,
    preset_label: &str,
    manual: Resolution,
) -> Result<Resolution, PipemindError> {
    if orientation == Orientation::Manual || preset_label.trim() == MANUAL_PRESET {
        let (min, max) = family.manual_bounds();
        for (field, value) in [("manual_width", manual.width), ("manual_height", manual.height)] {
            if !(min..=max).contains(&value) {
                return Err(PipemindError::InvalidInput {
                    field: field.to_string(),
                    message: format!("{value} is outside {min}..={max}"),
                });
            }
        }
        return Ok(manual);
    }
    let base = family
        .find_preset(preset_label)
        .map(|p| p.resolution)
        .unwrap_or_else(|| family.fallback());
    Ok(match orientation {
        Orientation::Portrait => base.swapped(),
        _ => base,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANY: Resolution = Resolution::new(512, 512);

    #[test]
    fn qwen_landscape_presets() {
        for (label, expected) in [
            ("1:1 (1328x1328)", Resolution::new(1328, 1328)),
            ("16:9 (1664x928)", Resolution::new(1664, 928)),
            ("4:3 (1472x1140)", Resolution::new(1472, 1140)),
            ("3:2 (1584x1056)", Resolution::new(1584, 1056)),
        ] {
            assert_eq!(
                select_resolution(ModelFamily::Qwen, Orientation::Landscape, label, ANY),
                Ok(expected)
            );
        }
    }

    #[test]
    fn portrait_swaps_dimensions() {
        assert_eq!(
            select_resolution(ModelFamily::Qwen, Orientation::Portrait, "16:9 (1664x928)", ANY),
            Ok(Resolution::new(928, 1664))
        );
        assert_eq!(
            select_resolution(ModelFamily::Sdxl, Orientation::Portrait, "2:1", ANY),
            Ok(Resolution::new(640, 1280))
        );
    }

    #[test]
    fn manual_overrides_presets() {
        let manual = Resolution::new(2048, 1024);
        assert_eq!(
            select_resolution(ModelFamily::Qwen, Orientation::Manual, "1:1 (1328x1328)", manual),
            Ok(manual)
        );
        let hd = Resolution::new(1920, 1080);
        assert_eq!(
            select_resolution(ModelFamily::Flux2M, Orientation::Landscape, "Manual", hd),
            Ok(hd)
        );
    }

    #[test]
    fn manual_dimensions_are_bounded() {
        let err = select_resolution(
            ModelFamily::Sdxl,
            Orientation::Manual,
            "Manual",
            Resolution::new(4096, 1024),
        )
        .unwrap_err();
        assert!(matches!(err, PipemindError::InvalidInput { ref field, .. } if field == "manual_width"));
    }

    #[test]
    fn unknown_preset_falls_back() {
        assert_eq!(
            select_resolution(ModelFamily::Flux2M, Orientation::Landscape, "5:4", ANY),
            Ok(Resolution::new(512, 512))
        );
        assert_eq!(
            select_resolution(ModelFamily::Sdxl, Orientation::Portrait, "bogus", ANY),
            Ok(Resolution::new(1024, 1024))
        );
    }

    #[test]
    fn families_parse() {
        assert_eq!("Flux".parse::<ModelFamily>(), Ok(ModelFamily::Flux2M));
        assert!("midjourney".parse::<ModelFamily>().is_err());
        for family in ModelFamily::ALL {
            assert_eq!(family.as_str().parse::<ModelFamily>(), Ok(family));
            assert!(!family.presets().is_empty());
        }
    }
}
