//! Theme record and its JSON file form.

use serde::Deserialize;

use super::color::Color;
use super::ThemeError;
use crate::fetch::RoadClass;

/// Fully resolved poster style.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: String,
    pub description: String,
    pub bg: Color,
    pub text: Color,
    pub gradient_color: Color,
    pub water: Color,
    pub parks: Color,
    pub road_motorway: Color,
    pub road_primary: Color,
    pub road_secondary: Color,
    pub road_tertiary: Color,
    pub road_residential: Color,
    pub road_default: Color,
}

impl Theme {
    /// Road color for a class. Never fails; [`RoadClass::Other`] uses the
    /// default road color.
    pub fn road_color(&self, class: RoadClass) -> Color {
        match class {
            RoadClass::Motorway => self.road_motorway,
            RoadClass::Primary => self.road_primary,
            RoadClass::Secondary => self.road_secondary,
            RoadClass::Tertiary => self.road_tertiary,
            RoadClass::Residential => self.road_residential,
            RoadClass::Other => self.road_default,
        }
    }
}

/// Theme file as written on disk. Every field is optional here so that
/// validation can report exactly which one is missing.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ThemeFile {
    pub name: Option<String>,
    pub description: Option<String>,
    pub bg: Option<String>,
    pub text: Option<String>,
    pub gradient_color: Option<String>,
    pub water: Option<String>,
    pub parks: Option<String>,
    pub road_motorway: Option<String>,
    pub road_primary: Option<String>,
    pub road_secondary: Option<String>,
    pub road_tertiary: Option<String>,
    pub road_residential: Option<String>,
    pub road_default: Option<String>,
}

impl ThemeFile {
    /// Validates and resolves into a [`Theme`].
    ///
    /// `identifier` names the theme in errors and stands in for a missing
    /// `name`.
    pub fn resolve(self, identifier: &str) -> Result<Theme, ThemeError> {
        let invalid = |reason: String| ThemeError::Validation {
            theme: identifier.to_string(),
            reason,
        };
        let color = |field: &str, value: Option<&String>| -> Result<Option<Color>, ThemeError> {
            value
                .map(|v| v.parse::<Color>().map_err(|e| invalid(format!("{field}: {e}"))))
                .transpose()
        };
        let required = |field: &str, value: Option<&String>| -> Result<Color, ThemeError> {
            color(field, value)?.ok_or_else(|| invalid(format!("missing required field '{field}'")))
        };

        let bg = required("bg", self.bg.as_ref())?;
        let text = required("text", self.text.as_ref())?;
        let gradient_color = required("gradient_color", self.gradient_color.as_ref())?;
        let water = required("water", self.water.as_ref())?;
        let parks = required("parks", self.parks.as_ref())?;
        let road_default = color("road_default", self.road_default.as_ref())?;

        // Road class colors may only be omitted when a default exists
        let road = |field: &str, value: Option<&String>| -> Result<Color, ThemeError> {
            match (color(field, value)?, road_default) {
                (Some(c), _) => Ok(c),
                (None, Some(default)) => Ok(default),
                (None, None) => Err(invalid(format!(
                    "missing '{field}' and no 'road_default' to fall back on"
                ))),
            }
        };
        let road_motorway = road("road_motorway", self.road_motorway.as_ref())?;
        let road_primary = road("road_primary", self.road_primary.as_ref())?;
        let road_secondary = road("road_secondary", self.road_secondary.as_ref())?;
        let road_tertiary = road("road_tertiary", self.road_tertiary.as_ref())?;
        let road_residential = road("road_residential", self.road_residential.as_ref())?;
        let road_default = road_default.ok_or_else(|| invalid("missing required field 'road_default'".into()))?;

        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| identifier.to_string());

        Ok(Theme {
            name,
            description: self.description.unwrap_or_default(),
            bg,
            text,
            gradient_color,
            water,
            parks,
            road_motorway,
            road_primary,
            road_secondary,
            road_tertiary,
            road_residential,
            road_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ThemeFile {
        serde_json::from_str(json).unwrap()
    }

    const NOIR: &str = r##"{
        "name": "Noir",
        "description": "Pure black background with white roads",
        "bg": "#000000",
        "text": "#FFFFFF",
        "gradient_color": "#000000",
        "water": "#0A0A0A",
        "parks": "#111111",
        "road_motorway": "#FFFFFF",
        "road_primary": "#E0E0E0",
        "road_secondary": "#B0B0B0",
        "road_tertiary": "#909090",
        "road_residential": "#707070",
        "road_default": "#909090"
    }"##;

    #[test]
    fn test_resolve_complete_theme() {
        let theme = parse(NOIR).resolve("noir").unwrap();
        assert_eq!(theme.name, "Noir");
        assert_eq!(theme.bg, Color::BLACK);
        assert_eq!(theme.road_color(RoadClass::Motorway), Color::WHITE);
        assert_eq!(theme.road_color(RoadClass::Other), theme.road_default);
    }

    #[test]
    fn test_road_colors_fall_back_to_default() {
        let theme = parse(
            r##"{"bg":"#FFFFFF","text":"#000000","gradient_color":"#FFFFFF",
                "water":"#C0C0C0","parks":"#F0F0F0","road_default":"#333333",
                "road_motorway":"#000000"}"##,
        )
        .resolve("partial")
        .unwrap();

        assert_eq!(theme.name, "partial");
        assert_eq!(theme.description, "");
        assert_eq!(theme.road_motorway, Color::BLACK);
        assert_eq!(theme.road_primary, Color::rgb(0x33, 0x33, 0x33));
        assert_eq!(theme.road_residential, Color::rgb(0x33, 0x33, 0x33));
    }

    #[test]
    fn test_missing_road_color_without_default() {
        let err = parse(
            r##"{"bg":"#FFFFFF","text":"#000000","gradient_color":"#FFFFFF",
                "water":"#C0C0C0","parks":"#F0F0F0"}"##,
        )
        .resolve("bare")
        .unwrap_err();
        assert!(err.to_string().contains("road_motorway"), "{err}");
    }

    #[test]
    fn test_missing_required_field() {
        let err = parse(r##"{"text":"#000000"}"##).resolve("x").unwrap_err();
        assert!(matches!(err, ThemeError::Validation { .. }));
        assert!(err.to_string().contains("'bg'"));
    }

    #[test]
    fn test_malformed_color() {
        let json = NOIR.replace("\"#0A0A0A\"", "\"blue\"");
        let err = parse(&json).resolve("noir").unwrap_err();
        assert!(err.to_string().contains("water"), "{err}");
    }

    #[test]
    fn test_unknown_field_rejected_by_parser() {
        let result: Result<ThemeFile, _> = serde_json::from_str(r##"{"background":"#000000"}"##);
        assert!(result.is_err());
    }
}
