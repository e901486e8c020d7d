//! Road styling by class.

use crate::fetch::RoadClass;
use crate::theme::{Color, Theme};

/// Stroke color and width for one road class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadStyle {
    pub color: Color,
    /// Line width in points.
    pub width_pt: f32,
}

/// Line width in points for a road class.
pub fn road_width_pt(class: RoadClass) -> f32 {
    match class {
        RoadClass::Motorway => 1.2,
        RoadClass::Primary => 1.0,
        RoadClass::Secondary => 0.8,
        RoadClass::Tertiary => 0.6,
        RoadClass::Residential => 0.4,
        RoadClass::Other => 0.6,
    }
}

pub fn road_style(theme: &Theme, class: RoadClass) -> RoadStyle {
    RoadStyle {
        color: theme.road_color(class),
        width_pt: road_width_pt(class),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn theme() -> Theme {
        Theme {
            name: "t".into(),
            description: String::new(),
            bg: Color::rgb(0, 0, 0),
            text: Color::rgb(1, 1, 1),
            gradient_color: Color::rgb(2, 2, 2),
            water: Color::rgb(3, 3, 3),
            parks: Color::rgb(4, 4, 4),
            road_motorway: Color::rgb(10, 0, 0),
            road_primary: Color::rgb(20, 0, 0),
            road_secondary: Color::rgb(30, 0, 0),
            road_tertiary: Color::rgb(40, 0, 0),
            road_residential: Color::rgb(50, 0, 0),
            road_default: Color::rgb(60, 0, 0),
        }
    }

    #[test]
    fn test_widths_by_class() {
        assert_eq!(road_width_pt(RoadClass::Motorway), 1.2);
        assert_eq!(road_width_pt(RoadClass::Primary), 1.0);
        assert_eq!(road_width_pt(RoadClass::Secondary), 0.8);
        assert_eq!(road_width_pt(RoadClass::Tertiary), 0.6);
        assert_eq!(road_width_pt(RoadClass::Residential), 0.4);
        assert_eq!(road_width_pt(RoadClass::Other), 0.6);
    }

    #[test]
    fn test_every_class_has_a_style() {
        let theme = theme();
        for class in RoadClass::ALL {
            let style = road_style(&theme, class);
            assert!(style.width_pt > 0.0);
        }
        assert_eq!(road_style(&theme, RoadClass::Other).color, theme.road_default);
        assert_eq!(road_style(&theme, RoadClass::Motorway).color, theme.road_motorway);
    }

    #[test]
    fn test_unknown_tag_resolves_to_default_style() {
        let theme = theme();
        let class = RoadClass::from_tag(Some("bridleway"));
        assert_eq!(road_style(&theme, class).color, theme.road_default);
    }
}
