use crate::{TraversalDirection, Vec2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("commit count must be at least 1")]
    ZeroCommits,
    #[error("{field} must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must be at least 1")]
    ZeroWidth { field: &'static str },
}

/// Everything the engine accepts. Every field has a default so partial JSON
/// files load cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoryConfig {
    /// Revision the history walk starts from.
    pub start_ref: String,
    /// Number of commits to show.
    pub commits: usize,
    pub direction: TraversalDirection,
    pub invert_branches: bool,
    pub hide_merged_chains: bool,
    pub max_branches_per_commit: usize,
    pub max_tags_per_commit: usize,
    pub show_intro: bool,
    pub show_outro: bool,
    pub title: String,
    pub outro_top_text: String,
    pub outro_bottom_text: String,
    pub layout: LayoutConfig,
    pub edges: EdgeConfig,
    pub labels: LabelConfig,
    pub camera: CameraConfig,
}

impl Default for StoryConfig {
    fn default() -> Self {
        Self {
            start_ref: "HEAD".to_string(),
            commits: 8,
            direction: TraversalDirection::Forward,
            invert_branches: false,
            hide_merged_chains: false,
            max_branches_per_commit: 1,
            max_tags_per_commit: 1,
            show_intro: false,
            show_outro: false,
            title: "Git Story".to_string(),
            outro_top_text: "Thanks for watching!".to_string(),
            outro_bottom_text: "Made with git-story".to_string(),
            layout: LayoutConfig::default(),
            edges: EdgeConfig::default(),
            labels: LabelConfig::default(),
            camera: CameraConfig::default(),
        }
    }
}

impl StoryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.commits == 0 {
            return Err(ConfigError::ZeroCommits);
        }

        positive("layout.horizontal_spacing", self.layout.horizontal_spacing)?;
        positive("layout.vertical_spacing", self.layout.vertical_spacing)?;
        positive("layout.node_radius", self.layout.node_radius)?;
        positive("edges.thickness", self.edges.thickness)?;
        positive("labels.char_width", self.labels.char_width)?;
        positive("labels.text_height", self.labels.text_height)?;
        positive("labels.ref_height", self.labels.ref_height)?;
        positive("camera.frame_width", self.camera.frame_width)?;
        positive("camera.frame_height", self.camera.frame_height)?;
        positive("camera.collision_zoom", self.camera.collision_zoom)?;
        positive("camera.width_margin", self.camera.width_margin)?;
        positive("camera.height_margin", self.camera.height_margin)?;

        if self.labels.message_line_width == 0 {
            return Err(ConfigError::ZeroWidth {
                field: "labels.message_line_width",
            });
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub origin: Vec2,
    /// Center-to-center distance between a node and the one placed after it.
    pub horizontal_spacing: f32,
    /// Distance a colliding proposal is pushed down per probe.
    pub vertical_spacing: f32,
    pub node_radius: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            horizontal_spacing: 2.5,
            vertical_spacing: 4.5,
            node_radius: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeConfig {
    /// Total length trimmed from a horizontal arrow.
    pub horizontal_clearance: f32,
    /// Total length trimmed from any other arrow.
    pub diagonal_clearance: f32,
    /// Width of the probe rectangle laid along the arrow.
    pub thickness: f32,
    /// Arc angle of a curved edge, radians.
    pub curve_angle: f32,
    pub horizontal_lift: f32,
    pub mirrored_lift: f32,
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            horizontal_clearance: 1.5,
            diagonal_clearance: 3.0,
            thickness: 0.1,
            curve_angle: std::f32::consts::FRAC_PI_2,
            horizontal_lift: 1.25,
            mirrored_lift: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    pub short_id_len: usize,
    /// Approximate advance of one monospace glyph.
    pub char_width: f32,
    pub text_height: f32,
    pub ref_height: f32,
    pub ref_padding: f32,
    pub head_width: f32,
    pub label_gap: f32,
    /// Characters of the message kept before wrapping.
    pub message_chars: usize,
    pub message_line_width: usize,
    pub message_max_chars: usize,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            short_id_len: 6,
            char_width: 0.2,
            text_height: 0.3,
            ref_height: 0.4,
            ref_padding: 0.25,
            head_width: 1.0,
            label_gap: 0.25,
            message_chars: 40,
            message_line_width: 20,
            message_max_chars: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub frame_width: f32,
    pub frame_height: f32,
    /// Scale applied to the frame on the first layout collision.
    pub collision_zoom: f32,
    pub width_margin: f32,
    pub height_margin: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frame_width: 14.222,
            frame_height: 8.0,
            collision_zoom: 1.5,
            width_margin: 1.1,
            height_margin: 1.25,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(StoryConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: StoryConfig =
            serde_json::from_str(r#"{"commits": 3, "layout": {"vertical_spacing": 6.0}}"#)
                .unwrap();
        assert_eq!(config.commits, 3);
        assert_eq!(config.layout.vertical_spacing, 6.0);
        assert_eq!(config.layout.horizontal_spacing, 2.5);
        assert_eq!(config.start_ref, "HEAD");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = StoryConfig {
            commits: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCommits));

        config.commits = 4;
        config.layout.horizontal_spacing = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                field: "layout.horizontal_spacing",
                ..
            })
        ));
    }
}
