use crate::camera::CameraPlanner;
use gitstory_core::{Rect, StoryConfig, Vec2};
use gitstory_events::{ElementId, Event, EventLog, LabelStyle};

/// Title text is drawn this much larger than caption text.
const TITLE_SCALE: f32 = 1.8;
/// Distance between a title and the frame edge it hugs.
const EDGE_BUFFER: f32 = 1.0;

enum Edge {
    Top,
    Bottom,
}

fn title_bounds(config: &StoryConfig, text: &str, edge: Edge) -> Rect {
    let labels = &config.labels;
    let size = Vec2::new(
        text.chars().count() as f32 * labels.char_width * TITLE_SCALE,
        labels.text_height * TITLE_SCALE,
    );
    let center = config.layout.origin;
    let half_frame = config.camera.frame_height * 0.5;
    let y = match edge {
        Edge::Top => center.y - half_frame + EDGE_BUFFER + size.y * 0.5,
        Edge::Bottom => center.y + half_frame - EDGE_BUFFER - size.y * 0.5,
    };
    Rect::from_center_size(Vec2::new(center.x, y), size)
}

fn title(config: &StoryConfig, text: &str, edge: Edge, log: &mut EventLog) -> ElementId {
    let element = log.allocate();
    log.push(Event::LabelDraw {
        element,
        commit: None,
        text: text.to_string(),
        bounds: title_bounds(config, text, edge),
        style: LabelStyle::Title,
    });
    element
}

/// Title card shown, then faded, before the first commit.
pub fn intro(config: &StoryConfig, log: &mut EventLog) {
    if !config.show_intro {
        return;
    }
    let element = title(config, &config.title, Edge::Top, log);
    log.push(Event::FadeGroup {
        elements: vec![element],
    });
}

/// Closing texts, shown after the camera returns to its starting frame.
pub fn outro(config: &StoryConfig, camera: &mut CameraPlanner, log: &mut EventLog) {
    if !config.show_outro {
        return;
    }
    camera.restore(log);
    title(config, &config.outro_top_text, Edge::Top, log);
    title(config, &config.outro_bottom_text, Edge::Bottom, log);
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitstory_core::CameraConfig;
    use gitstory_events::CameraMove;

    #[test]
    fn test_disabled_bookends_emit_nothing() {
        let config = StoryConfig::default();
        let mut camera = CameraPlanner::new(CameraConfig::default());
        let mut log = EventLog::new();
        intro(&config, &mut log);
        outro(&config, &mut camera, &mut log);
        assert!(log.is_empty());
    }

    #[test]
    fn test_intro_fades_its_title() {
        let config = StoryConfig {
            show_intro: true,
            ..Default::default()
        };
        let mut log = EventLog::new();
        intro(&config, &mut log);
        let events = log.events();
        assert_eq!(events.len(), 2);
        let title = events[0].element().unwrap();
        assert_eq!(
            events[1],
            Event::FadeGroup {
                elements: vec![title]
            }
        );
    }

    #[test]
    fn test_outro_restores_camera_then_shows_texts() {
        let config = StoryConfig {
            show_outro: true,
            ..Default::default()
        };
        let mut camera = CameraPlanner::new(CameraConfig::default());
        let mut log = EventLog::new();
        outro(&config, &mut camera, &mut log);

        let events = log.events();
        assert_eq!(events[0], Event::CameraMove(CameraMove::Restore));
        let texts: Vec<&str> = events[1..]
            .iter()
            .filter_map(|e| match e {
                Event::LabelDraw { text, bounds, .. } => {
                    assert!(bounds.min.y > -4.0 && bounds.max.y < 4.0);
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["Thanks for watching!", "Made with git-story"]);
    }
}
