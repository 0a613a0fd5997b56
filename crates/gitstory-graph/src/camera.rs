use gitstory_core::{CameraConfig, Rect, Vec2};
use gitstory_events::{CameraMove, EventLog};

/// Tracks the camera frame and the extent of everything drawn, and emits the
/// camera moves that keep the story in view.
#[derive(Debug, Clone)]
pub struct CameraPlanner {
    config: CameraConfig,
    frame: Vec2,
    zoom_outs: usize,
    bounds: Option<Rect>,
}

impl CameraPlanner {
    pub fn new(config: CameraConfig) -> Self {
        let frame = Vec2::new(config.frame_width, config.frame_height);
        Self {
            config,
            frame,
            zoom_outs: 0,
            bounds: None,
        }
    }

    /// Current frame size.
    pub fn frame(&self) -> Vec2 {
        self.frame
    }

    /// Layout collisions seen so far in the run.
    pub fn zoom_outs(&self) -> usize {
        self.zoom_outs
    }

    fn aspect(&self) -> f32 {
        self.config.frame_width / self.config.frame_height
    }

    pub fn save(&self, log: &mut EventLog) {
        log.camera(CameraMove::Save);
    }

    pub fn focus(&self, target: Vec2, log: &mut EventLog) {
        log.camera(CameraMove::Pan { to: target });
    }

    /// Widen the frame once, on the first collision of the run; later
    /// collisions only count.
    pub fn record_collisions(&mut self, collisions: usize, log: &mut EventLog) {
        for _ in 0..collisions {
            if self.zoom_outs == 0 {
                let factor = self.config.collision_zoom;
                self.frame = self.frame * factor;
                log.camera(CameraMove::Scale { factor });
            }
            self.zoom_outs += 1;
        }
    }

    /// Grow the tracked extent to cover `rect`.
    pub fn include(&mut self, rect: Rect) {
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.union(&rect),
            None => rect,
        });
    }

    /// Center on everything drawn, fit the width, then fit the height only if
    /// the content still does not fit vertically.
    pub fn frame_to_fit(&mut self, log: &mut EventLog) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let aspect = self.aspect();

        log.camera(CameraMove::Pan {
            to: bounds.center(),
        });

        let width = bounds.width() * self.config.width_margin;
        self.frame = Vec2::new(width, width / aspect);
        log.camera(CameraMove::ZoomWidth { width });

        if bounds.height() >= self.frame.y {
            let height = bounds.height() * self.config.height_margin;
            self.frame = Vec2::new(height * aspect, height);
            log.camera(CameraMove::ZoomHeight { height });
        }
    }

    /// Return to the frame saved before the story started.
    pub fn restore(&mut self, log: &mut EventLog) {
        self.frame = Vec2::new(self.config.frame_width, self.config.frame_height);
        log.camera(CameraMove::Restore);
    }
}
