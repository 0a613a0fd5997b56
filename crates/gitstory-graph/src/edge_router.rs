use gitstory_core::{EdgeConfig, Vec2};
use gitstory_events::{CubicBezier, EdgeGeometry};

/// A rectangle rotated to lie along a segment, used to probe whether a
/// straight arrow would cross a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedRect {
    pub center: Vec2,
    /// Unit vector along the rectangle's length.
    pub axis: Vec2,
    pub half_length: f32,
    pub half_thickness: f32,
}

impl OrientedRect {
    pub fn along(start: Vec2, end: Vec2, thickness: f32) -> Self {
        let delta = end - start;
        let length = delta.length();
        let axis = if length > f32::EPSILON {
            delta * (1.0 / length)
        } else {
            Vec2::new(1.0, 0.0)
        };
        Self {
            center: (start + end) * 0.5,
            axis,
            half_length: length * 0.5,
            half_thickness: thickness * 0.5,
        }
    }

    /// Exact rectangle/circle overlap: clamp the circle center into the
    /// rectangle's local frame and compare the remaining distance.
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        let local = center - self.center;
        let normal = Vec2::new(-self.axis.y, self.axis.x);
        let u = local.x * self.axis.x + local.y * self.axis.y;
        let v = local.x * normal.x + local.y * normal.y;
        let du = u - u.clamp(-self.half_length, self.half_length);
        let dv = v - v.clamp(-self.half_thickness, self.half_thickness);
        du * du + dv * dv <= radius * radius
    }
}

/// Chooses arrow geometry between two node centers.
#[derive(Debug, Clone)]
pub struct EdgeRouter {
    config: EdgeConfig,
    node_radius: f32,
}

impl EdgeRouter {
    pub fn new(config: EdgeConfig, node_radius: f32) -> Self {
        Self {
            config,
            node_radius,
        }
    }

    /// Route an arrow from `start` to `end`.
    ///
    /// The straight arrow is trimmed at both ends; if the trimmed segment
    /// touches any node in `obstacles` the arrow becomes a curve instead.
    pub fn route(
        &self,
        start: Vec2,
        end: Vec2,
        obstacles: impl IntoIterator<Item = Vec2>,
    ) -> EdgeGeometry {
        let (trimmed_start, trimmed_end) = self.trim(start, end);
        let probe = OrientedRect::along(trimmed_start, trimmed_end, self.config.thickness);

        let blocked = obstacles
            .into_iter()
            .any(|node| probe.intersects_circle(node, self.node_radius));

        if blocked {
            tracing::debug!("straight edge {:?} -> {:?} is blocked, curving", start, end);
            self.curve(start, end)
        } else {
            EdgeGeometry::Straight {
                start: trimmed_start,
                end: trimmed_end,
            }
        }
    }

    /// Shorten the segment symmetrically so it clears the node glyphs.
    pub fn trim(&self, start: Vec2, end: Vec2) -> (Vec2, Vec2) {
        let clearance = if start.y == end.y {
            self.config.horizontal_clearance
        } else {
            self.config.diagonal_clearance
        };

        let delta = end - start;
        let distance = delta.length();
        if distance <= clearance {
            let mid = (start + end) * 0.5;
            return (mid, mid);
        }
        let inset = delta * (clearance * 0.5 / distance);
        (start + inset, end - inset)
    }

    /// Circular-arc approximation bulging to the right of travel. Horizontal
    /// arcs are lifted above the row; left-to-right ones are also mirrored so
    /// they bulge upward too.
    fn curve(&self, start: Vec2, end: Vec2) -> EdgeGeometry {
        let chord = end - start;
        let length = chord.length();
        let normal = if length > f32::EPSILON {
            Vec2::new(-chord.y, chord.x) * (1.0 / length)
        } else {
            Vec2::new(0.0, -1.0)
        };

        let mut side = 1.0;
        let mut lift = 0.0;
        if start.y == end.y {
            lift += self.config.horizontal_lift;
            if start.x < end.x {
                side = -1.0;
                lift += self.config.mirrored_lift;
            }
        }

        let offset = Vec2::new(0.0, -lift);
        let sagitta = length * 0.5 * (self.config.curve_angle * 0.25).tan();
        // A cubic whose inner controls sit 4/3 of the sagitta out peaks at the sagitta.
        let bulge = normal * (side * sagitta * 4.0 / 3.0);
        let from = start + offset;
        let to = end + offset;

        EdgeGeometry::Curved {
            curve: CubicBezier {
                start: from,
                control1: from + chord * (1.0 / 3.0) + bulge,
                control2: from + chord * (2.0 / 3.0) + bulge,
                end: to,
            },
            arc_angle: side * self.config.curve_angle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn router() -> EdgeRouter {
        EdgeRouter::new(EdgeConfig::default(), 0.5)
    }

    #[test]
    fn test_unobstructed_edge_is_straight_and_trimmed() {
        let start = Vec2::new(2.5, 0.0);
        let end = Vec2::new(0.0, 0.0);
        let geometry = router().route(start, end, [start, end]);
        match geometry {
            EdgeGeometry::Straight { start, end } => {
                assert!((start.x - 1.75).abs() < 1e-5);
                assert!((end.x - 0.75).abs() < 1e-5);
            }
            other => panic!("expected straight edge, got {other:?}"),
        }
    }

    #[test]
    fn test_diagonal_uses_larger_clearance() {
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(3.0, 4.0);
        let (a, b) = router().trim(start, end);
        assert!((a.distance(b) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_blocked_horizontal_edge_curves_upward() {
        // Two nodes on a row with a third one between them.
        let start = Vec2::new(5.0, 0.0);
        let end = Vec2::new(0.0, 0.0);
        let between = Vec2::new(2.5, 0.0);
        let geometry = router().route(start, end, [start, between, end]);
        assert!(geometry.is_curved());
        let bounds = geometry.bounds();
        assert!(bounds.max.y < 0.0, "curve should float above the row: {bounds:?}");
    }

    #[test]
    fn test_left_to_right_curve_is_mirrored() {
        let r = router();
        let start = Vec2::new(0.0, 0.0);
        let end = Vec2::new(5.0, 0.0);
        let geometry = r.route(start, end, [Vec2::new(2.5, 0.0)]);
        let EdgeGeometry::Curved { curve, arc_angle } = geometry else {
            panic!("expected curve");
        };
        assert!(arc_angle < 0.0);
        let lift = EdgeConfig::default().horizontal_lift + EdgeConfig::default().mirrored_lift;
        assert!((curve.start.y + lift).abs() < 1e-5);
        // Mirrored: the middle of the arc is above its endpoints.
        assert!(curve.sample(0.5).y < curve.start.y);
    }

    #[test]
    fn test_right_to_left_curve_bulges_up_without_mirror() {
        let start = Vec2::new(5.0, 0.0);
        let end = Vec2::new(0.0, 0.0);
        let geometry = router().route(start, end, [Vec2::new(2.5, 0.0)]);
        let EdgeGeometry::Curved { curve, arc_angle } = geometry else {
            panic!("expected curve");
        };
        assert!(arc_angle > 0.0);
        assert!(curve.sample(0.5).y < curve.start.y);
    }

    #[test]
    fn test_default_arc_is_a_quarter_turn() {
        let config = EdgeConfig::default();
        assert!((config.curve_angle - std::f32::consts::FRAC_PI_2).abs() < 1e-6);

        let start = Vec2::new(5.0, 0.0);
        let end = Vec2::new(0.0, 0.0);
        let EdgeGeometry::Curved { curve, .. } = router().route(start, end, [Vec2::new(2.5, 0.0)])
        else {
            panic!("expected curve");
        };
        // Peak height of a 90 degree arc over a chord of 5.
        let sagitta = 2.5 * (std::f32::consts::FRAC_PI_8).tan();
        let peak = curve.sample(0.5);
        assert!((peak.y - (-config.horizontal_lift - sagitta)).abs() < 1e-4);
        assert!((peak.x - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_oriented_rect_misses_offset_circle() {
        let probe = OrientedRect::along(Vec2::new(0.0, 0.0), Vec2::new(4.0, 4.0), 0.1);
        assert!(probe.intersects_circle(Vec2::new(2.0, 2.0), 0.5));
        assert!(!probe.intersects_circle(Vec2::new(4.0, 0.0), 0.5));
        assert!(!probe.intersects_circle(Vec2::new(6.0, 6.0), 0.5));
    }

    proptest! {
        /// The endpoints of a straight edge never sit inside either node circle.
        #[test]
        fn prop_straight_edges_clear_their_nodes(
            columns in 1i32..6,
            rows in -4i32..5,
        ) {
            let r = router();
            let start = Vec2::new(0.0, 0.0);
            let end = Vec2::new(columns as f32 * 2.5, rows as f32 * 4.5);
            if let EdgeGeometry::Straight { start: a, end: b } = r.route(start, end, [start, end]) {
                prop_assert!(a.distance(start) > 0.5);
                prop_assert!(b.distance(end) > 0.5);
            }
        }
    }
}
