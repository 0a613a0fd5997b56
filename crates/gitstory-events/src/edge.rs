use gitstory_core::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// A cubic bezier curve segment defined by four control points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CubicBezier {
    pub start: Vec2,
    pub control1: Vec2,
    pub control2: Vec2,
    pub end: Vec2,
}

impl CubicBezier {
    /// Sample the curve at parameter t [0, 1]
    pub fn sample(&self, t: f32) -> Vec2 {
        let t2 = t * t;
        let t3 = t2 * t;
        let mt = 1.0 - t;
        let mt2 = mt * mt;
        let mt3 = mt2 * mt;

        let x = self.start.x * mt3
            + 3.0 * self.control1.x * mt2 * t
            + 3.0 * self.control2.x * mt * t2
            + self.end.x * t3;
        let y = self.start.y * mt3
            + 3.0 * self.control1.y * mt2 * t
            + 3.0 * self.control2.y * mt * t2
            + self.end.y * t3;

        Vec2::new(x, y)
    }

    /// Bounding box of `samples + 1` evenly spaced points on the curve.
    pub fn sampled_bounds(&self, samples: usize) -> Rect {
        let samples = samples.max(2);
        let mut bounds = Rect::spanning(self.start, self.end);
        for i in 1..samples {
            let p = self.sample(i as f32 / samples as f32);
            bounds = bounds.union(&Rect::spanning(p, p));
        }
        bounds
    }
}

/// Shape of one drawn arrow. Always points from child to parent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeGeometry {
    Straight { start: Vec2, end: Vec2 },
    Curved { curve: CubicBezier, arc_angle: f32 },
}

impl EdgeGeometry {
    pub fn is_curved(&self) -> bool {
        matches!(self, EdgeGeometry::Curved { .. })
    }

    pub fn bounds(&self) -> Rect {
        match self {
            EdgeGeometry::Straight { start, end } => Rect::spanning(*start, *end),
            EdgeGeometry::Curved { curve, .. } => curve.sampled_bounds(24),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_hits_endpoints() {
        let curve = CubicBezier {
            start: Vec2::new(0.0, 0.0),
            control1: Vec2::new(1.0, -2.0),
            control2: Vec2::new(2.0, -2.0),
            end: Vec2::new(3.0, 0.0),
        };
        assert_eq!(curve.sample(0.0), curve.start);
        assert_eq!(curve.sample(1.0), curve.end);
    }

    #[test]
    fn test_curved_bounds_include_bulge() {
        let curve = CubicBezier {
            start: Vec2::new(0.0, 0.0),
            control1: Vec2::new(1.0, -2.0),
            control2: Vec2::new(2.0, -2.0),
            end: Vec2::new(3.0, 0.0),
        };
        let bounds = EdgeGeometry::Curved {
            curve,
            arc_angle: 0.8,
        }
        .bounds();
        assert!(bounds.min.y < -1.0);
        assert_eq!(bounds.max.y, 0.0);
    }
}
