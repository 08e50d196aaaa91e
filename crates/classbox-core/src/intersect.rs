//! Boundary intersection used by edge routing to clip connectors at a node outline.
//!
//! Every boundary shape implements [`Intersectable`]. Nodes only record which [`BoundaryKind`]
//! they were rendered with; the concrete [`Boundary`] is rebuilt from the node geometry at call
//! time, so later layout passes that move the node are picked up automatically.

use crate::geom::{Point, point};
use serde::{Deserialize, Serialize};

pub trait Intersectable {
    /// Point where the segment from the shape center towards `toward` leaves the outline.
    fn intersect(&self, toward: Point) -> Point;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectBoundary {
    pub center: Point,
    pub width: f64,
    pub height: f64,
}

impl Intersectable for RectBoundary {
    fn intersect(&self, toward: Point) -> Point {
        let d = toward - self.center;
        let mut w = self.width / 2.0;
        let mut h = self.height / 2.0;

        let (sx, sy) = if d.y.abs() * w > d.x.abs() * h {
            if d.y < 0.0 {
                h = -h;
            }
            let sx = if d.y == 0.0 { 0.0 } else { (h * d.x) / d.y };
            (sx, h)
        } else {
            if d.x < 0.0 {
                w = -w;
            }
            let sy = if d.x == 0.0 { 0.0 } else { (w * d.y) / d.x };
            (w, sy)
        };

        point(self.center.x + sx, self.center.y + sy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Boundary {
    Rect(RectBoundary),
}

impl Intersectable for Boundary {
    fn intersect(&self, toward: Point) -> Point {
        match self {
            Boundary::Rect(b) => b.intersect(toward),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryKind {
    Rect,
}

impl BoundaryKind {
    pub fn boundary(self, center: Point, width: f64, height: f64) -> Boundary {
        match self {
            BoundaryKind::Rect => Boundary::Rect(RectBoundary {
                center,
                width,
                height,
            }),
        }
    }
}
