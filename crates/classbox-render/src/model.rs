use serde::{Deserialize, Serialize};

/// Size of measured text content before it is positioned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Option<Self> {
        let mut it = points.into_iter();
        let (x0, y0) = it.next()?;
        let mut b = Self {
            min_x: x0,
            min_y: y0,
            max_x: x0,
            max_y: y0,
        };
        for (x, y) in it {
            b.include_point(x, y);
        }
        Some(b)
    }

    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn include_point(&mut self, x: f64, y: f64) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    pub fn union(&mut self, other: &Bounds) {
        self.include_point(other.min_x, other.min_y);
        self.include_point(other.max_x, other.max_y);
    }

    /// Extends the bounds to cover a cubic Bezier segment, including its interior extrema.
    #[allow(clippy::too_many_arguments)]
    pub fn include_cubic(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) {
        self.include_point(x0, y0);
        self.include_point(x3, y3);

        for t in cubic_extrema(x0, x1, x2, x3)
            .into_iter()
            .chain(cubic_extrema(y0, y1, y2, y3))
            .flatten()
        {
            self.include_point(
                cubic_eval(x0, x1, x2, x3, t),
                cubic_eval(y0, y1, y2, y3, t),
            );
        }
    }
}

fn cubic_eval(p0: f64, p1: f64, p2: f64, p3: f64, t: f64) -> f64 {
    let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
    let b = 3.0 * p0 - 6.0 * p1 + 3.0 * p2;
    let c = -3.0 * p0 + 3.0 * p1;
    ((a * t + b) * t + c) * t + p0
}

/// Parameters in `(0, 1)` where the derivative of one cubic coordinate vanishes.
fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> [Option<f64>; 2] {
    const EPS: f64 = 1e-12;

    let a = -p0 + 3.0 * p1 - 3.0 * p2 + p3;
    let b = 3.0 * p0 - 6.0 * p1 + 3.0 * p2;
    let c = -3.0 * p0 + 3.0 * p1;
    let (qa, qb, qc) = (3.0 * a, 2.0 * b, c);

    let inside = |t: f64| (t > 0.0 && t < 1.0).then_some(t);
    if qa.abs() <= EPS {
        if qb.abs() <= EPS {
            return [None, None];
        }
        return [inside(-qc / qb), None];
    }

    let disc = qb * qb - 4.0 * qa * qc;
    let tol = EPS * (qb * qb + (4.0 * qa * qc).abs() + 1.0);
    if disc < -tol {
        return [None, None];
    }
    let s = disc.max(0.0).sqrt();
    [
        inside((-qb + s) / (2.0 * qa)),
        inside((-qb - s) / (2.0 * qa)),
    ]
}
