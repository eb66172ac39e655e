//! Geometry kernel: stateless predicates that drive the sweep.
//!
//! Purpose
//! - `parabola_intersect`: breakpoint of two arcs sharing the sweep line as directrix.
//! - `circumcenter`: circle through three sites, accepted only for clockwise triples.
//! - `segment_intersect`: parametric intersection of two closed segments.
//!
//! Assumptions and conventions
//! - The sweep line is vertical (`x = p`) and moves towards +x. Arcs are ordered
//!   by increasing y along the beachline.
//! - Degenerate inputs return `None`; callers skip the candidate.

use nalgebra::Vector2;

/// A point (or vector) in the plane.
pub type Point = Vector2<f64>;

/// 2D cross product `a.x * b.y - a.y * b.x`.
#[inline]
pub fn cross(a: Point, b: Point) -> f64 {
    a.x * b.y - a.y * b.x
}

/// x-coordinate of the parabola with focus `f` and directrix `x = p` at height `y`.
///
/// Undefined for a focus on the directrix (`f.x == p`).
#[inline]
pub fn parabola_x(f: Point, p: f64, y: f64) -> f64 {
    let t = y - f.y;
    (f.x * f.x - p * p + t * t) / (2.0 * (f.x - p))
}

/// Breakpoint between the arc of `f1` (below) and the arc of `f2` (above) for directrix `x = p`.
///
/// Both parabolas are written as `x_i(y)`; the breakpoint is the root of
/// `x1(y) - x2(y)` at which the difference goes from positive to negative, i.e.
/// where the beachline hands over from `f1` to `f2` when walking up in y.
///
/// Cases:
/// - equal x: the bisector is horizontal, `y` is the foci midpoint;
/// - one focus on the directrix: its arc is a horizontal ray, `y` is that focus' y;
/// - general: quadratic in `y`, `None` when the discriminant is negative.
///
/// Returns `None` as well when both foci lie on the directrix at the same x (the
/// breakpoint sits at x = -∞).
pub fn parabola_intersect(f1: Point, f2: Point, p: f64) -> Option<Point> {
    let d1 = p - f1.x;
    let d2 = p - f2.x;
    let (y, f) = if f1.x == f2.x {
        if d1 == 0.0 {
            return None;
        }
        (0.5 * (f1.y + f2.y), f1)
    } else if d1 == 0.0 {
        (f1.y, f2)
    } else if d2 == 0.0 {
        (f2.y, f1)
    } else {
        // 2·d1·d2·(x1(y) - x2(y)) = a y² + b y + c
        let a = d1 - d2;
        let b = 2.0 * (d2 * f1.y - d1 * f2.y);
        let c = d1 * f2.y * f2.y - d2 * f1.y * f1.y + d1 * d2 * (f1.x - f2.x);
        let delta = b * b - 4.0 * a * c;
        if delta < 0.0 {
            return None;
        }
        // Root (-b - √Δ) / 2a, rearranged to avoid cancellation when b < 0.
        let sq = delta.sqrt();
        let y = if b < 0.0 {
            2.0 * c / (sq - b)
        } else {
            (-b - sq) / (2.0 * a)
        };
        (y, f1)
    };
    Some(Point::new(parabola_x(f, p, y), y))
}

/// Center and radius of the circle through `p1`, `p2`, `p3`.
///
/// Only clockwise triples are accepted: for consecutive arcs (bottom, middle, top)
/// this is exactly the case where the middle arc shrinks. Collinear, counter-clockwise
/// and zero-determinant triples return `None`.
pub fn circumcenter(p1: Point, p2: Point, p3: Point) -> Option<(Point, f64)> {
    if cross(p2 - p1, p3 - p1) >= 0.0 {
        return None;
    }
    // O'Rourke, Computational Geometry in C (2nd ed.), p. 189.
    let a = p2.x - p1.x;
    let b = p2.y - p1.y;
    let c = p3.x - p1.x;
    let d = p3.y - p1.y;
    let e = a * (p1.x + p2.x) + b * (p1.y + p2.y);
    let f = c * (p1.x + p3.x) + d * (p1.y + p3.y);
    let g = 2.0 * (a * (p3.y - p2.y) - b * (p3.x - p2.x));
    if g == 0.0 {
        return None;
    }
    let center = Point::new((d * e - b * f) / g, (a * f - c * e) / g);
    let radius = (p1 - center).norm();
    Some((center, radius))
}

/// Intersection of the closed segments `[p0, p1]` and `[q0, q1]`.
///
/// Parallel (including collinear) segments never intersect.
pub fn segment_intersect(p0: Point, p1: Point, q0: Point, q1: Point) -> Option<Point> {
    let r = p1 - p0;
    let s = q1 - q0;
    let denom = cross(r, s);
    if denom == 0.0 {
        return None;
    }
    let m = q0 - p0;
    let t = cross(m, s) / denom;
    let u = cross(m, r) / denom;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(p0 + r * t)
    } else {
        None
    }
}

/// Axis-aligned clip rectangle `[min.x, max.x] × [min.y, max.y]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Default for Rect {
    fn default() -> Self {
        Self::new(Point::new(0.0, 0.0), Point::new(20.0, 20.0))
    }
}

impl Rect {
    #[inline]
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// `[0, width] × [0, height]`.
    #[inline]
    pub fn from_size(width: f64, height: f64) -> Self {
        Self::new(Point::zeros(), Point::new(width, height))
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Closed containment with slack `eps`.
    #[inline]
    pub fn contains_eps(&self, p: Point, eps: f64) -> bool {
        p.x >= self.min.x - eps
            && p.x <= self.max.x + eps
            && p.y >= self.min.y - eps
            && p.y <= self.max.y + eps
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.contains_eps(p, 0.0)
    }

    /// Corners in counter-clockwise order starting at `min`.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }

    /// Border segments, counter-clockwise: bottom, right, top, left.
    pub fn borders(&self) -> [(Point, Point); 4] {
        let c = self.corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    #[inline]
    pub fn perimeter(&self) -> f64 {
        2.0 * (self.width() + self.height())
    }

    /// Counter-clockwise arc length from `min` to the border point closest to `p`.
    ///
    /// Corner `k` (see [`Rect::corners`]) sits at [`Rect::corner_param`]`(k)`.
    pub fn perimeter_param(&self, p: Point) -> f64 {
        let (w, h) = (self.width(), self.height());
        let x = (p.x - self.min.x).clamp(0.0, w);
        let y = (p.y - self.min.y).clamp(0.0, h);
        let dist = [y, w - x, h - y, x];
        let side = (0..4)
            .min_by(|&i, &j| dist[i].total_cmp(&dist[j]))
            .unwrap_or(0);
        match side {
            0 => x,
            1 => w + y,
            2 => w + h + (w - x),
            _ => 2.0 * w + h + (h - y),
        }
    }

    /// Border point at counter-clockwise arc length `t` (taken modulo the perimeter).
    pub fn point_at(&self, t: f64) -> Point {
        let (w, h) = (self.width(), self.height());
        let t = t.rem_euclid(self.perimeter());
        if t <= w {
            Point::new(self.min.x + t, self.min.y)
        } else if t <= w + h {
            Point::new(self.max.x, self.min.y + (t - w))
        } else if t <= 2.0 * w + h {
            Point::new(self.max.x - (t - w - h), self.max.y)
        } else {
            Point::new(self.min.x, self.max.y - (t - 2.0 * w - h))
        }
    }

    /// Arc-length position of corner `k` (0 = `min`, counter-clockwise).
    #[inline]
    pub fn corner_param(&self, k: usize) -> f64 {
        let (w, h) = (self.width(), self.height());
        [0.0, w, w + h, 2.0 * w + h][k % 4]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;
    use proptest::prelude::*;

    fn dist_to_directrix(q: Point, p: f64) -> f64 {
        (p - q.x).abs()
    }

    #[test]
    fn parabola_equal_x_is_midpoint() {
        let f1 = vector![2.0, 1.0];
        let f2 = vector![2.0, 5.0];
        let q = parabola_intersect(f1, f2, 6.0).unwrap();
        assert!((q.y - 3.0).abs() < 1e-12);
        assert!(((q - f1).norm() - dist_to_directrix(q, 6.0)).abs() < 1e-9);
        // Equal x with both foci on the directrix has no finite breakpoint.
        assert!(parabola_intersect(f1, f2, 2.0).is_none());
    }

    #[test]
    fn parabola_focus_on_directrix() {
        let f1 = vector![0.0, 0.0];
        let f2 = vector![10.0, 0.0];
        let q = parabola_intersect(f1, f2, 10.0).unwrap();
        assert!((q - vector![5.0, 0.0]).norm() < 1e-12);
        let q = parabola_intersect(f2, f1, 10.0).unwrap();
        assert!((q - vector![5.0, 0.0]).norm() < 1e-12);
    }

    #[test]
    fn parabola_orders_arcs_bottom_to_top() {
        // At p = 20 the newer site (10,0) owns |y| < sqrt(200).
        let a = vector![0.0, 0.0];
        let b = vector![10.0, 0.0];
        let lower = parabola_intersect(a, b, 20.0).unwrap();
        let upper = parabola_intersect(b, a, 20.0).unwrap();
        let r = 200f64.sqrt();
        assert!((lower.y + r).abs() < 1e-9);
        assert!((upper.y - r).abs() < 1e-9);
        assert!((lower.x - 5.0).abs() < 1e-9 && (upper.x - 5.0).abs() < 1e-9);
    }

    #[test]
    fn circumcenter_rejects_counter_clockwise_and_collinear() {
        let p1 = vector![0.0, -1.0];
        let p3 = vector![0.0, 1.0];
        let (c, r) = circumcenter(p1, vector![-1.0, 0.0], p3).unwrap();
        assert!(c.norm() < 1e-12);
        assert!((r - 1.0).abs() < 1e-12);
        assert!(circumcenter(p1, vector![1.0, 0.0], p3).is_none());
        assert!(circumcenter(vector![0.0, 0.0], vector![10.0, 0.0], vector![20.0, 0.0]).is_none());
    }

    #[test]
    fn segments_cross_and_parallel() {
        let o = vector![0.0, 0.0];
        let x = segment_intersect(o, vector![2.0, 2.0], vector![0.0, 2.0], vector![2.0, 0.0]);
        assert!((x.unwrap() - vector![1.0, 1.0]).norm() < 1e-12);
        let (a, b) = (vector![0.0, 1.0], vector![1.0, 1.0]);
        let parallel = segment_intersect(o, vector![1.0, 0.0], a, b);
        assert!(parallel.is_none());
        // Touching at an endpoint counts.
        let t = segment_intersect(o, vector![1.0, 0.0], vector![1.0, 0.0], vector![1.0, 3.0]);
        assert!((t.unwrap() - vector![1.0, 0.0]).norm() < 1e-12);
        // Lines cross outside the second segment.
        let miss = segment_intersect(o, vector![4.0, 0.0], vector![1.0, 1.0], vector![1.0, 3.0]);
        assert!(miss.is_none());
    }

    #[test]
    fn rect_perimeter_roundtrip_on_corners() {
        let r = Rect::from_size(4.0, 2.0);
        for (k, c) in r.corners().iter().enumerate() {
            assert!((r.perimeter_param(*c) - r.corner_param(k)).abs() < 1e-12);
            assert!((r.point_at(r.corner_param(k)) - c).norm() < 1e-12);
        }
        assert!((r.perimeter_param(vector![4.0, 1.0]) - 5.0).abs() < 1e-12);
        assert!((r.perimeter_param(vector![0.0, 1.5]) - 10.5).abs() < 1e-12);
    }

    proptest! {
        #[test]
        fn parabola_point_is_equidistant(
            x1 in -10.0..10.0f64, y1 in -10.0..10.0f64,
            x2 in -10.0..10.0f64, y2 in -10.0..10.0f64,
            ahead in 0.1..20.0f64,
        ) {
            let f1 = vector![x1, y1];
            let f2 = vector![x2, y2];
            prop_assume!((x1 - x2).abs() > 1e-3);
            let p = x1.max(x2) + ahead;
            let q = parabola_intersect(f1, f2, p).unwrap();
            let d = dist_to_directrix(q, p);
            let tol = 1e-6 * (1.0 + d);
            prop_assert!(((q - f1).norm() - d).abs() < tol);
            prop_assert!(((q - f2).norm() - d).abs() < tol);
        }

        #[test]
        fn circumcenter_is_equidistant(
            x1 in -10.0..10.0f64, y1 in -10.0..10.0f64,
            x2 in -10.0..10.0f64, y2 in -10.0..10.0f64,
            x3 in -10.0..10.0f64, y3 in -10.0..10.0f64,
        ) {
            let (p1, p2, p3) = (vector![x1, y1], vector![x2, y2], vector![x3, y3]);
            prop_assume!(cross(p2 - p1, p3 - p1).abs() > 1e-2);
            // Exactly one orientation is accepted.
            let fwd = circumcenter(p1, p2, p3);
            let rev = circumcenter(p3, p2, p1);
            prop_assert!(fwd.is_some() != rev.is_some());
            let (c, r) = fwd.or(rev).unwrap();
            let tol = 1e-6 * (1.0 + r);
            for q in [p1, p2, p3] {
                prop_assert!(((q - c).norm() - r).abs() < tol);
            }
        }
    }
}
