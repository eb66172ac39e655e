//! Finalization: resolve open edges at a far horizon, restrict to the clip rectangle,
//! and close each region along the rectangle border.
//!
//! Clipping rules
//! - Both endpoints inside: kept as is.
//! - One endpoint inside: the outside end moves to the first border crossing.
//! - Both outside: kept (cropped at both ends) only if the segment crosses the
//!   rectangle at two distinct points, dropped otherwise.
//! - Unresolved segments are dropped.
//!
//! Border closing walks the rectangle counter-clockwise between consecutive crop
//! points of a region and emits `SegmentKind::Border` segments (through corners) for
//! the stretches that lie inside the region. A region whose cell contains the whole
//! rectangle (no crop points, every corner inside) gets the four sides.

use tracing::{info, warn};

use super::types::{Phase, RegionId, Segment, SegmentId, SegmentKind};
use super::Diagram;
use crate::geometry::{segment_intersect, Point, Rect};

impl Diagram {
    /// Drain remaining events, close every open edge, clip to `cfg.bounds`.
    ///
    /// Idempotent: a second call is a no-op.
    pub fn finalize(&mut self) {
        if self.is_done() {
            return;
        }
        while self.step().progressed() {}

        let horizon = self.horizon();
        self.sweepline = horizon;
        let regions = &self.regions;
        let site = |r: RegionId| regions[r.0].site;
        let mut unresolved = 0usize;
        for bp in self.beach.breakpoints() {
            let Some(e) = self.beach.end(bp) else {
                continue;
            };
            match self.beach.breakpoint_at(bp, horizon, site) {
                Some(q) => self.segments[e.segment.0].set(e.end, q),
                None => unresolved += 1,
            }
        }
        if unresolved > 0 {
            warn!(unresolved, "breakpoints without a position at the horizon, edges dropped");
        }

        self.clip();
        self.phase = Phase::Done;
        info!(
            sites = self.regions.len(),
            edges = self.segments.iter().filter(|s| !s.dropped).count(),
            "diagram finalized"
        );
    }

    /// Sweep position at which every remaining breakpoint is far outside the bounds.
    fn horizon(&self) -> f64 {
        let mut x = self.sweepline.max(self.cfg.bounds.max.x);
        if let Some((_, hi)) = self.extent {
            x = x.max(hi.x);
        }
        x + self.horizon_reach()
    }

    fn clip(&mut self) {
        let rect = self.cfg.bounds;
        let eps = self.cfg.eps;
        let mut crops: Vec<Vec<Point>> = vec![Vec::new(); self.segments.len()];
        for (seg, crop) in self.segments.iter_mut().zip(crops.iter_mut()) {
            *crop = clip_segment(seg, &rect, eps);
        }

        for r in 0..self.regions.len() {
            self.close_region(RegionId(r), &crops, &rect);
        }
        for r in 0..self.regions.len() {
            self.sort_region_edges(RegionId(r));
        }
    }

    /// Emit border segments for region `r` and drop its clipped-away edges.
    fn close_region(&mut self, r: RegionId, crops: &[Vec<Point>], rect: &Rect) {
        let eps = self.cfg.eps;
        let site = self.regions[r.0].site;
        let neighbors: Vec<Point> = self.regions[r.0]
            .edges
            .iter()
            .filter_map(|&s| self.segments[s.0].neighbor(r))
            .map(|q| self.regions[q.0].site)
            .collect();

        let mut points: Vec<(f64, Point)> = Vec::new();
        for &s in &self.regions[r.0].edges {
            if self.segments[s.0].dropped {
                continue;
            }
            for &p in &crops[s.0] {
                points.push((rect.perimeter_param(p), p));
            }
        }
        self.regions[r.0]
            .edges
            .retain(|&s| !self.segments[s.0].dropped);

        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points.dedup_by(|b, a| (b.0 - a.0).abs() <= eps);
        if points.len() >= 2 {
            let (first, last) = (points[0].0, points[points.len() - 1].0);
            if (first + rect.perimeter() - last).abs() <= eps {
                points.pop();
            }
        }
        let inside = |q: Point| {
            let d = (q - site).norm_squared();
            let slack = eps * (1.0 + d);
            neighbors.iter().all(|n| d <= (q - n).norm_squared() + slack)
        };
        let corners = rect.corners();
        if points.is_empty() && !neighbors.is_empty() && corners.iter().all(|&c| inside(c)) {
            // No bisector reaches the box: the cell covers all of it.
            for c in 0..4 {
                let id = SegmentId(self.segments.len());
                self.segments
                    .push(Segment::border(r, corners[c], corners[(c + 1) % 4]));
                self.regions[r.0].edges.push(id);
            }
            return;
        }
        if points.len() < 2 {
            return;
        }

        let k = points.len();
        for i in 0..k {
            let (t0, p0) = points[i];
            let (mut t1, p1) = points[(i + 1) % k];
            if t1 <= t0 {
                t1 += rect.perimeter();
            }
            if !inside(rect.point_at(0.5 * (t0 + t1))) {
                continue;
            }
            let mut chain = vec![p0];
            for c in 0..8 {
                let tc = rect.corner_param(c) + if c >= 4 { rect.perimeter() } else { 0.0 };
                if tc > t0 + eps && tc < t1 - eps {
                    chain.push(corners[c % 4]);
                }
            }
            chain.push(p1);
            for w in chain.windows(2) {
                let id = SegmentId(self.segments.len());
                self.segments.push(Segment::border(r, w[0], w[1]));
                self.regions[r.0].edges.push(id);
            }
        }
    }

    /// Order a region's edges counter-clockwise around its site.
    fn sort_region_edges(&mut self, r: RegionId) {
        let site = self.regions[r.0].site;
        let segments = &self.segments;
        let angle = |s: &SegmentId| {
            let m = segments[s.0]
                .endpoints()
                .map_or(site, |(a, b)| 0.5 * (a + b));
            (m.y - site.y).atan2(m.x - site.x)
        };
        self.regions[r.0]
            .edges
            .sort_by(|a, b| angle(a).total_cmp(&angle(b)));
    }
}

/// Clip one bisector to `rect` in place; returns the border points it was cropped at.
fn clip_segment(seg: &mut Segment, rect: &Rect, eps: f64) -> Vec<Point> {
    if seg.kind != SegmentKind::Bisector || seg.dropped {
        return Vec::new();
    }
    let Some((a, b)) = seg.endpoints() else {
        seg.dropped = true;
        return Vec::new();
    };
    let hits = border_hits(a, b, rect, eps);
    match (rect.contains_eps(a, eps), rect.contains_eps(b, eps)) {
        (true, true) => Vec::new(),
        (true, false) => match nearest(&hits, a) {
            Some(q) => {
                seg.b = Some(q);
                vec![q]
            }
            None => {
                seg.dropped = true;
                Vec::new()
            }
        },
        (false, true) => match nearest(&hits, b) {
            Some(q) => {
                seg.a = Some(q);
                vec![q]
            }
            None => {
                seg.dropped = true;
                Vec::new()
            }
        },
        (false, false) => match (nearest(&hits, a), nearest(&hits, b)) {
            (Some(qa), Some(qb)) if (qa - qb).norm() > eps => {
                seg.a = Some(qa);
                seg.b = Some(qb);
                vec![qa, qb]
            }
            _ => {
                seg.dropped = true;
                Vec::new()
            }
        },
    }
}

/// Crossings of `[a, b]` with the rectangle border, de-duplicated (corners hit twice).
fn border_hits(a: Point, b: Point, rect: &Rect, eps: f64) -> Vec<Point> {
    let mut hits: Vec<Point> = Vec::new();
    for (q0, q1) in rect.borders() {
        if let Some(h) = segment_intersect(a, b, q0, q1) {
            if hits.iter().all(|o| (o - h).norm() > eps) {
                hits.push(h);
            }
        }
    }
    hits
}

fn nearest(hits: &[Point], from: Point) -> Option<Point> {
    hits.iter()
        .copied()
        .min_by(|p, q| (p - from).norm_squared().total_cmp(&(q - from).norm_squared()))
}
