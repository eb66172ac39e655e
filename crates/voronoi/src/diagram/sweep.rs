//! Event processing: site insertion, arc removal, circle scheduling.

use tracing::{debug, trace, warn};

use super::types::{
    CircleEvent, End, Event, EventId, RegionId, Segment, SegmentEnd, SegmentId, Step,
};
use super::Diagram;
use crate::beachline::{NodeId, Split};
use crate::geometry::{circumcenter, Point};

impl Diagram {
    /// Pop and process the next event.
    ///
    /// Stale circle events are discarded without touching the beachline. Once the
    /// queue is empty this returns `Step::Drained` and changes nothing.
    pub fn step(&mut self) -> Step {
        let Some((key, event)) = self.queue.remove_min() else {
            return Step::Drained;
        };
        if let Event::Circle(id) = event {
            if !self.events[id.0].active {
                trace!(key, "stale circle event");
                return Step::Stale;
            }
        }
        self.sweepline = self.sweepline.max(key);
        match event {
            Event::Site(r) => self.site_event(r),
            Event::Circle(id) => self.circle_event(id),
        }
    }

    /// Run up to `n` steps; returns how many popped an event.
    pub fn step_n(&mut self, n: usize) -> usize {
        let mut done = 0;
        while done < n && self.step().progressed() {
            done += 1;
        }
        done
    }

    /// Drain all events and finalize.
    pub fn run_to_completion(&mut self) {
        while self.step().progressed() {}
        self.finalize();
    }

    #[inline]
    fn site(&self, r: RegionId) -> Point {
        self.regions[r.0].site
    }

    fn site_event(&mut self, r: RegionId) -> Step {
        let sweep = self.sweepline;
        let regions = &self.regions;
        let split = self.beach.break_at(sweep, r, |q| regions[q.0].site);
        debug!(region = r.0, x = sweep, "site event");
        match split {
            Split::First { .. } => {}
            Split::Pair {
                node,
                lower,
                upper,
                displaced,
            } => {
                let (lo, hi) = (self.beach.region(lower), self.beach.region(upper));
                let old = if lo == r { hi } else { lo };
                let s = self.open_segment(lo, hi);
                let far = self.far_behind(lo, hi);
                self.segments[s.0].set(End::A, far);
                self.beach.set_end(
                    node,
                    Some(SegmentEnd {
                        segment: s,
                        end: End::B,
                    }),
                );
                if let Some(b) = displaced {
                    self.retarget(b, old, r);
                }
                self.schedule_circle(lower);
                self.schedule_circle(upper);
            }
            Split::Triple {
                node,
                inner,
                left,
                right,
                ..
            } => {
                let old = self.beach.region(left);
                let s = self.open_segment(old, r);
                self.beach.set_end(
                    node,
                    Some(SegmentEnd {
                        segment: s,
                        end: End::A,
                    }),
                );
                self.beach.set_end(
                    inner,
                    Some(SegmentEnd {
                        segment: s,
                        end: End::B,
                    }),
                );
                self.schedule_circle(left);
                self.schedule_circle(right);
            }
        }
        Step::Site(r)
    }

    fn circle_event(&mut self, id: EventId) -> Step {
        let CircleEvent { leaf, center, .. } = self.events[id.0];
        self.events[id.0].active = false;
        self.beach.set_event(leaf, None);
        debug_assert!(self.beach.is_leaf(leaf));

        let (Some(below), Some(above)) = (self.beach.right(leaf), self.beach.left(leaf)) else {
            warn!(leaf = leaf.0, "circle event on an outermost arc, skipped");
            return Step::Stale;
        };
        for bp in [below, above] {
            if let Some(e) = self.beach.end(bp) {
                self.segments[e.segment.0].set(e.end, center);
            }
        }

        let prev = self.beach.prev(leaf);
        let next = self.beach.next(leaf);
        let Some(merged) = self.beach.remove(leaf) else {
            warn!(leaf = leaf.0, "arc removal failed");
            return Step::Stale;
        };
        if let Some((lo, hi)) = self.beach.regions(merged) {
            let s = self.open_segment(lo, hi);
            self.segments[s.0].set(End::A, center);
            self.beach.set_end(
                merged,
                Some(SegmentEnd {
                    segment: s,
                    end: End::B,
                }),
            );
        }
        debug!(x = self.sweepline, vx = center.x, vy = center.y, "circle event");

        for n in [prev, next].into_iter().flatten() {
            self.schedule_circle(n);
        }
        Step::Circle { vertex: center }
    }

    /// Recompute the circle event of `leaf` from its current neighbours.
    ///
    /// Any previously scheduled event of the leaf is tombstoned first.
    fn schedule_circle(&mut self, leaf: NodeId) {
        if let Some(old) = self.beach.event(leaf) {
            self.events[old.0].active = false;
            self.beach.set_event(leaf, None);
        }
        let (Some(prev), Some(next)) = (self.beach.prev(leaf), self.beach.next(leaf)) else {
            return;
        };
        let (a, b, c) = (
            self.site(self.beach.region(prev)),
            self.site(self.beach.region(leaf)),
            self.site(self.beach.region(next)),
        );
        let Some((center, radius)) = circumcenter(a, b, c) else {
            return;
        };
        let key = center.x + radius;
        let slack = self.cfg.eps * (1.0 + self.sweepline.abs());
        if key < self.sweepline - slack {
            trace!(key, sweepline = self.sweepline, "circle event behind sweep, rejected");
            return;
        }
        let id = EventId(self.events.len());
        self.events.push(CircleEvent {
            leaf,
            center,
            active: true,
        });
        self.queue.insert(key, Event::Circle(id));
        self.beach.set_event(leaf, Some(id));
        trace!(key, leaf = leaf.0, "circle event scheduled");
    }

    /// Far end of the horizontal bisector of two sites lying on the sweep.
    fn far_behind(&self, lo: RegionId, hi: RegionId) -> Point {
        let y = 0.5 * (self.site(lo).y + self.site(hi).y);
        Point::new(self.sweepline - self.horizon_reach(), y)
    }

    /// Hand the segment traced by breakpoint `b` over from region `from` to `to`.
    ///
    /// Only breakpoints between sites on the sweep get here, so the segment still has
    /// nothing but its far end fixed; that end moves to the new bisector.
    fn retarget(&mut self, b: NodeId, from: RegionId, to: RegionId) {
        let (Some(e), Some((lo, hi))) = (self.beach.end(b), self.beach.regions(b)) else {
            return;
        };
        let far = self.far_behind(lo, hi);
        let seg = &mut self.segments[e.segment.0];
        seg.regions = (lo, Some(hi));
        seg.set(e.end.other(), far);
        self.regions[from.0].edges.retain(|&s| s != e.segment);
        self.regions[to.0].edges.push(e.segment);
        trace!(segment = e.segment.0, from = from.0, to = to.0, "segment retargeted");
    }

    /// New bisector segment between `r1` and `r2`, registered with both regions.
    fn open_segment(&mut self, r1: RegionId, r2: RegionId) -> SegmentId {
        let id = SegmentId(self.segments.len());
        self.segments.push(Segment::bisector(r1, r2));
        self.regions[r1.0].edges.push(id);
        self.regions[r2.0].edges.push(id);
        id
    }
}
