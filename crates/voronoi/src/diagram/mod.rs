//! Voronoi diagram by Fortune's sweep (sweep line `x = const`, moving towards +x).
//!
//! Purpose
//! - Own the event queue, the beachline and the region/segment arenas of one
//!   construction, and expose the host surface: add sites, step, run to completion,
//!   read back regions and edges.
//!
//! Life cycle
//! - `Building`: events remain or `finalize` has not run yet. `step` pops one event.
//! - `finalize`: drains the queue, moves the sweep to a far horizon to resolve every
//!   open edge, clips regions to `VoronoiCfg::bounds`, then switches to `Done`.
//! - `Done`: read-only. Finalized-only queries return `DiagramError::NotFinalized`
//!   before that point.
//!
//! Layout
//! - `types.rs` (ids, records, config, errors), `sweep.rs` (site/circle events),
//!   `clip.rs` (finalize and rectangle restriction).
//!
//! Code cross-refs: `beachline::Beachline`, `heap::MinHeap`, `lloyd::lloyd_relax`.

mod clip;
mod sweep;
pub mod types;

pub use types::{
    DiagramError, Edge, End, EventId, Phase, Region, RegionId, Segment, SegmentEnd, SegmentId,
    SegmentKind, Step, VoronoiCfg,
};

use crate::beachline::Beachline;
use crate::geometry::Point;
use crate::heap::MinHeap;
use types::{CircleEvent, Event};

/// One Voronoi construction.
#[derive(Clone, Debug)]
pub struct Diagram {
    cfg: VoronoiCfg,
    regions: Vec<Region>,
    segments: Vec<Segment>,
    events: Vec<CircleEvent>,
    queue: MinHeap<Event>,
    beach: Beachline,
    sweepline: f64,
    phase: Phase,
    /// Bounding box of all sites added so far.
    extent: Option<(Point, Point)>,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(VoronoiCfg::default())
    }
}

/// An arc of the current beachline, with its visible y-range at the sweepline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcView {
    pub region: RegionId,
    pub site: Point,
    /// Breakpoint below (unbounded if `None`).
    pub y_min: Option<f64>,
    /// Breakpoint above (unbounded if `None`).
    pub y_max: Option<f64>,
}

/// A breakpoint of the current beachline and the edge endpoint it traces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BreakpointView {
    pub lower: RegionId,
    pub upper: RegionId,
    pub position: Option<Point>,
    pub end: Option<SegmentEnd>,
}

impl Diagram {
    pub fn new(cfg: VoronoiCfg) -> Self {
        Self {
            cfg,
            regions: Vec::new(),
            segments: Vec::new(),
            events: Vec::new(),
            queue: MinHeap::new(),
            beach: Beachline::new(),
            sweepline: f64::NEG_INFINITY,
            phase: Phase::Building,
            extent: None,
        }
    }

    /// New diagram with `sites` queued (not yet swept).
    pub fn from_sites<I>(cfg: VoronoiCfg, sites: I) -> Result<Self, DiagramError>
    where
        I: IntoIterator<Item = Point>,
    {
        let mut d = Self::new(cfg);
        d.add_sites(sites)?;
        Ok(d)
    }

    /// Queue a site. Fails once finalized, for non-finite input, or for a site the
    /// sweep has already passed.
    pub fn add_site(&mut self, p: Point) -> Result<RegionId, DiagramError> {
        if self.phase == Phase::Done {
            return Err(DiagramError::Finalized);
        }
        if !(p.x.is_finite() && p.y.is_finite()) {
            return Err(DiagramError::NonFiniteSite);
        }
        if p.x < self.sweepline {
            return Err(DiagramError::SiteBehindSweep {
                x: p.x,
                sweepline: self.sweepline,
            });
        }
        let id = RegionId(self.regions.len());
        self.regions.push(Region {
            site: p,
            edges: Vec::new(),
        });
        self.queue.insert(p.x, Event::Site(id));
        self.extent = Some(match self.extent {
            None => (p, p),
            Some((lo, hi)) => (lo.inf(&p), hi.sup(&p)),
        });
        Ok(id)
    }

    pub fn add_sites<I>(&mut self, sites: I) -> Result<Vec<RegionId>, DiagramError>
    where
        I: IntoIterator<Item = Point>,
    {
        sites.into_iter().map(|p| self.add_site(p)).collect()
    }

    #[inline]
    pub fn cfg(&self) -> &VoronoiCfg {
        &self.cfg
    }

    /// Current sweep position (`-∞` before the first event).
    #[inline]
    pub fn sweepline(&self) -> f64 {
        self.sweepline
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Queued events, including tombstoned ones.
    #[inline]
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// All regions. Edge lists are live during the sweep.
    #[inline]
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn region(&self, r: RegionId) -> Result<&Region, DiagramError> {
        self.regions.get(r.0).ok_or(DiagramError::UnknownRegion(r))
    }

    /// Raw segment arena, including open and dropped segments.
    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Finalized edges that survived clipping.
    pub fn edges(&self) -> Result<Vec<Edge>, DiagramError> {
        self.require_done()?;
        Ok((0..self.segments.len())
            .filter_map(|i| self.edge(SegmentId(i)))
            .collect())
    }

    /// Finalized edges of one region, in the region's edge order.
    pub fn region_edges(&self, r: RegionId) -> Result<Vec<Edge>, DiagramError> {
        self.require_done()?;
        Ok(self
            .region(r)?
            .edges
            .iter()
            .filter_map(|&s| self.edge(s))
            .collect())
    }

    fn edge(&self, id: SegmentId) -> Option<Edge> {
        let s = &self.segments[id.0];
        if s.dropped || !s.is_closed() {
            return None;
        }
        let (a, b) = s.endpoints()?;
        Some(Edge {
            id,
            a,
            b,
            regions: s.regions,
            kind: s.kind,
        })
    }

    /// Arcs of the current beachline, bottom to top.
    pub fn arcs(&self) -> Vec<ArcView> {
        let site = |r: RegionId| self.regions[r.0].site;
        let y_of = |n| {
            self.beach
                .breakpoint_at(n, self.sweepline, site)
                .map(|q| q.y)
        };
        self.beach
            .leaves()
            .into_iter()
            .map(|leaf| {
                let region = self.beach.region(leaf);
                ArcView {
                    region,
                    site: site(region),
                    y_min: self.beach.right(leaf).and_then(y_of),
                    y_max: self.beach.left(leaf).and_then(y_of),
                }
            })
            .collect()
    }

    /// Breakpoints of the current beachline with their position at the sweepline.
    pub fn breakpoints(&self) -> Vec<BreakpointView> {
        let site = |r: RegionId| self.regions[r.0].site;
        self.beach
            .breakpoints()
            .into_iter()
            .filter_map(|n| {
                let (lower, upper) = self.beach.regions(n)?;
                Some(BreakpointView {
                    lower,
                    upper,
                    position: self.beach.breakpoint_at(n, self.sweepline, site),
                    end: self.beach.end(n),
                })
            })
            .collect()
    }

    pub(crate) fn require_done(&self) -> Result<(), DiagramError> {
        if self.is_done() {
            Ok(())
        } else {
            Err(DiagramError::NotFinalized)
        }
    }

    /// Distance used as "infinity" for this input: a multiple of the domain extent.
    pub(crate) fn horizon_reach(&self) -> f64 {
        let b = self.cfg.bounds;
        let mut span = b.width().max(b.height()).max(1.0);
        if let Some((lo, hi)) = self.extent {
            span = span.max(hi.x - lo.x).max(hi.y - lo.y);
        }
        self.cfg.horizon_scale * span
    }
}
