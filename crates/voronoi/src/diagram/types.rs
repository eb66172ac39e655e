//! Data types for the diagram engine: ids, regions, segments, events, config, errors.
//!
//! Kept small and explicit so `sweep` and `clip` read easily.

use std::fmt;

use crate::beachline::NodeId;
use crate::geometry::{Point, Rect};

/// Index of a region (one per input site).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionId(pub usize);
/// Index of a segment in the segment arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SegmentId(pub usize);
/// Index of a circle event in the event arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(pub usize);

/// One of the two endpoint slots of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum End {
    A,
    B,
}

impl End {
    #[inline]
    pub fn other(self) -> End {
        match self {
            End::A => End::B,
            End::B => End::A,
        }
    }
}

/// Handle to the endpoint slot a breakpoint is tracing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SegmentEnd {
    pub segment: SegmentId,
    pub end: End,
}

/// A site and the segments bounding its cell (unordered).
#[derive(Clone, Debug)]
pub struct Region {
    pub site: Point,
    pub edges: Vec<SegmentId>,
}

/// Where a segment came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
    /// Traced by the sweep; lies on the bisector of its two regions.
    Bisector,
    /// Synthesized along the clip rectangle while closing a region.
    Border,
}

/// Segment with two independently resolved endpoints.
///
/// Invariants:
/// - Each slot is written once by the sweep; clipping may later move it onto the border.
/// - Bisector segments separate exactly two regions, border segments bound one.
#[derive(Clone, Debug)]
pub struct Segment {
    pub a: Option<Point>,
    pub b: Option<Point>,
    pub regions: (RegionId, Option<RegionId>),
    pub kind: SegmentKind,
    /// Removed by clipping (entirely outside the rectangle).
    pub dropped: bool,
}

impl Segment {
    pub(crate) fn bisector(r1: RegionId, r2: RegionId) -> Self {
        Self {
            a: None,
            b: None,
            regions: (r1, Some(r2)),
            kind: SegmentKind::Bisector,
            dropped: false,
        }
    }

    pub(crate) fn border(region: RegionId, a: Point, b: Point) -> Self {
        Self {
            a: Some(a),
            b: Some(b),
            regions: (region, None),
            kind: SegmentKind::Border,
            dropped: false,
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, end: End, p: Point) {
        match end {
            End::A => self.a = Some(p),
            End::B => self.b = Some(p),
        }
    }

    /// Both endpoints, once resolved.
    #[inline]
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        Some((self.a?, self.b?))
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.a.is_some() && self.b.is_some()
    }

    /// The region on the other side of `r`, if any.
    pub fn neighbor(&self, r: RegionId) -> Option<RegionId> {
        match self.regions {
            (r1, Some(r2)) if r1 == r => Some(r2),
            (r1, Some(r2)) if r2 == r => Some(r1),
            _ => None,
        }
    }
}

/// Finalized edge as exposed to hosts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    pub id: SegmentId,
    pub a: Point,
    pub b: Point,
    pub regions: (RegionId, Option<RegionId>),
    pub kind: SegmentKind,
}

/// Predicted disappearance of the arc `leaf`; `center` becomes a Voronoi vertex.
#[derive(Clone, Copy, Debug)]
pub struct CircleEvent {
    pub leaf: NodeId,
    pub center: Point,
    pub active: bool,
}

/// Heap payload.
#[derive(Clone, Copy, Debug)]
pub enum Event {
    Site(RegionId),
    Circle(EventId),
}

/// Outcome of one `step`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Step {
    /// A site was inserted into the beachline.
    Site(RegionId),
    /// An arc was removed; `vertex` is the new Voronoi vertex.
    Circle { vertex: Point },
    /// A tombstoned circle event was discarded.
    Stale,
    /// No events remain.
    Drained,
}

impl Step {
    /// True while the queue still produced an event.
    #[inline]
    pub fn progressed(&self) -> bool {
        !matches!(self, Step::Drained)
    }
}

/// Construction phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Building,
    Done,
}

/// Diagram configuration (clip box and tolerances).
#[derive(Clone, Copy, Debug)]
pub struct VoronoiCfg {
    /// Rectangle regions are clipped to at finalize.
    pub bounds: Rect,
    /// Slack for sweep ordering, containment tests and point de-duplication.
    pub eps: f64,
    /// The final sweep position lies this many domain extents past the last site.
    pub horizon_scale: f64,
}

impl Default for VoronoiCfg {
    fn default() -> Self {
        Self {
            bounds: Rect::default(),
            eps: 1e-9,
            horizon_scale: 1e3,
        }
    }
}

impl VoronoiCfg {
    pub fn with_bounds(bounds: Rect) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }
}

/// Contract violations reported by the diagram.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagramError {
    /// The operation needs a finalized diagram.
    NotFinalized,
    /// Sites cannot be added once the diagram is finalized.
    Finalized,
    /// The sweep has already passed this site.
    SiteBehindSweep { x: f64, sweepline: f64 },
    /// Site coordinates must be finite.
    NonFiniteSite,
    UnknownRegion(RegionId),
}

impl fmt::Display for DiagramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFinalized => write!(f, "diagram is not finalized"),
            Self::Finalized => write!(f, "diagram is already finalized"),
            Self::SiteBehindSweep { x, sweepline } => {
                write!(f, "site at x={x} is behind the sweepline at x={sweepline}")
            }
            Self::NonFiniteSite => write!(f, "site coordinates must be finite"),
            Self::UnknownRegion(r) => write!(f, "unknown region {}", r.0),
        }
    }
}

impl std::error::Error for DiagramError {}
