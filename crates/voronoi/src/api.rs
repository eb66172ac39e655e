//! Curated surface for hosts (CLI, renderers, experiments).
//!
//! Not a stability promise: the crate is internal to this workspace and breaks
//! freely when the design improves.

// Geometry kernel
pub use crate::geometry::{circumcenter, parabola_intersect, segment_intersect, Point, Rect};
// Diagram engine
pub use crate::diagram::{
    ArcView, BreakpointView, Diagram, DiagramError, Edge, Phase, Region, RegionId, Segment,
    SegmentId, SegmentKind, Step, VoronoiCfg,
};
// Lloyd relaxation
pub use crate::lloyd::{lloyd_relax, lloyd_relax_with, polygon_centroid, relax_n, LloydCfg};
// Site generation
pub use crate::sites::{draw_sites, random_sites, ReplayToken, DEFAULT_SEED};
