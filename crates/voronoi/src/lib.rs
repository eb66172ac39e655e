//! Voronoi diagrams by Fortune's sweep, clipped to a rectangle, plus Lloyd relaxation.
//!
//! Layering (bottom-up)
//! - `geometry`: predicates on points (parabola breakpoints, circumcircles, segments).
//! - `heap`: event priority queue.
//! - `beachline`: arc/breakpoint tree over an index arena.
//! - `diagram`: the sweep state machine, finalization and clipping.
//! - `lloyd`: centroidal relaxation on top of finalized diagrams.
//!
//! API Policy
//! - Internal to this workspace. There is no stable public API; `api` and `prelude`
//!   are convenience surfaces and change with the code.

pub mod api;
pub mod beachline;
pub mod diagram;
pub mod geometry;
pub mod heap;
pub mod lloyd;
pub mod sites;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use diagram::{Diagram, DiagramError, VoronoiCfg};
pub use geometry::{Point, Rect};
pub use lloyd::{lloyd_relax, LloydCfg};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::diagram::{Diagram, DiagramError, Edge, RegionId, SegmentKind, Step, VoronoiCfg};
    pub use crate::geometry::{Point, Rect};
    pub use crate::lloyd::{lloyd_relax, relax_n, LloydCfg};
    pub use crate::sites::{random_sites, DEFAULT_SEED};
    pub use nalgebra::Vector2 as Vec2;
}
