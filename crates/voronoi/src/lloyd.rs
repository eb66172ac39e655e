//! Lloyd relaxation: move every site to the centroid of its clipped cell and rebuild.
//!
//! Purpose
//! - Recover each region's polygon from its unordered edge list, compute its
//!   centroid with the shoelace formula, and sweep the centroids into a new diagram.
//!
//! Assumptions
//! - Input diagram is finalized; cells are convex and closed along the clip box.
//! - Regions with (near-)zero area or a centroid outside the clip box are skipped.

use tracing::{debug, info};

use crate::diagram::{Diagram, DiagramError, RegionId};
use crate::geometry::{cross, Point};

/// Relaxation settings.
#[derive(Clone, Copy, Debug)]
pub struct LloydCfg {
    /// Regions with `|area|` below this are skipped.
    pub min_area: f64,
    /// Rounds performed by [`relax_n`].
    pub iterations: usize,
}

impl Default for LloydCfg {
    fn default() -> Self {
        Self {
            min_area: 1e-9,
            iterations: 1,
        }
    }
}

impl Diagram {
    /// Vertices of a finalized region, counter-clockwise around their mean.
    ///
    /// Every edge contributes both endpoints, so each vertex shows up twice; the
    /// angular sort puts the copies next to each other and they collapse into one.
    pub fn region_polygon(&self, r: RegionId) -> Result<Vec<Point>, DiagramError> {
        let edges = self.region_edges(r)?;
        if edges.is_empty() {
            return Ok(Vec::new());
        }
        let pts: Vec<Point> = edges.iter().flat_map(|e| [e.a, e.b]).collect();
        let mean = pts.iter().sum::<Point>() / pts.len() as f64;
        let mut keyed: Vec<(f64, Point)> = pts
            .into_iter()
            .map(|p| ((p.y - mean.y).atan2(p.x - mean.x), p))
            .collect();
        keyed.sort_by(|a, b| a.0.total_cmp(&b.0));

        let eps = self.cfg().eps;
        let mut poly: Vec<Point> = Vec::with_capacity(keyed.len() / 2);
        for (_, p) in keyed {
            if poly.last().map_or(true, |q| (p - q).norm() > eps) {
                poly.push(p);
            }
        }
        if poly.len() > 1 && (poly[0] - poly[poly.len() - 1]).norm() <= eps {
            poly.pop();
        }
        Ok(poly)
    }
}

/// Centroid and signed area of a simple polygon (shoelace formula).
///
/// `None` for fewer than three vertices or zero area.
pub fn polygon_centroid(poly: &[Point]) -> Option<(Point, f64)> {
    if poly.len() < 3 {
        return None;
    }
    let mut area2 = 0.0;
    let mut acc = Point::zeros();
    for (i, &p) in poly.iter().enumerate() {
        let q = poly[(i + 1) % poly.len()];
        let c = cross(p, q);
        area2 += c;
        acc += (p + q) * c;
    }
    if area2 == 0.0 {
        return None;
    }
    Some((acc / (3.0 * area2), 0.5 * area2))
}

/// One relaxation round with default settings.
pub fn lloyd_relax(d: &Diagram) -> Result<Diagram, DiagramError> {
    lloyd_relax_with(d, &LloydCfg::default())
}

/// One relaxation round: returns a new finalized diagram over the surviving centroids.
pub fn lloyd_relax_with(d: &Diagram, cfg: &LloydCfg) -> Result<Diagram, DiagramError> {
    d.require_done()?;
    let bounds = d.cfg().bounds;
    let mut sites = Vec::with_capacity(d.regions().len());
    for r in 0..d.regions().len() {
        let poly = d.region_polygon(RegionId(r))?;
        match polygon_centroid(&poly) {
            Some((c, area)) if area.abs() >= cfg.min_area && bounds.contains(c) => sites.push(c),
            other => debug!(region = r, area = ?other.map(|(_, a)| a), "region skipped"),
        }
    }
    info!(
        kept = sites.len(),
        skipped = d.regions().len() - sites.len(),
        "lloyd relaxation"
    );
    let mut out = Diagram::from_sites(*d.cfg(), sites)?;
    out.run_to_completion();
    Ok(out)
}

/// `cfg.iterations` relaxation rounds (a clone for zero rounds).
pub fn relax_n(d: &Diagram, cfg: &LloydCfg) -> Result<Diagram, DiagramError> {
    d.require_done()?;
    let mut cur = d.clone();
    for _ in 0..cfg.iterations {
        cur = lloyd_relax_with(&cur, cfg)?;
    }
    Ok(cur)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::VoronoiCfg;
    use crate::sites::random_sites;
    use nalgebra::vector;

    fn built(sites: &[Point]) -> Diagram {
        let mut d = Diagram::from_sites(VoronoiCfg::default(), sites.iter().copied()).unwrap();
        d.run_to_completion();
        d
    }

    #[test]
    fn centroid_of_unit_square() {
        let sq = [vector![0.0, 0.0], vector![1.0, 0.0], vector![1.0, 1.0], vector![0.0, 1.0]];
        let (c, a) = polygon_centroid(&sq).unwrap();
        assert!((c - vector![0.5, 0.5]).norm() < 1e-12);
        assert!((a - 1.0).abs() < 1e-12);
        // Clockwise input flips the area sign only.
        let rev: Vec<Point> = sq.iter().rev().copied().collect();
        let (c2, a2) = polygon_centroid(&rev).unwrap();
        assert!((c2 - c).norm() < 1e-12);
        assert!((a2 + 1.0).abs() < 1e-12);
        assert!(polygon_centroid(&sq[..2]).is_none());
    }

    #[test]
    fn half_plane_cells_move_to_their_centroids() {
        let d = built(&[vector![2.0, 10.0], vector![12.0, 10.0]]);
        let poly = d.region_polygon(RegionId(0)).unwrap();
        assert_eq!(poly.len(), 4);
        let (_, area) = polygon_centroid(&poly).unwrap();
        assert!((area - 140.0).abs() < 1e-6);

        let relaxed = lloyd_relax(&d).unwrap();
        assert!(relaxed.is_done());
        let sites: Vec<Point> = relaxed.regions().iter().map(|r| r.site).collect();
        assert_eq!(sites.len(), 2);
        assert!((sites[0] - vector![3.5, 10.0]).norm() < 1e-6);
        assert!((sites[1] - vector![13.5, 10.0]).norm() < 1e-6);
    }

    #[test]
    fn relaxing_requires_a_finalized_diagram() {
        let mut d = Diagram::default();
        d.add_site(vector![1.0, 1.0]).unwrap();
        assert_eq!(lloyd_relax(&d).unwrap_err(), DiagramError::NotFinalized);
        assert_eq!(d.region_polygon(RegionId(0)).unwrap_err(), DiagramError::NotFinalized);
    }

    #[test]
    fn a_lone_site_has_no_cell_to_relax() {
        let d = built(&[vector![5.0, 5.0]]);
        assert!(d.region_polygon(RegionId(0)).unwrap().is_empty());
        let relaxed = lloyd_relax(&d).unwrap();
        assert!(relaxed.regions().is_empty());
    }

    #[test]
    fn repeated_rounds_keep_sites_in_the_box() {
        let cfg = VoronoiCfg::default();
        let mut d = Diagram::from_sites(cfg, random_sites(40, cfg.bounds, 7)).unwrap();
        d.run_to_completion();
        let relaxed = relax_n(
            &d,
            &LloydCfg {
                iterations: 3,
                ..LloydCfg::default()
            },
        )
        .unwrap();
        assert!(relaxed.is_done());
        assert!(relaxed.regions().len() <= 40);
        assert!(relaxed.regions().len() >= 30);
        for r in relaxed.regions() {
            assert!(cfg.bounds.contains(r.site));
        }
    }
}
