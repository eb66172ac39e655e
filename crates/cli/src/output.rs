//! JSON document written by `run`.

use serde::Serialize;
use voronoi::diagram::{Diagram, SegmentKind};
use voronoi::Point;

#[derive(Debug, Serialize)]
pub struct DiagramDoc {
    /// `null` before the first event.
    pub sweepline: Option<f64>,
    pub done: bool,
    pub sites: Vec<[f64; 2]>,
    pub regions: Vec<RegionDoc>,
    pub segments: Vec<SegmentDoc>,
}

#[derive(Debug, Serialize)]
pub struct RegionDoc {
    pub site: [f64; 2],
    pub edges: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct SegmentDoc {
    pub id: usize,
    /// Open endpoints (mid-sweep) are `null`.
    pub a: Option<[f64; 2]>,
    pub b: Option<[f64; 2]>,
    pub regions: Vec<usize>,
    pub kind: &'static str,
}

fn xy(p: Point) -> [f64; 2] {
    [p.x, p.y]
}

impl DiagramDoc {
    pub fn from_diagram(d: &Diagram) -> Self {
        let regions = d
            .regions()
            .iter()
            .map(|r| RegionDoc {
                site: xy(r.site),
                edges: r.edges.iter().map(|s| s.0).collect(),
            })
            .collect();
        let segments = d
            .segments()
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.dropped)
            .map(|(id, s)| SegmentDoc {
                id,
                a: s.a.map(xy),
                b: s.b.map(xy),
                regions: std::iter::once(s.regions.0)
                    .chain(s.regions.1)
                    .map(|r| r.0)
                    .collect(),
                kind: match s.kind {
                    SegmentKind::Bisector => "bisector",
                    SegmentKind::Border => "border",
                },
            })
            .collect();
        Self {
            sweepline: Some(d.sweepline()).filter(|x| x.is_finite()),
            done: d.is_done(),
            sites: d.regions().iter().map(|r| xy(r.site)).collect(),
            regions,
            segments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voronoi::diagram::VoronoiCfg;

    fn v(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn finalized_two_site_document() {
        let sites = [v(0.0, 10.0), v(20.0, 10.0)];
        let mut d = Diagram::from_sites(VoronoiCfg::default(), sites).unwrap();
        d.run_to_completion();
        let doc = DiagramDoc::from_diagram(&d);
        assert!(doc.done);
        assert_eq!(doc.sites.len(), 2);
        let bisectors: Vec<&SegmentDoc> = doc
            .segments
            .iter()
            .filter(|s| s.kind == "bisector")
            .collect();
        assert_eq!(bisectors.len(), 1);
        assert_eq!(bisectors[0].regions, vec![0, 1]);
        assert!(doc.regions[0].edges.contains(&bisectors[0].id));
    }

    #[test]
    fn fresh_diagram_has_no_sweepline() {
        let d = Diagram::from_sites(VoronoiCfg::default(), [v(1.0, 1.0)]).unwrap();
        let doc = DiagramDoc::from_diagram(&d);
        assert!(doc.sweepline.is_none() && !doc.done);
        let json = serde_json::to_value(&doc).unwrap();
        assert!(json["sweepline"].is_null());
    }
}
