//! Watch Lloyd relaxation even out a random site set.
//!
//! Usage:
//!   cargo run -p voronoi --example lloyd_convergence -- 200 10
//!
//! Prints, per round, the number of sites kept and the spread of cell areas
//! (smallest, largest, ratio).

use voronoi::prelude::*;

fn area_spread(d: &Diagram) -> (f64, f64) {
    let areas: Vec<f64> = (0..d.regions().len())
        .filter_map(|r| d.region_polygon(RegionId(r)).ok())
        .filter_map(|p| voronoi::lloyd::polygon_centroid(&p))
        .map(|(_, a)| a.abs())
        .collect();
    let lo = areas.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = areas.iter().copied().fold(0.0, f64::max);
    (lo, hi)
}

fn main() -> Result<(), DiagramError> {
    let mut args = std::env::args().skip(1);
    let n: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(100);
    let rounds: usize = args.next().and_then(|s| s.parse().ok()).unwrap_or(8);

    let cfg = VoronoiCfg::default();
    let mut d = Diagram::from_sites(cfg, random_sites(n, cfg.bounds, DEFAULT_SEED))?;
    d.run_to_completion();
    for round in 0..=rounds {
        let (lo, hi) = area_spread(&d);
        println!(
            "round {round:>2}: sites={:<5} area min={lo:.4} max={hi:.4} ratio={:.3}",
            d.regions().len(),
            hi / lo
        );
        if round < rounds {
            d = lloyd_relax(&d)?;
        }
    }
    Ok(())
}
