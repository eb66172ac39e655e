mod output;
mod provenance;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use polars::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use voronoi::diagram::{Diagram, VoronoiCfg};
use voronoi::lloyd::{relax_n, LloydCfg};
use voronoi::sites::{random_sites, DEFAULT_SEED};
use voronoi::{Point, Rect};

use output::DiagramDoc;
use provenance::Payload;

#[derive(Parser)]
#[command(name = "voronoi-cli")]
#[command(about = "Build clipped Voronoi diagrams and relax them")]
struct Cmd {
    /// Free-form run tag; recorded in provenance (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Sweep a site set and write the diagram as JSON
    Run(RunArgs),
    /// Print a small provenance JSON block
    Report,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Number of random sites (ignored with --input)
    #[arg(long, default_value_t = 100)]
    sites: usize,
    /// CSV file with `x` and `y` columns
    #[arg(long)]
    input: Option<PathBuf>,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Lloyd relaxation rounds after the sweep
    #[arg(long, default_value_t = 0)]
    lloyd: usize,
    /// Stop after this many events instead of finalizing
    #[arg(long)]
    steps: Option<usize>,
    /// Clip box width
    #[arg(long, default_value_t = 20.0)]
    width: f64,
    /// Clip box height
    #[arg(long, default_value_t = 20.0)]
    height: f64,
    #[arg(long)]
    out: PathBuf,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Run(args) => run(&args, cmd.tags).map(|_| ()),
        Action::Report => report(cmd.tags),
    }
}

/// Read sites from the `x`/`y` columns of a CSV file.
fn load_sites(path: &Path) -> Result<Vec<Point>> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .finish()
        .with_context(|| format!("opening {}", path.display()))?
        .select([
            col("x").cast(DataType::Float64),
            col("y").cast(DataType::Float64),
        ])
        .collect()
        .with_context(|| format!("reading x/y columns of {}", path.display()))?;
    let xs = df.column("x")?.f64()?;
    let ys = df.column("y")?.f64()?;
    let mut sites = Vec::with_capacity(df.height());
    for (i, (x, y)) in xs.into_iter().zip(ys.into_iter()).enumerate() {
        match (x, y) {
            (Some(x), Some(y)) => sites.push(Point::new(x, y)),
            _ => bail!("row {i} of {} has a missing coordinate", path.display()),
        }
    }
    tracing::info!(rows = sites.len(), path = %path.display(), "sites loaded");
    Ok(sites)
}

fn run(args: &RunArgs, tags: Vec<String>) -> Result<DiagramDoc> {
    tracing::info!(?args, "run");
    if !(args.width > 0.0 && args.height > 0.0) {
        bail!("clip box must have positive size, got {}x{}", args.width, args.height);
    }
    let cfg = VoronoiCfg::with_bounds(Rect::from_size(args.width, args.height));
    let sites = match &args.input {
        Some(path) => load_sites(path)?,
        None => random_sites(args.sites, cfg.bounds, args.seed),
    };
    let n_sites = sites.len();

    let mut d = Diagram::from_sites(cfg, sites)?;
    match args.steps {
        Some(n) => {
            let done = d.step_n(n);
            tracing::info!(steps = done, sweepline = d.sweepline(), "partial sweep");
        }
        None => {
            d.run_to_completion();
            if args.lloyd > 0 {
                let lloyd = LloydCfg {
                    iterations: args.lloyd,
                    ..LloydCfg::default()
                };
                d = relax_n(&d, &lloyd)?;
            }
        }
    }

    let doc = DiagramDoc::from_diagram(&d);
    if let Some(parent) = args.out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    std::fs::write(&args.out, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", args.out.display()))?;

    let payload = Payload::new(json!({
        "sites": n_sites,
        "input": args.input.as_ref().map(|p| p.to_string_lossy().into_owned()),
        "seed": args.seed,
        "lloyd": args.lloyd,
        "steps": args.steps,
        "bounds": [args.width, args.height],
        "segments": doc.segments.len(),
        "done": doc.done
    }))
    .with_tags(tags);
    let prov = provenance::write_sidecar(&args.out, payload)?;
    tracing::info!(out = %args.out.display(), provenance = %prov.display(), "diagram written");
    Ok(doc)
}

fn report(tags: Vec<String>) -> Result<()> {
    let doc = provenance::document(&Payload::new(json!({})).with_tags(tags), &[]);
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn args(out: PathBuf) -> RunArgs {
        RunArgs {
            sites: 30,
            input: None,
            seed: DEFAULT_SEED,
            lloyd: 0,
            steps: None,
            width: 20.0,
            height: 20.0,
            out,
        }
    }

    #[test]
    fn run_writes_diagram_and_sidecar() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("nested").join("cells.json");
        let doc = run(&args(out.clone()), vec!["t".into()]).unwrap();
        assert!(doc.done);
        assert_eq!(doc.sites.len(), 30);
        let bytes = std::fs::read(&out).unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed["regions"].as_array().unwrap().len(), 30);
        assert!(dir.path().join("nested").join("cells.provenance.json").exists());
    }

    #[test]
    fn partial_sweep_is_not_finalized() {
        let dir = tempdir().unwrap();
        let mut a = args(dir.path().join("partial.json"));
        a.steps = Some(5);
        let doc = run(&a, Vec::new()).unwrap();
        assert!(!doc.done);
        assert!(doc.sweepline.is_some());
    }

    #[test]
    fn sites_load_from_csv() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("sites.csv");
        std::fs::write(&csv, "x,y\n1,2\n3.5,4\n10,10\n").unwrap();
        let sites = load_sites(&csv).unwrap();
        let expected = [(1.0, 2.0), (3.5, 4.0), (10.0, 10.0)].map(|(x, y)| Point::new(x, y));
        assert_eq!(sites, expected);

        let mut a = args(dir.path().join("from_csv.json"));
        a.input = Some(csv);
        a.lloyd = 2;
        let doc = run(&a, Vec::new()).unwrap();
        assert!(doc.done);
        assert!(doc.sites.len() <= 3);
    }

    #[test]
    fn empty_clip_box_is_rejected() {
        let dir = tempdir().unwrap();
        let mut a = args(dir.path().join("x.json"));
        a.width = 0.0;
        assert!(run(&a, Vec::new()).is_err());
    }
}
