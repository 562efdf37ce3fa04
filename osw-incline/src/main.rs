mod options;

use anyhow::{Context, Error as AnyError};
use clap::Parser;
use incline::{DemTiles, Graph, Hemisphere, LogReporter, Processor, UtmProjector};
use log::info;
use options::Cli;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

fn main() -> Result<(), AnyError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    run(&cli)
}

fn run(cli: &Cli) -> Result<(), AnyError> {
    let now = Instant::now();

    let hemisphere = if cli.south {
        Hemisphere::South
    } else {
        Hemisphere::North
    };
    let processor = Processor::builder()
        .method(cli.method)
        .precision(cli.precision)
        .scale(cli.scale)
        .projector(UtmProjector::new(cli.utm_zone, hemisphere)?)
        .skip_existing(cli.skip_existing)
        .parallel(cli.parallel)
        .build()?;

    let tiles = DemTiles::new(&cli.dem)?;
    info!("{} elevation tiles", tiles.len());

    let mut graph = Graph::from_geojson(&cli.nodes, &cli.edges)
        .with_context(|| format!("loading {:?} and {:?}", cli.nodes, cli.edges))?;
    info!(
        "loaded {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    let summary = processor.process(&mut graph, &tiles, &mut LogReporter);

    let (nodes_out, edges_out, points_out) = output_paths(cli)?;
    graph
        .to_geojson(&nodes_out, &edges_out, points_out.as_deref())
        .with_context(|| format!("writing {nodes_out:?} and {edges_out:?}"))?;

    info!(
        "annotated {} edges in {:?}",
        summary.edges_annotated,
        now.elapsed()
    );
    Ok(())
}

/// Returns where to write nodes, edges and points.
fn output_paths(cli: &Cli) -> Result<(PathBuf, PathBuf, Option<PathBuf>), AnyError> {
    match &cli.out_dir {
        None => Ok((cli.nodes.clone(), cli.edges.clone(), cli.points.clone())),
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let relocate = |path: &Path| -> Result<PathBuf, AnyError> {
                let name = path
                    .file_name()
                    .with_context(|| format!("{path:?} has no file name"))?;
                Ok(dir.join(name))
            };
            Ok((
                relocate(&cli.nodes)?,
                relocate(&cli.edges)?,
                cli.points.as_deref().map(relocate).transpose()?,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{output_paths, Cli};
    use clap::Parser;
    use incline::Method;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from([
            "osw-incline",
            "--nodes",
            "n.geojson",
            "--edges",
            "e.geojson",
            "--dem",
            "a.tif",
            "b.tif",
        ]);
        assert_eq!(cli.method, Method::Idw);
        assert_eq!(cli.precision, 3);
        assert_eq!(cli.utm_zone, 10);
        assert_eq!(cli.dem.len(), 2);
        assert!(!cli.skip_existing);

        let (nodes, edges, points) = output_paths(&cli).unwrap();
        assert_eq!(nodes, PathBuf::from("n.geojson"));
        assert_eq!(edges, PathBuf::from("e.geojson"));
        assert_eq!(points, None);
    }

    #[test]
    fn test_method_and_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let cli = Cli::parse_from([
            "osw-incline",
            "--nodes",
            "in/n.geojson",
            "--edges",
            "in/e.geojson",
            "--points",
            "in/p.geojson",
            "--dem",
            "dem",
            "--method",
            "spline",
            "--out-dir",
            out.to_str().unwrap(),
        ]);
        assert_eq!(cli.method, Method::Spline);
        let (nodes, _, points) = output_paths(&cli).unwrap();
        assert_eq!(nodes, out.join("n.geojson"));
        assert_eq!(points, Some(out.join("p.geojson")));
        assert!(out.is_dir());
    }

    #[test]
    fn test_bad_method() {
        assert!(Cli::try_parse_from([
            "osw-incline",
            "--nodes",
            "n",
            "--edges",
            "e",
            "--dem",
            "d",
            "--method",
            "nearest",
        ])
        .is_err());
    }
}
