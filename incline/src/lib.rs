//! Annotates path network edges with their incline.
//!
//! Each edge's incline is the elevation difference between its first
//! and last vertices divided by the planar (UTM) distance between
//! them. Elevations are interpolated from GeoTIFF elevation tiles.
//!
//! ```no_run
//! use incline::{DemTiles, Graph, LogReporter, Processor};
//!
//! # fn main() -> Result<(), incline::InclineError> {
//! let mut graph = Graph::from_geojson("nodes.geojson", "edges.geojson")?;
//! let tiles = DemTiles::new(["dem/"])?;
//! Processor::builder()
//!     .build()?
//!     .process(&mut graph, &tiles, &mut LogReporter);
//! graph.to_geojson("nodes.geojson", "edges.geojson", None)?;
//! # Ok(())
//! # }
//! ```

mod calculator;
mod error;
pub mod graph;
pub mod interpolate;
mod math;
mod processor;
mod projection;
mod tiles;

pub use crate::{
    calculator::{InclineCalculator, InclineCalculatorBuilder},
    error::InclineError,
    graph::{Edge, EdgeIndex, Graph, Node, NodeIndex},
    interpolate::{Method, Sampler},
    processor::{LogReporter, Processor, ProcessorBuilder, Reporter, SkipReason, Summary},
    projection::{Hemisphere, Projected, UtmProjector},
    tiles::{DemTiles, TileId, TileSource},
};
pub use dem;
pub use geo;

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;
