//! Tile-by-tile edge annotation.

use crate::{
    graph::{EdgeIndex, Graph},
    interpolate::Method,
    tiles::{TileId, TileSource},
    InclineCalculator, InclineError, UtmProjector, C,
};
use dem::DemError;
use geo::{BoundingRect, Intersects};
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::{fmt, time::Instant};

/// Why an edge was left alone without being an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Edge has no line geometry.
    MissingGeometry,
    /// Edge already has an incline and existing values are kept.
    AlreadyAnnotated,
}

/// Receives per-tile and per-edge problems during a batch.
///
/// Nothing reported here stops the batch.
pub trait Reporter {
    fn tile_failed(&mut self, tile: &TileId, err: &DemError);

    fn edge_skipped(&mut self, edge: EdgeIndex, reason: SkipReason);

    fn edge_failed(&mut self, tile: &TileId, edge: EdgeIndex, err: &InclineError);
}

/// Forwards reports to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn tile_failed(&mut self, tile: &TileId, err: &DemError) {
        error!("skipping tile {tile}: {err}");
    }

    fn edge_skipped(&mut self, edge: EdgeIndex, reason: SkipReason) {
        debug!("skipping edge {}: {reason:?}", edge.index());
    }

    fn edge_failed(&mut self, tile: &TileId, edge: EdgeIndex, err: &InclineError) {
        warn!("edge {} in tile {tile}: {err}", edge.index());
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub tiles_processed: usize,
    pub tiles_failed: usize,
    pub edges_annotated: usize,
    pub edges_failed: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tiles: {} processed, {} failed; edges: {} annotated, {} failed",
            self.tiles_processed, self.tiles_failed, self.edges_annotated, self.edges_failed
        )
    }
}

#[derive(Debug, Clone)]
pub struct Processor {
    calculator: InclineCalculator,

    /// Keep inclines already present on edges.
    skip_existing: bool,

    /// Compute a tile's edges on the rayon pool.
    parallel: bool,
}

impl Processor {
    pub fn builder() -> ProcessorBuilder {
        ProcessorBuilder {
            method: Method::default(),
            precision: 3,
            scale: 1.0,
            projector: UtmProjector::default(),
            skip_existing: false,
            parallel: false,
        }
    }

    pub fn calculator(&self) -> &InclineCalculator {
        &self.calculator
    }

    /// Annotates every edge of `graph` that intersects a tile from
    /// `tiles`.
    ///
    /// Tiles are opened one at a time, in order, and released before
    /// the next is opened. Where tiles overlap, a later tile's value
    /// replaces an earlier one.
    pub fn process<T: TileSource + ?Sized>(
        &self,
        graph: &mut Graph,
        tiles: &T,
        reporter: &mut dyn Reporter,
    ) -> Summary {
        let mut summary = Summary::default();
        // Overlapping tiles may annotate an edge more than once.
        let mut annotated = vec![false; graph.edge_count()];

        for (idx, edge) in graph.edges() {
            if edge.geometry.as_ref().map_or(true, |line| line.0.is_empty()) {
                reporter.edge_skipped(idx, SkipReason::MissingGeometry);
            } else if self.skip_existing && edge.incline.is_some() {
                reporter.edge_skipped(idx, SkipReason::AlreadyAnnotated);
            }
        }

        for tile in tiles.tiles() {
            let now = Instant::now();
            let raster = match tiles.open(&tile) {
                Ok(raster) => raster,
                Err(e) => {
                    reporter.tile_failed(&tile, &e);
                    summary.tiles_failed += 1;
                    continue;
                }
            };
            let bounds = raster.bounds();

            let candidates: Vec<EdgeIndex> = graph
                .edges()
                .filter(|(_, edge)| !(self.skip_existing && edge.incline.is_some()))
                .filter(|(_, edge)| {
                    edge.geometry
                        .as_ref()
                        .and_then(BoundingRect::bounding_rect)
                        .map_or(false, |rect| rect.intersects(&bounds))
                })
                .map(|(idx, _)| idx)
                .collect();

            let infer = |idx: EdgeIndex| -> (EdgeIndex, Result<Option<C>, InclineError>) {
                let result = match graph.edge(idx).geometry.as_ref() {
                    Some(line) => self.calculator.infer_incline(line, &raster),
                    None => Ok(None),
                };
                (idx, result)
            };
            let results: Vec<_> = if self.parallel {
                candidates.par_iter().map(|&idx| infer(idx)).collect()
            } else {
                candidates.iter().map(|&idx| infer(idx)).collect()
            };

            let mut tile_annotated = 0;
            for (idx, result) in results {
                match result {
                    Ok(Some(incline)) => {
                        graph.edge_mut(idx).incline = Some(incline);
                        annotated[idx.index()] = true;
                        tile_annotated += 1;
                    }
                    Ok(None) => debug!("edge {}: no incline from {tile}", idx.index()),
                    Err(e) => {
                        reporter.edge_failed(&tile, idx, &e);
                        summary.edges_failed += 1;
                    }
                }
            }

            summary.tiles_processed += 1;
            debug!(
                "tile {tile}; candidates: {}, annotated: {tile_annotated}, exec: {:?}",
                candidates.len(),
                now.elapsed()
            );
        }

        summary.edges_annotated = annotated.iter().filter(|&&done| done).count();
        info!("{summary}");
        summary
    }
}

pub struct ProcessorBuilder {
    method: Method,
    precision: u32,
    scale: C,
    projector: UtmProjector,
    skip_existing: bool,
    parallel: bool,
}

impl ProcessorBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn precision(mut self, digits: u32) -> Self {
        self.precision = digits;
        self
    }

    pub fn scale(mut self, scale: C) -> Self {
        self.scale = scale;
        self
    }

    pub fn projector(mut self, projector: UtmProjector) -> Self {
        self.projector = projector;
        self
    }

    pub fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn build(&self) -> Result<Processor, InclineError> {
        let calculator = InclineCalculator::builder()
            .method(self.method)
            .precision(self.precision)
            .scale(self.scale)
            .projector(self.projector)
            .build()?;
        Ok(Processor {
            calculator,
            skip_existing: self.skip_existing,
            parallel: self.parallel,
        })
    }
}
