use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("no geotransform tags in {0}")]
    NoGeoTransform(PathBuf),

    #[error("degenerate geotransform {0:?}")]
    DegenerateTransform([f64; 6]),

    #[error("sample count {len} does not match {rows}x{cols} grid")]
    Dimensions { len: usize, rows: usize, cols: usize },

    #[error("invalid window size {0}")]
    WindowSize(usize),

    #[error("{size}x{size} window at ({col}, {row}) exceeds {rows}x{cols} raster")]
    OutOfBounds {
        col: f64,
        row: f64,
        size: usize,
        rows: usize,
        cols: usize,
    },
}
