//! Elevation rasters read from GeoTIFF tiles.
//!
//! A [Raster] is a row-major grid of elevation samples placed on the
//! globe by an affine [GeoTransform]. Samples equal to the tile's
//! no-data sentinel, or NaN, are treated as missing.
//!
//! # References
//!
//! 1. [GeoTIFF format specification](https://docs.ogc.org/is/19-008r4/19-008r4.html)
//! 1. [USGS 3DEP products](https://www.usgs.gov/3d-elevation-program/about-3dep-products-services)

mod error;
mod geotiff;
mod transform;
mod window;

pub use crate::{error::DemError, transform::GeoTransform, window::CellWindow};
use geo::geometry::{Coord, Rect};
use log::debug;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

/// Base floating point type used for all coordinates and calculations.
pub type C = f64;

pub struct Raster {
    /// Number of sample rows (north to south for north-up tiles).
    rows: usize,

    /// Number of sample columns.
    cols: usize,

    /// Grid to geographic mapping.
    transform: GeoTransform,

    /// Sentinel marking missing samples.
    no_data: Option<f32>,

    /// Elevation samples, row-major.
    samples: Box<[f32]>,
}

impl Raster {
    pub fn new(
        rows: usize,
        cols: usize,
        samples: Vec<f32>,
        transform: GeoTransform,
        no_data: Option<f32>,
    ) -> Result<Self, DemError> {
        if samples.len() != rows * cols {
            return Err(DemError::Dimensions {
                len: samples.len(),
                rows,
                cols,
            });
        }
        Ok(Self {
            rows,
            cols,
            transform,
            no_data,
            samples: samples.into_boxed_slice(),
        })
    }

    /// Returns a Raster read into memory from the GeoTIFF at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DemError> {
        let path = path.as_ref();
        debug!("loading {path:?}");
        let file = BufReader::new(File::open(path)?);
        geotiff::decode(file, path)
    }

    /// Writes `self` as a single band f32 GeoTIFF.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DemError> {
        let mut file = BufWriter::new(File::create(path)?);
        geotiff::encode(self, &mut file)?;
        file.flush()?;
        Ok(())
    }

    /// Returns `(rows, cols)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn no_data(&self) -> Option<f32> {
        self.no_data
    }

    /// Geographic extent of this raster.
    pub fn bounds(&self) -> Rect<C> {
        self.transform.bounds(self.rows, self.cols)
    }

    /// Returns the sample at `(row, col)`, or `None` if it is out of
    /// range or missing.
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row < self.rows && col < self.cols {
            let sample = self.samples[row * self.cols + col];
            self.is_valid(sample).then_some(sample)
        } else {
            None
        }
    }

    /// Returns the sample of the cell containing `coord`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn sample(&self, coord: Coord<C>) -> Option<f32> {
        let (col, row) = self.transform.inverse(coord);
        if col >= 0.0 && row >= 0.0 {
            self.get(row.floor() as usize, col.floor() as usize)
        } else {
            None
        }
    }

    /// Extracts a `size` x `size` window around `coord`.
    ///
    /// Even sized windows start at the cell containing `coord`, odd
    /// sized windows are centered on it. The returned offsets locate
    /// `coord` relative to the window's upper-left corner, in cells.
    ///
    /// Windows reaching past the raster's edge are an error, never
    /// clipped.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn window(&self, coord: Coord<C>, size: usize) -> Result<CellWindow, DemError> {
        if size == 0 {
            return Err(DemError::WindowSize(size));
        }
        let (gx, gy) = self.transform.inverse(coord);
        let out_of_bounds = || DemError::OutOfBounds {
            col: gx,
            row: gy,
            size,
            rows: self.rows,
            cols: self.cols,
        };
        if !(gx.is_finite() && gy.is_finite()) {
            return Err(out_of_bounds());
        }

        let lead = if size % 2 == 1 { (size / 2) as C } else { 0.0 };
        let origin_col = gx.floor() - lead;
        let origin_row = gy.floor() - lead;
        if origin_col < 0.0
            || origin_row < 0.0
            || origin_col + size as C > self.cols as C
            || origin_row + size as C > self.rows as C
        {
            return Err(out_of_bounds());
        }

        let (col0, row0) = (origin_col as usize, origin_row as usize);
        let mut values = Vec::with_capacity(size * size);
        let mut valid = Vec::with_capacity(size * size);
        for row in row0..row0 + size {
            let start = row * self.cols + col0;
            for &sample in &self.samples[start..start + size] {
                values.push(C::from(sample));
                valid.push(self.is_valid(sample));
            }
        }

        Ok(CellWindow::from_parts(
            (size, size),
            values,
            valid,
            (gx - origin_col, gy - origin_row),
        ))
    }

    pub(crate) fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("transform", &self.transform)
            .field("no_data", &self.no_data)
            .finish_non_exhaustive()
    }
}

/// Private API
impl Raster {
    fn is_valid(&self, sample: f32) -> bool {
        !sample.is_nan() && self.no_data.map_or(true, |no_data| sample != no_data)
    }
}
