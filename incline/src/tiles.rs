//! Elevation tile providers.

use crate::InclineError;
use dem::{DemError, Raster};
use log::debug;
use std::{
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
};

/// Handle to one elevation tile, usually its file path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(pub PathBuf);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Supplies elevation rasters to the batch processor.
pub trait TileSource {
    /// Tiles to process, in processing order.
    fn tiles(&self) -> Vec<TileId>;

    /// Reads `tile` into memory.
    fn open(&self, tile: &TileId) -> Result<Raster, DemError>;
}

/// GeoTIFF tiles on the local filesystem.
#[derive(Debug, Clone)]
pub struct DemTiles {
    paths: Vec<PathBuf>,
}

impl DemTiles {
    /// Collects `.tif`/`.tiff` files from `paths`, which may name files
    /// or directories.
    ///
    /// Directories are scanned one level deep, in sorted order. Fails
    /// if no tiles are found at all.
    pub fn new<I, P>(paths: I) -> Result<Self, InclineError>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut tiles = Vec::new();
        let mut searched = Vec::new();
        for path in paths {
            let path = path.as_ref();
            searched.push(path.display().to_string());
            if path.is_dir() {
                let mut found = Vec::new();
                for entry in std::fs::read_dir(path)? {
                    let entry = entry?.path();
                    if entry.is_file() && is_tiff(&entry) {
                        found.push(entry);
                    }
                }
                found.sort();
                debug!("found {} tiles in {path:?}", found.len());
                tiles.extend(found);
            } else {
                tiles.push(path.to_owned());
            }
        }

        if tiles.is_empty() {
            Err(InclineError::Builder(format!(
                "no elevation tiles in {}",
                searched.join(", ")
            )))
        } else {
            Ok(Self { paths: tiles })
        }
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl TileSource for DemTiles {
    fn tiles(&self) -> Vec<TileId> {
        self.paths.iter().cloned().map(TileId).collect()
    }

    fn open(&self, tile: &TileId) -> Result<Raster, DemError> {
        Raster::load(&tile.0)
    }
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map_or(false, |ext| {
            ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff")
        })
}
