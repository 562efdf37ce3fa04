//! Affine pixel <-> geographic transform.

use crate::{DemError, C};
use geo::geometry::{Coord, Rect};

/// GDAL-ordered affine coefficients.
///
/// ```text
/// x = c[0] + col * c[1] + row * c[2]
/// y = c[3] + col * c[4] + row * c[5]
/// ```
///
/// Integer `(col, row)` values address pixel _corners_; the center of
/// pixel `(0, 0)` is at `(0.5, 0.5)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    coeffs: [C; 6],
    inverse: [C; 6],
}

impl GeoTransform {
    pub fn from_gdal(coeffs: [C; 6]) -> Result<Self, DemError> {
        let [x0, a, b, y0, d, e] = coeffs;
        let det = a * e - b * d;
        if det == 0.0 || !det.is_finite() {
            return Err(DemError::DegenerateTransform(coeffs));
        }
        let inverse = [
            (b * y0 - e * x0) / det,
            e / det,
            -b / det,
            (d * x0 - a * y0) / det,
            -d / det,
            a / det,
        ];
        Ok(Self { coeffs, inverse })
    }

    /// North-up transform with the upper-left corner at `origin`.
    pub fn north_up(origin: Coord<C>, pixel_width: C, pixel_height: C) -> Result<Self, DemError> {
        Self::from_gdal([origin.x, pixel_width, 0.0, origin.y, 0.0, -pixel_height])
    }

    pub fn to_gdal(&self) -> [C; 6] {
        self.coeffs
    }

    /// Maps fractional `(col, row)` grid coordinates to geographic
    /// coordinates.
    pub fn forward(&self, col: C, row: C) -> Coord<C> {
        apply(&self.coeffs, col, row)
    }

    /// Maps geographic coordinates to fractional `(col, row)` grid
    /// coordinates.
    pub fn inverse(&self, coord: Coord<C>) -> (C, C) {
        let Coord { x, y } = apply(&self.inverse, coord.x, coord.y);
        (x, y)
    }

    /// Returns the geographic extent of a `rows` x `cols` grid.
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self, rows: usize, cols: usize) -> Rect<C> {
        let (w, h) = (cols as C, rows as C);
        let corners = [
            self.forward(0.0, 0.0),
            self.forward(w, 0.0),
            self.forward(0.0, h),
            self.forward(w, h),
        ];
        let (mut min, mut max) = (corners[0], corners[0]);
        for c in &corners[1..] {
            min.x = min.x.min(c.x);
            min.y = min.y.min(c.y);
            max.x = max.x.max(c.x);
            max.y = max.y.max(c.y);
        }
        Rect::new(min, max)
    }
}

fn apply(c: &[C; 6], u: C, v: C) -> Coord<C> {
    Coord {
        x: c[0] + u * c[1] + v * c[2],
        y: c[3] + u * c[4] + v * c[5],
    }
}
