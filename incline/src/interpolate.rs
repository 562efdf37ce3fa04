//! Elevation interpolation over a [CellWindow].

use crate::{math::spline_weights, InclineError, C};
use dem::CellWindow;
use log::debug;
use std::{fmt, str::FromStr};

/// Masked fraction at or above which inverse distance weighting
/// gives up.
const IDW_MASKED_LIMIT: C = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Inverse distance weighting over a 3x3 window.
    #[default]
    Idw,
    /// Bilinear over a 2x2 window.
    Bilinear,
    /// Interpolating bivariate B-spline over a 3x3 window.
    Spline,
}

impl Method {
    /// Side length of the window this method samples.
    pub fn window_size(self) -> usize {
        match self {
            Method::Idw | Method::Spline => 3,
            Method::Bilinear => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Idw => "idw",
            Method::Bilinear => "bilinear",
            Method::Spline => "spline",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = InclineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "idw" => Ok(Method::Idw),
            "bilinear" => Ok(Method::Bilinear),
            "spline" => Ok(Method::Spline),
            other => Err(InclineError::InvalidMethod(other.to_owned())),
        }
    }
}

/// Interpolates `window` at its query offsets.
///
/// `Ok(None)` means the window holds too little data for an answer.
pub fn interpolate(method: Method, window: &CellWindow) -> Result<Option<C>, InclineError> {
    match method {
        Method::Idw => Ok(idw(window)),
        Method::Bilinear => bilinear(window).map(Some),
        Method::Spline => spline(window).map(Some),
    }
}

/// Inverse distance weighted mean of the valid cells of a 3x3 window.
///
/// Returns `None` when the window is not 3x3, too much of it is
/// masked, the query point sits exactly on a valid cell, or the
/// result is not finite.
#[allow(clippy::cast_precision_loss)]
pub fn idw(window: &CellWindow) -> Option<C> {
    if window.shape() != (3, 3) {
        debug!("idw: unsupported window shape {:?}", window.shape());
        return None;
    }
    let masked = window.masked_count() as C / 9.0;
    if masked >= IDW_MASKED_LIMIT {
        debug!("idw: {:.0}% of window masked", masked * 100.0);
        return None;
    }

    let (mut weighted, mut total) = (0.0, 0.0);
    for (row, col, value, valid) in window.cells() {
        if !valid {
            continue;
        }
        let distance = (col as C - window.dx).hypot(row as C - window.dy);
        if distance == 0.0 {
            return None;
        }
        let weight = distance.recip();
        weighted += weight * value;
        total += weight;
    }

    let value = weighted / total;
    value.is_finite().then_some(value)
}

/// Bilinear interpolation of a 2x2 window.
///
/// Masking is ignored.
pub fn bilinear(window: &CellWindow) -> Result<C, InclineError> {
    let (rows, cols) = window.shape();
    if (rows, cols) != (2, 2) {
        return Err(InclineError::WindowShape {
            method: Method::Bilinear.as_str(),
            rows,
            cols,
        });
    }
    let (dx, dy) = (window.dx, window.dy);
    let top = dx * window.value(0, 0) + (1.0 - dx) * window.value(0, 1);
    let bottom = dx * window.value(1, 0) + (1.0 - dx) * window.value(1, 1);
    Ok(dy * top + (1.0 - dy) * bottom)
}

/// Evaluates the interpolating tensor product B-spline through every
/// cell of a square window.
///
/// Masking is ignored.
pub fn spline(window: &CellWindow) -> Result<C, InclineError> {
    let (rows, cols) = window.shape();
    let shape_error = || InclineError::WindowShape {
        method: Method::Spline.as_str(),
        rows,
        cols,
    };
    if rows != cols || rows < 2 {
        return Err(shape_error());
    }
    let row_weights = spline_weights(rows, window.dy).ok_or_else(shape_error)?;
    let col_weights = spline_weights(cols, window.dx).ok_or_else(shape_error)?;
    Ok(window
        .cells()
        .map(|(row, col, value, _)| row_weights[row] * col_weights[col] * value)
        .sum())
}

/// An interpolation method plus a vertical scale factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampler {
    pub method: Method,
    pub scale: C,
}

impl Default for Sampler {
    fn default() -> Self {
        Self {
            method: Method::default(),
            scale: 1.0,
        }
    }
}

impl Sampler {
    pub fn new(method: Method, scale: C) -> Self {
        Self { method, scale }
    }

    /// Interpolates `window` and applies the scale factor.
    pub fn sample(&self, window: &CellWindow) -> Result<Option<C>, InclineError> {
        Ok(interpolate(self.method, window)?.map(|value| value * self.scale))
    }
}
