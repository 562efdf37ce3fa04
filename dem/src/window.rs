use crate::C;

/// A square neighborhood of raster cells around a query point.
///
/// Values are stored row-major alongside a parallel validity mask.
/// Masked cells still hold whatever the raster stored for them.
#[derive(Debug, Clone, PartialEq)]
pub struct CellWindow {
    rows: usize,
    cols: usize,
    values: Vec<C>,
    valid: Vec<bool>,
    /// Query point's column offset from the window's origin.
    pub dx: C,
    /// Query point's row offset from the window's origin.
    pub dy: C,
}

impl CellWindow {
    /// Returns a fully valid window.
    ///
    /// # Panics
    ///
    /// Panics if `values` is ragged.
    pub fn new(values: &[&[C]], dx: C, dy: C) -> Self {
        let valid: Vec<Vec<bool>> = values.iter().map(|row| vec![true; row.len()]).collect();
        let valid: Vec<&[bool]> = valid.iter().map(Vec::as_slice).collect();
        Self::masked(values, &valid, dx, dy)
    }

    /// Returns a window where `valid[row][col] == false` marks a
    /// masked cell.
    ///
    /// # Panics
    ///
    /// Panics if `values` is ragged or `valid` has a different shape.
    pub fn masked(values: &[&[C]], valid: &[&[bool]], dx: C, dy: C) -> Self {
        let rows = values.len();
        let cols = values.first().map_or(0, |row| row.len());
        assert!(values.iter().all(|row| row.len() == cols), "ragged window");
        assert_eq!(valid.len(), rows, "mask shape mismatch");
        assert!(valid.iter().all(|row| row.len() == cols), "mask shape mismatch");
        Self {
            rows,
            cols,
            values: values.iter().flat_map(|row| row.iter().copied()).collect(),
            valid: valid.iter().flat_map(|row| row.iter().copied()).collect(),
            dx,
            dy,
        }
    }

    pub(crate) fn from_parts(
        (rows, cols): (usize, usize),
        values: Vec<C>,
        valid: Vec<bool>,
        (dx, dy): (C, C),
    ) -> Self {
        debug_assert_eq!(values.len(), rows * cols);
        debug_assert_eq!(valid.len(), rows * cols);
        Self {
            rows,
            cols,
            values,
            valid,
            dx,
            dy,
        }
    }

    /// Returns `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn value(&self, row: usize, col: usize) -> C {
        self.values[row * self.cols + col]
    }

    pub fn is_valid(&self, row: usize, col: usize) -> bool {
        self.valid[row * self.cols + col]
    }

    /// Number of masked cells.
    pub fn masked_count(&self) -> usize {
        self.valid.iter().filter(|v| !**v).count()
    }

    /// Iterates `(row, col, value, valid)` in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, C, bool)> + '_ {
        self.values
            .iter()
            .zip(&self.valid)
            .enumerate()
            .map(|(idx, (value, valid))| (idx / self.cols, idx % self.cols, *value, *valid))
    }
}
