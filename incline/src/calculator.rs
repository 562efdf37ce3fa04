use crate::{
    interpolate::{Method, Sampler},
    math::round_to,
    InclineError, UtmProjector, C,
};
use dem::{DemError, Raster};
use geo::geometry::{LineString, Point};
use log::debug;

const DEFAULT_PRECISION: u32 = 3;

/// Derives an edge's incline from the elevation at its endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct InclineCalculator {
    sampler: Sampler,

    /// Decimal digits kept in results.
    precision: u32,

    projector: UtmProjector,
}

impl Default for InclineCalculator {
    fn default() -> Self {
        Self {
            sampler: Sampler::default(),
            precision: DEFAULT_PRECISION,
            projector: UtmProjector::default(),
        }
    }
}

impl InclineCalculator {
    pub fn builder() -> InclineCalculatorBuilder {
        InclineCalculatorBuilder {
            method: Method::default(),
            scale: 1.0,
            precision: DEFAULT_PRECISION,
            projector: UtmProjector::default(),
        }
    }

    pub fn method(&self) -> Method {
        self.sampler.method
    }

    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Returns the rise over run between the first and last points of
    /// `line`, rounded to the configured precision.
    ///
    /// Interior vertices are ignored. Returns `Ok(None)` when the
    /// line has no horizontal extent or either endpoint has no usable
    /// elevation in `raster`.
    pub fn infer_incline(
        &self,
        line: &LineString<C>,
        raster: &Raster,
    ) -> Result<Option<C>, InclineError> {
        let [first, .., last] = line.0.as_slice() else {
            return Ok(None);
        };
        let (first, last) = (Point::from(*first), Point::from(*last));

        let length = self.projector.projected_distance(first, last)?;
        if length == 0.0 {
            debug!("zero length edge at {first:?}");
            return Ok(None);
        }

        let Some(first_elev) = self.sample_elevation(raster, first)? else {
            return Ok(None);
        };
        let Some(last_elev) = self.sample_elevation(raster, last)? else {
            return Ok(None);
        };

        rise_over_run(first_elev, last_elev, length, self.precision).map(Some)
    }

    /// Returns the interpolated, scaled elevation at `point`.
    ///
    /// Points whose sampling window falls off `raster` have no
    /// elevation.
    pub fn sample_elevation(
        &self,
        raster: &Raster,
        point: Point<C>,
    ) -> Result<Option<C>, InclineError> {
        match raster.window(point.0, self.sampler.method.window_size()) {
            Ok(window) => self.sampler.sample(&window),
            Err(DemError::OutOfBounds { .. }) => {
                debug!("{point:?} window outside raster");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn rise_over_run(from: C, to: C, length: C, precision: u32) -> Result<C, InclineError> {
    let incline = round_to((to - from) / length, precision);
    if incline.is_finite() {
        Ok(incline)
    } else {
        Err(InclineError::NonFinite)
    }
}

pub struct InclineCalculatorBuilder {
    method: Method,

    /// Vertical multiplier applied to interpolated elevations.
    scale: C,

    precision: u32,

    projector: UtmProjector,
}

impl InclineCalculatorBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn scale(mut self, scale: C) -> Self {
        self.scale = scale;
        self
    }

    pub fn precision(mut self, digits: u32) -> Self {
        self.precision = digits;
        self
    }

    pub fn projector(mut self, projector: UtmProjector) -> Self {
        self.projector = projector;
        self
    }

    pub fn build(&self) -> Result<InclineCalculator, InclineError> {
        if !self.scale.is_finite() || self.scale == 0.0 {
            return Err(InclineError::Builder(format!(
                "elevation scale must be finite and nonzero, got {}",
                self.scale
            )));
        }
        if self.precision > 15 {
            return Err(InclineError::Builder(format!(
                "precision {} exceeds f64 resolution",
                self.precision
            )));
        }
        Ok(InclineCalculator {
            sampler: Sampler::new(self.method, self.scale),
            precision: self.precision,
            projector: self.projector,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{rise_over_run, InclineCalculator, Method};
    use crate::{InclineError, UtmProjector};
    use approx::assert_relative_eq;
    use dem::{GeoTransform, Raster};
    use geo::{line_string, point, Coord, LineString};

    const WEST: f64 = -122.34;
    const NORTH: f64 = 47.61;
    const CELL: f64 = 0.0001;

    /// 10x10 lon/lat raster with elevation `100 + 10 * col`.
    fn ramp() -> Raster {
        let transform = GeoTransform::north_up(Coord { x: WEST, y: NORTH }, CELL, CELL).unwrap();
        let samples = (0..100).map(|i| 100.0 + 10.0 * (i % 10) as f32).collect();
        Raster::new(10, 10, samples, transform, None).unwrap()
    }

    /// Lon/lat of fractional grid position `(col, row)`.
    fn at(col: f64, row: f64) -> Coord {
        Coord {
            x: WEST + col * CELL,
            y: NORTH - row * CELL,
        }
    }

    #[test]
    fn test_builder_defaults() {
        let calc = InclineCalculator::builder().build().unwrap();
        assert_eq!(calc, InclineCalculator::default());
        assert_eq!(calc.method(), Method::Idw);
        assert_eq!(calc.precision(), 3);
    }

    #[test]
    fn test_builder_rejects_bad_config() {
        assert!(InclineCalculator::builder().scale(f64::NAN).build().is_err());
        assert!(InclineCalculator::builder().scale(0.0).build().is_err());
        assert!(InclineCalculator::builder().precision(20).build().is_err());
    }

    #[test]
    fn test_rise_over_run() {
        assert_eq!(rise_over_run(100.0, 110.0, 10.0, 2).unwrap(), 1.0);
        assert_eq!(rise_over_run(110.0, 100.0, 30.0, 3).unwrap(), -0.333);
        assert!(matches!(
            rise_over_run(100.0, f64::INFINITY, 10.0, 3),
            Err(InclineError::NonFinite)
        ));
    }

    #[test]
    fn test_step_incline() {
        // Columns 0-4 at 100m and 5-9 at 110m.
        let transform = GeoTransform::north_up(Coord { x: WEST, y: NORTH }, CELL, CELL).unwrap();
        let samples = (0..100)
            .map(|i| if i % 10 < 5 { 100.0 } else { 110.0 })
            .collect();
        let raster = Raster::new(10, 10, samples, transform, None).unwrap();
        let (from, to) = (at(2.25, 4.75), at(7.25, 4.75));
        let line = LineString::from(vec![from, at(4.0, 3.0), to]);

        let calc = InclineCalculator::builder().precision(2).build().unwrap();
        let low = calc.sample_elevation(&raster, from.into()).unwrap().unwrap();
        let high = calc.sample_elevation(&raster, to.into()).unwrap().unwrap();
        assert_relative_eq!(low, 100.0, epsilon = 1e-9);
        assert_relative_eq!(high, 110.0, epsilon = 1e-9);

        let length = UtmProjector::default()
            .projected_distance(from.into(), to.into())
            .unwrap();
        let incline = calc.infer_incline(&line, &raster).unwrap().unwrap();
        assert_eq!(incline, ((high - low) / length * 100.0).round() / 100.0);
        assert!(incline > 0.0);

        // Scaling elevations so the 10m step equals the run gives 1.0.
        let calc = InclineCalculator::builder()
            .precision(2)
            .scale(length / 10.0)
            .build()
            .unwrap();
        assert_eq!(calc.infer_incline(&line, &raster).unwrap(), Some(1.0));
    }

    #[test]
    fn test_zero_length() {
        let calc = InclineCalculator::default();
        let line = LineString::from(vec![at(4.5, 4.5), at(4.5, 4.5)]);
        assert_eq!(calc.infer_incline(&line, &ramp()).unwrap(), None);
    }

    #[test]
    fn test_single_point() {
        let calc = InclineCalculator::default();
        let line = LineString::from(vec![at(4.5, 4.5)]);
        assert_eq!(calc.infer_incline(&line, &ramp()).unwrap(), None);
    }

    #[test]
    fn test_off_raster_is_none() {
        let calc = InclineCalculator::default();
        let line = line_string![(x: -100.0, y: 40.0), (x: -100.001, y: 40.0)];
        assert_eq!(calc.infer_incline(&line, &ramp()).unwrap(), None);
        // One endpoint on the edge column, where a 3x3 window does not fit.
        let line = LineString::from(vec![at(4.5, 4.5), at(9.5, 4.5)]);
        assert_eq!(calc.infer_incline(&line, &ramp()).unwrap(), None);
    }

    #[test]
    fn test_sample_elevation() {
        let raster = ramp();
        let calc = InclineCalculator::builder()
            .method(Method::Bilinear)
            .build()
            .unwrap();
        let elev = calc
            .sample_elevation(&raster, at(3.25, 4.5).into())
            .unwrap()
            .unwrap();
        // dx weights the window's left column.
        assert_relative_eq!(elev, 0.25 * 130.0 + 0.75 * 140.0, epsilon = 1e-6);
        assert_eq!(
            calc.sample_elevation(&raster, point!(x: WEST - 1.0, y: NORTH))
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_incline_along_ramp() {
        let raster = ramp();
        let line = LineString::from(vec![at(3.5, 5.5), at(4.0, 5.5), at(6.5, 5.5)]);
        let calc = InclineCalculator::builder()
            .method(Method::Spline)
            .precision(6)
            .build()
            .unwrap();
        let incline = calc.infer_incline(&line, &raster).unwrap().unwrap();

        let length = UtmProjector::default()
            .projected_distance(line.0[0].into(), line.0[2].into())
            .unwrap();
        // 30m of rise over three columns.
        assert_relative_eq!(incline, 30.0 / length, epsilon = 1e-6);
        assert!(incline > 0.0);

        let reversed: LineString = line.0.iter().rev().copied().collect();
        let decline = calc.infer_incline(&reversed, &raster).unwrap().unwrap();
        assert_relative_eq!(decline, -incline);
    }

    #[test]
    fn test_scale_and_precision() {
        let raster = ramp();
        let line = LineString::from(vec![at(3.5, 5.5), at(6.5, 5.5)]);
        let calc = |scale| {
            InclineCalculator::builder()
                .method(Method::Spline)
                .precision(2)
                .scale(scale)
                .build()
                .unwrap()
        };
        let base = calc(1.0).infer_incline(&line, &raster).unwrap().unwrap();
        let doubled = calc(2.0).infer_incline(&line, &raster).unwrap().unwrap();
        assert_eq!(base, (base * 100.0).round() / 100.0);
        assert!(doubled > base);
    }

    #[test]
    fn test_idw_incline() {
        let raster = ramp();
        let line = LineString::from(vec![at(2.5, 2.5), at(6.5, 6.5)]);
        let incline = InclineCalculator::default()
            .infer_incline(&line, &raster)
            .unwrap()
            .unwrap();
        assert!(incline > 0.0);
        assert!(incline < 1.0);
    }
}
