//! Geographic to UTM projection.
//!
//! Transverse Mercator on the WGS84 ellipsoid, computed with the
//! third order Krüger series. Accuracy is well under a millimeter
//! inside a zone, which is plenty for edge lengths.
//!
//! # References
//!
//! 1. Karney, C. F. F. (2011). Transverse Mercator with an accuracy
//!    of a few nanometers. Journal of Geodesy 85(8), 475-485.

use crate::{InclineError, C};
use geo::geometry::Point;

/// WGS84 semi-major axis (meters).
const WGS84_A: C = 6_378_137.0;

/// WGS84 flattening.
const WGS84_F: C = 1.0 / 298.257_223_563;

/// UTM central meridian scale factor.
const K0: C = 0.9996;

const FALSE_EASTING: C = 500_000.0;
const FALSE_NORTHING_SOUTH: C = 10_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
}

/// A point in projected (easting, northing) meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub easting: C,
    pub northing: C,
}

impl Projected {
    pub fn distance(&self, other: &Self) -> C {
        (self.easting - other.easting).hypot(self.northing - other.northing)
    }
}

/// Projects lon/lat points into a single UTM zone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtmProjector {
    zone: u8,
    hemisphere: Hemisphere,
    /// Central meridian, radians.
    lon0: C,
    /// Rectifying radius scaled by `K0`.
    k0_a: C,
    n: C,
    alpha: [C; 3],
}

impl Default for UtmProjector {
    /// Zone 10 north (EPSG:32610).
    fn default() -> Self {
        Self::build(10, Hemisphere::North)
    }
}

impl UtmProjector {
    pub fn new(zone: u8, hemisphere: Hemisphere) -> Result<Self, InclineError> {
        if !(1..=60).contains(&zone) {
            return Err(InclineError::Builder(format!(
                "UTM zone {zone} not in 1..=60"
            )));
        }
        Ok(Self::build(zone, hemisphere))
    }

    pub fn zone(&self) -> u8 {
        self.zone
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Projects a lon/lat point.
    pub fn project(&self, point: Point<C>) -> Result<Projected, InclineError> {
        let (lon, lat) = (point.x(), point.y());
        if !(lon.is_finite()
            && lat.is_finite()
            && (-180.0..=180.0).contains(&lon)
            && (-90.0..=90.0).contains(&lat))
        {
            return Err(InclineError::OutOfDomain { lon, lat });
        }

        let phi = lat.to_radians();
        let dlambda = lon.to_radians() - self.lon0;
        let e = 2.0 * self.n.sqrt() / (1.0 + self.n);

        let t = (phi.sin().atanh() - e * (e * phi.sin()).atanh()).sinh();
        let xi = t.atan2(dlambda.cos());
        let eta = (dlambda.sin() / t.hypot(1.0)).atanh();

        let mut easting = eta;
        let mut northing = xi;
        for (j, alpha) in (1..=3).zip(self.alpha) {
            let j = C::from(2 * j);
            easting += alpha * (j * xi).cos() * (j * eta).sinh();
            northing += alpha * (j * xi).sin() * (j * eta).cosh();
        }

        let false_northing = match self.hemisphere {
            Hemisphere::North => 0.0,
            Hemisphere::South => FALSE_NORTHING_SOUTH,
        };
        Ok(Projected {
            easting: FALSE_EASTING + self.k0_a * easting,
            northing: false_northing + self.k0_a * northing,
        })
    }

    /// Returns the planar distance, in meters, between two lon/lat
    /// points.
    pub fn projected_distance(&self, a: Point<C>, b: Point<C>) -> Result<C, InclineError> {
        Ok(self.project(a)?.distance(&self.project(b)?))
    }
}

/// Private API
impl UtmProjector {
    fn build(zone: u8, hemisphere: Hemisphere) -> Self {
        let n = WGS84_F / (2.0 - WGS84_F);
        let (n2, n3) = (n * n, n * n * n);
        let a = WGS84_A / (1.0 + n) * (1.0 + n2 / 4.0 + n2 * n2 / 64.0);
        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0,
            61.0 * n3 / 240.0,
        ];
        Self {
            zone,
            hemisphere,
            lon0: (6.0 * C::from(zone) - 183.0).to_radians(),
            k0_a: K0 * a,
            n,
            alpha,
        }
    }
}
