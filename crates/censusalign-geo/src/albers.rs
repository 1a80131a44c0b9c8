//! NAD83 / California Albers forward projection (EPSG:3310).
//!
//! Areas and shared perimeters feed population-balance and compactness
//! scoring downstream, so geometry is projected once into an equal-area CRS
//! with meter units before any measurement. The projection is the ellipsoidal
//! Albers equal-area conic from Snyder, *Map Projections — A Working Manual*
//! (USGS PP 1395, pp. 101-102), with the EPSG:3310 parameters.

use geo::MapCoords;
use geo_types::{Coord, MultiPolygon};

/// GRS80 semi-major axis (meters).
const A: f64 = 6_378_137.0;
/// GRS80 inverse flattening.
const INV_F: f64 = 298.257_222_101;

/// First standard parallel (degrees).
const PHI1_DEG: f64 = 34.0;
/// Second standard parallel (degrees).
const PHI2_DEG: f64 = 40.5;
/// Latitude of origin (degrees).
const PHI0_DEG: f64 = 0.0;
/// Central meridian (degrees).
const LAM0_DEG: f64 = -120.0;
/// False easting (meters).
const FALSE_EASTING: f64 = 0.0;
/// False northing (meters).
const FALSE_NORTHING: f64 = -4_000_000.0;

/// The EPSG:3310 forward transform.
///
/// Construction precomputes the cone constant and origin radius; projecting
/// a coordinate is then a handful of flops.
#[derive(Clone, Copy, Debug)]
pub struct CaliforniaAlbers {
    e: f64,
    e2: f64,
    n: f64,
    c: f64,
    rho0: f64,
    lam0: f64,
}

impl CaliforniaAlbers {
    /// Builds the transform from the EPSG:3310 parameters.
    pub fn new() -> Self {
        let f = 1.0 / INV_F;
        let e2 = 2.0 * f - f * f;
        let e = e2.sqrt();

        let phi1 = PHI1_DEG.to_radians();
        let phi2 = PHI2_DEG.to_radians();
        let phi0 = PHI0_DEG.to_radians();

        let m1 = m(phi1, e2);
        let m2 = m(phi2, e2);
        let q0 = q(phi0, e, e2);
        let q1 = q(phi1, e, e2);
        let q2 = q(phi2, e, e2);

        let n = (m1 * m1 - m2 * m2) / (q2 - q1);
        let c = m1 * m1 + n * q1;
        let rho0 = A * (c - n * q0).sqrt() / n;

        Self {
            e,
            e2,
            n,
            c,
            rho0,
            lam0: LAM0_DEG.to_radians(),
        }
    }

    /// Projects a geographic coordinate (degrees, NAD83) to meters.
    pub fn project(&self, lon_deg: f64, lat_deg: f64) -> (f64, f64) {
        let lam = lon_deg.to_radians();
        let phi = lat_deg.to_radians();

        let rho = A * (self.c - self.n * q(phi, self.e, self.e2)).sqrt() / self.n;
        let theta = self.n * (lam - self.lam0);

        let x = FALSE_EASTING + rho * theta.sin();
        let y = FALSE_NORTHING + self.rho0 - rho * theta.cos();
        (x, y)
    }

    /// Projects an entire multipolygon.
    pub fn project_multipolygon(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        geometry.map_coords(|Coord { x, y }| {
            let (px, py) = self.project(x, y);
            Coord { x: px, y: py }
        })
    }
}

impl Default for CaliforniaAlbers {
    fn default() -> Self {
        Self::new()
    }
}

/// Snyder's q: authalic latitude helper (eq. 3-12).
fn q(phi: f64, e: f64, e2: f64) -> f64 {
    let s = phi.sin();
    (1.0 - e2) * (s / (1.0 - e2 * s * s) - (1.0 / (2.0 * e)) * ((1.0 - e * s) / (1.0 + e * s)).ln())
}

/// Snyder's m: radius of the parallel over a (eq. 14-15).
fn m(phi: f64, e2: f64) -> f64 {
    let s = phi.sin();
    phi.cos() / (1.0 - e2 * s * s).sqrt()
}
